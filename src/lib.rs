//! Mobile device detection for http requests.
//!
//! This crate classifies a request as originating from a mobile device,
//! and if so identifies the device family, using only request metadata:
//! the `Accept` and `User-Agent` headers and the presence of a WAP profile header.
//!
//! ```
//! use mobile_device::{DeviceDetector, RequestContext};
//!
//! let mut detector = DeviceDetector::new(
//!     RequestContext::new().with_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X)"),
//! );
//! assert!(detector.is_mobile());
//! assert_eq!(detector.device_class(), Some("iphone"));
//!
//! assert!(detector.is_iphone());
//! assert!(detector.query("isIphone").unwrap());
//! assert!(detector.query("isFoobar").is_err());
//!
//! detector.ignore("iphone");
//! assert!(!detector.detect(detector.context().clone()));
//! ```
//!
//! # Detection
//!
//! A request is considered mobile when, in order:
//!
//! 1. it carries an `X-Wap-Profile` or `Profile` header;
//! 2. its `Accept` header contains `text/vnd.wap.wml` or `application/vnd.wap.xhtml+xml`;
//! 3. its `User-Agent` matches one of the [`Signatures`], the first match deciding the device class.
//!
//! The first two rules do not touch the device class.
//! A request whose device class is on the ignore list is never considered mobile.
//!
//! # Features
//!
//! - `http`: create a [`RequestContext`] from an `http::HeaderMap`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

pub mod config;
pub mod context;
pub mod error;
pub mod signature;

mod detector;

#[doc(inline)]
pub use config::DetectorConfig;
#[doc(inline)]
pub use context::RequestContext;
pub use detector::{DetectionState, DeviceDetector};
#[doc(inline)]
pub use error::{InvalidSignatureError, UnknownDeviceError};
#[doc(inline)]
pub use signature::{DeviceFamily, Signatures};
