//! Declarative [`DeviceDetector`] configuration.
//!
//! ```
//! use mobile_device::{DetectorConfig, RequestContext};
//!
//! let config: DetectorConfig = serde_json::from_str(r#"{
//!     "families": [{ "name": "tizen", "pattern": "tizen|bada" }],
//!     "ignore": ["ipad"]
//! }"#).unwrap();
//!
//! let detector = config
//!     .build(RequestContext::new().with_user_agent("Mozilla/5.0 (Linux; Tizen 2.3)"))
//!     .unwrap();
//! assert!(detector.is_mobile());
//! assert_eq!(detector.device_class(), Some("tizen"));
//! ```

use crate::{
    context::RequestContext, detector::DeviceDetector, error::InvalidSignatureError,
    signature::{Signatures, normalize_family},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A custom device family, appended after the built-in ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyConfig {
    /// Family name, stored lowercase.
    pub name: String,
    /// Case-insensitive regular expression tested against the `User-Agent`.
    pub pattern: String,
}

/// Configuration used to build a [`DeviceDetector`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Custom families, evaluated in order after the built-in families.
    pub families: Vec<FamilyConfig>,
    /// Families which are not considered mobile.
    pub ignore: Vec<String>,
}

impl DetectorConfig {
    /// Compile the configured [`Signatures`].
    ///
    /// Without custom families the shared built-in table is returned.
    pub fn signatures(&self) -> Result<Arc<Signatures>, InvalidSignatureError> {
        if self.families.is_empty() {
            return Ok(Signatures::builtin());
        }
        let mut builder = Signatures::builder();
        for family in &self.families {
            builder.try_add_family(&family.name, &family.pattern)?;
        }
        Ok(Arc::new(builder.build()))
    }

    /// Build a [`DeviceDetector`] and detect the given [`RequestContext`].
    ///
    /// The ignore list is in place before the first detection.
    /// Its entries are normalized like the family names.
    pub fn build(self, ctx: RequestContext) -> Result<DeviceDetector, InvalidSignatureError> {
        let signatures = self.signatures()?;
        Ok(DeviceDetector::from_parts(
            signatures,
            self.ignore.iter().map(|family| normalize_family(family)).collect(),
            ctx,
        ))
    }
}
