use crate::{
    context::RequestContext,
    error::UnknownDeviceError,
    signature::{DeviceFamily, Signatures},
};
use ahash::HashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `Accept` header content types which unconditionally mark a request as mobile.
const WAP_CONTENT_TYPES: [&str; 2] = ["text/vnd.wap.wml", "application/vnd.wap.xhtml+xml"];

/// The outcome of a detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionState {
    mobile: bool,
    device_class: Option<Arc<str>>,
}

impl DetectionState {
    /// returns true if the request was classified as mobile.
    #[must_use]
    pub fn is_mobile(&self) -> bool {
        self.mobile
    }

    /// returns the matched device family, if any.
    #[must_use]
    pub fn device_class(&self) -> Option<&str> {
        self.device_class.as_deref()
    }
}

/// Classifies a [`RequestContext`] as mobile and identifies its device family.
///
/// Detection runs immediately on construction and can be re-run
/// against another request using [`DeviceDetector::detect`].
///
/// # Remarks
///
/// - A WAP profile header or a WAP `Accept` content type marks the request as mobile
///   without consulting the signature table. The device class is left untouched in that case.
/// - A family on the ignore list still gets recorded as device class,
///   but the request is no longer considered mobile.
#[derive(Debug, Clone)]
pub struct DeviceDetector {
    signatures: Arc<Signatures>,
    ctx: RequestContext,
    ignored: HashSet<String>,
    state: DetectionState,
}

impl DeviceDetector {
    /// Create a new [`DeviceDetector`] using the built-in [`Signatures`],
    /// and detect the given [`RequestContext`].
    #[must_use]
    pub fn new(ctx: RequestContext) -> Self {
        Self::with_signatures(Signatures::builtin(), ctx)
    }

    /// Create a new [`DeviceDetector`] for the request described by the process environment.
    ///
    /// See [`RequestContext::from_env`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(RequestContext::from_env())
    }

    /// Create a new [`DeviceDetector`] using custom [`Signatures`],
    /// and detect the given [`RequestContext`].
    #[must_use]
    pub fn with_signatures(signatures: Arc<Signatures>, ctx: RequestContext) -> Self {
        Self::from_parts(signatures, HashSet::default(), ctx)
    }

    pub(crate) fn from_parts(
        signatures: Arc<Signatures>,
        ignored: HashSet<String>,
        ctx: RequestContext,
    ) -> Self {
        let mut detector = Self {
            signatures,
            ctx: RequestContext::default(),
            ignored,
            state: DetectionState::default(),
        };
        detector.detect(ctx);
        detector
    }

    /// Detect whether or not the given request originates from a mobile device.
    ///
    /// The previous detection state is not reset: the device class
    /// is only overwritten when a family signature matches.
    pub fn detect(&mut self, ctx: RequestContext) -> bool {
        self.ctx = ctx;

        if self.ctx.has_wap_profile() {
            tracing::trace!("wap profile header present: mobile");
            self.state.mobile = true;
        } else if let Some(content_type) = WAP_CONTENT_TYPES
            .into_iter()
            .find(|content_type| self.ctx.accept().contains(content_type))
        {
            tracing::trace!(content_type, "wap content type accepted: mobile");
            self.state.mobile = true;
        } else {
            let user_agent = self.ctx.user_agent();
            match self.signatures.iter().find(|sig| sig.is_match(user_agent)) {
                Some(signature) => {
                    tracing::trace!(
                        family = signature.family(),
                        user_agent,
                        "device family matched: mobile"
                    );
                    self.state.mobile = true;
                    self.state.device_class = Some(signature.family_arc());
                }
                None => {
                    tracing::trace!(user_agent, "no device family matched: not mobile");
                    self.state.mobile = false;
                }
            }
        }

        if self.state.mobile
            && let Some(class) = self.state.device_class.as_deref()
            && self.ignored.contains(class)
        {
            tracing::debug!(family = class, "device family is ignored: not mobile");
            self.state.mobile = false;
        }

        self.state.mobile
    }

    /// Test the `User-Agent` of the last detected request against a single family.
    ///
    /// On a match the family is recorded as device class,
    /// otherwise the state is left untouched.
    ///
    /// Family names are looked up exactly, see [`DeviceDetector::query`]
    /// for a case-insensitive variant.
    pub fn match_family(&mut self, family: &str) -> Result<bool, UnknownDeviceError> {
        let Some(signature) = self.signatures.get(family) else {
            tracing::debug!(family, "unknown device family queried");
            return Err(UnknownDeviceError::new(family));
        };
        let matched = signature.is_match(self.ctx.user_agent());
        if matched {
            self.state.device_class = Some(signature.family_arc());
        }
        Ok(matched)
    }

    /// Query a device family by a name such as `isAndroid`, `isandroid` or `android`.
    ///
    /// The name is lowercased and a single leading `is` is stripped,
    /// after which the remainder is passed to [`DeviceDetector::match_family`].
    pub fn query(&mut self, name: &str) -> Result<bool, UnknownDeviceError> {
        let name = name.to_ascii_lowercase();
        let family = name.strip_prefix("is").unwrap_or(&name);
        self.match_family(family)
    }

    fn match_builtin(&mut self, family: DeviceFamily) -> bool {
        // built-in families are part of every signature table
        self.match_family(family.as_str())
            .inspect_err(|err| tracing::error!("built-in device family missing: {err}"))
            .unwrap_or_default()
    }

    /// Add a device family to the ignore list.
    ///
    /// A request matching an ignored family is not considered mobile.
    /// This takes effect on the next [`DeviceDetector::detect`] call.
    /// The name is not validated against the signature table.
    pub fn ignore(&mut self, family: impl Into<String>) -> &mut Self {
        self.ignored.insert(family.into());
        self
    }

    /// Add a device family to the ignore list.
    ///
    /// See [`DeviceDetector::ignore`].
    #[must_use]
    pub fn with_ignored(mut self, family: impl Into<String>) -> Self {
        self.ignore(family);
        self
    }

    /// returns true if the given family is on the ignore list.
    #[must_use]
    pub fn is_ignored(&self, family: &str) -> bool {
        self.ignored.contains(family)
    }

    /// returns true if the last detected request was classified as mobile.
    #[must_use]
    pub fn is_mobile(&self) -> bool {
        self.state.mobile
    }

    /// returns the matched device family, if any.
    #[must_use]
    pub fn device_class(&self) -> Option<&str> {
        self.state.device_class()
    }

    /// returns the current [`DetectionState`].
    #[must_use]
    pub fn state(&self) -> &DetectionState {
        &self.state
    }

    /// returns the [`RequestContext`] of the last detection.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }

    /// returns the [`Signatures`] used by this detector.
    #[must_use]
    pub fn signatures(&self) -> &Arc<Signatures> {
        &self.signatures
    }

    /// Force a mobile state, using the [`DeviceFamily::Generic`] family.
    pub fn force_state(&mut self) -> &mut Self {
        self.state = DetectionState {
            mobile: true,
            device_class: Some(DeviceFamily::Generic.as_str().into()),
        };
        self
    }

    /// Reset to a non-mobile state without device class.
    ///
    /// The request context and ignore list are kept.
    pub fn reset_state(&mut self) -> &mut Self {
        self.state = DetectionState::default();
        self
    }
}

impl Default for DeviceDetector {
    fn default() -> Self {
        Self::new(RequestContext::default())
    }
}

macro_rules! impl_builtin_family_queries {
    ($($fn:ident => $family:ident),+ $(,)?) => {
        impl DeviceDetector {
            $(
                #[doc = concat!(
                    "returns true if the `User-Agent` matches [`DeviceFamily::",
                    stringify!($family),
                    "`], recording it as device class.",
                )]
                pub fn $fn(&mut self) -> bool {
                    self.match_builtin(DeviceFamily::$family)
                }
            )+
        }
    };
}

impl_builtin_family_queries! {
    is_android => Android,
    is_blackberry => Blackberry,
    is_iphone => Iphone,
    is_ipad => Ipad,
    is_opera => Opera,
    is_palm => Palm,
    is_windows => Windows,
    is_generic => Generic,
}
