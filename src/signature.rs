//! Device family signatures.
//!
//! A [`Signatures`] table maps device family names onto case-insensitive
//! regular expressions which are tested against the `User-Agent`.
//! The table is ordered: the first family that matches wins.
//!
//! The built-in table ([`Signatures::builtin`]) is compiled once per process
//! and shared by all detectors. Custom families can be appended
//! on top of it using a [`SignaturesBuilder`].

use crate::error::{InvalidSignatureError, UnknownDeviceError};
use regex::bytes::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    fmt,
    str::FromStr,
    sync::{Arc, OnceLock},
};

/// The device families known by the built-in [`Signatures`] table.
///
/// Variants are listed in the order in which they are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFamily {
    Android,
    Blackberry,
    Iphone,
    Ipad,
    Opera,
    Palm,
    Windows,
    Generic,
}

impl DeviceFamily {
    /// All built-in families, in evaluation order.
    pub const ALL: [Self; 8] = [
        Self::Android,
        Self::Blackberry,
        Self::Iphone,
        Self::Ipad,
        Self::Opera,
        Self::Palm,
        Self::Windows,
        Self::Generic,
    ];

    /// returns the (lowercase) family name as used in the signature table.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Blackberry => "blackberry",
            Self::Iphone => "iphone",
            Self::Ipad => "ipad",
            Self::Opera => "opera",
            Self::Palm => "palm",
            Self::Windows => "windows",
            Self::Generic => "generic",
        }
    }

    /// returns the (case-insensitive) pattern used to detect this family.
    #[must_use]
    pub const fn pattern(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Blackberry => "blackberry",
            Self::Iphone => "(iphone|safari mobi|ipod)",
            Self::Ipad => "(ipad)",
            Self::Opera => "(opera mini|mini 9.5)",
            Self::Palm => {
                "(pre/|palm os|palm|webos|hiptop|treo|avantgo|plucker|xiino|blazer|elaine)"
            }
            Self::Windows => {
                "(iris|3g_t|windows ce|opera mobi|windows ce; smartphone;|windows ce; iemobile)"
            }
            Self::Generic => {
                "(compal|wireless| mobi|ahong|xda_|foma|samsu|htc/|htc_touch|ktouch|m4u/|kddi|phone|lg |sonyericsson|samsung|nokia|sony cmd|motorola|up.browser|up.link|mmp|symbian|smartphone|midp|wap|vodafone|o2|pocket|kindle|mobile|psp)"
            }
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceFamily {
    type Err = UnknownDeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDeviceError::new(s))
    }
}

impl Serialize for DeviceFamily {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeviceFamily {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse::<Self>().map_err(serde::de::Error::custom)
    }
}

/// A single device family and its compiled, case-insensitive pattern.
#[derive(Debug, Clone)]
pub struct Signature {
    family: Arc<str>,
    pattern: Regex,
}

impl Signature {
    /// Compile a new [`Signature`] for the given family.
    ///
    /// The family name is stored lowercase. The pattern is matched
    /// unanchored against the raw `User-Agent` bytes, folding ASCII case only.
    pub fn new(family: &str, pattern: &str) -> Result<Self, InvalidSignatureError> {
        let family = normalize_family(family);
        if family.is_empty() {
            return Err(InvalidSignatureError::EmptyName);
        }
        let pattern = RegexBuilder::new(pattern)
            .unicode(false)
            .case_insensitive(true)
            .build()
            .map_err(|source| InvalidSignatureError::Pattern {
                family: family.clone(),
                source,
            })?;
        Ok(Self {
            family: family.into(),
            pattern,
        })
    }

    /// returns the family name of this [`Signature`].
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    pub(crate) fn family_arc(&self) -> Arc<str> {
        self.family.clone()
    }

    /// returns the source of the pattern of this [`Signature`].
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// returns true if the pattern occurs anywhere in the given `User-Agent`.
    #[must_use]
    pub fn is_match(&self, user_agent: &str) -> bool {
        self.pattern.is_match(user_agent.as_bytes())
    }
}

/// Normalize a device family name the way it is stored in a [`Signatures`] table.
pub(crate) fn normalize_family(family: &str) -> String {
    family.trim().to_ascii_lowercase()
}

/// An ordered, read-only table of device family [`Signature`]s.
///
/// Every table starts with the built-in [`DeviceFamily`] signatures.
#[derive(Debug, Clone)]
pub struct Signatures {
    entries: Vec<Signature>,
}

static BUILTIN_SIGNATURES: OnceLock<Arc<Signatures>> = OnceLock::new();

impl Signatures {
    /// returns the built-in signature table, shared process-wide.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        BUILTIN_SIGNATURES
            .get_or_init(|| Arc::new(Self::compile_builtin()))
            .clone()
    }

    fn compile_builtin() -> Self {
        let entries = DeviceFamily::ALL
            .into_iter()
            .filter_map(|family| {
                Signature::new(family.as_str(), family.pattern())
                    .inspect_err(|err| {
                        tracing::error!(%family, "failed to compile built-in device signature: {err}");
                    })
                    .ok()
            })
            .collect();
        Self { entries }
    }

    /// Create a [`SignaturesBuilder`] starting from the built-in families.
    #[must_use]
    pub fn builder() -> SignaturesBuilder {
        SignaturesBuilder {
            entries: Self::builtin().entries.clone(),
        }
    }

    /// returns the [`Signature`] for the given family, if it exists.
    ///
    /// The lookup is exact: family names are stored lowercase.
    #[must_use]
    pub fn get(&self, family: &str) -> Option<&Signature> {
        self.entries.iter().find(|sig| sig.family() == family)
    }

    /// returns true if the given family is part of this table.
    #[must_use]
    pub fn contains(&self, family: &str) -> bool {
        self.get(family).is_some()
    }

    /// iterate over all [`Signature`]s in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.entries.iter()
    }

    /// returns the amount of families in this table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// returns true if this table has no families.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder used to extend the built-in [`Signatures`] with custom families.
///
/// Custom families are evaluated after the built-in ones,
/// in the order they were added.
#[derive(Debug, Clone)]
pub struct SignaturesBuilder {
    entries: Vec<Signature>,
}

impl SignaturesBuilder {
    /// Append a custom family to the table.
    pub fn with_family(mut self, family: &str, pattern: &str) -> Result<Self, InvalidSignatureError> {
        self.try_add_family(family, pattern)?;
        Ok(self)
    }

    /// Append a custom family to the table.
    pub fn try_add_family(
        &mut self,
        family: &str,
        pattern: &str,
    ) -> Result<&mut Self, InvalidSignatureError> {
        let signature = Signature::new(family, pattern)?;
        if self.entries.iter().any(|sig| sig.family() == signature.family()) {
            return Err(InvalidSignatureError::DuplicateName(
                signature.family().to_owned(),
            ));
        }
        self.entries.push(signature);
        Ok(self)
    }

    /// Finish the table.
    #[must_use]
    pub fn build(self) -> Signatures {
        Signatures {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_complete_and_ordered() {
        let signatures = Signatures::builtin();
        let families: Vec<_> = signatures.iter().map(Signature::family).collect();
        assert_eq!(
            families,
            DeviceFamily::ALL.map(|family| family.as_str()).to_vec()
        );
    }

    #[test]
    fn builtin_table_is_shared() {
        assert!(Arc::ptr_eq(&Signatures::builtin(), &Signatures::builtin()));
    }

    #[test]
    fn signature_matches_case_insensitive_substring() {
        for (family, ua, expected) in [
            (DeviceFamily::Android, "ANDROID TEST", true),
            (DeviceFamily::Android, "Linux; Android 14; Pixel 8", true),
            (DeviceFamily::Blackberry, "BlackBerry9700/5.0.0.351", true),
            (DeviceFamily::Iphone, "Mozilla/5.0 (iPod touch; CPU iPhone OS 12_5)", true),
            (DeviceFamily::Ipad, "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X)", true),
            (DeviceFamily::Opera, "Opera/9.80 (J2ME/MIDP; Opera Mini/9.80)", true),
            (DeviceFamily::Palm, "Mozilla/5.0 (webOS/1.4.0; U; en-US)", true),
            (DeviceFamily::Windows, "Mozilla/4.0 (compatible; MSIE 6.0; Windows CE; IEMobile 7.11)", true),
            (DeviceFamily::Generic, "Nokia6300/2.0 (05.00) Profile/MIDP-2.0", true),
            (DeviceFamily::Generic, "UP.Browser/6.2", true),
            (DeviceFamily::Generic, "UPxBrowser", true),
            (DeviceFamily::Android, "Mozilla/5.0 (Windows NT 10.0; Win64; x64)", false),
            (DeviceFamily::Generic, "Mozilla/5.0 (X11; Linux x86_64) Firefox/125.0", false),
            (DeviceFamily::Ipad, "", false),
            // ASCII-only case folding: the Kelvin sign does not fold onto `k`
            (DeviceFamily::Generic, "\u{212A}DDI-browser", false),
            (DeviceFamily::Generic, "KDDI-browser", true),
            // `.` matches a single byte, not a multi-byte character
            (DeviceFamily::Generic, "Up\u{e9}Browser", false),
            (DeviceFamily::Android, "\u{e9}Android\u{e9}", true),
        ] {
            let signature = Signature::new(family.as_str(), family.pattern()).unwrap();
            assert_eq!(
                signature.is_match(ua),
                expected,
                "family: {family}; ua: '{ua}'"
            );
        }
    }

    #[test]
    fn device_family_from_str() {
        for family in DeviceFamily::ALL {
            assert_eq!(family.as_str().parse::<DeviceFamily>().unwrap(), family);
            assert_eq!(
                family.as_str().to_uppercase().parse::<DeviceFamily>().unwrap(),
                family
            );
        }
        let err = "foobar".parse::<DeviceFamily>().unwrap_err();
        assert_eq!(err.family(), "foobar");
    }

    #[test]
    fn device_family_serde() {
        let family: DeviceFamily = serde_json::from_str(r#""IPhone""#).unwrap();
        assert_eq!(family, DeviceFamily::Iphone);
        assert_eq!(serde_json::to_string(&family).unwrap(), r#""iphone""#);
        assert!(serde_json::from_str::<DeviceFamily>(r#""foobar""#).is_err());
    }

    #[test]
    fn builder_appends_custom_family() {
        let signatures = Signatures::builder()
            .with_family("Tizen", "tizen|bada")
            .unwrap()
            .build();
        assert_eq!(signatures.len(), DeviceFamily::ALL.len() + 1);
        let tizen = signatures.iter().last().unwrap();
        assert_eq!(tizen.family(), "tizen");
        assert!(tizen.is_match("Mozilla/5.0 (SMART-TV; Linux; TIZEN 6.0)"));
        assert!(signatures.contains("tizen"));
        assert!(!signatures.contains("Tizen"));
    }

    #[test]
    fn builder_rejects_invalid_families() {
        assert!(matches!(
            Signatures::builder().with_family("  ", "foo"),
            Err(InvalidSignatureError::EmptyName)
        ));
        assert!(matches!(
            Signatures::builder().with_family("Android", "droid"),
            Err(InvalidSignatureError::DuplicateName(name)) if name == "android"
        ));
        assert!(matches!(
            Signatures::builder().with_family("broken", "(unclosed"),
            Err(InvalidSignatureError::Pattern { family, .. }) if family == "broken"
        ));
    }
}
