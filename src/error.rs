//! Errors surfaced by the [`DeviceDetector`](crate::DeviceDetector)
//! and the [`Signatures`](crate::signature::Signatures) builder.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// error returned when a device family is queried
/// which is not part of the detector's signature table.
pub struct UnknownDeviceError {
    family: String,
}

impl UnknownDeviceError {
    pub(crate) fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
        }
    }

    /// The device family name that was looked up.
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }
}

impl fmt::Display for UnknownDeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "This mobile-device class is unknown: {}", self.family)
    }
}

impl std::error::Error for UnknownDeviceError {}

#[derive(Debug)]
/// error identifying a failure while adding a family to a signature table
pub enum InvalidSignatureError {
    /// the family name is empty
    EmptyName,
    /// a family with the same (lowercased) name is already registered
    DuplicateName(String),
    /// the pattern is not a valid regular expression
    Pattern {
        /// family the pattern was registered for
        family: String,
        /// underlying regex compile error
        source: regex::Error,
    },
}

impl fmt::Display for InvalidSignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "invalid signature: empty device family name"),
            Self::DuplicateName(name) => {
                write!(f, "invalid signature: device family '{name}' already exists")
            }
            Self::Pattern { family, source } => {
                write!(f, "invalid signature: pattern for '{family}': {source}")
            }
        }
    }
}

impl std::error::Error for InvalidSignatureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pattern { source, .. } => Some(source),
            Self::EmptyName | Self::DuplicateName(_) => None,
        }
    }
}
