//! Request metadata consumed by the [`DeviceDetector`](crate::DeviceDetector).
//!
//! A [`RequestContext`] can be built explicitly, collected from
//! CGI-style `(key, value)` pairs (`HTTP_ACCEPT`, `HTTP_USER_AGENT`,
//! `HTTP_X_WAP_PROFILE` and `HTTP_PROFILE`), read from the process environment
//! using [`RequestContext::from_env`], or, with the `http` feature enabled,
//! converted from an [`http::HeaderMap`].

/// CGI key holding the `Accept` header value.
pub const HTTP_ACCEPT: &str = "HTTP_ACCEPT";
/// CGI key holding the `User-Agent` header value.
pub const HTTP_USER_AGENT: &str = "HTTP_USER_AGENT";
/// CGI key present when the request carries an `X-Wap-Profile` header.
pub const HTTP_X_WAP_PROFILE: &str = "HTTP_X_WAP_PROFILE";
/// CGI key present when the request carries a `Profile` header.
pub const HTTP_PROFILE: &str = "HTTP_PROFILE";

/// The subset of request metadata used for device detection.
///
/// Missing values default to an empty string, or `false`
/// for the WAP profile presence flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    accept: String,
    user_agent: String,
    wap_profile: bool,
}

impl RequestContext {
    /// Create an empty [`RequestContext`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`RequestContext`] from CGI-style variables.
    ///
    /// Unknown keys are ignored. Keys are matched exactly.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut ctx = Self::default();
        for (key, value) in vars {
            match key.as_ref() {
                HTTP_ACCEPT => ctx.accept = value.into(),
                HTTP_USER_AGENT => ctx.user_agent = value.into(),
                HTTP_X_WAP_PROFILE | HTTP_PROFILE => ctx.wap_profile = true,
                _ => (),
            }
        }
        ctx
    }

    /// Create a [`RequestContext`] from the process environment,
    /// as exposed to CGI programs.
    ///
    /// This is a convenience for the outermost integration boundary only.
    /// The environment is read once, the returned context is a snapshot.
    #[must_use]
    pub fn from_env() -> Self {
        let ctx = Self::from_vars(
            [HTTP_ACCEPT, HTTP_USER_AGENT, HTTP_X_WAP_PROFILE, HTTP_PROFILE]
                .into_iter()
                .filter_map(|key| {
                    std::env::var_os(key).map(|value| (key, value.to_string_lossy().into_owned()))
                }),
        );
        tracing::trace!(
            user_agent = %ctx.user_agent,
            accept = %ctx.accept,
            wap_profile = ctx.wap_profile,
            "request context read from process environment",
        );
        ctx
    }

    /// Set the `Accept` header value.
    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = accept.into();
        self
    }

    /// Set the `Accept` header value.
    pub fn set_accept(&mut self, accept: impl Into<String>) -> &mut Self {
        self.accept = accept.into();
        self
    }

    /// Set the `User-Agent` header value.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the `User-Agent` header value.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) -> &mut Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Mark whether or not a WAP profile header (`X-Wap-Profile` or `Profile`) is present.
    #[must_use]
    pub fn with_wap_profile(mut self, present: bool) -> Self {
        self.wap_profile = present;
        self
    }

    /// Mark whether or not a WAP profile header (`X-Wap-Profile` or `Profile`) is present.
    pub fn set_wap_profile(&mut self, present: bool) -> &mut Self {
        self.wap_profile = present;
        self
    }

    /// returns the `Accept` header value, empty if absent.
    #[must_use]
    pub fn accept(&self) -> &str {
        &self.accept
    }

    /// returns the `User-Agent` header value, empty if absent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// returns true if a WAP profile header is present.
    #[must_use]
    pub fn has_wap_profile(&self) -> bool {
        self.wap_profile
    }
}

impl<K, V> FromIterator<(K, V)> for RequestContext
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_vars(iter)
    }
}

#[cfg(feature = "http")]
impl From<&http::HeaderMap> for RequestContext {
    fn from(headers: &http::HeaderMap) -> Self {
        let accept = headers
            .get_all(http::header::ACCEPT)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
            .collect::<Vec<_>>()
            .join(", ");
        let user_agent = headers
            .get(http::header::USER_AGENT)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .unwrap_or_default();
        let wap_profile = headers.contains_key("x-wap-profile") || headers.contains_key("profile");
        Self {
            accept,
            user_agent,
            wap_profile,
        }
    }
}
