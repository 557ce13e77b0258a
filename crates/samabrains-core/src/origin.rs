//! Browser origin allow-list.

/// Origins allowed to call the API when no override is configured.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://samabrains.com",
    "https://www.samabrains.com",
    "http://localhost:3000",
    "http://localhost:8000",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8000",
];

/// Decides whether a request's declared `Origin` may reach the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginGuard {
    allowed: Vec<String>,
    enforce: bool,
}

impl OriginGuard {
    /// Build a guard over an allow-list.
    ///
    /// With `enforce == false` (development) every origin is allowed; the list
    /// is kept only so it can be reported.
    #[must_use]
    pub fn new<I, S>(allowed: I, enforce: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            enforce,
        }
    }

    /// Enforcing guard over [`DEFAULT_ALLOWED_ORIGINS`].
    #[must_use]
    pub fn production_default() -> Self {
        Self::new(DEFAULT_ALLOWED_ORIGINS.iter().copied(), true)
    }

    /// Whether a request with this `Origin` header value may proceed.
    ///
    /// Requests without an `Origin` (curl, server-to-server) are always
    /// allowed. Otherwise the origin must match an entry exactly: scheme,
    /// host, and port.
    #[must_use]
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(_) if !self.enforce => true,
            Some(origin) => self.allowed.iter().any(|a| a == origin),
        }
    }

    /// Whether the allow-list is being enforced.
    #[must_use]
    pub fn is_enforcing(&self) -> bool {
        self.enforce
    }

    /// The configured allow-list.
    #[must_use]
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}
