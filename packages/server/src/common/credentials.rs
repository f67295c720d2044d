//! Service API keys.
//!
//! The nova.astrometry.net key is read once from the environment and handed
//! to every solver login; the inference key is only reported by `/health`.
//! Both ride along in `Config` and `SolverCredentials`, which are logged with
//! `{:?}`, so the raw value sits behind `secrecy` and only `expose` reads it.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

pub struct ApiKey(SecretString);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Raw key, for the login request body only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

// Keys are cloned into each pipeline at startup, not per request.
impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let key = ApiKey::new("nova-abcdef123456");
        let rendered = format!("{:?}", key);
        assert_eq!(rendered, "ApiKey([REDACTED])");
        assert!(!rendered.contains("abcdef"));
    }

    #[test]
    fn clone_keeps_the_key_usable_for_login() {
        let key = ApiKey::from("nova-abcdef123456");
        assert_eq!(key.clone().expose(), "nova-abcdef123456");
    }
}
