//! Credential types for the `Authorization` header.

use base64::prelude::{Engine as _, BASE64_STANDARD};

/// Authentication scheme the server is configured for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorizationType {
    /// No authentication.
    #[default]
    Unused,
    Basic,
    Digest,
}

/// Username/password pair carried by a client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Decodes an `Authorization: Basic <base64>` header value.
    pub fn from_basic(header: &str) -> Option<Self> {
        let encoded = header.trim().strip_prefix("Basic ")?;
        let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
        let text = String::from_utf8(decoded).ok()?;
        let (username, password) = text.split_once(':')?;

        Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_basic_credentials() {
        // "admin:secret"
        let creds = Credentials::from_basic("Basic YWRtaW46c2VjcmV0").unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(Credentials::from_basic("Digest username=\"admin\"").is_none());
        assert!(Credentials::from_basic("Basic not-base64!").is_none());
        assert!(Credentials::from_basic("Basic bm9jb2xvbg==").is_none());
    }
}
