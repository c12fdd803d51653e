//! Authenticated user context.

use serde::{Deserialize, Serialize};

/// The authenticated user on whose behalf requests are made.
///
/// Token issuance is out of scope here; the credentials are produced by an
/// external login flow and merely carried along. A missing token means
/// requests go out without an `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Numeric backend user id.
    pub user_id: i64,
    /// Bearer token for the backend, when one was issued.
    #[serde(default)]
    pub token: Option<String>,
    /// Display name for front ends.
    #[serde(default = "default_nickname")]
    pub nickname: String,
}

impl Credentials {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            token: None,
            nickname: default_nickname(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

fn default_nickname() -> String {
    "You".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_with_defaults() {
        let credentials: Credentials = serde_json::from_str(r#"{"userId": 42}"#).unwrap();
        assert_eq!(credentials.user_id, 42);
        assert!(credentials.token.is_none());
        assert_eq!(credentials.nickname, "You");
    }

    #[test]
    fn builder_sets_token() {
        let credentials = Credentials::new(7).with_token("jwt");
        assert_eq!(credentials.token.as_deref(), Some("jwt"));
    }
}
