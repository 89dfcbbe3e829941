use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whatever identity the client asserts when requesting a token. Only `email`
/// has meaning to the server; other attributes are carried through verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IdentityClaim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[cfg(test)]
impl IdentityClaim {
    pub fn for_email(email: &str) -> Self {
        IdentityClaim {
            email: Some(email.to_string()),
            attributes: Map::new(),
        }
    }
}

/// Signed token payload: the identity claim plus registered time claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: IdentityClaim,
    pub iat: i64, // Issued at, seconds since epoch
    pub exp: i64, // Expiry, seconds since epoch
}

impl Claims {
    pub fn email(&self) -> Option<&str> {
        self.identity.email.as_deref()
    }
}
