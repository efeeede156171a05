use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const CLIENT_PREFIX: &str = "thread-";
const SUFFIX_LEN: usize = 8;

/// Identifier of a conversation thread.
///
/// Ids received from the backend are kept verbatim; ids minted locally look
/// like `thread-1a2b3c4d`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh client-side id. No round-trip to the backend.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", CLIENT_PREFIX, &hex[..SUFFIX_LEN]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id has the shape produced by [`ThreadId::generate`]
    pub fn is_client_generated(&self) -> bool {
        self.0
            .strip_prefix(CLIENT_PREFIX)
            .map(|suffix| {
                suffix.len() == SUFFIX_LEN
                    && suffix.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
            })
            .unwrap_or(false)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_have_client_shape() {
        for _ in 0..100 {
            let id = ThreadId::generate();
            assert!(id.is_client_generated(), "bad id {}", id);
            assert_eq!(id.as_str().len(), CLIENT_PREFIX.len() + SUFFIX_LEN);
        }
    }

    #[test]
    fn test_shape_check_rejects_foreign_ids() {
        assert!(ThreadId::from("thread-aaaa1111").is_client_generated());
        assert!(!ThreadId::from("thread-AAAA1111").is_client_generated());
        assert!(!ThreadId::from("thread-aaaa111").is_client_generated());
        assert!(!ThreadId::from("thread-aaaa11112").is_client_generated());
        assert!(!ThreadId::from("chat-aaaa1111").is_client_generated());
    }

    #[test]
    fn test_deserializes_from_bare_string() {
        let ids: Vec<ThreadId> = serde_json::from_str(r#"["thread-aaaa1111","legacy"]"#).unwrap();
        assert_eq!(ids, vec![ThreadId::from("thread-aaaa1111"), ThreadId::from("legacy")]);
    }
}
