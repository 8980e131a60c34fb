use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of a model installed on the runner, e.g. `llama3.1:8b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelName(String);

impl ModelName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Installed names carry tags and quantisation suffixes, so readiness
    /// is a prefix match against the expected model.
    pub fn matches_prefix(&self, expected: &ModelName) -> bool {
        self.0.starts_with(expected.as_str())
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Parse a listing payload.  Only an array made entirely of strings is
/// well-formed; anything else returns `None`.
pub fn parse_listing(content: &Value) -> Option<Vec<ModelName>> {
    content
        .as_array()?
        .iter()
        .map(|entry| entry.as_str().map(ModelName::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefix_match_accepts_tagged_names() {
        let expected = ModelName::from("llama3.1:8b");
        assert!(ModelName::from("llama3.1:8b").matches_prefix(&expected));
        assert!(ModelName::from("llama3.1:8b-instruct-q4_0").matches_prefix(&expected));
        assert!(!ModelName::from("llama3:8b").matches_prefix(&expected));
    }

    #[test]
    fn listing_keeps_order() {
        let names = parse_listing(&json!(["b", "a", "c"])).unwrap();
        let names: Vec<&str> = names.iter().map(ModelName::as_str).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn empty_array_is_well_formed() {
        assert_eq!(parse_listing(&json!([])), Some(vec![]));
    }

    #[test]
    fn non_sequence_payloads_are_malformed() {
        for content in [
            json!(null),
            json!("llama3.1:8b"),
            json!({"models": ["llama3.1:8b"]}),
            json!(42),
        ] {
            assert_eq!(parse_listing(&content), None, "{content}");
        }
    }

    #[test]
    fn array_with_non_string_entry_is_malformed() {
        assert_eq!(parse_listing(&json!(["llama3.1:8b", 7])), None);
    }
}
