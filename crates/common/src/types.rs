use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Passage produced by the retrieval index, ranked by relevance.
///
/// Metadata is a free-form key/value map; the named accessors tolerate
/// absent keys and non-string values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub text: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl RetrievedPassage {
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), Value::String(value.into()));
        self
    }

    /// Look up a metadata field as a string, treating absence and
    /// non-string values the same way.
    pub fn metadata_str(&self, key: &str) -> Option<String> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    pub fn file_name(&self) -> Option<String> {
        self.metadata_str("file_name")
    }

    pub fn doc_link(&self) -> Option<String> {
        self.metadata_str("doc_link")
    }
}

/// Truncated slice of a retrieved passage, with provenance carried along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFragment {
    pub text: String,
    pub file_name: Option<String>,
    pub doc_link: Option<String>,
}
