use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document identifier, the `_id` of the source document.
pub type DocumentId = String;

/// Result of compiling a mutator: one inline script, serialized as
/// `{"script": "..."}` so it can be sent as an update body as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledUpdate {
    pub script: String,
}

/// Envelope of an update request body.
///
/// Full or partial documents are merged through `doc`; compiled mutators are
/// executed through `script`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdateBody {
    Doc { doc: Value },
    Script { script: String },
}

impl From<CompiledUpdate> for UpdateBody {
    fn from(compiled: CompiledUpdate) -> Self {
        UpdateBody::Script {
            script: compiled.script,
        }
    }
}

/// Addresses a single document: index, mapping type and id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTarget {
    pub index: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub id: DocumentId,
}

/// Create or replace a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRequest {
    #[serde(flatten)]
    pub target: DocTarget,
    pub body: Value,
}

/// Update an existing document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    #[serde(flatten)]
    pub target: DocTarget,
    pub body: UpdateBody,
}

/// Query an index/type pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub index: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub body: Value,
}
