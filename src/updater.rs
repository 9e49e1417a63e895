//! Applies source-collection writes to the search index.

use crate::client::IndexClient;
use crate::compiler;
use crate::config::{ClientConfig, WriteConfig};
use crate::error::{DocsyncError, Result};
use crate::filter::{filter_document, filter_mutator};
use crate::mutator::Mutator;
use crate::selector::{extract_ids, ID_KEY};
use crate::types::{
    DocTarget, DocumentId, IndexRequest, SearchRequest, UpdateBody, UpdateRequest,
};
use serde_json::{json, Map, Value};
use std::borrow::Cow;

/// Why a partial update sent nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The allow-list removed every field of the mutator.
    NoMatchingFields,
    /// The mutator compiles to no statements, e.g. `{}` or an empty `$each`.
    EmptyUpdate,
    /// The selector matched no documents.
    NoDocuments,
}

/// Result of the update sent for one document.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub id: DocumentId,
    pub result: Result<Value>,
}

impl WriteOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    pub skipped: Option<SkipReason>,
    /// Compiled script, absent when the update was skipped.
    pub script: Option<String>,
    /// One entry per document written, in id order.
    pub outcomes: Vec<WriteOutcome>,
}

impl UpdateReport {
    fn skipped(reason: SkipReason) -> Self {
        UpdateReport {
            skipped: Some(reason),
            ..UpdateReport::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Collapse the report into the first failure, if any.
    pub fn into_result(self) -> Result<UpdateReport> {
        let first_failure = self.outcomes.iter().find_map(|o| match &o.result {
            Err(e) => Some(DocsyncError::WriteFailure {
                id: o.id.clone(),
                message: e.to_string(),
            }),
            Ok(_) => None,
        });
        match first_failure {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Mirrors writes made against a source collection into one search index.
///
/// Index and type default to the ones in the [`ClientConfig`] and can be
/// overridden per call through [`WriteConfig`].
pub struct IndexUpdater<C: IndexClient> {
    client: C,
    defaults: ClientConfig,
}

impl<C: IndexClient> IndexUpdater<C> {
    pub fn new(client: C, defaults: ClientConfig) -> Self {
        Self { client, defaults }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn defaults(&self) -> &ClientConfig {
        &self.defaults
    }

    /// Translate `mutator` into a script update and apply it to every
    /// document `selector` names.
    ///
    /// The mutator is filtered and compiled before any id is resolved, so an
    /// update with nothing to do never reaches the lookup or the index.
    ///
    /// Only the first document is updated unless `config.multi` is set.
    /// A failed write is recorded in the report and does not stop the
    /// writes after it.
    pub async fn partial_update(
        &self,
        selector: &Value,
        mutator: &Mutator,
        config: &WriteConfig,
    ) -> Result<UpdateReport> {
        let (index, doc_type) = self.resolve_target(config)?;

        let mutator = match &config.fields_to_include {
            Some(allowed) => Cow::Owned(filter_mutator(mutator, allowed)),
            None => Cow::Borrowed(mutator),
        };
        if mutator.is_empty() {
            let reason = if config.fields_to_include.is_some() {
                SkipReason::NoMatchingFields
            } else {
                SkipReason::EmptyUpdate
            };
            tracing::info!("skipping update of {}/{}: {:?}", index, doc_type, reason);
            return Ok(UpdateReport::skipped(reason));
        }

        let compiled = compiler::compile(&mutator)?;
        if compiled.script.is_empty() {
            tracing::info!("skipping update of {}/{}: empty script", index, doc_type);
            return Ok(UpdateReport::skipped(SkipReason::EmptyUpdate));
        }

        let mut ids = match extract_ids(selector) {
            Some(ids) => ids,
            None => match &config.lookup {
                Some(lookup) => lookup.find_ids(selector).await?,
                None => {
                    return Err(DocsyncError::Config(
                        "selector does not name document ids and no id lookup is configured"
                            .to_string(),
                    ))
                }
            },
        };

        if ids.is_empty() {
            tracing::info!("skipping update of {}/{}: no matching documents", index, doc_type);
            return Ok(UpdateReport::skipped(SkipReason::NoDocuments));
        }

        if ids.len() > 1 && !config.multi {
            tracing::info!(
                "{} documents matched without multi, updating only {}",
                ids.len(),
                ids[0]
            );
            ids.truncate(1);
        }

        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let request = UpdateRequest {
                target: DocTarget {
                    index: index.clone(),
                    doc_type: doc_type.clone(),
                    id: id.clone(),
                },
                body: UpdateBody::Script {
                    script: compiled.script.clone(),
                },
            };
            let result = self.client.update(request).await;
            if let Err(e) = &result {
                tracing::warn!("update of {}/{}/{} failed: {}", index, doc_type, id, e);
            }
            outcomes.push(WriteOutcome { id, result });
        }

        Ok(UpdateReport {
            skipped: None,
            script: Some(compiled.script),
            outcomes,
        })
    }

    /// Index a full document under its `_id`.
    pub async fn insert(&self, doc: &Value, config: &WriteConfig) -> Result<Value> {
        let (target, body) = self.prepare_document(doc, config)?;
        self.client
            .index(IndexRequest {
                target,
                body: Value::Object(body),
            })
            .await
    }

    /// Merge a document into the indexed one with the same `_id`.
    pub async fn update(&self, doc: &Value, config: &WriteConfig) -> Result<Value> {
        let (target, body) = self.prepare_document(doc, config)?;
        self.client
            .update(UpdateRequest {
                target,
                body: UpdateBody::Doc {
                    doc: Value::Object(body),
                },
            })
            .await
    }

    /// Run `query` against the index and return the raw response.
    pub async fn search(&self, query: &Value, config: &WriteConfig) -> Result<Value> {
        let (index, doc_type) = self.resolve_target(config)?;
        self.client
            .search(SearchRequest {
                index,
                doc_type,
                body: json!({ "query": query }),
            })
            .await
    }

    fn resolve_target(&self, config: &WriteConfig) -> Result<(String, String)> {
        let index = config
            .index
            .as_ref()
            .or(self.defaults.index.as_ref())
            .cloned()
            .ok_or_else(|| DocsyncError::Config("index is not set".to_string()))?;
        let doc_type = config
            .doc_type
            .as_ref()
            .or(self.defaults.doc_type.as_ref())
            .cloned()
            .ok_or_else(|| DocsyncError::Config("type is not set".to_string()))?;
        Ok((index, doc_type))
    }

    fn prepare_document(
        &self,
        doc: &Value,
        config: &WriteConfig,
    ) -> Result<(DocTarget, Map<String, Value>)> {
        let (index, doc_type) = self.resolve_target(config)?;
        let object = doc
            .as_object()
            .ok_or_else(|| DocsyncError::InvalidDocument("document must be an object".into()))?;
        let id = match object.get(ID_KEY) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(DocsyncError::MissingField(ID_KEY.to_string())),
        };
        let body = match &config.fields_to_include {
            Some(allowed) => filter_document(object, allowed),
            None => object.clone(),
        };
        Ok((
            DocTarget {
                index,
                doc_type,
                id,
            },
            body,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        updates: Mutex<Vec<UpdateRequest>>,
        fail_ids: Vec<String>,
    }

    #[async_trait]
    impl IndexClient for RecordingClient {
        async fn index(&self, _request: IndexRequest) -> Result<Value> {
            Ok(json!({"created": true}))
        }

        async fn update(&self, request: UpdateRequest) -> Result<Value> {
            let failing = self.fail_ids.contains(&request.target.id);
            self.updates.lock().unwrap().push(request);
            if failing {
                return Err(DocsyncError::Transport("connection reset".into()));
            }
            Ok(json!({"result": "updated"}))
        }

        async fn search(&self, _request: SearchRequest) -> Result<Value> {
            Ok(json!({"hits": {"hits": []}}))
        }
    }

    fn updater(client: RecordingClient) -> IndexUpdater<RecordingClient> {
        let defaults = ClientConfig {
            index: Some("people".into()),
            doc_type: Some("person".into()),
            ..ClientConfig::default()
        };
        IndexUpdater::new(client, defaults)
    }

    fn inc_score() -> Mutator {
        Mutator::from_json(&json!({"$inc": {"score": 1}})).unwrap()
    }

    #[tokio::test]
    async fn single_id_gets_one_script_update() {
        let updater = updater(RecordingClient::default());
        let report = updater
            .partial_update(&json!({"_id": "a"}), &inc_score(), &WriteConfig::new())
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.script.as_deref(), Some("ctx._source.score+=1"));
        let updates = updater.client().updates.lock().unwrap();
        assert_eq!(updates[0].target.id, "a");
        assert_eq!(updates[0].target.index, "people");
        assert_eq!(
            updates[0].body,
            UpdateBody::Script {
                script: "ctx._source.score+=1".into()
            }
        );
    }

    #[tokio::test]
    async fn call_config_overrides_defaults() {
        let updater = updater(RecordingClient::default());
        let config = WriteConfig::new().index("archive").doc_type("old");
        updater
            .partial_update(&json!({"_id": "a"}), &inc_score(), &config)
            .await
            .unwrap();

        let updates = updater.client().updates.lock().unwrap();
        assert_eq!(updates[0].target.index, "archive");
        assert_eq!(updates[0].target.doc_type, "old");
    }

    #[tokio::test]
    async fn missing_index_is_a_config_error() {
        let updater = IndexUpdater::new(RecordingClient::default(), ClientConfig::default());
        let err = updater
            .partial_update(&json!({"_id": "a"}), &inc_score(), &WriteConfig::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocsyncError::Config(_)));
    }

    #[tokio::test]
    async fn compile_error_sends_nothing() {
        let updater = updater(RecordingClient::default());
        let mutator = Mutator::from_json(&json!({"$set": {"grades.$": 35}})).unwrap();
        let err = updater
            .partial_update(&json!({"_id": "a"}), &mutator, &WriteConfig::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocsyncError::UnsupportedPath(_)));
        assert!(updater.client().updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failures_are_isolated_per_id() {
        let client = RecordingClient {
            fail_ids: vec!["b".into()],
            ..RecordingClient::default()
        };
        let updater = updater(client);
        let report = updater
            .partial_update(
                &json!({"_id": {"$in": ["a", "b", "c"]}}),
                &inc_score(),
                &WriteConfig::new().multi(true),
            )
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(updater.client().updates.lock().unwrap().len(), 3);
        match report.into_result() {
            Err(DocsyncError::WriteFailure { id, .. }) => assert_eq!(id, "b"),
            other => panic!("expected WriteFailure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_in_list_is_a_noop() {
        let updater = updater(RecordingClient::default());
        let report = updater
            .partial_update(&json!({"_id": {"$in": []}}), &inc_score(), &WriteConfig::new())
            .await
            .unwrap();
        assert!(report.is_noop());
        assert_eq!(report.skipped, Some(SkipReason::NoDocuments));
        assert!(report.script.is_none());
    }

    #[tokio::test]
    async fn insert_requires_an_id() {
        let updater = updater(RecordingClient::default());
        let err = updater
            .insert(&json!({"score": 1}), &WriteConfig::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocsyncError::MissingField(f) if f == "_id"));
    }

    #[tokio::test]
    async fn non_object_document_is_rejected() {
        let updater = updater(RecordingClient::default());
        let err = updater
            .update(&json!(["a"]), &WriteConfig::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DocsyncError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn update_sends_doc_envelope() {
        let updater = updater(RecordingClient::default());
        updater
            .update(
                &json!({"_id": 7, "score": 10, "secret": "x"}),
                &WriteConfig::new().fields_to_include(["score"]),
            )
            .await
            .unwrap();

        let updates = updater.client().updates.lock().unwrap();
        assert_eq!(updates[0].target.id, "7");
        assert_eq!(
            updates[0].body,
            UpdateBody::Doc {
                doc: json!({"_id": 7, "score": 10})
            }
        );
    }
}
