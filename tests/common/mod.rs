#![allow(dead_code)]

use async_trait::async_trait;
use docsync::types::{IndexRequest, SearchRequest, UpdateRequest};
use docsync::{
    ClientConfig, DocsyncError, DocumentId, IdLookup, IndexClient, IndexUpdater, Result,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const INDEX: &str = "docsync-test-index";
pub const DOC_TYPE: &str = "docsync-test-type";

/// Index client that records every request it receives.
#[derive(Default)]
pub struct RecordingClient {
    pub indexed: Mutex<Vec<IndexRequest>>,
    pub updates: Mutex<Vec<UpdateRequest>>,
    pub searches: Mutex<Vec<SearchRequest>>,
    /// Updates of these ids fail with a 503.
    pub fail_ids: Vec<DocumentId>,
}

impl RecordingClient {
    pub fn failing(ids: &[&str]) -> Self {
        RecordingClient {
            fail_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..RecordingClient::default()
        }
    }

    pub fn updated_ids(&self) -> Vec<DocumentId> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.target.id.clone())
            .collect()
    }
}

#[async_trait]
impl IndexClient for RecordingClient {
    async fn index(&self, request: IndexRequest) -> Result<Value> {
        let id = request.target.id.clone();
        self.indexed.lock().unwrap().push(request);
        Ok(json!({"_id": id, "created": true}))
    }

    async fn update(&self, request: UpdateRequest) -> Result<Value> {
        let id = request.target.id.clone();
        self.updates.lock().unwrap().push(request);
        if self.fail_ids.contains(&id) {
            return Err(DocsyncError::Http {
                status: http::StatusCode::SERVICE_UNAVAILABLE,
                body: "unavailable".into(),
            });
        }
        Ok(json!({"_id": id, "result": "updated"}))
    }

    async fn search(&self, request: SearchRequest) -> Result<Value> {
        self.searches.lock().unwrap().push(request);
        Ok(json!({"hits": {"total": 0, "hits": []}}))
    }
}

/// Id lookup returning a fixed list and recording the selectors it saw.
#[derive(Default)]
pub struct StaticLookup {
    pub ids: Vec<DocumentId>,
    pub seen: Mutex<Vec<Value>>,
}

impl StaticLookup {
    pub fn new(ids: &[&str]) -> Arc<Self> {
        Arc::new(StaticLookup {
            ids: ids.iter().map(|s| s.to_string()).collect(),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl IdLookup for StaticLookup {
    async fn find_ids(&self, selector: &Value) -> Result<Vec<DocumentId>> {
        self.seen.lock().unwrap().push(selector.clone());
        Ok(self.ids.clone())
    }
}

pub fn defaults() -> ClientConfig {
    ClientConfig {
        index: Some(INDEX.to_string()),
        doc_type: Some(DOC_TYPE.to_string()),
        ..ClientConfig::default()
    }
}

pub fn updater(client: RecordingClient) -> IndexUpdater<RecordingClient> {
    IndexUpdater::new(client, defaults())
}
