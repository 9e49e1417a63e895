//! The index client seam.
//!
//! [`IndexClient`] is everything the updater needs from a search backend;
//! [`IndexAdmin`] covers index lifecycle calls used by setup code and tests.
//! [`ElasticClient`] implements both over Elasticsearch's REST API.

pub mod elastic;

pub use elastic::ElasticClient;

use crate::error::Result;
use crate::types::{DocumentId, IndexRequest, SearchRequest, UpdateRequest};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Create or replace a document. Returns the backend's response.
    async fn index(&self, request: IndexRequest) -> Result<Value>;

    /// Apply a `doc` merge or a `script` to an existing document.
    async fn update(&self, request: UpdateRequest) -> Result<Value>;

    async fn search(&self, request: SearchRequest) -> Result<Value>;
}

#[async_trait]
pub trait IndexAdmin: Send + Sync {
    async fn create_index(&self, index: &str) -> Result<Value>;

    async fn index_exists(&self, index: &str) -> Result<bool>;

    async fn delete_index(&self, index: &str) -> Result<Value>;
}

/// Resolves document ids for a selector that does not name them directly,
/// typically by querying the source collection.
#[async_trait]
pub trait IdLookup: Send + Sync {
    async fn find_ids(&self, selector: &Value) -> Result<Vec<DocumentId>>;
}

#[async_trait]
impl<T: IndexClient + ?Sized> IndexClient for std::sync::Arc<T> {
    async fn index(&self, request: IndexRequest) -> Result<Value> {
        (**self).index(request).await
    }

    async fn update(&self, request: UpdateRequest) -> Result<Value> {
        (**self).update(request).await
    }

    async fn search(&self, request: SearchRequest) -> Result<Value> {
        (**self).search(request).await
    }
}
