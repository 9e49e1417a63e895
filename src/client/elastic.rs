use super::{IndexAdmin, IndexClient};
use crate::config::ClientConfig;
use crate::error::{DocsyncError, Result};
use crate::types::{DocTarget, IndexRequest, SearchRequest, UpdateRequest};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;

/// HTTP client for an Elasticsearch node.
#[derive(Debug, Clone)]
pub struct ElasticClient {
    base_url: Url,
    http_client: reqwest::Client,
}

impl ElasticClient {
    /// Build a client for `config.host`. A host without a scheme is reached
    /// over plain `http://`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = parse_host(&config.host)?;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocsyncError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch a stored document, `_source` included.
    pub async fn get(&self, target: &DocTarget) -> Result<Value> {
        let url = self.doc_url(target, None)?;
        self.send(Method::GET, url, None).await
    }

    fn doc_url(&self, target: &DocTarget, action: Option<&str>) -> Result<Url> {
        let mut segments = vec![
            target.index.as_str(),
            target.doc_type.as_str(),
            target.id.as_str(),
        ];
        segments.extend(action);
        self.url(&segments)
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DocsyncError::Config(format!("host '{}' cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Value> {
        tracing::trace!("{} {}", method, url);
        let mut request = self.http_client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read response body".into());
            return Err(DocsyncError::Http { status, body });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DocsyncError::Json(format!("failed to parse response JSON: {e}")))
    }
}

fn parse_host(host: &str) -> Result<Url> {
    let host = host.trim();
    if host.is_empty() {
        return Err(DocsyncError::Config("host cannot be empty".to_string()));
    }
    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };
    Url::parse(&with_scheme)
        .map_err(|e| DocsyncError::Config(format!("invalid host '{}': {}", host, e)))
}

#[async_trait]
impl IndexClient for ElasticClient {
    async fn index(&self, request: IndexRequest) -> Result<Value> {
        let url = self.doc_url(&request.target, None)?;
        self.send(Method::PUT, url, Some(&request.body)).await
    }

    async fn update(&self, request: UpdateRequest) -> Result<Value> {
        let url = self.doc_url(&request.target, Some("_update"))?;
        let body = serde_json::to_value(&request.body)?;
        self.send(Method::POST, url, Some(&body)).await
    }

    async fn search(&self, request: SearchRequest) -> Result<Value> {
        let url = self.url(&[&request.index, &request.doc_type, "_search"])?;
        self.send(Method::POST, url, Some(&request.body)).await
    }
}

#[async_trait]
impl IndexAdmin for ElasticClient {
    async fn create_index(&self, index: &str) -> Result<Value> {
        let url = self.url(&[index])?;
        self.send(Method::PUT, url, None).await
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        let url = self.url(&[index])?;
        let response = self.http_client.head(url).send().await?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(DocsyncError::Http {
                status,
                body: String::new(),
            }),
        }
    }

    async fn delete_index(&self, index: &str) -> Result<Value> {
        let url = self.url(&[index])?;
        self.send(Method::DELETE, url, None).await
    }
}
