use crate::client::IdLookup;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_HOST: &str = "localhost:9200";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const CONFIG_FILE: &str = "docsync.json";

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Connection settings and write defaults shared by every call made through
/// one client handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// Index used when a call does not name one.
    #[serde(default)]
    pub index: Option<String>,
    /// Mapping type used when a call does not name one.
    #[serde(default, rename = "type")]
    pub doc_type: Option<String>,
    #[serde(default = "default_timeout_secs", rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: default_host(),
            index: None,
            doc_type: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Load from `{dir}/docsync.json`, falling back to the `DOCSYNC_*`
    /// environment variables and then to defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<ClientConfig>(&content) {
                    Ok(config) => {
                        tracing::info!(
                            "Loaded client config from {}: host={}",
                            path.display(),
                            config.host
                        );
                        return config;
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse {}: {}, using defaults", CONFIG_FILE, e);
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to read {}: {}, using defaults", CONFIG_FILE, e);
                }
            }
        }

        Self::from_env()
    }

    /// `DOCSYNC_HOST`, `DOCSYNC_INDEX`, `DOCSYNC_TYPE` and
    /// `DOCSYNC_TIMEOUT_SECS`; unset or empty variables keep their defaults.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let timeout_secs = match non_empty("DOCSYNC_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Ignoring invalid DOCSYNC_TIMEOUT_SECS={:?}, using {}",
                    raw,
                    DEFAULT_TIMEOUT_SECS
                );
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        ClientConfig {
            host: non_empty("DOCSYNC_HOST").unwrap_or_else(default_host),
            index: non_empty("DOCSYNC_INDEX"),
            doc_type: non_empty("DOCSYNC_TYPE"),
            timeout_secs,
        }
    }
}

/// Per-call write options.
#[derive(Clone, Default)]
pub struct WriteConfig {
    /// Overrides [`ClientConfig::index`].
    pub index: Option<String>,
    /// Overrides [`ClientConfig::doc_type`].
    pub doc_type: Option<String>,
    /// Top-level fields mirrored into the index; `None` mirrors everything.
    pub fields_to_include: Option<Vec<String>>,
    /// Update every matched document instead of only the first.
    pub multi: bool,
    /// Resolves ids for selectors that do not name them.
    pub lookup: Option<Arc<dyn IdLookup>>,
}

impl WriteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn fields_to_include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields_to_include = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn lookup(mut self, lookup: Arc<dyn IdLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }
}

impl fmt::Debug for WriteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteConfig")
            .field("index", &self.index)
            .field("doc_type", &self.doc_type)
            .field("fields_to_include", &self.fields_to_include)
            .field("multi", &self.multi)
            .field("lookup", &self.lookup.is_some())
            .finish()
    }
}
