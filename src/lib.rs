//! Mirror document-store writes into a search index.
//!
//! A [`Mutator`] (`{"$set": {...}, "$inc": {...}}`) is compiled into one
//! inline update script and applied by [`IndexUpdater`] to every document a
//! selector names.

pub mod client;
pub mod compiler;
pub mod config;
pub mod error;
pub mod filter;
pub mod literal;
pub mod mutator;
pub mod path;
pub mod selector;
pub mod transform;
pub mod types;
pub mod updater;

pub use client::{ElasticClient, IdLookup, IndexAdmin, IndexClient};
pub use compiler::{compile, compile_json};
pub use config::{ClientConfig, WriteConfig};
pub use error::{DocsyncError, Result};
pub use mutator::{Mutator, Operand, Operation, Operator};
pub use selector::extract_ids;
pub use types::{CompiledUpdate, DocTarget, DocumentId, UpdateBody};
pub use updater::{IndexUpdater, SkipReason, UpdateReport, WriteOutcome};
