//! Outline sync for Pagemark.
//!
//! Persists outline trees to a remote collection that only supports point
//! create/update/delete/list.
//!
//! ## Components
//!
//! - **Collection**: the remote store ([`OutlineCollection`]), over HTTP or in memory
//! - **Engine**: replace, save and publish flows ([`SyncEngine`])
//! - **Session**: per-session caches and draft routing ([`EditorSession`])
//!
//! # Example
//!
//! ```
//! use pagemark_sync::{MemoryCollection, SyncConfig, SyncEngine};
//! use std::sync::Arc;
//!
//! let engine = SyncEngine::new(Arc::new(MemoryCollection::new()), SyncConfig::default());
//! assert_eq!(engine.collection().provider_name(), "Memory");
//! ```

pub mod collection;
mod engine;
mod error;
mod session;

pub use collection::{
    HttpCollectionConfig, HttpOutlineCollection, MemoryCollection, OutlineCollection,
};
pub use engine::{LanguageOutcome, PublishReport, SyncConfig, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use session::{EditorSession, SaveOutcome};
