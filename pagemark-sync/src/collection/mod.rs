//! Remote outline collections.
//!
//! Provides the HTTP client for the publication API and an in-process
//! store with the same semantics.

pub mod http;
pub mod memory;
pub mod remote;

pub use http::{HttpCollectionConfig, HttpOutlineCollection};
pub use memory::MemoryCollection;
pub use remote::OutlineCollection;
