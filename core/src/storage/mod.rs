//! Blob store collaborator
//!
//! Physical byte storage lives outside this crate. Node metadata is computed
//! and validated before the store is invoked, and a store failure surfaces as
//! `StorageError` without touching node rows; metadata and blob state are
//! independently recoverable.

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;

pub use memory::MemoryBlobStore;

/// Blob store collaborator failure
#[derive(Error, Debug)]
#[error("{0}")]
pub struct BlobStoreError(pub String);

/// External blob storage, keyed by the object keys this crate derives.
#[async_trait]
pub trait BlobStore: Send + Sync {
	async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), BlobStoreError>;
	async fn delete(&self, key: &str) -> Result<(), BlobStoreError>;
}
