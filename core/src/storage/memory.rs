//! In-memory blob store for tests and local development

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{BlobStore, BlobStoreError};

#[derive(Default)]
pub struct MemoryBlobStore {
	objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
		self.objects.lock().await.get(key).cloned()
	}

	pub async fn contains(&self, key: &str) -> bool {
		self.objects.lock().await.contains_key(key)
	}

	pub async fn len(&self) -> usize {
		self.objects.lock().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.objects.lock().await.is_empty()
	}
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
	async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), BlobStoreError> {
		self.objects
			.lock()
			.await
			.insert(key.to_string(), bytes.to_vec());
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
		self.objects.lock().await.remove(key);
		Ok(())
	}
}
