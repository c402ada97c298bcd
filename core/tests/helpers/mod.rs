//! Shared test environment: tempdir-backed SQLite database with migrations
//! applied and a core handle over an in-memory blob store.

#![allow(dead_code)]

use std::sync::Arc;

use filespace_core::storage::MemoryBlobStore;
use filespace_core::{Database, FilespaceCore};
use tempfile::TempDir;

pub struct TestEnv {
	// Keeps the database file alive for the duration of the test
	_data_dir: TempDir,
	pub core: FilespaceCore,
	pub blob_store: Arc<MemoryBlobStore>,
}

pub async fn setup() -> TestEnv {
	let data_dir = TempDir::new().expect("create temp dir");
	let db = Database::create(&data_dir.path().join("filespace.db"))
		.await
		.expect("create database");
	db.migrate().await.expect("run migrations");

	let blob_store = Arc::new(MemoryBlobStore::new());
	let core = FilespaceCore::new(Arc::new(db), blob_store.clone());

	TestEnv {
		_data_dir: data_dir,
		core,
		blob_store,
	}
}
