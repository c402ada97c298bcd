//! Per-filespace advisory locking
//!
//! Structural mutations on the same filespace must not interleave: two
//! concurrent cascades over overlapping subtrees can each commit a consistent
//! transaction yet leave the tree disagreeing with the path cache. The handle
//! in `lib.rs` takes this lock around every structural mutation; reads never
//! take it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct FilespaceLocks {
	inner: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl FilespaceLocks {
	pub fn new() -> Self {
		Self::default()
	}

	/// Acquire the advisory lock for a filespace, creating it on first use.
	pub async fn acquire(&self, filespace_uuid: Uuid) -> OwnedMutexGuard<()> {
		let lock = {
			let mut locks = self.inner.lock().await;
			locks
				.entry(filespace_uuid)
				.or_insert_with(|| Arc::new(Mutex::new(())))
				.clone()
		};

		lock.lock_owned().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn serializes_same_filespace() {
		let locks = Arc::new(FilespaceLocks::new());
		let filespace = Uuid::new_v4();

		let guard = locks.acquire(filespace).await;
		let contender = {
			let locks = locks.clone();
			tokio::spawn(async move { locks.acquire(filespace).await })
		};

		// The second acquire cannot complete while the first guard is held
		tokio::task::yield_now().await;
		assert!(!contender.is_finished());

		drop(guard);
		contender.await.unwrap();
	}

	#[tokio::test]
	async fn independent_filespaces_do_not_contend() {
		let locks = FilespaceLocks::new();
		let _a = locks.acquire(Uuid::new_v4()).await;
		let _b = locks.acquire(Uuid::new_v4()).await;
	}
}
