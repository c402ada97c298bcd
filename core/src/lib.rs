//! Filespace core
//!
//! Durable hierarchical working storage for long-running agents. Each agent
//! owns one or more filespaces: named trees of directory and file nodes with
//! cached materialized paths, cascading soft delete/restore and deterministic
//! blob keys for file content. Byte storage and authorization live in
//! external collaborators; this crate owns the tree and its invariants.

pub mod domain;
pub mod error;
pub mod infra;
pub mod locks;
pub mod ops;
pub mod storage;

pub use domain::{DeleteState, NodeContent, NodeKind, NodeUpdate};
pub use error::{FilespaceError, Result};
pub use infra::db::Database;

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, IntoActiveModel};
use tracing::debug;
use uuid::Uuid;

use infra::db::entities::{filespace, node};
use locks::FilespaceLocks;
use ops::node_store::NodeStore;
use ops::object_key;
use ops::registry::FilespaceRegistry;
use storage::BlobStore;

/// Handle wiring the database, the blob store collaborator and the
/// per-filespace advisory locks behind the public filespace API.
///
/// Structural mutations (create, move/rename, trash, restore) take the
/// advisory lock for their filespace so cascades over overlapping subtrees
/// cannot interleave; reads and content attachment do not.
pub struct FilespaceCore {
	db: Arc<Database>,
	blob_store: Arc<dyn BlobStore>,
	locks: FilespaceLocks,
}

impl FilespaceCore {
	pub fn new(db: Arc<Database>, blob_store: Arc<dyn BlobStore>) -> Self {
		Self {
			db,
			blob_store,
			locks: FilespaceLocks::new(),
		}
	}

	pub fn db(&self) -> &Database {
		&self.db
	}

	// Filespaces

	pub async fn create_filespace(
		&self,
		owner_id: Uuid,
		name: &str,
	) -> Result<filespace::Model> {
		FilespaceRegistry::create(self.db.conn(), owner_id, name).await
	}

	/// Explicit default-filespace provisioning for the agent-creation
	/// workflow. Idempotent.
	pub async fn provision_default_filespace(&self, owner_id: Uuid) -> Result<filespace::Model> {
		FilespaceRegistry::provision_default(self.db.conn(), owner_id).await
	}

	pub async fn rename_filespace(
		&self,
		filespace_uuid: Uuid,
		new_name: &str,
	) -> Result<filespace::Model> {
		FilespaceRegistry::rename(self.db.conn(), filespace_uuid, new_name).await
	}

	pub async fn filespace(&self, filespace_uuid: Uuid) -> Result<filespace::Model> {
		FilespaceRegistry::get(self.db.conn(), filespace_uuid).await
	}

	pub async fn filespaces_for_owner(&self, owner_id: Uuid) -> Result<Vec<filespace::Model>> {
		FilespaceRegistry::list_for_owner(self.db.conn(), owner_id).await
	}

	// Nodes

	pub async fn create_directory(
		&self,
		filespace_uuid: Uuid,
		parent: Option<Uuid>,
		name: &str,
		created_by: Option<Uuid>,
	) -> Result<node::Model> {
		self.create_node(
			filespace_uuid,
			parent,
			NodeKind::Directory,
			name,
			None,
			created_by,
		)
		.await
	}

	pub async fn create_file(
		&self,
		filespace_uuid: Uuid,
		parent: Option<Uuid>,
		name: &str,
		content: Option<NodeContent>,
		created_by: Option<Uuid>,
	) -> Result<node::Model> {
		self.create_node(
			filespace_uuid,
			parent,
			NodeKind::File,
			name,
			content,
			created_by,
		)
		.await
	}

	pub async fn create_node(
		&self,
		filespace_uuid: Uuid,
		parent: Option<Uuid>,
		kind: NodeKind,
		name: &str,
		content: Option<NodeContent>,
		created_by: Option<Uuid>,
	) -> Result<node::Model> {
		let _guard = self.locks.acquire(filespace_uuid).await;
		NodeStore::create(
			self.db.conn(),
			filespace_uuid,
			parent,
			kind,
			name,
			content,
			created_by,
		)
		.await
	}

	pub async fn node(&self, node_uuid: Uuid) -> Result<node::Model> {
		NodeStore::get(self.db.conn(), node_uuid).await
	}

	pub async fn node_at_path(
		&self,
		filespace_uuid: Uuid,
		path: &str,
	) -> Result<Option<node::Model>> {
		NodeStore::find_by_path(self.db.conn(), filespace_uuid, path).await
	}

	pub async fn list_children(
		&self,
		filespace_uuid: Uuid,
		parent: Option<Uuid>,
	) -> Result<Vec<node::Model>> {
		NodeStore::list_children(self.db.conn(), filespace_uuid, parent).await
	}

	/// Apply a combined change set (rename/move and/or trash/restore) in one
	/// transaction.
	pub async fn update_node(&self, node_uuid: Uuid, changes: NodeUpdate) -> Result<node::Model> {
		let node = NodeStore::get(self.db.conn(), node_uuid).await?;
		let _guard = self.locks.acquire(self.filespace_uuid_of(&node).await?).await;
		NodeStore::update(self.db.conn(), node_uuid, changes).await
	}

	/// Move a node to a new location and/or name; `new_parent: None` targets
	/// the filespace root.
	pub async fn move_node(
		&self,
		node_uuid: Uuid,
		new_parent: Option<Uuid>,
		new_name: Option<String>,
	) -> Result<node::Model> {
		self.update_node(
			node_uuid,
			NodeUpdate {
				name: new_name,
				parent: Some(new_parent),
				trashed: None,
			},
		)
		.await
	}

	pub async fn rename_node(&self, node_uuid: Uuid, new_name: &str) -> Result<node::Model> {
		self.update_node(node_uuid, NodeUpdate::rename(new_name)).await
	}

	/// Soft-delete a node, cascading to its live subtree. Returns rows
	/// affected.
	pub async fn trash_node(&self, node_uuid: Uuid) -> Result<u64> {
		let node = NodeStore::get(self.db.conn(), node_uuid).await?;
		let _guard = self.locks.acquire(self.filespace_uuid_of(&node).await?).await;
		NodeStore::trash(self.db.conn(), node_uuid).await
	}

	/// Clear deleted state on a node and its trashed subtree. Returns rows
	/// affected.
	pub async fn restore_node(&self, node_uuid: Uuid) -> Result<u64> {
		let node = NodeStore::get(self.db.conn(), node_uuid).await?;
		let _guard = self.locks.acquire(self.filespace_uuid_of(&node).await?).await;
		NodeStore::restore(self.db.conn(), node_uuid).await
	}

	// Content

	/// Store bytes for a file node and commit its content metadata.
	///
	/// The blob write happens first; if it fails the node row is untouched
	/// and the error surfaces as `StorageError`. Orphaned blobs from the
	/// opposite failure order are an external reconciliation concern.
	pub async fn attach_content(
		&self,
		node_uuid: Uuid,
		bytes: &[u8],
		filename: Option<&str>,
		mime_type: Option<&str>,
	) -> Result<node::Model> {
		let node = NodeStore::get(self.db.conn(), node_uuid).await?;
		if node.is_directory() {
			return Err(FilespaceError::NotFound(format!(
				"no file node {}",
				node_uuid
			)));
		}

		let filespace_uuid = self.filespace_uuid_of(&node).await?;
		let key = object_key::current_object_key(filespace_uuid, &node, filename);

		self.blob_store
			.put(&key, bytes)
			.await
			.map_err(|e| FilespaceError::StorageError(e.to_string()))?;

		let checksum = blake3::hash(bytes).to_hex().to_string();
		debug!(node = %node.uuid, %key, size = bytes.len(), "attached content");

		let mut active = node.into_active_model();
		active.content_key = Set(Some(key));
		active.size_bytes = Set(Some(bytes.len() as i64));
		active.mime_type = Set(mime_type.map(str::to_string));
		active.checksum = Set(Some(checksum));
		active.updated_at = Set(Utc::now());

		Ok(active.update(self.db.conn()).await?)
	}

	/// Current blob key for a node's content: the stored key when content
	/// exists, otherwise the deterministic candidate.
	pub async fn current_object_key(
		&self,
		node_uuid: Uuid,
		filename: Option<&str>,
	) -> Result<String> {
		let node = NodeStore::get(self.db.conn(), node_uuid).await?;
		let filespace_uuid = self.filespace_uuid_of(&node).await?;
		Ok(object_key::current_object_key(filespace_uuid, &node, filename))
	}

	async fn filespace_uuid_of(&self, node: &node::Model) -> Result<Uuid> {
		filespace::Entity::find_by_id(node.filespace_id)
			.one(self.db.conn())
			.await?
			.map(|space| space.uuid)
			.ok_or_else(|| FilespaceError::NotFound(format!("filespace #{}", node.filespace_id)))
	}
}
