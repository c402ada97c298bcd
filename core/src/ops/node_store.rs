//! Node store
//!
//! Owns node identity and validates every structural mutation (create,
//! rename/move, trash, restore). Each mutation runs inside a single
//! transaction so path-cache rewrites, cascades and uniqueness checks are
//! observed as one unit; callers never see a half-updated subtree.

use chrono::Utc;
use sea_orm::{
	ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
	DatabaseTransaction, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{validate_name, NodeContent, NodeKind, NodeUpdate};
use crate::error::{FilespaceError, Result};
use crate::infra::db::entities::node;
use crate::ops::registry::FilespaceRegistry;
use crate::ops::{path_cache, trash, uniqueness};

pub struct NodeStore;

impl NodeStore {
	/// Create a node. Validation order: name validity, then parent
	/// same-filespace-and-directory, then live-name uniqueness at the target
	/// level. Directories never carry content attributes; any passed for a
	/// directory are stripped before insert.
	pub async fn create(
		db: &DatabaseConnection,
		filespace_uuid: Uuid,
		parent: Option<Uuid>,
		kind: NodeKind,
		name: &str,
		content: Option<NodeContent>,
		created_by: Option<Uuid>,
	) -> Result<node::Model> {
		validate_name(name)?;

		let txn = db.begin().await?;
		let result =
			Self::create_in_txn(&txn, filespace_uuid, parent, kind, name, content, created_by)
				.await;

		match result {
			Ok(model) => {
				txn.commit().await?;
				Ok(model)
			}
			Err(e) => {
				let _ = txn.rollback().await;
				Err(e)
			}
		}
	}

	async fn create_in_txn(
		txn: &DatabaseTransaction,
		filespace_uuid: Uuid,
		parent: Option<Uuid>,
		kind: NodeKind,
		name: &str,
		content: Option<NodeContent>,
		created_by: Option<Uuid>,
	) -> Result<node::Model> {
		let space = FilespaceRegistry::get(txn, filespace_uuid).await?;

		let parent_row = match parent {
			Some(parent_uuid) => Some(Self::resolve_parent(txn, space.id, parent_uuid).await?),
			None => None,
		};
		let parent_id = parent_row.as_ref().map(|p| p.id);

		uniqueness::ensure_name_available(txn, space.id, parent_id, name, None).await?;

		let content = match kind {
			NodeKind::Directory => NodeContent::default(),
			NodeKind::File => content.unwrap_or_default(),
		};

		let path = path_cache::join_path(parent_row.as_ref().map(|p| p.path.as_str()), name);
		let now = Utc::now();

		let model = node::ActiveModel {
			uuid: Set(Uuid::new_v4()),
			filespace_id: Set(space.id),
			parent_id: Set(parent_id),
			kind: Set(kind.into()),
			name: Set(name.to_string()),
			path: Set(path),
			content_key: Set(content.content_key),
			size_bytes: Set(content.size_bytes),
			mime_type: Set(content.mime_type),
			checksum: Set(content.checksum),
			created_by: Set(created_by),
			is_deleted: Set(false),
			deleted_at: Set(None),
			created_at: Set(now),
			updated_at: Set(now),
			..Default::default()
		}
		.insert(txn)
		.await?;

		debug!(node = %model.uuid, path = %model.path, "created node");

		Ok(model)
	}

	/// Fetch a node by UUID
	pub async fn get<C: ConnectionTrait>(db: &C, node_uuid: Uuid) -> Result<node::Model> {
		node::Entity::find()
			.filter(node::Column::Uuid.eq(node_uuid))
			.one(db)
			.await?
			.ok_or_else(|| FilespaceError::NotFound(format!("node {}", node_uuid)))
	}

	/// Look a live node up by its cached absolute path
	pub async fn find_by_path<C: ConnectionTrait>(
		db: &C,
		filespace_uuid: Uuid,
		path: &str,
	) -> Result<Option<node::Model>> {
		let space = FilespaceRegistry::get(db, filespace_uuid).await?;

		Ok(node::Entity::find()
			.filter(node::Column::FilespaceId.eq(space.id))
			.filter(node::Column::Path.eq(path))
			.filter(node::Column::IsDeleted.eq(false))
			.one(db)
			.await?)
	}

	/// List the live children of a directory, or of the filespace root when
	/// `parent` is `None`. Directories sort before files, then by name.
	pub async fn list_children<C: ConnectionTrait>(
		db: &C,
		filespace_uuid: Uuid,
		parent: Option<Uuid>,
	) -> Result<Vec<node::Model>> {
		let space = FilespaceRegistry::get(db, filespace_uuid).await?;

		let mut query = node::Entity::find()
			.filter(node::Column::FilespaceId.eq(space.id))
			.filter(node::Column::IsDeleted.eq(false));

		query = match parent {
			Some(parent_uuid) => {
				let parent_row = Self::resolve_parent(db, space.id, parent_uuid).await?;
				query.filter(node::Column::ParentId.eq(parent_row.id))
			}
			None => query.filter(node::Column::ParentId.is_null()),
		};

		// Directory kind (1) sorts above File (0)
		Ok(query
			.order_by_desc(node::Column::Kind)
			.order_by_asc(node::Column::Name)
			.all(db)
			.await?)
	}

	/// Apply a change set to a node in one transaction: rename and/or move,
	/// optionally followed by the trash or restore cascade.
	///
	/// Validation order matches `create`, plus the cycle check when the parent
	/// changes. On any validation failure the stored `parent`/`path` are left
	/// untouched.
	pub async fn update(
		db: &DatabaseConnection,
		node_uuid: Uuid,
		changes: NodeUpdate,
	) -> Result<node::Model> {
		let txn = db.begin().await?;
		let result = Self::update_in_txn(&txn, node_uuid, changes).await;

		match result {
			Ok(model) => {
				txn.commit().await?;
				Ok(model)
			}
			Err(e) => {
				let _ = txn.rollback().await;
				Err(e)
			}
		}
	}

	async fn update_in_txn(
		txn: &DatabaseTransaction,
		node_uuid: Uuid,
		changes: NodeUpdate,
	) -> Result<node::Model> {
		let current = Self::get(txn, node_uuid).await?;

		let new_name = match changes.name {
			Some(name) if name != current.name => {
				validate_name(&name)?;
				Some(name)
			}
			_ => None,
		};

		// None = keep the current parent; Some(None) = move to the root;
		// Some(Some(row)) = move under a new directory.
		let target_parent: Option<Option<node::Model>> = match changes.parent {
			None => None,
			Some(None) => current.parent_id.is_some().then_some(None),
			Some(Some(parent_uuid)) => {
				let row = Self::resolve_parent(txn, current.filespace_id, parent_uuid).await?;
				(current.parent_id != Some(row.id)).then_some(Some(row))
			}
		};

		let mut updated = current.clone();

		if new_name.is_some() || target_parent.is_some() {
			if let Some(Some(parent_row)) = &target_parent {
				Self::ensure_no_cycle(txn, &current, parent_row).await?;
			}

			let final_name = new_name.unwrap_or_else(|| current.name.clone());
			let final_parent_id = match &target_parent {
				None => current.parent_id,
				Some(None) => None,
				Some(Some(row)) => Some(row.id),
			};

			uniqueness::ensure_name_available(
				txn,
				current.filespace_id,
				final_parent_id,
				&final_name,
				Some(current.id),
			)
			.await?;

			let parent_path = match &target_parent {
				None => Self::parent_path_of(&current).map(str::to_string),
				Some(None) => None,
				Some(Some(row)) => Some(row.path.clone()),
			};
			let old_path = current.path.clone();
			let new_path = path_cache::join_path(parent_path.as_deref(), &final_name);

			let mut active = current.clone().into_active_model();
			active.name = Set(final_name);
			active.parent_id = Set(final_parent_id);
			active.path = Set(new_path.clone());
			active.updated_at = Set(Utc::now());
			updated = active.update(txn).await?;

			// The deletion cascade below locates descendants by their cached
			// paths; the prefix rewrite must land before it runs or every
			// descendant of a renamed directory is silently missed.
			if updated.is_directory() && old_path != new_path {
				let rewritten = path_cache::rewrite_descendant_paths(
					txn,
					updated.filespace_id,
					&old_path,
					&new_path,
				)
				.await?;
				debug!(
					node = %updated.uuid,
					%old_path,
					%new_path,
					rewritten,
					"rewrote descendant paths"
				);
			}
		}

		if let Some(trashed) = changes.trashed {
			if trashed {
				trash::trash(txn, &updated, Utc::now()).await?;
			} else {
				trash::restore(txn, &updated).await?;
			}
			updated = Self::get(txn, node_uuid).await?;
		}

		Ok(updated)
	}

	/// Move a node to a new location and/or name. `new_parent: None` moves the
	/// node to the filespace root.
	pub async fn move_node(
		db: &DatabaseConnection,
		node_uuid: Uuid,
		new_parent: Option<Uuid>,
		new_name: Option<String>,
	) -> Result<node::Model> {
		Self::update(
			db,
			node_uuid,
			NodeUpdate {
				name: new_name,
				parent: Some(new_parent),
				trashed: None,
			},
		)
		.await
	}

	/// Rename a node in place
	pub async fn rename(
		db: &DatabaseConnection,
		node_uuid: Uuid,
		new_name: &str,
	) -> Result<node::Model> {
		Self::update(db, node_uuid, NodeUpdate::rename(new_name)).await
	}

	/// Soft-delete a node and cascade to its live subtree. Returns the number
	/// of rows affected.
	pub async fn trash(db: &DatabaseConnection, node_uuid: Uuid) -> Result<u64> {
		let txn = db.begin().await?;
		let result = match Self::get(&txn, node_uuid).await {
			Ok(node) => trash::trash(&txn, &node, Utc::now()).await,
			Err(e) => Err(e),
		};

		match result {
			Ok(affected) => {
				txn.commit().await?;
				Ok(affected)
			}
			Err(e) => {
				let _ = txn.rollback().await;
				Err(e)
			}
		}
	}

	/// Clear deleted state on a node and its trashed subtree. Returns the
	/// number of rows affected.
	pub async fn restore(db: &DatabaseConnection, node_uuid: Uuid) -> Result<u64> {
		let txn = db.begin().await?;
		let result = match Self::get(&txn, node_uuid).await {
			Ok(node) => trash::restore(&txn, &node).await,
			Err(e) => Err(e),
		};

		match result {
			Ok(affected) => {
				txn.commit().await?;
				Ok(affected)
			}
			Err(e) => {
				let _ = txn.rollback().await;
				Err(e)
			}
		}
	}

	/// Resolve a proposed parent: it must exist, live in the same filespace
	/// and be a directory.
	async fn resolve_parent<C: ConnectionTrait>(
		db: &C,
		filespace_id: i32,
		parent_uuid: Uuid,
	) -> Result<node::Model> {
		let parent = node::Entity::find()
			.filter(node::Column::Uuid.eq(parent_uuid))
			.one(db)
			.await?
			.ok_or_else(|| FilespaceError::InvalidParent(format!("no node {}", parent_uuid)))?;

		if parent.filespace_id != filespace_id {
			return Err(FilespaceError::InvalidParent(format!(
				"{} belongs to another filespace",
				parent_uuid
			)));
		}
		if !parent.is_directory() {
			return Err(FilespaceError::InvalidParent(format!(
				"{} is not a directory",
				parent.path
			)));
		}

		Ok(parent)
	}

	/// Walk the proposed parent's ancestor chain; if the node being moved
	/// appears in it (including as the proposed parent itself), the move would
	/// create a cycle. O(depth) per check.
	async fn ensure_no_cycle(
		txn: &DatabaseTransaction,
		node: &node::Model,
		proposed_parent: &node::Model,
	) -> Result<()> {
		let mut cursor = Some(proposed_parent.clone());

		while let Some(ancestor) = cursor {
			if ancestor.id == node.id {
				return Err(FilespaceError::CycleDetected);
			}
			cursor = match ancestor.parent_id {
				Some(parent_id) => node::Entity::find_by_id(parent_id).one(txn).await?,
				None => None,
			};
		}

		Ok(())
	}

	/// Parent portion of a node's cached path; `None` for root-level nodes.
	fn parent_path_of(node: &node::Model) -> Option<&str> {
		match node.path.rfind('/') {
			Some(0) | None => None,
			Some(idx) => Some(&node.path[..idx]),
		}
	}
}
