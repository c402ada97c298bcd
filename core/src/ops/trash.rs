//! Soft-delete cascading
//!
//! Trashing a directory marks its entire live subtree deleted; restore is the
//! mirror operation. Descendants are located by cached-path prefix match, so
//! callers mutating structure and deletion state in one operation must land
//! the path rewrite first: a cascade against stale paths silently misses
//! nodes. Both cascades are single set-based updates.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::debug;

use crate::error::Result;
use crate::infra::db::entities::node;
use crate::ops::path_cache::descendant_filter;

/// Mark `node` and every live descendant deleted at `now`. Returns the number
/// of rows affected.
///
/// Idempotent: re-trashing an already-deleted node contributes nothing for the
/// node itself but still sweeps up any descendant left live by a partial prior
/// operation.
pub async fn trash<C: ConnectionTrait>(
	db: &C,
	node: &node::Model,
	now: DateTime<Utc>,
) -> Result<u64> {
	let mut affected = 0;

	if !node.is_deleted {
		affected += node::Entity::update_many()
			.filter(node::Column::Id.eq(node.id))
			.set(node::ActiveModel {
				is_deleted: Set(true),
				deleted_at: Set(Some(now)),
				updated_at: Set(now),
				..Default::default()
			})
			.exec(db)
			.await?
			.rows_affected;
	}

	if node.is_directory() {
		affected += node::Entity::update_many()
			.filter(node::Column::FilespaceId.eq(node.filespace_id))
			.filter(node::Column::IsDeleted.eq(false))
			.filter(descendant_filter(&node.path))
			.set(node::ActiveModel {
				is_deleted: Set(true),
				deleted_at: Set(Some(now)),
				updated_at: Set(now),
				..Default::default()
			})
			.exec(db)
			.await?
			.rows_affected;
	}

	debug!(node = %node.uuid, path = %node.path, affected, "trashed subtree");

	Ok(affected)
}

/// Clear the deleted flag and timestamp on `node` and, for directories, on
/// every descendant currently marked deleted. Returns the number of rows
/// affected.
///
/// Restoring a node whose ancestor is still deleted is permitted; the result
/// stays unreachable through live traversal until the ancestor is restored.
pub async fn restore<C: ConnectionTrait>(db: &C, node: &node::Model) -> Result<u64> {
	let now = Utc::now();
	let mut affected = 0;

	if node.is_deleted {
		affected += node::Entity::update_many()
			.filter(node::Column::Id.eq(node.id))
			.set(node::ActiveModel {
				is_deleted: Set(false),
				deleted_at: Set(None),
				updated_at: Set(now),
				..Default::default()
			})
			.exec(db)
			.await?
			.rows_affected;
	}

	if node.is_directory() {
		affected += node::Entity::update_many()
			.filter(node::Column::FilespaceId.eq(node.filespace_id))
			.filter(node::Column::IsDeleted.eq(true))
			.filter(descendant_filter(&node.path))
			.set(node::ActiveModel {
				is_deleted: Set(false),
				deleted_at: Set(None),
				updated_at: Set(now),
				..Default::default()
			})
			.exec(db)
			.await?
			.rows_affected;
	}

	debug!(node = %node.uuid, path = %node.path, affected, "restored subtree");

	Ok(affected)
}
