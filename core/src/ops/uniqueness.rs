//! Live-name uniqueness checks
//!
//! Two constraints, both scoped to live nodes only: name uniqueness among
//! siblings of the same `(filespace, parent)`, and name uniqueness among
//! root-level nodes of the same filespace. A soft-deleted node never blocks
//! reuse of its name. SQL treats NULLs as pairwise distinct, so a plain unique
//! index cannot cover the root-level case; both constraints are checked here
//! before any insert or move commits.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::error::{FilespaceError, Result};
use crate::infra::db::entities::node;

/// Fail with `NameConflict` if a live node named `name` already exists at the
/// given level. `parent_id: None` checks the root level of the filespace.
/// `exclude_id` skips the node itself when it is renamed in place.
pub async fn ensure_name_available<C: ConnectionTrait>(
	db: &C,
	filespace_id: i32,
	parent_id: Option<i32>,
	name: &str,
	exclude_id: Option<i32>,
) -> Result<()> {
	let mut query = node::Entity::find()
		.filter(node::Column::FilespaceId.eq(filespace_id))
		.filter(node::Column::Name.eq(name))
		.filter(node::Column::IsDeleted.eq(false));

	query = match parent_id {
		Some(parent_id) => query.filter(node::Column::ParentId.eq(parent_id)),
		None => query.filter(node::Column::ParentId.is_null()),
	};

	if let Some(exclude_id) = exclude_id {
		query = query.filter(node::Column::Id.ne(exclude_id));
	}

	if query.count(db).await? > 0 {
		return Err(FilespaceError::NameConflict(name.to_string()));
	}

	Ok(())
}
