//! Filespace registry
//!
//! Top-level namespace container: one filespace per owner-provided name.
//! Access control is the caller's concern; any call reaching this layer is
//! trusted to have been authorized already.

use chrono::Utc;
use sea_orm::{
	ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
	QueryFilter, QueryOrder,
};
use tracing::info;
use uuid::Uuid;

use crate::error::{FilespaceError, Result};
use crate::infra::db::entities::filespace;

/// Name of the filespace provisioned for every new agent
pub const DEFAULT_FILESPACE_NAME: &str = "workspace";

pub struct FilespaceRegistry;

impl FilespaceRegistry {
	/// Create a filespace for an owner. Fails with `DuplicateName` if the
	/// owner already has one by that name.
	pub async fn create<C: ConnectionTrait>(
		db: &C,
		owner_id: Uuid,
		name: &str,
	) -> Result<filespace::Model> {
		let name = name.trim();
		if name.is_empty() {
			return Err(FilespaceError::InvalidName(name.to_string()));
		}

		Self::ensure_name_available(db, owner_id, name, None).await?;

		let now = Utc::now();
		let model = filespace::ActiveModel {
			uuid: Set(Uuid::new_v4()),
			name: Set(name.to_string()),
			owner_id: Set(owner_id),
			created_at: Set(now),
			updated_at: Set(now),
			..Default::default()
		}
		.insert(db)
		.await?;

		info!(filespace = %model.uuid, %owner_id, name, "created filespace");

		Ok(model)
	}

	/// Fetch a filespace by UUID
	pub async fn get<C: ConnectionTrait>(db: &C, filespace_uuid: Uuid) -> Result<filespace::Model> {
		filespace::Entity::find()
			.filter(filespace::Column::Uuid.eq(filespace_uuid))
			.one(db)
			.await?
			.ok_or_else(|| FilespaceError::NotFound(format!("filespace {}", filespace_uuid)))
	}

	/// All filespaces belonging to an owner, by name
	pub async fn list_for_owner<C: ConnectionTrait>(
		db: &C,
		owner_id: Uuid,
	) -> Result<Vec<filespace::Model>> {
		Ok(filespace::Entity::find()
			.filter(filespace::Column::OwnerId.eq(owner_id))
			.order_by_asc(filespace::Column::Name)
			.all(db)
			.await?)
	}

	/// Rename a filespace. The only mutation a filespace supports.
	pub async fn rename<C: ConnectionTrait>(
		db: &C,
		filespace_uuid: Uuid,
		new_name: &str,
	) -> Result<filespace::Model> {
		let new_name = new_name.trim();
		if new_name.is_empty() {
			return Err(FilespaceError::InvalidName(new_name.to_string()));
		}

		let space = Self::get(db, filespace_uuid).await?;
		if space.name == new_name {
			return Ok(space);
		}

		Self::ensure_name_available(db, space.owner_id, new_name, Some(space.id)).await?;

		let mut active: filespace::ActiveModel = space.into();
		active.name = Set(new_name.to_string());
		active.updated_at = Set(Utc::now());

		Ok(active.update(db).await?)
	}

	/// Provision the default filespace for a freshly created agent.
	///
	/// Called explicitly from the agent-creation workflow rather than fired
	/// from a creation listener, so the side effect stays visible in the call
	/// graph. Idempotent: returns the existing default if the owner already
	/// has one.
	pub async fn provision_default<C: ConnectionTrait>(
		db: &C,
		owner_id: Uuid,
	) -> Result<filespace::Model> {
		let existing = filespace::Entity::find()
			.filter(filespace::Column::OwnerId.eq(owner_id))
			.filter(filespace::Column::Name.eq(DEFAULT_FILESPACE_NAME))
			.one(db)
			.await?;

		match existing {
			Some(space) => Ok(space),
			None => Self::create(db, owner_id, DEFAULT_FILESPACE_NAME).await,
		}
	}

	async fn ensure_name_available<C: ConnectionTrait>(
		db: &C,
		owner_id: Uuid,
		name: &str,
		exclude_id: Option<i32>,
	) -> Result<()> {
		let mut query = filespace::Entity::find()
			.filter(filespace::Column::OwnerId.eq(owner_id))
			.filter(filespace::Column::Name.eq(name));

		if let Some(exclude_id) = exclude_id {
			query = query.filter(filespace::Column::Id.ne(exclude_id));
		}

		if query.count(db).await? > 0 {
			return Err(FilespaceError::DuplicateName(name.to_string()));
		}

		Ok(())
	}
}
