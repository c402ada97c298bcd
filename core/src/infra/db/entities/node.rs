//! Node entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{DeleteState, NodeKind};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nodes")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,
	pub uuid: Uuid,
	pub filespace_id: i32,
	pub parent_id: Option<i32>, // None for root-level nodes
	pub kind: i32,              // Node type: 0=File, 1=Directory
	pub name: String,
	pub path: String, // Cached absolute path, `/`-joined from the filespace root
	pub content_key: Option<String>, // Blob store key, files only
	pub size_bytes: Option<i64>,
	pub mime_type: Option<String>,
	pub checksum: Option<String>, // BLAKE3 hex digest of the stored content
	pub created_by: Option<Uuid>,
	pub is_deleted: bool,
	pub deleted_at: Option<DateTimeUtc>, // Set if and only if is_deleted
	pub created_at: DateTimeUtc,
	pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "super::filespace::Entity",
		from = "Column::FilespaceId",
		to = "super::filespace::Column::Id",
		on_delete = "Cascade"
	)]
	Filespace,
	#[sea_orm(belongs_to = "Entity", from = "Column::ParentId", to = "Column::Id")]
	Parent,
}

impl Related<super::filespace::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Filespace.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
	/// Get the node kind as enum
	pub fn node_kind(&self) -> NodeKind {
		NodeKind::from(self.kind)
	}

	pub fn is_directory(&self) -> bool {
		self.node_kind() == NodeKind::Directory
	}

	/// Soft-delete state as the tagged domain variant
	pub fn delete_state(&self) -> DeleteState {
		DeleteState::from_row(self.is_deleted, self.deleted_at)
	}
}
