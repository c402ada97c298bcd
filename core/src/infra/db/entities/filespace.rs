//! Filespace entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "filespaces")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,
	pub uuid: Uuid,
	pub name: String,
	pub owner_id: Uuid, // Owning agent; filespace names are unique per owner
	pub created_at: DateTimeUtc,
	pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(has_many = "super::node::Entity")]
	Node,
}

impl Related<super::node::Entity> for Entity {
	fn to() -> RelationDef {
		Relation::Node.def()
	}
}

impl ActiveModelBehavior for ActiveModel {}
