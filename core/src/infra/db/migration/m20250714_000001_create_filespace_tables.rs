//! Initial migration creating the filespaces and nodes tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		// Create filespaces table with hybrid ID system
		manager
			.create_table(
				Table::create()
					.table(Filespaces::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(Filespaces::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(ColumnDef::new(Filespaces::Uuid).uuid().not_null().unique_key())
					.col(ColumnDef::new(Filespaces::Name).string().not_null())
					.col(ColumnDef::new(Filespaces::OwnerId).uuid().not_null())
					.col(
						ColumnDef::new(Filespaces::CreatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.col(
						ColumnDef::new(Filespaces::UpdatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.to_owned(),
			)
			.await?;

		// Create nodes table: parent-pointer tree plus cached materialized path
		manager
			.create_table(
				Table::create()
					.table(Nodes::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(Nodes::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(ColumnDef::new(Nodes::Uuid).uuid().not_null().unique_key())
					.col(ColumnDef::new(Nodes::FilespaceId).integer().not_null())
					.col(ColumnDef::new(Nodes::ParentId).integer())
					.col(ColumnDef::new(Nodes::Kind).integer().not_null())
					.col(ColumnDef::new(Nodes::Name).string().not_null())
					.col(ColumnDef::new(Nodes::Path).string().not_null())
					.col(ColumnDef::new(Nodes::ContentKey).string())
					.col(ColumnDef::new(Nodes::SizeBytes).big_integer())
					.col(ColumnDef::new(Nodes::MimeType).string())
					.col(ColumnDef::new(Nodes::Checksum).string())
					.col(ColumnDef::new(Nodes::CreatedBy).uuid())
					.col(
						ColumnDef::new(Nodes::IsDeleted)
							.boolean()
							.not_null()
							.default(false),
					)
					.col(ColumnDef::new(Nodes::DeletedAt).timestamp_with_time_zone())
					.col(
						ColumnDef::new(Nodes::CreatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.col(
						ColumnDef::new(Nodes::UpdatedAt)
							.timestamp_with_time_zone()
							.not_null(),
					)
					.foreign_key(
						ForeignKey::create()
							.from(Nodes::Table, Nodes::FilespaceId)
							.to(Filespaces::Table, Filespaces::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.foreign_key(
						ForeignKey::create()
							.from(Nodes::Table, Nodes::ParentId)
							.to(Nodes::Table, Nodes::Id),
					)
					.to_owned(),
			)
			.await?;

		// One filespace name per owner
		manager
			.create_index(
				Index::create()
					.name("idx_filespaces_owner_name")
					.table(Filespaces::Table)
					.col(Filespaces::OwnerId)
					.col(Filespaces::Name)
					.unique()
					.to_owned(),
			)
			.await?;

		// Sibling listings and uniqueness checks
		manager
			.create_index(
				Index::create()
					.name("idx_nodes_filespace_parent")
					.table(Nodes::Table)
					.col(Nodes::FilespaceId)
					.col(Nodes::ParentId)
					.to_owned(),
			)
			.await?;

		// Cascades and lookups match on the cached path
		manager
			.create_index(
				Index::create()
					.name("idx_nodes_filespace_path")
					.table(Nodes::Table)
					.col(Nodes::FilespaceId)
					.col(Nodes::Path)
					.to_owned(),
			)
			.await?;

		Ok(())
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		// Drop tables in reverse order of creation
		manager
			.drop_table(Table::drop().table(Nodes::Table).to_owned())
			.await?;
		manager
			.drop_table(Table::drop().table(Filespaces::Table).to_owned())
			.await?;

		Ok(())
	}
}

// Table identifiers

#[derive(Iden)]
enum Filespaces {
	Table,
	Id,
	Uuid,
	Name,
	OwnerId,
	CreatedAt,
	UpdatedAt,
}

#[derive(Iden)]
enum Nodes {
	Table,
	Id,
	Uuid,
	FilespaceId,
	ParentId,
	Kind,
	Name,
	Path,
	ContentKey,
	SizeBytes,
	MimeType,
	Checksum,
	CreatedBy,
	IsDeleted,
	DeletedAt,
	CreatedAt,
	UpdatedAt,
}
