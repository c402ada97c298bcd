//! Structural invariants of the node tree: path computation, listings,
//! uniqueness scopes, parent validation and cycle prevention.

mod helpers;

use filespace_core::{FilespaceError, NodeKind, NodeUpdate};
use pretty_assertions::assert_eq;
use uuid::Uuid;

#[tokio::test]
async fn created_node_paths_follow_ancestor_chain() {
	let env = helpers::setup().await;
	let owner = Uuid::new_v4();
	let space = env.core.create_filespace(owner, "research").await.unwrap();

	let docs = env
		.core
		.create_directory(space.uuid, None, "docs", Some(owner))
		.await
		.unwrap();
	let reports = env
		.core
		.create_directory(space.uuid, Some(docs.uuid), "reports", Some(owner))
		.await
		.unwrap();
	let q3 = env
		.core
		.create_file(space.uuid, Some(reports.uuid), "q3.txt", None, Some(owner))
		.await
		.unwrap();

	assert_eq!(docs.path, "/docs");
	assert_eq!(reports.path, "/docs/reports");
	assert_eq!(q3.path, "/docs/reports/q3.txt");

	assert_eq!(q3.node_kind(), NodeKind::File);
	assert_eq!(q3.parent_id, Some(reports.id));
	assert!(q3.delete_state().is_live());
}

#[tokio::test]
async fn listing_orders_directories_before_files() {
	let env = helpers::setup().await;
	let space = env
		.core
		.create_filespace(Uuid::new_v4(), "workspace")
		.await
		.unwrap();

	env.core
		.create_file(space.uuid, None, "beta.txt", None, None)
		.await
		.unwrap();
	env.core
		.create_directory(space.uuid, None, "zeta", None)
		.await
		.unwrap();
	env.core
		.create_file(space.uuid, None, "alpha.txt", None, None)
		.await
		.unwrap();
	env.core
		.create_directory(space.uuid, None, "alpha", None)
		.await
		.unwrap();

	let names: Vec<String> = env
		.core
		.list_children(space.uuid, None)
		.await
		.unwrap()
		.into_iter()
		.map(|n| n.name)
		.collect();

	assert_eq!(names, vec!["alpha", "zeta", "alpha.txt", "beta.txt"]);
}

#[tokio::test]
async fn duplicate_live_sibling_name_conflicts_until_trashed() {
	let env = helpers::setup().await;
	let space = env
		.core
		.create_filespace(Uuid::new_v4(), "workspace")
		.await
		.unwrap();
	let dir = env
		.core
		.create_directory(space.uuid, None, "inbox", None)
		.await
		.unwrap();

	let first = env
		.core
		.create_file(space.uuid, Some(dir.uuid), "draft.md", None, None)
		.await
		.unwrap();

	let err = env
		.core
		.create_file(space.uuid, Some(dir.uuid), "draft.md", None, None)
		.await
		.unwrap_err();
	assert!(matches!(err, FilespaceError::NameConflict(name) if name == "draft.md"));

	// A soft-deleted node never blocks reuse of its name
	env.core.trash_node(first.uuid).await.unwrap();
	env.core
		.create_file(space.uuid, Some(dir.uuid), "draft.md", None, None)
		.await
		.unwrap();
}

#[tokio::test]
async fn root_level_names_unique_per_filespace_only() {
	let env = helpers::setup().await;
	let owner = Uuid::new_v4();
	let space_a = env.core.create_filespace(owner, "alpha").await.unwrap();
	let space_b = env.core.create_filespace(owner, "beta").await.unwrap();

	env.core
		.create_file(space_a.uuid, None, "readme.md", None, None)
		.await
		.unwrap();

	let err = env
		.core
		.create_directory(space_a.uuid, None, "readme.md", None)
		.await
		.unwrap_err();
	assert!(matches!(err, FilespaceError::NameConflict(_)));

	// Same name in a different filespace is fine
	env.core
		.create_file(space_b.uuid, None, "readme.md", None, None)
		.await
		.unwrap();

	// Root-level and directory-scoped constraints are independent: a nested
	// node may reuse a root-level name
	let dir = env
		.core
		.create_directory(space_a.uuid, None, "notes", None)
		.await
		.unwrap();
	env.core
		.create_file(space_a.uuid, Some(dir.uuid), "readme.md", None, None)
		.await
		.unwrap();
}

#[tokio::test]
async fn invalid_names_are_rejected_before_persisting() {
	let env = helpers::setup().await;
	let space = env
		.core
		.create_filespace(Uuid::new_v4(), "workspace")
		.await
		.unwrap();

	for bad in ["", "a/b", "nul\0byte"] {
		let err = env
			.core
			.create_directory(space.uuid, None, bad, None)
			.await
			.unwrap_err();
		assert!(matches!(err, FilespaceError::InvalidName(_)), "{:?}", bad);
	}

	// Renames run the same validation
	let node = env
		.core
		.create_directory(space.uuid, None, "ok", None)
		.await
		.unwrap();
	let err = env.core.rename_node(node.uuid, "broken/name").await.unwrap_err();
	assert!(matches!(err, FilespaceError::InvalidName(_)));
}

#[tokio::test]
async fn parent_must_be_directory_in_same_filespace() {
	let env = helpers::setup().await;
	let owner = Uuid::new_v4();
	let space_a = env.core.create_filespace(owner, "alpha").await.unwrap();
	let space_b = env.core.create_filespace(owner, "beta").await.unwrap();

	let file = env
		.core
		.create_file(space_a.uuid, None, "leaf.txt", None, None)
		.await
		.unwrap();
	let foreign_dir = env
		.core
		.create_directory(space_b.uuid, None, "elsewhere", None)
		.await
		.unwrap();

	// A file cannot be a parent
	let err = env
		.core
		.create_file(space_a.uuid, Some(file.uuid), "child.txt", None, None)
		.await
		.unwrap_err();
	assert!(matches!(err, FilespaceError::InvalidParent(_)));

	// Parent in another filespace
	let err = env
		.core
		.create_file(space_a.uuid, Some(foreign_dir.uuid), "child.txt", None, None)
		.await
		.unwrap_err();
	assert!(matches!(err, FilespaceError::InvalidParent(_)));

	// Unknown parent
	let err = env
		.core
		.create_file(space_a.uuid, Some(Uuid::new_v4()), "child.txt", None, None)
		.await
		.unwrap_err();
	assert!(matches!(err, FilespaceError::InvalidParent(_)));
}

#[tokio::test]
async fn directories_never_carry_content_attributes() {
	let env = helpers::setup().await;
	let space = env
		.core
		.create_filespace(Uuid::new_v4(), "workspace")
		.await
		.unwrap();

	let dir = env
		.core
		.create_node(
			space.uuid,
			None,
			NodeKind::Directory,
			"assets",
			Some(filespace_core::NodeContent {
				content_key: Some("bogus".into()),
				size_bytes: Some(42),
				mime_type: Some("text/plain".into()),
				checksum: Some("deadbeef".into()),
			}),
			None,
		)
		.await
		.unwrap();

	assert_eq!(dir.content_key, None);
	assert_eq!(dir.size_bytes, None);
	assert_eq!(dir.mime_type, None);
	assert_eq!(dir.checksum, None);
}

#[tokio::test]
async fn renaming_directory_rewrites_descendant_paths() {
	let env = helpers::setup().await;
	let space = env
		.core
		.create_filespace(Uuid::new_v4(), "workspace")
		.await
		.unwrap();

	let a = env
		.core
		.create_directory(space.uuid, None, "a", None)
		.await
		.unwrap();
	let b = env
		.core
		.create_directory(space.uuid, Some(a.uuid), "b", None)
		.await
		.unwrap();
	let c = env
		.core
		.create_file(space.uuid, Some(b.uuid), "c.txt", None, None)
		.await
		.unwrap();

	let renamed = env.core.rename_node(a.uuid, "z").await.unwrap();
	assert_eq!(renamed.path, "/z");

	assert_eq!(env.core.node(b.uuid).await.unwrap().path, "/z/b");
	assert_eq!(env.core.node(c.uuid).await.unwrap().path, "/z/b/c.txt");

	// The path cache answers lookups without ancestor walks
	let hit = env.core.node_at_path(space.uuid, "/z/b/c.txt").await.unwrap();
	assert_eq!(hit.map(|n| n.id), Some(c.id));
	assert_eq!(env.core.node_at_path(space.uuid, "/a/b/c.txt").await.unwrap(), None);
}

#[tokio::test]
async fn moving_directory_rebases_entire_subtree() {
	let env = helpers::setup().await;
	let space = env
		.core
		.create_filespace(Uuid::new_v4(), "workspace")
		.await
		.unwrap();

	let src = env
		.core
		.create_directory(space.uuid, None, "src", None)
		.await
		.unwrap();
	let nested = env
		.core
		.create_directory(space.uuid, Some(src.uuid), "nested", None)
		.await
		.unwrap();
	let leaf = env
		.core
		.create_file(space.uuid, Some(nested.uuid), "leaf.rs", None, None)
		.await
		.unwrap();
	let archive = env
		.core
		.create_directory(space.uuid, None, "archive", None)
		.await
		.unwrap();

	let moved = env
		.core
		.move_node(src.uuid, Some(archive.uuid), None)
		.await
		.unwrap();

	assert_eq!(moved.path, "/archive/src");
	assert_eq!(moved.parent_id, Some(archive.id));
	assert_eq!(env.core.node(nested.uuid).await.unwrap().path, "/archive/src/nested");
	assert_eq!(
		env.core.node(leaf.uuid).await.unwrap().path,
		"/archive/src/nested/leaf.rs"
	);

	// Move a file back to the root under a new name
	let promoted = env
		.core
		.move_node(leaf.uuid, None, Some("main.rs".to_string()))
		.await
		.unwrap();
	assert_eq!(promoted.path, "/main.rs");
	assert_eq!(promoted.parent_id, None);
}

#[tokio::test]
async fn moving_under_own_descendant_is_a_cycle() {
	let env = helpers::setup().await;
	let space = env
		.core
		.create_filespace(Uuid::new_v4(), "workspace")
		.await
		.unwrap();

	let a = env
		.core
		.create_directory(space.uuid, None, "a", None)
		.await
		.unwrap();
	let b = env
		.core
		.create_directory(space.uuid, Some(a.uuid), "b", None)
		.await
		.unwrap();
	let c = env
		.core
		.create_directory(space.uuid, Some(b.uuid), "c", None)
		.await
		.unwrap();

	let err = env
		.core
		.move_node(a.uuid, Some(c.uuid), None)
		.await
		.unwrap_err();
	assert!(matches!(err, FilespaceError::CycleDetected));

	// A node cannot become its own parent either
	let err = env
		.core
		.move_node(a.uuid, Some(a.uuid), None)
		.await
		.unwrap_err();
	assert!(matches!(err, FilespaceError::CycleDetected));

	// Stored parent and path are untouched by the failed moves
	let unchanged = env.core.node(a.uuid).await.unwrap();
	assert_eq!(unchanged.parent_id, None);
	assert_eq!(unchanged.path, "/a");
	assert_eq!(env.core.node(c.uuid).await.unwrap().path, "/a/b/c");
}

#[tokio::test]
async fn move_into_sibling_directory_checks_uniqueness_at_destination() {
	let env = helpers::setup().await;
	let space = env
		.core
		.create_filespace(Uuid::new_v4(), "workspace")
		.await
		.unwrap();

	let dir = env
		.core
		.create_directory(space.uuid, None, "dir", None)
		.await
		.unwrap();
	env.core
		.create_file(space.uuid, Some(dir.uuid), "notes.md", None, None)
		.await
		.unwrap();
	let loose = env
		.core
		.create_file(space.uuid, None, "notes.md", None, None)
		.await
		.unwrap();

	let err = env
		.core
		.update_node(loose.uuid, NodeUpdate::reparent(Some(dir.uuid)))
		.await
		.unwrap_err();
	assert!(matches!(err, FilespaceError::NameConflict(_)));

	// Still at the root after the failed move
	assert_eq!(env.core.node(loose.uuid).await.unwrap().path, "/notes.md");
}
