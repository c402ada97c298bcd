//! Materialized path maintenance
//!
//! Every node row caches its absolute path so listings, cascades and lookups
//! never walk parent_id chains. This module keeps that cache consistent with
//! the parent-pointer tree: a node's path is derived from its parent's cached
//! path in O(1), and moving or renaming a directory rewrites all descendant
//! paths in a single set-based UPDATE bounded by the number of affected rows,
//! not depth x descendants.

use sea_orm::{
	sea_query::{Expr, SimpleExpr},
	ConnectionTrait, DbErr, Statement, Value,
};

/// Join a parent's cached path with a child name. Root-level nodes get `/name`.
pub fn join_path(parent_path: Option<&str>, name: &str) -> String {
	match parent_path {
		Some(parent_path) => format!("{}/{}", parent_path, name),
		None => format!("/{}", name),
	}
}

/// Rewrite the cached paths of every node under `old_path` to start with
/// `new_path` instead, in one statement. Returns the number of rows touched.
///
/// The replacement keeps everything after the old prefix via SUBSTR rather
/// than REPLACE, so an old path string that happens to reappear deeper inside
/// a descendant path is left alone.
pub async fn rewrite_descendant_paths<C: ConnectionTrait>(
	db: &C,
	filespace_id: i32,
	old_path: &str,
	new_path: &str,
) -> Result<u64, DbErr> {
	let sql = r#"
		UPDATE nodes
		SET path = ? || SUBSTR(path, ?), updated_at = ?
		WHERE filespace_id = ? AND SUBSTR(path, 1, ?) = ?
	"#;

	// SUBSTR is 1-based and counts characters, as does chars().count()
	let keep_from = old_path.chars().count() as i64 + 1;
	let prefix = format!("{}/", old_path);
	let prefix_len = prefix.chars().count() as i64;

	let result = db
		.execute(Statement::from_sql_and_values(
			db.get_database_backend(),
			sql,
			vec![
				new_path.into(),
				keep_from.into(),
				chrono::Utc::now().into(),
				filespace_id.into(),
				prefix_len.into(),
				prefix.into(),
			],
		))
		.await?;

	Ok(result.rows_affected())
}

/// Filter matching every node strictly below `path` by cached-path prefix.
///
/// The comparison uses SUBSTR rather than LIKE: SQLite's LIKE is
/// case-insensitive for ASCII, so a cascade on `/Docs` would sweep up a
/// case-distinct sibling `/docs` subtree, and LIKE wildcards in node names
/// would need escaping besides.
pub fn descendant_filter(path: &str) -> SimpleExpr {
	let prefix = format!("{}/", path);
	let prefix_len = prefix.chars().count() as i64;

	Expr::cust_with_values(
		"SUBSTR(path, 1, ?) = ?",
		[Value::from(prefix_len), Value::from(prefix)],
	)
}
