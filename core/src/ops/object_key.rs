//! Blob object key derivation
//!
//! Keys are composed of filespace and node identity plus a sanitized basename,
//! so they stay stable across renames and moves except for the trailing
//! segment. The blob store itself is an external collaborator; this module
//! only decides what to call things there.

use uuid::Uuid;

use crate::infra::db::entities::node;

/// Basename used when neither the supplied filename nor the node name survive
/// sanitization
pub const FALLBACK_BASENAME: &str = "file";

/// Deterministic blob key for a file node's content.
///
/// The basename is derived from `filename` when supplied, else from the
/// node's name, else the literal `"file"`.
pub fn object_key(
	filespace_uuid: Uuid,
	node_uuid: Uuid,
	node_name: &str,
	filename: Option<&str>,
) -> String {
	let basename = filename
		.and_then(sanitize)
		.or_else(|| sanitize(node_name))
		.unwrap_or_else(|| FALLBACK_BASENAME.to_string());

	format!("filespaces/{}/{}/{}", filespace_uuid, node_uuid, basename)
}

/// Current key for a node's content: once content has been stored, the stored
/// key takes precedence over a freshly computed candidate.
pub fn current_object_key(
	filespace_uuid: Uuid,
	node: &node::Model,
	filename: Option<&str>,
) -> String {
	node.content_key
		.clone()
		.unwrap_or_else(|| object_key(filespace_uuid, node.uuid, &node.name, filename))
}

/// Reduce a raw name to a filesystem-safe basename, falling back to `"file"`
/// when nothing survives.
pub fn sanitize_basename(raw: &str) -> String {
	sanitize(raw).unwrap_or_else(|| FALLBACK_BASENAME.to_string())
}

/// Keep `[A-Za-z0-9._-]`, map whitespace runs to `_`, drop everything else
/// and any leading dots. `None` when nothing survives.
fn sanitize(raw: &str) -> Option<String> {
	let cleaned: String = raw
		.trim()
		.chars()
		.filter_map(|c| {
			if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
				Some(c)
			} else if c.is_whitespace() {
				Some('_')
			} else {
				None
			}
		})
		.collect();

	let cleaned = cleaned.trim_start_matches('.');
	if cleaned.is_empty() {
		None
	} else {
		Some(cleaned.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_safe_names() {
		assert_eq!(sanitize_basename("report-v2.pdf"), "report-v2.pdf");
		assert_eq!(sanitize_basename("notes_2025.txt"), "notes_2025.txt");
	}

	#[test]
	fn maps_whitespace_and_drops_unsafe_chars() {
		assert_eq!(sanitize_basename("my report.pdf"), "my_report.pdf");
		assert_eq!(sanitize_basename("a/b\\c:d.txt"), "abcd.txt");
		assert_eq!(sanitize_basename("résumé.doc"), "rsum.doc");
	}

	#[test]
	fn strips_leading_dots() {
		assert_eq!(sanitize_basename(".env"), "env");
		assert_eq!(sanitize_basename("..."), FALLBACK_BASENAME);
	}

	#[test]
	fn falls_back_when_nothing_survives() {
		assert_eq!(sanitize_basename(""), FALLBACK_BASENAME);
		assert_eq!(sanitize_basename("???"), FALLBACK_BASENAME);
		assert_eq!(sanitize_basename("   "), FALLBACK_BASENAME);
	}

	#[test]
	fn key_is_deterministic_and_identity_scoped() {
		let fs = Uuid::new_v4();
		let node = Uuid::new_v4();

		let a = object_key(fs, node, "draft.md", Some("upload.md"));
		let b = object_key(fs, node, "draft.md", Some("upload.md"));
		assert_eq!(a, b);
		assert_eq!(a, format!("filespaces/{}/{}/upload.md", fs, node));

		// Renaming the node moves only the trailing segment
		let renamed = object_key(fs, node, "final.md", None);
		assert!(renamed.starts_with(&format!("filespaces/{}/{}/", fs, node)));
	}

	#[test]
	fn key_falls_back_to_file_segment() {
		let fs = Uuid::new_v4();
		let node = Uuid::new_v4();
		assert_eq!(
			object_key(fs, node, "", None),
			format!("filespaces/{}/{}/file", fs, node)
		);
	}
}
