//! Node domain types
//!
//! The database row stores `kind` as an integer and soft-delete state as a
//! boolean plus nullable timestamp; these types are the only shapes the rest
//! of the crate works with, so the flag and timestamp cannot disagree outside
//! the row-mapping boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FilespaceError, Result};

/// Node type: 0=File, 1=Directory
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
	File = 0,
	Directory = 1,
}

impl From<i32> for NodeKind {
	fn from(value: i32) -> Self {
		match value {
			1 => NodeKind::Directory,
			_ => NodeKind::File,
		}
	}
}

impl From<NodeKind> for i32 {
	fn from(kind: NodeKind) -> Self {
		kind as i32
	}
}

/// Soft-delete state of a node.
///
/// `Live` and `Deleted` are mutually exclusive by construction; the deletion
/// timestamp only exists when the node is deleted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteState {
	Live,
	Deleted(DateTime<Utc>),
}

impl DeleteState {
	/// Map the row-level flag/timestamp pair to the tagged state.
	pub fn from_row(is_deleted: bool, deleted_at: Option<DateTime<Utc>>) -> Self {
		if is_deleted {
			DeleteState::Deleted(deleted_at.unwrap_or_default())
		} else {
			DeleteState::Live
		}
	}

	pub fn is_live(&self) -> bool {
		matches!(self, DeleteState::Live)
	}

	pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
		match self {
			DeleteState::Live => None,
			DeleteState::Deleted(at) => Some(*at),
		}
	}
}

/// Content attributes carried by file nodes.
///
/// Directories never carry these; `NodeStore::create` strips them for
/// directory nodes before insert.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContent {
	pub content_key: Option<String>,
	pub size_bytes: Option<i64>,
	pub mime_type: Option<String>,
	pub checksum: Option<String>,
}

/// Change set for `NodeStore::update`.
///
/// All fields are optional so rename, move, trash and restore compose into a
/// single transactional mutation. `parent: Some(None)` moves the node to the
/// filespace root; `trashed: Some(true)` / `Some(false)` run the deletion or
/// restoration cascade after any structural change has landed.
#[derive(Clone, Debug, Default)]
pub struct NodeUpdate {
	pub name: Option<String>,
	pub parent: Option<Option<Uuid>>,
	pub trashed: Option<bool>,
}

impl NodeUpdate {
	pub fn rename(name: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			..Default::default()
		}
	}

	pub fn reparent(parent: Option<Uuid>) -> Self {
		Self {
			parent: Some(parent),
			..Default::default()
		}
	}
}

/// Validate a node name: non-empty, no path separators, no NUL bytes.
pub fn validate_name(name: &str) -> Result<()> {
	if name.is_empty() || name.contains('/') || name.contains('\0') {
		return Err(FilespaceError::InvalidName(name.to_string()));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn kind_round_trips_through_i32() {
		assert_eq!(NodeKind::from(i32::from(NodeKind::File)), NodeKind::File);
		assert_eq!(
			NodeKind::from(i32::from(NodeKind::Directory)),
			NodeKind::Directory
		);
	}

	#[test]
	fn delete_state_from_row() {
		let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
		assert_eq!(DeleteState::from_row(false, None), DeleteState::Live);
		assert_eq!(
			DeleteState::from_row(true, Some(at)),
			DeleteState::Deleted(at)
		);
		assert!(DeleteState::from_row(false, None).is_live());
		assert_eq!(DeleteState::from_row(true, Some(at)).deleted_at(), Some(at));
	}

	#[test]
	fn name_validation() {
		assert!(validate_name("notes.txt").is_ok());
		assert!(validate_name("with spaces and ünicode").is_ok());
		assert!(matches!(
			validate_name(""),
			Err(FilespaceError::InvalidName(_))
		));
		assert!(matches!(
			validate_name("a/b"),
			Err(FilespaceError::InvalidName(_))
		));
		assert!(matches!(
			validate_name("nul\0byte"),
			Err(FilespaceError::InvalidName(_))
		));
	}
}
