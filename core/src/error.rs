//! Filespace error types

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by filespace operations.
///
/// Validation errors (`InvalidName` through `DuplicateName`) are raised before
/// any row is written; a failure mid-cascade aborts the enclosing transaction,
/// so a half-updated subtree is never observable.
#[derive(Error, Debug)]
pub enum FilespaceError {
	/// Node name is empty or contains a path separator / NUL byte
	#[error("invalid node name: {0:?}")]
	InvalidName(String),

	/// Proposed parent is missing, in another filespace, or not a directory
	#[error("invalid parent: {0}")]
	InvalidParent(String),

	/// Moving a node under itself or one of its own descendants
	#[error("move would make a node its own ancestor")]
	CycleDetected,

	/// A live sibling (or live root-level node) already uses this name
	#[error("a live node named {0:?} already exists at this level")]
	NameConflict(String),

	/// The owner already has a filespace with this name
	#[error("owner already has a filespace named {0:?}")]
	DuplicateName(String),

	/// Filespace or node lookup miss
	#[error("not found: {0}")]
	NotFound(String),

	/// Blob store collaborator failure; node metadata is left untouched
	#[error("blob store error: {0}")]
	StorageError(String),

	/// Reserved for optimistic-locking implementations
	#[error("concurrent modification of {0}")]
	ConcurrencyConflict(Uuid),

	/// Database error
	#[error("database error: {0}")]
	DatabaseError(#[from] sea_orm::DbErr),
}

/// Result type for filespace operations
pub type Result<T> = std::result::Result<T, FilespaceError>;
