//! Filespace operations
//!
//! Structural mutations follow one ordering regardless of entry point:
//! mutate structure, recompute the node's own path, bulk-rewrite descendant
//! prefixes, and only then run cascades that depend on current paths.

pub mod node_store;
pub mod object_key;
pub mod path_cache;
pub mod registry;
pub mod trash;
pub mod uniqueness;
