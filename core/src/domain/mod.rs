//! Domain types shared across filespace operations

pub mod node;

pub use node::{validate_name, DeleteState, NodeContent, NodeKind, NodeUpdate};
