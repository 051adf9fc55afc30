//! Program graph: the DAG container at the heart of the IR.
//!
//! This module groups the [`Alignment`] policy, the node payload type
//! [`Element`], and the [`ProgramGraph`] itself, including the graph-rewrite
//! primitives and the recursive flatten/query surface later compiler passes
//! depend on.
pub mod alignment;
pub mod program;

pub use alignment::Alignment;
pub use program::{Element, NodeId, ProgramGraph};
