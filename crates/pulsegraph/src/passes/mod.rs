//! Structural rewrite passes over the program graph.
//!
//! Only the consolidation pass lives in this crate; sequencing and
//! scheduling are external passes that consume the same graph surface.
pub mod consolidate;

pub use consolidate::consolidate;
