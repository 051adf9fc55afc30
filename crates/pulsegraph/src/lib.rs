#![forbid(unsafe_code)]
//! pulsegraph: graph-based IR for pulse-level hardware control programs.
//!
//! Modules:
//! - model: logical elements, frames, and mixed frames (addressing)
//! - instruction: typed leaf operations with durations and start times
//! - graph: the program DAG, its rewrite primitives, and the flatten/query surface
//! - passes: the consolidation rewrite pass
//! - channels: mapping mixed frames to physical channel names
//!
//! A frontend builds a [`graph::ProgramGraph`] bottom-up; an external
//! sequencing pass encodes each alignment policy as precedence edges; the
//! consolidation pass simplifies redundant nesting; an external scheduling
//! pass fills the time table; the flatten/query surface feeds code
//! generation.
pub mod channels;
pub mod error;
pub mod graph;
pub mod instruction;
pub mod model;
pub mod passes;

/// Convenient re-exports for common types. Import with `use pulsegraph::prelude::*;`.
pub mod prelude {
    pub use crate::channels::{map_mixed_frames, ChannelTable};
    pub use crate::error::{Error, Result};
    pub use crate::graph::{Alignment, Element, NodeId, ProgramGraph};
    pub use crate::instruction::{
        AcquireInstruction, GenericInstruction, Instruction, InstructionKind, MemorySlot,
        Operand, Waveform,
    };
    pub use crate::model::{Frame, LogicalElement, MixedFrame};
    pub use crate::passes::consolidate;
}
