//! Addressing model: logical targets and reference frames.
//!
//! This module groups the pure value types a program addresses instructions
//! to: [`LogicalElement`]s (qubits, couplers), [`Frame`]s (reference
//! oscillators), and their combination, the [`MixedFrame`]. All of them are
//! immutable, structurally comparable, and usable as map or set keys.
pub mod element;
pub mod frame;

pub use element::LogicalElement;
pub use frame::{Frame, MixedFrame};
