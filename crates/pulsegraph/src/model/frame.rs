//! Frames: reference oscillators tracked through a program.
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::model::element::{validate_index, LogicalElement};

/// A reference oscillator an instruction is phase- and frequency-relative to.
///
/// Drive and measurement frames are addressed by qubit index. A generic
/// frame is identified by name, initial frequency, and initial phase; the
/// same name with a different frequency or phase is a distinct frame.
#[derive(Clone, Debug)]
pub enum Frame {
    /// The frame driving a qubit's primary transition.
    Qubit { index: u32 },
    /// The frame used to measure a qubit.
    Measurement { index: u32 },
    /// A free-standing frame, e.g. for higher transitions of a qudit.
    Generic {
        name: String,
        frequency: f64,
        phase: f64,
    },
}

impl Frame {
    /// Create a qubit drive frame. The index must be non-negative.
    pub fn qubit(index: i64) -> Result<Self> {
        Ok(Frame::Qubit {
            index: validate_index(index, "qubit frame index")?,
        })
    }

    /// Create a measurement frame. The index must be non-negative.
    pub fn measurement(index: i64) -> Result<Self> {
        Ok(Frame::Measurement {
            index: validate_index(index, "measurement frame index")?,
        })
    }

    /// Create a generic frame with zero initial phase.
    pub fn generic(name: impl Into<String>, frequency: f64) -> Self {
        Frame::generic_with_phase(name, frequency, 0.0)
    }

    /// Create a generic frame with an explicit initial phase.
    pub fn generic_with_phase(name: impl Into<String>, frequency: f64, phase: f64) -> Self {
        Frame::Generic {
            name: name.into(),
            frequency,
            phase,
        }
    }

    /// Human-readable name, e.g. `QubitFrame3` or `GenericFrame(1-2 transition)`.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Qubit { index } => write!(f, "QubitFrame{index}"),
            Frame::Measurement { index } => write!(f, "MeasurementFrame{index}"),
            Frame::Generic { name, .. } => write!(f, "GenericFrame({name})"),
        }
    }
}

// Frequency and phase participate in identity. Comparing and hashing the bit
// patterns keeps Eq and Hash consistent for use as map keys.
impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Frame::Qubit { index: a }, Frame::Qubit { index: b }) => a == b,
            (Frame::Measurement { index: a }, Frame::Measurement { index: b }) => a == b,
            (
                Frame::Generic {
                    name: na,
                    frequency: fa,
                    phase: pa,
                },
                Frame::Generic {
                    name: nb,
                    frequency: fb,
                    phase: pb,
                },
            ) => na == nb && fa.to_bits() == fb.to_bits() && pa.to_bits() == pb.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Frame {}

impl Hash for Frame {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Frame::Qubit { index } | Frame::Measurement { index } => index.hash(state),
            Frame::Generic {
                name,
                frequency,
                phase,
            } => {
                name.hash(state);
                frequency.to_bits().hash(state);
                phase.to_bits().hash(state);
            }
        }
    }
}

/// A concrete, instruction-addressable control channel abstraction: the
/// combination of a [`LogicalElement`] and a [`Frame`].
///
/// Identity is structural over both components regardless of how the pair
/// was constructed; in particular a pair built with
/// [`MixedFrame::cross_resonance`] equals the generically built pair over
/// the same values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MixedFrame {
    logical_element: LogicalElement,
    frame: Frame,
}

impl MixedFrame {
    /// Combine a logical element and a frame.
    pub fn new(logical_element: LogicalElement, frame: Frame) -> Self {
        Self {
            logical_element,
            frame,
        }
    }

    /// Specialized constructor for the common cross-resonance pairing of a
    /// qubit with another qubit's drive frame. Validates the component
    /// types; the resulting value is an ordinary [`MixedFrame`].
    pub fn cross_resonance(qubit: LogicalElement, qubit_frame: Frame) -> Result<Self> {
        if !qubit.is_qubit() {
            return Err(Error::InvalidAddress(format!(
                "cross-resonance mixed frame requires a qubit, got {qubit}"
            )));
        }
        if !matches!(qubit_frame, Frame::Qubit { .. }) {
            return Err(Error::InvalidAddress(format!(
                "cross-resonance mixed frame requires a qubit frame, got {qubit_frame}"
            )));
        }
        Ok(Self::new(qubit, qubit_frame))
    }

    /// The logical element of this mixed frame.
    pub fn logical_element(&self) -> &LogicalElement {
        &self.logical_element
    }

    /// The frame of this mixed frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Human-readable name, e.g. `MixedFrame(Q1,QubitFrame1)`.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MixedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MixedFrame({},{})", self.logical_element, self.frame)
    }
}
