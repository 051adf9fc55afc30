//! Logical elements: the hardware targets instructions act on.
use std::fmt;

use crate::error::{Error, Result};

/// A logical target of an instruction.
///
/// Identity is structural over the variant and its index: two independently
/// constructed qubits with the same index compare and hash equal, while a
/// qubit and a coupler never do.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalElement {
    /// A single qubit, addressed by index.
    Qubit { index: u32 },
    /// A coupler between two qubits, addressed by the pair of their indices.
    Coupler { index: (u32, u32) },
}

impl LogicalElement {
    /// Create a qubit element. The index must be non-negative.
    pub fn qubit(index: i64) -> Result<Self> {
        Ok(LogicalElement::Qubit {
            index: validate_index(index, "qubit index")?,
        })
    }

    /// Create a coupler element. Both qubit indices must be non-negative.
    pub fn coupler(first: i64, second: i64) -> Result<Self> {
        Ok(LogicalElement::Coupler {
            index: (
                validate_index(first, "coupler qubit index")?,
                validate_index(second, "coupler qubit index")?,
            ),
        })
    }

    /// Human-readable name, e.g. `Q3` or `Coupler(2,3)`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Whether this element is a qubit.
    pub fn is_qubit(&self) -> bool {
        matches!(self, LogicalElement::Qubit { .. })
    }
}

impl fmt::Display for LogicalElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalElement::Qubit { index } => write!(f, "Q{index}"),
            LogicalElement::Coupler { index: (a, b) } => write!(f, "Coupler({a},{b})"),
        }
    }
}

pub(crate) fn validate_index(index: i64, what: &str) -> Result<u32> {
    u32::try_from(index)
        .map_err(|_| Error::InvalidAddress(format!("{what} must be a non-negative integer")))
}
