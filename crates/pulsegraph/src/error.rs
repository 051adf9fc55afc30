//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Variants cover address and instruction validation, scheduling-state violations,
//! malformed programs, and channel mapping failures. All errors are raised
//! synchronously at the violation point; the crate never retries internally.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid instruction: {0}")]
    InvalidInstruction(String),

    #[error("unscheduled: {0}")]
    Unscheduled(String),

    #[error("malformed program: {0}")]
    MalformedProgram(String),

    #[error("already scheduled: {0}")]
    AlreadyScheduled(String),

    #[error("unmapped channel: no channel available for mixed frame '{0}'")]
    UnmappedChannel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_value() {
        let err = Error::UnmappedChannel("MixedFrame(Q3,QubitFrame5)".into());
        assert!(err.to_string().contains("MixedFrame(Q3,QubitFrame5)"));
    }

    #[test]
    fn display_prefixes_the_error_kind() {
        let err = Error::InvalidInstruction("frame is required".into());
        assert!(err.to_string().starts_with("invalid instruction"));
    }
}
