//! Typed failures surfaced by value sweeps.
//!
//! Malformed tapes (operand after result, out-of-range index, arity
//! mismatch) are contract violations and panic at the offending call; only
//! conditions that depend on the numbers flowing through a sweep, or on how
//! the caller assembled the [`Registry`](crate::Registry), are reported here.

use thiserror::Error;

use crate::opcode::{CustomId, OpCode};
use crate::tape::NodeIndex;

/// Result alias used by every fallible sweep.
pub type Result<T> = std::result::Result<T, SweepError>;

/// What went non-finite at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomainKind {
    /// Finite operands produced a non-finite value.
    #[error("non-finite value")]
    Value,
    /// Finite operands produced a non-finite partial derivative.
    #[error("non-finite derivative")]
    Derivative,
}

/// Errors that abandon a value sweep.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweepError {
    /// An opcode was evaluated outside its domain.
    #[error("numeric domain error at node {node} ({opcode}): {kind}")]
    Domain {
        /// Tape index of the offending node.
        node: NodeIndex,
        /// Opcode recorded at that node.
        opcode: OpCode,
        /// Which quantity left the finite range.
        kind: DomainKind,
    },

    /// A custom opcode was recorded on the tape but the registry has no rule
    /// for it.
    #[error("no rule registered for custom opcode {id} (node {node})")]
    MissingRule {
        /// Tape index of the custom node.
        node: NodeIndex,
        /// Custom opcode identifier.
        id: CustomId,
    },
}
