//! Sweep engine for tape-based algorithmic differentiation.
//!
//! A [`Tape`] records a computation as a DAG of elementary operations in
//! topological order. Sweeps walk it forward or backward to compute values
//! and directional derivatives, adjoints, and the sparsity patterns of the
//! Jacobian and Hessian.

pub mod api;
pub mod base;
pub mod config;
pub mod error;
pub mod float;
pub mod opcode;
pub mod pack;
pub mod pattern;
pub mod registry;
pub mod sparse_op;
pub mod tape;

pub use api::{
    forward_jacobian_sparsity, forward_values, forward_values_seeded, gradient, hessian_sparsity,
    jacobian, jacobian_sparsity, reverse_adjoints, reverse_hessian_sparsity,
    reverse_hessian_sparsity_seeded, reverse_jacobian_sparsity, reverse_jacobian_sparsity_seeded,
};
pub use base::Base;
pub use config::SweepConfig;
pub use error::{DomainKind, Result, SweepError};
pub use float::Float;
pub use opcode::{CrossTerms, CustomId, OpCode, OpKind};
pub use pack::VectorPack;
pub use pattern::{column_coloring, JacobianSparsityPattern, SparsityPattern};
pub use registry::{CustomOp, Registry};
pub use tape::{CustomSignature, ForwardSweep, HessianSweep, NodeIndex, Operation, Tape};
