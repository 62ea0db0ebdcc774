//! One-call entry points over a recorded [`Tape`].
//!
//! These wrap the sweep methods on [`Tape`] for the common cases: evaluate
//! the outputs, pull a weighted adjoint back to the inputs, or extract a
//! sparsity pattern.
//!
//! The `*_seeded` variants take the caller's seeds: tangent directions for
//! the forward sweep, initial output sets for the reverse Jacobian sweep,
//! and a forward pack plus `jac_reverse` flags for the Hessian sweep.

use crate::base::Base;
use crate::error::Result;
use crate::pack::VectorPack;
use crate::pattern::{JacobianSparsityPattern, SparsityPattern};
use crate::registry::Registry;
use crate::tape::{HessianSweep, NodeIndex, Tape};

/// Evaluate the tape outputs at `inputs`.
///
/// ```
/// use tapesweep::{OpCode, Registry, Tape};
///
/// let mut tape = Tape::new();
/// let x = tape.declare_independent(2);
/// let p = tape.append(OpCode::Mul, &[x.start, x.start + 1]);
/// tape.set_outputs(&[p]);
///
/// let y = tapesweep::forward_values(&tape, &Registry::new(), &[3.0_f64, 4.0]).unwrap();
/// assert_eq!(y, vec![12.0]);
/// ```
pub fn forward_values<T: Base>(tape: &Tape, registry: &Registry<T>, inputs: &[T]) -> Result<Vec<T>> {
    let sweep = tape.forward(registry, inputs)?;
    Ok(sweep.values_at(tape.outputs()))
}

/// Jacobian-vector products: `(f(x), J·v_d)` for every seed direction
/// `v_d`, all carried by one forward sweep.
///
/// ```
/// use tapesweep::{OpCode, Registry, Tape};
///
/// // f(x, y) = x·y
/// let mut tape = Tape::new();
/// tape.declare_independent(2);
/// let p = tape.append(OpCode::Mul, &[0, 1]);
/// tape.set_outputs(&[p]);
///
/// let dirs = [[1.0_f64, 0.0], [0.0, 1.0]];
/// let (y, jv) = tapesweep::forward_values_seeded(&tape, &Registry::new(), &[3.0_f64, 4.0], &dirs)
///     .unwrap();
/// assert_eq!(y, vec![12.0]);
/// assert_eq!(jv, vec![vec![4.0], vec![3.0]]);
/// ```
pub fn forward_values_seeded<T: Base, D: AsRef<[T]>>(
    tape: &Tape,
    registry: &Registry<T>,
    inputs: &[T],
    directions: &[D],
) -> Result<(Vec<T>, Vec<Vec<T>>)> {
    let sweep = tape.forward_directions(registry, inputs, directions)?;
    let outputs = tape.outputs();
    let jv = (0..directions.len())
        .map(|d| outputs.iter().map(|&o| sweep.tangent(d, o)).collect())
        .collect();
    Ok((sweep.values_at(outputs), jv))
}

/// Vector-Jacobian product: `(f(x), wᵀ·J)`, with one weight per tape output.
pub fn reverse_adjoints<T: Base>(
    tape: &Tape,
    registry: &Registry<T>,
    inputs: &[T],
    weights: &[T],
) -> Result<(Vec<T>, Vec<T>)> {
    let outputs = tape.outputs();
    assert_eq!(weights.len(), outputs.len(), "one weight per output required");
    let sweep = tape.forward(registry, inputs)?;
    let seeds: Vec<(NodeIndex, T)> = outputs.iter().copied().zip(weights.iter().copied()).collect();
    let adjoints = tape.reverse(registry, &sweep.values, &seeds)?;
    Ok((sweep.values_at(outputs), adjoints))
}

/// Gradient of the first tape output: `(f(x), ∇f(x))`.
///
/// ```
/// use tapesweep::{OpCode, Registry, Tape};
///
/// // f(x, y) = x² + y²
/// let mut tape = Tape::new();
/// tape.declare_independent(2);
/// let xx = tape.append(OpCode::Mul, &[0, 0]);
/// let yy = tape.append(OpCode::Mul, &[1, 1]);
/// let f = tape.append(OpCode::Add, &[xx, yy]);
/// tape.set_outputs(&[f]);
///
/// let (v, g) = tapesweep::gradient(&tape, &Registry::new(), &[3.0_f64, 4.0]).unwrap();
/// assert!((v - 25.0).abs() < 1e-10);
/// assert!((g[0] - 6.0).abs() < 1e-10);
/// assert!((g[1] - 8.0).abs() < 1e-10);
/// ```
pub fn gradient<T: Base>(tape: &Tape, registry: &Registry<T>, inputs: &[T]) -> Result<(T, Vec<T>)> {
    tape.gradient(registry, inputs)
}

/// Dense Jacobian of the tape outputs: `(f(x), J)` with `J[i][j] = ∂f_i/∂x_j`.
pub fn jacobian<T: Base>(
    tape: &Tape,
    registry: &Registry<T>,
    inputs: &[T],
) -> Result<(Vec<T>, Vec<Vec<T>>)> {
    tape.jacobian(registry, inputs)
}

/// Forward Jacobian sparsity of every node over the independent variables.
pub fn forward_jacobian_sparsity(tape: &Tape) -> VectorPack {
    tape.forward_jacobian_sparsity()
}

/// Reverse Jacobian sparsity seeded at the tape outputs: node `i`'s set
/// holds the positions (in [`Tape::outputs`]) of the outputs that may
/// depend on it.
pub fn reverse_jacobian_sparsity(tape: &Tape) -> VectorPack {
    tape.reverse_jacobian_sparsity(tape.outputs())
}

/// Reverse Jacobian sparsity from caller-supplied sets.
///
/// `sparsity` holds one set per node; the sets already present (usually at
/// the outputs) are pulled back to every operand in place.
pub fn reverse_jacobian_sparsity_seeded(tape: &Tape, sparsity: &mut VectorPack) {
    tape.reverse_jacobian_sparsity_seeded(sparsity);
}

/// Reverse Hessian sparsity of the sum of the tape outputs.
///
/// Runs the forward Jacobian sparsity sweep first and seeds `jac_reverse`
/// at every output.
pub fn reverse_hessian_sparsity(tape: &Tape) -> HessianSweep {
    let for_jac = tape.forward_jacobian_sparsity();
    let mut jac_reverse = vec![false; tape.len()];
    for &out in tape.outputs() {
        jac_reverse[out as usize] = true;
    }
    tape.reverse_hessian_sparsity(&for_jac, jac_reverse)
}

/// Reverse Hessian sparsity from a forward Jacobian pack and initial
/// `jac_reverse` flags, both with one entry per node.
///
/// ```
/// use tapesweep::{OpCode, Tape};
///
/// // f(x0, x1) = x0·x1 + x0
/// let mut tape = Tape::new();
/// tape.declare_independent(2);
/// let p = tape.append(OpCode::Mul, &[0, 1]);
/// let f = tape.append(OpCode::Add, &[p, 0]);
///
/// let for_jac = tapesweep::forward_jacobian_sparsity(&tape);
/// let mut flags = vec![false; tape.len()];
/// flags[f as usize] = true;
/// let sweep = tapesweep::reverse_hessian_sparsity_seeded(&tape, &for_jac, flags);
/// assert_eq!(sweep.rev_hes.to_vec(0), vec![1]);
/// assert_eq!(sweep.rev_hes.to_vec(1), vec![0]);
/// assert!(sweep.jac_reverse.iter().all(|&b| b));
/// ```
pub fn reverse_hessian_sparsity_seeded(
    tape: &Tape,
    for_jac: &VectorPack,
    jac_reverse: Vec<bool>,
) -> HessianSweep {
    tape.reverse_hessian_sparsity(for_jac, jac_reverse)
}

/// Jacobian sparsity pattern of the tape outputs.
pub fn jacobian_sparsity(tape: &Tape) -> JacobianSparsityPattern {
    tape.jacobian_sparsity()
}

/// Hessian sparsity pattern of the sum of the tape outputs.
///
/// ```
/// use tapesweep::{OpCode, Tape};
///
/// // f(x, y, z) = x·y + sin(z)
/// let mut tape = Tape::new();
/// tape.declare_independent(3);
/// let xy = tape.append(OpCode::Mul, &[0, 1]);
/// let s = tape.append(OpCode::Sin, &[2]);
/// let f = tape.append(OpCode::Add, &[xy, s]);
/// tape.set_outputs(&[f]);
///
/// let p = tapesweep::hessian_sparsity(&tape);
/// assert!(p.contains(0, 1));
/// assert!(p.contains(2, 2));
/// assert!(!p.contains(0, 0));
/// assert!(!p.contains(0, 2));
/// ```
pub fn hessian_sparsity(tape: &Tape) -> SparsityPattern {
    tape.hessian_sparsity(tape.outputs())
}
