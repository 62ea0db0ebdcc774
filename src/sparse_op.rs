//! Per-operation sparsity propagation rules.
//!
//! Every rule concerns one tape node `i_z` with operand indices `arg`; the
//! operands must precede the result (`arg[k] < i_z`). Forward rules write
//! only set `i_z`; reverse rules read set `i_z` and grow the operand sets.
//!
//! Hessian rules read `for_jac`, the forward Jacobian sparsity of every
//! node, and maintain `rev_hes` together with the `jac_reverse` flags. A flag
//! is true once the node can still influence the scalar whose Hessian
//! pattern is being computed; cross terms are only generated below such
//! nodes.

use crate::opcode::{CrossTerms, OpKind};
use crate::pack::VectorPack;

#[inline]
fn check_unary(i_z: usize, arg: usize) {
    assert!(arg < i_z, "operand {arg} must precede result {i_z}");
}

#[inline]
fn check_binary(i_z: usize, arg: [usize; 2]) {
    assert!(arg[0] < i_z, "operand {} must precede result {i_z}", arg[0]);
    assert!(arg[1] < i_z, "operand {} must precede result {i_z}", arg[1]);
}

// ── Forward Jacobian ──

/// `sparsity[i_z] = sparsity[arg]`.
#[inline]
pub fn forward_sparse_jacobian_unary_op(i_z: usize, arg: usize, sparsity: &mut VectorPack) {
    check_unary(i_z, arg);
    sparsity.union(i_z, arg, arg);
}

/// `sparsity[i_z] = sparsity[arg[0]] ∪ sparsity[arg[1]]`.
#[inline]
pub fn forward_sparse_jacobian_binary_op(i_z: usize, arg: [usize; 2], sparsity: &mut VectorPack) {
    check_binary(i_z, arg);
    sparsity.union(i_z, arg[0], arg[1]);
}

// ── Reverse Jacobian ──

/// `sparsity[arg] ∪= sparsity[i_z]`.
#[inline]
pub fn reverse_sparse_jacobian_unary_op(i_z: usize, arg: usize, sparsity: &mut VectorPack) {
    check_unary(i_z, arg);
    sparsity.union(arg, arg, i_z);
}

/// `sparsity[arg[k]] ∪= sparsity[i_z]` for both operands.
#[inline]
pub fn reverse_sparse_jacobian_binary_op(i_z: usize, arg: [usize; 2], sparsity: &mut VectorPack) {
    check_binary(i_z, arg);
    sparsity.union(arg[0], arg[0], i_z);
    sparsity.union(arg[1], arg[1], i_z);
}

// ── Reverse Hessian ──

/// Hessian rule for `z = f(x)` with constant derivative.
#[inline]
pub fn reverse_sparse_hessian_linear_unary_op(
    i_z: usize,
    arg: usize,
    jac_reverse: &mut [bool],
    rev_hes: &mut VectorPack,
) {
    check_unary(i_z, arg);
    rev_hes.union(arg, arg, i_z);
    jac_reverse[arg] |= jac_reverse[i_z];
}

/// Hessian rule for `z = f(x)` with nonzero second derivative: every pair of
/// variables feeding `x` becomes a potential Hessian entry.
#[inline]
pub fn reverse_sparse_hessian_nonlinear_unary_op(
    i_z: usize,
    arg: usize,
    jac_reverse: &mut [bool],
    for_jac: &VectorPack,
    rev_hes: &mut VectorPack,
) {
    check_unary(i_z, arg);
    rev_hes.union(arg, arg, i_z);
    if jac_reverse[i_z] {
        rev_hes.union_from(arg, arg, for_jac, arg);
    }
    jac_reverse[arg] |= jac_reverse[i_z];
}

/// Hessian rule for any binary operator, driven by its [`CrossTerms`].
///
/// Both operands inherit `rev_hes[i_z]` and `jac_reverse[i_z]`. When
/// `jac_reverse[i_z]` holds, each flagged cross term unions one operand's
/// forward-Jacobian set into an operand's Hessian set.
#[inline]
pub fn reverse_sparse_hessian_binary_op(
    i_z: usize,
    arg: [usize; 2],
    cross: CrossTerms,
    jac_reverse: &mut [bool],
    for_jac: &VectorPack,
    rev_hes: &mut VectorPack,
) {
    check_binary(i_z, arg);
    let [x, y] = arg;

    rev_hes.union(x, x, i_z);
    rev_hes.union(y, y, i_z);

    if jac_reverse[i_z] {
        if cross.x_x {
            rev_hes.union_from(x, x, for_jac, x);
        }
        if cross.x_y {
            rev_hes.union_from(x, x, for_jac, y);
        }
        if cross.y_x {
            rev_hes.union_from(y, y, for_jac, x);
        }
        if cross.y_y {
            rev_hes.union_from(y, y, for_jac, y);
        }
    }

    jac_reverse[x] |= jac_reverse[i_z];
    jac_reverse[y] |= jac_reverse[i_z];
}

/// Hessian rule for `x + y` and `x - y`: no cross terms.
#[inline]
pub fn reverse_sparse_hessian_addsub_op(
    i_z: usize,
    arg: [usize; 2],
    jac_reverse: &mut [bool],
    for_jac: &VectorPack,
    rev_hes: &mut VectorPack,
) {
    reverse_sparse_hessian_binary_op(i_z, arg, CrossTerms::NONE, jac_reverse, for_jac, rev_hes);
}

/// Hessian rule for `x * y`: `∂²z/∂x∂y = 1`.
#[inline]
pub fn reverse_sparse_hessian_mul_op(
    i_z: usize,
    arg: [usize; 2],
    jac_reverse: &mut [bool],
    for_jac: &VectorPack,
    rev_hes: &mut VectorPack,
) {
    reverse_sparse_hessian_binary_op(i_z, arg, CrossTerms::MUL, jac_reverse, for_jac, rev_hes);
}

/// Hessian rule for `x / y`: mixed partials plus `∂²z/∂y²`.
#[inline]
pub fn reverse_sparse_hessian_div_op(
    i_z: usize,
    arg: [usize; 2],
    jac_reverse: &mut [bool],
    for_jac: &VectorPack,
    rev_hes: &mut VectorPack,
) {
    reverse_sparse_hessian_binary_op(i_z, arg, CrossTerms::DIV, jac_reverse, for_jac, rev_hes);
}

/// Hessian rule for `pow(x, y)`: all four second partials.
///
/// The `jac_reverse` propagation to the operands never changes any Hessian
/// set (the cross terms generated here already cover everything the operands
/// could add), but it keeps the returned flags consistent with the other
/// operators.
#[inline]
pub fn reverse_sparse_hessian_pow_op(
    i_z: usize,
    arg: [usize; 2],
    jac_reverse: &mut [bool],
    for_jac: &VectorPack,
    rev_hes: &mut VectorPack,
) {
    reverse_sparse_hessian_binary_op(i_z, arg, CrossTerms::POW, jac_reverse, for_jac, rev_hes);
}

/// Dispatch the reverse Hessian rule for a node of the given kind.
///
/// `arg` holds the operand indices; slots beyond the kind's arity are
/// ignored. Leaves and discrete operations propagate nothing.
#[inline]
pub fn reverse_sparse_hessian_op(
    kind: OpKind,
    i_z: usize,
    arg: [usize; 2],
    jac_reverse: &mut [bool],
    for_jac: &VectorPack,
    rev_hes: &mut VectorPack,
) {
    match kind {
        OpKind::Independent | OpKind::Parameter | OpKind::DiscreteUnary => {}
        OpKind::LinearUnary => {
            reverse_sparse_hessian_linear_unary_op(i_z, arg[0], jac_reverse, rev_hes)
        }
        OpKind::NonlinearUnary => {
            reverse_sparse_hessian_nonlinear_unary_op(i_z, arg[0], jac_reverse, for_jac, rev_hes)
        }
        OpKind::LinearBinary => {
            reverse_sparse_hessian_addsub_op(i_z, arg, jac_reverse, for_jac, rev_hes)
        }
        OpKind::NonlinearBinary(cross) => {
            reverse_sparse_hessian_binary_op(i_z, arg, cross, jac_reverse, for_jac, rev_hes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Nodes 0, 1 are variables with singleton forward sets; node 2 is the
    /// result of the operator under test.
    fn two_var_setup() -> (VectorPack, VectorPack, Vec<bool>) {
        let mut for_jac = VectorPack::new(3, 2);
        for_jac.add_element(0, 0);
        for_jac.add_element(1, 1);
        for_jac.union(2, 0, 1);
        let rev_hes = VectorPack::new(3, 2);
        let jac_reverse = vec![false, false, true];
        (for_jac, rev_hes, jac_reverse)
    }

    #[test]
    fn forward_binary_unions_operands() {
        let (mut sparsity, _, _) = two_var_setup();
        sparsity.clear(2);
        forward_sparse_jacobian_binary_op(2, [0, 1], &mut sparsity);
        assert_eq!(sparsity.to_vec(2), vec![0, 1]);
    }

    #[test]
    fn forward_unary_copies_operand() {
        let mut sparsity = VectorPack::new(2, 3);
        sparsity.add_element(0, 2);
        forward_sparse_jacobian_unary_op(1, 0, &mut sparsity);
        assert_eq!(sparsity.to_vec(1), vec![2]);
    }

    #[test]
    fn reverse_binary_pushes_to_both_operands() {
        let mut sparsity = VectorPack::new(3, 2);
        sparsity.add_element(2, 1);
        sparsity.add_element(0, 0);
        reverse_sparse_jacobian_binary_op(2, [0, 1], &mut sparsity);
        assert_eq!(sparsity.to_vec(0), vec![0, 1]);
        assert_eq!(sparsity.to_vec(1), vec![1]);
    }

    #[test]
    #[should_panic(expected = "must precede")]
    fn operand_after_result_panics() {
        let mut sparsity = VectorPack::new(3, 2);
        forward_sparse_jacobian_binary_op(1, [0, 2], &mut sparsity);
    }

    #[test]
    fn addsub_adds_no_cross_terms() {
        let (for_jac, mut rev_hes, mut jac_reverse) = two_var_setup();
        reverse_sparse_hessian_addsub_op(2, [0, 1], &mut jac_reverse, &for_jac, &mut rev_hes);
        assert!(rev_hes.is_empty(0));
        assert!(rev_hes.is_empty(1));
        assert_eq!(jac_reverse, vec![true, true, true]);
    }

    #[test]
    fn mul_cross_terms_are_symmetric() {
        let (for_jac, mut rev_hes, mut jac_reverse) = two_var_setup();
        reverse_sparse_hessian_mul_op(2, [0, 1], &mut jac_reverse, &for_jac, &mut rev_hes);
        assert_eq!(rev_hes.to_vec(0), vec![1]);
        assert_eq!(rev_hes.to_vec(1), vec![0]);
        assert!(for_jac.is_subset(1, &rev_hes, 0));
        assert!(for_jac.is_subset(0, &rev_hes, 1));
    }

    #[test]
    fn div_adds_denominator_self_term() {
        let (for_jac, mut rev_hes, mut jac_reverse) = two_var_setup();
        reverse_sparse_hessian_div_op(2, [0, 1], &mut jac_reverse, &for_jac, &mut rev_hes);
        assert_eq!(rev_hes.to_vec(0), vec![1]);
        assert_eq!(rev_hes.to_vec(1), vec![0, 1]);
    }

    #[test]
    fn pow_covers_all_second_partials() {
        let (for_jac, mut rev_hes, mut jac_reverse) = two_var_setup();
        reverse_sparse_hessian_pow_op(2, [0, 1], &mut jac_reverse, &for_jac, &mut rev_hes);
        assert_eq!(rev_hes.to_vec(0), vec![0, 1]);
        assert_eq!(rev_hes.to_vec(1), vec![0, 1]);
        assert!(jac_reverse[0] && jac_reverse[1]);
    }

    #[test]
    fn cleared_flag_prunes_cross_terms() {
        let (for_jac, mut rev_hes, mut jac_reverse) = two_var_setup();
        jac_reverse[2] = false;
        reverse_sparse_hessian_pow_op(2, [0, 1], &mut jac_reverse, &for_jac, &mut rev_hes);
        reverse_sparse_hessian_nonlinear_unary_op(2, 0, &mut jac_reverse, &for_jac, &mut rev_hes);
        assert!(rev_hes.is_empty(0));
        assert!(rev_hes.is_empty(1));
        assert_eq!(jac_reverse, vec![false, false, false]);
    }

    #[test]
    fn nonlinear_unary_adds_operand_self_term() {
        let (for_jac, mut rev_hes, mut jac_reverse) = two_var_setup();
        reverse_sparse_hessian_nonlinear_unary_op(2, 1, &mut jac_reverse, &for_jac, &mut rev_hes);
        assert_eq!(rev_hes.to_vec(1), vec![1]);
        assert!(rev_hes.is_empty(0));
        assert!(jac_reverse[1]);
    }

    #[test]
    fn square_via_mul_with_aliased_operands() {
        let (for_jac, mut rev_hes, mut jac_reverse) = two_var_setup();
        reverse_sparse_hessian_mul_op(2, [0, 0], &mut jac_reverse, &for_jac, &mut rev_hes);
        assert_eq!(rev_hes.to_vec(0), vec![0]);
        assert!(rev_hes.is_empty(1));
    }

    #[test]
    fn discrete_dispatch_is_a_no_op() {
        let (for_jac, mut rev_hes, mut jac_reverse) = two_var_setup();
        rev_hes.add_element(2, 1);
        reverse_sparse_hessian_op(
            OpKind::DiscreteUnary,
            2,
            [0, usize::MAX],
            &mut jac_reverse,
            &for_jac,
            &mut rev_hes,
        );
        assert!(rev_hes.is_empty(0));
        assert!(!jac_reverse[0]);
    }
}
