use std::collections::BTreeSet;

use crate::opcode::OpCode;
use crate::pack::VectorPack;
use crate::pattern::{JacobianSparsityPattern, SparsityPattern};
use crate::sparse_op;
use crate::tape::NodeIndex;

/// Result of a reverse Hessian sparsity sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HessianSweep {
    /// `rev_hes[i]` holds the variables `j` for which `∂²f/∂xᵢ∂xⱼ` may be
    /// nonzero, where `i` is read through node `i`'s dependence on the
    /// independents. For an independent node it is a Hessian row.
    pub rev_hes: VectorPack,
    /// Whether each node can influence the seeded scalar.
    pub jac_reverse: Vec<bool>,
}

impl super::Tape {
    /// Forward Jacobian sparsity: node `i`'s set holds the independent
    /// variables it may depend on.
    pub fn forward_jacobian_sparsity(&self) -> VectorPack {
        let n = self.opcodes.len();
        let ni = self.num_independent as usize;
        let _span = tracing::debug_span!("forward_jacobian_sparsity", nodes = n, vars = ni).entered();

        let mut sparsity = VectorPack::new(n, ni);
        for (i, (&op, &[a, b])) in
            self.opcodes.iter().zip(&self.arg_indices).enumerate()
        {
            match op {
                OpCode::Input => sparsity.add_element(i, i),
                OpCode::Const => {}
                op => {
                    let kind = self.kind(op);
                    if kind.is_discrete() {
                        continue;
                    }
                    if kind.arity() == 2 {
                        sparse_op::forward_sparse_jacobian_binary_op(
                            i,
                            [a as usize, b as usize],
                            &mut sparsity,
                        );
                    } else {
                        sparse_op::forward_sparse_jacobian_unary_op(i, a as usize, &mut sparsity);
                    }
                }
            }
        }

        tracing::trace!(nodes = n, "forward jacobian sparsity complete");
        sparsity
    }

    /// Reverse Jacobian sparsity with output `k` (the node `outputs[k]`)
    /// seeded with `{k}`. Node `i`'s set holds the outputs that may depend
    /// on it.
    pub fn reverse_jacobian_sparsity(&self, outputs: &[NodeIndex]) -> VectorPack {
        let mut sparsity = VectorPack::new(self.opcodes.len(), outputs.len());
        for (k, &node) in outputs.iter().enumerate() {
            sparsity.add_element(node as usize, k);
        }
        self.reverse_jacobian_sparsity_seeded(&mut sparsity);
        sparsity
    }

    /// Reverse Jacobian sparsity over a caller-seeded pack. The pack must
    /// hold one set per node; its capacity is up to the caller.
    pub fn reverse_jacobian_sparsity_seeded(&self, sparsity: &mut VectorPack) {
        let n = self.opcodes.len();
        assert_eq!(sparsity.n_set(), n, "sparsity pack must hold one set per node");
        let _span =
            tracing::debug_span!("reverse_jacobian_sparsity", nodes = n, end = sparsity.end())
                .entered();

        for i in (0..n).rev() {
            let op = self.opcodes[i];
            if matches!(op, OpCode::Input | OpCode::Const) {
                continue;
            }
            let kind = self.kind(op);
            if kind.is_discrete() {
                continue;
            }
            let [a, b] = self.arg_indices[i];
            if kind.arity() == 2 {
                sparse_op::reverse_sparse_jacobian_binary_op(i, [a as usize, b as usize], sparsity);
            } else {
                sparse_op::reverse_sparse_jacobian_unary_op(i, a as usize, sparsity);
            }
        }

        tracing::trace!(nodes = n, "reverse jacobian sparsity complete");
    }

    /// Reverse Hessian sparsity.
    ///
    /// `for_jac` is the forward Jacobian sparsity of this tape (see
    /// [`forward_jacobian_sparsity`](Self::forward_jacobian_sparsity)) and
    /// `jac_reverse` flags the nodes whose weighted sum is the scalar of
    /// interest, one flag per node. Cross terms are only generated below
    /// flagged nodes.
    pub fn reverse_hessian_sparsity(
        &self,
        for_jac: &VectorPack,
        mut jac_reverse: Vec<bool>,
    ) -> HessianSweep {
        let n = self.opcodes.len();
        assert_eq!(for_jac.n_set(), n, "forward jacobian pack must hold one set per node");
        assert_eq!(jac_reverse.len(), n, "jac_reverse must hold one flag per node");
        let _span = tracing::debug_span!(
            "reverse_hessian_sparsity",
            nodes = n,
            vars = for_jac.end(),
            seeded = jac_reverse.iter().filter(|&&f| f).count()
        )
        .entered();

        let mut rev_hes = VectorPack::new(n, for_jac.end());
        for i in (0..n).rev() {
            let kind = self.kind(self.opcodes[i]);
            let [a, b] = self.arg_indices[i];
            sparse_op::reverse_sparse_hessian_op(
                kind,
                i,
                [a as usize, b as usize],
                &mut jac_reverse,
                for_jac,
                &mut rev_hes,
            );
        }

        tracing::trace!(nodes = n, "reverse hessian sparsity complete");
        HessianSweep {
            rev_hes,
            jac_reverse,
        }
    }

    /// Hessian sparsity of the sum of the given output nodes, as a symmetric
    /// pattern over the independent variables.
    pub fn hessian_sparsity(&self, outputs: &[NodeIndex]) -> SparsityPattern {
        let n = self.opcodes.len();
        let ni = self.num_independent as usize;

        let for_jac = self.forward_jacobian_sparsity();
        let mut jac_reverse = vec![false; n];
        for &node in outputs {
            assert!((node as usize) < n, "output {node} out of range ({n})");
            jac_reverse[node as usize] = true;
        }
        let sweep = self.reverse_hessian_sparsity(&for_jac, jac_reverse);

        let mut entries = BTreeSet::new();
        for row in 0..ni {
            for col in sweep.rev_hes.iter(row) {
                let (r, c) = if row >= col { (row, col) } else { (col, row) };
                entries.insert((r as u32, c as u32));
            }
        }
        SparsityPattern::from_entries(ni, entries)
    }

    /// Jacobian sparsity of the tape outputs over the independent variables.
    pub fn jacobian_sparsity(&self) -> JacobianSparsityPattern {
        let for_jac = self.forward_jacobian_sparsity();
        let mut rows = Vec::new();
        let mut cols = Vec::new();
        for (r, &node) in self.outputs.iter().enumerate() {
            for c in for_jac.iter(node as usize) {
                rows.push(r as u32);
                cols.push(c as u32);
            }
        }
        JacobianSparsityPattern {
            num_rows: self.outputs.len(),
            num_cols: self.num_independent as usize,
            rows,
            cols,
        }
    }
}
