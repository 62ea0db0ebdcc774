use crate::base::Base;
use crate::error::Result;
use crate::opcode::OpCode;
use crate::registry::Registry;
use crate::tape::NodeIndex;

impl super::Tape {
    /// Reverse sweep with weighted seeds.
    ///
    /// Each `(node, weight)` seed adds `weight` to that node's adjoint; all
    /// other adjoints start at zero. `values` must come from a forward sweep
    /// of this tape.
    ///
    /// Returns the adjoints of the independent variables, i.e.
    /// `∑ weight · ∂node/∂x`.
    pub fn reverse<T: Base>(
        &self,
        registry: &Registry<T>,
        values: &[T],
        seeds: &[(NodeIndex, T)],
    ) -> Result<Vec<T>> {
        let mut adjoints = self.reverse_full(registry, values, seeds)?;
        adjoints.truncate(self.num_independent as usize);
        Ok(adjoints)
    }

    /// Like [`reverse`](Self::reverse) but returns the adjoint of every node.
    pub fn reverse_full<T: Base>(
        &self,
        registry: &Registry<T>,
        values: &[T],
        seeds: &[(NodeIndex, T)],
    ) -> Result<Vec<T>> {
        let n = self.opcodes.len();
        assert_eq!(values.len(), n, "values buffer has wrong length");

        let mut adjoints = vec![T::zero(); n];
        for &(node, weight) in seeds {
            assert!((node as usize) < n, "seed node {node} out of range ({n})");
            adjoints[node as usize] = adjoints[node as usize] + weight;
        }

        let _span = tracing::debug_span!("reverse_sweep", nodes = n, seeds = seeds.len()).entered();
        self.reverse_sweep_core(registry, values, &mut adjoints)?;
        tracing::trace!(nodes = n, "reverse sweep complete");
        Ok(adjoints)
    }

    /// Core reverse loop. Expects `adjoints` pre-seeded by the caller.
    ///
    /// Nodes are visited in decreasing index order, so a node's adjoint is
    /// final when it is distributed to its operands.
    pub(super) fn reverse_sweep_core<T: Base>(
        &self,
        registry: &Registry<T>,
        values: &[T],
        adjoints: &mut [T],
    ) -> Result<()> {
        let skip_zero = registry.config().skip_zero_adjoints;

        for i in (0..self.opcodes.len()).rev() {
            let adj = adjoints[i];
            if skip_zero && adj.is_zero() {
                continue;
            }

            let op = self.opcodes[i];
            if matches!(op, OpCode::Input | OpCode::Const) {
                continue;
            }
            let kind = self.kind(op);
            if kind.is_discrete() {
                continue;
            }

            let [a_idx, b_idx] = self.arg_indices[i];
            let binary = kind.arity() == 2;
            let x = values[a_idx as usize];
            let y = if binary { values[b_idx as usize] } else { T::zero() };
            let (dx, dy) = self.checked_partials(registry, i, op, x, y, values[i])?;

            if !self.is_parameter(a_idx) {
                adjoints[a_idx as usize] = adjoints[a_idx as usize] + adj * dx;
            }
            if binary && !self.is_parameter(b_idx) {
                adjoints[b_idx as usize] = adjoints[b_idx as usize] + adj * dy;
            }
        }
        Ok(())
    }

    /// Forward + reverse: value and gradient of the first output.
    pub fn gradient<T: Base>(&self, registry: &Registry<T>, inputs: &[T]) -> Result<(T, Vec<T>)> {
        assert!(!self.outputs.is_empty(), "tape has no outputs");
        let out = self.outputs[0];
        let sweep = self.forward(registry, inputs)?;
        let grad = self.reverse(registry, &sweep.values, &[(out, T::one())])?;
        Ok((sweep.value(out), grad))
    }
}
