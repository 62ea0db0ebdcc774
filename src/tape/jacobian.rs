use crate::base::Base;
use crate::error::Result;
use crate::pattern::{self, JacobianSparsityPattern};
use crate::registry::Registry;

impl super::Tape {
    /// Dense Jacobian of the tape outputs via reverse mode.
    ///
    /// Performs one forward sweep and `m` reverse sweeps (one per output).
    /// Returns `(output_values, J)` with `J[i][j] = ∂f_i/∂x_j`.
    pub fn jacobian<T: Base>(
        &self,
        registry: &Registry<T>,
        inputs: &[T],
    ) -> Result<(Vec<T>, Vec<Vec<T>>)> {
        let sweep = self.forward(registry, inputs)?;
        let mut jac = Vec::with_capacity(self.outputs.len());
        for &out in &self.outputs {
            jac.push(self.reverse(registry, &sweep.values, &[(out, T::one())])?);
        }
        Ok((sweep.values_at(&self.outputs), jac))
    }

    /// Sparse Jacobian via column compression.
    ///
    /// Detects the Jacobian sparsity, colors its columns, and seeds one
    /// forward direction per color; all directions share a single forward
    /// sweep. Returns `(output_values, pattern, jacobian_values)` where
    /// `jacobian_values[k]` is the entry at `(pattern.rows[k], pattern.cols[k])`.
    pub fn sparse_jacobian<T: Base>(
        &self,
        registry: &Registry<T>,
        inputs: &[T],
    ) -> Result<(Vec<T>, JacobianSparsityPattern, Vec<T>)> {
        let n = self.num_independent as usize;
        let pattern = self.jacobian_sparsity();
        let (colors, num_colors) = pattern::column_coloring(&pattern);
        tracing::debug!(nnz = pattern.nnz(), colors = num_colors, "sparse jacobian");

        let directions: Vec<Vec<T>> = (0..num_colors)
            .map(|color| {
                (0..n)
                    .map(|j| if colors[j] == color { T::one() } else { T::zero() })
                    .collect()
            })
            .collect();
        let sweep = self.forward_directions(registry, inputs, &directions)?;

        // For entry (row, col), the tangent of output `row` along the
        // direction of col's color gives J[row][col].
        let jac_values = pattern
            .rows
            .iter()
            .zip(pattern.cols.iter())
            .map(|(&row, &col)| {
                sweep.tangent(colors[col as usize] as usize, self.outputs[row as usize])
            })
            .collect();

        Ok((sweep.values_at(&self.outputs), pattern, jac_values))
    }
}
