use rayon::prelude::*;

use crate::base::Base;
use crate::error::Result;
use crate::registry::Registry;
use crate::tape::NodeIndex;

impl super::Tape {
    /// Parallel Jacobian: one reverse sweep per output, parallelized.
    ///
    /// Returns `(output_values, J)` with `J[i][j] = ∂f_i/∂x_j`.
    pub fn jacobian_par<T: Base>(
        &self,
        registry: &Registry<T>,
        inputs: &[T],
    ) -> Result<(Vec<T>, Vec<Vec<T>>)> {
        let sweep = self.forward(registry, inputs)?;
        let values = &sweep.values;
        let jac = self
            .outputs
            .par_iter()
            .map(|&out| self.reverse(registry, values, &[(out, T::one())]))
            .collect::<Result<Vec<_>>>()?;
        Ok((sweep.values_at(&self.outputs), jac))
    }

    /// One reverse sweep per seed, in parallel, over shared forward values.
    ///
    /// `result[k]` holds the independent adjoints for `seeds[k]`.
    pub fn reverse_par<T: Base>(
        &self,
        registry: &Registry<T>,
        values: &[T],
        seeds: &[(NodeIndex, T)],
    ) -> Result<Vec<Vec<T>>> {
        let _span = tracing::debug_span!("reverse_par", seeds = seeds.len()).entered();
        seeds
            .par_iter()
            .map(|&seed| self.reverse(registry, values, &[seed]))
            .collect()
    }
}
