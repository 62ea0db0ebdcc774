/// Runtime switches for value sweeps.
///
/// Carried by a [`Registry`](crate::Registry); sparsity sweeps are purely
/// structural and ignore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepConfig {
    /// Report [`SweepError::Domain`](crate::SweepError::Domain) when finite
    /// operands produce a non-finite value or partial. Operands that are
    /// already non-finite are not checked, so `inf - inf = NaN` passes
    /// through even when this is on. When off, NaN and infinities always
    /// propagate silently.
    pub check_domain: bool,
    /// Skip nodes whose adjoint is exactly zero in the reverse sweep. Their
    /// partials are never evaluated, so unreachable domain problems are not
    /// reported either.
    pub skip_zero_adjoints: bool,
}

impl SweepConfig {
    pub fn check_domain(mut self, on: bool) -> Self {
        self.check_domain = on;
        self
    }

    pub fn skip_zero_adjoints(mut self, on: bool) -> Self {
        self.skip_zero_adjoints = on;
        self
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            check_domain: true,
            skip_zero_adjoints: true,
        }
    }
}
