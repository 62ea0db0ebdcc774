//! Numeric rules for the opcodes a value sweep may meet.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::base::Base;
use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use crate::opcode::{self, CustomId, OpCode};
use crate::tape::NodeIndex;

/// Value and derivative rule of a caller-declared opcode.
///
/// The structural classification lives on the tape (see
/// [`Tape::declare_custom`](crate::Tape::declare_custom)); this trait only
/// supplies numbers. For unary ops `y` is zero and the second partial is
/// ignored.
///
/// # Example
///
/// ```
/// use tapesweep::CustomOp;
///
/// struct Softplus;
///
/// impl CustomOp<f64> for Softplus {
///     fn eval(&self, x: f64, _y: f64) -> f64 {
///         x.exp().ln_1p()
///     }
///     fn partials(&self, x: f64, _y: f64, _z: f64) -> (f64, f64) {
///         (1.0 / (1.0 + (-x).exp()), 0.0)
///     }
/// }
/// ```
pub trait CustomOp<T: Base>: Send + Sync {
    /// Forward evaluation.
    fn eval(&self, x: T, y: T) -> T;
    /// `(∂z/∂x, ∂z/∂y)` at the operands, given the result `z`.
    fn partials(&self, x: T, y: T, z: T) -> (T, T);
}

/// Opcode registry for base type `T`: the built-in catalog plus any custom
/// rules, together with the [`SweepConfig`] value sweeps run under.
pub struct Registry<T: Base> {
    custom: HashMap<CustomId, Arc<dyn CustomOp<T>>>,
    config: SweepConfig,
}

impl<T: Base> Registry<T> {
    /// Built-in catalog only, default configuration.
    pub fn new() -> Self {
        Registry {
            custom: HashMap::new(),
            config: SweepConfig::default(),
        }
    }

    /// Built-in catalog only, with `config`.
    pub fn with_config(config: SweepConfig) -> Self {
        Registry {
            custom: HashMap::new(),
            config,
        }
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_custom(mut self, id: CustomId, op: Arc<dyn CustomOp<T>>) -> Self {
        self.register(id, op);
        self
    }

    /// Attach the rule for custom opcode `id`, replacing any previous one.
    pub fn register(&mut self, id: CustomId, op: Arc<dyn CustomOp<T>>) {
        self.custom.insert(id, op);
    }

    /// Whether a rule is registered for `id`.
    pub fn has_custom(&self, id: CustomId) -> bool {
        self.custom.contains_key(&id)
    }

    #[inline]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    #[inline]
    fn custom_rule(&self, node: NodeIndex, id: CustomId) -> Result<&dyn CustomOp<T>> {
        self.custom
            .get(&id)
            .map(|op| op.as_ref())
            .ok_or(SweepError::MissingRule { node, id })
    }

    /// Evaluate `op` at node `node`, without domain checking.
    #[inline]
    pub fn eval(&self, node: NodeIndex, op: OpCode, x: T, y: T) -> Result<T> {
        match op {
            OpCode::Custom(id) => Ok(self.custom_rule(node, id)?.eval(x, y)),
            op => Ok(opcode::eval(op, x, y)),
        }
    }

    /// Partials of `op` at node `node`, without domain checking.
    #[inline]
    pub fn partials(&self, node: NodeIndex, op: OpCode, x: T, y: T, z: T) -> Result<(T, T)> {
        match op {
            OpCode::Custom(id) => Ok(self.custom_rule(node, id)?.partials(x, y, z)),
            op => Ok(opcode::partials(op, x, y, z)),
        }
    }
}

impl<T: Base> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Base> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.custom.keys().copied().collect();
        ids.sort();
        f.debug_struct("Registry")
            .field("custom", &ids)
            .field("config", &self.config)
            .finish()
    }
}
