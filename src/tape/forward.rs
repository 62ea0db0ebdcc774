use crate::base::Base;
use crate::error::{DomainKind, Result, SweepError};
use crate::opcode::OpCode;
use crate::registry::Registry;
use crate::tape::NodeIndex;

/// Result of a forward value sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct ForwardSweep<T> {
    /// Value of every node, indexed by [`NodeIndex`].
    pub values: Vec<T>,
    /// `tangents[d][i]` is the derivative of node `i` along seed direction `d`.
    pub tangents: Vec<Vec<T>>,
}

impl<T: Base> ForwardSweep<T> {
    #[inline]
    pub fn value(&self, node: NodeIndex) -> T {
        self.values[node as usize]
    }

    #[inline]
    pub fn tangent(&self, direction: usize, node: NodeIndex) -> T {
        self.tangents[direction][node as usize]
    }

    /// Values at the given nodes, typically [`Tape::outputs`](super::Tape::outputs).
    pub fn values_at(&self, nodes: &[NodeIndex]) -> Vec<T> {
        nodes.iter().map(|&i| self.values[i as usize]).collect()
    }
}

impl super::Tape {
    /// Forward sweep computing the value of every node.
    pub fn forward<T: Base>(&self, registry: &Registry<T>, inputs: &[T]) -> Result<ForwardSweep<T>> {
        self.forward_directions::<T, &[T]>(registry, inputs, &[])
    }

    /// Forward sweep computing values and one directional derivative per
    /// seed direction. Each direction has one entry per independent variable.
    ///
    /// Nodes are processed strictly in increasing index order; every operand
    /// is final before it is read.
    pub fn forward_directions<T: Base, D: AsRef<[T]>>(
        &self,
        registry: &Registry<T>,
        inputs: &[T],
        directions: &[D],
    ) -> Result<ForwardSweep<T>> {
        let ni = self.num_independent as usize;
        assert_eq!(inputs.len(), ni, "wrong number of inputs");
        for d in directions {
            assert_eq!(d.as_ref().len(), ni, "direction length must match inputs");
        }

        let n = self.opcodes.len();
        let _span =
            tracing::debug_span!("forward_sweep", nodes = n, directions = directions.len())
                .entered();

        let mut values: Vec<T> = Vec::with_capacity(n);
        let mut tangents: Vec<Vec<T>> = directions.iter().map(|_| Vec::with_capacity(n)).collect();

        for (i, (&op, &[a_idx, b_idx])) in
            self.opcodes.iter().zip(&self.arg_indices).enumerate()
        {
            match op {
                OpCode::Input => {
                    values.push(inputs[i]);
                    for (t, d) in tangents.iter_mut().zip(directions) {
                        t.push(d.as_ref()[i]);
                    }
                }
                OpCode::Const => {
                    values.push(T::from_f64(self.constants[a_idx as usize]));
                    for t in &mut tangents {
                        t.push(T::zero());
                    }
                }
                op => {
                    let kind = self.kind(op);
                    let binary = kind.arity() == 2;
                    let x = values[a_idx as usize];
                    let y = if binary { values[b_idx as usize] } else { T::zero() };
                    let z = self.checked_eval(registry, i, op, x, y)?;

                    if !tangents.is_empty() {
                        if kind.is_discrete() {
                            for t in &mut tangents {
                                t.push(T::zero());
                            }
                        } else {
                            let (dx, dy) = self.checked_partials(registry, i, op, x, y, z)?;
                            let x_var = !self.is_parameter(a_idx);
                            let y_var = binary && !self.is_parameter(b_idx);
                            for t in &mut tangents {
                                let mut dz = T::zero();
                                if x_var {
                                    dz = dz + dx * t[a_idx as usize];
                                }
                                if y_var {
                                    dz = dz + dy * t[b_idx as usize];
                                }
                                t.push(dz);
                            }
                        }
                    }
                    values.push(z);
                }
            }
        }

        tracing::trace!(nodes = n, "forward sweep complete");
        Ok(ForwardSweep { values, tangents })
    }

    /// Evaluate node `i`, reporting non-finite results of finite operands.
    #[inline]
    pub(super) fn checked_eval<T: Base>(
        &self,
        registry: &Registry<T>,
        i: usize,
        op: OpCode,
        x: T,
        y: T,
    ) -> Result<T> {
        let node = i as NodeIndex;
        let z = registry.eval(node, op, x, y)?;
        if registry.config().check_domain && x.is_finite() && y.is_finite() && !z.is_finite() {
            tracing::warn!(node, opcode = %op, "non-finite value from finite operands");
            return Err(SweepError::Domain {
                node,
                opcode: op,
                kind: DomainKind::Value,
            });
        }
        Ok(z)
    }

    /// Partials of node `i`, reporting non-finite derivatives with respect
    /// to variable (non-constant) operands.
    #[inline]
    pub(super) fn checked_partials<T: Base>(
        &self,
        registry: &Registry<T>,
        i: usize,
        op: OpCode,
        x: T,
        y: T,
        z: T,
    ) -> Result<(T, T)> {
        let node = i as NodeIndex;
        let (dx, dy) = registry.partials(node, op, x, y, z)?;
        if registry.config().check_domain && x.is_finite() && y.is_finite() {
            let [a_idx, b_idx] = self.arg_indices[i];
            let binary = self.kind(op).arity() == 2;
            let bad_x = !dx.is_finite() && !self.is_parameter(a_idx);
            let bad_y = binary && !dy.is_finite() && !self.is_parameter(b_idx);
            if bad_x || bad_y {
                tracing::warn!(node, opcode = %op, "non-finite derivative from finite operands");
                return Err(SweepError::Domain {
                    node,
                    opcode: op,
                    kind: DomainKind::Derivative,
                });
            }
        }
        Ok((dx, dy))
    }
}
