//! Shared tape builders for the integration tests.
#![allow(dead_code)]

use proptest::prelude::*;
use proptest::sample::Index;
use tapesweep::{NodeIndex, OpCode, OpKind, Tape};

/// Route sweep logs to the test harness; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Ops with bounded values and derivatives on `0.3..0.9` inputs, safe for
/// finite differences.
pub const SMOOTH_OPS: &[OpCode] = &[
    OpCode::Add,
    OpCode::Sub,
    OpCode::Mul,
    OpCode::Sin,
    OpCode::Cos,
    OpCode::Neg,
    OpCode::Tanh,
];

/// Ops used by the structural tests, including constants (`Const`).
pub const ALL_OPS: &[OpCode] = &[
    OpCode::Const,
    OpCode::Add,
    OpCode::Sub,
    OpCode::Mul,
    OpCode::Div,
    OpCode::Pow,
    OpCode::Neg,
    OpCode::Recip,
    OpCode::Sqrt,
    OpCode::Exp,
    OpCode::Ln,
    OpCode::Sin,
    OpCode::Cos,
    OpCode::Tanh,
    OpCode::Atan,
];

/// One recording step: palette selector plus two operand picks.
pub type Step = (usize, Index, Index);

pub fn steps(max_len: usize) -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec((0usize..64, any::<Index>(), any::<Index>()), 1..max_len)
}

/// Record a random tape.
///
/// Each step appends `palette[sel % palette.len()]` (plus an optional
/// discrete custom op, `step`) with operands picked among the nodes recorded
/// so far. The last node is the first output; with `two_outputs` the
/// midpoint node is the second.
pub fn build_tape(n_inputs: usize, steps: &[Step], palette: &[OpCode], with_discrete: bool) -> Tape {
    let mut tape = Tape::new();
    tape.declare_independent(n_inputs);

    let mut ops = palette.to_vec();
    if with_discrete {
        let id = tape.declare_custom("step", OpKind::DiscreteUnary);
        ops.push(OpCode::Custom(id));
    }

    for (sel, a, b) in steps {
        let op = ops[sel % ops.len()];
        let len = tape.len();
        if op == OpCode::Const {
            tape.constant(0.5 + (*sel as f64) / 64.0);
            continue;
        }
        let x = a.index(len) as NodeIndex;
        let y = b.index(len) as NodeIndex;
        if tape.kind(op).arity() == 2 {
            tape.append(op, &[x, y]);
        } else {
            tape.append(op, &[x]);
        }
    }

    let last = (tape.len() - 1) as NodeIndex;
    tape.set_outputs(&[last]);
    tape
}

/// Like [`build_tape`] but with two outputs: the last node and the one
/// recorded halfway through.
pub fn build_tape_two_outputs(
    n_inputs: usize,
    steps: &[Step],
    palette: &[OpCode],
    with_discrete: bool,
) -> Tape {
    let mut tape = build_tape(n_inputs, steps, palette, with_discrete);
    let last = (tape.len() - 1) as NodeIndex;
    let mid = (n_inputs + steps.len() / 2).min(tape.len() - 1) as NodeIndex;
    tape.set_outputs(&[last, mid]);
    tape
}

/// Nodes from which some node in `targets` is reachable along edges the
/// derivative sweeps follow (discrete ops cut the path).
pub fn reaches(tape: &Tape, targets: &[NodeIndex]) -> Vec<bool> {
    let mut flags = vec![false; tape.len()];
    for &t in targets {
        flags[t as usize] = true;
    }
    for op in tape.operations().collect::<Vec<_>>().into_iter().rev() {
        if flags[op.result as usize] && !op.kind.is_discrete() {
            for &arg in op.operands() {
                flags[arg as usize] = true;
            }
        }
    }
    flags
}

/// `f(x0, x1) = x0 * x1 + x0`: the first worked example of the Hessian sweep.
pub fn mul_plus_tape() -> Tape {
    let mut tape = Tape::new();
    tape.declare_independent(2);
    let p = tape.append(OpCode::Mul, &[0, 1]);
    let f = tape.append(OpCode::Add, &[p, 0]);
    tape.set_outputs(&[f]);
    tape
}

/// `f(x) = [x0 * x1, sin(x1) * x2, exp(x2)]`.
pub fn three_output_tape() -> Tape {
    let mut tape = Tape::new();
    tape.declare_independent(3);
    let a = tape.append(OpCode::Mul, &[0, 1]);
    let s = tape.append(OpCode::Sin, &[1]);
    let b = tape.append(OpCode::Mul, &[s, 2]);
    let c = tape.append(OpCode::Exp, &[2]);
    tape.set_outputs(&[a, b, c]);
    tape
}
