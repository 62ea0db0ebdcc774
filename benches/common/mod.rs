use tapesweep::{NodeIndex, OpCode, Tape};

// ─── Rosenbrock ────────────────────────────────────────────────────────────
// f(x) = Σ (1 - x_i)² + 100 (x_{i+1} - x_i²)²
// Tridiagonal Hessian.

pub fn rosenbrock_tape(n: usize) -> Tape {
    let mut tape = Tape::with_capacity(n * 10);
    tape.declare_independent(n);
    let one = tape.constant(1.0);
    let hundred = tape.constant(100.0);

    let mut sum: Option<NodeIndex> = None;
    for i in 0..n as NodeIndex - 1 {
        let t1 = tape.append(OpCode::Sub, &[one, i]);
        let t1sq = tape.append(OpCode::Mul, &[t1, t1]);
        let xsq = tape.append(OpCode::Mul, &[i, i]);
        let t2 = tape.append(OpCode::Sub, &[i + 1, xsq]);
        let t2sq = tape.append(OpCode::Mul, &[t2, t2]);
        let scaled = tape.append(OpCode::Mul, &[hundred, t2sq]);
        let term = tape.append(OpCode::Add, &[t1sq, scaled]);
        sum = Some(match sum {
            Some(s) => tape.append(OpCode::Add, &[s, term]),
            None => term,
        });
    }
    if let Some(s) = sum {
        tape.set_outputs(&[s]);
    }
    tape
}

// ─── Rastrigin ─────────────────────────────────────────────────────────────
// f(x) = Σ [x_i² - 10·cos(2π·x_i)]
// Diagonal Hessian, exercises cos.

pub fn rastrigin_tape(n: usize) -> Tape {
    let mut tape = Tape::with_capacity(n * 6);
    tape.declare_independent(n);
    let ten = tape.constant(10.0);
    let two_pi = tape.constant(std::f64::consts::TAU);

    let mut sum: Option<NodeIndex> = None;
    for i in 0..n as NodeIndex {
        let sq = tape.append(OpCode::Mul, &[i, i]);
        let arg = tape.append(OpCode::Mul, &[two_pi, i]);
        let c = tape.append(OpCode::Cos, &[arg]);
        let tc = tape.append(OpCode::Mul, &[ten, c]);
        let term = tape.append(OpCode::Sub, &[sq, tc]);
        sum = Some(match sum {
            Some(s) => tape.append(OpCode::Add, &[s, term]),
            None => term,
        });
    }
    if let Some(s) = sum {
        tape.set_outputs(&[s]);
    }
    tape
}

pub fn make_input(n: usize) -> Vec<f64> {
    (0..n).map(|i| 0.5 + 0.01 * i as f64).collect()
}
