use approx::assert_relative_eq;
use tapesweep::{column_coloring, OpCode, OpKind, Registry, Tape};

mod common;
use common::three_output_tape;

/// Banded map: `y_i = x_i * x_{i+1}` for `i < n - 1`.
fn banded(n: usize) -> Tape {
    let mut tape = Tape::new();
    tape.declare_independent(n);
    let outs: Vec<u32> = (0..n as u32 - 1)
        .map(|i| tape.append(OpCode::Mul, &[i, i + 1]))
        .collect();
    tape.set_outputs(&outs);
    tape
}

#[test]
fn forward_sets_track_input_dependence() {
    let tape = three_output_tape();
    let pack = tape.forward_jacobian_sparsity();
    assert_eq!(pack.n_set(), tape.len());
    assert_eq!(pack.end(), 3);

    for j in 0..3 {
        assert_eq!(pack.to_vec(j), vec![j]);
    }
    let out = tape.outputs();
    assert_eq!(pack.to_vec(out[0] as usize), vec![0, 1]);
    assert_eq!(pack.to_vec(out[1] as usize), vec![1, 2]);
    assert_eq!(pack.to_vec(out[2] as usize), vec![2]);
}

#[test]
fn subtracting_a_value_from_itself_over_approximates() {
    let mut tape = Tape::new();
    tape.declare_independent(1);
    let z = tape.append(OpCode::Sub, &[0, 0]);
    let pack = tape.forward_jacobian_sparsity();
    assert_eq!(pack.to_vec(z as usize), vec![0]);
}

#[test]
fn constants_and_discrete_ops_have_empty_sets() {
    let mut tape = Tape::new();
    tape.declare_independent(2);
    let floor = tape.declare_custom("floor", OpKind::DiscreteUnary);
    let c = tape.constant(1.5);
    let f = tape.append(OpCode::Custom(floor), &[0]);
    let m = tape.append(OpCode::Mul, &[f, c]);
    let s = tape.append(OpCode::Add, &[m, 1]);
    tape.set_outputs(&[s]);

    let pack = tape.forward_jacobian_sparsity();
    assert!(pack.is_empty(c as usize));
    assert!(pack.is_empty(f as usize));
    assert!(pack.is_empty(m as usize));
    assert_eq!(pack.to_vec(s as usize), vec![1]);

    let rev = tape.reverse_jacobian_sparsity(tape.outputs());
    assert!(rev.is_empty(0));
    assert_eq!(rev.to_vec(1), vec![0]);
}

#[test]
fn reverse_sets_name_dependent_outputs() {
    let tape = three_output_tape();
    let rev = tape.reverse_jacobian_sparsity(tape.outputs());
    assert_eq!(rev.end(), 3);
    assert_eq!(rev.to_vec(0), vec![0]);
    assert_eq!(rev.to_vec(1), vec![0, 1]);
    assert_eq!(rev.to_vec(2), vec![1, 2]);
}

#[test]
fn seeded_reverse_sweep_accepts_any_capacity() {
    // Seed two outputs into the same element: the union of their dependencies.
    let tape = three_output_tape();
    let out = tape.outputs();
    let mut pack = tapesweep::VectorPack::new(tape.len(), 1);
    pack.add_element(out[0] as usize, 0);
    pack.add_element(out[2] as usize, 0);
    tape.reverse_jacobian_sparsity_seeded(&mut pack);
    assert!(pack.test(0, 0));
    assert!(pack.test(1, 0));
    assert!(pack.test(2, 0));
}

#[test]
fn seeded_entry_point_matches_tape_method() {
    let tape = three_output_tape();
    let out = tape.outputs();
    let mut pack = tapesweep::VectorPack::new(tape.len(), 2);
    pack.add_element(out[1] as usize, 0);
    pack.add_element(out[2] as usize, 1);
    let mut expected = pack.clone();

    tapesweep::reverse_jacobian_sparsity_seeded(&tape, &mut pack);
    tape.reverse_jacobian_sparsity_seeded(&mut expected);
    assert_eq!(pack, expected);
    assert!(!pack.test(0, 0) && !pack.test(0, 1));
    assert_eq!(pack.to_vec(1), vec![0]);
    assert_eq!(pack.to_vec(2), vec![0, 1]);
}

#[test]
fn jacobian_pattern_is_sorted_coo() {
    let tape = banded(5);
    let p = tape.jacobian_sparsity();
    assert_eq!(p.num_rows, 4);
    assert_eq!(p.num_cols, 5);
    assert_eq!(p.nnz(), 8);
    for i in 0..4 {
        assert!(p.contains(i, i));
        assert!(p.contains(i, i + 1));
        assert!(!p.contains(i, (i + 2) % 5));
    }
    let pairs: Vec<_> = p.rows.iter().zip(&p.cols).collect();
    let mut sorted = pairs.clone();
    sorted.sort();
    assert_eq!(pairs, sorted);
}

#[test]
fn banded_jacobian_compresses_to_two_colors() {
    let tape = banded(6);
    let p = tape.jacobian_sparsity();
    let (_, num_colors) = column_coloring(&p);
    assert_eq!(num_colors, 2);
}

#[test]
fn sparse_jacobian_matches_dense() {
    let tape = banded(6);
    let x = [0.5_f64, -1.0, 2.0, 0.25, 3.0, -0.5];
    let reg = Registry::new();

    let (y_sparse, pattern, values) = tape.sparse_jacobian(&reg, &x).unwrap();
    let (y_dense, dense) = tape.jacobian(&reg, &x).unwrap();
    assert_eq!(y_sparse, y_dense);

    for (k, (&r, &c)) in pattern.rows.iter().zip(&pattern.cols).enumerate() {
        assert_relative_eq!(values[k], dense[r as usize][c as usize], max_relative = 1e-12);
    }
    // Every structural zero is a numeric zero.
    for (r, row) in dense.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            if !pattern.contains(r, c) {
                assert_eq!(v, 0.0);
            }
        }
    }
}

#[test]
fn sparse_jacobian_on_mixed_tape() {
    let tape = three_output_tape();
    let x = [0.7_f64, -1.2, 0.3];
    let reg = Registry::new();
    let (_, pattern, values) = tape.sparse_jacobian(&reg, &x).unwrap();
    let (_, dense) = tape.jacobian(&reg, &x).unwrap();
    assert_eq!(pattern.nnz(), values.len());
    for (k, (&r, &c)) in pattern.rows.iter().zip(&pattern.cols).enumerate() {
        assert_relative_eq!(values[k], dense[r as usize][c as usize], max_relative = 1e-12);
    }
}
