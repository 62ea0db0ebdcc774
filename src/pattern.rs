//! Sparsity patterns extracted from the sweeps, and column coloring for
//! compressed Jacobian evaluation.

use std::collections::HashSet;

/// Symmetric sparsity pattern in COO format (lower triangle + diagonal).
///
/// Entries are sorted by (row, col) and represent positions where the Hessian
/// may have non-zero values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparsityPattern {
    /// Dimension of the (square) Hessian matrix.
    pub dim: usize,
    /// Row indices (0-based).
    pub rows: Vec<u32>,
    /// Column indices (0-based), where `cols[k] <= rows[k]` (lower triangle).
    pub cols: Vec<u32>,
}

impl SparsityPattern {
    /// Build from sorted lower-triangle `(row, col)` pairs.
    pub(crate) fn from_entries(dim: usize, entries: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let (rows, cols) = entries
            .into_iter()
            .inspect(|&(r, c)| debug_assert!(c <= r))
            .unzip();
        SparsityPattern { dim, rows, cols }
    }

    /// Number of non-zero entries in the pattern.
    pub fn nnz(&self) -> usize {
        self.rows.len()
    }

    /// Whether the pattern is empty (all zeros).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if position (i, j) is in the pattern (checks both (i,j) and (j,i)).
    pub fn contains(&self, i: usize, j: usize) -> bool {
        let (r, c) = if i >= j { (i, j) } else { (j, i) };
        self.rows
            .iter()
            .zip(self.cols.iter())
            .any(|(&row, &col)| row as usize == r && col as usize == c)
    }

    /// Entry pairs `(row, col)` in pattern order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .zip(self.cols.iter())
            .map(|(&r, &c)| (r as usize, c as usize))
    }
}

/// Jacobian sparsity pattern in COO format, sorted by (row, col).
///
/// Rows are outputs, columns independent variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JacobianSparsityPattern {
    pub num_rows: usize,
    pub num_cols: usize,
    pub rows: Vec<u32>,
    pub cols: Vec<u32>,
}

impl JacobianSparsityPattern {
    pub fn nnz(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether `(row, col)` may be non-zero.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows
            .iter()
            .zip(self.cols.iter())
            .any(|(&r, &c)| r as usize == row && c as usize == col)
    }
}

/// Greedy column coloring for forward-mode Jacobian compression.
///
/// Two columns conflict when some row has a non-zero in both; conflicting
/// columns get different colors, so one forward direction per color recovers
/// every entry. Columns are visited in decreasing-degree order.
///
/// Returns `(colors, num_colors)` where `colors[j]` is the color of column `j`.
pub fn column_coloring(pattern: &JacobianSparsityPattern) -> (Vec<u32>, u32) {
    let n = pattern.num_cols;
    if n == 0 {
        return (Vec::new(), 0);
    }

    let mut row_cols: Vec<Vec<u32>> = vec![Vec::new(); pattern.num_rows];
    for (&r, &c) in pattern.rows.iter().zip(pattern.cols.iter()) {
        row_cols[r as usize].push(c);
    }

    // Column adjacency: columns sharing a row.
    let mut adj: Vec<HashSet<u32>> = vec![HashSet::new(); n];
    for cols in &row_cols {
        for &a in cols {
            for &b in cols {
                if a != b {
                    adj[a as usize].insert(b);
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| adj[b].len().cmp(&adj[a].len()));

    let mut colors = vec![u32::MAX; n];
    let mut num_colors = 0u32;
    let mut used = HashSet::new();

    for &v in &order {
        used.clear();
        for &neighbor in &adj[v] {
            if colors[neighbor as usize] != u32::MAX {
                used.insert(colors[neighbor as usize]);
            }
        }

        let mut color = 0u32;
        while used.contains(&color) {
            color += 1;
        }
        colors[v] = color;
        num_colors = num_colors.max(color + 1);
    }

    (colors, num_colors)
}
