//! Dense square matrix used for S, R and A.

use std::ops::{Index, IndexMut};

/// Row-major n×n matrix of `f64`.
///
/// Memory is `8 · n²` bytes; a solve keeps three of these alive at once,
/// which is the scaling limit of the engine (about 2.4 GB at n = 10 000).
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// Build from rows. Callers are expected to have checked squareness.
    pub(crate) fn from_rows(rows: &[Vec<f64>]) -> Self {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for row in rows {
            data.extend_from_slice(row);
        }
        debug_assert_eq!(data.len(), n * n);
        Self { n, data }
    }

    /// Side length.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        let n = self.n;
        &mut self.data[i * n..(i + 1) * n]
    }

    pub fn diagonal(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.n).map(move |i| self.data[i * self.n + i])
    }

    pub fn fill_diagonal(&mut self, value: f64) {
        for i in 0..self.n {
            self.data[i * self.n + i] = value;
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Owned rows, for callers that want nested vectors back.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.n.max(1)).map(<[f64]>::to_vec).collect()
    }
}

impl Index<(usize, usize)> for SquareMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.n + j]
    }
}

impl IndexMut<(usize, usize)> for SquareMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.n + j]
    }
}
