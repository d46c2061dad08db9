//! Sparse matrix utilities for assembled system matrices
//!
//! Global stiffness and mass matrices are mostly empty. The builder
//! collects COO triplets during an assembly pass and only compresses them
//! when a consumer asks for CSR or dense storage.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use std::collections::VecDeque;

/// Sparse matrix builder using COO format
/// More efficient for incremental assembly
#[derive(Debug, Clone)]
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new sparse matrix builder
    pub fn new(size: usize) -> Self {
        // Estimate: ~6 DOFs per node, ~10 connections per node
        let estimated_nnz = size * 60;
        Self {
            size,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    /// Matrix dimension
    pub fn size(&self) -> usize {
        self.size
    }

    /// Drop all entries, keeping the allocation
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Resize to a new dimension, discarding existing entries
    pub fn resize(&mut self, size: usize) {
        self.size = size;
        self.entries.clear();
    }

    /// Add a value to the matrix (accumulates if already exists)
    ///
    /// Only exact zeros are skipped.
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Scatter a dense element matrix at the given global indices
    ///
    /// `ids[i]` is the global row/column for local index `i`; `None`
    /// entries are skipped.
    pub fn add_element_matrix(&mut self, ids: &[Option<usize>], k_elem: &DMatrix<f64>) {
        for (i, di) in ids.iter().enumerate() {
            let Some(di) = *di else { continue };
            for (j, dj) in ids.iter().enumerate() {
                let Some(dj) = *dj else { continue };
                self.add(di, dj, k_elem[(i, j)]);
            }
        }
    }

    /// Convert to CSR format for efficient solves
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        CsrMatrix::from(&coo)
    }

    /// Convert to dense matrix
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);

        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }

        mat
    }

    /// Get stored (uncompressed) entry count
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Reverse Cuthill-McKee ordering of an undirected graph
///
/// `adj[v]` lists the neighbours of vertex `v`. Returns a permutation
/// `perm` where `perm[new] = old`. Disconnected components are visited in
/// turn, each started from its lowest-degree vertex.
pub fn reverse_cuthill_mckee(adj: &[Vec<usize>]) -> Vec<usize> {
    let n = adj.len();
    if n == 0 {
        return vec![];
    }

    // Repeated edges must not count towards the degree
    let mut sorted: Vec<Vec<usize>> = adj.to_vec();
    for neighbors in &mut sorted {
        neighbors.sort_unstable();
        neighbors.dedup();
    }
    let degrees: Vec<usize> = sorted.iter().map(|v| v.len()).collect();

    // Sort adjacencies by degree (for tie-breaking)
    for neighbors in &mut sorted {
        neighbors.sort_by_key(|&i| (degrees[i], i));
    }

    let mut visited = vec![false; n];
    let mut result = Vec::with_capacity(n);
    let mut queue = VecDeque::new();

    while result.len() < n {
        // Start each component from its minimum-degree unvisited vertex
        let start = (0..n)
            .filter(|&i| !visited[i])
            .min_by_key(|&i| (degrees[i], i));
        let Some(start) = start else { break };

        queue.push_back(start);
        visited[start] = true;

        while let Some(node) = queue.pop_front() {
            result.push(node);

            for &neighbor in &sorted[node] {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    // Cuthill-McKee -> Reverse Cuthill-McKee
    result.reverse();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_builder() {
        let mut builder = SparseMatrixBuilder::new(4);
        builder.add(0, 0, 4.0);
        builder.add(0, 1, 1.0);
        builder.add(1, 0, 1.0);
        builder.add(1, 1, 3.0);
        builder.add(1, 1, 2.0);
        builder.add(3, 3, 1.0);

        let dense = builder.to_dense();
        assert!((dense[(0, 0)] - 4.0).abs() < 1e-10);
        assert!((dense[(1, 1)] - 5.0).abs() < 1e-10);

        let csr = builder.to_csr();
        assert_eq!(csr.nrows(), 4);
        assert_eq!(csr.nnz(), 5);
    }

    #[test]
    fn test_element_matrix_skips_unnumbered() {
        let mut builder = SparseMatrixBuilder::new(2);
        let k = DMatrix::from_row_slice(2, 2, &[1.0, -1.0, -1.0, 1.0]);
        builder.add_element_matrix(&[Some(1), None], &k);

        let dense = builder.to_dense();
        assert_eq!(dense[(1, 1)], 1.0);
        assert_eq!(dense[(0, 0)], 0.0);
        assert_eq!(builder.nnz(), 1);
    }

    #[test]
    fn test_rcm_is_permutation() {
        // Path graph 0-2-1-3 plus isolated vertex 4
        let adj = vec![vec![2], vec![2, 3], vec![0, 1], vec![1], vec![]];
        let perm = reverse_cuthill_mckee(&adj);

        let mut sorted = perm.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_tiny_values_are_kept() {
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add(0, 0, 1e-16);
        builder.add(1, 1, 0.0);
        assert_eq!(builder.nnz(), 1);
        assert_eq!(builder.to_dense()[(0, 0)], 1e-16);
        assert_eq!(builder.to_csr().nnz(), 1);
    }

    #[test]
    fn test_rcm_ignores_repeated_edges() {
        // Star around 0 plus a tail 3-4; vertex 1 is listed against 0 many times
        let simple = vec![vec![1, 2, 3], vec![0], vec![0], vec![0, 4], vec![3]];
        let repeated = vec![
            vec![1, 1, 1, 2, 3],
            vec![0, 0, 0],
            vec![0],
            vec![0, 4],
            vec![3],
        ];
        assert_eq!(reverse_cuthill_mckee(&repeated), reverse_cuthill_mckee(&simple));
    }
}
