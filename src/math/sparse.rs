//! Sparse assembly, bandwidth reduction and skyline Cholesky
//!
//! Frame stiffness matrices are banded once renumbered, so the factorisation
//! only stores the profile below each diagonal.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Pivots below this fraction of the original diagonal mark a singular system
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Sparse matrix builder using COO format
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    pub fn new(size: usize) -> Self {
        // 6 DOFs per node, two neighbours along a chain
        Self {
            size,
            entries: Vec::with_capacity(size * 18),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Scatter an element matrix; `None` entries in `dofs` are restrained and skipped
    pub fn add_element_matrix<const N: usize>(
        &mut self,
        dofs: &[Option<usize>; N],
        k_elem: &nalgebra::SMatrix<f64, N, N>,
    ) {
        for (i, di) in dofs.iter().enumerate() {
            let Some(di) = *di else { continue };
            for (j, dj) in dofs.iter().enumerate() {
                if let Some(dj) = *dj {
                    self.add(di, dj, k_elem[(i, j)]);
                }
            }
        }
    }

    /// Convert to CSR format; duplicate entries are summed
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);
        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }
        CsrMatrix::from(&coo)
    }

    /// Convert to dense matrix (for comparison/debugging)
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);
        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }
        mat
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Cholesky factorisation of a symmetric positive definite matrix in skyline storage
pub struct SparseCholeskySolver {
    size: usize,
    // Row i stores columns (i - heights[i])..=i
    skyline: Vec<Vec<f64>>,
    heights: Vec<usize>,
    factorized: bool,
}

impl SparseCholeskySolver {
    /// Copy the lower profile of `csr`, renumbered so that old index `k`
    /// becomes `new_index[k]`
    pub fn new(csr: &CsrMatrix<f64>, new_index: &[usize]) -> Self {
        let size = csr.nrows();

        let mut heights = vec![0usize; size];
        for (row, col, _) in csr.triplet_iter() {
            let (r, c) = (new_index[row], new_index[col]);
            if c < r {
                heights[r] = heights[r].max(r - c);
            }
        }

        let mut skyline: Vec<Vec<f64>> = heights.iter().map(|&h| vec![0.0; h + 1]).collect();
        for (row, col, &val) in csr.triplet_iter() {
            let (r, c) = (new_index[row], new_index[col]);
            if c <= r {
                skyline[r][c + heights[r] - r] += val;
            }
        }

        Self {
            size,
            skyline,
            heights,
            factorized: false,
        }
    }

    /// Largest row profile height after renumbering
    pub fn bandwidth(&self) -> usize {
        self.heights.iter().copied().max().unwrap_or(0)
    }

    /// Factorize in place as L Lᵀ.
    ///
    /// Fails with an "illegal value" message when a pivot is not positive, the
    /// same class of failure a banded LAPACK driver reports for a singular or
    /// indefinite stiffness matrix.
    pub fn factorize(&mut self) -> Result<(), String> {
        for i in 0..self.size {
            let hi = self.heights[i];
            let start_i = i - hi;
            let original_diag = self.skyline[i][hi];

            for j in start_i..i {
                let start_j = j - self.heights[j];
                let start = start_i.max(start_j);
                let mut sum = 0.0;
                for k in start..j {
                    sum += self.get(i, k) * self.get(j, k);
                }
                let diag_j = self.get(j, j);
                let idx = j - start_i;
                self.skyline[i][idx] = (self.skyline[i][idx] - sum) / diag_j;
            }

            let sum: f64 = self.skyline[i][..hi].iter().map(|v| v * v).sum();
            let diag = original_diag - sum;
            if !diag.is_finite() || diag <= PIVOT_TOLERANCE * original_diag.abs() {
                return Err(format!(
                    "illegal value: non-positive pivot {:e} at equation {} of {}",
                    diag, i, self.size
                ));
            }
            self.skyline[i][hi] = diag.sqrt();
        }

        self.factorized = true;
        Ok(())
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> f64 {
        if col > row {
            return self.get(col, row);
        }
        let start = row - self.heights[row];
        if col < start {
            return 0.0;
        }
        self.skyline[row][col - start]
    }

    /// Solve L Lᵀ x = b in the renumbered ordering
    pub fn solve(&self, b: &DVector<f64>) -> Result<DVector<f64>, String> {
        if !self.factorized {
            return Err("matrix has not been factorized".to_string());
        }
        let mut x = b.clone();

        // Forward substitution: L y = b
        for i in 0..self.size {
            let start = i - self.heights[i];
            let sum: f64 = (start..i).map(|j| self.get(i, j) * x[j]).sum();
            x[i] = (x[i] - sum) / self.get(i, i);
        }

        // Backward substitution: Lᵀ x = y
        for i in (0..self.size).rev() {
            x[i] /= self.get(i, i);
            let start = i - self.heights[i];
            for j in start..i {
                x[j] -= self.get(i, j) * x[i];
            }
        }

        Ok(x)
    }
}

/// Bandwidth reduction using Reverse Cuthill-McKee.
///
/// Returns `perm` with `perm[new] = old`.
pub fn reverse_cuthill_mckee(csr: &CsrMatrix<f64>) -> Vec<usize> {
    let n = csr.nrows();
    if n == 0 {
        return vec![];
    }

    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (row, col, &val) in csr.triplet_iter() {
        if val != 0.0 && row != col {
            adj[row].push(col);
        }
    }
    let degrees: Vec<usize> = adj.iter().map(|v| v.len()).collect();
    for neighbors in &mut adj {
        neighbors.sort_by_key(|&i| degrees[i]);
    }

    let mut visited = vec![false; n];
    let mut result = Vec::with_capacity(n);
    let mut queue = std::collections::VecDeque::new();

    // Each disconnected component starts from its lowest-degree vertex
    let mut by_degree: Vec<usize> = (0..n).collect();
    by_degree.sort_by_key(|&i| degrees[i]);

    for &seed in &by_degree {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        queue.push_back(seed);
        while let Some(node) = queue.pop_front() {
            result.push(node);
            for &neighbor in &adj[node] {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    result.reverse();
    result
}

/// Create inverse permutation
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    for (new_idx, &old_idx) in perm.iter().enumerate() {
        inv[old_idx] = new_idx;
    }
    inv
}
