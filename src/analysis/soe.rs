//! Eigen system of equations - storage for the assembled K and M

use nalgebra_sparse::CsrMatrix;

use crate::error::{FEAError, FEAResult};
use crate::math::{Mat, SparseMatrixBuilder};

/// Receiver of assembled stiffness and mass contributions
///
/// `ids[i]` is the global equation of local row/column `i`; `None`
/// entries are skipped. Indices at or beyond `size()` are an error.
pub trait EigenSoe: std::fmt::Debug {
    fn size(&self) -> usize;

    /// Resize both matrices and zero them
    fn set_size(&mut self, size: usize);

    fn zero_stiffness(&mut self);

    fn zero_mass(&mut self);

    fn add_to_stiffness(&mut self, m: &Mat, ids: &[Option<usize>]) -> FEAResult<()>;

    fn add_to_mass(&mut self, m: &Mat, ids: &[Option<usize>]) -> FEAResult<()>;

    /// Replace the mass matrix with the identity
    fn set_identity_mass(&mut self);

    /// Assembled stiffness in dense form
    fn stiffness(&self) -> Mat;

    /// Assembled mass in dense form
    fn mass(&self) -> Mat;
}

/// Shape and range check shared by both storages
fn check_contribution(m: &Mat, ids: &[Option<usize>], size: usize) -> FEAResult<()> {
    if m.nrows() != ids.len() || m.ncols() != ids.len() {
        return Err(FEAError::ShapeMismatch {
            expected: format!("{}x{}", ids.len(), ids.len()),
            found: format!("{}x{}", m.nrows(), m.ncols()),
        });
    }
    if let Some(&index) = ids.iter().flatten().find(|&&i| i >= size) {
        return Err(FEAError::AssemblyIndexOutOfRange { index, size });
    }
    Ok(())
}

fn scatter_dense(target: &mut Mat, m: &Mat, ids: &[Option<usize>]) {
    for (i, row) in ids.iter().enumerate() {
        let Some(row) = *row else { continue };
        for (j, col) in ids.iter().enumerate() {
            let Some(col) = *col else { continue };
            target[(row, col)] += m[(i, j)];
        }
    }
}

/// Full dense storage, fine for small models and tests
#[derive(Debug, Clone)]
pub struct DenseEigenSoe {
    k: Mat,
    m: Mat,
}

impl DenseEigenSoe {
    pub fn new(size: usize) -> Self {
        Self {
            k: Mat::zeros(size, size),
            m: Mat::zeros(size, size),
        }
    }
}

impl Default for DenseEigenSoe {
    fn default() -> Self {
        Self::new(0)
    }
}

impl EigenSoe for DenseEigenSoe {
    fn size(&self) -> usize {
        self.k.nrows()
    }

    fn set_size(&mut self, size: usize) {
        self.k = Mat::zeros(size, size);
        self.m = Mat::zeros(size, size);
    }

    fn zero_stiffness(&mut self) {
        self.k.fill(0.0);
    }

    fn zero_mass(&mut self) {
        self.m.fill(0.0);
    }

    fn add_to_stiffness(&mut self, m: &Mat, ids: &[Option<usize>]) -> FEAResult<()> {
        check_contribution(m, ids, self.size())?;
        scatter_dense(&mut self.k, m, ids);
        Ok(())
    }

    fn add_to_mass(&mut self, m: &Mat, ids: &[Option<usize>]) -> FEAResult<()> {
        check_contribution(m, ids, self.size())?;
        scatter_dense(&mut self.m, m, ids);
        Ok(())
    }

    fn set_identity_mass(&mut self) {
        let n = self.size();
        self.m = Mat::identity(n, n);
    }

    fn stiffness(&self) -> Mat {
        self.k.clone()
    }

    fn mass(&self) -> Mat {
        self.m.clone()
    }
}

/// Triplet storage compressed to CSR on demand
#[derive(Debug, Clone)]
pub struct SparseEigenSoe {
    k: SparseMatrixBuilder,
    m: SparseMatrixBuilder,
}

impl SparseEigenSoe {
    pub fn new(size: usize) -> Self {
        Self {
            k: SparseMatrixBuilder::new(size),
            m: SparseMatrixBuilder::new(size),
        }
    }

    pub fn stiffness_csr(&self) -> CsrMatrix<f64> {
        self.k.to_csr()
    }

    pub fn mass_csr(&self) -> CsrMatrix<f64> {
        self.m.to_csr()
    }
}

impl Default for SparseEigenSoe {
    fn default() -> Self {
        Self::new(0)
    }
}

impl EigenSoe for SparseEigenSoe {
    fn size(&self) -> usize {
        self.k.size()
    }

    fn set_size(&mut self, size: usize) {
        self.k.resize(size);
        self.m.resize(size);
    }

    fn zero_stiffness(&mut self) {
        self.k.clear();
    }

    fn zero_mass(&mut self) {
        self.m.clear();
    }

    fn add_to_stiffness(&mut self, m: &Mat, ids: &[Option<usize>]) -> FEAResult<()> {
        check_contribution(m, ids, self.size())?;
        self.k.add_element_matrix(ids, m);
        Ok(())
    }

    fn add_to_mass(&mut self, m: &Mat, ids: &[Option<usize>]) -> FEAResult<()> {
        check_contribution(m, ids, self.size())?;
        self.m.add_element_matrix(ids, m);
        Ok(())
    }

    fn set_identity_mass(&mut self) {
        self.m.clear();
        for i in 0..self.m.size() {
            self.m.add(i, i, 1.0);
        }
    }

    fn stiffness(&self) -> Mat {
        self.k.to_dense()
    }

    fn mass(&self) -> Mat {
        self.m.to_dense()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spring() -> Mat {
        Mat::from_row_slice(2, 2, &[1.0, -1.0, -1.0, 1.0])
    }

    #[test]
    fn test_dense_and_sparse_agree() {
        let mut dense = DenseEigenSoe::new(3);
        let mut sparse = SparseEigenSoe::new(3);
        let soes: [&mut dyn EigenSoe; 2] = [&mut dense, &mut sparse];
        for soe in soes {
            soe.add_to_stiffness(&spring(), &[Some(0), Some(1)]).unwrap();
            soe.add_to_stiffness(&spring(), &[Some(1), Some(2)]).unwrap();
            soe.add_to_mass(&Mat::identity(2, 2), &[None, Some(2)]).unwrap();
        }
        assert_eq!(dense.stiffness(), sparse.stiffness());
        assert_eq!(dense.mass(), sparse.mass());
        assert_eq!(dense.stiffness()[(1, 1)], 2.0);
        assert_eq!(dense.mass()[(2, 2)], 1.0);
        assert_eq!(dense.mass()[(0, 0)], 0.0);
        assert_eq!(sparse.stiffness_csr().nnz(), 7);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut soe = DenseEigenSoe::new(2);
        let result = soe.add_to_stiffness(&spring(), &[Some(1), Some(2)]);
        assert!(matches!(
            result,
            Err(FEAError::AssemblyIndexOutOfRange { index: 2, size: 2 })
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let mut soe = SparseEigenSoe::new(4);
        let result = soe.add_to_mass(&spring(), &[Some(0), Some(1), Some(2)]);
        assert!(matches!(result, Err(FEAError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_identity_mass_and_resize() {
        let mut soe = SparseEigenSoe::new(2);
        soe.add_to_mass(&spring(), &[Some(0), Some(1)]).unwrap();
        soe.set_identity_mass();
        assert_eq!(soe.mass(), Mat::identity(2, 2));

        soe.set_size(3);
        assert_eq!(soe.size(), 3);
        assert_eq!(soe.mass(), Mat::zeros(3, 3));
    }
}
