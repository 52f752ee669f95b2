use crate::error::{GfdmError, Result};

use faer::solvers::SpSolver;

/// Triplet (COO) matrix used while assembling the global GFDM system.
///
/// Duplicate entries are summed on conversion.
#[derive(Default, Debug, Clone)]
pub struct SparseMatrix {
  nrows: usize,
  ncols: usize,
  triplets: Vec<(usize, usize, f64)>,
}

impl SparseMatrix {
  pub fn zeros(nrows: usize, ncols: usize) -> Self {
    Self::new(nrows, ncols, Vec::new())
  }
  pub fn new(nrows: usize, ncols: usize, triplets: Vec<(usize, usize, f64)>) -> Self {
    Self {
      nrows,
      ncols,
      triplets,
    }
  }

  pub fn nrows(&self) -> usize {
    self.nrows
  }
  pub fn ncols(&self) -> usize {
    self.ncols
  }
  pub fn ntriplets(&self) -> usize {
    self.triplets.len()
  }

  pub fn push(&mut self, r: usize, c: usize, v: f64) {
    assert!(r < self.nrows && c < self.ncols);
    if v != 0.0 {
      self.triplets.push((r, c, v));
    }
  }

  pub fn set_zero<F>(&mut self, predicate: F)
  where
    F: Fn(usize, usize) -> bool,
  {
    self.triplets.retain(|&(r, c, _)| !predicate(r, c));
  }

  pub fn mul_vector(&self, x: &na::DVector<f64>) -> na::DVector<f64> {
    assert_eq!(x.len(), self.ncols);
    let mut y = na::DVector::zeros(self.nrows);
    for &(r, c, v) in &self.triplets {
      y[r] += v * x[c];
    }
    y
  }

  pub fn to_nalgebra_coo(&self) -> nas::CooMatrix<f64> {
    let mut coo = nas::CooMatrix::new(self.nrows, self.ncols);
    for &(r, c, v) in &self.triplets {
      coo.push(r, c, v);
    }
    coo
  }

  pub fn to_nalgebra_csc(&self) -> nas::CscMatrix<f64> {
    (&self.to_nalgebra_coo()).into()
  }

  pub fn to_nalgebra_dense(&self) -> na::DMatrix<f64> {
    (&self.to_nalgebra_coo()).into()
  }
}

type SparseMatrixFaer = faer::sparse::SparseColMat<usize, f64>;

pub fn nalgebra2faer(m: nas::CscMatrix<f64>) -> SparseMatrixFaer {
  let nrows = m.nrows();
  let ncols = m.ncols();
  let (col_ptrs, row_indices, values) = m.disassemble();

  let symbolic =
    faer::sparse::SymbolicSparseColMat::new_checked(nrows, ncols, col_ptrs, None, row_indices);
  faer::sparse::SparseColMat::new(symbolic, values)
}

/// Sparse LU factorization of a square system matrix.
pub struct FaerLu {
  raw: faer::sparse::linalg::solvers::Lu<usize, f64>,
}
impl FaerLu {
  pub fn new(a: nas::CscMatrix<f64>) -> Result<Self> {
    let raw = nalgebra2faer(a)
      .sp_lu()
      .map_err(|err| GfdmError::Factorization(format!("{err:?}")))?;
    Ok(Self { raw })
  }

  pub fn solve(&self, b: &na::DVector<f64>) -> na::DVector<f64> {
    let b = faer::col::from_slice(b.as_slice());
    na::DVector::from_vec(self.raw.solve(b).as_slice().to_vec())
  }
}

#[cfg(test)]
mod test {
  use super::{FaerLu, SparseMatrix};

  #[test]
  fn duplicates_are_summed() {
    let mut mat = SparseMatrix::zeros(2, 2);
    mat.push(0, 0, 1.0);
    mat.push(0, 0, 2.0);
    mat.push(1, 0, -1.0);
    mat.push(1, 1, 0.0);
    assert_eq!(mat.ntriplets(), 3);
    let dense = mat.to_nalgebra_dense();
    assert_eq!(dense, na::DMatrix::from_row_slice(2, 2, &[3.0, 0.0, -1.0, 0.0]));
  }

  #[test]
  fn set_zero_clears_row_and_column() {
    let mut mat = SparseMatrix::zeros(3, 3);
    for r in 0..3 {
      for c in 0..3 {
        mat.push(r, c, (1 + r + 3 * c) as f64);
      }
    }
    mat.set_zero(|r, c| r == 1 || c == 1);
    let dense = mat.to_nalgebra_dense();
    assert!(dense.row(1).iter().all(|&v| v == 0.0));
    assert!(dense.column(1).iter().all(|&v| v == 0.0));
    assert_eq!(dense[(2, 2)], 9.0);
  }

  #[test]
  fn lu_solves_tridiagonal() {
    let n = 5;
    let mut mat = SparseMatrix::zeros(n, n);
    for i in 0..n {
      mat.push(i, i, 2.0);
      if i > 0 {
        mat.push(i, i - 1, -1.0);
      }
      if i + 1 < n {
        mat.push(i, i + 1, -1.0);
      }
    }
    let x_exact = na::DVector::from_fn(n, |i, _| i as f64 + 1.0);
    let b = mat.mul_vector(&x_exact);
    let x = FaerLu::new(mat.to_nalgebra_csc()).unwrap().solve(&b);
    assert!((x - x_exact).norm() < 1e-12);
  }
}
