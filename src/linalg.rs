/// Relative cutoff below which singular values are treated as zero.
///
/// Scaled by the largest singular value and the largest matrix dimension,
/// the same convention NumPy uses for `pinv` and `matrix_rank`.
pub const SINGULAR_RCOND: f64 = 1e-15;

pub trait DMatrixExt {
  /// Moore-Penrose pseudoinverse, never fails.
  ///
  /// Rank deficient matrices yield the minimum norm least-squares inverse.
  fn pinv(&self) -> na::DMatrix<f64>;
  fn numerical_rank(&self) -> usize;
}
impl DMatrixExt for na::DMatrix<f64> {
  fn pinv(&self) -> na::DMatrix<f64> {
    let (nrows, ncols) = self.shape();
    if nrows == 0 || ncols == 0 {
      return na::DMatrix::zeros(ncols, nrows);
    }
    let svd = self.clone().svd(true, true);
    let cutoff = singular_cutoff(&svd.singular_values, nrows, ncols);
    svd
      .pseudo_inverse(cutoff)
      .expect("singular vectors were computed and the cutoff is non-negative")
  }

  fn numerical_rank(&self) -> usize {
    let (nrows, ncols) = self.shape();
    if nrows == 0 || ncols == 0 {
      return 0;
    }
    let svd = self.clone().svd(false, false);
    let cutoff = singular_cutoff(&svd.singular_values, nrows, ncols);
    svd.rank(cutoff)
  }
}

fn singular_cutoff(singular_values: &na::DVector<f64>, nrows: usize, ncols: usize) -> f64 {
  SINGULAR_RCOND * nrows.max(ncols) as f64 * singular_values.max()
}

pub fn assert_mat_eq(a: &na::DMatrix<f64>, b: &na::DMatrix<f64>, tol: f64) {
  let diff = a - b;
  let error = diff.norm();
  if error > tol {
    println!("Matrix a={a:.3}");
    println!("Matrix b={b:.3}");
    println!("a-b={diff:.3}");
    panic!("Matrices not equal.");
  }
}
