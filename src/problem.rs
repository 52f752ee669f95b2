//! The Poisson problem $Delta phi = f$ with Dirichlet data.

use crate::domain::Domain;

/// Boundary function $phi(x, y)$ and source $f(x, y)$.
///
/// The boundary function doubles as the reference solution,
/// so `u_ex` is $phi$ evaluated at every node.
pub struct PoissonProblem<B, S> {
  boundary: B,
  source: S,
}

impl<B, S> PoissonProblem<B, S>
where
  B: Fn(f64, f64) -> f64,
  S: Fn(f64, f64) -> f64,
{
  pub fn new(boundary: B, source: S) -> Self {
    Self { boundary, source }
  }

  pub fn boundary_value(&self, x: f64, y: f64) -> f64 {
    (self.boundary)(x, y)
  }
  pub fn source_value(&self, x: f64, y: f64) -> f64 {
    (self.source)(x, y)
  }

  /// $phi$ at all nodes.
  pub fn reference_field(&self, domain: &Domain) -> na::DVector<f64> {
    domain.eval_coord_fn(&self.boundary)
  }

  /// $f$ at all nodes.
  pub fn source_field(&self, domain: &Domain) -> na::DVector<f64> {
    domain.eval_coord_fn(&self.source)
  }

  /// Boundary values at boundary nodes, zero elsewhere.
  pub fn initial_field(&self, domain: &Domain) -> na::DVector<f64> {
    let mut u = na::DVector::zeros(domain.nnodes());
    for (inode, coord) in domain.coords().coord_iter().enumerate() {
      if domain.is_boundary(inode) {
        u[inode] = self.boundary_value(coord.x, coord.y);
      }
    }
    u
  }
}

/// Approximation and reference values, one per node.
#[derive(Debug, Clone)]
pub struct SolutionField {
  u_ap: na::DVector<f64>,
  u_ex: na::DVector<f64>,
}
impl SolutionField {
  pub fn new(u_ap: na::DVector<f64>, u_ex: na::DVector<f64>) -> Self {
    assert_eq!(u_ap.len(), u_ex.len());
    Self { u_ap, u_ex }
  }
  pub fn approx(&self) -> &na::DVector<f64> {
    &self.u_ap
  }
  pub fn exact(&self) -> &na::DVector<f64> {
    &self.u_ex
  }
  pub fn into_parts(self) -> (na::DVector<f64>, na::DVector<f64>) {
    (self.u_ap, self.u_ex)
  }

  /// Largest pointwise deviation from the reference.
  pub fn max_error(&self) -> f64 {
    (&self.u_ap - &self.u_ex).amax()
  }
}
