//! Local stencil solver.
//!
//! Derives the GFDM weights ("Gammas") of a node from the positions of its
//! neighbors. A second order Taylor expansion around the node gives
//! $u_j - u_0 = M^T (u_x, u_y, u_(x x)/2, u_(x y), u_(y y)/2)$
//! for the neighbor offsets in the columns of the moment matrix $M$.
//! Weights $Y$ with $M Y = L$ then reproduce the operator $L$ on quadratics.
//! The least-squares (minimum norm) solution $Y = M^+ L$ is taken,
//! which also covers rank deficient neighborhoods.

use crate::{domain::Domain, linalg::DMatrixExt, NodeIdx};

use tracing::{debug, warn};

/// Number of Taylor monomials the stencil is fitted against.
pub const NMONOMIALS: usize = 5;

/// Target coefficients of $(d_x, d_y, d_(x x), d_(x y), d_(y y))$.
///
/// Second derivative entries are relative to the halved Taylor terms,
/// so the Laplacian reads `[0, 0, 2, 0, 2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorSpec {
  coeffs: na::SVector<f64, NMONOMIALS>,
}
impl OperatorSpec {
  pub fn new(coeffs: [f64; NMONOMIALS]) -> Self {
    Self {
      coeffs: na::SVector::from(coeffs),
    }
  }
  pub fn laplacian() -> Self {
    Self::new([0.0, 0.0, 2.0, 0.0, 2.0])
  }
  pub fn coeffs(&self) -> &na::SVector<f64, NMONOMIALS> {
    &self.coeffs
  }
}
impl Default for OperatorSpec {
  fn default() -> Self {
    Self::laplacian()
  }
}

/// How well the neighborhood of a node constrains the local expansion.
///
/// The weights are computed the same way in every case,
/// degraded stencils are a best fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilQuality {
  Full,
  /// Fewer neighbors than Taylor monomials.
  InsufficientNeighbors { count: usize },
  /// Enough neighbors, but degenerate positions, e.g. collinear.
  RankDeficient { rank: usize },
}
impl StencilQuality {
  pub fn is_full(&self) -> bool {
    matches!(self, Self::Full)
  }
}

/// GFDM weights of a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil {
  neighbors: Vec<NodeIdx>,
  /// Central weight first, then one weight per neighbor.
  weights: na::DVector<f64>,
  quality: StencilQuality,
}
impl Stencil {
  pub fn neighbors(&self) -> &[NodeIdx] {
    &self.neighbors
  }
  pub fn weights(&self) -> &na::DVector<f64> {
    &self.weights
  }
  pub fn central_weight(&self) -> f64 {
    self.weights[0]
  }
  pub fn neighbor_weights(&self) -> &[f64] {
    &self.weights.as_slice()[1..]
  }
  pub fn quality(&self) -> StencilQuality {
    self.quality
  }

  /// Pairs of neighbor and weight, central node excluded.
  pub fn terms(&self) -> impl Iterator<Item = (NodeIdx, f64)> + '_ {
    self
      .neighbors
      .iter()
      .copied()
      .zip(self.neighbor_weights().iter().copied())
  }

  /// Applies the stencil to nodal values.
  pub fn apply(&self, inode: NodeIdx, values: &na::DVector<f64>) -> f64 {
    self.central_weight() * values[inode] + self.terms().map(|(j, w)| w * values[j]).sum::<f64>()
  }
}

/// The 5 x k moment matrix with rows $(Delta x, Delta y, Delta x^2, Delta x Delta y, Delta y^2)$.
pub fn moment_matrix(offsets: &[na::Vector2<f64>]) -> na::DMatrix<f64> {
  let mut moments = na::DMatrix::zeros(NMONOMIALS, offsets.len());
  for (mut column, d) in moments.column_iter_mut().zip(offsets) {
    column[0] = d.x;
    column[1] = d.y;
    column[2] = d.x * d.x;
    column[3] = d.x * d.y;
    column[4] = d.y * d.y;
  }
  moments
}

/// Gamma weights `[w0, w1, .., wk]` for the given neighbor offsets.
///
/// The central weight is $w_0 = -sum_j w_j$, so constants are annihilated.
pub fn gamma_weights(
  offsets: &[na::Vector2<f64>],
  operator: &OperatorSpec,
) -> (na::DVector<f64>, StencilQuality) {
  let moments = moment_matrix(offsets);
  let neighbor_weights = moments.pinv() * operator.coeffs();

  let mut weights = na::DVector::zeros(offsets.len() + 1);
  weights[0] = -neighbor_weights.sum();
  weights.rows_mut(1, offsets.len()).copy_from(&neighbor_weights);

  let quality = if offsets.len() < NMONOMIALS {
    StencilQuality::InsufficientNeighbors {
      count: offsets.len(),
    }
  } else {
    let rank = moments.numerical_rank();
    if rank < NMONOMIALS {
      StencilQuality::RankDeficient { rank }
    } else {
      StencilQuality::Full
    }
  };

  (weights, quality)
}

/// Counts of stencils per quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualitySummary {
  pub full: usize,
  pub insufficient_neighbors: usize,
  pub rank_deficient: usize,
}
impl QualitySummary {
  pub fn ndegraded(&self) -> usize {
    self.insufficient_neighbors + self.rank_deficient
  }
}

/// Stencils of all interior nodes of a domain. Immutable once computed.
#[derive(Debug, Clone)]
pub struct StencilSet {
  stencils: Vec<Option<Stencil>>,
}
impl StencilSet {
  /// Boundary nodes get no stencil, their values are prescribed.
  pub fn compute(domain: &Domain, operator: &OperatorSpec) -> Self {
    let stencils: Vec<_> = (0..domain.nnodes())
      .map(|inode| {
        if domain.is_boundary(inode) {
          return None;
        }
        let neighbors = domain.local_neighbors(inode);
        let offsets = domain.local_offsets(inode);
        let (weights, quality) = gamma_weights(&offsets, operator);
        if !quality.is_full() {
          debug!("node {inode}: degraded stencil {quality:?}");
        }
        Some(Stencil {
          neighbors,
          weights,
          quality,
        })
      })
      .collect();

    let this = Self { stencils };
    let summary = this.summary();
    if summary.ndegraded() > 0 {
      warn!(
        "{} of {} stencils are degraded ({} with insufficient neighbors, {} rank deficient)",
        summary.ndegraded(),
        summary.ndegraded() + summary.full,
        summary.insufficient_neighbors,
        summary.rank_deficient,
      );
    }
    this
  }

  pub fn nnodes(&self) -> usize {
    self.stencils.len()
  }
  pub fn get(&self, inode: NodeIdx) -> Option<&Stencil> {
    self.stencils[inode].as_ref()
  }
  pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &Stencil)> + '_ {
    self
      .stencils
      .iter()
      .enumerate()
      .filter_map(|(inode, s)| s.as_ref().map(|s| (inode, s)))
  }

  pub fn summary(&self) -> QualitySummary {
    let mut summary = QualitySummary::default();
    for (_, stencil) in self.iter() {
      match stencil.quality {
        StencilQuality::Full => summary.full += 1,
        StencilQuality::InsufficientNeighbors { .. } => summary.insufficient_neighbors += 1,
        StencilQuality::RankDeficient { .. } => summary.rank_deficient += 1,
      }
    }
    summary
  }
}
