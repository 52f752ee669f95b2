//! Iterative GFDM solver by Gauss-Seidel relaxation.
//!
//! Every interior node is repeatedly solved for from its stencil equation
//! $w_0 u_i + sum_j w_j u_j = f_i$, using the current values of its neighbors.
//! Updates are written immediately, so later nodes of the same sweep
//! already see them.

use crate::{
  domain::{Domain, GeometryKind},
  problem::{PoissonProblem, SolutionField},
  stencil::{OperatorSpec, StencilSet},
  NodeIdx,
};

use tracing::{info, warn};

pub const DEFAULT_MAX_ITERATIONS: usize = 40_000;
pub const GRID_TOLERANCE: f64 = 1e-16;
/// Irregular stencils are worse conditioned than grid stencils.
pub const IRREGULAR_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterativeConfig {
  /// Relaxation stops once no node changes by this much in a sweep.
  pub tolerance: f64,
  pub max_iterations: usize,
}
impl IterativeConfig {
  pub fn for_geometry(kind: GeometryKind) -> Self {
    let tolerance = match kind {
      GeometryKind::RegularGrid => GRID_TOLERANCE,
      GeometryKind::Triangulation | GeometryKind::UnstructuredCloud => IRREGULAR_TOLERANCE,
    };
    Self {
      tolerance,
      max_iterations: DEFAULT_MAX_ITERATIONS,
    }
  }
  pub fn with_tolerance(mut self, tolerance: f64) -> Self {
    self.tolerance = tolerance;
    self
  }
  pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
    self.max_iterations = max_iterations;
    self
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterativeOutcome {
  Converged,
  /// The iteration cap was hit. The field is the last iterate, not an error.
  MaxIterExceeded,
}

/// Progress of the relaxation, threaded through the sweeps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverState {
  pub iteration: usize,
  /// Largest change of a node value during the last sweep.
  pub sweep_error: f64,
}
impl SolverState {
  pub fn initial() -> Self {
    Self {
      iteration: 0,
      sweep_error: f64::INFINITY,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterativeReport {
  pub outcome: IterativeOutcome,
  pub state: SolverState,
}
impl IterativeReport {
  pub fn converged(&self) -> bool {
    self.outcome == IterativeOutcome::Converged
  }
  pub fn iterations(&self) -> usize {
    self.state.iteration
  }
  pub fn sweep_error(&self) -> f64 {
    self.state.sweep_error
  }
}

/// Relaxation of a fixed discretization and right-hand side.
pub struct GaussSeidel<'a> {
  stencils: &'a StencilSet,
  source: na::DVector<f64>,
  order: Vec<NodeIdx>,
}
impl<'a> GaussSeidel<'a> {
  /// `source` holds $f$ at every node.
  ///
  /// Nodes with a vanishing central weight can't be solved for and are never relaxed.
  pub fn new(domain: &Domain, stencils: &'a StencilSet, source: na::DVector<f64>) -> Self {
    assert_eq!(source.len(), domain.nnodes());
    let order = domain
      .sweep_order()
      .into_iter()
      .filter(|&inode| {
        let stencil = stencils.get(inode);
        let solvable = stencil.is_some_and(|s| s.central_weight() != 0.0);
        if !solvable {
          warn!("node {inode} has no usable stencil and is left at its initial value");
        }
        solvable
      })
      .collect();
    Self {
      stencils,
      source,
      order,
    }
  }

  /// One sweep over all interior nodes, updating `u` in place.
  pub fn sweep(&self, u: &mut na::DVector<f64>, state: SolverState) -> SolverState {
    let mut sweep_error: f64 = 0.0;
    for &inode in &self.order {
      let Some(stencil) = self.stencils.get(inode) else {
        continue;
      };
      let neighbor_sum: f64 = stencil.terms().map(|(j, w)| w * u[j]).sum();
      let t = (self.source[inode] - neighbor_sum) / stencil.central_weight();
      // NaN must stick, `f64::max` would drop it.
      let change = (t - u[inode]).abs();
      if change.is_nan() || change > sweep_error {
        sweep_error = change;
      }
      u[inode] = t;
    }
    SolverState {
      iteration: state.iteration + 1,
      sweep_error,
    }
  }

  /// Sweeps until the sweep error drops below the tolerance or the cap is reached.
  ///
  /// At most `max_iterations` sweeps are done. A NaN sweep error never counts as converged.
  pub fn run(&self, u: &mut na::DVector<f64>, config: &IterativeConfig) -> IterativeReport {
    let mut state = SolverState::initial();
    while state.iteration < config.max_iterations {
      state = self.sweep(u, state);
      if state.sweep_error < config.tolerance {
        return IterativeReport {
          outcome: IterativeOutcome::Converged,
          state,
        };
      }
    }
    IterativeReport {
      outcome: IterativeOutcome::MaxIterExceeded,
      state,
    }
  }
}

pub struct IterativeSolution {
  pub field: SolutionField,
  pub stencils: StencilSet,
  pub report: IterativeReport,
}

/// Solves the Poisson problem on `domain` by Gauss-Seidel relaxation.
pub fn solve_iterative<B, S>(
  domain: &Domain,
  problem: &PoissonProblem<B, S>,
  config: &IterativeConfig,
) -> IterativeSolution
where
  B: Fn(f64, f64) -> f64,
  S: Fn(f64, f64) -> f64,
{
  let stencils = StencilSet::compute(domain, &OperatorSpec::laplacian());
  let mut u_ap = problem.initial_field(domain);

  let relaxation = GaussSeidel::new(domain, &stencils, problem.source_field(domain));
  let report = relaxation.run(&mut u_ap, config);

  match report.outcome {
    IterativeOutcome::Converged => info!(
      "{}: converged after {} sweeps, sweep error {:.3e}",
      domain.kind(),
      report.iterations(),
      report.sweep_error()
    ),
    IterativeOutcome::MaxIterExceeded => warn!(
      "{}: no convergence within {} sweeps, sweep error {:.3e}",
      domain.kind(),
      report.iterations(),
      report.sweep_error()
    ),
  }

  let u_ex = problem.reference_field(domain);
  IterativeSolution {
    field: SolutionField::new(u_ap, u_ex),
    stencils,
    report,
  }
}
