//! Direct GFDM solver: assemble the global linear system and solve it at once.

use crate::{
  domain::{Domain, Geometry},
  error::Result,
  linalg::DMatrixExt,
  mesh::StructuredMesh,
  problem::{PoissonProblem, SolutionField},
  sparse::{FaerLu, SparseMatrix},
  stencil::{OperatorSpec, StencilSet},
  util, NodeIdx,
};

use tracing::debug;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DirectMethod {
  /// Dense SVD pseudoinverse. Also yields a least-squares answer for singular systems.
  #[default]
  PseudoInverse,
  /// Sparse LU factorization. Fails on singular systems.
  SparseLu,
}

/// The assembled system $K u = R$.
#[derive(Debug, Clone)]
pub struct GlobalSystem {
  pub matrix: SparseMatrix,
  pub rhs: na::DVector<f64>,
  /// The node every unknown belongs to.
  pub unknowns: Vec<NodeIdx>,
}
impl GlobalSystem {
  pub fn nunknowns(&self) -> usize {
    self.unknowns.len()
  }

  pub fn solve(&self, method: DirectMethod) -> Result<na::DVector<f64>> {
    let solution = match method {
      DirectMethod::PseudoInverse => self.solve_least_squares(),
      DirectMethod::SparseLu => FaerLu::new(self.matrix.to_nalgebra_csc())?.solve(&self.rhs),
    };
    Ok(solution)
  }

  /// Minimum norm least-squares solution through the pseudoinverse.
  pub fn solve_least_squares(&self) -> na::DVector<f64> {
    self.matrix.to_nalgebra_dense().pinv() * &self.rhs
  }
}

/// Dispatches on the geometry of `domain`.
pub fn assemble_system<B, S>(
  domain: &Domain,
  stencils: &StencilSet,
  problem: &PoissonProblem<B, S>,
) -> GlobalSystem
where
  B: Fn(f64, f64) -> f64,
  S: Fn(f64, f64) -> f64,
{
  match domain.geometry() {
    Geometry::RegularGrid(mesh) => assemble_grid_system(mesh, domain, stencils, problem),
    Geometry::Triangulation { .. } | Geometry::UnstructuredCloud { .. } => {
      assemble_cloud_system(domain, stencils, problem)
    }
  }
}

/// Interior nodes only.
///
/// The interior node $(i, j)$ is unknown $(i-1) + (n_x-2)(j-1)$.
/// Couplings to boundary nodes are moved to the right-hand side.
pub fn assemble_grid_system<B, S>(
  mesh: &StructuredMesh,
  domain: &Domain,
  stencils: &StencilSet,
  problem: &PoissonProblem<B, S>,
) -> GlobalSystem
where
  B: Fn(f64, f64) -> f64,
  S: Fn(f64, f64) -> f64,
{
  let nx_inner = mesh.nx() - 2;
  let unknown_idx = |inode: NodeIdx| {
    let (i, j) = mesh.cart_idx(inode);
    (i - 1) + nx_inner * (j - 1)
  };

  let mut unknowns = vec![0; mesh.ninterior()];
  for inode in mesh.interior_nodes() {
    unknowns[unknown_idx(inode)] = inode;
  }

  let nunknowns = unknowns.len();
  let mut matrix = SparseMatrix::zeros(nunknowns, nunknowns);
  let mut rhs = na::DVector::zeros(nunknowns);
  for (p, &inode) in unknowns.iter().enumerate() {
    let Some(stencil) = stencils.get(inode) else {
      continue;
    };
    let coord = domain.coords().coord(inode);
    rhs[p] = problem.source_value(coord.x, coord.y);
    matrix.push(p, p, stencil.central_weight());
    for (jnode, w) in stencil.terms() {
      if domain.is_boundary(jnode) {
        let c = domain.coords().coord(jnode);
        rhs[p] -= w * problem.boundary_value(c.x, c.y);
      } else {
        matrix.push(p, unknown_idx(jnode), w);
      }
    }
  }

  GlobalSystem {
    matrix,
    rhs,
    unknowns,
  }
}

/// All nodes, with identity rows for the boundary.
pub fn assemble_cloud_system<B, S>(
  domain: &Domain,
  stencils: &StencilSet,
  problem: &PoissonProblem<B, S>,
) -> GlobalSystem
where
  B: Fn(f64, f64) -> f64,
  S: Fn(f64, f64) -> f64,
{
  let nnodes = domain.nnodes();
  let mut matrix = SparseMatrix::zeros(nnodes, nnodes);
  let mut rhs = na::DVector::zeros(nnodes);
  for (inode, stencil) in stencils.iter() {
    let coord = domain.coords().coord(inode);
    rhs[inode] = problem.source_value(coord.x, coord.y);
    matrix.push(inode, inode, stencil.central_weight());
    for (jnode, w) in stencil.terms() {
      matrix.push(inode, jnode, w);
    }
  }

  let boundary_values: Vec<_> = util::flags_to_indicies(domain.boundary_flags())
    .into_iter()
    .map(|inode| {
      let coord = domain.coords().coord(inode);
      (inode, problem.boundary_value(coord.x, coord.y))
    })
    .collect();
  fix_nodes(&boundary_values, &mut matrix, &mut rhs);

  GlobalSystem {
    matrix,
    rhs,
    unknowns: (0..nnodes).collect(),
  }
}

/// Prescribes values on the given nodes.
///
/// $mat(K_0, 0; 0, I) vec(u_0, u_b) = vec(R - K_(0 b) phi_b, phi_b)$
pub fn fix_nodes(
  node_values: &[(NodeIdx, f64)],
  matrix: &mut SparseMatrix,
  rhs: &mut na::DVector<f64>,
) {
  let nnodes = matrix.nrows();

  let mut fixed = na::DVector::zeros(nnodes);
  let mut flags = vec![false; nnodes];
  for &(inode, v) in node_values {
    fixed[inode] = v;
    flags[inode] = true;
  }

  *rhs -= matrix.mul_vector(&fixed);
  for &(inode, v) in node_values {
    rhs[inode] = v;
  }

  matrix.set_zero(|r, c| flags[r] || flags[c]);
  for &(inode, _) in node_values {
    matrix.push(inode, inode, 1.0);
  }
}

pub struct DirectSolution {
  pub field: SolutionField,
  pub stencils: StencilSet,
  pub system: GlobalSystem,
}

/// Solves the Poisson problem on `domain` through the pseudoinverse of the global system.
pub fn solve_direct<B, S>(domain: &Domain, problem: &PoissonProblem<B, S>) -> DirectSolution
where
  B: Fn(f64, f64) -> f64,
  S: Fn(f64, f64) -> f64,
{
  let stencils = StencilSet::compute(domain, &OperatorSpec::laplacian());
  let system = assemble_system(domain, &stencils, problem);
  let solution = system.solve_least_squares();
  finish(domain, problem, stencils, system, solution)
}

pub fn solve_direct_with<B, S>(
  domain: &Domain,
  problem: &PoissonProblem<B, S>,
  method: DirectMethod,
) -> Result<DirectSolution>
where
  B: Fn(f64, f64) -> f64,
  S: Fn(f64, f64) -> f64,
{
  let stencils = StencilSet::compute(domain, &OperatorSpec::laplacian());
  let system = assemble_system(domain, &stencils, problem);
  let solution = system.solve(method)?;
  Ok(finish(domain, problem, stencils, system, solution))
}

fn finish<B, S>(
  domain: &Domain,
  problem: &PoissonProblem<B, S>,
  stencils: StencilSet,
  system: GlobalSystem,
  solution: na::DVector<f64>,
) -> DirectSolution
where
  B: Fn(f64, f64) -> f64,
  S: Fn(f64, f64) -> f64,
{
  debug!(
    "{}: solved global system with {} unknowns and {} nonzeros",
    domain.kind(),
    system.nunknowns(),
    system.matrix.ntriplets()
  );

  // Boundary values are kept exactly as prescribed.
  let mut u_ap = problem.initial_field(domain);
  for (&inode, &value) in system.unknowns.iter().zip(solution.iter()) {
    if !domain.is_boundary(inode) {
      u_ap[inode] = value;
    }
  }
  let u_ex = problem.reference_field(domain);

  DirectSolution {
    field: SolutionField::new(u_ap, u_ex),
    stencils,
    system,
  }
}
