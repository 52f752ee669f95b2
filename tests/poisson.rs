use gfdm::{
  direct::{solve_direct, solve_direct_with, DirectMethod},
  domain::{Domain, GeometryKind},
  iterative::{solve_iterative, GaussSeidel, IterativeConfig},
  mesh::{PointCloud, StructuredMesh, Triangulation},
  neighbors::{NearestNeighbors, DEFAULT_MAX_NEIGHBORS},
  norm::mean_square_error,
  problem::PoissonProblem,
};

use approx::assert_abs_diff_eq;

fn init_tracing() {
  let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn exp_problem() -> PoissonProblem<impl Fn(f64, f64) -> f64, impl Fn(f64, f64) -> f64> {
  PoissonProblem::new(
    |x: f64, y: f64| 2.0 * (2.0 * x + y).exp(),
    |x: f64, y: f64| 10.0 * (2.0 * x + y).exp(),
  )
}

fn quadratic_problem() -> PoissonProblem<impl Fn(f64, f64) -> f64, impl Fn(f64, f64) -> f64> {
  PoissonProblem::new(|x: f64, y: f64| x * x + y * y, |_: f64, _: f64| 4.0)
}

fn negative_unit_square(nnodes_axis: usize) -> StructuredMesh {
  StructuredMesh::new_uniform([-1.0, -1.0], [0.0, 0.0], nnodes_axis, nnodes_axis).unwrap()
}

fn all_geometries(nnodes_axis: usize) -> Vec<Domain> {
  let mesh = negative_unit_square(nnodes_axis);
  vec![
    Domain::regular_grid(mesh.clone()),
    Domain::triangulation(Triangulation::from_structured(&mesh), DEFAULT_MAX_NEIGHBORS),
    Domain::cloud(
      PointCloud::from_structured(&mesh),
      &NearestNeighbors,
      DEFAULT_MAX_NEIGHBORS,
    ),
  ]
}

#[test]
fn grid_reproduces_quadratic() {
  init_tracing();
  let domain = Domain::regular_grid(StructuredMesh::new_unit_square(9).unwrap());
  let problem = quadratic_problem();
  let solution = solve_iterative(&domain, &problem, &IterativeConfig::for_geometry(domain.kind()));
  assert!(solution.field.max_error() < 1e-10);
}

#[test]
fn quadratic_on_all_geometries() {
  init_tracing();
  let problem = quadratic_problem();
  for domain in all_geometries(7) {
    let config = IterativeConfig::for_geometry(domain.kind());
    let iterative = solve_iterative(&domain, &problem, &config);
    assert!(
      iterative.field.max_error() < 1e-8,
      "{}: max error {:e}",
      domain.kind(),
      iterative.field.max_error()
    );
    let direct = solve_direct(&domain, &problem);
    assert!(direct.field.max_error() < 1e-9, "{}", domain.kind());
  }
}

#[test]
fn converged_field_is_a_fixed_point() {
  init_tracing();
  let problem = exp_problem();
  for domain in all_geometries(9) {
    let config = IterativeConfig::for_geometry(domain.kind());
    let solution = solve_iterative(&domain, &problem, &config);

    let relaxation = GaussSeidel::new(&domain, &solution.stencils, problem.source_field(&domain));
    let mut u = solution.field.approx().clone();
    let state = relaxation.sweep(&mut u, solution.report.state);
    assert_eq!(state.iteration, solution.report.iterations() + 1);

    // The grid tolerance lies below the rounding level of the field,
    // there a converged sweep may still flip the last few bits.
    let bound = match domain.kind() {
      GeometryKind::RegularGrid => 16.0 * f64::EPSILON * u.amax(),
      GeometryKind::Triangulation | GeometryKind::UnstructuredCloud => config.tolerance,
    };
    assert!(
      state.sweep_error <= bound,
      "{}: extra sweep changed by {:e}",
      domain.kind(),
      state.sweep_error
    );
  }
}

#[test]
fn boundary_values_are_never_touched() {
  init_tracing();
  let problem = exp_problem();
  for domain in all_geometries(6) {
    let initial = problem.initial_field(&domain);
    let iterative = solve_iterative(
      &domain,
      &problem,
      &IterativeConfig::for_geometry(domain.kind()),
    );
    let direct = solve_direct(&domain, &problem);
    for inode in (0..domain.nnodes()).filter(|&i| domain.is_boundary(i)) {
      let coord = domain.coords().coord(inode);
      let phi = problem.boundary_value(coord.x, coord.y);
      assert_eq!(initial[inode], phi);
      assert_eq!(iterative.field.approx()[inode], phi);
      assert_eq!(direct.field.approx()[inode], phi);
    }
  }
}

#[test]
fn direct_matches_iterative() {
  init_tracing();
  let problem = exp_problem();
  for domain in all_geometries(9) {
    let iterative = solve_iterative(
      &domain,
      &problem,
      &IterativeConfig::for_geometry(domain.kind()),
    );
    assert!(iterative.report.converged() || iterative.report.sweep_error() < 1e-13);
    let direct = solve_direct(&domain, &problem);
    let diff = (iterative.field.approx() - direct.field.approx()).amax();
    assert!(diff < 1e-6, "{}: solvers differ by {diff:e}", domain.kind());
  }
}

#[test]
fn sparse_lu_matches_pseudoinverse() {
  init_tracing();
  let problem = exp_problem();
  for domain in all_geometries(8) {
    let pinv = solve_direct_with(&domain, &problem, DirectMethod::PseudoInverse).unwrap();
    let lu = solve_direct_with(&domain, &problem, DirectMethod::SparseLu).unwrap();
    let diff = (pinv.field.approx() - lu.field.approx()).amax();
    assert!(diff < 1e-9, "{}: solvers differ by {diff:e}", domain.kind());
  }
}

/// $phi = 2 e^(2x + y)$ on $[-1, 0]^2$ under refinement.
#[test]
fn exponential_mse_decreases() {
  init_tracing();
  let problem = exp_problem();
  let mut prev_errors: Option<Vec<f64>> = None;
  for nnodes_axis in [5, 9, 17] {
    let errors: Vec<f64> = all_geometries(nnodes_axis)
      .iter()
      .map(|domain| {
        let config = IterativeConfig::for_geometry(domain.kind());
        let solution = solve_iterative(domain, &problem, &config);
        let error = mean_square_error(domain, solution.field.approx(), solution.field.exact());
        assert!(error < 1e-2, "{} with {nnodes_axis}^2 nodes: mse {error:e}", domain.kind());
        error
      })
      .collect();
    if let Some(prev) = &prev_errors {
      for (next, prev) in errors.iter().zip(prev) {
        assert!(next < prev);
      }
    }
    prev_errors = Some(errors);
  }
}

#[test]
fn grid_mse_5x5() {
  init_tracing();
  let domain = Domain::regular_grid(negative_unit_square(5));
  let solution = solve_direct(&domain, &exp_problem());
  let error = mean_square_error(&domain, solution.field.approx(), solution.field.exact());
  assert_abs_diff_eq!(error, 0.0085, epsilon = 5e-4);
}
