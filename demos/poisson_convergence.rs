//! Convergence of the GFDM Poisson solvers under uniform refinement.
//!
//! Solves $Delta phi = f$ on $[-1, 0]^2$ with $phi = 2 e^(2x + y)$ on a regular grid,
//! the triangulation of that grid and the point cloud of its nodes.

use gfdm::{
  direct::{solve_direct_with, DirectMethod},
  domain::Domain,
  iterative::{solve_iterative, IterativeConfig},
  mesh::{PointCloud, StructuredMesh, Triangulation},
  neighbors::{NearestNeighbors, DEFAULT_MAX_NEIGHBORS},
  norm::mean_square_error,
  problem::PoissonProblem,
  util::algebraic_convergence_rate,
};

fn main() {
  tracing_subscriber::fmt::init();

  let problem = PoissonProblem::new(
    |x: f64, y: f64| 2.0 * (2.0 * x + y).exp(),
    |x: f64, y: f64| 10.0 * (2.0 * x + y).exp(),
  );

  let builders: [(&str, fn(StructuredMesh) -> Domain); 3] = [
    ("regular grid", Domain::regular_grid),
    ("triangulation", |mesh| {
      Domain::triangulation(Triangulation::from_structured(&mesh), DEFAULT_MAX_NEIGHBORS)
    }),
    ("point cloud", |mesh| {
      Domain::cloud(
        PointCloud::from_structured(&mesh),
        &NearestNeighbors,
        DEFAULT_MAX_NEIGHBORS,
      )
    }),
  ];

  for (name, build) in builders {
    println!("{name}");
    println!(
      "| {:>3} | {:>9} | {:>5} | {:>9} | {:>6} |",
      "n", "MSE", "rate", "MSE dir", "sweeps"
    );

    let mut prev_error: Option<f64> = None;
    for irefine in 2..=5 {
      let nnodes_axis = (1 << irefine) + 1;
      let mesh =
        StructuredMesh::new_uniform([-1.0, -1.0], [0.0, 0.0], nnodes_axis, nnodes_axis).unwrap();
      let domain = build(mesh);

      let config = IterativeConfig::for_geometry(domain.kind());
      let iterative = solve_iterative(&domain, &problem, &config);
      let error = mean_square_error(&domain, iterative.field.approx(), iterative.field.exact());

      let direct = solve_direct_with(&domain, &problem, DirectMethod::SparseLu).unwrap();
      let error_direct = mean_square_error(&domain, direct.field.approx(), direct.field.exact());

      let rate = prev_error
        .map(|prev| algebraic_convergence_rate(error, prev))
        .unwrap_or(f64::INFINITY);
      prev_error = Some(error);

      println!(
        "| {:>3} | {:>9.3e} | {:>5.2} | {:>9.3e} | {:>6} |",
        nnodes_axis,
        error,
        rate,
        error_direct,
        iterative.report.iterations()
      );
    }
  }
}
