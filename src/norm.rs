//! Discrete error measures.

use crate::domain::Domain;

/// Shoelace area of a simple polygon given by its vertices in order.
pub fn polygon_area(vertices: &[na::Vector2<f64>]) -> f64 {
  let n = vertices.len();
  let twice_area: f64 = (0..n)
    .map(|i| {
      let a = vertices[(i + n - 1) % n];
      let b = vertices[i];
      a.x * b.y - b.x * a.y
    })
    .sum();
  0.5 * twice_area.abs()
}

/// Area of the polygon spanned by the local neighbors of every node.
///
/// Nodes without a neighborhood, like the boundary of a regular grid, get no area.
pub fn node_areas(domain: &Domain) -> na::DVector<f64> {
  na::DVector::from_iterator(
    domain.nnodes(),
    (0..domain.nnodes()).map(|inode| {
      let polygon: Vec<_> = domain
        .local_neighbors(inode)
        .into_iter()
        .map(|jnode| domain.coords().coord(jnode))
        .collect();
      polygon_area(&polygon)
    }),
  )
}

/// Area weighted error $sqrt(sum_i A_i (u_i - u_(ex,i))^2)$.
pub fn mean_square_error(
  domain: &Domain,
  u_ap: &na::DVector<f64>,
  u_ex: &na::DVector<f64>,
) -> f64 {
  assert_eq!(u_ap.len(), domain.nnodes());
  assert_eq!(u_ex.len(), domain.nnodes());
  let areas = node_areas(domain);
  areas
    .iter()
    .zip(u_ap.iter().zip(u_ex.iter()))
    .map(|(area, (ap, ex))| area * (ap - ex).powi(2))
    .sum::<f64>()
    .sqrt()
}
