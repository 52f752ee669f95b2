use super::triangulation::Triangulation;
use crate::NodeIdx;

use itertools::Itertools;

pub type Edge = [NodeIdx; 2];

impl Triangulation {
  /// The boundary consists of the edges that belong to exactly one triangle.
  ///
  /// Edges are returned with sorted vertices, in no particular order.
  pub fn boundary_edges(&self) -> Vec<Edge> {
    self
      .triangles()
      .iter()
      .flat_map(|&[a, b, c]| [[a, b], [b, c], [c, a]])
      .map(|[a, b]| [a.min(b), a.max(b)])
      .counts()
      .into_iter()
      .filter_map(|(edge, count)| (count == 1).then_some(edge))
      .collect()
  }

  /// The nodes that lie on the boundary of the triangulation, sorted.
  pub fn topological_boundary_nodes(&self) -> Vec<NodeIdx> {
    self
      .boundary_edges()
      .into_iter()
      .flatten()
      .unique()
      .sorted_unstable()
      .collect()
  }
}
