use crate::NodeIdx;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeCoords {
  /// The node coordinates in the columns of a matrix.
  matrix: na::Matrix2xX<f64>,
}
impl NodeCoords {
  pub fn new(matrix: na::Matrix2xX<f64>) -> Self {
    Self { matrix }
  }

  pub fn from_points(points: &[[f64; 2]]) -> Self {
    let matrix = na::Matrix2xX::from_fn(points.len(), |r, c| points[c][r]);
    Self { matrix }
  }

  pub fn nnodes(&self) -> usize {
    self.matrix.ncols()
  }

  pub fn coord(&self, inode: NodeIdx) -> na::Vector2<f64> {
    self.matrix.column(inode).into_owned()
  }

  pub fn coord_iter(&self) -> impl Iterator<Item = na::Vector2<f64>> + '_ {
    self.matrix.column_iter().map(|c| c.into_owned())
  }

  /// Position of `to` relative to `from`.
  pub fn offset(&self, from: NodeIdx, to: NodeIdx) -> na::Vector2<f64> {
    self.matrix.column(to) - self.matrix.column(from)
  }

  pub fn matrix(&self) -> &na::Matrix2xX<f64> {
    &self.matrix
  }
  pub fn into_matrix(self) -> na::Matrix2xX<f64> {
    self.matrix
  }

  pub fn eval_coord_fn<F>(&self, mut f: F) -> na::DVector<f64>
  where
    F: FnMut(f64, f64) -> f64,
  {
    na::DVector::from_iterator(
      self.nnodes(),
      self.matrix.column_iter().map(|c| f(c[0], c[1])),
    )
  }

  /// Orders `nodes` counter-clockwise by their angle around `center`.
  ///
  /// Angles are measured from the positive x-axis in `[0, 2pi)`,
  /// so the first node is the one closest to the direction of `+x`.
  pub fn sort_by_angle(&self, center: NodeIdx, nodes: &mut [NodeIdx]) {
    let angle = |inode: NodeIdx| {
      let d = self.offset(center, inode);
      d.y.atan2(d.x).rem_euclid(std::f64::consts::TAU)
    };
    nodes.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
  }
}

#[cfg(test)]
mod test {
  use super::NodeCoords;

  #[test]
  fn angular_order_starts_at_positive_x() {
    let coords = NodeCoords::from_points(&[
      [0.0, 0.0],
      [0.0, -1.0],
      [-1.0, 0.0],
      [1.0, 0.0],
      [0.0, 1.0],
      [1.0, 1.0],
    ]);
    let mut nodes = vec![1, 2, 3, 4, 5];
    coords.sort_by_angle(0, &mut nodes);
    assert_eq!(nodes, vec![3, 5, 4, 2, 1]);
  }

  #[test]
  fn eval_coord_fn_visits_nodes_in_order() {
    let coords = NodeCoords::from_points(&[[1.0, 2.0], [3.0, 4.0]]);
    let values = coords.eval_coord_fn(|x, y| x * y);
    assert_eq!(values.as_slice(), &[2.0, 12.0]);
    assert_eq!(coords.offset(0, 1), na::Vector2::new(2.0, 2.0));
  }
}
