extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod direct;
pub mod domain;
pub mod error;
pub mod iterative;
pub mod linalg;
pub mod mesh;
pub mod neighbors;
pub mod norm;
pub mod problem;
pub mod sparse;
pub mod stencil;
pub mod util;

pub type NodeIdx = usize;
