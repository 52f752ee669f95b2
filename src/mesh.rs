//! Node layouts the GFDM operates on.
//!
//! Every layout provides a global node numbering, the node coordinates and
//! a flag per node telling whether its value is prescribed (boundary) or solved for.

pub mod boundary;
pub mod cloud;
pub mod coordinates;
pub mod structured;
pub mod triangulation;

pub use cloud::PointCloud;
pub use coordinates::NodeCoords;
pub use structured::StructuredMesh;
pub use triangulation::Triangulation;
