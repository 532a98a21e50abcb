//! Cube-face cell hierarchy and edge index on the unit sphere (S2).
//!
//! This crate provides the geometric primitives and the read-only spatial index
//! consumed by distance queries:
//!
//! - [`Angle`] and [`ChordAngle`] angle representations
//! - [`Cap`] spherical caps used as bounding regions
//! - point/edge distance primitives in [`edge_distances`]
//! - [`CellId`] / [`Cell`] cube-face quadtree cells (quadratic UV/ST projection)
//! - [`Shape`] point sets, polylines and polygons
//! - [`ShapeIndex`], a per-face quadtree partitioning shape edges into cells
//!
//! # Example
//!
//! ```
//! use s2_index::{LatLng, Shape, ShapeIndex};
//!
//! let points = vec![
//!     LatLng::from_degrees(0.0, 0.0).to_point(),
//!     LatLng::from_degrees(1.0, 0.0).to_point(),
//! ];
//! let index = ShapeIndex::new(vec![Shape::Points(points)]);
//! assert_eq!(index.num_edges(), 2);
//! assert_eq!(index.edge(0, 1).v0, index.edge(0, 1).v1);
//! ```

mod angle;
mod cap;
mod cell;
pub mod edge_distances;
mod index;
mod latlng;
pub mod predicates;
pub mod projection;
mod shape;

pub use angle::{Angle, ChordAngle};
pub use cap::Cap;
pub use cell::{Cell, CellId, MAX_LEVEL};
pub use index::{
    CellContents, IndexCell, IndexStats, ShapeEdgeId, ShapeIndex, DEFAULT_MAX_EDGES_PER_CELL,
};
pub use latlng::LatLng;
pub use shape::{Edge, Polygon, Shape, ShapeId};

/// Points on the unit sphere are plain double-precision vectors.
pub type Point = glam::DVec3;
