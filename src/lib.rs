//! Closest and furthest edge search over a spherical cell index.
//!
//! [`ClosestEdgeQueryBase`] is a best-first branch-and-bound search over a
//! [`ShapeIndex`](s2_index::ShapeIndex), generic over a [`Distance`] metric and
//! a [`Target`]. [`MinDistance`] gives ordinary nearest-edge queries;
//! [`MaxDistance`] inverts the metric so the same engine finds the furthest
//! edges.
//!
//! # Example
//!
//! ```
//! use s2_edge_query::textformat::{make_index, make_point};
//! use s2_edge_query::{ClosestEdgeQuery, MinDistance, Options, PointTarget};
//!
//! let index = make_index("0:0 | 0:1 | 0:2 # 5:0, 5:10 #");
//! let options = Options::default()
//!     .with_max_edges(2)
//!     .with_max_distance(MinDistance::from_degrees(3.0));
//! let mut query = ClosestEdgeQuery::with_options(&index, options);
//! let results = query.find_closest_edges(&PointTarget::new(make_point("0:1.2")));
//! assert_eq!(results.len(), 2);
//! assert_eq!((results[0].shape_id, results[0].edge_id), (0, Some(1)));
//! ```

pub mod closest;
pub mod distance;
pub mod error;
pub mod furthest;
pub mod options;
pub mod query;
pub mod result;
pub mod target;
pub mod textformat;
pub mod util;

pub use closest::ClosestEdgeQuery;
pub use distance::{Distance, MinDistance};
pub use error::ParseError;
pub use furthest::{FurthestEdgeQuery, FurthestEdgeTarget, FurthestPointTarget, MaxDistance};
pub use options::Options;
pub use query::{ClosestEdgeQueryBase, SearchStats};
pub use result::QueryResult;
pub use target::{CellTarget, EdgeTarget, PointTarget, ShapeIndexTarget, Target};

pub use s2_index;
