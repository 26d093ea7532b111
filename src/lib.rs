//! # perineighbor
//!
//! `perineighbor` is a Rust library that builds the neighbor lists of nonlocal
//! (peridynamic) solvers, designed to be used in Rust as well as compiled to
//! WebAssembly (WASM). For every node of a discretized domain it finds all other
//! nodes within a fixed interaction radius, the *horizon*.
//!
//! ## Features
//!
//! - **k-d tree**: an immutable spatial index with fixed-radius queries, built once over the nodes.
//! - **Parallel**: one independent radius query per node on the `rayon` thread pool.
//! - **Exact**: a node on the horizon sphere is a neighbor; lists never contain the node itself.
//! - **Compact storage**: lists can be flattened into a compressed sparse row layout for large N.
//! - **WASM-first**: Built with `wasm-bindgen` for seamless integration with JavaScript
//!   and TypeScript.
//!
//! ## Example
//!
//! ```
//! use perineighbor::{NeighborDeck, NeighborList};
//!
//! let nodes = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [5.0, 0.0, 0.0]];
//! let list = NeighborList::build(1.5, &nodes, &NeighborDeck::default()).unwrap();
//!
//! assert_eq!(list.neighbors(0).unwrap(), &[1]);
//! assert_eq!(list.neighbors(1).unwrap(), &[0]);
//! assert!(list.neighbors(2).unwrap().is_empty());
//! ```
//!
//! ## Main Interface
//!
//! The primary entry point is the [`NeighborList`] struct. The spatial indices behind
//! it ([`KdTree`], [`CellGrid`], [`BruteForce`]) share the [`RadiusSearch`] trait and
//! read coordinates through [`PointCloud`].

mod bounds;
mod config;
mod error;
pub mod index;
mod neighbor;
pub mod points;
mod wasm;

pub use bounds::BoundingBox;
pub use config::NeighborDeck;
pub use error::NeighborError;
pub use index::grid::CellGrid;
pub use index::kdtree::{DEFAULT_LEAF_SIZE, KdTree};
pub use index::{BruteForce, RadiusSearch, SearchMatch, squared_distance};
pub use neighbor::{CompactNeighborList, NeighborList, NeighborStats};
pub use points::{FlatPoints, PointCloud};
pub use wasm::NeighborList3D;
