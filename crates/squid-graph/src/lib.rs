//! Squid Graph - structural index and dependency graph
//!
//! This crate holds the two run-scoped structures both scans write into:
//!
//! - [`StructuralIndex`]: uniquely keyed elements with a secondary index by
//!   kind. Registering an existing key returns the existing element.
//! - [`DependencyGraph`]: counted, directed edges between type-level
//!   elements, built on petgraph. Unknown edge targets become external
//!   placeholders in the index, so every endpoint is a valid key.
//!
//! # Example
//!
//! ```
//! use squid_core::ElementKind;
//! use squid_graph::{DependencyGraph, EdgeKind, StructuralIndex};
//!
//! let mut index = StructuralIndex::new();
//! let mut graph = DependencyGraph::new();
//!
//! index.register("com/acme/B", ElementKind::Type, None).unwrap();
//! graph.add_edge(&mut index, "com/acme/B", "lib/Util", EdgeKind::Calls).unwrap();
//!
//! assert_eq!(index.find("lib/Util").unwrap().kind, ElementKind::External);
//! assert_eq!(graph.edge_count(), 1);
//! ```

mod edge;
mod error;
mod graph;
mod index;

pub use edge::{Edge, EdgeKind, GraphEdge};
pub use error::{GraphError, IndexError};
pub use graph::{DependencyGraph, EdgeId};
pub use index::StructuralIndex;
