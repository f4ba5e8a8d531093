//! Metric algorithms.
//!
//! RFC and LCOM4 are visitors driven by the bytecode pipeline. DIT, NOC and
//! the coupling counts need the whole model and run as post-passes once both
//! scans are done.

mod coupling;
mod hierarchy;
mod lcom4;
mod rfc;

pub use coupling::compute_coupling;
pub use hierarchy::{compute_dit, compute_noc, TypeHierarchy};
pub use lcom4::Lcom4Visitor;
pub use rfc::RfcVisitor;
