//! Edge types for the dependency graph.
//!
//! Edges connect type-level elements only. Each (source, target, kind)
//! triple has at most one edge; rediscovering it bumps the usage count.

use serde::{Deserialize, Serialize};
use squid_core::ElementId;

/// The kind of dependency between two types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Class A extends class B.
    Extends,

    /// Class implements interface.
    Implements,

    /// A method of A invokes a method of B.
    Calls,

    /// A method of A reads or writes a field of B.
    ReferencesField,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extends => "extends",
            Self::Implements => "implements",
            Self::Calls => "calls",
            Self::ReferencesField => "references_field",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A counted dependency between two types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: ElementId,
    pub target: ElementId,
    pub kind: EdgeKind,

    /// Number of distinct occurrences discovered.
    pub usage: u32,
}

impl Edge {
    /// Creates an edge seen once.
    pub fn new(source: ElementId, target: ElementId, kind: EdgeKind) -> Self {
        Self {
            source,
            target,
            kind,
            usage: 1,
        }
    }

    pub fn touches(&self, vertex: ElementId) -> bool {
        self.source == vertex || self.target == vertex
    }
}

/// A key-based edge for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub usage: u32,
}
