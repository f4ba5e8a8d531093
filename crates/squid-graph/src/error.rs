use squid_core::{ElementId, ElementKind};
use thiserror::Error;

/// Errors raised by the structural index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("unknown element: {0}")]
    UnknownElement(String),

    #[error("unknown element handle {0}")]
    UnknownHandle(ElementId),

    #[error("kind conflict for {key}: registered as {existing}, reported as {requested}")]
    KindConflict {
        key: String,
        existing: ElementKind,
        requested: ElementKind,
    },
}

/// Errors raised by the dependency graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("{key} is a {kind}, not a type")]
    NotAType { key: String, kind: ElementKind },

    #[error(transparent)]
    Index(#[from] IndexError),
}
