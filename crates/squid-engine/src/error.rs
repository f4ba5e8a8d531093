use crate::visitor::{EventKind, Phase, VisitorError};
use squid_graph::IndexError;
use thiserror::Error;

/// Errors that abort an analysis run.
#[derive(Error, Debug)]
pub enum SquidError {
    /// A subscribed visitor failed. Partial metrics are not exposed.
    #[error("visitor {visitor} failed on {event} during {phase} scan: {source}")]
    Visitor {
        visitor: String,
        phase: Phase,
        event: EventKind,
        #[source]
        source: VisitorError,
    },

    #[error(transparent)]
    Index(#[from] IndexError),
}

pub type Result<T> = std::result::Result<T, SquidError>;
