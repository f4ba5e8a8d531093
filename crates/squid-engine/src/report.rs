//! Recoverable problems met while scanning.
//!
//! Malformed inputs, inconsistent merges and rejected references do not stop
//! a run. They are collected here and returned with the analysis.

use crate::visitor::Phase;
use serde::Serialize;
use squid_core::ElementKind;
use squid_graph::{GraphError, IndexError};
use std::path::PathBuf;
use tracing::warn;

/// One recoverable problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ScanIssue {
    /// A source file could not be parsed and was skipped.
    ParseFailed { path: PathBuf, message: String },

    /// An artifact could not be fully decoded. Classes decoded before the
    /// failure were kept.
    DecodeFailed {
        path: PathBuf,
        message: String,
        partial_classes: usize,
    },

    /// A fact reported a key with a kind different from the registered one.
    KindConflict {
        phase: Phase,
        key: String,
        existing: ElementKind,
        requested: ElementKind,
    },

    /// A class already scanned in this run was decoded again and ignored.
    DuplicateClass { path: PathBuf, key: String },

    /// A fact could not be applied to the model.
    Rejected {
        phase: Phase,
        key: String,
        message: String,
    },
}

/// Counters and issues for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub files_scanned: usize,
    pub classes_scanned: usize,
    pub issues: Vec<ScanIssue>,
}

impl ScanReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an issue and logs it.
    pub fn record(&mut self, issue: ScanIssue) {
        warn!("{}", describe(&issue));
        self.issues.push(issue);
    }

    /// Records an index error raised while applying the fact for `key`.
    pub fn record_index_error(&mut self, phase: Phase, key: &str, err: IndexError) {
        let issue = match err {
            IndexError::KindConflict {
                key,
                existing,
                requested,
            } => ScanIssue::KindConflict {
                phase,
                key,
                existing,
                requested,
            },
            other => ScanIssue::Rejected {
                phase,
                key: key.to_string(),
                message: other.to_string(),
            },
        };
        self.record(issue);
    }

    /// Records a graph error raised while adding an edge touching `key`.
    pub fn record_graph_error(&mut self, phase: Phase, key: &str, err: GraphError) {
        match err {
            GraphError::Index(inner) => self.record_index_error(phase, key, inner),
            other => self.record(ScanIssue::Rejected {
                phase,
                key: key.to_string(),
                message: other.to_string(),
            }),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of source files that failed to parse.
    pub fn parse_failures(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, ScanIssue::ParseFailed { .. }))
            .count()
    }

    /// Number of artifacts that failed to decode.
    pub fn decode_failures(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| matches!(i, ScanIssue::DecodeFailed { .. }))
            .count()
    }
}

fn describe(issue: &ScanIssue) -> String {
    match issue {
        ScanIssue::ParseFailed { path, message } => {
            format!("Skipping source file {}: {}", path.display(), message)
        }
        ScanIssue::DecodeFailed {
            path,
            message,
            partial_classes,
        } => format!(
            "Failed to decode {} ({} classes kept): {}",
            path.display(),
            partial_classes,
            message
        ),
        ScanIssue::KindConflict {
            phase,
            key,
            existing,
            requested,
        } => format!(
            "Dropping {} fact for {}: registered as {}, reported as {}",
            phase, key, existing, requested
        ),
        ScanIssue::DuplicateClass { path, key } => {
            format!("Ignoring class {} in {}: already scanned", key, path.display())
        }
        ScanIssue::Rejected {
            phase,
            key,
            message,
        } => format!("Dropping {} fact for {}: {}", phase, key, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_conflict() {
        let mut report = ScanReport::new();
        report.record_index_error(
            Phase::Bytecode,
            "a/A",
            IndexError::KindConflict {
                key: "a/A".to_string(),
                existing: ElementKind::Method,
                requested: ElementKind::Type,
            },
        );

        assert!(!report.is_clean());
        assert_eq!(
            report.issues[0],
            ScanIssue::KindConflict {
                phase: Phase::Bytecode,
                key: "a/A".to_string(),
                existing: ElementKind::Method,
                requested: ElementKind::Type,
            }
        );
    }

    #[test]
    fn test_failure_counters() {
        let mut report = ScanReport::new();
        report.record(ScanIssue::ParseFailed {
            path: PathBuf::from("A.java"),
            message: "boom".to_string(),
        });
        report.record(ScanIssue::DecodeFailed {
            path: PathBuf::from("B.class"),
            message: "truncated".to_string(),
            partial_classes: 0,
        });
        report.record_graph_error(
            Phase::Bytecode,
            "a/A#run()V",
            GraphError::NotAType {
                key: "a/A#run()V".to_string(),
                kind: ElementKind::Method,
            },
        );

        assert_eq!(report.parse_failures(), 1);
        assert_eq!(report.decode_failures(), 1);
        assert_eq!(report.issues.len(), 3);
    }
}
