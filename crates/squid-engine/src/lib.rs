//! Squid Engine - scans, visitors and metrics
//!
//! This crate drives the two scans over an analysed project and computes
//! object-oriented design metrics on the resulting model:
//!
//! - The **source scan** registers projects, packages, files, types and
//!   members reported by a [`SourceParser`](squid_core::SourceParser).
//! - The **bytecode scan** merges decoded classes into the same index,
//!   records supertypes and adds `extends`, `implements`, `calls` and
//!   `references_field` edges to the dependency graph.
//! - Metric visitors (RFC, LCOM4) subscribe to the bytecode scan; DIT, NOC
//!   and coupling run once both scans are done.
//!
//! # Example
//!
//! ```
//! use squid_core::{ClassDecoder, ClassFile, DecodeFailure, MethodDecl, ParseError,
//!                  SourceFact, SourceParser, SquidConfig, Metric};
//! use squid_engine::Squid;
//! use std::path::{Path, PathBuf};
//!
//! struct NoSources;
//! impl SourceParser for NoSources {
//!     fn parse(&mut self, _: &Path) -> Result<Vec<SourceFact>, ParseError> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! struct Jar;
//! impl ClassDecoder for Jar {
//!     fn decode(&mut self, _: &Path) -> Result<Vec<ClassFile>, DecodeFailure> {
//!         Ok(vec![
//!             ClassFile::new("com/acme/A").with_method(MethodDecl::new("n()V")),
//!             ClassFile::new("com/acme/B")
//!                 .with_superclass("com/acme/A")
//!                 .with_method(MethodDecl::new("m()V").with_call(0, "com/acme/A", "n()V")),
//!         ])
//!     }
//! }
//!
//! let analysis = Squid::new(SquidConfig::default(), NoSources, Jar)
//!     .scan_files(&[], &[PathBuf::from("app.jar")])
//!     .unwrap();
//!
//! assert_eq!(analysis.measure("com/acme/B", Metric::Dit).unwrap().as_f64(), Some(1.0));
//! assert_eq!(analysis.measure("com/acme/B", Metric::Rfc).unwrap().as_f64(), Some(2.0));
//! ```

mod context;
mod error;
pub mod metrics;
mod report;
mod scan;
mod squid;
mod visitor;

pub use context::AnalysisContext;
pub use error::{Result, SquidError};
pub use report::{ScanIssue, ScanReport};
pub use scan::{BytecodeScanner, SourceScanner};
pub use squid::{Analysis, Squid};
pub use visitor::{
    CodeVisitor, EventKind, MethodEvent, Phase, ReferenceEvent, Subscription, TypeEvent,
    VisitResult, VisitorError, VisitorRegistry,
};
