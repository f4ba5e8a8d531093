//! Squid Core - element model and collaborator contracts
//!
//! This crate defines the vocabulary shared by the rest of the workspace:
//! the [`Element`] model stored in the structural index, the key scheme both
//! scans agree on, the facts produced by the external source parser and class
//! decoder, and the analysis configuration.
//!
//! # Example
//!
//! ```
//! use squid_core::{key, ClassFile, MethodDecl};
//!
//! let class = ClassFile::new("com/acme/B")
//!     .with_superclass("com/acme/A")
//!     .with_method(MethodDecl::new("m()V").with_call(0, "com/acme/A", "n()V"));
//!
//! assert_eq!(key::package_of(&class.key), Some("com/acme"));
//! assert_eq!(class.methods[0].body[0].target_key(), "com/acme/A#n()V");
//! ```

mod collaborator;
mod config;
mod element;
mod error;
mod facts;
pub mod key;

pub use collaborator::{ClassDecoder, SourceParser};
pub use config::{SquidConfig, DEFAULT_PROJECT_KEY};
pub use element::{Element, ElementId, ElementKind, MeasureValue, Metric};
pub use error::{ConfigError, DecodeError, DecodeFailure, ParseError, Result};
pub use facts::{BodyFact, CallSite, ClassFile, FieldAccess, FieldDecl, MethodDecl, SourceFact};
