//! The two scan pipelines.
//!
//! The source pipeline runs first and lays down the ownership baseline. The
//! bytecode pipeline then reuses the same keys to attach supertypes, members
//! and references, and is the only producer of dependency edges.

mod bytecode;
mod source;

pub use bytecode::BytecodeScanner;
pub use source::SourceScanner;
