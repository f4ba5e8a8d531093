//! Interfaces of the external collaborators that feed the engine.
//!
//! Neither parsing source text nor decoding class files happens in this
//! workspace. Implementations live with the embedding tool; tests use
//! in-memory fakes.

use crate::error::{DecodeFailure, ParseError};
use crate::facts::{ClassFile, SourceFact};
use std::path::Path;

/// Produces ownership facts for one source file.
pub trait SourceParser {
    /// Parses `path` and returns its facts in declaration order.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the file cannot be read or parsed. The
    /// engine records the failure and moves on to the next file.
    fn parse(&mut self, path: &Path) -> Result<Vec<SourceFact>, ParseError>;
}

/// Decodes one compiled artifact (class file, archive or directory).
pub trait ClassDecoder {
    /// Decodes `artifact` into the classes it contains, in decoding order.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeFailure`] when decoding stops early. Classes decoded
    /// before the failure travel in [`DecodeFailure::partial`] and are still
    /// committed to the model.
    fn decode(&mut self, artifact: &Path) -> Result<Vec<ClassFile>, DecodeFailure>;
}
