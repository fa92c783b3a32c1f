//! Bidirectional codec for the AEP animation project format: two binary
//! pointer-width dialects (x86, x64) and a JSON mirror, converting
//! losslessly between any pair via the shared [`model`].
pub mod arch;
pub mod binary;
mod bounds;
pub mod error;
pub mod json;
mod io;
pub mod model;

pub use arch::Architecture;
pub use error::{BoundsError, Error, FormatError, ReferentialError, Result, StructuralError};
pub use model::Project;

/// Decode a project from a buffer in one of the binary dialects.
pub fn decode_binary(buffer: &[u8], architecture: Architecture) -> Result<Project> {
    binary::decode(buffer, architecture)
}

/// Encode a project into one of the binary dialects.
pub fn encode_binary(project: &Project, architecture: Architecture) -> Result<Vec<u8>> {
    binary::encode(project, architecture)
}

/// Decode a project from its JSON representation.
pub fn decode_json(buffer: &[u8]) -> Result<Project> {
    json::decode(buffer)
}

/// Encode a project to its pretty-printed JSON representation.
pub fn encode_json(project: &Project) -> Result<Vec<u8>> {
    json::encode(project)
}
