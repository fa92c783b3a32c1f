//! Binary low-level I/O: a positioned cursor over an in-memory buffer for
//! reading, and a growable in-memory buffer for writing.
pub mod reader;
pub mod writer;

pub use reader::BinaryReader;
pub use writer::{BinaryWriter, StringWriter};
