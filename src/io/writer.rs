//! A growable in-memory buffer writer, and a deduplicating specialization
//! for the strings section.
use indexmap::IndexMap;

use crate::arch::Architecture;

/// Writes little-endian primitives and architecture-width pointers/counts
/// to a growable in-memory buffer. Writes are purely sequential: the
/// encoder never needs to seek backward and patch an earlier offset,
/// because every pointer value is computed from an already-known section
/// offset before the field that holds it is written.
pub struct BinaryWriter {
    buffer: Vec<u8>,
    architecture: Architecture,
}

impl BinaryWriter {
    pub fn new(architecture: Architecture) -> Self {
        Self {
            buffer: Vec::new(),
            architecture,
        }
    }

    pub fn tell(&self) -> u64 {
        self.buffer.len() as u64
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes an integer whose width equals the architecture's pointer
    /// size, truncating (`value` must already fit).
    pub fn write_pointer(&mut self, value: u64) {
        self.write_arch_width(value);
    }

    pub fn write_count(&mut self, value: u64) {
        self.write_arch_width(value);
    }

    fn write_arch_width(&mut self, value: u64) {
        match self.architecture {
            Architecture::X86 => self.write_u32(value as u32),
            Architecture::X64 => self.buffer.extend_from_slice(&value.to_le_bytes()),
        }
    }

    pub fn write_terminator(&mut self, n: u64) {
        self.buffer.extend(std::iter::repeat(0u8).take(n as usize));
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

/// A [`BinaryWriter`] specialized for the strings section: reuses the
/// offset of a string's first occurrence instead of writing it again.
///
/// This is a correctness requirement, not an optimization — the reference
/// encoder reuses string offsets and every string class (asset names,
/// layer names, marker names) shares one table so phase-1 size prediction
/// stays exact.
pub struct StringWriter {
    inner: BinaryWriter,
    offsets: IndexMap<String, u64>,
}

impl StringWriter {
    pub fn new(architecture: Architecture) -> Self {
        Self {
            inner: BinaryWriter::new(architecture),
            offsets: IndexMap::new(),
        }
    }

    pub fn tell(&self) -> u64 {
        self.inner.tell()
    }

    /// Writes `value` if it hasn't been seen before and returns the
    /// relative offset (within this writer's buffer) of its first
    /// occurrence.
    pub fn write_string(&mut self, value: &str) -> u64 {
        if let Some(offset) = self.offsets.get(value) {
            return *offset;
        }
        let offset = self.inner.tell();
        self.inner.buffer.extend_from_slice(value.as_bytes());
        self.inner.write_terminator(1);
        self.offsets.insert(value.to_string(), offset);
        offset
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_primitives_little_endian() {
        let mut w = BinaryWriter::new(Architecture::X86);
        w.write_u16(0x0302);
        w.write_f32(1.0);
        assert_eq!(w.into_bytes(), vec![0x02, 0x03, 0x00, 0x00, 0x80, 0x3f]);
    }

    #[test]
    fn pointer_width_depends_on_architecture() {
        let mut w86 = BinaryWriter::new(Architecture::X86);
        w86.write_pointer(1);
        assert_eq!(w86.tell(), 4);

        let mut w64 = BinaryWriter::new(Architecture::X64);
        w64.write_pointer(1);
        assert_eq!(w64.tell(), 8);
    }

    #[test]
    fn string_writer_dedups_first_occurrence() {
        let mut w = StringWriter::new(Architecture::X86);
        let a1 = w.write_string("hello");
        let b = w.write_string("world");
        let a2 = w.write_string("hello");
        assert_eq!(a1, 0);
        assert_eq!(a2, 0);
        assert_eq!(b, 6);
        assert_eq!(w.into_bytes(), b"hello\0world\0");
    }
}
