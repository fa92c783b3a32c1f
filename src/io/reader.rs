//! A positioned cursor over an in-memory byte buffer.
use std::io;

use log::trace;

use crate::arch::Architecture;

/// Reads little-endian primitives, architecture-width pointers/counts, and
/// indirect NUL-terminated ASCII strings from an in-memory buffer.
///
/// The whole file is read into memory up front (the format's backward
/// references make true streaming impractical), so every read here is a
/// bounds-checked slice access rather than a fallible syscall.
pub struct BinaryReader<'a> {
    buffer: &'a [u8],
    position: u64,
    architecture: Architecture,
}

fn eof(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, format!("unexpected eof reading {what}"))
}

impl<'a> BinaryReader<'a> {
    pub fn new(buffer: &'a [u8], architecture: Architecture) -> Self {
        Self {
            buffer,
            position: 0,
            architecture,
        }
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub fn tell(&self) -> u64 {
        self.position
    }

    pub fn seek(&mut self, absolute: u64) {
        self.position = absolute;
    }

    /// Returns up to `n` bytes starting at the current position, short of
    /// the buffer's end (mirrors the reference reader's `peek`, which
    /// likewise may return fewer bytes than requested near EOF).
    pub fn peek(&self, n: usize) -> &'a [u8] {
        let start = self.position as usize;
        if start >= self.buffer.len() {
            return &[];
        }
        let end = (start + n).min(self.buffer.len());
        &self.buffer[start..end]
    }

    fn take(&mut self, n: usize) -> io::Result<&'a [u8]> {
        let start = self.position as usize;
        let end = start.checked_add(n).ok_or_else(|| eof("buffer"))?;
        if end > self.buffer.len() {
            return Err(eof("buffer"));
        }
        self.position += n as u64;
        Ok(&self.buffer[start..end])
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_f32(&mut self) -> io::Result<f32> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads an integer whose width equals the architecture's pointer size
    /// (4 bytes for x86, 8 for x64). Pointers and counts always share this
    /// width in this format.
    pub fn read_pointer(&mut self) -> io::Result<u64> {
        self.read_arch_width()
    }

    pub fn read_count(&mut self) -> io::Result<u64> {
        self.read_arch_width()
    }

    fn read_arch_width(&mut self) -> io::Result<u64> {
        match self.architecture {
            Architecture::X86 => Ok(self.read_u32()? as u64),
            Architecture::X64 => {
                let bytes = self.take(8)?;
                Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
            }
        }
    }

    /// Reads a pointer, follows it to a NUL-terminated ASCII string, then
    /// restores the cursor to just past the pointer.
    pub fn read_string(&mut self) -> io::Result<String> {
        let pointer = self.read_pointer()?;
        let return_cursor = self.position;
        self.seek(pointer);

        let mut bytes = Vec::new();
        loop {
            let b = self.read_u8()?;
            if b == 0 {
                break;
            }
            bytes.push(b);
        }

        self.seek(return_cursor);
        trace!("read_string at {pointer:#x}: {} bytes", bytes.len());
        let s = String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_primitives_little_endian() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x00, 0x00, 0x80, 0x3f];
        let mut r = BinaryReader::new(&buf, Architecture::X86);
        assert_eq!(r.read_u8().unwrap(), 0x01);
        assert_eq!(r.read_u16().unwrap(), 0x0302);
        assert_eq!(r.read_f32().unwrap(), 1.0);
    }

    #[test]
    fn pointer_width_depends_on_architecture() {
        let buf = [1, 0, 0, 0, 0, 0, 0, 0];
        let mut r86 = BinaryReader::new(&buf, Architecture::X86);
        assert_eq!(r86.read_pointer().unwrap(), 1);
        assert_eq!(r86.tell(), 4);

        let mut r64 = BinaryReader::new(&buf, Architecture::X64);
        assert_eq!(r64.read_pointer().unwrap(), 1);
        assert_eq!(r64.tell(), 8);
    }

    #[test]
    fn read_string_restores_cursor() {
        // pointer at 0 -> 8, string "hi\0" at offset 8.
        let mut buf = vec![8, 0, 0, 0];
        buf.extend_from_slice(b"hi\0");
        let mut r = BinaryReader::new(&buf, Architecture::X86);
        let s = r.read_string().unwrap();
        assert_eq!(s, "hi");
        assert_eq!(r.tell(), 4);
    }

    #[test]
    fn peek_does_not_advance() {
        let buf = [0u8; 16];
        let r = BinaryReader::new(&buf, Architecture::X86);
        assert_eq!(r.peek(16), &buf[..]);
        assert_eq!(r.tell(), 0);
    }
}
