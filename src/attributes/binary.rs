//! Binary codec primitives
//!
//! Little-endian fixed-width integers and floats, `u32` length-prefixed
//! strings and byte sequences. The reader tracks its offset so errors can
//! point at the failing byte, and carries the decode limits plus the current
//! tree nesting depth.

use crate::config::DecodeLimits;
use crate::error::{AttributeError, AttributeResult};

/// Append-only byte buffer
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(value as u8);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a collection length prefix
    pub fn write_len(&mut self, len: usize) {
        // Lengths above u32::MAX cannot be represented on the wire
        debug_assert!(len <= u32::MAX as usize);
        self.write_u32(len as u32);
    }

    /// Write length-prefixed raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_len(bytes.len());
        self.buffer.extend_from_slice(bytes);
    }

    /// Write a length-prefixed UTF-8 string
    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Cursor over borrowed bytes
#[derive(Debug)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    cursor: usize,
    limits: DecodeLimits,
    depth: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, DecodeLimits::default())
    }

    pub fn with_limits(data: &'a [u8], limits: DecodeLimits) -> Self {
        Self {
            data,
            cursor: 0,
            limits,
            depth: 0,
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.data.len()
    }

    /// Fail if any bytes are left unread
    pub fn finish(&self) -> AttributeResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(AttributeError::TrailingBytes(n)),
        }
    }

    fn take(&mut self, needed: usize) -> AttributeResult<&'a [u8]> {
        if self.remaining() < needed {
            return Err(AttributeError::UnexpectedEof {
                needed,
                remaining: self.remaining(),
                offset: self.cursor,
            });
        }
        let slice = &self.data[self.cursor..self.cursor + needed];
        self.cursor += needed;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> AttributeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> AttributeResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> AttributeResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u32(&mut self) -> AttributeResult<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> AttributeResult<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> AttributeResult<i64> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> AttributeResult<f32> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    pub fn read_f64(&mut self) -> AttributeResult<f64> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    /// Read a collection length prefix, bounded by `max_collection_len`
    pub fn read_len(&mut self) -> AttributeResult<usize> {
        let length = self.read_u32()? as usize;
        if length > self.limits.max_collection_len {
            return Err(AttributeError::LengthLimitExceeded {
                length,
                limit: self.limits.max_collection_len,
            });
        }
        Ok(length)
    }

    /// Read length-prefixed raw bytes
    pub fn read_bytes(&mut self) -> AttributeResult<Vec<u8>> {
        let length = self.read_u32()? as usize;
        if length > self.limits.max_string_len {
            return Err(AttributeError::LengthLimitExceeded {
                length,
                limit: self.limits.max_string_len,
            });
        }
        Ok(self.take(length)?.to_vec())
    }

    /// Read a length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> AttributeResult<String> {
        let offset = self.cursor;
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|_| AttributeError::InvalidUtf8 { offset })
    }

    /// Enter a nested tree, failing past `max_depth`
    pub fn enter_nested(&mut self) -> AttributeResult<()> {
        if self.depth >= self.limits.max_depth {
            return Err(AttributeError::DepthLimitExceeded {
                max_depth: self.limits.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub fn exit_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_layout() {
        let mut writer = BinaryWriter::new();
        writer.write_i32(-2);
        writer.write_bool(true);
        writer.write_string("ab");

        let bytes = writer.into_bytes();
        assert_eq!(bytes, vec![0xFE, 0xFF, 0xFF, 0xFF, 1, 2, 0, 0, 0, b'a', b'b']);

        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.read_i32().unwrap(), -2);
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_string().unwrap(), "ab");
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_truncated_read() {
        let bytes = [1u8, 2];
        let mut reader = BinaryReader::new(&bytes);

        match reader.read_u32() {
            Err(AttributeError::UnexpectedEof { needed, remaining, offset }) => {
                assert_eq!(needed, 4);
                assert_eq!(remaining, 2);
                assert_eq!(offset, 0);
            }
            other => panic!("expected eof, got {:?}", other),
        }
    }

    #[test]
    fn test_string_limit() {
        let mut writer = BinaryWriter::new();
        writer.write_string("too long");
        let bytes = writer.into_bytes();

        let limits = DecodeLimits {
            max_string_len: 4,
            ..DecodeLimits::default()
        };
        let mut reader = BinaryReader::with_limits(&bytes, limits);
        assert!(matches!(
            reader.read_string(),
            Err(AttributeError::LengthLimitExceeded { length: 8, limit: 4 })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut writer = BinaryWriter::new();
        writer.write_bytes(&[0xFF, 0xFE]);
        let bytes = writer.into_bytes();

        let mut reader = BinaryReader::new(&bytes);
        assert!(matches!(reader.read_string(), Err(AttributeError::InvalidUtf8 { offset: 0 })));
    }

    #[test]
    fn test_depth_limit() {
        let limits = DecodeLimits {
            max_depth: 2,
            ..DecodeLimits::default()
        };
        let mut reader = BinaryReader::with_limits(&[], limits);
        assert!(reader.enter_nested().is_ok());
        assert!(reader.enter_nested().is_ok());
        assert!(reader.enter_nested().is_err());
        reader.exit_nested();
        assert!(reader.enter_nested().is_ok());
    }
}
