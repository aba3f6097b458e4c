//! Deterministic binary codec for ledger entities.
//!
//! Integers are unsigned LEB128 varints (`prost`'s encoding) in their shortest
//! form; padded encodings are rejected. List counts and other "16-bit" fields
//! are varints bounded to `u16::MAX`. Fixed-size values
//! (token ids, keys, ciphertexts) are written raw. Every read checks the
//! remaining length first, so a truncated buffer always surfaces as
//! [`CodecError::UnexpectedEndOfBuffer`] and never as a panic.

use bytes::{Buf, BufMut, BytesMut};
use prost::encoding::{decode_varint, encode_varint, encoded_len_varint};
use thiserror::Error;

/// Longest possible encoding of a `u64` varint.
pub const MAX_VARINT_LEN: usize = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of buffer")]
    UnexpectedEndOfBuffer,

    #[error("invalid {field} discriminant: {value}")]
    InvalidDiscriminant { field: &'static str, value: u64 },

    #[error("malformed varint")]
    MalformedVarint,

    #[error("{field} value {value} exceeds {max}")]
    ValueOutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("{field} has {len} entries, limit is {max}")]
    TooManyEntries {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{0} trailing bytes after decoded value")]
    TrailingBytes(usize),
}

/// Append-only encoder.
#[derive(Debug, Default)]
pub struct BufferWriter {
    buf: BytesMut,
}

impl BufferWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn write_uvarint(&mut self, value: u64) {
        encode_varint(value, &mut self.buf);
    }

    pub fn write_uvarint16(&mut self, value: u16) {
        encode_varint(u64::from(value), &mut self.buf);
    }

    /// Write a list length, refusing lists that cannot be represented.
    pub fn write_count(&mut self, field: &'static str, len: usize) -> Result<(), CodecError> {
        let count = u16::try_from(len).map_err(|_| CodecError::TooManyEntries {
            field,
            len,
            max: usize::from(u16::MAX),
        })?;
        self.write_uvarint16(count);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Cursor over an encoded buffer.
#[derive(Debug)]
pub struct BufferReader<'a> {
    buf: &'a [u8],
}

impl<'a> BufferReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    pub fn read_uvarint(&mut self) -> Result<u64, CodecError> {
        let window = &self.buf[..self.buf.len().min(MAX_VARINT_LEN)];
        // Every byte still has its continuation bit set: the varint runs off the end.
        if window.len() < MAX_VARINT_LEN && window.iter().all(|b| b & 0x80 != 0) {
            return Err(CodecError::UnexpectedEndOfBuffer);
        }
        let before = self.buf.len();
        let value = decode_varint(&mut self.buf).map_err(|_| CodecError::MalformedVarint)?;
        // Only the shortest encoding is accepted, so every value has one wire form.
        if before - self.buf.len() != encoded_len_varint(value) {
            return Err(CodecError::MalformedVarint);
        }
        Ok(value)
    }

    pub fn read_uvarint16(&mut self, field: &'static str) -> Result<u16, CodecError> {
        let value = self.read_uvarint()?;
        u16::try_from(value).map_err(|_| CodecError::ValueOutOfRange {
            field,
            value,
            max: u64::from(u16::MAX),
        })
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        if !self.buf.has_remaining() {
            return Err(CodecError::UnexpectedEndOfBuffer);
        }
        Ok(self.buf.get_u8())
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        if self.buf.remaining() < N {
            return Err(CodecError::UnexpectedEndOfBuffer);
        }
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        Ok(out)
    }

    /// Require that the whole buffer was consumed.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.buf.len() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}
