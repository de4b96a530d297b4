//! The decode engine: walks a field table over a byte buffer.

use crate::error::DecodeError;
use crate::field::Field;
use crate::record::{Record, Value};
use crate::types;

/// Decodes `fmt` against `buf[offset..limit]`, appending one entry per
/// named field to `record`, and returns the number of bytes advanced.
///
/// Each field is bounds-checked before it is read. On a truncation error the
/// offending field is neither read nor appended; fields decoded before it
/// stay in `record`.
pub fn decode_by_fmt(
    fmt: &[Field],
    buf: &[u8],
    offset: usize,
    limit: usize,
    record: &mut Record,
) -> Result<usize, DecodeError> {
    let limit = limit.min(buf.len());
    let mut consumed = 0;
    for field in fmt {
        field.validate()?;
        let start = offset + consumed;
        let end = start
            .checked_add(field.width)
            .filter(|end| *end <= limit && start <= limit)
            .ok_or(DecodeError::Truncated {
                field: field.name,
                offset: start,
                width: field.width,
                limit,
            })?;
        let value = types::decode_value(field.kind, &buf[start..end]);
        if let (Some(name), Some(value)) = (field.name, value) {
            record.push(name, value);
        }
        consumed += field.width;
    }
    Ok(consumed)
}

/// Decodes `fmt` into a fresh record.
pub fn decode_record(
    fmt: &[Field],
    buf: &[u8],
    offset: usize,
    limit: usize,
) -> Result<(Record, usize), DecodeError> {
    let mut record = Record::new();
    let consumed = decode_by_fmt(fmt, buf, offset, limit, &mut record)?;
    Ok((record, consumed))
}

/// A running offset over one bounded region of a buffer, so decoders can
/// chain table decodes without threading offsets by hand.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    offset: usize,
    limit: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8], offset: usize, limit: usize) -> Self {
        Cursor {
            buf,
            offset,
            limit: limit.min(buf.len()),
        }
    }

    pub fn decode(&mut self, fmt: &[Field], record: &mut Record) -> Result<usize, DecodeError> {
        let consumed = decode_by_fmt(fmt, self.buf, self.offset, self.limit, record)?;
        self.offset += consumed;
        Ok(consumed)
    }

    pub fn decode_record(&mut self, fmt: &[Field]) -> Result<Record, DecodeError> {
        let mut record = Record::new();
        self.decode(fmt, &mut record)?;
        Ok(record)
    }

    /// Appends the next `len` bytes as a byte stream named `name`.
    pub fn decode_bytes(
        &mut self,
        name: &'static str,
        len: usize,
        record: &mut Record,
    ) -> Result<usize, DecodeError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.limit)
            .ok_or(DecodeError::Truncated {
                field: Some(name),
                offset: self.offset,
                width: len,
                limit: self.limit,
            })?;
        record.push(name, Value::Bytes(self.buf[self.offset..end].to_vec()));
        self.offset = end;
        Ok(len)
    }

    /// Appends everything up to the limit as a byte stream named `name`.
    pub fn decode_rest(&mut self, name: &'static str, record: &mut Record) -> usize {
        let start = self.offset.min(self.limit);
        record.push(name, Value::Bytes(self.buf[start..self.limit].to_vec()));
        self.offset = self.limit;
        self.limit - start
    }

    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.offset)
    }

    pub fn seek(&mut self, offset: usize) {
        self.offset = offset;
    }
}
