//! Post-processing applied after the engine has run: splitting packed
//! integers into sub-fields, numeric transforms and code-to-label mapping.
//!
//! A packed layout is declared as one integer field covering every
//! sub-field followed by one placeholder per extra sub-field, in output
//! order. [`apply_overlay`] then reads the raw integer once and replaces
//! each slot, the first one included, with its own bits.

use crate::error::DecodeError;
use crate::record::{Record, Value};
use crate::types::UNKNOWN;

/// `(code, label)` pairs for [`map_enum`].
pub type EnumTable = [(u64, &'static str)];

/// `width` bits of `raw` starting at bit `shift` (bit 0 is the LSB).
pub fn extract_bits(raw: u64, shift: u32, width: u32) -> u64 {
    if shift >= 64 {
        return 0;
    }
    let shifted = raw >> shift;
    if width >= 64 {
        shifted
    } else {
        shifted & ((1u64 << width) - 1)
    }
}

/// Interprets the low `width` bits of `value` as two's complement.
pub fn sign_extend(value: u64, width: u32) -> i64 {
    match width {
        0 => 0,
        64.. => value as i64,
        _ => {
            let unused = 64 - width;
            ((value << unused) as i64) >> unused
        }
    }
}

/// One sub-field of a packed integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub name: &'static str,
    pub shift: u32,
    pub width: u32,
    pub signed: bool,
}

impl BitField {
    pub const fn unsigned(name: &'static str, shift: u32, width: u32) -> Self {
        BitField {
            name,
            shift,
            width,
            signed: false,
        }
    }

    pub const fn signed(name: &'static str, shift: u32, width: u32) -> Self {
        BitField {
            name,
            shift,
            width,
            signed: true,
        }
    }

    pub fn extract(&self, raw: u64) -> Value {
        let bits = extract_bits(raw, self.shift, self.width);
        if self.signed {
            Value::Int(sign_extend(bits, self.width))
        } else {
            Value::UInt(bits)
        }
    }
}

/// Splits the integer stored under `source` into `layout`, replacing each
/// named slot in place.
pub fn apply_overlay(
    record: &mut Record,
    source: &'static str,
    layout: &[BitField],
) -> Result<(), DecodeError> {
    let raw = record.require_u64(source)?;
    for field in layout {
        record
            .replace(field.name, field.extract(raw))
            .ok_or(DecodeError::MissingField(field.name))?;
    }
    Ok(())
}

/// Replaces the integer under `name` with `f(value)`.
pub fn map_uint<F>(record: &mut Record, name: &'static str, f: F) -> Result<(), DecodeError>
where
    F: FnOnce(u64) -> Value,
{
    let raw = record.require_u64(name)?;
    record.replace(name, f(raw));
    Ok(())
}

pub fn enum_label(table: &EnumTable, code: u64) -> &'static str {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN)
}

/// Replaces the integer under `name` with its label from `table`, or with
/// [`UNKNOWN`]. Never fails: an absent field is left absent.
pub fn map_enum(record: &mut Record, name: &str, table: &EnumTable) {
    let Some(current) = record.get(name) else {
        return;
    };
    let label = match current.as_u64() {
        Some(code) => enum_label(table, code),
        None => UNKNOWN,
    };
    record.replace(name, Value::from(label));
}
