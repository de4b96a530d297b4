//! Conversions from raw field bytes to typed values, one per [`FieldKind`].
//!
//! Every function here is total over its input: the engine has already
//! checked widths, and anything a table doesn't map decodes to [`UNKNOWN`]
//! rather than failing.

use bitvec::prelude::*;
use bytes::Buf;
use chrono::{DateTime, Utc};

use crate::diag::Timestamp;
use crate::field::FieldKind;
use crate::record::{Plmn, Value};

/// Label substituted for any code a lookup table doesn't know.
pub const UNKNOWN: &str = "Unknown";

// LTE downlink/uplink bandwidth, reported as a resource block count
const LTE_BANDWIDTHS: &[(u8, f64)] = &[
    (6, 1.4),
    (15, 3.0),
    (25, 5.0),
    (50, 10.0),
    (75, 15.0),
    (100, 20.0),
];

pub fn uint_le(bytes: &[u8]) -> u64 {
    let n = bytes.len().min(8);
    if n == 0 {
        return 0;
    }
    (&bytes[..n]).get_uint_le(n)
}

pub fn uint_be(bytes: &[u8]) -> u64 {
    let n = bytes.len().min(8);
    if n == 0 {
        return 0;
    }
    (&bytes[..n]).get_uint(n)
}

pub fn int_le(bytes: &[u8]) -> i64 {
    let n = bytes.len().min(8);
    if n == 0 {
        return 0;
    }
    (&bytes[..n]).get_int_le(n)
}

pub fn decode_rsrp(rsrp: u16) -> f64 {
    rsrp as f64 * 0.0625 - 180.0
}

pub fn decode_rssi(rssi: u16) -> f64 {
    rssi as f64 * 0.0625 - 110.0
}

pub fn decode_rsrq(rsrq: u16) -> f64 {
    rsrq as f64 * 0.0625 - 30.0
}

/// WCDMA RSCP/RSSI/EcNo are logged as a single unsigned byte offset by 256.
pub fn decode_wcdma_meas(code: u8) -> i64 {
    code as i64 - 256
}

pub fn bandwidth_mhz(code: u8) -> Option<f64> {
    LTE_BANDWIDTHS
        .iter()
        .find(|(rbs, _)| *rbs == code)
        .map(|(_, mhz)| *mhz)
}

pub fn timestamp(bytes: &[u8]) -> DateTime<Utc> {
    Timestamp { ts: uint_le(bytes) }.to_datetime()
}

/// Six bytes, each holding one decimal digit: three MCC digits then up to
/// three MNC digits. MNC filler bytes (anything above 9) are dropped.
pub fn plmn_compact_a(bytes: &[u8]) -> Plmn {
    let (mcc, mnc) = bytes.split_at(bytes.len().min(3));
    Plmn {
        mcc: mcc.iter().map(|d| d.to_string()).collect(),
        mnc: mnc.iter().filter(|d| **d <= 9).map(|d| d.to_string()).collect(),
    }
}

/// Three bytes of 3GPP packed BCD:
/// `MCC2 MCC1 | MNC3 MCC3 | MNC2 MNC1` (high nibble first in each byte).
/// An MNC3 nibble of 0xf means a two-digit MNC.
pub fn plmn_compact_b(bytes: &[u8]) -> Plmn {
    let mut p = [0u8; 3];
    let n = bytes.len().min(3);
    p[..n].copy_from_slice(&bytes[..n]);
    let mcc = [p[0] & 0x0f, p[0] >> 4, p[1] & 0x0f];
    let mut mnc = vec![p[2] & 0x0f, p[2] >> 4];
    if p[1] >> 4 != 0x0f {
        mnc.push(p[1] >> 4);
    }
    Plmn {
        mcc: mcc.iter().map(|d| d.to_string()).collect(),
        mnc: mnc.iter().map(|d| d.to_string()).collect(),
    }
}

/// Decodes one field's bytes. `None` means the kind produces no output
/// (only [`FieldKind::Skip`]).
pub fn decode_value(kind: FieldKind, raw: &[u8]) -> Option<Value> {
    let value = match kind {
        FieldKind::UnsignedLe => Value::UInt(uint_le(raw)),
        FieldKind::UnsignedBe => Value::UInt(uint_be(raw)),
        FieldKind::SignedLe => Value::Int(int_le(raw)),
        FieldKind::ByteStream => Value::Bytes(raw.to_vec()),
        FieldKind::ByteStreamLe => Value::Bytes(raw.iter().rev().copied().collect()),
        FieldKind::BitStream => Value::Bits(BitVec::from_slice(raw)),
        FieldKind::BitStreamLe => {
            let reversed: Vec<u8> = raw.iter().rev().copied().collect();
            Value::Bits(BitVec::from_vec(reversed))
        }
        FieldKind::Timestamp => Value::Timestamp(timestamp(raw)),
        FieldKind::PlmnCompactA => Value::Plmn(plmn_compact_a(raw)),
        FieldKind::PlmnCompactB => Value::Plmn(plmn_compact_b(raw)),
        FieldKind::Bandwidth => match bandwidth_mhz(uint_le(raw) as u8) {
            Some(mhz) => Value::Float(mhz),
            None => Value::from(UNKNOWN),
        },
        FieldKind::Rsrp => Value::Float(decode_rsrp(uint_le(raw) as u16)),
        FieldKind::Rsrq => Value::Float(decode_rsrq(uint_le(raw) as u16)),
        FieldKind::WcdmaMeas => Value::Int(decode_wcdma_meas(uint_le(raw) as u8)),
        FieldKind::Placeholder => Value::UInt(0),
        FieldKind::Skip => return None,
    };
    Some(value)
}
