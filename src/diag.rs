//! The common log packet header shared by every DM log type.
//!
//! A standard log packet is
//! `[2 bytes reserved][2 bytes log_msg_len][2 bytes type_id][8 bytes timestamp][payload]`,
//! where `log_msg_len` counts itself, the type id, the timestamp and the
//! payload. "Custom" packets are the same minus the two reserved bytes.

use chrono::{DateTime, Duration, Utc};
use deku::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Length of `log_msg_len` + `type_id` + `timestamp`.
pub const LOG_HEADER_LEN: usize = 12;

// 1980-01-06T00:00:00Z
const GPS_EPOCH_UNIX_SECONDS: i64 = 315_964_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    #[default]
    Standard,
    Custom,
}

impl Framing {
    pub fn reserved_len(self) -> usize {
        match self {
            Framing::Standard => 2,
            Framing::Custom => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(
    endian = "endian",
    ctx = "endian: deku::ctx::Endian",
    ctx_default = "deku::ctx::Endian::Little"
)]
pub struct Timestamp {
    pub ts: u64,
}

impl Timestamp {
    pub fn to_datetime(&self) -> DateTime<Utc> {
        // Upper 48 bits: epoch at 1980-01-06 00:00:00, incremented by 1 for 1/800s
        // Lower 16 bits: time since last 1/800s tick in 1/32 chip units
        let ts_upper = self.ts >> 16;
        let ts_lower = self.ts & 0xffff;
        let epoch = DateTime::<Utc>::from_timestamp(GPS_EPOCH_UNIX_SECONDS, 0).unwrap_or_default();
        let mut delta_millis = ts_upper as f64 * 1.25;
        delta_millis += ts_lower as f64 / 40960.0;
        let ts_delta = Duration::microseconds((delta_millis * 1000.0) as i64);
        epoch.checked_add_signed(ts_delta).unwrap_or(epoch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct LogHeader {
    pub log_msg_len: u16,
    pub type_id: u16,
    pub timestamp: Timestamp,
}

/// A parsed header plus the byte range its payload occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSpan {
    pub header: LogHeader,
    pub payload_offset: usize,
    /// One past the last payload byte, as declared by `log_msg_len`.
    pub payload_limit: usize,
}

impl LogHeader {
    pub fn parse(buf: &[u8], framing: Framing) -> Result<HeaderSpan, DecodeError> {
        let start = framing.reserved_len();
        let needed = start + LOG_HEADER_LEN;
        if buf.len() < needed {
            return Err(DecodeError::HeaderTooShort {
                len: buf.len(),
                needed,
            });
        }
        let (_, header) = LogHeader::from_bytes((&buf[start..needed], 0))?;
        let declared = header.log_msg_len as usize;
        let available = buf.len() - start;
        if declared < LOG_HEADER_LEN || declared > available {
            return Err(DecodeError::DeclaredLengthOutOfRange {
                declared,
                available,
            });
        }
        Ok(HeaderSpan {
            header,
            payload_offset: needed,
            payload_limit: start + declared,
        })
    }

    pub fn payload_len(&self) -> usize {
        (self.log_msg_len as usize).saturating_sub(LOG_HEADER_LEN)
    }
}

/// Builds a complete log packet around `payload`. In standard framing the
/// reserved bytes carry a copy of the length, as the modem emits them.
pub fn build_log_packet(
    framing: Framing,
    type_id: u16,
    timestamp: Timestamp,
    payload: &[u8],
) -> Result<Vec<u8>, DecodeError> {
    let declared = LOG_HEADER_LEN + payload.len();
    let log_msg_len = u16::try_from(declared).map_err(|_| DecodeError::DeclaredLengthOutOfRange {
        declared,
        available: u16::MAX as usize,
    })?;
    let header = LogHeader {
        log_msg_len,
        type_id,
        timestamp,
    };
    let mut packet = Vec::with_capacity(framing.reserved_len() + declared);
    if framing == Framing::Standard {
        packet.extend(log_msg_len.to_le_bytes());
    }
    packet.extend(header.to_bytes()?);
    packet.extend_from_slice(payload);
    Ok(packet)
}

#[cfg(test)]
mod test {
    use super::*;

    // captured on a real device: an LTE RRC OTA log, with the leading
    // command code and pending-message bytes stripped
    const RRC_OTA: &[u8] = &[
        38, 0, 38, 0, 192, 176, 26, 165, 245, 135, 118, 35, 2, 1, 20, 14, 48, 0, 160, 0, 2, 8, 0,
        0, 217, 15, 5, 0, 0, 0, 0, 7, 0, 64, 1, 238, 173, 213, 77, 208,
    ];

    #[test]
    fn test_parse_standard() {
        let span = LogHeader::parse(RRC_OTA, Framing::Standard).unwrap();
        assert_eq!(span.header.log_msg_len, 38);
        assert_eq!(span.header.type_id, 0xb0c0);
        assert_eq!(span.header.timestamp.ts, 72659535985485082);
        assert_eq!(span.payload_offset, 14);
        assert_eq!(span.payload_limit, RRC_OTA.len());
        assert_eq!(span.header.payload_len(), 26);
    }

    #[test]
    fn test_parse_custom() {
        let span = LogHeader::parse(&RRC_OTA[2..], Framing::Custom).unwrap();
        assert_eq!(span.header.type_id, 0xb0c0);
        assert_eq!(span.payload_offset, 12);
        assert_eq!(span.payload_limit, RRC_OTA.len() - 2);
    }

    #[test]
    fn test_timestamp() {
        let ts = Timestamp {
            ts: 72659535985485082,
        };
        assert_eq!(
            ts.to_datetime().date_naive(),
            chrono::NaiveDate::from_ymd_opt(2023, 12, 6).unwrap()
        );
        assert_eq!(
            Timestamp { ts: 0 }.to_datetime().to_rfc3339(),
            "1980-01-06T00:00:00+00:00"
        );
    }

    #[test]
    fn test_short_and_overlong() {
        assert_eq!(
            LogHeader::parse(&RRC_OTA[..10], Framing::Standard),
            Err(DecodeError::HeaderTooShort { len: 10, needed: 14 })
        );
        // declares 38 bytes, but only 20 follow the reserved bytes
        assert_eq!(
            LogHeader::parse(&RRC_OTA[..22], Framing::Standard),
            Err(DecodeError::DeclaredLengthOutOfRange {
                declared: 38,
                available: 20
            })
        );
        let mut too_small = RRC_OTA.to_vec();
        too_small[2] = 5;
        assert!(matches!(
            LogHeader::parse(&too_small, Framing::Standard),
            Err(DecodeError::DeclaredLengthOutOfRange { declared: 5, .. })
        ));
    }

    #[test]
    fn test_build_log_packet() {
        let payload = &RRC_OTA[14..];
        let built = build_log_packet(
            Framing::Standard,
            0xb0c0,
            Timestamp {
                ts: 72659535985485082,
            },
            payload,
        )
        .unwrap();
        assert_eq!(built, RRC_OTA);
        let custom = build_log_packet(
            Framing::Custom,
            0xb0c0,
            Timestamp {
                ts: 72659535985485082,
            },
            payload,
        )
        .unwrap();
        assert_eq!(custom, &RRC_OTA[2..]);
    }
}
