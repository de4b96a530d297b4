//! Decoding one complete log packet: header, version, then the
//! version-specific payload decoder from the registry.

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::diag::{Framing, LogHeader};
use crate::engine::Cursor;
use crate::error::DecodeError;
use crate::log_codes::LogCode;
use crate::record::{Record, Value};
use crate::registry::{PacketFamily, PacketRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    #[default]
    Full,
    /// Only the common header is decoded; the payload is left untouched.
    HeaderOnly,
}

/// How far decoding of a packet got.
#[derive(Debug, Clone, PartialEq)]
pub enum PacketStatus {
    Decoded,
    HeaderOnly,
    /// No family is registered for the type id. Only the header is present.
    UnknownType,
    /// The family is known but this version isn't. The header and the
    /// family's version fields are present.
    UnknownVersion { version: u32 },
    /// The payload decoder failed. The record is cut back to the header.
    Failed(DecodeError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub header: LogHeader,
    pub record: Record,
    pub status: PacketStatus,
}

impl Packet {
    pub fn type_id(&self) -> u16 {
        self.header.type_id
    }

    pub fn type_name(&self) -> &'static str {
        LogCode::from_type_id(self.header.type_id)
            .map(LogCode::name)
            .unwrap_or(crate::types::UNKNOWN)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.header.timestamp.to_datetime()
    }

    pub fn is_decoded(&self) -> bool {
        self.status == PacketStatus::Decoded
    }
}

fn header_record(header: &LogHeader) -> Record {
    let mut record = Record::new();
    record.push("log_msg_len", Value::UInt(header.log_msg_len as u64));
    record.push("type_id", Value::UInt(header.type_id as u64));
    record.push("timestamp", Value::Timestamp(header.timestamp.to_datetime()));
    record
}

/// Decodes one log packet.
///
/// Only a buffer whose header can't be read is an `Err`. Everything that
/// goes wrong after the header (unknown type, unknown version, a payload
/// that doesn't match its table) is reported through [`Packet::status`], so
/// one bad packet never stops a batch.
pub fn decode_log_packet(
    registry: &PacketRegistry,
    buf: &[u8],
    framing: Framing,
    mode: DecodeMode,
) -> Result<Packet, DecodeError> {
    let span = LogHeader::parse(buf, framing)?;
    let header = span.header;
    let mut record = header_record(&header);

    if mode == DecodeMode::HeaderOnly {
        return Ok(Packet {
            header,
            record,
            status: PacketStatus::HeaderOnly,
        });
    }

    let Some(family) = registry.family(header.type_id) else {
        debug!("no decoder for log type {:#06x}", header.type_id);
        return Ok(Packet {
            header,
            record,
            status: PacketStatus::UnknownType,
        });
    };

    let header_len = record.len();
    let mut cursor = Cursor::new(buf, span.payload_offset, span.payload_limit);
    let status = match decode_payload(family, &mut cursor, &mut record) {
        Ok(status) => status,
        Err(err) => {
            debug!("failed to decode {} payload: {err}", family.name);
            record.truncate(header_len);
            PacketStatus::Failed(err)
        }
    };
    Ok(Packet {
        header,
        record,
        status,
    })
}

fn decode_payload(
    family: &PacketFamily,
    cursor: &mut Cursor<'_>,
    record: &mut Record,
) -> Result<PacketStatus, DecodeError> {
    cursor.decode(family.version_fmt, record)?;
    let version = family.version_of(record)?;
    let Some(decode) = family.decoder(version) else {
        warn!("unknown {} version {version}", family.name);
        return Ok(PacketStatus::UnknownVersion { version });
    };
    decode(cursor, record)?;
    if cursor.remaining() > 0 {
        warn!(
            "warning: {} leftover bytes when decoding {} v{version}",
            cursor.remaining(),
            family.name
        );
    }
    Ok(PacketStatus::Decoded)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diag::{Timestamp, build_log_packet};
    use crate::field::Field;
    use crate::registry::RegistryBuilder;

    const TYPE_ID: u16 = 0xb0c2;
    const VERSION: &[Field] = &[Field::uint("Version", 1)];
    const WIDE_VERSION: &[Field] = &[Field::uint("Version", 8)];

    fn decode_v1(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
        cursor.decode(&[Field::uint("Physical Cell ID", 2), Field::uint("Band", 1)], record)?;
        Ok(())
    }

    fn registry() -> PacketRegistry {
        let mut builder = RegistryBuilder::new();
        builder.family(TYPE_ID, VERSION, Some("Version")).unwrap();
        builder.version(TYPE_ID, 1, decode_v1).unwrap();
        builder.build()
    }

    fn packet(payload: &[u8]) -> Vec<u8> {
        build_log_packet(Framing::Standard, TYPE_ID, Timestamp { ts: 0 }, payload).unwrap()
    }

    fn decode(buf: &[u8], mode: DecodeMode) -> Packet {
        decode_log_packet(&registry(), buf, Framing::Standard, mode).unwrap()
    }

    #[test]
    fn test_full_decode() {
        let buf = packet(&[1, 0x0e, 0x01, 7]);
        let packet = decode(&buf, DecodeMode::Full);
        assert_eq!(packet.status, PacketStatus::Decoded);
        assert_eq!(packet.type_name(), "LTE_RRC_Serv_Cell_Info");
        let names: Vec<&str> = packet.record.names().collect();
        assert_eq!(
            names,
            vec!["log_msg_len", "type_id", "timestamp", "Version", "Physical Cell ID", "Band"]
        );
        assert_eq!(packet.record.get_u64("Physical Cell ID"), Some(270));
        assert_eq!(packet.record.get_u64("log_msg_len"), Some(16));
    }

    #[test]
    fn test_header_only_is_idempotent() {
        let buf = packet(&[1, 0x0e, 0x01, 7]);
        let a = decode(&buf, DecodeMode::HeaderOnly);
        let b = decode(&buf, DecodeMode::HeaderOnly);
        assert_eq!(a, b);
        assert_eq!(a.status, PacketStatus::HeaderOnly);
        assert_eq!(a.record.len(), 3);

        let full = decode(&buf, DecodeMode::Full);
        assert_eq!(full.header, a.header);
        for (name, value) in a.record.iter() {
            assert_eq!(full.record.get(name), Some(value));
        }
    }

    #[test]
    fn test_unknown_version_keeps_version() {
        let buf = packet(&[9, 0xaa, 0xbb]);
        let packet = decode(&buf, DecodeMode::Full);
        assert_eq!(packet.status, PacketStatus::UnknownVersion { version: 9 });
        assert_eq!(packet.record.get_u64("Version"), Some(9));
        assert!(!packet.record.contains("Physical Cell ID"));
    }

    #[test]
    fn test_unknown_type() {
        let buf =
            build_log_packet(Framing::Standard, 0x1234, Timestamp { ts: 0 }, &[1, 2]).unwrap();
        let packet = decode(&buf, DecodeMode::Full);
        assert_eq!(packet.status, PacketStatus::UnknownType);
        assert_eq!(packet.type_name(), "Unknown");
        assert_eq!(packet.record.len(), 3);
    }

    #[test]
    fn test_truncated_payload() {
        // the declared length stops one byte short of "Band"
        let buf = packet(&[1, 0x0e, 0x01]);
        let packet = decode(&buf, DecodeMode::Full);
        assert!(matches!(
            packet.status,
            PacketStatus::Failed(DecodeError::Truncated { field: Some("Band"), .. })
        ));
        let names: Vec<&str> = packet.record.names().collect();
        assert_eq!(names, vec!["log_msg_len", "type_id", "timestamp"]);
    }

    #[test]
    fn test_version_wider_than_u32() {
        let mut builder = RegistryBuilder::new();
        builder.family(TYPE_ID, WIDE_VERSION, Some("Version")).unwrap();
        builder.version(TYPE_ID, 1, decode_v1).unwrap();
        let registry = builder.build();

        let mut payload = 0x1_0000_0001u64.to_le_bytes().to_vec();
        payload.extend([0x0e, 0x01, 7]);
        let buf = packet(&payload);
        let packet =
            decode_log_packet(&registry, &buf, Framing::Standard, DecodeMode::Full).unwrap();
        assert_eq!(
            packet.status,
            PacketStatus::Failed(DecodeError::VersionOutOfRange {
                field: "Version",
                version: 0x1_0000_0001
            })
        );
        assert!(!packet.record.contains("Physical Cell ID"));
        assert_eq!(packet.record.len(), 3);
    }

    #[test]
    fn test_declared_length_bounds_payload() {
        // trailing bytes past log_msg_len belong to the next packet
        let mut buf = packet(&[1, 0x0e, 0x01]);
        buf.push(7);
        let packet = decode(&buf, DecodeMode::Full);
        assert!(matches!(packet.status, PacketStatus::Failed(_)));
    }

    #[test]
    fn test_short_buffer_is_an_error() {
        assert!(matches!(
            decode_log_packet(&registry(), &[0; 5], Framing::Standard, DecodeMode::Full),
            Err(DecodeError::HeaderTooShort { len: 5, needed: 14 })
        ));
    }

    #[test]
    fn test_custom_framing() {
        let buf = build_log_packet(Framing::Custom, TYPE_ID, Timestamp { ts: 0 }, &[1, 3, 0, 2])
            .unwrap();
        let packet =
            decode_log_packet(&registry(), &buf, Framing::Custom, DecodeMode::Full).unwrap();
        assert_eq!(packet.status, PacketStatus::Decoded);
        assert_eq!(packet.record.get_u64("Band"), Some(2));
    }
}
