//! LTE RRC OTA messages (0xB0C0) and serving cell info (0xB0C2).
//!
//! The OTA header grew over time: the EARFCN widened to 32 bits at version
//! 8 and NR release numbers were added at 25. Which PDU number means which
//! logical channel also moves around between versions.

use crate::engine::Cursor;
use crate::error::{DecodeError, RegistryError};
use crate::field::Field;
use crate::log_codes::LogCode;
use crate::overlay::{BitField, EnumTable, apply_overlay, enum_label};
use crate::packets::PKT_VERSION;
use crate::record::{Record, Value};
use crate::registry::RegistryBuilder;

const VERSION: &[Field] = &[Field::uint(PKT_VERSION, 1)];

const SFN_LAYOUT: &[BitField] = &[
    BitField::unsigned("SysFrameNum", 4, 12),
    BitField::unsigned("SubFrameNum", 0, 4),
];

const OTA_V0: &[Field] = &[
    Field::uint("RRC Release Number", 1),
    Field::uint("RRC Version Number", 1),
    Field::uint("Radio Bearer ID", 1),
    Field::uint("Physical Cell ID", 2),
    Field::uint("Freq", 2),
    Field::uint("SysFrameNum", 2),
    Field::placeholder("SubFrameNum"),
    Field::uint("PDU Number", 1),
    Field::placeholder("PDU Type"),
];

const OTA_V5: &[Field] = &[
    Field::uint("RRC Release Number", 1),
    Field::uint("RRC Version Number", 1),
    Field::uint("Radio Bearer ID", 1),
    Field::uint("Physical Cell ID", 2),
    Field::uint("Freq", 2),
    Field::uint("SysFrameNum", 2),
    Field::placeholder("SubFrameNum"),
    Field::uint("PDU Number", 1),
    Field::placeholder("PDU Type"),
    Field::uint("SIB Mask in SI", 4),
];

const OTA_V8: &[Field] = &[
    Field::uint("RRC Release Number", 1),
    Field::uint("RRC Version Number", 1),
    Field::uint("Radio Bearer ID", 1),
    Field::uint("Physical Cell ID", 2),
    Field::uint("Freq", 4),
    Field::uint("SysFrameNum", 2),
    Field::placeholder("SubFrameNum"),
    Field::uint("PDU Number", 1),
    Field::placeholder("PDU Type"),
    Field::uint("SIB Mask in SI", 4),
];

const OTA_V25: &[Field] = &[
    Field::uint("RRC Release Number", 1),
    Field::uint("RRC Version Number", 1),
    Field::uint("NR RRC Release Number", 1),
    Field::uint("NR RRC Version Number", 1),
    Field::uint("Radio Bearer ID", 1),
    Field::uint("Physical Cell ID", 2),
    Field::uint("Freq", 4),
    Field::uint("SysFrameNum", 2),
    Field::placeholder("SubFrameNum"),
    Field::uint("PDU Number", 1),
    Field::placeholder("PDU Type"),
    Field::uint("SIB Mask in SI", 4),
];

const MSG_LENGTH: &[Field] = &[Field::uint("Msg Length", 2)];

const PDU_TYPES_A: &EnumTable = &[
    (1, "BCCH_BCH"),
    (2, "BCCH_DL_SCH"),
    (3, "MCCH"),
    (4, "PCCH"),
    (5, "DL_CCCH"),
    (6, "DL_DCCH"),
    (7, "UL_CCCH"),
    (8, "UL_DCCH"),
];

const PDU_TYPES_B: &EnumTable = &[
    (8, "BCCH_BCH"),
    (9, "BCCH_DL_SCH"),
    (10, "MCCH"),
    (11, "PCCH"),
    (12, "DL_CCCH"),
    (13, "DL_DCCH"),
    (14, "UL_CCCH"),
    (15, "UL_DCCH"),
];

const PDU_TYPES_C: &EnumTable = &[
    (1, "BCCH_BCH"),
    (2, "BCCH_DL_SCH"),
    (4, "MCCH"),
    (5, "PCCH"),
    (6, "DL_CCCH"),
    (7, "DL_DCCH"),
    (8, "UL_CCCH"),
    (9, "UL_DCCH"),
];

const PDU_TYPES_D: &EnumTable = &[
    (1, "BCCH_BCH"),
    (3, "BCCH_DL_SCH"),
    (6, "MCCH"),
    (7, "PCCH"),
    (8, "DL_CCCH"),
    (9, "DL_DCCH"),
    (10, "UL_CCCH"),
    (11, "UL_DCCH"),
    (45, "BCCH_BCH_NB"),
    (46, "BCCH_DL_SCH_NB"),
    (47, "PCCH_NB"),
    (48, "DL_CCCH_NB"),
    (49, "DL_DCCH_NB"),
    (50, "UL_CCCH_NB"),
    (52, "UL_DCCH_NB"),
];

const PDU_TYPES_E: &EnumTable = &[
    (1, "BCCH_BCH"),
    (2, "BCCH_DL_SCH"),
    (4, "MCCH"),
    (5, "PCCH"),
    (6, "DL_CCCH"),
    (7, "DL_DCCH"),
    (8, "UL_CCCH"),
    (9, "UL_DCCH"),
    (54, "BCCH_BCH_NB"),
    (55, "BCCH_DL_SCH_NB"),
    (56, "PCCH_NB"),
    (57, "DL_CCCH_NB"),
    (58, "DL_DCCH_NB"),
    (59, "UL_CCCH_NB"),
    (61, "UL_DCCH_NB"),
];

/// The PDU number table in effect for a packet version.
pub fn pdu_types(version: u64) -> &'static EnumTable {
    match version {
        0x02 | 0x03 | 0x04 | 0x06 | 0x07 | 0x08 | 0x0d | 0x16 => PDU_TYPES_A,
        0x09 | 0x0c => PDU_TYPES_B,
        0x0e..=0x10 => PDU_TYPES_C,
        0x13 | 0x1a | 0x1b => PDU_TYPES_D,
        0x14 | 0x18 | 0x19 => PDU_TYPES_E,
        _ => &[],
    }
}

fn decode_ota(
    cursor: &mut Cursor<'_>,
    record: &mut Record,
    fmt: &[Field],
) -> Result<(), DecodeError> {
    cursor.decode(fmt, record)?;
    apply_overlay(record, "SysFrameNum", SFN_LAYOUT)?;
    let version = record.require_u64(PKT_VERSION)?;
    let pdu = record.require_u64("PDU Number")?;
    record.replace("PDU Type", Value::from(enum_label(pdu_types(version), pdu)));

    cursor.decode(MSG_LENGTH, record)?;
    let len = record.require_u64("Msg Length")? as usize;
    cursor.decode_bytes("Msg", len, record)?;
    Ok(())
}

fn decode_ota_v0(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    decode_ota(cursor, record, OTA_V0)
}

fn decode_ota_v5(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    decode_ota(cursor, record, OTA_V5)
}

fn decode_ota_v8(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    decode_ota(cursor, record, OTA_V8)
}

fn decode_ota_v25(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    decode_ota(cursor, record, OTA_V25)
}

const SERV_CELL_INFO_V2: &[Field] = &[
    Field::uint("Cell ID", 2),
    Field::uint("Downlink frequency", 4),
    Field::uint("Uplink frequency", 4),
    Field::bandwidth("Downlink bandwidth"),
    Field::bandwidth("Uplink bandwidth"),
    Field::uint("Cell Identity", 4),
    Field::uint("TAC", 2),
    Field::uint("Band Indicator", 4),
    Field::uint("MCC", 2),
    Field::uint("MNC Digit", 1),
    Field::uint("MNC", 2),
    Field::uint("Allowed Access", 1),
];

fn decode_serv_cell_info(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    cursor.decode(SERV_CELL_INFO_V2, record)?;
    Ok(())
}

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let ota = LogCode::LteRrcOtaMessage as u16;
    builder.family(ota, VERSION, Some(PKT_VERSION))?;
    builder.versions(ota, 0..=4, decode_ota_v0)?;
    builder.versions(ota, 5..=7, decode_ota_v5)?;
    builder.versions(ota, 8..=24, decode_ota_v8)?;
    builder.versions(ota, 25..=27, decode_ota_v25)?;

    let serv_cell = LogCode::LteRrcServCellInfo as u16;
    builder.family(serv_cell, VERSION, Some(PKT_VERSION))?;
    builder.version(serv_cell, 2, decode_serv_cell_info)?;
    Ok(())
}
