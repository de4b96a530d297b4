//! NR RRC OTA messages (0xB821).

use crate::engine::Cursor;
use crate::error::{DecodeError, RegistryError};
use crate::field::Field;
use crate::log_codes::LogCode;
use crate::overlay::{BitField, EnumTable, apply_overlay, map_enum};
use crate::packets::PKT_VERSION;
use crate::record::Record;
use crate::registry::RegistryBuilder;

const VERSION: &[Field] = &[Field::uint(PKT_VERSION, 4)];

const OTA: &[Field] = &[
    Field::uint("RRC Release Number", 1),
    Field::uint("RRC Version Number", 1),
    Field::uint("Radio Bearer ID", 1),
    Field::uint("Physical Cell ID", 2),
    Field::uint("NR-ARFCN", 4),
    Field::uint("System Frame Number", 2),
    Field::placeholder("Slot Number"),
    Field::uint("PDU Number", 1),
    Field::bits("SIB Mask in SI", 4),
    Field::skip(3),
    Field::uint("Msg Length", 2),
];

const FRAME_LAYOUT: &[BitField] = &[
    BitField::unsigned("System Frame Number", 0, 10),
    BitField::unsigned("Slot Number", 10, 6),
];

const PDU_TYPES: &EnumTable = &[
    (1, "BCCH_BCH"),
    (2, "BCCH_DL_SCH"),
    (3, "DL_CCCH"),
    (4, "DL_DCCH"),
    (5, "PCCH"),
    (6, "UL_CCCH"),
    (7, "UL_CCCH1"),
    (8, "UL_DCCH"),
];

fn decode_ota(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    cursor.decode(OTA, record)?;
    apply_overlay(record, "System Frame Number", FRAME_LAYOUT)?;
    map_enum(record, "PDU Number", PDU_TYPES);
    let len = record.require_u64("Msg Length")? as usize;
    cursor.decode_bytes("Msg", len, record)?;
    Ok(())
}

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let type_id = LogCode::NrRrcOtaMessage as u16;
    builder.family(type_id, VERSION, Some(PKT_VERSION))?;
    builder.versions(type_id, 8..=9, decode_ota)?;
    Ok(())
}
