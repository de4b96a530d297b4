//! LTE PHY serving cell measurement (0xB193).
//!
//! The payload is a short header followed by size-declared subpackets. Only
//! the serving cell measurement result subpacket is decoded; anything else
//! is skipped by its declared size.

use crate::engine::Cursor;
use crate::error::{DecodeError, RegistryError};
use crate::field::Field;
use crate::group::{SubpacketEntry, SubpacketLayout, decode_subpackets};
use crate::log_codes::LogCode;
use crate::overlay::{BitField, apply_overlay, map_uint};
use crate::record::{Record, Value};
use crate::registry::RegistryBuilder;
use crate::types::decode_rssi;

const VERSION: &[Field] = &[Field::uint("Version", 1)];

const HEADER: &[Field] = &[Field::uint("Number of SubPackets", 1), Field::skip(2)];

const SUBPACKET_HEADER: &[Field] = &[
    Field::uint("SubPacket ID", 1),
    Field::uint("SubPacket Version", 1),
    Field::uint("SubPacket Size", 2),
];

const SUBPACKET_LAYOUT: SubpacketLayout = SubpacketLayout {
    header: SUBPACKET_HEADER,
    id_field: "SubPacket ID",
    version_field: "SubPacket Version",
    size_field: "SubPacket Size",
    size_includes_header: true,
};

const SERVING_CELL_MEASUREMENT_RESULT: u64 = 25;

const CELL_V4: &[Field] = &[
    Field::uint("E-ARFCN", 2),
    Field::uint("Physical Cell ID", 2),
    Field::placeholder("Serving Cell Index"),
    Field::uint("Current SFN", 2),
    Field::placeholder("Current Subframe Number"),
];

const CELL_V7: &[Field] = &[
    Field::uint("E-ARFCN", 4),
    Field::uint("Physical Cell ID", 2),
    Field::placeholder("Serving Cell Index"),
    Field::uint("Current SFN", 2),
    Field::placeholder("Current Subframe Number"),
];

// The upper four bits of each RSRP/RSRQ half-word are reserved and zero.
const MEASUREMENTS: &[Field] = &[
    Field::skip(6),
    Field::rsrp("RSRP"),
    Field::skip(2),
    Field::rsrp("Average RSRP"),
    Field::skip(2),
    Field::rsrq("RSRQ"),
    Field::skip(2),
    Field::uint("RSSI", 4),
];

const PCI_LAYOUT: &[BitField] = &[
    BitField::unsigned("Physical Cell ID", 0, 9),
    BitField::unsigned("Serving Cell Index", 9, 3),
];

const SFN_LAYOUT: &[BitField] = &[
    BitField::unsigned("Current SFN", 4, 12),
    BitField::unsigned("Current Subframe Number", 0, 4),
];

const RSSI_LAYOUT: &[BitField] = &[BitField::unsigned("RSSI", 10, 11)];

fn decode_serving_cell(
    cursor: &mut Cursor<'_>,
    record: &mut Record,
    cell: &[Field],
) -> Result<(), DecodeError> {
    cursor.decode(cell, record)?;
    apply_overlay(record, "Physical Cell ID", PCI_LAYOUT)?;
    apply_overlay(record, "Current SFN", SFN_LAYOUT)?;
    cursor.decode(MEASUREMENTS, record)?;
    apply_overlay(record, "RSSI", RSSI_LAYOUT)?;
    map_uint(record, "RSSI", |raw| Value::Float(decode_rssi(raw as u16)))?;
    Ok(())
}

fn decode_serving_cell_v4(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    decode_serving_cell(cursor, record, CELL_V4)
}

fn decode_serving_cell_v7(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    decode_serving_cell(cursor, record, CELL_V7)
}

const SUBPACKETS: &[SubpacketEntry] = &[
    SubpacketEntry {
        id: SERVING_CELL_MEASUREMENT_RESULT,
        version: 4,
        decode: decode_serving_cell_v4,
    },
    SubpacketEntry {
        id: SERVING_CELL_MEASUREMENT_RESULT,
        version: 7,
        decode: decode_serving_cell_v7,
    },
];

fn decode_measurement(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    cursor.decode(HEADER, record)?;
    let count = record.require_u64("Number of SubPackets")?;
    decode_subpackets(cursor, record, "Subpackets", count, &SUBPACKET_LAYOUT, SUBPACKETS)
}

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let type_id = LogCode::LtePhyServCellMeasurement as u16;
    builder.family(type_id, VERSION, Some("Version"))?;
    builder.version(type_id, 1, decode_measurement)?;
    Ok(())
}
