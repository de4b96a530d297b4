//! LTE ML1 serving cell measurement and evaluation (0xB17F) and neighbour
//! cell measurements (0xB180). Based on the layouts reverse engineered in
//! scat; most measurements are bit fields inside 32-bit words.

use crate::engine::Cursor;
use crate::error::{DecodeError, RegistryError};
use crate::field::{Field, fmt_width};
use crate::group::decode_list;
use crate::log_codes::LogCode;
use crate::overlay::{BitField, apply_overlay, map_uint};
use crate::packets::PKT_VERSION;
use crate::record::{Record, Value};
use crate::registry::RegistryBuilder;
use crate::types::{decode_rsrp, decode_rsrq, decode_rssi};

const VERSION: &[Field] = &[Field::uint(PKT_VERSION, 1)];

fn to_dbm(
    record: &mut Record,
    name: &'static str,
    decode: fn(u16) -> f64,
) -> Result<(), DecodeError> {
    map_uint(record, name, |raw| Value::Float(decode(raw as u16)))
}

pub mod serving_cell {
    use super::*;

    const HEADER_V4: &[Field] = &[
        Field::uint("RRC Release", 1),
        Field::skip(2),
        Field::uint("E-ARFCN", 2),
        Field::uint("Physical Cell ID", 2),
        Field::placeholder("Serving Layer Priority"),
    ];

    const HEADER_V5: &[Field] = &[
        Field::uint("RRC Release", 1),
        Field::skip(2),
        Field::uint("E-ARFCN", 4),
        Field::uint("Physical Cell ID", 2),
        Field::placeholder("Serving Layer Priority"),
        Field::skip(2),
    ];

    const PCI_LAYOUT: &[BitField] = &[
        BitField::unsigned("Physical Cell ID", 0, 9),
        BitField::unsigned("Serving Layer Priority", 9, 7),
    ];

    const MEASUREMENTS: &[Field] = &[
        Field::uint("Measured RSRP", 4),
        Field::uint("Average RSRP", 4),
        Field::uint("Measured RSRQ", 4),
        Field::uint("Measured RSSI", 4),
        Field::uint("Rxlev", 4),
        Field::uint("S Search", 4),
    ];

    const MEASUREMENT_LAYOUT: &[&[BitField]] = &[
        &[BitField::unsigned("Measured RSRP", 0, 12)],
        &[BitField::unsigned("Measured RSRQ", 0, 10)],
        &[BitField::unsigned("Measured RSSI", 10, 11)],
    ];

    const R9_INFO: &[Field] = &[Field::uint("R9 Info", 4)];

    fn decode(
        cursor: &mut Cursor<'_>,
        record: &mut Record,
        header: &[Field],
    ) -> Result<(), DecodeError> {
        cursor.decode(header, record)?;
        apply_overlay(record, "Physical Cell ID", PCI_LAYOUT)?;

        cursor.decode(MEASUREMENTS, record)?;
        for layout in MEASUREMENT_LAYOUT {
            apply_overlay(record, layout[0].name, layout)?;
        }
        to_dbm(record, "Measured RSRP", decode_rsrp)?;
        to_dbm(record, "Measured RSRQ", decode_rsrq)?;
        to_dbm(record, "Measured RSSI", decode_rssi)?;

        if record.get_u64("RRC Release") == Some(1) {
            cursor.decode(R9_INFO, record)?;
        }
        Ok(())
    }

    pub(super) fn decode_v4(
        cursor: &mut Cursor<'_>,
        record: &mut Record,
    ) -> Result<(), DecodeError> {
        decode(cursor, record, HEADER_V4)
    }

    pub(super) fn decode_v5(
        cursor: &mut Cursor<'_>,
        record: &mut Record,
    ) -> Result<(), DecodeError> {
        decode(cursor, record, HEADER_V5)
    }
}

pub mod neighbor_cells {
    use super::*;

    const HEADER_V4: &[Field] = &[
        Field::uint("RRC Release", 1),
        Field::skip(2),
        Field::uint("E-ARFCN", 2),
        Field::uint("Q-RxLevMin", 2),
        Field::placeholder("Number of Neighbor Cells"),
    ];

    const HEADER_V5: &[Field] = &[
        Field::uint("RRC Release", 1),
        Field::skip(2),
        Field::uint("E-ARFCN", 4),
        Field::uint("Q-RxLevMin", 4),
        Field::placeholder("Number of Neighbor Cells"),
    ];

    const COUNT_V4: &[BitField] = &[
        BitField::unsigned("Q-RxLevMin", 0, 6),
        BitField::unsigned("Number of Neighbor Cells", 6, 10),
    ];

    const COUNT_V5: &[BitField] = &[
        BitField::unsigned("Q-RxLevMin", 0, 6),
        BitField::unsigned("Number of Neighbor Cells", 6, 26),
    ];

    const CELL: &[Field] = &[
        Field::uint("Physical Cell ID", 4),
        Field::placeholder("Measured RSSI"),
        Field::placeholder("Measured RSRP"),
        Field::uint("Average RSRP", 4),
        Field::uint("Measured RSRQ", 4),
        Field::uint("Average RSRQ", 4),
        Field::placeholder("S_rxlev"),
        Field::uint("Freq Offset", 2),
        Field::skip(2),
        Field::uint("Ant0 Frame Offset", 4),
        Field::uint("Ant1 Frame Offset", 4),
        Field::skip(4),
    ];

    const CELL_LAYOUT: &[&[BitField]] = &[
        &[
            BitField::unsigned("Physical Cell ID", 0, 9),
            BitField::unsigned("Measured RSSI", 9, 11),
            BitField::unsigned("Measured RSRP", 20, 12),
        ],
        &[BitField::unsigned("Average RSRP", 12, 12)],
        &[BitField::unsigned("Measured RSRQ", 12, 10)],
        &[
            BitField::unsigned("Average RSRQ", 0, 10),
            BitField::unsigned("S_rxlev", 20, 6),
        ],
    ];

    fn decode_cell(cursor: &mut Cursor<'_>, cell: &mut Record) -> Result<(), DecodeError> {
        cursor.decode(CELL, cell)?;
        for layout in CELL_LAYOUT {
            apply_overlay(cell, layout[0].name, layout)?;
        }
        to_dbm(cell, "Measured RSSI", decode_rssi)?;
        to_dbm(cell, "Measured RSRP", decode_rsrp)?;
        to_dbm(cell, "Measured RSRQ", decode_rsrq)?;
        Ok(())
    }

    fn decode(
        cursor: &mut Cursor<'_>,
        record: &mut Record,
        header: &[Field],
        count_layout: &[BitField],
    ) -> Result<(), DecodeError> {
        cursor.decode(header, record)?;
        apply_overlay(record, "Q-RxLevMin", count_layout)?;
        let n_cells = record.require_u64("Number of Neighbor Cells")?;
        decode_list(cursor, record, "Neighbor Cells", n_cells, fmt_width(CELL), decode_cell)
    }

    pub(super) fn decode_v4(
        cursor: &mut Cursor<'_>,
        record: &mut Record,
    ) -> Result<(), DecodeError> {
        decode(cursor, record, HEADER_V4, COUNT_V4)
    }

    pub(super) fn decode_v5(
        cursor: &mut Cursor<'_>,
        record: &mut Record,
    ) -> Result<(), DecodeError> {
        decode(cursor, record, HEADER_V5, COUNT_V5)
    }
}

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let serving = LogCode::LteMl1ServingCellMeasAndEval as u16;
    builder.family(serving, VERSION, Some(PKT_VERSION))?;
    builder.version(serving, 4, serving_cell::decode_v4)?;
    builder.version(serving, 5, serving_cell::decode_v5)?;

    let neighbor = LogCode::LteMl1NeighborCellMeas as u16;
    builder.family(neighbor, VERSION, Some(PKT_VERSION))?;
    builder.version(neighbor, 4, neighbor_cells::decode_v4)?;
    builder.version(neighbor, 5, neighbor_cells::decode_v5)?;
    Ok(())
}
