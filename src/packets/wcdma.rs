//! WCDMA search cell reselection rank (0x4005): a packed pair of cell
//! counts followed by that many 3G and then 2G neighbour entries.

use crate::engine::Cursor;
use crate::error::{DecodeError, RegistryError};
use crate::field::{Field, fmt_width};
use crate::group::decode_list;
use crate::log_codes::LogCode;
use crate::overlay::{BitField, EnumTable, apply_overlay, map_enum};
use crate::packets::gsm;
use crate::record::Record;
use crate::registry::RegistryBuilder;

const HEADER: &[Field] = &[
    Field::uint("Num 3G Cells", 1),
    Field::placeholder("Num 2G Cells"),
];

const CELL_COUNTS: &[BitField] = &[
    BitField::unsigned("Num 3G Cells", 0, 4),
    BitField::unsigned("Num 2G Cells", 4, 4),
];

const CELL_3G: &[Field] = &[
    Field::uint("UARFCN", 2),
    Field::uint("PSC", 2),
    Field::wcdma_meas("RSCP"),
    Field::int("Rank RSCP", 2),
    Field::wcdma_meas("EcIo"),
    Field::int("Rank EcIo", 2),
    Field::uint("Resel Status", 1),
];

const CELL_2G: &[Field] = &[
    Field::uint("BCCH ARFCN", 2),
    Field::placeholder("BCCH Band"),
    Field::uint("BSIC", 1),
    Field::wcdma_meas("RSSI"),
    Field::int("Rank", 2),
    Field::uint("Resel Status", 1),
];

const RESEL_STATUS: &EnumTable = &[(0, "Not Ranked"), (1, "Ranked"), (2, "Reselection Candidate")];

fn decode_3g_cell(cursor: &mut Cursor<'_>, cell: &mut Record) -> Result<(), DecodeError> {
    cursor.decode(CELL_3G, cell)?;
    map_enum(cell, "Resel Status", RESEL_STATUS);
    Ok(())
}

fn decode_2g_cell(cursor: &mut Cursor<'_>, cell: &mut Record) -> Result<(), DecodeError> {
    cursor.decode(CELL_2G, cell)?;
    apply_overlay(cell, "BCCH ARFCN", gsm::ARFCN_LAYOUT)?;
    map_enum(cell, "BCCH Band", gsm::GSM_BANDS);
    map_enum(cell, "Resel Status", RESEL_STATUS);
    Ok(())
}

fn decode_rank(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    cursor.decode(HEADER, record)?;
    apply_overlay(record, "Num 3G Cells", CELL_COUNTS)?;
    let n_3g = record.require_u64("Num 3G Cells")?;
    let n_2g = record.require_u64("Num 2G Cells")?;
    decode_list(cursor, record, "Cells 3G", n_3g, fmt_width(CELL_3G), decode_3g_cell)?;
    decode_list(cursor, record, "Cells 2G", n_2g, fmt_width(CELL_2G), decode_2g_cell)?;
    Ok(())
}

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let type_id = LogCode::WcdmaSearchCellReselectionRank as u16;
    builder.family(type_id, &[], None)?;
    builder.version(type_id, 0, decode_rank)?;
    Ok(())
}
