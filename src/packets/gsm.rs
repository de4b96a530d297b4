//! GSM RR cell information (0x513B).

use crate::engine::Cursor;
use crate::error::{DecodeError, RegistryError};
use crate::field::Field;
use crate::log_codes::LogCode;
use crate::overlay::{BitField, EnumTable, apply_overlay, map_enum, map_uint};
use crate::record::{Record, Value};
use crate::registry::RegistryBuilder;

/// ARFCN in the low 12 bits, band indicator in the top 4.
pub const ARFCN_LAYOUT: &[BitField] = &[
    BitField::unsigned("BCCH ARFCN", 0, 12),
    BitField::unsigned("BCCH Band", 12, 4),
];

pub const GSM_BANDS: &EnumTable = &[
    (0, "PGSM 900"),
    (1, "EGSM 900"),
    (2, "DCS 1800"),
    (3, "PCS 1900"),
    (4, "GSM 850"),
    (5, "GSM 450"),
    (6, "GSM 480"),
];

const BSIC_LAYOUT: &[BitField] = &[
    BitField::unsigned("BSIC NCC", 3, 3),
    BitField::unsigned("BSIC BCC", 0, 3),
];

const CELL_SELECTION_PRIORITY: &EnumTable = &[(0, "Normal"), (1, "Low")];

const CELL_INFO: &[Field] = &[
    Field::uint("BCCH ARFCN", 2),
    Field::placeholder("BCCH Band"),
    Field::uint("BSIC NCC", 1),
    Field::placeholder("BSIC BCC"),
    Field::uint("Cell ID", 2),
    Field::plmn_b("PLMN"),
    Field::uint("LAC", 2),
    Field::uint("Cell Selection Priority", 1),
    Field::uint("NCC Permitted", 1),
];

/// The LAC is logged with its bytes swapped.
pub fn swap_lac(raw: u64) -> u64 {
    (raw & 0xff) * 256 + ((raw >> 8) & 0xff)
}

fn decode_cell_info(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    cursor.decode(CELL_INFO, record)?;
    apply_overlay(record, "BCCH ARFCN", ARFCN_LAYOUT)?;
    map_enum(record, "BCCH Band", GSM_BANDS);
    apply_overlay(record, "BSIC NCC", BSIC_LAYOUT)?;
    map_uint(record, "LAC", |raw| Value::UInt(swap_lac(raw)))?;
    map_enum(record, "Cell Selection Priority", CELL_SELECTION_PRIORITY);
    Ok(())
}

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let type_id = LogCode::GsmRrCellInformation as u16;
    builder.family(type_id, &[], None)?;
    builder.version(type_id, 0, decode_cell_info)?;
    Ok(())
}
