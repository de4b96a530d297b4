//! LTE NAS: plain ESM/EMM OTA messages (0xB0E2, 0xB0E3, 0xB0EC, 0xB0ED)
//! and the EMM state report (0xB0EE).

use crate::engine::Cursor;
use crate::error::{DecodeError, RegistryError};
use crate::field::Field;
use crate::log_codes::LogCode;
use crate::overlay::{EnumTable, map_enum};
use crate::packets::PKT_VERSION;
use crate::record::{Record, Value};
use crate::registry::{DecodeFn, RegistryBuilder};

const VERSION: &[Field] = &[Field::uint(PKT_VERSION, 1)];

const OTA_HEADER: &[Field] = &[
    Field::uint("RRC Release Number", 1),
    Field::uint("RRC Version Minor", 1),
    Field::uint("RRC Version Major", 1),
];

fn decode_ota(
    cursor: &mut Cursor<'_>,
    record: &mut Record,
    direction: &'static str,
) -> Result<(), DecodeError> {
    record.push("Direction", Value::from(direction));
    cursor.decode(OTA_HEADER, record)?;
    // the message runs to the end of the packet
    cursor.decode_rest("Msg", record);
    Ok(())
}

fn decode_downlink(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    decode_ota(cursor, record, "Downlink")
}

fn decode_uplink(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    decode_ota(cursor, record, "Uplink")
}

const EMM_STATES: &EnumTable = &[
    (0, "EMM_NULL"),
    (1, "EMM_DEREGISTERED"),
    (2, "EMM_REGISTERED_INITIATED"),
    (3, "EMM_REGISTERED"),
    (4, "EMM_TRACKING_AREA_UPDATING_INITIATED"),
    (5, "EMM_SERVICE_REQUEST_INITIATED"),
    (6, "EMM_DEREGISTERED_INITIATED"),
];

const EMM_STATE_V2: &[Field] = &[
    Field::uint("EMM State", 1),
    Field::uint("EMM Substate", 2),
    Field::uint("GUTI Valid", 1),
    Field::uint("GUTI UE Id", 1),
    Field::plmn_a("GUTI PLMN"),
    Field::uint("GUTI MME Group ID", 2),
    Field::uint("GUTI MME Code", 1),
    Field::bytes_le("GUTI M-TMSI", 4),
];

fn decode_emm_state(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
    cursor.decode(EMM_STATE_V2, record)?;
    map_enum(record, "EMM State", EMM_STATES);
    Ok(())
}

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    for (code, decode) in [
        (LogCode::LteNasEsmOtaIncoming, decode_downlink as DecodeFn),
        (LogCode::LteNasEsmOtaOutgoing, decode_uplink as DecodeFn),
        (LogCode::LteNasEmmOtaIncoming, decode_downlink as DecodeFn),
        (LogCode::LteNasEmmOtaOutgoing, decode_uplink as DecodeFn),
    ] {
        builder.family(code as u16, VERSION, Some(PKT_VERSION))?;
        builder.version(code as u16, 1, decode)?;
    }

    let state = LogCode::LteNasEmmState as u16;
    builder.family(state, VERSION, Some(PKT_VERSION))?;
    builder.version(state, 2, decode_emm_state)?;
    Ok(())
}
