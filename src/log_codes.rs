//! DM log type ids this crate knows how to decode.

use num_enum::TryFromPrimitive;

#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum LogCode {
    // 3G
    WcdmaSearchCellReselectionRank = 0x4005,
    // 2G
    GsmRrCellInformation = 0x513b,
    // 4G
    LteRrcOtaMessage = 0xb0c0,
    LteRrcServCellInfo = 0xb0c2,
    LteNasEsmOtaIncoming = 0xb0e2,
    LteNasEsmOtaOutgoing = 0xb0e3,
    LteNasEmmOtaIncoming = 0xb0ec,
    LteNasEmmOtaOutgoing = 0xb0ed,
    LteNasEmmState = 0xb0ee,
    LteMl1ServingCellMeasAndEval = 0xb17f,
    LteMl1NeighborCellMeas = 0xb180,
    LtePhyServCellMeasurement = 0xb193,
    // 5G
    NrRrcOtaMessage = 0xb821,
}

impl LogCode {
    pub fn from_type_id(type_id: u16) -> Option<LogCode> {
        LogCode::try_from(type_id).ok()
    }

    pub fn name(self) -> &'static str {
        match self {
            LogCode::WcdmaSearchCellReselectionRank => "WCDMA_Search_Cell_Reselection_Rank",
            LogCode::GsmRrCellInformation => "GSM_RR_Cell_Information",
            LogCode::LteRrcOtaMessage => "LTE_RRC_OTA_Packet",
            LogCode::LteRrcServCellInfo => "LTE_RRC_Serv_Cell_Info",
            LogCode::LteNasEsmOtaIncoming => "LTE_NAS_ESM_OTA_Incoming_Packet",
            LogCode::LteNasEsmOtaOutgoing => "LTE_NAS_ESM_OTA_Outgoing_Packet",
            LogCode::LteNasEmmOtaIncoming => "LTE_NAS_EMM_OTA_Incoming_Packet",
            LogCode::LteNasEmmOtaOutgoing => "LTE_NAS_EMM_OTA_Outgoing_Packet",
            LogCode::LteNasEmmState => "LTE_NAS_EMM_State",
            LogCode::LteMl1ServingCellMeasAndEval => "LTE_ML1_Serving_Cell_Meas_And_Eval",
            LogCode::LteMl1NeighborCellMeas => "LTE_ML1_Neighbor_Cell_Meas",
            LogCode::LtePhyServCellMeasurement => "LTE_PHY_Serv_Cell_Measurement",
            LogCode::NrRrcOtaMessage => "NR_RRC_OTA_Packet",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_type_id() {
        assert_eq!(LogCode::from_type_id(0xb0c0), Some(LogCode::LteRrcOtaMessage));
        assert_eq!(LogCode::from_type_id(0xb0c0).map(LogCode::name), Some("LTE_RRC_OTA_Packet"));
        assert_eq!(LogCode::from_type_id(0x1234), None);
        assert_eq!(LogCode::NrRrcOtaMessage as u16, 0xb821);
    }
}
