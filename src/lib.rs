//! Decoding of cellular modem diagnostic (DM) log packets into ordered,
//! named field records.
//!
//! Every packet family is a set of declarative [`field::Field`] tables run
//! through [`engine::decode_by_fmt`], followed by small post-processing
//! steps from [`overlay`] and [`group`]. [`decoder::Decoder`] ties the
//! registry of families to a sampling policy.

pub mod config;
pub mod decoder;
pub mod diag;
pub mod engine;
pub mod error;
pub mod field;
pub mod group;
pub mod log_codes;
pub mod overlay;
pub mod packet;
pub mod packets;
pub mod record;
pub mod registry;
pub mod types;

pub use decoder::Decoder;
pub use packet::{DecodeMode, Packet, PacketStatus, decode_log_packet};
pub use record::{Record, Value};
pub use registry::PacketRegistry;
