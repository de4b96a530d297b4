use thiserror::Error;

use crate::field::FieldKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("field {field:?} ({width} bytes at offset {offset}) runs past limit {limit}")]
    Truncated {
        field: Option<&'static str>,
        offset: usize,
        width: usize,
        limit: usize,
    },
    #[error("field {field:?} declares width {width}, which is invalid for {kind:?}")]
    InvalidWidth {
        field: Option<&'static str>,
        kind: FieldKind,
        width: usize,
    },
    #[error("buffer of {len} bytes is too short for a log header ({needed} bytes)")]
    HeaderTooShort { len: usize, needed: usize },
    #[error("declared log length {declared} does not fit the {available} bytes available")]
    DeclaredLengthOutOfRange { declared: usize, available: usize },
    #[error(
        "subpacket {id} v{version} at offset {offset} declares size {size}, but limit is {limit}"
    )]
    MalformedSubpacketSize {
        id: u64,
        version: u64,
        offset: usize,
        size: usize,
        limit: usize,
    },
    #[error(
        "{field} = {count} elements of {element_size} bytes exceeds the {remaining} bytes left"
    )]
    CountExceedsBuffer {
        field: &'static str,
        count: usize,
        element_size: usize,
        remaining: usize,
    },
    #[error("expected field {0} in record")]
    MissingField(&'static str),
    #[error("version field {field} holds {version}, which is not a valid version")]
    VersionOutOfRange { field: &'static str, version: u64 },
    #[error("failed to parse log header: {0}")]
    Deku(String),
}

impl From<deku::DekuError> for DecodeError {
    fn from(err: deku::DekuError) -> Self {
        DecodeError::Deku(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("a decoder for type id {type_id:#06x} version {version} is already registered")]
    DuplicateDecoder { type_id: u16, version: u32 },
    #[error("type id {0:#06x} is already registered")]
    DuplicateFamily(u16),
    #[error("no packet family registered for type id {0:#06x}")]
    UnknownFamily(u16),
}

#[derive(Debug, Error)]
pub enum DecoderInitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file parsing error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("sample_rate must be within [0, 1], got {0}")]
    InvalidSampleRate(f64),
}
