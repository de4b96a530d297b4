//! Maps a log type id and payload version to the decoder for that layout.
//!
//! A [`PacketRegistry`] is assembled once through a [`RegistryBuilder`] and is
//! read-only afterwards, so it can be shared across threads behind an `Arc`.
//! Registration is append-only: a second decoder for the same
//! `(type_id, version)` is rejected instead of replacing the first.

use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;

use crate::engine::Cursor;
use crate::error::{DecodeError, RegistryError};
use crate::field::Field;
use crate::log_codes::LogCode;
use crate::record::Record;

/// Decodes everything after a family's version fields.
pub type DecodeFn = fn(&mut Cursor<'_>, &mut Record) -> Result<(), DecodeError>;

#[derive(Debug, Clone)]
pub struct PacketFamily {
    pub type_id: u16,
    pub name: &'static str,
    /// Decoded before dispatch, so the version is recoverable even when the
    /// rest of the payload isn't.
    pub version_fmt: &'static [Field],
    /// The field of `version_fmt` holding the version. Families without one
    /// register their decoder under version 0.
    pub version_field: Option<&'static str>,
    decoders: BTreeMap<u32, DecodeFn>,
}

impl PacketFamily {
    pub fn decoder(&self, version: u32) -> Option<DecodeFn> {
        self.decoders.get(&version).copied()
    }

    pub fn versions(&self) -> impl Iterator<Item = u32> + '_ {
        self.decoders.keys().copied()
    }

    /// Reads the version out of a record `version_fmt` was decoded into.
    pub fn version_of(&self, record: &Record) -> Result<u32, DecodeError> {
        match self.version_field {
            Some(field) => {
                let version = record.require_u64(field)?;
                u32::try_from(version)
                    .map_err(|_| DecodeError::VersionOutOfRange { field, version })
            }
            None => Ok(0),
        }
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    families: HashMap<u16, PacketFamily>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        RegistryBuilder::default()
    }

    pub fn family(
        &mut self,
        type_id: u16,
        version_fmt: &'static [Field],
        version_field: Option<&'static str>,
    ) -> Result<&mut Self, RegistryError> {
        if self.families.contains_key(&type_id) {
            return Err(RegistryError::DuplicateFamily(type_id));
        }
        let name = LogCode::from_type_id(type_id)
            .map(LogCode::name)
            .unwrap_or("Unnamed");
        self.families.insert(
            type_id,
            PacketFamily {
                type_id,
                name,
                version_fmt,
                version_field,
                decoders: BTreeMap::new(),
            },
        );
        Ok(self)
    }

    pub fn version(
        &mut self,
        type_id: u16,
        version: u32,
        decode: DecodeFn,
    ) -> Result<&mut Self, RegistryError> {
        let family = self
            .families
            .get_mut(&type_id)
            .ok_or(RegistryError::UnknownFamily(type_id))?;
        if family.decoders.contains_key(&version) {
            return Err(RegistryError::DuplicateDecoder { type_id, version });
        }
        family.decoders.insert(version, decode);
        Ok(self)
    }

    /// Registers `decode` for every version in `versions`, each checked for
    /// duplicates individually.
    pub fn versions(
        &mut self,
        type_id: u16,
        versions: RangeInclusive<u32>,
        decode: DecodeFn,
    ) -> Result<&mut Self, RegistryError> {
        for version in versions {
            self.version(type_id, version, decode)?;
        }
        Ok(self)
    }

    pub fn build(self) -> PacketRegistry {
        PacketRegistry {
            families: self.families,
        }
    }
}

#[derive(Debug)]
pub struct PacketRegistry {
    families: HashMap<u16, PacketFamily>,
}

impl PacketRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry holding every packet family in [`crate::packets`].
    pub fn with_standard_families() -> Result<PacketRegistry, RegistryError> {
        let mut builder = RegistryBuilder::new();
        crate::packets::register_all(&mut builder)?;
        Ok(builder.build())
    }

    pub fn family(&self, type_id: u16) -> Option<&PacketFamily> {
        self.families.get(&type_id)
    }

    pub fn lookup(&self, type_id: u16, version: u32) -> Option<DecodeFn> {
        self.family(type_id)?.decoder(version)
    }

    pub fn type_ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.families.keys().copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::Value;

    const VERSION_FMT: &[Field] = &[Field::uint("Version", 1)];
    const WIDE_VERSION_FMT: &[Field] = &[Field::uint("Version", 8)];

    fn decode_a(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
        cursor.decode(&[Field::uint("A", 1)], record)?;
        Ok(())
    }

    fn decode_b(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
        cursor.decode(&[Field::uint("B", 2)], record)?;
        Ok(())
    }

    #[test]
    fn test_lookup() {
        let registry = {
            let mut builder = PacketRegistry::builder();
            builder.family(0xb0c0, VERSION_FMT, Some("Version")).unwrap();
            builder.version(0xb0c0, 1, decode_a).unwrap();
            builder.versions(0xb0c0, 2..=4, decode_b).unwrap();
            builder.build()
        };
        assert_eq!(registry.lookup(0xb0c0, 1), Some(decode_a as DecodeFn));
        assert_eq!(registry.lookup(0xb0c0, 3), Some(decode_b as DecodeFn));
        assert_eq!(registry.lookup(0xb0c0, 5), None);
        assert_eq!(registry.lookup(0x1234, 1), None);
        let family = registry.family(0xb0c0).unwrap();
        assert_eq!(family.name, "LTE_RRC_OTA_Packet");
        assert_eq!(family.versions().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_no_duplicates() {
        let mut builder = PacketRegistry::builder();
        builder.family(0x513b, &[], None).unwrap();
        assert_eq!(
            builder.family(0x513b, &[], None).unwrap_err(),
            RegistryError::DuplicateFamily(0x513b)
        );
        builder.version(0x513b, 0, decode_a).unwrap();
        assert_eq!(
            builder.version(0x513b, 0, decode_b).unwrap_err(),
            RegistryError::DuplicateDecoder {
                type_id: 0x513b,
                version: 0
            }
        );
        builder.versions(0x513b, 1..=3, decode_a).unwrap();
        assert_eq!(
            builder.versions(0x513b, 3..=5, decode_b).unwrap_err(),
            RegistryError::DuplicateDecoder {
                type_id: 0x513b,
                version: 3
            }
        );
        assert_eq!(
            builder.version(0x4005, 0, decode_a).unwrap_err(),
            RegistryError::UnknownFamily(0x4005)
        );
    }

    #[test]
    fn test_version_of() {
        let mut builder = PacketRegistry::builder();
        builder.family(0xb821, WIDE_VERSION_FMT, Some("Version")).unwrap();
        builder.family(0x513b, &[], None).unwrap();
        let registry = builder.build();

        let mut record = Record::new();
        record.push("Version", Value::UInt(9));
        let family = registry.family(0xb821).unwrap();
        assert_eq!(family.version_of(&record), Ok(9));
        assert_eq!(registry.family(0x513b).unwrap().version_of(&record), Ok(0));

        // must not wrap around to version 1
        record.replace("Version", Value::UInt(0x1_0000_0001));
        assert_eq!(
            family.version_of(&record),
            Err(DecodeError::VersionOutOfRange {
                field: "Version",
                version: 0x1_0000_0001
            })
        );
    }

    #[test]
    fn test_standard_families() {
        let registry = PacketRegistry::with_standard_families().unwrap();
        for code in [
            LogCode::GsmRrCellInformation,
            LogCode::LteRrcOtaMessage,
            LogCode::LtePhyServCellMeasurement,
            LogCode::NrRrcOtaMessage,
        ] {
            assert!(registry.family(code as u16).is_some(), "{code:?} missing");
        }
    }
}
