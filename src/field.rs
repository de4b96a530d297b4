//! Field descriptors: the declarative tables every packet decoder is built
//! from. A table is a `&'static [Field]` walked in order by
//! [`crate::engine::decode_by_fmt`].

use crate::error::DecodeError;

/// How the raw bytes of a field are turned into a [`crate::record::Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Unsigned integer, little-endian, 1/2/4/8 bytes.
    UnsignedLe,
    /// Unsigned integer, big-endian, 1/2/4/8 bytes.
    UnsignedBe,
    /// Two's complement integer, little-endian, 1/2/4/8 bytes.
    SignedLe,
    /// Raw bytes kept in wire order (shown MSB-first).
    ByteStream,
    /// Raw bytes shown LSB-first, i.e. reversed from wire order.
    ByteStreamLe,
    /// Raw bits, each byte MSB-first, bytes in wire order.
    BitStream,
    /// Raw bits of the little-endian integer the bytes encode.
    BitStreamLe,
    /// 8-byte modem timestamp.
    Timestamp,
    /// 6 bytes, one decimal digit per byte.
    PlmnCompactA,
    /// 3 bytes, 3GPP packed BCD nibbles.
    PlmnCompactB,
    /// 1 byte, LTE resource block count mapped to MHz.
    Bandwidth,
    /// 2 bytes, `0.0625 * x - 180` dBm.
    Rsrp,
    /// 2 bytes, `0.0625 * x - 30` dB.
    Rsrq,
    /// 1 byte, packed WCDMA RSCP/RSSI/EcNo code.
    WcdmaMeas,
    /// Consumes bytes without producing a field.
    Skip,
    /// Zero-width slot, filled later by post-processing.
    Placeholder,
}

impl FieldKind {
    /// Whether `width` is meaningful for this kind.
    pub fn allows_width(self, width: usize) -> bool {
        match self {
            FieldKind::UnsignedLe | FieldKind::UnsignedBe | FieldKind::SignedLe => {
                matches!(width, 1 | 2 | 4 | 8)
            }
            FieldKind::Timestamp => width == 8,
            FieldKind::PlmnCompactA => width == 6,
            FieldKind::PlmnCompactB => width == 3,
            FieldKind::Bandwidth | FieldKind::WcdmaMeas => width == 1,
            FieldKind::Rsrp | FieldKind::Rsrq => width == 2,
            FieldKind::Placeholder => width == 0,
            FieldKind::ByteStream
            | FieldKind::ByteStreamLe
            | FieldKind::BitStream
            | FieldKind::BitStreamLe
            | FieldKind::Skip => true,
        }
    }
}

/// One typed field: kind, output name and byte width.
///
/// `name` is `None` only for [`FieldKind::Skip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    pub kind: FieldKind,
    pub name: Option<&'static str>,
    pub width: usize,
}

impl Field {
    pub const fn new(kind: FieldKind, name: &'static str, width: usize) -> Self {
        Field {
            kind,
            name: Some(name),
            width,
        }
    }

    pub const fn uint(name: &'static str, width: usize) -> Self {
        Field::new(FieldKind::UnsignedLe, name, width)
    }

    pub const fn uint_be(name: &'static str, width: usize) -> Self {
        Field::new(FieldKind::UnsignedBe, name, width)
    }

    pub const fn int(name: &'static str, width: usize) -> Self {
        Field::new(FieldKind::SignedLe, name, width)
    }

    pub const fn bytes(name: &'static str, width: usize) -> Self {
        Field::new(FieldKind::ByteStream, name, width)
    }

    pub const fn bytes_le(name: &'static str, width: usize) -> Self {
        Field::new(FieldKind::ByteStreamLe, name, width)
    }

    pub const fn bits(name: &'static str, width: usize) -> Self {
        Field::new(FieldKind::BitStream, name, width)
    }

    pub const fn bits_le(name: &'static str, width: usize) -> Self {
        Field::new(FieldKind::BitStreamLe, name, width)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Field::new(FieldKind::Timestamp, name, 8)
    }

    pub const fn plmn_a(name: &'static str) -> Self {
        Field::new(FieldKind::PlmnCompactA, name, 6)
    }

    pub const fn plmn_b(name: &'static str) -> Self {
        Field::new(FieldKind::PlmnCompactB, name, 3)
    }

    pub const fn bandwidth(name: &'static str) -> Self {
        Field::new(FieldKind::Bandwidth, name, 1)
    }

    pub const fn rsrp(name: &'static str) -> Self {
        Field::new(FieldKind::Rsrp, name, 2)
    }

    pub const fn rsrq(name: &'static str) -> Self {
        Field::new(FieldKind::Rsrq, name, 2)
    }

    pub const fn wcdma_meas(name: &'static str) -> Self {
        Field::new(FieldKind::WcdmaMeas, name, 1)
    }

    pub const fn skip(width: usize) -> Self {
        Field {
            kind: FieldKind::Skip,
            name: None,
            width,
        }
    }

    pub const fn placeholder(name: &'static str) -> Self {
        Field::new(FieldKind::Placeholder, name, 0)
    }

    pub fn validate(&self) -> Result<(), DecodeError> {
        let named_ok = self.name.is_some() || self.kind == FieldKind::Skip;
        if !named_ok || !self.kind.allows_width(self.width) {
            return Err(DecodeError::InvalidWidth {
                field: self.name,
                kind: self.kind,
                width: self.width,
            });
        }
        Ok(())
    }
}

/// Total number of bytes a table consumes.
pub fn fmt_width(fmt: &[Field]) -> usize {
    fmt.iter().map(|field| field.width).sum()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_integer_widths() {
        for width in [1, 2, 4, 8] {
            assert!(Field::uint("x", width).validate().is_ok());
            assert!(Field::uint_be("x", width).validate().is_ok());
            assert!(Field::int("x", width).validate().is_ok());
        }
        for width in [0, 3, 5, 16] {
            assert!(matches!(
                Field::uint("x", width).validate(),
                Err(DecodeError::InvalidWidth { width: w, .. }) if w == width
            ));
        }
    }

    #[test]
    fn test_fixed_width_kinds() {
        assert!(Field::timestamp("ts").validate().is_ok());
        assert!(Field::new(FieldKind::Timestamp, "ts", 4).validate().is_err());
        assert!(Field::new(FieldKind::Placeholder, "p", 1).validate().is_err());
        assert!(Field::new(FieldKind::PlmnCompactB, "plmn", 6).validate().is_err());
    }

    #[test]
    fn test_fmt_width() {
        const FMT: &[Field] = &[
            Field::uint("Version", 1),
            Field::skip(3),
            Field::placeholder("Derived"),
            Field::rsrp("RSRP"),
        ];
        assert_eq!(fmt_width(FMT), 6);
    }
}
