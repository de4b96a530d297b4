//! Repeating groups inside a payload.
//!
//! Two shapes show up across the log formats:
//! * count-driven lists, where a count field says how many elements follow
//!   ([`decode_list`], [`decode_fmt_list`]);
//! * size-declared subpackets, each carrying its own id, version and size
//!   ([`decode_subpackets`]). The declared size is always trusted over what
//!   a decoder consumed, so unknown or mis-sized subpackets never shift the
//!   ones after them.

use log::debug;

use crate::engine::Cursor;
use crate::error::DecodeError;
use crate::field::{Field, fmt_width};
use crate::record::{Record, Value};

/// Decodes `count` elements with `element`, then appends them as a list
/// named `list_name`.
///
/// `count` is checked against the bytes left before anything is read. If an
/// element fails, the elements before it are still appended and the error
/// is returned; the failing element and any after it are dropped.
pub fn decode_list<'a, F>(
    cursor: &mut Cursor<'a>,
    record: &mut Record,
    list_name: &'static str,
    count: u64,
    min_element_size: usize,
    mut element: F,
) -> Result<(), DecodeError>
where
    F: FnMut(&mut Cursor<'a>, &mut Record) -> Result<(), DecodeError>,
{
    let element_size = min_element_size.max(1);
    let remaining = cursor.remaining();
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    if count.saturating_mul(element_size) > remaining {
        return Err(DecodeError::CountExceedsBuffer {
            field: list_name,
            count,
            element_size,
            remaining,
        });
    }

    let mut items = Vec::with_capacity(count);
    let mut result = Ok(());
    for _ in 0..count {
        let mut item = Record::new();
        if let Err(err) = element(cursor, &mut item) {
            result = Err(err);
            break;
        }
        items.push(item);
    }
    record.push(list_name, Value::List(items));
    result
}

/// [`decode_list`] for elements that are a single flat table.
pub fn decode_fmt_list(
    cursor: &mut Cursor<'_>,
    record: &mut Record,
    list_name: &'static str,
    count: u64,
    fmt: &[Field],
) -> Result<(), DecodeError> {
    decode_list(cursor, record, list_name, count, fmt_width(fmt), |cursor, item| {
        cursor.decode(fmt, item).map(|_| ())
    })
}

/// Decodes one subpacket body. The cursor is bounded by the subpacket's
/// declared end.
pub type SubpacketFn = fn(&mut Cursor<'_>, &mut Record) -> Result<(), DecodeError>;

#[derive(Debug, Clone, Copy)]
pub struct SubpacketEntry {
    pub id: u64,
    pub version: u64,
    pub decode: SubpacketFn,
}

/// Where a family's subpacket header keeps its id, version and size.
#[derive(Debug, Clone, Copy)]
pub struct SubpacketLayout {
    pub header: &'static [Field],
    pub id_field: &'static str,
    pub version_field: &'static str,
    pub size_field: &'static str,
    /// Whether the declared size counts the subpacket header itself.
    pub size_includes_header: bool,
}

fn find_subpacket(table: &[SubpacketEntry], id: u64, version: u64) -> Option<SubpacketFn> {
    table
        .iter()
        .find(|entry| entry.id == id && entry.version == version)
        .map(|entry| entry.decode)
}

/// Decodes `count` size-declared subpackets into a list named `list_name`.
///
/// Known `(id, version)` pairs are decoded with their table entry; unknown
/// ones keep only their header fields. Either way decoding resumes at the
/// subpacket's declared end. A declared size that runs past the enclosing
/// limit fails the whole group.
pub fn decode_subpackets(
    cursor: &mut Cursor<'_>,
    record: &mut Record,
    list_name: &'static str,
    count: u64,
    layout: &SubpacketLayout,
    table: &[SubpacketEntry],
) -> Result<(), DecodeError> {
    let header_len = fmt_width(layout.header);
    decode_list(cursor, record, list_name, count, header_len, |cursor, item| {
        let start = cursor.offset();
        cursor.decode(layout.header, item)?;
        let id = item.require_u64(layout.id_field)?;
        let version = item.require_u64(layout.version_field)?;
        let size = item.require_u64(layout.size_field)? as usize;

        let body_start = cursor.offset();
        let base = if layout.size_includes_header {
            start
        } else {
            body_start
        };
        let end = base
            .checked_add(size)
            .filter(|end| *end <= cursor.limit() && *end >= body_start)
            .ok_or(DecodeError::MalformedSubpacketSize {
                id,
                version,
                offset: start,
                size,
                limit: cursor.limit(),
            })?;

        match find_subpacket(table, id, version) {
            Some(decode) => {
                let mut body = Cursor::new(cursor.buf(), body_start, end);
                decode(&mut body, item)?;
                if body.offset() != end {
                    debug!(
                        "subpacket {id} v{version}: decoded {} of {} declared bytes",
                        body.offset() - body_start,
                        end - body_start
                    );
                }
            }
            None => debug!("skipping unknown subpacket {id} v{version} ({size} bytes)"),
        }
        cursor.seek(end);
        Ok(())
    })
}

#[cfg(test)]
mod test {
    use super::*;

    const ELEMENT: &[Field] = &[Field::uint("A", 1), Field::uint("B", 2)];

    #[test]
    fn test_fmt_list() {
        let buf = [1, 2, 0, 3, 4, 0, 0xee];
        let mut cursor = Cursor::new(&buf, 0, buf.len());
        let mut record = Record::new();
        decode_fmt_list(&mut cursor, &mut record, "Items", 2, ELEMENT).unwrap();
        let items = record.get("Items").unwrap().as_list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].get_u64("A"), Some(3));
        assert_eq!(items[1].get_u64("B"), Some(4));
        assert_eq!(cursor.offset(), 6);
    }

    #[test]
    fn test_count_validated_before_use() {
        let buf = [1, 2, 0];
        let mut cursor = Cursor::new(&buf, 0, buf.len());
        let mut record = Record::new();
        let err = decode_fmt_list(&mut cursor, &mut record, "Items", u32::MAX as u64, ELEMENT)
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::CountExceedsBuffer {
                element_size: 3,
                remaining: 3,
                ..
            }
        ));
        assert!(!record.contains("Items"));
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_failed_element_keeps_siblings() {
        let buf = [1, 2, 0, 3, 4, 0, 5];
        let mut cursor = Cursor::new(&buf, 0, buf.len());
        let mut record = Record::new();
        let mut seen = 0;
        let err = decode_list(&mut cursor, &mut record, "Items", 2, 3, |cursor, item| {
            seen += 1;
            cursor.decode(ELEMENT, item)?;
            if seen == 2 {
                // the second element needs one more byte than there is
                cursor.decode(&[Field::uint("C", 2)], item)?;
            }
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { field: Some("C"), .. }));
        let items = record.get("Items").unwrap().as_list().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get_u64("A"), Some(1));
    }

    const SUBPKT_HEADER: &[Field] = &[
        Field::uint("SubPacket ID", 1),
        Field::uint("Version", 1),
        Field::uint("SubPacket Size", 2),
    ];
    const LAYOUT: SubpacketLayout = SubpacketLayout {
        header: SUBPKT_HEADER,
        id_field: "SubPacket ID",
        version_field: "Version",
        size_field: "SubPacket Size",
        size_includes_header: true,
    };

    fn decode_known(cursor: &mut Cursor<'_>, record: &mut Record) -> Result<(), DecodeError> {
        cursor.decode(&[Field::uint("Value", 2)], record)?;
        Ok(())
    }

    const TABLE: &[SubpacketEntry] = &[SubpacketEntry {
        id: 7,
        version: 1,
        decode: decode_known,
    }];

    fn subpacket(id: u8, version: u8, body: &[u8]) -> Vec<u8> {
        let size = (4 + body.len()) as u16;
        let mut out = vec![id, version];
        out.extend(size.to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn test_unknown_subpacket_is_skipped() {
        let mut buf = subpacket(99, 3, &[0xde, 0xad, 0xbe, 0xef, 0x00]);
        buf.extend(subpacket(7, 1, &[0x34, 0x12]));
        let mut cursor = Cursor::new(&buf, 0, buf.len());
        let mut record = Record::new();
        decode_subpackets(&mut cursor, &mut record, "Subpackets", 2, &LAYOUT, TABLE).unwrap();
        assert_eq!(cursor.offset(), buf.len());
        let subpackets = record.get("Subpackets").unwrap().as_list().unwrap();
        assert_eq!(subpackets[0].get_u64("SubPacket ID"), Some(99));
        assert!(!subpackets[0].contains("Value"));
        assert_eq!(subpackets[1].get_u64("Value"), Some(0x1234));
    }

    #[test]
    fn test_skip_lands_on_declared_end_whatever_the_content() {
        for body in [&[][..], &[0xff; 3][..], &[0x7e; 17][..]] {
            let mut buf = subpacket(42, 9, body);
            let declared_end = buf.len();
            buf.extend(subpacket(7, 1, &[1, 0]));
            let mut cursor = Cursor::new(&buf, 0, buf.len());
            let mut record = Record::new();
            decode_subpackets(&mut cursor, &mut record, "Subpackets", 1, &LAYOUT, TABLE).unwrap();
            assert_eq!(cursor.offset(), declared_end);
        }
    }

    #[test]
    fn test_known_subpacket_with_padding() {
        // declares two bytes more than the decoder reads
        let mut buf = subpacket(7, 1, &[0x02, 0x00, 0xaa, 0xbb]);
        buf.extend(subpacket(7, 1, &[0x03, 0x00]));
        let mut cursor = Cursor::new(&buf, 0, buf.len());
        let mut record = Record::new();
        decode_subpackets(&mut cursor, &mut record, "Subpackets", 2, &LAYOUT, TABLE).unwrap();
        let subpackets = record.get("Subpackets").unwrap().as_list().unwrap();
        assert_eq!(subpackets[0].get_u64("Value"), Some(2));
        assert_eq!(subpackets[1].get_u64("Value"), Some(3));
    }

    #[test]
    fn test_oversized_subpacket_is_fatal() {
        let mut buf = subpacket(7, 1, &[0x02, 0x00]);
        let mut bad = subpacket(99, 1, &[0; 4]);
        bad[2] = 0xff;
        buf.extend(bad);
        let mut cursor = Cursor::new(&buf, 0, buf.len());
        let mut record = Record::new();
        let err = decode_subpackets(&mut cursor, &mut record, "Subpackets", 2, &LAYOUT, TABLE)
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedSubpacketSize { id: 99, size: 255, offset: 6, .. }
        ));
        // the first subpacket was already decoded
        let subpackets = record.get("Subpackets").unwrap().as_list().unwrap();
        assert_eq!(subpackets.len(), 1);
    }

    #[test]
    fn test_undersized_subpacket_is_fatal() {
        let mut buf = subpacket(7, 1, &[0x02, 0x00]);
        buf[2] = 2; // smaller than its own header
        let mut cursor = Cursor::new(&buf, 0, buf.len());
        let mut record = Record::new();
        assert!(matches!(
            decode_subpackets(&mut cursor, &mut record, "Subpackets", 1, &LAYOUT, TABLE),
            Err(DecodeError::MalformedSubpacketSize { size: 2, .. })
        ));
    }
}
