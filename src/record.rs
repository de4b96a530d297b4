//! The output of every decode: an order-preserving list of named values.
//!
//! Entries keep the position they were appended at. Post-processing only
//! ever swaps an entry's value in place (see [`Record::replace`]), which is
//! what lets a table reserve a slot with a placeholder and fill it later
//! without reordering the output.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use bitvec::prelude::*;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::DecodeError;

/// Mobile country code and mobile network code, as decimal digit strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Plmn {
    pub mcc: String,
    pub mnc: String,
}

impl fmt::Display for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.mcc, self.mnc)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UInt(u64),
    Int(i64),
    Float(f64),
    Text(Cow<'static, str>),
    Bytes(Vec<u8>),
    Bits(BitVec<u8, Msb0>),
    Timestamp(DateTime<Utc>),
    Plmn(Plmn),
    Record(Record),
    List(Vec<Record>),
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::UInt(v) => i64::try_from(*v).ok(),
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::UInt(v) => Some(*v as f64),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Record]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::Text(Cow::Borrowed(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(Cow::Owned(s))
    }
}

fn hex_string(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(2 + bytes.len() * 2);
    s.push_str("0x");
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

fn bit_string(bits: &BitSlice<u8, Msb0>) -> String {
    bits.iter().map(|b| if *b { '1' } else { '0' }).collect()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::UInt(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bytes(b) => write!(f, "{}", hex_string(b)),
            Value::Bits(b) => write!(f, "{}", bit_string(b)),
            Value::Timestamp(ts) => {
                write!(f, "{}", ts.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
            Value::Plmn(p) => write!(f, "{p}"),
            Value::Record(r) => write!(f, "{{{} fields}}", r.len()),
            Value::List(l) => write!(f, "[{} records]", l.len()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::UInt(v) => serializer.serialize_u64(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Record(r) => r.serialize(serializer),
            Value::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for r in l {
                    seq.serialize_element(r)?;
                }
                seq.end()
            }
            other => serializer.collect_str(other),
        }
    }
}

/// Ordered `(name, value)` entries with a first-match name index.
#[derive(Debug, Clone, Default)]
pub struct Record {
    entries: Vec<(Cow<'static, str>, Value)>,
    index: HashMap<Cow<'static, str>, usize>,
}

// the index is derived from `entries`, so it's left out of equality
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    pub fn push(&mut self, name: impl Into<Cow<'static, str>>, value: Value) {
        let name = name.into();
        let position = self.entries.len();
        self.index.entry(name.clone()).or_insert(position);
        self.entries.push((name, value));
    }

    /// Returns the first entry named `name`, in decode order.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        let i = *self.index.get(name)?;
        Some(&mut self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Swaps the value of the first entry named `name`, keeping its
    /// position. Returns the previous value, or `None` if no such entry
    /// exists (in which case the record is unchanged).
    pub fn replace(&mut self, name: &str, value: Value) -> Option<Value> {
        let slot = self.get_mut(name)?;
        Some(std::mem::replace(slot, value))
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    /// Like [`Record::get_u64`], but a missing or non-integer field is an error.
    pub fn require_u64(&self, name: &'static str) -> Result<u64, DecodeError> {
        self.get_u64(name).ok_or(DecodeError::MissingField(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_ref(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_ref())
    }

    /// Drops every entry from position `len` on. Names whose first entry
    /// survives keep their index.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.entries.len() {
            return;
        }
        self.entries.truncate(len);
        self.index.retain(|_, position| *position < len);
    }

    /// Appends every entry of `other`, in order.
    pub fn extend(&mut self, other: Record) {
        for (name, value) in other.entries {
            self.push(name, value);
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name.as_ref(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> Record {
        let mut record = Record::new();
        record.push("Version", Value::UInt(2));
        record.push("Count", Value::UInt(0));
        record.push("Count", Value::UInt(7));
        record.push("Name", Value::from("cell"));
        record
    }

    #[test]
    fn test_lookup_returns_first_match() {
        let record = sample();
        assert_eq!(record.get_u64("Count"), Some(0));
        assert_eq!(record.get_u64("Missing"), None);
        assert!(matches!(
            record.require_u64("Missing"),
            Err(DecodeError::MissingField("Missing"))
        ));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut record = sample();
        let before: Vec<String> = record.names().map(str::to_owned).collect();
        assert_eq!(record.replace("Count", Value::UInt(42)), Some(Value::UInt(0)));
        let after: Vec<String> = record.names().map(str::to_owned).collect();
        assert_eq!(before, after);
        assert_eq!(record.get_u64("Count"), Some(42));
        // the duplicate later entry is untouched
        assert_eq!(record.iter().nth(2).unwrap().1, &Value::UInt(7));
        assert_eq!(record.replace("Missing", Value::UInt(1)), None);
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_truncate() {
        let mut record = sample();
        record.truncate(2);
        assert_eq!(record.names().collect::<Vec<_>>(), vec!["Version", "Count"]);
        assert_eq!(record.get_u64("Count"), Some(0));
        assert!(!record.contains("Name"));

        // a name dropped entirely can be pushed again at its new position
        record.truncate(1);
        record.push("Count", Value::UInt(5));
        assert_eq!(record.get_u64("Count"), Some(5));

        record.truncate(10);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_serialize_ordered() {
        let mut inner = Record::new();
        inner.push("PCI", Value::UInt(131));
        let mut record = Record::new();
        record.push("Zeta", Value::Int(-3));
        record.push("Alpha", Value::Bytes(vec![0xde, 0xad]));
        record.push("Cells", Value::List(vec![inner]));
        record.push(
            "PLMN",
            Value::Plmn(Plmn {
                mcc: "310".to_string(),
                mnc: "410".to_string(),
            }),
        );
        record.push("Flags", Value::Bits(bitvec![u8, Msb0; 1, 0, 1]));
        assert_eq!(
            record.to_json().unwrap(),
            r#"{"Zeta":-3,"Alpha":"0xdead","Cells":[{"PCI":131}],"PLMN":"310-410","Flags":"101"}"#
        );
    }
}
