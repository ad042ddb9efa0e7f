//! Per-family tag coders.
//!
//! A coder converts between a tag's raw stored payload and its semantic
//! value, in both directions. The set of coders is closed — `ExifCoder`,
//! `IptcCoder`, `XmpCoder` — and one of them is picked when the store is
//! constructed. Coders carry no state besides a shared registry handle;
//! every call is a pure function of (key, payload, registry).
//!
//! Decoding never fails: payloads the shape table cannot place fall back to
//! their text rendering. Encoding is where every shape, arity,
//! repeatability and parse problem surfaces, synchronously, before the
//! store touches an entry.

pub mod exif;
pub mod iptc;
pub mod xmp;

use std::fmt;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Assign, LangAltMap, Rational, TagValue, TextBag};

pub use exif::ExifCoder;
pub use iptc::IptcCoder;
pub use xmp::XmpCoder;

/// The three metadata standards, each with its own key namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Exif,
    Iptc,
    Xmp,
}

impl Family {
    pub fn prefix(self) -> &'static str {
        match self {
            Family::Exif => "Exif.",
            Family::Iptc => "Iptc.",
            Family::Xmp => "Xmp.",
        }
    }

    pub fn owns(self, key: &str) -> bool {
        key.starts_with(self.prefix())
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Exif => write!(f, "Exif"),
            Family::Iptc => write!(f, "Iptc"),
            Family::Xmp => write!(f, "Xmp"),
        }
    }
}

/// Raw stored payload of one entry.
///
/// This is the representation agreed between store, coder and engine; it is
/// what the sidecar engine serializes. Multi-component payloads (a GPS
/// triple, a version byte array, a whole language map) are one payload, not
/// one per component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    Text(String),
    Longs(Vec<i64>),
    Rationals(Vec<Rational>),
    Bytes(Vec<u8>),
    Date {
        year: i32,
        month: u32,
        day: u32,
    },
    Time {
        hour: i32,
        minute: i32,
        second: i32,
        tz_hour: i32,
        tz_minute: i32,
    },
    LangAlt(Vec<(String, String)>),
    Array(Vec<String>),
}

/// One stored entry: a dotted key plus its raw payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub key: String,
    pub value: RawValue,
}

impl RawRecord {
    pub fn new(key: impl Into<String>, value: RawValue) -> Self {
        RawRecord {
            key: key.into(),
            value,
        }
    }
}

/// A value the active coder cannot represent for the addressed tag.
///
/// Always raised at the `add`/`set` call site, never deferred to persist
/// time; the store applies nothing when encoding fails.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("tag key must not be empty")]
    EmptyKey,
    #[error("key {key:?} is not an {family} key")]
    ForeignKey { key: String, family: Family },
    #[error("{key}: expected {expected}, got {actual}")]
    Shape {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("{key}: expected exactly {expected} components, got {actual}")]
    Arity {
        key: String,
        expected: usize,
        actual: usize,
    },
    #[error("{key} is not repeatable")]
    NotRepeatable { key: String },
    #[error("{key}: cannot parse {text:?} as {wanted}")]
    Parse {
        key: String,
        text: String,
        wanted: &'static str,
    },
}

/// The per-family encode/decode contract a [`MetadataStore`] is generic
/// over.
///
/// [`MetadataStore`]: crate::store::MetadataStore
pub trait TagCoder {
    fn family(&self) -> Family;

    /// Raw payload to semantic value. Infallible; unplaceable payloads
    /// decode to their text rendering.
    fn decode(&self, key: &str, raw: &RawValue) -> TagValue;

    /// Operand to raw payloads, one per entry the store should hold.
    /// An empty result is valid and means "no entries for this key".
    fn encode(&self, key: &str, value: &Assign) -> Result<Vec<RawValue>, EncodeError>;
}

/// Key gate every coder applies first: non-empty and inside the family
/// namespace.
pub(crate) fn check_key(family: Family, key: &str) -> Result<(), EncodeError> {
    if key.is_empty() {
        return Err(EncodeError::EmptyKey);
    }
    if !family.owns(key) {
        return Err(EncodeError::ForeignKey {
            key: key.to_string(),
            family,
        });
    }
    Ok(())
}

/// Payload-driven decoding shared by all families. Family differences live
/// on the encode side; a stored payload already knows its own type.
pub(crate) fn decode_value(raw: &RawValue) -> TagValue {
    match raw {
        RawValue::Text(s) => TagValue::Text(s.clone()),
        RawValue::Longs(ns) => match ns.as_slice() {
            [n] => TagValue::Int(*n),
            _ => TagValue::Ints(ns.clone()),
        },
        RawValue::Rationals(rs) => match rs.as_slice() {
            [r] => TagValue::Rational(*r),
            _ => TagValue::Rationals(rs.clone()),
        },
        RawValue::Bytes(bytes) => TagValue::Text(render_bytes(bytes)),
        RawValue::Date { year, month, day } => {
            match Utc.with_ymd_and_hms(*year, *month, *day, 0, 0, 0).single() {
                Some(ts) => TagValue::Timestamp(ts),
                None => TagValue::Text(format!("{year:04}-{month:02}-{day:02}")),
            }
        }
        RawValue::Time {
            hour,
            minute,
            second,
            tz_hour,
            tz_minute,
        } => {
            // Apply the stored offset with wrap-around; a negative result
            // lands in the previous day's hours on the reference date.
            let h = (hour + tz_hour).rem_euclid(24) as u32;
            let m = (minute + tz_minute).rem_euclid(60) as u32;
            match Utc.with_ymd_and_hms(1970, 1, 1, h, m, *second as u32).single() {
                Some(ts) => TagValue::Timestamp(ts),
                None => TagValue::Text(format!("{hour:02}:{minute:02}:{second:02}")),
            }
        }
        RawValue::LangAlt(pairs) => TagValue::LangAlt(pairs.iter().cloned().collect()),
        RawValue::Array(items) => TagValue::Bag(items.iter().cloned().collect()),
    }
}

/// Space-separated decimal rendering of version-style byte arrays.
fn render_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn kind_name(value: &TagValue) -> &'static str {
    match value {
        TagValue::Int(_) | TagValue::Ints(_) => "integer",
        TagValue::Text(_) => "text",
        TagValue::Rational(_) | TagValue::Rationals(_) => "rational",
        TagValue::Timestamp(_) => "timestamp",
        TagValue::LangAlt(_) => "language alternative",
        TagValue::Bag(_) => "bag",
    }
}

/// Render a scalar operand as tag text. Numeric values get their canonical
/// rendering; composite values are a shape error for text tags.
pub(crate) fn encode_text_item(key: &str, item: &TagValue) -> Result<String, EncodeError> {
    match item {
        TagValue::Text(s) => Ok(s.clone()),
        TagValue::Int(n) => Ok(n.to_string()),
        TagValue::Rational(r) => Ok(r.to_string()),
        other => Err(EncodeError::Shape {
            key: key.to_string(),
            expected: "text",
            actual: kind_name(other),
        }),
    }
}

pub(crate) fn encode_long_item(key: &str, item: &TagValue) -> Result<Vec<i64>, EncodeError> {
    match item {
        TagValue::Int(n) => Ok(vec![*n]),
        TagValue::Ints(ns) => Ok(ns.clone()),
        TagValue::Text(s) => s.trim().parse::<i64>().map(|n| vec![n]).map_err(|_| {
            EncodeError::Parse {
                key: key.to_string(),
                text: s.clone(),
                wanted: "integer",
            }
        }),
        other => Err(EncodeError::Shape {
            key: key.to_string(),
            expected: "integer",
            actual: kind_name(other),
        }),
    }
}

/// Gather rational components from a mixed operand list. Integers widen to
/// `n/1`, text parses as `"n/d"` or a bare integer.
pub(crate) fn encode_rational_components(
    key: &str,
    items: &[TagValue],
) -> Result<Vec<Rational>, EncodeError> {
    let mut components = Vec::with_capacity(items.len());
    for item in items {
        match item {
            TagValue::Rational(r) => components.push(*r),
            TagValue::Rationals(rs) => components.extend_from_slice(rs),
            TagValue::Int(n) => components.push(Rational::from(*n)),
            TagValue::Text(s) => {
                components.push(s.parse::<Rational>().map_err(|_| EncodeError::Parse {
                    key: key.to_string(),
                    text: s.clone(),
                    wanted: "rational",
                })?)
            }
            other => {
                return Err(EncodeError::Shape {
                    key: key.to_string(),
                    expected: "rational",
                    actual: kind_name(other),
                })
            }
        }
    }
    Ok(components)
}

/// Parse the space-separated decimal rendering back into bytes.
pub(crate) fn encode_bytes_item(key: &str, item: &TagValue) -> Result<Vec<u8>, EncodeError> {
    let text = match item {
        TagValue::Text(s) => s,
        other => {
            return Err(EncodeError::Shape {
                key: key.to_string(),
                expected: "space-separated byte rendering",
                actual: kind_name(other),
            })
        }
    };
    text.split_whitespace()
        .map(|part| {
            part.parse::<u8>().map_err(|_| EncodeError::Parse {
                key: key.to_string(),
                text: text.clone(),
                wanted: "byte",
            })
        })
        .collect()
}

/// Build a language map from operand items: unmarked text targets the
/// default slot, `lang="<tag>" <text>` targets that language, a whole
/// `LangAltMap` merges its pairs. Later items overwrite earlier ones per
/// language.
pub(crate) fn encode_lang_alt(key: &str, items: &[TagValue]) -> Result<LangAltMap, EncodeError> {
    let mut map = LangAltMap::new();
    for item in items {
        match item {
            TagValue::Text(s) => {
                let (lang, text) = split_lang_marker(key, s)?;
                map.set(lang, text);
            }
            TagValue::LangAlt(other) => {
                for (lang, text) in other.iter() {
                    map.set(lang.clone(), text.clone());
                }
            }
            other => {
                return Err(EncodeError::Shape {
                    key: key.to_string(),
                    expected: "text or language alternative",
                    actual: kind_name(other),
                })
            }
        }
    }
    Ok(map)
}

/// `lang="ab-CE" cde` → `("ab-CE", "cde")`; anything without the marker
/// targets the default slot verbatim.
fn split_lang_marker(key: &str, s: &str) -> Result<(String, String), EncodeError> {
    let Some(rest) = s.strip_prefix("lang=\"") else {
        return Ok((crate::types::DEFAULT_LANG.to_string(), s.to_string()));
    };
    match rest.split_once('"') {
        Some((lang, text)) if !lang.is_empty() => {
            Ok((lang.to_string(), text.strip_prefix(' ').unwrap_or(text).to_string()))
        }
        _ => Err(EncodeError::Parse {
            key: key.to_string(),
            text: s.to_string(),
            wanted: "lang=\"<tag>\" <text>",
        }),
    }
}

/// Flatten operand items into bag members; nested bags splice their items.
pub(crate) fn encode_bag(key: &str, items: &[TagValue]) -> Result<TextBag, EncodeError> {
    let mut bag = TextBag::new();
    for item in items {
        match item {
            TagValue::Text(s) => bag.push(s.clone()),
            TagValue::Int(n) => bag.push(n.to_string()),
            TagValue::Bag(other) => {
                for member in other.items() {
                    bag.push(member.clone());
                }
            }
            other => {
                return Err(EncodeError::Shape {
                    key: key.to_string(),
                    expected: "text",
                    actual: kind_name(other),
                })
            }
        }
    }
    Ok(bag)
}
