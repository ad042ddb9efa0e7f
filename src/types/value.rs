use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::lang_alt::LangAltMap;
use super::rational::Rational;
use super::text_bag::TextBag;

/// The decoded form of one metadata entry.
///
/// Which variant applies to a key is decided by the active coder and the tag
/// registry, never stored alongside the entry. `Ints` and `Rationals` cover
/// multi-component payloads that still live in a single entry (a GPS
/// coordinate is one entry holding three rationals).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TagValue {
    Int(i64),
    Ints(Vec<i64>),
    Text(String),
    Rational(Rational),
    Rationals(Vec<Rational>),
    Timestamp(DateTime<Utc>),
    LangAlt(LangAltMap),
    Bag(TextBag),
}

impl TagValue {
    pub fn text(s: impl Into<String>) -> Self {
        TagValue::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Int(n) => write!(f, "{n}"),
            TagValue::Ints(ns) => {
                write!(f, "[")?;
                for (i, n) in ns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{n}")?;
                }
                write!(f, "]")
            }
            TagValue::Text(s) => write!(f, "{s:?}"),
            TagValue::Rational(r) => write!(f, "{r}"),
            TagValue::Rationals(rs) => {
                write!(f, "[")?;
                for (i, r) in rs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{r}")?;
                }
                write!(f, "]")
            }
            TagValue::Timestamp(ts) => {
                write!(f, "{}", ts.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            TagValue::LangAlt(map) => write!(f, "{map}"),
            TagValue::Bag(bag) => write!(f, "{bag}"),
        }
    }
}

impl From<i64> for TagValue {
    fn from(n: i64) -> Self {
        TagValue::Int(n)
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::Text(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::Text(s)
    }
}

impl From<Rational> for TagValue {
    fn from(r: Rational) -> Self {
        TagValue::Rational(r)
    }
}

impl From<DateTime<Utc>> for TagValue {
    fn from(ts: DateTime<Utc>) -> Self {
        TagValue::Timestamp(ts)
    }
}

impl From<LangAltMap> for TagValue {
    fn from(map: LangAltMap) -> Self {
        TagValue::LangAlt(map)
    }
}

impl From<TextBag> for TagValue {
    fn from(bag: TextBag) -> Self {
        TagValue::Bag(bag)
    }
}

/// Read result for a key: occurrence count decides the shape.
///
/// Callers pattern-match instead of guessing whether a tag repeated; a key
/// seen once yields `Single`, a repeated key yields `Multiple` in entry
/// order, and absence is a value of its own rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Absent,
    Single(TagValue),
    Multiple(Vec<TagValue>),
}

impl Lookup {
    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    pub fn as_single(&self) -> Option<&TagValue> {
        match self {
            Lookup::Single(v) => Some(v),
            _ => None,
        }
    }

    /// Flatten to a plain list: `Absent` is empty, `Single` one element.
    pub fn into_values(self) -> Vec<TagValue> {
        match self {
            Lookup::Absent => Vec::new(),
            Lookup::Single(v) => vec![v],
            Lookup::Multiple(vs) => vs,
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Absent => write!(f, "absent"),
            Lookup::Single(v) => write!(f, "{v}"),
            Lookup::Multiple(vs) => {
                write!(f, "[")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Write operand for `add`/`set`: one value or an explicit sequence.
///
/// A sequence usually becomes one entry per item; composite shapes (LangAlt,
/// bags, fixed-arity rationals) pack the whole sequence into a single entry.
/// That split belongs to the coder, not the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Assign {
    One(TagValue),
    Many(Vec<TagValue>),
}

impl Assign {
    /// Uniform item view: `One` is a one-element slice.
    pub fn items(&self) -> &[TagValue] {
        match self {
            Assign::One(v) => std::slice::from_ref(v),
            Assign::Many(vs) => vs,
        }
    }
}

impl From<TagValue> for Assign {
    fn from(v: TagValue) -> Self {
        Assign::One(v)
    }
}

impl From<Vec<TagValue>> for Assign {
    fn from(vs: Vec<TagValue>) -> Self {
        Assign::Many(vs)
    }
}

impl From<i64> for Assign {
    fn from(n: i64) -> Self {
        Assign::One(TagValue::Int(n))
    }
}

impl From<&str> for Assign {
    fn from(s: &str) -> Self {
        Assign::One(TagValue::from(s))
    }
}

impl From<String> for Assign {
    fn from(s: String) -> Self {
        Assign::One(TagValue::Text(s))
    }
}

impl From<Rational> for Assign {
    fn from(r: Rational) -> Self {
        Assign::One(TagValue::Rational(r))
    }
}

impl From<DateTime<Utc>> for Assign {
    fn from(ts: DateTime<Utc>) -> Self {
        Assign::One(TagValue::Timestamp(ts))
    }
}

impl From<LangAltMap> for Assign {
    fn from(map: LangAltMap) -> Self {
        Assign::One(TagValue::LangAlt(map))
    }
}

impl From<TextBag> for Assign {
    fn from(bag: TextBag) -> Self {
        Assign::One(TagValue::Bag(bag))
    }
}

impl From<Vec<&str>> for Assign {
    fn from(items: Vec<&str>) -> Self {
        Assign::Many(items.into_iter().map(TagValue::from).collect())
    }
}

impl From<Vec<String>> for Assign {
    fn from(items: Vec<String>) -> Self {
        Assign::Many(items.into_iter().map(TagValue::Text).collect())
    }
}

impl From<Vec<Rational>> for Assign {
    fn from(items: Vec<Rational>) -> Self {
        Assign::Many(items.into_iter().map(TagValue::Rational).collect())
    }
}

impl From<Vec<i64>> for Assign {
    fn from(items: Vec<i64>) -> Self {
        Assign::Many(items.into_iter().map(TagValue::Int).collect())
    }
}
