use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::registry::{TagRegistry, TagShape};
use crate::types::{Assign, TagValue};

use super::{
    check_key, decode_value, encode_long_item, encode_text_item, kind_name, EncodeError, Family,
    RawValue, TagCoder,
};

/// Coder for the IPTC family.
///
/// Date-only tags decode to UTC midnight of the stored date; time-only tags
/// decode to the time of day on the epoch reference date (1970-01-01).
/// Keyword-style tags are repeatable and fan a sequence operand out into one
/// entry per item; a non-repeatable tag rejects multi-item operands.
#[derive(Debug, Clone)]
pub struct IptcCoder {
    registry: Arc<TagRegistry>,
}

impl IptcCoder {
    pub fn new(registry: Arc<TagRegistry>) -> Self {
        IptcCoder { registry }
    }
}

impl Default for IptcCoder {
    fn default() -> Self {
        IptcCoder::new(TagRegistry::builtin())
    }
}

impl TagCoder for IptcCoder {
    fn family(&self) -> Family {
        Family::Iptc
    }

    fn decode(&self, _key: &str, raw: &RawValue) -> TagValue {
        decode_value(raw)
    }

    fn encode(&self, key: &str, value: &Assign) -> Result<Vec<RawValue>, EncodeError> {
        check_key(Family::Iptc, key)?;
        let spec = self.registry.spec_of(key);
        let items = value.items();
        if !spec.repeatable && items.len() > 1 {
            return Err(EncodeError::NotRepeatable {
                key: key.to_string(),
            });
        }
        match spec.shape {
            TagShape::Text => items
                .iter()
                .map(|item| encode_text_item(key, item).map(RawValue::Text))
                .collect(),
            TagShape::Long => items
                .iter()
                .map(|item| encode_long_item(key, item).map(RawValue::Longs))
                .collect(),
            TagShape::Date => items.iter().map(|item| encode_date(key, item)).collect(),
            TagShape::Time => items.iter().map(|item| encode_time(key, item)).collect(),
            TagShape::Rational { .. }
            | TagShape::Bytes
            | TagShape::LangAlt
            | TagShape::Bag => Err(EncodeError::Shape {
                key: key.to_string(),
                expected: "an IPTC-representable shape",
                actual: "a shape foreign to the IPTC family",
            }),
        }
    }
}

/// A timestamp contributes its date part; text must be ISO `YYYY-MM-DD`.
fn encode_date(key: &str, item: &TagValue) -> Result<RawValue, EncodeError> {
    let date = match item {
        TagValue::Timestamp(ts) => ts.date_naive(),
        TagValue::Text(s) => {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| EncodeError::Parse {
                key: key.to_string(),
                text: s.clone(),
                wanted: "YYYY-MM-DD date",
            })?
        }
        other => {
            return Err(EncodeError::Shape {
                key: key.to_string(),
                expected: "timestamp or date text",
                actual: kind_name(other),
            })
        }
    };
    Ok(RawValue::Date {
        year: date.year(),
        month: date.month(),
        day: date.day(),
    })
}

/// A timestamp contributes its time part; text must be `HH:MM:SS`. The
/// stored offset is always zero — callers hand over UTC.
fn encode_time(key: &str, item: &TagValue) -> Result<RawValue, EncodeError> {
    let time = match item {
        TagValue::Timestamp(ts) => ts.time(),
        TagValue::Text(s) => {
            NaiveTime::parse_from_str(s.trim(), "%H:%M:%S").map_err(|_| EncodeError::Parse {
                key: key.to_string(),
                text: s.clone(),
                wanted: "HH:MM:SS time",
            })?
        }
        other => {
            return Err(EncodeError::Shape {
                key: key.to_string(),
                expected: "timestamp or time text",
                actual: kind_name(other),
            })
        }
    };
    Ok(RawValue::Time {
        hour: time.hour() as i32,
        minute: time.minute() as i32,
        second: time.second() as i32,
        tz_hour: 0,
        tz_minute: 0,
    })
}
