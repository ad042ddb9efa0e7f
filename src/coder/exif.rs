use std::sync::Arc;

use crate::registry::{TagRegistry, TagShape};
use crate::types::{Assign, TagValue};

use super::{
    check_key, decode_value, encode_bytes_item, encode_long_item, encode_rational_components,
    encode_text_item, EncodeError, Family, RawValue, TagCoder,
};

/// Coder for the EXIF family.
///
/// Integer tags carry one or more longs, free-text tags carry UTF-8 text,
/// version tags carry byte arrays rendered as space-separated decimals, and
/// geodetic tags carry a fixed-arity rational sequence packed into a single
/// entry. A sequence operand for a text or integer tag fans out into one
/// entry per item.
#[derive(Debug, Clone)]
pub struct ExifCoder {
    registry: Arc<TagRegistry>,
}

impl ExifCoder {
    pub fn new(registry: Arc<TagRegistry>) -> Self {
        ExifCoder { registry }
    }
}

impl Default for ExifCoder {
    fn default() -> Self {
        ExifCoder::new(TagRegistry::builtin())
    }
}

impl TagCoder for ExifCoder {
    fn family(&self) -> Family {
        Family::Exif
    }

    fn decode(&self, _key: &str, raw: &RawValue) -> TagValue {
        decode_value(raw)
    }

    fn encode(&self, key: &str, value: &Assign) -> Result<Vec<RawValue>, EncodeError> {
        check_key(Family::Exif, key)?;
        let items = value.items();
        match self.registry.spec_of(key).shape {
            TagShape::Text => items
                .iter()
                .map(|item| encode_text_item(key, item).map(RawValue::Text))
                .collect(),
            TagShape::Long => items
                .iter()
                .map(|item| encode_long_item(key, item).map(RawValue::Longs))
                .collect(),
            TagShape::Rational { arity } => {
                let components = encode_rational_components(key, items)?;
                if components.is_empty() {
                    return Ok(Vec::new());
                }
                if let Some(expected) = arity {
                    if components.len() != expected {
                        return Err(EncodeError::Arity {
                            key: key.to_string(),
                            expected,
                            actual: components.len(),
                        });
                    }
                }
                Ok(vec![RawValue::Rationals(components)])
            }
            TagShape::Bytes => items
                .iter()
                .map(|item| encode_bytes_item(key, item).map(RawValue::Bytes))
                .collect(),
            TagShape::Date | TagShape::Time | TagShape::LangAlt | TagShape::Bag => {
                Err(EncodeError::Shape {
                    key: key.to_string(),
                    expected: "an EXIF-representable shape",
                    actual: "a shape foreign to the EXIF family",
                })
            }
        }
    }
}
