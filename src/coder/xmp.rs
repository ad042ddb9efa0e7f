use std::sync::Arc;

use crate::registry::{TagRegistry, TagShape};
use crate::types::{Assign, TagValue};

use super::{
    check_key, decode_value, encode_bag, encode_lang_alt, encode_long_item,
    encode_rational_components, encode_text_item, EncodeError, Family, RawValue, TagCoder,
};

/// Coder for the XMP family.
///
/// Language-alternative tags always encode the whole map into one entry:
/// an unmarked operand targets the `x-default` slot, `lang="<tag>" <text>`
/// targets that language, and because `set` is a destructive replace,
/// assigning a plain string wipes every other language. Bag tags pack a
/// sequence into one array entry; a bag that encodes to zero items drops
/// the key entirely.
#[derive(Debug, Clone)]
pub struct XmpCoder {
    registry: Arc<TagRegistry>,
}

impl XmpCoder {
    pub fn new(registry: Arc<TagRegistry>) -> Self {
        XmpCoder { registry }
    }
}

impl Default for XmpCoder {
    fn default() -> Self {
        XmpCoder::new(TagRegistry::builtin())
    }
}

impl TagCoder for XmpCoder {
    fn family(&self) -> Family {
        Family::Xmp
    }

    fn decode(&self, _key: &str, raw: &RawValue) -> TagValue {
        decode_value(raw)
    }

    fn encode(&self, key: &str, value: &Assign) -> Result<Vec<RawValue>, EncodeError> {
        check_key(Family::Xmp, key)?;
        let items = value.items();
        match self.registry.spec_of(key).shape {
            TagShape::LangAlt => {
                let map = encode_lang_alt(key, items)?;
                if map.is_empty() {
                    return Ok(Vec::new());
                }
                let pairs = map
                    .iter()
                    .map(|(lang, text)| (lang.clone(), text.clone()))
                    .collect();
                Ok(vec![RawValue::LangAlt(pairs)])
            }
            TagShape::Bag => {
                let bag = encode_bag(key, items)?;
                if bag.is_empty() {
                    return Ok(Vec::new());
                }
                Ok(vec![RawValue::Array(bag.into_iter().collect())])
            }
            TagShape::Text => items
                .iter()
                .map(|item| encode_text_item(key, item).map(RawValue::Text))
                .collect(),
            TagShape::Long => items
                .iter()
                .map(|item| encode_long_item(key, item).map(RawValue::Longs))
                .collect(),
            TagShape::Rational { .. } => {
                let components = encode_rational_components(key, items)?;
                if components.is_empty() {
                    return Ok(Vec::new());
                }
                Ok(vec![RawValue::Rationals(components)])
            }
            TagShape::Bytes | TagShape::Date | TagShape::Time => Err(EncodeError::Shape {
                key: key.to_string(),
                expected: "an XMP-representable shape",
                actual: "a shape foreign to the XMP family",
            }),
        }
    }
}
