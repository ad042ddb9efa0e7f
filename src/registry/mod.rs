//! The external tag table: which value shape each dotted key carries.
//!
//! The registry is process-wide, read-only configuration with a load/freeze
//! lifecycle: build it once (or take the built-in table), freeze it into an
//! `Arc`, and hand shared references to the coders. Nothing mutates a frozen
//! registry.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Expected value shape for a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagShape {
    /// Free text.
    Text,
    /// Integer payload, one or more components.
    Long,
    /// Rational payload; `arity` pins the exact component count when fixed
    /// (GPS coordinates are exactly three).
    Rational { arity: Option<usize> },
    /// Opaque byte array rendered as space-separated decimals
    /// (version-style tags).
    Bytes,
    /// Date-only payload (IPTC).
    Date,
    /// Time-only payload (IPTC).
    Time,
    /// Language-alternative map (XMP).
    LangAlt,
    /// Unordered text bag (XMP).
    Bag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpec {
    pub shape: TagShape,
    /// Whether the tag may occur as more than one entry (IPTC keyword-style
    /// tags). EXIF and XMP tags ignore this at encode time.
    pub repeatable: bool,
}

impl TagSpec {
    pub const fn of(shape: TagShape) -> Self {
        TagSpec {
            shape,
            repeatable: false,
        }
    }

    pub const fn repeatable(shape: TagShape) -> Self {
        TagSpec {
            shape,
            repeatable: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct TagRegistry {
    specs: BTreeMap<String, TagSpec>,
}

impl TagRegistry {
    pub fn builder() -> TagRegistryBuilder {
        TagRegistryBuilder {
            specs: BTreeMap::new(),
        }
    }

    /// Shape lookup. Unknown keys fall back to free text, the same stance
    /// the Exiv2 library takes for unregistered properties.
    pub fn spec_of(&self, key: &str) -> TagSpec {
        self.specs
            .get(key)
            .copied()
            .unwrap_or(TagSpec::of(TagShape::Text))
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.specs.contains_key(key)
    }

    /// The frozen process-wide table covering the common tags of all three
    /// families.
    pub fn builtin() -> Arc<TagRegistry> {
        static BUILTIN: OnceLock<Arc<TagRegistry>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let mut builder = TagRegistry::builder();
                for (key, spec) in BUILTIN_TAGS {
                    builder = builder.tag(*key, *spec);
                }
                builder.freeze()
            })
            .clone()
    }
}

pub struct TagRegistryBuilder {
    specs: BTreeMap<String, TagSpec>,
}

impl TagRegistryBuilder {
    pub fn tag(mut self, key: impl Into<String>, spec: TagSpec) -> Self {
        self.specs.insert(key.into(), spec);
        self
    }

    pub fn freeze(self) -> Arc<TagRegistry> {
        Arc::new(TagRegistry { specs: self.specs })
    }
}

const GPS: TagSpec = TagSpec::of(TagShape::Rational { arity: Some(3) });
const LONG: TagSpec = TagSpec::of(TagShape::Long);
const TEXT: TagSpec = TagSpec::of(TagShape::Text);

const BUILTIN_TAGS: &[(&str, TagSpec)] = &[
    // EXIF
    ("Exif.Image.Software", TEXT),
    ("Exif.Image.ImageDescription", TEXT),
    ("Exif.Image.Make", TEXT),
    ("Exif.Image.Model", TEXT),
    ("Exif.Image.DateTime", TEXT),
    ("Exif.Image.Orientation", LONG),
    ("Exif.Image.ExifTag", LONG),
    ("Exif.Image.GPSTag", LONG),
    ("Exif.Photo.ExifVersion", TagSpec::of(TagShape::Bytes)),
    ("Exif.Photo.FlashpixVersion", TagSpec::of(TagShape::Bytes)),
    ("Exif.Photo.PixelXDimension", LONG),
    ("Exif.Photo.PixelYDimension", LONG),
    ("Exif.Photo.ISOSpeedRatings", LONG),
    ("Exif.Photo.DateTimeOriginal", TEXT),
    ("Exif.Photo.UserComment", TEXT),
    (
        "Exif.Photo.ExposureTime",
        TagSpec::of(TagShape::Rational { arity: Some(1) }),
    ),
    (
        "Exif.Photo.FNumber",
        TagSpec::of(TagShape::Rational { arity: Some(1) }),
    ),
    ("Exif.GPSInfo.GPSLatitude", GPS),
    ("Exif.GPSInfo.GPSLongitude", GPS),
    ("Exif.GPSInfo.GPSLatitudeRef", TEXT),
    ("Exif.GPSInfo.GPSLongitudeRef", TEXT),
    (
        "Exif.GPSInfo.GPSAltitude",
        TagSpec::of(TagShape::Rational { arity: Some(1) }),
    ),
    // IPTC
    ("Iptc.Application2.Caption", TEXT),
    ("Iptc.Application2.ObjectName", TEXT),
    ("Iptc.Application2.Copyright", TEXT),
    ("Iptc.Application2.City", TEXT),
    ("Iptc.Application2.CountryName", TEXT),
    ("Iptc.Application2.Keywords", TagSpec::repeatable(TagShape::Text)),
    ("Iptc.Application2.Byline", TagSpec::repeatable(TagShape::Text)),
    ("Iptc.Application2.ReleaseDate", TagSpec::of(TagShape::Date)),
    ("Iptc.Application2.ReleaseTime", TagSpec::of(TagShape::Time)),
    ("Iptc.Application2.DateCreated", TagSpec::of(TagShape::Date)),
    ("Iptc.Application2.TimeCreated", TagSpec::of(TagShape::Time)),
    ("Iptc.Envelope.DateSent", TagSpec::of(TagShape::Date)),
    ("Iptc.Envelope.TimeSent", TagSpec::of(TagShape::Time)),
    // XMP
    ("Xmp.dc.title", TagSpec::of(TagShape::LangAlt)),
    ("Xmp.dc.description", TagSpec::of(TagShape::LangAlt)),
    ("Xmp.dc.rights", TagSpec::of(TagShape::LangAlt)),
    ("Xmp.dc.subject", TagSpec::of(TagShape::Bag)),
    ("Xmp.dc.creator", TagSpec::of(TagShape::Bag)),
    ("Xmp.xmp.CreatorTool", TEXT),
    ("Xmp.xmp.Rating", LONG),
];
