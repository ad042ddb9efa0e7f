//! Typed EXIF, IPTC and XMP metadata for image files.
//!
//! `imagemeta-core` models each metadata family as an ordered,
//! duplicate-key-tolerant store of `(dotted key, raw payload)` entries with
//! typed read, typed write, deletion and a canonical flattening to a
//! unique-key mapping. A per-family coder converts between raw payloads and
//! semantic values (integers, UTF-8 text, exact rationals, calendar
//! timestamps, language-alternative maps, text bags) under an external,
//! frozen tag registry.
//!
//! Parsing image containers is out of scope: persistence goes through the
//! [`engine::MetadataEngine`] boundary, and the shipped
//! [`engine::SidecarEngine`] keeps records in a digest-checked JSON sidecar.

pub mod coder;
pub mod engine;
pub mod image;
pub mod registry;
pub mod store;
pub mod types;
