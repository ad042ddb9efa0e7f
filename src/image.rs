//! The owning handle binding one engine to one store per family.

use std::path::Path;

use log::debug;

use crate::coder::{ExifCoder, Family, IptcCoder, RawRecord, XmpCoder};
use crate::engine::{EngineError, MetadataEngine, SidecarEngine};
use crate::registry::TagRegistry;
use crate::store::MetadataStore;

/// One opened image: an engine plus an EXIF, an IPTC and an XMP store.
///
/// The stores live exactly as long as the handle; nothing retains entries
/// past it. Stores start empty — call [`read_metadata`](Image::read_metadata)
/// to populate them and [`write_metadata`](Image::write_metadata) to persist
/// mutations back through the engine.
#[derive(Debug)]
pub struct Image<E: MetadataEngine = SidecarEngine> {
    engine: E,
    exif: MetadataStore<ExifCoder>,
    iptc: MetadataStore<IptcCoder>,
    xmp: MetadataStore<XmpCoder>,
}

impl Image<SidecarEngine> {
    /// Open an image with the sidecar engine. Fails with
    /// [`EngineError::FileNotFound`] when `path` does not exist; no store is
    /// constructed in that case.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Ok(Image::with_engine(SidecarEngine::open(path)?))
    }
}

impl<E: MetadataEngine> Image<E> {
    pub fn with_engine(engine: E) -> Self {
        let registry = TagRegistry::builtin();
        Image {
            engine,
            exif: MetadataStore::new(ExifCoder::new(registry.clone())),
            iptc: MetadataStore::new(IptcCoder::new(registry.clone())),
            xmp: MetadataStore::new(XmpCoder::new(registry)),
        }
    }

    /// Load all three families from the engine. A family the source simply
    /// does not carry resets to an empty store; every other engine error
    /// propagates unchanged.
    pub fn read_metadata(&mut self) -> Result<(), EngineError> {
        self.exif
            .replace_records(fetch(&self.engine, Family::Exif)?);
        self.iptc
            .replace_records(fetch(&self.engine, Family::Iptc)?);
        self.xmp.replace_records(fetch(&self.engine, Family::Xmp)?);
        debug!(
            "read metadata: {} exif, {} iptc, {} xmp entries",
            self.exif.len(),
            self.iptc.len(),
            self.xmp.len(),
        );
        Ok(())
    }

    /// Persist all three families in their current entry order.
    pub fn write_metadata(&self) -> Result<(), EngineError> {
        self.engine.persist(Family::Exif, self.exif.records())?;
        self.engine.persist(Family::Iptc, self.iptc.records())?;
        self.engine.persist(Family::Xmp, self.xmp.records())?;
        Ok(())
    }

    pub fn exif_data(&mut self) -> &mut MetadataStore<ExifCoder> {
        &mut self.exif
    }

    pub fn iptc_data(&mut self) -> &mut MetadataStore<IptcCoder> {
        &mut self.iptc
    }

    pub fn xmp_data(&mut self) -> &mut MetadataStore<XmpCoder> {
        &mut self.xmp
    }

    pub fn exif(&self) -> &MetadataStore<ExifCoder> {
        &self.exif
    }

    pub fn iptc(&self) -> &MetadataStore<IptcCoder> {
        &self.iptc
    }

    pub fn xmp(&self) -> &MetadataStore<XmpCoder> {
        &self.xmp
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

fn fetch<E: MetadataEngine>(engine: &E, family: Family) -> Result<Vec<RawRecord>, EngineError> {
    match engine.load_records(family) {
        Ok(records) => Ok(records),
        Err(EngineError::NoRecords(_)) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}
