//! The persistence collaborator boundary.
//!
//! The store core owns no on-disk format; an engine supplies decoded records
//! on read and accepts encoded records for persistence. Engine calls are
//! fully synchronous and their errors propagate unchanged — metadata
//! corruption and permission problems are not transient, so nothing here
//! retries.

pub mod sidecar;

use std::path::PathBuf;

use thiserror::Error;

use crate::coder::{Family, RawRecord};

pub use sidecar::{SidecarEngine, SidecarFormat};

#[derive(Debug, Error)]
pub enum EngineError {
    /// Open-time, and the one error callers must be able to catch
    /// distinctly: the addressed file does not exist.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),
    /// Malformed or tampered metadata on load.
    #[error("malformed metadata in {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    /// The source holds no metadata of the requested family. Not a failure
    /// of the source itself; `Image::read_metadata` maps this to an empty
    /// store.
    #[error("no {0} metadata present")]
    NoRecords(Family),
    #[error("{0} is not writable")]
    Permission(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait MetadataEngine {
    /// All records of one family, in their original stored order.
    fn load_records(&self, family: Family) -> Result<Vec<RawRecord>, EngineError>;

    /// Replace the persisted records of one family.
    fn persist(&self, family: Family, records: &[RawRecord]) -> Result<(), EngineError>;
}
