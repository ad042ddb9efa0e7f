//! JSON sidecar engine: one `<image>.meta.json` per image holding all three
//! families, integrity-checked with a content digest.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::coder::{Family, RawRecord};

use super::{EngineError, MetadataEngine};

/// Sidecar format header. Explicit and serialized so a future format bump
/// is a data change, not a guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarFormat {
    pub version: String,
    pub hash_algorithm: String,
}

impl SidecarFormat {
    pub fn v1() -> Self {
        Self {
            version: "1".into(),
            hash_algorithm: "sha256".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SidecarDoc {
    format: SidecarFormat,
    created_at: DateTime<Utc>, // informational only
    records_digest: String,
    families: BTreeMap<Family, Vec<RawRecord>>,
}

/// Engine persisting metadata next to the image file rather than inside it.
///
/// Opening only checks that the image exists; a missing sidecar simply means
/// no metadata yet. Writes are atomic: temp file, fsync, rename.
#[derive(Debug, Clone)]
pub struct SidecarEngine {
    image_path: PathBuf,
    sidecar_path: PathBuf,
}

impl SidecarEngine {
    pub fn open(image_path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let image_path = image_path.as_ref().to_path_buf();
        if !image_path.exists() {
            return Err(EngineError::FileNotFound(image_path));
        }
        let sidecar_path = append_suffix(&image_path, ".meta.json");
        Ok(SidecarEngine {
            image_path,
            sidecar_path,
        })
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn sidecar_path(&self) -> &Path {
        &self.sidecar_path
    }

    /// Read and verify the sidecar document; `None` when no sidecar exists.
    fn read_doc(&self) -> Result<Option<SidecarDoc>, EngineError> {
        let file = match fs::File::open(&self.sidecar_path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no sidecar at {}", self.sidecar_path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let doc: SidecarDoc =
            serde_json::from_reader(file).map_err(|e| self.decode_error(e.to_string()))?;

        // Verify integrity by recomputing the digest over the stored records.
        let expected = records_digest(&doc.families).map_err(|e| self.decode_error(e.to_string()))?;
        if expected != doc.records_digest {
            return Err(self.decode_error(format!(
                "records digest mismatch: sidecar says {}, records hash to {}",
                doc.records_digest, expected,
            )));
        }

        for records in doc.families.values() {
            if records.iter().any(|r| r.key.is_empty()) {
                return Err(self.decode_error("record with empty key".into()));
            }
        }
        Ok(Some(doc))
    }

    fn decode_error(&self, reason: String) -> EngineError {
        EngineError::Decode {
            path: self.sidecar_path.clone(),
            reason,
        }
    }
}

impl MetadataEngine for SidecarEngine {
    fn load_records(&self, family: Family) -> Result<Vec<RawRecord>, EngineError> {
        let Some(doc) = self.read_doc()? else {
            return Err(EngineError::NoRecords(family));
        };
        match doc.families.get(&family) {
            Some(records) if !records.is_empty() => {
                debug!(
                    "loaded {} {family} records from {}",
                    records.len(),
                    self.sidecar_path.display(),
                );
                Ok(records.clone())
            }
            _ => Err(EngineError::NoRecords(family)),
        }
    }

    fn persist(&self, family: Family, records: &[RawRecord]) -> Result<(), EngineError> {
        let mut families = match self.read_doc()? {
            Some(doc) => doc.families,
            None => BTreeMap::new(),
        };
        if records.is_empty() {
            families.remove(&family);
        } else {
            families.insert(family, records.to_vec());
        }

        let records_digest =
            records_digest(&families).map_err(|e| self.decode_error(e.to_string()))?;
        let doc = SidecarDoc {
            format: SidecarFormat::v1(),
            created_at: Utc::now(),
            records_digest,
            families,
        };

        let tmp_path = append_suffix(&self.sidecar_path, ".tmp");
        let file = fs::File::create(&tmp_path).map_err(|e| classify_io(e, &self.sidecar_path))?;
        serde_json::to_writer_pretty(&file, &doc)
            .map_err(|e| EngineError::Io(std::io::Error::new(ErrorKind::InvalidData, e)))?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.sidecar_path)
            .map_err(|e| classify_io(e, &self.sidecar_path))?;

        debug!(
            "persisted {} {family} records to {}",
            records.len(),
            self.sidecar_path.display(),
        );
        Ok(())
    }
}

fn records_digest(
    families: &BTreeMap<Family, Vec<RawRecord>>,
) -> Result<String, serde_json::Error> {
    // BTreeMap keys and record order make this serialization canonical.
    let canonical = serde_json::to_vec(families)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}

fn classify_io(err: std::io::Error, path: &Path) -> EngineError {
    if err.kind() == ErrorKind::PermissionDenied {
        EngineError::Permission(path.to_path_buf())
    } else {
        EngineError::Io(err)
    }
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}
