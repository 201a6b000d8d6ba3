use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;
use crate::data::types::PriceObservation;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a valid dataset: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize dataset for {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} was rewritten by another run (revision {found}, loaded {loaded})")]
    Conflict {
        path: PathBuf,
        loaded: u64,
        found: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMetadata {
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub total_records: usize,
    /// Bumped on every persist; used to detect a concurrent writer.
    #[serde(default)]
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryDataset {
    pub metadata: Option<HistoryMetadata>,
    #[serde(default)]
    pub observations: Vec<PriceObservation>,
}

impl HistoryDataset {
    pub fn empty() -> Self {
        Self {
            metadata: None,
            observations: Vec::new(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.metadata.as_ref().map_or(0, |m| m.revision)
    }
}

/// The append-only observation history.
///
/// `load`, then any number of `append`s, then `persist`. Prior records are
/// never touched; `persist` replaces the file in one rename.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    dataset: HistoryDataset,
    loaded_revision: u64,
}

impl HistoryStore {
    /// A missing or blank file is a first run, not an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let dataset = read_json::<HistoryDataset>(&path)?.unwrap_or_else(HistoryDataset::empty);
        let loaded_revision = dataset.revision();

        info!(
            "Loaded {} historical records from {} (revision {})",
            dataset.observations.len(),
            path.display(),
            loaded_revision
        );

        Ok(Self {
            path,
            dataset,
            loaded_revision,
        })
    }

    pub fn append(&mut self, batch: impl IntoIterator<Item = PriceObservation>) {
        self.dataset.observations.extend(batch);
    }

    pub fn dataset(&self) -> &HistoryDataset {
        &self.dataset
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.dataset.observations
    }

    pub fn persist(&mut self) -> Result<(), PersistenceError> {
        // Single-writer is the deal with the scheduler; check it anyway
        // rather than silently dropping someone else's batch.
        let on_disk = read_json::<HistoryDataset>(&self.path)?
            .map_or(0, |d| d.revision());
        if on_disk != self.loaded_revision {
            return Err(PersistenceError::Conflict {
                path: self.path.clone(),
                loaded: self.loaded_revision,
                found: on_disk,
            });
        }

        let now = Utc::now();
        let revision = self.loaded_revision + 1;
        let created = self.dataset.metadata.as_ref().map_or(now, |m| m.created);
        self.dataset.metadata = Some(HistoryMetadata {
            created,
            last_updated: now,
            total_records: self.dataset.observations.len(),
            revision,
        });

        write_json_atomic(&self.path, &self.dataset)?;
        self.loaded_revision = revision;

        info!(
            "Saved to {} ({} total records)",
            self.path.display(),
            self.dataset.observations.len()
        );
        Ok(())
    }
}

/// `Ok(None)` when the file does not exist or holds only whitespace.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if contents.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| PersistenceError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

/// Write to a temp file beside `path`, fsync, then rename over `path`.
/// A crash at any point leaves either the old or the new content.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| PersistenceError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    let write_err = |source: std::io::Error| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(&json).map_err(write_err)?;
    tmp.write_all(b"\n").map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}
