//! Configuration store
//!
//! Entry point for applications: binds a dialect and a base directory and runs
//! one read-modify-write cycle per call. Nothing is cached between calls; every
//! [`ConfigStore::write`] re-reads the target so the merge works against the
//! file as it is on disk.

use crate::document::RawDocument;
use crate::error::ConfError;
use crate::merge::merge_with_stats;
use crate::model::{ConfigModel, Dialect};
use crate::persist::{source_permissions, AtomicPersister};
use crate::reader;
use crate::settings::StoreSettings;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    dialect: Dialect,
    base_dir: PathBuf,
    persister: AtomicPersister,
}

impl ConfigStore {
    pub fn new(dialect: Dialect, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            dialect,
            base_dir: base_dir.into(),
            persister: AtomicPersister::default(),
        }
    }

    pub fn from_settings(settings: &StoreSettings) -> Self {
        Self::new(settings.dialect, settings.base_dir.clone()).with_persister(
            AtomicPersister::new(settings.temp_prefix.clone(), settings.default_mode),
        )
    }

    pub fn with_persister(mut self, persister: AtomicPersister) -> Self {
        self.persister = persister;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Empty model of the store's dialect.
    pub fn new_config(&self) -> ConfigModel {
        ConfigModel::new(self.dialect)
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }

    pub fn read(&self, filename: &str) -> Result<ConfigModel, ConfError> {
        self.read_document(filename).map(|(model, _)| model)
    }

    /// Read a file and keep its raw lines for a later [`write_document`](Self::write_document).
    pub fn read_document(&self, filename: &str) -> Result<(ConfigModel, RawDocument), ConfError> {
        reader::read(&self.path_for(filename), self.dialect)
    }

    /// Like [`read`](Self::read), but a missing file yields an empty model.
    pub fn read_or_new(&self, filename: &str) -> Result<ConfigModel, ConfError> {
        match self.read(filename) {
            Err(e) if e.is_not_found() => Ok(self.new_config()),
            other => other,
        }
    }

    /// Write `model` to `filename`, preserving the formatting of the file on disk.
    /// A missing file is created.
    pub fn write(&self, filename: &str, model: &ConfigModel) -> Result<(), ConfError> {
        let path = self.path_for(filename);
        let raw = match reader::read(&path, self.dialect) {
            Ok((_, raw)) => raw,
            Err(ConfError::NotFound(_)) => RawDocument::empty(self.dialect),
            Err(e) => return Err(e),
        };
        self.commit(&path, &raw, model)
    }

    /// Write `model` against a snapshot captured by an earlier
    /// [`read_document`](Self::read_document).
    pub fn write_document(
        &self,
        filename: &str,
        raw: RawDocument,
        model: &ConfigModel,
    ) -> Result<(), ConfError> {
        self.commit(&self.path_for(filename), &raw, model)
    }

    fn commit(&self, path: &Path, raw: &RawDocument, model: &ConfigModel) -> Result<(), ConfError> {
        if model.dialect() != self.dialect {
            return Err(ConfError::DialectMismatch {
                expected: self.dialect,
                found: model.dialect(),
            });
        }

        let (lines, stats) = merge_with_stats(raw, model)?;
        debug!(
            path = %path.display(),
            rewritten = stats.rewritten,
            dropped = stats.dropped,
            appended = stats.appended,
            "Writing configuration"
        );
        let reference = source_permissions(path)?;
        self.persister.commit(path, &lines, reference.as_ref())
    }

    /// First path in the whitespace-separated `candidates` that is a regular file.
    pub fn find_first_file(candidates: &str) -> Option<PathBuf> {
        candidates
            .split_whitespace()
            .map(PathBuf::from)
            .find(|path| path.is_file())
    }

    /// First path in the whitespace-separated `candidates` that is a directory.
    pub fn find_first_dir(candidates: &str) -> Option<PathBuf> {
        candidates
            .split_whitespace()
            .map(PathBuf::from)
            .find(|path| path.is_dir())
    }
}
