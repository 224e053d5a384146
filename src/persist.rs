//! Atomic persistence of rewritten configuration files.
//!
//! New content is written to a uniquely named temporary file in the target's
//! directory and renamed onto the target. The rename is the only point at which
//! the target changes, so readers see either the old or the new file. A failure
//! before the rename leaves the target untouched; the temporary file is removed
//! when its handle drops.

use crate::error::ConfError;
use std::fs::{self, File, Permissions};
use std::io::{self, Write};
use std::path::Path;
use tempfile::Builder;
use tracing::{info, warn};

/// Prefix of temporary files created next to the target.
pub const DEFAULT_TEMP_PREFIX: &str = "aa_temp";

/// Mode for files that did not exist before: owner read/write only, since
/// configuration files may hold credentials.
pub const OWNER_ONLY_MODE: u32 = 0o600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicPersister {
    temp_prefix: String,
    default_mode: u32,
}

impl Default for AtomicPersister {
    fn default() -> Self {
        Self::new(DEFAULT_TEMP_PREFIX, OWNER_ONLY_MODE)
    }
}

impl AtomicPersister {
    pub fn new(temp_prefix: impl Into<String>, default_mode: u32) -> Self {
        Self {
            temp_prefix: temp_prefix.into(),
            default_mode,
        }
    }

    pub fn temp_prefix(&self) -> &str {
        &self.temp_prefix
    }

    pub fn default_mode(&self) -> u32 {
        self.default_mode
    }

    /// Replace `path` with `lines`.
    ///
    /// `reference` holds the permissions of the file being replaced (see
    /// [`source_permissions`]); when absent the default owner-only mode is used.
    pub fn commit(
        &self,
        path: &Path,
        lines: &[String],
        reference: Option<&Permissions>,
    ) -> Result<(), ConfError> {
        self.commit_inner(path, lines, reference, None::<fn(&Path) -> io::Result<()>>)
    }

    fn commit_inner<F>(
        &self,
        path: &Path,
        lines: &[String],
        reference: Option<&Permissions>,
        before_rename: Option<F>,
    ) -> Result<(), ConfError>
    where
        F: FnOnce(&Path) -> io::Result<()>,
    {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = Builder::new()
            .prefix(&self.temp_prefix)
            .tempfile_in(parent)
            .map_err(|e| ConfError::persist(path, e))?;

        match reference {
            Some(permissions) => temp
                .as_file()
                .set_permissions(permissions.clone())
                .map_err(|e| ConfError::persist(path, e))?,
            None => self.apply_default_mode(temp.as_file(), path)?,
        }

        let file = temp.as_file_mut();
        for line in lines {
            file.write_all(line.as_bytes())
                .map_err(|e| ConfError::persist(path, e))?;
        }
        file.flush().map_err(|e| ConfError::persist(path, e))?;
        file.sync_data().map_err(|e| ConfError::persist(path, e))?;

        if let Some(hook) = before_rename {
            hook(temp.path()).map_err(|e| ConfError::persist(path, e))?;
        }

        temp.persist(path)
            .map_err(|e| ConfError::persist(path, e.error))?;

        if let Err(e) = fsync_dir(parent) {
            warn!(dir = %parent.display(), error = %e, "Failed to fsync config directory");
        }

        info!(
            path = %path.display(),
            lines = lines.len(),
            "Committed configuration file"
        );
        Ok(())
    }

    #[cfg(unix)]
    fn apply_default_mode(&self, file: &File, path: &Path) -> Result<(), ConfError> {
        use std::os::unix::fs::PermissionsExt;

        file.set_permissions(Permissions::from_mode(self.default_mode))
            .map_err(|e| ConfError::persist(path, e))
    }

    #[cfg(not(unix))]
    fn apply_default_mode(&self, _file: &File, _path: &Path) -> Result<(), ConfError> {
        Ok(())
    }
}

/// Permissions of the file at `path`, or `None` if it does not exist.
pub fn source_permissions(path: &Path) -> Result<Option<Permissions>, ConfError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfError::persist(path, e)),
    }
}

fn fsync_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        File::open(dir)?.sync_all()?;
    }

    #[cfg(not(unix))]
    {
        let _ = dir;
    }

    Ok(())
}
