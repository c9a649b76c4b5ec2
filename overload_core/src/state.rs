//! Rotation persistence with file locking.
//!
//! This module handles saving and loading the rotation (days, exercises,
//! priority rules and growth settings) with proper file locking to prevent
//! concurrent access issues.

use crate::{Error, Result, Rotation};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl Rotation {
    /// Load the rotation from a file with shared locking
    ///
    /// Returns `None` if the file doesn't exist.
    /// If the file is unreadable or corrupted, logs a warning and returns `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::info!("No rotation file found at {:?}", path);
            return Ok(None);
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open rotation file {:?}: {}", path, e);
                return Ok(None);
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock rotation file {:?}: {}", path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read rotation file {:?}: {}", path, e);
            return Ok(None);
        }

        file.unlock()?;

        match serde_json::from_str::<Rotation>(&contents) {
            Ok(rotation) => {
                tracing::debug!("Loaded rotation '{}' from {:?}", rotation.name, path);
                Ok(Some(rotation))
            }
            Err(e) => {
                tracing::warn!("Failed to parse rotation file {:?}: {}", path, e);
                Ok(None)
            }
        }
    }

    /// Save the rotation to a file with exclusive locking
    ///
    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Other(format!("rotation path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        // Unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(parent)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved rotation '{}' to {:?}", self.name, path);
        Ok(())
    }

    /// Load the rotation, modify it, and save it back
    ///
    /// Fails with [`Error::NotFound`] when there is no rotation to modify.
    /// Nothing is written if `f` returns an error.
    pub fn update<T, F>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut Rotation) -> Result<T>,
    {
        let mut rotation = Self::load(path)?
            .ok_or_else(|| Error::NotFound(format!("rotation at {:?}", path)))?;
        let value = f(&mut rotation)?;
        rotation.save(path)?;
        Ok(value)
    }
}
