// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! File-per-key tier implementation.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use bytes::Bytes;
use stow_tier::{Error, StorageTier};
use tempfile::NamedTempFile;

use crate::naming::{component_name, file_name_for_key};

/// A durable tier storing one file per key inside a namespace directory.
///
/// The tier itself performs blocking I/O and does no scheduling; the stow
/// store only ever drives it from its work queue, which runs writes one at a
/// time.
#[derive(Debug, Clone)]
pub struct DiskTier {
    root: PathBuf,
}

impl DiskTier {
    /// Opens (creating if needed) the directory for `namespace` under `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `namespace` is empty or the directory cannot be created.
    pub fn open(base_dir: impl AsRef<Path>, namespace: &str) -> io::Result<Self> {
        if namespace.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "cache namespace must not be empty"));
        }
        Self::at(base_dir.as_ref().join(component_name(namespace)))
    }

    /// Opens (creating if needed) `root` itself as the entry directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn at(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the namespace directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the file holding `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(file_name_for_key(key))
    }

    fn write_atomically(&self, path: &Path, value: &[u8]) -> io::Result<()> {
        // The directory may have been removed behind our back.
        fs::create_dir_all(&self.root)?;
        let mut staged = NamedTempFile::new_in(&self.root)?;
        staged.write_all(value)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl StorageTier for DiskTier {
    fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
        match fs::read(self.path_for(key)) {
            Ok(contents) => Ok(Some(Bytes::from(contents))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn insert(&self, key: &str, value: Bytes) -> Result<(), Error> {
        let path = self.path_for(key);
        self.write_atomically(&path, &value)?;
        tracing::trace!(path = %path.display(), len = value.len(), "entry file written");
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<(), Error> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), Error> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&self.root)?;
        tracing::trace!(root = %self.root.display(), "namespace directory recreated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_empty_namespace() {
        let base = tempfile::tempdir().expect("tempdir");
        let err = DiskTier::open(base.path(), "").expect_err("empty namespace must be rejected");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn open_escapes_namespace() {
        let base = tempfile::tempdir().expect("tempdir");
        let tier = DiskTier::open(base.path(), "../escape").expect("open");
        assert_eq!(tier.root(), base.path().join("%2E.%2Fescape"));
        assert!(tier.root().is_dir());
    }
}
