//! # Extension Traits
//!
//! Convenience queries on top of the primitive traits.
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`is_file`](FsExt::is_file) | Check if path is a regular file |
//! | [`is_dir`](FsExt::is_dir) | Check if path is a directory |
//! | [`is_symlink`](FsExt::is_symlink) | Check if path itself is a symlink |
//! | [`file_size`](FsExt::file_size) | Size of the entry a path points to |
//!
//! ## JSON Support (Feature-Gated)
//!
//! With the `serde` feature enabled, `read_json` and `write_json` are
//! available through `FsExtJson`:
//!
//! ```toml
//! [dependencies]
//! anyfs-memory = { version = "0.1", features = ["serde"] }
//! ```

use std::path::Path;

use crate::{FsError, FsLink, FsRead, Metadata};

/// Map "nothing there" to `Ok(None)`.
fn lookup(result: Result<Metadata, FsError>) -> Result<Option<Metadata>, FsError> {
    match result {
        Ok(m) => Ok(Some(m)),
        Err(FsError::NotFound { .. } | FsError::NotADirectory { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Extension methods for any backend with read and link support.
///
/// Each predicate returns `Ok(false)` when the path does not exist.
///
/// # Example
///
/// ```rust
/// use anyfs_memory::{FsError, FsExt, FsLink, FsWrite, MemoryFs};
/// use std::path::Path;
///
/// let mut fs = MemoryFs::new();
/// fs.write(Path::new("/config.json"), b"{}")?;
/// fs.symlink(Path::new("/config.json"), Path::new("/current"))?;
///
/// assert!(fs.is_file(Path::new("/current"))?);
/// assert!(fs.is_symlink(Path::new("/current"))?);
/// assert!(!fs.is_dir(Path::new("/missing"))?);
/// # Ok::<(), FsError>(())
/// ```
pub trait FsExt: FsRead + FsLink {
    /// Check if the path points to a regular file, following symlinks.
    fn is_file(&self, path: &Path) -> Result<bool, FsError> {
        Ok(lookup(self.metadata(path))?.is_some_and(|m| m.is_file()))
    }

    /// Check if the path points to a directory, following symlinks.
    fn is_dir(&self, path: &Path) -> Result<bool, FsError> {
        Ok(lookup(self.metadata(path))?.is_some_and(|m| m.is_dir()))
    }

    /// Check if the path itself is a symbolic link.
    ///
    /// A dangling link still counts.
    fn is_symlink(&self, path: &Path) -> Result<bool, FsError> {
        Ok(lookup(self.symlink_metadata(path))?.is_some_and(|m| m.is_symlink()))
    }

    /// Get the size in bytes of the entry a path points to.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::NotFound`] if the path doesn't exist.
    fn file_size(&self, path: &Path) -> Result<u64, FsError> {
        Ok(self.metadata(path)?.size)
    }
}

impl<B: FsRead + FsLink + ?Sized> FsExt for B {}

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use crate::Fs;
    use serde::{Serialize, de::DeserializeOwned};

    /// JSON serialization extension methods.
    ///
    /// Available when the `serde` feature is enabled.
    pub trait FsExtJson: Fs {
        /// Read a file and deserialize it as JSON.
        ///
        /// # Errors
        ///
        /// - `FsError::NotFound` if the file doesn't exist
        /// - `FsError::InvalidData` if the file isn't valid UTF-8
        /// - `FsError::Deserialization` if JSON parsing failed
        fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, FsError> {
            let data = self.read_to_string(path)?;
            serde_json::from_str(&data).map_err(|e| FsError::Deserialization(e.to_string()))
        }

        /// Serialize a value and write it as pretty-printed JSON.
        ///
        /// # Errors
        ///
        /// - `FsError::Serialization` if JSON serialization failed
        /// - Other `FsError` variants from the underlying `write()` call
        fn write_json<T: Serialize>(&mut self, path: &Path, value: &T) -> Result<(), FsError> {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| FsError::Serialization(e.to_string()))?;
            self.write(path, json.as_bytes())
        }
    }

    impl<B: Fs + ?Sized> FsExtJson for B {}
}

#[cfg(feature = "serde")]
pub use json::FsExtJson;
