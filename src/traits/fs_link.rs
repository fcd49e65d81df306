//! Symlink and hard link operations.

use std::path::{Path, PathBuf};

use crate::{FsError, Metadata};

/// Symlink and hard link operations.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsLink`.
pub trait FsLink {
    /// Create a symbolic link.
    ///
    /// # Arguments
    ///
    /// * `target` - The path the symlink points to (stored verbatim, need not exist)
    /// * `link` - The path where the symlink is created
    ///
    /// # Errors
    ///
    /// - [`FsError::AlreadyExists`] if `link` already exists
    /// - [`FsError::NotFound`] if parent of `link` does not exist
    fn symlink(&mut self, target: &Path, link: &Path) -> Result<(), FsError>;

    /// Create a hard link.
    ///
    /// # Arguments
    ///
    /// * `original` - The existing file to link to (followed if it is a symlink)
    /// * `link` - The path for the new hard link
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `original` does not exist
    /// - [`FsError::NotAFile`] if `original` is a directory
    /// - [`FsError::AlreadyExists`] if `link` already exists
    fn hard_link(&mut self, original: &Path, link: &Path) -> Result<(), FsError>;

    /// Read the target of a symbolic link.
    ///
    /// Returns the raw target path (not canonicalized).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `path` does not exist
    /// - [`FsError::InvalidData`] if `path` is not a symlink
    fn read_link(&self, path: &Path) -> Result<PathBuf, FsError>;

    /// Get metadata without following a terminal symlink (`lstat`).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `path` does not exist
    fn symlink_metadata(&self, path: &Path) -> Result<Metadata, FsError>;

    /// Resolve every symlink and `.`/`..` component.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if a component is missing or a symlink cycle exists
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError>;
}
