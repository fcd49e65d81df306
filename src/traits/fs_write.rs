//! Write operations.

use std::path::Path;
use std::time::SystemTime;

use crate::FsError;

/// Write operations.
///
/// Mutating methods take `&mut self`: a filesystem has a single owner and
/// no locking discipline.
pub trait FsWrite {
    /// Write data to a file, creating or truncating it.
    ///
    /// Writing through a symlink writes its target. Hard links observe the
    /// new contents.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the parent directory does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    fn write(&mut self, path: &Path, data: &[u8]) -> Result<(), FsError>;

    /// Append data to a file, creating it if missing.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the parent directory does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    fn append(&mut self, path: &Path, data: &[u8]) -> Result<(), FsError>;

    /// Create an empty file, or update the modification time of an existing entry.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the parent directory does not exist
    fn touch_file(&mut self, path: &Path) -> Result<(), FsError>;

    /// Set the modification time of the entry `path` points to.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    fn set_modified(&mut self, path: &Path, modified: SystemTime) -> Result<(), FsError>;

    /// Remove a file or symlink. The symlink itself is removed, not its target.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    fn remove_file(&mut self, path: &Path) -> Result<(), FsError>;

    /// Move an entry within the tree without copying data.
    ///
    /// A terminal symlink at `from` is moved as a link. An existing
    /// non-directory at `to` is replaced; an existing empty directory is
    /// replaced by a directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `from` or the parent of `to` does not exist
    /// - [`FsError::InvalidArgument`] if moving the root, or a directory into itself
    /// - [`FsError::NotADirectory`] if a directory would replace a non-directory
    /// - [`FsError::AlreadyExists`] if a non-directory would replace a directory
    /// - [`FsError::DirectoryNotEmpty`] if the replaced directory has children
    fn rename(&mut self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// Copy a file's contents and permission bits. Never creates a hard link.
    ///
    /// An existing destination file is overwritten in place.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `from` does not exist
    /// - [`FsError::NotAFile`] if `from` is a directory
    /// - [`FsError::InvalidArgument`] if `from` and `to` are the same file
    /// - [`FsError::AlreadyExists`] if `to` is a directory
    fn copy(&mut self, from: &Path, to: &Path) -> Result<(), FsError>;
}
