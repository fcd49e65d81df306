//! Read operations.

use std::io::Read;
use std::path::Path;

use crate::{FsError, Metadata};

/// Read operations.
///
/// Every method follows symlinks, including a terminal one.
pub trait FsRead {
    /// Read entire file contents as bytes.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError>;

    /// Read file contents as UTF-8 string.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    /// - [`FsError::InvalidData`] if the file contains invalid UTF-8
    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| FsError::InvalidData {
            path: path.to_path_buf(),
            details: "file contents are not valid UTF-8".into(),
        })
    }

    /// Check if a path exists.
    ///
    /// A dangling symlink does not exist. Missing or non-directory
    /// intermediate components yield `Ok(false)`.
    fn exists(&self, path: &Path) -> Result<bool, FsError>;

    /// Get metadata of the entry `path` points to (`stat`).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotADirectory`] if an intermediate component is not a directory
    fn metadata(&self, path: &Path) -> Result<Metadata, FsError>;

    /// Open a file as a content stream.
    ///
    /// The stream is a snapshot; later writes are not visible through it.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_read_is_object_safe() {
        fn _check(_: &dyn FsRead) {}
    }
}
