//! Directory operations.

use std::path::Path;

use crate::{DirEntry, FsError};

/// Directory operations.
pub trait FsDir {
    /// List directory contents in insertion order.
    ///
    /// `path` is followed if it is a symlink; the listed entries are not.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotADirectory`] if the path is not a directory
    fn read_dir(&self, path: &Path) -> Result<ReadDirIter, FsError>;

    /// Create a directory (parent must exist).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if parent directory does not exist
    /// - [`FsError::AlreadyExists`] if the path already exists
    fn create_dir(&mut self, path: &Path) -> Result<(), FsError>;

    /// Create a directory and all missing parent directories.
    ///
    /// This is idempotent - succeeds if the directory already exists.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if a component of the path exists but is not a directory
    fn create_dir_all(&mut self, path: &Path) -> Result<(), FsError>;

    /// Remove an empty directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotADirectory`] if the path is not a directory
    /// - [`FsError::DirectoryNotEmpty`] if the directory is not empty
    /// - [`FsError::InvalidArgument`] if the path is the root
    fn remove_dir(&mut self, path: &Path) -> Result<(), FsError>;

    /// Remove a directory and all its contents.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotADirectory`] if the path is not a directory
    /// - [`FsError::InvalidArgument`] if the path is the root
    fn remove_dir_all(&mut self, path: &Path) -> Result<(), FsError>;
}

/// Iterator over directory entries.
///
/// - Outer `Result` (from [`FsDir::read_dir`]) = "can I open this directory?"
/// - Inner `Result` (per item) = "can I read this entry?"
///
/// # Example
///
/// ```rust
/// use anyfs_memory::{FsDir, FsError, FsWrite, MemoryFs};
/// use std::path::Path;
///
/// let mut fs = MemoryFs::new();
/// fs.write(Path::new("/b"), b"")?;
/// fs.write(Path::new("/a"), b"")?;
///
/// let names: Vec<String> = fs
///     .read_dir(Path::new("/"))?
///     .collect_all()?
///     .into_iter()
///     .map(|e| e.name)
///     .collect();
/// assert_eq!(names, ["b", "a"]);
/// # Ok::<(), FsError>(())
/// ```
pub struct ReadDirIter(Box<dyn Iterator<Item = Result<DirEntry, FsError>> + Send + 'static>);

impl ReadDirIter {
    /// Create from any compatible iterator.
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<DirEntry, FsError>> + Send + 'static,
    {
        Self(Box::new(iter))
    }

    /// Create from a pre-collected vector.
    pub fn from_vec(entries: Vec<Result<DirEntry, FsError>>) -> Self {
        Self(Box::new(entries.into_iter()))
    }

    /// Collect all entries, short-circuiting on first error.
    pub fn collect_all(self) -> Result<Vec<DirEntry>, FsError> {
        self.collect()
    }
}

impl Iterator for ReadDirIter {
    type Item = Result<DirEntry, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileType;
    use std::path::PathBuf;

    fn entry(name: &str) -> DirEntry {
        DirEntry {
            name: name.into(),
            path: PathBuf::from("/").join(name),
            file_type: FileType::File,
            size: 0,
            inode: 2,
        }
    }

    #[test]
    fn read_dir_iter_from_vec() {
        let iter = ReadDirIter::from_vec(vec![Ok(entry("a")), Ok(entry("b"))]);
        let collected: Vec<_> = iter.collect();
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn read_dir_iter_collect_all_error() {
        let entries = vec![
            Ok(entry("a")),
            Err(FsError::NotFound {
                path: PathBuf::from("/b"),
            }),
        ];
        let result = ReadDirIter::from_vec(entries).collect_all();
        assert!(matches!(result, Err(FsError::NotFound { .. })));
    }
}
