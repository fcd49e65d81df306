//! Error types for the in-memory filesystem.

use std::path::{Path, PathBuf};

/// Filesystem error type with contextual variants.
///
/// Every variant that concerns an entry carries the path as the caller spelled
/// it, so failures deep inside a recursive operation still name the entry
/// that caused them.
///
/// # Examples
///
/// ```rust
/// use anyfs_memory::FsError;
/// use std::path::PathBuf;
///
/// let err = FsError::NotFound { path: PathBuf::from("/missing") };
/// assert!(err.to_string().contains("/missing"));
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// A path component, or the final target, does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Destination occupied and no overwrite was requested.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: PathBuf,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Expected a regular file but found something else.
    #[error("not a file: {path}")]
    NotAFile {
        /// The path that is not a file.
        path: PathBuf,
    },

    /// An intermediate component, or a required destination, is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: PathBuf,
    },

    /// Non-recursive removal of a directory that still has children.
    #[error("directory not empty: {path}")]
    DirectoryNotEmpty {
        /// The path to the non-empty directory.
        path: PathBuf,
    },

    /// Structurally nonsensical input, such as copying a file onto itself.
    #[error("{operation}: invalid argument: {path} ({reason})")]
    InvalidArgument {
        /// The path the operation was given.
        path: PathBuf,
        /// The operation that rejected its input.
        operation: &'static str,
        /// Why the input was rejected.
        reason: &'static str,
    },

    /// Entry contents do not have the expected shape.
    #[error("invalid data: {path} ({details})")]
    InvalidData {
        /// The path with invalid data.
        path: PathBuf,
        /// Details about the invalid data.
        details: String,
    },

    /// The operation is not supported by this filesystem instance.
    #[error("operation not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: &'static str,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// The path attached to this error, if the variant carries one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            FsError::NotFound { path }
            | FsError::AlreadyExists { path, .. }
            | FsError::NotAFile { path }
            | FsError::NotADirectory { path }
            | FsError::DirectoryNotEmpty { path }
            | FsError::InvalidArgument { path, .. }
            | FsError::InvalidData { path, .. }
            | FsError::Io { path, .. } => Some(path),
            FsError::NotSupported { .. }
            | FsError::Serialization(_)
            | FsError::Deserialization(_) => None,
        }
    }

    pub(crate) fn not_found(path: &Path) -> Self {
        FsError::NotFound {
            path: path.to_path_buf(),
        }
    }

    pub(crate) fn not_a_directory(path: &Path) -> Self {
        FsError::NotADirectory {
            path: path.to_path_buf(),
        }
    }

    pub(crate) fn already_exists(path: &Path, operation: &'static str) -> Self {
        FsError::AlreadyExists {
            path: path.to_path_buf(),
            operation,
        }
    }

    pub(crate) fn invalid_argument(
        path: &Path,
        operation: &'static str,
        reason: &'static str,
    ) -> Self {
        FsError::InvalidArgument {
            path: path.to_path_buf(),
            operation,
            reason,
        }
    }
}

impl From<std::io::Error> for FsError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound {
                path: PathBuf::new(),
            },
            std::io::ErrorKind::AlreadyExists => FsError::AlreadyExists {
                path: PathBuf::new(),
                operation: "io",
            },
            _ => FsError::Io {
                operation: "io",
                path: PathBuf::new(),
                source: error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_error_not_found_display() {
        let err = FsError::NotFound {
            path: PathBuf::from("/missing"),
        };
        assert_eq!(err.to_string(), "not found: /missing");
    }

    #[test]
    fn fs_error_already_exists_display() {
        let err = FsError::already_exists(Path::new("/exists"), "mkdir");
        assert_eq!(err.to_string(), "mkdir: already exists: /exists");
    }

    #[test]
    fn fs_error_invalid_argument_display() {
        let err = FsError::invalid_argument(Path::new("/f"), "cp", "same file");
        assert_eq!(err.to_string(), "cp: invalid argument: /f (same file)");
    }

    #[test]
    fn fs_error_path_accessor() {
        let err = FsError::not_a_directory(Path::new("/file"));
        assert_eq!(err.path(), Some(Path::new("/file")));

        let err = FsError::NotSupported { operation: "lchmod" };
        assert_eq!(err.path(), None);
    }

    #[test]
    fn fs_error_from_io_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let fs_err = FsError::from(io_err);
        assert!(matches!(fs_err, FsError::NotFound { .. }));
    }

    #[test]
    fn fs_error_from_io_already_exists() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AlreadyExists, "test");
        let fs_err = FsError::from(io_err);
        assert!(matches!(fs_err, FsError::AlreadyExists { .. }));
    }

    #[test]
    fn fs_error_from_io_other() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "test");
        let fs_err = FsError::from(io_err);
        assert!(matches!(fs_err, FsError::Io { .. }));
    }
}
