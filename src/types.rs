//! Core types exposed by the in-memory filesystem.

use std::path::PathBuf;
use std::time::SystemTime;

/// The root directory always has inode 1.
pub const ROOT_INODE: u64 = 1;

/// File type bits for a regular file (`S_IFREG`).
pub const S_IFREG: u32 = 0o100000;
/// File type bits for a directory (`S_IFDIR`).
pub const S_IFDIR: u32 = 0o040000;
/// File type bits for a symbolic link (`S_IFLNK`).
pub const S_IFLNK: u32 = 0o120000;

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

impl FileType {
    /// The `S_IF*` bits for this type.
    #[inline]
    pub const fn type_bits(self) -> u32 {
        match self {
            FileType::File => S_IFREG,
            FileType::Directory => S_IFDIR,
            FileType::Symlink => S_IFLNK,
        }
    }
}

/// Metadata for a filesystem entry, as returned by `stat` / `lstat`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Type of the entry (file, directory, symlink).
    pub file_type: FileType,
    /// Size in bytes. For symlinks, the length of the target string.
    pub size: u64,
    /// Permission bits.
    pub permissions: Permissions,
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
    /// Creation time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub created: SystemTime,
    /// Last modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub modified: SystemTime,
    /// Last access time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub accessed: SystemTime,
    /// Inode number (unique identifier within the filesystem).
    pub inode: u64,
    /// Number of hard links.
    pub nlink: u64,
}

impl Metadata {
    /// Returns `true` if this is a regular file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Returns `true` if this is a symbolic link.
    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }

    /// Full `st_mode`: type bits merged with the permission bits.
    ///
    /// ```rust
    /// use anyfs_memory::{FileType, Metadata, Permissions};
    ///
    /// let m = Metadata {
    ///     file_type: FileType::File,
    ///     permissions: Permissions::from_mode(0o777),
    ///     ..Default::default()
    /// };
    /// assert_eq!(m.mode(), 0o100777);
    /// ```
    #[inline]
    pub fn mode(&self) -> u32 {
        self.file_type.type_bits() | self.permissions.mode()
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            file_type: FileType::File,
            size: 0,
            permissions: Permissions::default_file(),
            uid: 0,
            gid: 0,
            created: SystemTime::UNIX_EPOCH,
            modified: SystemTime::UNIX_EPOCH,
            accessed: SystemTime::UNIX_EPOCH,
            inode: 0,
            nlink: 1,
        }
    }
}

/// A directory entry returned from `read_dir`.
///
/// The file type is the entry's own type; symlinks are not followed.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirEntry {
    /// Name of the entry (filename only, not full path).
    pub name: String,
    /// Full path to the entry.
    pub path: PathBuf,
    /// Type of the entry.
    pub file_type: FileType,
    /// Size in bytes.
    pub size: u64,
    /// Inode number.
    pub inode: u64,
}

/// Unix-style permissions stored as a mode bitmask.
///
/// Holds the permission, setuid/setgid and sticky bits (`0o7777`); the
/// file type bits live in [`FileType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permissions(u32);

impl Permissions {
    /// Create permissions from a Unix mode (e.g., 0o755).
    #[inline]
    pub const fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    /// Get the raw mode value.
    #[inline]
    pub const fn mode(&self) -> u32 {
        self.0
    }

    /// Returns `true` if these permissions deny writing.
    #[inline]
    pub const fn readonly(&self) -> bool {
        (self.0 & 0o222) == 0
    }

    /// Default permissions for a new file (0o644 = rw-r--r--).
    #[inline]
    pub const fn default_file() -> Self {
        Self(0o644)
    }

    /// Default permissions for a new directory (0o755 = rwxr-xr-x).
    #[inline]
    pub const fn default_dir() -> Self {
        Self(0o755)
    }

    /// Default permissions for a new symlink (0o777 = rwxrwxrwx).
    #[inline]
    pub const fn default_symlink() -> Self {
        Self(0o777)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::default_file()
    }
}

/// Serde support for SystemTime (when serde feature is enabled).
#[cfg(feature = "serde")]
pub(crate) mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_is_file() {
        let m = Metadata {
            file_type: FileType::File,
            ..Default::default()
        };
        assert!(m.is_file());
        assert!(!m.is_dir());
        assert!(!m.is_symlink());
    }

    #[test]
    fn metadata_is_dir() {
        let m = Metadata {
            file_type: FileType::Directory,
            ..Default::default()
        };
        assert!(!m.is_file());
        assert!(m.is_dir());
        assert!(!m.is_symlink());
    }

    #[test]
    fn metadata_mode_merges_type_bits() {
        let m = Metadata {
            file_type: FileType::Directory,
            permissions: Permissions::from_mode(0o700),
            ..Default::default()
        };
        assert_eq!(m.mode(), 0o040700);

        let m = Metadata {
            file_type: FileType::Symlink,
            permissions: Permissions::default_symlink(),
            ..Default::default()
        };
        assert_eq!(m.mode(), 0o120777);
    }

    #[test]
    fn permissions_from_mode_masks_type_bits() {
        let p = Permissions::from_mode(0o100755);
        assert_eq!(p.mode(), 0o755);

        let p = Permissions::from_mode(0o4755);
        assert_eq!(p.mode(), 0o4755);
    }

    #[test]
    fn permissions_readonly() {
        assert!(Permissions::from_mode(0o444).readonly());
        assert!(!Permissions::from_mode(0o644).readonly());
    }

    #[test]
    fn permissions_defaults() {
        assert_eq!(Permissions::default_file().mode(), 0o644);
        assert_eq!(Permissions::default_dir().mode(), 0o755);
        assert_eq!(Permissions::default_symlink().mode(), 0o777);
    }

    #[test]
    fn root_inode_is_one() {
        assert_eq!(ROOT_INODE, 1);
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FileType>();
        assert_send_sync::<Metadata>();
        assert_send_sync::<DirEntry>();
        assert_send_sync::<Permissions>();
    }
}
