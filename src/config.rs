//! Configuration for a [`MemoryFs`](crate::MemoryFs) instance.

use crate::Permissions;

/// Configuration applied when a [`MemoryFs`](crate::MemoryFs) is created or reset.
///
/// Setters take `&mut self` and return `&mut Self` so they can be chained:
///
/// ```rust
/// use anyfs_memory::{FsConfig, MemoryFs};
///
/// let mut config = FsConfig::default();
/// config.owner(1000, 1000).supports_symlink_permissions(true);
///
/// let fs = MemoryFs::with_config(config);
/// assert!(fs.supports_symlink_permissions());
/// ```
///
/// ## Defaults
///
/// - `owner`: uid 0, gid 0
/// - `file_mode`: 0o644
/// - `dir_mode`: 0o755
/// - `symlink_mode`: 0o777
/// - `supports_symlink_permissions`: false (`lchmod` unavailable, as on Linux)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FsConfig {
    /// Owner assigned to new entries
    pub(crate) uid: u32,
    /// Group assigned to new entries
    pub(crate) gid: u32,
    /// Mode for files created by `touch`, `write` and friends
    pub(crate) file_mode: Permissions,
    /// Mode for directories created by `mkdir`
    pub(crate) dir_mode: Permissions,
    /// Mode for new symlinks
    pub(crate) symlink_mode: Permissions,
    /// Whether a symlink's own mode bits may be changed
    pub(crate) supports_symlink_permissions: bool,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            uid: 0,
            gid: 0,
            file_mode: Permissions::default_file(),
            dir_mode: Permissions::default_dir(),
            symlink_mode: Permissions::default_symlink(),
            supports_symlink_permissions: false,
        }
    }
}

impl FsConfig {
    /// Set the uid and gid given to every new entry, including the root.
    pub fn owner(&mut self, uid: u32, gid: u32) -> &mut Self {
        self.uid = uid;
        self.gid = gid;
        self
    }

    /// Set the permission bits of newly created regular files.
    pub fn file_mode(&mut self, mode: u32) -> &mut Self {
        self.file_mode = Permissions::from_mode(mode);
        self
    }

    /// Set the permission bits of newly created directories.
    pub fn dir_mode(&mut self, mode: u32) -> &mut Self {
        self.dir_mode = Permissions::from_mode(mode);
        self
    }

    /// Set the permission bits of newly created symlinks.
    pub fn symlink_mode(&mut self, mode: u32) -> &mut Self {
        self.symlink_mode = Permissions::from_mode(mode);
        self
    }

    /// Declare whether changing a symlink's own mode is supported.
    ///
    /// When disabled, `chmod` on a symlink leaves both the link and its
    /// target untouched.
    pub fn supports_symlink_permissions(&mut self, value: bool) -> &mut Self {
        self.supports_symlink_permissions = value;
        self
    }
}
