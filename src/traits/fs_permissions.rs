//! Permission and ownership management.

use std::path::Path;

use crate::{FsError, Permissions};

/// Permission and ownership management.
///
/// Modes and owners are recorded only; no operation is ever denied
/// because of them.
///
/// Reading permissions is done via [`FsRead::metadata`](super::FsRead::metadata).
pub trait FsPermissions {
    /// Set permissions on the entry `path` points to (`chmod`).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    fn set_permissions(&mut self, path: &Path, perm: Permissions) -> Result<(), FsError>;

    /// Set permissions on a symlink itself (`lchmod`).
    ///
    /// On a non-link this behaves like [`set_permissions`](Self::set_permissions).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if symlink modes cannot be changed
    /// - [`FsError::NotFound`] if the path does not exist
    fn set_symlink_permissions(&mut self, path: &Path, perm: Permissions) -> Result<(), FsError>;

    /// Set owner and/or group of the entry `path` points to (`chown`).
    ///
    /// `None` leaves that attribute unchanged. Through a symlink chain the
    /// ultimate target changes; the links never do.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    fn set_owner(&mut self, path: &Path, uid: Option<u32>, gid: Option<u32>)
    -> Result<(), FsError>;
}
