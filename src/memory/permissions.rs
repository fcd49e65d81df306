use std::path::Path;

use super::MemoryFs;
use crate::{FsError, FsPermissions, Permissions, TRACING_TARGET};

impl FsPermissions for MemoryFs {
    fn set_permissions(&mut self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        let resolved = self.resolve(path, true)?;
        self.node_at_mut(&resolved, path)?.perm = perm;
        tracing::debug!(target: TRACING_TARGET, path = ?path, mode = perm.mode(), "chmod");
        Ok(())
    }

    fn set_symlink_permissions(&mut self, path: &Path, perm: Permissions) -> Result<(), FsError> {
        if !self.supports_symlink_permissions() {
            return Err(FsError::NotSupported {
                operation: "lchmod",
            });
        }
        let resolved = self.resolve(path, false)?;
        self.node_at_mut(&resolved, path)?.perm = perm;
        tracing::debug!(target: TRACING_TARGET, path = ?path, mode = perm.mode(), "lchmod");
        Ok(())
    }

    fn set_owner(
        &mut self,
        path: &Path,
        uid: Option<u32>,
        gid: Option<u32>,
    ) -> Result<(), FsError> {
        let resolved = self.resolve(path, true)?;
        let node = self.node_at_mut(&resolved, path)?;
        if let Some(uid) = uid {
            node.uid = uid;
        }
        if let Some(gid) = gid {
            node.gid = gid;
        }
        tracing::debug!(target: TRACING_TARGET, path = ?path, ?uid, ?gid, "chown");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FsLink, FsRead, FsWrite};

    #[test]
    fn set_permissions_follows_symlink() {
        let mut fs = MemoryFs::new();
        fs.write(Path::new("/f"), b"").unwrap();
        fs.symlink(Path::new("/f"), Path::new("/l")).unwrap();

        fs.set_permissions(Path::new("/l"), Permissions::from_mode(0o600))
            .unwrap();
        assert_eq!(fs.metadata(Path::new("/f")).unwrap().permissions.mode(), 0o600);
        assert_eq!(
            fs.symlink_metadata(Path::new("/l")).unwrap().permissions.mode(),
            0o777
        );
    }

    #[test]
    fn set_symlink_permissions_requires_capability() {
        let mut fs = MemoryFs::new();
        fs.symlink(Path::new("/f"), Path::new("/l")).unwrap();
        let err = fs
            .set_symlink_permissions(Path::new("/l"), Permissions::from_mode(0o700))
            .unwrap_err();
        assert!(matches!(err, FsError::NotSupported { .. }));

        fs.set_supports_symlink_permissions(true);
        fs.set_symlink_permissions(Path::new("/l"), Permissions::from_mode(0o700))
            .unwrap();
        assert_eq!(
            fs.symlink_metadata(Path::new("/l")).unwrap().permissions.mode(),
            0o700
        );
    }

    #[test]
    fn set_owner_leaves_none_unchanged() {
        let mut fs = MemoryFs::new();
        fs.write(Path::new("/f"), b"").unwrap();
        fs.set_owner(Path::new("/f"), Some(5), Some(6)).unwrap();
        fs.set_owner(Path::new("/f"), None, Some(9)).unwrap();

        let m = fs.metadata(Path::new("/f")).unwrap();
        assert_eq!((m.uid, m.gid), (5, 9));
    }

    #[test]
    fn set_owner_on_missing_is_not_found() {
        let mut fs = MemoryFs::new();
        let err = fs.set_owner(Path::new("/nope"), Some(1), None).unwrap_err();
        assert!(matches!(err, FsError::NotFound { .. }));
    }
}
