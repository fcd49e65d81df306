use std::path::Path;
use std::time::SystemTime;

use super::MemoryFs;
use crate::node::NodeKind;
use crate::{FsError, FsWrite, TRACING_TARGET};

impl MemoryFs {
    /// Apply `update` to the content of the file at `path`, creating an
    /// empty file first if nothing is there.
    fn update_content(
        &mut self,
        path: &Path,
        operation: &'static str,
        update: impl FnOnce(&mut Vec<u8>),
    ) -> Result<(), FsError> {
        let resolved = match self.resolve(path, true) {
            Ok(resolved) => resolved,
            Err(FsError::NotFound { .. }) => {
                let create_at = self.creation_path(path)?;
                let node = self.new_file(Vec::new());
                self.create_entry(&create_at, node, operation)?;
                self.resolve(&create_at, true)?
            }
            Err(e) => return Err(e),
        };

        let node = self.node_at_mut(&resolved, path)?;
        let NodeKind::File { content } = &mut node.kind else {
            return Err(FsError::NotAFile {
                path: path.to_path_buf(),
            });
        };
        update(content);
        node.touch();
        Ok(())
    }
}

impl FsWrite for MemoryFs {
    fn write(&mut self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        tracing::debug!(target: TRACING_TARGET, path = ?path, len = data.len(), "write");
        self.update_content(path, "write", |content| {
            content.clear();
            content.extend_from_slice(data);
        })
    }

    fn append(&mut self, path: &Path, data: &[u8]) -> Result<(), FsError> {
        tracing::debug!(target: TRACING_TARGET, path = ?path, len = data.len(), "append");
        self.update_content(path, "append", |content| content.extend_from_slice(data))
    }

    fn touch_file(&mut self, path: &Path) -> Result<(), FsError> {
        match self.resolve(path, true) {
            Ok(resolved) => {
                self.node_at_mut(&resolved, path)?.touch();
                Ok(())
            }
            Err(FsError::NotFound { .. }) => {
                let create_at = self.creation_path(path)?;
                let node = self.new_file(Vec::new());
                self.create_entry(&create_at, node, "touch").map(|_| ())
            }
            Err(e) => Err(e),
        }
    }

    fn set_modified(&mut self, path: &Path, modified: SystemTime) -> Result<(), FsError> {
        let resolved = self.resolve(path, true)?;
        self.node_at_mut(&resolved, path)?.modified = modified;
        Ok(())
    }

    fn remove_file(&mut self, path: &Path) -> Result<(), FsError> {
        let resolved = self.resolve(path, false)?;
        if self.node_at(&resolved, path)?.children().is_some() {
            return Err(FsError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        tracing::debug!(target: TRACING_TARGET, path = ?path, "remove_file");
        self.unlink_entry(&resolved, path)
    }

    fn rename(&mut self, from: &Path, to: &Path) -> Result<(), FsError> {
        let source = self.resolve(from, false)?;
        let (Some(source_parent), Some(source_name)) = (source.parent(), source.name()) else {
            return Err(FsError::invalid_argument(
                from,
                "rename",
                "the root directory cannot be moved",
            ));
        };
        let (dest_parent, dest_name) = self.resolve_parent(to)?;
        let source_is_dir = self.node_at(&source, from)?.children().is_some();

        if source_is_dir && dest_parent.contains(source.ino()) {
            return Err(FsError::invalid_argument(
                to,
                "rename",
                "cannot move a directory into itself",
            ));
        }

        let cwd = self.cwd_chain();
        if let Some(existing) = self.table.lookup(dest_parent.ino(), &dest_name) {
            if existing == source.ino() {
                // Same entry, or another hard link to it: nothing to do.
                return Ok(());
            }
            let replaced = self.table.node(existing, to)?;
            match (source_is_dir, replaced.children()) {
                (true, Some(children)) if !children.is_empty() => {
                    return Err(FsError::DirectoryNotEmpty {
                        path: to.to_path_buf(),
                    });
                }
                (true, Some(_)) | (false, None) => {}
                (true, None) => return Err(FsError::not_a_directory(to)),
                (false, Some(_)) => return Err(FsError::already_exists(to, "rename")),
            }
            self.table.detach(dest_parent.ino(), &dest_name);
            self.table.unlink(existing);
            self.reanchor_cwd(cwd.as_ref(), existing, None);
        }

        let source_name = source_name.to_string();
        let ino = self
            .table
            .detach(source_parent, &source_name)
            .ok_or_else(|| FsError::not_found(from))?;
        self.table.attach(dest_parent.ino(), &dest_name, ino, to)?;
        // attach counted a new link; the old name's link moved with it.
        self.table.unlink(ino);
        let moved_to = dest_parent.path().join(&dest_name);
        self.reanchor_cwd(cwd.as_ref(), ino, Some(&moved_to));

        tracing::debug!(target: TRACING_TARGET, from = ?from, to = ?to, "rename");
        Ok(())
    }

    fn copy(&mut self, from: &Path, to: &Path) -> Result<(), FsError> {
        let source = self.resolve(from, true)?;
        let node = self.node_at(&source, from)?;
        let (content, perm) = match &node.kind {
            NodeKind::File { content } => (content.clone(), node.perm),
            NodeKind::Directory { .. } | NodeKind::Symlink { .. } => {
                return Err(FsError::NotAFile {
                    path: from.to_path_buf(),
                });
            }
        };

        match self.resolve(to, true) {
            Ok(dest) if dest.ino() == source.ino() => {
                return Err(FsError::invalid_argument(
                    to,
                    "copy",
                    "source and destination are the same file",
                ));
            }
            Ok(dest) => {
                let node = self.node_at_mut(&dest, to)?;
                let NodeKind::File { content: existing } = &mut node.kind else {
                    return Err(FsError::already_exists(to, "copy"));
                };
                *existing = content;
                node.perm = perm;
                node.touch();
            }
            Err(FsError::NotFound { .. }) => {
                let create_at = self.creation_path(to)?;
                let mut node = self.new_file(content);
                node.perm = perm;
                self.create_entry(&create_at, node, "copy")?;
            }
            Err(e) => return Err(e),
        }

        tracing::debug!(target: TRACING_TARGET, from = ?from, to = ?to, "copy");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FsDir, FsLink, FsRead};

    #[test]
    fn write_creates_and_truncates() {
        let mut fs = MemoryFs::new();
        fs.write(Path::new("/f"), b"long content").unwrap();
        fs.write(Path::new("/f"), b"short").unwrap();
        assert_eq!(fs.read(Path::new("/f")).unwrap(), b"short");
    }

    #[test]
    fn write_into_missing_parent_leaves_nothing() {
        let mut fs = MemoryFs::new();
        let err = fs.write(Path::new("/missing/f"), b"x").unwrap_err();
        assert!(matches!(err, FsError::NotFound { .. }));
        assert_eq!(fs.entry_count(), 1);
    }

    #[test]
    fn append_extends() {
        let mut fs = MemoryFs::new();
        fs.append(Path::new("/log"), b"a").unwrap();
        fs.append(Path::new("/log"), b"b").unwrap();
        assert_eq!(fs.read(Path::new("/log")).unwrap(), b"ab");
    }

    #[test]
    fn touch_preserves_content_and_bumps_mtime() {
        let mut fs = MemoryFs::new();
        fs.write(Path::new("/f"), b"keep").unwrap();
        fs.set_modified(Path::new("/f"), SystemTime::UNIX_EPOCH).unwrap();

        fs.touch_file(Path::new("/f")).unwrap();
        let m = fs.metadata(Path::new("/f")).unwrap();
        assert!(m.modified > SystemTime::UNIX_EPOCH);
        assert_eq!(fs.read(Path::new("/f")).unwrap(), b"keep");
    }

    #[test]
    fn remove_file_removes_link_not_target() {
        let mut fs = MemoryFs::new();
        fs.write(Path::new("/f"), b"x").unwrap();
        fs.symlink(Path::new("/f"), Path::new("/l")).unwrap();

        fs.remove_file(Path::new("/l")).unwrap();
        assert!(fs.exists(Path::new("/f")).unwrap());
        assert!(fs.symlink_metadata(Path::new("/l")).is_err());
    }

    #[test]
    fn remove_file_refuses_directory() {
        let mut fs = MemoryFs::new();
        fs.create_dir(Path::new("/d")).unwrap();
        let err = fs.remove_file(Path::new("/d")).unwrap_err();
        assert!(matches!(err, FsError::NotAFile { .. }));
    }

    #[test]
    fn rename_keeps_identity() {
        let mut fs = MemoryFs::new();
        fs.write(Path::new("/a"), b"x").unwrap();
        let before = fs.metadata(Path::new("/a")).unwrap();

        fs.rename(Path::new("/a"), Path::new("/b")).unwrap();
        let after = fs.metadata(Path::new("/b")).unwrap();
        assert_eq!(before.inode, after.inode);
        assert_eq!(after.nlink, 1);
        assert!(!fs.exists(Path::new("/a")).unwrap());
    }

    #[test]
    fn rename_replaces_file() {
        let mut fs = MemoryFs::new();
        fs.write(Path::new("/a"), b"new").unwrap();
        fs.write(Path::new("/b"), b"old").unwrap();

        fs.rename(Path::new("/a"), Path::new("/b")).unwrap();
        assert_eq!(fs.read(Path::new("/b")).unwrap(), b"new");
        assert_eq!(fs.entry_count(), 2);
    }

    #[test]
    fn rename_directory_into_itself_fails() {
        let mut fs = MemoryFs::new();
        fs.create_dir_all(Path::new("/d/sub")).unwrap();
        let err = fs
            .rename(Path::new("/d"), Path::new("/d/sub/d"))
            .unwrap_err();
        assert!(matches!(err, FsError::InvalidArgument { .. }));
    }

    #[test]
    fn rename_directory_over_non_empty_directory_fails() {
        let mut fs = MemoryFs::new();
        fs.create_dir(Path::new("/a")).unwrap();
        fs.create_dir_all(Path::new("/b/child")).unwrap();
        let err = fs.rename(Path::new("/a"), Path::new("/b")).unwrap_err();
        assert!(matches!(err, FsError::DirectoryNotEmpty { .. }));
    }

    #[test]
    fn rename_root_fails() {
        let mut fs = MemoryFs::new();
        let err = fs.rename(Path::new("/"), Path::new("/x")).unwrap_err();
        assert!(matches!(err, FsError::InvalidArgument { .. }));
    }

    #[test]
    fn copy_onto_itself_fails() {
        let mut fs = MemoryFs::new();
        fs.write(Path::new("/f"), b"x").unwrap();
        let err = fs.copy(Path::new("/f"), Path::new("/f")).unwrap_err();
        assert!(matches!(err, FsError::InvalidArgument { .. }));
    }

    #[test]
    fn copy_is_not_aliased() {
        let mut fs = MemoryFs::new();
        fs.write(Path::new("/f"), b"orig").unwrap();
        fs.copy(Path::new("/f"), Path::new("/g")).unwrap();
        fs.write(Path::new("/g"), b"changed").unwrap();

        assert_eq!(fs.read(Path::new("/f")).unwrap(), b"orig");
        assert_ne!(
            fs.metadata(Path::new("/f")).unwrap().inode,
            fs.metadata(Path::new("/g")).unwrap().inode
        );
    }
}
