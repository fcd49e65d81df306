use std::path::{Component, Path, PathBuf};

use super::MemoryFs;
use crate::{DirEntry, FsDir, FsError, ReadDirIter, TRACING_TARGET};

impl MemoryFs {
    /// Resolve `path` without following and make sure it is a removable directory.
    fn removable_dir(&self, path: &Path) -> Result<crate::path_resolver::Resolved, FsError> {
        let resolved = self.resolve(path, false)?;
        if self.node_at(&resolved, path)?.children().is_none() {
            return Err(FsError::not_a_directory(path));
        }
        if resolved.is_root() {
            return Err(FsError::invalid_argument(
                path,
                "remove_dir",
                "the root directory cannot be removed",
            ));
        }
        Ok(resolved)
    }
}

impl FsDir for MemoryFs {
    fn read_dir(&self, path: &Path) -> Result<ReadDirIter, FsError> {
        let resolved = self.resolve(path, true)?;
        let children = self
            .node_at(&resolved, path)?
            .children()
            .ok_or_else(|| FsError::not_a_directory(path))?;

        let entries = children
            .iter()
            .map(|(name, &ino)| {
                let node = self.table.node(ino, path)?;
                Ok(DirEntry {
                    name: name.clone(),
                    path: path.join(name),
                    file_type: node.file_type(),
                    size: node.size(),
                    inode: ino,
                })
            })
            .collect();
        Ok(ReadDirIter::from_vec(entries))
    }

    fn create_dir(&mut self, path: &Path) -> Result<(), FsError> {
        let node = self.new_dir();
        self.create_entry(path, node, "create_dir").map(|_| ())
    }

    fn create_dir_all(&mut self, path: &Path) -> Result<(), FsError> {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            if !matches!(component, Component::Normal(_)) {
                continue;
            }
            match self.resolve(&current, true) {
                Ok(resolved) => {
                    if self.node_at(&resolved, &current)?.children().is_none() {
                        return Err(FsError::not_a_directory(&current));
                    }
                }
                Err(FsError::NotFound { .. }) => {
                    let node = self.new_dir();
                    self.create_entry(&current, node, "create_dir_all")?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn remove_dir(&mut self, path: &Path) -> Result<(), FsError> {
        let resolved = self.removable_dir(path)?;
        let is_empty = self
            .node_at(&resolved, path)?
            .children()
            .is_some_and(|children| children.is_empty());
        if !is_empty {
            return Err(FsError::DirectoryNotEmpty {
                path: path.to_path_buf(),
            });
        }
        tracing::debug!(target: TRACING_TARGET, path = ?path, "remove_dir");
        self.unlink_entry(&resolved, path)
    }

    fn remove_dir_all(&mut self, path: &Path) -> Result<(), FsError> {
        let resolved = self.removable_dir(path)?;
        tracing::debug!(target: TRACING_TARGET, path = ?path, "remove_dir_all");
        self.unlink_entry(&resolved, path)
    }
}
