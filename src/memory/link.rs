use std::path::{Path, PathBuf};

use super::MemoryFs;
use crate::node::NodeKind;
use crate::{FsError, FsLink, Metadata, TRACING_TARGET};

impl FsLink for MemoryFs {
    fn symlink(&mut self, target: &Path, link: &Path) -> Result<(), FsError> {
        let node = self.new_symlink(target.to_path_buf());
        self.create_entry(link, node, "symlink")?;
        tracing::debug!(target: TRACING_TARGET, link = ?link, to = ?target, "symlink");
        Ok(())
    }

    fn hard_link(&mut self, original: &Path, link: &Path) -> Result<(), FsError> {
        let source = self.resolve(original, true)?;
        if !matches!(self.node_at(&source, original)?.kind, NodeKind::File { .. }) {
            return Err(FsError::NotAFile {
                path: original.to_path_buf(),
            });
        }
        let (parent, name) = self.resolve_parent(link)?;
        let ino = source.ino();
        self.link_entry(&parent, &name, link, "hard_link", |_| ino)?;
        Ok(())
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf, FsError> {
        let resolved = self.resolve(path, false)?;
        match &self.node_at(&resolved, path)?.kind {
            NodeKind::Symlink { target } => Ok(target.clone()),
            NodeKind::File { .. } | NodeKind::Directory { .. } => Err(FsError::InvalidData {
                path: path.to_path_buf(),
                details: "not a symbolic link".into(),
            }),
        }
    }

    fn symlink_metadata(&self, path: &Path) -> Result<Metadata, FsError> {
        let resolved = self.resolve(path, false)?;
        Ok(self.node_at(&resolved, path)?.metadata(resolved.ino()))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError> {
        Ok(self.resolve(path, true)?.path())
    }
}
