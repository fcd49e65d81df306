use std::io::{Cursor, Read};
use std::path::Path;

use super::MemoryFs;
use crate::node::NodeKind;
use crate::{FsError, FsRead, Metadata};

impl MemoryFs {
    fn file_content(&self, path: &Path) -> Result<&[u8], FsError> {
        let resolved = self.resolve(path, true)?;
        match &self.node_at(&resolved, path)?.kind {
            NodeKind::File { content } => Ok(content),
            NodeKind::Directory { .. } | NodeKind::Symlink { .. } => Err(FsError::NotAFile {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl FsRead for MemoryFs {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        self.file_content(path).map(<[u8]>::to_vec)
    }

    fn exists(&self, path: &Path) -> Result<bool, FsError> {
        match self.resolve(path, true) {
            Ok(_) => Ok(true),
            Err(FsError::NotFound { .. } | FsError::NotADirectory { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn metadata(&self, path: &Path) -> Result<Metadata, FsError> {
        let resolved = self.resolve(path, true)?;
        Ok(self.node_at(&resolved, path)?.metadata(resolved.ino()))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError> {
        let data = self.read(path)?;
        Ok(Box::new(Cursor::new(data)))
    }
}
