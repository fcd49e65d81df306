//! # Entry Tree
//!
//! Inode arena holding every entry of a [`MemoryFs`](crate::MemoryFs).
//!
//! ## Responsibility
//! - Own the nodes (files, directories, symlinks) keyed by inode number
//! - Maintain directory child maps and hard-link counts
//!
//! Directory entries store inode numbers, never references. A regular file
//! reachable under several names is one node whose `nlink` counts those
//! names; the node is dropped from the arena when the count reaches zero.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use indexmap::IndexMap;

use crate::{FileType, FsError, Metadata, Permissions, ROOT_INODE};

/// Inode number addressing a node in the arena.
pub(crate) type Ino = u64;

/// Variant-specific payload of a node.
#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    File { content: Vec<u8> },
    Directory { children: IndexMap<String, Ino> },
    Symlink { target: PathBuf },
}

/// A single entry: payload plus the attributes every variant shares.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub kind: NodeKind,
    pub perm: Permissions,
    pub uid: u32,
    pub gid: u32,
    pub created: SystemTime,
    pub modified: SystemTime,
    pub accessed: SystemTime,
    pub nlink: u64,
}

impl Node {
    fn with_kind(kind: NodeKind, perm: Permissions, uid: u32, gid: u32) -> Self {
        let now = SystemTime::now();
        Self {
            kind,
            perm,
            uid,
            gid,
            created: now,
            modified: now,
            accessed: now,
            nlink: 0,
        }
    }

    pub fn file(content: Vec<u8>, perm: Permissions, uid: u32, gid: u32) -> Self {
        Self::with_kind(NodeKind::File { content }, perm, uid, gid)
    }

    pub fn directory(perm: Permissions, uid: u32, gid: u32) -> Self {
        Self::with_kind(
            NodeKind::Directory {
                children: IndexMap::new(),
            },
            perm,
            uid,
            gid,
        )
    }

    pub fn symlink(target: PathBuf, perm: Permissions, uid: u32, gid: u32) -> Self {
        Self::with_kind(NodeKind::Symlink { target }, perm, uid, gid)
    }

    pub fn file_type(&self) -> FileType {
        match self.kind {
            NodeKind::File { .. } => FileType::File,
            NodeKind::Directory { .. } => FileType::Directory,
            NodeKind::Symlink { .. } => FileType::Symlink,
        }
    }

    pub fn size(&self) -> u64 {
        match &self.kind {
            NodeKind::File { content } => content.len() as u64,
            NodeKind::Directory { .. } => 0,
            NodeKind::Symlink { target } => target.as_os_str().len() as u64,
        }
    }

    pub fn children(&self) -> Option<&IndexMap<String, Ino>> {
        match &self.kind {
            NodeKind::Directory { children } => Some(children),
            _ => None,
        }
    }

    /// Bump the modification time to now.
    pub fn touch(&mut self) {
        let now = SystemTime::now();
        self.modified = now;
        self.accessed = now;
    }

    pub fn metadata(&self, ino: Ino) -> Metadata {
        Metadata {
            file_type: self.file_type(),
            size: self.size(),
            permissions: self.perm,
            uid: self.uid,
            gid: self.gid,
            created: self.created,
            modified: self.modified,
            accessed: self.accessed,
            inode: ino,
            nlink: self.nlink,
        }
    }
}

/// Arena of nodes keyed by inode number.
#[derive(Debug)]
pub(crate) struct InodeTable {
    nodes: HashMap<Ino, Node>,
    next_ino: Ino,
}

impl InodeTable {
    /// Create a table whose only node is `root`, stored at [`ROOT_INODE`].
    pub fn new(mut root: Node) -> Self {
        root.nlink = 1;
        let mut nodes = HashMap::new();
        nodes.insert(ROOT_INODE, root);
        Self {
            nodes,
            next_ino: ROOT_INODE + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, ino: Ino) -> Option<&Node> {
        self.nodes.get(&ino)
    }

    /// Look up a node, reporting `path` if the inode is gone.
    pub fn node(&self, ino: Ino, path: &Path) -> Result<&Node, FsError> {
        self.nodes.get(&ino).ok_or_else(|| FsError::not_found(path))
    }

    pub fn node_mut(&mut self, ino: Ino, path: &Path) -> Result<&mut Node, FsError> {
        self.nodes
            .get_mut(&ino)
            .ok_or_else(|| FsError::not_found(path))
    }

    /// Store a new, not yet linked node and return its inode number.
    pub fn allocate(&mut self, node: Node) -> Ino {
        let ino = self.next_ino;
        self.next_ino += 1;
        self.nodes.insert(ino, node);
        ino
    }

    pub fn lookup(&self, dir: Ino, name: &str) -> Option<Ino> {
        self.get(dir)
            .and_then(Node::children)
            .and_then(|children| children.get(name).copied())
    }

    /// Add `name -> ino` to directory `dir` and count the new link.
    pub fn attach(&mut self, dir: Ino, name: &str, ino: Ino, path: &Path) -> Result<(), FsError> {
        let parent = self.node_mut(dir, path)?;
        let NodeKind::Directory { children } = &mut parent.kind else {
            return Err(FsError::not_a_directory(path));
        };
        if children.contains_key(name) {
            return Err(FsError::already_exists(path, "link"));
        }
        children.insert(name.to_string(), ino);
        parent.touch();

        if let Some(node) = self.nodes.get_mut(&ino) {
            node.nlink = node.nlink.saturating_add(1);
        }
        Ok(())
    }

    /// Remove `name` from directory `dir` without touching the child's link count.
    ///
    /// The remaining children keep their insertion order.
    pub fn detach(&mut self, dir: Ino, name: &str) -> Option<Ino> {
        let parent = self.nodes.get_mut(&dir)?;
        let NodeKind::Directory { children } = &mut parent.kind else {
            return None;
        };
        let ino = children.shift_remove(name)?;
        parent.touch();
        Some(ino)
    }

    /// Drop one link to `ino`, freeing it (and any subtree) when none remain.
    pub fn unlink(&mut self, ino: Ino) {
        let mut pending = vec![ino];
        while let Some(ino) = pending.pop() {
            let Some(node) = self.nodes.get_mut(&ino) else {
                continue;
            };
            node.nlink = node.nlink.saturating_sub(1);
            if node.nlink > 0 || ino == ROOT_INODE {
                continue;
            }
            if let Some(node) = self.nodes.remove(&ino) {
                if let NodeKind::Directory { children } = node.kind {
                    pending.extend(children.into_values());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> InodeTable {
        InodeTable::new(Node::directory(Permissions::default_dir(), 0, 0))
    }

    fn file(content: &[u8]) -> Node {
        Node::file(content.to_vec(), Permissions::default_file(), 0, 0)
    }

    #[test]
    fn attach_and_lookup() {
        let mut t = table();
        let ino = t.allocate(file(b"x"));
        t.attach(ROOT_INODE, "a", ino, Path::new("/a")).unwrap();

        assert_eq!(t.lookup(ROOT_INODE, "a"), Some(ino));
        assert_eq!(t.get(ino).unwrap().nlink, 1);
    }

    #[test]
    fn attach_rejects_duplicate_name() {
        let mut t = table();
        let a = t.allocate(file(b""));
        let b = t.allocate(file(b""));
        t.attach(ROOT_INODE, "a", a, Path::new("/a")).unwrap();

        let err = t.attach(ROOT_INODE, "a", b, Path::new("/a")).unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists { .. }));
    }

    #[test]
    fn attach_into_file_is_not_a_directory() {
        let mut t = table();
        let f = t.allocate(file(b""));
        t.attach(ROOT_INODE, "f", f, Path::new("/f")).unwrap();
        let g = t.allocate(file(b""));

        let err = t.attach(f, "g", g, Path::new("/f/g")).unwrap_err();
        assert!(matches!(err, FsError::NotADirectory { .. }));
    }

    #[test]
    fn detach_preserves_insertion_order() {
        let mut t = table();
        for name in ["c", "a", "b"] {
            let ino = t.allocate(file(b""));
            t.attach(ROOT_INODE, name, ino, Path::new(name)).unwrap();
        }
        t.detach(ROOT_INODE, "c");

        let children = t.get(ROOT_INODE).unwrap().children().unwrap();
        let names: Vec<_> = children.keys().cloned().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn unlink_frees_only_at_zero() {
        let mut t = table();
        let ino = t.allocate(file(b"shared"));
        t.attach(ROOT_INODE, "a", ino, Path::new("/a")).unwrap();
        t.attach(ROOT_INODE, "b", ino, Path::new("/b")).unwrap();
        assert_eq!(t.get(ino).unwrap().nlink, 2);

        t.detach(ROOT_INODE, "a");
        t.unlink(ino);
        assert_eq!(t.get(ino).unwrap().nlink, 1);

        t.detach(ROOT_INODE, "b");
        t.unlink(ino);
        assert!(t.get(ino).is_none());
    }

    #[test]
    fn unlink_directory_frees_subtree() {
        let mut t = table();
        let dir = t.allocate(Node::directory(Permissions::default_dir(), 0, 0));
        t.attach(ROOT_INODE, "d", dir, Path::new("/d")).unwrap();
        let f = t.allocate(file(b"x"));
        t.attach(dir, "f", f, Path::new("/d/f")).unwrap();
        assert_eq!(t.len(), 3);

        t.detach(ROOT_INODE, "d");
        t.unlink(dir);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn symlink_size_is_target_length() {
        let node = Node::symlink(PathBuf::from("/abc"), Permissions::default_symlink(), 0, 0);
        assert_eq!(node.size(), 4);
        assert_eq!(node.file_type(), FileType::Symlink);
    }
}
