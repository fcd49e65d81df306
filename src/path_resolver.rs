//! # Path Resolver
//!
//! Turns path strings into located entries of the inode arena.
//!
//! ## Responsibility
//! - Walk components from the root (absolute) or the working directory (relative)
//! - Follow intermediate symlinks always, the terminal one only in follow mode
//! - Detect symlink cycles and report them as not-found
//!
//! ## Dependencies
//! - [`InodeTable`] for node lookups
//! - [`FsError`] for error handling

use std::path::{Component, Path, PathBuf};

use crate::node::{Ino, InodeTable, NodeKind};
use crate::{FsError, ROOT_INODE, TRACING_TARGET};

/// A located entry: the chain of `(name, inode)` pairs from the root down.
///
/// The chain is physical. Every element before the last is a directory, and
/// `..` pops the chain, so the parent of any resolved entry is known without
/// parent pointers in the arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Resolved {
    chain: Vec<(String, Ino)>,
}

impl Resolved {
    /// The root directory.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn ino(&self) -> Ino {
        self.chain.last().map_or(ROOT_INODE, |(_, ino)| *ino)
    }

    pub fn is_root(&self) -> bool {
        self.chain.is_empty()
    }

    /// Inode of the directory holding this entry; `None` for the root.
    pub fn parent(&self) -> Option<Ino> {
        match self.chain.len() {
            0 => None,
            1 => Some(ROOT_INODE),
            n => Some(self.chain[n - 2].1),
        }
    }

    /// Leaf name of this entry; `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.chain.last().map(|(name, _)| name.as_str())
    }

    /// Returns `true` if `ino` is this entry or one of its ancestors.
    pub fn contains(&self, ino: Ino) -> bool {
        ino == ROOT_INODE || self.chain.iter().any(|(_, i)| *i == ino)
    }

    /// Canonical absolute path of this entry.
    pub fn path(&self) -> PathBuf {
        self.prefix_path(self.chain.len())
    }

    /// Index of `ino` in the chain. The root is not part of the chain.
    pub fn position(&self, ino: Ino) -> Option<usize> {
        self.chain.iter().position(|(_, i)| *i == ino)
    }

    /// Path of the ancestor made of the first `len` chain elements.
    pub fn prefix_path(&self, len: usize) -> PathBuf {
        let mut path = PathBuf::from("/");
        for (name, _) in self.chain.iter().take(len) {
            path.push(name);
        }
        path
    }

    /// This entry's path with the element at `index` relocated to `to`.
    pub fn rebase(&self, index: usize, to: &Path) -> PathBuf {
        let mut path = to.to_path_buf();
        for (name, _) in self.chain.iter().skip(index + 1) {
            path.push(name);
        }
        path
    }

    fn push(&mut self, name: &str, ino: Ino) {
        self.chain.push((name.to_string(), ino));
    }

    fn pop(&mut self) {
        self.chain.pop();
    }
}

/// Resolves paths against one filesystem tree and working directory.
pub(crate) struct PathResolver<'a> {
    table: &'a InodeTable,
    cwd: &'a Path,
}

impl<'a> PathResolver<'a> {
    pub fn new(table: &'a InodeTable, cwd: &'a Path) -> Self {
        Self { table, cwd }
    }

    /// Locate the entry named by `path`.
    ///
    /// With `follow` set a terminal symlink is dereferenced, so the result is
    /// never a symlink. Without it the link itself is returned (`lstat`).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] - a component is missing, or a symlink cycle was found
    /// - [`FsError::NotADirectory`] - an intermediate component is not a
    ///   directory, or the path ends in `/` and does not name one
    pub fn resolve(&self, path: &Path, follow: bool) -> Result<Resolved, FsError> {
        if path.as_os_str().is_empty() {
            return Err(FsError::not_found(path));
        }
        // A trailing separator dereferences the last component, as in POSIX.
        let trailing = ends_with_separator(path);
        let mut expanding = Vec::new();
        let base = self.base(path, &mut expanding)?;
        let resolved = self.walk(base, path, follow || trailing, &mut expanding, path)?;
        if trailing && self.table.node(resolved.ino(), path)?.children().is_none() {
            return Err(FsError::not_a_directory(path));
        }
        Ok(resolved)
    }

    /// Locate the directory that would hold `path`, plus the leaf name.
    ///
    /// Every component but the last is resolved (following symlinks); the
    /// last one need not exist.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] - the parent does not exist
    /// - [`FsError::NotADirectory`] - the parent is not a directory
    /// - [`FsError::InvalidArgument`] - the path ends in `/`, `.` or `..`
    pub fn resolve_parent(&self, path: &Path) -> Result<(Resolved, String), FsError> {
        let mut components: Vec<Component<'_>> = path.components().collect();
        let name = match components.pop() {
            Some(Component::Normal(name)) => name
                .to_str()
                .ok_or_else(|| non_utf8(path))?
                .to_string(),
            _ => {
                return Err(FsError::invalid_argument(
                    path,
                    "resolve",
                    "path does not end in a file name",
                ));
            }
        };

        let parent_path: PathBuf = if components.is_empty() {
            PathBuf::from(".")
        } else {
            components.iter().collect()
        };

        let mut expanding = Vec::new();
        let base = self.base(&parent_path, &mut expanding)?;
        let parent = self.walk(base, &parent_path, true, &mut expanding, path)?;
        match self.table.node(parent.ino(), path)?.kind {
            NodeKind::Directory { .. } => Ok((parent, name)),
            _ => Err(FsError::not_a_directory(path)),
        }
    }

    /// Starting point for `path`: the root, or the working directory.
    fn base(&self, path: &Path, expanding: &mut Vec<PathBuf>) -> Result<Resolved, FsError> {
        if path.has_root() {
            Ok(Resolved::root())
        } else {
            self.walk(Resolved::root(), self.cwd, true, expanding, self.cwd)
        }
    }

    fn walk(
        &self,
        mut current: Resolved,
        path: &Path,
        follow: bool,
        expanding: &mut Vec<PathBuf>,
        origin: &Path,
    ) -> Result<Resolved, FsError> {
        let components: Vec<Component<'_>> = path.components().collect();
        let count = components.len();

        for (index, component) in components.into_iter().enumerate() {
            let is_last = index + 1 == count;
            match component {
                Component::Prefix(_) => {}
                Component::RootDir => current = Resolved::root(),
                Component::CurDir => {}
                Component::ParentDir => {
                    self.expect_directory(&current, origin)?;
                    current.pop();
                }
                Component::Normal(name) => {
                    let name = name.to_str().ok_or_else(|| non_utf8(origin))?;
                    let dir = self.expect_directory(&current, origin)?;
                    let child = dir
                        .get(name)
                        .copied()
                        .ok_or_else(|| FsError::not_found(origin))?;

                    match &self.table.node(child, origin)?.kind {
                        NodeKind::Symlink { target } if follow || !is_last => {
                            let link_path = current.path().join(name);
                            if expanding.contains(&link_path) {
                                tracing::trace!(
                                    target: TRACING_TARGET,
                                    link = ?link_path,
                                    "symlink cycle"
                                );
                                return Err(FsError::not_found(origin));
                            }
                            tracing::trace!(
                                target: TRACING_TARGET,
                                link = ?link_path,
                                to = ?target,
                                "follow symlink"
                            );
                            expanding.push(link_path);
                            current = self.walk(current, target, true, expanding, origin)?;
                            expanding.pop();
                        }
                        _ => current.push(name, child),
                    }
                }
            }
        }

        Ok(current)
    }

    fn expect_directory(
        &self,
        current: &Resolved,
        origin: &Path,
    ) -> Result<&'a indexmap::IndexMap<String, Ino>, FsError> {
        self.table
            .node(current.ino(), origin)?
            .children()
            .ok_or_else(|| FsError::not_a_directory(origin))
    }
}

/// `Path::components` drops a trailing `/`, so look at the raw bytes.
fn ends_with_separator(path: &Path) -> bool {
    path.as_os_str().as_encoded_bytes().last() == Some(&b'/')
}

fn non_utf8(path: &Path) -> FsError {
    FsError::InvalidData {
        path: path.to_path_buf(),
        details: "path is not valid UTF-8".into(),
    }
}
