//! # Memory Filesystem
//!
//! [`MemoryFs`] owns the entry tree, the working directory and the
//! configuration. The trait implementations live in the sibling modules,
//! one per trait.

mod dir;
mod link;
mod permissions;
mod read;
mod write;

use std::path::{Path, PathBuf};

use crate::node::{Ino, InodeTable, Node, NodeKind};
use crate::path_resolver::{PathResolver, Resolved};
use crate::{FsConfig, FsError, TRACING_TARGET};

/// Maximum number of dangling symlinks followed when creating through a link.
const MAX_SYMLINK_DEPTH: usize = 40;

/// An in-memory filesystem with POSIX-like semantics.
///
/// The root directory `/` is created on construction and can never be
/// removed. The working directory starts at `/`.
///
/// # Example
///
/// ```rust
/// use anyfs_memory::{FileUtils, FsError, FsExt, FsRead, MemoryFs};
/// use std::path::Path;
///
/// let mut fs = MemoryFs::new();
/// fs.mkdir_p(&["/a/b/c"])?;
/// assert!(fs.is_dir(Path::new("/a/b"))?);
///
/// fs.touch(&["/a/f"])?;
/// fs.chmod(0o777, &["/a/f"])?;
/// assert_eq!(fs.metadata(Path::new("/a/f"))?.mode(), 0o100777);
/// # Ok::<(), FsError>(())
/// ```
#[derive(Debug)]
pub struct MemoryFs {
    table: InodeTable,
    cwd: PathBuf,
    config: FsConfig,
}

impl MemoryFs {
    /// Create an empty filesystem with the default configuration.
    pub fn new() -> Self {
        Self::with_config(FsConfig::default())
    }

    /// Create an empty filesystem with the given configuration.
    pub fn with_config(config: FsConfig) -> Self {
        let root = Node::directory(config.dir_mode, config.uid, config.gid);
        Self {
            table: InodeTable::new(root),
            cwd: PathBuf::from("/"),
            config,
        }
    }

    /// The configuration this filesystem was created with.
    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// Whether a symlink's own mode bits can be changed.
    pub fn supports_symlink_permissions(&self) -> bool {
        self.config.supports_symlink_permissions
    }

    /// Toggle the symlink-mode capability.
    pub fn set_supports_symlink_permissions(&mut self, value: bool) {
        self.config.supports_symlink_permissions = value;
    }

    /// Discard every entry and return to an empty root with cwd `/`.
    ///
    /// The configuration is kept.
    pub fn reset(&mut self) {
        tracing::info!(target: TRACING_TARGET, entries = self.table.len(), "reset");
        let root = Node::directory(self.config.dir_mode, self.config.uid, self.config.gid);
        self.table = InodeTable::new(root);
        self.cwd = PathBuf::from("/");
    }

    /// Number of live entries, the root included.
    ///
    /// Hard links to one file count once.
    pub fn entry_count(&self) -> usize {
        self.table.len()
    }

    /// The current working directory, as an absolute canonical path.
    ///
    /// It always names an existing directory: removals and renames that
    /// touch it or one of its ancestors move it along.
    pub fn current_dir(&self) -> &Path {
        &self.cwd
    }

    /// Change the working directory until the next change.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotADirectory`] if the path is not a directory
    pub fn set_current_dir(&mut self, path: &Path) -> Result<(), FsError> {
        let resolved = self.resolve(path, true)?;
        if self.node_at(&resolved, path)?.children().is_none() {
            return Err(FsError::not_a_directory(path));
        }
        self.cwd = resolved.path();
        tracing::info!(target: TRACING_TARGET, cwd = ?self.cwd, "chdir");
        Ok(())
    }

    /// Run `f` with the working directory changed to `path`.
    ///
    /// The previous working directory is restored when `f` returns, whether
    /// it succeeded, failed, or panicked. If that directory was removed in
    /// the meantime the working directory falls back to `/`.
    ///
    /// ```rust
    /// use anyfs_memory::{FileUtils, FsError, MemoryFs};
    /// use std::path::Path;
    ///
    /// let mut fs = MemoryFs::new();
    /// fs.mkdir(&["/work"])?;
    /// let result: Result<(), FsError> = fs.with_current_dir(Path::new("/work"), |fs| {
    ///     fs.touch(&["inside"])?;
    ///     fs.mkdir(&["/missing/child"])
    /// });
    /// assert!(result.is_err());
    /// assert_eq!(fs.current_dir(), Path::new("/"));
    /// # Ok::<(), FsError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Fails like [`set_current_dir`](Self::set_current_dir) before running
    /// `f`, otherwise returns what `f` returns.
    pub fn with_current_dir<T, F>(&mut self, path: &Path, f: F) -> Result<T, FsError>
    where
        F: FnOnce(&mut MemoryFs) -> Result<T, FsError>,
    {
        let previous = self.cwd.clone();
        self.set_current_dir(path)?;
        let guard = CurrentDirGuard { fs: self, previous };
        f(&mut *guard.fs)
    }

    fn restore_current_dir(&mut self, previous: PathBuf) {
        let still_a_dir = self
            .resolve(&previous, true)
            .ok()
            .and_then(|r| self.table.get(r.ino()))
            .is_some_and(|node| node.children().is_some());
        if still_a_dir {
            self.cwd = previous;
        } else {
            tracing::warn!(
                target: TRACING_TARGET,
                previous = ?previous,
                "previous working directory is gone, restoring to /"
            );
            self.cwd = PathBuf::from("/");
        }
    }

    // ------------------------------------------------------------------
    // Helpers shared by the trait implementations
    // ------------------------------------------------------------------

    pub(crate) fn resolve(&self, path: &Path, follow: bool) -> Result<Resolved, FsError> {
        PathResolver::new(&self.table, &self.cwd).resolve(path, follow)
    }

    pub(crate) fn resolve_parent(&self, path: &Path) -> Result<(Resolved, String), FsError> {
        PathResolver::new(&self.table, &self.cwd).resolve_parent(path)
    }

    pub(crate) fn node_at(&self, resolved: &Resolved, path: &Path) -> Result<&Node, FsError> {
        self.table.node(resolved.ino(), path)
    }

    pub(crate) fn node_at_mut(
        &mut self,
        resolved: &Resolved,
        path: &Path,
    ) -> Result<&mut Node, FsError> {
        self.table.node_mut(resolved.ino(), path)
    }

    pub(crate) fn new_file(&self, content: Vec<u8>) -> Node {
        Node::file(content, self.config.file_mode, self.config.uid, self.config.gid)
    }

    pub(crate) fn new_dir(&self) -> Node {
        Node::directory(self.config.dir_mode, self.config.uid, self.config.gid)
    }

    pub(crate) fn new_symlink(&self, target: PathBuf) -> Node {
        Node::symlink(
            target,
            self.config.symlink_mode,
            self.config.uid,
            self.config.gid,
        )
    }

    /// Create `node` at `path`. Nothing is left behind on failure.
    pub(crate) fn create_entry(
        &mut self,
        path: &Path,
        node: Node,
        operation: &'static str,
    ) -> Result<Ino, FsError> {
        let (parent, name) = self.resolve_parent(path)?;
        self.link_entry(&parent, &name, path, operation, |table| table.allocate(node))
    }

    /// Attach an inode produced by `make` under `parent/name`.
    pub(crate) fn link_entry(
        &mut self,
        parent: &Resolved,
        name: &str,
        path: &Path,
        operation: &'static str,
        make: impl FnOnce(&mut InodeTable) -> Ino,
    ) -> Result<Ino, FsError> {
        if self.table.lookup(parent.ino(), name).is_some() {
            return Err(FsError::already_exists(path, operation));
        }
        let ino = make(&mut self.table);
        self.table.attach(parent.ino(), name, ino, path)?;
        tracing::debug!(target: TRACING_TARGET, path = ?path, ino, operation, "create");
        Ok(ino)
    }

    /// Remove the entry `resolved` names from its parent and drop the link.
    pub(crate) fn unlink_entry(&mut self, resolved: &Resolved, path: &Path) -> Result<(), FsError> {
        let (Some(parent), Some(name)) = (resolved.parent(), resolved.name()) else {
            return Err(FsError::invalid_argument(
                path,
                "unlink",
                "the root directory cannot be removed",
            ));
        };
        let cwd = self.cwd_chain();
        let ino = self
            .table
            .detach(parent, name)
            .ok_or_else(|| FsError::not_found(path))?;
        self.table.unlink(ino);
        self.reanchor_cwd(cwd.as_ref(), ino, None);
        Ok(())
    }

    /// The working directory as a chain of inodes.
    pub(crate) fn cwd_chain(&self) -> Option<Resolved> {
        self.resolve(&self.cwd, true).ok()
    }

    /// Keep the working directory valid after `ino` left its place in `cwd`.
    ///
    /// A removed entry moves the working directory to its nearest surviving
    /// ancestor. A moved one rewrites the path prefix to `relocated`.
    pub(crate) fn reanchor_cwd(
        &mut self,
        cwd: Option<&Resolved>,
        ino: Ino,
        relocated: Option<&Path>,
    ) {
        let Some(chain) = cwd else { return };
        let Some(index) = chain.position(ino) else {
            return;
        };
        let moved_to = match relocated {
            Some(to) => chain.rebase(index, to),
            None => chain.prefix_path(index),
        };
        tracing::info!(
            target: TRACING_TARGET,
            from = ?self.cwd,
            to = ?moved_to,
            "chdir after tree change"
        );
        self.cwd = moved_to;
    }

    /// Path to create when writing to `path`: a dangling terminal symlink
    /// redirects creation to its target, as `open(O_CREAT)` does.
    pub(crate) fn creation_path(&self, path: &Path) -> Result<PathBuf, FsError> {
        let mut current = path.to_path_buf();
        for _ in 0..MAX_SYMLINK_DEPTH {
            let Ok(resolved) = self.resolve(&current, false) else {
                return Ok(current);
            };
            let NodeKind::Symlink { target } = &self.node_at(&resolved, path)?.kind else {
                return Ok(current);
            };
            current = resolved
                .path()
                .parent()
                .map_or_else(|| target.clone(), |dir| dir.join(target));
        }
        Err(FsError::not_found(path))
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

/// Restores the working directory when dropped.
struct CurrentDirGuard<'a> {
    fs: &'a mut MemoryFs,
    previous: PathBuf,
}

impl Drop for CurrentDirGuard<'_> {
    fn drop(&mut self) {
        let previous = std::mem::take(&mut self.previous);
        self.fs.restore_current_dir(previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileUtils, FsDir, FsLink, FsRead, FsWrite};

    #[test]
    fn new_has_only_root() {
        let fs = MemoryFs::new();
        assert_eq!(fs.entry_count(), 1);
        assert_eq!(fs.current_dir(), Path::new("/"));
        assert!(fs.metadata(Path::new("/")).unwrap().is_dir());
    }

    #[test]
    fn reset_discards_entries_and_cwd() {
        let mut fs = MemoryFs::new();
        fs.create_dir(Path::new("/d")).unwrap();
        fs.set_current_dir(Path::new("/d")).unwrap();

        fs.reset();
        assert_eq!(fs.entry_count(), 1);
        assert_eq!(fs.current_dir(), Path::new("/"));
        assert!(!fs.exists(Path::new("/d")).unwrap());
    }

    #[test]
    fn set_current_dir_is_canonical() {
        let mut fs = MemoryFs::new();
        fs.create_dir_all(Path::new("/a/b")).unwrap();
        fs.symlink(Path::new("/a/b"), Path::new("/l")).unwrap();

        fs.set_current_dir(Path::new("/l")).unwrap();
        assert_eq!(fs.current_dir(), Path::new("/a/b"));

        fs.set_current_dir(Path::new("..")).unwrap();
        assert_eq!(fs.current_dir(), Path::new("/a"));
    }

    #[test]
    fn set_current_dir_rejects_files_and_missing() {
        let mut fs = MemoryFs::new();
        fs.write(Path::new("/f"), b"").unwrap();

        let err = fs.set_current_dir(Path::new("/f")).unwrap_err();
        assert!(matches!(err, FsError::NotADirectory { .. }));
        let err = fs.set_current_dir(Path::new("/missing")).unwrap_err();
        assert!(matches!(err, FsError::NotFound { .. }));
        assert_eq!(fs.current_dir(), Path::new("/"));
    }

    #[test]
    fn with_current_dir_restores_after_success() {
        let mut fs = MemoryFs::new();
        fs.create_dir(Path::new("/w")).unwrap();

        let seen = fs
            .with_current_dir(Path::new("/w"), |fs| {
                fs.write(Path::new("rel"), b"x")?;
                Ok(fs.current_dir().to_path_buf())
            })
            .unwrap();

        assert_eq!(seen, PathBuf::from("/w"));
        assert_eq!(fs.current_dir(), Path::new("/"));
        assert_eq!(fs.read(Path::new("/w/rel")).unwrap(), b"x");
    }

    #[test]
    fn with_current_dir_restores_after_panic() {
        let mut fs = MemoryFs::new();
        fs.create_dir(Path::new("/w")).unwrap();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = fs.with_current_dir(Path::new("/w"), |_| -> Result<(), FsError> {
                panic!("boom")
            });
        }));

        assert!(outcome.is_err());
        assert_eq!(fs.current_dir(), Path::new("/"));
    }

    #[test]
    fn with_current_dir_falls_back_when_previous_removed() {
        let mut fs = MemoryFs::new();
        fs.create_dir_all(Path::new("/old/inner")).unwrap();
        fs.set_current_dir(Path::new("/old")).unwrap();

        fs.with_current_dir(Path::new("inner"), |fs| {
            fs.rm_rf(&["/old"])?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs.current_dir(), Path::new("/"));
    }

    #[test]
    fn removing_cwd_moves_it_to_nearest_surviving_ancestor() {
        let mut fs = MemoryFs::new();
        fs.create_dir_all(Path::new("/w/x/y")).unwrap();
        fs.set_current_dir(Path::new("/w/x/y")).unwrap();

        fs.rm_rf(&["/w/x"]).unwrap();
        assert_eq!(fs.current_dir(), Path::new("/w"));
        fs.touch(&["rel"]).unwrap();
        assert!(fs.exists(Path::new("/w/rel")).unwrap());

        fs.rm_rf(&["/w"]).unwrap();
        assert_eq!(fs.current_dir(), Path::new("/"));
        assert_eq!(fs.canonicalize(Path::new(".")).unwrap(), PathBuf::from("/"));
        fs.set_current_dir(Path::new("..")).unwrap();
    }

    #[test]
    fn removing_unrelated_directory_keeps_cwd() {
        let mut fs = MemoryFs::new();
        fs.create_dir_all(Path::new("/keep/in")).unwrap();
        fs.create_dir(Path::new("/other")).unwrap();
        fs.set_current_dir(Path::new("/keep/in")).unwrap();

        fs.remove_dir(Path::new("/other")).unwrap();
        assert_eq!(fs.current_dir(), Path::new("/keep/in"));
    }

    #[test]
    fn renaming_cwd_ancestor_rewrites_the_prefix() {
        let mut fs = MemoryFs::new();
        fs.create_dir_all(Path::new("/a/sub")).unwrap();
        fs.set_current_dir(Path::new("/a/sub")).unwrap();

        fs.mv("/a", "/b").unwrap();
        assert_eq!(fs.current_dir(), Path::new("/b/sub"));
        fs.touch(&["x"]).unwrap();
        assert!(fs.exists(Path::new("/b/sub/x")).unwrap());

        fs.rename(Path::new("/b/sub"), Path::new("/top")).unwrap();
        assert_eq!(fs.current_dir(), Path::new("/top"));
    }

    #[test]
    fn replacing_cwd_by_rename_moves_it_to_the_parent() {
        let mut fs = MemoryFs::new();
        fs.create_dir_all(Path::new("/p/empty")).unwrap();
        fs.create_dir(Path::new("/src")).unwrap();
        fs.set_current_dir(Path::new("/p/empty")).unwrap();

        fs.rename(Path::new("/src"), Path::new("/p/empty")).unwrap();
        assert_eq!(fs.current_dir(), Path::new("/p"));
    }

    #[test]
    fn write_through_dangling_symlink_creates_target() {
        let mut fs = MemoryFs::new();
        fs.create_dir(Path::new("/d")).unwrap();
        fs.symlink(Path::new("target"), Path::new("/d/link")).unwrap();

        fs.write(Path::new("/d/link"), b"hello").unwrap();
        assert_eq!(fs.read(Path::new("/d/target")).unwrap(), b"hello");
        assert!(fs.symlink_metadata(Path::new("/d/link")).unwrap().is_symlink());
    }
}
