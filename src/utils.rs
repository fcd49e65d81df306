//! # Tree Operations
//!
//! [`FileUtils`] layers the familiar file-utility vocabulary (`cp`, `mv`,
//! `rm`, `ln`, `chmod`, ...) on top of the primitive traits. It is
//! blanket-implemented for every [`FsFull`] backend, so it works the same on
//! [`MemoryFs`](crate::MemoryFs) and on any other backend that implements the
//! component traits.
//!
//! | Method | Meaning |
//! |--------|---------|
//! | [`touch`](FileUtils::touch) | create empty files or bump their mtime |
//! | [`mkdir`](FileUtils::mkdir) / [`mkdir_p`](FileUtils::mkdir_p) | create directories |
//! | [`cp`](FileUtils::cp) / [`cp_into`](FileUtils::cp_into) | copy files and trees |
//! | [`mv`](FileUtils::mv) | rename within the tree |
//! | [`rm`](FileUtils::rm) / [`rmdir`](FileUtils::rmdir) | remove entries, optionally recursive or forced |
//! | [`ln`](FileUtils::ln) / [`ln_s`](FileUtils::ln_s) | hard and symbolic links |
//! | [`chmod`](FileUtils::chmod) / [`chown`](FileUtils::chown) | attributes, optionally recursive |
//! | [`compare_file`](FileUtils::compare_file) / [`compare_stream`] | byte comparison |
//!
//! Operations that take a list of paths stop at the first failure unless a
//! `force` flag says otherwise.

use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::{
    FileType, FsError, FsExt, FsFull, Metadata, Permissions, ROOT_INODE, TRACING_TARGET,
};

const COMPARE_CHUNK: usize = 8 * 1024;

/// Recursive tree operations over any [`FsFull`] backend.
///
/// # Example
///
/// ```rust
/// use anyfs_memory::{FileUtils, FsError, FsRead, FsWrite, MemoryFs};
/// use std::path::Path;
///
/// let mut fs = MemoryFs::new();
/// fs.mkdir_p(&["/src/nested", "/backup"])?;
/// fs.write(Path::new("/src/nested/data"), b"payload")?;
///
/// fs.cp("/src", "/backup")?;
/// assert_eq!(fs.read(Path::new("/backup/src/nested/data"))?, b"payload");
///
/// fs.rm_rf(&["/src"])?;
/// assert!(!fs.exists(Path::new("/src"))?);
/// # Ok::<(), FsError>(())
/// ```
pub trait FileUtils: FsFull {
    /// Create each path as an empty file, or bump its mtime if it exists.
    ///
    /// Returns the paths it was given.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if a parent directory is missing
    fn touch<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<Vec<PathBuf>, FsError> {
        let mut touched = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            self.touch_file(path)?;
            touched.push(path.to_path_buf());
        }
        Ok(touched)
    }

    /// Create a directory at each path.
    ///
    /// # Errors
    ///
    /// - [`FsError::AlreadyExists`] if a path is occupied
    /// - [`FsError::NotFound`] if a parent directory is missing
    fn mkdir<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), FsError> {
        for path in paths {
            self.create_dir(path.as_ref())?;
        }
        Ok(())
    }

    /// Create each directory along with any missing ancestors.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if a component exists and is not a directory
    fn mkdir_p<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), FsError> {
        for path in paths {
            self.create_dir_all(path.as_ref())?;
        }
        Ok(())
    }

    /// Copy `src` to `dest`.
    ///
    /// A directory source is copied with its whole subtree, keeping modes,
    /// owners and modification times; symlinks inside it are recreated as
    /// symlinks. A file source gets a new, unaliased file. If `dest` is an
    /// existing directory the copy lands at `dest/basename(src)`.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `src` is missing
    /// - [`FsError::InvalidArgument`] if source and destination are the same
    ///   entry, or a directory would be copied into its own subtree
    fn cp(&mut self, src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<(), FsError> {
        let (src, dest) = (src.as_ref(), dest.as_ref());
        let meta = self.metadata(src)?;
        let target = destination(self, src, dest, "copy")?;

        if let Ok(existing) = self.metadata(&target) {
            if existing.inode == meta.inode {
                return Err(FsError::invalid_argument(
                    &target,
                    "copy",
                    "source and destination are the same entry",
                ));
            }
        }
        if meta.is_dir() {
            ensure_outside(self, src, &target, "copy")?;
        }

        tracing::debug!(target: TRACING_TARGET, from = ?src, to = ?target, "cp");
        copy_tree(self, src, &target, &meta)
    }

    /// Copy every source into the directory `dest` by basename.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if `dest` is not an existing directory
    /// - any error of [`cp`](Self::cp), for the first source that fails
    fn cp_into<P: AsRef<Path>>(
        &mut self,
        srcs: &[P],
        dest: impl AsRef<Path>,
    ) -> Result<(), FsError> {
        let dest = dest.as_ref();
        if !self.is_dir(dest)? {
            return Err(FsError::not_a_directory(dest));
        }
        for src in srcs {
            self.cp(src, dest)?;
        }
        Ok(())
    }

    /// Recursive copy. [`cp`](Self::cp) already recurses into directories.
    ///
    /// # Errors
    ///
    /// Same as [`cp`](Self::cp).
    fn cp_r(&mut self, src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<(), FsError> {
        self.cp(src, dest)
    }

    /// Move `src` to `dest` by renaming it inside the tree.
    ///
    /// If `dest` is an existing directory, `src` moves to
    /// `dest/basename(src)`. An existing non-directory destination is
    /// replaced.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `src` is missing
    /// - [`FsError::InvalidArgument`] if a directory would move into itself
    fn mv(&mut self, src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<(), FsError> {
        let (src, dest) = (src.as_ref(), dest.as_ref());
        self.symlink_metadata(src)?;
        let target = destination(self, src, dest, "move")?;
        tracing::debug!(target: TRACING_TARGET, from = ?src, to = ?target, "mv");
        self.rename(src, &target)
    }

    /// Remove each path.
    ///
    /// A directory needs `recursive` unless it is empty; its subtree is then
    /// removed depth-first. With `force`, every error is logged and skipped
    /// and the call succeeds, leaving behind only what could not be removed.
    ///
    /// # Errors
    ///
    /// Without `force`:
    /// - [`FsError::NotFound`] if a path is missing
    /// - [`FsError::DirectoryNotEmpty`] for a non-empty directory without `recursive`
    /// - [`FsError::InvalidArgument`] for the root directory, before anything
    ///   is removed
    fn rm<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        recursive: bool,
        force: bool,
    ) -> Result<(), FsError> {
        for path in paths {
            let path = path.as_ref();
            let result = match self.symlink_metadata(path) {
                Ok(meta) if meta.inode == ROOT_INODE && !force => Err(root_removal(path, "rm")),
                Ok(meta) if meta.is_dir() && recursive => remove_tree(self, path, force),
                Ok(meta) if meta.is_dir() => self.remove_dir(path),
                Ok(_) => self.remove_file(path),
                Err(e) => Err(e),
            };
            tolerate(result, force, "rm")?;
        }
        Ok(())
    }

    /// `rm(paths, recursive = true, force = false)`.
    ///
    /// # Errors
    ///
    /// Same as [`rm`](Self::rm).
    fn rm_r<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), FsError> {
        self.rm(paths, true, false)
    }

    /// `rm(paths, recursive = true, force = true)`. Never fails.
    ///
    /// # Errors
    ///
    /// None; the signature matches the other removals.
    fn rm_rf<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), FsError> {
        self.rm(paths, true, true)
    }

    /// Remove the directory at `path` and everything below it.
    ///
    /// ```rust
    /// use anyfs_memory::{FileUtils, FsError, MemoryFs};
    ///
    /// let mut fs = MemoryFs::new();
    /// fs.rmdir("/missing", true)?;
    /// assert!(fs.rmdir("/missing", false).is_err());
    /// # Ok::<(), FsError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Without `force`:
    /// - [`FsError::NotFound`] if the path is missing
    /// - [`FsError::NotADirectory`] if the path is not a directory
    /// - [`FsError::InvalidArgument`] for the root directory, before anything
    ///   is removed
    fn rmdir(&mut self, path: impl AsRef<Path>, force: bool) -> Result<(), FsError> {
        let path = path.as_ref();
        let result = match self.symlink_metadata(path) {
            Ok(meta) if meta.inode == ROOT_INODE && !force => Err(root_removal(path, "rmdir")),
            Ok(meta) if meta.is_dir() => remove_tree(self, path, force),
            Ok(_) => Err(FsError::not_a_directory(path)),
            Err(e) => Err(e),
        };
        tolerate(result, force, "rmdir")
    }

    /// Create a hard link to the regular file `src` at `dest`.
    ///
    /// If `dest` is an existing directory the link is created as
    /// `dest/basename(src)`. With `force`, an occupying non-directory entry
    /// is removed first.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `src` is missing
    /// - [`FsError::NotAFile`] if `src` is not a regular file
    /// - [`FsError::AlreadyExists`] if the destination is occupied and `force` is off
    /// - [`FsError::InvalidArgument`] if `force` is on and the destination
    ///   already is `src`
    fn ln(
        &mut self,
        src: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        force: bool,
    ) -> Result<(), FsError> {
        let (src, dest) = (src.as_ref(), dest.as_ref());
        let meta = self.metadata(src)?;
        if !meta.is_file() {
            return Err(FsError::NotAFile {
                path: src.to_path_buf(),
            });
        }
        let target = destination(self, src, dest, "ln")?;

        if force {
            match self.symlink_metadata(&target) {
                Ok(existing) if existing.inode == meta.inode => {
                    return Err(FsError::invalid_argument(
                        &target,
                        "ln",
                        "source and destination are the same file",
                    ));
                }
                Ok(existing) if !existing.is_dir() => self.remove_file(&target)?,
                Ok(_) | Err(_) => {}
            }
        }

        tracing::debug!(target: TRACING_TARGET, from = ?src, to = ?target, "ln");
        self.hard_link(src, &target)
    }

    /// Hard-link every source into the directory `dest` by basename.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if `dest` is not an existing directory
    /// - any error of [`ln`](Self::ln), for the first source that fails
    fn ln_into<P: AsRef<Path>>(
        &mut self,
        srcs: &[P],
        dest: impl AsRef<Path>,
        force: bool,
    ) -> Result<(), FsError> {
        let dest = dest.as_ref();
        if !self.is_dir(dest)? {
            return Err(FsError::not_a_directory(dest));
        }
        for src in srcs {
            self.ln(src, dest, force)?;
        }
        Ok(())
    }

    /// Create a symlink at `link` storing `target` verbatim.
    ///
    /// The target is not checked for existence. If `link` is an existing
    /// directory the symlink is created as `link/basename(target)`. With
    /// `force`, an occupying non-directory entry is replaced.
    ///
    /// # Errors
    ///
    /// - [`FsError::AlreadyExists`] if the link path is occupied and `force` is off
    fn ln_s(
        &mut self,
        target: impl AsRef<Path>,
        link: impl AsRef<Path>,
        force: bool,
    ) -> Result<(), FsError> {
        let (target, link) = (target.as_ref(), link.as_ref());
        let link = destination(self, target, link, "symlink")?;

        if force {
            if let Ok(existing) = self.symlink_metadata(&link) {
                if !existing.is_dir() {
                    self.remove_file(&link)?;
                }
            }
        }
        self.symlink(target, &link)
    }

    /// Set the mode bits of each entry.
    ///
    /// A symlink keeps its target untouched: its own bits change when the
    /// backend supports that, otherwise nothing happens.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if an entry is missing
    fn chmod<P: AsRef<Path>>(&mut self, mode: u32, paths: &[P]) -> Result<(), FsError> {
        let perm = Permissions::from_mode(mode);
        for path in paths {
            chmod_entry(self, path.as_ref(), perm)?;
        }
        Ok(())
    }

    /// Like [`chmod`](Self::chmod), and also on every descendant of a
    /// directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if an entry is missing
    fn chmod_r<P: AsRef<Path>>(&mut self, mode: u32, paths: &[P]) -> Result<(), FsError> {
        let perm = Permissions::from_mode(mode);
        for path in paths {
            chmod_tree(self, path.as_ref(), perm)?;
        }
        Ok(())
    }

    /// Set the owner and/or group of what each path ultimately points to.
    ///
    /// `None` leaves the attribute unchanged. Symlinks are followed; a link's
    /// own ownership is never changed.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if an entry is missing
    fn chown<P: AsRef<Path>>(
        &mut self,
        uid: Option<u32>,
        gid: Option<u32>,
        paths: &[P],
    ) -> Result<(), FsError> {
        for path in paths {
            self.set_owner(path.as_ref(), uid, gid)?;
        }
        Ok(())
    }

    /// Like [`chown`](Self::chown), and also on every descendant of a
    /// directory.
    ///
    /// Symlinks met below the named paths are skipped, so the walk never
    /// leaves the subtree.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if an entry is missing
    fn chown_r<P: AsRef<Path>>(
        &mut self,
        uid: Option<u32>,
        gid: Option<u32>,
        paths: &[P],
    ) -> Result<(), FsError> {
        for path in paths {
            let path = path.as_ref();
            self.set_owner(path, uid, gid)?;
            if self.metadata(path)?.is_dir() {
                chown_children(self, path, uid, gid)?;
            }
        }
        Ok(())
    }

    /// Whether two regular files hold byte-identical content.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if either path is missing
    /// - [`FsError::NotAFile`] if either path is not a regular file
    fn compare_file(&self, a: impl AsRef<Path>, b: impl AsRef<Path>) -> Result<bool, FsError> {
        let (a, b) = (a.as_ref(), b.as_ref());
        let (meta_a, meta_b) = (self.metadata(a)?, self.metadata(b)?);
        for (path, meta) in [(a, &meta_a), (b, &meta_b)] {
            if !meta.is_file() {
                return Err(FsError::NotAFile {
                    path: path.to_path_buf(),
                });
            }
        }
        if meta_a.inode == meta_b.inode {
            return Ok(true);
        }
        if meta_a.size != meta_b.size {
            return Ok(false);
        }
        let (reader_a, reader_b) = (self.open_read(a)?, self.open_read(b)?);
        compare_stream(reader_a, reader_b).map_err(|source| FsError::Io {
            operation: "compare",
            path: a.to_path_buf(),
            source,
        })
    }
}

impl<B: FsFull + ?Sized> FileUtils for B {}

/// Whether two streams yield byte-identical content.
///
/// ```rust
/// use anyfs_memory::compare_stream;
///
/// assert!(compare_stream(&b"same"[..], &b"same"[..]).unwrap());
/// assert!(!compare_stream(&b"same"[..], &b"samE"[..]).unwrap());
/// assert!(!compare_stream(&b"short"[..], &b"shorter"[..]).unwrap());
/// ```
///
/// # Errors
///
/// Any read error from either stream.
pub fn compare_stream<A: Read, B: Read>(mut a: A, mut b: B) -> io::Result<bool> {
    let mut buf_a = vec![0u8; COMPARE_CHUNK];
    let mut buf_b = vec![0u8; COMPARE_CHUNK];
    loop {
        let read_a = fill(&mut a, &mut buf_a)?;
        let read_b = fill(&mut b, &mut buf_b)?;
        if buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Read until `buf` is full or the stream ends.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn basename<'p>(path: &'p Path, operation: &'static str) -> Result<&'p OsStr, FsError> {
    path.file_name().ok_or_else(|| {
        FsError::invalid_argument(path, operation, "path has no final component")
    })
}

/// `dest/basename(src)` if `dest` is an existing directory, else `dest`.
fn destination<B: FsFull + ?Sized>(
    fs: &B,
    src: &Path,
    dest: &Path,
    operation: &'static str,
) -> Result<PathBuf, FsError> {
    if fs.is_dir(dest)? {
        Ok(dest.join(basename(src, operation)?))
    } else {
        Ok(dest.to_path_buf())
    }
}

/// Refuse to place a copy of directory `src` at `target` inside `src` itself.
fn ensure_outside<B: FsFull + ?Sized>(
    fs: &B,
    src: &Path,
    target: &Path,
    operation: &'static str,
) -> Result<(), FsError> {
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if fs.canonicalize(parent)?.starts_with(fs.canonicalize(src)?) {
        return Err(FsError::invalid_argument(
            target,
            operation,
            "cannot copy a directory into itself",
        ));
    }
    Ok(())
}

fn copy_tree<B: FsFull + ?Sized>(
    fs: &mut B,
    src: &Path,
    dest: &Path,
    meta: &Metadata,
) -> Result<(), FsError> {
    match meta.file_type {
        FileType::File => {
            fs.copy(src, dest)?;
        }
        FileType::Symlink => {
            let target = fs.read_link(src)?;
            fs.symlink(&target, dest)?;
            return Ok(());
        }
        FileType::Directory => {
            if !fs.is_dir(dest)? {
                fs.create_dir(dest)?;
            }
            for entry in fs.read_dir(src)?.collect_all()? {
                let child = fs.symlink_metadata(&entry.path)?;
                copy_tree(fs, &entry.path, &dest.join(&entry.name), &child)?;
            }
            fs.set_permissions(dest, meta.permissions)?;
        }
    }
    fs.set_owner(dest, Some(meta.uid), Some(meta.gid))?;
    fs.set_modified(dest, meta.modified)
}

/// Depth-first removal of the directory at `path`.
fn remove_tree<B: FsFull + ?Sized>(fs: &mut B, path: &Path, force: bool) -> Result<(), FsError> {
    for entry in fs.read_dir(path)?.collect_all()? {
        let result = match entry.file_type {
            FileType::Directory => remove_tree(fs, &entry.path, force),
            FileType::File | FileType::Symlink => fs.remove_file(&entry.path),
        };
        tolerate(result, force, "rm")?;
    }
    fs.remove_dir(path)
}

/// Refusal to remove `/`, raised before anything below it is touched.
fn root_removal(path: &Path, operation: &'static str) -> FsError {
    FsError::invalid_argument(path, operation, "the root directory cannot be removed")
}

/// Swallow `result`'s error when `force` is set.
fn tolerate(
    result: Result<(), FsError>,
    force: bool,
    operation: &'static str,
) -> Result<(), FsError> {
    match result {
        Err(e) if force => {
            tracing::warn!(target: TRACING_TARGET, operation, error = %e, "ignored under force");
            Ok(())
        }
        other => other,
    }
}

fn chmod_entry<B: FsFull + ?Sized>(
    fs: &mut B,
    path: &Path,
    perm: Permissions,
) -> Result<(), FsError> {
    if !fs.symlink_metadata(path)?.is_symlink() {
        return fs.set_permissions(path, perm);
    }
    match fs.set_symlink_permissions(path, perm) {
        Err(FsError::NotSupported { .. }) => {
            tracing::debug!(
                target: TRACING_TARGET,
                path = ?path,
                "symlink mode unsupported, left unchanged"
            );
            Ok(())
        }
        result => result,
    }
}

fn chmod_tree<B: FsFull + ?Sized>(
    fs: &mut B,
    path: &Path,
    perm: Permissions,
) -> Result<(), FsError> {
    chmod_entry(fs, path, perm)?;
    if fs.symlink_metadata(path)?.is_dir() {
        for entry in fs.read_dir(path)?.collect_all()? {
            chmod_tree(fs, &entry.path, perm)?;
        }
    }
    Ok(())
}

fn chown_children<B: FsFull + ?Sized>(
    fs: &mut B,
    dir: &Path,
    uid: Option<u32>,
    gid: Option<u32>,
) -> Result<(), FsError> {
    for entry in fs.read_dir(dir)?.collect_all()? {
        match entry.file_type {
            FileType::Symlink => continue,
            FileType::File => fs.set_owner(&entry.path, uid, gid)?,
            FileType::Directory => {
                fs.set_owner(&entry.path, uid, gid)?;
                chown_children(fs, &entry.path, uid, gid)?;
            }
        }
    }
    Ok(())
}
