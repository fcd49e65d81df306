//! # anyfs-memory
//!
//! An **in-memory virtual filesystem** with POSIX-like semantics.
//!
//! Directories, regular files, symbolic links, hard links, permission bits
//! and ownership all live in a tree held by a [`MemoryFs`] value. Nothing
//! touches real storage, so code that manipulates files can be exercised
//! against a tree that behaves like the real thing.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use anyfs_memory::{FileUtils, FsError, FsExt, FsRead, FsWrite, MemoryFs};
//! use std::path::Path;
//!
//! let mut fs = MemoryFs::new();
//! fs.mkdir_p(&["/etc/app"])?;
//! fs.write(Path::new("/etc/app/config"), b"debug = true")?;
//!
//! // Symlinks are resolved on every access.
//! fs.ln_s("/etc/app/config", "/config", false)?;
//! assert_eq!(fs.read_to_string(Path::new("/config"))?, "debug = true");
//!
//! // Hard links share content and metadata.
//! fs.ln("/etc/app/config", "/etc/app/config.bak", false)?;
//! fs.write(Path::new("/etc/app/config.bak"), b"debug = false")?;
//! assert_eq!(fs.read(Path::new("/config"))?, b"debug = false");
//!
//! fs.rm_rf(&["/etc"])?;
//! assert!(fs.is_symlink(Path::new("/config"))?);
//! assert!(!fs.exists(Path::new("/config"))?);
//! # Ok::<(), FsError>(())
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`MemoryFs`] | The filesystem: entry tree, working directory, configuration |
//! | [`FsConfig`] | Default owner and modes, symlink-mode capability |
//! | [`FileUtils`] | Recursive tree operations: `cp`, `mv`, `rm`, `ln`, `chmod`, ... |
//! | [`FsError`] | Error type with the offending path |
//! | [`Metadata`] | Entry metadata (type, size, mode, owner, times, inode, link count) |
//! | [`DirEntry`] | Single directory listing entry |
//!
//! ---
//!
//! ## Trait Hierarchy
//!
//! ```text
//! FsRead + FsWrite + FsDir              = Fs
//! Fs + FsLink + FsPermissions           = FsFull
//! FsFull                               → FileUtils (blanket)
//! ```
//!
//! The composites and [`FileUtils`] have **blanket implementations**: a
//! backend implements the component traits and gets the rest for free.
//! Reads take `&self`; anything that changes the tree takes `&mut self`.
//!
//! ---
//!
//! ## Path Resolution
//!
//! Paths use `/` separators. Absolute paths start at the root, relative
//! paths at the working directory. `.` is skipped and `..` moves to the
//! parent (the root's parent is the root). Symlinks in the middle of a path
//! are always followed; a final symlink is followed by everything except the
//! `symlink_*`, `read_link` and removal operations. A path ending in `/`
//! must name a directory. A chain that revisits a link it is already
//! expanding fails with [`FsError::NotFound`].
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, FsError>`:
//!
//! ```rust
//! use anyfs_memory::{FileUtils, FsError, MemoryFs};
//!
//! let mut fs = MemoryFs::new();
//! let err = fs.mkdir(&["/missing/child"]).unwrap_err();
//! assert!(matches!(err, FsError::NotFound { .. }));
//! assert_eq!(err.to_string(), "not found: /missing/child");
//! ```
//!
//! ---
//!
//! ## Logging
//!
//! Mutations emit [`tracing`] events under the `anyfs_memory::fs` target:
//! `debug` for each change, `trace` for symlink expansion, `warn` for errors
//! ignored under `force`. The crate never installs a subscriber.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`Metadata`], [`DirEntry`], [`Permissions`], [`FsConfig`], plus `FsExtJson` |

mod config;
mod error;
mod ext;
mod memory;
mod node;
mod path_resolver;
mod traits;
mod types;
mod utils;

/// Target used by every `tracing` event this crate emits.
pub(crate) const TRACING_TARGET: &str = "anyfs_memory::fs";

// Public re-exports - error types
pub use error::FsError;

// Public re-exports - configuration
pub use config::FsConfig;

// Public re-exports - core types
pub use types::{
    DirEntry, FileType, Metadata, Permissions, ROOT_INODE, S_IFDIR, S_IFLNK, S_IFREG,
};

// Public re-exports - primitive traits
pub use traits::{Fs, FsDir, FsFull, FsLink, FsPermissions, FsRead, FsWrite, ReadDirIter};

// Public re-exports - the filesystem
pub use memory::MemoryFs;

// Public re-exports - tree operations
pub use utils::{FileUtils, compare_stream};

// Public re-exports - extensions
pub use ext::FsExt;

#[cfg(feature = "serde")]
pub use ext::FsExtJson;
