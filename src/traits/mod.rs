//! # Filesystem Traits
//!
//! The primitive operation surface, split by concern.
//!
//! ```text
//! FsRead + FsWrite + FsDir             = Fs
//! Fs + FsLink + FsPermissions          = FsFull  → FileUtils (tree operations)
//! ```
//!
//! Both composites have blanket implementations: implement the component
//! traits and the composite, plus [`FileUtils`](crate::FileUtils), come for
//! free. [`MemoryFs`](crate::MemoryFs) implements every component trait.
//!
//! ## Object Safety
//!
//! All component traits are object-safe:
//!
//! ```rust
//! use anyfs_memory::{FsRead, MemoryFs};
//! use std::path::Path;
//!
//! fn readable(fs: &dyn FsRead) -> bool {
//!     fs.exists(Path::new("/")).unwrap_or(false)
//! }
//!
//! assert!(readable(&MemoryFs::new()));
//! ```

mod fs_dir;
mod fs_link;
mod fs_permissions;
mod fs_read;
mod fs_write;

pub use fs_dir::{FsDir, ReadDirIter};
pub use fs_link::FsLink;
pub use fs_permissions::FsPermissions;
pub use fs_read::FsRead;
pub use fs_write::FsWrite;

/// Basic filesystem: reading, writing, and directory operations.
///
/// Automatically implemented for any type that implements all three
/// component traits.
pub trait Fs: FsRead + FsWrite + FsDir {}

impl<T: FsRead + FsWrite + FsDir + ?Sized> Fs for T {}

/// Full filesystem: [`Fs`] plus links, permissions and ownership.
///
/// Automatically implemented for any type that implements [`Fs`],
/// [`FsLink`] and [`FsPermissions`].
pub trait FsFull: Fs + FsLink + FsPermissions {}

impl<T: Fs + FsLink + FsPermissions + ?Sized> FsFull for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_fs_is_fs_full() {
        fn assert_full<T: FsFull>() {}
        assert_full::<crate::MemoryFs>();
    }
}
