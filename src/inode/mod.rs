//! The inode: one lock, one invariant set, files and directories alike.
//!
//! An [`Inode`] owns its attributes, its directory entry table (directories)
//! and its content buffer (files) behind a single reader/writer lock.
//!
//! - [`Inode::read`] takes the lock shared and yields an [`InodeReadGuard`].
//! - [`Inode::write`] takes it exclusive and yields an [`InodeWriteGuard`].
//!
//! Both guards dereference to [`InodeState`] for queries. Mutations exist
//! only on the write guard, which stamps timestamps from the inode's clock
//! and re-validates every invariant when it is dropped. A violation at that
//! point is a bug and panics.
//!
//! ```rust
//! use std::sync::Arc;
//! use memfs_inode::{DirentType, Inode, InodeAttributes, InodeId, SystemClock};
//!
//! let dir = Inode::new(InodeAttributes::dir(0o755), Arc::new(SystemClock));
//! dir.write().add_child(InodeId(2), "hello.txt", DirentType::File);
//!
//! let guard = dir.read();
//! assert_eq!(guard.lookup_child("hello.txt"), Some(InodeId(2)));
//! assert_eq!(guard.count(), 1);
//! ```

mod dir;
mod file;
mod invariants;

use std::ops::Deref;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Clock, Dirent, FileMode, InodeAttributes, InodeKind};

pub use dir::DirListing;
pub use file::ReadOutcome;

/// A file or directory in an in-memory filesystem.
///
/// The link count starts at one. The inode never destroys itself: the owning
/// table decides when an inode with no links and no open handles is dropped.
///
/// # Thread Safety
///
/// `Inode` is `Send + Sync` and is meant to be shared as `Arc<Inode>`.
/// Any number of read guards may coexist; a write guard excludes everything.
pub struct Inode {
    clock: Arc<dyn Clock>,
    kind: InodeKind,
    state: RwLock<InodeState>,
}

/// The lock-protected state of an [`Inode`].
///
/// Reachable only through [`InodeReadGuard`] or [`InodeWriteGuard`].
#[derive(Debug)]
pub struct InodeState {
    kind: InodeKind,

    // Number of parent directories linking to this inode. May be zero while
    // the inode is still open somewhere.
    link_count: u64,

    // nlink is not kept up to date here; attributes() fills it in.
    attributes: InodeAttributes,

    // Directories only. Never shortened and never reordered, because
    // entries[i].offset == i + 1 is handed to readdir callers as a cursor.
    // Unused slots have type Unknown and may be reused.
    entries: Vec<Dirent>,

    // Files only.
    contents: Vec<u8>,
}

impl Inode {
    /// Create an inode from `attrs`.
    ///
    /// The kind follows the directory flag of `attrs.mode`. `mtime`, `ctime`,
    /// `crtime` and `atime` are set to the clock's current time and the link
    /// count starts at one.
    ///
    /// # Panics
    ///
    /// If `attrs` is inconsistent: a mode with bits other than permissions and
    /// the directory flag, or a non-zero size.
    pub fn new(mut attrs: InodeAttributes, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        attrs.atime = now;
        attrs.mtime = now;
        attrs.ctime = now;
        attrs.crtime = now;

        let kind = attrs.kind();
        let state = InodeState {
            kind,
            link_count: 1,
            attributes: attrs,
            entries: Vec::new(),
            contents: Vec::new(),
        };

        if let Err(violation) = state.check_invariants() {
            panic!("inconsistent initial attributes: {violation}");
        }

        Self {
            clock,
            kind,
            state: RwLock::new(state),
        }
    }

    /// The inode's kind. Needs no lock.
    #[inline]
    pub fn kind(&self) -> InodeKind {
        self.kind
    }

    /// Returns `true` for directories.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == InodeKind::Directory
    }

    /// Returns `true` for regular files.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.kind == InodeKind::File
    }

    /// Acquire the lock shared.
    pub fn read(&self) -> InodeReadGuard<'_> {
        InodeReadGuard {
            state: self.state.read(),
        }
    }

    /// Acquire the lock exclusive. Invariants are checked when the guard drops.
    pub fn write(&self) -> InodeWriteGuard<'_> {
        InodeWriteGuard {
            state: self.state.write(),
            clock: &*self.clock,
        }
    }
}

impl std::fmt::Debug for Inode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inode")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl InodeState {
    /// The inode's kind.
    #[inline]
    pub fn kind(&self) -> InodeKind {
        self.kind
    }

    /// Number of parent directories linking to this inode.
    #[inline]
    pub fn link_count(&self) -> u64 {
        self.link_count
    }

    /// A snapshot of the attributes, with `nlink` set to the link count.
    pub fn attributes(&self) -> InodeAttributes {
        InodeAttributes {
            nlink: self.link_count,
            ..self.attributes.clone()
        }
    }

    fn touch(&mut self, now: SystemTime) {
        self.attributes.mtime = now;
        self.attributes.ctime = now;
    }
}

/// Shared access to an inode. Queries only.
pub struct InodeReadGuard<'a> {
    state: RwLockReadGuard<'a, InodeState>,
}

impl Deref for InodeReadGuard<'_> {
    type Target = InodeState;

    fn deref(&self) -> &InodeState {
        &self.state
    }
}

/// Exclusive access to an inode.
///
/// Every mutation refreshes the relevant timestamps from the inode's clock.
/// When the guard is dropped, on any path including unwinding, the full
/// invariant set is checked.
///
/// # Panics
///
/// On drop, if an invariant no longer holds. If the thread is already
/// panicking, the violation is logged and the process aborts instead.
pub struct InodeWriteGuard<'a> {
    state: RwLockWriteGuard<'a, InodeState>,
    clock: &'a dyn Clock,
}

impl InodeWriteGuard<'_> {
    /// Update attributes from the parameters that are present.
    ///
    /// `mtime` and `ctime` are always stamped with the current time first;
    /// an explicit `mtime` then overrides the stamp. A new `size` truncates
    /// the contents or pads them with zeros to exactly that length.
    ///
    /// # Panics
    ///
    /// If `size` is given for a directory.
    pub fn set_attributes(
        &mut self,
        size: Option<u64>,
        mode: Option<FileMode>,
        mtime: Option<SystemTime>,
    ) {
        let now = self.clock.now();
        let state = &mut *self.state;
        state.touch(now);

        if let Some(size) = size {
            state.resize(size);
        }

        if let Some(mode) = mode {
            state.attributes.mode = mode;
        }

        if let Some(mtime) = mtime {
            state.attributes.mtime = mtime;
        }
    }

    /// Record one more parent directory linking to this inode.
    pub fn increment_link_count(&mut self) {
        let now = self.clock.now();
        self.state.link_count += 1;
        self.state.attributes.ctime = now;
        log::debug!("link count raised to {}", self.state.link_count);
    }

    /// Record one fewer parent directory linking to this inode.
    ///
    /// # Panics
    ///
    /// If the link count is already zero.
    pub fn decrement_link_count(&mut self) {
        let now = self.clock.now();
        let Some(count) = self.state.link_count.checked_sub(1) else {
            panic!("negative link count: decrement below zero");
        };
        self.state.link_count = count;
        self.state.attributes.ctime = now;
        log::debug!("link count lowered to {count}");
    }
}

impl Deref for InodeWriteGuard<'_> {
    type Target = InodeState;

    fn deref(&self) -> &InodeState {
        &self.state
    }
}

impl Drop for InodeWriteGuard<'_> {
    fn drop(&mut self) {
        if let Err(violation) = self.state.check_invariants() {
            if std::thread::panicking() {
                log::error!("inode invariant violated while unwinding: {violation}");
                std::process::abort();
            }
            panic!("inode invariant violated: {violation}");
        }
    }
}
