//! # memfs-inode
//!
//! The inode type of an **in-memory FUSE filesystem**: one polymorphic node
//! for files and directories, guarded by a single reader/writer lock and a
//! set of invariants that are re-checked after every exclusive mutation.
//!
//! The filesystem server that owns these inodes allocates inode IDs, keeps
//! the inode table, tracks open handles and talks to the kernel. This crate
//! provides only what happens *inside* one inode.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use memfs_inode::{DirentType, Inode, InodeAttributes, InodeId, SystemClock};
//!
//! let clock = Arc::new(SystemClock);
//! let root = Inode::new(InodeAttributes::dir(0o755), clock.clone());
//! let file = Inode::new(InodeAttributes::file(0o644), clock);
//!
//! // mknod: link the file into the root directory.
//! root.write().add_child(InodeId(2), "notes.txt", DirentType::File);
//!
//! // write + read back.
//! file.write().write_at(b"hello", 0);
//! let mut buf = [0u8; 16];
//! let out = file.read().read_at(&mut buf, 0);
//! assert_eq!(&buf[..out.copied], b"hello");
//! assert!(out.eof);
//!
//! // readdir, one page at a time.
//! let page = root.read().read_dir(0, 4096);
//! assert_eq!(page.entries, 1);
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Inode`] | The node: kind, lock, clock |
//! | [`InodeReadGuard`] | Shared access: lookup, readdir, read |
//! | [`InodeWriteGuard`] | Exclusive access: add/remove child, write, setattr, link count |
//! | [`InodeState`] | Queries available through either guard |
//! | [`InodeAttributes`] | Size, mode, timestamps, owner |
//! | [`Dirent`] | One slot of a directory's entry table |
//! | [`InvariantViolation`] | What the guard found broken |
//!
//! ---
//!
//! ## Readdir Offsets
//!
//! A directory's entries live in a table that never shrinks and never moves
//! an entry. Removing a child leaves a hole; adding one fills the lowest hole
//! first. Entry `i` always carries offset `i + 1`, so a kernel cursor taken
//! before concurrent additions and removals still resumes at the right place.
//!
//! ---
//!
//! ## Error Handling
//!
//! There are two classes of failure and they are never mixed:
//!
//! - **Contract violations** (wrong inode kind, removing a missing child,
//!   broken invariants) are bugs and panic.
//! - **Terminal conditions** are plain values: [`ReadOutcome::eof`] for end
//!   of data, `None` from [`InodeState::lookup_child`] for a missing child.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Enable serialization for [`InodeAttributes`], [`Dirent`], [`FileMode`], etc. |

// Private modules
mod dirent;
mod error;
mod inode;
mod traits;
mod types;

// Public re-exports - error types
pub use error::InvariantViolation;

// Public re-exports - core types
pub use dirent::{Dirent, DirentType};
pub use types::{FileMode, InodeAttributes, InodeId, InodeKind, ROOT_INODE_ID};

// Public re-exports - the inode
pub use inode::{DirListing, Inode, InodeReadGuard, InodeState, InodeWriteGuard, ReadOutcome};

// Public re-exports - collaborator traits
pub use traits::{Clock, DirentEncoder, FuseDirentEncoder, SimulatedClock, SystemClock};
