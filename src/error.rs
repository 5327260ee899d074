//! Invariant violations detected by the inode guard.
//!
//! These are not recoverable errors. They describe a defect in the calling
//! layer or in the inode itself, and the exclusive guard turns them into a
//! panic when the lock is released. Ordinary terminal conditions (end of data,
//! missing child) are reported as plain values instead.

use crate::{FileMode, InodeKind};

/// A broken inode invariant, with the offending values.
///
/// # Examples
///
/// ```rust
/// use memfs_inode::InvariantViolation;
///
/// let err = InvariantViolation::SizeMismatch { size: 4, len: 3 };
/// assert_eq!(err.to_string(), "unexpected size: 4 vs. 3");
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// The mode carries bits other than permissions and the directory flag.
    #[error("unexpected mode: {mode}")]
    UnexpectedModeBits {
        /// The offending mode.
        mode: FileMode,
    },

    /// The directory flag disagrees with the inode kind.
    #[error("unexpected mode: {mode}, kind: {kind:?}")]
    KindMismatch {
        /// The offending mode.
        mode: FileMode,
        /// The kind fixed at construction.
        kind: InodeKind,
    },

    /// A directory holds file contents.
    #[error("non-empty contents in a directory ({len} bytes)")]
    DirectoryHasContents {
        /// Length of the stray buffer.
        len: usize,
    },

    /// A file holds directory entries.
    #[error("non-empty entries in a file ({count} entries)")]
    FileHasEntries {
        /// Number of stray entries.
        count: usize,
    },

    /// An entry's cursor does not match its position.
    #[error("unexpected offset: {offset} at index {index}")]
    UnexpectedOffset {
        /// Position of the entry in the table.
        index: usize,
        /// The cursor it carries.
        offset: u64,
    },

    /// Two used entries share a name.
    #[error("duplicate name: {name}")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// The size attribute disagrees with the content length.
    #[error("unexpected size: {size} vs. {len}")]
    SizeMismatch {
        /// The size attribute.
        size: u64,
        /// The actual content length.
        len: usize,
    },
}
