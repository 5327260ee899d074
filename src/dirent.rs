//! Directory entry types.

use crate::InodeId;

/// Type of a directory entry, using the Linux `DT_*` values.
///
/// [`DirentType::Unknown`] doubles as the marker for an unused slot in a
/// directory's entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum DirentType {
    /// Unused slot, or a type the server does not report.
    #[default]
    Unknown = 0,
    /// Named pipe.
    Fifo = 1,
    /// Character device.
    CharDevice = 2,
    /// Directory.
    Directory = 4,
    /// Block device.
    BlockDevice = 6,
    /// Regular file.
    File = 8,
    /// Symbolic link.
    Symlink = 10,
    /// Unix domain socket.
    Socket = 12,
}

impl DirentType {
    /// The raw `DT_*` value.
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

/// One slot of a directory's entry table.
///
/// `offset` is the 1-based cursor the kernel hands back to resume a readdir.
/// It equals the slot's index plus one and never changes, even when the slot
/// is emptied and reused.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dirent {
    /// Cursor of the entry following this one's position.
    pub offset: u64,
    /// The child inode.
    pub inode: InodeId,
    /// The child's name within this directory.
    pub name: String,
    /// The child's type, or [`DirentType::Unknown`] for an unused slot.
    pub kind: DirentType,
}

impl Dirent {
    /// An unused slot at the given cursor.
    pub(crate) fn hole(offset: u64) -> Self {
        Self {
            offset,
            inode: InodeId(0),
            name: String::new(),
            kind: DirentType::Unknown,
        }
    }

    /// Returns `true` if the slot holds a live child.
    #[inline]
    pub fn is_used(&self) -> bool {
        self.kind != DirentType::Unknown
    }
}
