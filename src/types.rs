//! Core types shared by the inode and its collaborators.

use std::time::SystemTime;

/// The root directory always has inode ID 1 (FUSE convention).
pub const ROOT_INODE_ID: InodeId = InodeId(1);

/// Opaque identifier of an inode.
///
/// IDs are allocated by the owning inode table, never by [`Inode`](crate::Inode)
/// itself. The directory entry table only stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InodeId(pub u64);

impl std::fmt::Display for InodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an inode is. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InodeKind {
    /// Regular file backed by a byte buffer.
    File,
    /// Directory backed by an entry table.
    Directory,
}

/// Unix-style mode: permission bits plus the directory type flag.
///
/// Unlike a raw `st_mode`, the only type bit an inode may carry is
/// [`FileMode::DIRECTORY`]. Any other bit is rejected by the invariant check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileMode(u32);

impl FileMode {
    /// Permission bits (rwxrwxrwx).
    pub const PERMISSIONS: u32 = 0o777;

    /// Directory type flag (`S_IFDIR`).
    pub const DIRECTORY: u32 = 0o040000;

    /// Wrap raw mode bits without masking anything.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Mode for a regular file with the given permissions.
    #[inline]
    pub const fn file(perm: u32) -> Self {
        Self(perm & Self::PERMISSIONS)
    }

    /// Mode for a directory with the given permissions.
    #[inline]
    pub const fn dir(perm: u32) -> Self {
        Self((perm & Self::PERMISSIONS) | Self::DIRECTORY)
    }

    /// Raw mode bits.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Permission bits only.
    #[inline]
    pub const fn permissions(&self) -> u32 {
        self.0 & Self::PERMISSIONS
    }

    /// Returns `true` if the directory flag is set.
    #[inline]
    pub const fn is_dir(&self) -> bool {
        self.0 & Self::DIRECTORY != 0
    }

    /// Bits that are neither permissions nor the directory flag.
    #[inline]
    pub const fn unexpected_bits(&self) -> u32 {
        self.0 & !(Self::PERMISSIONS | Self::DIRECTORY)
    }
}

impl Default for FileMode {
    fn default() -> Self {
        Self::file(0o644)
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#o}", self.0)
    }
}

/// Attributes of an inode, as reported to the kernel by getattr.
///
/// Time fields passed to [`Inode::new`](crate::Inode::new) are ignored for
/// `mtime`, `ctime` and `crtime`; the inode stamps those from its clock.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InodeAttributes {
    /// Size in bytes. Always the content length for files, zero for directories.
    pub size: u64,
    /// Number of hard links. Filled from the link count when read.
    pub nlink: u64,
    /// Mode bits.
    pub mode: FileMode,
    /// Last access time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub atime: SystemTime,
    /// Last modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub mtime: SystemTime,
    /// Last status change time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub ctime: SystemTime,
    /// Creation time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub crtime: SystemTime,
    /// Owner user ID. Stored, never enforced.
    pub uid: u32,
    /// Owner group ID. Stored, never enforced.
    pub gid: u32,
}

impl InodeAttributes {
    /// Attributes for a new, empty regular file.
    pub fn file(perm: u32) -> Self {
        Self {
            mode: FileMode::file(perm),
            ..Default::default()
        }
    }

    /// Attributes for a new, empty directory.
    pub fn dir(perm: u32) -> Self {
        Self {
            mode: FileMode::dir(perm),
            ..Default::default()
        }
    }

    /// Set the owner.
    pub fn with_owner(mut self, uid: u32, gid: u32) -> Self {
        self.uid = uid;
        self.gid = gid;
        self
    }

    /// The kind implied by the mode's directory flag.
    #[inline]
    pub fn kind(&self) -> InodeKind {
        if self.mode.is_dir() {
            InodeKind::Directory
        } else {
            InodeKind::File
        }
    }
}

impl Default for InodeAttributes {
    fn default() -> Self {
        Self {
            size: 0,
            nlink: 0,
            mode: FileMode::default(),
            atime: SystemTime::UNIX_EPOCH,
            mtime: SystemTime::UNIX_EPOCH,
            ctime: SystemTime::UNIX_EPOCH,
            crtime: SystemTime::UNIX_EPOCH,
            uid: 0,
            gid: 0,
        }
    }
}

/// Serde support for SystemTime (when serde feature is enabled).
#[cfg(feature = "serde")]
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}
