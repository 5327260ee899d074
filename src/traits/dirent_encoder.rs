//! Wire encoding of directory entries for readdir replies.

use crate::Dirent;

/// Serializes one directory entry into a readdir reply buffer.
///
/// The inode never defines the byte layout of a listing itself; it asks the
/// encoder how large an entry is and has it append the bytes. This keeps the
/// paging logic in [`InodeReadGuard::read_dir_with`](crate::InodeReadGuard::read_dir_with)
/// independent of the protocol.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn DirentEncoder`.
pub trait DirentEncoder: Send + Sync {
    /// Number of bytes `append` will add for `entry`.
    fn encoded_len(&self, entry: &Dirent) -> usize;

    /// Append the encoded form of `entry` to `buf`.
    fn append(&self, buf: &mut Vec<u8>, entry: &Dirent);
}

/// The kernel's `struct fuse_dirent` layout.
///
/// ```text
/// ino: u64 | off: u64 | namelen: u32 | type: u32 | name | pad to 8 bytes
/// ```
///
/// All integers are little-endian, which is what the kernel expects on
/// every architecture Linux FUSE runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuseDirentEncoder;

impl FuseDirentEncoder {
    /// Size of the fixed header preceding the name.
    pub const HEADER_LEN: usize = 24;

    const ALIGN: usize = 8;

    fn padded(len: usize) -> usize {
        (len + Self::ALIGN - 1) & !(Self::ALIGN - 1)
    }
}

impl DirentEncoder for FuseDirentEncoder {
    fn encoded_len(&self, entry: &Dirent) -> usize {
        Self::padded(Self::HEADER_LEN + entry.name.len())
    }

    fn append(&self, buf: &mut Vec<u8>, entry: &Dirent) {
        let start = buf.len();
        buf.extend_from_slice(&entry.inode.0.to_le_bytes());
        buf.extend_from_slice(&entry.offset.to_le_bytes());
        buf.extend_from_slice(&(entry.name.len() as u32).to_le_bytes());
        buf.extend_from_slice(&entry.kind.as_raw().to_le_bytes());
        buf.extend_from_slice(entry.name.as_bytes());
        buf.resize(start + self.encoded_len(entry), 0);
    }
}
