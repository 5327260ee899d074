//! File content buffer.

use super::{InodeState, InodeWriteGuard};
use crate::InodeKind;

/// Result of [`InodeState::read_at`].
///
/// End of data is not an error: it is how a read loop learns to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Bytes copied into the destination.
    pub copied: usize,
    /// Set when fewer bytes than requested were available.
    pub eof: bool,
}

impl InodeState {
    fn assert_file(&self, op: &str) {
        if self.kind != InodeKind::File {
            panic!("{op} called on directory");
        }
    }

    /// Copy file contents starting at `offset` into `dst`.
    ///
    /// Mirrors `pread`: copies as much as is available and reports `eof` when
    /// that is less than `dst.len()`, including when `offset` is past the end.
    ///
    /// # Panics
    ///
    /// If this inode is a directory.
    pub fn read_at(&self, dst: &mut [u8], offset: u64) -> ReadOutcome {
        self.assert_file("read_at");

        let len = self.contents.len() as u64;
        if offset > len {
            return ReadOutcome {
                copied: 0,
                eof: true,
            };
        }

        let src = &self.contents[offset as usize..];
        let copied = dst.len().min(src.len());
        dst[..copied].copy_from_slice(&src[..copied]);

        log::trace!("read_at offset={offset}: {copied}/{} bytes", dst.len());
        ReadOutcome {
            copied,
            eof: copied < dst.len(),
        }
    }

    /// A copy of the whole file.
    ///
    /// # Panics
    ///
    /// If this inode is a directory.
    pub fn contents(&self) -> Vec<u8> {
        self.assert_file("contents");
        self.contents.clone()
    }

    // Truncate or zero-extend to exactly `size` bytes.
    pub(super) fn resize(&mut self, size: u64) {
        if self.kind == InodeKind::Directory {
            panic!("cannot resize a directory");
        }

        self.contents.resize(size as usize, 0);
        self.attributes.size = size;
    }
}

impl InodeWriteGuard<'_> {
    /// Write all of `src` at `offset`, returning the number of bytes written.
    ///
    /// Writing past the end grows the file first; any gap between the old end
    /// and `offset` reads back as zeros.
    ///
    /// # Panics
    ///
    /// If this inode is a directory.
    pub fn write_at(&mut self, src: &[u8], offset: u64) -> usize {
        self.state.assert_file("write_at");

        let now = self.clock.now();
        let state = &mut *self.state;
        state.touch(now);

        let off = offset as usize;
        let new_len = off + src.len();
        if state.contents.len() < new_len {
            state.contents.resize(new_len, 0);
            state.attributes.size = new_len as u64;
        }

        let dst = &mut state.contents[off..];
        let n = dst.len().min(src.len());
        dst[..n].copy_from_slice(&src[..n]);
        if n != src.len() {
            panic!("unexpected short copy: {n} of {}", src.len());
        }

        log::trace!("write_at offset={offset}: {n} bytes, size={}", state.attributes.size);
        n
    }
}
