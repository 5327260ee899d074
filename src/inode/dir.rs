//! Directory entry table.
//!
//! Slots are addressed by a permanent index. Removing a child turns its slot
//! into a hole; adding a child fills the lowest hole before growing the
//! table. A slot's offset (`index + 1`) therefore never moves, and a readdir
//! cursor taken before any number of additions and removals stays valid.

use super::{InodeState, InodeWriteGuard};
use crate::{Dirent, DirentEncoder, DirentType, FuseDirentEncoder, InodeId, InodeKind};

/// One page of a readdir reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    /// Encoded entries, never longer than the requested size.
    pub data: Vec<u8>,
    /// Number of entries encoded in `data`.
    pub entries: usize,
    /// Offset to pass to the next call to continue where this page stopped.
    pub next_offset: u64,
}

impl InodeState {
    fn assert_dir(&self, op: &str) {
        if self.kind != InodeKind::Directory {
            panic!("{op} called on non-directory");
        }
    }

    fn find_child(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.is_used() && e.name == name)
    }

    /// Number of children.
    pub fn count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_used()).count()
    }

    /// The ID of the child called `name`, if any.
    ///
    /// # Panics
    ///
    /// If this inode is not a directory.
    pub fn lookup_child(&self, name: &str) -> Option<InodeId> {
        self.assert_dir("lookup_child");
        self.find_child(name).map(|i| self.entries[i].inode)
    }

    /// The children in slot order, holes skipped.
    pub fn entries(&self) -> impl Iterator<Item = &Dirent> + '_ {
        self.entries.iter().filter(|e| e.is_used())
    }

    /// Serve a readdir request with the kernel's `fuse_dirent` layout.
    ///
    /// See [`read_dir_with`](Self::read_dir_with).
    pub fn read_dir(&self, offset: u64, size: usize) -> DirListing {
        self.read_dir_with(&FuseDirentEncoder, offset, size)
    }

    /// Serve a readdir request.
    ///
    /// Encodes used entries starting at slot `offset` (an offset previously
    /// returned to the caller, or 0 for the beginning) until the next entry
    /// would not fit in `size` bytes. Entries are never split.
    ///
    /// # Panics
    ///
    /// If this inode is not a directory.
    pub fn read_dir_with<E>(&self, encoder: &E, offset: u64, size: usize) -> DirListing
    where
        E: DirentEncoder + ?Sized,
    {
        self.assert_dir("read_dir");

        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let mut listing = DirListing {
            data: Vec::new(),
            entries: 0,
            next_offset: offset,
        };

        let mut exhausted = true;
        for e in self.entries.iter().skip(start).filter(|e| e.is_used()) {
            if listing.data.len() + encoder.encoded_len(e) > size {
                exhausted = false;
                break;
            }

            encoder.append(&mut listing.data, e);
            listing.entries += 1;
            listing.next_offset = e.offset;
        }

        if exhausted {
            listing.next_offset = listing.next_offset.max(self.entries.len() as u64);
        }

        log::trace!(
            "read_dir offset={offset} size={size}: {} entries, next={}",
            listing.entries,
            listing.next_offset
        );
        listing
    }

    fn insert_entry(&mut self, id: InodeId, name: &str, kind: DirentType) {
        self.assert_dir("add_child");
        if kind == DirentType::Unknown {
            panic!("add_child called with unknown entry type for {name}");
        }

        let entry = Dirent {
            offset: 0,
            inode: id,
            name: name.to_owned(),
            kind,
        };

        let index = match self.entries.iter().position(|e| !e.is_used()) {
            Some(hole) => {
                self.entries[hole] = entry;
                hole
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };
        self.entries[index].offset = index as u64 + 1;

        log::debug!("added child {name} ({id}) at offset {}", index + 1);
    }

    fn clear_entry(&mut self, name: &str) {
        self.assert_dir("remove_child");
        let Some(index) = self.find_child(name) else {
            panic!("unknown child: {name}");
        };

        self.entries[index] = Dirent::hole(index as u64 + 1);
        log::debug!("removed child {name} at offset {}", index + 1);
    }
}

impl InodeWriteGuard<'_> {
    /// Add an entry for a child.
    ///
    /// The entry fills the lowest unused slot, or is appended when there is
    /// none. Adding a name that is already present is caught by the
    /// invariant check when the guard drops.
    ///
    /// # Panics
    ///
    /// If this inode is not a directory, or `kind` is [`DirentType::Unknown`].
    pub fn add_child(&mut self, id: InodeId, name: &str, kind: DirentType) {
        let now = self.clock.now();
        self.state.touch(now);
        self.state.insert_entry(id, name, kind);
    }

    /// Remove the entry for a child, leaving a hole at its offset.
    ///
    /// # Panics
    ///
    /// If this inode is not a directory, or has no child called `name`.
    pub fn remove_child(&mut self, name: &str) {
        let now = self.clock.now();
        self.state.touch(now);
        self.state.clear_entry(name);
    }
}
