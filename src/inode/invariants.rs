use std::collections::HashSet;

use super::InodeState;
use crate::{InodeKind, InvariantViolation};

impl InodeState {
    /// Check every cross-field invariant.
    ///
    /// The write guard calls this on drop and panics on `Err`. It is cheap
    /// enough for files; for directories it is linear in the table size.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mode = self.attributes.mode;

        if mode.unexpected_bits() != 0 {
            return Err(InvariantViolation::UnexpectedModeBits { mode });
        }

        if mode.is_dir() != (self.kind == InodeKind::Directory) {
            return Err(InvariantViolation::KindMismatch {
                mode,
                kind: self.kind,
            });
        }

        match self.kind {
            InodeKind::Directory => {
                if !self.contents.is_empty() {
                    return Err(InvariantViolation::DirectoryHasContents {
                        len: self.contents.len(),
                    });
                }

                let mut names = HashSet::new();
                for (index, e) in self.entries.iter().enumerate() {
                    if e.offset != index as u64 + 1 {
                        return Err(InvariantViolation::UnexpectedOffset {
                            index,
                            offset: e.offset,
                        });
                    }

                    if e.is_used() && !names.insert(e.name.as_str()) {
                        return Err(InvariantViolation::DuplicateName {
                            name: e.name.clone(),
                        });
                    }
                }
            }
            InodeKind::File => {
                if !self.entries.is_empty() {
                    return Err(InvariantViolation::FileHasEntries {
                        count: self.entries.len(),
                    });
                }
            }
        }

        if self.attributes.size != self.contents.len() as u64 {
            return Err(InvariantViolation::SizeMismatch {
                size: self.attributes.size,
                len: self.contents.len(),
            });
        }

        Ok(())
    }
}
