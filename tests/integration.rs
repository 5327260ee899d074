//! Integration tests driving inodes the way a FUSE server does.
//!
//! These tests verify that:
//! 1. A small inode table built on `Inode` handles mknod/mkdir/unlink/rename
//! 2. Readdir offsets stay stable and resumable across concurrent edits
//! 3. File contents follow pwrite/pread/truncate semantics
//! 4. Shared and exclusive access compose correctly across threads

use memfs_inode::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};

// =============================================================================
// Minimal Inode Table
// =============================================================================

/// The collaborator side: ID allocation and the table of live inodes.
struct MemFs {
    clock: Arc<SimulatedClock>,
    inodes: RwLock<HashMap<InodeId, Arc<Inode>>>,
    next_id: AtomicU64,
}

impl MemFs {
    fn new() -> Self {
        let clock = Arc::new(SimulatedClock::new(
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000),
        ));
        let root = Arc::new(Inode::new(InodeAttributes::dir(0o755), clock.clone()));
        let mut inodes = HashMap::new();
        inodes.insert(ROOT_INODE_ID, root);

        Self {
            clock,
            inodes: RwLock::new(inodes),
            next_id: AtomicU64::new(ROOT_INODE_ID.0 + 1),
        }
    }

    fn get(&self, id: InodeId) -> Arc<Inode> {
        self.inodes.read().unwrap()[&id].clone()
    }

    fn allocate(&self, attrs: InodeAttributes) -> (InodeId, Arc<Inode>) {
        let id = InodeId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let inode = Arc::new(Inode::new(attrs, self.clock.clone()));
        self.inodes.write().unwrap().insert(id, inode.clone());
        (id, inode)
    }

    fn lookup(&self, parent: InodeId, name: &str) -> Option<InodeId> {
        self.get(parent).read().lookup_child(name)
    }

    fn create(&self, parent: InodeId, name: &str) -> InodeId {
        let (id, _) = self.allocate(InodeAttributes::file(0o644));
        self.get(parent).write().add_child(id, name, DirentType::File);
        id
    }

    fn mkdir(&self, parent: InodeId, name: &str) -> InodeId {
        let (id, _) = self.allocate(InodeAttributes::dir(0o755));
        self.get(parent)
            .write()
            .add_child(id, name, DirentType::Directory);
        id
    }

    fn unlink(&self, parent: InodeId, name: &str) -> InodeId {
        let dir = self.get(parent);
        let mut guard = dir.write();
        let id = guard.lookup_child(name).expect("child exists");
        guard.remove_child(name);
        self.get(id).write().decrement_link_count();
        id
    }

    fn rename(&self, parent: InodeId, from: &str, to: &str) {
        let dir = self.get(parent);
        let mut guard = dir.write();
        let id = guard.lookup_child(from).expect("source exists");
        guard.remove_child(from);
        guard.add_child(id, to, DirentType::File);
    }

    fn list(&self, dir: InodeId) -> Vec<String> {
        self.get(dir)
            .read()
            .entries()
            .map(|e| e.name.clone())
            .collect()
    }
}

/// Decode a buffer produced by `FuseDirentEncoder` into (offset, name) pairs.
fn decode(mut data: &[u8]) -> Vec<(u64, String)> {
    let mut out = Vec::new();
    while data.len() >= FuseDirentEncoder::HEADER_LEN {
        let offset = u64::from_le_bytes(data[8..16].try_into().unwrap());
        let namelen = u32::from_le_bytes(data[16..20].try_into().unwrap()) as usize;
        let name = String::from_utf8(data[24..24 + namelen].to_vec()).unwrap();
        let total = (FuseDirentEncoder::HEADER_LEN + namelen + 7) & !7;
        out.push((offset, name));
        data = &data[total..];
    }
    out
}

/// Read a whole directory in pages of `page` bytes.
fn read_all_paged(dir: &Inode, page: usize) -> Vec<(u64, String)> {
    let mut out = Vec::new();
    let mut offset = 0;
    loop {
        let listing = dir.read().read_dir(offset, page);
        if listing.entries == 0 {
            return out;
        }
        out.extend(decode(&listing.data));
        offset = listing.next_offset;
    }
}

// =============================================================================
// Tests: Concrete Scenarios
// =============================================================================

#[test]
fn scenario_hole_reuse_keeps_offsets() {
    let clock = Arc::new(SimulatedClock::default());
    let dir = Inode::new(InodeAttributes::dir(0o755), clock);

    dir.write().add_child(InodeId(1), "a", DirentType::File);
    dir.write().add_child(InodeId(2), "b", DirentType::File);
    dir.write().remove_child("a");
    dir.write().add_child(InodeId(3), "c", DirentType::File);

    let listing = dir.read().read_dir(0, 1 << 16);
    assert_eq!(
        decode(&listing.data),
        vec![(1, "c".to_string()), (2, "b".to_string())]
    );
}

#[test]
fn scenario_sparse_write() {
    let file = Inode::new(
        InodeAttributes::file(0o644),
        Arc::new(SimulatedClock::default()),
    );

    file.write().write_at(&[1, 2, 3], 2);
    assert_eq!(file.read().attributes().size, 5);

    let mut buf = [0xaa; 5];
    let out = file.read().read_at(&mut buf, 0);
    assert_eq!(out.copied, 5);
    assert_eq!(buf, [0, 0, 1, 2, 3]);
}

#[test]
fn scenario_read_empty_file() {
    let file = Inode::new(InodeAttributes::file(0o644), Arc::new(SystemClock));
    let mut buf = [0u8; 10];
    let out = file.read().read_at(&mut buf, 0);
    assert_eq!(
        out,
        ReadOutcome {
            copied: 0,
            eof: true
        }
    );
}

// =============================================================================
// Tests: Directory Table Properties
// =============================================================================

#[test]
fn offsets_match_positions_across_many_edits() {
    let fs = MemFs::new();
    let names: Vec<String> = (0..32).map(|i| format!("f{i:02}")).collect();
    let mut live: Vec<String> = Vec::new();

    // Deterministic pseudo-random walk of creates and unlinks.
    let mut seed = 0x2545_f491u32;
    for _ in 0..500 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let name = &names[(seed % 32) as usize];

        if live.contains(name) {
            fs.unlink(ROOT_INODE_ID, name);
            live.retain(|n| n != name);
        } else {
            fs.create(ROOT_INODE_ID, name);
            live.push(name.clone());
        }

        let root = fs.get(ROOT_INODE_ID);
        let guard = root.read();
        assert_eq!(guard.count(), live.len());
        assert_eq!(guard.check_invariants(), Ok(()));
    }

    let mut listed = fs.list(ROOT_INODE_ID);
    listed.sort();
    live.sort();
    assert_eq!(listed, live);
}

#[test]
fn add_fills_lowest_hole_before_appending() {
    let fs = MemFs::new();
    for name in ["a", "b", "c", "d", "e"] {
        fs.create(ROOT_INODE_ID, name);
    }
    fs.unlink(ROOT_INODE_ID, "d");
    fs.unlink(ROOT_INODE_ID, "b");

    fs.create(ROOT_INODE_ID, "x");
    fs.create(ROOT_INODE_ID, "y");
    fs.create(ROOT_INODE_ID, "z");

    let listing = read_all_paged(&fs.get(ROOT_INODE_ID), 1 << 16);
    let expected: Vec<(u64, String)> = [
        (1, "a"),
        (2, "x"),
        (3, "c"),
        (4, "y"),
        (5, "e"),
        (6, "z"),
    ]
    .iter()
    .map(|&(o, n)| (o, n.to_string()))
    .collect();
    assert_eq!(listing, expected);
}

#[test]
fn paged_readdir_matches_single_read() {
    let fs = MemFs::new();
    for i in 0..50 {
        fs.create(ROOT_INODE_ID, &format!("entry-{i}"));
    }
    for i in (0..50).step_by(3) {
        fs.unlink(ROOT_INODE_ID, &format!("entry-{i}"));
    }

    let root = fs.get(ROOT_INODE_ID);
    let whole = decode(&root.read().read_dir(0, 1 << 20).data);
    for page in [40, 64, 100, 333] {
        assert_eq!(read_all_paged(&root, page), whole, "page size {page}");
    }
}

#[test]
fn paged_readdir_survives_unrelated_edits() {
    let fs = MemFs::new();
    for i in 0..10 {
        fs.create(ROOT_INODE_ID, &format!("keep-{i}"));
    }
    fs.create(ROOT_INODE_ID, "tmp");
    let root = fs.get(ROOT_INODE_ID);
    let before = decode(&root.read().read_dir(0, 1 << 20).data);

    let first = root.read().read_dir(0, 4 * 40);
    let mut seen = decode(&first.data);

    // Between pages: remove and re-add a name already behind the cursor,
    // and drop one that is still ahead of it.
    fs.unlink(ROOT_INODE_ID, "keep-1");
    fs.create(ROOT_INODE_ID, "keep-1");
    fs.unlink(ROOT_INODE_ID, "tmp");

    let mut offset = first.next_offset;
    loop {
        let page = root.read().read_dir(offset, 4 * 40);
        if page.entries == 0 {
            break;
        }
        seen.extend(decode(&page.data));
        offset = page.next_offset;
    }

    let expected: Vec<_> = before.into_iter().filter(|(_, n)| n != "tmp").collect();
    assert_eq!(seen, expected);
}

#[test]
fn rename_within_directory() {
    let fs = MemFs::new();
    let id = fs.create(ROOT_INODE_ID, "old");
    fs.rename(ROOT_INODE_ID, "old", "new");

    assert_eq!(fs.lookup(ROOT_INODE_ID, "old"), None);
    assert_eq!(fs.lookup(ROOT_INODE_ID, "new"), Some(id));
    assert_eq!(fs.list(ROOT_INODE_ID), vec!["new".to_string()]);
}

#[test]
fn nested_directories() {
    let fs = MemFs::new();
    let sub = fs.mkdir(ROOT_INODE_ID, "sub");
    let file = fs.create(sub, "inner.txt");

    assert_eq!(fs.lookup(ROOT_INODE_ID, "sub"), Some(sub));
    assert_eq!(fs.lookup(sub, "inner.txt"), Some(file));
    assert!(fs.get(sub).is_dir());
    assert!(fs.get(file).is_file());
}

#[test]
fn unlinked_inode_survives_with_zero_links() {
    let fs = MemFs::new();
    let id = fs.create(ROOT_INODE_ID, "doomed");
    let inode = fs.get(id);
    inode.write().write_at(b"still here", 0);

    fs.unlink(ROOT_INODE_ID, "doomed");

    assert_eq!(inode.read().link_count(), 0);
    assert_eq!(inode.read().attributes().nlink, 0);
    assert_eq!(inode.read().contents(), b"still here");
}

// =============================================================================
// Tests: File Contents
// =============================================================================

#[test]
fn write_size_is_max_of_old_and_end() {
    let file = Inode::new(
        InodeAttributes::file(0o644),
        Arc::new(SimulatedClock::default()),
    );
    let writes: [(&[u8], u64); 4] = [(b"hello", 0), (b"xy", 1), (b"tail", 20), (b"!", 3)];

    let mut expected_size = 0u64;
    for (data, offset) in writes {
        file.write().write_at(data, offset);
        expected_size = expected_size.max(offset + data.len() as u64);
        assert_eq!(file.read().attributes().size, expected_size);

        let mut back = vec![0u8; data.len()];
        let out = file.read().read_at(&mut back, offset);
        assert_eq!(out.copied, data.len());
        assert_eq!(back, data);
    }
}

#[test]
fn truncate_then_extend_reads_zeros() {
    let file = Inode::new(
        InodeAttributes::file(0o644),
        Arc::new(SimulatedClock::default()),
    );
    file.write().write_at(b"0123456789", 0);

    file.write().set_attributes(Some(4), None, None);
    assert_eq!(file.read().contents(), b"0123");

    file.write().set_attributes(Some(8), None, None);
    let mut buf = [0xffu8; 8];
    file.read().read_at(&mut buf, 0);
    assert_eq!(&buf, b"0123\0\0\0\0");
}

#[test]
fn read_loop_terminates_on_eof() {
    let file = Inode::new(
        InodeAttributes::file(0o644),
        Arc::new(SimulatedClock::default()),
    );
    let payload: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
    file.write().write_at(&payload, 0);

    let mut collected = Vec::new();
    let mut offset = 0u64;
    loop {
        let mut chunk = [0u8; 64];
        let out = file.read().read_at(&mut chunk, offset);
        collected.extend_from_slice(&chunk[..out.copied]);
        offset += out.copied as u64;
        if out.eof {
            break;
        }
    }
    assert_eq!(collected, payload);
}

#[test]
fn setattr_timestamps_follow_clock() {
    let fs = MemFs::new();
    let id = fs.create(ROOT_INODE_ID, "f");
    let inode = fs.get(id);
    let created = inode.read().attributes().crtime;

    fs.clock.advance_time(Duration::from_secs(60));
    inode
        .write()
        .set_attributes(None, Some(FileMode::file(0o600)), None);

    let attrs = inode.read().attributes();
    assert_eq!(attrs.crtime, created);
    assert_eq!(attrs.mtime, created + Duration::from_secs(60));
    assert_eq!(attrs.mode.permissions(), 0o600);
}

// =============================================================================
// Tests: Concurrency
// =============================================================================

#[test]
fn concurrent_writers_to_distinct_ranges() {
    let file = Arc::new(Inode::new(InodeAttributes::file(0o644), Arc::new(SystemClock)));

    let handles: Vec<_> = (0..8u8)
        .map(|t| {
            let file = file.clone();
            thread::spawn(move || {
                for i in 0..16u64 {
                    let offset = (t as u64 * 16 + i) * 4;
                    file.write().write_at(&[t; 4], offset);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let contents = file.read().contents();
    assert_eq!(contents.len(), 8 * 16 * 4);
    for (i, chunk) in contents.chunks(64).enumerate() {
        assert!(chunk.iter().all(|&b| b == i as u8));
    }
}

#[test]
fn readers_run_alongside_directory_churn() {
    let dir = Arc::new(Inode::new(InodeAttributes::dir(0o755), Arc::new(SystemClock)));
    for i in 0..20 {
        dir.write()
            .add_child(InodeId(100 + i), &format!("stable-{i}"), DirentType::File);
    }

    let writer = {
        let dir = dir.clone();
        thread::spawn(move || {
            for round in 0..200u64 {
                let name = format!("churn-{}", round % 5);
                let mut guard = dir.write();
                if guard.lookup_child(&name).is_some() {
                    guard.remove_child(&name);
                } else {
                    guard.add_child(InodeId(1000 + round), &name, DirentType::File);
                }
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let dir = dir.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let guard = dir.read();
                    for i in 0..20 {
                        assert_eq!(
                            guard.lookup_child(&format!("stable-{i}")),
                            Some(InodeId(100 + i))
                        );
                    }
                    let listing = guard.read_dir(0, 1 << 16);
                    assert_eq!(listing.entries, guard.count());
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }

    assert_eq!(dir.read().check_invariants(), Ok(()));
}

#[test]
fn inode_shared_via_arc_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Arc<Inode>>();
    assert_send_sync::<SimulatedClock>();
}
