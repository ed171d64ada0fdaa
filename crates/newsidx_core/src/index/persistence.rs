//! Index persistence for saving/loading a built index to/from disk.
//!
//! Building an index over a large corpus is slow, so a built index can be
//! written out once and reloaded for repeated search experiments. The
//! restored backend is structurally identical to the one saved: same tree
//! shape, same bucket positions, same array order.
//!
//! ## Format
//!
//! All integers are big-endian.
//! ```text
//! IndexFile {
//!     magic: [0x4E, 0x49, 0x44, 0x58] // "NIDX"
//!     version: u8
//!     backend: u8      // 0 = BST, 1 = AVL, 2 = Hash, 3 = Array
//!     key_count: u64
//!     body             // backend specific, see below
//! }
//!
//! string  = len: u32, utf8 bytes
//! values  = count: u32, [len: u32, value bytes]
//!
//! BST/AVL = key_count x (key: string, values, child_flags: u8)   // pre-order
//! Hash    = capacity: u64, max_load_factor: f64 bits,
//!           key_count x (slot: u64, key: string, values)
//! Array   = key_count x (key: string, values)                    // ascending
//! ```
//!
//! ## Invariants
//!
//! Loading re-checks what the in-memory backends guarantee: tree keys
//! are in order and AVL nodes balanced, every hash key is reachable from
//! its home bucket, array keys strictly ascend. Any violation is reported
//! as [`IndexError::InvalidFormat`].

use crate::config::{validate_load_factor, MAX_HASH_CAPACITY};
use crate::error::{IndexError, IndexResult};
use crate::index::hash::Bucket;
use crate::index::traits::{Index, IndexValue};
use crate::index::tree::{Balance, Link, Node, Tree};
use crate::index::{AnyIndex, HashMapIndex, SortedArrayIndex};
use crate::types::BackendKind;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Magic bytes for index files: "NIDX"
const INDEX_MAGIC: [u8; 4] = [0x4E, 0x49, 0x44, 0x58];

/// Current index file format version.
const INDEX_VERSION: u8 = 1;

/// Size of the fixed header.
const HEADER_LEN: usize = 4 + 1 + 1 + 8;

/// Smallest encoding of one hash bucket: slot, key length, value count.
const MIN_BUCKET_LEN: usize = 8 + 4 + 4;

const LEFT_CHILD: u8 = 0b01;
const RIGHT_CHILD: u8 = 0b10;

/// Header for persisted index files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    /// Backend stored in the file.
    pub kind: BackendKind,
    /// Number of distinct keys.
    pub key_count: u64,
}

/// Serializes an index to bytes.
pub fn persist_index<V: IndexValue>(index: &AnyIndex<V>) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&INDEX_MAGIC);
    buf.push(INDEX_VERSION);
    buf.push(index.kind() as u8);
    buf.extend_from_slice(&(index.len() as u64).to_be_bytes());

    match index {
        AnyIndex::Bst(tree) => write_tree(&mut buf, tree),
        AnyIndex::Avl(tree) => write_tree(&mut buf, tree),
        AnyIndex::Hash(table) => write_hash(&mut buf, table),
        AnyIndex::Array(array) => {
            for (key, values) in array.iter() {
                write_str(&mut buf, key);
                write_values(&mut buf, values);
            }
        }
    }

    buf
}

/// Restores an index from bytes produced by [`persist_index`].
pub fn load_index<V: IndexValue>(data: &[u8]) -> IndexResult<AnyIndex<V>> {
    let mut reader = Reader::new(data);
    let header = read_header(&mut reader)?;
    let count = usize::try_from(header.key_count)
        .map_err(|_| IndexError::invalid_format("key count exceeds address space"))?;

    let index = match header.kind {
        BackendKind::Bst => AnyIndex::Bst(read_tree(&mut reader, count)?),
        BackendKind::Avl => AnyIndex::Avl(read_tree(&mut reader, count)?),
        BackendKind::Hash => AnyIndex::Hash(read_hash(&mut reader, count)?),
        BackendKind::Array => AnyIndex::Array(read_array(&mut reader, count)?),
    };

    if reader.remaining() != 0 {
        return Err(IndexError::invalid_format(format!(
            "{} trailing bytes after index body",
            reader.remaining()
        )));
    }

    Ok(index)
}

/// Restores an index and checks it holds the expected backend.
pub fn load_index_as<V: IndexValue>(
    data: &[u8],
    expected: BackendKind,
) -> IndexResult<AnyIndex<V>> {
    let header = read_index_header(data)?;
    if header.kind != expected {
        return Err(IndexError::backend_mismatch(expected, header.kind));
    }
    load_index(data)
}

/// Reads the header without loading the full index.
pub fn read_index_header(data: &[u8]) -> IndexResult<IndexHeader> {
    read_header(&mut Reader::new(data))
}

/// Writes an index to `path`, replacing any existing file.
pub fn save_to_file<V: IndexValue>(index: &AnyIndex<V>, path: &Path) -> IndexResult<()> {
    let bytes = persist_index(index);
    let mut file = fs::File::create(path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    Ok(())
}

/// Reads an index from `path`.
pub fn load_from_file<V: IndexValue>(path: &Path) -> IndexResult<AnyIndex<V>> {
    let data = fs::read(path)?;
    load_index(&data)
}

fn read_header(reader: &mut Reader<'_>) -> IndexResult<IndexHeader> {
    if reader.remaining() < HEADER_LEN {
        return Err(IndexError::invalid_format("index file too small"));
    }
    if reader.take(4, "magic")? != INDEX_MAGIC {
        return Err(IndexError::invalid_format("invalid index file magic"));
    }

    let version = reader.u8("version")?;
    if version != INDEX_VERSION {
        return Err(IndexError::invalid_format(format!(
            "unsupported index version: {version}"
        )));
    }

    let kind = BackendKind::try_from(reader.u8("backend")?)?;
    let key_count = reader.u64("key count")?;
    Ok(IndexHeader { kind, key_count })
}

fn write_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

fn write_values<V: IndexValue>(buf: &mut Vec<u8>, values: &[V]) {
    buf.extend_from_slice(&(values.len() as u32).to_be_bytes());
    for value in values {
        let bytes = value.to_bytes();
        buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        buf.extend_from_slice(&bytes);
    }
}

fn read_values<V: IndexValue>(reader: &mut Reader<'_>) -> IndexResult<Vec<V>> {
    let count = reader.u32("value count")? as usize;
    let mut values = Vec::with_capacity(count.min(reader.remaining() / 4));
    for _ in 0..count {
        let len = reader.u32("value length")? as usize;
        values.push(V::from_bytes(reader.take(len, "value bytes")?)?);
    }
    Ok(values)
}

fn write_tree<V: IndexValue, B>(buf: &mut Vec<u8>, tree: &Tree<V, B>) {
    let mut stack: Vec<&Node<V>> = tree.root().into_iter().collect();
    while let Some(node) = stack.pop() {
        write_str(buf, &node.key);
        write_values(buf, &node.values);

        let mut flags = 0;
        if node.left.is_some() {
            flags |= LEFT_CHILD;
        }
        if node.right.is_some() {
            flags |= RIGHT_CHILD;
        }
        buf.push(flags);

        // Right pushed first so the left subtree is written first.
        stack.extend(node.right.as_deref());
        stack.extend(node.left.as_deref());
    }
}

/// A node still waiting for one or both of its children.
struct Pending {
    index: usize,
    left: bool,
    right: bool,
}

fn read_tree<V: IndexValue, B: Balance>(
    reader: &mut Reader<'_>,
    count: usize,
) -> IndexResult<Tree<V, B>> {
    let mut nodes: Vec<Link<V>> = Vec::with_capacity(count.min(reader.remaining()));
    let mut children: Vec<(Option<usize>, Option<usize>)> = Vec::with_capacity(nodes.capacity());
    let mut pending: Vec<Pending> = Vec::new();

    for index in 0..count {
        let key = reader.string("node key")?;
        let values = read_values(reader)?;
        let flags = reader.u8("child flags")?;
        if flags & !(LEFT_CHILD | RIGHT_CHILD) != 0 {
            return Err(IndexError::invalid_format(format!(
                "bad child flags {flags:#04x}"
            )));
        }

        if index > 0 {
            let parent = pending
                .last_mut()
                .ok_or_else(|| IndexError::invalid_format("node without a parent"))?;
            if parent.left {
                parent.left = false;
                children[parent.index].0 = Some(index);
            } else {
                parent.right = false;
                children[parent.index].1 = Some(index);
            }
            if !parent.left && !parent.right {
                pending.pop();
            }
        }

        let left = flags & LEFT_CHILD != 0;
        let right = flags & RIGHT_CHILD != 0;
        if left || right {
            pending.push(Pending { index, left, right });
        }
        nodes.push(Some(Node::with_values(key, values, 1)));
        children.push((None, None));
    }

    if !pending.is_empty() {
        return Err(IndexError::invalid_format("tree truncated: missing child nodes"));
    }

    // Pre-order puts every child after its parent, so link back to front.
    for index in (0..count).rev() {
        let (left, right) = children[index];
        let left = left.and_then(|child| nodes[child].take());
        let right = right.and_then(|child| nodes[child].take());
        if let Some(node) = nodes[index].as_mut() {
            node.left = left;
            node.right = right;
            if B::TRACKS_HEIGHT {
                node.update_height();
                if node.balance_factor().abs() > 1 {
                    return Err(IndexError::invalid_format(format!(
                        "unbalanced node {:?}",
                        node.key
                    )));
                }
            }
        }
    }

    let root = nodes.first_mut().and_then(Option::take);
    let tree = Tree::from_root(root, count);

    let mut keys = tree.iter().map(|(key, _)| key);
    if let Some(mut previous) = keys.next() {
        for key in keys {
            if key <= previous {
                return Err(IndexError::invalid_format(format!(
                    "tree keys out of order at {key:?}"
                )));
            }
            previous = key;
        }
    }

    Ok(tree)
}

fn write_hash<V: IndexValue>(buf: &mut Vec<u8>, table: &HashMapIndex<V>) {
    buf.extend_from_slice(&(table.capacity() as u64).to_be_bytes());
    buf.extend_from_slice(&table.max_load_factor().to_bits().to_be_bytes());
    for (slot, bucket) in table.buckets().iter().enumerate() {
        if let Some(bucket) = bucket {
            buf.extend_from_slice(&(slot as u64).to_be_bytes());
            write_str(buf, &bucket.key);
            write_values(buf, &bucket.values);
        }
    }
}

fn read_hash<V: IndexValue>(
    reader: &mut Reader<'_>,
    count: usize,
) -> IndexResult<HashMapIndex<V>> {
    let capacity = reader.u64("capacity")?;
    let max_load_factor = f64::from_bits(reader.u64("load factor")?);
    if validate_load_factor(max_load_factor).is_err() {
        return Err(IndexError::invalid_format(format!(
            "bad max load factor {max_load_factor}"
        )));
    }
    if count > reader.remaining() / MIN_BUCKET_LEN {
        return Err(IndexError::invalid_format("truncated hash buckets"));
    }

    // Beyond its initial size a table only doubles once it holds more than
    // `max_load_factor * capacity` keys.
    let grown = (count as f64 / max_load_factor).ceil() * 2.0;
    let limit = grown.max(MAX_HASH_CAPACITY as f64);
    if capacity == 0 || capacity as f64 > limit {
        return Err(IndexError::invalid_format(format!(
            "bad hash capacity {capacity} for {count} keys"
        )));
    }
    let capacity = usize::try_from(capacity)
        .map_err(|_| IndexError::invalid_format("hash capacity exceeds address space"))?;
    if count > capacity {
        return Err(IndexError::invalid_format("more keys than buckets"));
    }

    let mut buckets: Vec<Option<Bucket<V>>> =
        std::iter::repeat_with(|| None).take(capacity).collect();
    let mut placed = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        let slot = usize::try_from(reader.u64("slot")?)
            .ok()
            .filter(|slot| *slot < capacity)
            .ok_or_else(|| IndexError::invalid_format("slot out of range"))?;
        let key = reader.string("bucket key")?;
        let values = read_values(reader)?;
        if buckets[slot].is_some() {
            return Err(IndexError::invalid_format(format!("slot {slot} stored twice")));
        }
        placed.push(slot);
        buckets[slot] = Some(Bucket { key, values });
    }

    let table = HashMapIndex::from_parts(buckets, max_load_factor);
    for slot in placed {
        let reachable = table.buckets()[slot]
            .as_ref()
            .is_some_and(|bucket| table.locate(&bucket.key) == Some(slot));
        if !reachable {
            return Err(IndexError::invalid_format(format!(
                "bucket {slot} is not reachable from its home slot"
            )));
        }
    }

    Ok(table)
}

fn read_array<V: IndexValue>(
    reader: &mut Reader<'_>,
    count: usize,
) -> IndexResult<SortedArrayIndex<V>> {
    let mut entries: Vec<(String, Vec<V>)> = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        let key = reader.string("array key")?;
        let values = read_values(reader)?;
        if let Some((previous, _)) = entries.last() {
            if key.as_str() <= previous.as_str() {
                return Err(IndexError::invalid_format(format!(
                    "array keys out of order at {key:?}"
                )));
            }
        }
        entries.push((key, values));
    }
    Ok(SortedArrayIndex::from_sorted(entries))
}

/// Bounds-checked cursor over persisted bytes.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> IndexResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(IndexError::invalid_format(format!("truncated {what}")));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn u8(&mut self, what: &str) -> IndexResult<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn u32(&mut self, what: &str) -> IndexResult<u32> {
        let mut arr = [0u8; 4];
        arr.copy_from_slice(self.take(4, what)?);
        Ok(u32::from_be_bytes(arr))
    }

    fn u64(&mut self, what: &str) -> IndexResult<u64> {
        let mut arr = [0u8; 8];
        arr.copy_from_slice(self.take(8, what)?);
        Ok(u64::from_be_bytes(arr))
    }

    fn string(&mut self, what: &str) -> IndexResult<String> {
        let len = self.u32(what)? as usize;
        String::from_utf8(self.take(len, what)?.to_vec())
            .map_err(|_| IndexError::invalid_format(format!("invalid UTF-8 in {what}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{AvlIndex, BstIndex};
    use crate::types::DocumentId;

    fn doc(name: &str) -> DocumentId {
        DocumentId::from(name)
    }

    fn sample_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("husky", "a.json"),
            ("beanpot", "a.json"),
            ("northeastern", "b.json"),
            ("husky", "b.json"),
            ("boston", "c.json"),
            ("arena", "c.json"),
            ("zamboni", "a.json"),
        ]
    }

    fn build(kind: BackendKind) -> AnyIndex<DocumentId> {
        let mut index = match kind {
            BackendKind::Hash => AnyIndex::Hash(HashMapIndex::with_capacity(7)),
            other => AnyIndex::with_kind(other),
        };
        for (key, value) in sample_pairs() {
            index.insert(key, doc(value));
        }
        index
    }

    #[test]
    fn every_backend_roundtrips() {
        for kind in BackendKind::ALL {
            let index = build(kind);
            let bytes = persist_index(&index);
            let loaded: AnyIndex<DocumentId> = load_index(&bytes).unwrap();

            assert_eq!(loaded.kind(), kind);
            assert_eq!(loaded.len(), index.len());
            assert_eq!(loaded.keys_in_order(), index.keys_in_order());
            for key in index.keys_in_order() {
                assert_eq!(loaded.search(key), index.search(key), "{kind}: {key}");
            }
            // Same state serializes to the same bytes.
            assert_eq!(persist_index(&loaded), bytes);
        }
    }

    #[test]
    fn tree_shape_is_preserved() {
        let mut avl: AvlIndex<u64> = AvlIndex::new();
        for (i, key) in ["m", "d", "t", "a", "g", "p", "x", "b"].iter().enumerate() {
            avl.insert(key, i as u64);
        }
        let before = (avl.tree_height(), avl.leaf_keys().join(","));

        let loaded = load_index::<u64>(&persist_index(&AnyIndex::Avl(avl))).unwrap();
        let AnyIndex::Avl(restored) = loaded else {
            panic!("expected AVL backend");
        };
        assert_eq!((restored.tree_height(), restored.leaf_keys().join(",")), before);
        assert_eq!(restored.stale_heights(), 0);
    }

    #[test]
    fn restored_avl_keeps_balancing() {
        let mut avl: AvlIndex<u64> = AvlIndex::new();
        for i in 0..50u64 {
            avl.insert(&format!("k{i:03}"), i);
        }
        let loaded = load_index::<u64>(&persist_index(&AnyIndex::Avl(avl))).unwrap();
        let AnyIndex::Avl(mut restored) = loaded else {
            panic!("expected AVL backend");
        };
        for i in 50..200u64 {
            restored.insert(&format!("k{i:03}"), i);
        }
        assert!(restored.is_balanced());
        assert_eq!(restored.len(), 200);
    }

    #[test]
    fn degenerate_bst_roundtrips_without_recursion() {
        let mut bst: BstIndex<u64> = BstIndex::new();
        for i in 0..5_000u64 {
            bst.insert(&format!("{i:06}"), i);
        }
        let loaded = load_index::<u64>(&persist_index(&AnyIndex::Bst(bst))).unwrap();
        let AnyIndex::Bst(restored) = loaded else {
            panic!("expected BST backend");
        };
        assert_eq!(restored.tree_height(), 5_000);
        assert_eq!(restored.search("004999"), &[4999]);
    }

    #[test]
    fn hash_slots_are_preserved() {
        let index = build(BackendKind::Hash);
        let AnyIndex::Hash(original) = &index else {
            unreachable!()
        };
        let loaded = load_index::<DocumentId>(&persist_index(&index)).unwrap();
        let AnyIndex::Hash(restored) = loaded else {
            panic!("expected hash backend");
        };
        assert_eq!(restored.capacity(), original.capacity());
        for key in original.keys_in_order() {
            assert_eq!(restored.locate(key), original.locate(key));
        }
    }

    #[test]
    fn header_inspection() {
        let bytes = persist_index(&build(BackendKind::Array));
        let header = read_index_header(&bytes).unwrap();
        assert_eq!(header.kind, BackendKind::Array);
        assert_eq!(header.key_count, 6);
    }

    #[test]
    fn backend_mismatch_reported() {
        let bytes = persist_index(&build(BackendKind::Bst));
        let err = load_index_as::<DocumentId>(&bytes, BackendKind::Avl).unwrap_err();
        assert!(matches!(err, IndexError::BackendMismatch { .. }));
    }

    #[test]
    fn invalid_magic_rejected() {
        let data = vec![0u8; HEADER_LEN];
        assert!(load_index::<u64>(&data).is_err());
    }

    #[test]
    fn truncated_file_rejected() {
        let bytes = persist_index(&build(BackendKind::Avl));
        for cut in [3, HEADER_LEN, bytes.len() - 1] {
            assert!(load_index::<DocumentId>(&bytes[..cut]).is_err(), "cut at {cut}");
        }
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = persist_index(&build(BackendKind::Array));
        bytes.push(0);
        assert!(load_index::<DocumentId>(&bytes).is_err());
    }

    #[test]
    fn unordered_array_rejected() {
        let mut index: SortedArrayIndex<u64> = SortedArrayIndex::new();
        index.insert("a", 1);
        index.insert("b", 2);
        let mut bytes = persist_index(&AnyIndex::Array(index));
        // Swap the single-byte keys "a" and "b".
        let a = bytes.iter().position(|&b| b == b'a').unwrap();
        let b = bytes.iter().position(|&b| b == b'b').unwrap();
        bytes.swap(a, b);
        assert!(load_index::<u64>(&bytes).is_err());
    }

    #[test]
    fn moved_hash_bucket_rejected() {
        let mut table: HashMapIndex<u64> = HashMapIndex::with_capacity(64);
        table.insert("beanpot", 1);
        let home = table.home_slot("beanpot") as u64;
        let mut bytes = persist_index(&AnyIndex::Hash(table));
        // Slot field follows header, capacity and load factor.
        let slot_at = HEADER_LEN + 16;
        assert_eq!(&bytes[slot_at..slot_at + 8], &home.to_be_bytes());
        bytes[slot_at..slot_at + 8].copy_from_slice(&((home + 1) % 64).to_be_bytes());
        assert!(load_index::<u64>(&bytes).is_err());
    }

    #[test]
    fn oversized_hash_capacity_rejected() {
        let table: HashMapIndex<u64> = HashMapIndex::with_capacity(4);
        let mut bytes = persist_index(&AnyIndex::Hash(table));
        // Capacity field directly follows the header.
        bytes[HEADER_LEN..HEADER_LEN + 8].copy_from_slice(&(1u64 << 32).to_be_bytes());

        let err = load_index::<u64>(&bytes).unwrap_err();
        assert!(matches!(err, IndexError::InvalidFormat { .. }), "{err}");
    }

    #[test]
    fn oversized_hash_key_count_rejected() {
        let table: HashMapIndex<u64> = HashMapIndex::with_capacity(4);
        let mut bytes = persist_index(&AnyIndex::Hash(table));
        // Key count is the last header field.
        bytes[HEADER_LEN - 8..HEADER_LEN].copy_from_slice(&(1u64 << 40).to_be_bytes());

        let err = load_index::<u64>(&bytes).unwrap_err();
        assert!(matches!(err, IndexError::InvalidFormat { .. }), "{err}");
    }

    #[test]
    fn grown_hash_table_roundtrips() {
        let mut table: HashMapIndex<u64> = HashMapIndex::with_capacity(2);
        for i in 0..1_000u64 {
            table.insert(&format!("k{i}"), i);
        }
        let capacity = table.capacity();

        let loaded = load_index::<u64>(&persist_index(&AnyIndex::Hash(table))).unwrap();
        let AnyIndex::Hash(restored) = loaded else {
            panic!("expected hash backend");
        };
        assert_eq!(restored.capacity(), capacity);
        assert_eq!(restored.search("k999"), &[999]);
    }

    #[test]
    fn empty_index_roundtrip() {
        for kind in BackendKind::ALL {
            let index: AnyIndex<u64> = match kind {
                BackendKind::Hash => AnyIndex::Hash(HashMapIndex::with_capacity(4)),
                other => AnyIndex::with_kind(other),
            };
            let loaded = load_index::<u64>(&persist_index(&index)).unwrap();
            assert!(loaded.is_empty());
        }
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.nidx");
        let index = build(BackendKind::Avl);

        save_to_file(&index, &path).unwrap();
        let loaded: AnyIndex<DocumentId> = load_from_file(&path).unwrap();
        assert_eq!(loaded.search("husky"), &[doc("a.json"), doc("b.json")]);
    }
}
