//! Fixed-size chained hash table.
//!
//! Buckets hold singly linked chains threaded through an index arena. New
//! nodes are inserted at the head of their chain. The bucket count is fixed
//! at construction and there is no rehashing: the table is built once and
//! only read afterwards.

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over `bytes`.
pub fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Bucket index of `bytes` in a table of `bucket_count` buckets.
pub fn bucket_index(bytes: &[u8], bucket_count: usize) -> usize {
    fnv1a(bytes) as usize % bucket_count
}

/// Values stored in a [`ChainedTable`] carry their own lookup key.
pub trait Keyed {
    fn key(&self) -> &str;
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    next: Option<usize>,
}

#[derive(Debug)]
pub struct ChainedTable<T> {
    heads: Vec<Option<usize>>,
    nodes: Vec<Node<T>>,
}

impl<T: Keyed> ChainedTable<T> {
    /// Creates a table with `bucket_count` empty chains.
    ///
    /// A zero bucket count is bumped to one.
    pub fn new(bucket_count: usize) -> Self {
        Self {
            heads: vec![None; bucket_count.max(1)],
            nodes: Vec::new(),
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    pub fn bucket_of(&self, key: &str) -> usize {
        bucket_index(key.as_bytes(), self.heads.len())
    }

    /// Prepends `value` to the chain selected by its key. Returns the bucket.
    pub fn insert(&mut self, value: T) -> usize {
        let bucket = self.bucket_of(value.key());
        let index = self.nodes.len();
        self.nodes.push(Node {
            value,
            next: self.heads[bucket],
        });
        self.heads[bucket] = Some(index);
        bucket
    }

    /// Walks the key's chain and returns the first value whose stored key
    /// equals `key` exactly.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.chain(self.bucket_of(key)).find(|v| v.key() == key)
    }

    /// Values in `bucket`, head first.
    pub fn chain(&self, bucket: usize) -> Chain<'_, T> {
        Chain {
            nodes: &self.nodes,
            cursor: self.heads.get(bucket).copied().flatten(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.nodes.iter().map(|n| &n.value)
    }
}

pub struct Chain<'a, T> {
    nodes: &'a [Node<T>],
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Chain<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.nodes[self.cursor?];
        self.cursor = node.next;
        Some(&node.value)
    }
}
