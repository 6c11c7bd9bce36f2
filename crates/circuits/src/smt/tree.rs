//! Native sparse Merkle tree over inventory slots.
//!
//! The slot index is the item id itself; depth D supports item ids in
//! [0, 2^D). Leaves hash H(item_id, quantity); a slot that has never been
//! written hashes to the canonical empty leaf H(0, 0).
//!
//! Deletion policy: setting a slot to quantity 0 stores the explicit leaf
//! H(item_id, 0), which is distinct from the canonical empty leaf. The tree
//! keeps that leaf forever, so a deleted slot never again satisfies the
//! empty-leaf insertion branch of the update gadget. Callers that stage
//! operations must consult `was_occupied` before witnessing an insertion.

use std::collections::HashMap;

use ark_bn254::Fr;

use super::proof::MerkleProof;
use crate::poseidon::hash_two;

/// Tree depth used by the production circuits (4096 item slots).
pub const DEFAULT_DEPTH: usize = 12;

/// Sparse Merkle tree keyed by item id.
#[derive(Clone, Debug)]
pub struct SparseMerkleTree {
    depth: usize,

    /// (level, index) -> hash; level 0 holds leaves, level `depth` the root.
    /// Only nodes touched by a write are materialized.
    nodes: HashMap<(usize, u64), Fr>,

    /// Every slot ever written, including deleted slots at quantity 0.
    slots: HashMap<u64, u64>,

    /// defaults[l] is the hash of an untouched subtree at level l.
    defaults: Vec<Fr>,
}

impl SparseMerkleTree {
    /// An empty tree of the given depth.
    pub fn new(depth: usize) -> Self {
        assert!(depth > 0 && depth < 64, "unsupported tree depth");

        let mut defaults = Vec::with_capacity(depth + 1);
        defaults.push(hash_two(Fr::from(0u64), Fr::from(0u64)));
        for level in 0..depth {
            let child = defaults[level];
            defaults.push(hash_two(child, child));
        }

        Self {
            depth,
            nodes: HashMap::new(),
            slots: HashMap::new(),
            defaults,
        }
    }

    /// Build a tree from (item_id, quantity) pairs.
    pub fn from_items(items: &[(u64, u64)], depth: usize) -> Self {
        let mut tree = Self::new(depth);
        for &(item_id, quantity) in items {
            tree.update(item_id, quantity);
        }
        tree
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Quantity at a slot; 0 for never-written and deleted slots alike.
    pub fn get(&self, item_id: u64) -> u64 {
        self.slots.get(&item_id).copied().unwrap_or(0)
    }

    /// Whether the slot has ever held a value. Distinguishes a deleted slot
    /// (explicit H(item_id, 0) leaf) from a never-written one (canonical
    /// empty leaf).
    pub fn was_occupied(&self, item_id: u64) -> bool {
        self.slots.contains_key(&item_id)
    }

    /// Set a slot's quantity and rehash its path. Returns the new root.
    pub fn update(&mut self, item_id: u64, quantity: u64) -> Fr {
        assert!(item_id < (1u64 << self.depth), "item id outside tree range");

        self.slots.insert(item_id, quantity);
        let leaf = hash_two(Fr::from(item_id), Fr::from(quantity));
        self.nodes.insert((0, item_id), leaf);

        let mut index = item_id;
        let mut hash = leaf;
        for level in 0..self.depth {
            let sibling = self.node(level, index ^ 1);
            hash = if index & 1 == 0 {
                hash_two(hash, sibling)
            } else {
                hash_two(sibling, hash)
            };
            index >>= 1;
            self.nodes.insert((level + 1, index), hash);
        }
        hash
    }

    pub fn root(&self) -> Fr {
        self.node(self.depth, 0)
    }

    /// Sibling path and direction bits for a slot, valid against the
    /// current root.
    pub fn proof(&self, item_id: u64) -> MerkleProof {
        assert!(item_id < (1u64 << self.depth), "item id outside tree range");

        let mut path = Vec::with_capacity(self.depth);
        let mut directions = Vec::with_capacity(self.depth);
        let mut index = item_id;
        for level in 0..self.depth {
            path.push(self.node(level, index ^ 1));
            directions.push(index & 1 == 1);
            index >>= 1;
        }
        MerkleProof::new(path, directions)
    }

    /// Non-empty slots.
    pub fn items(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.slots
            .iter()
            .filter(|(_, &q)| q > 0)
            .map(|(&id, &q)| (id, q))
    }

    pub fn len(&self) -> usize {
        self.slots.values().filter(|&&q| q > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn node(&self, level: usize, index: u64) -> Fr {
        self.nodes
            .get(&(level, index))
            .copied()
            .unwrap_or(self.defaults[level])
    }
}
