//! Native tree behavior tests.

use ark_bn254::Fr;

use super::{SparseMerkleTree, DEFAULT_DEPTH};

#[test]
fn empty_tree_reads_zero_everywhere() {
    let tree = SparseMerkleTree::new(DEFAULT_DEPTH);
    assert!(tree.is_empty());
    assert_eq!(tree.get(0), 0);
    assert_eq!(tree.get(4095), 0);
    assert!(!tree.was_occupied(17));
}

#[test]
fn writes_change_the_root() {
    let mut tree = SparseMerkleTree::new(DEFAULT_DEPTH);
    let empty_root = tree.root();

    tree.update(1, 100);
    let one_item = tree.root();
    assert_ne!(empty_root, one_item);

    tree.update(1, 150);
    assert_ne!(one_item, tree.root());
    assert_eq!(tree.get(1), 150);
}

#[test]
fn root_is_order_independent() {
    let a = SparseMerkleTree::from_items(&[(1, 100), (42, 50), (4000, 9)], DEFAULT_DEPTH);
    let b = SparseMerkleTree::from_items(&[(4000, 9), (1, 100), (42, 50)], DEFAULT_DEPTH);
    assert_eq!(a.root(), b.root());
}

#[test]
fn proofs_verify_against_current_root() {
    let mut tree = SparseMerkleTree::new(DEFAULT_DEPTH);
    tree.update(7, 33);
    tree.update(2000, 8);

    let proof = tree.proof(7);
    assert_eq!(proof.depth(), DEFAULT_DEPTH);
    assert_eq!(proof.compute_root(7, 33), tree.root());
    assert_ne!(proof.compute_root(7, 32), tree.root());
}

#[test]
fn proof_for_untouched_slot_witnesses_empty_leaf() {
    let mut tree = SparseMerkleTree::new(DEFAULT_DEPTH);
    tree.update(7, 33);

    // Slot 8 was never written: its path verifies the canonical empty leaf.
    let proof = tree.proof(8);
    assert_eq!(proof.compute_root(0, 0), tree.root());
}

#[test]
fn deletion_keeps_explicit_zero_leaf() {
    let mut tree = SparseMerkleTree::new(DEFAULT_DEPTH);
    tree.update(7, 33);
    let occupied_root = tree.root();

    tree.update(7, 0);
    assert_eq!(tree.get(7), 0);
    assert!(tree.was_occupied(7));
    assert_eq!(tree.len(), 0);

    // The deleted slot hashes as H(7, 0): distinct from both the occupied
    // tree and a tree where slot 7 was never written.
    let deleted_root = tree.root();
    assert_ne!(deleted_root, occupied_root);
    assert_ne!(deleted_root, SparseMerkleTree::new(DEFAULT_DEPTH).root());

    let proof = tree.proof(7);
    assert_eq!(proof.compute_root(7, 0), deleted_root);
    assert_ne!(proof.compute_root(0, 0), deleted_root);
}

#[test]
fn direction_bits_follow_item_id() {
    let tree = SparseMerkleTree::new(4);
    let proof = tree.proof(0b1011);
    assert_eq!(proof.directions(), &[true, true, false, true]);
}

#[test]
fn small_tree_matches_hand_rolled_hashing() {
    use crate::poseidon::hash_two;

    let mut tree = SparseMerkleTree::new(2);
    tree.update(2, 5);

    let empty = hash_two(Fr::from(0u64), Fr::from(0u64));
    let leaf = hash_two(Fr::from(2u64), Fr::from(5u64));
    let left = hash_two(empty, empty);
    let right = hash_two(leaf, empty);
    assert_eq!(tree.root(), hash_two(left, right));
}

#[test]
#[should_panic(expected = "outside tree range")]
fn rejects_out_of_range_item() {
    let mut tree = SparseMerkleTree::new(4);
    tree.update(16, 1);
}
