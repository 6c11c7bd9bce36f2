//! Circuits and gadgets for privacy-preserving inventories.
//!
//! An inventory's contents live in a sparse Merkle tree; the public world
//! sees only `C = Poseidon(root, total_volume, blinding)`. The circuits in
//! this crate prove, against that commitment:
//!
//! - [`StateTransitionCircuit`]: a deposit or withdraw, with capacity and
//!   arithmetic-consistency enforcement
//! - [`ItemExistsCircuit`]: at least `min_quantity` of an item is held
//! - [`CapacityCircuit`]: the committed volume is within a declared bound
//! - [`TransferCircuit`]: an atomic move between two inventories

pub mod capacity;
pub mod commitment;
pub mod item_exists;
pub mod poseidon;
pub mod range_check;
pub mod signal;
pub mod smt;
pub mod state_transition;
pub mod transfer;


pub use capacity::{capacity_hash, CapacityCircuit};
pub use commitment::{state_commitment, state_commitment_var};
pub use item_exists::{existence_hash, ItemExistsCircuit};
pub use range_check::{enforce_geq, enforce_in_range, enforce_u32, VALUE_BITS};
pub use signal::{OpType, SignalInputs};
pub use smt::{MerkleProof, SparseMerkleTree, DEFAULT_DEPTH};
pub use state_transition::{StateTransitionCircuit, StateWitness};
pub use transfer::{transfer_hash, TransferCircuit};

use ark_bn254::Fr;

/// The scalar field every commitment, hash, and witness lives in.
pub type ConstraintF = Fr;
