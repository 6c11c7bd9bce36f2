//! Existence circuit: "this inventory holds at least `min_quantity` of
//! item `item_id`".
//!
//! Single public input: Poseidon(commitment, item_id, min_quantity). The
//! aggregation binds the three values inseparably while matching hosts
//! that budget one public input per claim.
//!
//! The quantity comparison is enforced with a real range check: without
//! it, a prover could claim any minimum regardless of what the slot holds.

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::commitment::{state_commitment, state_commitment_var};
use crate::poseidon::{hash_three, hash_three_var};
use crate::range_check::enforce_geq;
use crate::smt::{verify_membership, MerkleProof, MerkleProofVar};

/// The aggregated public input.
pub fn existence_hash(commitment: Fr, item_id: u64, min_quantity: u64) -> Fr {
    hash_three(commitment, Fr::from(item_id), Fr::from(min_quantity))
}

#[derive(Clone)]
pub struct ItemExistsCircuit {
    /// Public input.
    pub public_hash: Option<Fr>,

    // Commitment opening
    pub root: Option<Fr>,
    pub volume: Option<u64>,
    pub blinding: Option<Fr>,

    // Claim
    pub item_id: Option<u64>,
    pub actual_quantity: Option<u64>,
    pub min_quantity: Option<u64>,
    pub slot_proof: Option<MerkleProof>,
}

impl ItemExistsCircuit {
    /// Structure-only instance for key setup.
    pub fn setup_shape(depth: usize) -> Self {
        Self {
            public_hash: Some(Fr::from(0u64)),
            root: Some(Fr::from(0u64)),
            volume: Some(0),
            blinding: Some(Fr::from(0u64)),
            item_id: Some(0),
            actual_quantity: Some(0),
            min_quantity: Some(0),
            slot_proof: Some(MerkleProof::placeholder(depth)),
        }
    }

    pub fn new(
        root: Fr,
        volume: u64,
        blinding: Fr,
        item_id: u64,
        actual_quantity: u64,
        min_quantity: u64,
        slot_proof: MerkleProof,
    ) -> Self {
        let commitment = state_commitment(root, volume, blinding);
        Self {
            public_hash: Some(existence_hash(commitment, item_id, min_quantity)),
            root: Some(root),
            volume: Some(volume),
            blinding: Some(blinding),
            item_id: Some(item_id),
            actual_quantity: Some(actual_quantity),
            min_quantity: Some(min_quantity),
            slot_proof: Some(slot_proof),
        }
    }
}

impl ConstraintSynthesizer<Fr> for ItemExistsCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let public_hash = FpVar::new_input(cs.clone(), || {
            self.public_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let root = FpVar::new_witness(cs.clone(), || {
            self.root.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let volume = FpVar::new_witness(cs.clone(), || {
            self.volume
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let blinding = FpVar::new_witness(cs.clone(), || {
            self.blinding.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let item_id = FpVar::new_witness(cs.clone(), || {
            self.item_id
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let actual_qty = FpVar::new_witness(cs.clone(), || {
            self.actual_quantity
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let min_qty = FpVar::new_witness(cs.clone(), || {
            self.min_quantity
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let slot_proof = MerkleProofVar::new_witness(
            cs.clone(),
            self.slot_proof
                .as_ref()
                .ok_or(SynthesisError::AssignmentMissing)?,
        )?;

        // 1. The claimed quantity is really in the tree.
        verify_membership(cs.clone(), &root, &item_id, &actual_qty, &slot_proof)?;

        // 2. actual >= min, as a 32-bit difference.
        enforce_geq(cs.clone(), &actual_qty, &min_qty)?;

        // 3-4. Open the commitment and bind it with the claim.
        let commitment = state_commitment_var(cs.clone(), &root, &volume, &blinding)?;
        let computed = hash_three_var(cs, &commitment, &item_id, &min_qty)?;
        computed.enforce_equal(&public_hash)
    }
}
