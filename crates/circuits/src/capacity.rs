//! Capacity circuit: "the committed volume is at most `max_capacity`".
//!
//! Single public input: Poseidon(commitment, max_capacity). The volume
//! stays hidden; the bound itself is enforced with a range check on the
//! difference.

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::commitment::{state_commitment, state_commitment_var};
use crate::poseidon::{hash_two, hash_two_var};
use crate::range_check::enforce_geq;

/// The aggregated public input.
pub fn capacity_hash(commitment: Fr, max_capacity: u64) -> Fr {
    hash_two(commitment, Fr::from(max_capacity))
}

#[derive(Clone)]
pub struct CapacityCircuit {
    /// Public input.
    pub public_hash: Option<Fr>,

    // Commitment opening
    pub root: Option<Fr>,
    pub volume: Option<u64>,
    pub blinding: Option<Fr>,

    /// Declared bound, bound into the public hash.
    pub max_capacity: Option<u64>,
}

impl CapacityCircuit {
    /// Structure-only instance for key setup.
    pub fn setup_shape() -> Self {
        Self {
            public_hash: Some(Fr::from(0u64)),
            root: Some(Fr::from(0u64)),
            volume: Some(0),
            blinding: Some(Fr::from(0u64)),
            max_capacity: Some(0),
        }
    }

    pub fn new(root: Fr, volume: u64, blinding: Fr, max_capacity: u64) -> Self {
        let commitment = state_commitment(root, volume, blinding);
        Self {
            public_hash: Some(capacity_hash(commitment, max_capacity)),
            root: Some(root),
            volume: Some(volume),
            blinding: Some(blinding),
            max_capacity: Some(max_capacity),
        }
    }
}

impl ConstraintSynthesizer<Fr> for CapacityCircuit {
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
        let max_capacity = FpVar::new_witness(cs.clone(), || {
            self.max_capacity
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        // 1. Open the commitment.
        let commitment = state_commitment_var(cs.clone(), &root, &volume, &blinding)?;

        // 2. max_capacity >= volume.
        enforce_geq(cs.clone(), &max_capacity, &volume)?;

        // 3. Bind commitment and bound into the public hash.
        let computed = hash_two_var(cs, &commitment, &max_capacity)?;
        computed.enforce_equal(&public_hash)
    }
}
