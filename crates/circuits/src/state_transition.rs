//! Deposit/withdraw circuit.
//!
//! Public inputs, in contract order:
//! 1. `signal_hash`: binds every operation parameter (see `signal`)
//! 2. `nonce`: checked by the host against the stored instance nonce
//! 3. `instance_id`: checked by the host against the stored identity
//! 4. `registry_root`: checked by the host against the trusted registry
//!
//! Everything else is witness: both states (root, volume, blinding), the
//! slot update (item id, old/new quantity, amount, op type), the Merkle
//! path, the item volume, and the capacity bound.
//!
//! `item_volume` is a bare witness (an in-circuit registry lookup is
//! unaffordable), so the host MUST cross-check `registry_root` against its
//! trusted registry digest before accepting; a prover lying about the
//! volume is not detectable from the proof alone.

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::commitment::{state_commitment, state_commitment_var};
use crate::range_check::{enforce_geq, enforce_u32};
use crate::signal::{signal_hash_var, OpType, SignalInputs};
use crate::smt::{verify_and_update, MerkleProof, MerkleProofVar};

/// Witness bundle for one side of a state change.
#[derive(Clone, Copy, Debug)]
pub struct StateWitness {
    pub root: Fr,
    pub volume: u64,
    pub blinding: Fr,
}

impl StateWitness {
    pub fn commitment(&self) -> Fr {
        state_commitment(self.root, self.volume, self.blinding)
    }
}

/// Deposit or withdraw with capacity and arithmetic-consistency
/// enforcement.
#[derive(Clone)]
pub struct StateTransitionCircuit {
    // Public inputs
    pub signal_hash: Option<Fr>,
    pub nonce: Option<u64>,
    pub instance_id: Option<Fr>,
    pub registry_root: Option<Fr>,

    // State witnesses
    pub old_state: Option<StateWitness>,
    pub new_state: Option<StateWitness>,

    // Slot update witnesses
    pub item_id: Option<u64>,
    pub old_quantity: Option<u64>,
    pub new_quantity: Option<u64>,
    pub amount: Option<u64>,
    pub op_type: Option<OpType>,
    pub slot_proof: Option<MerkleProof>,

    // Registry and capacity witnesses
    pub item_volume: Option<u64>,
    pub max_capacity: Option<u64>,
}

impl StateTransitionCircuit {
    /// Structure-only instance for key setup. The placeholder proof fixes
    /// the constraint count to the given tree depth.
    pub fn setup_shape(depth: usize) -> Self {
        Self {
            signal_hash: Some(Fr::from(0u64)),
            nonce: Some(0),
            instance_id: Some(Fr::from(0u64)),
            registry_root: Some(Fr::from(0u64)),
            old_state: Some(StateWitness {
                root: Fr::from(0u64),
                volume: 0,
                blinding: Fr::from(0u64),
            }),
            new_state: Some(StateWitness {
                root: Fr::from(0u64),
                volume: 0,
                blinding: Fr::from(0u64),
            }),
            item_id: Some(0),
            old_quantity: Some(0),
            new_quantity: Some(0),
            amount: Some(0),
            op_type: Some(OpType::Deposit),
            slot_proof: Some(MerkleProof::placeholder(depth)),
            item_volume: Some(0),
            max_capacity: Some(0),
        }
    }

    /// Fully-witnessed instance. Computes the signal hash from the
    /// commitments implied by the two states.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        old_state: StateWitness,
        new_state: StateWitness,
        item_id: u64,
        old_quantity: u64,
        new_quantity: u64,
        amount: u64,
        op_type: OpType,
        slot_proof: MerkleProof,
        item_volume: u64,
        registry_root: Fr,
        max_capacity: u64,
        nonce: u64,
        instance_id: Fr,
    ) -> Self {
        let signal_hash = SignalInputs {
            old_commitment: old_state.commitment(),
            new_commitment: new_state.commitment(),
            registry_root,
            max_capacity,
            item_id,
            amount,
            op_type,
            nonce,
            instance_id,
        }
        .hash();

        Self {
            signal_hash: Some(signal_hash),
            nonce: Some(nonce),
            instance_id: Some(instance_id),
            registry_root: Some(registry_root),
            old_state: Some(old_state),
            new_state: Some(new_state),
            item_id: Some(item_id),
            old_quantity: Some(old_quantity),
            new_quantity: Some(new_quantity),
            amount: Some(amount),
            op_type: Some(op_type),
            slot_proof: Some(slot_proof),
            item_volume: Some(item_volume),
            max_capacity: Some(max_capacity),
        }
    }

    /// The public-input vector this instance proves against, in contract
    /// order.
    pub fn public_inputs(&self) -> Option<Vec<Fr>> {
        Some(vec![
            self.signal_hash?,
            Fr::from(self.nonce?),
            self.instance_id?,
            self.registry_root?,
        ])
    }
}

impl ConstraintSynthesizer<Fr> for StateTransitionCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        // Public inputs, allocation order = contract order.
        let signal_hash = FpVar::new_input(cs.clone(), || {
            self.signal_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let nonce = FpVar::new_input(cs.clone(), || {
            self.nonce
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let instance_id = FpVar::new_input(cs.clone(), || {
            self.instance_id.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let registry_root = FpVar::new_input(cs.clone(), || {
            self.registry_root.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // State witnesses.
        let old = self.old_state;
        let old_root = FpVar::new_witness(cs.clone(), || {
            old.map(|s| s.root).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let old_volume = FpVar::new_witness(cs.clone(), || {
            old.map(|s| Fr::from(s.volume))
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let old_blinding = FpVar::new_witness(cs.clone(), || {
            old.map(|s| s.blinding)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let new = self.new_state;
        let new_root = FpVar::new_witness(cs.clone(), || {
            new.map(|s| s.root).ok_or(SynthesisError::AssignmentMissing)
        })?;
        let new_volume = FpVar::new_witness(cs.clone(), || {
            new.map(|s| Fr::from(s.volume))
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let new_blinding = FpVar::new_witness(cs.clone(), || {
            new.map(|s| s.blinding)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        // Slot update witnesses.
        let item_id = FpVar::new_witness(cs.clone(), || {
            self.item_id
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let old_qty = FpVar::new_witness(cs.clone(), || {
            self.old_quantity
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let new_qty = FpVar::new_witness(cs.clone(), || {
            self.new_quantity
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let amount = FpVar::new_witness(cs.clone(), || {
            self.amount
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let op_type = FpVar::new_witness(cs.clone(), || {
            self.op_type
                .map(OpType::as_field)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let slot_proof = MerkleProofVar::new_witness(
            cs.clone(),
            self.slot_proof
                .as_ref()
                .ok_or(SynthesisError::AssignmentMissing)?,
        )?;
        let item_volume = FpVar::new_witness(cs.clone(), || {
            self.item_volume
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let max_capacity = FpVar::new_witness(cs.clone(), || {
            self.max_capacity
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        // 1. The claimed new root is the old tree with exactly this slot
        //    rewritten.
        let implied_new_root =
            verify_and_update(cs.clone(), &old_root, &item_id, &old_qty, &new_qty, &slot_proof)?;
        implied_new_root.enforce_equal(&new_root)?;

        // 2. op_type is 0 or 1: op(op - 1) = 0.
        let zero = FpVar::zero();
        let one = FpVar::one();
        let op_is_boolean = &op_type * (&op_type - &one);
        op_is_boolean.enforce_equal(&zero)?;
        let is_deposit = op_type.is_eq(&zero)?;

        // 3. new_qty = old_qty ± amount depending on direction.
        let qty_sum = &old_qty + &amount;
        let qty_diff = &old_qty - &amount;
        let expected_qty = is_deposit.select(&qty_sum, &qty_diff)?;
        new_qty.enforce_equal(&expected_qty)?;

        // 4. An over-withdraw wraps qty_diff past 2^32; pin it back.
        enforce_u32(cs.clone(), &new_qty)?;

        // 5. Volume moves by item_volume * amount in the same direction.
        let delta = &item_volume * &amount;
        let vol_sum = &old_volume + &delta;
        let vol_diff = &old_volume - &delta;
        let expected_volume = is_deposit.select(&vol_sum, &vol_diff)?;
        new_volume.enforce_equal(&expected_volume)?;

        // 6.
        enforce_u32(cs.clone(), &new_volume)?;

        // 7. Capacity: max_capacity >= new_volume.
        enforce_geq(cs.clone(), &max_capacity, &new_volume)?;

        // 8. Commitments over both states.
        let old_commitment =
            state_commitment_var(cs.clone(), &old_root, &old_volume, &old_blinding)?;
        let new_commitment =
            state_commitment_var(cs.clone(), &new_root, &new_volume, &new_blinding)?;

        // 9. The public signal hash binds all of the above.
        let computed_signal = signal_hash_var(
            cs,
            &old_commitment,
            &new_commitment,
            &registry_root,
            &max_capacity,
            &item_id,
            &amount,
            &op_type,
            &nonce,
            &instance_id,
        )?;
        computed_signal.enforce_equal(&signal_hash)
    }
}
