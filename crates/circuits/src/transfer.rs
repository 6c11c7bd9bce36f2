//! Transfer circuit: move `amount` of one item between two inventories in
//! a single proof.
//!
//! The source side is a withdraw, the destination side a deposit; both tree
//! updates, the quantity and volume arithmetic, and the destination
//! capacity bound are enforced together so the two half-operations cannot
//! be accepted separately.
//!
//! Public inputs, in contract order:
//! 1. `transfer_hash`: Poseidon over (src_old_c, src_new_c, dst_old_c,
//!    dst_new_c, item_id, amount, dst_max_capacity, src_instance_id,
//!    dst_instance_id)
//! 2. `src_nonce`: checked by the host against the source instance
//! 3. `dst_nonce`: checked by the host against the destination instance
//! 4. `registry_root`: checked by the host against the trusted registry

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::commitment::state_commitment_var;
use crate::poseidon::{hash_nine, hash_nine_var};
use crate::range_check::{enforce_geq, enforce_u32};
use crate::smt::{verify_and_update, MerkleProof, MerkleProofVar};
use crate::state_transition::StateWitness;

/// The aggregated public input.
#[allow(clippy::too_many_arguments)]
pub fn transfer_hash(
    src_old_commitment: Fr,
    src_new_commitment: Fr,
    dst_old_commitment: Fr,
    dst_new_commitment: Fr,
    item_id: u64,
    amount: u64,
    dst_max_capacity: u64,
    src_instance_id: Fr,
    dst_instance_id: Fr,
) -> Fr {
    hash_nine(&[
        src_old_commitment,
        src_new_commitment,
        dst_old_commitment,
        dst_new_commitment,
        Fr::from(item_id),
        Fr::from(amount),
        Fr::from(dst_max_capacity),
        src_instance_id,
        dst_instance_id,
    ])
}

#[derive(Clone)]
pub struct TransferCircuit {
    // Public inputs
    pub public_hash: Option<Fr>,
    pub src_nonce: Option<u64>,
    pub dst_nonce: Option<u64>,
    pub registry_root: Option<Fr>,

    // Source inventory witnesses
    pub src_old_state: Option<StateWitness>,
    pub src_new_state: Option<StateWitness>,
    pub src_old_quantity: Option<u64>,
    pub src_new_quantity: Option<u64>,
    pub src_proof: Option<MerkleProof>,
    pub src_instance_id: Option<Fr>,

    // Destination inventory witnesses
    pub dst_old_state: Option<StateWitness>,
    pub dst_new_state: Option<StateWitness>,
    pub dst_old_quantity: Option<u64>,
    pub dst_new_quantity: Option<u64>,
    pub dst_proof: Option<MerkleProof>,
    pub dst_instance_id: Option<Fr>,
    pub dst_max_capacity: Option<u64>,

    // Shared witnesses
    pub item_id: Option<u64>,
    pub amount: Option<u64>,
    pub item_volume: Option<u64>,
}

impl TransferCircuit {
    /// Structure-only instance for key setup.
    pub fn setup_shape(depth: usize) -> Self {
        let zero_state = StateWitness {
            root: Fr::from(0u64),
            volume: 0,
            blinding: Fr::from(0u64),
        };
        Self {
            public_hash: Some(Fr::from(0u64)),
            src_nonce: Some(0),
            dst_nonce: Some(0),
            registry_root: Some(Fr::from(0u64)),
            src_old_state: Some(zero_state),
            src_new_state: Some(zero_state),
            src_old_quantity: Some(0),
            src_new_quantity: Some(0),
            src_proof: Some(MerkleProof::placeholder(depth)),
            src_instance_id: Some(Fr::from(0u64)),
            dst_old_state: Some(zero_state),
            dst_new_state: Some(zero_state),
            dst_old_quantity: Some(0),
            dst_new_quantity: Some(0),
            dst_proof: Some(MerkleProof::placeholder(depth)),
            dst_instance_id: Some(Fr::from(0u64)),
            dst_max_capacity: Some(0),
            item_id: Some(0),
            amount: Some(0),
            item_volume: Some(0),
        }
    }

    /// Fully-witnessed instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        src_old_state: StateWitness,
        src_new_state: StateWitness,
        src_old_quantity: u64,
        src_proof: MerkleProof,
        src_instance_id: Fr,
        src_nonce: u64,
        dst_old_state: StateWitness,
        dst_new_state: StateWitness,
        dst_old_quantity: u64,
        dst_proof: MerkleProof,
        dst_instance_id: Fr,
        dst_nonce: u64,
        dst_max_capacity: u64,
        item_id: u64,
        amount: u64,
        item_volume: u64,
        registry_root: Fr,
    ) -> Self {
        let public_hash = transfer_hash(
            src_old_state.commitment(),
            src_new_state.commitment(),
            dst_old_state.commitment(),
            dst_new_state.commitment(),
            item_id,
            amount,
            dst_max_capacity,
            src_instance_id,
            dst_instance_id,
        );

        Self {
            public_hash: Some(public_hash),
            src_nonce: Some(src_nonce),
            dst_nonce: Some(dst_nonce),
            registry_root: Some(registry_root),
            src_old_state: Some(src_old_state),
            src_new_state: Some(src_new_state),
            src_old_quantity: Some(src_old_quantity),
            src_new_quantity: Some(src_old_quantity - amount),
            src_proof: Some(src_proof),
            src_instance_id: Some(src_instance_id),
            dst_old_state: Some(dst_old_state),
            dst_new_state: Some(dst_new_state),
            dst_old_quantity: Some(dst_old_quantity),
            dst_new_quantity: Some(dst_old_quantity + amount),
            dst_proof: Some(dst_proof),
            dst_instance_id: Some(dst_instance_id),
            dst_max_capacity: Some(dst_max_capacity),
            item_id: Some(item_id),
            amount: Some(amount),
            item_volume: Some(item_volume),
        }
    }

    /// The public-input vector this instance proves against.
    pub fn public_inputs(&self) -> Option<Vec<Fr>> {
        Some(vec![
            self.public_hash?,
            Fr::from(self.src_nonce?),
            Fr::from(self.dst_nonce?),
            self.registry_root?,
        ])
    }
}

impl ConstraintSynthesizer<Fr> for TransferCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        // Public inputs, allocation order = contract order.
        let public_hash = FpVar::new_input(cs.clone(), || {
            self.public_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let _src_nonce = FpVar::new_input(cs.clone(), || {
            self.src_nonce
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let _dst_nonce = FpVar::new_input(cs.clone(), || {
            self.dst_nonce
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let _registry_root = FpVar::new_input(cs.clone(), || {
            self.registry_root.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let alloc_state = |state: Option<StateWitness>| -> Result<
            (FpVar<Fr>, FpVar<Fr>, FpVar<Fr>),
            SynthesisError,
        > {
            let root = FpVar::new_witness(cs.clone(), || {
                state.map(|s| s.root).ok_or(SynthesisError::AssignmentMissing)
            })?;
            let volume = FpVar::new_witness(cs.clone(), || {
                state
                    .map(|s| Fr::from(s.volume))
                    .ok_or(SynthesisError::AssignmentMissing)
            })?;
            let blinding = FpVar::new_witness(cs.clone(), || {
                state
                    .map(|s| s.blinding)
                    .ok_or(SynthesisError::AssignmentMissing)
            })?;
            Ok((root, volume, blinding))
        };

        let (src_old_root, src_old_volume, src_old_blinding) = alloc_state(self.src_old_state)?;
        let (src_new_root, src_new_volume, src_new_blinding) = alloc_state(self.src_new_state)?;
        let (dst_old_root, dst_old_volume, dst_old_blinding) = alloc_state(self.dst_old_state)?;
        let (dst_new_root, dst_new_volume, dst_new_blinding) = alloc_state(self.dst_new_state)?;

        let alloc_u64 = |value: Option<u64>| {
            FpVar::new_witness(cs.clone(), || {
                value.map(Fr::from).ok_or(SynthesisError::AssignmentMissing)
            })
        };
        let src_old_qty = alloc_u64(self.src_old_quantity)?;
        let src_new_qty = alloc_u64(self.src_new_quantity)?;
        let dst_old_qty = alloc_u64(self.dst_old_quantity)?;
        let dst_new_qty = alloc_u64(self.dst_new_quantity)?;
        let dst_max_capacity = alloc_u64(self.dst_max_capacity)?;
        let item_id = alloc_u64(self.item_id)?;
        let amount = alloc_u64(self.amount)?;
        let item_volume = alloc_u64(self.item_volume)?;

        let src_instance_id = FpVar::new_witness(cs.clone(), || {
            self.src_instance_id
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let dst_instance_id = FpVar::new_witness(cs.clone(), || {
            self.dst_instance_id
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let src_proof = MerkleProofVar::new_witness(
            cs.clone(),
            self.src_proof
                .as_ref()
                .ok_or(SynthesisError::AssignmentMissing)?,
        )?;
        let dst_proof = MerkleProofVar::new_witness(
            cs.clone(),
            self.dst_proof
                .as_ref()
                .ok_or(SynthesisError::AssignmentMissing)?,
        )?;

        // Source: withdraw `amount`.
        let implied_src_root = verify_and_update(
            cs.clone(),
            &src_old_root,
            &item_id,
            &src_old_qty,
            &src_new_qty,
            &src_proof,
        )?;
        implied_src_root.enforce_equal(&src_new_root)?;

        let expected_src_qty = &src_old_qty - &amount;
        src_new_qty.enforce_equal(&expected_src_qty)?;
        enforce_u32(cs.clone(), &src_new_qty)?;

        let delta = &item_volume * &amount;
        let expected_src_volume = &src_old_volume - &delta;
        src_new_volume.enforce_equal(&expected_src_volume)?;
        enforce_u32(cs.clone(), &src_new_volume)?;

        // Destination: deposit `amount`.
        let implied_dst_root = verify_and_update(
            cs.clone(),
            &dst_old_root,
            &item_id,
            &dst_old_qty,
            &dst_new_qty,
            &dst_proof,
        )?;
        implied_dst_root.enforce_equal(&dst_new_root)?;

        let expected_dst_qty = &dst_old_qty + &amount;
        dst_new_qty.enforce_equal(&expected_dst_qty)?;
        enforce_u32(cs.clone(), &dst_new_qty)?;

        let expected_dst_volume = &dst_old_volume + &delta;
        dst_new_volume.enforce_equal(&expected_dst_volume)?;
        enforce_u32(cs.clone(), &dst_new_volume)?;
        enforce_geq(cs.clone(), &dst_max_capacity, &dst_new_volume)?;

        // Commitments over all four states, bound into the public hash.
        let src_old_c =
            state_commitment_var(cs.clone(), &src_old_root, &src_old_volume, &src_old_blinding)?;
        let src_new_c =
            state_commitment_var(cs.clone(), &src_new_root, &src_new_volume, &src_new_blinding)?;
        let dst_old_c =
            state_commitment_var(cs.clone(), &dst_old_root, &dst_old_volume, &dst_old_blinding)?;
        let dst_new_c =
            state_commitment_var(cs.clone(), &dst_new_root, &dst_new_volume, &dst_new_blinding)?;

        let computed = hash_nine_var(
            cs,
            &[
                src_old_c,
                src_new_c,
                dst_old_c,
                dst_new_c,
                item_id,
                amount,
                dst_max_capacity,
                src_instance_id,
                dst_instance_id,
            ],
        )?;
        computed.enforce_equal(&public_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smt::SparseMerkleTree;
    use ark_relations::r1cs::ConstraintSystem;

    const DEPTH: usize = 8;

    fn satisfied(circuit: TransferCircuit) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        cs.is_satisfied().unwrap()
    }

    struct Sides {
        src: SparseMerkleTree,
        dst: SparseMerkleTree,
    }

    fn sides() -> Sides {
        Sides {
            src: SparseMerkleTree::from_items(&[(3, 40)], DEPTH),
            dst: SparseMerkleTree::from_items(&[(7, 5)], DEPTH),
        }
    }

    fn build(
        s: &mut Sides,
        amount: u64,
        src_new_volume: u64,
        dst_new_volume: u64,
        dst_cap: u64,
    ) -> TransferCircuit {
        let item_volume = 2u64;
        let src_old_root = s.src.root();
        let src_proof = s.src.proof(3);
        s.src.update(3, 40 - amount);

        let dst_old_root = s.dst.root();
        let dst_proof = s.dst.proof(3);
        s.dst.update(3, amount);

        TransferCircuit::new(
            StateWitness { root: src_old_root, volume: 80, blinding: Fr::from(1u64) },
            StateWitness { root: s.src.root(), volume: src_new_volume, blinding: Fr::from(2u64) },
            40,
            src_proof,
            Fr::from(1001u64),
            3,
            StateWitness { root: dst_old_root, volume: 10, blinding: Fr::from(3u64) },
            StateWitness { root: s.dst.root(), volume: dst_new_volume, blinding: Fr::from(4u64) },
            0,
            dst_proof,
            Fr::from(1002u64),
            8,
            dst_cap,
            3,
            amount,
            item_volume,
            Fr::from(5555u64),
        )
    }

    #[test]
    fn transfer_satisfies() {
        let mut s = sides();
        // 10 units of volume 2 leave src (80 -> 60) and land in dst
        // (10 -> 30).
        let circuit = build(&mut s, 10, 60, 30, 100);
        assert!(satisfied(circuit));
    }

    #[test]
    fn transfer_exceeding_dst_capacity_fails() {
        let mut s = sides();
        let circuit = build(&mut s, 10, 60, 30, 25);
        assert!(!satisfied(circuit));
    }

    #[test]
    fn transfer_with_wrong_volume_fails() {
        let mut s = sides();
        let circuit = build(&mut s, 10, 61, 30, 100);
        assert!(!satisfied(circuit));
    }

    #[test]
    fn public_inputs_follow_contract_order() {
        let mut s = sides();
        let circuit = build(&mut s, 10, 60, 30, 100);
        let publics = circuit.public_inputs().unwrap();
        assert_eq!(publics.len(), 4);
        assert_eq!(publics[0], circuit.public_hash.unwrap());
        assert_eq!(publics[1], Fr::from(3u64));
        assert_eq!(publics[2], Fr::from(8u64));
        assert_eq!(publics[3], Fr::from(5555u64));
    }
}
