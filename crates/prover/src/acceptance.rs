//! Reference implementation of the host verifier's acceptance rule.
//!
//! The real verifier is a contract on the host chain; this mirror encodes
//! the exact checks it must perform so the replay, cross-instance, and
//! registry-divergence paths can be exercised end to end without a chain.
//!
//! For each `StateTransition` submission the host checks, in order:
//! 1. the `nonce` public input equals the stored per-instance nonce,
//! 2. the `instance_id` public input equals the stored identity,
//! 3. the `registry_root` public input equals the trusted registry digest,
//! 4. the `signal_hash` public input equals the hash recomputed from the
//!    stored commitment and capacity plus the announced parameters,
//! 5. the Groth16 proof verifies.
//!
//! Acceptance atomically replaces the stored commitment and bumps the
//! nonce; any failed check leaves the record untouched.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, VerifyingKey};
use ark_snark::SNARK;

use vault_circuits::signal::{OpType, SignalInputs};

use crate::error::ProverError;

/// What the host stores per inventory. The blinding, tree, and volume
/// never appear here.
#[derive(Clone, Debug)]
pub struct InstanceRecord {
    pub commitment: Fr,
    pub nonce: u64,
    pub instance_id: Fr,
    pub max_capacity: u64,
}

/// The cleartext parameters a submitter announces alongside the proof.
#[derive(Clone, Copy, Debug)]
pub struct TransitionAnnouncement {
    pub new_commitment: Fr,
    pub op_type: OpType,
    pub item_id: u32,
    pub amount: u64,
}

impl InstanceRecord {
    pub fn new(initial_commitment: Fr, instance_id: Fr, max_capacity: u64) -> Self {
        Self {
            commitment: initial_commitment,
            nonce: 0,
            instance_id,
            max_capacity,
        }
    }

    /// Run the acceptance rule for one state transition.
    pub fn apply_state_transition(
        &mut self,
        vk: &VerifyingKey<Bn254>,
        proof: &Proof<Bn254>,
        public_inputs: &[Fr],
        announced: &TransitionAnnouncement,
        trusted_registry_root: Fr,
    ) -> Result<(), ProverError> {
        let [signal_hash, nonce, instance_id, registry_root]: [Fr; 4] = public_inputs
            .try_into()
            .map_err(|_| {
                ProverError::Encoding(format!(
                    "state transition carries 4 public inputs, got {}",
                    public_inputs.len()
                ))
            })?;

        if nonce != Fr::from(self.nonce) {
            return Err(ProverError::StaleOrInconsistent(format!(
                "nonce does not match stored value {}",
                self.nonce
            )));
        }
        if instance_id != self.instance_id {
            return Err(ProverError::StaleOrInconsistent(
                "proof is bound to a different instance".into(),
            ));
        }
        if registry_root != trusted_registry_root {
            return Err(ProverError::StaleOrInconsistent(
                "registry root diverges from the trusted digest".into(),
            ));
        }

        let expected_signal = SignalInputs {
            old_commitment: self.commitment,
            new_commitment: announced.new_commitment,
            registry_root: trusted_registry_root,
            max_capacity: self.max_capacity,
            item_id: announced.item_id as u64,
            amount: announced.amount,
            op_type: announced.op_type,
            nonce: self.nonce,
            instance_id: self.instance_id,
        }
        .hash();
        if signal_hash != expected_signal {
            return Err(ProverError::StaleOrInconsistent(
                "signal hash does not match the announced transition".into(),
            ));
        }

        let verified = Groth16::<Bn254>::verify(vk, public_inputs, proof)?;
        if !verified {
            return Err(ProverError::StaleOrInconsistent("proof does not verify".into()));
        }

        self.commitment = announced.new_commitment;
        self.nonce += 1;
        Ok(())
    }
}
