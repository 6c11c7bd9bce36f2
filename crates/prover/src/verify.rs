//! Local Groth16 verification, used before submission and in tests.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, VerifyingKey};
use ark_snark::SNARK;

use crate::error::ProverError;

/// Verify a `StateTransition` proof against its four public inputs.
pub fn verify_state_transition(
    vk: &VerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    signal_hash: Fr,
    nonce: u64,
    instance_id: Fr,
    registry_root: Fr,
) -> Result<bool, ProverError> {
    let public_inputs = [signal_hash, Fr::from(nonce), instance_id, registry_root];
    Ok(Groth16::<Bn254>::verify(vk, &public_inputs, proof)?)
}

/// Verify an `ItemExists` proof against its aggregated public hash.
pub fn verify_item_exists(
    vk: &VerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    public_hash: Fr,
) -> Result<bool, ProverError> {
    Ok(Groth16::<Bn254>::verify(vk, &[public_hash], proof)?)
}

/// Verify a `Capacity` proof against its aggregated public hash.
pub fn verify_capacity(
    vk: &VerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    public_hash: Fr,
) -> Result<bool, ProverError> {
    Ok(Groth16::<Bn254>::verify(vk, &[public_hash], proof)?)
}

/// Verify a `Transfer` proof against its four public inputs.
pub fn verify_transfer(
    vk: &VerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    transfer_hash: Fr,
    src_nonce: u64,
    dst_nonce: u64,
    registry_root: Fr,
) -> Result<bool, ProverError> {
    let public_inputs = [
        transfer_hash,
        Fr::from(src_nonce),
        Fr::from(dst_nonce),
        registry_root,
    ];
    Ok(Groth16::<Bn254>::verify(vk, &public_inputs, proof)?)
}
