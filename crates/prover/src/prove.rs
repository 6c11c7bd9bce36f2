//! Witness assembly and proving entry points.
//!
//! Each function is a synchronous, blocking call: it builds the circuit
//! from staged material, runs Groth16, then verifies the fresh proof under
//! the paired verifying key before handing it out. A locally failing proof
//! means the key material is wrong, which is fatal for the process, since
//! submitting it externally could never succeed.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof};
use ark_snark::SNARK;
use ark_std::rand::rngs::StdRng;
use ark_std::UniformRand;

use vault_circuits::{
    capacity::CapacityCircuit,
    item_exists::ItemExistsCircuit,
    state_transition::StateTransitionCircuit,
    transfer::TransferCircuit,
};

use crate::context::{KeyPair, ProvingContext};
use crate::error::ProverError;
use crate::state::{InventoryState, StagedTransfer, StagedTransition};

/// A proof together with the public inputs it verifies against, in the
/// circuit's contract order.
#[derive(Clone, Debug)]
pub struct ProofBundle {
    pub proof: Proof<Bn254>,
    pub public_inputs: Vec<Fr>,
}

/// Sample a fresh blinding factor, uniform in the field.
pub fn fresh_blinding(rng: &mut StdRng) -> Fr {
    Fr::rand(rng)
}

fn prove_and_check<C>(
    circuit_name: &'static str,
    keys: &KeyPair,
    circuit: C,
    public_inputs: Vec<Fr>,
    rng: &mut StdRng,
) -> Result<ProofBundle, ProverError>
where
    C: ark_relations::r1cs::ConstraintSynthesizer<Fr>,
{
    let proof = Groth16::<Bn254>::prove(&keys.proving_key, circuit, rng)?;

    let verified = Groth16::<Bn254>::verify(&keys.verifying_key, &public_inputs, &proof)?;
    if !verified {
        return Err(ProverError::KeyMismatch(circuit_name));
    }

    Ok(ProofBundle { proof, public_inputs })
}

/// Prove a staged deposit or withdraw.
pub fn prove_state_transition(
    ctx: &ProvingContext,
    staged: &StagedTransition,
    instance_id: Fr,
    registry_root: Fr,
    rng: &mut StdRng,
) -> Result<ProofBundle, ProverError> {
    if staged.slot_proof.depth() != ctx.tree_depth {
        return Err(ProverError::KeyMismatch("state_transition"));
    }

    let circuit = StateTransitionCircuit::new(
        staged.old_state,
        staged.new_state,
        staged.item_id as u64,
        staged.old_quantity,
        staged.new_quantity,
        staged.amount,
        staged.op_type,
        staged.slot_proof.clone(),
        staged.item_volume,
        registry_root,
        staged.max_capacity,
        staged.nonce,
        instance_id,
    );
    let public_inputs = circuit
        .public_inputs()
        .ok_or_else(|| ProverError::WitnessUnsatisfiable("incomplete witness".into()))?;

    prove_and_check("state_transition", &ctx.state_transition, circuit, public_inputs, rng)
}

/// Prove "at least `min_quantity` of `item_id`" for the current state.
pub fn prove_item_exists(
    ctx: &ProvingContext,
    state: &InventoryState,
    item_id: u32,
    min_quantity: u64,
    rng: &mut StdRng,
) -> Result<ProofBundle, ProverError> {
    if state.depth() != ctx.tree_depth {
        return Err(ProverError::KeyMismatch("item_exists"));
    }

    let actual = state.quantity_of(item_id);
    if actual < min_quantity {
        return Err(ProverError::WitnessUnsatisfiable(format!(
            "holding {actual} of item {item_id}, cannot prove a minimum of {min_quantity}"
        )));
    }

    let circuit = ItemExistsCircuit::new(
        state.root(),
        state.volume(),
        state.blinding(),
        item_id as u64,
        actual,
        min_quantity,
        state.slot_proof(item_id),
    );
    let public_inputs = vec![circuit
        .public_hash
        .ok_or_else(|| ProverError::WitnessUnsatisfiable("incomplete witness".into()))?];

    prove_and_check("item_exists", &ctx.item_exists, circuit, public_inputs, rng)
}

/// Prove the committed volume fits under `max_capacity`.
pub fn prove_capacity(
    ctx: &ProvingContext,
    state: &InventoryState,
    max_capacity: u64,
    rng: &mut StdRng,
) -> Result<ProofBundle, ProverError> {
    if state.volume() > max_capacity {
        return Err(ProverError::WitnessUnsatisfiable(format!(
            "volume {} exceeds the declared capacity {max_capacity}",
            state.volume()
        )));
    }

    let circuit = CapacityCircuit::new(
        state.root(),
        state.volume(),
        state.blinding(),
        max_capacity,
    );
    let public_inputs = vec![circuit
        .public_hash
        .ok_or_else(|| ProverError::WitnessUnsatisfiable("incomplete witness".into()))?];

    prove_and_check("capacity", &ctx.capacity, circuit, public_inputs, rng)
}

/// Prove a staged transfer between two inventories.
#[allow(clippy::too_many_arguments)]
pub fn prove_transfer(
    ctx: &ProvingContext,
    staged: &StagedTransfer,
    src_instance_id: Fr,
    dst_instance_id: Fr,
    registry_root: Fr,
    rng: &mut StdRng,
) -> Result<ProofBundle, ProverError> {
    let src = &staged.source;
    let dst = &staged.destination;
    if src.slot_proof.depth() != ctx.tree_depth || dst.slot_proof.depth() != ctx.tree_depth {
        return Err(ProverError::KeyMismatch("transfer"));
    }

    let circuit = TransferCircuit::new(
        src.old_state,
        src.new_state,
        src.old_quantity,
        src.slot_proof.clone(),
        src_instance_id,
        src.nonce,
        dst.old_state,
        dst.new_state,
        dst.old_quantity,
        dst.slot_proof.clone(),
        dst_instance_id,
        dst.nonce,
        dst.max_capacity,
        src.item_id as u64,
        src.amount,
        src.item_volume,
        registry_root,
    );
    let public_inputs = circuit
        .public_inputs()
        .ok_or_else(|| ProverError::WitnessUnsatisfiable("incomplete witness".into()))?;

    prove_and_check("transfer", &ctx.transfer, circuit, public_inputs, rng)
}
