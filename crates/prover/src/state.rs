//! Per-inventory prover state and the stage/commit update discipline.
//!
//! The prover owns, for each live inventory, the full tree plus the running
//! volume, the current blinding, and the nonce. An operation is first
//! *staged* (all witness material computed against a copy) and only
//! *committed* once the external verifier has accepted the proof. A staged
//! transition that is never committed leaves no trace.

use ark_bn254::Fr;

use vault_circuits::commitment::state_commitment;
use vault_circuits::signal::OpType;
use vault_circuits::smt::{MerkleProof, SparseMerkleTree};
use vault_circuits::state_transition::StateWitness;

use crate::error::ProverError;
use crate::registry::VolumeRegistry;

/// Upper bound for quantities, volumes, and capacities.
pub const MAX_VALUE: u64 = u32::MAX as u64;

/// Hidden state of one inventory.
#[derive(Clone, Debug)]
pub struct InventoryState {
    tree: SparseMerkleTree,
    volume: u64,
    blinding: Fr,
    nonce: u64,
}

/// A fully computed state change, ready to be proven and, after external
/// acceptance, committed.
#[derive(Clone, Debug)]
pub struct StagedTransition {
    pub op_type: OpType,
    pub item_id: u32,
    pub amount: u64,
    pub old_quantity: u64,
    pub new_quantity: u64,
    pub item_volume: u64,
    pub max_capacity: u64,
    pub nonce: u64,
    pub old_state: StateWitness,
    pub new_state: StateWitness,
    pub slot_proof: MerkleProof,
    new_tree: SparseMerkleTree,
}

/// The two staged halves of a transfer; each side commits independently
/// once the single transfer proof is accepted.
#[derive(Clone, Debug)]
pub struct StagedTransfer {
    pub source: StagedTransition,
    pub destination: StagedTransition,
}

impl InventoryState {
    /// A fresh, empty inventory.
    pub fn new(depth: usize, blinding: Fr) -> Self {
        Self {
            tree: SparseMerkleTree::new(depth),
            volume: 0,
            blinding,
            nonce: 0,
        }
    }

    /// Rebuild an inventory from its item list; the volume is derived from
    /// the registry.
    pub fn from_items(
        items: &[(u32, u64)],
        depth: usize,
        blinding: Fr,
        registry: &VolumeRegistry,
    ) -> Result<Self, ProverError> {
        let mut tree = SparseMerkleTree::new(depth);
        let mut volume: u64 = 0;
        for &(item_id, quantity) in items {
            if quantity > MAX_VALUE {
                return Err(ProverError::Overflow(format!(
                    "quantity {quantity} of item {item_id} exceeds 32 bits"
                )));
            }
            let item_volume = registry.volume_of(item_id).ok_or_else(|| {
                ProverError::WitnessUnsatisfiable(format!("item {item_id} is not registered"))
            })? as u64;
            let contribution = quantity
                .checked_mul(item_volume)
                .filter(|v| *v <= MAX_VALUE)
                .ok_or_else(|| {
                    ProverError::Overflow(format!("volume contribution of item {item_id}"))
                })?;
            volume = volume
                .checked_add(contribution)
                .filter(|v| *v <= MAX_VALUE)
                .ok_or_else(|| ProverError::Overflow("total volume exceeds 32 bits".into()))?;
            tree.update(item_id as u64, quantity);
        }
        Ok(Self { tree, volume, blinding, nonce: 0 })
    }

    pub fn root(&self) -> Fr {
        self.tree.root()
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn blinding(&self) -> Fr {
        self.blinding
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    pub fn quantity_of(&self, item_id: u32) -> u64 {
        self.tree.get(item_id as u64)
    }

    /// The published commitment for the current state.
    pub fn commitment(&self) -> Fr {
        state_commitment(self.tree.root(), self.volume, self.blinding)
    }

    /// The current state as circuit witness material.
    pub fn witness(&self) -> StateWitness {
        StateWitness {
            root: self.tree.root(),
            volume: self.volume,
            blinding: self.blinding,
        }
    }

    /// Membership proof for an existence claim on the current tree.
    pub fn slot_proof(&self, item_id: u32) -> MerkleProof {
        self.tree.proof(item_id as u64)
    }

    /// Stage a deposit or withdraw. Validates feasibility at the prover
    /// boundary so infeasible requests fail here instead of as an
    /// unsatisfiable circuit.
    pub fn stage(
        &self,
        op_type: OpType,
        item_id: u32,
        amount: u64,
        registry: &VolumeRegistry,
        max_capacity: u64,
        new_blinding: Fr,
    ) -> Result<StagedTransition, ProverError> {
        if item_id == 0 {
            return Err(ProverError::WitnessUnsatisfiable(
                "item id 0 is the empty-slot sentinel".into(),
            ));
        }
        if (item_id as u64) >= (1u64 << self.tree.depth()) {
            return Err(ProverError::WitnessUnsatisfiable(format!(
                "item {item_id} does not fit a depth-{} tree",
                self.tree.depth()
            )));
        }
        if amount > MAX_VALUE {
            return Err(ProverError::Overflow(format!("amount {amount} exceeds 32 bits")));
        }

        let item_volume = registry.volume_of(item_id).ok_or_else(|| {
            ProverError::WitnessUnsatisfiable(format!("item {item_id} is not registered"))
        })? as u64;
        let delta = amount
            .checked_mul(item_volume)
            .filter(|v| *v <= MAX_VALUE)
            .ok_or_else(|| {
                ProverError::Overflow(format!("amount {amount} x volume {item_volume}"))
            })?;

        let slot = item_id as u64;
        let old_quantity = self.tree.get(slot);

        let (new_quantity, new_volume) = match op_type {
            OpType::Deposit => {
                if old_quantity == 0 && self.tree.was_occupied(slot) {
                    // The circuit's insertion branch expects the canonical
                    // empty leaf, but this slot carries the explicit
                    // post-deletion leaf; no witness can bridge the two.
                    return Err(ProverError::WitnessUnsatisfiable(format!(
                        "slot {item_id} was deleted and cannot be re-inserted"
                    )));
                }
                let new_quantity = old_quantity
                    .checked_add(amount)
                    .filter(|v| *v <= MAX_VALUE)
                    .ok_or_else(|| {
                        ProverError::Overflow(format!("quantity of item {item_id}"))
                    })?;
                let new_volume = self
                    .volume
                    .checked_add(delta)
                    .filter(|v| *v <= MAX_VALUE)
                    .ok_or_else(|| ProverError::Overflow("inventory volume".into()))?;
                (new_quantity, new_volume)
            }
            OpType::Withdraw => {
                let new_quantity = old_quantity.checked_sub(amount).ok_or_else(|| {
                    ProverError::WitnessUnsatisfiable(format!(
                        "withdraw {amount} of item {item_id} but only {old_quantity} held"
                    ))
                })?;
                let new_volume = self.volume.checked_sub(delta).ok_or_else(|| {
                    ProverError::WitnessUnsatisfiable(
                        "volume accounting underflow; local state diverged".into(),
                    )
                })?;
                (new_quantity, new_volume)
            }
        };

        if new_volume > max_capacity {
            return Err(ProverError::WitnessUnsatisfiable(format!(
                "volume {new_volume} would exceed capacity {max_capacity}"
            )));
        }

        let slot_proof = self.tree.proof(slot);
        let mut new_tree = self.tree.clone();
        new_tree.update(slot, new_quantity);

        Ok(StagedTransition {
            op_type,
            item_id,
            amount,
            old_quantity,
            new_quantity,
            item_volume,
            max_capacity,
            nonce: self.nonce,
            old_state: self.witness(),
            new_state: StateWitness {
                root: new_tree.root(),
                volume: new_volume,
                blinding: new_blinding,
            },
            slot_proof,
            new_tree,
        })
    }

    /// Apply an accepted transition. Rejects a stage that was not derived
    /// from the current state; committing it would fork the local view
    /// from the host's.
    pub fn commit(&mut self, staged: StagedTransition) -> Result<(), ProverError> {
        if staged.nonce != self.nonce || staged.old_state.root != self.tree.root() {
            return Err(ProverError::StaleOrInconsistent(
                "staged transition does not extend the current state".into(),
            ));
        }
        self.tree = staged.new_tree;
        self.volume = staged.new_state.volume;
        self.blinding = staged.new_state.blinding;
        self.nonce += 1;
        Ok(())
    }
}

/// Stage both halves of a transfer. The destination capacity is checked on
/// the deposit half; the source side inherits its own capacity trivially
/// (volume only decreases).
#[allow(clippy::too_many_arguments)]
pub fn stage_transfer(
    source: &InventoryState,
    destination: &InventoryState,
    item_id: u32,
    amount: u64,
    registry: &VolumeRegistry,
    dst_max_capacity: u64,
    src_new_blinding: Fr,
    dst_new_blinding: Fr,
) -> Result<StagedTransfer, ProverError> {
    let src_staged = source.stage(
        OpType::Withdraw,
        item_id,
        amount,
        registry,
        MAX_VALUE,
        src_new_blinding,
    )?;
    let dst_staged = destination.stage(
        OpType::Deposit,
        item_id,
        amount,
        registry,
        dst_max_capacity,
        dst_new_blinding,
    )?;
    Ok(StagedTransfer {
        source: src_staged,
        destination: dst_staged,
    })
}
