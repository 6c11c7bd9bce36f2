//! Off-chain prover for privacy-preserving inventories.
//!
//! Responsibilities, in data-flow order: keep the hidden per-inventory
//! state ([`InventoryState`]), stage operations against it, assemble
//! witnesses and run Groth16 ([`prove`]), encode proofs and public inputs
//! for the host ([`encoding`]), and model the host's acceptance rule for
//! testing ([`acceptance`]).
//!
//! Proving is synchronous and CPU-bound; callers that want parallelism
//! dispatch independent inventories to separate workers. Operations on one
//! inventory are strictly sequential in nonce order: the next stage must
//! not start until the previous submission was accepted and committed.

pub mod acceptance;
pub mod context;
pub mod encoding;
pub mod error;
pub mod prove;
pub mod registry;
pub mod state;
pub mod verify;

pub use acceptance::{InstanceRecord, TransitionAnnouncement};
pub use context::{KeyPair, ProvingContext};
pub use error::ProverError;
pub use prove::{
    fresh_blinding, prove_capacity, prove_item_exists, prove_state_transition, prove_transfer,
    ProofBundle,
};
pub use registry::VolumeRegistry;
pub use state::{stage_transfer, InventoryState, StagedTransfer, StagedTransition, MAX_VALUE};
pub use vault_circuits::OpType;
