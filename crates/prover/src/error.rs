//! Error taxonomy for the prover.
//!
//! The prover never retries internally and never partially commits state;
//! every failure is surfaced as one tagged variant and recovery belongs to
//! the caller.

use ark_relations::r1cs::SynthesisError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProverError {
    /// The requested operation has no satisfying witness: withdrawing more
    /// than is held, breaching capacity, proving a minimum that is not
    /// met. The honest-prover analogue of "operation rejected"; never
    /// transmitted anywhere.
    #[error("witness unsatisfiable: {0}")]
    WitnessUnsatisfiable(String),

    /// Local arithmetic would leave the 32-bit domain before circuit
    /// synthesis even starts (e.g. amount * item_volume).
    #[error("arithmetic overflow: {0}")]
    Overflow(String),

    /// A freshly generated proof failed verification under the paired
    /// verifying key. The key material is wrong; the process must not
    /// continue submitting with it.
    #[error("proving/verifying key mismatch for the {0} circuit")]
    KeyMismatch(&'static str),

    /// The external verifier rejected the submission: stale nonce, wrong
    /// instance, registry divergence, or an invalid proof. Refresh the
    /// on-chain view and re-prove.
    #[error("rejected by verifier: {0}")]
    StaleOrInconsistent(String),

    /// Malformed bytes on a proof, key, or public-input boundary. Terminal
    /// for the request, harmless for the process.
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("constraint synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ProverError {
    pub(crate) fn encoding(err: impl std::fmt::Display) -> Self {
        Self::Encoding(err.to_string())
    }
}
