//! Poseidon parameters for the BN254 scalar field.
//!
//! Rate 2, capacity 1, x^5 S-box, 8 full + 57 partial rounds. The round
//! constants and MDS matrix are derived deterministically once and shared
//! read-only; native and in-circuit hashing consume the same configuration,
//! so their outputs are identical by construction.

use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_ff::Field;

/// Full rounds, split symmetrically around the partial rounds.
pub const FULL_ROUNDS: usize = 8;

/// Partial rounds (single S-box per round).
pub const PARTIAL_ROUNDS: usize = 57;

/// S-box exponent.
pub const ALPHA: u64 = 5;

/// Sponge rate: two field elements absorbed per permutation.
pub const RATE: usize = 2;

/// Sponge capacity.
pub const CAPACITY: usize = 1;

const WIDTH: usize = RATE + CAPACITY;

static CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();

/// The shared Poseidon configuration.
pub fn poseidon_config() -> &'static PoseidonConfig<Fr> {
    CONFIG.get_or_init(|| PoseidonConfig {
        full_rounds: FULL_ROUNDS,
        partial_rounds: PARTIAL_ROUNDS,
        alpha: ALPHA,
        ark: round_constants(),
        mds: mds_matrix(),
        rate: RATE,
        capacity: CAPACITY,
    })
}

/// Cauchy construction: mds[i][j] = (x_i + y_j)^-1 with {x_i} and {y_j}
/// pairwise distinct and disjoint, which makes every square submatrix
/// invertible.
fn mds_matrix() -> Vec<Vec<Fr>> {
    (0..WIDTH)
        .map(|i| {
            (0..WIDTH)
                .map(|j| {
                    let sum = Fr::from((i + 1) as u64) + Fr::from((j + 1 + WIDTH) as u64);
                    // x_i + y_j is a small nonzero constant
                    sum.inverse().expect("Cauchy denominator is nonzero")
                })
                .collect()
        })
        .collect()
}

/// Deterministic round-constant schedule: repeated squaring of a fixed
/// domain tag. Reproducible across prover and verifier builds.
fn round_constants() -> Vec<Vec<Fr>> {
    let rounds = FULL_ROUNDS + PARTIAL_ROUNDS;
    let mut state = Fr::from(0x7661756c745f7073u64);
    let mut ark = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        let mut row = Vec::with_capacity(WIDTH);
        for _ in 0..WIDTH {
            state = state.square() + Fr::from(5u64);
            row.push(state);
        }
        ark.push(row);
    }
    ark
}
