//! Native Poseidon hashing.
//!
//! Fixed-arity composers only: every hash site in the protocol has a known
//! input count (tree nodes and leaves take two, commitments three, the
//! signal and transfer hashes nine), so there is no variadic entry point and
//! no runtime dispatch on input length.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonSponge;
use ark_crypto_primitives::sponge::CryptographicSponge;

use super::config::poseidon_config;

/// Number of preimage elements in the signal and transfer hashes.
pub const WIDE_ARITY: usize = 9;

fn absorb_and_squeeze(inputs: Vec<Fr>) -> Fr {
    let mut sponge = PoseidonSponge::new(poseidon_config());
    sponge.absorb(&inputs);
    sponge.squeeze_field_elements(1)[0]
}

/// H(a, b). Tree nodes, tree leaves, and the capacity public hash.
pub fn hash_two(a: Fr, b: Fr) -> Fr {
    absorb_and_squeeze(vec![a, b])
}

/// H(a, b, c). State commitments and the item-exists public hash.
pub fn hash_three(a: Fr, b: Fr, c: Fr) -> Fr {
    absorb_and_squeeze(vec![a, b, c])
}

/// H over nine elements. Signal-hash and transfer-hash preimages.
pub fn hash_nine(inputs: &[Fr; WIDE_ARITY]) -> Fr {
    absorb_and_squeeze(inputs.to_vec())
}
