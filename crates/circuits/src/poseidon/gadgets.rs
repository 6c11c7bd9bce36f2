//! In-circuit Poseidon, mirroring the native composers constraint-for-value.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use super::config::poseidon_config;
use super::native::WIDE_ARITY;

fn absorb_and_squeeze_var(
    cs: ConstraintSystemRef<Fr>,
    inputs: Vec<FpVar<Fr>>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::new(cs, poseidon_config());
    sponge.absorb(&inputs)?;
    let out = sponge.squeeze_field_elements(1)?;
    Ok(out[0].clone())
}

/// In-circuit H(a, b).
pub fn hash_two_var(
    cs: ConstraintSystemRef<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    absorb_and_squeeze_var(cs, vec![a.clone(), b.clone()])
}

/// In-circuit H(a, b, c).
pub fn hash_three_var(
    cs: ConstraintSystemRef<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
    c: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    absorb_and_squeeze_var(cs, vec![a.clone(), b.clone(), c.clone()])
}

/// In-circuit H over nine elements.
pub fn hash_nine_var(
    cs: ConstraintSystemRef<Fr>,
    inputs: &[FpVar<Fr>; WIDE_ARITY],
) -> Result<FpVar<Fr>, SynthesisError> {
    absorb_and_squeeze_var(cs, inputs.to_vec())
}
