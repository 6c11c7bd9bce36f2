//! Inventory state commitment.
//!
//! C = Poseidon(root, total_volume, blinding). Binding through collision
//! resistance; hiding through the uniformly random blinding, which is
//! refreshed on every state change.

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::poseidon::{hash_three, hash_three_var};

/// Commitment to (root, volume, blinding).
pub fn state_commitment(root: Fr, volume: u64, blinding: Fr) -> Fr {
    hash_three(root, Fr::from(volume), blinding)
}

/// In-circuit commitment over already-allocated components.
pub fn state_commitment_var(
    cs: ConstraintSystemRef<Fr>,
    root: &FpVar<Fr>,
    volume: &FpVar<Fr>,
    blinding: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    hash_three_var(cs, root, volume, blinding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_r1cs_std::alloc::AllocVar;
    use ark_r1cs_std::eq::EqGadget;
    use ark_relations::r1cs::ConstraintSystem;

    #[test]
    fn commitment_binds_each_component() {
        let base = state_commitment(Fr::from(1u64), 2, Fr::from(3u64));
        assert_ne!(base, state_commitment(Fr::from(9u64), 2, Fr::from(3u64)));
        assert_ne!(base, state_commitment(Fr::from(1u64), 9, Fr::from(3u64)));
        assert_ne!(base, state_commitment(Fr::from(1u64), 2, Fr::from(9u64)));
    }

    #[test]
    fn circuit_matches_native() {
        let root = Fr::from(777u64);
        let volume = 31u64;
        let blinding = Fr::from(123456789u64);

        let cs = ConstraintSystem::<Fr>::new_ref();
        let root_var = FpVar::new_witness(cs.clone(), || Ok(root)).unwrap();
        let volume_var = FpVar::new_witness(cs.clone(), || Ok(Fr::from(volume))).unwrap();
        let blinding_var = FpVar::new_witness(cs.clone(), || Ok(blinding)).unwrap();

        let out = state_commitment_var(cs.clone(), &root_var, &volume_var, &blinding_var).unwrap();
        let expected =
            FpVar::new_input(cs.clone(), || Ok(state_commitment(root, volume, blinding))).unwrap();
        out.enforce_equal(&expected).unwrap();
        assert!(cs.is_satisfied().unwrap());
    }
}
