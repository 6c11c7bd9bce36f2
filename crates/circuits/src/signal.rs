//! Signal hash: one public input standing for nine bound parameters.
//!
//! Host verifiers budget public inputs tightly, so the state-transition
//! circuit exposes a single hash over everything the host must pin down:
//!
//!   signal_hash = Poseidon(old_commitment, new_commitment, registry_root,
//!                          max_capacity, item_id, amount, op_type, nonce,
//!                          instance_id)
//!
//! The circuit recomputes the hash from witnesses; the host recomputes it
//! from values it stores or receives. Any disagreement in any position
//! changes the hash.

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::poseidon::{hash_nine, hash_nine_var};

/// State-changing operation kind, field-encoded as 0 or 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OpType {
    Deposit = 0,
    Withdraw = 1,
}

impl OpType {
    pub fn as_field(self) -> Fr {
        Fr::from(self as u64)
    }
}

/// The nine bound parameters, in preimage order.
#[derive(Clone, Debug)]
pub struct SignalInputs {
    pub old_commitment: Fr,
    pub new_commitment: Fr,
    pub registry_root: Fr,
    pub max_capacity: u64,
    pub item_id: u64,
    pub amount: u64,
    pub op_type: OpType,
    pub nonce: u64,
    pub instance_id: Fr,
}

impl SignalInputs {
    pub fn hash(&self) -> Fr {
        hash_nine(&[
            self.old_commitment,
            self.new_commitment,
            self.registry_root,
            Fr::from(self.max_capacity),
            Fr::from(self.item_id),
            Fr::from(self.amount),
            self.op_type.as_field(),
            Fr::from(self.nonce),
            self.instance_id,
        ])
    }
}

/// In-circuit signal hash over already-allocated variables, in the same
/// preimage order as [`SignalInputs::hash`].
#[allow(clippy::too_many_arguments)]
pub fn signal_hash_var(
    cs: ConstraintSystemRef<Fr>,
    old_commitment: &FpVar<Fr>,
    new_commitment: &FpVar<Fr>,
    registry_root: &FpVar<Fr>,
    max_capacity: &FpVar<Fr>,
    item_id: &FpVar<Fr>,
    amount: &FpVar<Fr>,
    op_type: &FpVar<Fr>,
    nonce: &FpVar<Fr>,
    instance_id: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    hash_nine_var(
        cs,
        &[
            old_commitment.clone(),
            new_commitment.clone(),
            registry_root.clone(),
            max_capacity.clone(),
            item_id.clone(),
            amount.clone(),
            op_type.clone(),
            nonce.clone(),
            instance_id.clone(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_r1cs_std::alloc::AllocVar;
    use ark_r1cs_std::eq::EqGadget;
    use ark_relations::r1cs::ConstraintSystem;

    fn sample() -> SignalInputs {
        SignalInputs {
            old_commitment: Fr::from(100u64),
            new_commitment: Fr::from(200u64),
            registry_root: Fr::from(300u64),
            max_capacity: 1000,
            item_id: 42,
            amount: 50,
            op_type: OpType::Deposit,
            nonce: 0,
            instance_id: Fr::from(999u64),
        }
    }

    #[test]
    fn deterministic() {
        assert_eq!(sample().hash(), sample().hash());
    }

    #[test]
    fn nonce_changes_hash() {
        let mut other = sample();
        other.nonce = 1;
        assert_ne!(sample().hash(), other.hash());
    }

    #[test]
    fn instance_changes_hash() {
        let mut other = sample();
        other.instance_id = Fr::from(998u64);
        assert_ne!(sample().hash(), other.hash());
    }

    #[test]
    fn op_type_changes_hash() {
        let mut other = sample();
        other.op_type = OpType::Withdraw;
        assert_ne!(sample().hash(), other.hash());
    }

    #[test]
    fn random_preimages_do_not_collide() {
        use ark_std::rand::rngs::StdRng;
        use ark_std::rand::{Rng, SeedableRng};
        use ark_std::UniformRand;

        let mut rng = StdRng::seed_from_u64(719885386);
        let mut seen = Vec::new();
        for _ in 0..64 {
            let inputs = SignalInputs {
                old_commitment: Fr::rand(&mut rng),
                new_commitment: Fr::rand(&mut rng),
                registry_root: Fr::rand(&mut rng),
                max_capacity: rng.gen::<u32>() as u64,
                item_id: rng.gen::<u32>() as u64,
                amount: rng.gen::<u32>() as u64,
                op_type: if rng.gen::<bool>() { OpType::Withdraw } else { OpType::Deposit },
                nonce: rng.gen::<u32>() as u64,
                instance_id: Fr::rand(&mut rng),
            };
            let hash = inputs.hash();
            assert!(!seen.contains(&hash));
            seen.push(hash);
        }
    }

    #[test]
    fn circuit_matches_native() {
        let inputs = sample();
        let expected = inputs.hash();

        let cs = ConstraintSystem::<Fr>::new_ref();
        let w = |v: Fr| FpVar::new_witness(cs.clone(), || Ok(v)).unwrap();

        let computed = signal_hash_var(
            cs.clone(),
            &w(inputs.old_commitment),
            &w(inputs.new_commitment),
            &w(inputs.registry_root),
            &w(Fr::from(inputs.max_capacity)),
            &w(Fr::from(inputs.item_id)),
            &w(Fr::from(inputs.amount)),
            &w(inputs.op_type.as_field()),
            &w(Fr::from(inputs.nonce)),
            &w(inputs.instance_id),
        )
        .unwrap();

        let expected_var = FpVar::new_input(cs.clone(), || Ok(expected)).unwrap();
        computed.enforce_equal(&expected_var).unwrap();
        assert!(cs.is_satisfied().unwrap());
    }
}
