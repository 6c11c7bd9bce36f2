//! Bit-bounded range checks.
//!
//! Field subtraction wraps: 5 - 10 is not negative but a ~254-bit element.
//! Quantities and volumes are bounded to 32 bits, so every arithmetic
//! result is pinned back into range by decomposition. Only the k needed
//! bits are allocated; reconstructing the value from k boolean witnesses
//! and enforcing equality costs ~k constraints, against ~254 for a full
//! field-width decomposition.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Bit width of quantities, volumes, and capacities.
pub const VALUE_BITS: usize = 32;

/// Enforce 0 <= value < 2^num_bits.
///
/// Allocates `num_bits` boolean witnesses (booleanness is enforced at
/// allocation), then requires sum(b_i * 2^i) == value. A value outside the
/// range has no satisfying bit assignment.
pub fn enforce_in_range(
    cs: ConstraintSystemRef<Fr>,
    value: &FpVar<Fr>,
    num_bits: usize,
) -> Result<(), SynthesisError> {
    let bits = (0..num_bits)
        .map(|i| {
            Boolean::new_witness(cs.clone(), || {
                let v = value.value().unwrap_or_default();
                Ok(v.into_bigint().get_bit(i))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut reconstructed = FpVar::zero();
    let mut power = Fr::from(1u64);
    for bit in &bits {
        let term = FpVar::constant(power);
        reconstructed += bit.select(&term, &FpVar::zero())?;
        power = power + power;
    }

    reconstructed.enforce_equal(value)
}

/// Enforce that a value fits in 32 bits.
pub fn enforce_u32(cs: ConstraintSystemRef<Fr>, value: &FpVar<Fr>) -> Result<(), SynthesisError> {
    enforce_in_range(cs, value, VALUE_BITS)
}

/// Enforce a >= b for 32-bit operands.
///
/// a - b wraps past 2^32 exactly when b > a, so the difference failing the
/// 32-bit check is the comparison.
pub fn enforce_geq(
    cs: ConstraintSystemRef<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
) -> Result<(), SynthesisError> {
    let diff = a - b;
    enforce_u32(cs, &diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_relations::r1cs::ConstraintSystem;
    use std::ops::Neg;

    fn witness(cs: &ConstraintSystemRef<Fr>, v: Fr) -> FpVar<Fr> {
        FpVar::new_witness(cs.clone(), || Ok(v)).unwrap()
    }

    #[test]
    fn accepts_values_in_range() {
        for v in [0u64, 1, 1000, u32::MAX as u64] {
            let cs = ConstraintSystem::<Fr>::new_ref();
            let var = witness(&cs, Fr::from(v));
            enforce_u32(cs.clone(), &var).unwrap();
            assert!(cs.is_satisfied().unwrap(), "rejected {v}");
        }
    }

    #[test]
    fn rejects_two_to_the_32() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let var = witness(&cs, Fr::from(1u64 << 32));
        enforce_u32(cs.clone(), &var).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn rejects_wrapped_negative() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let var = witness(&cs, Fr::from(5u64).neg());
        enforce_u32(cs.clone(), &var).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn geq_is_exact_on_32_bit_inputs() {
        let cases = [
            (100u64, 50u64, true),
            (100, 100, true),
            (u32::MAX as u64, 0, true),
            (50, 100, false),
            (0, 1, false),
        ];
        for (a, b, expect) in cases {
            let cs = ConstraintSystem::<Fr>::new_ref();
            let a_var = witness(&cs, Fr::from(a));
            let b_var = witness(&cs, Fr::from(b));
            enforce_geq(cs.clone(), &a_var, &b_var).unwrap();
            assert_eq!(cs.is_satisfied().unwrap(), expect, "geq({a}, {b})");
        }
    }

    #[test]
    fn narrow_width_check() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let var = witness(&cs, Fr::from(255u64));
        enforce_in_range(cs.clone(), &var, 8).unwrap();
        assert!(cs.is_satisfied().unwrap());

        let cs = ConstraintSystem::<Fr>::new_ref();
        let var = witness(&cs, Fr::from(256u64));
        enforce_in_range(cs.clone(), &var, 8).unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn costs_roughly_one_constraint_per_bit() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let var = witness(&cs, Fr::from(7u64));
        enforce_u32(cs.clone(), &var).unwrap();
        assert!(cs.num_constraints() < 4 * VALUE_BITS);
    }
}
