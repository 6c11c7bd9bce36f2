//! R1CS gadgets for SMT membership and single-leaf update.

use ark_bn254::Fr;
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use super::proof::MerkleProof;
use crate::poseidon::hash_two_var;

/// Witness allocation of a [`MerkleProof`]. Direction bits are allocated as
/// booleans, so b(b-1)=0 is enforced at allocation.
#[derive(Clone)]
pub struct MerkleProofVar {
    path: Vec<FpVar<Fr>>,
    directions: Vec<Boolean<Fr>>,
}

impl MerkleProofVar {
    pub fn new_witness(
        cs: ConstraintSystemRef<Fr>,
        proof: &MerkleProof,
    ) -> Result<Self, SynthesisError> {
        let path = proof
            .path()
            .iter()
            .map(|sibling| FpVar::new_witness(cs.clone(), || Ok(*sibling)))
            .collect::<Result<Vec<_>, _>>()?;
        let directions = proof
            .directions()
            .iter()
            .map(|&bit| Boolean::new_witness(cs.clone(), || Ok(bit)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { path, directions })
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// Leaf hash H(item_id, quantity) in-circuit.
fn leaf_hash_var(
    cs: ConstraintSystemRef<Fr>,
    item_id: &FpVar<Fr>,
    quantity: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    hash_two_var(cs, item_id, quantity)
}

/// Fold a leaf hash up the witnessed path to the implied root.
pub fn root_from_path_var(
    cs: ConstraintSystemRef<Fr>,
    leaf: &FpVar<Fr>,
    proof: &MerkleProofVar,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut current = leaf.clone();
    for (sibling, is_right) in proof.path.iter().zip(proof.directions.iter()) {
        let left = is_right.select(sibling, &current)?;
        let right = is_right.select(&current, sibling)?;
        current = hash_two_var(cs.clone(), &left, &right)?;
    }
    Ok(current)
}

/// Enforce that slot `item_id` holds `quantity` under `root`.
pub fn verify_membership(
    cs: ConstraintSystemRef<Fr>,
    root: &FpVar<Fr>,
    item_id: &FpVar<Fr>,
    quantity: &FpVar<Fr>,
    proof: &MerkleProofVar,
) -> Result<(), SynthesisError> {
    let leaf = leaf_hash_var(cs.clone(), item_id, quantity)?;
    let implied = root_from_path_var(cs, &leaf, proof)?;
    implied.enforce_equal(root)
}

/// Verify the old slot value under `old_root` and return the root implied
/// by writing `new_quantity` along the same path.
///
/// The old leaf is selected on `old_quantity == 0`: an insertion verifies
/// against the canonical empty leaf H(0, 0), anything else against
/// H(item_id, old_quantity). H(item_id, 0), the leaf a deletion leaves
/// behind, never passes the insertion branch.
pub fn verify_and_update(
    cs: ConstraintSystemRef<Fr>,
    old_root: &FpVar<Fr>,
    item_id: &FpVar<Fr>,
    old_quantity: &FpVar<Fr>,
    new_quantity: &FpVar<Fr>,
    proof: &MerkleProofVar,
) -> Result<FpVar<Fr>, SynthesisError> {
    let zero = FpVar::zero();
    let is_insertion = old_quantity.is_eq(&zero)?;

    let empty_leaf = leaf_hash_var(cs.clone(), &zero, &zero)?;
    let occupied_leaf = leaf_hash_var(cs.clone(), item_id, old_quantity)?;
    let old_leaf = is_insertion.select(&empty_leaf, &occupied_leaf)?;

    let implied_old_root = root_from_path_var(cs.clone(), &old_leaf, proof)?;
    implied_old_root.enforce_equal(old_root)?;

    // Only the target leaf changes, so the sibling path carries over.
    let new_leaf = leaf_hash_var(cs.clone(), item_id, new_quantity)?;
    root_from_path_var(cs, &new_leaf, proof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poseidon::hash_two;
    use crate::smt::SparseMerkleTree;
    use ark_relations::r1cs::ConstraintSystem;

    const DEPTH: usize = 8;

    fn alloc_fr(cs: &ConstraintSystemRef<Fr>, v: u64) -> FpVar<Fr> {
        FpVar::new_witness(cs.clone(), || Ok(Fr::from(v))).unwrap()
    }

    #[test]
    fn membership_holds_for_tree_contents() {
        let mut tree = SparseMerkleTree::new(DEPTH);
        tree.update(3, 25);
        tree.update(200, 7);

        let cs = ConstraintSystem::<Fr>::new_ref();
        let root = FpVar::new_input(cs.clone(), || Ok(tree.root())).unwrap();
        let proof = MerkleProofVar::new_witness(cs.clone(), &tree.proof(3)).unwrap();

        verify_membership(cs.clone(), &root, &alloc_fr(&cs, 3), &alloc_fr(&cs, 25), &proof)
            .unwrap();
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn membership_rejects_wrong_quantity() {
        let mut tree = SparseMerkleTree::new(DEPTH);
        tree.update(3, 25);

        let cs = ConstraintSystem::<Fr>::new_ref();
        let root = FpVar::new_input(cs.clone(), || Ok(tree.root())).unwrap();
        let proof = MerkleProofVar::new_witness(cs.clone(), &tree.proof(3)).unwrap();

        verify_membership(cs.clone(), &root, &alloc_fr(&cs, 3), &alloc_fr(&cs, 24), &proof)
            .unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn update_matches_native_root() {
        let mut tree = SparseMerkleTree::new(DEPTH);
        tree.update(3, 25);
        let old_root = tree.root();
        let proof = tree.proof(3);

        tree.update(3, 40);
        let expected = tree.root();

        let cs = ConstraintSystem::<Fr>::new_ref();
        let old_root_var = FpVar::new_input(cs.clone(), || Ok(old_root)).unwrap();
        let proof_var = MerkleProofVar::new_witness(cs.clone(), &proof).unwrap();

        let new_root = verify_and_update(
            cs.clone(),
            &old_root_var,
            &alloc_fr(&cs, 3),
            &alloc_fr(&cs, 25),
            &alloc_fr(&cs, 40),
            &proof_var,
        )
        .unwrap();

        let expected_var = FpVar::new_input(cs.clone(), || Ok(expected)).unwrap();
        new_root.enforce_equal(&expected_var).unwrap();
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn insertion_uses_canonical_empty_leaf() {
        let mut tree = SparseMerkleTree::new(DEPTH);
        let old_root = tree.root();
        let proof = tree.proof(9);

        tree.update(9, 5);
        let expected = tree.root();

        let cs = ConstraintSystem::<Fr>::new_ref();
        let old_root_var = FpVar::new_input(cs.clone(), || Ok(old_root)).unwrap();
        let proof_var = MerkleProofVar::new_witness(cs.clone(), &proof).unwrap();

        let new_root = verify_and_update(
            cs.clone(),
            &old_root_var,
            &alloc_fr(&cs, 9),
            &alloc_fr(&cs, 0),
            &alloc_fr(&cs, 5),
            &proof_var,
        )
        .unwrap();

        let expected_var = FpVar::new_input(cs.clone(), || Ok(expected)).unwrap();
        new_root.enforce_equal(&expected_var).unwrap();
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn deleted_slot_does_not_pass_as_empty() {
        // Write then delete slot 9: the tree now holds H(9, 0), not the
        // canonical empty leaf, so an insertion witness must fail.
        let mut tree = SparseMerkleTree::new(DEPTH);
        tree.update(9, 5);
        tree.update(9, 0);
        let old_root = tree.root();
        let proof = tree.proof(9);

        assert_ne!(
            hash_two(Fr::from(9u64), Fr::from(0u64)),
            hash_two(Fr::from(0u64), Fr::from(0u64)),
        );

        let cs = ConstraintSystem::<Fr>::new_ref();
        let old_root_var = FpVar::new_input(cs.clone(), || Ok(old_root)).unwrap();
        let proof_var = MerkleProofVar::new_witness(cs.clone(), &proof).unwrap();

        let _ = verify_and_update(
            cs.clone(),
            &old_root_var,
            &alloc_fr(&cs, 9),
            &alloc_fr(&cs, 0),
            &alloc_fr(&cs, 5),
            &proof_var,
        )
        .unwrap();
        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn constraint_cost_scales_with_depth() {
        let tree = SparseMerkleTree::new(DEPTH);

        let cs = ConstraintSystem::<Fr>::new_ref();
        let root = FpVar::new_input(cs.clone(), || Ok(tree.root())).unwrap();
        let proof = MerkleProofVar::new_witness(cs.clone(), &tree.proof(0)).unwrap();
        verify_membership(cs.clone(), &root, &alloc_fr(&cs, 0), &alloc_fr(&cs, 0), &proof)
            .unwrap();

        // One leaf hash plus DEPTH node hashes.
        assert!(cs.num_constraints() < (DEPTH + 2) * 1000);
    }
}
