//! Merkle membership proof for a single inventory slot.

use ark_bn254::Fr;

use crate::poseidon::hash_two;

/// Sibling path plus direction bits from leaf to root.
///
/// `directions[i]` is true when the node on the path is the right child at
/// level i; the bits spell out the binary expansion of the slot index,
/// least-significant bit first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof {
    path: Vec<Fr>,
    directions: Vec<bool>,
}

impl MerkleProof {
    pub fn new(path: Vec<Fr>, directions: Vec<bool>) -> Self {
        assert_eq!(path.len(), directions.len(), "path/direction length mismatch");
        Self { path, directions }
    }

    /// An all-default proof of the given depth, for key setup.
    pub fn placeholder(depth: usize) -> Self {
        Self {
            path: vec![Fr::from(0u64); depth],
            directions: vec![false; depth],
        }
    }

    pub fn path(&self) -> &[Fr] {
        &self.path
    }

    pub fn directions(&self) -> &[bool] {
        &self.directions
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Root implied by this path for leaf H(item_id, quantity).
    pub fn compute_root(&self, item_id: u64, quantity: u64) -> Fr {
        self.compute_root_from_leaf(hash_two(Fr::from(item_id), Fr::from(quantity)))
    }

    /// Root implied by this path for an already-hashed leaf.
    pub fn compute_root_from_leaf(&self, leaf: Fr) -> Fr {
        let mut current = leaf;
        for (sibling, &is_right) in self.path.iter().zip(self.directions.iter()) {
            current = if is_right {
                hash_two(*sibling, current)
            } else {
                hash_two(current, *sibling)
            };
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let path = vec![Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)];
        let directions = vec![true, false, true];
        let proof = MerkleProof::new(path.clone(), directions.clone());

        assert_eq!(proof.depth(), 3);
        assert_eq!(proof.path(), &path[..]);
        assert_eq!(proof.directions(), &directions[..]);
    }

    #[test]
    fn root_depends_on_quantity() {
        let proof = MerkleProof::new(vec![Fr::from(9u64); 4], vec![false; 4]);
        assert_ne!(proof.compute_root(5, 10), proof.compute_root(5, 11));
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn rejects_ragged_input() {
        let _ = MerkleProof::new(vec![Fr::from(1u64)], vec![true, false]);
    }
}
