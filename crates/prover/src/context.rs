//! Key ownership: trusted setup, persistence, and the proving context.
//!
//! One `ProvingContext` owns the key pairs for all four circuits at a fixed
//! tree depth. It is immutable after construction and freely shareable
//! across threads; there is no global key cache.

use std::path::Path;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use vault_circuits::{
    CapacityCircuit, ItemExistsCircuit, StateTransitionCircuit, TransferCircuit,
};

use crate::error::ProverError;

/// Proving and verifying key for one circuit.
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub proving_key: ProvingKey<Bn254>,
    pub verifying_key: VerifyingKey<Bn254>,
}

impl KeyPair {
    pub fn proving_key_bytes(&self) -> Result<Vec<u8>, ProverError> {
        let mut bytes = Vec::new();
        self.proving_key
            .serialize_compressed(&mut bytes)
            .map_err(ProverError::encoding)?;
        Ok(bytes)
    }

    pub fn verifying_key_bytes(&self) -> Result<Vec<u8>, ProverError> {
        let mut bytes = Vec::new();
        self.verifying_key
            .serialize_compressed(&mut bytes)
            .map_err(ProverError::encoding)?;
        Ok(bytes)
    }

    pub fn from_bytes(pk_bytes: &[u8], vk_bytes: &[u8]) -> Result<Self, ProverError> {
        Ok(Self {
            proving_key: ProvingKey::deserialize_compressed(pk_bytes)
                .map_err(ProverError::encoding)?,
            verifying_key: VerifyingKey::deserialize_compressed(vk_bytes)
                .map_err(ProverError::encoding)?,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct ContextMeta {
    tree_depth: usize,
}

/// All key material for one deployment.
pub struct ProvingContext {
    /// Tree depth the state-changing circuits were set up for. Proofs built
    /// against a different depth will not verify.
    pub tree_depth: usize,
    pub state_transition: KeyPair,
    pub item_exists: KeyPair,
    pub capacity: KeyPair,
    pub transfer: KeyPair,
}

impl ProvingContext {
    /// Run circuit-specific setup for every circuit.
    ///
    /// Callers choose the rng: a ceremony-derived seed in production, a
    /// fixed seed in tests and tooling.
    pub fn setup(tree_depth: usize, rng: &mut StdRng) -> Result<Self, ProverError> {
        let state_transition = keypair(
            Groth16::<Bn254>::circuit_specific_setup(
                StateTransitionCircuit::setup_shape(tree_depth),
                rng,
            )?,
        );
        let item_exists = keypair(Groth16::<Bn254>::circuit_specific_setup(
            ItemExistsCircuit::setup_shape(tree_depth),
            rng,
        )?);
        let capacity = keypair(Groth16::<Bn254>::circuit_specific_setup(
            CapacityCircuit::setup_shape(),
            rng,
        )?);
        let transfer = keypair(Groth16::<Bn254>::circuit_specific_setup(
            TransferCircuit::setup_shape(tree_depth),
            rng,
        )?);

        Ok(Self {
            tree_depth,
            state_transition,
            item_exists,
            capacity,
            transfer,
        })
    }

    /// Persist every key pair plus the context metadata.
    pub fn save_to_dir(&self, dir: &Path) -> Result<(), ProverError> {
        std::fs::create_dir_all(dir)?;

        let meta = serde_json::to_vec_pretty(&ContextMeta { tree_depth: self.tree_depth })
            .map_err(ProverError::encoding)?;
        std::fs::write(dir.join("context.json"), meta)?;

        for (name, pair) in self.named_pairs() {
            std::fs::write(dir.join(format!("{name}.pk")), pair.proving_key_bytes()?)?;
            std::fs::write(dir.join(format!("{name}.vk")), pair.verifying_key_bytes()?)?;
        }
        Ok(())
    }

    pub fn load_from_dir(dir: &Path) -> Result<Self, ProverError> {
        let meta: ContextMeta =
            serde_json::from_slice(&std::fs::read(dir.join("context.json"))?)
                .map_err(ProverError::encoding)?;

        let load = |name: &str| -> Result<KeyPair, ProverError> {
            KeyPair::from_bytes(
                &std::fs::read(dir.join(format!("{name}.pk")))?,
                &std::fs::read(dir.join(format!("{name}.vk")))?,
            )
        };

        Ok(Self {
            tree_depth: meta.tree_depth,
            state_transition: load("state_transition")?,
            item_exists: load("item_exists")?,
            capacity: load("capacity")?,
            transfer: load("transfer")?,
        })
    }

    pub fn named_pairs(&self) -> [(&'static str, &KeyPair); 4] {
        [
            ("state_transition", &self.state_transition),
            ("item_exists", &self.item_exists),
            ("capacity", &self.capacity),
            ("transfer", &self.transfer),
        ]
    }
}

fn keypair((pk, vk): (ProvingKey<Bn254>, VerifyingKey<Bn254>)) -> KeyPair {
    KeyPair {
        proving_key: pk,
        verifying_key: vk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::rand::SeedableRng;

    #[test]
    fn keys_round_trip_through_bytes() {
        let mut rng = StdRng::seed_from_u64(99);
        let pair = keypair(
            Groth16::<Bn254>::circuit_specific_setup(CapacityCircuit::setup_shape(), &mut rng)
                .unwrap(),
        );

        let pk_bytes = pair.proving_key_bytes().unwrap();
        let vk_bytes = pair.verifying_key_bytes().unwrap();
        let restored = KeyPair::from_bytes(&pk_bytes, &vk_bytes).unwrap();

        assert_eq!(restored.verifying_key_bytes().unwrap(), vk_bytes);
    }

    #[test]
    fn garbage_bytes_are_an_encoding_error() {
        let err = KeyPair::from_bytes(&[1, 2, 3], &[4, 5, 6]).unwrap_err();
        assert!(matches!(err, ProverError::Encoding(_)));
    }
}
