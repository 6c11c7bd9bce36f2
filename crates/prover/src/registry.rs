//! Local mirror of the public item-volume registry.
//!
//! The registry itself lives with the host; the prover keeps this mirror to
//! look up per-unit volumes when assembling witnesses and to compute the
//! digest the host will compare against. Circuits never open the registry:
//! `item_volume` enters proofs as a bare witness and the host's
//! `registry_root` cross-check is what holds provers to the registered
//! values.

use std::collections::BTreeMap;

use ark_bn254::Fr;
use vault_circuits::poseidon::hash_two;

use crate::error::ProverError;

/// item_id -> volume per unit. Item id 0 is the empty-slot sentinel and
/// cannot be registered.
#[derive(Clone, Debug, Default)]
pub struct VolumeRegistry {
    volumes: BTreeMap<u32, u32>,
}

impl VolumeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: &[(u32, u32)]) -> Result<Self, ProverError> {
        let mut registry = Self::new();
        for &(item_id, volume) in entries {
            registry.register(item_id, volume)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, item_id: u32, volume: u32) -> Result<(), ProverError> {
        if item_id == 0 {
            return Err(ProverError::Encoding(
                "item id 0 is reserved for empty slots".into(),
            ));
        }
        self.volumes.insert(item_id, volume);
        Ok(())
    }

    /// Per-unit volume of a registered item.
    pub fn volume_of(&self, item_id: u32) -> Option<u32> {
        self.volumes.get(&item_id).copied()
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Digest the host pins: a left fold of H(acc, H(item_id, volume)) over
    /// entries in ascending item-id order, seeded with the entry count.
    /// Deterministic for a given mapping; any entry change moves the root.
    pub fn digest(&self) -> Fr {
        let mut acc = Fr::from(self.volumes.len() as u64);
        for (&item_id, &volume) in &self.volumes {
            let leaf = hash_two(Fr::from(item_id as u64), Fr::from(volume as u64));
            acc = hash_two(acc, leaf);
        }
        acc
    }
}
