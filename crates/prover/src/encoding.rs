//! Byte layouts shared with the host verifier.
//!
//! Every public input is one field element serialized as 32 little-endian
//! bytes. Proofs travel as the standard Groth16 triple (A, B, C) in either
//! the compressed (128-byte) or uncompressed (256-byte) arkworks encoding;
//! the host's pairing library dictates which one a deployment uses, and the
//! decoder accepts both by length.

use ark_bn254::{Bn254, Fr};
use ark_groth16::Proof;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::error::ProverError;

/// Serialized size of one field element.
pub const FIELD_BYTES: usize = 32;

/// Compressed proof size: two G1 points and one G2 point.
pub const PROOF_BYTES_COMPRESSED: usize = 128;

/// Uncompressed proof size.
pub const PROOF_BYTES_UNCOMPRESSED: usize = 256;

/// Integers carried in public inputs must stay below 2^63.
pub const MAX_INPUT_INT: u64 = 1 << 63;

/// Canonical field representative of a bounded non-negative integer.
pub fn int_to_field(value: u64) -> Result<Fr, ProverError> {
    if value >= MAX_INPUT_INT {
        return Err(ProverError::Encoding(format!(
            "integer {value} exceeds the 63-bit public-input bound"
        )));
    }
    Ok(Fr::from(value))
}

/// 32 little-endian bytes for one field element.
pub fn field_to_bytes(value: &Fr) -> Result<[u8; FIELD_BYTES], ProverError> {
    let mut bytes = Vec::with_capacity(FIELD_BYTES);
    value
        .serialize_compressed(&mut bytes)
        .map_err(ProverError::encoding)?;
    bytes
        .try_into()
        .map_err(|_| ProverError::Encoding("field element serialized to unexpected length".into()))
}

/// Parse 32 little-endian bytes; rejects non-canonical representatives.
pub fn field_from_bytes(bytes: &[u8]) -> Result<Fr, ProverError> {
    if bytes.len() != FIELD_BYTES {
        return Err(ProverError::Encoding(format!(
            "field element must be {FIELD_BYTES} bytes, got {}",
            bytes.len()
        )));
    }
    Fr::deserialize_compressed(bytes).map_err(ProverError::encoding)
}

/// Concatenate a public-input vector in its contract order.
pub fn encode_public_inputs(inputs: &[Fr]) -> Result<Vec<u8>, ProverError> {
    let mut bytes = Vec::with_capacity(inputs.len() * FIELD_BYTES);
    for input in inputs {
        bytes.extend_from_slice(&field_to_bytes(input)?);
    }
    Ok(bytes)
}

/// Split a concatenated public-input vector.
pub fn decode_public_inputs(bytes: &[u8]) -> Result<Vec<Fr>, ProverError> {
    if bytes.len() % FIELD_BYTES != 0 {
        return Err(ProverError::Encoding(format!(
            "public-input blob of {} bytes is not a multiple of {FIELD_BYTES}",
            bytes.len()
        )));
    }
    bytes.chunks_exact(FIELD_BYTES).map(field_from_bytes).collect()
}

/// Serialize a proof, compressed by default.
pub fn proof_to_bytes(proof: &Proof<Bn254>, compressed: bool) -> Result<Vec<u8>, ProverError> {
    let mut bytes = Vec::new();
    if compressed {
        proof
            .serialize_compressed(&mut bytes)
            .map_err(ProverError::encoding)?;
    } else {
        proof
            .serialize_uncompressed(&mut bytes)
            .map_err(ProverError::encoding)?;
    }
    Ok(bytes)
}

/// Parse a proof in either encoding, selected by length.
pub fn proof_from_bytes(bytes: &[u8]) -> Result<Proof<Bn254>, ProverError> {
    match bytes.len() {
        PROOF_BYTES_COMPRESSED => {
            Proof::deserialize_compressed(bytes).map_err(ProverError::encoding)
        }
        PROOF_BYTES_UNCOMPRESSED => {
            Proof::deserialize_uncompressed(bytes).map_err(ProverError::encoding)
        }
        other => Err(ProverError::Encoding(format!(
            "proof must be {PROOF_BYTES_COMPRESSED} or {PROOF_BYTES_UNCOMPRESSED} bytes, got {other}"
        ))),
    }
}
