//! Export verifying keys for the host verifier.
//!
//! Loads the proving context from `keys/` (running setup first if the
//! directory does not exist) and emits each circuit's verifying key as a
//! hex string, plus a `verifying_keys.json` the deployment scripts consume.

use std::path::Path;
use std::process::ExitCode;

use ark_std::rand::rngs::StdRng;
use ark_std::rand::SeedableRng;

use vault_circuits::DEFAULT_DEPTH;
use vault_prover::{ProverError, ProvingContext};

fn run() -> Result<(), ProverError> {
    let keys_dir = Path::new("keys");

    let ctx = if keys_dir.exists() {
        println!("Loading proving context from {}", keys_dir.display());
        ProvingContext::load_from_dir(keys_dir)?
    } else {
        println!("No key directory found; running setup (this takes a while)...");
        let mut rng = StdRng::from_entropy();
        let ctx = ProvingContext::setup(DEFAULT_DEPTH, &mut rng)?;
        ctx.save_to_dir(keys_dir)?;
        println!("Keys written to {}", keys_dir.display());
        ctx
    };

    println!("\ntree depth: {}\n", ctx.tree_depth);

    let mut exported = serde_json::Map::new();
    for (name, pair) in ctx.named_pairs() {
        let vk_bytes = pair.verifying_key_bytes()?;
        println!("{name} verifying key ({} bytes):", vk_bytes.len());
        println!("0x{}\n", hex::encode(&vk_bytes));
        exported.insert(
            format!("{name}_vk"),
            serde_json::Value::String(format!("0x{}", hex::encode(&vk_bytes))),
        );
    }

    let json = serde_json::Value::Object(exported);
    let json_path = keys_dir.join("verifying_keys.json");
    let pretty = serde_json::to_string_pretty(&json)
        .map_err(|e| ProverError::Encoding(e.to_string()))?;
    std::fs::write(&json_path, pretty)?;
    println!("JSON written to {}", json_path.display());

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("export-vks failed: {err}");
            ExitCode::FAILURE
        }
    }
}
