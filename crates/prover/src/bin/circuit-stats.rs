//! Report constraint counts per circuit.
//!
//! Usage: cargo run --release --bin circuit-stats [depth]

use std::process::ExitCode;

use ark_bn254::Fr;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};

use vault_circuits::{
    CapacityCircuit, ItemExistsCircuit, StateTransitionCircuit, TransferCircuit, DEFAULT_DEPTH,
};

fn count<C: ConstraintSynthesizer<Fr>>(name: &str, circuit: C) -> usize {
    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit
        .generate_constraints(cs.clone())
        .expect("constraint generation on a setup shape");
    let n = cs.num_constraints();
    println!("{name:<18} {n:>8} constraints  {:>6} public inputs", cs.num_instance_variables() - 1);
    n
}

fn main() -> ExitCode {
    let depth = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<usize>() {
            Ok(d) if d > 0 && d < 64 => d,
            _ => {
                eprintln!("invalid depth {arg:?}; expected an integer in 1..64");
                return ExitCode::FAILURE;
            }
        },
        None => DEFAULT_DEPTH,
    };

    println!("tree depth {depth} ({} item slots)\n", 1u64 << depth);

    let total = count("StateTransition", StateTransitionCircuit::setup_shape(depth))
        + count("ItemExists", ItemExistsCircuit::setup_shape(depth))
        + count("Capacity", CapacityCircuit::setup_shape())
        + count("Transfer", TransferCircuit::setup_shape(depth));

    println!("\ntotal {total} constraints across four circuits");
    ExitCode::SUCCESS
}
