//! Poseidon hash, native and in-circuit.
//!
//! The two variants share one parameter set and must agree byte for byte;
//! `gadgets::tests` pins that equivalence.

mod config;
mod gadgets;
mod native;

pub use config::{poseidon_config, ALPHA, CAPACITY, FULL_ROUNDS, PARTIAL_ROUNDS, RATE};
pub use gadgets::{hash_nine_var, hash_three_var, hash_two_var};
pub use native::{hash_nine, hash_three, hash_two, WIDE_ARITY};
