//! Groth16 over rank-1 constraint systems: per-circuit trusted setup,
//! proving and verification.
#![deny(unused_import_braces, unused_qualifications, trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unused_attributes, unused_imports, unused_mut, missing_docs)]
#![deny(unused_comparisons, bare_trait_objects, unused_must_use)]
#![forbid(unsafe_code)]
#![allow(clippy::needless_borrow)]

#[macro_use]
extern crate serde_derive;

/// Module for cooperative cancellation.
pub mod cancel;
/// Module for error handling.
pub mod errors;
/// Module for proving and verification keys.
pub mod keys;
/// Module for proofs and public inputs.
pub mod proof;
/// Module for the prover.
pub mod prover;
mod qap;
/// Module for the trusted setup.
pub mod setup;
/// Module for the verifier.
pub mod verifier;

pub use cancel::CancellationToken;
pub use errors::Groth16Error;
pub use keys::{ProvingKey, VerifyingKey};
pub use proof::{Proof, PublicInputs};
pub use prover::prove;
pub use setup::setup;
pub use verifier::verify;
