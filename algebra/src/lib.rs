//! Field, curve and pairing arithmetic over BN254, behind the `Scalar`,
//! `Group` and `Pairing` traits the rest of zkinfer is generic over.
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unused_import_braces, unused_qualifications, trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(stable_features, non_shorthand_field_patterns)]
#![deny(unused_attributes, unused_imports, unused_mut, missing_docs)]
#![deny(renamed_and_removed_lints, unused_allocation)]
#![deny(unused_comparisons, bare_trait_objects, unused_must_use)]
#![forbid(unsafe_code)]
#![allow(clippy::op_ref, clippy::suspicious_op_assign_impl)]

/// The BN254 instantiation.
pub mod bn254;

/// Prime groups and pairings.
pub mod curve;

/// Errors.
pub mod errors;

/// Scalar fields.
pub mod field;

/// Glob-importable traits and helpers.
pub mod prelude;

/// Deterministic randomness for tests and benches.
pub mod rand_helper;

/// Serde through the canonical byte encodings.
pub mod serialization;

/// Signed integers in the field.
pub mod utils;

pub use num_bigint::BigUint;
