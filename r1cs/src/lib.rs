//! Lowering of model computation graphs into rank-1 constraint systems,
//! and generation of satisfying witnesses for them.
#![deny(unused_import_braces, unused_qualifications, trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unused_attributes, unused_imports, unused_mut, missing_docs)]
#![deny(unused_comparisons, bare_trait_objects, unused_must_use)]
#![forbid(unsafe_code)]
#![allow(clippy::upper_case_acronyms)]

#[macro_use]
extern crate serde_derive;

/// Module for R1CS circuits and their fingerprints.
pub mod circuit;
/// Module for lowering a graph into a circuit.
pub mod compiler;
/// Module for the mutable constraint system used during lowering.
pub mod constraint_system;
/// Module for error handling.
pub mod errors;
/// Module for gadgets.
pub mod gadgets;
/// Module for computation graphs.
pub mod graph;
/// Module for neural-network layer helpers.
pub mod layers;
/// Module for linear combinations.
pub mod lc;
mod optimizer;
/// Module for witness generation.
pub mod witness;

pub use circuit::{Circuit, CircuitInterface, Constraint, Fingerprint};
pub use compiler::{compile, CompiledCircuit, OptimizationLevel};
pub use errors::R1csError;
pub use graph::{Graph, Node, NodeId, Visibility};
pub use lc::{LinearCombination, VarIndex, ONE};
pub use witness::{generate_witness, InputValue, Inputs, WitnessAssignment};
