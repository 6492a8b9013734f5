//! The zkinfer toolchain: compile model graphs into circuits, run the
//! trusted setup, prove and verify inferences, and keep every artifact in
//! a content-addressed workspace.
#![deny(unused_import_braces, unused_qualifications, trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(stable_features, non_shorthand_field_patterns)]
#![deny(unused_attributes, unused_imports, unused_mut)]
#![deny(missing_docs)]
#![deny(unused_comparisons, bare_trait_objects, unused_must_use)]
#![forbid(unsafe_code)]
#![warn(unused, future_incompatible, nonstandard_style, rust_2018_idioms)]
#![allow(clippy::upper_case_acronyms)]

#[macro_use]
extern crate serde_derive;

/// Module for the artifact envelope and artifact names.
pub mod artifact;
/// Module for configuration.
pub mod config;
/// Module for error handling.
pub mod errors;
/// Module for verifier export.
pub mod export;
/// Module for logging setup.
pub mod logging;
/// Module for model loaders.
pub mod model;
/// Module for proof schemes.
pub mod scheme;
/// Module for the artifact store.
pub mod store;
/// Module for the workspace operations.
pub mod workspace;

pub use artifact::{ArtifactId, ArtifactKind, FORMAT_VERSION};
pub use config::Config;
pub use errors::ZkError;
pub use export::ExportFormat;
pub use logging::init_logging;
pub use model::{load_model, LinearModel, ModelFormat};
pub use scheme::{ProofScheme, SchemeKind};
pub use store::{ArtifactStore, ConflictPolicy, NewArtifact};
pub use workspace::{CircuitInfo, ProveRequest, Workspace};
pub use zkinfer_r1cs::{Fingerprint, Graph, Inputs, OptimizationLevel};
