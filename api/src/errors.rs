use crate::artifact::ArtifactKind;
use crate::scheme::SchemeKind;
use std::{error, fmt, io};
use zkinfer_algebra::prelude::AlgebraError;
use zkinfer_groth16::Groth16Error;
use zkinfer_r1cs::R1csError;

pub(crate) type Result<T> = core::result::Result<T, ZkError>;

#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum ZkError {
    Algebra(AlgebraError),
    R1cs(R1csError),
    Groth16(Groth16Error),
    /// An artifact with this name already exists and the store refuses to replace it.
    DuplicateArtifact(String),
    ArtifactNotFound(String),
    /// A string that is not a valid artifact name.
    InvalidArtifactId(String),
    /// The artifact was written by an incompatible version of the envelope format.
    UnsupportedFormatVersion(u8),
    ArtifactKindMismatch {
        expected: ArtifactKind,
        found: ArtifactKind,
    },
    SchemeMismatch {
        expected: SchemeKind,
        found: SchemeKind,
    },
    /// The scheme is recognised but has no implementation.
    SchemeNotSupported(SchemeKind),
    UnknownScheme(String),
    UnknownExportFormat(String),
    SerializationError(String),
    DeserializationError(String),
    InvalidModel(String),
    /// The operation was cancelled; any partial write was rolled back.
    Cancelled,
    Io(String),
    Config(String),
}

impl fmt::Display for ZkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ZkError::*;
        match self {
            Algebra(e) => write!(f, "Algebra: {}", e),
            R1cs(e) => write!(f, "R1CS: {}", e),
            Groth16(e) => write!(f, "Groth16: {}", e),
            DuplicateArtifact(id) => write!(f, "Artifact {} already exists", id),
            ArtifactNotFound(id) => write!(f, "Artifact {} not found", id),
            InvalidArtifactId(id) => write!(f, "Invalid artifact name: {}", id),
            UnsupportedFormatVersion(v) => write!(f, "Unsupported artifact format version {}", v),
            ArtifactKindMismatch { expected, found } => {
                write!(f, "Expected a {} artifact, found a {}", expected, found)
            }
            SchemeMismatch { expected, found } => {
                write!(f, "Expected a {} artifact, found a {} one", expected, found)
            }
            SchemeNotSupported(kind) => write!(f, "Proof scheme {} is not supported", kind),
            UnknownScheme(s) => write!(f, "Unknown proof scheme: {}", s),
            UnknownExportFormat(s) => write!(f, "Unknown export format: {}", s),
            SerializationError(msg) => write!(f, "Could not serialize: {}", msg),
            DeserializationError(msg) => write!(f, "Could not deserialize: {}", msg),
            InvalidModel(msg) => write!(f, "Invalid model: {}", msg),
            Cancelled => f.write_str("Operation cancelled"),
            Io(msg) => write!(f, "I/O: {}", msg),
            Config(msg) => write!(f, "Configuration: {}", msg),
        }
    }
}

impl error::Error for ZkError {}

impl From<AlgebraError> for ZkError {
    fn from(e: AlgebraError) -> ZkError {
        ZkError::Algebra(e)
    }
}

impl From<R1csError> for ZkError {
    fn from(e: R1csError) -> ZkError {
        ZkError::R1cs(e)
    }
}

impl From<Groth16Error> for ZkError {
    fn from(e: Groth16Error) -> ZkError {
        match e {
            Groth16Error::Cancelled => ZkError::Cancelled,
            e => ZkError::Groth16(e),
        }
    }
}

impl From<io::Error> for ZkError {
    fn from(e: io::Error) -> ZkError {
        ZkError::Io(e.to_string())
    }
}

impl From<config::ConfigError> for ZkError {
    fn from(e: config::ConfigError) -> ZkError {
        ZkError::Config(e.to_string())
    }
}
