use ark_std::{error, fmt};
use zkinfer_algebra::prelude::AlgebraError;
use zkinfer_r1cs::{Fingerprint, R1csError};

pub(crate) type Result<T> = core::result::Result<T, Groth16Error>;

#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum Groth16Error {
    /// Algebra error
    Algebra(AlgebraError),
    /// Constraint system error
    R1cs(R1csError),
    /// Key generation failed.
    SetupError(String),
    /// Proof generation failed.
    ProveError(String),
    /// The key, proof or public inputs belong to different circuits.
    CircuitMismatch {
        expected: Fingerprint,
        found: Fingerprint,
    },
    /// The number of public inputs does not match the verification key.
    MalformedPublicInputs { expected: usize, found: usize },
    /// The operation was cancelled before it completed.
    Cancelled,
}

impl fmt::Display for Groth16Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Groth16Error::*;
        match self {
            Algebra(e) => write!(f, "Algebra: {}", e),
            R1cs(e) => write!(f, "R1CS: {}", e),
            SetupError(msg) => write!(f, "Setup error: {}", msg),
            ProveError(msg) => write!(f, "Prove error: {}", msg),
            CircuitMismatch { expected, found } => write!(
                f,
                "Circuit mismatch: expected circuit {}, found {}",
                expected, found
            ),
            MalformedPublicInputs { expected, found } => write!(
                f,
                "Malformed public inputs: expected {} values, found {}",
                expected, found
            ),
            Cancelled => f.write_str("Operation cancelled"),
        }
    }
}

impl error::Error for Groth16Error {}

impl From<AlgebraError> for Groth16Error {
    fn from(e: AlgebraError) -> Groth16Error {
        Groth16Error::Algebra(e)
    }
}

impl From<R1csError> for Groth16Error {
    fn from(e: R1csError) -> Groth16Error {
        Groth16Error::R1cs(e)
    }
}
