use ark_std::{error, fmt};

/// Failures of the field and curve layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AlgebraError {
    /// Zero has no inverse.
    ArithmeticError,
    /// The bytes are not the canonical little-endian encoding of a scalar.
    NonCanonicalScalar,
    /// The bytes do not encode a point of the prime-order subgroup.
    InvalidPoint,
    /// Text or bytes that could not be decoded at all.
    DeserializationError,
    /// A signed integer outside `[-(p-1)/2, (p-1)/2]`.
    OutOfRange,
}

impl fmt::Display for AlgebraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AlgebraError::*;
        f.write_str(match self {
            ArithmeticError => "Arithmetic error: zero has no inverse",
            NonCanonicalScalar => "Scalar encoding is not canonical",
            InvalidPoint => "Bytes do not encode a valid group element",
            DeserializationError => "Could not decode the input",
            OutOfRange => "Integer does not fit the signed range of the field",
        })
    }
}

impl error::Error for AlgebraError {}
