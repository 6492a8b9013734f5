use crate::graph::NodeId;
use ark_std::{error, fmt};
use zkinfer_algebra::prelude::AlgebraError;

pub(crate) type Result<T> = core::result::Result<T, R1csError>;

#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum R1csError {
    /// Algebra error
    Algebra(AlgebraError),
    /// The graph contains an operator that has no R1CS lowering.
    UnsupportedOperation { node: NodeId, op: String },
    /// The graph is structurally malformed.
    InvalidGraph(String),
    /// An input value is not an integer representable in the field.
    InputRange { name: String, value: String },
    /// A graph input has no assigned value.
    MissingInput(String),
    /// A value was supplied for a name that is not a graph input.
    UnknownInput(String),
    /// An `AssertEqual` node does not hold on the given inputs.
    UnsatisfiedAssertion { node: NodeId },
    /// A value does not fit the signed bit width of its range check.
    RangeOverflow { node: NodeId, bits: u32 },
    /// The generated witness does not satisfy the circuit.
    WitnessInconsistency(String),
    /// An optimization level outside `0..=3`.
    InvalidOptimizationLevel(String),
    /// A circuit's stored fingerprint does not match its contents.
    CorruptedCircuit,
}

impl fmt::Display for R1csError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use R1csError::*;
        match self {
            Algebra(e) => write!(f, "Algebra: {}", e),
            UnsupportedOperation { node, op } => {
                write!(f, "Unsupported operation `{}` at node {}", op, node)
            }
            InvalidGraph(msg) => write!(f, "Invalid graph: {}", msg),
            InputRange { name, value } => write!(
                f,
                "Input `{}` = `{}` is not an integer in the signed field range",
                name, value
            ),
            MissingInput(name) => write!(f, "Missing value for input `{}`", name),
            UnknownInput(name) => write!(f, "`{}` is not an input of the circuit", name),
            UnsatisfiedAssertion { node } => write!(f, "Assertion at node {} does not hold", node),
            RangeOverflow { node, bits } => write!(
                f,
                "Value at node {} does not fit in {} signed bits",
                node, bits
            ),
            WitnessInconsistency(msg) => write!(f, "Witness inconsistency: {}", msg),
            InvalidOptimizationLevel(level) => {
                write!(f, "Invalid optimization level `{}`, expected 0 to 3", level)
            }
            CorruptedCircuit => f.write_str("Circuit fingerprint does not match its contents"),
        }
    }
}

impl error::Error for R1csError {}

impl From<AlgebraError> for R1csError {
    fn from(e: AlgebraError) -> R1csError {
        R1csError::Algebra(e)
    }
}
