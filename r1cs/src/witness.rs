use crate::circuit::CircuitInterface;
use crate::compiler::CompiledCircuit;
use crate::errors::{R1csError, Result};
use crate::gadgets::{decompose_signed, power_of_two, relu_value};
use crate::graph::{Graph, Node, NodeId};
use crate::lc::{LinearCombination, VarIndex, ONE};
use ark_std::collections::BTreeMap;
use zkinfer_algebra::prelude::*;

/// A concrete input value: a JSON integer, or a decimal string for values
/// beyond 64 bits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    /// A machine integer.
    Int(i64),
    /// A signed decimal integer of any size.
    Text(String),
}

impl From<i64> for InputValue {
    fn from(v: i64) -> Self {
        InputValue::Int(v)
    }
}

impl From<&str> for InputValue {
    fn from(v: &str) -> Self {
        InputValue::Text(v.to_string())
    }
}

impl From<String> for InputValue {
    fn from(v: String) -> Self {
        InputValue::Text(v)
    }
}

impl InputValue {
    /// Embed into the field, rejecting anything outside `[-(p-1)/2, (p-1)/2]`.
    pub fn to_scalar<F: Scalar>(&self, name: &str) -> Result<F> {
        match self {
            InputValue::Int(v) => Ok(F::from_i64(*v)),
            InputValue::Text(s) => parse_signed_decimal(s)
                .and_then(|(negative, magnitude)| signed_to_scalar(negative, &magnitude))
                .map_err(|_| R1csError::InputRange {
                    name: name.to_string(),
                    value: s.clone(),
                }),
        }
    }
}

/// Named values for the inputs of a graph, public and private alike.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inputs {
    values: BTreeMap<String, InputValue>,
}

impl Inputs {
    /// Create an empty set of inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of `name`.
    pub fn insert<V: Into<InputValue>>(&mut self, name: &str, value: V) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Return the value of `name`.
    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.values.get(name)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InputValue)> {
        self.values.iter()
    }

    /// Return the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return true if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>, V: Into<InputValue>> FromIterator<(S, V)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// How the witness generator computes one or more variables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub enum Hint<F: Scalar> {
    /// `w[var]` is the `slot`-th input of the circuit interface.
    Input {
        /// The target variable.
        var: VarIndex,
        /// Position in the interface inputs.
        slot: usize,
    },
    /// `w[var] = lc`.
    Lc {
        /// The target variable.
        var: VarIndex,
        /// The combination to evaluate.
        lc: LinearCombination<F>,
    },
    /// `w[var] = scale * a * b + plus`.
    Product {
        /// The target variable.
        var: VarIndex,
        /// Left factor.
        a: LinearCombination<F>,
        /// Right factor.
        b: LinearCombination<F>,
        /// Product coefficient.
        scale: F,
        /// Linear part.
        plus: LinearCombination<F>,
    },
    /// `w[first..first + count]` are the little-endian bits of `value + offset`.
    Bits {
        /// First bit variable.
        first: VarIndex,
        /// Number of bits.
        count: u32,
        /// The decomposed value.
        value: LinearCombination<F>,
        /// The shift making the value non-negative.
        offset: F,
    },
}

/// The ordered hints that fill a circuit's witness vector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct WitnessPlan<F: Scalar> {
    hints: Vec<Hint<F>>,
    num_vars: usize,
}

impl<F: Scalar> WitnessPlan<F> {
    pub(crate) fn new(hints: Vec<Hint<F>>, num_vars: usize) -> Self {
        Self { hints, num_vars }
    }

    /// Return the length of the witness vector the plan fills.
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Borrow the hints.
    pub fn hints(&self) -> &[Hint<F>] {
        &self.hints
    }

    /// Run every hint in order over the resolved inputs.
    pub fn execute(&self, inputs: &[F]) -> Result<Vec<F>> {
        let mut w: Vec<Option<F>> = vec![None; self.num_vars];
        if let Some(one) = w.get_mut(ONE) {
            *one = Some(F::one());
        }
        for hint in self.hints.iter() {
            match hint {
                Hint::Input { var, slot } => {
                    let value = inputs.get(*slot).ok_or_else(|| {
                        R1csError::WitnessInconsistency(format!("no value for input slot {}", slot))
                    })?;
                    assign(&mut w, *var, *value)?;
                }
                Hint::Lc { var, lc } => {
                    let value = lc.evaluate_assigned(&w)?;
                    assign(&mut w, *var, value)?;
                }
                Hint::Product {
                    var,
                    a,
                    b,
                    scale,
                    plus,
                } => {
                    let value = a
                        .evaluate_assigned(&w)?
                        .mul(&b.evaluate_assigned(&w)?)
                        .mul(scale)
                        .add(&plus.evaluate_assigned(&w)?);
                    assign(&mut w, *var, value)?;
                }
                Hint::Bits {
                    first,
                    count,
                    value,
                    offset,
                } => {
                    let v = value.evaluate_assigned(&w)?;
                    let bits = decompose_signed(&v, offset, *count).ok_or_else(|| {
                        R1csError::WitnessInconsistency(format!(
                            "value does not fit the {}-bit decomposition at variable {}",
                            count, first
                        ))
                    })?;
                    for (i, bit) in bits.into_iter().enumerate() {
                        let b = if bit { F::one() } else { F::zero() };
                        assign(&mut w, first + i, b)?;
                    }
                }
            }
        }
        w.into_iter()
            .enumerate()
            .map(|(i, v)| {
                v.ok_or_else(|| {
                    R1csError::WitnessInconsistency(format!("variable {} is never assigned", i))
                })
            })
            .collect()
    }
}

fn assign<F: Scalar>(w: &mut [Option<F>], var: VarIndex, value: F) -> Result<()> {
    match w.get_mut(var) {
        Some(slot) if slot.is_none() => {
            *slot = Some(value);
            Ok(())
        }
        Some(_) => Err(R1csError::WitnessInconsistency(format!(
            "variable {} is assigned twice",
            var
        ))),
        None => Err(R1csError::WitnessInconsistency(format!(
            "variable {} is outside the witness",
            var
        ))),
    }
}

/// A full witness `w = [1, public..., private...]` that satisfies its circuit.
/// The values are wiped when dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WitnessAssignment<F: Scalar> {
    values: Vec<F>,
    num_public: usize,
}

impl<F: Scalar> WitnessAssignment<F> {
    /// Borrow the whole witness vector.
    pub fn values(&self) -> &[F] {
        &self.values
    }

    /// Return the public slots `w[1..=num_public]`.
    pub fn public_inputs(&self) -> &[F] {
        &self.values[1..=self.num_public]
    }

    /// Return the number of public slots.
    pub fn num_public(&self) -> usize {
        self.num_public
    }
}

impl<F: Scalar> Drop for WitnessAssignment<F> {
    fn drop(&mut self) {
        self.values.zeroize();
    }
}

/// Map named values onto the circuit's inputs, in interface order.
pub fn resolve_inputs<F: Scalar>(interface: &CircuitInterface, inputs: &Inputs) -> Result<Vec<F>> {
    for (name, _) in inputs.iter() {
        if !interface.inputs.iter().any(|slot| &slot.name == name) {
            return Err(R1csError::UnknownInput(name.clone()));
        }
    }
    interface
        .inputs
        .iter()
        .map(|slot| {
            inputs
                .get(&slot.name)
                .ok_or_else(|| R1csError::MissingInput(slot.name.clone()))?
                .to_scalar(&slot.name)
        })
        .collect()
}

/// Evaluate every node of the graph on concrete inputs, checking assertions
/// and range bounds. Returns the value of every value-producing node.
pub fn evaluate_graph<F: Scalar>(
    graph: &Graph,
    inputs: &BTreeMap<NodeId, F>,
) -> Result<Vec<Option<F>>> {
    let mut values: Vec<Option<F>> = vec![None; graph.len()];
    let get = |values: &[Option<F>], n: NodeId| -> Result<F> {
        values.get(n).copied().flatten().ok_or_else(|| {
            R1csError::InvalidGraph(format!("node {} has no value", n))
        })
    };
    for (id, node) in graph.nodes().iter().enumerate() {
        let value = match node {
            Node::Input { name, .. } => Some(
                *inputs
                    .get(&id)
                    .ok_or_else(|| R1csError::MissingInput(name.clone()))?,
            ),
            Node::Constant { value } => Some(F::from_i64(*value)),
            Node::Linear { terms, bias } => {
                let mut acc = F::from_i64(*bias);
                for (n, c) in terms {
                    acc.add_assign(&get(&values, *n)?.mul(&F::from_i64(*c)));
                }
                Some(acc)
            }
            Node::Mul { lhs, rhs } => Some(get(&values, *lhs)?.mul(&get(&values, *rhs)?)),
            Node::Relu { input, bits } => {
                let x = get(&values, *input)?;
                check_range(&x, *bits, id)?;
                Some(relu_value(&x))
            }
            Node::LessThan { lhs, rhs, bits } => {
                let d = get(&values, *lhs)?.sub(&get(&values, *rhs)?);
                check_range(&d, *bits, id)?;
                let (negative, _) = scalar_to_signed(&d);
                Some(if negative { F::one() } else { F::zero() })
            }
            Node::AssertEqual { lhs, rhs } => {
                if get(&values, *lhs)? != get(&values, *rhs)? {
                    return Err(R1csError::UnsatisfiedAssertion { node: id });
                }
                None
            }
            Node::Output { input, .. } => Some(get(&values, *input)?),
            other => {
                return Err(R1csError::UnsupportedOperation {
                    node: id,
                    op: other.op_name().to_string(),
                })
            }
        };
        values[id] = value;
    }
    Ok(values)
}

fn check_range<F: Scalar>(v: &F, bits: u32, node: NodeId) -> Result<()> {
    match decompose_signed(v, &power_of_two::<F>(bits - 1), bits) {
        Some(_) => Ok(()),
        None => Err(R1csError::RangeOverflow { node, bits }),
    }
}

/// Compute a satisfying witness for a compiled circuit.
///
/// The graph is evaluated first, so a false statement surfaces as
/// `UnsatisfiedAssertion` or `RangeOverflow`. The witness plan is then run
/// and its outputs cross-checked against the graph; any disagreement, or any
/// unsatisfied constraint, is a `WitnessInconsistency`.
pub fn generate_witness<F: Scalar>(
    compiled: &CompiledCircuit<F>,
    inputs: &Inputs,
) -> Result<WitnessAssignment<F>> {
    let circuit = &compiled.circuit;
    let interface = circuit.interface();
    let resolved: Vec<F> = resolve_inputs(interface, inputs)?;

    let by_node: BTreeMap<NodeId, F> = interface
        .inputs
        .iter()
        .zip(resolved.iter())
        .map(|(slot, v)| (slot.node, *v))
        .collect();
    let semantic = evaluate_graph(&compiled.graph, &by_node)?;

    let values = compiled.plan.execute(&resolved)?;
    for output in interface.outputs.iter() {
        let expected = semantic.get(output.node).copied().flatten();
        if expected != values.get(output.var).copied() {
            return Err(R1csError::WitnessInconsistency(format!(
                "output `{}` disagrees with the graph",
                output.name
            )));
        }
    }
    circuit.verify_witness(&values)?;
    tracing::trace!(vars = values.len(), "generated witness");
    Ok(WitnessAssignment {
        values,
        num_public: circuit.num_public(),
    })
}
