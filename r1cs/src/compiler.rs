use crate::circuit::{Circuit, CircuitInterface, Fingerprint, InputSlot, OutputSlot};
use crate::constraint_system::ConstraintSystem;
use crate::errors::{R1csError, Result};
use crate::gadgets::{i128_to_scalar, signed_range_check};
use crate::graph::{Graph, Node, NodeId, Visibility};
use crate::lc::{LinearCombination, ONE};
use crate::optimizer::{analyze, Analysis, Op};
use crate::witness::{Hint, WitnessPlan};
use ark_std::{collections::BTreeMap, end_timer, fmt, start_timer, str::FromStr};
use zkinfer_algebra::prelude::*;

/// How aggressively the builder reduces the constraint count.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum OptimizationLevel {
    /// Every non-constant node gets its own variable and constraint.
    O0,
    /// Dead-constraint elimination.
    O1,
    /// Common-subexpression elimination, inlined linear combinations and
    /// constant folding, on top of level 1.
    #[default]
    O2,
    /// Multiply-then-add gate fusion, on top of level 2.
    O3,
}

impl TryFrom<u8> for OptimizationLevel {
    type Error = R1csError;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            0 => Ok(OptimizationLevel::O0),
            1 => Ok(OptimizationLevel::O1),
            2 => Ok(OptimizationLevel::O2),
            3 => Ok(OptimizationLevel::O3),
            other => Err(R1csError::InvalidOptimizationLevel(other.to_string())),
        }
    }
}

impl FromStr for OptimizationLevel {
    type Err = R1csError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim().trim_start_matches(|c| c == 'O' || c == 'o');
        let level: u8 = digits
            .parse()
            .map_err(|_| R1csError::InvalidOptimizationLevel(s.to_string()))?;
        OptimizationLevel::try_from(level)
    }
}

impl fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}", *self as u8)
    }
}

/// A circuit together with everything needed to fill its witness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CompiledCircuit<F: Scalar> {
    /// The constraint system.
    pub circuit: Circuit<F>,
    /// The graph the circuit was lowered from.
    pub graph: Graph,
    /// How the witness generator fills each variable.
    pub plan: WitnessPlan<F>,
    /// The level the circuit was built at.
    pub level: OptimizationLevel,
}

impl<F: Scalar> CompiledCircuit<F> {
    /// Return the circuit fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        self.circuit.fingerprint()
    }
}

/// `scale * (a . w) * (b . w)`, not yet bound to a variable.
#[derive(Clone)]
struct Product<F: Scalar> {
    a: LinearCombination<F>,
    b: LinearCombination<F>,
    scale: F,
}

/// The symbolic value of a lowered node: `lc + product`.
#[derive(Clone)]
struct Value<F: Scalar> {
    lc: LinearCombination<F>,
    product: Option<Product<F>>,
}

impl<F: Scalar> Value<F> {
    fn linear(lc: LinearCombination<F>) -> Self {
        Self { lc, product: None }
    }
}

struct Lowering<'a, F: Scalar> {
    cs: ConstraintSystem<F>,
    analysis: &'a Analysis,
    level: OptimizationLevel,
    values: Vec<Option<Value<F>>>,
}

impl<'a, F: Scalar> Lowering<'a, F> {
    fn value(&self, node: NodeId) -> Result<&Value<F>> {
        self.values[node].as_ref().ok_or_else(|| {
            R1csError::InvalidGraph(format!("node {} is used but was not lowered", node))
        })
    }

    /// Return the value of `node` as a linear combination, binding a pending
    /// product to a fresh variable first. The binding is cached.
    fn lc(&mut self, node: NodeId) -> Result<LinearCombination<F>> {
        let value = self.value(node)?.clone();
        match value.product {
            None => Ok(value.lc),
            Some(p) => {
                let var = self.cs.new_variable();
                self.cs.push_hint(Hint::Product {
                    var,
                    a: p.a.clone(),
                    b: p.b.clone(),
                    scale: p.scale,
                    plus: value.lc.clone(),
                });
                self.cs.enforce(
                    p.a.scale(&p.scale),
                    p.b,
                    LinearCombination::variable(var).sub(&value.lc),
                );
                let lc = LinearCombination::variable(var);
                self.values[node] = Some(Value::linear(lc.clone()));
                Ok(lc)
            }
        }
    }

    /// Take the pending product of `node` if this is its only consumer.
    fn fusable(&self, node: NodeId) -> Result<Option<Value<F>>> {
        let value = self.value(node)?;
        if value.product.is_some() && self.analysis.uses[node] == 1 {
            Ok(Some(value.clone()))
        } else {
            Ok(None)
        }
    }

    fn mul(&mut self, node: NodeId, a: LinearCombination<F>, b: LinearCombination<F>) -> Value<F> {
        if self.level >= OptimizationLevel::O2 {
            if let Some(k) = a.as_constant() {
                return Value::linear(b.scale(&k));
            }
            if let Some(k) = b.as_constant() {
                return Value::linear(a.scale(&k));
            }
        }
        if self.level >= OptimizationLevel::O3 && self.analysis.uses[node] == 1 {
            return Value {
                lc: LinearCombination::zero(),
                product: Some(Product {
                    a,
                    b,
                    scale: F::one(),
                }),
            };
        }
        Value::linear(LinearCombination::variable(self.cs.insert_mul_gate(a, b)))
    }

    fn linear(&mut self, terms: &[(NodeId, i128)], bias: i128) -> Result<Value<F>> {
        let mut acc = Value::linear(LinearCombination::constant(i128_to_scalar(bias)?));
        for (operand, coeff) in terms {
            let k: F = i128_to_scalar(*coeff)?;
            if acc.product.is_none() {
                if let Some(v) = self.fusable(*operand)? {
                    acc.lc = acc.lc.add(&v.lc.scale(&k));
                    acc.product = v.product.map(|p| Product {
                        scale: p.scale.mul(&k),
                        ..p
                    });
                    continue;
                }
            }
            let lc = self.lc(*operand)?;
            acc.lc = acc.lc.add(&lc.scale(&k));
        }
        if self.level >= OptimizationLevel::O2 {
            return Ok(acc);
        }
        let var = self.cs.insert_linear_gate(acc.lc);
        Ok(Value::linear(LinearCombination::variable(var)))
    }

    /// Enforce `lhs == rhs`, fusing a pending product into the constraint.
    fn assert_equal(&mut self, lhs: NodeId, rhs: NodeId) -> Result<()> {
        if self.level >= OptimizationLevel::O2 && lhs == rhs {
            return Ok(());
        }
        for (this, other) in [(lhs, rhs), (rhs, lhs)] {
            if let Some(v) = self.fusable(this)? {
                if let Some(p) = v.product {
                    let other = self.lc(other)?;
                    self.cs
                        .enforce(p.a.scale(&p.scale), p.b, other.sub(&v.lc));
                    return Ok(());
                }
            }
        }
        let a = self.lc(lhs)?;
        let b = self.lc(rhs)?;
        if self.level >= OptimizationLevel::O2 && a.sub(&b).is_zero() {
            return Ok(());
        }
        self.cs.enforce(a, LinearCombination::variable(ONE), b);
        Ok(())
    }

    /// Bind the value of `input` to the public variable `var`.
    fn output(&mut self, input: NodeId, var: usize) -> Result<()> {
        if let Some(v) = self.fusable(input)? {
            if let Some(p) = v.product {
                self.cs.push_hint(Hint::Product {
                    var,
                    a: p.a.clone(),
                    b: p.b.clone(),
                    scale: p.scale,
                    plus: v.lc.clone(),
                });
                self.cs.enforce(
                    p.a.scale(&p.scale),
                    p.b,
                    LinearCombination::variable(var).sub(&v.lc),
                );
                return Ok(());
            }
        }
        let lc = self.lc(input)?;
        self.cs.push_hint(Hint::Lc {
            var,
            lc: lc.clone(),
        });
        self.cs.enforce(
            lc,
            LinearCombination::variable(ONE),
            LinearCombination::variable(var),
        );
        Ok(())
    }
}

/// Lower a graph into a circuit at the given optimization level.
///
/// Public slots are the public inputs and the outputs, in node order;
/// private variables follow in the order their nodes are lowered. The
/// result is therefore a deterministic function of `(graph, level)`.
pub fn compile<F: Scalar>(graph: &Graph, level: OptimizationLevel) -> Result<CompiledCircuit<F>> {
    let timer = start_timer!(|| format!("compile {} nodes at {}", graph.len(), level));
    graph.validate()?;
    graph.check_supported()?;
    let analysis = analyze(graph, level)?;

    let mut public_slots: BTreeMap<NodeId, usize> = BTreeMap::new();
    let mut public_labels = vec![];
    for (id, node) in graph.nodes().iter().enumerate() {
        match node {
            Node::Input {
                name,
                visibility: Visibility::Public,
            }
            | Node::Output { name, .. } => {
                public_slots.insert(id, public_labels.len());
                public_labels.push(name.clone());
            }
            _ => {}
        }
    }

    let mut lowering = Lowering {
        cs: ConstraintSystem::new(public_labels.len()),
        analysis: &analysis,
        level,
        values: vec![None; graph.len()],
    };
    let mut interface = CircuitInterface {
        public: public_labels,
        ..Default::default()
    };

    for (id, node) in graph.nodes().iter().enumerate() {
        if !analysis.is_lowered(id) {
            continue;
        }
        let value = match &analysis.ops[id] {
            Op::Input(_) => {
                let (name, visibility) = match node {
                    Node::Input { name, visibility } => (name.clone(), *visibility),
                    _ => return Err(R1csError::InvalidGraph(format!("node {} is not an input", id))),
                };
                let var = match public_slots.get(&id) {
                    Some(slot) => lowering.cs.public_variable(*slot),
                    None => lowering.cs.new_variable(),
                };
                lowering.cs.push_hint(Hint::Input {
                    var,
                    slot: interface.inputs.len(),
                });
                interface.inputs.push(InputSlot {
                    name,
                    visibility,
                    node: id,
                    var,
                });
                Some(Value::linear(LinearCombination::variable(var)))
            }
            Op::Const(v) => Some(Value::linear(LinearCombination::constant(i128_to_scalar(
                *v,
            )?))),
            Op::Linear { terms, bias } => Some(lowering.linear(terms, *bias)?),
            Op::Mul(a, b) => {
                let a = lowering.lc(*a)?;
                let b = lowering.lc(*b)?;
                Some(lowering.mul(id, a, b))
            }
            Op::Relu { input, bits } => {
                let x = lowering.lc(*input)?;
                let sign = signed_range_check(&mut lowering.cs, &x, *bits);
                let top = LinearCombination::variable(sign[sign.len() - 1]);
                if level == OptimizationLevel::O0 || analysis.uses[id] > 0 {
                    Some(lowering.mul(id, x, top))
                } else {
                    None
                }
            }
            Op::LessThan { lhs, rhs, bits } => {
                let d = lowering.lc(*lhs)?.sub(&lowering.lc(*rhs)?);
                let sign = signed_range_check(&mut lowering.cs, &d, *bits);
                let negative = LinearCombination::constant(F::one())
                    .add_term(sign[sign.len() - 1], F::one().neg());
                if level >= OptimizationLevel::O2
                    || (level == OptimizationLevel::O1 && analysis.uses[id] == 0)
                {
                    Some(Value::linear(negative))
                } else {
                    let var = lowering.cs.insert_linear_gate(negative);
                    Some(Value::linear(LinearCombination::variable(var)))
                }
            }
            Op::AssertEqual(a, b) => {
                lowering.assert_equal(*a, *b)?;
                None
            }
            Op::Output { input, .. } => {
                let name = match node {
                    Node::Output { name, .. } => name.clone(),
                    _ => return Err(R1csError::InvalidGraph(format!("node {} is not an output", id))),
                };
                let slot = public_slots.get(&id).copied().ok_or_else(|| {
                    R1csError::InvalidGraph(format!("output {} has no public slot", id))
                })?;
                let var = lowering.cs.public_variable(slot);
                lowering.output(*input, var)?;
                interface.outputs.push(OutputSlot {
                    name,
                    node: id,
                    var,
                });
                None
            }
        };
        lowering.values[id] = value;
    }

    let (circuit, plan) = lowering.cs.finish(interface)?;
    end_timer!(timer);
    tracing::debug!(
        opt_level = %level,
        constraints = circuit.num_constraints(),
        public = circuit.num_public(),
        private = circuit.num_private(),
        fingerprint = %circuit.fingerprint(),
        "compiled circuit"
    );
    Ok(CompiledCircuit {
        circuit,
        graph: graph.clone(),
        plan,
        level,
    })
}
