use crate::errors::{R1csError, Result};
use ark_std::collections::BTreeSet;
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Index of a node in its graph.
pub type NodeId = usize;

/// The widest signed range a bit-decomposition gadget may check over BN254.
pub const MAX_RANGE_BITS: u32 = 253;

/// Whether an input value is part of the public statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Revealed to the verifier.
    Public,
    /// Known only to the prover.
    Private,
}

/// A typed computation node. Operands always refer to earlier nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Node {
    /// A named input.
    Input {
        /// Unique input name.
        name: String,
        /// Public or private.
        visibility: Visibility,
    },
    /// A signed integer constant.
    Constant {
        /// The value.
        value: i64,
    },
    /// `bias + sum(coeff * node)`.
    Linear {
        /// `(node, coefficient)` pairs.
        terms: Vec<(NodeId, i64)>,
        /// The constant offset.
        #[serde(default)]
        bias: i64,
    },
    /// Product of two nodes.
    Mul {
        /// Left operand.
        lhs: NodeId,
        /// Right operand.
        rhs: NodeId,
    },
    /// `max(input, 0)` for inputs in `[-2^(bits-1), 2^(bits-1))`.
    Relu {
        /// The operand.
        input: NodeId,
        /// Signed bit width of the operand.
        bits: u32,
    },
    /// `1` if `lhs < rhs` else `0`, for `lhs - rhs` in `[-2^(bits-1), 2^(bits-1))`.
    LessThan {
        /// Left operand.
        lhs: NodeId,
        /// Right operand.
        rhs: NodeId,
        /// Signed bit width of `lhs - rhs`.
        bits: u32,
    },
    /// Requires `lhs == rhs`.
    AssertEqual {
        /// Left operand.
        lhs: NodeId,
        /// Right operand.
        rhs: NodeId,
    },
    /// Publishes a value as a named public output.
    Output {
        /// The published node.
        input: NodeId,
        /// Unique output name.
        name: String,
    },
    /// Natural exponential.
    Exp {
        /// The operand.
        input: NodeId,
    },
    /// Logistic sigmoid.
    Sigmoid {
        /// The operand.
        input: NodeId,
    },
    /// Hyperbolic tangent.
    Tanh {
        /// The operand.
        input: NodeId,
    },
    /// Integer or field division.
    Div {
        /// Dividend.
        lhs: NodeId,
        /// Divisor.
        rhs: NodeId,
    },
    /// Softmax over a vector.
    Softmax {
        /// The vector.
        inputs: Vec<NodeId>,
    },
    /// Any other named operator.
    Custom {
        /// Operator name.
        name: String,
        /// Operands.
        inputs: Vec<NodeId>,
    },
}

impl Node {
    /// Return the operator name.
    pub fn op_name(&self) -> &str {
        match self {
            Node::Input { .. } => "input",
            Node::Constant { .. } => "constant",
            Node::Linear { .. } => "linear",
            Node::Mul { .. } => "mul",
            Node::Relu { .. } => "relu",
            Node::LessThan { .. } => "less_than",
            Node::AssertEqual { .. } => "assert_equal",
            Node::Output { .. } => "output",
            Node::Exp { .. } => "exp",
            Node::Sigmoid { .. } => "sigmoid",
            Node::Tanh { .. } => "tanh",
            Node::Div { .. } => "div",
            Node::Softmax { .. } => "softmax",
            Node::Custom { name, .. } => name,
        }
    }

    /// Return true if the node has an R1CS lowering.
    pub fn is_supported(&self) -> bool {
        !matches!(
            self,
            Node::Exp { .. }
                | Node::Sigmoid { .. }
                | Node::Tanh { .. }
                | Node::Div { .. }
                | Node::Softmax { .. }
                | Node::Custom { .. }
        )
    }

    /// Return true if the node produces a value other nodes may consume.
    pub fn has_value(&self) -> bool {
        !matches!(self, Node::AssertEqual { .. } | Node::Output { .. })
    }

    /// Return the operand node ids, in order.
    pub fn operands(&self) -> Vec<NodeId> {
        match self {
            Node::Input { .. } | Node::Constant { .. } => vec![],
            Node::Linear { terms, .. } => terms.iter().map(|(n, _)| *n).collect(),
            Node::Mul { lhs, rhs }
            | Node::LessThan { lhs, rhs, .. }
            | Node::AssertEqual { lhs, rhs }
            | Node::Div { lhs, rhs } => vec![*lhs, *rhs],
            Node::Relu { input, .. }
            | Node::Output { input, .. }
            | Node::Exp { input }
            | Node::Sigmoid { input }
            | Node::Tanh { input } => vec![*input],
            Node::Softmax { inputs } | Node::Custom { inputs, .. } => inputs.clone(),
        }
    }
}

/// A computation graph in topological order.
///
/// Human-readable formats see `{"nodes": [{"op": ...}, ...]}`. Binary
/// formats, which cannot decode the `op`-tagged nodes, carry that same
/// JSON document as a string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<Node>,
}

#[derive(Serialize)]
struct NodesRef<'a> {
    nodes: &'a [Node],
}

#[derive(Deserialize)]
struct NodeList {
    nodes: Vec<Node>,
}

impl Serialize for Graph {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let doc = NodesRef { nodes: &self.nodes };
        if serializer.is_human_readable() {
            doc.serialize(serializer)
        } else {
            let json = serde_json::to_string(&doc).map_err(S::Error::custom)?;
            serializer.serialize_str(&json)
        }
    }
}

impl<'de> Deserialize<'de> for Graph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let doc = if deserializer.is_human_readable() {
            NodeList::deserialize(deserializer)?
        } else {
            let json = String::deserialize(deserializer)?;
            serde_json::from_str(&json).map_err(D::Error::custom)?
        };
        Ok(Graph { nodes: doc.nodes })
    }
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph from a node list.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Borrow the nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node and return its id.
    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Append a named input.
    pub fn input(&mut self, name: &str, visibility: Visibility) -> NodeId {
        self.push(Node::Input {
            name: name.to_string(),
            visibility,
        })
    }

    /// Append a public input.
    pub fn public_input(&mut self, name: &str) -> NodeId {
        self.input(name, Visibility::Public)
    }

    /// Append a private input.
    pub fn private_input(&mut self, name: &str) -> NodeId {
        self.input(name, Visibility::Private)
    }

    /// Append a constant.
    pub fn constant(&mut self, value: i64) -> NodeId {
        self.push(Node::Constant { value })
    }

    /// Append `bias + sum(coeff * node)`.
    pub fn linear(&mut self, terms: Vec<(NodeId, i64)>, bias: i64) -> NodeId {
        self.push(Node::Linear { terms, bias })
    }

    /// Append `lhs + rhs`.
    pub fn add(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.linear(vec![(lhs, 1), (rhs, 1)], 0)
    }

    /// Append `lhs - rhs`.
    pub fn sub(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.linear(vec![(lhs, 1), (rhs, -1)], 0)
    }

    /// Append `lhs * rhs`.
    pub fn mul(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.push(Node::Mul { lhs, rhs })
    }

    /// Append `max(input, 0)`.
    pub fn relu(&mut self, input: NodeId, bits: u32) -> NodeId {
        self.push(Node::Relu { input, bits })
    }

    /// Append `lhs < rhs`.
    pub fn less_than(&mut self, lhs: NodeId, rhs: NodeId, bits: u32) -> NodeId {
        self.push(Node::LessThan { lhs, rhs, bits })
    }

    /// Append the assertion `lhs == rhs`.
    pub fn assert_equal(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.push(Node::AssertEqual { lhs, rhs })
    }

    /// Append a named public output.
    pub fn output(&mut self, input: NodeId, name: &str) -> NodeId {
        self.push(Node::Output {
            input,
            name: name.to_string(),
        })
    }

    /// Check the structural rules every lowering relies on: operands refer to
    /// earlier value-producing nodes, bit widths are in range, and input and
    /// output names are unique.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(R1csError::InvalidGraph("the graph is empty".to_string()));
        }
        let mut input_names = BTreeSet::new();
        let mut output_names = BTreeSet::new();
        for (id, node) in self.nodes.iter().enumerate() {
            for operand in node.operands() {
                if operand >= id {
                    return Err(R1csError::InvalidGraph(format!(
                        "node {} refers to node {} which is not defined before it",
                        id, operand
                    )));
                }
                if !self.nodes[operand].has_value() {
                    return Err(R1csError::InvalidGraph(format!(
                        "node {} uses node {} which has no value",
                        id, operand
                    )));
                }
            }
            match node {
                Node::Input { name, .. } => {
                    if !input_names.insert(name.as_str()) {
                        return Err(R1csError::InvalidGraph(format!(
                            "duplicate input name `{}`",
                            name
                        )));
                    }
                }
                Node::Output { name, .. } => {
                    if !output_names.insert(name.as_str()) {
                        return Err(R1csError::InvalidGraph(format!(
                            "duplicate output name `{}`",
                            name
                        )));
                    }
                }
                Node::Relu { bits, .. } | Node::LessThan { bits, .. } => {
                    if *bits < 2 || *bits > MAX_RANGE_BITS {
                        return Err(R1csError::InvalidGraph(format!(
                            "node {} has bit width {} outside 2..={}",
                            id, bits, MAX_RANGE_BITS
                        )));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Return the first node without an R1CS lowering, as an error.
    pub fn check_supported(&self) -> Result<()> {
        match self.nodes.iter().enumerate().find(|(_, n)| !n.is_supported()) {
            Some((node, n)) => Err(R1csError::UnsupportedOperation {
                node,
                op: n.op_name().to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_assigns_sequential_ids() {
        let mut g = Graph::new();
        let a = g.private_input("a");
        let b = g.private_input("b");
        let c = g.public_input("c");
        let m = g.mul(a, b);
        let e = g.assert_equal(m, c);
        assert_eq!((a, b, c, m, e), (0, 1, 2, 3, 4));
        assert!(g.validate().is_ok());
    }

    #[test]
    fn forward_references_are_rejected() {
        let g = Graph::from_nodes(vec![
            Node::Mul { lhs: 0, rhs: 1 },
            Node::Constant { value: 3 },
        ]);
        assert!(matches!(g.validate(), Err(R1csError::InvalidGraph(_))));
    }

    #[test]
    fn assertions_have_no_value() {
        let mut g = Graph::new();
        let a = g.private_input("a");
        let e = g.assert_equal(a, a);
        g.relu(e, 8);
        assert!(matches!(g.validate(), Err(R1csError::InvalidGraph(_))));
    }

    #[test]
    fn names_must_be_unique() {
        let mut g = Graph::new();
        g.private_input("x");
        g.public_input("x");
        assert!(g.validate().is_err());

        let mut g = Graph::new();
        let x = g.private_input("x");
        g.output(x, "y");
        g.output(x, "y");
        assert!(g.validate().is_err());
    }

    #[test]
    fn bit_widths_are_bounded() {
        let mut g = Graph::new();
        let x = g.private_input("x");
        g.relu(x, 1);
        assert!(g.validate().is_err());

        let mut g = Graph::new();
        let x = g.private_input("x");
        g.relu(x, MAX_RANGE_BITS + 1);
        assert!(g.validate().is_err());
    }

    #[test]
    fn transcendental_nodes_are_unsupported() {
        let mut g = Graph::new();
        let x = g.private_input("x");
        let e = g.push(Node::Exp { input: x });
        g.output(e, "y");
        assert!(g.validate().is_ok());
        assert_eq!(
            g.check_supported(),
            Err(R1csError::UnsupportedOperation {
                node: 1,
                op: "exp".to_string()
            })
        );
    }

    #[test]
    fn binary_formats_round_trip() {
        let mut g = Graph::new();
        let x = g.private_input("x");
        let t = g.public_input("t");
        let h = g.linear(vec![(x, 3), (t, -1)], 7);
        let r = g.relu(h, 16);
        let lt = g.less_than(r, t, 16);
        g.output(lt, "y");
        let bytes = bincode::serialize(&g).unwrap();
        assert_eq!(bincode::deserialize::<Graph>(&bytes).unwrap(), g);

        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["nodes"][2]["op"], "linear");
        assert_eq!(serde_json::from_value::<Graph>(json).unwrap(), g);
    }

    #[test]
    fn json_format() {
        let json = r#"{"nodes": [
            {"op": "input", "name": "x", "visibility": "private"},
            {"op": "linear", "terms": [[0, 3]], "bias": -1},
            {"op": "relu", "input": 1, "bits": 16},
            {"op": "output", "input": 2, "name": "y"}
        ]}"#;
        let g: Graph = serde_json::from_str(json).unwrap();
        assert_eq!(g.len(), 4);
        assert_eq!(
            g.nodes()[1],
            Node::Linear {
                terms: vec![(0, 3)],
                bias: -1
            }
        );
        assert!(g.validate().is_ok());
    }
}
