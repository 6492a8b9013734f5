//! Graph-level passes run before lowering: canonicalisation with
//! structural hash-consing, and liveness.
use crate::compiler::OptimizationLevel;
use crate::errors::{R1csError, Result};
use crate::graph::{Graph, Node, NodeId};
use ark_std::collections::BTreeMap;
use std::collections::HashMap;

/// A supported node with its operands resolved to representatives.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    /// Inputs are never merged, so they carry their own node id.
    Input(NodeId),
    Const(i128),
    Linear {
        terms: Vec<(NodeId, i128)>,
        bias: i128,
    },
    Mul(NodeId, NodeId),
    Relu {
        input: NodeId,
        bits: u32,
    },
    LessThan {
        lhs: NodeId,
        rhs: NodeId,
        bits: u32,
    },
    AssertEqual(NodeId, NodeId),
    /// Outputs are never merged either.
    Output {
        input: NodeId,
        node: NodeId,
    },
}

impl Op {
    pub(crate) fn operands(&self) -> Vec<NodeId> {
        match self {
            Op::Input(_) | Op::Const(_) => vec![],
            Op::Linear { terms, .. } => terms.iter().map(|(n, _)| *n).collect(),
            Op::Mul(a, b) | Op::AssertEqual(a, b) | Op::LessThan { lhs: a, rhs: b, .. } => {
                vec![*a, *b]
            }
            Op::Relu { input, .. } | Op::Output { input, .. } => vec![*input],
        }
    }

    /// Nodes that must be lowered whether or not anything consumes them:
    /// inputs fix the layout, and assertions, outputs and range checks
    /// constrain the statement.
    fn is_root(&self) -> bool {
        matches!(
            self,
            Op::Input(_)
                | Op::AssertEqual(..)
                | Op::Output { .. }
                | Op::Relu { .. }
                | Op::LessThan { .. }
        )
    }
}

/// The result of the graph passes.
#[derive(Debug)]
pub(crate) struct Analysis {
    /// The canonical operation of each node.
    pub ops: Vec<Op>,
    /// The node whose value each node shares; `rep[i] == i` for nodes that
    /// get lowered.
    pub rep: Vec<NodeId>,
    /// Whether a representative must be lowered.
    pub live: Vec<bool>,
    /// How many live representatives consume each node.
    pub uses: Vec<usize>,
}

impl Analysis {
    /// Return true if node `i` is lowered on its own.
    pub fn is_lowered(&self, i: NodeId) -> bool {
        self.rep[i] == i && self.live[i]
    }
}

fn to_op(id: NodeId, node: &Node, rep: &[NodeId]) -> Result<Op> {
    let r = |n: &NodeId| rep[*n];
    Ok(match node {
        Node::Input { .. } => Op::Input(id),
        Node::Constant { value } => Op::Const(*value as i128),
        Node::Linear { terms, bias } => Op::Linear {
            terms: terms.iter().map(|(n, c)| (r(n), *c as i128)).collect(),
            bias: *bias as i128,
        },
        Node::Mul { lhs, rhs } => Op::Mul(r(lhs), r(rhs)),
        Node::Relu { input, bits } => Op::Relu {
            input: r(input),
            bits: *bits,
        },
        Node::LessThan { lhs, rhs, bits } => Op::LessThan {
            lhs: r(lhs),
            rhs: r(rhs),
            bits: *bits,
        },
        Node::AssertEqual { lhs, rhs } => Op::AssertEqual(r(lhs), r(rhs)),
        Node::Output { input, .. } => Op::Output {
            input: r(input),
            node: id,
        },
        other => {
            return Err(R1csError::UnsupportedOperation {
                node: id,
                op: other.op_name().to_string(),
            })
        }
    })
}

/// Fold constant operands, merge and sort terms, and order commutative
/// operands. Returns either a new op or the node it is an alias of.
fn canonicalize(op: Op, ops: &[Op]) -> Canonical {
    let constant = |n: NodeId| match ops[n] {
        Op::Const(v) => Some(v),
        _ => None,
    };
    match op {
        Op::Linear { terms, bias } => canonical_linear(terms, bias, ops),
        Op::Mul(a, b) => match (constant(a), constant(b)) {
            (Some(x), Some(y)) => match x.checked_mul(y) {
                Some(v) => Canonical::Op(Op::Const(v)),
                None => Canonical::Op(Op::Mul(a.min(b), a.max(b))),
            },
            (Some(k), None) => canonical_linear(vec![(b, k)], 0, ops),
            (None, Some(k)) => canonical_linear(vec![(a, k)], 0, ops),
            (None, None) => Canonical::Op(Op::Mul(a.min(b), a.max(b))),
        },
        Op::AssertEqual(a, b) => Canonical::Op(Op::AssertEqual(a.min(b), a.max(b))),
        other => Canonical::Op(other),
    }
}

enum Canonical {
    Op(Op),
    Alias(NodeId),
}

fn canonical_linear(terms: Vec<(NodeId, i128)>, bias: i128, ops: &[Op]) -> Canonical {
    let unchanged = Canonical::Op(Op::Linear {
        terms: terms.clone(),
        bias,
    });
    let mut acc = bias;
    let mut merged: BTreeMap<NodeId, i128> = BTreeMap::new();
    for (n, c) in terms.iter() {
        if let Op::Const(v) = ops[*n] {
            match c.checked_mul(v).and_then(|t| acc.checked_add(t)) {
                Some(sum) => acc = sum,
                None => return unchanged,
            }
            continue;
        }
        let entry = merged.entry(*n).or_insert(0);
        match entry.checked_add(*c) {
            Some(sum) => *entry = sum,
            None => return unchanged,
        }
    }
    let terms: Vec<(NodeId, i128)> = merged.into_iter().filter(|(_, c)| *c != 0).collect();
    match (terms.as_slice(), acc) {
        ([], _) => Canonical::Op(Op::Const(acc)),
        ([(n, 1)], 0) => Canonical::Alias(*n),
        _ => Canonical::Op(Op::Linear { terms, bias: acc }),
    }
}

/// Run the passes enabled at `level` over a validated graph.
pub(crate) fn analyze(graph: &Graph, level: OptimizationLevel) -> Result<Analysis> {
    let n = graph.len();
    let mut ops: Vec<Op> = Vec::with_capacity(n);
    let mut rep: Vec<NodeId> = (0..n).collect();
    let mut seen: HashMap<Op, NodeId> = HashMap::new();

    for (id, node) in graph.nodes().iter().enumerate() {
        let op = to_op(id, node, &rep)?;
        if level < OptimizationLevel::O2 {
            ops.push(op);
            continue;
        }
        match canonicalize(op, &ops) {
            Canonical::Alias(target) => {
                rep[id] = rep[target];
                ops.push(ops[target].clone());
            }
            Canonical::Op(op) => {
                if let Some(existing) = seen.get(&op) {
                    rep[id] = *existing;
                } else {
                    seen.insert(op.clone(), id);
                }
                ops.push(op);
            }
        }
    }

    let mut live = vec![level == OptimizationLevel::O0; n];
    for i in (0..n).rev() {
        if rep[i] != i {
            live[i] = false;
            continue;
        }
        if ops[i].is_root() {
            live[i] = true;
        }
        if live[i] {
            for o in ops[i].operands() {
                live[o] = true;
            }
        }
    }

    let mut uses = vec![0usize; n];
    for i in 0..n {
        if rep[i] == i && live[i] {
            for o in ops[i].operands() {
                uses[o] += 1;
            }
        }
    }

    Ok(Analysis {
        ops,
        rep,
        live,
        uses,
    })
}
