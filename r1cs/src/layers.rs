//! Helpers that expand neural-network layers into primitive graph nodes.
//! Weights are integers; callers quantize real-valued models first.
use crate::errors::{R1csError, Result};
use crate::graph::{Graph, NodeId};

/// Append `y_i = bias_i + sum_j weights[i][j] * x_j` and return the `y_i`.
pub fn dense(
    graph: &mut Graph,
    inputs: &[NodeId],
    weights: &[Vec<i64>],
    bias: &[i64],
) -> Result<Vec<NodeId>> {
    if weights.len() != bias.len() {
        return Err(R1csError::InvalidGraph(format!(
            "dense layer has {} weight rows and {} biases",
            weights.len(),
            bias.len()
        )));
    }
    weights
        .iter()
        .zip(bias.iter())
        .map(|(row, b)| {
            if row.len() != inputs.len() {
                return Err(R1csError::InvalidGraph(format!(
                    "dense layer row has {} weights for {} inputs",
                    row.len(),
                    inputs.len()
                )));
            }
            let terms = inputs.iter().copied().zip(row.iter().copied()).collect();
            Ok(graph.linear(terms, *b))
        })
        .collect()
}

/// Apply ReLU to every node.
pub fn relu_layer(graph: &mut Graph, inputs: &[NodeId], bits: u32) -> Vec<NodeId> {
    inputs.iter().map(|x| graph.relu(*x, bits)).collect()
}

/// Append the inner product of two node vectors.
pub fn dot(graph: &mut Graph, lhs: &[NodeId], rhs: &[NodeId]) -> Result<NodeId> {
    if lhs.len() != rhs.len() {
        return Err(R1csError::InvalidGraph(format!(
            "dot product of lengths {} and {}",
            lhs.len(),
            rhs.len()
        )));
    }
    let terms = lhs
        .iter()
        .zip(rhs.iter())
        .map(|(a, b)| (graph.mul(*a, *b), 1))
        .collect();
    Ok(graph.linear(terms, 0))
}

/// Append `max(a, b) = b + relu(a - b)`, for `a - b` within `bits` signed bits.
pub fn max(graph: &mut Graph, a: NodeId, b: NodeId, bits: u32) -> NodeId {
    let diff = graph.sub(a, b);
    let r = graph.relu(diff, bits);
    graph.add(b, r)
}

/// Append a single-channel 2D convolution over a row-major `size x size`
/// image. Returns the output nodes in row-major order.
pub fn conv2d(
    graph: &mut Graph,
    image: &[NodeId],
    size: usize,
    kernel: &[Vec<i64>],
    bias: i64,
    stride: usize,
) -> Result<Vec<NodeId>> {
    let k = kernel.len();
    if image.len() != size * size {
        return Err(R1csError::InvalidGraph(format!(
            "image has {} pixels, expected {}",
            image.len(),
            size * size
        )));
    }
    if k == 0 || k > size || stride == 0 || kernel.iter().any(|row| row.len() != k) {
        return Err(R1csError::InvalidGraph(
            "convolution kernel must be square, non-empty and fit the image".to_string(),
        ));
    }
    let positions: Vec<usize> = (0..=(size - k) / stride).map(|p| p * stride).collect();
    let mut outputs = vec![];
    for i in positions.iter() {
        for j in positions.iter() {
            let mut terms = vec![];
            for (di, row) in kernel.iter().enumerate() {
                for (dj, w) in row.iter().enumerate() {
                    terms.push((image[(i + di) * size + j + dj], *w));
                }
            }
            outputs.push(graph.linear(terms, bias));
        }
    }
    Ok(outputs)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compiler::{compile, OptimizationLevel};
    use crate::witness::{generate_witness, Inputs};
    use zkinfer_algebra::bn254::BN254Scalar;
    use zkinfer_algebra::prelude::*;

    type F = BN254Scalar;

    #[test]
    fn two_layer_perceptron() {
        let mut g = Graph::new();
        let x: Vec<NodeId> = (0..3).map(|i| g.private_input(&format!("x{}", i))).collect();
        let h = dense(&mut g, &x, &[vec![1, -1, 2], vec![0, 3, -1]], &[0, 1]).unwrap();
        let h = relu_layer(&mut g, &h, 16);
        let y = dense(&mut g, &h, &[vec![2, 1]], &[-3]).unwrap();
        g.output(y[0], "y");

        let compiled = compile::<F>(&g, OptimizationLevel::O3).unwrap();
        let inputs: Inputs = vec![("x0", 1i64), ("x1", 2), ("x2", 3)].into_iter().collect();
        let w = generate_witness(&compiled, &inputs).unwrap();
        // h = relu([1 - 2 + 6, 6 - 3 + 1]) = [5, 4], y = 10 + 4 - 3
        assert_eq!(w.public_inputs(), &[F::from(11u32)]);
    }

    #[test]
    fn shapes_are_checked() {
        let mut g = Graph::new();
        let x = g.private_input("x");
        assert!(dense(&mut g, &[x], &[vec![1, 2]], &[0]).is_err());
        assert!(dense(&mut g, &[x], &[vec![1]], &[0, 1]).is_err());
        assert!(dot(&mut g, &[x], &[]).is_err());
        assert!(conv2d(&mut g, &[x], 1, &[vec![1, 1], vec![1, 1]], 0, 1).is_err());
    }

    #[test]
    fn max_and_dot() {
        let mut g = Graph::new();
        let a = g.private_input("a");
        let b = g.private_input("b");
        let m = max(&mut g, a, b, 16);
        let d = dot(&mut g, &[a, b], &[b, a]).unwrap();
        g.output(m, "max");
        g.output(d, "dot");
        let compiled = compile::<F>(&g, OptimizationLevel::O2).unwrap();
        let inputs: Inputs = vec![("a", -4i64), ("b", 9)].into_iter().collect();
        let w = generate_witness(&compiled, &inputs).unwrap();
        assert_eq!(w.public_inputs(), &[F::from(9u32), F::from_i64(-72)]);
    }

    #[test]
    fn convolution_windows() {
        let mut g = Graph::new();
        let img: Vec<NodeId> = (0..9).map(|i| g.private_input(&format!("p{}", i))).collect();
        let out = conv2d(&mut g, &img, 3, &[vec![1, 0], vec![0, 1]], 1, 1).unwrap();
        assert_eq!(out.len(), 4);
        for (i, o) in out.iter().enumerate() {
            g.output(*o, &format!("o{}", i));
        }
        let compiled = compile::<F>(&g, OptimizationLevel::O2).unwrap();
        let inputs: Inputs = (0..9).map(|i| (format!("p{}", i), i as i64)).collect();
        let w = generate_witness(&compiled, &inputs).unwrap();
        // trace of each 2x2 window plus one
        let expected: Vec<F> = [4u32, 6, 10, 12]
            .iter()
            .map(|v| F::from(*v + 1))
            .collect();
        assert_eq!(w.public_inputs(), expected.as_slice());
    }
}
