//! Model loading: computation graphs in JSON, and linear models in the
//! `key = value` text format.
//!
//! A linear model file looks like
//!
//! ```text
//! # y = 0.5 * x1 - 2 * x2 + 1
//! inputs = 2
//! w1 = 0.5
//! w2 = -2
//! b = 1
//! ```
//!
//! Weights default to zero and the bias to zero. The circuit proves
//! `y == round(b * s) + sum(round(w_i * s) * x_i)` for a fixed-point scale
//! `s`, with private integer inputs `x1..xN` and a public `y`.
use crate::errors::{Result, ZkError};
use std::collections::BTreeMap;
use std::path::Path;
use std::{fmt, fs, str::FromStr};
use zkinfer_r1cs::{Graph, NodeId};

/// Largest magnitude a quantized parameter may take.
const MAX_QUANTIZED: f64 = (1u64 << 62) as f64;

/// The model file formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModelFormat {
    /// A serialized [`Graph`].
    Json,
    /// The linear-model text format.
    Linear,
}

impl ModelFormat {
    /// Guess the format from the file extension: `.json` is a graph,
    /// anything else a linear model.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ModelFormat::Json,
            _ => ModelFormat::Linear,
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelFormat::Json => "json",
            ModelFormat::Linear => "linear",
        })
    }
}

impl FromStr for ModelFormat {
    type Err = ZkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "graph" => Ok(ModelFormat::Json),
            "linear" | "txt" => Ok(ModelFormat::Linear),
            _ => Err(ZkError::InvalidModel(format!("unknown model format `{}`", s))),
        }
    }
}

/// Parse and validate a JSON graph.
pub fn parse_graph(text: &str) -> Result<Graph> {
    let graph: Graph =
        serde_json::from_str(text).map_err(|e| ZkError::InvalidModel(e.to_string()))?;
    graph.validate()?;
    Ok(graph)
}

/// Load a model file into a graph. `scale` only applies to linear models.
pub fn load_model(path: &Path, format: Option<ModelFormat>, scale: u32) -> Result<Graph> {
    let text = fs::read_to_string(path)?;
    let format = format.unwrap_or_else(|| ModelFormat::detect(path));
    tracing::debug!(path = %path.display(), %format, "loading model");
    match format {
        ModelFormat::Json => parse_graph(&text),
        ModelFormat::Linear => LinearModel::parse(&text)?.to_graph(scale),
    }
}

/// `y = b + sum(w_i * x_i)`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearModel {
    weights: Vec<f64>,
    bias: f64,
}

fn quantize(value: f64, scale: u32) -> Result<i64> {
    let q = (value * scale as f64).round();
    if !q.is_finite() || q.abs() >= MAX_QUANTIZED {
        return Err(ZkError::InvalidModel(format!(
            "{} does not fit at scale {}",
            value, scale
        )));
    }
    Ok(q as i64)
}

impl LinearModel {
    /// Build a model from its weights and bias.
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    /// Parse the text format.
    pub fn parse(text: &str) -> Result<Self> {
        let mut params: BTreeMap<String, f64> = BTreeMap::new();
        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                ZkError::InvalidModel(format!("line {}: expected `key = value`", n + 1))
            })?;
            let key = key.trim().to_string();
            let value: f64 = value.trim().parse().map_err(|_| {
                ZkError::InvalidModel(format!("line {}: `{}` is not a number", n + 1, value.trim()))
            })?;
            if !value.is_finite() {
                return Err(ZkError::InvalidModel(format!("line {}: non-finite value", n + 1)));
            }
            if params.insert(key.clone(), value).is_some() {
                return Err(ZkError::InvalidModel(format!("`{}` is set twice", key)));
            }
        }

        let inputs = params
            .remove("inputs")
            .ok_or_else(|| ZkError::InvalidModel("missing `inputs`".to_string()))?;
        if inputs < 1.0 || inputs.fract() != 0.0 || inputs > u16::MAX as f64 {
            return Err(ZkError::InvalidModel(format!("`inputs = {}` is not a count", inputs)));
        }
        let inputs = inputs as usize;
        let bias = params.remove("b").unwrap_or(0.0);
        let mut weights = vec![0.0; inputs];
        for (key, value) in params {
            let index = key
                .strip_prefix('w')
                .and_then(|i| i.parse::<usize>().ok())
                .filter(|i| (1..=inputs).contains(i))
                .ok_or_else(|| ZkError::InvalidModel(format!("unexpected parameter `{}`", key)))?;
            weights[index - 1] = value;
        }
        Ok(Self { weights, bias })
    }

    /// Return the number of inputs.
    pub fn num_inputs(&self) -> usize {
        self.weights.len()
    }

    /// Evaluate the quantized model on integer inputs, as the circuit does.
    pub fn evaluate(&self, inputs: &[i64], scale: u32) -> Result<i64> {
        if inputs.len() != self.weights.len() {
            return Err(ZkError::InvalidModel(format!(
                "expected {} inputs, got {}",
                self.weights.len(),
                inputs.len()
            )));
        }
        let mut acc = quantize(self.bias, scale)? as i128;
        for (w, x) in self.weights.iter().zip(inputs.iter()) {
            acc += quantize(*w, scale)? as i128 * *x as i128;
        }
        i64::try_from(acc).map_err(|_| ZkError::InvalidModel("output overflows i64".to_string()))
    }

    /// Build the graph asserting `y == b + sum(w_i * x_i)` at `scale`.
    pub fn to_graph(&self, scale: u32) -> Result<Graph> {
        if scale == 0 {
            return Err(ZkError::InvalidModel("the fixed-point scale must be positive".to_string()));
        }
        let mut graph = Graph::new();
        let xs: Vec<NodeId> = (1..=self.weights.len())
            .map(|i| graph.private_input(&format!("x{}", i)))
            .collect();
        let y = graph.public_input("y");
        let terms = xs
            .iter()
            .zip(self.weights.iter())
            .map(|(x, w)| Ok((*x, quantize(*w, scale)?)))
            .collect::<Result<Vec<_>>>()?;
        let sum = graph.linear(terms, quantize(self.bias, scale)?);
        graph.assert_equal(sum, y);
        graph.validate()?;
        Ok(graph)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use zkinfer_algebra::bn254::BN254Scalar;
    use zkinfer_r1cs::{compile, generate_witness, Inputs, OptimizationLevel, R1csError};

    const MODEL: &str = "# toy model\ninputs = 3\nw1 = 0.5\nw3 = -2\nb = 1.25\n";

    #[test]
    fn parses_the_text_format() {
        let model = LinearModel::parse(MODEL).unwrap();
        assert_eq!(model, LinearModel::new(vec![0.5, 0.0, -2.0], 1.25));
        assert_eq!(model.num_inputs(), 3);
        // 125 + 50 * 4 - 200 * 1
        assert_eq!(model.evaluate(&[4, 9, 1], 100).unwrap(), 125);
    }

    #[test]
    fn rejects_malformed_files() {
        for text in [
            "w1 = 1",
            "inputs = 0",
            "inputs = 2.5",
            "inputs = 1\nw2 = 1",
            "inputs = 1\nw1 = 1\nw1 = 2",
            "inputs = 1\nbias = 1",
            "inputs = 1\nw1 = heavy",
            "inputs = 1\nw1",
        ] {
            assert!(LinearModel::parse(text).is_err(), "{}", text);
        }
        let model = LinearModel::new(vec![1e30], 0.0);
        assert!(model.to_graph(1000).is_err());
    }

    #[test]
    fn linear_graph_accepts_the_model_output() {
        let model = LinearModel::parse(MODEL).unwrap();
        let graph = model.to_graph(100).unwrap();
        let compiled = compile::<BN254Scalar>(&graph, OptimizationLevel::O2).unwrap();
        assert_eq!(compiled.circuit.num_public(), 1);

        let y = model.evaluate(&[4, 9, 1], 100).unwrap();
        let inputs: Inputs = vec![("x1", 4i64), ("x2", 9), ("x3", 1), ("y", y)]
            .into_iter()
            .collect();
        assert!(generate_witness(&compiled, &inputs).is_ok());

        let wrong: Inputs = vec![("x1", 4i64), ("x2", 9), ("x3", 1), ("y", y + 1)]
            .into_iter()
            .collect();
        assert!(matches!(
            generate_witness(&compiled, &wrong),
            Err(R1csError::UnsatisfiedAssertion { .. })
        ));
    }

    #[test]
    fn json_graphs_are_validated() {
        let text = r#"{"nodes": [
            {"op": "input", "name": "a", "visibility": "private"},
            {"op": "input", "name": "b", "visibility": "private"},
            {"op": "mul", "lhs": 0, "rhs": 1},
            {"op": "output", "input": 2, "name": "c"}
        ]}"#;
        let graph = parse_graph(text).unwrap();
        assert_eq!(graph.len(), 4);

        let forward = r#"{"nodes": [{"op": "output", "input": 3, "name": "c"}]}"#;
        assert!(matches!(
            parse_graph(forward),
            Err(ZkError::R1cs(R1csError::InvalidGraph(_)))
        ));
        assert!(matches!(parse_graph("{"), Err(ZkError::InvalidModel(_))));
    }

    #[test]
    fn format_detection() {
        assert_eq!(ModelFormat::detect(Path::new("m.JSON")), ModelFormat::Json);
        assert_eq!(ModelFormat::detect(Path::new("m.txt")), ModelFormat::Linear);
        assert_eq!("graph".parse::<ModelFormat>().unwrap(), ModelFormat::Json);
    }
}
