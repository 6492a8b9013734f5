use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};
use structopt::StructOpt;
use zkinfer::{
    init_logging, load_model, ArtifactId, Config, ExportFormat, Fingerprint, Graph, Inputs,
    ModelFormat, OptimizationLevel, SchemeKind, Workspace, ZkError,
};
use zkinfer_r1cs::{layers, NodeId};

type Result<T> = std::result::Result<T, ZkError>;

#[derive(StructOpt, Debug)]
#[structopt(
    about = "Zero-knowledge proofs of model inference.",
    rename_all = "kebab-case"
)]
struct Opt {
    /// Workspace directory, overriding the configuration
    #[structopt(long, global = true, parse(from_os_str))]
    workspace: Option<PathBuf>,

    /// TOML configuration file
    #[structopt(long, global = true, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Log at debug level
    #[structopt(short, long, global = true)]
    verbose: bool,

    #[structopt(subcommand)]
    action: Action,
}

#[derive(StructOpt, Debug)]
#[structopt(rename_all = "kebab-case")]
enum Action {
    /// Compiles a model into a circuit
    Compile {
        #[structopt(parse(from_os_str))]
        model: PathBuf,
        /// `json` or `linear`; guessed from the extension when absent
        #[structopt(long)]
        format: Option<ModelFormat>,
        /// O0 to O3
        #[structopt(long)]
        opt_level: Option<OptimizationLevel>,
        /// Fixed-point scale for linear models
        #[structopt(long)]
        scale: Option<u32>,
    },

    /// Runs the trusted setup for a circuit
    Setup {
        circuit: ArtifactId,
        #[structopt(long)]
        scheme: Option<SchemeKind>,
    },

    /// Proves an inference from a JSON file of named inputs
    Prove {
        circuit: ArtifactId,
        proving_key: ArtifactId,
        #[structopt(parse(from_os_str))]
        inputs: PathBuf,
    },

    /// Checks a stored proof
    VerifyProof {
        verifying_key: ArtifactId,
        proof: ArtifactId,
        public_inputs: ArtifactId,
    },

    /// Writes a verifier for a verification key
    Export {
        verifying_key: ArtifactId,
        /// `json` or `solidity`
        #[structopt(long, default_value = "json")]
        format: ExportFormat,
        /// Output file; standard output when absent
        #[structopt(long, short, parse(from_os_str))]
        output: Option<PathBuf>,
    },

    /// Compiles, sets up, proves and verifies in one go
    Verify {
        #[structopt(parse(from_os_str))]
        model: PathBuf,
        #[structopt(parse(from_os_str))]
        inputs: PathBuf,
        #[structopt(long)]
        format: Option<ModelFormat>,
        #[structopt(long)]
        opt_level: Option<OptimizationLevel>,
        #[structopt(long)]
        scheme: Option<SchemeKind>,
        #[structopt(long)]
        scale: Option<u32>,
    },

    /// Lists the stored artifacts
    List,

    /// Deletes the artifacts of every circuit not kept
    Gc {
        /// Fingerprints of the circuits to keep
        keep: Vec<Fingerprint>,
    },

    /// Times the pipeline on a synthetic dense model
    Benchmark {
        /// Neurons per layer
        #[structopt(long, default_value = "16")]
        width: usize,
        /// Number of hidden layers
        #[structopt(long, default_value = "2")]
        depth: usize,
        /// Repetitions of each stage
        #[structopt(long, default_value = "3")]
        runs: usize,
        #[structopt(long)]
        opt_level: Option<OptimizationLevel>,
        /// Keep the benchmark artifacts in the workspace
        #[structopt(long)]
        keep: bool,
    },

    /// Describes a stored circuit
    Info { circuit: ArtifactId },
}

fn main() {
    let opt = Opt::from_args();
    let mut config = match Config::load(opt.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };
    if let Some(workspace) = opt.workspace {
        config.workspace = workspace;
    }
    init_logging(&config.log_filter, opt.verbose);

    match run(config, opt.action) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {}", e);
            process::exit(2);
        }
    }
}

/// Run one command; `Ok(false)` means a proof did not verify.
fn run(config: Config, action: Action) -> Result<bool> {
    use Action::*;
    let scale = config.fixed_point_scale;
    let default_level = config.optimization_level;
    let default_scheme = config.scheme;
    let ws = Workspace::open(config)?;

    match action {
        Compile {
            model,
            format,
            opt_level,
            scale: model_scale,
        } => {
            let graph = load_model(&model, format, model_scale.unwrap_or(scale))?;
            let id = ws.compile(&graph, opt_level.unwrap_or(default_level))?;
            println!("{}", id);
        }

        Setup { circuit, scheme } => {
            let (pk, vk) = ws.setup(&circuit, scheme.unwrap_or(default_scheme))?;
            println!("{}\n{}", pk, vk);
        }

        Prove {
            circuit,
            proving_key,
            inputs,
        } => {
            let inputs = read_inputs(&inputs)?;
            let (proof, public) = ws.prove(&circuit, &proving_key, &inputs)?;
            println!("{}\n{}", proof, public);
        }

        VerifyProof {
            verifying_key,
            proof,
            public_inputs,
        } => return report(ws.verify(&verifying_key, &proof, &public_inputs)?),

        Export {
            verifying_key,
            format,
            output,
        } => {
            let bytes = ws.export_verifier(&verifying_key, format)?;
            match output {
                Some(path) => fs::write(path, bytes)?,
                None => println!("{}", String::from_utf8_lossy(&bytes)),
            }
        }

        Verify {
            model,
            inputs,
            format,
            opt_level,
            scheme,
            scale: model_scale,
        } => {
            let graph = load_model(&model, format, model_scale.unwrap_or(scale))?;
            let inputs = read_inputs(&inputs)?;
            let circuit = ws.compile(&graph, opt_level.unwrap_or(default_level))?;
            let (pk, vk) = ws.setup(&circuit, scheme.unwrap_or(default_scheme))?;
            let (proof, public) = ws.prove(&circuit, &pk, &inputs)?;
            return report(ws.verify(&vk, &proof, &public)?);
        }

        List => {
            for id in ws.list()? {
                println!("{}", id);
            }
        }

        Gc { keep } => {
            let removed = ws.gc(&keep)?;
            for id in removed.iter() {
                println!("removed {}", id);
            }
        }

        Benchmark {
            width,
            depth,
            runs,
            opt_level,
            keep,
        } => benchmark(&ws, width, depth, runs.max(1), opt_level.unwrap_or(default_level), keep)?,

        Info { circuit } => {
            let info = ws.circuit_info(&circuit)?;
            let text = serde_json::to_string_pretty(&info)
                .map_err(|e| ZkError::SerializationError(e.to_string()))?;
            println!("{}", text);
        }
    }
    Ok(true)
}

fn report(valid: bool) -> Result<bool> {
    println!("{}", if valid { "valid" } else { "invalid" });
    Ok(valid)
}

fn read_inputs(path: &Path) -> Result<Inputs> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| ZkError::DeserializationError(e.to_string()))
}

/// A `depth`-layer ReLU perceptron of the given width with small
/// deterministic weights, summed into one public output.
fn dense_model(width: usize, depth: usize) -> Result<(Graph, Inputs)> {
    let mut graph = Graph::new();
    let mut inputs = Inputs::new();
    let mut layer: Vec<NodeId> = (0..width)
        .map(|i| {
            let name = format!("x{}", i);
            inputs.insert(&name, (i % 7) as i64 - 3);
            graph.private_input(&name)
        })
        .collect();
    for d in 0..depth {
        let weights: Vec<Vec<i64>> = (0..width)
            .map(|i| {
                (0..width)
                    .map(|j| ((i * 7 + j * 3 + d) % 5) as i64 - 2)
                    .collect()
            })
            .collect();
        let bias: Vec<i64> = (0..width).map(|i| (i % 3) as i64).collect();
        let hidden = layers::dense(&mut graph, &layer, &weights, &bias)?;
        layer = layers::relu_layer(&mut graph, &hidden, 32);
    }
    let sum = graph.linear(layer.iter().map(|n| (*n, 1)).collect(), 0);
    graph.output(sum, "y");
    Ok((graph, inputs))
}

fn time<T>(runs: usize, mut f: impl FnMut() -> Result<T>) -> Result<(T, Duration)> {
    let start = Instant::now();
    let mut last = f()?;
    for _ in 1..runs {
        last = f()?;
    }
    Ok((last, start.elapsed() / runs as u32))
}

fn benchmark(
    ws: &Workspace,
    width: usize,
    depth: usize,
    runs: usize,
    level: OptimizationLevel,
    keep: bool,
) -> Result<()> {
    let (graph, inputs) = dense_model(width, depth)?;
    let (circuit, compile_time) = time(runs, || ws.compile(&graph, level))?;
    let info = ws.circuit_info(&circuit)?;
    let ((pk, vk), setup_time) = time(runs, || ws.setup(&circuit, SchemeKind::Groth16))?;
    let ((proof, public), prove_time) = time(runs, || ws.prove(&circuit, &pk, &inputs))?;
    let (valid, verify_time) = time(runs, || ws.verify(&vk, &proof, &public))?;

    println!(
        "model: {} layers of {} neurons, {} nodes, {} constraints at {}",
        depth, width, info.num_nodes, info.num_constraints, level
    );
    for (stage, elapsed) in [
        ("compile", compile_time),
        ("setup", setup_time),
        ("prove", prove_time),
        ("verify", verify_time),
    ] {
        println!("{:>8}: {:>10.3} ms", stage, elapsed.as_secs_f64() * 1000.0);
    }
    println!("{:>8}: {}", "valid", valid);

    if !keep {
        for id in [circuit, pk, vk, proof, public].iter() {
            ws.store().delete(id)?;
        }
    }
    Ok(())
}
