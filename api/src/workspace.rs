//! The pipeline front end: every operation reads its inputs from, and
//! writes its results to, the artifact store.
use crate::artifact::{open, open_payload, seal, seal_payload, ArtifactId, ArtifactKind};
use crate::config::Config;
use crate::errors::{Result, ZkError};
use crate::export::ExportFormat;
use crate::scheme::SchemeKind;
use crate::store::{ArtifactStore, NewArtifact};
use rand::rngs::OsRng;
use rand_chacha::ChaChaRng;
use rand_core::{RngCore, SeedableRng};
use std::path::Path;
use zeroize::Zeroize;
use zkinfer_algebra::bn254::BN254Scalar;
use zkinfer_groth16::{CancellationToken, Groth16Error, PublicInputs};
use zkinfer_r1cs::{
    compile, generate_witness, CompiledCircuit, Fingerprint, Graph, Inputs, OptimizationLevel,
    Visibility,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

type F = BN254Scalar;

/// One request of [`Workspace::prove_many`].
#[derive(Clone, Debug)]
pub struct ProveRequest {
    /// The circuit to prove.
    pub circuit: ArtifactId,
    /// Its proving key.
    pub proving_key: ArtifactId,
    /// The witness inputs.
    pub inputs: Inputs,
}

/// What `info` reports about a circuit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitInfo {
    /// The circuit fingerprint.
    pub fingerprint: Fingerprint,
    /// The level it was compiled at.
    pub optimization_level: OptimizationLevel,
    /// Number of graph nodes.
    pub num_nodes: usize,
    /// Number of constraints.
    pub num_constraints: usize,
    /// Number of public slots.
    pub num_public: usize,
    /// Number of private variables.
    pub num_private: usize,
    /// Labels of the public slots, in order.
    pub public: Vec<String>,
    /// Input names and their visibility.
    pub inputs: Vec<(String, Visibility)>,
}

/// An artifact store together with the operations of the toolchain.
pub struct Workspace {
    config: Config,
    store: ArtifactStore,
    cancel: CancellationToken,
}

/// A ChaCha stream seeded from the operating system.
fn fresh_rng() -> ChaChaRng {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    let prng = ChaChaRng::from_seed(seed);
    seed.zeroize();
    prng
}

impl Workspace {
    /// Open the workspace described by `config`.
    pub fn open(config: Config) -> Result<Self> {
        let store = ArtifactStore::open(&config.workspace, config.conflict_policy)?;
        tracing::info!(workspace = %config.workspace.display(), "opened workspace");
        Ok(Self {
            config,
            store,
            cancel: CancellationToken::new(),
        })
    }

    /// Open a workspace at `root` with the default configuration.
    pub fn open_at<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::open(Config {
            workspace: root.as_ref().to_path_buf(),
            ..Config::default()
        })
    }

    /// Borrow the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Borrow the artifact store.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// The token that cancels every running operation of this workspace.
    /// It stays cancelled until [`Workspace::reset_cancellation`].
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Clear a cancellation request so later operations run again.
    pub fn reset_cancellation(&self) {
        self.cancel.reset();
        tracing::debug!("cancellation cleared");
    }

    /// Store two artifacts of one circuit as a unit and return their ids.
    fn put_pair(
        &self,
        fingerprint: Fingerprint,
        scheme: SchemeKind,
        first: (ArtifactKind, &[u8]),
        second: (ArtifactKind, &[u8]),
    ) -> Result<(ArtifactId, ArtifactId)> {
        let batch = [first, second].map(|(kind, bytes)| NewArtifact {
            kind,
            fingerprint,
            scheme: Some(scheme),
            bytes,
        });
        let ids = self.store.put_all(&batch, &self.cancel)?;
        match ids[..] {
            [a, b] => Ok((a, b)),
            _ => Err(ZkError::Io(format!("stored {} artifacts, expected 2", ids.len()))),
        }
    }

    /// Compile a graph and store the circuit.
    pub fn compile(&self, graph: &Graph, level: OptimizationLevel) -> Result<ArtifactId> {
        let span = tracing::info_span!("compile", opt_level = %level);
        let _enter = span.enter();
        let compiled = compile::<F>(graph, level)?;
        let bytes = seal(ArtifactKind::Circuit, None, &compiled)?;
        let id = self.store.put_cancellable(
            ArtifactKind::Circuit,
            compiled.fingerprint(),
            None,
            &bytes,
            &self.cancel,
        )?;
        tracing::info!(
            artifact = %id,
            constraints = compiled.circuit.num_constraints(),
            "compiled circuit"
        );
        Ok(id)
    }

    /// Load a stored circuit and check it against its name.
    pub fn load_circuit(&self, id: &ArtifactId) -> Result<CompiledCircuit<F>> {
        id.expect_kind(ArtifactKind::Circuit)?;
        let (_, compiled): (_, CompiledCircuit<F>) =
            open(&self.store.get(id)?, ArtifactKind::Circuit)?;
        compiled.circuit.check_fingerprint()?;
        if compiled.fingerprint() != id.fingerprint() {
            return Err(Groth16Error::CircuitMismatch {
                expected: id.fingerprint(),
                found: compiled.fingerprint(),
            }
            .into());
        }
        Ok(compiled)
    }

    /// Describe a stored circuit.
    pub fn circuit_info(&self, id: &ArtifactId) -> Result<CircuitInfo> {
        let compiled = self.load_circuit(id)?;
        let circuit = &compiled.circuit;
        let interface = circuit.interface();
        Ok(CircuitInfo {
            fingerprint: compiled.fingerprint(),
            optimization_level: compiled.level,
            num_nodes: compiled.graph.len(),
            num_constraints: circuit.num_constraints(),
            num_public: circuit.num_public(),
            num_private: circuit.num_private(),
            public: interface.public.clone(),
            inputs: interface
                .inputs
                .iter()
                .map(|slot| (slot.name.clone(), slot.visibility))
                .collect(),
        })
    }

    /// Run the trusted setup of `scheme` for a stored circuit and store
    /// the proving and verification keys.
    pub fn setup(&self, circuit: &ArtifactId, scheme: SchemeKind) -> Result<(ArtifactId, ArtifactId)> {
        let span = tracing::info_span!("setup", %scheme);
        let _enter = span.enter();
        let compiled = self.load_circuit(circuit)?;
        let fingerprint = compiled.fingerprint();
        let (pk, vk) = scheme
            .resolve()
            .setup(&mut fresh_rng(), &compiled.circuit, &self.cancel)?;

        let pk_bytes = seal_payload(ArtifactKind::ProvingKey, Some(scheme), &pk);
        let vk_bytes = seal_payload(ArtifactKind::VerifyingKey, Some(scheme), &vk);
        let (pk_id, vk_id) = self.put_pair(
            fingerprint,
            scheme,
            (ArtifactKind::ProvingKey, pk_bytes.as_slice()),
            (ArtifactKind::VerifyingKey, vk_bytes.as_slice()),
        )?;
        tracing::info!(proving_key = %pk_id, verifying_key = %vk_id, "stored keys");
        Ok((pk_id, vk_id))
    }

    /// Generate a witness for `inputs`, prove it, and store the proof and
    /// the public inputs. The two are written as a unit, so concurrent
    /// provers of one circuit never leave a proof next to another
    /// prover's public inputs.
    pub fn prove(
        &self,
        circuit: &ArtifactId,
        proving_key: &ArtifactId,
        inputs: &Inputs,
    ) -> Result<(ArtifactId, ArtifactId)> {
        let span = tracing::info_span!("prove", circuit = %circuit);
        let _enter = span.enter();
        proving_key.expect_kind(ArtifactKind::ProvingKey)?;
        let compiled = self.load_circuit(circuit)?;
        let fingerprint = compiled.fingerprint();
        if proving_key.fingerprint() != fingerprint {
            return Err(Groth16Error::CircuitMismatch {
                expected: fingerprint,
                found: proving_key.fingerprint(),
            }
            .into());
        }
        let pk_bytes = self.store.get(proving_key)?;
        let (scheme, pk) = open_payload(&pk_bytes, ArtifactKind::ProvingKey)?;
        let scheme = scheme.ok_or_else(|| {
            ZkError::DeserializationError("proving key without a scheme".to_string())
        })?;

        let witness = generate_witness(&compiled, inputs)?;
        let proof = scheme
            .resolve()
            .prove(&mut fresh_rng(), &compiled.circuit, pk, &witness, &self.cancel)?;
        let public = PublicInputs::new(fingerprint, witness.public_inputs().to_vec());

        let proof_bytes = seal_payload(ArtifactKind::Proof, Some(scheme), &proof);
        let public_bytes = seal(ArtifactKind::PublicInputs, Some(scheme), &public)?;
        let (proof_id, public_id) = self.put_pair(
            fingerprint,
            scheme,
            (ArtifactKind::Proof, proof_bytes.as_slice()),
            (ArtifactKind::PublicInputs, public_bytes.as_slice()),
        )?;
        tracing::info!(proof = %proof_id, public_inputs = %public_id, "stored proof");
        Ok((proof_id, public_id))
    }

    /// Run independent prove requests, in parallel with the `parallel`
    /// feature. Results are in request order.
    pub fn prove_many(&self, requests: &[ProveRequest]) -> Vec<Result<(ArtifactId, ArtifactId)>> {
        #[cfg(feature = "parallel")]
        let iter = requests.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = requests.iter();
        iter.map(|r| self.prove(&r.circuit, &r.proving_key, &r.inputs))
            .collect()
    }

    /// Check a stored proof against a stored verification key and public
    /// inputs.
    pub fn verify(
        &self,
        verifying_key: &ArtifactId,
        proof: &ArtifactId,
        public_inputs: &ArtifactId,
    ) -> Result<bool> {
        let vk_bytes = self.store.get(verifying_key)?;
        let mut pair = self.store.get_all(&[*proof, *public_inputs])?;
        let (public_bytes, proof_bytes) = match (pair.pop(), pair.pop()) {
            (Some(public), Some(proof)) => (public, proof),
            _ => return Err(ZkError::Io("incomplete proof read".to_string())),
        };

        let (vk_scheme, vk) = open_payload(&vk_bytes, ArtifactKind::VerifyingKey)?;
        let (proof_scheme, proof) = open_payload(&proof_bytes, ArtifactKind::Proof)?;
        let (public_scheme, public): (_, PublicInputs<F>) =
            open(&public_bytes, ArtifactKind::PublicInputs)?;
        let scheme = vk_scheme.ok_or_else(|| {
            ZkError::DeserializationError("verification key without a scheme".to_string())
        })?;
        for found in [proof_scheme, public_scheme].iter().flatten() {
            if *found != scheme {
                return Err(ZkError::SchemeMismatch {
                    expected: scheme,
                    found: *found,
                });
            }
        }

        let valid = scheme.resolve().verify(vk, proof, &public)?;
        tracing::info!(verifying_key = %verifying_key, valid, "verified proof");
        Ok(valid)
    }

    /// Render a verifier for a stored verification key.
    pub fn export_verifier(&self, verifying_key: &ArtifactId, format: ExportFormat) -> Result<Vec<u8>> {
        let bytes = self.store.get(verifying_key)?;
        let (scheme, vk) = open_payload(&bytes, ArtifactKind::VerifyingKey)?;
        let scheme = scheme.ok_or_else(|| {
            ZkError::DeserializationError("verification key without a scheme".to_string())
        })?;
        scheme.resolve().export_verifier(vk, format)
    }

    /// List every stored artifact.
    pub fn list(&self) -> Result<Vec<ArtifactId>> {
        self.store.list()
    }

    /// Delete every artifact not belonging to one of the `keep` circuits.
    pub fn gc(&self, keep: &[Fingerprint]) -> Result<Vec<ArtifactId>> {
        self.store.gc(keep)
    }

    /// Delete every artifact.
    pub fn teardown(&self) -> Result<usize> {
        self.store.teardown()
    }
}
