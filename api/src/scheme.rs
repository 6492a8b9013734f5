//! Proof-scheme selection and dispatch.
use crate::artifact::{from_payload, to_payload};
use crate::errors::{Result, ZkError};
use crate::export::{self, ExportFormat};
use rand_chacha::ChaChaRng;
use std::{fmt, str::FromStr};
use zkinfer_algebra::bn254::{BN254PairingEngine, BN254Scalar};
use zkinfer_groth16::{CancellationToken, Proof, ProvingKey, PublicInputs, VerifyingKey};
use zkinfer_r1cs::{Circuit, WitnessAssignment};

/// The pairing engine every scheme runs over.
pub type Engine = BN254PairingEngine;

/// The proof systems the toolchain recognises.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    /// Groth16 with a circuit-specific setup.
    #[default]
    #[serde(alias = "g16")]
    Groth16,
    /// GM17. Recognised, not implemented.
    Gm17,
    /// PLONK. Recognised, not implemented.
    Plonk,
}

impl SchemeKind {
    /// Return the tag stored in artifact envelopes.
    pub fn tag(self) -> u8 {
        match self {
            SchemeKind::Groth16 => 1,
            SchemeKind::Gm17 => 2,
            SchemeKind::Plonk => 3,
        }
    }

    /// Inverse of [`SchemeKind::tag`].
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(SchemeKind::Groth16),
            2 => Some(SchemeKind::Gm17),
            3 => Some(SchemeKind::Plonk),
            _ => None,
        }
    }

    /// Return the implementation behind this scheme.
    pub fn resolve(self) -> Box<dyn ProofScheme> {
        match self {
            SchemeKind::Groth16 => Box::new(Groth16Scheme),
            other => Box::new(Unsupported(other)),
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchemeKind::Groth16 => "groth16",
            SchemeKind::Gm17 => "gm17",
            SchemeKind::Plonk => "plonk",
        })
    }
}

impl FromStr for SchemeKind {
    type Err = ZkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groth16" | "g16" => Ok(SchemeKind::Groth16),
            "gm17" => Ok(SchemeKind::Gm17),
            "plonk" => Ok(SchemeKind::Plonk),
            _ => Err(ZkError::UnknownScheme(s.to_string())),
        }
    }
}

/// A proof system, seen through its serialized keys and proofs.
///
/// Keys and proofs cross this boundary as the bincode payloads stored in
/// artifact envelopes, so the workspace never needs to know their types.
pub trait ProofScheme: Send + Sync {
    /// Return which scheme this is.
    fn kind(&self) -> SchemeKind;

    /// Run the trusted setup and return the encoded `(proving key, verification key)`.
    fn setup(
        &self,
        prng: &mut ChaChaRng,
        circuit: &Circuit<BN254Scalar>,
        cancel: &CancellationToken,
    ) -> Result<(Vec<u8>, Vec<u8>)>;

    /// Prove that `witness` satisfies `circuit` and return the encoded proof.
    fn prove(
        &self,
        prng: &mut ChaChaRng,
        circuit: &Circuit<BN254Scalar>,
        proving_key: &[u8],
        witness: &WitnessAssignment<BN254Scalar>,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>>;

    /// Check an encoded proof.
    fn verify(
        &self,
        verifying_key: &[u8],
        proof: &[u8],
        public_inputs: &PublicInputs<BN254Scalar>,
    ) -> Result<bool>;

    /// Render a verifier for use outside this toolchain.
    fn export_verifier(&self, verifying_key: &[u8], format: ExportFormat) -> Result<Vec<u8>>;
}

/// Groth16 over BN254.
#[derive(Copy, Clone, Debug, Default)]
pub struct Groth16Scheme;

impl ProofScheme for Groth16Scheme {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Groth16
    }

    fn setup(
        &self,
        prng: &mut ChaChaRng,
        circuit: &Circuit<BN254Scalar>,
        cancel: &CancellationToken,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        let (pk, vk) = zkinfer_groth16::setup::<Engine, _>(prng, circuit, cancel)?;
        Ok((to_payload(&pk)?, to_payload(&vk)?))
    }

    fn prove(
        &self,
        prng: &mut ChaChaRng,
        circuit: &Circuit<BN254Scalar>,
        proving_key: &[u8],
        witness: &WitnessAssignment<BN254Scalar>,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let pk: ProvingKey<Engine> = from_payload(proving_key)?;
        let proof = zkinfer_groth16::prove(prng, &pk, circuit, witness, cancel)?;
        to_payload(&proof)
    }

    fn verify(
        &self,
        verifying_key: &[u8],
        proof: &[u8],
        public_inputs: &PublicInputs<BN254Scalar>,
    ) -> Result<bool> {
        let vk: VerifyingKey<Engine> = from_payload(verifying_key)?;
        let proof: Proof<Engine> = from_payload(proof)?;
        Ok(zkinfer_groth16::verify(&vk, &proof, public_inputs)?)
    }

    fn export_verifier(&self, verifying_key: &[u8], format: ExportFormat) -> Result<Vec<u8>> {
        let vk: VerifyingKey<Engine> = from_payload(verifying_key)?;
        Ok(match format {
            ExportFormat::Json => export::groth16_json(&vk)?.into_bytes(),
            ExportFormat::Solidity => export::groth16_solidity(&vk).into_bytes(),
        })
    }
}

/// A recognised scheme without an implementation.
#[derive(Copy, Clone, Debug)]
pub struct Unsupported(SchemeKind);

impl ProofScheme for Unsupported {
    fn kind(&self) -> SchemeKind {
        self.0
    }

    fn setup(
        &self,
        _prng: &mut ChaChaRng,
        _circuit: &Circuit<BN254Scalar>,
        _cancel: &CancellationToken,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        Err(ZkError::SchemeNotSupported(self.0))
    }

    fn prove(
        &self,
        _prng: &mut ChaChaRng,
        _circuit: &Circuit<BN254Scalar>,
        _proving_key: &[u8],
        _witness: &WitnessAssignment<BN254Scalar>,
        _cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        Err(ZkError::SchemeNotSupported(self.0))
    }

    fn verify(
        &self,
        _verifying_key: &[u8],
        _proof: &[u8],
        _public_inputs: &PublicInputs<BN254Scalar>,
    ) -> Result<bool> {
        Err(ZkError::SchemeNotSupported(self.0))
    }

    fn export_verifier(&self, _verifying_key: &[u8], _format: ExportFormat) -> Result<Vec<u8>> {
        Err(ZkError::SchemeNotSupported(self.0))
    }
}
