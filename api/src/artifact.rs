//! Artifact names and the versioned envelope every stored artifact uses.
//!
//! An envelope is `[format version][kind tag][scheme tag]` followed by the
//! bincode encoding of the payload. Circuits are scheme independent and
//! carry the scheme tag `0`.
use crate::errors::{Result, ZkError};
use crate::scheme::SchemeKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use zkinfer_r1cs::Fingerprint;

/// The envelope version written by this release.
pub const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = 3;

/// Name used in place of a scheme for circuit artifacts.
const CIRCUIT_NAMESPACE: &str = "r1cs";

/// What an artifact holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    /// A compiled circuit with its witness plan.
    Circuit,
    /// A proving key.
    ProvingKey,
    /// A verification key.
    VerifyingKey,
    /// A proof.
    Proof,
    /// The public inputs of a proof.
    PublicInputs,
}

impl ArtifactKind {
    /// Return the tag stored in the envelope.
    pub fn tag(self) -> u8 {
        match self {
            ArtifactKind::Circuit => 1,
            ArtifactKind::ProvingKey => 2,
            ArtifactKind::VerifyingKey => 3,
            ArtifactKind::Proof => 4,
            ArtifactKind::PublicInputs => 5,
        }
    }

    /// Inverse of [`ArtifactKind::tag`].
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            1 => ArtifactKind::Circuit,
            2 => ArtifactKind::ProvingKey,
            3 => ArtifactKind::VerifyingKey,
            4 => ArtifactKind::Proof,
            5 => ArtifactKind::PublicInputs,
            _ => return None,
        })
    }

    /// Return the suffix used in artifact names.
    pub fn name(self) -> &'static str {
        match self {
            ArtifactKind::Circuit => "circuit",
            ArtifactKind::ProvingKey => "pk",
            ArtifactKind::VerifyingKey => "vk",
            ArtifactKind::Proof => "proof",
            ArtifactKind::PublicInputs => "public",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArtifactKind {
    type Err = ZkError;

    fn from_str(s: &str) -> Result<Self> {
        [
            ArtifactKind::Circuit,
            ArtifactKind::ProvingKey,
            ArtifactKind::VerifyingKey,
            ArtifactKind::Proof,
            ArtifactKind::PublicInputs,
        ]
        .into_iter()
        .find(|k| k.name() == s)
        .ok_or_else(|| ZkError::InvalidArtifactId(s.to_string()))
    }
}

/// The store key of an artifact, displayed as `{scheme}-{fingerprint}-{kind}`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactId {
    scheme: Option<SchemeKind>,
    fingerprint: Fingerprint,
    kind: ArtifactKind,
}

impl ArtifactId {
    /// Build an id. `scheme` is `None` for circuits only.
    pub fn new(scheme: Option<SchemeKind>, fingerprint: Fingerprint, kind: ArtifactKind) -> Self {
        Self {
            scheme,
            fingerprint,
            kind,
        }
    }

    /// Return the proof scheme, or `None` for a circuit.
    pub fn scheme(&self) -> Option<SchemeKind> {
        self.scheme
    }

    /// Return the fingerprint of the circuit the artifact belongs to.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Return the artifact kind.
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Fail with [`ZkError::ArtifactKindMismatch`] unless the id names a `kind`.
    pub fn expect_kind(&self, kind: ArtifactKind) -> Result<()> {
        if self.kind != kind {
            return Err(ZkError::ArtifactKindMismatch {
                expected: kind,
                found: self.kind,
            });
        }
        Ok(())
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme {
            Some(scheme) => write!(f, "{}-{}-{}", scheme, self.fingerprint, self.kind),
            None => write!(f, "{}-{}-{}", CIRCUIT_NAMESPACE, self.fingerprint, self.kind),
        }
    }
}

impl FromStr for ArtifactId {
    type Err = ZkError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ZkError::InvalidArtifactId(s.to_string());
        let mut parts = s.splitn(3, '-');
        let (scheme, fingerprint, kind) = match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), Some(c)) => (a, b, c),
            _ => return Err(invalid()),
        };
        let kind: ArtifactKind = kind.parse().map_err(|_| invalid())?;
        let scheme = if scheme == CIRCUIT_NAMESPACE {
            None
        } else {
            Some(scheme.parse::<SchemeKind>().map_err(|_| invalid())?)
        };
        if (kind == ArtifactKind::Circuit) != scheme.is_none() {
            return Err(invalid());
        }
        let fingerprint: Fingerprint = fingerprint.parse().map_err(|_| invalid())?;
        Ok(ArtifactId::new(scheme, fingerprint, kind))
    }
}

impl Serialize for ArtifactId {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ArtifactId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn scheme_tag(scheme: Option<SchemeKind>) -> u8 {
    scheme.map_or(0, SchemeKind::tag)
}

/// Wrap an already encoded payload in an envelope.
pub fn seal_payload(kind: ArtifactKind, scheme: Option<SchemeKind>, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.push(FORMAT_VERSION);
    bytes.push(kind.tag());
    bytes.push(scheme_tag(scheme));
    bytes.extend_from_slice(payload);
    bytes
}

/// Encode `value` with bincode and wrap it in an envelope.
pub fn seal<T: Serialize>(kind: ArtifactKind, scheme: Option<SchemeKind>, value: &T) -> Result<Vec<u8>> {
    Ok(seal_payload(kind, scheme, &to_payload(value)?))
}

/// Check the envelope header and return the scheme and the raw payload.
pub fn open_payload(bytes: &[u8], expected: ArtifactKind) -> Result<(Option<SchemeKind>, &[u8])> {
    if bytes.len() < HEADER_LEN {
        return Err(ZkError::DeserializationError(
            "artifact is shorter than its header".to_string(),
        ));
    }
    if bytes[0] != FORMAT_VERSION {
        return Err(ZkError::UnsupportedFormatVersion(bytes[0]));
    }
    let kind = ArtifactKind::from_tag(bytes[1]).ok_or_else(|| {
        ZkError::DeserializationError(format!("unknown artifact kind tag {}", bytes[1]))
    })?;
    if kind != expected {
        return Err(ZkError::ArtifactKindMismatch {
            expected,
            found: kind,
        });
    }
    let scheme = match bytes[2] {
        0 => None,
        tag => Some(SchemeKind::from_tag(tag).ok_or_else(|| {
            ZkError::DeserializationError(format!("unknown scheme tag {}", tag))
        })?),
    };
    if (kind == ArtifactKind::Circuit) != scheme.is_none() {
        return Err(ZkError::DeserializationError(format!(
            "{} artifact with scheme tag {}",
            kind, bytes[2]
        )));
    }
    Ok((scheme, &bytes[HEADER_LEN..]))
}

/// Check the envelope header and decode the payload.
pub fn open<T: DeserializeOwned>(bytes: &[u8], expected: ArtifactKind) -> Result<(Option<SchemeKind>, T)> {
    let (scheme, payload) = open_payload(bytes, expected)?;
    Ok((scheme, from_payload(payload)?))
}

pub(crate) fn to_payload<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| ZkError::SerializationError(e.to_string()))
}

pub(crate) fn from_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    bincode::deserialize(payload).map_err(|e| ZkError::DeserializationError(e.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    fn fingerprint() -> Fingerprint {
        Fingerprint([0xab; 32])
    }

    #[test]
    fn names_parse_back() {
        let id = ArtifactId::new(Some(SchemeKind::Groth16), fingerprint(), ArtifactKind::VerifyingKey);
        let name = id.to_string();
        assert_eq!(name, format!("groth16-{}-vk", "ab".repeat(32)));
        assert_eq!(name.parse::<ArtifactId>().unwrap(), id);

        let circuit = ArtifactId::new(None, fingerprint(), ArtifactKind::Circuit);
        assert!(circuit.to_string().starts_with("r1cs-"));
        assert_eq!(circuit.to_string().parse::<ArtifactId>().unwrap(), circuit);
    }

    #[test]
    fn malformed_names_are_rejected() {
        let fp = "ab".repeat(32);
        for name in [
            String::new(),
            "groth16".to_string(),
            format!("groth16-{}", fp),
            format!("groth16-{}-key", fp),
            format!("groth16-{}-circuit", fp),
            format!("r1cs-{}-vk", fp),
            format!("snark-{}-vk", fp),
            "groth16-abcd-vk".to_string(),
        ] {
            assert!(name.parse::<ArtifactId>().is_err(), "{}", name);
        }
    }

    #[test]
    fn envelope_header_is_checked() {
        let bytes = seal(ArtifactKind::Proof, Some(SchemeKind::Groth16), &vec![1u32, 2, 3]).unwrap();
        assert_eq!(&bytes[..3], &[FORMAT_VERSION, 4, 1]);
        let (scheme, value): (_, Vec<u32>) = open(&bytes, ArtifactKind::Proof).unwrap();
        assert_eq!(scheme, Some(SchemeKind::Groth16));
        assert_eq!(value, vec![1, 2, 3]);

        assert_eq!(
            open::<Vec<u32>>(&bytes, ArtifactKind::VerifyingKey).err(),
            Some(ZkError::ArtifactKindMismatch {
                expected: ArtifactKind::VerifyingKey,
                found: ArtifactKind::Proof
            })
        );

        let mut future = bytes.clone();
        future[0] = FORMAT_VERSION + 1;
        assert_eq!(
            open::<Vec<u32>>(&future, ArtifactKind::Proof).err(),
            Some(ZkError::UnsupportedFormatVersion(FORMAT_VERSION + 1))
        );

        assert!(open::<Vec<u32>>(&bytes[..2], ArtifactKind::Proof).is_err());

        let mut no_scheme = bytes;
        no_scheme[2] = 0;
        assert!(open::<Vec<u32>>(&no_scheme, ArtifactKind::Proof).is_err());
    }
}
