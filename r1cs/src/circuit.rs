use crate::errors::{R1csError, Result};
use crate::graph::{NodeId, Visibility};
use crate::lc::{LinearCombination, VarIndex};
use ark_std::{fmt, str::FromStr};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zkinfer_algebra::prelude::*;

/// Domain separator mixed into every circuit fingerprint.
const FINGERPRINT_DOMAIN: &[u8] = b"zkinfer.circuit.v1";

/// The SHA-256 content hash identifying a compiled circuit.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Borrow the raw digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Return the lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = R1csError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|_| R1csError::InvalidGraph(format!("`{}` is not a hex fingerprint", s)))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| R1csError::InvalidGraph(format!("`{}` is not 32 bytes", s)))?;
        Ok(Fingerprint(arr))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Self, D::Error> {
        let bytes = if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            hex::decode(s).map_err(serde::de::Error::custom)?
        } else {
            deserializer.deserialize_bytes(BytesVisitor)?
        };
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("fingerprint must be 32 bytes"))?;
        Ok(Fingerprint(arr))
    }
}

/// One rank-1 constraint `(A.w) * (B.w) = (C.w)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Constraint<F: Scalar> {
    /// The left factor.
    pub a: LinearCombination<F>,
    /// The right factor.
    pub b: LinearCombination<F>,
    /// The product.
    pub c: LinearCombination<F>,
}

impl<F: Scalar> Constraint<F> {
    /// Return true if the witness satisfies this constraint.
    pub fn is_satisfied(&self, witness: &[F]) -> Result<bool> {
        let a = self.a.evaluate(witness)?;
        let b = self.b.evaluate(witness)?;
        let c = self.c.evaluate(witness)?;
        Ok(a.mul(&b) == c)
    }
}

/// A graph input as seen by the circuit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSlot {
    /// The input name.
    pub name: String,
    /// Whether the value is part of the public statement.
    pub visibility: Visibility,
    /// The graph node defining the input.
    pub node: NodeId,
    /// The witness variable holding the value.
    pub var: VarIndex,
}

/// A graph output as seen by the circuit. Outputs are always public.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSlot {
    /// The output name.
    pub name: String,
    /// The graph node defining the output.
    pub node: NodeId,
    /// The witness variable holding the value.
    pub var: VarIndex,
}

/// Names and positions of the circuit's inputs and outputs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitInterface {
    /// Inputs in graph order.
    pub inputs: Vec<InputSlot>,
    /// Outputs in graph order.
    pub outputs: Vec<OutputSlot>,
    /// Labels of the public slots `w[1..=num_public]`, in order.
    pub public: Vec<String>,
}

/// An immutable rank-1 constraint system over the witness layout
/// `w = [1, public..., private...]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Circuit<F: Scalar> {
    num_public: usize,
    num_private: usize,
    constraints: Vec<Constraint<F>>,
    interface: CircuitInterface,
    fingerprint: Fingerprint,
}

impl<F: Scalar> Circuit<F> {
    /// Seal a constraint list into a circuit and compute its fingerprint.
    pub fn new(
        num_public: usize,
        num_private: usize,
        constraints: Vec<Constraint<F>>,
        interface: CircuitInterface,
    ) -> Result<Self> {
        if interface.public.len() != num_public {
            return Err(R1csError::InvalidGraph(format!(
                "{} public labels for {} public slots",
                interface.public.len(),
                num_public
            )));
        }
        let num_vars = 1 + num_public + num_private;
        for (i, cs) in constraints.iter().enumerate() {
            for lc in [&cs.a, &cs.b, &cs.c] {
                if lc.max_variable().map_or(false, |v| v >= num_vars) {
                    return Err(R1csError::InvalidGraph(format!(
                        "constraint {} references a variable outside the witness layout",
                        i
                    )));
                }
            }
        }
        let fingerprint = compute_fingerprint(num_public, num_private, &constraints, &interface);
        Ok(Self {
            num_public,
            num_private,
            constraints,
            interface,
            fingerprint,
        })
    }

    /// Return the number of public slots.
    pub fn num_public(&self) -> usize {
        self.num_public
    }

    /// Return the number of private slots.
    pub fn num_private(&self) -> usize {
        self.num_private
    }

    /// Return the length of the witness vector, including the constant one.
    pub fn num_variables(&self) -> usize {
        1 + self.num_public + self.num_private
    }

    /// Return the number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Borrow the constraints.
    pub fn constraints(&self) -> &[Constraint<F>] {
        &self.constraints
    }

    /// Borrow the input/output interface.
    pub fn interface(&self) -> &CircuitInterface {
        &self.interface
    }

    /// Return the fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Recompute the fingerprint and compare it with the stored one.
    pub fn check_fingerprint(&self) -> Result<()> {
        let expected = compute_fingerprint(
            self.num_public,
            self.num_private,
            &self.constraints,
            &self.interface,
        );
        if expected != self.fingerprint {
            return Err(R1csError::CorruptedCircuit);
        }
        Ok(())
    }

    /// Check the witness against every constraint.
    pub fn verify_witness(&self, witness: &[F]) -> Result<()> {
        if witness.len() != self.num_variables() {
            return Err(R1csError::WitnessInconsistency(format!(
                "witness has {} entries, circuit expects {}",
                witness.len(),
                self.num_variables()
            )));
        }
        if witness[0] != F::one() {
            return Err(R1csError::WitnessInconsistency(
                "the constant slot must hold one".to_string(),
            ));
        }
        for (i, cs) in self.constraints.iter().enumerate() {
            if !cs.is_satisfied(witness)? {
                return Err(R1csError::WitnessInconsistency(format!(
                    "constraint {} is not satisfied",
                    i
                )));
            }
        }
        Ok(())
    }
}

fn compute_fingerprint<F: Scalar>(
    num_public: usize,
    num_private: usize,
    constraints: &[Constraint<F>],
    interface: &CircuitInterface,
) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(FINGERPRINT_DOMAIN);
    hasher.update((num_public as u64).to_le_bytes());
    hasher.update((num_private as u64).to_le_bytes());
    hasher.update((constraints.len() as u64).to_le_bytes());
    for cs in constraints {
        for lc in [&cs.a, &cs.b, &cs.c] {
            hasher.update((lc.terms().len() as u64).to_le_bytes());
            for (var, coeff) in lc.terms() {
                hasher.update((*var as u64).to_le_bytes());
                hasher.update(coeff.to_bytes());
            }
        }
    }
    for label in interface.public.iter() {
        update_str(&mut hasher, label);
    }
    for input in interface.inputs.iter() {
        update_str(&mut hasher, &input.name);
        hasher.update([matches!(input.visibility, Visibility::Public) as u8]);
        hasher.update((input.node as u64).to_le_bytes());
        hasher.update((input.var as u64).to_le_bytes());
    }
    for output in interface.outputs.iter() {
        update_str(&mut hasher, &output.name);
        hasher.update((output.node as u64).to_le_bytes());
        hasher.update((output.var as u64).to_le_bytes());
    }
    Fingerprint(hasher.finalize().into())
}

fn update_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

#[cfg(test)]
mod test {
    use super::*;
    use zkinfer_algebra::bn254::BN254Scalar;

    type F = BN254Scalar;
    type LC = LinearCombination<F>;

    fn mul_circuit() -> Circuit<F> {
        // w = [1, c, a, b], a * b = c
        let constraints = vec![Constraint {
            a: LC::variable(2),
            b: LC::variable(3),
            c: LC::variable(1),
        }];
        let interface = CircuitInterface {
            public: vec!["c".to_string()],
            ..Default::default()
        };
        Circuit::new(1, 2, constraints, interface).unwrap()
    }

    #[test]
    fn witness_check() {
        let circuit = mul_circuit();
        assert_eq!(circuit.num_variables(), 4);
        let good = vec![F::one(), F::from(12u32), F::from(3u32), F::from(4u32)];
        assert!(circuit.verify_witness(&good).is_ok());

        let bad = vec![F::one(), F::from(13u32), F::from(3u32), F::from(4u32)];
        assert!(matches!(
            circuit.verify_witness(&bad),
            Err(R1csError::WitnessInconsistency(_))
        ));

        let short = vec![F::one(), F::from(12u32)];
        assert!(circuit.verify_witness(&short).is_err());
    }

    #[test]
    fn fingerprint_is_content_addressed() {
        let a = mul_circuit();
        let b = mul_circuit();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert!(a.check_fingerprint().is_ok());

        let constraints = vec![Constraint {
            a: LC::variable(2),
            b: LC::variable(3).add_term(0, F::one()),
            c: LC::variable(1),
        }];
        let interface = CircuitInterface {
            public: vec!["c".to_string()],
            ..Default::default()
        };
        let other = Circuit::new(1, 2, constraints, interface).unwrap();
        assert_ne!(a.fingerprint(), other.fingerprint());
    }

    #[test]
    fn fingerprint_hex_round_trip() {
        let fp = mul_circuit().fingerprint();
        let parsed: Fingerprint = fp.to_hex().parse().unwrap();
        assert_eq!(parsed, fp);
        assert!("abc".parse::<Fingerprint>().is_err());

        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{}\"", fp.to_hex()));
        let bin = bincode::serialize(&fp).unwrap();
        assert_eq!(bincode::deserialize::<Fingerprint>(&bin).unwrap(), fp);
    }

    #[test]
    fn tampered_circuit_is_detected() {
        let circuit = mul_circuit();
        let mut json = serde_json::to_value(&circuit).unwrap();
        json["num_private"] = serde_json::json!(3);
        let tampered: Circuit<F> = serde_json::from_value(json).unwrap();
        assert_eq!(tampered.check_fingerprint(), Err(R1csError::CorruptedCircuit));
    }

    #[test]
    fn out_of_layout_variables_are_rejected() {
        let constraints = vec![Constraint {
            a: LC::variable(7),
            b: LC::variable(1),
            c: LC::zero(),
        }];
        let interface = CircuitInterface {
            public: vec!["x".to_string()],
            ..Default::default()
        };
        assert!(Circuit::new(1, 1, constraints, interface).is_err());
    }
}
