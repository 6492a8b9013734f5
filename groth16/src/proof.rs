use zkinfer_algebra::prelude::*;
use zkinfer_r1cs::Fingerprint;

/// A Groth16 proof: `A` and `C` in G1, `B` in G2.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Proof<P: Pairing> {
    pub(crate) fingerprint: Fingerprint,
    pub(crate) a: P::G1,
    pub(crate) b: P::G2,
    pub(crate) c: P::G1,
}

impl<P: Pairing> Proof<P> {
    /// Return the fingerprint of the circuit the proof is bound to.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Return `A`.
    pub fn a(&self) -> &P::G1 {
        &self.a
    }

    /// Return `B`.
    pub fn b(&self) -> &P::G2 {
        &self.b
    }

    /// Return `C`.
    pub fn c(&self) -> &P::G1 {
        &self.c
    }
}

/// The public slots of a witness, in circuit order, bound to a circuit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PublicInputs<F: Scalar> {
    fingerprint: Fingerprint,
    values: Vec<F>,
}

impl<F: Scalar> PublicInputs<F> {
    /// Bind public values to a circuit.
    pub fn new(fingerprint: Fingerprint, values: Vec<F>) -> Self {
        Self {
            fingerprint,
            values,
        }
    }

    /// Return the fingerprint of the circuit.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Borrow the values.
    pub fn values(&self) -> &[F] {
        &self.values
    }
}
