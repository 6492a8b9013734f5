use zkinfer_algebra::prelude::*;
use zkinfer_r1cs::Fingerprint;

/// Groth16 verification key, bound to one circuit.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct VerifyingKey<P: Pairing> {
    pub(crate) fingerprint: Fingerprint,
    pub(crate) alpha_g1: P::G1,
    pub(crate) beta_g2: P::G2,
    pub(crate) gamma_g2: P::G2,
    pub(crate) delta_g2: P::G2,
    /// `(beta * u_i + alpha * v_i + w_i) / gamma` for the constant and public slots.
    pub(crate) gamma_abc_g1: Vec<P::G1>,
    /// `e(alpha, beta)`, precomputed.
    pub(crate) alpha_beta_gt: P::Gt,
}

impl<P: Pairing> Clone for VerifyingKey<P> {
    fn clone(&self) -> Self {
        Self {
            fingerprint: self.fingerprint,
            alpha_g1: self.alpha_g1.clone(),
            beta_g2: self.beta_g2.clone(),
            gamma_g2: self.gamma_g2.clone(),
            delta_g2: self.delta_g2.clone(),
            gamma_abc_g1: self.gamma_abc_g1.clone(),
            alpha_beta_gt: self.alpha_beta_gt.clone(),
        }
    }
}

impl<P: Pairing> VerifyingKey<P> {
    /// Return the fingerprint of the circuit the key was generated for.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Return the number of public inputs the key expects.
    pub fn num_public(&self) -> usize {
        self.gamma_abc_g1.len().saturating_sub(1)
    }

    /// Return `alpha` in G1.
    pub fn alpha_g1(&self) -> &P::G1 {
        &self.alpha_g1
    }

    /// Return `beta` in G2.
    pub fn beta_g2(&self) -> &P::G2 {
        &self.beta_g2
    }

    /// Return `gamma` in G2.
    pub fn gamma_g2(&self) -> &P::G2 {
        &self.gamma_g2
    }

    /// Return `delta` in G2.
    pub fn delta_g2(&self) -> &P::G2 {
        &self.delta_g2
    }

    /// Return the input commitment bases, constant slot first.
    pub fn gamma_abc_g1(&self) -> &[P::G1] {
        &self.gamma_abc_g1
    }
}

/// Groth16 proving key, bound to one circuit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ProvingKey<P: Pairing> {
    pub(crate) vk: VerifyingKey<P>,
    pub(crate) beta_g1: P::G1,
    pub(crate) delta_g1: P::G1,
    /// `u_i(tau)` for every variable.
    pub(crate) a_query: Vec<P::G1>,
    /// `v_i(tau)` in G1 for every variable.
    pub(crate) b_g1_query: Vec<P::G1>,
    /// `v_i(tau)` in G2 for every variable.
    pub(crate) b_g2_query: Vec<P::G2>,
    /// `tau^j * Z(tau) / delta`.
    pub(crate) h_query: Vec<P::G1>,
    /// `(beta * u_i + alpha * v_i + w_i) / delta` for the private slots.
    pub(crate) l_query: Vec<P::G1>,
}

impl<P: Pairing> ProvingKey<P> {
    /// Return the fingerprint of the circuit the key was generated for.
    pub fn fingerprint(&self) -> Fingerprint {
        self.vk.fingerprint
    }

    /// Borrow the matching verification key.
    pub fn verifying_key(&self) -> &VerifyingKey<P> {
        &self.vk
    }
}
