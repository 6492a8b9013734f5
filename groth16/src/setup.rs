//! Circuit-specific trusted setup.
use crate::cancel::CancellationToken;
use crate::errors::{Groth16Error, Result};
use crate::keys::{ProvingKey, VerifyingKey};
use crate::qap::{self, QapDomain};
use ark_poly::EvaluationDomain;
use ark_std::{cfg_iter, end_timer, start_timer};
use zkinfer_algebra::prelude::*;
use zkinfer_r1cs::Circuit;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The trapdoor of one setup run. It is never printed or serialized and
/// is wiped when dropped, including on early return.
pub(crate) struct ToxicWaste<F: Scalar> {
    tau: F,
    alpha: F,
    beta: F,
    gamma: F,
    delta: F,
}

impl<F: FftScalar> ToxicWaste<F> {
    fn sample<R: CryptoRng + RngCore>(prng: &mut R, domain: &QapDomain<F>) -> Self {
        // tau must lie outside the domain, so that Z(tau) != 0.
        let tau = loop {
            let tau = F::random(prng);
            let z = F::from_ark(domain.evaluate_vanishing_polynomial(tau.to_ark()));
            if !z.is_zero() {
                break tau;
            }
        };
        Self {
            tau,
            alpha: sample_nonzero(prng),
            beta: sample_nonzero(prng),
            gamma: sample_nonzero(prng),
            delta: sample_nonzero(prng),
        }
    }
}

impl<F: Scalar> ToxicWaste<F> {
    fn wipe(&mut self) {
        self.tau.zeroize();
        self.alpha.zeroize();
        self.beta.zeroize();
        self.gamma.zeroize();
        self.delta.zeroize();
    }
}

impl<F: Scalar> Drop for ToxicWaste<F> {
    fn drop(&mut self) {
        self.wipe();
    }
}

fn sample_nonzero<F: Scalar, R: CryptoRng + RngCore>(prng: &mut R) -> F {
    loop {
        let x = F::random(prng);
        if !x.is_zero() {
            return x;
        }
    }
}

fn batch_mul<G: Group>(base: &G, scalars: &[G::ScalarType]) -> Vec<G> {
    cfg_iter!(scalars).map(|s| base.mul(s)).collect()
}

fn check_layout<F: Scalar>(circuit: &Circuit<F>) -> Result<()> {
    circuit
        .check_fingerprint()
        .map_err(|e| Groth16Error::SetupError(e.to_string()))?;
    if circuit.num_constraints() == 0 {
        return Err(Groth16Error::SetupError(
            "circuit has no constraints".to_string(),
        ));
    }
    let num_vars = circuit.num_variables();
    let out_of_range = circuit.constraints().iter().any(|cs| {
        [&cs.a, &cs.b, &cs.c]
            .iter()
            .any(|lc| lc.max_variable().map_or(false, |v| v >= num_vars))
    });
    if out_of_range || circuit.interface().public.len() != circuit.num_public() {
        return Err(Groth16Error::SetupError(
            "malformed witness layout".to_string(),
        ));
    }
    Ok(())
}

/// Run the trusted setup for `circuit` and return its proving and
/// verification keys.
///
/// The trapdoor is drawn from `prng`, which must be a cryptographic source
/// in production, and is wiped before this function returns. The keys are
/// bound to the circuit fingerprint. Setup checks `cancel` between stages
/// and returns [`Groth16Error::Cancelled`] once it is set.
pub fn setup<P, R>(
    prng: &mut R,
    circuit: &Circuit<P::ScalarField>,
    cancel: &CancellationToken,
) -> Result<(ProvingKey<P>, VerifyingKey<P>)>
where
    P: Pairing,
    P::ScalarField: FftScalar,
    R: CryptoRng + RngCore,
{
    let setup_time = start_timer!(|| "groth16 setup");
    check_layout(circuit)?;
    let domain = qap::evaluation_domain(circuit).ok_or_else(|| {
        Groth16Error::SetupError("circuit exceeds the largest FFT domain".to_string())
    })?;
    cancel.check()?;

    let waste = ToxicWaste::<P::ScalarField>::sample(prng, &domain);
    let mut gamma_inv = waste.gamma.inv()?;
    let mut delta_inv = waste.delta.inv()?;

    let mut lagrange: Vec<P::ScalarField> = domain
        .evaluate_all_lagrange_coefficients(waste.tau.to_ark())
        .into_iter()
        .map(P::ScalarField::from_ark)
        .collect();
    let (mut u, mut v, mut w) = qap::evaluate_at(circuit, &lagrange);
    lagrange.zeroize();
    cancel.check()?;

    let num_public = circuit.num_public();
    let mut abc: Vec<P::ScalarField> = u
        .iter()
        .zip(v.iter())
        .zip(w.iter())
        .map(|((u_i, v_i), w_i)| {
            waste
                .beta
                .mul(u_i)
                .add(&waste.alpha.mul(v_i))
                .add(w_i)
        })
        .collect();
    w.zeroize();
    let (instance, private) = abc.split_at(num_public + 1);
    let mut gamma_abc: Vec<P::ScalarField> = instance.iter().map(|x| x.mul(&gamma_inv)).collect();
    let mut l_scalars: Vec<P::ScalarField> = private.iter().map(|x| x.mul(&delta_inv)).collect();
    abc.zeroize();

    let g1 = P::G1::generator();
    let g2 = P::G2::generator();

    let query_time = start_timer!(|| "groth16 setup queries");
    let gamma_abc_g1 = batch_mul(&g1, &gamma_abc);
    let l_query = batch_mul(&g1, &l_scalars);
    gamma_abc.zeroize();
    l_scalars.zeroize();
    cancel.check()?;

    let a_query = batch_mul(&g1, &u);
    let b_g1_query = batch_mul(&g1, &v);
    let b_g2_query = batch_mul(&g2, &v);
    u.zeroize();
    v.zeroize();
    cancel.check()?;

    let z_tau =
        P::ScalarField::from_ark(domain.evaluate_vanishing_polynomial(waste.tau.to_ark()));
    let mut h_scalars = Vec::with_capacity(domain.size() - 1);
    let mut acc = z_tau.mul(&delta_inv);
    for _ in 0..domain.size() - 1 {
        h_scalars.push(acc);
        acc.mul_assign(&waste.tau);
    }
    let h_query = batch_mul(&g1, &h_scalars);
    h_scalars.zeroize();
    acc.zeroize();
    gamma_inv.zeroize();
    delta_inv.zeroize();
    end_timer!(query_time);

    let alpha_g1 = g1.mul(&waste.alpha);
    let beta_g2 = g2.mul(&waste.beta);
    let vk = VerifyingKey {
        fingerprint: circuit.fingerprint(),
        alpha_g1,
        beta_g2,
        gamma_g2: g2.mul(&waste.gamma),
        delta_g2: g2.mul(&waste.delta),
        gamma_abc_g1,
        alpha_beta_gt: P::pairing(&alpha_g1, &beta_g2),
    };
    let pk = ProvingKey {
        vk: vk.clone(),
        beta_g1: g1.mul(&waste.beta),
        delta_g1: g1.mul(&waste.delta),
        a_query,
        b_g1_query,
        b_g2_query,
        h_query,
        l_query,
    };
    drop(waste);
    end_timer!(setup_time);

    tracing::info!(
        fingerprint = %vk.fingerprint,
        constraints = circuit.num_constraints(),
        public = num_public,
        domain = domain.size(),
        "generated groth16 keys"
    );
    Ok((pk, vk))
}
