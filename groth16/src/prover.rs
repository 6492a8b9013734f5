use crate::cancel::CancellationToken;
use crate::errors::{Groth16Error, Result};
use crate::keys::ProvingKey;
use crate::proof::Proof;
use crate::qap;
use ark_poly::EvaluationDomain;
use ark_std::{end_timer, start_timer};
use zkinfer_algebra::prelude::*;
use zkinfer_r1cs::{Circuit, WitnessAssignment};

fn msm<G: Group>(scalars: &[G::ScalarType], points: &[G]) -> G {
    let scalars: Vec<&G::ScalarType> = scalars.iter().collect();
    let points: Vec<&G> = points.iter().collect();
    G::multi_exp(&scalars, &points)
}

fn check_key<P: Pairing>(
    pk: &ProvingKey<P>,
    circuit: &Circuit<P::ScalarField>,
    n: usize,
) -> Result<()> {
    let num_vars = circuit.num_variables();
    let consistent = pk.a_query.len() == num_vars
        && pk.b_g1_query.len() == num_vars
        && pk.b_g2_query.len() == num_vars
        && pk.l_query.len() == circuit.num_private()
        && pk.vk.gamma_abc_g1.len() == circuit.num_public() + 1
        && pk.h_query.len() + 1 == n;
    if !consistent {
        return Err(Groth16Error::ProveError(
            "proving key does not match the circuit layout".to_string(),
        ));
    }
    Ok(())
}

/// Produce a Groth16 proof that `witness` satisfies `circuit`.
///
/// The key must have been generated for `circuit`, otherwise
/// [`Groth16Error::CircuitMismatch`] is returned. The blinding factors are
/// drawn from `prng` and wiped once the proof is assembled.
pub fn prove<P, R>(
    prng: &mut R,
    pk: &ProvingKey<P>,
    circuit: &Circuit<P::ScalarField>,
    witness: &WitnessAssignment<P::ScalarField>,
    cancel: &CancellationToken,
) -> Result<Proof<P>>
where
    P: Pairing,
    P::ScalarField: FftScalar,
    R: CryptoRng + RngCore,
{
    let fingerprint = circuit.fingerprint();
    if pk.fingerprint() != fingerprint {
        return Err(Groth16Error::CircuitMismatch {
            expected: fingerprint,
            found: pk.fingerprint(),
        });
    }
    let w = witness.values();
    circuit.verify_witness(w)?;

    let domain = qap::evaluation_domain(circuit).ok_or_else(|| {
        Groth16Error::ProveError("circuit exceeds the largest FFT domain".to_string())
    })?;
    check_key(pk, circuit, domain.size())?;
    cancel.check()?;

    let prove_time = start_timer!(|| "groth16 prove");
    let h_time = start_timer!(|| "groth16 quotient");
    let mut h = qap::witness_map(circuit, &domain, w)?;
    end_timer!(h_time);
    cancel.check()?;

    let mut r = P::ScalarField::random(prng);
    let mut s = P::ScalarField::random(prng);

    let a = pk
        .vk
        .alpha_g1
        .add(&msm(w, &pk.a_query))
        .add(&pk.delta_g1.mul(&r));
    let b = pk
        .vk
        .beta_g2
        .add(&msm(w, &pk.b_g2_query))
        .add(&pk.vk.delta_g2.mul(&s));
    let b_g1 = pk
        .beta_g1
        .add(&msm(w, &pk.b_g1_query))
        .add(&pk.delta_g1.mul(&s));
    cancel.check()?;

    let private = &w[circuit.num_public() + 1..];
    let mut rs = r.mul(&s);
    let c = msm(private, &pk.l_query)
        .add(&msm(&h, &pk.h_query))
        .add(&a.mul(&s))
        .add(&b_g1.mul(&r))
        .sub(&pk.delta_g1.mul(&rs));

    r.zeroize();
    s.zeroize();
    rs.zeroize();
    h.zeroize();
    end_timer!(prove_time);

    tracing::debug!(fingerprint = %fingerprint, "generated groth16 proof");
    Ok(Proof {
        fingerprint,
        a,
        b,
        c,
    })
}
