use crate::errors::{Groth16Error, Result};
use crate::keys::VerifyingKey;
use crate::proof::{Proof, PublicInputs};
use zkinfer_algebra::prelude::*;

/// Check a Groth16 proof against a verification key and the public inputs.
///
/// Returns `Ok(false)` for a well-formed proof that does not verify. A
/// proof or input set bound to a different circuit than the key yields
/// [`Groth16Error::CircuitMismatch`], and the wrong number of public
/// inputs yields [`Groth16Error::MalformedPublicInputs`].
pub fn verify<P: Pairing>(
    vk: &VerifyingKey<P>,
    proof: &Proof<P>,
    public_inputs: &PublicInputs<P::ScalarField>,
) -> Result<bool> {
    for found in [proof.fingerprint(), public_inputs.fingerprint()] {
        if found != vk.fingerprint() {
            return Err(Groth16Error::CircuitMismatch {
                expected: vk.fingerprint(),
                found,
            });
        }
    }
    let values = public_inputs.values();
    if values.len() != vk.num_public() || vk.gamma_abc_g1.is_empty() {
        return Err(Groth16Error::MalformedPublicInputs {
            expected: vk.num_public(),
            found: values.len(),
        });
    }

    let scalars: Vec<&P::ScalarField> = values.iter().collect();
    let bases: Vec<&P::G1> = vk.gamma_abc_g1[1..].iter().collect();
    let acc = vk.gamma_abc_g1[0].add(&P::G1::multi_exp(&scalars, &bases));

    let lhs = P::multi_pairing(
        &[proof.a, acc.neg(), proof.c.neg()],
        &[proof.b, vk.gamma_g2, vk.delta_g2],
    );
    Ok(lhs == vk.alpha_beta_gt)
}
