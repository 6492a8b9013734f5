use crate::bn254::{BN254Gt, BN254Scalar, BN254G1, BN254G2};
use crate::prelude::*;
use ark_bn254::{Bn254, G1Projective, G2Projective};
use ark_ec::{pairing::Pairing as ArkPairing, CurveGroup};

/// The optimal ate pairing on BN254.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BN254PairingEngine;

impl Pairing for BN254PairingEngine {
    type ScalarField = BN254Scalar;
    type G1 = BN254G1;
    type G2 = BN254G2;
    type Gt = BN254Gt;

    fn pairing(a: &BN254G1, b: &BN254G2) -> BN254Gt {
        BN254Gt(Bn254::pairing(a.0, b.0).0)
    }

    fn multi_pairing(a: &[BN254G1], b: &[BN254G2]) -> BN254Gt {
        let lhs = G1Projective::normalize_batch(&a.iter().map(|p| p.0).collect::<Vec<_>>());
        let rhs = G2Projective::normalize_batch(&b.iter().map(|q| q.0).collect::<Vec<_>>());
        BN254Gt(Bn254::multi_pairing(lhs, rhs).0)
    }
}
