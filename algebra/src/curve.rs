//! Prime-order groups and the pairing that links them.
use crate::prelude::*;
use ark_std::fmt::Debug;
use serde::{Deserialize, Serialize};

/// A prime-order group, written additively.
pub trait Group:
    Copy
    + Default
    + Debug
    + Eq
    + Serialize
    + for<'de> Deserialize<'de>
    + Neg<Output = Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + for<'a> Mul<&'a Self::ScalarType, Output = Self>
    + for<'a> AddAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + Send
    + Sync
{
    /// The scalars acting on the group.
    type ScalarType: Scalar;

    /// Length of the encoding produced by [`Group::to_bytes`].
    const ENCODED_LEN: usize;

    /// The neutral element.
    fn identity() -> Self;

    /// The fixed generator.
    fn generator() -> Self;

    /// `2 * self`.
    fn double(&self) -> Self;

    /// Sample a uniform element.
    fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self;

    /// Compressed encoding.
    fn to_bytes(&self) -> Vec<u8>;

    /// Decode a compressed encoding, checking that the point lies in the
    /// prime-order subgroup.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;

    /// `sum(scalars[i] * points[i])`. Extra entries of the longer slice are
    /// ignored.
    fn multi_exp(scalars: &[&Self::ScalarType], points: &[&Self]) -> Self;
}

/// A bilinear map `e: G1 x G2 -> Gt`.
pub trait Pairing {
    /// The common scalar field.
    type ScalarField: Scalar;
    /// The first source group.
    type G1: Group<ScalarType = Self::ScalarField>;
    /// The second source group.
    type G2: Group<ScalarType = Self::ScalarField>;
    /// The target group.
    type Gt: Group<ScalarType = Self::ScalarField>;

    /// `e(a, b)`.
    fn pairing(a: &Self::G1, b: &Self::G2) -> Self::Gt;

    /// `sum(e(a[i], b[i]))`, sharing one final exponentiation.
    fn multi_pairing(a: &[Self::G1], b: &[Self::G2]) -> Self::Gt;
}

#[cfg(test)]
pub(crate) mod group_laws {
    use crate::prelude::*;

    pub(crate) fn check_group_laws<G: Group>() {
        let mut rng = test_rng();
        let p = G::random(&mut rng);
        let q = G::random(&mut rng);
        let a = G::ScalarType::random(&mut rng);
        let b = G::ScalarType::random(&mut rng);

        assert_eq!(p.add(&G::identity()), p);
        assert_eq!(p.add(&p.neg()), G::identity());
        assert_eq!(p.double(), p.add(&p));
        assert_eq!(p.add(&q).sub(&q), p);
        assert_eq!(G::generator().mul(&a).add(&G::generator().mul(&b)), G::generator().mul(&(a + b)));

        let mut acc = p;
        acc.add_assign(&q);
        acc.sub_assign(&p);
        assert_eq!(acc, q);
    }

    pub(crate) fn check_multi_exp<G: Group>() {
        assert_eq!(G::multi_exp(&[], &[]), G::identity());

        let mut rng = test_rng();
        let points: Vec<G> = (0..9).map(|_| G::random(&mut rng)).collect();
        let scalars: Vec<G::ScalarType> = (0..9).map(|_| G::ScalarType::random(&mut rng)).collect();
        let expected = points
            .iter()
            .zip(scalars.iter())
            .fold(G::identity(), |acc, (p, s)| acc.add(&p.mul(s)));
        let s: Vec<&G::ScalarType> = scalars.iter().collect();
        let p: Vec<&G> = points.iter().collect();
        assert_eq!(G::multi_exp(&s, &p), expected);

        let zero = G::ScalarType::zero();
        assert_eq!(G::multi_exp(&[&zero], &[&points[0]]), G::identity());
    }

    pub(crate) fn check_encoding<G: Group>() {
        let mut rng = test_rng();
        let p = G::random(&mut rng);
        let bytes = p.to_bytes();
        assert_eq!(bytes.len(), G::ENCODED_LEN);
        assert_eq!(G::from_bytes(&bytes).unwrap(), p);
        assert_eq!(G::from_bytes(&G::identity().to_bytes()).unwrap(), G::identity());
        assert!(G::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }
}
