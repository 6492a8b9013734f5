use crate::bn254::{BN254PairingEngine, BN254Scalar, BN254G1, BN254G2};
use crate::prelude::*;
use ark_bn254::{Fq12, Fr};
use ark_ff::{CyclotomicMultSubgroup, Field, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};

/// An element of the order-`r` subgroup of `Fq12*` that pairings land in.
/// Written additively: `+` multiplies in `Fq12`, and scalar multiplication
/// exponentiates.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct BN254Gt(pub(crate) Fq12);

impl Neg for BN254Gt {
    type Output = BN254Gt;

    // inversion in the cyclotomic subgroup is conjugation
    fn neg(self) -> BN254Gt {
        let mut v = self.0;
        let _ = v.cyclotomic_inverse_in_place();
        BN254Gt(v)
    }
}

impl<'a> Add<&'a BN254Gt> for BN254Gt {
    type Output = BN254Gt;

    #[inline]
    fn add(self, rhs: &'a BN254Gt) -> BN254Gt {
        BN254Gt(self.0 * rhs.0)
    }
}

impl<'a> Sub<&'a BN254Gt> for BN254Gt {
    type Output = BN254Gt;

    #[inline]
    fn sub(self, rhs: &'a BN254Gt) -> BN254Gt {
        self.add(&rhs.neg())
    }
}

impl<'a> Mul<&'a BN254Scalar> for BN254Gt {
    type Output = BN254Gt;

    fn mul(self, rhs: &'a BN254Scalar) -> BN254Gt {
        BN254Gt(self.0.pow(rhs.0.into_bigint()))
    }
}

impl<'a> AddAssign<&'a BN254Gt> for BN254Gt {
    #[inline]
    fn add_assign(&mut self, rhs: &'a BN254Gt) {
        self.0 *= rhs.0;
    }
}

impl<'a> SubAssign<&'a BN254Gt> for BN254Gt {
    #[inline]
    fn sub_assign(&mut self, rhs: &'a BN254Gt) {
        *self = self.sub(rhs);
    }
}

impl Group for BN254Gt {
    type ScalarType = BN254Scalar;

    const ENCODED_LEN: usize = 384;

    #[inline]
    fn identity() -> Self {
        BN254Gt(Fq12::ONE)
    }

    fn generator() -> Self {
        BN254PairingEngine::pairing(&BN254G1::generator(), &BN254G2::generator())
    }

    #[inline]
    fn double(&self) -> Self {
        BN254Gt(self.0.square())
    }

    fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self::generator().mul(&BN254Scalar::random(rng))
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::ENCODED_LEN);
        let _ = self.0.serialize_with_mode(&mut buf, Compress::Yes);
        buf
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::ENCODED_LEN {
            return Err(AlgebraError::DeserializationError);
        }
        let v = Fq12::deserialize_with_mode(bytes, Compress::Yes, Validate::Yes)
            .map_err(|_| AlgebraError::InvalidPoint)?;
        // only the order-r subgroup is a pairing target
        if v.pow(Fr::MODULUS) != Fq12::ONE {
            return Err(AlgebraError::InvalidPoint);
        }
        Ok(BN254Gt(v))
    }

    fn multi_exp(scalars: &[&BN254Scalar], points: &[&Self]) -> Self {
        scalars
            .iter()
            .zip(points.iter())
            .fold(Self::identity(), |acc, (s, p)| acc.add(&(**p).mul(*s)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decoding_rejects_elements_outside_the_subgroup() {
        let g = BN254Gt::generator();
        assert_eq!(BN254Gt::from_bytes(&g.to_bytes()).unwrap(), g);

        for outside in [Fq12::from(2u64), Fq12::ZERO] {
            let mut bytes = vec![];
            outside.serialize_with_mode(&mut bytes, Compress::Yes).unwrap();
            assert_eq!(bytes.len(), BN254Gt::ENCODED_LEN);
            assert_eq!(BN254Gt::from_bytes(&bytes), Err(AlgebraError::InvalidPoint));
        }
    }
}
