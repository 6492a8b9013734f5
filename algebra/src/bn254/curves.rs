use crate::bn254::BN254Scalar;
use crate::prelude::*;
use ark_bn254::{G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{AffineRepr, CurveGroup, Group as ArkGroup, VariableBaseMSM};
use ark_ff::{BigInteger, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};
use num_bigint::BigUint;

macro_rules! bn254_curve {
    ($name:ident, $proj:ty, $affine:ty, $len:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
        pub struct $name(pub(crate) $proj);

        impl Neg for $name {
            type Output = $name;

            #[inline]
            fn neg(self) -> $name {
                $name(-self.0)
            }
        }

        impl<'a> Add<&'a $name> for $name {
            type Output = $name;

            #[inline]
            fn add(self, rhs: &'a $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl<'a> Sub<&'a $name> for $name {
            type Output = $name;

            #[inline]
            fn sub(self, rhs: &'a $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl<'a> Mul<&'a BN254Scalar> for $name {
            type Output = $name;

            #[inline]
            fn mul(self, rhs: &'a BN254Scalar) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl<'a> AddAssign<&'a $name> for $name {
            #[inline]
            fn add_assign(&mut self, rhs: &'a $name) {
                self.0 += rhs.0;
            }
        }

        impl<'a> SubAssign<&'a $name> for $name {
            #[inline]
            fn sub_assign(&mut self, rhs: &'a $name) {
                self.0 -= rhs.0;
            }
        }

        impl Group for $name {
            type ScalarType = BN254Scalar;

            const ENCODED_LEN: usize = $len;

            #[inline]
            fn identity() -> Self {
                $name(<$proj>::default())
            }

            #[inline]
            fn generator() -> Self {
                $name(<$proj as ArkGroup>::generator())
            }

            #[inline]
            fn double(&self) -> Self {
                $name(ArkGroup::double(&self.0))
            }

            fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
                $name(<$proj>::rand(rng))
            }

            fn to_bytes(&self) -> Vec<u8> {
                let mut buf = Vec::with_capacity($len);
                // writing into a Vec cannot fail
                let _ = self
                    .0
                    .into_affine()
                    .serialize_with_mode(&mut buf, Compress::Yes);
                buf
            }

            fn from_bytes(bytes: &[u8]) -> Result<Self> {
                if bytes.len() != $len {
                    return Err(AlgebraError::DeserializationError);
                }
                let point = <$affine>::deserialize_with_mode(bytes, Compress::Yes, Validate::Yes)
                    .map_err(|_| AlgebraError::InvalidPoint)?;
                Ok($name(point.into_group()))
            }

            fn multi_exp(scalars: &[&BN254Scalar], points: &[&Self]) -> Self {
                let n = scalars.len().min(points.len());
                let bases: Vec<$affine> = <$proj>::normalize_batch(
                    &points[..n].iter().map(|p| p.0).collect::<Vec<_>>(),
                );
                let exps: Vec<_> = scalars[..n].iter().map(|s| s.0.into_bigint()).collect();
                $name(<$proj as VariableBaseMSM>::msm_bigint(&bases, &exps))
            }
        }
    };
}

bn254_curve!(
    BN254G1,
    G1Projective,
    G1Affine,
    32,
    "A point of the BN254 group `G1` over `Fq`."
);
bn254_curve!(
    BN254G2,
    G2Projective,
    G2Affine,
    64,
    "A point of the BN254 group `G2` over `Fq2`."
);

fn fq_to_biguint(v: &ark_bn254::Fq) -> BigUint {
    BigUint::from_bytes_le(&v.into_bigint().to_bytes_le())
}

impl BN254G1 {
    /// Affine `(x, y)`; the identity maps to `(0, 0)`, the convention of
    /// EVM pairing precompiles.
    pub fn to_affine_coordinates(&self) -> (BigUint, BigUint) {
        match self.0.into_affine().xy() {
            Some((x, y)) => (fq_to_biguint(x), fq_to_biguint(y)),
            None => (BigUint::from(0u32), BigUint::from(0u32)),
        }
    }
}

impl BN254G2 {
    /// Affine `(x, y)` with each coordinate as `[c0, c1]`; the identity maps
    /// to all zeroes.
    pub fn to_affine_coordinates(&self) -> ([BigUint; 2], [BigUint; 2]) {
        let zero = || [BigUint::from(0u32), BigUint::from(0u32)];
        match self.0.into_affine().xy() {
            Some((x, y)) => (
                [fq_to_biguint(&x.c0), fq_to_biguint(&x.c1)],
                [fq_to_biguint(&y.c0), fq_to_biguint(&y.c1)],
            ),
            None => (zero(), zero()),
        }
    }
}
