use crate::prelude::*;
use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, FftField, PrimeField};
use num_bigint::BigUint;

/// An element of the BN254 scalar field `Fr`.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BN254Scalar(pub(crate) Fr);

impl Zeroize for BN254Scalar {
    fn zeroize(&mut self) {
        self.0 = Fr::from(0u64);
    }
}

macro_rules! ref_binop {
    ($tr:ident, $method:ident, $op:tt) => {
        impl<'a> $tr<&'a BN254Scalar> for BN254Scalar {
            type Output = BN254Scalar;

            #[inline]
            fn $method(self, rhs: &'a BN254Scalar) -> BN254Scalar {
                BN254Scalar(self.0 $op rhs.0)
            }
        }
    };
}

macro_rules! assign_op {
    ($tr:ident, $method:ident, $op:tt) => {
        impl<'a> $tr<&'a BN254Scalar> for BN254Scalar {
            #[inline]
            fn $method(&mut self, rhs: &'a BN254Scalar) {
                self.0 $op rhs.0;
            }
        }
    };
}

ref_binop!(Add, add, +);
ref_binop!(Sub, sub, -);
ref_binop!(Mul, mul, *);
assign_op!(AddAssign, add_assign, +=);
assign_op!(SubAssign, sub_assign, -=);
assign_op!(MulAssign, mul_assign, *=);

impl Add for BN254Scalar {
    type Output = BN254Scalar;

    #[inline]
    fn add(self, rhs: BN254Scalar) -> BN254Scalar {
        BN254Scalar(self.0 + rhs.0)
    }
}

impl Mul for BN254Scalar {
    type Output = BN254Scalar;

    #[inline]
    fn mul(self, rhs: BN254Scalar) -> BN254Scalar {
        BN254Scalar(self.0 * rhs.0)
    }
}

impl Neg for BN254Scalar {
    type Output = BN254Scalar;

    #[inline]
    fn neg(self) -> BN254Scalar {
        BN254Scalar(-self.0)
    }
}

impl Sum for BN254Scalar {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        BN254Scalar(iter.map(|v| v.0).sum())
    }
}

impl<'a> Sum<&'a BN254Scalar> for BN254Scalar {
    fn sum<I: Iterator<Item = &'a BN254Scalar>>(iter: I) -> Self {
        BN254Scalar(iter.map(|v| v.0).sum())
    }
}

impl Zero for BN254Scalar {
    #[inline]
    fn zero() -> Self {
        BN254Scalar(Fr::from(0u64))
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == Fr::from(0u64)
    }
}

impl One for BN254Scalar {
    #[inline]
    fn one() -> Self {
        BN254Scalar(Fr::from(1u64))
    }
}

impl From<u32> for BN254Scalar {
    fn from(v: u32) -> Self {
        BN254Scalar(Fr::from(v))
    }
}

impl From<u64> for BN254Scalar {
    fn from(v: u64) -> Self {
        BN254Scalar(Fr::from(v))
    }
}

/// Reduces modulo `p`.
impl<'a> From<&'a BigUint> for BN254Scalar {
    fn from(v: &'a BigUint) -> Self {
        BN254Scalar(Fr::from_le_bytes_mod_order(&v.to_bytes_le()))
    }
}

impl From<BN254Scalar> for BigUint {
    fn from(v: BN254Scalar) -> Self {
        v.0.into_bigint().into()
    }
}

impl Scalar for BN254Scalar {
    const BYTES: usize = 32;

    fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        BN254Scalar(Fr::rand(rng))
    }

    fn multiplicative_generator() -> Self {
        BN254Scalar(Fr::GENERATOR)
    }

    fn modulus() -> BigUint {
        Fr::MODULUS.into()
    }

    fn half_modulus() -> BigUint {
        Fr::MODULUS_MINUS_ONE_DIV_TWO.into()
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.0.into_bigint().to_bytes_le()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::BYTES {
            return Err(AlgebraError::DeserializationError);
        }
        let value = BigUint::from_bytes_le(bytes);
        if value >= Self::modulus() {
            return Err(AlgebraError::NonCanonicalScalar);
        }
        Ok(Self::from(&value))
    }

    /// Inverts as `self^(r-2)`: the square-and-multiply sequence depends
    /// only on the public modulus, not on `self`. Only zero is rejected
    /// early.
    fn inv(&self) -> Result<Self> {
        if self.0.is_zero() {
            return Err(AlgebraError::ArithmeticError);
        }
        let mut exponent = Fr::MODULUS;
        let _ = exponent.sub_with_borrow(&2u64.into());
        Ok(BN254Scalar(self.0.pow(exponent)))
    }

    fn pow(&self, exponent: &[u64]) -> Self {
        BN254Scalar(self.0.pow(exponent))
    }
}

impl FftScalar for BN254Scalar {
    type Repr = Fr;

    #[inline]
    fn to_ark(&self) -> Fr {
        self.0
    }

    #[inline]
    fn from_ark(value: Fr) -> Self {
        BN254Scalar(value)
    }
}

impl BN254Scalar {
    /// The two-adicity of `p - 1`: radix-2 domains hold at most `2^28` points.
    pub const TWO_ADICITY: u32 = <Fr as FftField>::TWO_ADICITY;
}
