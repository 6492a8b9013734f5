//! The scalar field circuits are written over.
use crate::prelude::*;
use ark_ff::FftField;
use ark_std::fmt::Debug;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// An element of a prime field of odd characteristic `p`.
///
/// Signed integers embed as `v mod p`; values above `(p-1)/2` are read
/// back as negative (see [`crate::utils::scalar_to_signed`]).
pub trait Scalar:
    Copy
    + Default
    + Debug
    + Eq
    + Serialize
    + for<'de> Deserialize<'de>
    + Into<BigUint>
    + for<'a> From<&'a BigUint>
    + From<u32>
    + From<u64>
    + One
    + Zero
    + Zeroize
    + Neg<Output = Self>
    + Add<Self, Output = Self>
    + Mul<Self, Output = Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + for<'a> Mul<&'a Self, Output = Self>
    + for<'a> AddAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + Sum<Self>
    + for<'a> Sum<&'a Self>
    + Send
    + Sync
{
    /// Length of the canonical encoding.
    const BYTES: usize;

    /// Sample a uniform element.
    fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self;

    /// A generator of the multiplicative group. It is never in a radix-2
    /// evaluation domain, so it can shift one into a coset.
    fn multiplicative_generator() -> Self;

    /// The characteristic `p`.
    fn modulus() -> BigUint;

    /// `(p - 1) / 2`, the largest magnitude of a signed value.
    fn half_modulus() -> BigUint {
        (Self::modulus() - 1u32) >> 1
    }

    /// Canonical little-endian encoding of `BYTES` bytes.
    fn to_bytes(&self) -> Vec<u8>;

    /// Decode the canonical encoding, rejecting anything else.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;

    /// The multiplicative inverse, or `ArithmeticError` for zero.
    fn inv(&self) -> Result<Self>;

    /// Raise to a power given as little-endian `u64` limbs.
    fn pow(&self, exponent: &[u64]) -> Self {
        let mut result = Self::one();
        for limb in exponent.iter().rev() {
            for i in (0..64).rev() {
                result = result * result;
                if (limb >> i) & 1 == 1 {
                    result.mul_assign(self);
                }
            }
        }
        result
    }

    /// Embed a signed integer.
    fn from_i64(value: i64) -> Self {
        let magnitude = Self::from(value.unsigned_abs());
        if value < 0 {
            magnitude.neg()
        } else {
            magnitude
        }
    }
}

/// A scalar backed by an arkworks field with a large power-of-two root of
/// unity, so that polynomial arithmetic can run over radix-2 domains.
pub trait FftScalar: Scalar {
    /// The arkworks field.
    type Repr: FftField;

    /// Convert into the arkworks field.
    fn to_ark(&self) -> Self::Repr;

    /// Convert from the arkworks field.
    fn from_ark(value: Self::Repr) -> Self;
}
