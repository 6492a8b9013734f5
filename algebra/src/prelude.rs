pub use crate::curve::{Group, Pairing};
pub use crate::errors::AlgebraError;
pub use crate::field::{FftScalar, Scalar};
pub use crate::rand_helper::test_rng;
pub use crate::serialization::BytesVisitor;
pub use crate::utils::{parse_signed_decimal, scalar_to_signed, signed_to_scalar};
pub use ark_std::{
    fmt,
    iter::Sum,
    ops::*,
    rand::{CryptoRng, Rng, RngCore, SeedableRng},
    string::{String, ToString},
    vec,
    vec::Vec,
    One, UniformRand, Zero,
};
pub use zeroize::Zeroize;

pub(crate) type Result<T> = core::result::Result<T, AlgebraError>;
