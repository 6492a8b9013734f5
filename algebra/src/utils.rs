use crate::prelude::*;
use num_bigint::BigUint;

/// Parse an optionally negative decimal integer into `(negative, magnitude)`.
/// Surrounding whitespace is ignored; a leading `+`, exponents and
/// fractions are not accepted.
pub fn parse_signed_decimal(s: &str) -> Result<(bool, BigUint)> {
    let s = s.trim();
    let (negative, digits) = s.strip_prefix('-').map_or((false, s), |rest| (true, rest));
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AlgebraError::DeserializationError);
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
        .map(|magnitude| (negative, magnitude))
        .ok_or(AlgebraError::DeserializationError)
}

/// Map `(negative, magnitude)` to `±magnitude mod p`. Only magnitudes up to
/// `(p - 1) / 2` are accepted, which keeps the map injective.
pub fn signed_to_scalar<S: Scalar>(negative: bool, magnitude: &BigUint) -> Result<S> {
    if *magnitude > S::half_modulus() {
        return Err(AlgebraError::OutOfRange);
    }
    let v = S::from(magnitude);
    Ok(if negative { v.neg() } else { v })
}

/// The inverse of [`signed_to_scalar`]: representatives above `(p - 1) / 2`
/// are negative.
pub fn scalar_to_signed<S: Scalar>(v: &S) -> (bool, BigUint) {
    let value: BigUint = (*v).into();
    if value > S::half_modulus() {
        (true, S::modulus() - value)
    } else {
        (false, value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bn254::BN254Scalar;

    type F = BN254Scalar;

    #[test]
    fn decimal_syntax() {
        assert_eq!(parse_signed_decimal("-42"), Ok((true, BigUint::from(42u32))));
        assert_eq!(parse_signed_decimal(" 7\n"), Ok((false, BigUint::from(7u32))));
        assert_eq!(parse_signed_decimal("-0"), Ok((true, BigUint::from(0u32))));
        for bad in ["", "-", "+5", "1.5", "1e3", "0x10", "--1", "1 000"] {
            assert_eq!(parse_signed_decimal(bad), Err(AlgebraError::DeserializationError), "{}", bad);
        }
    }

    #[test]
    fn signed_values_survive_the_field() {
        for v in [i64::MIN, -1000, -1, 0, 1, 12, 1 << 40, i64::MAX] {
            let (negative, magnitude) = scalar_to_signed(&F::from_i64(v));
            assert_eq!(negative, v < 0);
            assert_eq!(magnitude, BigUint::from(v.unsigned_abs()));
        }
    }

    #[test]
    fn the_signed_range_is_half_the_field() {
        let half = F::half_modulus();
        let top: F = signed_to_scalar(false, &half).unwrap();
        let bottom: F = signed_to_scalar(true, &half).unwrap();
        assert_eq!(top + bottom, F::zero());
        assert_eq!(scalar_to_signed(&bottom), (true, half.clone()));
        assert_eq!(
            signed_to_scalar::<F>(true, &(half + 1u32)),
            Err(AlgebraError::OutOfRange)
        );
    }
}
