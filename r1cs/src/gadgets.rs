use crate::constraint_system::ConstraintSystem;
use crate::errors::Result;
use crate::lc::{LinearCombination, VarIndex, ONE};
use crate::witness::Hint;
use zkinfer_algebra::{prelude::*, BigUint};

/// Return `2^exp` as a field element.
pub fn power_of_two<F: Scalar>(exp: u32) -> F {
    F::from(2u32).pow(&[exp as u64])
}

/// Embed an `i128` into the field, failing if it leaves the signed range.
pub fn i128_to_scalar<F: Scalar>(value: i128) -> Result<F> {
    let magnitude = BigUint::from(value.unsigned_abs());
    Ok(signed_to_scalar(value < 0, &magnitude)?)
}

/// Constrain `value` to lie in `[-2^(bits-1), 2^(bits-1))` and return the
/// variables holding the bits of `value + 2^(bits-1)`, least significant first.
///
/// Costs `bits` boolean constraints `b * (b - 1) = 0` plus one recomposition
/// constraint. The last bit is one exactly when `value >= 0`.
pub fn signed_range_check<F: Scalar>(
    cs: &mut ConstraintSystem<F>,
    value: &LinearCombination<F>,
    bits: u32,
) -> Vec<VarIndex> {
    let offset = power_of_two::<F>(bits - 1);
    let vars: Vec<VarIndex> = (0..bits).map(|_| cs.new_variable()).collect();
    cs.push_hint(Hint::Bits {
        first: vars[0],
        count: bits,
        value: value.clone(),
        offset,
    });
    for var in vars.iter() {
        cs.insert_boolean_gate(*var);
    }
    let mut recomposed = LinearCombination::zero();
    let mut coeff = F::one();
    for var in vars.iter() {
        recomposed = recomposed.add_term(*var, coeff);
        coeff = coeff.add(&coeff);
    }
    cs.enforce(
        recomposed,
        LinearCombination::variable(ONE),
        value.add_term(ONE, offset),
    );
    vars
}

/// Decompose `value + 2^(bits-1)` into `bits` little-endian bits, or return
/// `None` if `value` is outside the signed range.
pub fn decompose_signed<F: Scalar>(value: &F, offset: &F, bits: u32) -> Option<Vec<bool>> {
    let shifted: BigUint = value.add(offset).into();
    if shifted.bits() > bits as u64 {
        return None;
    }
    Some((0..bits as u64).map(|i| shifted.bit(i)).collect())
}

/// Return `max(v, 0)` for a signed field value.
pub fn relu_value<F: Scalar>(v: &F) -> F {
    let (negative, _) = scalar_to_signed(v);
    if negative {
        F::zero()
    } else {
        *v
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use zkinfer_algebra::bn254::BN254Scalar;

    type F = BN254Scalar;

    #[test]
    fn decomposition_covers_the_signed_range() {
        let offset = power_of_two::<F>(3);
        // -8 ..= 7 fit in 4 signed bits
        for v in -8i64..=7 {
            let bits = decompose_signed(&F::from_i64(v), &offset, 4).unwrap();
            assert_eq!(bits.len(), 4);
            assert_eq!(bits[3], v >= 0);
            let u: i64 = bits
                .iter()
                .enumerate()
                .map(|(i, b)| (*b as i64) << i)
                .sum();
            assert_eq!(u, v + 8);
        }
        assert!(decompose_signed(&F::from_i64(8), &offset, 4).is_none());
        assert!(decompose_signed(&F::from_i64(-9), &offset, 4).is_none());
    }

    #[test]
    fn range_check_constraint_count() {
        let mut cs = ConstraintSystem::<F>::new(0);
        let x = cs.new_variable();
        let bits = signed_range_check(&mut cs, &LinearCombination::variable(x), 8);
        assert_eq!(bits.len(), 8);
        assert_eq!(cs.num_constraints(), 9);
    }

    #[test]
    fn i128_embedding() {
        assert_eq!(i128_to_scalar::<F>(-3).unwrap(), F::from_i64(-3));
        assert_eq!(
            i128_to_scalar::<F>(i64::MAX as i128 * 4).unwrap(),
            F::from(i64::MAX as u64).mul(&F::from(4u32))
        );
    }

    #[test]
    fn relu_of_signed_values() {
        assert_eq!(relu_value(&F::from_i64(-5)), F::zero());
        assert_eq!(relu_value(&F::from_i64(5)), F::from(5u32));
        assert_eq!(relu_value(&F::zero()), F::zero());
    }
}
