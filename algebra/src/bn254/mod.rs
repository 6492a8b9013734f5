mod curves;
mod gt;
mod pairing;
mod scalar;

pub use curves::{BN254G1, BN254G2};
pub use gt::BN254Gt;
pub use pairing::BN254PairingEngine;
pub use scalar::BN254Scalar;

#[cfg(test)]
mod test {
    use super::*;
    use crate::curve::group_laws;
    use crate::field::scalar_laws;
    use crate::prelude::*;
    use num_bigint::BigUint;

    #[test]
    fn scalar_field() {
        scalar_laws::check_field_laws::<BN254Scalar>();
        scalar_laws::check_pow_and_signed::<BN254Scalar>();
        scalar_laws::check_encoding::<BN254Scalar>();
    }

    #[test]
    fn scalar_bytes_are_little_endian() {
        let v = BN254Scalar::from(0x0102_0304u32);
        let mut expected = vec![4u8, 3, 2, 1];
        expected.resize(32, 0);
        assert_eq!(v.to_bytes(), expected);

        let p_minus_one = (BN254Scalar::modulus() - 1u32).to_bytes_le();
        assert_eq!(
            BN254Scalar::from_bytes(&p_minus_one).unwrap(),
            BN254Scalar::one().neg()
        );
    }

    #[test]
    fn scalar_modulus() {
        let r = BigUint::parse_bytes(
            b"21888242871839275222246405745257275088548364400416034343698204186575808495617",
            10,
        )
        .unwrap();
        assert_eq!(BN254Scalar::modulus(), r);
        assert_eq!(BN254Scalar::half_modulus(), (r - 1u32) >> 1);
        assert_eq!(BN254Scalar::TWO_ADICITY, 28);
    }

    #[test]
    fn fermat_inverse_agrees_with_the_field() {
        use ark_ff::Field;
        let mut rng = test_rng();
        for _ in 0..16 {
            let a = BN254Scalar::random(&mut rng);
            assert_eq!(a.inv().unwrap().0, a.0.inverse().unwrap());
        }
        assert_eq!(BN254Scalar::one().inv().unwrap(), BN254Scalar::one());
        assert_eq!(BN254Scalar::zero().inv(), Err(AlgebraError::ArithmeticError));
    }

    #[test]
    fn groups() {
        group_laws::check_group_laws::<BN254G1>();
        group_laws::check_group_laws::<BN254G2>();
        group_laws::check_group_laws::<BN254Gt>();
        group_laws::check_multi_exp::<BN254G1>();
        group_laws::check_multi_exp::<BN254G2>();
        group_laws::check_encoding::<BN254G1>();
        group_laws::check_encoding::<BN254G2>();
        group_laws::check_encoding::<BN254Gt>();
    }

    #[test]
    fn points_off_the_curve_are_rejected() {
        // both flag bits set, and x is larger than q
        assert!(BN254G1::from_bytes(&[0xffu8; 32]).is_err());
        assert!(BN254G1::from_bytes(&[0u8; 31]).is_err());
        assert!(BN254G2::from_bytes(&[0xffu8; 64]).is_err());
    }

    #[test]
    fn pairing_is_bilinear() {
        let mut rng = test_rng();
        let a = BN254Scalar::random(&mut rng);
        let b = BN254Scalar::random(&mut rng);
        let g = BN254G1::generator();
        let h = BN254G2::generator();

        let e = BN254PairingEngine::pairing(&g.mul(&a), &h.mul(&b));
        assert_eq!(e, BN254Gt::generator().mul(&(a * b)));
        assert_eq!(e, BN254PairingEngine::pairing(&g, &h.mul(&(a * b))));
        assert_eq!(
            BN254PairingEngine::pairing(&BN254G1::identity(), &h),
            BN254Gt::identity()
        );
    }

    #[test]
    fn multi_pairing_sums_pairings() {
        let mut rng = test_rng();
        let a = BN254Scalar::random(&mut rng);
        let b = BN254Scalar::random(&mut rng);
        let g = BN254G1::generator();
        let h = BN254G2::generator();

        // e(aG, H) + e(-G, aH) = 0
        let cancel = BN254PairingEngine::multi_pairing(&[g.mul(&a), g.neg()], &[h, h.mul(&a)]);
        assert_eq!(cancel, BN254Gt::identity());

        let sum = BN254PairingEngine::multi_pairing(&[g.mul(&a), g.mul(&b)], &[h, h]);
        assert_eq!(sum, BN254Gt::generator().mul(&(a + b)));
    }

    #[test]
    fn affine_coordinates() {
        let (x, y) = BN254G1::identity().to_affine_coordinates();
        assert_eq!((x, y), (BigUint::from(0u32), BigUint::from(0u32)));

        let (x, y) = BN254G1::generator().to_affine_coordinates();
        assert_eq!((x, y), (BigUint::from(1u32), BigUint::from(2u32)));

        let (x, _) = BN254G2::generator().to_affine_coordinates();
        assert!(x[0] > BigUint::from(0u32) && x[1] > BigUint::from(0u32));
    }
}
