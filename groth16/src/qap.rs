//! Reduction of an R1CS instance to a quadratic arithmetic program.
//!
//! Row `j < m` of the QAP carries constraint `j`. Rows `m..=m+l` carry the
//! extra constraints `w_i * 0 = 0` for the constant and public slots, which
//! keep the `u_i` of the instance variables linearly independent. The
//! polynomials are interpolated over a radix-2 domain of size
//! `next_pow2(m + l + 1)`.
use crate::errors::Result;
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};
use zkinfer_algebra::prelude::*;
use zkinfer_r1cs::Circuit;

/// The interpolation domain of a circuit.
pub(crate) type QapDomain<F> = Radix2EvaluationDomain<<F as FftScalar>::Repr>;

/// Return the number of QAP rows of a circuit.
pub(crate) fn num_rows<F: Scalar>(circuit: &Circuit<F>) -> usize {
    circuit.num_constraints() + circuit.num_public() + 1
}

/// Return the domain the circuit is interpolated over, or `None` when the
/// circuit exceeds the two-adicity of the field.
pub(crate) fn evaluation_domain<F: FftScalar>(circuit: &Circuit<F>) -> Option<QapDomain<F>> {
    Radix2EvaluationDomain::new(num_rows(circuit))
}

/// Given the Lagrange basis evaluated at a point, evaluate every `u_i`, `v_i`
/// and `w_i` at that point.
pub(crate) fn evaluate_at<F: FftScalar>(
    circuit: &Circuit<F>,
    lagrange: &[F],
) -> (Vec<F>, Vec<F>, Vec<F>) {
    let num_vars = circuit.num_variables();
    let m = circuit.num_constraints();
    let mut u = vec![F::zero(); num_vars];
    let mut v = vec![F::zero(); num_vars];
    let mut w = vec![F::zero(); num_vars];
    for (row, cs) in circuit.constraints().iter().enumerate() {
        let l = &lagrange[row];
        for (var, coeff) in cs.a.terms() {
            u[*var].add_assign(&coeff.mul(l));
        }
        for (var, coeff) in cs.b.terms() {
            v[*var].add_assign(&coeff.mul(l));
        }
        for (var, coeff) in cs.c.terms() {
            w[*var].add_assign(&coeff.mul(l));
        }
    }
    for (i, u_i) in u.iter_mut().enumerate().take(circuit.num_public() + 1) {
        u_i.add_assign(&lagrange[m + i]);
    }
    (u, v, w)
}

/// Multiply the `i`-th entry by `g^i`.
fn distribute_powers<F: FftScalar>(coefs: &mut [F::Repr], g: &F) {
    let mut power = F::one();
    for c in coefs.iter_mut() {
        *c = F::from_ark(*c).mul(&power).to_ark();
        power.mul_assign(g);
    }
}

/// Evaluate a row vector, given on the domain, over the coset `g * H`.
fn coset_evaluations<F: FftScalar>(domain: &QapDomain<F>, rows: Vec<F>, g: &F) -> Vec<F::Repr> {
    let mut values: Vec<F::Repr> = rows.iter().map(|x| x.to_ark()).collect();
    domain.ifft_in_place(&mut values);
    distribute_powers::<F>(&mut values, g);
    domain.fft_in_place(&mut values);
    values
}

/// Compute the coefficients of `h = (A * B - C) / Z` for a satisfying
/// witness, where `A`, `B`, `C` interpolate the row evaluations of the
/// witness and `Z` vanishes on the domain. The result has `n - 1` entries.
pub(crate) fn witness_map<F: FftScalar>(
    circuit: &Circuit<F>,
    domain: &QapDomain<F>,
    witness: &[F],
) -> Result<Vec<F>> {
    let n = domain.size();
    let m = circuit.num_constraints();
    let mut a = vec![F::zero(); n];
    let mut b = vec![F::zero(); n];
    let mut c = vec![F::zero(); n];
    for (row, cs) in circuit.constraints().iter().enumerate() {
        a[row] = cs.a.evaluate(witness)?;
        b[row] = cs.b.evaluate(witness)?;
        c[row] = cs.c.evaluate(witness)?;
    }
    for i in 0..=circuit.num_public() {
        a[m + i] = witness[i];
    }

    let g = F::multiplicative_generator();
    let a = coset_evaluations(domain, a, &g);
    let b = coset_evaluations(domain, b, &g);
    let c = coset_evaluations(domain, c, &g);

    // Z(X) = X^n - 1 is constant on the coset.
    let z_inv = g.pow(&[n as u64]).sub(&F::one()).inv()?;

    let mut h: Vec<F::Repr> = a
        .iter()
        .zip(b.iter())
        .zip(c.iter())
        .map(|((a, b), c)| {
            let ab = F::from_ark(*a).mul(&F::from_ark(*b));
            ab.sub(&F::from_ark(*c)).mul(&z_inv).to_ark()
        })
        .collect();
    domain.ifft_in_place(&mut h);
    distribute_powers::<F>(&mut h, &g.inv()?);

    let mut h: Vec<F> = h.into_iter().map(F::from_ark).collect();
    h.truncate(n - 1);
    Ok(h)
}

#[cfg(test)]
mod test {
    use super::*;
    use zkinfer_algebra::bn254::BN254Scalar;
    use zkinfer_r1cs::{compile, generate_witness, Graph, Inputs, OptimizationLevel};

    type F = BN254Scalar;

    fn product_circuit() -> zkinfer_r1cs::CompiledCircuit<F> {
        let mut g = Graph::new();
        let a = g.private_input("a");
        let b = g.private_input("b");
        let c = g.public_input("c");
        let ab = g.mul(a, b);
        g.assert_equal(ab, c);
        compile::<F>(&g, OptimizationLevel::O2).unwrap()
    }

    #[test]
    fn domain_covers_every_row() {
        let compiled = product_circuit();
        let domain = evaluation_domain(&compiled.circuit).unwrap();
        assert!(domain.size() >= num_rows(&compiled.circuit));
        assert!(domain.size().is_power_of_two());
    }

    #[test]
    fn divisibility_at_a_random_point() {
        let compiled = product_circuit();
        let circuit = &compiled.circuit;
        let inputs: Inputs = vec![("a", 3i64), ("b", 4), ("c", 12)].into_iter().collect();
        let w = generate_witness(&compiled, &inputs).unwrap();
        let domain = evaluation_domain(circuit).unwrap();
        let h = witness_map(circuit, &domain, w.values()).unwrap();
        assert_eq!(h.len(), domain.size() - 1);

        let mut prng = test_rng();
        let tau = F::random(&mut prng);
        let lagrange: Vec<F> = domain
            .evaluate_all_lagrange_coefficients(tau.to_ark())
            .into_iter()
            .map(F::from_ark)
            .collect();
        let (u, v, ww) = evaluate_at(circuit, &lagrange);
        let dot = |p: &[F]| {
            p.iter()
                .zip(w.values().iter())
                .fold(F::zero(), |acc, (x, y)| acc.add(&x.mul(y)))
        };
        let z = F::from_ark(domain.evaluate_vanishing_polynomial(tau.to_ark()));
        let h_tau = h
            .iter()
            .rev()
            .fold(F::zero(), |acc, c| acc.mul(&tau).add(c));
        assert_eq!(dot(&u).mul(&dot(&v)).sub(&dot(&ww)), h_tau.mul(&z));
    }
}
