use crate::errors::{R1csError, Result};
use zkinfer_algebra::prelude::*;

/// Index of a variable in the witness vector.
pub type VarIndex = usize;

/// The witness slot that always holds the constant one.
pub const ONE: VarIndex = 0;

/// A sparse linear combination `sum(coeff_i * w[var_i])`.
///
/// Terms are kept sorted by variable index with no zero coefficients, so two
/// combinations are equal exactly when they denote the same linear form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct LinearCombination<F: Scalar> {
    terms: Vec<(VarIndex, F)>,
}

impl<F: Scalar> LinearCombination<F> {
    /// The empty combination.
    pub fn zero() -> Self {
        Self { terms: vec![] }
    }

    /// A single variable with coefficient one.
    pub fn variable(var: VarIndex) -> Self {
        Self {
            terms: vec![(var, F::one())],
        }
    }

    /// The constant `value`, expressed over the `ONE` slot.
    pub fn constant(value: F) -> Self {
        Self::from_terms(vec![(ONE, value)])
    }

    /// Build a combination from arbitrary terms, merging repeated variables.
    pub fn from_terms<I: IntoIterator<Item = (VarIndex, F)>>(terms: I) -> Self {
        let mut terms: Vec<(VarIndex, F)> = terms.into_iter().collect();
        terms.sort_by_key(|(var, _)| *var);
        let mut merged: Vec<(VarIndex, F)> = Vec::with_capacity(terms.len());
        for (var, coeff) in terms {
            match merged.last_mut() {
                Some((last, acc)) if *last == var => acc.add_assign(&coeff),
                _ => merged.push((var, coeff)),
            }
        }
        merged.retain(|(_, c)| !c.is_zero());
        Self { terms: merged }
    }

    /// Borrow the normalized terms.
    pub fn terms(&self) -> &[(VarIndex, F)] {
        &self.terms
    }

    /// Return true if the combination has no terms.
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Return the value if the combination only involves the `ONE` slot.
    pub fn as_constant(&self) -> Option<F> {
        match self.terms.as_slice() {
            [] => Some(F::zero()),
            [(ONE, c)] => Some(*c),
            _ => None,
        }
    }

    /// Return `self + other`.
    pub fn add(&self, other: &Self) -> Self {
        Self::from_terms(self.terms.iter().chain(other.terms.iter()).copied())
    }

    /// Return `self - other`.
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.scale(&F::one().neg()))
    }

    /// Return `k * self`.
    pub fn scale(&self, k: &F) -> Self {
        if k.is_zero() {
            return Self::zero();
        }
        Self {
            terms: self.terms.iter().map(|(v, c)| (*v, c.mul(k))).collect(),
        }
    }

    /// Return `self + k * w[var]`.
    pub fn add_term(&self, var: VarIndex, k: F) -> Self {
        self.add(&Self::from_terms(vec![(var, k)]))
    }

    /// Return the largest variable index referenced, if any.
    pub fn max_variable(&self) -> Option<VarIndex> {
        self.terms.last().map(|(v, _)| *v)
    }

    /// Evaluate over a fully assigned witness.
    pub fn evaluate(&self, witness: &[F]) -> Result<F> {
        let mut acc = F::zero();
        for (var, coeff) in self.terms.iter() {
            let value = witness.get(*var).ok_or_else(|| {
                R1csError::WitnessInconsistency(format!("variable {} out of range", var))
            })?;
            acc.add_assign(&value.mul(coeff));
        }
        Ok(acc)
    }

    /// Evaluate over a partially assigned witness, failing on unassigned variables.
    pub fn evaluate_assigned(&self, witness: &[Option<F>]) -> Result<F> {
        let mut acc = F::zero();
        for (var, coeff) in self.terms.iter() {
            let value = witness.get(*var).copied().flatten().ok_or_else(|| {
                R1csError::WitnessInconsistency(format!("variable {} read before assignment", var))
            })?;
            acc.add_assign(&value.mul(coeff));
        }
        Ok(acc)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use zkinfer_algebra::bn254::BN254Scalar;

    type LC = LinearCombination<BN254Scalar>;

    fn s(v: i64) -> BN254Scalar {
        BN254Scalar::from_i64(v)
    }

    #[test]
    fn terms_are_merged_and_sorted() {
        let lc = LC::from_terms(vec![(3, s(2)), (1, s(5)), (3, s(-2)), (1, s(1))]);
        assert_eq!(lc.terms(), &[(1, s(6))]);

        let lc = LC::from_terms(vec![(2, s(1)), (0, s(4))]);
        assert_eq!(lc.terms(), &[(0, s(4)), (2, s(1))]);
        assert_eq!(lc.max_variable(), Some(2));
    }

    #[test]
    fn constants_are_recognised() {
        assert_eq!(LC::zero().as_constant(), Some(s(0)));
        assert_eq!(LC::constant(s(7)).as_constant(), Some(s(7)));
        assert_eq!(LC::variable(1).as_constant(), None);
        assert!(LC::constant(s(0)).is_zero());
    }

    #[test]
    fn arithmetic_cancels() {
        let a = LC::variable(1).add_term(ONE, s(3));
        let b = a.scale(&s(2));
        let diff = b.sub(&a).sub(&a);
        assert!(diff.is_zero());
        assert!(a.scale(&s(0)).is_zero());
    }

    #[test]
    fn evaluation() {
        let witness = vec![s(1), s(3), s(4)];
        let lc = LC::from_terms(vec![(ONE, s(10)), (1, s(2)), (2, s(-1))]);
        assert_eq!(lc.evaluate(&witness).unwrap(), s(12));

        let partial = vec![Some(s(1)), None, Some(s(4))];
        assert!(matches!(
            lc.evaluate_assigned(&partial),
            Err(R1csError::WitnessInconsistency(_))
        ));
        assert!(LC::variable(9).evaluate(&witness).is_err());
    }
}
