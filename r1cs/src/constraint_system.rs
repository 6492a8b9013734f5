//! The mutable constraint system a graph is lowered into. Variables are
//! allocated in the layout `w = [1, public..., private...]`: the public
//! slots are fixed up front and private variables are appended as gates
//! are inserted. Every allocated variable gets a witness hint describing
//! how the witness generator computes it.
use crate::circuit::{Circuit, CircuitInterface, Constraint};
use crate::errors::Result;
use crate::lc::{LinearCombination, VarIndex, ONE};
use crate::witness::{Hint, WitnessPlan};
use zkinfer_algebra::prelude::*;

/// R1CS under construction.
#[derive(Debug)]
pub struct ConstraintSystem<F: Scalar> {
    num_public: usize,
    num_vars: usize,
    constraints: Vec<Constraint<F>>,
    hints: Vec<Hint<F>>,
}

impl<F: Scalar> ConstraintSystem<F> {
    /// Create a system with `num_public` public slots after the constant one.
    pub fn new(num_public: usize) -> Self {
        Self {
            num_public,
            num_vars: 1 + num_public,
            constraints: vec![],
            hints: vec![],
        }
    }

    /// Return the variable of the `slot`-th public value.
    pub fn public_variable(&self, slot: usize) -> VarIndex {
        debug_assert!(slot < self.num_public);
        1 + slot
    }

    /// Allocate a fresh private variable.
    pub fn new_variable(&mut self) -> VarIndex {
        self.num_vars += 1;
        self.num_vars - 1
    }

    /// Return the number of variables, including the constant one.
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Return the number of constraints so far.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Add the constraint `a * b = c`.
    pub fn enforce(
        &mut self,
        a: LinearCombination<F>,
        b: LinearCombination<F>,
        c: LinearCombination<F>,
    ) {
        self.constraints.push(Constraint { a, b, c });
    }

    /// Record how the witness generator computes a variable.
    pub fn push_hint(&mut self, hint: Hint<F>) {
        self.hints.push(hint);
    }

    /// Insert the gate `a * b = out` for a fresh `out` and return `out`.
    pub fn insert_mul_gate(
        &mut self,
        a: LinearCombination<F>,
        b: LinearCombination<F>,
    ) -> VarIndex {
        let out = self.new_variable();
        self.push_hint(Hint::Product {
            var: out,
            a: a.clone(),
            b: b.clone(),
            scale: F::one(),
            plus: LinearCombination::zero(),
        });
        self.enforce(a, b, LinearCombination::variable(out));
        out
    }

    /// Materialise a linear combination: insert `lc * 1 = out` for a fresh
    /// `out` and return `out`.
    pub fn insert_linear_gate(&mut self, lc: LinearCombination<F>) -> VarIndex {
        let out = self.new_variable();
        self.push_hint(Hint::Lc {
            var: out,
            lc: lc.clone(),
        });
        self.enforce(
            lc,
            LinearCombination::variable(ONE),
            LinearCombination::variable(out),
        );
        out
    }

    /// Add the Boolean constraint `b * (b - 1) = 0`.
    pub fn insert_boolean_gate(&mut self, var: VarIndex) {
        let b = LinearCombination::variable(var);
        let b_minus_one = b.add_term(ONE, F::one().neg());
        self.enforce(b, b_minus_one, LinearCombination::zero());
    }

    /// Seal the system into a circuit and the plan that fills its witness.
    pub fn finish(self, interface: CircuitInterface) -> Result<(Circuit<F>, WitnessPlan<F>)> {
        let num_private = self.num_vars - 1 - self.num_public;
        let circuit = Circuit::new(self.num_public, num_private, self.constraints, interface)?;
        let plan = WitnessPlan::new(self.hints, self.num_vars);
        Ok((circuit, plan))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use zkinfer_algebra::bn254::BN254Scalar;

    type F = BN254Scalar;

    #[test]
    fn variables_follow_the_public_prefix() {
        let mut cs = ConstraintSystem::<F>::new(2);
        assert_eq!(cs.public_variable(0), 1);
        assert_eq!(cs.public_variable(1), 2);
        assert_eq!(cs.new_variable(), 3);
        assert_eq!(cs.new_variable(), 4);
        assert_eq!(cs.num_vars(), 5);
    }

    #[test]
    fn boolean_gate_accepts_only_bits() {
        let mut cs = ConstraintSystem::<F>::new(0);
        let b = cs.new_variable();
        cs.insert_boolean_gate(b);
        let c = &cs.constraints[0];
        for (v, ok) in [(0i64, true), (1, true), (2, false), (-1, false)] {
            let w = vec![F::one(), F::from_i64(v)];
            assert_eq!(c.is_satisfied(&w).unwrap(), ok);
        }
    }

    #[test]
    fn finish_counts_private_variables() {
        let mut cs = ConstraintSystem::<F>::new(1);
        let x = cs.new_variable();
        let y = cs.insert_mul_gate(LinearCombination::variable(x), LinearCombination::variable(x));
        let out = cs.public_variable(0);
        cs.enforce(
            LinearCombination::variable(y),
            LinearCombination::variable(ONE),
            LinearCombination::variable(out),
        );
        let interface = CircuitInterface {
            public: vec!["y".to_string()],
            ..Default::default()
        };
        let (circuit, plan) = cs.finish(interface).unwrap();
        assert_eq!(circuit.num_public(), 1);
        assert_eq!(circuit.num_private(), 2);
        assert_eq!(circuit.num_constraints(), 2);
        assert_eq!(plan.num_vars(), 4);
    }
}
