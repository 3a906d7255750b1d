//! A constraint space wrapper for propagator unit tests.
use super::predicates::Predicate;
use super::propagation::PropagatorConstructor;
use super::propagation::PropagatorId;
use super::variables::DomainId;
use super::variables::IntegerVariable;
use super::ConstraintSpace;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::PropagationStatusCP;

#[derive(Debug, Default)]
pub(crate) struct TestSpace {
    pub(crate) space: ConstraintSpace,
}

impl TestSpace {
    pub(crate) fn new_variable(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.space.new_bounded_integer(lower_bound, upper_bound)
    }

    pub(crate) fn new_sparse_variable(&mut self, values: impl IntoIterator<Item = i32>) -> DomainId {
        self.space.new_sparse_integer(values)
    }

    pub(crate) fn new_propagator<Constructor: PropagatorConstructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorId, ConstraintOperationError> {
        self.space.add_propagator(constructor)
    }

    /// Narrow a domain under a fresh checkpoint and propagate.
    pub(crate) fn decide(&mut self, predicate: Predicate) -> PropagationStatusCP {
        self.space.new_checkpoint();
        self.space.apply_decision(predicate)?;
        self.space.propagate()
    }

    pub(crate) fn lower_bound(&self, var: impl IntegerVariable) -> i32 {
        self.space.lower_bound(&var)
    }

    pub(crate) fn upper_bound(&self, var: impl IntegerVariable) -> i32 {
        self.space.upper_bound(&var)
    }

    pub(crate) fn contains(&self, var: impl IntegerVariable, value: i32) -> bool {
        self.space.contains(&var, value)
    }

    pub(crate) fn domain(&self, var: impl IntegerVariable) -> Vec<i32> {
        var.iterate_domain(self.space.assignments()).collect()
    }

    pub(crate) fn assert_bounds(&self, var: impl IntegerVariable, lower_bound: i32, upper_bound: i32) {
        let actual_lb = self.lower_bound(var.clone());
        let actual_ub = self.upper_bound(var.clone());

        assert_eq!(
            (lower_bound, upper_bound),
            (actual_lb, actual_ub),
            "The expected bounds [{lower_bound}..{upper_bound}] did not match the actual bounds [{actual_lb}..{actual_ub}]"
        );
    }
}
