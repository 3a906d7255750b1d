use super::ValueSelector;
use crate::branching::SelectionContext;
use crate::engine::predicates::Predicate;
use crate::engine::variables::IntegerVariable;
use crate::predicate;

/// A [`ValueSelector`] with one alternative per value in the domain, in increasing order.
#[derive(Debug, Copy, Clone)]
pub struct Enumerate;

impl<Var: IntegerVariable> ValueSelector<Var> for Enumerate {
    fn select_value(&mut self, context: &mut SelectionContext, decision_variable: Var) -> Vec<Predicate> {
        context
            .iterate_domain(&decision_variable)
            .collect::<Vec<_>>()
            .into_iter()
            .map(|value| predicate!(decision_variable == value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::random::tests::TestRandom;
    use crate::branching::selection_context::tests::assignments_for_testing;

    #[test]
    fn every_value_is_an_alternative() {
        let (assignments, variables) = assignments_for_testing(&[(1, 3)]);
        let mut test_rng = TestRandom::default();
        let mut context = SelectionContext::new(&assignments, &mut test_rng);
        let x = variables[0];

        assert_eq!(
            vec![predicate!(x == 1), predicate!(x == 2), predicate!(x == 3)],
            Enumerate.select_value(&mut context, x)
        );
    }
}
