use super::ValueSelector;
use crate::branching::SelectionContext;
use crate::engine::predicates::Predicate;
use crate::engine::variables::IntegerVariable;
use crate::predicate;

/// A [`ValueSelector`] which first tries the upper bound, then the rest of the domain.
#[derive(Debug, Copy, Clone)]
pub struct InDomainMax;

impl<Var: IntegerVariable> ValueSelector<Var> for InDomainMax {
    fn select_value(&mut self, context: &mut SelectionContext, decision_variable: Var) -> Vec<Predicate> {
        let upper_bound = context.upper_bound(&decision_variable);
        vec![
            predicate!(decision_variable >= upper_bound),
            predicate!(decision_variable <= upper_bound - 1),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::random::tests::TestRandom;
    use crate::branching::selection_context::tests::assignments_for_testing;

    #[test]
    fn the_upper_bound_comes_first() {
        let (assignments, variables) = assignments_for_testing(&[(3, 10)]);
        let mut test_rng = TestRandom::default();
        let mut context = SelectionContext::new(&assignments, &mut test_rng);
        let x = variables[0];

        let alternatives = InDomainMax.select_value(&mut context, x);

        assert_eq!(vec![predicate!(x >= 10), predicate!(x <= 9)], alternatives);
    }
}
