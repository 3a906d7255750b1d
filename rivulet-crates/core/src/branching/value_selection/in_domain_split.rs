use super::ValueSelector;
use crate::branching::SelectionContext;
use crate::engine::predicates::Predicate;
use crate::engine::variables::IntegerVariable;
use crate::predicate;
use crate::rivulet_assert_advanced;

/// A [`ValueSelector`] which splits the domain in half (based on the lower-bound and upper-bound,
/// disregarding holes) and tries the lower half first.
///
/// Note that this strategy will not necessarily result in an equal split if there are holes in the
/// domain.
#[derive(Debug, Copy, Clone)]
pub struct InDomainSplit;

/// Like [`InDomainSplit`], but the upper half is tried first.
#[derive(Debug, Copy, Clone)]
pub struct InDomainReverseSplit;

fn split_point<Var: IntegerVariable>(context: &SelectionContext, decision_variable: &Var) -> i32 {
    // The variable is not fixed, so the domain spans at least two values.
    let lower_bound = context.lower_bound(decision_variable);
    let upper_bound = context.upper_bound(decision_variable);
    let bound = lower_bound + ((i64::from(upper_bound) - i64::from(lower_bound)) / 2) as i32;
    rivulet_assert_advanced!(
        bound >= lower_bound && bound < upper_bound,
        "It should hold that {lower_bound} <= {bound} < {upper_bound}"
    );
    bound
}

impl<Var: IntegerVariable> ValueSelector<Var> for InDomainSplit {
    fn select_value(&mut self, context: &mut SelectionContext, decision_variable: Var) -> Vec<Predicate> {
        let bound = split_point(context, &decision_variable);
        vec![
            predicate!(decision_variable <= bound),
            predicate!(decision_variable >= bound + 1),
        ]
    }
}

impl<Var: IntegerVariable> ValueSelector<Var> for InDomainReverseSplit {
    fn select_value(&mut self, context: &mut SelectionContext, decision_variable: Var) -> Vec<Predicate> {
        let bound = split_point(context, &decision_variable);
        vec![
            predicate!(decision_variable >= bound + 1),
            predicate!(decision_variable <= bound),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::random::tests::TestRandom;
    use crate::branching::selection_context::tests::assignments_for_testing;

    #[test]
    fn test_returns_correct_literal() {
        let (assignments, variables) = assignments_for_testing(&[(0, 10)]);
        let mut test_rng = TestRandom::default();
        let mut context = SelectionContext::new(&assignments, &mut test_rng);
        let x = variables[0];

        assert_eq!(
            vec![predicate!(x <= 5), predicate!(x >= 6)],
            InDomainSplit.select_value(&mut context, x)
        );
        assert_eq!(
            vec![predicate!(x >= 6), predicate!(x <= 5)],
            InDomainReverseSplit.select_value(&mut context, x)
        );
    }

    #[test]
    fn two_values_are_split_evenly() {
        let (assignments, variables) = assignments_for_testing(&[(-1, 0)]);
        let mut test_rng = TestRandom::default();
        let mut context = SelectionContext::new(&assignments, &mut test_rng);
        let x = variables[0];

        assert_eq!(
            vec![predicate!(x <= -1), predicate!(x >= 0)],
            InDomainSplit.select_value(&mut context, x)
        );
    }
}
