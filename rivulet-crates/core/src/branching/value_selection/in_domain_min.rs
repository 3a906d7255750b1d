use super::ValueSelector;
use crate::branching::SelectionContext;
use crate::engine::predicates::Predicate;
use crate::engine::variables::IntegerVariable;
use crate::predicate;

/// A [`ValueSelector`] which first tries the lower bound, then the rest of the domain.
#[derive(Debug, Copy, Clone)]
pub struct InDomainMin;

impl<Var: IntegerVariable> ValueSelector<Var> for InDomainMin {
    fn select_value(&mut self, context: &mut SelectionContext, decision_variable: Var) -> Vec<Predicate> {
        let lower_bound = context.lower_bound(&decision_variable);
        vec![
            predicate!(decision_variable <= lower_bound),
            predicate!(decision_variable >= lower_bound + 1),
        ]
    }
}
