use log::warn;

use super::VariableSelector;
use crate::branching::tie_breaking::Direction;
use crate::branching::tie_breaking::InOrderTieBreaker;
use crate::branching::SelectionContext;
use crate::engine::variables::IntegerVariable;

/// A [`VariableSelector`] which selects the unfixed variable with the smallest domain, the first
/// one in the list on ties.
#[derive(Debug)]
pub struct FirstFail<Var> {
    variables: Vec<Var>,
}

impl<Var: Clone> FirstFail<Var> {
    pub fn new(variables: &[Var]) -> Self {
        if variables.is_empty() {
            warn!("The FirstFail variable selector was not provided with any variables");
        }
        FirstFail {
            variables: variables.to_vec(),
        }
    }
}

impl<Var: IntegerVariable> VariableSelector<Var> for FirstFail<Var> {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<Var> {
        let mut tie_breaker = InOrderTieBreaker::new(Direction::Minimum);
        self.variables
            .iter()
            .filter(|variable| !context.is_integer_fixed(*variable))
            .for_each(|variable| {
                tie_breaker.consider(variable.clone(), context.get_size_of_domain(variable))
            });
        tie_breaker.select()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::random::tests::TestRandom;
    use crate::branching::selection_context::tests::assignments_for_testing;

    #[test]
    fn the_smallest_domain_is_selected() {
        let (assignments, variables) = assignments_for_testing(&[(0, 10), (5, 7), (1, 3), (4, 4)]);
        let mut test_rng = TestRandom::default();
        let mut context = SelectionContext::new(&assignments, &mut test_rng);

        let mut strategy = FirstFail::new(&variables);

        assert_eq!(Some(variables[1]), strategy.select_variable(&mut context));
    }
}
