use log::warn;

use super::VariableSelector;
use crate::branching::tie_breaking::Direction;
use crate::branching::tie_breaking::InOrderTieBreaker;
use crate::branching::SelectionContext;
use crate::engine::variables::IntegerVariable;

/// A [`VariableSelector`] which selects the unfixed variable with the smallest lower bound.
#[derive(Debug)]
pub struct Smallest<Var> {
    variables: Vec<Var>,
}

impl<Var: Clone> Smallest<Var> {
    pub fn new(variables: &[Var]) -> Self {
        if variables.is_empty() {
            warn!("The Smallest variable selector was not provided with any variables");
        }
        Smallest {
            variables: variables.to_vec(),
        }
    }
}

impl<Var: IntegerVariable> VariableSelector<Var> for Smallest<Var> {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<Var> {
        let mut tie_breaker = InOrderTieBreaker::new(Direction::Minimum);
        self.variables
            .iter()
            .filter(|variable| !context.is_integer_fixed(*variable))
            .for_each(|variable| tie_breaker.consider(variable.clone(), context.lower_bound(variable)));
        tie_breaker.select()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::random::tests::TestRandom;
    use crate::branching::selection_context::tests::assignments_for_testing;

    #[test]
    fn the_smallest_lower_bound_is_selected() {
        let (assignments, variables) = assignments_for_testing(&[(3, 10), (-2, -2), (1, 3), (1, 9)]);
        let mut test_rng = TestRandom::default();
        let mut context = SelectionContext::new(&assignments, &mut test_rng);

        let mut strategy = Smallest::new(&variables);

        assert_eq!(Some(variables[2]), strategy.select_variable(&mut context));
    }
}
