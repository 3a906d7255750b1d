use log::warn;

use super::VariableSelector;
use crate::branching::SelectionContext;
use crate::engine::variables::IntegerVariable;

/// A [`VariableSelector`] which selects an unfixed variable uniformly at random.
#[derive(Debug)]
pub struct RandomSelector<Var> {
    variables: Vec<Var>,
}

impl<Var: Clone> RandomSelector<Var> {
    pub fn new(variables: &[Var]) -> Self {
        if variables.is_empty() {
            warn!("The Random variable selector was not provided with any variables");
        }
        RandomSelector {
            variables: variables.to_vec(),
        }
    }
}

impl<Var: IntegerVariable> VariableSelector<Var> for RandomSelector<Var> {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<Var> {
        let unfixed = self
            .variables
            .iter()
            .filter(|variable| !context.is_integer_fixed(*variable))
            .collect::<Vec<_>>();
        if unfixed.is_empty() {
            return None;
        }

        let index = context.random().generate_usize_in_range(0..unfixed.len());
        Some(unfixed[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::random::tests::TestRandom;
    use crate::branching::selection_context::tests::assignments_for_testing;

    #[test]
    fn only_unfixed_variables_are_candidates() {
        let (assignments, variables) = assignments_for_testing(&[(0, 1), (2, 2), (0, 5)]);
        let mut test_rng = TestRandom {
            usizes: vec![1],
            bools: vec![],
        };
        let mut context = SelectionContext::new(&assignments, &mut test_rng);

        let mut strategy = RandomSelector::new(&variables);

        assert_eq!(Some(variables[2]), strategy.select_variable(&mut context));
    }
}
