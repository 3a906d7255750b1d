use log::warn;

use super::value_selection::Enumerate;
use super::value_selection::InDomainMax;
use super::value_selection::InDomainMin;
use super::value_selection::InDomainReverseSplit;
use super::value_selection::InDomainSplit;
use super::value_selection::ValueSelector;
use super::variable_selection::FirstFail;
use super::variable_selection::InputOrder;
use super::variable_selection::Largest;
use super::variable_selection::RandomSelector;
use super::variable_selection::Smallest;
use super::variable_selection::VariableSelector;
use super::SelectionContext;
use super::ValueSelectionStrategy;
use super::VariableSelectionStrategy;
use crate::engine::predicates::Predicate;
use crate::engine::variables::DomainId;
use crate::rivulet_assert_simple;

/// The alternatives a distribution strategy created for one choice point, in the order in which
/// they are to be tried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Distribution {
    pub alternatives: Vec<Predicate>,
}

/// A distribution strategy: called at a propagation fixpoint to split the search space.
pub trait Brancher: Send {
    /// The next distribution, or `None` when every variable the brancher knows of is fixed.
    fn next_distribution(&mut self, context: &mut SelectionContext) -> Option<Distribution>;
}

/// A [`Brancher`] which first picks a variable and then splits its domain, each through its own
/// selector.
#[derive(Debug)]
pub struct IndependentVariableValueBrancher<Var, VariableSelect, ValueSelect> {
    variable_selector: VariableSelect,
    value_selector: ValueSelect,
    variable_type: std::marker::PhantomData<Var>,
}

impl<Var, VariableSelect, ValueSelect> IndependentVariableValueBrancher<Var, VariableSelect, ValueSelect>
where
    VariableSelect: VariableSelector<Var>,
    ValueSelect: ValueSelector<Var>,
{
    pub fn new(variable_selector: VariableSelect, value_selector: ValueSelect) -> Self {
        IndependentVariableValueBrancher {
            variable_selector,
            value_selector,
            variable_type: std::marker::PhantomData,
        }
    }
}

/// The brancher built from a pair of strategies.
pub type DefaultBrancher = IndependentVariableValueBrancher<
    DomainId,
    Box<dyn VariableSelector<DomainId> + Send>,
    Box<dyn ValueSelector<DomainId> + Send>,
>;

impl DefaultBrancher {
    /// A brancher over `variables` using the given strategies.
    pub fn from_strategies(
        variables: &[DomainId],
        variable_selection: VariableSelectionStrategy,
        value_selection: ValueSelectionStrategy,
    ) -> DefaultBrancher {
        if variables.is_empty() {
            warn!("A brancher was created without variables; every search will stop at the root");
        }

        let variable_selector: Box<dyn VariableSelector<DomainId> + Send> = match variable_selection {
            VariableSelectionStrategy::InputOrder => Box::new(InputOrder::new(variables)),
            VariableSelectionStrategy::FirstFail => Box::new(FirstFail::new(variables)),
            VariableSelectionStrategy::Smallest => Box::new(Smallest::new(variables)),
            VariableSelectionStrategy::Largest => Box::new(Largest::new(variables)),
            VariableSelectionStrategy::Random => Box::new(RandomSelector::new(variables)),
        };
        let value_selector: Box<dyn ValueSelector<DomainId> + Send> = match value_selection {
            ValueSelectionStrategy::InDomainMin => Box::new(InDomainMin),
            ValueSelectionStrategy::InDomainMax => Box::new(InDomainMax),
            ValueSelectionStrategy::InDomainSplit => Box::new(InDomainSplit),
            ValueSelectionStrategy::InDomainReverseSplit => Box::new(InDomainReverseSplit),
            ValueSelectionStrategy::Enumerate => Box::new(Enumerate),
        };

        IndependentVariableValueBrancher::new(variable_selector, value_selector)
    }
}

impl<Var, VariableSelect, ValueSelect> Brancher
    for IndependentVariableValueBrancher<Var, VariableSelect, ValueSelect>
where
    Var: Send,
    VariableSelect: VariableSelector<Var> + Send,
    ValueSelect: ValueSelector<Var> + Send,
{
    fn next_distribution(&mut self, context: &mut SelectionContext) -> Option<Distribution> {
        let variable = self.variable_selector.select_variable(context)?;
        let alternatives = self.value_selector.select_value(context, variable);
        rivulet_assert_simple!(
            !alternatives.is_empty(),
            "a value selector returned no alternatives"
        );

        Some(Distribution { alternatives })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::random::tests::TestRandom;
    use crate::branching::selection_context::tests::assignments_for_testing;
    use crate::predicate;

    #[test]
    fn the_first_fail_variable_is_split() {
        let (assignments, variables) = assignments_for_testing(&[(0, 10), (2, 3), (7, 7)]);
        let mut test_rng = TestRandom::default();
        let mut context = SelectionContext::new(&assignments, &mut test_rng);

        let mut brancher = DefaultBrancher::from_strategies(
            &variables,
            VariableSelectionStrategy::FirstFail,
            ValueSelectionStrategy::InDomainMax,
        );
        let x = variables[1];

        assert_eq!(
            Some(Distribution {
                alternatives: vec![predicate!(x >= 3), predicate!(x <= 2)]
            }),
            brancher.next_distribution(&mut context)
        );
    }

    #[test]
    fn no_distribution_once_everything_is_fixed() {
        let (assignments, variables) = assignments_for_testing(&[(4, 4)]);
        let mut test_rng = TestRandom::default();
        let mut context = SelectionContext::new(&assignments, &mut test_rng);

        let mut brancher = DefaultBrancher::from_strategies(
            &variables,
            VariableSelectionStrategy::InputOrder,
            ValueSelectionStrategy::InDomainMin,
        );

        assert_eq!(None, brancher.next_distribution(&mut context));
    }
}
