use crate::branching::ValueSelectionStrategy;
use crate::branching::VariableSelectionStrategy;

/// How a [`SearchTask`](super::SearchTask) distributes when it has no brancher of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    pub variable_selection: VariableSelectionStrategy,
    pub value_selection: ValueSelectionStrategy,
    /// Seed for the random generator handed to the selectors.
    pub random_seed: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            variable_selection: VariableSelectionStrategy::InputOrder,
            value_selection: ValueSelectionStrategy::InDomainMin,
            random_seed: 42,
        }
    }
}
