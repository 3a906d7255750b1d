//! Distribution strategies: how search splits the space once propagation reaches a fixpoint.
//!
//! A [`Brancher`] creates a [`Distribution`], the ordered alternatives of one choice point. The
//! provided brancher combines a [`variable_selection::VariableSelector`], which picks the variable
//! to branch on, with a [`value_selection::ValueSelector`], which splits its domain. Both are
//! deterministic given the domains, apart from the explicitly random selector, which draws from a
//! seeded generator.
mod brancher;
mod selection_context;
pub mod tie_breaking;
pub mod value_selection;
pub mod variable_selection;

use std::fmt::Display;
use std::fmt::Formatter;

pub use brancher::*;
pub use selection_context::SelectionContext;

/// The variable selection strategies a search can be configured with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum VariableSelectionStrategy {
    /// The first unfixed variable in the order they were given.
    #[default]
    InputOrder,
    /// The unfixed variable with the smallest domain.
    FirstFail,
    /// The unfixed variable with the smallest lower bound.
    Smallest,
    /// The unfixed variable with the largest upper bound.
    Largest,
    /// An unfixed variable chosen uniformly at random.
    Random,
}

impl Display for VariableSelectionStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableSelectionStrategy::InputOrder => write!(f, "input-order"),
            VariableSelectionStrategy::FirstFail => write!(f, "first-fail"),
            VariableSelectionStrategy::Smallest => write!(f, "smallest"),
            VariableSelectionStrategy::Largest => write!(f, "largest"),
            VariableSelectionStrategy::Random => write!(f, "random"),
        }
    }
}

/// The value selection strategies a search can be configured with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ValueSelectionStrategy {
    /// The lower bound first, then the rest of the domain.
    #[default]
    InDomainMin,
    /// The upper bound first, then the rest of the domain.
    InDomainMax,
    /// The lower half of the domain first.
    InDomainSplit,
    /// The upper half of the domain first.
    InDomainReverseSplit,
    /// Every value in increasing order.
    Enumerate,
}

impl Display for ValueSelectionStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSelectionStrategy::InDomainMin => write!(f, "in-domain-min"),
            ValueSelectionStrategy::InDomainMax => write!(f, "in-domain-max"),
            ValueSelectionStrategy::InDomainSplit => write!(f, "in-domain-split"),
            ValueSelectionStrategy::InDomainReverseSplit => write!(f, "in-domain-reverse-split"),
            ValueSelectionStrategy::Enumerate => write!(f, "enumerate"),
        }
    }
}
