//! Strategies for splitting the domain of the selected variable into alternatives.
mod enumerate;
mod in_domain_max;
mod in_domain_min;
mod in_domain_split;

pub use enumerate::*;
pub use in_domain_max::*;
pub use in_domain_min::*;
pub use in_domain_split::*;

use super::SelectionContext;
use crate::engine::predicates::Predicate;

/// Partitions the domain of an unfixed variable into an ordered list of alternatives.
///
/// The alternatives must be mutually exclusive and together cover the domain, so that search
/// explores every value exactly once.
pub trait ValueSelector<Var> {
    fn select_value(&mut self, context: &mut SelectionContext, decision_variable: Var) -> Vec<Predicate>;
}

impl<Var> ValueSelector<Var> for Box<dyn ValueSelector<Var> + Send> {
    fn select_value(&mut self, context: &mut SelectionContext, decision_variable: Var) -> Vec<Predicate> {
        self.as_mut().select_value(context, decision_variable)
    }
}
