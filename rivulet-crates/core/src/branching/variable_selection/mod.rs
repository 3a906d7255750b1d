//! Strategies for choosing the variable to branch on.
mod first_fail;
mod input_order;
mod largest;
mod random;
mod smallest;

pub use first_fail::*;
pub use input_order::*;
pub use largest::*;
pub use random::*;
pub use smallest::*;

use super::SelectionContext;

/// Chooses the next variable to branch on, or `None` when every variable it knows of is fixed.
pub trait VariableSelector<Var> {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<Var>;
}

impl<Var> VariableSelector<Var> for Box<dyn VariableSelector<Var> + Send> {
    fn select_variable(&mut self, context: &mut SelectionContext) -> Option<Var> {
        self.as_mut().select_variable(context)
    }
}
