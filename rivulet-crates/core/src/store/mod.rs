//! The variable store: single-assignment dataflow variables and their suspension lists.
mod value;
mod variable;
mod variable_store;

pub use value::*;
#[cfg(test)]
pub(crate) use variable::Suspension;
pub(crate) use variable::Waiter;
pub use variable::Determination;
pub use variable::VariableRef;
pub use variable::VariableStatus;
pub use variable_store::*;
