mod constraint_operation_error;
mod propagation_status_cp;
pub(crate) mod random;
mod runtime_error;
mod trail;

pub use constraint_operation_error::ConstraintOperationError;
pub use propagation_status_cp::*;
pub use random::Random;
pub use runtime_error::*;
pub(crate) use trail::Trail;
