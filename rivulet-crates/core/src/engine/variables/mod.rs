//! Integer variables of a constraint space and the views built on them.
mod affine_view;
mod domain_id;
mod integer_variable;

pub use affine_view::AffineView;
pub use domain_id::DomainId;
pub use integer_variable::IntegerVariable;
pub use integer_variable::TransformableVariable;
