use super::Constraint;
use crate::engine::variables::IntegerVariable;
use crate::propagators::MemberOfArgs;
use crate::propagators::NotEqualConstantArgs;

/// Creates the [`Constraint`] `x != k`.
pub fn not_equals_constant<Var: IntegerVariable + 'static>(x: Var, k: i32) -> impl Constraint {
    NotEqualConstantArgs { x, k }
}

/// Creates the [`Constraint`] `x \in values`.
pub fn member_of<Var: IntegerVariable + 'static>(
    x: Var,
    values: impl Into<Box<[i32]>>,
) -> impl Constraint {
    MemberOfArgs {
        x,
        values: values.into(),
    }
}
