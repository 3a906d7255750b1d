use super::greater_than_or_equals;
use super::less_than_or_equals;
use super::Constraint;
use crate::engine::variables::IntegerVariable;

/// Creates the [`Constraint`] that at least one of the 0/1 `literals` is 1.
pub fn clause<Var: IntegerVariable + 'static>(literals: impl Into<Box<[Var]>>) -> impl Constraint {
    greater_than_or_equals(literals, 1)
}

/// Creates the [`Constraint`] that not every one of the 0/1 `literals` is 1.
pub fn not_all<Var: IntegerVariable + 'static>(literals: impl Into<Box<[Var]>>) -> impl Constraint {
    let literals: Box<[Var]> = literals.into();
    let bound = literals.len() as i32 - 1;
    less_than_or_equals(literals, bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ConstraintSpace;
    use crate::predicate;

    #[test]
    fn not_all_forbids_the_last_literal() {
        let mut space = ConstraintSpace::default();
        let a = space.new_boolean();
        let b = space.new_boolean();

        not_all([a, b]).post(&mut space).unwrap();

        space.new_checkpoint();
        space.apply_decision(predicate!(a == 1)).unwrap();
        assert!(space.propagate().is_ok());
        assert_eq!(Some(0), space.fixed_value(&b));
    }

    #[test]
    fn clause_forces_the_last_literal() {
        let mut space = ConstraintSpace::default();
        let a = space.new_boolean();
        let b = space.new_boolean();

        clause([a, b]).post(&mut space).unwrap();

        space.new_checkpoint();
        space.apply_decision(predicate!(b == 0)).unwrap();
        assert!(space.propagate().is_ok());
        assert_eq!(Some(1), space.fixed_value(&a));
    }
}
