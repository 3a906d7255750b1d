use crate::basic_types::PropagationStatusCP;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::Priority;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::IntegerVariable;
use crate::engine::DomainEvents;

/// The [`PropagatorConstructor`] for the [`BinaryNotEqualsPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct BinaryNotEqualsPropagatorArgs<AVar, BVar> {
    pub(crate) a: AVar,
    pub(crate) b: BVar,
}

impl<AVar, BVar> PropagatorConstructor for BinaryNotEqualsPropagatorArgs<AVar, BVar>
where
    AVar: IntegerVariable + 'static,
    BVar: IntegerVariable + 'static,
{
    type PropagatorImpl = BinaryNotEqualsPropagator<AVar, BVar>;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let BinaryNotEqualsPropagatorArgs { a, b } = self;

        let a = context.register(a, DomainEvents::ASSIGN, LocalId::from(0));
        let b = context.register(b, DomainEvents::ASSIGN, LocalId::from(1));

        BinaryNotEqualsPropagator { a, b }
    }
}

/// Propagator for `a != b`: once one side is fixed its value is removed from the other.
#[derive(Clone, Debug)]
pub(crate) struct BinaryNotEqualsPropagator<AVar, BVar> {
    a: AVar,
    b: BVar,
}

impl<AVar, BVar> Propagator for BinaryNotEqualsPropagator<AVar, BVar>
where
    AVar: IntegerVariable + 'static,
    BVar: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "BinaryNotEq"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&self, mut context: PropagationContextMut) -> PropagationStatusCP {
        if let Some(value) = context.fixed_value(&self.a) {
            context.remove(&self.b, value)?;
        }
        if let Some(value) = context.fixed_value(&self.b) {
            context.remove(&self.a, value)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_space::TestSpace;
    use crate::predicate;

    #[test]
    fn detects_conflict() {
        let mut space = TestSpace::default();
        let a = space.new_variable(0, 0);
        let b = space.new_variable(0, 0);

        let _ = space
            .new_propagator(BinaryNotEqualsPropagatorArgs { a, b })
            .expect_err("Expected conflict to be detected");
    }

    #[test]
    fn propagate_when_one_is_fixed() {
        let mut space = TestSpace::default();
        let a = space.new_variable(0, 0);
        let b = space.new_variable(0, 1);

        let _ = space
            .new_propagator(BinaryNotEqualsPropagatorArgs { a, b })
            .expect("Expected no conflict to be detected");

        space.assert_bounds(b, 1, 1);
    }

    #[test]
    fn nothing_happens_until_a_side_is_fixed() {
        let mut space = TestSpace::default();
        let a = space.new_variable(1, 3);
        let b = space.new_variable(1, 3);

        let _ = space
            .new_propagator(BinaryNotEqualsPropagatorArgs { a, b })
            .expect("Expected no conflict to be detected");
        assert_eq!(vec![1, 2, 3], space.domain(b));

        assert!(space.decide(predicate!(a == 2)).is_ok());
        assert_eq!(vec![1, 3], space.domain(b));
    }
}
