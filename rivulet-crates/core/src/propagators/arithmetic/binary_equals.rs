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

/// The [`PropagatorConstructor`] for the [`BinaryEqualsPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct BinaryEqualsPropagatorArgs<AVar, BVar> {
    pub(crate) a: AVar,
    pub(crate) b: BVar,
}

impl<AVar, BVar> PropagatorConstructor for BinaryEqualsPropagatorArgs<AVar, BVar>
where
    AVar: IntegerVariable + 'static,
    BVar: IntegerVariable + 'static,
{
    type PropagatorImpl = BinaryEqualsPropagator<AVar, BVar>;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let BinaryEqualsPropagatorArgs { a, b } = self;

        let a = context.register(a, DomainEvents::ANY_INT, LocalId::from(0));
        let b = context.register(b, DomainEvents::ANY_INT, LocalId::from(1));

        BinaryEqualsPropagator { a, b }
    }
}

/// Propagator for `a = b`, keeping both domains equal to their intersection.
#[derive(Clone, Debug)]
pub(crate) struct BinaryEqualsPropagator<AVar, BVar> {
    a: AVar,
    b: BVar,
}

impl<AVar, BVar> Propagator for BinaryEqualsPropagator<AVar, BVar>
where
    AVar: IntegerVariable + 'static,
    BVar: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "BinaryEq"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&self, mut context: PropagationContextMut) -> PropagationStatusCP {
        context.set_lower_bound(&self.a, context.lower_bound(&self.b))?;
        context.set_upper_bound(&self.a, context.upper_bound(&self.b))?;
        context.set_lower_bound(&self.b, context.lower_bound(&self.a))?;
        context.set_upper_bound(&self.b, context.upper_bound(&self.a))?;

        let only_in_a = context
            .iterate_domain(&self.a)
            .filter(|&value| !context.contains(&self.b, value))
            .collect::<Vec<_>>();
        for value in only_in_a {
            context.remove(&self.a, value)?;
        }

        let only_in_b = context
            .iterate_domain(&self.b)
            .filter(|&value| !context.contains(&self.a, value))
            .collect::<Vec<_>>();
        for value in only_in_b {
            context.remove(&self.b, value)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_space::TestSpace;
    use crate::engine::variables::TransformableVariable;
    use crate::predicate;

    #[test]
    fn bounds_and_holes_are_shared() {
        let mut space = TestSpace::default();
        let a = space.new_sparse_variable([1, 3, 5, 7]);
        let b = space.new_variable(2, 6);

        let _ = space
            .new_propagator(BinaryEqualsPropagatorArgs { a, b })
            .expect("no conflict");

        assert_eq!(vec![3, 5], space.domain(a));
        assert_eq!(vec![3, 5], space.domain(b));
    }

    #[test]
    fn disjoint_domains_conflict() {
        let mut space = TestSpace::default();
        let a = space.new_variable(0, 3);
        let b = space.new_variable(4, 8);

        let _ = space
            .new_propagator(BinaryEqualsPropagatorArgs { a, b })
            .expect_err("disjoint domains");
    }

    #[test]
    fn views_are_inverted() {
        let mut space = TestSpace::default();
        let a = space.new_variable(0, 10);
        let b = space.new_variable(0, 10);

        // 2a = b
        let _ = space
            .new_propagator(BinaryEqualsPropagatorArgs { a: a.scaled(2), b })
            .expect("no conflict");

        space.assert_bounds(a, 0, 5);
        assert_eq!(vec![0, 2, 4, 6, 8, 10], space.domain(b));

        assert!(space.decide(predicate!(b >= 3)).is_ok());
        space.assert_bounds(a, 2, 5);
    }
}
