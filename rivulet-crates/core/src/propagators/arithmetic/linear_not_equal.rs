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

/// The [`PropagatorConstructor`] for the [`LinearNotEqualPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct LinearNotEqualPropagatorArgs<Var> {
    pub(crate) terms: Box<[Var]>,
    pub(crate) rhs: i32,
}

impl<Var> PropagatorConstructor for LinearNotEqualPropagatorArgs<Var>
where
    Var: IntegerVariable + 'static,
{
    type PropagatorImpl = LinearNotEqualPropagator<Var>;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let LinearNotEqualPropagatorArgs { terms, rhs } = self;

        let terms = terms
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(i, term)| context.register(term, DomainEvents::ASSIGN, LocalId::from(i as u32)))
            .collect();

        LinearNotEqualPropagator { terms, rhs }
    }
}

/// Propagator for `\sum terms != rhs`.
///
/// Nothing can be deduced while two or more terms are unfixed. With one unfixed term left, the
/// value which would make the sum equal to `rhs` is removed from it.
#[derive(Clone, Debug)]
pub(crate) struct LinearNotEqualPropagator<Var> {
    terms: Box<[Var]>,
    rhs: i32,
}

impl<Var> Propagator for LinearNotEqualPropagator<Var>
where
    Var: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "LinearNe"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&self, mut context: PropagationContextMut) -> PropagationStatusCP {
        let mut fixed_sum = 0_i64;
        let mut unfixed = None;

        for term in self.terms.iter() {
            match context.fixed_value(term) {
                Some(value) => fixed_sum += i64::from(value),
                None if unfixed.is_none() => unfixed = Some(term),
                None => return Ok(()),
            }
        }

        let remaining = i64::from(self.rhs) - fixed_sum;
        match unfixed {
            Some(term) => {
                if let Ok(value) = i32::try_from(remaining) {
                    context.remove(term, value)?;
                }
                Ok(())
            }
            None if remaining == 0 => Err(context.conflict()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_space::TestSpace;
    use crate::predicate;

    #[test]
    fn the_last_unfixed_term_loses_the_completing_value() {
        let mut space = TestSpace::default();
        let x = space.new_variable(1, 3);
        let y = space.new_variable(1, 3);

        let _ = space
            .new_propagator(LinearNotEqualPropagatorArgs {
                terms: [x, y].into(),
                rhs: 4,
            })
            .expect("no conflict");
        assert_eq!(vec![1, 2, 3], space.domain(y));

        assert!(space.decide(predicate!(x == 1)).is_ok());
        assert_eq!(vec![1, 2], space.domain(y));
    }

    #[test]
    fn fixed_terms_summing_to_rhs_conflict() {
        let mut space = TestSpace::default();
        let x = space.new_variable(2, 2);
        let y = space.new_variable(3, 3);

        let _ = space
            .new_propagator(LinearNotEqualPropagatorArgs {
                terms: [x, y].into(),
                rhs: 5,
            })
            .expect_err("2 + 3 = 5");
    }
}
