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

/// The [`PropagatorConstructor`] for the [`LinearLessOrEqualPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct LinearLessOrEqualPropagatorArgs<Var> {
    pub(crate) x: Box<[Var]>,
    pub(crate) c: i32,
}

impl<Var> PropagatorConstructor for LinearLessOrEqualPropagatorArgs<Var>
where
    Var: IntegerVariable + 'static,
{
    type PropagatorImpl = LinearLessOrEqualPropagator<Var>;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let LinearLessOrEqualPropagatorArgs { x, c } = self;

        let x = x
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(i, x_i)| context.register(x_i, DomainEvents::LOWER_BOUND, LocalId::from(i as u32)))
            .collect();

        LinearLessOrEqualPropagator { x, c }
    }
}

/// Propagator for the constraint `\sum x_i <= c`.
///
/// Only upper bounds are narrowed, which cannot raise any lower bound, so a single pass reaches
/// the fixpoint of the propagator.
#[derive(Clone, Debug)]
pub(crate) struct LinearLessOrEqualPropagator<Var> {
    x: Box<[Var]>,
    c: i32,
}

impl<Var> Propagator for LinearLessOrEqualPropagator<Var>
where
    Var: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "LinearLeq"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&self, mut context: PropagationContextMut) -> PropagationStatusCP {
        let lower_bound_left_hand_side = self
            .x
            .iter()
            .map(|x_i| i64::from(context.lower_bound(x_i)))
            .sum::<i64>();

        if lower_bound_left_hand_side > i64::from(self.c) {
            return Err(context.conflict());
        }

        for x_i in self.x.iter() {
            let bound = i64::from(self.c) - (lower_bound_left_hand_side - i64::from(context.lower_bound(x_i)));

            // Bounds outside of the i32 range cannot prune anything.
            if let Ok(bound) = i32::try_from(bound) {
                context.set_upper_bound(x_i, bound)?;
            }
        }

        Ok(())
    }
}
