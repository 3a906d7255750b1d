use crate::basic_types::PropagationStatusCP;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::IntegerVariable;
use crate::engine::DomainEvents;

/// The [`PropagatorConstructor`] for the [`ElementPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct ElementArgs<VX, VI, VE> {
    pub(crate) array: Box<[VX]>,
    pub(crate) index: VI,
    pub(crate) rhs: VE,
}

const ID_INDEX: LocalId = LocalId::from(0);
const ID_RHS: LocalId = LocalId::from(1);
const ID_X_OFFSET: u32 = 2;

impl<VX, VI, VE> PropagatorConstructor for ElementArgs<VX, VI, VE>
where
    VX: IntegerVariable + 'static,
    VI: IntegerVariable + 'static,
    VE: IntegerVariable + 'static,
{
    type PropagatorImpl = ElementPropagator<VX, VI, VE>;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let ElementArgs { array, index, rhs } = self;

        let array = array
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(i, x_i)| {
                context.register(
                    x_i,
                    DomainEvents::BOUNDS,
                    LocalId::from(i as u32 + ID_X_OFFSET),
                )
            })
            .collect();
        let index = context.register(index, DomainEvents::ANY_INT, ID_INDEX);
        let rhs = context.register(rhs, DomainEvents::BOUNDS, ID_RHS);

        ElementPropagator { array, index, rhs }
    }
}

/// Propagator for `array[index] = rhs`, with `index` starting at 0.
///
/// Removes indices whose element cannot equal `rhs`, bounds `rhs` by the elements which are
/// still possible, and equates the bounds of the selected element and `rhs` once `index` is
/// fixed.
#[derive(Clone, Debug)]
pub(crate) struct ElementPropagator<VX, VI, VE> {
    array: Box<[VX]>,
    index: VI,
    rhs: VE,
}

impl<VX, VI, VE> ElementPropagator<VX, VI, VE>
where
    VX: IntegerVariable,
    VI: IntegerVariable,
    VE: IntegerVariable,
{
    fn propagate_once(&self, context: &mut PropagationContextMut) -> PropagationStatusCP {
        context.set_lower_bound(&self.index, 0)?;
        context.set_upper_bound(&self.index, self.array.len() as i32 - 1)?;

        let rhs_lower_bound = context.lower_bound(&self.rhs);
        let rhs_upper_bound = context.upper_bound(&self.rhs);

        let unsupported = context
            .iterate_domain(&self.index)
            .filter(|&i| {
                let x_i = &self.array[i as usize];
                context.upper_bound(x_i) < rhs_lower_bound
                    || context.lower_bound(x_i) > rhs_upper_bound
            })
            .collect::<Vec<_>>();
        for i in unsupported {
            context.remove(&self.index, i)?;
        }

        let (min, max) = context
            .iterate_domain(&self.index)
            .map(|i| {
                let x_i = &self.array[i as usize];
                (context.lower_bound(x_i), context.upper_bound(x_i))
            })
            .fold((i32::MAX, i32::MIN), |(min, max), (lower, upper)| {
                (min.min(lower), max.max(upper))
            });
        context.set_lower_bound(&self.rhs, min)?;
        context.set_upper_bound(&self.rhs, max)?;

        if let Some(i) = context.fixed_value(&self.index) {
            let x_i = &self.array[i as usize];
            context.set_lower_bound(x_i, context.lower_bound(&self.rhs))?;
            context.set_upper_bound(x_i, context.upper_bound(&self.rhs))?;
            context.set_lower_bound(&self.rhs, context.lower_bound(x_i))?;
            context.set_upper_bound(&self.rhs, context.upper_bound(x_i))?;
        }

        Ok(())
    }
}

impl<VX, VI, VE> Propagator for ElementPropagator<VX, VI, VE>
where
    VX: IntegerVariable + 'static,
    VI: IntegerVariable + 'static,
    VE: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "Element"
    }

    fn propagate(&self, mut context: PropagationContextMut) -> PropagationStatusCP {
        loop {
            let updates_before = context.num_updates();
            self.propagate_once(&mut context)?;
            if context.num_updates() == updates_before {
                return Ok(());
            }
        }
    }
}
