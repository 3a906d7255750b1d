use crate::basic_types::PropagationStatusCP;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::IntegerVariable;
use crate::engine::DomainEvents;

/// The [`PropagatorConstructor`] for the [`MaximumPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct MaximumArgs<ElementVar, Rhs> {
    pub(crate) array: Box<[ElementVar]>,
    pub(crate) rhs: Rhs,
}

impl<ElementVar, Rhs> PropagatorConstructor for MaximumArgs<ElementVar, Rhs>
where
    ElementVar: IntegerVariable + 'static,
    Rhs: IntegerVariable + 'static,
{
    type PropagatorImpl = MaximumPropagator<ElementVar, Rhs>;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let MaximumArgs { array, rhs } = self;

        let array = array
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(i, element)| {
                context.register(element, DomainEvents::BOUNDS, LocalId::from(i as u32))
            })
            .collect::<Box<[_]>>();
        let rhs = context.register(rhs, DomainEvents::BOUNDS, LocalId::from(array.len() as u32));

        MaximumPropagator { array, rhs }
    }
}

/// Bounds propagator for `max(array) = rhs`.
#[derive(Clone, Debug)]
pub(crate) struct MaximumPropagator<ElementVar, Rhs> {
    array: Box<[ElementVar]>,
    rhs: Rhs,
}

impl<ElementVar, Rhs> MaximumPropagator<ElementVar, Rhs>
where
    ElementVar: IntegerVariable,
    Rhs: IntegerVariable,
{
    fn propagate_once(&self, context: &mut PropagationContextMut) -> PropagationStatusCP {
        let max_lower_bound = self
            .array
            .iter()
            .map(|element| context.lower_bound(element))
            .max()
            .unwrap_or(i32::MIN);
        let max_upper_bound = self
            .array
            .iter()
            .map(|element| context.upper_bound(element))
            .max()
            .unwrap_or(i32::MIN);

        context.set_lower_bound(&self.rhs, max_lower_bound)?;
        context.set_upper_bound(&self.rhs, max_upper_bound)?;

        let rhs_upper_bound = context.upper_bound(&self.rhs);
        for element in self.array.iter() {
            context.set_upper_bound(element, rhs_upper_bound)?;
        }

        // When a single element can still reach the lower bound of rhs, it has to be the maximum.
        let rhs_lower_bound = context.lower_bound(&self.rhs);
        let mut supports = self
            .array
            .iter()
            .filter(|element| context.upper_bound(*element) >= rhs_lower_bound);
        match (supports.next(), supports.next()) {
            (None, _) => Err(context.conflict()),
            (Some(support), None) => {
                let support = support.clone();
                context.set_lower_bound(&support, rhs_lower_bound)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl<ElementVar, Rhs> Propagator for MaximumPropagator<ElementVar, Rhs>
where
    ElementVar: IntegerVariable + 'static,
    Rhs: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "Maximum"
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
