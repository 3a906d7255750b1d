use crate::basic_types::PropagationStatusCP;
use crate::containers::HashSet;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::Priority;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::IntegerVariable;
use crate::engine::DomainEvents;

/// The [`PropagatorConstructor`] for the [`AllDifferentPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct AllDifferentPropagatorArgs<Var> {
    pub(crate) vars: Box<[Var]>,
}

impl<Var> PropagatorConstructor for AllDifferentPropagatorArgs<Var>
where
    Var: IntegerVariable + 'static,
{
    type PropagatorImpl = AllDifferentPropagator<Var>;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let AllDifferentPropagatorArgs { vars } = self;

        let vars = vars
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(i, x_i)| context.register(x_i, DomainEvents::ANY_INT, LocalId::from(i as u32)))
            .collect();

        AllDifferentPropagator { vars }
    }
}

/// Propagator for pairwise distinct variables.
///
/// The value of every fixed variable is removed from all other variables until no new variable
/// becomes fixed. Afterwards the unfixed variables are checked against the number of values they
/// can still take together.
#[derive(Clone, Debug)]
pub(crate) struct AllDifferentPropagator<Var> {
    vars: Box<[Var]>,
}

impl<Var> Propagator for AllDifferentPropagator<Var>
where
    Var: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "AllDiff"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&self, mut context: PropagationContextMut) -> PropagationStatusCP {
        let mut processed = vec![false; self.vars.len()];

        loop {
            let newly_fixed = self
                .vars
                .iter()
                .enumerate()
                .filter(|&(i, _)| !processed[i])
                .filter_map(|(i, x_i)| context.fixed_value(x_i).map(|value| (i, value)))
                .collect::<Vec<_>>();
            if newly_fixed.is_empty() {
                break;
            }

            for (i, value) in newly_fixed {
                processed[i] = true;
                for (j, x_j) in self.vars.iter().enumerate() {
                    if i != j {
                        context.remove(x_j, value)?;
                    }
                }
            }
        }

        let unfixed = self
            .vars
            .iter()
            .filter(|x_i| !context.is_fixed(*x_i))
            .collect::<Vec<_>>();
        let available_values = unfixed
            .iter()
            .flat_map(|x_i| context.iterate_domain(*x_i))
            .collect::<HashSet<i32>>();
        if available_values.len() < unfixed.len() {
            return Err(context.conflict());
        }

        Ok(())
    }
}
