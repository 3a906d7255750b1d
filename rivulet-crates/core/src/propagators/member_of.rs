use crate::basic_types::PropagationStatusCP;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::Priority;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::IntegerVariable;

/// The [`PropagatorConstructor`] for the [`MemberOfPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct MemberOfArgs<Var> {
    pub(crate) x: Var,
    pub(crate) values: Box<[i32]>,
}

impl<Var> PropagatorConstructor for MemberOfArgs<Var>
where
    Var: IntegerVariable + 'static,
{
    type PropagatorImpl = MemberOfPropagator<Var>;

    fn create(self, _context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let MemberOfArgs { x, mut values } = self;
        values.sort_unstable();

        MemberOfPropagator { x, values }
    }
}

/// Restricts `x` to a set of values.
///
/// Domains only shrink, so the restriction holds for good once it has been applied. The propagator
/// watches nothing and only runs when it is added.
#[derive(Clone, Debug)]
pub(crate) struct MemberOfPropagator<Var> {
    x: Var,
    values: Box<[i32]>,
}

impl<Var> Propagator for MemberOfPropagator<Var>
where
    Var: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "MemberOf"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&self, mut context: PropagationContextMut) -> PropagationStatusCP {
        let excluded = context
            .iterate_domain(&self.x)
            .filter(|value| self.values.binary_search(value).is_err())
            .collect::<Vec<_>>();
        for value in excluded {
            context.remove(&self.x, value)?;
        }

        Ok(())
    }
}

/// The [`PropagatorConstructor`] for the [`NotEqualConstantPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct NotEqualConstantArgs<Var> {
    pub(crate) x: Var,
    pub(crate) k: i32,
}

impl<Var> PropagatorConstructor for NotEqualConstantArgs<Var>
where
    Var: IntegerVariable + 'static,
{
    type PropagatorImpl = NotEqualConstantPropagator<Var>;

    fn create(self, _context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        NotEqualConstantPropagator {
            x: self.x,
            k: self.k,
        }
    }
}

/// Removes the constant `k` from `x`. Like [`MemberOfPropagator`], this only runs when added.
#[derive(Clone, Debug)]
pub(crate) struct NotEqualConstantPropagator<Var> {
    x: Var,
    k: i32,
}

impl<Var> Propagator for NotEqualConstantPropagator<Var>
where
    Var: IntegerVariable + 'static,
{
    fn name(&self) -> &str {
        "NotEqualConstant"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&self, mut context: PropagationContextMut) -> PropagationStatusCP {
        context.remove(&self.x, self.k)?;
        Ok(())
    }
}
