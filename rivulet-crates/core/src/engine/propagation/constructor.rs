use super::LocalId;
use super::PropagationContext;
use super::Propagator;
use super::PropagatorId;
use super::PropagatorVarId;
use super::ReadDomains;
use super::WatchList;
use super::Watchers;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;
use crate::engine::DomainEvents;

/// Creates a propagator and registers the events it is interested in.
///
/// Constructors are the values users hand to
/// [`ConstraintSpace::add_propagator`](crate::engine::ConstraintSpace::add_propagator).
pub trait PropagatorConstructor {
    type PropagatorImpl: Propagator + 'static;

    fn create(self, context: PropagatorConstructorContext) -> Self::PropagatorImpl;
}

/// Gives a constructor access to the root domains and to the watch list.
#[derive(Debug)]
pub struct PropagatorConstructorContext<'a> {
    watch_list: &'a mut WatchList,
    assignments: &'a Assignments,
    propagator_id: PropagatorId,
}

impl<'a> PropagatorConstructorContext<'a> {
    pub(crate) fn new(
        watch_list: &'a mut WatchList,
        assignments: &'a Assignments,
        propagator_id: PropagatorId,
    ) -> Self {
        PropagatorConstructorContext {
            watch_list,
            assignments,
            propagator_id,
        }
    }

    /// Subscribe the propagator to `domain_events` on `var`, under `local_id`.
    ///
    /// Returns the variable so it can be stored in the propagator.
    pub fn register<Var: IntegerVariable>(
        &mut self,
        var: Var,
        domain_events: DomainEvents,
        local_id: LocalId,
    ) -> Var {
        let propagator_var = PropagatorVarId {
            propagator: self.propagator_id,
            variable: local_id,
        };
        let mut watchers = Watchers::new(propagator_var, self.watch_list);
        var.watch_all(&mut watchers, domain_events.get_events());
        var
    }

    pub fn propagator_id(&self) -> PropagatorId {
        self.propagator_id
    }

    pub fn domains(&self) -> PropagationContext<'_> {
        PropagationContext::new(self.assignments)
    }
}

impl ReadDomains for PropagatorConstructorContext<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }
}
