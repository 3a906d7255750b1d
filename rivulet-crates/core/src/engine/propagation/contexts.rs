use enumset::EnumSet;

use super::PropagatorId;
use crate::basic_types::Inconsistency;
use crate::engine::predicates::Predicate;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;
use crate::engine::DomainEvent;
use crate::engine::EmptyDomain;

/// Read access to the domains, shared by every context handed to a propagator.
pub trait ReadDomains {
    fn assignments(&self) -> &Assignments;

    fn lower_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.lower_bound(self.assignments())
    }

    fn upper_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.upper_bound(self.assignments())
    }

    fn contains<Var: IntegerVariable>(&self, var: &Var, value: i32) -> bool {
        var.contains(self.assignments(), value)
    }

    fn is_fixed<Var: IntegerVariable>(&self, var: &Var) -> bool {
        var.is_fixed(self.assignments())
    }

    fn fixed_value<Var: IntegerVariable>(&self, var: &Var) -> Option<i32> {
        self.is_fixed(var).then(|| self.lower_bound(var))
    }

    fn iterate_domain<Var: IntegerVariable>(&self, var: &Var) -> impl Iterator<Item = i32> {
        var.iterate_domain(self.assignments())
    }
}

/// Read-only view of the domains.
#[derive(Clone, Copy, Debug)]
pub struct PropagationContext<'a> {
    assignments: &'a Assignments,
}

impl<'a> PropagationContext<'a> {
    pub(crate) fn new(assignments: &'a Assignments) -> Self {
        PropagationContext { assignments }
    }
}

impl ReadDomains for PropagationContext<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }
}

/// The domain changes made while propagating, to be dispatched to the watchers afterwards.
pub(crate) type PendingEvents = Vec<(DomainId, EnumSet<DomainEvent>)>;

/// The context in which a propagator narrows domains.
///
/// All updates go through the checked methods here, which skip updates that change nothing and
/// turn updates that would empty a domain into an [`EmptyDomain`] error.
#[derive(Debug)]
pub struct PropagationContextMut<'a> {
    assignments: &'a mut Assignments,
    events: &'a mut PendingEvents,
    propagator_id: PropagatorId,
    num_updates: usize,
}

impl<'a> PropagationContextMut<'a> {
    pub(crate) fn new(
        assignments: &'a mut Assignments,
        events: &'a mut PendingEvents,
        propagator_id: PropagatorId,
    ) -> Self {
        PropagationContextMut {
            assignments,
            events,
            propagator_id,
            num_updates: 0,
        }
    }

    /// How many domain updates this context applied so far. Propagators which need several passes
    /// to reach their own fixpoint compare this before and after a pass.
    pub fn num_updates(&self) -> usize {
        self.num_updates
    }

    /// The inconsistency to report when the propagator itself finds its constraint violated.
    pub fn conflict(&self) -> Inconsistency {
        Inconsistency::Conflict(self.propagator_id)
    }

    pub fn set_lower_bound<Var: IntegerVariable>(
        &mut self,
        var: &Var,
        bound: i32,
    ) -> Result<(), EmptyDomain> {
        if var.lower_bound(self.assignments) >= bound {
            return Ok(());
        }
        if var.upper_bound(self.assignments) < bound {
            return Err(EmptyDomain);
        }
        self.post(var.lower_bound_predicate(bound))
    }

    pub fn set_upper_bound<Var: IntegerVariable>(
        &mut self,
        var: &Var,
        bound: i32,
    ) -> Result<(), EmptyDomain> {
        if var.upper_bound(self.assignments) <= bound {
            return Ok(());
        }
        if var.lower_bound(self.assignments) > bound {
            return Err(EmptyDomain);
        }
        self.post(var.upper_bound_predicate(bound))
    }

    pub fn remove<Var: IntegerVariable>(&mut self, var: &Var, value: i32) -> Result<(), EmptyDomain> {
        if !var.contains(self.assignments, value) {
            return Ok(());
        }
        self.post(var.disequality_predicate(value))
    }

    pub fn assign<Var: IntegerVariable>(&mut self, var: &Var, value: i32) -> Result<(), EmptyDomain> {
        if !var.contains(self.assignments, value) {
            return Err(EmptyDomain);
        }
        self.post(var.equality_predicate(value))
    }

    fn post(&mut self, predicate: Predicate) -> Result<(), EmptyDomain> {
        let events = self.assignments.apply(predicate)?;
        if !events.is_empty() {
            self.num_updates += 1;
        }
        record_events(self.events, predicate.get_domain(), events);
        Ok(())
    }
}

impl ReadDomains for PropagationContextMut<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }
}

pub(crate) fn record_events(
    pending: &mut PendingEvents,
    domain: DomainId,
    events: EnumSet<DomainEvent>,
) {
    if events.is_empty() {
        return;
    }
    match pending.iter_mut().find(|(pending_domain, _)| *pending_domain == domain) {
        Some((_, pending_events)) => *pending_events |= events,
        None => pending.push((domain, events)),
    }
}
