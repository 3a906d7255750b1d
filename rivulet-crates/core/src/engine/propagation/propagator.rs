use super::PropagationContext;
use super::PropagationContextMut;
use crate::basic_types::PropagationStatusCP;
use crate::engine::propagation::LocalId;
use crate::engine::DomainEvent;
#[cfg(doc)]
use crate::engine::propagation::PropagatorConstructor;

/// A propagator narrows the domains of the variables of one constraint.
///
/// Propagators are created by a [`PropagatorConstructor`], which also registers the domain events
/// the propagator wants to be woken up for. When one of those events happens the propagator is
/// first notified through [`Propagator::notify`], which decides whether it is enqueued; later the
/// engine calls [`Propagator::propagate`].
///
/// Propagators must be idempotent and monotone: propagating twice without a change in between
/// narrows nothing the second time, and the result never depends on the order in which the
/// engine ran the other propagators. They also keep no state that would have to be restored on
/// backtrack; everything they need is read from the domains.
pub trait Propagator: Send {
    /// Name used in log messages and statistics.
    fn name(&self) -> &str;

    /// Narrow the domains of the variables of this propagator.
    ///
    /// Returns an error when the constraint cannot be satisfied under the current domains, either
    /// because a domain update would empty a domain or because the propagator detects this itself.
    fn propagate(&self, context: PropagationContextMut) -> PropagationStatusCP;

    /// Called when a registered event happens to the variable with the given local id. The event
    /// is the one raised on the underlying domain; use
    /// [`IntegerVariable::unpack_event`](crate::engine::variables::IntegerVariable::unpack_event)
    /// to see it through a view.
    fn notify(
        &mut self,
        _context: PropagationContext,
        _local_id: LocalId,
        _event: DomainEvent,
    ) -> EnqueueDecision {
        EnqueueDecision::Enqueue
    }

    fn priority(&self) -> Priority {
        Priority::VeryLow
    }
}

/// Whether a notified propagator should be enqueued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueDecision {
    Enqueue,
    Skip,
}

/// Propagators with a higher priority run first. Cheap propagators should have high priority.
#[derive(Default, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Priority {
    High = 0,
    Medium = 1,
    Low = 2,
    #[default]
    VeryLow = 3,
}
