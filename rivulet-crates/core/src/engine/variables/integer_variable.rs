use std::fmt::Debug;

use enumset::EnumSet;

use crate::engine::predicates::PredicateConstructor;
use crate::engine::propagation::Watchers;
use crate::engine::Assignments;
use crate::engine::DomainEvent;

/// Behaviour shared by domains and views on domains, so propagators can be written once.
pub trait IntegerVariable:
    Clone + Debug + Send + 'static + PredicateConstructor<Value = i32> + TransformableVariable<Self::AffineView>
{
    type AffineView: IntegerVariable;

    fn lower_bound(&self, assignments: &Assignments) -> i32;

    fn upper_bound(&self, assignments: &Assignments) -> i32;

    fn contains(&self, assignments: &Assignments, value: i32) -> bool;

    fn is_fixed(&self, assignments: &Assignments) -> bool {
        self.lower_bound(assignments) == self.upper_bound(assignments)
    }

    fn iterate_domain(&self, assignments: &Assignments) -> impl Iterator<Item = i32>;

    /// Register a watch for this variable on the given domain events.
    fn watch_all(&self, watchers: &mut Watchers<'_>, events: EnumSet<DomainEvent>);

    /// Translate an event on the underlying domain into an event on this variable.
    fn unpack_event(&self, event: DomainEvent) -> DomainEvent;
}

/// Variables which can be scaled and offset into an affine view.
pub trait TransformableVariable<View> {
    fn scaled(&self, scale: i32) -> View;

    fn offset(&self, offset: i32) -> View;
}
