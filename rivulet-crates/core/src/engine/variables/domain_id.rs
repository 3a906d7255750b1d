use std::fmt::Display;
use std::fmt::Formatter;

use enumset::EnumSet;

use super::IntegerVariable;
use crate::engine::predicates::Predicate;
use crate::engine::predicates::PredicateConstructor;
use crate::engine::propagation::Watchers;
use crate::engine::variables::AffineView;
use crate::engine::variables::TransformableVariable;
use crate::engine::Assignments;
use crate::engine::DomainEvent;
use crate::containers::StorageKey;

/// A finite-domain integer variable of a [`ConstraintSpace`](crate::engine::ConstraintSpace).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId {
    pub(crate) id: u32,
}

impl DomainId {
    pub fn new(id: u32) -> Self {
        DomainId { id }
    }
}

impl IntegerVariable for DomainId {
    type AffineView = AffineView<Self>;

    fn lower_bound(&self, assignments: &Assignments) -> i32 {
        assignments.get_lower_bound(*self)
    }

    fn upper_bound(&self, assignments: &Assignments) -> i32 {
        assignments.get_upper_bound(*self)
    }

    fn contains(&self, assignments: &Assignments, value: i32) -> bool {
        assignments.is_value_in_domain(*self, value)
    }

    fn iterate_domain(&self, assignments: &Assignments) -> impl Iterator<Item = i32> {
        assignments.get_domain_iterator(*self)
    }

    fn watch_all(&self, watchers: &mut Watchers<'_>, events: EnumSet<DomainEvent>) {
        watchers.watch_all(*self, events);
    }

    fn unpack_event(&self, event: DomainEvent) -> DomainEvent {
        event
    }
}

impl TransformableVariable<AffineView<DomainId>> for DomainId {
    fn scaled(&self, scale: i32) -> AffineView<DomainId> {
        AffineView::new(*self, scale, 0)
    }

    fn offset(&self, offset: i32) -> AffineView<DomainId> {
        AffineView::new(*self, 1, offset)
    }
}

impl PredicateConstructor for DomainId {
    type Value = i32;

    fn lower_bound_predicate(&self, bound: i32) -> Predicate {
        Predicate::LowerBound {
            domain: *self,
            lower_bound: bound,
        }
    }

    fn upper_bound_predicate(&self, bound: i32) -> Predicate {
        Predicate::UpperBound {
            domain: *self,
            upper_bound: bound,
        }
    }

    fn equality_predicate(&self, bound: i32) -> Predicate {
        Predicate::Equal {
            domain: *self,
            equality_constant: bound,
        }
    }

    fn disequality_predicate(&self, bound: i32) -> Predicate {
        Predicate::NotEqual {
            domain: *self,
            not_equal_constant: bound,
        }
    }
}

impl StorageKey for DomainId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        DomainId { id: index as u32 }
    }
}

impl Display for DomainId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}

impl std::fmt::Debug for DomainId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}
