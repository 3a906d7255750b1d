use enumset::EnumSet;

use super::IntegerVariable;
use super::TransformableVariable;
use crate::engine::predicates::Predicate;
use crate::engine::predicates::PredicateConstructor;
use crate::engine::propagation::Watchers;
use crate::engine::Assignments;
use crate::engine::DomainEvent;
use crate::rivulet_assert_simple;

/// The variable `scale * inner + offset`, expressed through the domain of `inner`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct AffineView<Inner> {
    inner: Inner,
    scale: i32,
    offset: i32,
}

impl<Inner> AffineView<Inner> {
    pub fn new(inner: Inner, scale: i32, offset: i32) -> Self {
        rivulet_assert_simple!(scale != 0, "a view with scale zero cannot be inverted");
        AffineView {
            inner,
            scale,
            offset,
        }
    }

    fn map(&self, value: i32) -> i32 {
        self.scale * value + self.offset
    }

    /// The value of `inner` which maps to `value`, if there is one.
    fn invert_exact(&self, value: i32) -> Option<i32> {
        let translated = value - self.offset;
        (translated % self.scale == 0).then_some(translated / self.scale)
    }
}

fn floor_div(numerator: i32, denominator: i32) -> i32 {
    let quotient = numerator / denominator;
    if (numerator % denominator != 0) && ((numerator < 0) != (denominator < 0)) {
        quotient - 1
    } else {
        quotient
    }
}

fn ceil_div(numerator: i32, denominator: i32) -> i32 {
    -floor_div(-numerator, denominator)
}

impl<Inner: IntegerVariable> IntegerVariable for AffineView<Inner> {
    type AffineView = Self;

    fn lower_bound(&self, assignments: &Assignments) -> i32 {
        if self.scale < 0 {
            self.map(self.inner.upper_bound(assignments))
        } else {
            self.map(self.inner.lower_bound(assignments))
        }
    }

    fn upper_bound(&self, assignments: &Assignments) -> i32 {
        if self.scale < 0 {
            self.map(self.inner.lower_bound(assignments))
        } else {
            self.map(self.inner.upper_bound(assignments))
        }
    }

    fn contains(&self, assignments: &Assignments, value: i32) -> bool {
        self.invert_exact(value)
            .is_some_and(|inverted| self.inner.contains(assignments, inverted))
    }

    fn iterate_domain(&self, assignments: &Assignments) -> impl Iterator<Item = i32> {
        self.inner
            .iterate_domain(assignments)
            .map(move |value| self.map(value))
    }

    fn watch_all(&self, watchers: &mut Watchers<'_>, events: EnumSet<DomainEvent>) {
        let events = if self.scale < 0 {
            events.iter().map(DomainEvent::mirrored).collect()
        } else {
            events
        };
        self.inner.watch_all(watchers, events);
    }

    fn unpack_event(&self, event: DomainEvent) -> DomainEvent {
        let event = self.inner.unpack_event(event);
        if self.scale < 0 {
            event.mirrored()
        } else {
            event
        }
    }
}

impl<Inner: IntegerVariable> TransformableVariable<AffineView<Inner>> for AffineView<Inner> {
    fn scaled(&self, scale: i32) -> AffineView<Inner> {
        AffineView::new(self.inner.clone(), self.scale * scale, self.offset * scale)
    }

    fn offset(&self, offset: i32) -> AffineView<Inner> {
        AffineView::new(self.inner.clone(), self.scale, self.offset + offset)
    }
}

impl<Inner: IntegerVariable> PredicateConstructor for AffineView<Inner> {
    type Value = i32;

    fn lower_bound_predicate(&self, bound: i32) -> Predicate {
        if self.scale < 0 {
            self.inner
                .upper_bound_predicate(floor_div(bound - self.offset, self.scale))
        } else {
            self.inner
                .lower_bound_predicate(ceil_div(bound - self.offset, self.scale))
        }
    }

    fn upper_bound_predicate(&self, bound: i32) -> Predicate {
        if self.scale < 0 {
            self.inner
                .lower_bound_predicate(ceil_div(bound - self.offset, self.scale))
        } else {
            self.inner
                .upper_bound_predicate(floor_div(bound - self.offset, self.scale))
        }
    }

    /// Only meaningful for values the view can take; callers check with
    /// [`IntegerVariable::contains`] first.
    fn equality_predicate(&self, bound: i32) -> Predicate {
        self.inner
            .equality_predicate(floor_div(bound - self.offset, self.scale))
    }

    /// Only meaningful for values the view can take; callers check with
    /// [`IntegerVariable::contains`] first.
    fn disequality_predicate(&self, bound: i32) -> Predicate {
        self.inner
            .disequality_predicate(floor_div(bound - self.offset, self.scale))
    }
}
