use enumset::EnumSet;

use super::DomainEvent;
use crate::rivulet_assert_moderate;

/// A finite set of integers stored as sorted, disjoint, non-adjacent closed intervals.
///
/// Narrowing operations assume the caller has checked that the domain actually changes and does
/// not become empty; see [`Assignments`](super::Assignments) for the checked entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct IntegerDomain {
    intervals: Vec<(i32, i32)>,
}

impl IntegerDomain {
    pub(crate) fn new(lower_bound: i32, upper_bound: i32) -> IntegerDomain {
        rivulet_assert_moderate!(lower_bound <= upper_bound);
        IntegerDomain {
            intervals: vec![(lower_bound, upper_bound)],
        }
    }

    /// Builds a domain from arbitrary values. Returns `None` when there are none.
    pub(crate) fn from_values(values: impl IntoIterator<Item = i32>) -> Option<IntegerDomain> {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_unstable();
        values.dedup();

        let mut intervals: Vec<(i32, i32)> = Vec::new();
        for value in values {
            match intervals.last_mut() {
                Some((_, upper)) if *upper + 1 == value => *upper = value,
                _ => intervals.push((value, value)),
            }
        }

        (!intervals.is_empty()).then_some(IntegerDomain { intervals })
    }

    pub(crate) fn lower_bound(&self) -> i32 {
        self.intervals[0].0
    }

    pub(crate) fn upper_bound(&self) -> i32 {
        self.intervals[self.intervals.len() - 1].1
    }

    pub(crate) fn is_fixed(&self) -> bool {
        self.lower_bound() == self.upper_bound()
    }

    pub(crate) fn size(&self) -> u64 {
        self.intervals
            .iter()
            .map(|&(lower, upper)| (upper as i64 - lower as i64 + 1) as u64)
            .sum()
    }

    fn position_of(&self, value: i32) -> Result<usize, usize> {
        self.intervals.binary_search_by(|&(lower, upper)| {
            if upper < value {
                std::cmp::Ordering::Less
            } else if lower > value {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
    }

    pub(crate) fn contains(&self, value: i32) -> bool {
        self.position_of(value).is_ok()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.intervals
            .iter()
            .flat_map(|&(lower, upper)| lower..=upper)
    }

    /// Events raised by a change which ends in `self`, given the bounds before the change.
    fn events_since(&self, old_lower: i32, old_upper: i32) -> EnumSet<DomainEvent> {
        let mut events = EnumSet::only(DomainEvent::Removal);
        if self.lower_bound() != old_lower {
            let _ = events.insert(DomainEvent::LowerBound);
        }
        if self.upper_bound() != old_upper {
            let _ = events.insert(DomainEvent::UpperBound);
        }
        if self.is_fixed() {
            let _ = events.insert(DomainEvent::Assign);
        }
        events
    }

    /// Requires `lower_bound() < bound <= upper_bound()`.
    pub(crate) fn set_lower_bound(&mut self, bound: i32) -> EnumSet<DomainEvent> {
        let (old_lower, old_upper) = (self.lower_bound(), self.upper_bound());

        let first_kept = self
            .intervals
            .iter()
            .position(|&(_, upper)| upper >= bound)
            .unwrap_or(self.intervals.len() - 1);
        let _ = self.intervals.drain(..first_kept);
        self.intervals[0].0 = self.intervals[0].0.max(bound);

        self.events_since(old_lower, old_upper)
    }

    /// Requires `lower_bound() <= bound < upper_bound()`.
    pub(crate) fn set_upper_bound(&mut self, bound: i32) -> EnumSet<DomainEvent> {
        let (old_lower, old_upper) = (self.lower_bound(), self.upper_bound());

        let last_kept = self
            .intervals
            .iter()
            .rposition(|&(lower, _)| lower <= bound)
            .unwrap_or(0);
        self.intervals.truncate(last_kept + 1);
        let last = self.intervals.len() - 1;
        self.intervals[last].1 = self.intervals[last].1.min(bound);

        self.events_since(old_lower, old_upper)
    }

    /// Requires `value` to be in the domain and the domain not to be fixed.
    pub(crate) fn remove(&mut self, value: i32) -> EnumSet<DomainEvent> {
        let (old_lower, old_upper) = (self.lower_bound(), self.upper_bound());

        if let Ok(index) = self.position_of(value) {
            let (lower, upper) = self.intervals[index];
            match (lower == value, upper == value) {
                (true, true) => {
                    let _ = self.intervals.remove(index);
                }
                (true, false) => self.intervals[index].0 = value + 1,
                (false, true) => self.intervals[index].1 = value - 1,
                (false, false) => {
                    self.intervals[index].1 = value - 1;
                    self.intervals.insert(index + 1, (value + 1, upper));
                }
            }
        }

        self.events_since(old_lower, old_upper)
    }

    /// Requires `value` to be in the domain and the domain not to be fixed.
    pub(crate) fn assign(&mut self, value: i32) -> EnumSet<DomainEvent> {
        let (old_lower, old_upper) = (self.lower_bound(), self.upper_bound());

        self.intervals.clear();
        self.intervals.push((value, value));

        self.events_since(old_lower, old_upper)
    }
}

#[cfg(test)]
mod tests {
    use enumset::enum_set;

    use super::*;

    #[test]
    fn values_are_merged_into_intervals() {
        let domain = IntegerDomain::from_values([5, 1, 2, 3, 9, 8]).unwrap();

        assert_eq!(vec![(1, 3), (5, 5), (8, 9)], domain.intervals);
        assert_eq!(6, domain.size());
        assert!(domain.contains(5));
        assert!(!domain.contains(4));
    }

    #[test]
    fn removing_an_inner_value_splits_an_interval() {
        let mut domain = IntegerDomain::new(1, 5);

        let events = domain.remove(3);

        assert_eq!(vec![1, 2, 4, 5], domain.iter().collect::<Vec<_>>());
        assert_eq!(EnumSet::only(DomainEvent::Removal), events);
    }

    #[test]
    fn removing_the_lower_bound_skips_holes() {
        let mut domain = IntegerDomain::from_values([1, 4, 5]).unwrap();

        let events = domain.remove(1);

        assert_eq!(4, domain.lower_bound());
        assert_eq!(
            enum_set!(DomainEvent::Removal | DomainEvent::LowerBound),
            events
        );
    }

    #[test]
    fn tightening_a_bound_into_a_hole_moves_to_the_next_value() {
        let mut domain = IntegerDomain::from_values([1, 2, 6, 7, 10]).unwrap();

        let _ = domain.set_lower_bound(4);
        assert_eq!(6, domain.lower_bound());

        let _ = domain.set_upper_bound(9);
        assert_eq!(7, domain.upper_bound());
    }

    #[test]
    fn narrowing_to_a_single_value_raises_assign() {
        let mut domain = IntegerDomain::new(0, 1);

        let events = domain.set_lower_bound(1);

        assert!(events.contains(DomainEvent::Assign));
        assert!(domain.is_fixed());
    }
}
