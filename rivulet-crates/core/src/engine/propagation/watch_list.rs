use enumset::EnumSet;

use super::PropagatorVarId;
use crate::containers::KeyedVec;
use crate::engine::variables::DomainId;
use crate::engine::DomainEvent;

/// For every domain and event, the propagator variables to notify.
#[derive(Debug, Default)]
pub(crate) struct WatchList {
    watchers: KeyedVec<DomainId, WatchersForDomain>,
}

#[derive(Debug, Default, Clone)]
struct WatchersForDomain {
    assign: Vec<PropagatorVarId>,
    lower_bound: Vec<PropagatorVarId>,
    upper_bound: Vec<PropagatorVarId>,
    removal: Vec<PropagatorVarId>,
}

impl WatchersForDomain {
    fn for_event(&self, event: DomainEvent) -> &Vec<PropagatorVarId> {
        match event {
            DomainEvent::Assign => &self.assign,
            DomainEvent::LowerBound => &self.lower_bound,
            DomainEvent::UpperBound => &self.upper_bound,
            DomainEvent::Removal => &self.removal,
        }
    }

    fn for_event_mut(&mut self, event: DomainEvent) -> &mut Vec<PropagatorVarId> {
        match event {
            DomainEvent::Assign => &mut self.assign,
            DomainEvent::LowerBound => &mut self.lower_bound,
            DomainEvent::UpperBound => &mut self.upper_bound,
            DomainEvent::Removal => &mut self.removal,
        }
    }
}

impl WatchList {
    pub(crate) fn grow(&mut self) {
        let _ = self.watchers.push(WatchersForDomain::default());
    }

    pub(crate) fn watch(&mut self, domain: DomainId, events: EnumSet<DomainEvent>, watcher: PropagatorVarId) {
        for event in events {
            let watchers = self.watchers[domain].for_event_mut(event);
            if !watchers.contains(&watcher) {
                watchers.push(watcher);
            }
        }
    }

    /// The watchers for any of `events` on `domain`. A watcher registered for several of the
    /// events is yielded once per event.
    pub(crate) fn get_affected(
        &self,
        domain: DomainId,
        events: EnumSet<DomainEvent>,
    ) -> impl Iterator<Item = (DomainEvent, PropagatorVarId)> + '_ {
        let watchers = &self.watchers[domain];
        events.into_iter().flat_map(move |event| {
            watchers
                .for_event(event)
                .iter()
                .map(move |&watcher| (event, watcher))
        })
    }
}

/// Handed to [`IntegerVariable::watch_all`](crate::engine::variables::IntegerVariable::watch_all)
/// to register the watches of one propagator variable.
#[derive(Debug)]
pub struct Watchers<'a> {
    propagator_var: PropagatorVarId,
    watch_list: &'a mut WatchList,
}

impl<'a> Watchers<'a> {
    pub(crate) fn new(propagator_var: PropagatorVarId, watch_list: &'a mut WatchList) -> Self {
        Watchers {
            propagator_var,
            watch_list,
        }
    }

    pub(crate) fn watch_all(&mut self, domain: DomainId, events: EnumSet<DomainEvent>) {
        self.watch_list.watch(domain, events, self.propagator_var);
    }
}

#[cfg(test)]
mod tests {
    use enumset::enum_set;

    use super::*;
    use crate::engine::propagation::LocalId;
    use crate::engine::propagation::PropagatorId;

    #[test]
    fn only_watchers_of_raised_events_are_affected() {
        let mut watch_list = WatchList::default();
        watch_list.grow();
        let x = DomainId::new(0);

        let bounds = PropagatorVarId {
            propagator: PropagatorId(0),
            variable: LocalId::from(0),
        };
        let assign = PropagatorVarId {
            propagator: PropagatorId(1),
            variable: LocalId::from(2),
        };
        watch_list.watch(x, enum_set!(DomainEvent::LowerBound | DomainEvent::UpperBound), bounds);
        watch_list.watch(x, enum_set!(DomainEvent::Assign), assign);

        let affected = watch_list
            .get_affected(x, enum_set!(DomainEvent::Removal | DomainEvent::LowerBound))
            .collect::<Vec<_>>();

        assert_eq!(vec![(DomainEvent::LowerBound, bounds)], affected);
    }
}
