use std::sync::Arc;

use log::trace;

use super::domain::IntegerDomain;
use super::predicates::Predicate;
use super::propagation::record_events;
use super::propagation::EnqueueDecision;
use super::propagation::PendingEvents;
use super::propagation::PropagationContext;
use super::propagation::PropagationContextMut;
use super::propagation::Propagator;
use super::propagation::PropagatorConstructor;
use super::propagation::PropagatorConstructorContext;
use super::propagation::PropagatorId;
use super::propagation::PropagatorQueue;
use super::propagation::WatchList;
use super::store_link::LinkedBinding;
use super::store_link::StoreLink;
use super::variables::DomainId;
use super::variables::IntegerVariable;
use super::Assignments;
use super::EmptyDomain;
use super::Solution;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatusCP;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::create_statistics_struct;
use crate::predicate;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::store::VariableRef;
use crate::store::VariableStore;

create_statistics_struct!(
    /// Counters of a [`ConstraintSpace`].
    EngineStatistics {
        /// Number of times a propagator was run.
        num_propagations: u64,
        /// Number of propagations which ended in an inconsistency.
        num_inconsistencies: u64,
        /// Number of batches of domain events dispatched to watchers.
        num_domain_updates: u64,
    }
);

/// The finite-domain variables of one constraint problem together with the propagators posted on
/// them.
///
/// A space is owned by a single search task and needs no synchronisation. Search drives it through
/// [`ConstraintSpace::new_checkpoint`], [`ConstraintSpace::apply_decision`],
/// [`ConstraintSpace::propagate`] and [`ConstraintSpace::synchronise`]; everything done after a
/// checkpoint is undone exactly when synchronising back to it.
pub struct ConstraintSpace {
    assignments: Assignments,
    propagators: KeyedVec<PropagatorId, Box<dyn Propagator>>,
    watch_list: WatchList,
    propagator_queue: PropagatorQueue,
    /// Domain changes which have not been dispatched to the watchers yet.
    pending_events: PendingEvents,
    /// Set when the space is inconsistent at the root, after which nothing can be added.
    root_inconsistent: bool,
    /// Links whose dataflow variable and domain have not both been determined yet.
    links: Vec<StoreLink>,
    statistics: EngineStatistics,
}

impl Default for ConstraintSpace {
    fn default() -> Self {
        ConstraintSpace {
            assignments: Assignments::default(),
            propagators: KeyedVec::default(),
            watch_list: WatchList::default(),
            propagator_queue: PropagatorQueue::default(),
            pending_events: PendingEvents::default(),
            root_inconsistent: false,
            links: Vec::new(),
            statistics: EngineStatistics::default(),
        }
    }
}

impl std::fmt::Debug for ConstraintSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintSpace")
            .field("assignments", &self.assignments)
            .field("num_propagators", &self.propagators.len())
            .field("root_inconsistent", &self.root_inconsistent)
            .field("num_links", &self.links.len())
            .finish()
    }
}

impl ConstraintSpace {
    /// Create a variable with the domain `[lower_bound, upper_bound]`.
    pub fn new_bounded_integer(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        assert!(
            lower_bound <= upper_bound,
            "the domain [{lower_bound}, {upper_bound}] is empty"
        );
        self.new_domain(IntegerDomain::new(lower_bound, upper_bound))
    }

    /// Create a variable whose domain is exactly `values`.
    ///
    /// # Panics
    /// If `values` is empty.
    pub fn new_sparse_integer(&mut self, values: impl IntoIterator<Item = i32>) -> DomainId {
        let Some(domain) = IntegerDomain::from_values(values) else {
            panic!("a sparse domain needs at least one value");
        };
        self.new_domain(domain)
    }

    /// Create a 0/1 variable.
    pub fn new_boolean(&mut self) -> DomainId {
        self.new_bounded_integer(0, 1)
    }

    fn new_domain(&mut self, domain: IntegerDomain) -> DomainId {
        self.watch_list.grow();
        self.assignments.grow_with_domain(domain)
    }

    pub fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    pub fn num_propagators(&self) -> usize {
        self.propagators.len()
    }

    pub fn lower_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.lower_bound(&self.assignments)
    }

    pub fn upper_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.upper_bound(&self.assignments)
    }

    pub fn contains<Var: IntegerVariable>(&self, var: &Var, value: i32) -> bool {
        var.contains(&self.assignments, value)
    }

    pub fn fixed_value<Var: IntegerVariable>(&self, var: &Var) -> Option<i32> {
        var.is_fixed(&self.assignments)
            .then(|| var.lower_bound(&self.assignments))
    }

    pub fn is_inconsistent_at_root(&self) -> bool {
        self.root_inconsistent
    }

    pub fn get_checkpoint(&self) -> usize {
        self.assignments.get_checkpoint()
    }

    /// Add a propagator and propagate to a fixpoint.
    ///
    /// Constraints can only be added at the root. When the new propagator makes the space
    /// inconsistent, the space stays inconsistent and every later addition fails.
    pub fn add_propagator<Constructor: PropagatorConstructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorId, ConstraintOperationError> {
        if self.root_inconsistent {
            return Err(ConstraintOperationError::InfeasibleState);
        }
        if self.get_checkpoint() != 0 {
            return Err(ConstraintOperationError::NotAtRoot);
        }

        let propagator_id = PropagatorId::create_from_index(self.propagators.len());
        let propagator = constructor.create(PropagatorConstructorContext::new(
            &mut self.watch_list,
            &self.assignments,
            propagator_id,
        ));
        let priority = propagator.priority();
        let _ = self.propagators.push(Box::new(propagator));
        self.propagator_queue
            .enqueue_propagator(propagator_id, priority);

        self.propagate_at_root()?;
        Ok(propagator_id)
    }

    /// Make `predicate` hold at the root and propagate.
    pub fn post_at_root(&mut self, predicate: Predicate) -> Result<(), ConstraintOperationError> {
        if self.root_inconsistent {
            return Err(ConstraintOperationError::InfeasibleState);
        }
        if self.get_checkpoint() != 0 {
            return Err(ConstraintOperationError::NotAtRoot);
        }

        if self.apply(predicate).is_err() {
            self.mark_root_inconsistent();
            return Err(ConstraintOperationError::InfeasiblePropagator);
        }
        self.propagate_at_root()
    }

    /// Link `domain` to the dataflow variable `variable` of `store`.
    ///
    /// Whenever the space propagates at the root, a binding of `variable` to an integer narrows
    /// `domain` to that value, and once `domain` is fixed `variable` is bound to its value. A
    /// binding outside the domain, or to anything but an integer, makes the space inconsistent;
    /// linked variables which are still unbound then fail with
    /// [`RuntimeError::Inconsistency`](crate::RuntimeError::Inconsistency).
    pub fn link(
        &mut self,
        store: &Arc<VariableStore>,
        domain: DomainId,
        variable: VariableRef,
    ) -> Result<(), ConstraintOperationError> {
        if self.root_inconsistent {
            return Err(ConstraintOperationError::InfeasibleState);
        }
        if self.get_checkpoint() != 0 {
            return Err(ConstraintOperationError::NotAtRoot);
        }

        trace!("linking {domain:?} to {variable}");
        self.links
            .push(StoreLink::new(Arc::clone(store), domain, variable));
        self.propagate_at_root()
    }

    /// Intersect the domain of `domain` with `values` at the root and propagate.
    pub fn restrict_at_root(
        &mut self,
        domain: DomainId,
        values: impl IntoIterator<Item = i32>,
    ) -> Result<(), ConstraintOperationError> {
        if self.root_inconsistent {
            return Err(ConstraintOperationError::InfeasibleState);
        }
        if self.get_checkpoint() != 0 {
            return Err(ConstraintOperationError::NotAtRoot);
        }

        match self.assignments.restrict_to(domain, values) {
            Ok(events) => {
                record_events(&mut self.pending_events, domain, events);
                self.propagate_at_root()
            }
            Err(EmptyDomain) => {
                self.mark_root_inconsistent();
                Err(ConstraintOperationError::InfeasiblePropagator)
            }
        }
    }

    fn propagate_at_root(&mut self) -> Result<(), ConstraintOperationError> {
        self.propagate()
            .map_err(|_| ConstraintOperationError::InfeasiblePropagator)
    }

    pub fn new_checkpoint(&mut self) {
        self.assignments.new_checkpoint();
    }

    /// Go back to `checkpoint`, undoing every narrowing made since.
    pub fn synchronise(&mut self, checkpoint: usize) {
        self.assignments.synchronise(checkpoint);
        self.propagator_queue.clear();
        self.pending_events.clear();
    }

    /// Narrow a domain as decided by search. The affected propagators run on the next call to
    /// [`ConstraintSpace::propagate`].
    pub fn apply_decision(&mut self, predicate: Predicate) -> Result<(), EmptyDomain> {
        self.apply(predicate)
    }

    fn apply(&mut self, predicate: Predicate) -> Result<(), EmptyDomain> {
        let events = self.assignments.apply(predicate)?;
        record_events(&mut self.pending_events, predicate.get_domain(), events);
        Ok(())
    }

    /// Run propagators until no domain changes any more or an inconsistency is found.
    ///
    /// An inconsistency at the root marks the space as inconsistent for good; after a deeper
    /// inconsistency the caller is expected to synchronise to an earlier checkpoint.
    pub fn propagate(&mut self) -> PropagationStatusCP {
        if self.root_inconsistent {
            return Err(Inconsistency::EmptyDomain);
        }

        let at_root = self.get_checkpoint() == 0;
        if at_root && self.read_links().is_err() {
            self.mark_root_inconsistent();
            return Err(Inconsistency::EmptyDomain);
        }

        self.dispatch_events(None);

        while let Some(propagator_id) = self.propagator_queue.pop() {
            self.statistics.num_propagations += 1;

            let context = PropagationContextMut::new(
                &mut self.assignments,
                &mut self.pending_events,
                propagator_id,
            );
            let result = self.propagators[propagator_id].propagate(context);

            if let Err(inconsistency) = result {
                trace!(
                    "{} found an inconsistency at checkpoint {}",
                    self.propagators[propagator_id].name(),
                    self.get_checkpoint()
                );
                self.statistics.num_inconsistencies += 1;
                self.propagator_queue.clear();
                self.pending_events.clear();
                if at_root {
                    self.mark_root_inconsistent();
                }
                return Err(inconsistency);
            }

            self.dispatch_events(Some(propagator_id));
        }

        if at_root && self.write_links().is_err() {
            self.mark_root_inconsistent();
            return Err(Inconsistency::EmptyDomain);
        }
        Ok(())
    }

    /// Narrow the domains of links whose dataflow variable has been bound.
    fn read_links(&mut self) -> Result<(), EmptyDomain> {
        let mut index = 0;
        while index < self.links.len() {
            let value = match self.links[index].binding() {
                LinkedBinding::Unbound => {
                    index += 1;
                    continue;
                }
                LinkedBinding::Value(value) => value,
                LinkedBinding::Incompatible => return Err(EmptyDomain),
            };

            let domain = self.links.swap_remove(index).domain();
            self.apply(predicate!(domain == value))?;
        }
        Ok(())
    }

    /// Bind the dataflow variables of links whose domain is fixed. Fails when one of them was
    /// bound to another value in the meantime.
    fn write_links(&mut self) -> Result<(), EmptyDomain> {
        let assignments = &self.assignments;
        let mut conflict = false;
        self.links.retain(|link| {
            let domain = link.domain();
            if !domain.is_fixed(assignments) {
                return true;
            }
            conflict |= link.bind(domain.lower_bound(assignments)).is_err();
            false
        });

        if conflict {
            Err(EmptyDomain)
        } else {
            Ok(())
        }
    }

    fn mark_root_inconsistent(&mut self) {
        self.root_inconsistent = true;
        for link in self.links.drain(..) {
            link.fail("the constraint space is inconsistent");
        }
    }

    /// Notify the watchers of every pending event and enqueue those which ask for it. The
    /// propagator which caused the events is idempotent and is not enqueued again.
    fn dispatch_events(&mut self, origin: Option<PropagatorId>) {
        for (domain, events) in self.pending_events.drain(..) {
            self.statistics.num_domain_updates += 1;
            for (event, watcher) in self.watch_list.get_affected(domain, events) {
                if Some(watcher.propagator) == origin {
                    continue;
                }
                let propagator = &mut self.propagators[watcher.propagator];
                let decision = propagator.notify(
                    PropagationContext::new(&self.assignments),
                    watcher.variable,
                    event,
                );
                if decision == EnqueueDecision::Enqueue {
                    self.propagator_queue
                        .enqueue_propagator(watcher.propagator, propagator.priority());
                }
            }
        }
    }

    /// The current assignment if every variable is fixed.
    pub fn solution(&self) -> Option<Solution> {
        self.assignments
            .all_assigned()
            .then(|| Solution::from_assignments(&self.assignments))
    }

    pub fn statistics(&self) -> EngineStatistics {
        self.statistics
    }

    pub fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints;
    use crate::constraints::Constraint;
    use crate::store::Value;
    use crate::store::VariableStatus;
    use crate::RuntimeError;

    #[test]
    fn decisions_are_undone_on_synchronise() {
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(1, 3);

        space.new_checkpoint();
        space.apply_decision(predicate!(x == 2)).unwrap();
        assert!(space.propagate().is_ok());
        assert_eq!(Some(2), space.fixed_value(&x));

        space.synchronise(0);
        assert_eq!(1, space.lower_bound(&x));
        assert_eq!(3, space.upper_bound(&x));
    }

    #[test]
    fn root_inconsistency_sticks() {
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(1, 3);

        assert_eq!(
            Err(ConstraintOperationError::InfeasiblePropagator),
            space.post_at_root(predicate!(x >= 4))
        );
        assert_eq!(
            Err(ConstraintOperationError::InfeasibleState),
            space.post_at_root(predicate!(x >= 2))
        );
        assert!(space.propagate().is_err());
    }

    #[test]
    fn constraints_are_only_added_at_the_root() {
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(1, 3);

        space.new_checkpoint();

        assert_eq!(
            Err(ConstraintOperationError::NotAtRoot),
            space.post_at_root(predicate!(x != 2))
        );
    }

    #[test]
    fn solutions_exist_once_every_domain_is_fixed() {
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(1, 3);
        let y = space.new_sparse_integer([7]);

        assert!(space.solution().is_none());

        space.post_at_root(predicate!(x == 3)).unwrap();
        let solution = space.solution().unwrap();

        assert_eq!(3, solution.get_integer_value(x));
        assert_eq!(7, solution.get_integer_value(y));
    }

    fn linked(
        space: &mut ConstraintSpace,
        store: &Arc<VariableStore>,
        lower_bound: i32,
        upper_bound: i32,
    ) -> (DomainId, VariableRef) {
        let domain = space.new_bounded_integer(lower_bound, upper_bound);
        let variable = store.new_variable().unwrap();
        space.link(store, domain, variable).unwrap();
        (domain, variable)
    }

    #[test]
    fn fixing_a_linked_domain_binds_its_variable() {
        let store = Arc::new(VariableStore::new(16));
        let mut space = ConstraintSpace::default();
        let (x, fx) = linked(&mut space, &store, 1, 3);
        let (y, fy) = linked(&mut space, &store, 0, 5);
        constraints::equals(x, y).post(&mut space).unwrap();

        assert_eq!(VariableStatus::Unbound, store.status(fx));

        space.post_at_root(predicate!(x == 2)).unwrap();

        assert_eq!(Some(Value::Int(2)), store.value(fx));
        assert_eq!(Some(Value::Int(2)), store.value(fy));
    }

    #[test]
    fn binding_a_linked_variable_narrows_its_domain() {
        let store = Arc::new(VariableStore::new(16));
        let mut space = ConstraintSpace::default();
        let (x, fx) = linked(&mut space, &store, 0, 9);

        store.bind(fx, Value::Int(4)).unwrap();
        assert_eq!(None, space.fixed_value(&x));

        assert!(space.propagate().is_ok());
        assert_eq!(Some(4), space.fixed_value(&x));
    }

    #[test]
    fn variable_bound_before_linking_is_read_immediately() {
        let store = Arc::new(VariableStore::new(16));
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(0, 9);
        let fx = store.new_bound(Value::Int(7)).unwrap();

        space.link(&store, x, fx).unwrap();

        assert_eq!(Some(7), space.fixed_value(&x));
    }

    #[test]
    fn binding_outside_the_domain_fails_the_other_links() {
        let store = Arc::new(VariableStore::new(16));
        let mut space = ConstraintSpace::default();
        let (_, fx) = linked(&mut space, &store, 0, 3);
        let (_, fy) = linked(&mut space, &store, 0, 3);

        store.bind(fx, Value::Int(8)).unwrap();

        assert!(space.propagate().is_err());
        assert!(space.is_inconsistent_at_root());
        assert!(matches!(
            store.status(fy),
            VariableStatus::Failed(RuntimeError::Inconsistency { .. })
        ));
    }

    #[test]
    fn search_decisions_do_not_bind_linked_variables() {
        let store = Arc::new(VariableStore::new(16));
        let mut space = ConstraintSpace::default();
        let (x, fx) = linked(&mut space, &store, 0, 3);

        space.new_checkpoint();
        space.apply_decision(predicate!(x == 1)).unwrap();
        assert!(space.propagate().is_ok());

        assert_eq!(VariableStatus::Unbound, store.status(fx));
    }
}
