use std::mem;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use log::trace;

use super::variable::Suspension;
use super::variable::VariableSlot;
use super::variable::VariableState;
use super::variable::Waiter;
use super::Atom;
use super::Determination;
use super::Record;
use super::Value;
use super::VariableRef;
use super::VariableStatus;
use crate::basic_types::Resource;
use crate::basic_types::RuntimeError;
use crate::containers::ConcurrentArena;
use crate::containers::HashSet;
use crate::create_statistics_struct;
use crate::rivulet_assert_moderate;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

create_statistics_struct!(
    /// Counters maintained by the [`VariableStore`].
    StoreStatistics {
        num_variables: u64,
        num_bindings: u64,
        num_conflicts: u64,
        num_failures: u64,
    }
);

/// Owner of every dataflow variable of a runtime.
///
/// Each variable is guarded by its own lock, so binding is linearizable per variable and
/// unrelated variables never contend. Aliased variables form a union-find forest in which the
/// representative is always the variable with the lowest id; when two locks are needed they are
/// taken in id order.
///
/// # Panics
/// Operations panic when handed a [`VariableRef`] created by a different store.
pub struct VariableStore {
    slots: ConcurrentArena<VariableSlot>,
    num_bindings: AtomicU64,
    num_conflicts: AtomicU64,
    num_failures: AtomicU64,
}

impl std::fmt::Debug for VariableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableStore")
            .field("slots", &self.slots)
            .finish()
    }
}

fn lock(slot: &VariableSlot) -> MutexGuard<'_, VariableState> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl VariableStore {
    pub fn new(max_variables: usize) -> VariableStore {
        VariableStore {
            slots: ConcurrentArena::with_capacity(max_variables),
            num_bindings: AtomicU64::new(0),
            num_conflicts: AtomicU64::new(0),
            num_failures: AtomicU64::new(0),
        }
    }

    /// Allocates a fresh unbound variable.
    pub fn new_variable(&self) -> Result<VariableRef, RuntimeError> {
        self.slots
            .allocate()
            .map(|(index, _)| VariableRef::from_index(index))
            .ok_or(RuntimeError::ResourceExhausted {
                resource: Resource::Variables,
                limit: self.slots.capacity(),
            })
    }

    /// Allocates a variable which is immediately bound to `value`.
    pub fn new_bound(&self, value: Value) -> Result<VariableRef, RuntimeError> {
        let variable = self.new_variable()?;
        self.bind(variable, value)?;
        Ok(variable)
    }

    /// Builds a record whose fields are bound to `values`. Fields given as [`Value::Var`] are used
    /// as they are, so the record can contain holes.
    pub fn new_record(
        &self,
        label: impl Into<Atom>,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Value, RuntimeError> {
        let fields = values
            .into_iter()
            .map(|value| match value {
                Value::Var(variable) => Ok(variable),
                value => self.new_bound(value),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Value::Record(Record::new(label, fields)))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.len() == 0
    }

    fn slot(&self, variable: VariableRef) -> &VariableSlot {
        self.slots
            .get(variable.index())
            .expect("variable references are only created by the store which owns them")
    }

    /// Follows forwarding links to the representative of `variable`.
    pub fn resolve(&self, mut variable: VariableRef) -> VariableRef {
        loop {
            match *lock(self.slot(variable)) {
                VariableState::Forwarded(next) => {
                    rivulet_assert_moderate!(next < variable);
                    variable = next;
                }
                _ => return variable,
            }
        }
    }

    pub fn status(&self, variable: VariableRef) -> VariableStatus {
        let representative = self.resolve(variable);
        match &*lock(self.slot(representative)) {
            VariableState::Unbound { .. } => VariableStatus::Unbound,
            VariableState::Bound(value) => VariableStatus::Bound(value.clone()),
            VariableState::Failed(error) => VariableStatus::Failed(error.clone()),
            // Linked between resolving and locking.
            VariableState::Forwarded(next) => self.status(*next),
        }
    }

    /// The value of `variable` if it is bound.
    pub fn value(&self, variable: VariableRef) -> Option<Value> {
        match self.status(variable) {
            VariableStatus::Bound(value) => Some(value),
            _ => None,
        }
    }

    /// Binds `variable` to `value`.
    ///
    /// Binding a variable which is already bound to an equal value is a no-op. Records are unified
    /// field by field and [`Value::Var`] aliases the two variables. Field unifications which
    /// completed before a conflict was found are kept.
    pub fn bind(&self, variable: VariableRef, value: Value) -> Result<(), RuntimeError> {
        let mut pending = vec![(variable, value)];
        let mut linked: HashSet<(VariableRef, VariableRef)> = HashSet::default();

        while let Some((variable, value)) = pending.pop() {
            match value {
                Value::Var(other) => {
                    let pair = (self.resolve(variable), self.resolve(other));
                    let pair = (pair.0.min(pair.1), pair.0.max(pair.1));
                    if linked.insert(pair) {
                        self.link(pair.0, pair.1, &mut pending)?;
                    }
                }
                value => self.bind_value(variable, value, &mut pending)?,
            }
        }

        Ok(())
    }

    /// Unifies two variables.
    pub fn unify(&self, a: VariableRef, b: VariableRef) -> Result<(), RuntimeError> {
        self.bind(a, Value::Var(b))
    }

    fn bind_value(
        &self,
        variable: VariableRef,
        value: Value,
        pending: &mut Vec<(VariableRef, Value)>,
    ) -> Result<(), RuntimeError> {
        loop {
            let representative = self.resolve(variable);
            let mut state = lock(self.slot(representative));

            match &mut *state {
                VariableState::Forwarded(_) => continue,
                VariableState::Unbound { suspensions } => {
                    let suspensions = mem::take(suspensions);
                    *state = VariableState::Bound(value.clone());
                    drop(state);

                    self.wake(representative, suspensions, Determination::Bound(value));
                    return Ok(());
                }
                VariableState::Bound(existing) => {
                    let existing = existing.clone();
                    drop(state);

                    return self.compare(representative, existing, value, pending);
                }
                VariableState::Failed(error) => return Err(error.clone()),
            }
        }
    }

    /// Links two distinct representatives, `low < high`.
    fn link(
        &self,
        low: VariableRef,
        high: VariableRef,
        pending: &mut Vec<(VariableRef, Value)>,
    ) -> Result<(), RuntimeError> {
        let (mut low, mut high) = (low, high);

        loop {
            if low == high {
                return Ok(());
            }

            let mut low_state = lock(self.slot(low));
            let mut high_state = lock(self.slot(high));

            match (&mut *low_state, &mut *high_state) {
                (VariableState::Forwarded(_), _) | (_, VariableState::Forwarded(_)) => {
                    drop(high_state);
                    drop(low_state);

                    let (a, b) = (self.resolve(low), self.resolve(high));
                    (low, high) = (a.min(b), a.max(b));
                }
                (VariableState::Failed(error), _) | (_, VariableState::Failed(error)) => {
                    return Err(error.clone());
                }
                (
                    VariableState::Unbound { suspensions: low_waiters },
                    VariableState::Unbound { suspensions: high_waiters },
                ) => {
                    low_waiters.append(high_waiters);
                    *high_state = VariableState::Forwarded(low);
                    trace!("forwarded {high} to {low}");
                    return Ok(());
                }
                (VariableState::Unbound { suspensions }, VariableState::Bound(value)) => {
                    let suspensions = mem::take(suspensions);
                    let value = value.clone();
                    *low_state = VariableState::Bound(value.clone());
                    drop(high_state);
                    drop(low_state);

                    self.wake(low, suspensions, Determination::Bound(value));
                    return Ok(());
                }
                (VariableState::Bound(value), VariableState::Unbound { suspensions }) => {
                    let suspensions = mem::take(suspensions);
                    let value = value.clone();
                    *high_state = VariableState::Bound(value.clone());
                    drop(high_state);
                    drop(low_state);

                    self.wake(high, suspensions, Determination::Bound(value));
                    return Ok(());
                }
                (VariableState::Bound(existing), VariableState::Bound(attempted)) => {
                    let existing = existing.clone();
                    let attempted = attempted.clone();
                    drop(high_state);
                    drop(low_state);

                    return self.compare(high, existing, attempted, pending);
                }
            }
        }
    }

    /// Checks whether `attempted` is compatible with the existing binding of `variable`, queueing
    /// field unifications for records of the same shape.
    fn compare(
        &self,
        variable: VariableRef,
        existing: Value,
        attempted: Value,
        pending: &mut Vec<(VariableRef, Value)>,
    ) -> Result<(), RuntimeError> {
        match (&existing, &attempted) {
            (Value::Record(left), Value::Record(right)) if left.has_shape_of(right) => {
                pending.extend(
                    left.fields()
                        .iter()
                        .zip(right.fields())
                        .map(|(&left, &right)| (left, Value::Var(right))),
                );
                Ok(())
            }
            _ if existing == attempted => Ok(()),
            _ => {
                let _ = self.num_conflicts.fetch_add(1, Ordering::Relaxed);
                Err(RuntimeError::Conflict {
                    variable,
                    existing,
                    attempted,
                })
            }
        }
    }

    /// Puts `variable` into the failed state if it is still unbound. Returns whether it did.
    pub fn fail(&self, variable: VariableRef, error: RuntimeError) -> bool {
        loop {
            let representative = self.resolve(variable);
            let mut state = lock(self.slot(representative));

            match &mut *state {
                VariableState::Forwarded(_) => continue,
                VariableState::Unbound { suspensions } => {
                    let suspensions = mem::take(suspensions);
                    *state = VariableState::Failed(error.clone());
                    drop(state);

                    let _ = self.num_failures.fetch_add(1, Ordering::Relaxed);
                    self.wake(representative, suspensions, Determination::Failed(error));
                    return true;
                }
                VariableState::Bound(_) | VariableState::Failed(_) => return false,
            }
        }
    }

    fn wake(
        &self,
        variable: VariableRef,
        suspensions: Vec<Suspension>,
        determination: Determination,
    ) {
        if matches!(determination, Determination::Bound(_)) {
            let _ = self.num_bindings.fetch_add(1, Ordering::Relaxed);
        }

        trace!("{variable} determined, waking {} waiters", suspensions.len());
        for suspension in suspensions {
            suspension.resume(variable, &determination);
        }
    }

    /// Registers `waiter` on `variable`. If the variable is already determined nothing is
    /// registered and its determination is returned instead.
    pub(crate) fn suspend(
        &self,
        variable: VariableRef,
        waiter: Arc<dyn Waiter>,
        token: u64,
    ) -> Option<Determination> {
        self.register(variable, Suspension::Waiter { waiter, token })
            .err()
            .map(|(_, determination)| determination)
    }

    /// Removes every registration of the waiter with the given id from `variable`.
    pub(crate) fn unregister(&self, variable: VariableRef, waiter_id: u64) {
        loop {
            let representative = self.resolve(variable);
            let mut state = lock(self.slot(representative));
            if matches!(*state, VariableState::Forwarded(_)) {
                continue;
            }

            state.remove_waiter(waiter_id);
            return;
        }
    }

    /// Calls `watcher` once `variable` is bound or failed, immediately if it already is.
    pub fn when_determined(
        &self,
        variable: VariableRef,
        watcher: impl FnOnce(VariableRef, &Determination) + Send + 'static,
    ) {
        if let Err((suspension, determination)) =
            self.register(variable, Suspension::Watcher(Box::new(watcher)))
        {
            suspension.resume(variable, &determination);
        }
    }

    /// Appends `suspension` to the suspension list of `variable`, or hands it back together with
    /// the determination when the variable is no longer unbound.
    fn register(
        &self,
        variable: VariableRef,
        suspension: Suspension,
    ) -> Result<(), (Suspension, Determination)> {
        loop {
            let representative = self.resolve(variable);
            let mut state = lock(self.slot(representative));

            let determination = match &mut *state {
                VariableState::Forwarded(_) => continue,
                VariableState::Unbound { suspensions } => {
                    suspensions.push(suspension);
                    return Ok(());
                }
                VariableState::Bound(value) => Determination::Bound(value.clone()),
                VariableState::Failed(error) => Determination::Failed(error.clone()),
            };

            return Err((suspension, determination));
        }
    }

    /// Blocks the calling OS thread until `variable` is determined or the timeout expires.
    ///
    /// Meant for host code driving the runtime from outside; lightweight threads suspend through
    /// their [`ThreadContext`](crate::scheduler::ThreadContext) instead.
    pub fn wait_determined(
        &self,
        variable: VariableRef,
        timeout: Option<Duration>,
    ) -> Option<Determination> {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        self.when_determined(variable, move |_, determination| {
            let _ = sender.send(determination.clone());
        });

        match timeout {
            Some(timeout) => receiver.recv_timeout(timeout).ok(),
            None => receiver.recv().ok(),
        }
    }

    pub fn statistics(&self) -> StoreStatistics {
        StoreStatistics {
            num_variables: self.len() as u64,
            num_bindings: self.num_bindings.load(Ordering::Relaxed),
            num_conflicts: self.num_conflicts.load(Ordering::Relaxed),
            num_failures: self.num_failures.load(Ordering::Relaxed),
        }
    }

    pub fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics().log(statistic_logger);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn store() -> VariableStore {
        VariableStore::new(1 << 16)
    }

    #[test]
    fn binding_an_unbound_variable_succeeds() {
        let store = store();
        let x = store.new_variable().unwrap();

        assert_eq!(VariableStatus::Unbound, store.status(x));
        store.bind(x, Value::Int(3)).unwrap();
        assert_eq!(Some(Value::Int(3)), store.value(x));
    }

    #[test]
    fn rebinding_to_an_equal_value_is_a_no_op() {
        let store = store();
        let x = store.new_bound(Value::atom("a")).unwrap();

        assert!(store.bind(x, Value::atom("a")).is_ok());
        assert_eq!(Some(Value::atom("a")), store.value(x));
    }

    #[test]
    fn rebinding_to_a_different_value_conflicts() {
        let store = store();
        let x = store.new_bound(Value::Int(1)).unwrap();

        let result = store.bind(x, Value::Int(2));

        assert_eq!(
            Err(RuntimeError::Conflict {
                variable: x,
                existing: Value::Int(1),
                attempted: Value::Int(2),
            }),
            result
        );
        assert_eq!(Some(Value::Int(1)), store.value(x));
        assert_eq!(1, store.statistics().num_conflicts);
    }

    #[test]
    fn unified_variables_share_their_binding() {
        let store = store();
        let x = store.new_variable().unwrap();
        let y = store.new_variable().unwrap();

        store.unify(y, x).unwrap();
        assert_eq!(x, store.resolve(y));

        store.bind(y, Value::Int(7)).unwrap();
        assert_eq!(Some(Value::Int(7)), store.value(x));
        assert!(store.bind(x, Value::Int(8)).is_err());
    }

    #[test]
    fn unifying_with_a_bound_variable_binds() {
        let store = store();
        let x = store.new_bound(Value::Int(5)).unwrap();
        let y = store.new_variable().unwrap();

        store.unify(x, y).unwrap();

        assert_eq!(Some(Value::Int(5)), store.value(y));
    }

    #[test]
    fn records_are_unified_field_by_field() {
        let store = store();
        let a = store.new_variable().unwrap();
        let b = store.new_variable().unwrap();

        let left = store
            .new_record("pair", [Value::Var(a), Value::Int(2)])
            .unwrap();
        let right = store
            .new_record("pair", [Value::Int(1), Value::Var(b)])
            .unwrap();

        let x = store.new_bound(left).unwrap();
        store.bind(x, right).unwrap();

        assert_eq!(Some(Value::Int(1)), store.value(a));
        assert_eq!(Some(Value::Int(2)), store.value(b));
    }

    #[test]
    fn records_with_different_labels_conflict() {
        let store = store();
        let left = store.new_record("f", [Value::Int(1)]).unwrap();
        let right = store.new_record("g", [Value::Int(1)]).unwrap();

        let x = store.new_bound(left).unwrap();

        assert!(matches!(
            store.bind(x, right),
            Err(RuntimeError::Conflict { .. })
        ));
    }

    #[test]
    fn cyclic_records_unify_without_looping() {
        let store = store();
        let x = store.new_variable().unwrap();
        let y = store.new_variable().unwrap();

        store.bind(x, Value::Record(Record::new("f", [x]))).unwrap();
        store.bind(y, Value::Record(Record::new("f", [y]))).unwrap();

        assert!(store.unify(x, y).is_ok());
    }

    #[test]
    fn watchers_fire_once_on_binding() {
        let store = store();
        let x = store.new_variable().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_by_watcher = Arc::clone(&seen);
        store.when_determined(x, move |_, determination| {
            seen_by_watcher.lock().unwrap().push(determination.clone());
        });

        store.bind(x, Value::Unit).unwrap();
        store.bind(x, Value::Unit).unwrap();

        assert_eq!(
            vec![Determination::Bound(Value::Unit)],
            *seen.lock().unwrap()
        );
    }

    #[test]
    fn watchers_move_to_the_representative() {
        let store = store();
        let x = store.new_variable().unwrap();
        let y = store.new_variable().unwrap();
        let seen = Arc::new(Mutex::new(None));

        let seen_by_watcher = Arc::clone(&seen);
        store.when_determined(y, move |variable, _| {
            *seen_by_watcher.lock().unwrap() = Some(variable);
        });

        store.unify(x, y).unwrap();
        store.bind(x, Value::Int(0)).unwrap();

        assert_eq!(Some(x), *seen.lock().unwrap());
    }

    #[test]
    fn failing_a_variable_wakes_waiters_with_the_error() {
        let store = store();
        let x = store.new_variable().unwrap();

        assert!(store.fail(x, RuntimeError::Cancelled));
        assert!(!store.fail(x, RuntimeError::Cancelled));

        assert_eq!(
            Some(Determination::Failed(RuntimeError::Cancelled)),
            store.wait_determined(x, Some(Duration::from_millis(10)))
        );
        assert_eq!(Err(RuntimeError::Cancelled), store.bind(x, Value::Unit));
    }

    #[test]
    fn allocation_past_the_ceiling_is_reported() {
        let store = VariableStore::new(2);
        let _ = store.new_variable().unwrap();
        let _ = store.new_variable().unwrap();

        assert_eq!(
            Err(RuntimeError::ResourceExhausted {
                resource: Resource::Variables,
                limit: 2,
            }),
            store.new_variable()
        );
    }

    #[test]
    fn concurrent_binders_see_exactly_one_winner() {
        let store = Arc::new(store());
        let x = store.new_variable().unwrap();

        let handles = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.bind(x, Value::Int(i)).is_ok())
            })
            .collect::<Vec<_>>();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(1, winners);
    }

    #[test]
    fn waiting_times_out_on_unbound_variables() {
        let store = store();
        let x = store.new_variable().unwrap();

        assert_eq!(None, store.wait_determined(x, Some(Duration::from_millis(5))));
    }
}
