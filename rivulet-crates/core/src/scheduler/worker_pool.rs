use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use crossbeam_deque::Injector;
use crossbeam_deque::Stealer;
use crossbeam_deque::Worker;
use log::debug;
use log::info;
use log::warn;

use super::group::ComputationGroup;
use super::thread::ThreadControl;
use super::worker::run_worker;
use super::Computation;
use super::GroupId;
use super::ThreadHandle;
use super::ThreadId;
use crate::basic_types::Resource;
use crate::basic_types::RuntimeError;
use crate::containers::HashMap;
use crate::create_statistics_struct;
use crate::runtime::RuntimeOptions;
use crate::store::VariableRef;
use crate::store::VariableStore;

create_statistics_struct!(
    /// Counters maintained by the scheduler.
    SchedulerStatistics {
        num_spawned: u64,
        num_terminated: u64,
        num_failed: u64,
        num_cancelled: u64,
        num_suspensions: u64,
        num_wakeups: u64,
        num_yields: u64,
        num_steals: u64,
    }
);

/// A thread which finished with an error, kept so the host can report it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadFailure {
    pub thread: ThreadId,
    pub error: RuntimeError,
}

impl Display for ThreadFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "thread {} failed: {}", self.thread, self.error)
    }
}

#[derive(Debug, Default)]
struct SchedulerCounters {
    num_spawned: AtomicU64,
    num_terminated: AtomicU64,
    num_failed: AtomicU64,
    num_cancelled: AtomicU64,
    num_suspensions: AtomicU64,
    num_wakeups: AtomicU64,
    num_yields: AtomicU64,
    num_steals: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    let _ = counter.fetch_add(1, Ordering::Relaxed);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared by the workers, the thread control blocks and the host.
pub(crate) struct SchedulerShared {
    store: Arc<VariableStore>,
    injector: Injector<Arc<ThreadControl>>,
    stealers: Vec<Stealer<Arc<ThreadControl>>>,
    groups: Mutex<HashMap<GroupId, Arc<ComputationGroup>>>,
    next_thread_id: AtomicU64,
    next_group_id: AtomicU64,
    live_threads: AtomicUsize,
    max_threads: usize,
    /// Threads which are queued or on a worker. Zero means the runtime is quiescent.
    active: AtomicUsize,
    quiescence_lock: Mutex<()>,
    quiescent: Condvar,
    sleepers: AtomicUsize,
    sleep_lock: Mutex<()>,
    work_available: Condvar,
    idle_spins: usize,
    steal_batch_size: usize,
    shutdown: AtomicBool,
    failures: Mutex<Vec<ThreadFailure>>,
    counters: SchedulerCounters,
}

impl std::fmt::Debug for SchedulerShared {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerShared")
            .field("live_threads", &self.live_threads)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl SchedulerShared {
    pub(crate) fn store(&self) -> &VariableStore {
        &self.store
    }

    pub(crate) fn injector(&self) -> &Injector<Arc<ThreadControl>> {
        &self.injector
    }

    pub(crate) fn stealers(&self) -> &[Stealer<Arc<ThreadControl>>] {
        &self.stealers
    }

    pub(crate) fn idle_spins(&self) -> usize {
        self.idle_spins
    }

    pub(crate) fn steal_batch_size(&self) -> usize {
        self.steal_batch_size
    }

    pub(crate) fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    pub(crate) fn spawn(
        self: &Arc<Self>,
        group: Option<Arc<ComputationGroup>>,
        outputs: Vec<VariableRef>,
        computation: Box<dyn Computation>,
        local: Option<&Worker<Arc<ThreadControl>>>,
    ) -> Result<ThreadHandle, RuntimeError> {
        if group.as_ref().is_some_and(|group| group.is_cancelled()) {
            return Err(RuntimeError::Cancelled);
        }

        let max_threads = self.max_threads;
        let _ = self
            .live_threads
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                (live < max_threads).then_some(live + 1)
            })
            .map_err(|_| RuntimeError::ResourceExhausted {
                resource: Resource::Threads,
                limit: max_threads,
            })?;

        let id = ThreadId(self.next_thread_id.fetch_add(1, Ordering::Relaxed));
        let control = Arc::new(ThreadControl::new(
            id,
            group.clone(),
            Arc::downgrade(self),
            computation,
            outputs,
        ));

        if let Some(group) = &group {
            if !group.join(id, Arc::downgrade(&control)) {
                let _ = control.finish(self, Err(RuntimeError::Cancelled));
                return Err(RuntimeError::Cancelled);
            }
        }

        bump(&self.counters.num_spawned);
        let _ = self.active.fetch_add(1, Ordering::AcqRel);
        let handle = ThreadHandle::new(Arc::clone(&control));
        match local {
            Some(local) => local.push(control),
            None => {
                self.injector.push(control);
                self.notify_sleeper();
            }
        }

        Ok(handle)
    }

    /// Queues a thread which became runnable again.
    pub(crate) fn schedule(&self, thread: Arc<ThreadControl>) {
        let _ = self.active.fetch_add(1, Ordering::AcqRel);
        self.injector.push(thread);
        self.notify_sleeper();
    }

    /// A queued or running thread left the run queues.
    pub(crate) fn deactivate(&self) {
        if self.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _guard = lock(&self.quiescence_lock);
            self.quiescent.notify_all();
        }
    }

    fn notify_sleeper(&self) {
        if self.sleepers.load(Ordering::Acquire) > 0 {
            let _guard = lock(&self.sleep_lock);
            self.work_available.notify_one();
        }
    }

    /// Parks an idle worker until work is queued or the timeout passes.
    pub(crate) fn park(&self, timeout: Duration) {
        let guard = lock(&self.sleep_lock);
        let _ = self.sleepers.fetch_add(1, Ordering::AcqRel);
        if self.injector.is_empty() && !self.is_shut_down() {
            let _ = self
                .work_available
                .wait_timeout(guard, timeout)
                .unwrap_or_else(PoisonError::into_inner);
        }
        let _ = self.sleepers.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn thread_finished(&self, thread: ThreadId, error: Option<RuntimeError>) {
        let _ = self.live_threads.fetch_sub(1, Ordering::AcqRel);

        match error {
            None => bump(&self.counters.num_terminated),
            Some(RuntimeError::Cancelled) => bump(&self.counters.num_cancelled),
            Some(error) => {
                bump(&self.counters.num_failed);
                warn!("thread {thread} failed: {error}");
                lock(&self.failures).push(ThreadFailure { thread, error });
            }
        }
    }

    pub(crate) fn record_wakeup(&self) {
        bump(&self.counters.num_wakeups);
    }

    pub(crate) fn record_suspension(&self) {
        bump(&self.counters.num_suspensions);
    }

    pub(crate) fn record_yield(&self) {
        bump(&self.counters.num_yields);
    }

    pub(crate) fn record_steal(&self) {
        bump(&self.counters.num_steals);
    }
}

/// Multiplexes lightweight threads onto a fixed pool of worker OS threads.
///
/// Each worker owns a FIFO queue; threads spawned from a worker go to its queue, threads spawned
/// or woken from anywhere else go to a shared injector. Idle workers take from the injector and
/// steal from each other.
#[derive(Debug)]
pub(crate) struct Scheduler {
    shared: Arc<SchedulerShared>,
    workers: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub(crate) fn new(store: Arc<VariableStore>, options: &RuntimeOptions) -> Scheduler {
        let num_workers = options.num_workers.max(1);
        let locals = (0..num_workers)
            .map(|_| Worker::new_fifo())
            .collect::<Vec<_>>();

        let shared = Arc::new(SchedulerShared {
            store,
            injector: Injector::new(),
            stealers: locals.iter().map(Worker::stealer).collect(),
            groups: Mutex::default(),
            next_thread_id: AtomicU64::new(0),
            next_group_id: AtomicU64::new(1),
            live_threads: AtomicUsize::new(0),
            max_threads: options.max_threads,
            active: AtomicUsize::new(0),
            quiescence_lock: Mutex::new(()),
            quiescent: Condvar::new(),
            sleepers: AtomicUsize::new(0),
            sleep_lock: Mutex::new(()),
            work_available: Condvar::new(),
            idle_spins: options.idle_spins,
            steal_batch_size: options.steal_batch_size.max(1),
            shutdown: AtomicBool::new(false),
            failures: Mutex::default(),
            counters: SchedulerCounters::default(),
        });

        let workers = locals
            .into_iter()
            .enumerate()
            .filter_map(|(index, local)| {
                let shared = Arc::clone(&shared);
                std::thread::Builder::new()
                    .name(format!("rivulet-worker-{index}"))
                    .spawn(move || run_worker(shared, local, index))
                    .inspect_err(|error| warn!("could not start worker {index}: {error}"))
                    .ok()
            })
            .collect::<Vec<_>>();

        info!("started scheduler with {} workers", workers.len());

        Scheduler { shared, workers }
    }

    pub(crate) fn spawn(
        &self,
        group: GroupId,
        outputs: Vec<VariableRef>,
        computation: Box<dyn Computation>,
    ) -> Result<ThreadHandle, RuntimeError> {
        let group = if group == GroupId::ROOT {
            None
        } else {
            let groups = lock(&self.shared.groups);
            Some(Arc::clone(groups.get(&group).ok_or(RuntimeError::Cancelled)?))
        };

        self.shared.spawn(group, outputs, computation, None)
    }

    pub(crate) fn new_group(&self) -> GroupId {
        let id = GroupId(self.shared.next_group_id.fetch_add(1, Ordering::Relaxed));
        let _ = lock(&self.shared.groups).insert(id, Arc::new(ComputationGroup::new(id)));
        id
    }

    /// Cancels every thread of `group`. Returns how many live threads were reached.
    pub(crate) fn cancel(&self, group: GroupId) -> usize {
        let Some(group) = lock(&self.shared.groups).remove(&group) else {
            return 0;
        };

        let members = group.cancel();
        let num_members = members.len();
        for member in members.iter().filter_map(|member| member.upgrade()) {
            member.cancel(&self.shared);
        }

        debug!("cancelled group {} with {num_members} threads", group.id());
        num_members
    }

    pub(crate) fn num_live_threads(&self) -> usize {
        self.shared.live_threads.load(Ordering::Acquire)
    }

    /// Blocks until no thread is runnable, or the timeout passes. Returns whether the runtime
    /// became quiescent.
    pub(crate) fn wait_quiescent(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut guard = lock(&self.shared.quiescence_lock);

        loop {
            if self.shared.active.load(Ordering::Acquire) == 0 {
                return true;
            }

            // Re-check periodically; a worker may have finished between the load and the wait.
            let mut wait = Duration::from_millis(10);
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                wait = wait.min(deadline - now);
            }

            guard = self
                .shared
                .quiescent
                .wait_timeout(guard, wait)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub(crate) fn take_failures(&self) -> Vec<ThreadFailure> {
        std::mem::take(&mut *lock(&self.shared.failures))
    }

    pub(crate) fn statistics(&self) -> SchedulerStatistics {
        let counters = &self.shared.counters;
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        SchedulerStatistics {
            num_spawned: load(&counters.num_spawned),
            num_terminated: load(&counters.num_terminated),
            num_failed: load(&counters.num_failed),
            num_cancelled: load(&counters.num_cancelled),
            num_suspensions: load(&counters.num_suspensions),
            num_wakeups: load(&counters.num_wakeups),
            num_yields: load(&counters.num_yields),
            num_steals: load(&counters.num_steals),
        }
    }

    pub(crate) fn shutdown(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        {
            let _guard = lock(&self.shared.sleep_lock);
            self.shared.work_available.notify_all();
        }

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("a worker panicked during shutdown");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
