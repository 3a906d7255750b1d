use std::fmt::Display;
use std::fmt::Formatter;
use std::mem;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::Weak;

use log::debug;

use super::group::ComputationGroup;
use super::worker_pool::SchedulerShared;
use super::Computation;
use crate::basic_types::RuntimeError;
use crate::rivulet_assert_simple;
use crate::store::Determination;
use crate::store::Value;
use crate::store::VariableRef;
use crate::store::VariableStore;
use crate::store::Waiter;

/// Identifies a lightweight thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub(crate) u64);

impl Display for ThreadId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Observable state of a lightweight thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThreadStatus {
    /// Queued or currently running on a worker.
    Runnable,
    Blocked { on: Vec<VariableRef> },
    Terminated,
    Failed(RuntimeError),
}

enum ThreadState {
    Runnable,
    Running,
    Blocked {
        pending: usize,
        awaiting: Vec<VariableRef>,
    },
    Terminated,
    Failed(RuntimeError),
}

struct ThreadInner {
    state: ThreadState,
    /// Bumped every time the thread blocks; suspensions carry the epoch they were made in so
    /// wake-ups from an earlier block are recognised and dropped.
    epoch: u64,
    computation: Option<Box<dyn Computation>>,
    /// Variables this thread is the sole producer of.
    outputs: Vec<VariableRef>,
    /// Allocated on first request only.
    termination: Option<VariableRef>,
}

impl ThreadInner {
    fn is_finished(&self) -> bool {
        matches!(self.state, ThreadState::Terminated | ThreadState::Failed(_))
    }
}

/// What the worker decided after a quantum.
pub(crate) enum Continuation {
    Yield,
    Block(Vec<VariableRef>),
}

/// The outcome of handing a thread back after a quantum.
pub(crate) enum Requeue {
    /// The thread yielded and should go to the back of the run queue.
    Runnable,
    /// The thread blocked in the given epoch and still has to register its suspensions.
    Blocked(u64),
    /// The group of the thread was cancelled while it ran.
    Cancelled,
}

/// Control block of a lightweight thread, shared between the run queues, the suspension lists of
/// the variables it awaits, and its [`ThreadHandle`].
pub(crate) struct ThreadControl {
    id: ThreadId,
    group: Option<Arc<ComputationGroup>>,
    scheduler: Weak<SchedulerShared>,
    inner: Mutex<ThreadInner>,
}

impl std::fmt::Debug for ThreadControl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadControl")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl ThreadControl {
    pub(crate) fn new(
        id: ThreadId,
        group: Option<Arc<ComputationGroup>>,
        scheduler: Weak<SchedulerShared>,
        computation: Box<dyn Computation>,
        outputs: Vec<VariableRef>,
    ) -> ThreadControl {
        ThreadControl {
            id,
            group,
            scheduler,
            inner: Mutex::new(ThreadInner {
                state: ThreadState::Runnable,
                epoch: 0,
                computation: Some(computation),
                outputs,
                termination: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ThreadInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn id(&self) -> ThreadId {
        self.id
    }

    pub(crate) fn group(&self) -> Option<&Arc<ComputationGroup>> {
        self.group.as_ref()
    }

    /// The termination variable of the thread, allocating it on the first call. A thread which
    /// already finished gets a variable that is determined right away.
    pub(crate) fn termination(&self) -> Result<VariableRef, RuntimeError> {
        let shared = self.scheduler.upgrade().ok_or(RuntimeError::Cancelled)?;

        let (termination, outcome) = {
            let mut inner = self.lock();
            if let Some(termination) = inner.termination {
                return Ok(termination);
            }

            let termination = shared.store().new_variable()?;
            inner.termination = Some(termination);
            let outcome = match &inner.state {
                ThreadState::Terminated => Some(Ok(())),
                ThreadState::Failed(error) => Some(Err(error.clone())),
                _ => None,
            };
            (termination, outcome)
        };

        if let Some(outcome) = outcome {
            resolve_termination(shared.store(), termination, &outcome);
        }
        Ok(termination)
    }

    fn is_cancelled(&self) -> bool {
        self.group
            .as_ref()
            .is_some_and(|group| group.is_cancelled())
    }

    pub(crate) fn status(&self) -> ThreadStatus {
        match &self.lock().state {
            ThreadState::Runnable | ThreadState::Running => ThreadStatus::Runnable,
            ThreadState::Blocked { awaiting, .. } => ThreadStatus::Blocked {
                on: awaiting.clone(),
            },
            ThreadState::Terminated => ThreadStatus::Terminated,
            ThreadState::Failed(error) => ThreadStatus::Failed(error.clone()),
        }
    }

    pub(crate) fn declare_output(&self, variable: VariableRef) {
        self.lock().outputs.push(variable);
    }

    /// Claims the continuation for a quantum. Returns `None` for queue entries that went stale
    /// because the thread was cancelled while it was queued.
    pub(crate) fn begin_quantum(&self) -> Option<Box<dyn Computation>> {
        let mut inner = self.lock();
        if !matches!(inner.state, ThreadState::Runnable) {
            return None;
        }

        inner.state = ThreadState::Running;
        inner.computation.take()
    }

    /// Hands the continuation back after a quantum which did not finish the thread.
    pub(crate) fn end_quantum(
        &self,
        computation: Box<dyn Computation>,
        continuation: Continuation,
    ) -> Requeue {
        let mut inner = self.lock();
        rivulet_assert_simple!(matches!(inner.state, ThreadState::Running));

        if self.is_cancelled() {
            return Requeue::Cancelled;
        }

        inner.computation = Some(computation);
        match continuation {
            Continuation::Yield => {
                inner.state = ThreadState::Runnable;
                Requeue::Runnable
            }
            Continuation::Block(awaiting) => {
                inner.epoch += 1;
                inner.state = ThreadState::Blocked {
                    pending: awaiting.len(),
                    awaiting,
                };
                Requeue::Blocked(inner.epoch)
            }
        }
    }

    pub(crate) fn is_blocked_at(&self, epoch: u64) -> bool {
        let inner = self.lock();
        inner.epoch == epoch && matches!(inner.state, ThreadState::Blocked { .. })
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.lock().is_finished()
    }

    /// Moves the thread to its final state, resolving its termination variable and failing its
    /// outputs on error. Returns false if the thread had already finished.
    pub(crate) fn finish(
        &self,
        shared: &SchedulerShared,
        outcome: Result<(), RuntimeError>,
    ) -> bool {
        let (computation, outputs, termination) = {
            let mut inner = self.lock();
            if inner.is_finished() {
                return false;
            }

            inner.state = match &outcome {
                Ok(()) => ThreadState::Terminated,
                Err(error) => ThreadState::Failed(error.clone()),
            };
            (
                inner.computation.take(),
                mem::take(&mut inner.outputs),
                inner.termination,
            )
        };
        drop(computation);

        let store = shared.store();
        if let Err(error) = &outcome {
            for output in outputs {
                let _ = store.fail(output, error.clone());
            }
        }
        if let Some(termination) = termination {
            resolve_termination(store, termination, &outcome);
        }

        if let Some(group) = &self.group {
            group.leave(self.id);
        }
        shared.thread_finished(self.id, outcome.err());
        true
    }

    /// Cancels the thread unless it is on a worker right now, in which case the worker notices
    /// the cancelled group when the quantum ends.
    pub(crate) fn cancel(&self, shared: &SchedulerShared) {
        let awaiting = {
            let mut inner = self.lock();
            match &mut inner.state {
                ThreadState::Running | ThreadState::Terminated | ThreadState::Failed(_) => return,
                ThreadState::Runnable => Vec::new(),
                ThreadState::Blocked { awaiting, .. } => mem::take(awaiting),
            }
        };

        for variable in awaiting {
            shared.store().unregister(variable, self.id.0);
        }

        if self.finish(shared, Err(RuntimeError::Cancelled)) {
            debug!("cancelled thread {}", self.id);
        }
    }
}

fn resolve_termination(
    store: &VariableStore,
    termination: VariableRef,
    outcome: &Result<(), RuntimeError>,
) {
    match outcome {
        Ok(()) => {
            let _ = store.bind(termination, Value::Unit);
        }
        Err(error) => {
            let _ = store.fail(termination, error.clone());
        }
    }
}

impl Waiter for ThreadControl {
    fn waiter_id(&self) -> u64 {
        self.id.0
    }

    fn wake(self: Arc<Self>, _variable: VariableRef, token: u64, determination: &Determination) {
        let Some(shared) = self.scheduler.upgrade() else {
            return;
        };

        {
            let mut inner = self.lock();
            if inner.epoch != token {
                return;
            }
            let ThreadState::Blocked { pending, awaiting } = &mut inner.state else {
                return;
            };

            let failed = matches!(determination, Determination::Failed(_));
            if !failed {
                *pending = pending.saturating_sub(1);
                if *pending > 0 {
                    return;
                }
            }

            let awaiting = mem::take(awaiting);
            inner.state = ThreadState::Runnable;

            // A failure resumes the thread early; its remaining suspensions must be gone before
            // it can block again.
            if failed {
                for variable in awaiting {
                    shared.store().unregister(variable, self.id.0);
                }
            }
        }

        shared.record_wakeup();
        shared.schedule(self);
    }
}

/// A handle to a spawned lightweight thread.
#[derive(Clone, Debug)]
pub struct ThreadHandle {
    control: Arc<ThreadControl>,
}

impl ThreadHandle {
    pub(crate) fn new(control: Arc<ThreadControl>) -> ThreadHandle {
        ThreadHandle { control }
    }

    pub fn id(&self) -> ThreadId {
        self.control.id()
    }

    /// A variable which is bound to [`Value::Unit`] when the thread terminates normally, and
    /// failed with the error of the thread otherwise.
    ///
    /// The variable is created on the first call, so threads whose termination nobody observes
    /// take no room in the store.
    pub fn termination(&self) -> Result<VariableRef, RuntimeError> {
        self.control.termination()
    }

    pub fn status(&self) -> ThreadStatus {
        self.control.status()
    }
}

#[cfg(test)]
mod tests {
    use std::mem::size_of;

    use super::*;
    use crate::store::Suspension;

    #[test]
    fn blocked_thread_overhead_stays_under_a_kilobyte() {
        // The shared control block with its reference counts, and the suspension left on the
        // awaited variable.
        let per_thread =
            2 * size_of::<usize>() + size_of::<ThreadControl>() + size_of::<Suspension>();

        assert!(per_thread < 1024, "{per_thread} bytes per blocked thread");
    }
}
