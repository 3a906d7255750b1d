use std::sync::Arc;
use std::time::Duration;

use crossbeam_deque::Steal;
use crossbeam_deque::Worker;

use super::thread::Continuation;
use super::thread::Requeue;
use super::thread::ThreadControl;
use super::worker_pool::SchedulerShared;
use super::Interrupt;
use super::Step;
use super::ThreadContext;
use crate::basic_types::RuntimeError;
use crate::store::VariableRef;
use crate::store::Waiter;

/// Every this many quanta a worker looks at the shared queue before its own, so threads spawned
/// or woken from outside are not starved by a busy local queue.
const GLOBAL_QUEUE_INTERVAL: u64 = 61;

pub(crate) fn run_worker(shared: Arc<SchedulerShared>, local: Worker<Arc<ThreadControl>>, index: usize) {
    let mut idle_rounds = 0;
    let mut ticks: u64 = 0;

    while !shared.is_shut_down() {
        ticks = ticks.wrapping_add(1);

        match find_thread(&shared, &local, index, ticks) {
            Some(thread) => {
                idle_rounds = 0;
                run_quantum(&shared, &local, thread);
            }
            None => {
                backoff(&shared, idle_rounds);
                idle_rounds += 1;
            }
        }
    }
}

fn find_thread(
    shared: &SchedulerShared,
    local: &Worker<Arc<ThreadControl>>,
    index: usize,
    ticks: u64,
) -> Option<Arc<ThreadControl>> {
    if ticks % GLOBAL_QUEUE_INTERVAL == 0 {
        if let Steal::Success(thread) = shared.injector().steal() {
            return Some(thread);
        }
    }

    local.pop().or_else(|| loop {
        match shared
            .injector()
            .steal_batch_with_limit_and_pop(local, shared.steal_batch_size())
        {
            Steal::Success(thread) => return Some(thread),
            Steal::Retry => continue,
            Steal::Empty => {}
        }

        let stolen = shared
            .stealers()
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != index)
            .map(|(_, stealer)| stealer.steal())
            .collect::<Steal<_>>();

        match stolen {
            Steal::Success(thread) => {
                shared.record_steal();
                return Some(thread);
            }
            Steal::Retry => continue,
            Steal::Empty => return None,
        }
    })
}

/// Yield first, then sleep in growing steps, then park until work shows up.
fn backoff(shared: &SchedulerShared, idle_rounds: usize) {
    let idle_spins = shared.idle_spins();

    if idle_rounds < idle_spins {
        std::thread::yield_now();
    } else if idle_rounds < idle_spins * 10 {
        std::thread::sleep(Duration::from_micros(10));
    } else {
        shared.park(Duration::from_millis(1));
    }
}

fn run_quantum(
    shared: &Arc<SchedulerShared>,
    local: &Worker<Arc<ThreadControl>>,
    thread: Arc<ThreadControl>,
) {
    let Some(mut computation) = thread.begin_quantum() else {
        shared.deactivate();
        return;
    };

    let mut context = ThreadContext::new(shared, &thread, Some(local));
    let result = computation.step(&mut context);
    let mut awaiting = context.into_awaiting();

    let continuation = match result {
        Ok(Step::Done) => {
            drop(computation);
            let _ = thread.finish(shared, Ok(()));
            shared.deactivate();
            return;
        }
        Err(Interrupt::Fail(error)) => {
            drop(computation);
            let _ = thread.finish(shared, Err(error));
            shared.deactivate();
            return;
        }
        Ok(Step::Yield) => {
            shared.record_yield();
            Continuation::Yield
        }
        Err(Interrupt::Suspend) if awaiting.is_empty() => Continuation::Yield,
        Err(Interrupt::Suspend) => {
            awaiting.sort_unstable();
            awaiting.dedup();
            Continuation::Block(awaiting.clone())
        }
    };

    match thread.end_quantum(computation, continuation) {
        Requeue::Runnable => local.push(thread),
        Requeue::Cancelled => {
            let _ = thread.finish(shared, Err(RuntimeError::Cancelled));
            shared.deactivate();
        }
        Requeue::Blocked(epoch) => {
            register_suspensions(shared, &thread, epoch, &awaiting);
            shared.record_suspension();
            shared.deactivate();
        }
    }
}

/// Puts a freshly blocked thread on the suspension list of everything it awaits. Variables which
/// are already determined count as a wake-up straight away.
fn register_suspensions(
    shared: &SchedulerShared,
    thread: &Arc<ThreadControl>,
    epoch: u64,
    awaiting: &[VariableRef],
) {
    for &variable in awaiting {
        if !thread.is_blocked_at(epoch) {
            break;
        }

        let waiter: Arc<dyn Waiter> = Arc::<ThreadControl>::clone(thread);
        if let Some(determination) = shared.store().suspend(variable, waiter, epoch) {
            Arc::clone(thread).wake(variable, epoch, &determination);
        }
    }

    // Cancelled while registering: nothing may keep pointing at the thread.
    if thread.is_finished() {
        for &variable in awaiting {
            shared.store().unregister(variable, thread.id().0);
        }
    }
}
