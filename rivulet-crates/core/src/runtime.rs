//! The [`Runtime`] ties a [`VariableStore`] and a [`Scheduler`] together for the lifetime of a
//! program: identities of variables and threads are handed out by these two and are torn down with
//! them.
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use log::info;

use crate::basic_types::RuntimeError;
use crate::engine::Solution;
use crate::scheduler::Computation;
use crate::scheduler::GroupId;
use crate::scheduler::Interrupt;
use crate::scheduler::Scheduler;
use crate::scheduler::SchedulerStatistics;
use crate::scheduler::Step;
use crate::scheduler::StepResult;
use crate::scheduler::ThreadContext;
use crate::scheduler::ThreadFailure;
use crate::scheduler::ThreadHandle;
use crate::search::SearchState;
use crate::search::SearchStep;
use crate::search::SearchTask;
use crate::statistics::should_log_statistics;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::store::Determination;
use crate::store::Value;
use crate::store::VariableRef;
use crate::store::VariableStatus;
use crate::store::VariableStore;

/// Label of the record a search thread binds its answer to when it found a solution.
const SOLUTION_LABEL: &str = "solution";
const VALUES_LABEL: &str = "values";
const EXHAUSTED: &str = "exhausted";
const FAILED: &str = "failed";
const UNKNOWN: &str = "unknown";

/// Limits and tuning of a [`Runtime`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Number of worker OS threads.
    pub num_workers: usize,
    /// Spawning beyond this many live lightweight threads fails with
    /// [`RuntimeError::ResourceExhausted`].
    pub max_threads: usize,
    /// Creating more variables than this fails with [`RuntimeError::ResourceExhausted`].
    pub max_variables: usize,
    /// The most threads an idle worker takes from the shared queue at once.
    pub steal_batch_size: usize,
    /// Number of idle rounds a worker spins before it starts sleeping.
    pub idle_spins: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        RuntimeOptions {
            num_workers: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            max_threads: 1 << 22,
            max_variables: 1 << 24,
            steal_batch_size: 32,
            idle_spins: 64,
        }
    }
}

/// A running instance of the dataflow runtime.
///
/// Dropping the runtime stops its workers; threads which have not finished by then are abandoned.
#[derive(Debug)]
pub struct Runtime {
    store: Arc<VariableStore>,
    scheduler: Scheduler,
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new(RuntimeOptions::default())
    }
}

impl Runtime {
    pub fn new(options: RuntimeOptions) -> Runtime {
        let store = Arc::new(VariableStore::new(options.max_variables));
        let scheduler = Scheduler::new(Arc::clone(&store), &options);
        info!(
            "Runtime started: {} workers, at most {} threads and {} variables",
            options.num_workers.max(1),
            options.max_threads,
            options.max_variables
        );

        Runtime { store, scheduler }
    }

    pub fn store(&self) -> &Arc<VariableStore> {
        &self.store
    }

    pub fn new_variable(&self) -> Result<VariableRef, RuntimeError> {
        self.store.new_variable()
    }

    pub fn bind(&self, variable: VariableRef, value: impl Into<Value>) -> Result<(), RuntimeError> {
        self.store.bind(variable, value.into())
    }

    pub fn unify(&self, a: VariableRef, b: VariableRef) -> Result<(), RuntimeError> {
        self.store.unify(a, b)
    }

    pub fn status(&self, variable: VariableRef) -> VariableStatus {
        self.store.status(variable)
    }

    /// Spawns a thread outside of any cancellable group.
    pub fn spawn(&self, computation: impl Computation) -> Result<ThreadHandle, RuntimeError> {
        self.spawn_producing(GroupId::ROOT, Vec::new(), computation)
    }

    pub fn spawn_in(
        &self,
        group: GroupId,
        computation: impl Computation,
    ) -> Result<ThreadHandle, RuntimeError> {
        self.spawn_producing(group, Vec::new(), computation)
    }

    /// Spawns a thread in `group` which is the sole producer of `outputs`: when the thread fails
    /// or is cancelled, the outputs it did not bind fail with it.
    pub fn spawn_producing(
        &self,
        group: GroupId,
        outputs: Vec<VariableRef>,
        computation: impl Computation,
    ) -> Result<ThreadHandle, RuntimeError> {
        self.scheduler
            .spawn(group, outputs, Box::new(computation))
    }

    pub fn new_group(&self) -> GroupId {
        self.scheduler.new_group()
    }

    /// Cancels every live thread of `group` and prevents new threads from joining it. Returns the
    /// number of threads which were reached.
    pub fn cancel(&self, group: GroupId) -> usize {
        self.scheduler.cancel(group)
    }

    /// Blocks the calling OS thread until `variable` is determined or the timeout passes.
    pub fn wait_determined(
        &self,
        variable: VariableRef,
        timeout: Option<Duration>,
    ) -> Option<Determination> {
        self.store.wait_determined(variable, timeout)
    }

    /// Blocks until no thread is runnable. Blocked threads do not count.
    pub fn wait_quiescent(&self, timeout: Option<Duration>) -> bool {
        self.scheduler.wait_quiescent(timeout)
    }

    pub fn num_live_threads(&self) -> usize {
        self.scheduler.num_live_threads()
    }

    /// Failures of threads since the last call.
    pub fn take_failures(&self) -> Vec<ThreadFailure> {
        self.scheduler.take_failures()
    }

    pub fn statistics(&self) -> SchedulerStatistics {
        self.scheduler.statistics()
    }

    pub fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.scheduler
            .statistics()
            .log(statistic_logger.attach_to_prefix("scheduler"));
        self.store
            .log_statistics(statistic_logger.attach_to_prefix("store"));
    }

    /// Runs `task` as a lightweight thread in a group of its own.
    ///
    /// The thread performs one search step per quantum and only searches for the next solution
    /// once it is asked for it through the returned stream.
    pub fn spawn_search(&self, task: SearchTask) -> Result<SolutionStream, RuntimeError> {
        let group = self.new_group();
        let demand = self.new_variable()?;
        let answer = self.new_variable()?;

        let thread = SearchThread {
            task,
            demand,
            answer,
        };
        let handle = self.spawn_producing(group, vec![answer], thread)?;
        debug!("Search {} runs in group {group}", handle.id());

        Ok(SolutionStream {
            store: Arc::clone(&self.store),
            group,
            demand,
            answer,
        })
    }

    pub fn shutdown(mut self) {
        self.scheduler.shutdown();
        info!("Runtime shut down with {} variables", self.store.len());
    }
}

/// The computation behind [`Runtime::spawn_search`].
///
/// Waits for `demand` to be bound, then steps the search until it can bind `answer` to either a
/// `solution(values(..), NextDemand, NextAnswer)` record or one of the atoms `exhausted`, `failed`
/// and `unknown`.
struct SearchThread {
    task: SearchTask,
    demand: VariableRef,
    answer: VariableRef,
}

impl SearchThread {
    fn publish_solution(
        &mut self,
        context: &mut ThreadContext<'_>,
        solution: &Solution,
    ) -> Result<(), Interrupt> {
        let values = solution
            .get_domains()
            .map(|domain| {
                context
                    .store()
                    .new_bound(Value::Int(solution.get_integer_value(domain) as i64))
                    .map(Value::Var)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let values = context.new_record(VALUES_LABEL, values)?;

        let next_demand = context.new_variable()?;
        let next_answer = context.new_variable()?;
        context.declare_output(next_answer);

        let answer = context.new_record(
            SOLUTION_LABEL,
            [values, Value::Var(next_demand), Value::Var(next_answer)],
        )?;
        context.bind(self.answer, answer)?;

        self.demand = next_demand;
        self.answer = next_answer;
        Ok(())
    }

    fn log_statistics(&self, context: &ThreadContext<'_>) {
        if should_log_statistics() {
            self.task
                .log_statistics(StatisticLogger::new([context.thread_id()]));
        }
    }
}

impl Computation for SearchThread {
    fn step(&mut self, context: &mut ThreadContext<'_>) -> StepResult {
        let _ = context.read(self.demand)?;

        match self.task.step() {
            SearchStep::Continue => Ok(Step::Yield),
            SearchStep::Solution(solution) => {
                self.publish_solution(context, &solution)?;
                Ok(Step::Yield)
            }
            SearchStep::Finished => {
                self.log_statistics(context);
                let outcome = if self.task.state() == SearchState::Failed {
                    FAILED
                } else {
                    EXHAUSTED
                };
                context.bind(self.answer, Value::atom(outcome))?;
                Ok(Step::Done)
            }
            SearchStep::Stopped => {
                self.log_statistics(context);
                context.bind(self.answer, Value::atom(UNKNOWN))?;
                Ok(Step::Done)
            }
        }
    }
}

/// What a search running in the runtime answered when it was asked for its next solution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchAnswer {
    /// The values of every variable of the space, in the order in which they were created.
    Solution(Vec<i64>),
    /// The search space is exhausted. `had_solutions` tells whether any solution was ever found.
    NoSolution { had_solutions: bool },
    /// The termination condition of the search triggered.
    Unknown,
}

/// The host end of a search running in the runtime.
///
/// Solutions are computed on demand: the search thread stays blocked until
/// [`SolutionStream::next`] asks for the next solution.
#[derive(Debug)]
pub struct SolutionStream {
    store: Arc<VariableStore>,
    group: GroupId,
    demand: VariableRef,
    answer: VariableRef,
}

impl SolutionStream {
    /// The group the search thread runs in. Cancelling it stops the search.
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Asks for the next solution and waits for the answer.
    ///
    /// Returns `Ok(None)` when the timeout passes first; asking again keeps waiting for the same
    /// answer. Once the search is over every call returns the same final answer.
    pub fn next(&mut self, timeout: Option<Duration>) -> Result<Option<SearchAnswer>, RuntimeError> {
        self.store.bind(self.demand, Value::Unit)?;

        let answer = match self.store.wait_determined(self.answer, timeout) {
            None => return Ok(None),
            Some(Determination::Failed(error)) => return Err(error),
            Some(Determination::Bound(answer)) => answer,
        };

        match answer {
            Value::Record(record) if record.label().as_str() == SOLUTION_LABEL => {
                let (Some(values), Some(demand), Some(next)) =
                    (record.field(0), record.field(1), record.field(2))
                else {
                    return Err(malformed(&Value::Record(record)));
                };
                let solution = self.read_values(values)?;
                self.demand = demand;
                self.answer = next;
                Ok(Some(SearchAnswer::Solution(solution)))
            }
            Value::Atom(atom) => match atom.as_str() {
                EXHAUSTED => Ok(Some(SearchAnswer::NoSolution {
                    had_solutions: true,
                })),
                FAILED => Ok(Some(SearchAnswer::NoSolution {
                    had_solutions: false,
                })),
                UNKNOWN => Ok(Some(SearchAnswer::Unknown)),
                _ => Err(malformed(&Value::Atom(atom))),
            },
            other => Err(malformed(&other)),
        }
    }

    fn read_values(&self, values: VariableRef) -> Result<Vec<i64>, RuntimeError> {
        let record = match self.store.value(values) {
            Some(Value::Record(record)) => record,
            other => {
                return Err(malformed(&other.unwrap_or(Value::Var(values))));
            }
        };

        record
            .fields()
            .iter()
            .map(|&field| {
                self.store
                    .value(field)
                    .and_then(|value| value.as_int())
                    .ok_or_else(|| malformed(&Value::Var(field)))
            })
            .collect()
    }
}

fn malformed(value: &Value) -> RuntimeError {
    RuntimeError::Raised(format!("unexpected search answer {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints;
    use crate::constraints::Constraint;
    use crate::engine::ConstraintSpace;
    use crate::predicate;
    use crate::scheduler::ThreadStatus;
    use crate::search::SearchOptions;

    const TIMEOUT: Option<Duration> = Some(Duration::from_secs(10));

    fn small_runtime() -> Runtime {
        Runtime::new(RuntimeOptions {
            num_workers: 2,
            ..RuntimeOptions::default()
        })
    }

    #[test]
    fn bound_value_is_read_by_a_blocked_thread() {
        let runtime = small_runtime();
        let x = runtime.new_variable().unwrap();
        let y = runtime.new_variable().unwrap();

        let _ = runtime
            .spawn(move |context: &mut ThreadContext<'_>| -> StepResult {
                let value = context.read_int(x)?;
                context.bind(y, value + 1)?;
                Ok(Step::Done)
            })
            .unwrap();

        runtime.bind(x, 41).unwrap();

        assert_eq!(
            Some(Determination::Bound(Value::Int(42))),
            runtime.wait_determined(y, TIMEOUT)
        );
    }

    #[test]
    fn search_stream_produces_all_solutions_on_demand() {
        let runtime = small_runtime();
        let mut space = ConstraintSpace::default();
        let x = space.new_boolean();
        let y = space.new_boolean();
        constraints::not_all(vec![x, y]).post(&mut space).unwrap();

        let mut stream = runtime
            .spawn_search(SearchTask::new(space, SearchOptions::default()))
            .unwrap();

        let mut solutions = vec![];
        loop {
            match stream.next(TIMEOUT).unwrap() {
                Some(SearchAnswer::Solution(values)) => solutions.push(values),
                Some(SearchAnswer::NoSolution { had_solutions }) => {
                    assert!(had_solutions);
                    break;
                }
                other => panic!("unexpected answer {other:?}"),
            }
        }

        assert_eq!(vec![vec![0, 0], vec![0, 1], vec![1, 0]], solutions);
    }

    #[test]
    fn cancelling_a_search_fails_its_stream() {
        let runtime = small_runtime();
        let mut space = ConstraintSpace::default();
        let _ = space.new_bounded_integer(0, 1000);

        let mut stream = runtime
            .spawn_search(SearchTask::new(space, SearchOptions::default()))
            .unwrap();
        assert!(matches!(
            stream.next(TIMEOUT),
            Ok(Some(SearchAnswer::Solution(_)))
        ));

        let _ = runtime.cancel(stream.group());

        assert_eq!(Err(RuntimeError::Cancelled), stream.next(TIMEOUT));
    }

    #[test]
    fn spawning_beyond_the_ceiling_is_refused() {
        let runtime = Runtime::new(RuntimeOptions {
            num_workers: 1,
            max_threads: 2,
            ..RuntimeOptions::default()
        });
        let gate = runtime.new_variable().unwrap();
        let blocked = move |context: &mut ThreadContext<'_>| -> StepResult {
            let _ = context.read(gate)?;
            Ok(Step::Done)
        };

        let first = runtime.spawn(blocked).unwrap();
        let _ = runtime.spawn(blocked).unwrap();

        assert!(matches!(
            runtime.spawn(blocked),
            Err(RuntimeError::ResourceExhausted { limit: 2, .. })
        ));

        runtime.bind(gate, Value::Unit).unwrap();
        assert_eq!(
            Some(Determination::Bound(Value::Unit)),
            runtime.wait_determined(first.termination().unwrap(), TIMEOUT)
        );
    }

    #[test]
    fn unobserved_threads_take_no_variables() {
        let runtime = Runtime::new(RuntimeOptions {
            num_workers: 1,
            max_threads: 4,
            max_variables: 8,
            ..RuntimeOptions::default()
        });

        for _ in 0..32 {
            let _ = runtime
                .spawn(|_: &mut ThreadContext<'_>| -> StepResult { Ok(Step::Done) })
                .unwrap();
            assert!(runtime.wait_quiescent(TIMEOUT));
        }

        assert!(runtime.store().is_empty());
        assert_eq!(0, runtime.num_live_threads());
    }

    #[test]
    fn termination_observed_after_the_fact_is_determined() {
        let runtime = small_runtime();
        let handle = runtime
            .spawn(|_: &mut ThreadContext<'_>| -> StepResult {
                Err(Interrupt::raise("late"))
            })
            .unwrap();
        assert!(runtime.wait_quiescent(TIMEOUT));

        let termination = handle.termination().unwrap();

        assert_eq!(termination, handle.termination().unwrap());
        assert_eq!(
            VariableStatus::Failed(RuntimeError::Raised("late".to_owned())),
            runtime.status(termination)
        );
    }

    #[test]
    fn thread_waits_for_a_linked_domain_to_be_fixed() {
        let runtime = small_runtime();
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(0, 9);
        let y = space.new_bounded_integer(0, 9);
        constraints::equals(x, y).post(&mut space).unwrap();
        let fx = runtime.new_variable().unwrap();
        space.link(runtime.store(), x, fx).unwrap();
        let doubled = runtime.new_variable().unwrap();

        let reader = runtime
            .spawn(move |context: &mut ThreadContext<'_>| -> StepResult {
                let value = context.read_int(fx)?;
                context.bind(doubled, 2 * value)?;
                Ok(Step::Done)
            })
            .unwrap();
        assert!(runtime.wait_quiescent(TIMEOUT));
        assert!(matches!(reader.status(), ThreadStatus::Blocked { .. }));

        space.post_at_root(predicate!(y == 6)).unwrap();

        assert_eq!(
            Some(Determination::Bound(Value::Int(12))),
            runtime.wait_determined(doubled, TIMEOUT)
        );
    }
}
