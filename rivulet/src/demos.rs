//! Dataflow programs which exercise the scheduler.
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use rivulet_core::scheduler::Computation;
use rivulet_core::scheduler::GroupId;
use rivulet_core::scheduler::Interrupt;
use rivulet_core::scheduler::Step;
use rivulet_core::scheduler::StepResult;
use rivulet_core::scheduler::ThreadContext;
use rivulet_core::store::Determination;
use rivulet_core::store::Value;
use rivulet_core::store::VariableRef;
use rivulet_core::Runtime;
use rivulet_core::RuntimeError;

const CONS: &str = "cons";
const NIL: &str = "nil";

/// Spawns `num_threads` threads which all wait for one variable, then binds it. Returns how many
/// threads ran to completion.
pub fn fan_out(
    runtime: &Runtime,
    num_threads: usize,
    timeout: Option<Duration>,
) -> Result<usize, RuntimeError> {
    let gate = runtime.new_variable()?;
    let num_done = Arc::new(AtomicUsize::new(0));

    for _ in 0..num_threads {
        let num_done = Arc::clone(&num_done);
        let _ = runtime.spawn(move |context: &mut ThreadContext<'_>| -> StepResult {
            let _ = context.read(gate)?;
            let _ = num_done.fetch_add(1, Ordering::Relaxed);
            Ok(Step::Done)
        })?;
    }
    debug!("Spawned {num_threads} threads waiting on {gate}");

    runtime.bind(gate, Value::Unit)?;
    let _ = runtime.wait_quiescent(timeout);

    Ok(num_done.load(Ordering::Relaxed))
}

/// Streams the numbers `1..=length` from a producer thread to a consumer thread through a list of
/// `cons(Head, Tail)` records ending in `nil`, and returns the sum the consumer computed.
pub fn pipeline(
    runtime: &Runtime,
    length: i64,
    timeout: Option<Duration>,
) -> Result<Option<i64>, RuntimeError> {
    let list = runtime.new_variable()?;
    let sum = runtime.new_variable()?;

    let _ = runtime.spawn(Producer {
        next: 1,
        last: length,
        tail: list,
    })?;
    let _ = runtime.spawn_producing(
        GroupId::ROOT,
        vec![sum],
        Consumer {
            list,
            sum: 0,
            result: sum,
        },
    )?;

    match runtime.wait_determined(sum, timeout) {
        Some(Determination::Bound(value)) => Ok(value.as_int()),
        Some(Determination::Failed(error)) => Err(error),
        None => Ok(None),
    }
}

/// Binds the open tail of the list to one more cell per quantum.
struct Producer {
    next: i64,
    last: i64,
    tail: VariableRef,
}

impl Computation for Producer {
    fn step(&mut self, context: &mut ThreadContext<'_>) -> StepResult {
        if self.next > self.last {
            context.bind(self.tail, Value::atom(NIL))?;
            return Ok(Step::Done);
        }

        let tail = context.new_variable()?;
        let cell = context.new_record(CONS, [Value::Int(self.next), Value::Var(tail)])?;
        context.bind(self.tail, cell)?;

        self.next += 1;
        self.tail = tail;
        Ok(Step::Yield)
    }
}

/// Walks the list as far as it is bound, suspending on its open tail.
struct Consumer {
    list: VariableRef,
    sum: i64,
    result: VariableRef,
}

impl Computation for Consumer {
    fn step(&mut self, context: &mut ThreadContext<'_>) -> StepResult {
        loop {
            match context.read(self.list)? {
                Value::Record(cell) if cell.label().as_str() == CONS => {
                    let (Some(head), Some(tail)) = (cell.field(0), cell.field(1)) else {
                        return Err(Interrupt::raise(format!("malformed list cell {cell}")));
                    };
                    self.sum += context.read_int(head)?;
                    self.list = tail;
                }
                Value::Atom(atom) if atom.as_str() == NIL => {
                    context.bind(self.result, self.sum)?;
                    return Ok(Step::Done);
                }
                other => return Err(Interrupt::raise(format!("not a list: {other}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rivulet_core::RuntimeOptions;

    use super::*;

    const TIMEOUT: Option<Duration> = Some(Duration::from_secs(30));

    fn runtime() -> Runtime {
        Runtime::new(RuntimeOptions {
            num_workers: 2,
            ..RuntimeOptions::default()
        })
    }

    #[test]
    fn every_waiting_thread_completes() {
        assert_eq!(Ok(1000), fan_out(&runtime(), 1000, TIMEOUT));
    }

    #[test]
    fn pipeline_sums_the_stream() {
        assert_eq!(Ok(Some(5050)), pipeline(&runtime(), 100, TIMEOUT));
    }

    #[test]
    fn empty_pipeline_sums_to_zero() {
        assert_eq!(Ok(Some(0)), pipeline(&runtime(), 0, TIMEOUT));
    }
}
