use super::ThreadContext;
use crate::basic_types::RuntimeError;

/// How a quantum of a lightweight thread ended without an interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The thread wants to run again after others had their turn.
    Yield,
    /// The thread is finished.
    Done,
}

/// Why a quantum of a lightweight thread was cut short.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// The thread read a variable which is not determined yet. The variables are recorded in the
    /// [`ThreadContext`]; the thread is resumed once all of them are bound, or any of them failed.
    Suspend,
    /// The thread failed.
    Fail(RuntimeError),
}

impl Interrupt {
    /// A failure raised by the computation itself.
    pub fn raise(reason: impl Into<String>) -> Interrupt {
        Interrupt::Fail(RuntimeError::Raised(reason.into()))
    }
}

impl From<RuntimeError> for Interrupt {
    fn from(error: RuntimeError) -> Self {
        Interrupt::Fail(error)
    }
}

pub type StepResult = Result<Step, Interrupt>;

/// The continuation of a lightweight thread.
///
/// A thread is an explicit state machine: every call to [`Computation::step`] runs one quantum.
/// After a [`Interrupt::Suspend`] the same computation is stepped again once the awaited variables
/// are determined, so work done before the suspending read is repeated. Reads should therefore
/// come before effects, or the computation should record its progress in its own state.
pub trait Computation: Send + 'static {
    fn step(&mut self, context: &mut ThreadContext<'_>) -> StepResult;
}

impl<F> Computation for F
where
    F: FnMut(&mut ThreadContext<'_>) -> StepResult + Send + 'static,
{
    fn step(&mut self, context: &mut ThreadContext<'_>) -> StepResult {
        self(context)
    }
}
