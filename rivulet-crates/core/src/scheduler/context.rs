use std::sync::Arc;

use crossbeam_deque::Worker;

use super::thread::ThreadControl;
use super::worker_pool::SchedulerShared;
use super::Computation;
use super::Interrupt;
use super::ThreadHandle;
use super::ThreadId;
use crate::store::Atom;
use crate::store::Value;
use crate::store::VariableRef;
use crate::store::VariableStatus;
use crate::store::VariableStore;

/// The view a running [`Computation`] has of the runtime during one quantum.
///
/// Reading an unbound variable records it and returns [`Interrupt::Suspend`], which the
/// computation propagates with `?`; the worker then parks the thread on every variable recorded
/// during the quantum.
pub struct ThreadContext<'a> {
    shared: &'a Arc<SchedulerShared>,
    thread: &'a Arc<ThreadControl>,
    local: Option<&'a Worker<Arc<ThreadControl>>>,
    awaiting: Vec<VariableRef>,
}

impl std::fmt::Debug for ThreadContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadContext")
            .field("thread", &self.thread.id())
            .field("awaiting", &self.awaiting)
            .finish_non_exhaustive()
    }
}

impl<'a> ThreadContext<'a> {
    pub(crate) fn new(
        shared: &'a Arc<SchedulerShared>,
        thread: &'a Arc<ThreadControl>,
        local: Option<&'a Worker<Arc<ThreadControl>>>,
    ) -> ThreadContext<'a> {
        ThreadContext {
            shared,
            thread,
            local,
            awaiting: Vec::new(),
        }
    }

    pub(crate) fn into_awaiting(self) -> Vec<VariableRef> {
        self.awaiting
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread.id()
    }

    pub fn store(&self) -> &VariableStore {
        self.shared.store()
    }

    /// Looks at a variable without suspending.
    pub fn status(&self, variable: VariableRef) -> VariableStatus {
        self.store().status(variable)
    }

    /// The value of `variable`, suspending the thread while it is unbound.
    pub fn read(&mut self, variable: VariableRef) -> Result<Value, Interrupt> {
        match self.store().status(variable) {
            VariableStatus::Bound(value) => Ok(value),
            VariableStatus::Failed(error) => Err(Interrupt::Fail(error)),
            VariableStatus::Unbound => {
                self.awaiting.push(variable);
                Err(Interrupt::Suspend)
            }
        }
    }

    /// Like [`ThreadContext::read`], failing the thread if the value is not an integer.
    pub fn read_int(&mut self, variable: VariableRef) -> Result<i64, Interrupt> {
        let value = self.read(variable)?;
        value
            .as_int()
            .ok_or_else(|| Interrupt::raise(format!("expected an integer in {variable}, got {value}")))
    }

    /// Suspends until every variable in `variables` is bound. Fails as soon as one of them has
    /// failed.
    pub fn await_all(&mut self, variables: &[VariableRef]) -> Result<(), Interrupt> {
        let mut blocked = false;
        for &variable in variables {
            match self.store().status(variable) {
                VariableStatus::Bound(_) => {}
                VariableStatus::Failed(error) => return Err(Interrupt::Fail(error)),
                VariableStatus::Unbound => {
                    self.awaiting.push(variable);
                    blocked = true;
                }
            }
        }

        if blocked {
            Err(Interrupt::Suspend)
        } else {
            Ok(())
        }
    }

    pub fn bind(&self, variable: VariableRef, value: impl Into<Value>) -> Result<(), Interrupt> {
        self.store()
            .bind(variable, value.into())
            .map_err(Interrupt::from)
    }

    pub fn unify(&self, a: VariableRef, b: VariableRef) -> Result<(), Interrupt> {
        self.store().unify(a, b).map_err(Interrupt::from)
    }

    pub fn new_variable(&self) -> Result<VariableRef, Interrupt> {
        self.store().new_variable().map_err(Interrupt::from)
    }

    pub fn new_record(
        &self,
        label: impl Into<Atom>,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Value, Interrupt> {
        self.store()
            .new_record(label, values)
            .map_err(Interrupt::from)
    }

    /// Makes the running thread the sole producer of `variable`: if the thread fails, so does
    /// the variable.
    pub fn declare_output(&self, variable: VariableRef) {
        self.thread.declare_output(variable);
    }

    /// Spawns a thread in the group of the running thread.
    pub fn spawn(&mut self, computation: impl Computation) -> Result<ThreadHandle, Interrupt> {
        self.spawn_producing(Vec::new(), computation)
    }

    /// Spawns a thread which is the sole producer of `outputs`.
    pub fn spawn_producing(
        &mut self,
        outputs: Vec<VariableRef>,
        computation: impl Computation,
    ) -> Result<ThreadHandle, Interrupt> {
        self.shared
            .spawn(
                self.thread.group().cloned(),
                outputs,
                Box::new(computation),
                self.local,
            )
            .map_err(Interrupt::from)
    }
}
