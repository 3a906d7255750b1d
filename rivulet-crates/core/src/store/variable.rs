use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;
use std::sync::Mutex;

use super::Value;
use crate::basic_types::RuntimeError;

/// A handle to a dataflow variable. The store owns the variable; everything else only holds this
/// handle.
///
/// Handles are only minted by [`VariableStore::new_variable`](super::VariableStore::new_variable),
/// so a handle always refers to a slot of the store which created it.
///
/// ```compile_fail
/// use rivulet_core::containers::StorageKey;
/// use rivulet_core::store::VariableRef;
///
/// let forged = VariableRef::create_from_index(7);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableRef {
    id: u32,
}

impl VariableRef {
    pub(super) fn from_index(index: usize) -> VariableRef {
        VariableRef { id: index as u32 }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub(super) fn index(&self) -> usize {
        self.id as usize
    }
}

impl Display for VariableRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "_{}", self.id)
    }
}

impl std::fmt::Debug for VariableRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "_{}", self.id)
    }
}

/// The final state of a variable, as handed to the waiters of that variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Determination {
    Bound(Value),
    Failed(RuntimeError),
}

/// A non-suspending view of a variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariableStatus {
    Unbound,
    Bound(Value),
    Failed(RuntimeError),
}

impl VariableStatus {
    pub fn is_determined(&self) -> bool {
        !matches!(self, VariableStatus::Unbound)
    }
}

/// Something that can be resumed when a variable becomes determined.
///
/// The `token` is whatever was passed when the waiter registered itself; it lets the waiter
/// recognise wake-ups that belong to an older registration.
pub(crate) trait Waiter: Send + Sync {
    fn waiter_id(&self) -> u64;

    fn wake(self: Arc<Self>, variable: VariableRef, token: u64, determination: &Determination);
}

pub(crate) type Watcher = Box<dyn FnOnce(VariableRef, &Determination) + Send>;

pub(crate) enum Suspension {
    Waiter { waiter: Arc<dyn Waiter>, token: u64 },
    Watcher(Watcher),
}

impl Suspension {
    pub(crate) fn resume(self, variable: VariableRef, determination: &Determination) {
        match self {
            Suspension::Waiter { waiter, token } => waiter.wake(variable, token, determination),
            Suspension::Watcher(watcher) => watcher(variable, determination),
        }
    }

    fn belongs_to(&self, waiter_id: u64) -> bool {
        matches!(self, Suspension::Waiter { waiter, .. } if waiter.waiter_id() == waiter_id)
    }
}

pub(crate) enum VariableState {
    Unbound { suspensions: Vec<Suspension> },
    /// Never holds [`Value::Var`]; aliasing is expressed through [`VariableState::Forwarded`].
    Bound(Value),
    Failed(RuntimeError),
    /// Unified with a variable with a lower id, which is now the representative of both.
    Forwarded(VariableRef),
}

impl VariableState {
    pub(crate) fn remove_waiter(&mut self, waiter_id: u64) {
        if let VariableState::Unbound { suspensions } = self {
            suspensions.retain(|suspension| !suspension.belongs_to(waiter_id));
        }
    }
}

impl Default for VariableState {
    fn default() -> Self {
        VariableState::Unbound {
            suspensions: Vec::new(),
        }
    }
}

pub(crate) type VariableSlot = Mutex<VariableState>;
