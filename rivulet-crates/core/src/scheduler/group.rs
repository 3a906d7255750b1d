use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::Weak;

use super::thread::ThreadControl;
use super::ThreadId;
use crate::containers::HashMap;

/// Identifies a set of threads which can be cancelled together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) u64);

impl GroupId {
    /// Threads spawned by the host without a group. The root group cannot be cancelled.
    pub const ROOT: GroupId = GroupId(0);
}

impl Display for GroupId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Membership of a cancellable group. Only live threads are members, so cancelling touches the
/// threads of this group and nothing else.
#[derive(Debug)]
pub(crate) struct ComputationGroup {
    id: GroupId,
    cancelled: AtomicBool,
    members: Mutex<HashMap<ThreadId, Weak<ThreadControl>>>,
}

impl ComputationGroup {
    pub(crate) fn new(id: GroupId) -> ComputationGroup {
        ComputationGroup {
            id,
            cancelled: AtomicBool::new(false),
            members: Mutex::default(),
        }
    }

    pub(crate) fn id(&self) -> GroupId {
        self.id
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Adds a member, unless the group has been cancelled already.
    pub(crate) fn join(&self, thread: ThreadId, control: Weak<ThreadControl>) -> bool {
        let mut members = self.members.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_cancelled() {
            return false;
        }

        let _ = members.insert(thread, control);
        true
    }

    pub(crate) fn leave(&self, thread: ThreadId) {
        let _ = self
            .members
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&thread);
    }

    /// Marks the group as cancelled and hands out its current members.
    pub(crate) fn cancel(&self) -> Vec<Weak<ThreadControl>> {
        self.cancelled.store(true, Ordering::Release);

        self.members
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, member)| member)
            .collect()
    }
}
