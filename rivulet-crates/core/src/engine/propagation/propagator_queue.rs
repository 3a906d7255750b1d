use std::collections::VecDeque;

use super::Priority;
use super::PropagatorId;
use crate::containers::HashSet;

const NUM_PRIORITIES: usize = 4;

/// FIFO queues of propagators, one per [`Priority`].
///
/// A propagator is in the queue at most once; enqueueing it again before it is popped does
/// nothing.
#[derive(Debug, Default)]
pub(crate) struct PropagatorQueue {
    queues: [VecDeque<PropagatorId>; NUM_PRIORITIES],
    present_propagators: HashSet<PropagatorId>,
}

impl PropagatorQueue {
    pub(crate) fn is_empty(&self) -> bool {
        self.present_propagators.is_empty()
    }

    pub(crate) fn enqueue_propagator(&mut self, propagator_id: PropagatorId, priority: Priority) {
        if self.present_propagators.insert(propagator_id) {
            self.queues[priority as usize].push_back(propagator_id);
        }
    }

    pub(crate) fn pop(&mut self) -> Option<PropagatorId> {
        let propagator_id = self
            .queues
            .iter_mut()
            .find_map(|queue| queue.pop_front())?;
        let _ = self.present_propagators.remove(&propagator_id);
        Some(propagator_id)
    }

    pub(crate) fn clear(&mut self) {
        self.queues.iter_mut().for_each(VecDeque::clear);
        self.present_propagators.clear();
    }
}
