use std::collections::VecDeque;

use crate::engine::predicates::Predicate;

/// An alternative of a choice point is tried by going back to `checkpoint`, opening a new
/// checkpoint and applying the alternative there.
#[derive(Clone, Debug)]
pub(crate) struct ChoicePoint {
    /// The checkpoint of the space when the choice point was created.
    pub(crate) checkpoint: usize,
    pub(crate) remaining: VecDeque<Predicate>,
}

impl ChoicePoint {
    pub(crate) fn new(checkpoint: usize, alternatives: Vec<Predicate>) -> ChoicePoint {
        ChoicePoint {
            checkpoint,
            remaining: alternatives.into(),
        }
    }

    pub(crate) fn next_alternative(&mut self) -> Option<Predicate> {
        self.remaining.pop_front()
    }
}
