//! A [`TerminationCondition`] is polled by a search task between steps. It indicates when search
//! should stop even though it has not been completed; the search then reports that the outcome is
//! unknown. The most common example is [`TimeBudget`].
mod combinator;
mod decision_budget;
mod indefinite;
mod time_budget;

pub use combinator::*;
pub use decision_budget::*;
pub use indefinite::*;
pub use time_budget::*;

/// Determines when a search should give up.
pub trait TerminationCondition: Send {
    /// Returns `true` when the search should stop, `false` otherwise.
    fn should_stop(&mut self) -> bool;

    /// Called by search after every decision.
    fn decision_has_been_made(&mut self) {}
}

impl<T: TerminationCondition> TerminationCondition for Option<T> {
    fn should_stop(&mut self) -> bool {
        match self {
            Some(t) => t.should_stop(),
            None => false,
        }
    }

    fn decision_has_been_made(&mut self) {
        if let Some(t) = self {
            t.decision_has_been_made()
        }
    }
}

impl TerminationCondition for Box<dyn TerminationCondition> {
    fn should_stop(&mut self) -> bool {
        self.as_mut().should_stop()
    }

    fn decision_has_been_made(&mut self) {
        self.as_mut().decision_has_been_made()
    }
}
