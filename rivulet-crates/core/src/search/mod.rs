//! Depth-first search over a [`ConstraintSpace`](crate::engine::ConstraintSpace).
//!
//! A [`SearchTask`] alternates between propagating the current node to a fixpoint and asking its
//! [`Brancher`](crate::branching::Brancher) for a distribution. Each distribution becomes a choice
//! point on an explicit stack, so a task can be suspended after any step and resumed later,
//! possibly on another worker thread. Solutions are produced one at a time; a
//! [`SearchContinuation`] hands out the rest of the search as a value.
mod choice_point;
mod outcome;
mod search_options;
mod search_task;

pub(crate) use choice_point::ChoicePoint;
pub use outcome::*;
pub use search_options::SearchOptions;
pub use search_task::SearchState;
pub use search_task::SearchStatistics;
pub use search_task::SearchTask;
