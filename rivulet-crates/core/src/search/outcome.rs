use super::SearchTask;
use crate::engine::Solution;

/// What a call to [`SearchTask::step`] did.
#[derive(Debug)]
pub enum SearchStep {
    /// Propagation reached a fixpoint and search distributed, or search moved to another
    /// alternative.
    Continue,
    /// A new solution was found.
    Solution(Solution),
    /// The search space is exhausted; no step will do anything any more.
    Finished,
    /// The termination condition triggered before the step started.
    Stopped,
}

/// The result of asking a search task for its next solution.
#[derive(Debug)]
pub enum SolveResult {
    Solution(Solution),
    /// There are no (more) solutions.
    NoSolution,
    /// The termination condition triggered before search could decide.
    Unknown,
}

/// The result of branch-and-bound search.
#[derive(Debug)]
pub enum OptimisationResult {
    /// The search space was exhausted; the solution is optimal.
    Optimal(Solution),
    /// Search stopped early; the solution is the best one found.
    Satisfiable(Solution),
    /// There is no solution at all.
    Unsatisfiable,
    /// Search stopped before finding any solution.
    Unknown,
}

/// A suspended search which can be resumed to produce the next solution.
///
/// This is the token handed out by [`SearchContinuation::solve`]: it owns the search task,
/// including its choice points, so resuming continues from the last choice point instead of
/// starting over.
#[derive(Debug)]
pub struct SearchContinuation {
    task: SearchTask,
}

/// The outcome of [`SearchContinuation::solve`] or [`SearchContinuation::next_solution`].
#[derive(Debug)]
pub enum ContinuationOutcome {
    Solution(Solution, SearchContinuation),
    NoSolution,
    Unknown(SearchContinuation),
}

impl SearchContinuation {
    /// Start a search and run it to its first solution.
    pub fn solve(task: SearchTask) -> ContinuationOutcome {
        SearchContinuation { task }.next_solution()
    }

    /// Resume the search from its last choice point.
    pub fn next_solution(mut self) -> ContinuationOutcome {
        match self.task.next_solution() {
            SolveResult::Solution(solution) => ContinuationOutcome::Solution(solution, self),
            SolveResult::NoSolution => ContinuationOutcome::NoSolution,
            SolveResult::Unknown => ContinuationOutcome::Unknown(self),
        }
    }

    pub fn task(&self) -> &SearchTask {
        &self.task
    }

    pub fn into_task(self) -> SearchTask {
        self.task
    }
}
