use std::fmt::Debug;
use std::fmt::Formatter;

use log::debug;
use log::trace;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::outcome::OptimisationResult;
use super::outcome::SearchStep;
use super::outcome::SolveResult;
use super::ChoicePoint;
use super::SearchOptions;
use crate::basic_types::Random;
use crate::branching::Brancher;
use crate::branching::DefaultBrancher;
use crate::branching::SelectionContext;
use crate::create_statistics_struct;
use crate::engine::predicates::PredicateConstructor;
use crate::engine::variables::AffineView;
use crate::engine::variables::DomainId;
use crate::engine::variables::TransformableVariable;
use crate::engine::ConstraintSpace;
use crate::engine::Solution;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::termination::Indefinite;
use crate::termination::TerminationCondition;

create_statistics_struct!(
    /// Counters of a [`SearchTask`].
    SearchStatistics {
        /// Number of alternatives applied.
        num_decisions: u64,
        /// Number of alternatives which led to an inconsistency.
        num_failures: u64,
        /// Number of propagation fixpoints computed.
        num_fixpoints: u64,
        num_solutions: u64,
        /// Number of choice points abandoned after all their alternatives were tried.
        num_backtracks: u64,
        /// Deepest choice-point stack seen.
        max_depth: u64,
    }
);

/// The lifecycle of a search task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    /// Search has not finished and has not just produced a solution.
    Exploring,
    /// The last step produced a solution; the next step resumes from the last choice point.
    Solved,
    /// The search space was exhausted without any solution.
    Failed,
    /// The search space was exhausted after at least one solution.
    Exhausted,
}

/// What the next step does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Propagate the current node, then distribute or report a solution.
    Propagate,
    /// Move on to the next untried alternative.
    NextAlternative,
}

/// The search over one [`ConstraintSpace`].
///
/// The task owns its space, so it can run on any worker thread of the runtime. Every node is
/// visited at a checkpoint of the space: a choice point remembers the checkpoint at which it was
/// created, and an alternative is tried by synchronising back to it, opening a new checkpoint, and
/// applying the alternative there. [`SearchTask::step`] performs one unit of work so that a
/// scheduler can interleave searches with other computations.
pub struct SearchTask {
    space: ConstraintSpace,
    brancher: Box<dyn Brancher>,
    termination: Box<dyn TerminationCondition>,
    random: Box<dyn Random>,
    choice_points: Vec<ChoicePoint>,
    phase: Phase,
    state: SearchState,
    /// The variable minimised by branch-and-bound search, if any.
    objective: Option<AffineView<DomainId>>,
    /// Every next solution must have an objective value of at most this bound.
    objective_bound: Option<i32>,
    statistics: SearchStatistics,
}

impl Debug for SearchTask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchTask")
            .field("space", &self.space)
            .field("choice_points", &self.choice_points)
            .field("state", &self.state)
            .field("objective", &self.objective)
            .field("objective_bound", &self.objective_bound)
            .field("statistics", &self.statistics)
            .finish_non_exhaustive()
    }
}

impl SearchTask {
    /// A search over every variable of `space`, distributing as configured in `options`.
    pub fn new(space: ConstraintSpace, options: SearchOptions) -> SearchTask {
        let variables = space.assignments().get_domains().collect::<Vec<_>>();
        let brancher = DefaultBrancher::from_strategies(
            &variables,
            options.variable_selection,
            options.value_selection,
        );
        SearchTask::with_brancher(space, brancher, options)
    }

    /// A search which distributes with `brancher`.
    ///
    /// Variables the brancher does not fix are reported in solutions with their lower bound.
    pub fn with_brancher(
        space: ConstraintSpace,
        brancher: impl Brancher + 'static,
        options: SearchOptions,
    ) -> SearchTask {
        SearchTask {
            space,
            brancher: Box::new(brancher),
            termination: Box::new(Indefinite),
            random: Box::new(SmallRng::seed_from_u64(options.random_seed)),
            choice_points: vec![],
            phase: Phase::Propagate,
            state: SearchState::Exploring,
            objective: None,
            objective_bound: None,
            statistics: SearchStatistics::default(),
        }
    }

    /// Replace the termination condition, which by default never triggers.
    pub fn with_termination(mut self, termination: impl TerminationCondition + 'static) -> Self {
        self.termination = Box::new(termination);
        self
    }

    /// Turn the search into branch-and-bound search minimising `objective`: after each solution
    /// only strictly better solutions are searched for.
    pub fn minimise(mut self, objective: DomainId) -> Self {
        self.objective = Some(objective.scaled(1));
        self
    }

    /// As [`SearchTask::minimise`], for the negation of `objective`.
    pub fn maximise(mut self, objective: DomainId) -> Self {
        self.objective = Some(objective.scaled(-1));
        self
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn space(&self) -> &ConstraintSpace {
        &self.space
    }

    /// Number of choice points which still have untried alternatives or are being explored.
    pub fn depth(&self) -> usize {
        self.choice_points.len()
    }

    pub fn statistics(&self) -> SearchStatistics {
        self.statistics
    }

    pub fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics
            .log(statistic_logger.attach_to_prefix("search"));
        self.space
            .log_statistics(statistic_logger.attach_to_prefix("engine"));
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SearchState::Failed | SearchState::Exhausted)
    }

    /// Perform one unit of work: either propagate the current node to its fixpoint and
    /// distribute, or move to the next untried alternative.
    pub fn step(&mut self) -> SearchStep {
        match self.state {
            SearchState::Failed | SearchState::Exhausted => return SearchStep::Finished,
            SearchState::Solved => {
                self.state = SearchState::Exploring;
                self.phase = Phase::NextAlternative;
            }
            SearchState::Exploring => {}
        }

        if self.termination.should_stop() {
            return SearchStep::Stopped;
        }

        match self.phase {
            Phase::Propagate => self.propagate_and_distribute(),
            Phase::NextAlternative => self.try_next_alternative(),
        }
    }

    /// Step until the next solution is found, the space is exhausted, or the termination
    /// condition triggers.
    pub fn next_solution(&mut self) -> SolveResult {
        loop {
            match self.step() {
                SearchStep::Continue => {}
                SearchStep::Solution(solution) => return SolveResult::Solution(solution),
                SearchStep::Finished => return SolveResult::NoSolution,
                SearchStep::Stopped => return SolveResult::Unknown,
            }
        }
    }

    /// Run branch-and-bound search to completion, returning the best solution found.
    ///
    /// Without an objective this returns the first solution as optimal.
    pub fn optimise(&mut self) -> OptimisationResult {
        let mut best = None;
        loop {
            match self.next_solution() {
                SolveResult::Solution(solution) => {
                    if self.objective.is_none() {
                        return OptimisationResult::Optimal(solution);
                    }
                    best = Some(solution);
                }
                SolveResult::NoSolution => {
                    return match best {
                        Some(solution) => OptimisationResult::Optimal(solution),
                        None => OptimisationResult::Unsatisfiable,
                    };
                }
                SolveResult::Unknown => {
                    return match best {
                        Some(solution) => OptimisationResult::Satisfiable(solution),
                        None => OptimisationResult::Unknown,
                    };
                }
            }
        }
    }

    fn propagate_and_distribute(&mut self) -> SearchStep {
        self.statistics.num_fixpoints += 1;

        if self.space.propagate().is_err() {
            trace!("Inconsistency at depth {}", self.choice_points.len());
            self.statistics.num_failures += 1;
            self.phase = Phase::NextAlternative;
            return SearchStep::Continue;
        }

        let mut context = SelectionContext::new(self.space.assignments(), self.random.as_mut());
        match self.brancher.next_distribution(&mut context) {
            Some(distribution) => {
                self.choice_points.push(ChoicePoint::new(
                    self.space.get_checkpoint(),
                    distribution.alternatives,
                ));
                self.statistics.max_depth =
                    self.statistics.max_depth.max(self.choice_points.len() as u64);
                self.phase = Phase::NextAlternative;
                SearchStep::Continue
            }
            None => self.record_solution(),
        }
    }

    fn record_solution(&mut self) -> SearchStep {
        let solution = Solution::from_assignments(self.space.assignments());
        self.statistics.num_solutions += 1;

        if let Some(objective) = &self.objective {
            let value = solution.get_integer_value(objective.clone());
            debug!("Found a solution with objective value {value}");
            self.objective_bound = Some(value - 1);
        } else {
            debug!(
                "Found solution {} at depth {}",
                self.statistics.num_solutions,
                self.choice_points.len()
            );
        }

        self.state = SearchState::Solved;
        SearchStep::Solution(solution)
    }

    /// Go back to the innermost choice point which has an untried alternative and apply it. When
    /// there is none, the search space is exhausted.
    fn try_next_alternative(&mut self) -> SearchStep {
        let (checkpoint, alternative) = loop {
            let Some(choice_point) = self.choice_points.last_mut() else {
                self.state = if self.statistics.num_solutions > 0 {
                    SearchState::Exhausted
                } else {
                    SearchState::Failed
                };
                debug!(
                    "Search space exhausted after {} solutions",
                    self.statistics.num_solutions
                );
                return SearchStep::Finished;
            };

            match choice_point.next_alternative() {
                Some(alternative) => break (choice_point.checkpoint, alternative),
                None => {
                    let _ = self.choice_points.pop();
                    self.statistics.num_backtracks += 1;
                }
            }
        };

        if self.space.get_checkpoint() > checkpoint {
            self.space.synchronise(checkpoint);
        }
        self.space.new_checkpoint();

        self.statistics.num_decisions += 1;
        self.termination.decision_has_been_made();
        trace!("Decision {alternative} at checkpoint {}", self.space.get_checkpoint());

        if self.apply_objective_bound().is_err()
            || self.space.apply_decision(alternative).is_err()
        {
            self.statistics.num_failures += 1;
            self.phase = Phase::NextAlternative;
        } else {
            self.phase = Phase::Propagate;
        }

        SearchStep::Continue
    }

    /// Synchronising undoes the bound as well, so it is applied again at every node.
    fn apply_objective_bound(&mut self) -> Result<(), crate::engine::EmptyDomain> {
        match (&self.objective, self.objective_bound) {
            (Some(objective), Some(bound)) => self
                .space
                .apply_decision(objective.upper_bound_predicate(bound)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::ConstraintOperationError;
    use crate::constraints;
    use crate::constraints::Constraint;
    use crate::termination::DecisionBudget;

    fn all_solutions(task: &mut SearchTask, variables: &[DomainId]) -> Vec<Vec<i32>> {
        let mut solutions = vec![];
        while let SolveResult::Solution(solution) = task.next_solution() {
            solutions.push(solution.get_integer_values(variables.iter().copied()));
        }
        solutions
    }

    #[test]
    fn not_both_true_has_three_solutions() {
        let mut space = ConstraintSpace::default();
        let x = space.new_boolean();
        let y = space.new_boolean();
        constraints::not_all(vec![x, y]).post(&mut space).unwrap();

        let mut task = SearchTask::new(space, SearchOptions::default());
        let solutions = all_solutions(&mut task, &[x, y]);

        assert_eq!(vec![vec![0, 0], vec![0, 1], vec![1, 0]], solutions);
        assert_eq!(SearchState::Exhausted, task.state());
    }

    #[test]
    fn infeasible_space_fails_without_solutions() {
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(0, 1);
        let y = space.new_bounded_integer(0, 1);
        let z = space.new_bounded_integer(0, 1);
        // Pairwise disequalities only prune fixed variables, so the root is consistent and the
        // infeasibility is only found by search.
        for (a, b) in [(x, y), (y, z), (x, z)] {
            constraints::not_equals(a, b).post(&mut space).unwrap();
        }

        let mut task = SearchTask::new(space, SearchOptions::default());

        assert!(matches!(task.next_solution(), SolveResult::NoSolution));
        assert_eq!(SearchState::Failed, task.state());
        assert!(matches!(task.step(), SearchStep::Finished));
    }

    #[test]
    fn pigeonhole_is_rejected_when_posted() {
        let mut space = ConstraintSpace::default();
        let variables = (0..3)
            .map(|_| space.new_bounded_integer(0, 1))
            .collect::<Vec<_>>();

        assert!(matches!(
            constraints::all_different(variables).post(&mut space),
            Err(ConstraintOperationError::InfeasiblePropagator)
        ));
    }

    #[test]
    fn backtracking_restores_domains_exactly() {
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(1, 3);
        let y = space.new_sparse_integer([1, 3, 5]);
        constraints::less_than(vec![x.scaled(1), y.scaled(-1)], 0)
            .post(&mut space)
            .unwrap();
        let _ = space.propagate();
        let root_x = space.assignments().get_domain_iterator(x).collect::<Vec<_>>();
        let root_y = space.assignments().get_domain_iterator(y).collect::<Vec<_>>();

        let mut task = SearchTask::new(space, SearchOptions::default());
        let _ = all_solutions(&mut task, &[x, y]);

        if task.space().get_checkpoint() > 0 {
            task.space.synchronise(0);
        }
        assert_eq!(
            root_x,
            task.space().assignments().get_domain_iterator(x).collect::<Vec<_>>()
        );
        assert_eq!(
            root_y,
            task.space().assignments().get_domain_iterator(y).collect::<Vec<_>>()
        );
    }

    #[test]
    fn every_solution_is_found_once() {
        let mut space = ConstraintSpace::default();
        let variables = (0..3)
            .map(|_| space.new_bounded_integer(1, 3))
            .collect::<Vec<_>>();
        constraints::all_different(variables.clone())
            .post(&mut space)
            .unwrap();

        let mut task = SearchTask::new(space, SearchOptions::default());
        let mut solutions = all_solutions(&mut task, &variables);
        let num_found = solutions.len();
        solutions.sort();
        solutions.dedup();

        assert_eq!(6, num_found);
        assert_eq!(6, solutions.len());
    }

    #[test]
    fn minimisation_ends_with_the_optimum() {
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(0, 5);
        let y = space.new_bounded_integer(0, 5);
        let sum = space.new_bounded_integer(0, 10);
        constraints::linear_equals(vec![x.scaled(1), y.scaled(1), sum.scaled(-1)], 0)
            .post(&mut space)
            .unwrap();
        constraints::greater_than_or_equals(vec![x.scaled(1), y.scaled(1)], 4)
            .post(&mut space)
            .unwrap();

        let options = SearchOptions {
            value_selection: crate::branching::ValueSelectionStrategy::InDomainMax,
            ..SearchOptions::default()
        };
        let mut task = SearchTask::new(space, options).minimise(sum);

        match task.optimise() {
            OptimisationResult::Optimal(solution) => assert_eq!(4, solution.get_integer_value(sum)),
            other => panic!("expected an optimal solution, got {other:?}"),
        }
    }

    #[test]
    fn maximisation_ends_with_the_optimum() {
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(0, 5);
        let y = space.new_bounded_integer(0, 5);
        constraints::less_than(vec![x.scaled(1), y.scaled(-1)], 0)
            .post(&mut space)
            .unwrap();

        let mut task = SearchTask::new(space, SearchOptions::default()).maximise(x);

        match task.optimise() {
            OptimisationResult::Optimal(solution) => assert_eq!(4, solution.get_integer_value(x)),
            other => panic!("expected an optimal solution, got {other:?}"),
        }
    }

    #[test]
    fn termination_makes_the_outcome_unknown() {
        let mut space = ConstraintSpace::default();
        let variables = (0..4)
            .map(|_| space.new_bounded_integer(0, 3))
            .collect::<Vec<_>>();
        constraints::all_different(variables)
            .post(&mut space)
            .unwrap();

        let mut task = SearchTask::new(space, SearchOptions::default())
            .with_termination(DecisionBudget::new(1));

        assert!(matches!(task.next_solution(), SolveResult::Unknown));
        assert_eq!(SearchState::Exploring, task.state());
    }

    #[test]
    fn statistics_count_the_search() {
        let mut space = ConstraintSpace::default();
        let x = space.new_boolean();
        let y = space.new_boolean();
        constraints::not_all(vec![x, y]).post(&mut space).unwrap();

        let mut task = SearchTask::new(space, SearchOptions::default());
        let _ = all_solutions(&mut task, &[x, y]);
        let statistics = task.statistics();

        assert_eq!(3, statistics.num_solutions);
        assert!(statistics.num_decisions >= 3);
        assert_eq!(2, statistics.max_depth);
    }
}
