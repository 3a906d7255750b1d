#![cfg(test)]

use std::time::Duration;

use rivulet::core::constraints;
use rivulet::core::constraints::Constraint;
use rivulet::core::engine::variables::DomainId;
use rivulet::core::engine::variables::TransformableVariable;
use rivulet::core::engine::ConstraintSpace;
use rivulet::core::predicate;
use rivulet::core::search::ContinuationOutcome;
use rivulet::core::search::OptimisationResult;
use rivulet::core::search::SearchContinuation;
use rivulet::core::search::SearchOptions;
use rivulet::core::search::SearchState;
use rivulet::core::search::SearchTask;
use rivulet::core::search::SolveResult;
use rivulet::core::Runtime;
use rivulet::core::SearchAnswer;
use rivulet::models;

fn domain(space: &ConstraintSpace, variable: DomainId) -> Vec<i32> {
    space
        .assignments()
        .get_domain_iterator(variable)
        .collect()
}

#[test]
fn two_disequalities_fix_a_variable_without_search() {
    let mut space = ConstraintSpace::default();
    let x = space.new_bounded_integer(1, 3);

    constraints::not_equals_constant(x, 2)
        .post(&mut space)
        .unwrap();
    constraints::not_equals_constant(x, 1)
        .post(&mut space)
        .unwrap();

    assert_eq!(vec![3], domain(&space, x));
    assert_eq!(Some(3), space.fixed_value(&x));
}

#[test]
fn not_both_true_has_exactly_three_solutions() {
    let model = models::not_both_true().unwrap();
    let variables = model.domains();
    let mut task = SearchTask::new(model.space, SearchOptions::default());

    let mut solutions = vec![];
    while let SolveResult::Solution(solution) = task.next_solution() {
        solutions.push(solution.get_integer_values(variables.iter().copied()));
    }

    assert_eq!(vec![vec![0, 0], vec![0, 1], vec![1, 0]], solutions);
    assert_eq!(SearchState::Exhausted, task.state());
}

#[test]
fn fixpoint_does_not_depend_on_posting_order() {
    let build = |reversed: bool| {
        let mut space = ConstraintSpace::default();
        let x = space.new_bounded_integer(0, 10);
        let y = space.new_bounded_integer(0, 10);
        let z = space.new_bounded_integer(0, 10);

        let mut posts: Vec<Box<dyn FnOnce(&mut ConstraintSpace)>> = vec![
            Box::new(move |space: &mut ConstraintSpace| {
                constraints::less_than(vec![x.scaled(1), y.scaled(-1)], 0)
                    .post(space)
                    .unwrap()
            }),
            Box::new(move |space: &mut ConstraintSpace| {
                constraints::less_than(vec![y.scaled(1), z.scaled(-1)], 0)
                    .post(space)
                    .unwrap()
            }),
            Box::new(move |space: &mut ConstraintSpace| constraints::not_equals_constant(z, 10).post(space).unwrap()),
            Box::new(move |space: &mut ConstraintSpace| constraints::not_equals_constant(x, 0).post(space).unwrap()),
        ];
        if reversed {
            posts.reverse();
        }
        for post in posts {
            post(&mut space);
        }

        [x, y, z].map(|variable| domain(&space, variable))
    };

    assert_eq!(build(false), build(true));
    assert_eq!([vec![1, 2, 3, 4, 5, 6, 7], vec![2, 3, 4, 5, 6, 7, 8], vec![3, 4, 5, 6, 7, 8, 9]], build(false));
}

#[test]
fn backtracking_reverts_an_alternative_exactly() {
    let mut space = ConstraintSpace::default();
    let variables = (0..4)
        .map(|_| space.new_bounded_integer(0, 3))
        .collect::<Vec<_>>();
    constraints::all_different(variables.clone())
        .post(&mut space)
        .unwrap();
    let before = variables
        .iter()
        .map(|&variable| domain(&space, variable))
        .collect::<Vec<_>>();

    let checkpoint = space.get_checkpoint();
    space.new_checkpoint();
    space.apply_decision(predicate!(variables[0] == 1)).unwrap();
    space.propagate().unwrap();
    space.new_checkpoint();
    space.apply_decision(predicate!(variables[1] == 2)).unwrap();
    space.propagate().unwrap();
    assert_eq!(vec![0, 3], domain(&space, variables[2]));

    space.synchronise(checkpoint);

    let after = variables
        .iter()
        .map(|&variable| domain(&space, variable))
        .collect::<Vec<_>>();
    assert_eq!(before, after);
}

#[test]
fn continuation_resumes_instead_of_restarting() {
    let model = models::queens(5).unwrap();
    let task = SearchTask::new(model.space, SearchOptions::default());

    let mut outcome = SearchContinuation::solve(task);
    let mut num_solutions = 0;
    while let ContinuationOutcome::Solution(_, continuation) = outcome {
        num_solutions += 1;
        outcome = continuation.next_solution();
    }

    assert!(matches!(outcome, ContinuationOutcome::NoSolution));
    assert_eq!(10, num_solutions);
}

#[test]
fn branch_and_bound_finds_the_optimum() {
    let mut space = ConstraintSpace::default();
    let items = (0..3)
        .map(|_| space.new_bounded_integer(0, 1))
        .collect::<Vec<_>>();
    let value = space.new_bounded_integer(0, 100);
    // weights 4, 3, 2 with capacity 5; values 5, 4, 3
    constraints::less_than_or_equals(
        vec![items[0].scaled(4), items[1].scaled(3), items[2].scaled(2)],
        5,
    )
    .post(&mut space)
    .unwrap();
    constraints::linear_equals(
        vec![
            items[0].scaled(5),
            items[1].scaled(4),
            items[2].scaled(3),
            value.scaled(-1),
        ],
        0,
    )
    .post(&mut space)
    .unwrap();

    let mut task = SearchTask::new(space, SearchOptions::default()).maximise(value);

    match task.optimise() {
        OptimisationResult::Optimal(solution) => {
            assert_eq!(7, solution.get_integer_value(value));
            assert_eq!(vec![0, 1, 1], solution.get_integer_values(items));
        }
        other => panic!("expected an optimum, got {other:?}"),
    }
}

#[test]
fn infeasible_model_reports_no_solution_through_the_runtime() {
    let runtime = Runtime::default();
    let model = models::queens(3).unwrap();

    let mut stream = runtime
        .spawn_search(SearchTask::new(model.space, SearchOptions::default()))
        .unwrap();

    assert_eq!(
        Some(SearchAnswer::NoSolution {
            had_solutions: false
        }),
        stream.next(Some(Duration::from_secs(30))).unwrap()
    );
}
