#![cfg(test)]

use regex::Regex;

mod helpers;
use helpers::run_rivulet;

#[test]
fn booleans_are_enumerated_exhaustively() {
    let run = run_rivulet(["booleans", "--all-solutions"]);

    assert!(run.success);
    assert_eq!(3, run.count_lines("----------"));
    assert_eq!(1, run.count_lines("=========="));
    assert_eq!(
        vec![
            "x = 0;", "y = 0;", "----------", "x = 0;", "y = 1;", "----------", "x = 1;",
            "y = 0;", "----------", "==========",
        ],
        run.output_lines()
    );
}

#[test]
fn only_the_first_solution_is_printed_by_default() {
    let run = run_rivulet(["queens", "6"]);

    assert!(run.success);
    assert_eq!(1, run.count_lines("----------"));
    assert_eq!(0, run.count_lines("=========="));

    let assignment = Regex::new(r"^q\d+ = [0-5];$").unwrap();
    let assignments = run
        .output_lines()
        .into_iter()
        .filter(|line| assignment.is_match(line))
        .count();
    assert_eq!(6, assignments);
}

#[test]
fn send_more_money_has_the_known_solution() {
    let run = run_rivulet(["send-more-money", "--all-solutions"]);

    assert!(run.success);
    let solution = run
        .output_lines()
        .into_iter()
        .take_while(|&line| line != "----------")
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(
        "S = 9; E = 5; N = 6; D = 7; M = 1; O = 0; R = 8; Y = 2;",
        solution
    );
    assert_eq!(1, run.count_lines("----------"));
    assert_eq!(1, run.count_lines("=========="));
}

#[test]
fn infeasible_board_is_reported() {
    let run = run_rivulet(["queens", "3"]);

    assert!(run.success);
    assert_eq!(vec!["=====UNSATISFIABLE====="], run.output_lines());
}

#[test]
fn threads_all_complete() {
    let run = run_rivulet(["threads", "20000"]);

    assert!(run.success);
    assert_eq!(vec!["completed 20000 of 20000 threads"], run.output_lines());
}

#[test]
fn pipeline_prints_the_sum() {
    let run = run_rivulet(["pipeline", "100"]);

    assert!(run.success);
    assert_eq!(vec!["sum = 5050"], run.output_lines());
}

#[test]
fn statistics_are_logged_on_request() {
    let run = run_rivulet(["booleans", "--log-statistics"]);

    assert!(run.success);
    let statistic = Regex::new(r"^%%%stat: \w+=\d+").unwrap();
    assert!(run.stdout.lines().any(|line| statistic.is_match(line)));
}
