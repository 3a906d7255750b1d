mod os_signal_termination;
mod result;

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use clap::Subcommand;
use log::error;
use log::info;
use log::warn;
use log::LevelFilter;
use os_signal_termination::OsSignal;
use result::RivuletError;
use result::RivuletResult;
use rivulet::core::branching::ValueSelectionStrategy;
use rivulet::core::branching::VariableSelectionStrategy;
use rivulet::core::convert_case::Case;
use rivulet::core::search::SearchOptions;
use rivulet::core::search::SearchTask;
use rivulet::core::statistics::configure_statistic_logging;
use rivulet::core::statistics::log_statistic_postfix;
use rivulet::core::statistics::should_log_statistics;
use rivulet::core::statistics::StatisticLogger;
use rivulet::core::termination::Combinator;
use rivulet::core::termination::TimeBudget;
use rivulet::core::Runtime;
use rivulet::core::RuntimeOptions;
use rivulet::core::SearchAnswer;
use rivulet::demos;
use rivulet::models;
use rivulet::models::Model;

#[derive(Debug, Parser)]
#[command(
    help_template = "\
{before-help}{name} {version}
Authors: {author}
About: {about}

{usage-heading}\n{tab}{usage}

{all-args}{after-help}
",
    author,
    version,
    about,
    arg_required_else_help = true
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Number of worker threads; defaults to the available parallelism.
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// The time limit in milliseconds.
    #[arg(short = 't', long = "time-limit", global = true)]
    time_limit: Option<u64>,

    /// Seed of the random generator used by the random variable selection.
    #[arg(long = "random-seed", default_value_t = 42, global = true)]
    random_seed: u64,

    /// Which variable to distribute on next.
    #[arg(long = "variable-selection", value_enum, default_value_t, global = true)]
    variable_selection: VariableSelectionStrategy,

    /// How to split the domain of the selected variable.
    #[arg(long = "value-selection", value_enum, default_value_t, global = true)]
    value_selection: ValueSelectionStrategy,

    /// Print every solution instead of only the first.
    #[arg(short = 'a', long = "all-solutions", global = true)]
    all_solutions: bool,

    /// Log statistics when the program finishes.
    #[arg(short = 's', long = "log-statistics", global = true)]
    log_statistics: bool,

    /// Log debug messages.
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Place n non-attacking queens on an n x n board.
    Queens {
        #[arg(default_value_t = 8)]
        n: u32,
    },
    /// Solve the cryptarithm SEND + MORE = MONEY.
    SendMoreMoney,
    /// Enumerate two Boolean variables which are not both true.
    Booleans,
    /// Spawn many threads which all wait for one variable, then bind it.
    Threads {
        #[arg(default_value_t = 100_000)]
        count: usize,
    },
    /// Stream numbers from a producer thread to a consumer thread.
    Pipeline {
        #[arg(default_value_t = 1000)]
        length: i64,
    },
}

fn configure_logging(verbose: bool, log_statistics: bool) -> std::io::Result<()> {
    if log_statistics {
        configure_statistic_logging("%%%stat:", Some("%%%stat-end"), Some(Case::Camel), None);
    }
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| {
            write!(buf, "% ")?;
            writeln!(buf, "{}", record.args())
        })
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
    Ok(())
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            error!("Execution failed, error: {e}");
            std::process::exit(1);
        }
    }
}

fn run() -> RivuletResult<()> {
    let args = Args::parse();
    configure_logging(args.verbose, args.log_statistics)?;

    if rivulet::core::asserts::RIVULET_ASSERT_LEVEL_DEFINITION
        >= rivulet::core::asserts::RIVULET_ASSERT_MODERATE
    {
        warn!(
            "Potential performance degradation: the Rivulet assert level is set to {}, meaning many debug asserts are active which may result in performance degradation.",
            rivulet::core::asserts::RIVULET_ASSERT_LEVEL_DEFINITION
        );
    }

    let mut runtime_options = RuntimeOptions::default();
    if let Some(workers) = args.workers {
        runtime_options.num_workers = workers;
    }
    let runtime = Runtime::new(runtime_options);
    let time_limit = args.time_limit.map(Duration::from_millis);

    let search_options = SearchOptions {
        variable_selection: args.variable_selection,
        value_selection: args.value_selection,
        random_seed: args.random_seed,
    };

    match args.command {
        Command::Queens { n } => solve(
            &runtime,
            models::queens(n)?,
            search_options,
            time_limit,
            args.all_solutions,
        )?,
        Command::SendMoreMoney => solve(
            &runtime,
            models::send_more_money()?,
            search_options,
            time_limit,
            args.all_solutions,
        )?,
        Command::Booleans => solve(
            &runtime,
            models::not_both_true()?,
            search_options,
            time_limit,
            args.all_solutions,
        )?,
        Command::Threads { count } => {
            let num_completed = demos::fan_out(&runtime, count, time_limit)?;
            println!("completed {num_completed} of {count} threads");
        }
        Command::Pipeline { length } => {
            let sum = demos::pipeline(&runtime, length, time_limit)?
                .ok_or(RivuletError::Timeout("the pipeline"))?;
            println!("sum = {sum}");
        }
    }

    for failure in runtime.take_failures() {
        warn!("{failure}");
    }

    if should_log_statistics() {
        runtime.log_statistics(StatisticLogger::default());
        log_statistic_postfix();
    }

    runtime.shutdown();
    Ok(())
}

/// Runs the search for `model` inside the runtime and prints its solutions.
fn solve(
    runtime: &Runtime,
    model: Model,
    options: SearchOptions,
    time_limit: Option<Duration>,
    all_solutions: bool,
) -> RivuletResult<()> {
    let termination = Combinator::new(OsSignal::install(), time_limit.map(TimeBudget::starting_now));
    let names = model
        .variables
        .iter()
        .map(|(name, _)| name.clone())
        .collect::<Vec<_>>();
    let task = SearchTask::new(model.space, options).with_termination(termination);

    let mut stream = runtime.spawn_search(task)?;
    loop {
        let answer = stream
            .next(None)?
            .ok_or(RivuletError::Timeout("the search"))?;

        match answer {
            SearchAnswer::Solution(values) => {
                for (name, value) in names.iter().zip(values) {
                    println!("{name} = {value};");
                }
                println!("----------");

                if !all_solutions {
                    let _ = runtime.cancel(stream.group());
                    break;
                }
            }
            SearchAnswer::NoSolution {
                had_solutions: true,
            } => {
                println!("==========");
                break;
            }
            SearchAnswer::NoSolution {
                had_solutions: false,
            } => {
                println!("=====UNSATISFIABLE=====");
                break;
            }
            SearchAnswer::Unknown => {
                println!("=====UNKNOWN=====");
                break;
            }
        }
    }

    Ok(())
}
