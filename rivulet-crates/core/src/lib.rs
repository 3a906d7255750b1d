//! # Rivulet
//! The execution core of the Rivulet runtime: single-assignment dataflow variables, lightweight
//! threads which synchronise on them, and a finite-domain constraint engine with depth-first
//! search layered on top.
//!
//! A [`Runtime`] owns a [`VariableStore`](store::VariableStore) and a pool of worker threads.
//! Lightweight threads are [`Computation`](scheduler::Computation)s which are stepped one quantum
//! at a time; reading a variable which is still unbound suspends the thread until the variable is
//! determined.
//!
//! ```rust
//! # use std::time::Duration;
//! # use rivulet_core::Runtime;
//! # use rivulet_core::scheduler::Step;
//! # use rivulet_core::scheduler::StepResult;
//! # use rivulet_core::scheduler::ThreadContext;
//! # use rivulet_core::store::Determination;
//! # use rivulet_core::store::Value;
//! let runtime = Runtime::default();
//! let x = runtime.new_variable().unwrap();
//! let y = runtime.new_variable().unwrap();
//!
//! let _ = runtime
//!     .spawn(move |context: &mut ThreadContext<'_>| -> StepResult {
//!         let value = context.read_int(x)?;
//!         context.bind(y, 2 * value)?;
//!         Ok(Step::Done)
//!     })
//!     .unwrap();
//!
//! runtime.bind(x, 21).unwrap();
//! assert_eq!(
//!     Some(Determination::Bound(Value::Int(42))),
//!     runtime.wait_determined(y, Some(Duration::from_secs(10)))
//! );
//! ```
//!
//! Constraint problems are stated on a [`ConstraintSpace`](engine::ConstraintSpace) and solved by
//! a [`SearchTask`](search::SearchTask), either directly or inside the runtime through
//! [`Runtime::spawn_search`].
//!
//! ```rust
//! # use rivulet_core::constraints;
//! # use rivulet_core::constraints::Constraint;
//! # use rivulet_core::engine::ConstraintSpace;
//! # use rivulet_core::search::SearchOptions;
//! # use rivulet_core::search::SearchTask;
//! # use rivulet_core::search::SolveResult;
//! let mut space = ConstraintSpace::default();
//! let x = space.new_boolean();
//! let y = space.new_boolean();
//! constraints::not_all(vec![x, y])
//!     .post(&mut space)
//!     .expect("the space is consistent");
//!
//! let mut task = SearchTask::new(space, SearchOptions::default());
//! let mut num_solutions = 0;
//! while let SolveResult::Solution(_) = task.next_solution() {
//!     num_solutions += 1;
//! }
//! assert_eq!(3, num_solutions);
//! ```
#[doc(hidden)]
pub mod asserts;
pub mod basic_types;
pub mod containers;
pub(crate) mod propagators;

pub mod branching;
pub mod constraints;
pub mod engine;
pub mod gateway;
pub mod scheduler;
pub mod search;
pub mod statistics;
pub mod store;
pub mod termination;

mod runtime;

pub use convert_case;
pub use rand;

pub use crate::basic_types::ConstraintOperationError;
pub use crate::basic_types::Random;
pub use crate::basic_types::RuntimeError;
pub use crate::runtime::Runtime;
pub use crate::runtime::RuntimeOptions;
pub use crate::runtime::SearchAnswer;
pub use crate::runtime::SolutionStream;
