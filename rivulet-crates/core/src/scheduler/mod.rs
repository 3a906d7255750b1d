//! Lightweight threads on a work-stealing pool of workers.
//!
//! A thread is a [`Computation`] stepped one quantum at a time. A quantum ends when the
//! computation yields, finishes, fails, or reads a variable which is still unbound; in the last
//! case the thread is parked on the suspension lists of the variables it read and the worker moves
//! on. Binding any of those variables to a failure, or all of them to values, puts the thread back
//! in the run queue.
mod computation;
mod context;
mod group;
mod thread;
mod worker;
mod worker_pool;

pub use computation::*;
pub use context::ThreadContext;
pub use group::GroupId;
pub use thread::ThreadHandle;
pub use thread::ThreadId;
pub use thread::ThreadStatus;
pub(crate) use worker_pool::Scheduler;
pub use worker_pool::SchedulerStatistics;
pub use worker_pool::ThreadFailure;
