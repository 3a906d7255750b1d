//! The interface between propagators and the engine.
//!
//! A propagator is built by a [`PropagatorConstructor`], which registers watches on domain events
//! through the [`PropagatorConstructorContext`]. During propagation the engine hands it a
//! [`PropagationContextMut`] through which all domain updates flow, so that the engine can find
//! out which other propagators must be enqueued.
mod constructor;
mod contexts;
mod propagator;
mod propagator_id;
mod propagator_queue;
mod watch_list;

pub use constructor::*;
pub(crate) use contexts::record_events;
pub(crate) use contexts::PendingEvents;
pub use contexts::PropagationContext;
pub use contexts::PropagationContextMut;
pub use contexts::ReadDomains;
pub use propagator::*;
pub use propagator_id::*;
pub(crate) use propagator_queue::PropagatorQueue;
pub(crate) use watch_list::WatchList;
pub use watch_list::Watchers;
