//! # Rivulet
//! The user-facing crate of the Rivulet runtime. It re-exports the execution core as
//! [`core`](rivulet_core) and bundles a few ready-made constraint models and dataflow programs
//! which are used by the `rivulet` binary.
pub mod demos;
pub mod models;

pub use rivulet_core as core;
