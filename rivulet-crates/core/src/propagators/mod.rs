//! Propagator implementations. Use the functions in [`crate::constraints`] to post them.
mod all_different;
mod arithmetic;
mod element;
mod member_of;

pub(crate) use all_different::*;
pub(crate) use arithmetic::*;
pub(crate) use element::*;
pub(crate) use member_of::*;
