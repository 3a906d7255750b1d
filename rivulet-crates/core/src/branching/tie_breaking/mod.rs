//! Tie breakers decide between variables which a selector rates equally.
mod in_order_tie_breaker;

pub use in_order_tie_breaker::*;

/// Whether a selector looks for the variable with the smallest or the largest value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Maximum,
    Minimum,
}
