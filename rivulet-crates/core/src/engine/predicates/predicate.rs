use std::fmt::Display;
use std::fmt::Formatter;

use crate::engine::variables::DomainId;

/// An atomic statement about the domain of a single variable.
///
/// Decisions made by search and the domain updates of propagators are all expressed as
/// predicates, which the [`Assignments`](crate::engine::Assignments) know how to apply.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    LowerBound {
        domain: DomainId,
        lower_bound: i32,
    },
    UpperBound {
        domain: DomainId,
        upper_bound: i32,
    },
    NotEqual {
        domain: DomainId,
        not_equal_constant: i32,
    },
    Equal {
        domain: DomainId,
        equality_constant: i32,
    },
}

impl Predicate {
    pub fn get_domain(&self) -> DomainId {
        match *self {
            Predicate::LowerBound { domain, .. }
            | Predicate::UpperBound { domain, .. }
            | Predicate::NotEqual { domain, .. }
            | Predicate::Equal { domain, .. } => domain,
        }
    }

    pub fn get_right_hand_side(&self) -> i32 {
        match *self {
            Predicate::LowerBound { lower_bound, .. } => lower_bound,
            Predicate::UpperBound { upper_bound, .. } => upper_bound,
            Predicate::NotEqual {
                not_equal_constant, ..
            } => not_equal_constant,
            Predicate::Equal {
                equality_constant, ..
            } => equality_constant,
        }
    }

    pub fn is_lower_bound_predicate(&self) -> bool {
        matches!(self, Predicate::LowerBound { .. })
    }

    pub fn is_upper_bound_predicate(&self) -> bool {
        matches!(self, Predicate::UpperBound { .. })
    }

    pub fn is_equality_predicate(&self) -> bool {
        matches!(self, Predicate::Equal { .. })
    }

    pub fn is_not_equal_predicate(&self) -> bool {
        matches!(self, Predicate::NotEqual { .. })
    }

    /// The predicate which holds exactly when `self` does not.
    ///
    /// Used by search to refute the alternative which was just explored.
    pub fn negated(&self) -> Predicate {
        match *self {
            Predicate::LowerBound {
                domain,
                lower_bound,
            } => Predicate::UpperBound {
                domain,
                upper_bound: lower_bound - 1,
            },
            Predicate::UpperBound {
                domain,
                upper_bound,
            } => Predicate::LowerBound {
                domain,
                lower_bound: upper_bound + 1,
            },
            Predicate::NotEqual {
                domain,
                not_equal_constant,
            } => Predicate::Equal {
                domain,
                equality_constant: not_equal_constant,
            },
            Predicate::Equal {
                domain,
                equality_constant,
            } => Predicate::NotEqual {
                domain,
                not_equal_constant: equality_constant,
            },
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::LowerBound {
                domain,
                lower_bound,
            } => write!(f, "[{domain} >= {lower_bound}]"),
            Predicate::UpperBound {
                domain,
                upper_bound,
            } => write!(f, "[{domain} <= {upper_bound}]"),
            Predicate::NotEqual {
                domain,
                not_equal_constant,
            } => write!(f, "[{domain} != {not_equal_constant}]"),
            Predicate::Equal {
                domain,
                equality_constant,
            } => write!(f, "[{domain} == {equality_constant}]"),
        }
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate;

    #[test]
    fn negating_a_bound_flips_it() {
        let x = DomainId::new(1);

        assert_eq!(predicate!(x <= 4), predicate!(x >= 5).negated());
        assert_eq!(predicate!(x >= 5), predicate!(x <= 4).negated());
        assert_eq!(predicate!(x != 2), predicate!(x == 2).negated());
    }

    #[test]
    fn predicates_display_with_their_domain() {
        let x = DomainId::new(7);

        assert_eq!("[x7 >= 3]", predicate!(x >= 3).to_string());
        assert_eq!("[x7 != -1]", predicate!(x != -1).to_string());
    }
}
