use super::domain::IntegerDomain;
use super::variables::DomainId;
use super::variables::IntegerVariable;
use super::Assignments;

/// A complete assignment of the variables of a constraint space.
///
/// The solution is detached from the space it came from, so it stays valid while search moves on.
#[derive(Clone, Debug, Default)]
pub struct Solution {
    assignments: Assignments,
}

impl Solution {
    /// Copies the current domains, which must all be fixed. Nothing of the trail is copied.
    pub(crate) fn from_assignments(assignments: &Assignments) -> Solution {
        let mut copy = Assignments::default();
        for domain in assignments.get_domains() {
            let value = assignments.get_lower_bound(domain);
            let _ = copy.grow_with_domain(IntegerDomain::new(value, value));
        }
        Solution { assignments: copy }
    }

    pub fn num_domains(&self) -> usize {
        self.assignments.num_domains()
    }

    pub fn get_domains(&self) -> impl Iterator<Item = DomainId> {
        self.assignments.get_domains()
    }

    pub fn get_integer_value<Var: IntegerVariable>(&self, var: Var) -> i32 {
        var.lower_bound(&self.assignments)
    }

    /// The values of `variables`, in order.
    pub fn get_integer_values<Var: IntegerVariable>(
        &self,
        variables: impl IntoIterator<Item = Var>,
    ) -> Vec<i32> {
        variables
            .into_iter()
            .map(|var| self.get_integer_value(var))
            .collect()
    }
}
