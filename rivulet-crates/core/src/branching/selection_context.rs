use crate::basic_types::Random;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;

/// What a distribution strategy may look at when choosing the next alternatives: the current
/// domains and a source of randomness.
#[derive(Debug)]
pub struct SelectionContext<'a> {
    assignments: &'a Assignments,
    random_generator: &'a mut dyn Random,
}

impl<'a> SelectionContext<'a> {
    pub fn new(assignments: &'a Assignments, random_generator: &'a mut dyn Random) -> Self {
        SelectionContext {
            assignments,
            random_generator,
        }
    }

    pub fn random(&mut self) -> &mut dyn Random {
        self.random_generator
    }

    pub fn lower_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.lower_bound(self.assignments)
    }

    pub fn upper_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.upper_bound(self.assignments)
    }

    pub fn contains<Var: IntegerVariable>(&self, var: &Var, value: i32) -> bool {
        var.contains(self.assignments, value)
    }

    pub fn is_integer_fixed<Var: IntegerVariable>(&self, var: &Var) -> bool {
        var.is_fixed(self.assignments)
    }

    pub fn get_size_of_domain<Var: IntegerVariable>(&self, var: &Var) -> u64 {
        var.iterate_domain(self.assignments).count() as u64
    }

    pub fn iterate_domain<'b, Var: IntegerVariable>(
        &'b self,
        var: &'b Var,
    ) -> impl Iterator<Item = i32> + 'b {
        var.iterate_domain(self.assignments)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::engine::Assignments;
    use crate::engine::DomainId;

    /// Assignments with one domain per `(lower_bound, upper_bound)` pair.
    pub(crate) fn assignments_for_testing(bounds: &[(i32, i32)]) -> (Assignments, Vec<DomainId>) {
        let mut assignments = Assignments::default();
        let domains = bounds
            .iter()
            .map(|&(lower_bound, upper_bound)| assignments.grow(lower_bound, upper_bound))
            .collect();
        (assignments, domains)
    }
}
