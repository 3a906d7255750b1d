use super::Direction;

/// Keeps the first variable with the best value, so the outcome only depends on the order in
/// which the variables are considered.
#[derive(Debug)]
pub struct InOrderTieBreaker<Var, Value> {
    selected: Option<(Var, Value)>,
    direction: Direction,
}

impl<Var, Value: PartialOrd> InOrderTieBreaker<Var, Value> {
    pub fn new(direction: Direction) -> Self {
        InOrderTieBreaker {
            selected: None,
            direction,
        }
    }

    pub fn consider(&mut self, variable: Var, value: Value) {
        let improves = match &self.selected {
            None => true,
            Some((_, best)) => match self.direction {
                Direction::Minimum => value < *best,
                Direction::Maximum => value > *best,
            },
        };
        if improves {
            self.selected = Some((variable, value));
        }
    }

    /// The selected variable. The tie breaker is reset afterwards.
    pub fn select(&mut self) -> Option<Var> {
        self.selected.take().map(|(variable, _)| variable)
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_first_of_equal_values_is_kept() {
        let mut breaker = InOrderTieBreaker::new(Direction::Minimum);

        breaker.consider('a', 3);
        breaker.consider('b', 1);
        breaker.consider('c', 1);

        assert_eq!(Some('b'), breaker.select());
        assert_eq!(None, breaker.select());
    }

    #[test]
    fn maximum_prefers_larger_values() {
        let mut breaker = InOrderTieBreaker::new(Direction::Maximum);

        breaker.consider('a', 3);
        breaker.consider('b', 5);
        breaker.consider('c', 5);

        assert_eq!(Direction::Maximum, breaker.get_direction());
        assert_eq!(Some('b'), breaker.select());
    }
}
