use std::fmt::Debug;
use std::ops::Range;

use rand::Rng;
use rand::SeedableRng;

/// Abstraction for randomness so that selectors can be driven by a seeded generator in production
/// and a scripted one in tests.
pub trait Random: Debug + Send {
    /// Generates a random usize uniformly from `[range.start, range.end)`.
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize;

    /// Generates a bool which is true with the given probability.
    fn generate_bool(&mut self, probability: f64) -> bool;
}

impl<T> Random for T
where
    T: SeedableRng + Rng + Debug + Send,
{
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
        self.gen_range(range)
    }

    fn generate_bool(&mut self, probability: f64) -> bool {
        self.gen_bool(probability)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::Random;

    /// Hands out a fixed script of values, panicking once it runs out.
    #[derive(Debug, Default)]
    pub(crate) struct TestRandom {
        pub(crate) usizes: Vec<usize>,
        pub(crate) bools: Vec<bool>,
    }

    impl Random for TestRandom {
        fn generate_usize_in_range(&mut self, range: std::ops::Range<usize>) -> usize {
            let selected = self.usizes.remove(0);
            assert!(range.contains(&selected));
            selected
        }

        fn generate_bool(&mut self, _probability: f64) -> bool {
            self.bools.remove(0)
        }
    }
}
