use std::iter::Rev;
use std::vec::Drain;

use crate::rivulet_assert_simple;

/// An undo log partitioned into checkpoints.
///
/// Entries pushed after [`Trail::new_checkpoint`] are handed back, newest first, when the trail
/// is synchronised to an earlier checkpoint. The cost of going back is proportional to the number
/// of entries that were pushed since that checkpoint.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    current_checkpoint: usize,
    /// At index i is the trail length at the moment checkpoint i + 1 was opened.
    checkpoint_starts: Vec<usize>,
    entries: Vec<T>,
}

impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            current_checkpoint: 0,
            checkpoint_starts: Vec::new(),
            entries: Vec::new(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn new_checkpoint(&mut self) {
        self.current_checkpoint += 1;
        self.checkpoint_starts.push(self.entries.len());
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.current_checkpoint
    }

    /// Go back to `new_checkpoint`, yielding the undone entries in reverse push order.
    pub(crate) fn synchronise(&mut self, new_checkpoint: usize) -> Rev<Drain<'_, T>> {
        rivulet_assert_simple!(new_checkpoint < self.current_checkpoint);

        let new_len = self.checkpoint_starts[new_checkpoint];

        self.current_checkpoint = new_checkpoint;
        self.checkpoint_starts.truncate(new_checkpoint);
        self.entries.drain(new_len..).rev()
    }

    pub(crate) fn push(&mut self, entry: T) {
        self.entries.push(entry)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synchronising_undoes_newest_entries_first() {
        let mut trail = Trail::default();
        trail.push('r');

        trail.new_checkpoint();
        trail.push('a');
        trail.push('b');
        trail.new_checkpoint();
        trail.push('c');

        let undone = trail.synchronise(0).collect::<String>();

        assert_eq!("cba", undone);
        assert_eq!(1, trail.len());
        assert_eq!(0, trail.get_checkpoint());
    }

    #[test]
    fn synchronising_keeps_entries_of_older_checkpoints() {
        let mut trail = Trail::default();

        trail.new_checkpoint();
        trail.push(1);
        trail.new_checkpoint();
        trail.push(2);
        trail.new_checkpoint();

        assert_eq!(vec![2], trail.synchronise(1).collect::<Vec<_>>());
        assert_eq!(1, trail.len());

        trail.new_checkpoint();
        assert_eq!(2, trail.get_checkpoint());
    }

    #[test]
    fn empty_checkpoints_undo_nothing() {
        let mut trail: Trail<u8> = Trail::default();

        trail.new_checkpoint();
        trail.new_checkpoint();

        assert_eq!(0, trail.synchronise(0).count());
    }
}
