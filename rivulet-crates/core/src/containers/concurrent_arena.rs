use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::OnceLock;

const CHUNK_SIZE_LOG2: usize = 12;
const CHUNK_SIZE: usize = 1 << CHUNK_SIZE_LOG2;
const CHUNK_MASK: usize = CHUNK_SIZE - 1;

/// An append-only arena which can be grown and read concurrently without a global lock.
///
/// Slots are handed out by an atomic counter and live in fixed-size chunks which are allocated on
/// first use. A slot never moves once allocated, so references into the arena stay valid for the
/// lifetime of the arena. Nothing is freed before the arena itself is dropped.
pub(crate) struct ConcurrentArena<T> {
    chunks: Box<[OnceLock<Box<[T]>>]>,
    next_index: AtomicUsize,
    capacity: usize,
}

impl<T> std::fmt::Debug for ConcurrentArena<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentArena")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T: Default> ConcurrentArena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let num_chunks = capacity.div_ceil(CHUNK_SIZE);

        ConcurrentArena {
            chunks: (0..num_chunks).map(|_| OnceLock::new()).collect(),
            next_index: AtomicUsize::new(0),
            capacity,
        }
    }

    /// Reserves a fresh slot, returning its index and a reference to it, or `None` when the arena
    /// is at capacity.
    pub(crate) fn allocate(&self) -> Option<(usize, &T)> {
        let index = self
            .next_index
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |index| {
                (index < self.capacity).then_some(index + 1)
            })
            .ok()?;

        let chunk = self.chunks[index >> CHUNK_SIZE_LOG2]
            .get_or_init(|| (0..CHUNK_SIZE).map(|_| T::default()).collect());

        Some((index, &chunk[index & CHUNK_MASK]))
    }
}

impl<T> ConcurrentArena<T> {
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }

        self.chunks[index >> CHUNK_SIZE_LOG2]
            .get()
            .map(|chunk| &chunk[index & CHUNK_MASK])
    }

    /// The number of slots handed out so far.
    pub(crate) fn len(&self) -> usize {
        self.next_index.load(Ordering::Acquire)
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn allocation_stops_at_capacity() {
        let arena: ConcurrentArena<u32> = ConcurrentArena::with_capacity(3);

        assert!(arena.allocate().is_some());
        assert!(arena.allocate().is_some());
        assert!(arena.allocate().is_some());
        assert!(arena.allocate().is_none());
        assert_eq!(3, arena.len());
    }

    #[test]
    fn slots_spanning_chunks_are_reachable() {
        let arena: ConcurrentArena<Mutex<usize>> = ConcurrentArena::with_capacity(CHUNK_SIZE * 2);

        for _ in 0..CHUNK_SIZE + 5 {
            let (index, slot) = arena.allocate().expect("within capacity");
            *slot.lock().unwrap() = index;
        }

        let last = CHUNK_SIZE + 4;
        assert_eq!(last, *arena.get(last).unwrap().lock().unwrap());
        assert!(arena.get(last + 1).is_none());
    }

    #[test]
    fn concurrent_allocation_hands_out_unique_indices() {
        let arena: Arc<ConcurrentArena<u8>> = Arc::new(ConcurrentArena::with_capacity(10_000));

        let handles = (0..4)
            .map(|_| {
                let arena = Arc::clone(&arena);
                std::thread::spawn(move || {
                    (0..1000)
                        .map(|_| arena.allocate().expect("within capacity").0)
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();

        let mut indices = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();
        indices.sort_unstable();
        indices.dedup();

        assert_eq!(4000, indices.len());
    }
}
