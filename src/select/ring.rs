// src/select/ring.rs

/// A line held back because it may still turn out to be part of the tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailEntry {
    pub line_number: usize,
    pub text: String,
    /// Whether the filter matched when the line was read.
    pub matched: bool,
}

impl TailEntry {
    pub fn new(line_number: usize, text: impl Into<String>, matched: bool) -> Self {
        TailEntry {
            line_number,
            text: text.into(),
            matched,
        }
    }
}

/// Fixed-capacity circular buffer of the most recent lines.
///
/// Slots are filled in order until `capacity` is reached and are overwritten
/// in place from then on, so the buffer never holds more than `capacity`
/// entries. Pushing into a full buffer hands back the oldest entry.
#[derive(Debug)]
pub struct TailBuffer {
    slots: Vec<TailEntry>,
    capacity: usize,
    /// Oldest slot once full; unused while filling.
    cursor: usize,
    full: bool,
}

/// Upper bound on slots reserved up front. Huge capacities on short
/// streams should not cost memory for lines that never arrive.
const INITIAL_SLOTS: usize = 1024;

impl TailBuffer {
    /// `capacity` must be at least 1.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "tail buffer capacity must be positive");
        TailBuffer {
            slots: Vec::with_capacity(capacity.min(INITIAL_SLOTS)),
            capacity,
            cursor: 0,
            full: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Insert `entry`, returning the evicted oldest entry if the buffer was full.
    pub fn push(&mut self, entry: TailEntry) -> Option<TailEntry> {
        if !self.full {
            let len = self.slots.len();
            if len == self.slots.capacity() {
                // grow geometrically, but never past `capacity` slots
                self.slots.reserve_exact(len.max(1).min(self.capacity - len));
            }
            self.slots.push(entry);
            self.full = self.slots.len() == self.capacity;
            return None;
        }

        let evicted = std::mem::replace(&mut self.slots[self.cursor], entry);
        self.cursor = (self.cursor + 1) % self.capacity;
        Some(evicted)
    }

    /// Remove every resident entry, oldest first.
    pub fn drain(&mut self) -> Vec<TailEntry> {
        let mut entries = std::mem::take(&mut self.slots);
        entries.rotate_left(self.cursor);
        self.cursor = 0;
        self.full = false;
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize, text: &str, matched: bool) -> TailEntry {
        TailEntry::new(n, text, matched)
    }

    #[test]
    fn test_under_capacity() {
        let mut ring = TailBuffer::new(5);
        assert!(ring.push(entry(1, "a", false)).is_none());
        assert!(ring.push(entry(2, "b", true)).is_none());
        assert!(ring.push(entry(3, "c", false)).is_none());
        assert_eq!(ring.len(), 3);
        assert_eq!(
            ring.drain(),
            vec![entry(1, "a", false), entry(2, "b", true), entry(3, "c", false)]
        );
    }

    #[test]
    fn test_exact_capacity_does_not_evict() {
        let mut ring = TailBuffer::new(3);
        assert!(ring.push(entry(1, "a", false)).is_none());
        assert!(ring.push(entry(2, "b", true)).is_none());
        assert!(ring.push(entry(3, "c", false)).is_none());
        assert_eq!(ring.len(), 3);
        assert_eq!(
            ring.drain(),
            vec![entry(1, "a", false), entry(2, "b", true), entry(3, "c", false)]
        );
    }

    #[test]
    fn test_evicts_oldest_when_full() {
        let mut ring = TailBuffer::new(3);
        ring.push(entry(1, "a", false));
        ring.push(entry(2, "b", true));
        ring.push(entry(3, "c", false));

        assert_eq!(ring.push(entry(4, "d", false)), Some(entry(1, "a", false)));
        assert_eq!(ring.push(entry(5, "e", false)), Some(entry(2, "b", true)));
        assert_eq!(
            ring.drain(),
            vec![entry(3, "c", false), entry(4, "d", false), entry(5, "e", false)]
        );
    }

    #[test]
    fn test_wraps_around_twice() {
        let mut ring = TailBuffer::new(2);
        for (n, text, matched) in [(1, "a", true), (2, "b", false), (3, "c", false), (4, "d", true), (5, "e", false)] {
            ring.push(entry(n, text, matched));
        }
        assert_eq!(ring.capacity(), 2);
        assert_eq!(ring.drain(), vec![entry(4, "d", true), entry(5, "e", false)]);
    }

    #[test]
    fn test_capacity_one() {
        let mut ring = TailBuffer::new(1);
        assert!(ring.push(entry(1, "a", true)).is_none());
        assert_eq!(ring.push(entry(2, "b", false)), Some(entry(1, "a", true)));
        assert_eq!(ring.drain(), vec![entry(2, "b", false)]);
    }

    #[test]
    fn test_storage_never_exceeds_capacity() {
        for capacity in [1, 1023, 1024, 1025, 3000] {
            let mut ring = TailBuffer::new(capacity);
            for n in 1..=capacity + 5 {
                ring.push(entry(n, "x", false));
                assert!(
                    ring.slots.capacity() <= capacity,
                    "capacity {} grew to {} slots",
                    capacity,
                    ring.slots.capacity()
                );
            }
            assert_eq!(ring.len(), capacity);
        }
    }

    #[test]
    fn test_drain_empties_buffer() {
        let mut ring = TailBuffer::new(4);
        assert!(ring.drain().is_empty());
        ring.push(entry(1, "a", false));
        ring.drain();
        assert!(ring.is_empty());
        assert!(ring.drain().is_empty());
    }
}
