//! Fixed-capacity trailing buffer of recent samples

use std::collections::VecDeque;

/// FIFO that keeps the last `capacity` samples in chronological order.
/// Pushing onto a full window evicts the oldest sample. The capacity is at
/// least 1.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T: Copy> SlidingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: T) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest(&self) -> Option<T> {
        self.samples.front().copied()
    }

    pub fn newest(&self) -> Option<T> {
        self.samples.back().copied()
    }

    /// (oldest, newest) once at least two samples are buffered
    pub fn span(&self) -> Option<(T, T)> {
        if self.samples.len() < 2 {
            return None;
        }
        Some((self.oldest()?, self.newest()?))
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl SlidingWindow<f32> {
    /// newest − oldest, the change across the whole window
    pub fn delta(&self) -> Option<f32> {
        self.span().map(|(oldest, newest)| newest - oldest)
    }
}
