use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Bounded sample count per instrument (~10 minutes at one tick per second).
pub const HISTORY_CAPACITY: usize = 600;

/// A timestamped price sample.
#[derive(Clone, Debug, PartialEq)]
pub struct PricePoint {
    pub ts: DateTime<Utc>,
    pub price: f64,
}

/// Fixed-capacity FIFO of the most recent samples for one instrument,
/// ordered oldest first. The oldest sample is evicted once the window is
/// full. Timestamps are non-decreasing because samples are pushed in
/// arrival order; duplicates by timestamp are allowed.
#[derive(Debug)]
pub struct PriceHistory {
    points: VecDeque<PricePoint>,
    capacity: usize,
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: PricePoint) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The n-th most recent sample, 1-based: `recent(1)` is the newest.
    pub fn recent(&self, n: usize) -> Option<&PricePoint> {
        if n == 0 || n > self.points.len() {
            return None;
        }
        self.points.get(self.points.len() - n)
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    pub fn oldest(&self) -> Option<&PricePoint> {
        self.points.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }
}
