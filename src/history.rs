// Bounded FIFO of working-resolution frames.
// Only the two newest entries are ever read; the bound just caps memory.

use std::collections::VecDeque;

use crate::types::Frame;

pub const DEFAULT_HISTORY_CAPACITY: usize = 60;

#[derive(Debug, Clone)]
pub struct FrameHistory {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl Default for FrameHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl FrameHistory {
    /// A capacity below 2 would never allow a diff, so it is raised to 2.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a frame, evicting the oldest once the bound is exceeded.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push_back(frame);
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    pub fn current(&self) -> Option<&Frame> {
        self.frames.back()
    }

    pub fn previous(&self) -> Option<&Frame> {
        let n = self.frames.len();
        if n < 2 { None } else { self.frames.get(n - 2) }
    }

    /// Drop everything except the newest frame.
    pub fn keep_latest(&mut self) {
        let excess = self.frames.len().saturating_sub(1);
        self.frames.drain(..excess);
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Clear and hand the backing storage back to the allocator.
    pub fn release(&mut self) {
        self.frames = VecDeque::new();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
