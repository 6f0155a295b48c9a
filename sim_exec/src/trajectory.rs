//! # Trajectory recorder
//!
//! Bounded history of the positions the vehicle has visited, used by the
//! presentation layer to draw the trail behind the vehicle. The recorder is a
//! pure observer and never influences the simulation state.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum number of positions retained in the history.
pub const TRAJECTORY_CAPACITY: usize = 200;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Bounded FIFO history of visited positions.
#[derive(Clone, Debug)]
pub struct TrajectoryRecorder {
    history: VecDeque<Point2<f64>>,

    capacity: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryRecorder {
    /// Create a new recorder holding at most `capacity` positions.
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a position to the history, evicting the oldest entry if the
    /// capacity has been reached.
    pub fn record(&mut self, position_px: Point2<f64>) {
        if self.history.len() >= self.capacity {
            self.history.pop_front();
        }

        self.history.push_back(position_px);
    }

    /// Iterate over the recorded positions, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &Point2<f64>> {
        self.history.iter()
    }

    /// Get a copy of the history, oldest first, for archiving or rendering.
    pub fn snapshot(&self) -> Vec<Point2<f64>> {
        self.history.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Discard the entire history.
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl Default for TrajectoryRecorder {
    fn default() -> Self {
        Self::new(TRAJECTORY_CAPACITY)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fifo_eviction() {
        let mut recorder = TrajectoryRecorder::default();

        for i in 0..250 {
            recorder.record(Point2::new(i as f64, 0.0));
        }

        // Capacity is never exceeded
        assert_eq!(recorder.len(), TRAJECTORY_CAPACITY);

        // The oldest 50 entries have been evicted, in order
        let snapshot = recorder.snapshot();
        assert_eq!(snapshot[0], Point2::new(50.0, 0.0));
        assert_eq!(snapshot[199], Point2::new(249.0, 0.0));

        for (i, point) in recorder.points().enumerate() {
            assert_eq!(point.x, (i + 50) as f64);
        }
    }

    #[test]
    fn test_clear() {
        let mut recorder = TrajectoryRecorder::default();

        recorder.record(Point2::new(1.0, 2.0));
        recorder.record(Point2::new(3.0, 4.0));
        assert_eq!(recorder.len(), 2);

        recorder.clear();

        assert!(recorder.is_empty());
    }
}
