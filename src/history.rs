//! Fixed-capacity rolling history of power samples
//!
//! [`RollingWindow`] keeps the most recent `capacity` samples in insertion
//! order (oldest first). It starts pre-filled so the sparkline always has a
//! full set of points to draw, and every append evicts the oldest entry once
//! the window is full.
//!
//! The window itself does no synchronization. It is owned by the UI thread
//! and only ever mutated from there; readers that need to hold on to the
//! contents take a [`RollingWindow::snapshot`].

use crate::error::{OverlayError, Result};
use crate::types::Sample;
use std::collections::VecDeque;

/// Ring buffer of the most recent power samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl RollingWindow {
    /// Create a window of exactly `capacity` entries, all equal to `fill_value`
    pub fn new(capacity: usize, fill_value: Sample) -> Result<Self> {
        if capacity == 0 {
            return Err(OverlayError::InvalidArgument(
                "rolling window capacity must be greater than zero".to_string(),
            ));
        }

        let mut samples = VecDeque::with_capacity(capacity + 1);
        samples.resize(capacity, fill_value);

        Ok(Self { samples, capacity })
    }

    /// Append a sample as the newest entry, evicting the oldest if full
    ///
    /// Values are stored as-is; clamping only happens when drawing.
    pub fn append(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Copy of the current contents, oldest to newest
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    /// Iterate samples oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Most recently appended sample
    pub fn latest(&self) -> Option<Sample> {
        self.samples.back().copied()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HISTORY_CAPACITY;

    #[test]
    fn test_new_is_prefilled() {
        let window = RollingWindow::new(HISTORY_CAPACITY, 0).unwrap();
        assert_eq!(window.len(), HISTORY_CAPACITY);
        assert!(window.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = RollingWindow::new(0, 0).unwrap_err();
        assert!(matches!(err, OverlayError::InvalidArgument(_)));
    }

    #[test]
    fn test_append_evicts_oldest() {
        let mut window = RollingWindow::new(3, 7).unwrap();
        window.append(1);
        assert_eq!(window.snapshot(), vec![7, 7, 1]);
        window.append(2);
        window.append(3);
        window.append(4);
        assert_eq!(window.snapshot(), vec![2, 3, 4]);
        assert_eq!(window.latest(), Some(4));
    }

    #[test]
    fn test_fifty_appends_keep_last_forty_eight() {
        let mut window = RollingWindow::new(HISTORY_CAPACITY, 0).unwrap();
        for value in 1..=50 {
            window.append(value);
        }
        let expected: Vec<Sample> = (3..=50).collect();
        assert_eq!(window.snapshot(), expected);
    }

    #[test]
    fn test_out_of_range_values_stored_unclamped() {
        let mut window = RollingWindow::new(2, 0).unwrap();
        window.append(25_000);
        window.append(-9_999);
        assert_eq!(window.snapshot(), vec![25_000, -9_999]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut window = RollingWindow::new(4, 0).unwrap();
        let before = window.snapshot();
        window.append(42);
        assert_eq!(before, vec![0, 0, 0, 0]);
        assert_eq!(window.latest(), Some(42));
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_short_sequences_land_at_the_end(
            values in prop::collection::vec(any::<i64>(), 0..=HISTORY_CAPACITY)
        ) {
            let mut window = RollingWindow::new(HISTORY_CAPACITY, 0).unwrap();
            for &v in &values {
                window.append(v);
            }

            let snapshot = window.snapshot();
            prop_assert_eq!(snapshot.len(), HISTORY_CAPACITY);

            let tail = &snapshot[HISTORY_CAPACITY - values.len()..];
            prop_assert_eq!(tail, values.as_slice());

            // Untouched prefix keeps the fill value
            let head = &snapshot[..HISTORY_CAPACITY - values.len()];
            prop_assert!(head.iter().all(|&s| s == 0));
        }

        #[test]
        fn test_long_sequences_keep_most_recent(
            values in prop::collection::vec(-5_000i64..5_000, HISTORY_CAPACITY + 1..200)
        ) {
            let mut window = RollingWindow::new(HISTORY_CAPACITY, 0).unwrap();
            for &v in &values {
                window.append(v);
            }

            let expected = &values[values.len() - HISTORY_CAPACITY..];
            prop_assert_eq!(window.snapshot(), expected.to_vec());
        }

        #[test]
        fn test_length_never_exceeds_capacity(
            capacity in 1usize..64,
            appends in 0usize..256
        ) {
            let mut window = RollingWindow::new(capacity, 0).unwrap();
            for i in 0..appends {
                window.append(i as i64);
                prop_assert!(window.len() <= capacity);
            }
            prop_assert_eq!(window.len(), capacity);
        }
    }
}
