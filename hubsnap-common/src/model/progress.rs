use serde::{Deserialize, Serialize};

/// One observation of a snapshot's overall progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotProgress {
    /// Overall completion in `0.0..=1.0`. Never decreases within one snapshot.
    pub fraction: f64,
    pub completed_files: usize,
    pub total_files: usize,
    /// File whose transfer produced this update, if any.
    pub current_file: Option<String>,
}

impl SnapshotProgress {
    pub fn is_complete(&self) -> bool {
        self.completed_files >= self.total_files
    }
}

/// Aggregates per-file transfer fractions into a weighted overall fraction.
///
/// Each of the `total` files owns a `1/total` slice. The slice of the file in flight grows
/// with its transfer fraction and is pinned to its full weight by [`complete_file`].
///
/// [`complete_file`]: ProgressTracker::complete_file
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: usize,
    completed: usize,
    current: f64,
    reported: f64,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            current: 0.0,
            reported: 0.0,
        }
    }

    /// Records the in-flight file's transfer fraction and returns the overall value.
    /// Out-of-range or regressing fractions are clamped.
    pub fn update_file(&mut self, fraction: f64) -> f64 {
        if fraction.is_finite() {
            self.current = self.current.max(fraction.clamp(0.0, 1.0));
        }
        self.recompute()
    }

    /// Marks the in-flight file as done, whatever its transfer last reported.
    pub fn complete_file(&mut self) -> f64 {
        self.completed = (self.completed + 1).min(self.total);
        self.current = 0.0;
        self.recompute()
    }

    pub fn progress(&self, current_file: Option<&str>) -> SnapshotProgress {
        SnapshotProgress {
            fraction: self.reported,
            completed_files: self.completed,
            total_files: self.total,
            current_file: current_file.map(str::to_string),
        }
    }

    fn recompute(&mut self) -> f64 {
        let value = if self.total == 0 || self.completed >= self.total {
            1.0
        } else {
            let weight = 1.0 / self.total as f64;
            ((self.completed as f64 + self.current) * weight).min(1.0)
        };
        self.reported = self.reported.max(value);
        self.reported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_is_immediately_complete() {
        let mut tracker = ProgressTracker::new(0);
        assert_eq!(tracker.update_file(0.0), 1.0);
        assert!(tracker.progress(None).is_complete());
    }

    #[test]
    fn file_fractions_fill_weighted_slices() {
        let mut tracker = ProgressTracker::new(4);
        assert_eq!(tracker.update_file(0.5), 0.125);
        assert_eq!(tracker.complete_file(), 0.25);
        assert_eq!(tracker.update_file(1.0), 0.5);
        assert_eq!(tracker.complete_file(), 0.5);
    }

    #[test]
    fn never_moves_backwards() {
        let mut tracker = ProgressTracker::new(3);
        let mut seen = vec![
            tracker.update_file(0.9),
            tracker.update_file(0.2),
            tracker.update_file(f64::NAN),
            tracker.update_file(7.0),
        ];
        seen.push(tracker.complete_file());
        seen.push(tracker.update_file(-1.0));
        seen.push(tracker.complete_file());
        seen.push(tracker.complete_file());
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
        assert_eq!(tracker.progress(None).fraction, 1.0);
    }

    #[test]
    fn reaches_exactly_one_with_uneven_weights() {
        let mut tracker = ProgressTracker::new(7);
        for _ in 0..7 {
            tracker.update_file(0.333);
            tracker.complete_file();
        }
        let progress = tracker.progress(None);
        assert_eq!(progress.fraction, 1.0);
        assert_eq!(progress.completed_files, 7);
    }
}
