// src/replay.rs

use tgcalls_wire::ReplayError;

/// Sorted list of recently-seen counters (§3 `IncomingReplayWindow`).
///
/// Holds at most `window_size` entries; rejects any counter already
/// present or older than `largest_seen - window_size`.
#[derive(Debug, Default)]
pub struct ReplayWindow {
    seen: Vec<u32>,
    largest: Option<u32>,
}

impl ReplayWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to register `counter` as seen. On success the counter is
    /// inserted in sorted order and entries older than the new horizon are
    /// pruned.
    pub fn register(&mut self, counter: u32, window_size: u32) -> Result<(), ReplayError> {
        if let Some(largest) = self.largest {
            if counter.saturating_add(window_size) <= largest {
                return Err(ReplayError::TooOld);
            }
        }

        if self.seen.binary_search(&counter).is_ok() {
            return Err(ReplayError::AlreadySeen);
        }

        let idx = self.seen.partition_point(|&c| c < counter);
        self.seen.insert(idx, counter);
        self.largest = Some(self.largest.map_or(counter, |l| l.max(counter)));

        let horizon = self.largest.unwrap().saturating_sub(window_size);
        self.seen.retain(|&c| c > horizon);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_monotonic_counters() {
        let mut w = ReplayWindow::new();
        assert!(w.register(1, 64).is_ok());
        assert!(w.register(2, 64).is_ok());
        assert!(w.register(3, 64).is_ok());
    }

    #[test]
    fn rejects_duplicate() {
        let mut w = ReplayWindow::new();
        w.register(5, 64).unwrap();
        assert_eq!(w.register(5, 64), Err(ReplayError::AlreadySeen));
    }

    #[test]
    fn rejects_too_old() {
        let mut w = ReplayWindow::new();
        w.register(1000, 64).unwrap();
        assert_eq!(w.register(900, 64), Err(ReplayError::TooOld));
    }

    #[test]
    fn accepts_reordered_within_window() {
        let mut w = ReplayWindow::new();
        w.register(100, 64).unwrap();
        assert!(w.register(90, 64).is_ok());
        assert!(w.register(95, 64).is_ok());
    }

    #[test]
    fn prunes_entries_outside_window() {
        let mut w = ReplayWindow::new();
        for c in 1..=200u32 {
            w.register(c, 64).unwrap();
        }
        assert!(w.seen.len() <= 65);
        assert_eq!(w.register(100, 64), Err(ReplayError::TooOld));
    }
}
