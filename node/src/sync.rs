//! Sync progress tracking.

use std::sync::{Arc, Mutex, PoisonError};
use tessera_types::{Clock, Timestamp};

/// Cumulative blocks applied and when the chain last moved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncTime {
    pub blocks_changed: u64,
    pub last_change: Timestamp,
}

pub struct SyncTracker {
    clock: Arc<dyn Clock>,
    state: Mutex<SyncTime>,
}

impl SyncTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(SyncTime::default()),
        }
    }

    pub fn current(&self) -> SyncTime {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `count` newly applied blocks.
    ///
    /// Returns the sync time after the call and whether it changed. A zero
    /// count changes nothing.
    pub fn add_blocks_changed(&self, count: u64) -> (SyncTime, bool) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if count == 0 {
            return (*state, false);
        }
        state.blocks_changed = state.blocks_changed.saturating_add(count);
        state.last_change = self.clock.now();
        (*state, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_nullables::NullClock;

    #[test]
    fn zero_blocks_is_not_a_change() {
        let tracker = SyncTracker::new(Arc::new(NullClock::new(50)));
        let (time, changed) = tracker.add_blocks_changed(0);
        assert!(!changed);
        assert_eq!(time, SyncTime::default());
    }

    #[test]
    fn blocks_accumulate_with_clock_time() {
        let clock = Arc::new(NullClock::new(100));
        let tracker = SyncTracker::new(clock.clone());

        let (time, changed) = tracker.add_blocks_changed(2);
        assert!(changed);
        assert_eq!(time.blocks_changed, 2);
        assert_eq!(time.last_change, Timestamp::new(100));

        clock.advance(30);
        let (time, _) = tracker.add_blocks_changed(3);
        assert_eq!(time.blocks_changed, 5);
        assert_eq!(time.last_change, Timestamp::new(130));
        assert_eq!(tracker.current(), time);
    }
}
