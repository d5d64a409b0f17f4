use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use crate::clock::{Clock, Status};

/// Read-only copy of one lap, for rendering and layout.
#[derive(Clone, Debug)]
pub struct Lap {
    pub started_at: SystemTime,
    pub ended_at: Option<SystemTime>,
    pub elapsed_ms: u64,
}

struct Entry {
    started_at: SystemTime,
    ended_at: Option<SystemTime>,
    elapsed: AtomicU64,
}

/// Append-only lap ledger. The foreground thread appends and closes
/// laps; the tick thread only ever adds to the last entry's counter,
/// so closed laps are immutable once their end time is stamped.
pub struct Ledger {
    clock: Arc<Clock>,
    laps: RwLock<Vec<Entry>>,
}

impl Ledger {
    pub fn new(clock: Arc<Clock>) -> Self {
        Self {
            clock,
            laps: RwLock::new(Vec::new()),
        }
    }

    /// Append a fresh lap with a zeroed counter and return its index.
    pub fn start_new(&self, now: SystemTime) -> usize {
        let mut laps = self.laps.write().unwrap();
        laps.push(Entry {
            started_at: now,
            ended_at: None,
            elapsed: AtomicU64::new(0),
        });
        laps.len() - 1
    }

    /// Stamp the end time on the current lap. A lap is closed at most
    /// once; repeat calls keep the first stamp.
    pub fn close_current(&self, now: SystemTime) {
        let mut laps = self.laps.write().unwrap();
        if let Some(last) = laps.last_mut() {
            if last.ended_at.is_none() {
                last.ended_at = Some(now);
            }
        }
    }

    /// Advance the current lap by one quantum, gated on the clock.
    /// Called from the tick thread. The counter update is a single
    /// atomic add, so a concurrent display read never sees a torn or
    /// decreasing value, only one that is at most a quantum stale.
    pub fn tick(&self, quantum_ms: u64) {
        if self.clock.get() != Status::Running {
            return;
        }
        let laps = self.laps.read().unwrap();
        if let Some(last) = laps.last() {
            last.elapsed.fetch_add(quantum_ms, Ordering::Relaxed);
        }
    }

    pub fn len(&self) -> usize {
        self.laps.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out one lap. Callers bound `index` by `len()`.
    pub fn at(&self, index: usize) -> Lap {
        let laps = self.laps.read().unwrap();
        let entry = &laps[index];
        Lap {
            started_at: entry.started_at,
            ended_at: entry.ended_at,
            elapsed_ms: entry.elapsed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_ledger() -> (Arc<Clock>, Ledger) {
        let clock = Arc::new(Clock::new());
        let ledger = Ledger::new(clock.clone());
        ledger.start_new(SystemTime::UNIX_EPOCH);
        (clock, ledger)
    }

    #[test]
    fn test_tick_accumulates_while_running() {
        let (_clock, ledger) = running_ledger();
        for _ in 0..10 {
            ledger.tick(100);
        }
        assert_eq!(ledger.at(0).elapsed_ms, 1_000);
    }

    #[test]
    fn test_tick_is_noop_while_paused() {
        let (clock, ledger) = running_ledger();
        ledger.tick(100);
        clock.set(Status::Paused);
        ledger.tick(100);
        ledger.tick(100);
        clock.set(Status::Running);
        ledger.tick(100);
        assert_eq!(ledger.at(0).elapsed_ms, 200);
    }

    #[test]
    fn test_tick_after_stop_does_not_mutate() {
        let (clock, ledger) = running_ledger();
        ledger.tick(100);
        clock.set(Status::Stopped);
        // A racing tick that lost the shutdown race must not advance
        // the counter.
        ledger.tick(100);
        assert_eq!(ledger.at(0).elapsed_ms, 100);
    }

    #[test]
    fn test_new_lap_lifecycle() {
        let (_clock, ledger) = running_ledger();
        for i in 0..5 {
            ledger.tick(100);
            ledger.close_current(SystemTime::UNIX_EPOCH);
            let index = ledger.start_new(SystemTime::UNIX_EPOCH);
            assert_eq!(index, i + 1);
        }
        assert_eq!(ledger.len(), 6);
        for index in 0..5 {
            assert!(ledger.at(index).ended_at.is_some());
        }
        let current = ledger.at(5);
        assert!(current.ended_at.is_none());
        assert_eq!(current.elapsed_ms, 0);
    }

    #[test]
    fn test_closed_lap_counter_is_frozen() {
        let (_clock, ledger) = running_ledger();
        ledger.tick(250);
        ledger.close_current(SystemTime::UNIX_EPOCH);
        ledger.start_new(SystemTime::UNIX_EPOCH);
        ledger.tick(100);
        ledger.tick(100);
        assert_eq!(ledger.at(0).elapsed_ms, 250);
        assert_eq!(ledger.at(1).elapsed_ms, 200);
    }

    #[test]
    fn test_close_current_stamps_once() {
        let (_clock, ledger) = running_ledger();
        let first = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1);
        let second = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(2);
        ledger.close_current(first);
        ledger.close_current(second);
        assert_eq!(ledger.at(0).ended_at, Some(first));
    }
}
