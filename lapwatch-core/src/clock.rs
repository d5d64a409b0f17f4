use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Running = 0,
    Paused = 1,
    Stopped = 2,
}

impl Status {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Status::Running,
            1 => Status::Paused,
            _ => Status::Stopped,
        }
    }
}

/// Shared run status for the whole session. Written by the foreground
/// thread on user commands, read by the tick thread every interval.
pub struct Clock {
    status: AtomicU8,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            status: AtomicU8::new(Status::Running as u8),
        }
    }

    pub fn get(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::SeqCst))
    }

    /// Stopped is a sink: once set, further transitions are ignored.
    pub fn set(&self, status: Status) {
        if self.get() == Status::Stopped {
            return;
        }
        self.status.store(status as u8, Ordering::SeqCst);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_running() {
        let clock = Clock::new();
        assert_eq!(clock.get(), Status::Running);
    }

    #[test]
    fn test_set_and_get() {
        let clock = Clock::new();
        clock.set(Status::Paused);
        assert_eq!(clock.get(), Status::Paused);
        clock.set(Status::Running);
        assert_eq!(clock.get(), Status::Running);
    }

    #[test]
    fn test_stopped_is_terminal() {
        let clock = Clock::new();
        clock.set(Status::Stopped);
        clock.set(Status::Running);
        assert_eq!(clock.get(), Status::Stopped);
        clock.set(Status::Paused);
        assert_eq!(clock.get(), Status::Stopped);
    }
}
