use std::sync::Arc;
use std::time::SystemTime;

use crate::clock::{Clock, Status};
use crate::format_hms_millis;
use crate::layout::{cell_of, total_pages, Grid};
use crate::ledger::Ledger;

/// Logical commands produced by the key decoding layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    PauseResume,
    NewLap,
    PageForward,
    PageBackward,
    Quit,
}

/// One lap cell the render adapter draws this frame. Coordinates are
/// page-local.
#[derive(Clone, Debug)]
pub struct LapCell {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub elapsed: String,
    pub live: bool,
}

/// Read-only frame state handed to the render adapter.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub status: Status,
    pub page: usize,
    pub total_pages: usize,
    pub cells: Vec<LapCell>,
    pub live_visible: bool,
}

/// Interprets commands against the clock, the ledger and the page
/// cursor, producing the next coherent state.
pub struct Controller {
    clock: Arc<Clock>,
    ledger: Arc<Ledger>,
    page: usize,
}

impl Controller {
    pub fn new(clock: Arc<Clock>, ledger: Arc<Ledger>) -> Self {
        Self {
            clock,
            ledger,
            page: 0,
        }
    }

    pub fn status(&self) -> Status {
        self.clock.get()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn apply(&mut self, command: Command, now: SystemTime, grid: Grid) {
        match command {
            Command::PauseResume => self.toggle_pause(),
            Command::NewLap => self.new_lap(now, grid),
            Command::PageForward => {
                let pages = total_pages(self.ledger.len(), grid.capacity());
                self.page = (self.page + 1).min(pages - 1);
            }
            Command::PageBackward => {
                self.page = self.page.saturating_sub(1);
            }
            Command::Quit => self.clock.set(Status::Stopped),
        }
    }

    fn toggle_pause(&mut self) {
        match self.clock.get() {
            Status::Running => self.clock.set(Status::Paused),
            Status::Paused => self.clock.set(Status::Running),
            Status::Stopped => {}
        }
    }

    /// Close the current lap and open a fresh one. Lap boundaries are
    /// independent of pause state; marking a lap always resumes.
    fn new_lap(&mut self, now: SystemTime, grid: Grid) {
        if self.clock.get() == Status::Stopped {
            return;
        }
        self.ledger.close_current(now);
        let index = self.ledger.start_new(now);
        // Follow the live timer onto its new page.
        let capacity = grid.capacity();
        if capacity > 0 && index > 0 && index % capacity == 0 {
            self.page += 1;
        }
        self.clock.set(Status::Running);
    }

    /// Keep the page cursor in range after the grid geometry changes.
    pub fn reclamp(&mut self, grid: Grid) {
        let pages = total_pages(self.ledger.len(), grid.capacity());
        self.page = self.page.min(pages - 1);
    }

    /// Build the per-frame state the render adapter draws from. The
    /// live timer cell appears only on the last page; earlier pages
    /// hold frozen laps.
    pub fn snapshot(&self, grid: Grid) -> Snapshot {
        let count = self.ledger.len();
        let capacity = grid.capacity();
        let pages = total_pages(count, capacity);
        let page = self.page.min(pages - 1);

        let mut cells = Vec::new();
        if capacity > 0 {
            let first = page * capacity;
            let last = count.min(first + capacity);
            for index in first..last {
                let lap = self.ledger.at(index);
                let (row, col) = cell_of(index - first, grid.rows);
                cells.push(LapCell {
                    index,
                    row,
                    col,
                    elapsed: format_hms_millis(lap.elapsed_ms),
                    live: index + 1 == count,
                });
            }
        }

        Snapshot {
            status: self.clock.get(),
            page,
            total_pages: pages,
            cells,
            live_visible: count > 0 && page == pages - 1,
        }
    }
}
