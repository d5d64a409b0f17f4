use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use lapwatch_core::{Grid, Snapshot, Status};

/// Width of one lap cell: "NNN HH:MM:SS.mmm" plus padding.
pub const CELL_WIDTH: u16 = 18;

const STATUS_HEIGHT: u16 = 3;
const HELP_HEIGHT: u16 = 2;

/// Grid geometry for the lap panel inside a terminal of the given
/// size. Must stay in step with the rects `draw` splits the frame
/// into.
pub fn grid_for(width: u16, height: u16) -> Grid {
    let panel_height = height.saturating_sub(STATUS_HEIGHT + HELP_HEIGHT);
    let rows = panel_height.saturating_sub(2);
    let cols = width.saturating_sub(2) / CELL_WIDTH;
    Grid::new(rows as usize, cols as usize)
}

pub fn draw(frame: &mut Frame, snapshot: &Snapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(HELP_HEIGHT),
        ])
        .split(frame.area());

    draw_status(frame, chunks[0], snapshot);
    draw_laps(frame, chunks[1], snapshot);
    draw_help(frame, chunks[2]);
}

fn status_span(status: Status) -> Span<'static> {
    match status {
        Status::Running => Span::styled("running", Style::default().fg(Color::Green)),
        Status::Paused => Span::styled("==paused==", Style::default().fg(Color::Yellow)),
        Status::Stopped => Span::styled("stopped", Style::default().fg(Color::DarkGray)),
    }
}

fn draw_status(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let line = Line::from(vec![
        status_span(snapshot.status),
        Span::raw("   "),
        Span::raw(format!("page {}/{}", snapshot.page + 1, snapshot.total_pages)),
    ]);
    let status = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title("lapwatch"));
    frame.render_widget(status, area);
}

fn draw_laps(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let block = Block::default().borders(Borders::ALL).title("laps");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = inner.height as usize;
    let cols = (inner.width / CELL_WIDTH) as usize;
    if rows == 0 || cols == 0 {
        return;
    }

    let mut slots: Vec<Vec<Option<(String, bool)>>> = vec![vec![None; cols]; rows];
    for cell in &snapshot.cells {
        if cell.row < rows && cell.col < cols {
            let label = format!("{:>3} {}", cell.index + 1, cell.elapsed);
            slots[cell.row][cell.col] = Some((label, cell.live));
        }
    }

    let width = CELL_WIDTH as usize;
    let live_style = Style::default().add_modifier(Modifier::BOLD);
    let lines: Vec<Line> = slots
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|slot| match slot {
                        Some((label, true)) => {
                            Span::styled(format!("{:<width$}", label), live_style)
                        }
                        Some((label, false)) => Span::raw(format!("{:<width$}", label)),
                        None => Span::raw(" ".repeat(width)),
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let keys = Line::from(vec![
        "p/space ".into(),
        "pause/resume".dim(),
        "   n ".into(),
        "new lap".dim(),
        "   [ ] ".into(),
        "page".dim(),
        "   q ".into(),
        "quit".dim(),
    ]);
    let hint = Line::from("PgUp/PgDn also turn pages".dim());
    frame.render_widget(Paragraph::new(vec![keys, hint]).gray(), area);
}
