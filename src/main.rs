mod config;
mod ui;

use std::fs::File;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use simplelog::WriteLogger;

use lapwatch_core::{Clock, Command, Controller, Ledger, Status};

use crate::config::Config;

const CONF_FILE_NAME: &str = "lapwatch.json";

fn main() -> Result<()> {
    let config = Config::load(CONF_FILE_NAME);
    init_logging(&config)?;
    log::info!(
        "lapwatch starting (tick interval: {}ms, input poll: {}ms)",
        config.tick_interval_ms,
        config.input_poll_ms
    );

    let clock = Arc::new(Clock::new());
    let ledger = Arc::new(Ledger::new(clock.clone()));
    ledger.start_new(SystemTime::now());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let ticker = spawn_ticker(clock.clone(), ledger.clone(), config.tick_interval_ms);

    let mut controller = Controller::new(clock.clone(), ledger);
    let result = run(&mut terminal, &mut controller, &config);

    // The tick thread must be joined before the terminal goes away.
    clock.set(Status::Stopped);
    if ticker.join().is_err() {
        log::error!("tick thread panicked");
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;

    log::info!("lapwatch exiting");
    result
}

fn init_logging(config: &Config) -> Result<()> {
    let file = File::create(&config.log_file)
        .with_context(|| format!("can't create log file {}", config.log_file))?;
    WriteLogger::init(log::LevelFilter::Info, simplelog::Config::default(), file)?;
    Ok(())
}

/// Background tick source: advances the current lap at a fixed
/// interval until the clock reads Stopped.
fn spawn_ticker(clock: Arc<Clock>, ledger: Arc<Ledger>, interval_ms: u64) -> thread::JoinHandle<()> {
    let interval_ms = if interval_ms == 0 { 100 } else { interval_ms };
    thread::spawn(move || {
        let interval = Duration::from_millis(interval_ms);
        loop {
            thread::sleep(interval);
            if clock.get() == Status::Stopped {
                break;
            }
            ledger.tick(interval_ms);
        }
    })
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut Controller,
    config: &Config,
) -> Result<()> {
    let poll_timeout = Duration::from_millis(config.input_poll_ms);

    while controller.status() != Status::Stopped {
        let size = terminal.size()?;
        let grid = ui::grid_for(size.width, size.height);
        let snapshot = controller.snapshot(grid);
        terminal.draw(|frame| ui::draw(frame, &snapshot))?;

        if event::poll(poll_timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(command) = decode_key(key) {
                        controller.apply(command, SystemTime::now(), grid);
                    }
                }
                Event::Resize(width, height) => {
                    controller.reclamp(ui::grid_for(width, height));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Translate a raw key event into a logical command.
fn decode_key(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    match key.code {
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => Some(Command::PauseResume),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Command::NewLap),
        KeyCode::PageDown | KeyCode::Char(']') => Some(Command::PageForward),
        KeyCode::PageUp | KeyCode::Char('[') => Some(Command::PageBackward),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_decode_pause_keys() {
        assert_eq!(decode_key(key(KeyCode::Char('p'))), Some(Command::PauseResume));
        assert_eq!(decode_key(key(KeyCode::Char('P'))), Some(Command::PauseResume));
        assert_eq!(decode_key(key(KeyCode::Char(' '))), Some(Command::PauseResume));
    }

    #[test]
    fn test_decode_lap_and_page_keys() {
        assert_eq!(decode_key(key(KeyCode::Char('n'))), Some(Command::NewLap));
        assert_eq!(decode_key(key(KeyCode::Char('N'))), Some(Command::NewLap));
        assert_eq!(decode_key(key(KeyCode::PageDown)), Some(Command::PageForward));
        assert_eq!(decode_key(key(KeyCode::Char(']'))), Some(Command::PageForward));
        assert_eq!(decode_key(key(KeyCode::PageUp)), Some(Command::PageBackward));
        assert_eq!(decode_key(key(KeyCode::Char('['))), Some(Command::PageBackward));
    }

    #[test]
    fn test_decode_quit_keys() {
        assert_eq!(decode_key(key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(decode_key(key(KeyCode::Char('Q'))), Some(Command::Quit));
        assert_eq!(decode_key(key(KeyCode::Esc)), Some(Command::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(decode_key(ctrl_c), Some(Command::Quit));
    }

    #[test]
    fn test_decode_ignores_other_keys() {
        assert_eq!(decode_key(key(KeyCode::Char('x'))), None);
        assert_eq!(decode_key(key(KeyCode::Enter)), None);
    }
}
