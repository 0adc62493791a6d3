use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

/// Raw mode, alternate screen and hidden cursor for the lifetime of the
/// value. Restores the terminal on drop and on panic.
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            cleanup_terminal();
            original_hook(info);
        }));

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.write_all(b"\x1b[?1049h")?; // enter alternate screen
        stdout.write_all(b"\x1b[?25l")?; // hide cursor
        stdout.flush()?;
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        cleanup_terminal();
    }
}

fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(b"\x1b[0m\x1b[?25h\x1b[?1049l");
    let _ = stdout.flush();
    let _ = terminal::disable_raw_mode();
}

/// Non-blocking check for q, Esc or Ctrl-C.
pub fn quit_requested() -> io::Result<bool> {
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if is_quit_key(&key) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Whether a `cols` x `rows` frame plus the progress lines fits in a
/// terminal of the given size.
pub fn frame_fits(term: (u16, u16), cols: u32, rows: u32) -> bool {
    let (term_cols, term_rows) = term;
    u32::from(term_cols) >= cols && u32::from(term_rows) >= rows + PROGRESS_LINES
}

/// Blank line, separator and `frame i/total` below each frame.
const PROGRESS_LINES: u32 = 3;

/// Log a warning when the terminal is too small for the frame. Playback
/// goes ahead regardless.
pub fn warn_if_too_small(cols: u32, rows: u32) {
    match terminal::size() {
        Ok(size) if !frame_fits(size, cols, rows) => {
            log::warn!(
                "terminal is {}x{}, frames need {cols}x{} and will wrap",
                size.0,
                size.1,
                rows + PROGRESS_LINES
            );
        }
        Ok(_) => {}
        Err(e) => log::debug!("could not query terminal size: {e}"),
    }
}
