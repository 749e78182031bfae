//! Terminal display layer: presents the RGBA frame as half-block cells.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, BufWriter, Stdout, Write, stdout};
use std::time::Duration;

use crate::frame::Framebuffer;

/// Encode the frame as half-block characters with 24-bit ANSI colors: each
/// cell shows two vertically stacked pixels (upper = foreground, lower =
/// background). The framebuffer stores the bottom row first, so rows are
/// walked in reverse to print top-down.
pub fn frame_to_halfblock(frame: &Framebuffer) -> String {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let rows = (height + 1) / 2;
    let mut out = String::with_capacity(width * rows * 40 + rows);

    for row in 0..rows {
        let top = height - 1 - row * 2;
        for x in 0..width {
            let [tr, tg, tb, _] = frame.pixel(top * width + x);
            let [br, bg, bb, _] = if top > 0 {
                frame.pixel((top - 1) * width + x)
            } else {
                [0, 0, 0, 255]
            };
            out.push_str(&format!(
                "\x1b[38;2;{};{};{};48;2;{};{};{}m\u{2580}",
                tr, tg, tb, br, bg, bb
            ));
        }
        out.push_str("\x1b[0m\n");
    }
    out
}

/// Raw-mode terminal handler. Enters the alternate screen on construction
/// and restores the terminal on drop, on every exit path.
pub struct TerminalDisplay {
    buffer: BufWriter<Stdout>,
}

impl TerminalDisplay {
    pub fn new() -> io::Result<Self> {
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
        Ok(Self {
            buffer: BufWriter::new(stdout),
        })
    }

    /// Write the encoded frame with per-line cursor positioning, then a
    /// status line below it.
    pub fn present(&mut self, content: &str, status: &str) -> io::Result<()> {
        write!(self.buffer, "\x1b[?25l\x1b[?7l")?;
        for (i, line) in content.lines().enumerate() {
            write!(self.buffer, "\x1b[{};1H{}", i + 1, line)?;
        }
        let status_row = content.lines().count() + 1;
        write!(self.buffer, "\x1b[{};1H\x1b[K{}", status_row, status)?;
        write!(self.buffer, "\x1b[?25h\x1b[?7h")?;
        self.buffer.flush()
    }

    /// Block until the user asks to quit (q or Escape).
    pub fn wait_for_quit(&mut self) -> io::Result<()> {
        loop {
            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if is_quit(key) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = self.buffer.flush();
        let _ = execute!(stdout(), LeaveAlternateScreen);
    }
}

fn is_quit(event: KeyEvent) -> bool {
    matches!(event.code, KeyCode::Char('q') | KeyCode::Esc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use glam::Vec3;

    #[test]
    fn test_halfblock_row_count() {
        let frame = Framebuffer::new(4, 6);
        let out = frame_to_halfblock(&frame);
        assert_eq!(out.lines().count(), 3);
        assert_eq!(out.matches('\u{2580}').count(), 12);
    }

    #[test]
    fn test_halfblock_odd_height() {
        let frame = Framebuffer::new(2, 3);
        let out = frame_to_halfblock(&frame);
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_halfblock_top_row_first() {
        let mut frame = Framebuffer::new(1, 2);
        // Pixel 0 is the bottom row; paint the top row red.
        frame.composite([None, Some(Vec3::new(1.0, 0.0, 0.0))]);
        let out = frame_to_halfblock(&frame);
        let first_line = out.lines().next().unwrap();
        assert!(first_line.contains("38;2;255;0;0"));
        assert!(first_line.contains("48;2;0;0;0"));
    }

    #[test]
    fn test_is_quit_keys() {
        assert!(is_quit(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::empty())));
        assert!(is_quit(KeyEvent::new(KeyCode::Esc, KeyModifiers::empty())));
        assert!(!is_quit(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::empty())));
    }
}
