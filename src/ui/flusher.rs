//! Frame output
//!
//! Serializes a `Canvas` as one full-screen ANSI frame: clear, home, then
//! every row's escaped cells followed by a newline. No diffing, every frame
//! is complete on its own.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    style::{Attribute, ResetColor, SetAttribute},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{debug, info};

use super::canvas::Canvas;

/// Clear the whole screen, then move the cursor home
pub const CLEAR_AND_HOME: &str = "\x1b[2J\x1b[H";

/// Writes canvases to an output stream
#[derive(Debug, Default)]
pub struct Flusher {
    /// Reused frame buffer
    frame: String,
    frames_written: u64,
}

impl Flusher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Write one frame. The whole frame goes out in a single write.
    pub fn flush<W: Write>(&mut self, canvas: &Canvas, out: &mut W) -> io::Result<()> {
        self.frame.clear();
        self.frame.push_str(CLEAR_AND_HOME);
        canvas.render_into(&mut self.frame);

        out.write_all(self.frame.as_bytes())?;
        out.flush()?;
        self.frames_written += 1;
        Ok(())
    }
}

/// Current terminal size as (cols, rows), if the environment reports one
pub fn terminal_size() -> Option<(u16, u16)> {
    match terminal::size() {
        Ok((cols, rows)) if cols > 0 && rows > 0 => Some((cols, rows)),
        _ => None,
    }
}

/// Prepares the terminal for full-screen frames and restores it on drop
pub struct TerminalGuard {
    alternate_screen: bool,
    active: bool,
}

impl TerminalGuard {
    pub fn enter(alternate_screen: bool) -> io::Result<Self> {
        let mut stdout = io::stdout();
        if alternate_screen {
            execute!(stdout, EnterAlternateScreen)?;
        }
        execute!(stdout, Hide)?;
        stdout.flush()?;
        info!("terminal prepared (alternate screen: {})", alternate_screen);

        Ok(Self {
            alternate_screen,
            active: true,
        })
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = execute!(stdout, Show);
        if self.alternate_screen {
            let _ = execute!(stdout, LeaveAlternateScreen);
        }
        stdout.flush()?;
        debug!("terminal restored");
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::color::TermColor;

    /// Output that always fails
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_frame_format() {
        let mut canvas = Canvas::new(3, 2);
        canvas.draw_pixel(0, 1, 'z', Some(TermColor::Yellow), Some(TermColor::Black));

        let mut out = Vec::new();
        let mut flusher = Flusher::new();
        flusher.flush(&canvas, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "\x1b[2J\x1b[H   \n\x1b[40m\x1b[33mz\x1b[0m  \n"
        );
        assert_eq!(flusher.frames_written(), 1);
    }

    #[test]
    fn test_each_frame_is_complete() {
        let canvas = Canvas::new(2, 1);
        let mut flusher = Flusher::new();
        let mut out = Vec::new();
        flusher.flush(&canvas, &mut out).unwrap();
        flusher.flush(&canvas, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(CLEAR_AND_HOME).count(), 2);
        assert_eq!(text, format!("{0}  \n{0}  \n", CLEAR_AND_HOME));
    }

    #[test]
    fn test_write_error_is_returned() {
        let canvas = Canvas::new(2, 1);
        let mut flusher = Flusher::new();
        let err = flusher.flush(&canvas, &mut BrokenPipe).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(flusher.frames_written(), 0);
    }
}
