//! Per-frame rendering context
//!
//! Owns the canvas, interpreter and flusher so the scheduler carries one
//! value through its lifetime instead of shared module state.

use std::io::{self, Write};

use tracing::debug;

use super::canvas::Canvas;
use super::flusher::Flusher;
use super::interpreter::{BorderMode, CommandInterpreter};
use crate::core::memory::MemoryView;
use crate::core::schema::DecodeError;

pub struct Compositor {
    canvas: Canvas,
    interpreter: CommandInterpreter,
    flusher: Flusher,
}

impl Compositor {
    pub fn new(cols: u16, rows: u16, border_mode: BorderMode) -> Self {
        Self {
            canvas: Canvas::new(cols, rows),
            interpreter: CommandInterpreter::with_border_mode(border_mode),
            flusher: Flusher::new(),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Start a blank frame of the given size
    pub fn begin_frame(&mut self, cols: u16, rows: u16) {
        if (cols, rows) != (self.canvas.cols(), self.canvas.rows()) {
            debug!(
                "canvas resized {}x{} -> {}x{}",
                self.canvas.cols(),
                self.canvas.rows(),
                cols,
                rows
            );
            self.canvas.resize(cols, rows);
        } else {
            self.canvas.clear();
        }
    }

    /// Draw the command array referenced at `scratch_address`.
    /// Returns the number of commands in the array.
    pub fn compose(
        &mut self,
        memory: &[u8],
        scratch_address: usize,
    ) -> Result<usize, DecodeError> {
        let view = MemoryView::new(memory);
        self.interpreter
            .interpret_scratch(&view, scratch_address, &mut self.canvas)
    }

    pub fn present<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.flusher.flush(&self.canvas, out)
    }

    pub fn frames_written(&self) -> u64 {
        self.flusher.frames_written()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::{BoundingBox, Rgba};
    use crate::core::encode::CommandBuffer;

    #[test]
    fn test_frames_start_blank() {
        let mut buf = CommandBuffer::new(0);
        buf.rectangle(
            BoundingBox { x: 0.0, y: 0.0, width: 2.0, height: 1.0 },
            Rgba { r: 255.0, g: 0.0, b: 0.0, a: 255.0 },
        );
        let memory = buf.finish();

        let mut compositor = Compositor::new(4, 2, BorderMode::FullBox);
        compositor.begin_frame(4, 2);
        assert_eq!(compositor.compose(&memory, 0).unwrap(), 1);
        assert!(compositor.canvas().cell(0, 0).unwrap().painted);

        // Same size, empty command list: previous drawing is gone
        let empty = CommandBuffer::new(0).finish();
        compositor.begin_frame(4, 2);
        assert_eq!(compositor.compose(&empty, 0).unwrap(), 0);
        assert_eq!(compositor.canvas(), &Canvas::new(4, 2));
    }

    #[test]
    fn test_resize_between_frames() {
        let mut compositor = Compositor::new(80, 24, BorderMode::FullBox);
        compositor.begin_frame(10, 3);
        assert_eq!(compositor.canvas().cols(), 10);
        assert_eq!(compositor.canvas().rows(), 3);

        let mut out = Vec::new();
        compositor.present(&mut out).unwrap();
        assert_eq!(compositor.frames_written(), 1);
        assert_eq!(String::from_utf8(out).unwrap().matches('\n').count(), 3);
    }
}
