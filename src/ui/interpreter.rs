//! Render command interpreter
//!
//! Walks a command array in foreign memory and turns each command into
//! canvas drawing. Clip regions, images and custom commands are accepted
//! and ignored; unknown tags are ignored too, so newer engines degrade to
//! missing elements rather than errors. A text slice running past the end
//! of memory is cut short at the end instead of failing the frame.

use tracing::trace;

use super::canvas::{BorderSides, Canvas};
use super::color::TermColor;
use crate::core::command::{command_stride, Command, CommandArray, CommandType, RenderData};
use crate::core::memory::MemoryView;
use crate::core::schema::DecodeError;

/// How border commands use their per-side widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Always draw the full box, ignoring widths
    #[default]
    FullBox,
    /// Draw only sides with a nonzero width
    PerSide,
}

/// Dispatches decoded commands to canvas operations
#[derive(Debug, Clone, Default)]
pub struct CommandInterpreter {
    border_mode: BorderMode,
}

impl CommandInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_border_mode(border_mode: BorderMode) -> Self {
        Self { border_mode }
    }

    pub fn border_mode(&self) -> BorderMode {
        self.border_mode
    }

    /// Interpret the array described by the header at `scratch_address`
    pub fn interpret_scratch(
        &self,
        view: &MemoryView<'_>,
        scratch_address: usize,
        canvas: &mut Canvas,
    ) -> Result<usize, DecodeError> {
        let header = CommandArray::read(view, scratch_address)?;
        trace!(
            "command array: capacity={} length={} pointer={}",
            header.capacity,
            header.length,
            header.pointer
        );
        self.interpret(view, header.pointer as usize, header.count(), canvas)?;
        Ok(header.count())
    }

    /// Interpret `count` commands starting at `base`.
    ///
    /// Commands before a decode failure stay drawn; the failure ends the walk.
    pub fn interpret(
        &self,
        view: &MemoryView<'_>,
        base: usize,
        count: usize,
        canvas: &mut Canvas,
    ) -> Result<(), DecodeError> {
        let stride = command_stride();
        for i in 0..count {
            let command = Command::read(view, base + i * stride)?;
            self.execute(&command, view, canvas);
        }
        Ok(())
    }

    /// Draw one decoded command
    pub fn execute(
        &self,
        command: &Command,
        view: &MemoryView<'_>,
        canvas: &mut Canvas,
    ) {
        let rect = command.bounding_box.cells();

        match (command.kind(), &command.data) {
            (CommandType::Rectangle, RenderData::Rectangle { background, .. }) => {
                canvas.draw_rectangle(rect, TermColor::from_rgba(*background));
            }
            (CommandType::Text, RenderData::Text { contents, color, .. }) => {
                let text = contents.text(view);
                canvas.draw_text(rect.x, rect.y, &text, TermColor::from_rgba(*color));
            }
            (CommandType::Border, RenderData::Border { color, width, .. }) => {
                let fg = TermColor::from_rgba(*color);
                match self.border_mode {
                    BorderMode::FullBox => canvas.draw_border(rect, fg),
                    BorderMode::PerSide => {
                        canvas.draw_border_sides(rect, fg, BorderSides::from_width(*width))
                    }
                }
            }
            (CommandType::ScissorStart | CommandType::ScissorEnd | CommandType::None, _) => {}
            (kind, _) => {
                trace!("ignoring command {} of kind {:?}", command.id, kind);
            }
        }
    }
}
