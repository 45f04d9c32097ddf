//! Terminal compositing and output.
//!
//! - **color**: RGB to 8-color terminal palette quantization
//! - **canvas**: Cell grid with pixel, rectangle, text and border drawing
//! - **interpreter**: Executes decoded render commands against a canvas
//! - **flusher**: Writes a canvas as one full-screen ANSI frame
//! - **compositor**: Per-frame context tying the above together

pub mod canvas;
pub mod color;
pub mod compositor;
pub mod flusher;
pub mod interpreter;

pub use canvas::{Canvas, Cell};
pub use color::TermColor;
pub use compositor::Compositor;
pub use flusher::{Flusher, TerminalGuard};
pub use interpreter::{BorderMode, CommandInterpreter};
