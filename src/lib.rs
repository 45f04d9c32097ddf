//! clayterm - terminal compositor for layout engine render commands
//!
//! A layout engine lays out a UI into its own linear memory and leaves an
//! array of fixed-size render commands behind. clayterm decodes that array
//! through a declarative schema, draws each command onto a grid of terminal
//! cells and writes the grid out as ANSI escape sequences, once per frame.
//!
//! ```text
//! FrameScheduler::tick
//! ├── LayoutEngine::update_frame   (size, pointer, elapsed time)
//! ├── CommandInterpreter           (decode + draw onto Canvas)
//! └── Flusher                      (clear, home, rows)
//! ```

pub mod config;
pub mod core;
pub mod demo;
pub mod scheduler;
pub mod ui;
