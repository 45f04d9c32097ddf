//! Core decoding components.
//!
//! This module turns a layout engine's raw memory into typed render commands:
//!
//! - **memory**: Bounds-checked little-endian reads over a byte slice
//! - **schema**: Declarative struct/union/primitive layouts and their decoder
//! - **command**: The render command ABI and its typed form
//! - **encode**: Writes commands in the same ABI for in-process engines
//! - **layout**: The layout engine boundary and its callbacks
//!
//! # Architecture
//!
//! ```text
//! LayoutEngine::memory()
//! └── MemoryView
//!     └── CommandArray (capacity, length, pointer)
//!         └── Command × length   (Schema::read, 72-byte stride)
//!             ├── BoundingBox
//!             └── RenderData (rectangle | text | border | clip)
//! ```

pub mod command;
pub mod encode;
pub mod layout;
pub mod memory;
pub mod schema;
