//! Layout engine boundary
//!
//! The layout engine is a black box that owns a linear memory. Once per
//! frame we call `update_frame`; afterwards a `CommandArray` header at the
//! engine's scratch address points at that frame's render commands.
//!
//! The engine calls back into us for two things: measuring text (one cell
//! per character, one row high) and scroll offsets (always zero, scrolling is
//! not supported in the terminal).

use bitflags::bitflags;
use thiserror::Error;

use super::command::{dimensions_schema, string_slice_schema};
use super::memory::{MemoryError, MemoryView};
use super::schema::DecodeError;

/// Layout engine errors
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Layout engine memory access failed: {0}")]
    Memory(#[from] MemoryError),
    #[error("Layout engine returned malformed data: {0}")]
    Decode(#[from] DecodeError),
    #[error("Layout engine update failed: {0}")]
    Update(String),
}

bitflags! {
    /// Pointer button and wheel state for one frame
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct PointerButtons: u8 {
        const LEFT       = 0b0000_0001;
        const RIGHT      = 0b0000_0010;
        const MIDDLE     = 0b0000_0100;
        const WHEEL_UP   = 0b0000_1000;
        const WHEEL_DOWN = 0b0001_0000;
    }
}

/// Pointer position, motion and buttons
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub delta_x: f32,
    pub delta_y: f32,
    pub buttons: PointerButtons,
}

/// Arguments of one `update_frame` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    pub width: u16,
    pub height: u16,
    pub pointer: PointerState,
    pub delta_seconds: f32,
}

/// Text extent in cells
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

/// A layout engine that emits render commands into its own memory
pub trait LayoutEngine {
    /// Lay out the next frame
    fn update_frame(&mut self, input: &FrameInput) -> Result<(), LayoutError>;

    /// The engine's linear memory
    fn memory(&self) -> &[u8];

    /// Address of the `CommandArray` header for the last frame
    fn scratch_address(&self) -> usize;
}

/// Terminal text measurement: one column per character, one row
pub fn measure_text(bytes: &[u8]) -> Dimensions {
    Dimensions {
        width: String::from_utf8_lossy(bytes).chars().count() as f32,
        height: 1.0,
    }
}

/// Scroll offsets are not tracked in the terminal
pub fn query_scroll_offset(_element_id: u32) -> Vector2 {
    Vector2::default()
}

/// Measurement callback in the engine's calling convention: read the string
/// slice at `text_address`, write a `Dimensions` struct at `out_address`.
pub fn measure_text_into(
    memory: &mut [u8],
    out_address: usize,
    text_address: usize,
) -> Result<Dimensions, LayoutError> {
    let dims = {
        let view = MemoryView::new(memory);
        let slice_schema = string_slice_schema();
        let slice = slice_schema.read(&view, text_address)?;
        let length = slice.u32_at("length")? as usize;
        let chars = slice.u32_at("chars")? as usize;
        measure_text(view.bytes(chars, length)?)
    };

    let schema = dimensions_schema();
    let width_at = schema.offset_of("width").unwrap_or(0);
    let height_at = schema.offset_of("height").unwrap_or(4);
    write_f32(memory, out_address, width_at, dims.width)?;
    write_f32(memory, out_address, height_at, dims.height)?;
    Ok(dims)
}

/// Store `value` at `base + field`, little-endian
fn write_f32(memory: &mut [u8], base: usize, field: usize, value: f32) -> Result<(), MemoryError> {
    let size = memory.len();
    let out_of_bounds = |offset| MemoryError::OutOfBounds { offset, len: 4, size };
    let start = base.checked_add(field).ok_or_else(|| out_of_bounds(base))?;
    let end = start.checked_add(4).ok_or_else(|| out_of_bounds(start))?;
    let target = memory
        .get_mut(start..end)
        .ok_or_else(|| out_of_bounds(start))?;
    target.copy_from_slice(&value.to_le_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_counts_characters() {
        assert_eq!(measure_text(b"hello"), Dimensions { width: 5.0, height: 1.0 });
        assert_eq!(measure_text("日本".as_bytes()).width, 2.0);
        assert_eq!(measure_text(b"").width, 0.0);
    }

    #[test]
    fn test_scroll_offset_is_zero() {
        assert_eq!(query_scroll_offset(42), Vector2 { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_measure_into_memory() {
        let mut memory = vec![0u8; 64];
        // String slice at 16: length 3, chars at 40
        memory[16..20].copy_from_slice(&3u32.to_le_bytes());
        memory[20..24].copy_from_slice(&40u32.to_le_bytes());
        memory[40..43].copy_from_slice(b"abc");

        let dims = measure_text_into(&mut memory, 0, 16).unwrap();
        assert_eq!(dims.width, 3.0);

        let view = MemoryView::new(&memory);
        assert_eq!(view.f32(0), Ok(3.0));
        assert_eq!(view.f32(4), Ok(1.0));
    }

    #[test]
    fn test_measure_into_out_of_bounds() {
        let mut memory = vec![0u8; 8];
        assert!(measure_text_into(&mut memory, 0, 4).is_err());
    }

    #[test]
    fn test_measure_into_address_overflow() {
        let mut memory = vec![0u8; 32];
        memory[0..4].copy_from_slice(&2u32.to_le_bytes());
        memory[4..8].copy_from_slice(&12u32.to_le_bytes());
        memory[12..14].copy_from_slice(b"hi");

        let err = measure_text_into(&mut memory, usize::MAX - 2, 0).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Memory(MemoryError::OutOfBounds { len: 4, size: 32, .. })
        ));
        assert!(matches!(
            measure_text_into(&mut memory, 30, 0),
            Err(LayoutError::Memory(_))
        ));
    }

    #[test]
    fn test_pointer_buttons() {
        let buttons = PointerButtons::LEFT | PointerButtons::WHEEL_DOWN;
        assert!(buttons.contains(PointerButtons::LEFT));
        assert!(!buttons.contains(PointerButtons::RIGHT));
        assert_eq!(PointerState::default().buttons, PointerButtons::empty());
    }
}
