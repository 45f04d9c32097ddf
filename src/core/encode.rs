//! Command buffer encoding
//!
//! Writes render commands in the exact wire format the decoder reads, so an
//! in-process layout engine can hand the compositor the same kind of memory
//! an external engine would. The finished buffer looks like:
//!
//! ```text
//! [0, scratch)              unused
//! scratch                   CommandArray header (capacity, length, pointer)
//! scratch + 12              command records, 72 bytes each
//! after the records         string bytes referenced by text commands
//! ```

use super::command::{
    command_stride, render_command_schema, BorderWidth, BoundingBox, CommandArray, CommandType,
    CornerRadius, Rgba,
};

/// A command waiting to be laid out
#[derive(Debug, Clone)]
struct Pending {
    bounds: BoundingBox,
    kind: CommandType,
    payload: Payload,
    id: u32,
    z_index: i16,
}

#[derive(Debug, Clone)]
enum Payload {
    Empty,
    Rectangle { background: Rgba },
    Text { text_offset: usize, length: usize, color: Rgba, font_size: u16 },
    Border { color: Rgba, width: BorderWidth },
    Clip { horizontal: bool, vertical: bool },
}

/// Builder for a wire-format command buffer
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    scratch_address: usize,
    commands: Vec<Pending>,
    strings: Vec<u8>,
}

impl CommandBuffer {
    pub fn new(scratch_address: usize) -> Self {
        Self {
            scratch_address,
            commands: Vec::new(),
            strings: Vec::new(),
        }
    }

    pub fn scratch_address(&self) -> usize {
        self.scratch_address
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop queued commands, keeping allocations
    pub fn clear(&mut self) {
        self.commands.clear();
        self.strings.clear();
    }

    fn push(&mut self, bounds: BoundingBox, kind: CommandType, payload: Payload) -> &mut Self {
        let id = self.commands.len() as u32 + 1;
        self.commands.push(Pending {
            bounds,
            kind,
            payload,
            id,
            z_index: 0,
        });
        self
    }

    pub fn rectangle(&mut self, bounds: BoundingBox, background: Rgba) -> &mut Self {
        self.push(bounds, CommandType::Rectangle, Payload::Rectangle { background })
    }

    pub fn text(&mut self, bounds: BoundingBox, text: &str, color: Rgba) -> &mut Self {
        let text_offset = self.strings.len();
        self.strings.extend_from_slice(text.as_bytes());
        self.push(
            bounds,
            CommandType::Text,
            Payload::Text {
                text_offset,
                length: text.len(),
                color,
                font_size: 1,
            },
        )
    }

    pub fn border(&mut self, bounds: BoundingBox, color: Rgba, width: BorderWidth) -> &mut Self {
        self.push(bounds, CommandType::Border, Payload::Border { color, width })
    }

    pub fn scissor_start(&mut self, bounds: BoundingBox) -> &mut Self {
        self.push(
            bounds,
            CommandType::ScissorStart,
            Payload::Clip {
                horizontal: true,
                vertical: true,
            },
        )
    }

    pub fn scissor_end(&mut self) -> &mut Self {
        self.push(
            BoundingBox::default(),
            CommandType::ScissorEnd,
            Payload::Clip {
                horizontal: false,
                vertical: false,
            },
        )
    }

    /// A command with no payload (none, image, custom or any raw tag)
    pub fn opaque(&mut self, bounds: BoundingBox, kind: CommandType) -> &mut Self {
        self.push(bounds, kind, Payload::Empty)
    }

    /// Set the z-index of the most recently queued command
    pub fn with_z_index(&mut self, z_index: i16) -> &mut Self {
        if let Some(last) = self.commands.last_mut() {
            last.z_index = z_index;
        }
        self
    }

    /// Lay the buffer out into a fresh vector
    pub fn finish(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.finish_into(&mut out);
        out
    }

    /// Lay the buffer out into `out`, replacing its contents
    pub fn finish_into(&self, out: &mut Vec<u8>) {
        let stride = command_stride();
        let array_address = self.scratch_address + CommandArray::SIZE;
        let strings_address = array_address + self.commands.len() * stride;

        out.clear();
        out.resize(self.scratch_address, 0);

        let count = self.commands.len() as i32;
        put_i32(out, count);
        put_i32(out, count);
        put_u32(out, array_address as u32);

        for command in &self.commands {
            encode_command(out, command, strings_address);
        }
        out.extend_from_slice(&self.strings);
    }
}

fn put_f32(out: &mut Vec<u8>, v: f32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_rgba(out: &mut Vec<u8>, c: Rgba) {
    for channel in [c.r, c.g, c.b, c.a] {
        put_f32(out, channel);
    }
}

fn put_corners(out: &mut Vec<u8>, c: CornerRadius) {
    for radius in [c.top_left, c.top_right, c.bottom_left, c.bottom_right] {
        put_f32(out, radius);
    }
}

fn render_data_size() -> usize {
    let schema = render_command_schema();
    match (schema.offset_of("renderData"), schema.offset_of("userData")) {
        (Some(start), Some(end)) => end - start,
        _ => 0,
    }
}

fn encode_command(out: &mut Vec<u8>, command: &Pending, strings_address: usize) {
    let start = out.len();
    let b = command.bounds;
    for v in [b.x, b.y, b.width, b.height] {
        put_f32(out, v);
    }

    let union_start = out.len();
    match command.payload {
        Payload::Empty => {}
        Payload::Rectangle { background } => {
            put_rgba(out, background);
            put_corners(out, CornerRadius::default());
        }
        Payload::Text {
            text_offset,
            length,
            color,
            font_size,
        } => {
            let chars = (strings_address + text_offset) as u32;
            put_u32(out, length as u32);
            put_u32(out, chars);
            put_u32(out, chars);
            put_rgba(out, color);
            put_u16(out, 0); // fontId
            put_u16(out, font_size);
            put_u16(out, 0); // letterSpacing
            put_u16(out, 1); // lineHeight
        }
        Payload::Border { color, width } => {
            put_rgba(out, color);
            put_corners(out, CornerRadius::default());
            for w in [width.left, width.right, width.top, width.bottom, width.between_children] {
                put_u16(out, w);
            }
        }
        Payload::Clip {
            horizontal,
            vertical,
        } => {
            out.push(u8::from(horizontal));
            out.push(u8::from(vertical));
        }
    }
    out.resize(union_start + render_data_size(), 0);

    put_u32(out, 0); // userData
    put_u32(out, command.id);
    out.extend_from_slice(&command.z_index.to_le_bytes());
    out.push(command.kind.tag());
    out.push(0);

    debug_assert_eq!(out.len() - start, command_stride());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::{Command, RenderData};
    use crate::core::memory::MemoryView;

    fn bounds(x: f32, y: f32, width: f32, height: f32) -> BoundingBox {
        BoundingBox { x, y, width, height }
    }

    #[test]
    fn test_layout_and_header() {
        let mut buf = CommandBuffer::new(8);
        buf.rectangle(bounds(1.0, 2.0, 3.0, 4.0), Rgba { r: 255.0, ..Rgba::default() });
        buf.text(bounds(0.0, 0.0, 2.0, 1.0), "OK", Rgba::default());
        let bytes = buf.finish();

        assert_eq!(bytes.len(), 8 + CommandArray::SIZE + 2 * 72 + 2);

        let view = MemoryView::new(&bytes);
        let header = CommandArray::read(&view, 8).unwrap();
        assert_eq!(header.count(), 2);
        assert_eq!(header.pointer, 20);
    }

    #[test]
    fn test_decodes_what_it_encodes() {
        let mut buf = CommandBuffer::new(0);
        buf.border(
            bounds(0.0, 0.0, 5.0, 3.0),
            Rgba { r: 1.0, g: 2.0, b: 3.0, a: 4.0 },
            BorderWidth { left: 1, right: 2, top: 3, bottom: 4, between_children: 5 },
        )
        .with_z_index(-2);
        buf.text(bounds(3.0, 4.0, 5.0, 1.0), "héllo", Rgba::default());
        let bytes = buf.finish();
        let view = MemoryView::new(&bytes);
        let header = CommandArray::read(&view, 0).unwrap();

        let border = Command::read(&view, header.pointer as usize).unwrap();
        assert_eq!(border.z_index, -2);
        assert_eq!(border.id, 1);
        match border.data {
            RenderData::Border { color, width, .. } => {
                assert_eq!(color.b, 3.0);
                assert_eq!(width.bottom, 4);
                assert_eq!(width.between_children, 5);
            }
            other => panic!("unexpected payload {:?}", other),
        }

        let text = Command::read(&view, header.pointer as usize + 72).unwrap();
        match text.data {
            RenderData::Text { contents, .. } => {
                assert_eq!(contents.length, "héllo".len() as u32);
                assert_eq!(contents.text(&view), "héllo");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_clear_keeps_scratch() {
        let mut buf = CommandBuffer::new(16);
        buf.opaque(bounds(0.0, 0.0, 1.0, 1.0), CommandType::Image);
        assert_eq!(buf.len(), 1);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.scratch_address(), 16);
        assert_eq!(buf.finish().len(), 16 + CommandArray::SIZE);
    }
}
