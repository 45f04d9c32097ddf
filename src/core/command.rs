//! Render command ABI
//!
//! Schemas for the layout engine's `RenderCommand` array and a typed view of
//! one decoded command. Layout (wasm32, little-endian, no implicit padding):
//!
//! ```text
//! RenderCommand (72 bytes)
//! ├── boundingBox   4 × float                         @0
//! ├── renderData    union (44 bytes)                  @16
//! │   ├── rectangle color, cornerRadius
//! │   ├── text      stringContents, textColor, 4 × uint16
//! │   ├── border    color, cornerRadius, width, _padding
//! │   └── clip      horizontal, vertical
//! ├── userData      uint32                            @60
//! ├── id            uint32                            @64
//! ├── zIndex        int16                             @68
//! ├── commandType   uint8                             @70
//! └── _padding      uint8                             @71
//! ```

use std::sync::OnceLock;

use super::memory::MemoryView;
use super::schema::{DecodeError, DecodedValue, Schema};

/// Command kinds, numbered as the layout engine numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    None,
    Rectangle,
    Border,
    Text,
    Image,
    ScissorStart,
    ScissorEnd,
    Custom,
    Unknown(u8),
}

impl CommandType {
    /// Decode a raw tag field. Only the low byte is significant.
    pub fn from_tag(tag: u32) -> Self {
        match (tag & 0xFF) as u8 {
            0 => CommandType::None,
            1 => CommandType::Rectangle,
            2 => CommandType::Border,
            3 => CommandType::Text,
            4 => CommandType::Image,
            5 => CommandType::ScissorStart,
            6 => CommandType::ScissorEnd,
            7 => CommandType::Custom,
            n => CommandType::Unknown(n),
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            CommandType::None => 0,
            CommandType::Rectangle => 1,
            CommandType::Border => 2,
            CommandType::Text => 3,
            CommandType::Image => 4,
            CommandType::ScissorStart => 5,
            CommandType::ScissorEnd => 6,
            CommandType::Custom => 7,
            CommandType::Unknown(n) => n,
        }
    }
}

fn prim(name: &str) -> Schema {
    Schema::primitive(name)
}

pub fn dimensions_schema() -> Schema {
    Schema::structure([("width", prim("float")), ("height", prim("float"))])
}

pub fn color_schema() -> Schema {
    Schema::structure([
        ("r", prim("float")),
        ("g", prim("float")),
        ("b", prim("float")),
        ("a", prim("float")),
    ])
}

pub fn string_slice_schema() -> Schema {
    Schema::structure([
        ("length", prim("uint32_t")),
        ("chars", prim("uint32_t")),
        ("baseChars", prim("uint32_t")),
    ])
}

fn corner_radius_schema() -> Schema {
    Schema::structure([
        ("topLeft", prim("float")),
        ("topRight", prim("float")),
        ("bottomLeft", prim("float")),
        ("bottomRight", prim("float")),
    ])
}

fn border_width_schema() -> Schema {
    Schema::structure([
        ("left", prim("uint16_t")),
        ("right", prim("uint16_t")),
        ("top", prim("uint16_t")),
        ("bottom", prim("uint16_t")),
        ("betweenChildren", prim("uint16_t")),
    ])
}

fn render_data_schema() -> Schema {
    let rectangle = Schema::structure([
        ("backgroundColor", color_schema()),
        ("cornerRadius", corner_radius_schema()),
    ]);
    let text = Schema::structure([
        ("stringContents", string_slice_schema()),
        ("textColor", color_schema()),
        ("fontId", prim("uint16_t")),
        ("fontSize", prim("uint16_t")),
        ("letterSpacing", prim("uint16_t")),
        ("lineHeight", prim("uint16_t")),
    ]);
    let border = Schema::structure([
        ("color", color_schema()),
        ("cornerRadius", corner_radius_schema()),
        ("width", border_width_schema()),
        ("_padding", prim("uint16_t")),
    ]);
    let clip = Schema::structure([("horizontal", prim("bool")), ("vertical", prim("bool"))]);

    Schema::union([
        ("rectangle", rectangle),
        ("text", text),
        ("border", border),
        ("clip", clip),
    ])
}

/// The full `RenderCommand` schema, built once
pub fn render_command_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::structure([
            (
                "boundingBox",
                Schema::structure([
                    ("x", prim("float")),
                    ("y", prim("float")),
                    ("width", prim("float")),
                    ("height", prim("float")),
                ]),
            ),
            ("renderData", render_data_schema()),
            ("userData", prim("uint32_t")),
            ("id", prim("uint32_t")),
            ("zIndex", prim("int16_t")),
            ("commandType", prim("uint8_t")),
            ("_padding", prim("uint8_t")),
        ])
    })
}

/// Byte stride between consecutive commands
pub fn command_stride() -> usize {
    static STRIDE: OnceLock<usize> = OnceLock::new();
    *STRIDE.get_or_init(|| render_command_schema().size())
}

/// Floating-point element bounds as produced by the layout engine
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Bounds floored to whole cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn cells(&self) -> CellRect {
        CellRect {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
            width: self.width.floor() as i32,
            height: self.height.floor() as i32,
        }
    }
}

/// RGBA color, channels on the engine's 0..255 scale
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderWidth {
    pub left: u16,
    pub right: u16,
    pub top: u16,
    pub bottom: u16,
    pub between_children: u16,
}

/// Reference to UTF-8 bytes elsewhere in the same buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StringSlice {
    pub length: u32,
    pub chars: u32,
    pub base_chars: u32,
}

impl StringSlice {
    /// The referenced bytes, cut short where the buffer ends
    pub fn bytes<'a>(&self, view: &MemoryView<'a>) -> &'a [u8] {
        view.clamped(self.chars as usize, self.length as usize)
    }

    /// Decode the referenced bytes, replacing invalid UTF-8 sequences
    pub fn text(&self, view: &MemoryView<'_>) -> String {
        String::from_utf8_lossy(self.bytes(view)).into_owned()
    }
}

/// Type-specific payload of a command
#[derive(Debug, Clone, PartialEq)]
pub enum RenderData {
    None,
    Rectangle {
        background: Rgba,
        corner_radius: CornerRadius,
    },
    Text {
        contents: StringSlice,
        color: Rgba,
        font_id: u16,
        font_size: u16,
        letter_spacing: u16,
        line_height: u16,
    },
    Border {
        color: Rgba,
        corner_radius: CornerRadius,
        width: BorderWidth,
    },
    Clip {
        horizontal: bool,
        vertical: bool,
    },
    /// Image, custom and unknown kinds carry nothing we draw
    Opaque,
}

/// One decoded render command
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub bounding_box: BoundingBox,
    /// Raw tag; use `kind()` for dispatch
    pub tag: u32,
    pub user_data: u32,
    pub id: u32,
    pub z_index: i16,
    pub data: RenderData,
}

impl Command {
    pub fn kind(&self) -> CommandType {
        CommandType::from_tag(self.tag)
    }

    /// Decode the command stored at `offset`
    pub fn read(view: &MemoryView<'_>, offset: usize) -> Result<Self, DecodeError> {
        let value = render_command_schema().read(view, offset)?;
        Self::from_value(&value)
    }

    /// Build a typed command from a value decoded with `render_command_schema`
    pub fn from_value(value: &DecodedValue<'_>) -> Result<Self, DecodeError> {
        let bounds = value.get("boundingBox")?;
        let bounding_box = BoundingBox {
            x: bounds.f32_at("x")?,
            y: bounds.f32_at("y")?,
            width: bounds.f32_at("width")?,
            height: bounds.f32_at("height")?,
        };
        let tag = value.u32_at("commandType")?;
        let render_data = value.get("renderData")?;

        let data = match CommandType::from_tag(tag) {
            CommandType::None => RenderData::None,
            CommandType::Rectangle => {
                let rect = render_data.get("rectangle")?;
                RenderData::Rectangle {
                    background: rgba(rect.get("backgroundColor")?)?,
                    corner_radius: corner_radius(rect.get("cornerRadius")?)?,
                }
            }
            CommandType::Text => {
                let text = render_data.get("text")?;
                let slice = text.get("stringContents")?;
                RenderData::Text {
                    contents: StringSlice {
                        length: slice.u32_at("length")?,
                        chars: slice.u32_at("chars")?,
                        base_chars: slice.u32_at("baseChars")?,
                    },
                    color: rgba(text.get("textColor")?)?,
                    font_id: text.u32_at("fontId")? as u16,
                    font_size: text.u32_at("fontSize")? as u16,
                    letter_spacing: text.u32_at("letterSpacing")? as u16,
                    line_height: text.u32_at("lineHeight")? as u16,
                }
            }
            CommandType::Border => {
                let border = render_data.get("border")?;
                let width = border.get("width")?;
                RenderData::Border {
                    color: rgba(border.get("color")?)?,
                    corner_radius: corner_radius(border.get("cornerRadius")?)?,
                    width: BorderWidth {
                        left: width.u32_at("left")? as u16,
                        right: width.u32_at("right")? as u16,
                        top: width.u32_at("top")? as u16,
                        bottom: width.u32_at("bottom")? as u16,
                        between_children: width.u32_at("betweenChildren")? as u16,
                    },
                }
            }
            CommandType::ScissorStart | CommandType::ScissorEnd => {
                let clip = render_data.get("clip")?;
                RenderData::Clip {
                    horizontal: clip.bool_at("horizontal")?,
                    vertical: clip.bool_at("vertical")?,
                }
            }
            CommandType::Image | CommandType::Custom | CommandType::Unknown(_) => {
                RenderData::Opaque
            }
        };

        Ok(Self {
            bounding_box,
            tag,
            user_data: value.u32_at("userData")?,
            id: value.u32_at("id")?,
            z_index: value.u32_at("zIndex")? as i16,
            data,
        })
    }
}

fn rgba(value: &DecodedValue<'_>) -> Result<Rgba, DecodeError> {
    Ok(Rgba {
        r: value.f32_at("r")?,
        g: value.f32_at("g")?,
        b: value.f32_at("b")?,
        a: value.f32_at("a")?,
    })
}

fn corner_radius(value: &DecodedValue<'_>) -> Result<CornerRadius, DecodeError> {
    Ok(CornerRadius {
        top_left: value.f32_at("topLeft")?,
        top_right: value.f32_at("topRight")?,
        bottom_left: value.f32_at("bottomLeft")?,
        bottom_right: value.f32_at("bottomRight")?,
    })
}

/// Array header the engine writes at the scratch address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandArray {
    pub capacity: i32,
    pub length: i32,
    pub pointer: u32,
}

impl CommandArray {
    /// Header size: capacity, length, pointer
    pub const SIZE: usize = 12;

    pub fn read(view: &MemoryView<'_>, address: usize) -> Result<Self, DecodeError> {
        Ok(Self {
            capacity: view.i32(address)?,
            length: view.i32(address + 4)?,
            pointer: view.u32(address + 8)?,
        })
    }

    /// Number of commands to walk; a negative length means none
    pub fn count(&self) -> usize {
        self.length.max(0) as usize
    }
}
