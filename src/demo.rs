//! Built-in demo layout
//!
//! A small `LayoutEngine` that lays out a fixed dashboard for whatever size
//! it is given and encodes it as wire-format render commands:
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │              header + title                │
//! │┌─ sidebar ─┐┌──────── content ────────────┐│
//! ││ Navigation││ Welcome, features, counter  ││
//! │└───────────┘└─────────────────────────────┘│
//! └ footer ────────────────────────────────────┘
//! ```

use tracing::trace;

use crate::core::command::{BorderWidth, BoundingBox, Rgba};
use crate::core::encode::CommandBuffer;
use crate::core::layout::{measure_text, FrameInput, LayoutEngine, LayoutError};

/// Where the demo places its command array header
pub const DEMO_SCRATCH_ADDRESS: usize = 8;

const SIDEBAR_WIDTH: f32 = 20.0;

const NAV_ITEMS: [&str; 4] = ["Home", "Settings", "About", "Exit"];

const FEATURES: [&str; 4] = [
    "- Text rendering",
    "- Rectangle drawing",
    "- Border drawing",
    "- Color support",
];

const fn rgb(r: f32, g: f32, b: f32) -> Rgba {
    Rgba { r, g, b, a: 255.0 }
}

const BLACK: Rgba = rgb(0.0, 0.0, 0.0);
const BLUE: Rgba = rgb(0.0, 0.0, 255.0);
const GREEN: Rgba = rgb(0.0, 255.0, 0.0);
const YELLOW: Rgba = rgb(255.0, 255.0, 0.0);
const MAGENTA: Rgba = rgb(255.0, 0.0, 255.0);
const CYAN: Rgba = rgb(0.0, 255.0, 255.0);
const WHITE: Rgba = rgb(255.0, 255.0, 255.0);

const THIN: BorderWidth = BorderWidth {
    left: 1,
    right: 1,
    top: 1,
    bottom: 1,
    between_children: 0,
};

fn bounds(x: f32, y: f32, width: f32, height: f32) -> BoundingBox {
    BoundingBox {
        x,
        y,
        width: width.max(0.0),
        height: height.max(0.0),
    }
}

/// Demo dashboard engine
#[derive(Debug)]
pub struct DemoEngine {
    commands: CommandBuffer,
    memory: Vec<u8>,
    counter: u64,
    uptime: f32,
}

impl Default for DemoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoEngine {
    pub fn new() -> Self {
        Self {
            commands: CommandBuffer::new(DEMO_SCRATCH_ADDRESS),
            memory: Vec::new(),
            counter: 0,
            uptime: 0.0,
        }
    }

    /// Frames laid out so far
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Sum of the elapsed times passed in
    pub fn uptime(&self) -> f32 {
        self.uptime
    }

    fn label(&mut self, x: f32, y: f32, text: &str, color: Rgba) {
        let size = measure_text(text.as_bytes());
        self.commands
            .text(bounds(x, y, size.width, size.height), text, color);
    }

    fn layout(&mut self, width: f32, height: f32) {
        self.commands.clear();

        self.commands.border(bounds(0.0, 0.0, width, height), CYAN, THIN);

        // Header
        self.commands.rectangle(bounds(1.0, 1.0, width - 2.0, 3.0), BLUE);
        self.label((width / 2.0).floor() - 10.0, 2.0, "Clay Terminal UI Demo", WHITE);

        // Sidebar
        let panel_height = height - 5.0;
        let sidebar = bounds(1.0, 4.0, SIDEBAR_WIDTH, panel_height);
        self.commands.rectangle(sidebar, BLACK);
        self.commands.border(sidebar, GREEN, THIN);
        self.label(3.0, 6.0, "Navigation", GREEN);
        for (i, item) in NAV_ITEMS.iter().enumerate() {
            self.label(3.0, 8.0 + i as f32, item, WHITE);
        }

        // Content
        let content_x = SIDEBAR_WIDTH + 1.0;
        let content = bounds(content_x, 4.0, width - content_x - 1.0, panel_height);
        self.commands.rectangle(content, BLACK);
        self.commands.border(content, YELLOW, THIN);
        let text_x = content_x + 2.0;
        self.label(text_x, 6.0, "Welcome to Clay Terminal UI", MAGENTA);
        self.label(
            text_x,
            8.0,
            "This is a simple demo of the terminal UI renderer",
            WHITE,
        );
        self.label(text_x, 10.0, "Features:", CYAN);
        for (i, feature) in FEATURES.iter().enumerate() {
            self.label(text_x + 2.0, 11.0 + i as f32, feature, WHITE);
        }
        let counter = format!("Counter: {}", self.counter);
        self.label(text_x, 16.0, &counter, GREEN);

        // Footer
        self.commands
            .rectangle(bounds(1.0, height - 1.0, width - 2.0, 1.0), BLUE);
        self.label(2.0, height - 1.0, "Press Ctrl+C to exit", WHITE);
    }
}

impl LayoutEngine for DemoEngine {
    fn update_frame(&mut self, input: &FrameInput) -> Result<(), LayoutError> {
        self.uptime += input.delta_seconds;
        self.layout(input.width as f32, input.height as f32);
        self.commands.finish_into(&mut self.memory);
        trace!(
            "demo frame {} laid out {} commands",
            self.counter,
            self.commands.len()
        );
        self.counter += 1;
        Ok(())
    }

    fn memory(&self) -> &[u8] {
        &self.memory
    }

    fn scratch_address(&self) -> usize {
        DEMO_SCRATCH_ADDRESS
    }
}
