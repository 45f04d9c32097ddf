//! Cell grid for one frame
//!
//! All drawing goes through `draw_pixel`, which silently drops anything
//! outside `[0, cols) × [0, rows)`. Drawing primitives are therefore total:
//! no coordinate is ever an error.

use bitflags::bitflags;

use super::color::{TermColor, RESET};
use crate::core::command::{BorderWidth, CellRect};

/// Box-drawing glyphs
#[derive(Debug, Clone, Copy)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderChars {
    pub const fn single() -> Self {
        Self {
            top_left: '┌',
            top_right: '┐',
            bottom_left: '└',
            bottom_right: '┘',
            horizontal: '─',
            vertical: '│',
        }
    }
}

bitflags! {
    /// Which sides of a border to draw
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BorderSides: u8 {
        const LEFT   = 0b0001;
        const RIGHT  = 0b0010;
        const TOP    = 0b0100;
        const BOTTOM = 0b1000;
    }
}

impl BorderSides {
    /// Sides with a nonzero width
    pub fn from_width(width: BorderWidth) -> Self {
        let mut sides = BorderSides::empty();
        sides.set(BorderSides::LEFT, width.left > 0);
        sides.set(BorderSides::RIGHT, width.right > 0);
        sides.set(BorderSides::TOP, width.top > 0);
        sides.set(BorderSides::BOTTOM, width.bottom > 0);
        sides
    }
}

/// One character position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub fg: Option<TermColor>,
    pub bg: Option<TermColor>,
    /// False for cells untouched since the last resize
    pub painted: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            glyph: ' ',
            fg: None,
            bg: None,
            painted: false,
        }
    }
}

impl Cell {
    /// Append the cell's escaped form: background, foreground, glyph, reset.
    /// Blank cells are a bare space.
    pub fn write_to(&self, out: &mut String) {
        if !self.painted {
            out.push(self.glyph);
            return;
        }
        if let Some(bg) = self.bg {
            out.push_str(bg.bg());
        }
        if let Some(fg) = self.fg {
            out.push_str(fg.fg());
        }
        out.push(self.glyph);
        out.push_str(RESET);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }
}

/// rows × cols grid of styled cells
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        let mut canvas = Self {
            cols: 0,
            rows: 0,
            cells: Vec::new(),
        };
        canvas.resize(cols, rows);
        canvas
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Reallocate to the given size, every cell blank
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.cells.clear();
        self.cells
            .resize(cols as usize * rows as usize, Cell::default());
    }

    /// Blank every cell, keeping the size
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.cols as i32 || y >= self.rows as i32 {
            return None;
        }
        Some(y as usize * self.cols as usize + x as usize)
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Iterate rows top to bottom
    pub fn row_cells(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        let cols = self.cols as usize;
        (0..self.rows as usize).map(move |y| &self.cells[y * cols..(y + 1) * cols])
    }

    /// Glyphs of one row, without styling
    pub fn row_text(&self, y: u16) -> String {
        self.row_cells()
            .nth(y as usize)
            .map(|row| row.iter().map(|c| c.glyph).collect())
            .unwrap_or_default()
    }

    pub fn draw_pixel(
        &mut self,
        x: i32,
        y: i32,
        glyph: char,
        fg: Option<TermColor>,
        bg: Option<TermColor>,
    ) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell {
                glyph,
                fg,
                bg,
                painted: true,
            };
        }
    }

    /// Clamp a half-open column range to the grid
    fn visible_cols(&self, start: i32, end: i32) -> std::ops::Range<i32> {
        start.max(0)..end.min(self.cols as i32)
    }

    fn visible_rows(&self, start: i32, end: i32) -> std::ops::Range<i32> {
        start.max(0)..end.min(self.rows as i32)
    }

    pub fn draw_rectangle(&mut self, rect: CellRect, bg: TermColor) {
        for row in self.visible_rows(rect.y, rect.y.saturating_add(rect.height)) {
            for col in self.visible_cols(rect.x, rect.x.saturating_add(rect.width)) {
                self.draw_pixel(col, row, ' ', None, Some(bg));
            }
        }
    }

    /// One cell per character from `(x, y)`, no wrapping
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, fg: TermColor) {
        for (i, ch) in text.chars().enumerate() {
            let col = x.saturating_add(i as i32);
            if col >= self.cols as i32 {
                break;
            }
            self.draw_pixel(col, y, ch, Some(fg), None);
        }
    }

    /// Single-line box around `rect`, all four sides
    pub fn draw_border(&mut self, rect: CellRect, fg: TermColor) {
        self.draw_border_sides(rect, fg, BorderSides::all());
    }

    /// Single-line border drawing only the selected sides. Corners appear
    /// where two selected sides meet and are drawn after the edges.
    pub fn draw_border_sides(&mut self, rect: CellRect, fg: TermColor, sides: BorderSides) {
        let chars = BorderChars::single();
        let fg = Some(fg);
        let left = rect.x;
        let top = rect.y;
        let right = rect.x.saturating_add(rect.width).saturating_sub(1);
        let bottom = rect.y.saturating_add(rect.height).saturating_sub(1);

        for col in self.visible_cols(left, right.saturating_add(1)) {
            if sides.contains(BorderSides::TOP) {
                self.draw_pixel(col, top, chars.horizontal, fg, None);
            }
            if sides.contains(BorderSides::BOTTOM) {
                self.draw_pixel(col, bottom, chars.horizontal, fg, None);
            }
        }
        for row in self.visible_rows(top, bottom.saturating_add(1)) {
            if sides.contains(BorderSides::LEFT) {
                self.draw_pixel(left, row, chars.vertical, fg, None);
            }
            if sides.contains(BorderSides::RIGHT) {
                self.draw_pixel(right, row, chars.vertical, fg, None);
            }
        }

        let corners = [
            (BorderSides::TOP | BorderSides::LEFT, left, top, chars.top_left),
            (BorderSides::TOP | BorderSides::RIGHT, right, top, chars.top_right),
            (BorderSides::BOTTOM | BorderSides::LEFT, left, bottom, chars.bottom_left),
            (BorderSides::BOTTOM | BorderSides::RIGHT, right, bottom, chars.bottom_right),
        ];
        for (needed, x, y, glyph) in corners {
            if sides.contains(needed) {
                self.draw_pixel(x, y, glyph, fg, None);
            }
        }
    }

    /// Full frame body: each row's escaped cells followed by a newline
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() * 12);
        self.render_into(&mut out);
        out
    }

    /// Append the frame body to `out`
    pub fn render_into(&self, out: &mut String) {
        for row in self.row_cells() {
            for cell in row {
                cell.write_to(out);
            }
            out.push('\n');
        }
    }
}
