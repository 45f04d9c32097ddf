//! Color quantization to the 8 basic terminal colors
//!
//! Each channel is bucketed as high (> 200), low (< 100) or mid. Only a few
//! high/low combinations map to a color; everything else is black.

use crate::core::command::Rgba;

pub const RESET: &str = "\x1b[0m";

const HIGH: f32 = 200.0;
const LOW: f32 = 100.0;

/// Basic ANSI palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl TermColor {
    /// Bucket an RGB triple on the 0..255 scale
    pub fn quantize(r: f32, g: f32, b: f32) -> Self {
        let high = |c: f32| c > HIGH;
        let low = |c: f32| c < LOW;

        match (r, g, b) {
            (r, g, b) if high(r) && low(g) && low(b) => TermColor::Red,
            (r, g, b) if low(r) && high(g) && low(b) => TermColor::Green,
            (r, g, b) if high(r) && high(g) && low(b) => TermColor::Yellow,
            (r, g, b) if low(r) && low(g) && high(b) => TermColor::Blue,
            (r, g, b) if high(r) && low(g) && high(b) => TermColor::Magenta,
            (r, g, b) if low(r) && high(g) && high(b) => TermColor::Cyan,
            (r, g, b) if high(r) && high(g) && high(b) => TermColor::White,
            _ => TermColor::Black,
        }
    }

    pub fn from_rgba(color: Rgba) -> Self {
        Self::quantize(color.r, color.g, color.b)
    }

    fn index(self) -> u8 {
        match self {
            TermColor::Black => 0,
            TermColor::Red => 1,
            TermColor::Green => 2,
            TermColor::Yellow => 3,
            TermColor::Blue => 4,
            TermColor::Magenta => 5,
            TermColor::Cyan => 6,
            TermColor::White => 7,
        }
    }

    /// SGR foreground sequence, `\x1b[3Xm`
    pub fn fg(self) -> &'static str {
        const FG: [&str; 8] = [
            "\x1b[30m", "\x1b[31m", "\x1b[32m", "\x1b[33m",
            "\x1b[34m", "\x1b[35m", "\x1b[36m", "\x1b[37m",
        ];
        FG[self.index() as usize]
    }

    /// SGR background sequence, `\x1b[4Xm`
    pub fn bg(self) -> &'static str {
        const BG: [&str; 8] = [
            "\x1b[40m", "\x1b[41m", "\x1b[42m", "\x1b[43m",
            "\x1b[44m", "\x1b[45m", "\x1b[46m", "\x1b[47m",
        ];
        BG[self.index() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_primaries() {
        assert_eq!(TermColor::quantize(250.0, 10.0, 10.0), TermColor::Red);
        assert_eq!(TermColor::quantize(10.0, 250.0, 10.0), TermColor::Green);
        assert_eq!(TermColor::quantize(10.0, 10.0, 250.0), TermColor::Blue);
        assert_eq!(TermColor::quantize(250.0, 250.0, 10.0), TermColor::Yellow);
        assert_eq!(TermColor::quantize(250.0, 10.0, 250.0), TermColor::Magenta);
        assert_eq!(TermColor::quantize(10.0, 250.0, 250.0), TermColor::Cyan);
        assert_eq!(TermColor::quantize(250.0, 250.0, 250.0), TermColor::White);
        assert_eq!(TermColor::quantize(10.0, 10.0, 10.0), TermColor::Black);
    }

    #[test]
    fn test_quantize_mid_values_fall_to_black() {
        // 150 is neither high nor low
        assert_eq!(TermColor::quantize(250.0, 150.0, 10.0), TermColor::Black);
        // Thresholds are strict
        assert_eq!(TermColor::quantize(200.0, 0.0, 0.0), TermColor::Black);
        assert_eq!(TermColor::quantize(201.0, 100.0, 0.0), TermColor::Black);
        assert_eq!(TermColor::quantize(201.0, 99.0, 0.0), TermColor::Red);
    }

    #[test]
    fn test_escape_codes() {
        assert_eq!(TermColor::Red.fg(), "\x1b[31m");
        assert_eq!(TermColor::Red.bg(), "\x1b[41m");
        assert_eq!(TermColor::White.fg(), "\x1b[37m");
        assert_eq!(TermColor::Black.bg(), "\x1b[40m");
    }

    #[test]
    fn test_from_rgba_ignores_alpha() {
        let color = Rgba { r: 0.0, g: 255.0, b: 255.0, a: 0.0 };
        assert_eq!(TermColor::from_rgba(color), TermColor::Cyan);
    }
}
