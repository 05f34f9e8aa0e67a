//! Chart rendering
//!
//! Draws OHLC series into PNG images attached to text reports.

mod candlestick;

pub use candlestick::CandlestickRenderer;

use image::{Rgb, RgbImage};

/// Common color definitions
pub mod colors {
    use image::Rgb;

    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const LIGHT_BLUE: Rgb<u8> = Rgb([173, 216, 230]);
}

/// Colors used for a chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub background: Rgb<u8>,
    pub grid: Rgb<u8>,
    pub bullish: Rgb<u8>,
    pub bearish: Rgb<u8>,
    /// Horizontal grid lines across the plot area
    pub grid_lines: u32,
    pub margin: u32,
}

impl ChartStyle {
    /// Black background with a black grid, light blue up candles and white down candles
    pub fn dark() -> Self {
        Self {
            background: colors::BLACK,
            grid: colors::BLACK,
            bullish: colors::LIGHT_BLUE,
            bearish: colors::WHITE,
            grid_lines: 8,
            margin: 20,
        }
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::dark()
    }
}

/// Fill a rectangle, clipped to the image
pub fn draw_filled_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = x.saturating_add(width).min(img.width());
    let y_end = y.saturating_add(height).min(img.height());

    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

/// Draw a vertical line between two rows, inclusive
pub fn draw_vertical_line(img: &mut RgbImage, x: u32, y1: u32, y2: u32, color: Rgb<u8>) {
    if x >= img.width() || img.height() == 0 {
        return;
    }
    let (start, end) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    for y in start..=end.min(img.height() - 1) {
        img.put_pixel(x, y, color);
    }
}

/// Draw a horizontal line between two columns, inclusive
pub fn draw_horizontal_line(img: &mut RgbImage, y: u32, x1: u32, x2: u32, color: Rgb<u8>) {
    if y >= img.height() || img.width() == 0 {
        return;
    }
    let (start, end) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    for x in start..=end.min(img.width() - 1) {
        img.put_pixel(x, y, color);
    }
}
