//! Candlestick chart renderer

use super::{draw_filled_rect, draw_horizontal_line, draw_vertical_line, ChartStyle};
use crate::error::Result;
use crate::types::Series;
use image::{ImageFormat, RgbImage};
use std::path::Path;
use tracing::debug;

/// Renders a series as one candle per bar
#[derive(Debug, Clone)]
pub struct CandlestickRenderer {
    width: u32,
    height: u32,
    style: ChartStyle,
}

impl CandlestickRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            style: ChartStyle::default(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Draw the series into an in-memory image
    pub fn draw(&self, series: &Series) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width, self.height, self.style.background);

        let margin = self.style.margin.min(self.width / 4).min(self.height / 4);
        let plot_w = self.width.saturating_sub(2 * margin);
        let plot_h = self.height.saturating_sub(2 * margin);
        if plot_w == 0 || plot_h == 0 {
            return img;
        }

        if self.style.grid_lines > 0 {
            for i in 0..=self.style.grid_lines {
                let y = margin + plot_h * i / self.style.grid_lines;
                let y = y.min(margin + plot_h - 1);
                draw_horizontal_line(&mut img, y, margin, margin + plot_w - 1, self.style.grid);
            }
        }

        let (lo, hi) = match series.price_range() {
            Some(range) => padded(range),
            None => return img,
        };

        let to_y = |price: f64| -> u32 {
            let frac = ((hi - price) / (hi - lo)).clamp(0.0, 1.0);
            margin + (frac * (plot_h - 1) as f64).round() as u32
        };

        let n = series.len() as u32;
        let slot = (plot_w / n).max(1);
        let body_w = (slot * 3 / 5).max(1);

        for (i, candle) in series.candles().iter().enumerate() {
            let slot_x = margin + slot * i as u32;
            if slot_x >= margin + plot_w {
                break;
            }
            let center = slot_x + slot / 2;
            let color = if candle.is_bullish() {
                self.style.bullish
            } else {
                self.style.bearish
            };

            draw_vertical_line(&mut img, center, to_y(candle.high), to_y(candle.low), color);

            let top = to_y(candle.open.max(candle.close));
            let bottom = to_y(candle.open.min(candle.close));
            let body_x = center.saturating_sub(body_w / 2);
            draw_filled_rect(&mut img, body_x, top, body_w, (bottom - top).max(1), color);
        }

        img
    }

    /// Render the series to a PNG file, creating parent directories
    pub fn render(&self, series: &Series, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        self.draw(series).save_with_format(path, ImageFormat::Png)?;
        debug!(
            "Rendered {} candles for {} to {}",
            series.len(),
            series.symbol(),
            path.display()
        );
        Ok(())
    }
}

impl Default for CandlestickRenderer {
    fn default() -> Self {
        Self::new(1200, 800)
    }
}

/// Pad a flat range so every price maps to a finite row
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        let pad = (lo.abs() * 0.01).max(1.0);
        (lo - pad, hi + pad)
    }
}
