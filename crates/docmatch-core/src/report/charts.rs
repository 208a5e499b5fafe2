//! Raster bar and pie charts.
//!
//! Charts carry no text; titles and legends go into the surrounding
//! document.

use std::f64::consts::PI;
use std::io::Cursor;

use image::{ImageFormat, Rgb as Pixel, RgbImage};

use crate::error::ReportError;
use crate::matching::Rgb;

const BAR_WIDTH: u32 = 1000;
const BAR_HEIGHT: u32 = 600;
const MARGIN: u32 = 60;
const PIE_SIZE: u32 = 600;

const WHITE: Pixel<u8> = Pixel([255, 255, 255]);
const BLACK: Pixel<u8> = Pixel([0, 0, 0]);
const GRID: Pixel<u8> = Pixel([220, 220, 220]);
const EMPTY_SLICE: Pixel<u8> = Pixel([200, 200, 200]);

/// Chart series colors.
pub mod palette {
    use crate::matching::Rgb;

    pub const GREEN: Rgb = Rgb(0, 128, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const ORANGE: Rgb = Rgb(255, 165, 0);
}

/// One bar made of two stacked segments.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBar {
    pub label: String,
    /// Bottom segment, in percent.
    pub lower: f64,
    /// Segment stacked on top, in percent.
    pub upper: f64,
}

fn pixel(color: Rgb) -> Pixel<u8> {
    Pixel([color.0, color.1, color.2])
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Pixel<u8>) {
    let x1 = x1.min(img.width());
    let y1 = y1.min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

/// Draw stacked bars on a 0 - max(100, tallest bar) percent scale.
pub fn stacked_bar_chart(bars: &[StackedBar], lower: Rgb, upper: Rgb) -> RgbImage {
    let mut img = RgbImage::from_pixel(BAR_WIDTH, BAR_HEIGHT, WHITE);

    let plot_left = MARGIN;
    let plot_right = BAR_WIDTH - MARGIN / 2;
    let plot_top = MARGIN / 2;
    let plot_bottom = BAR_HEIGHT - MARGIN;
    let plot_height = f64::from(plot_bottom - plot_top);

    let scale_max = bars
        .iter()
        .map(|b| b.lower.max(0.0) + b.upper.max(0.0))
        .fold(100.0_f64, f64::max);

    // Horizontal grid every 20%.
    let mut level = 20.0;
    while level <= scale_max {
        let y = plot_bottom - (level / scale_max * plot_height).round() as u32;
        fill_rect(&mut img, plot_left, y, plot_right, y + 1, GRID);
        level += 20.0;
    }

    if !bars.is_empty() {
        let slot = f64::from(plot_right - plot_left) / bars.len() as f64;
        let bar_width = (slot * 0.8).max(1.0);

        for (idx, bar) in bars.iter().enumerate() {
            let x0 = plot_left + (idx as f64 * slot + (slot - bar_width) / 2.0).round() as u32;
            let x1 = x0 + bar_width.round() as u32;

            let lower_px = (bar.lower.max(0.0) / scale_max * plot_height).round() as u32;
            let upper_px = (bar.upper.max(0.0) / scale_max * plot_height).round() as u32;

            let lower_top = plot_bottom.saturating_sub(lower_px);
            let upper_top = lower_top.saturating_sub(upper_px).max(plot_top);

            fill_rect(&mut img, x0, lower_top, x1, plot_bottom, pixel(lower));
            fill_rect(&mut img, x0, upper_top, x1, lower_top, pixel(upper));
        }
    }

    // Axes
    fill_rect(&mut img, plot_left, plot_bottom, plot_right, plot_bottom + 2, BLACK);
    fill_rect(&mut img, plot_left - 2, plot_top, plot_left, plot_bottom + 2, BLACK);

    img
}

/// Draw a pie chart starting at 12 o'clock and running counter-clockwise.
///
/// Negative values count as zero; an all-zero pie is drawn grey.
pub fn pie_chart(slices: &[(f64, Rgb)]) -> RgbImage {
    let mut img = RgbImage::from_pixel(PIE_SIZE, PIE_SIZE, WHITE);

    let total: f64 = slices.iter().map(|(v, _)| v.max(0.0)).sum();
    let center = f64::from(PIE_SIZE) / 2.0;
    let radius = center - 20.0;

    for y in 0..PIE_SIZE {
        for x in 0..PIE_SIZE {
            let dx = f64::from(x) + 0.5 - center;
            let dy = center - (f64::from(y) + 0.5);
            if dx * dx + dy * dy > radius * radius {
                continue;
            }

            if total <= 0.0 {
                img.put_pixel(x, y, EMPTY_SLICE);
                continue;
            }

            // Fraction of a turn measured counter-clockwise from 12 o'clock.
            let angle = dy.atan2(dx) - PI / 2.0;
            let fraction = angle.rem_euclid(2.0 * PI) / (2.0 * PI);

            let mut cumulative = 0.0;
            let mut color = slices.last().map(|(_, c)| *c).unwrap_or(Rgb(0, 0, 0));
            for (value, slice_color) in slices {
                cumulative += value.max(0.0) / total;
                if fraction < cumulative {
                    color = *slice_color;
                    break;
                }
            }
            img.put_pixel(x, y, pixel(color));
        }
    }

    img
}

/// Encode an image as PNG bytes.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, ReportError> {
    let mut data = Vec::new();
    img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)?;
    Ok(data)
}
