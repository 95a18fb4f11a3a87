//! Software canvas presented as truecolor half-blocks.
//!
//! One canvas pixel per half cell. Drawing calls arrive in virtual pixels
//! (cell width x cell height per terminal cell) and are mapped down here,
//! with coverage-weighted source-over blending.

use std::io::{self, Write};

use crate::color::Rgb;
use crate::surface::{self, GradientStop, Rect, Shadow, Surface};
use crate::trail::Point;

// 3x5 digits, three low bits per row, MSB on the left.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];
const GLYPH_COLS: usize = 3;
const GLYPH_ROWS: usize = 5;

pub struct Canvas {
    width: usize,
    height: usize,
    unit_x: f32,
    unit_y: f32,
    pixels: Vec<[f32; 3]>,
    shadow: Option<Shadow>,
    bg_color: Rgb,
    output_buf: Vec<u8>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16, cell_width: f32, cell_height: f32, bg_color: Rgb) -> Self {
        let width = cols as usize;
        let height = rows as usize * 2;
        Self {
            width,
            height,
            unit_x: cell_width,
            unit_y: cell_height / 2.0,
            pixels: vec![[0.0; 3]; width * height],
            shadow: None,
            bg_color,
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        self.pixels[y * self.width + x]
    }

    pub fn pixel_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Terminal columns and rows this canvas covers.
    pub fn cell_size(&self) -> (usize, usize) {
        (self.width, self.height / 2)
    }

    fn blend(&mut self, idx: usize, color: [f32; 3], alpha: f32) {
        let a = alpha.clamp(0.0, 1.0);
        let px = &mut self.pixels[idx];
        for c in 0..3 {
            px[c] = px[c] * (1.0 - a) + color[c] * a;
        }
    }

    /// Pixel index for a virtual-pixel point, if it lands on the canvas.
    fn index_at(&self, x: f32, y: f32) -> Option<usize> {
        let px = (x / self.unit_x).floor();
        let py = (y / self.unit_y).floor();
        if px < 0.0 || py < 0.0 {
            return None;
        }
        let (px, py) = (px as usize, py as usize);
        (px < self.width && py < self.height).then(|| py * self.width + px)
    }

    fn radial(&mut self, center: Point, radius: f32, color: Rgb, alpha: f32, opacity: impl Fn(f32) -> f32) {
        if radius <= 0.0 || alpha <= 0.0 {
            return;
        }
        let lin = color.to_linear();
        let x0 = ((center.x - radius) / self.unit_x).floor().max(0.0) as usize;
        let x1 = (((center.x + radius) / self.unit_x).ceil().max(0.0) as usize).min(self.width);
        let y0 = ((center.y - radius) / self.unit_y).floor().max(0.0) as usize;
        let y1 = (((center.y + radius) / self.unit_y).ceil().max(0.0) as usize).min(self.height);

        let mut hit = false;
        for py in y0..y1 {
            for px in x0..x1 {
                let sx = (px as f32 + 0.5) * self.unit_x;
                let sy = (py as f32 + 0.5) * self.unit_y;
                let d = ((sx - center.x).powi(2) + (sy - center.y).powi(2)).sqrt();
                let t = d / radius;
                if t < 1.0 {
                    hit = true;
                    self.blend(py * self.width + px, lin, alpha * opacity(t));
                }
            }
        }

        // Smaller than a pixel: fold it into the pixel under the centre.
        if hit {
            return;
        }
        if let Some(idx) = self.index_at(center.x, center.y) {
            let area = std::f32::consts::PI * radius * radius / (self.unit_x * self.unit_y);
            self.blend(idx, lin, alpha * opacity(0.5) * area.min(1.0));
        }
    }

    pub fn present<W: Write>(&mut self, out: &mut W, countdown: Option<u32>) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let bg = self.bg_color.to_linear();
        let mut prev_top = Rgb(255, 255, 255);
        let mut prev_bot = Rgb(255, 255, 255);

        for y in (0..self.height).step_by(2) {
            for x in 0..self.width {
                let top = Self::over_background(self.pixels[y * self.width + x], bg);
                let bot = if y + 1 < self.height {
                    Self::over_background(self.pixels[(y + 1) * self.width + x], bg)
                } else {
                    top
                };

                // Only emit color codes if changed
                if top != prev_top {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = top;
                }
                if bot != prev_bot {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = bot;
                }
                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top = Rgb(255, 255, 255);
            prev_bot = Rgb(255, 255, 255);
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        if let Some(value) = countdown {
            self.draw_countdown(value)?;
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }

    fn over_background(px: [f32; 3], bg: [f32; 3]) -> Rgb {
        // Screen blend so black pixels show the background untouched.
        let ch = |i: usize| ((1.0 - (1.0 - bg[i]) * (1.0 - px[i].clamp(0.0, 1.0))) * 255.0).round() as u8;
        Rgb(ch(0), ch(1), ch(2))
    }

    fn draw_countdown(&mut self, value: u32) -> io::Result<()> {
        let digits: Vec<usize> = value.to_string().bytes().map(|b| (b - b'0') as usize).collect();
        let term_rows = self.height / 2;
        // Each glyph pixel is two columns wide, one column gap between glyphs.
        let glyph_width = GLYPH_COLS * 2;
        let total_width = digits.len() * glyph_width + digits.len().saturating_sub(1) * 2;
        if total_width > self.width || GLYPH_ROWS > term_rows {
            return Ok(());
        }
        let left = (self.width - total_width) / 2;
        let top = (term_rows - GLYPH_ROWS) / 2;

        self.output_buf.extend_from_slice(b"\x1b[1;97m");
        for row in 0..GLYPH_ROWS {
            for (i, &digit) in digits.iter().enumerate() {
                let col = left + i * (glyph_width + 2);
                let bits = DIGITS[digit][row];
                for gx in 0..GLYPH_COLS {
                    if bits & (1 << (GLYPH_COLS - 1 - gx)) != 0 {
                        write!(self.output_buf, "\x1b[{};{}H██", top + row + 1, col + gx * 2 + 1)?;
                    }
                }
            }
        }
        self.output_buf.extend_from_slice(b"\x1b[0m");
        Ok(())
    }
}

impl Surface for Canvas {
    fn width(&self) -> f32 {
        self.width as f32 * self.unit_x
    }

    fn height(&self) -> f32 {
        self.height as f32 * self.unit_y
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        if let Some(shadow) = self.shadow {
            let center = Point {
                x: rect.x + rect.w * 0.5,
                y: rect.y + rect.h * 0.5,
            };
            let radius = shadow.blur + rect.w.max(rect.h) * 0.5;
            self.radial(center, radius, shadow.color, alpha * 0.5, |t| 1.0 - t);
        }

        let lin = color.to_linear();
        let x0 = rect.x / self.unit_x;
        let x1 = (rect.x + rect.w) / self.unit_x;
        let y0 = rect.y / self.unit_y;
        let y1 = (rect.y + rect.h) / self.unit_y;
        let px0 = x0.floor().max(0.0) as usize;
        let px1 = (x1.ceil().max(0.0) as usize).min(self.width);
        let py0 = y0.floor().max(0.0) as usize;
        let py1 = (y1.ceil().max(0.0) as usize).min(self.height);

        for py in py0..py1 {
            let cover_y = (y1.min(py as f32 + 1.0) - y0.max(py as f32)).max(0.0);
            for px in px0..px1 {
                let cover_x = (x1.min(px as f32 + 1.0) - x0.max(px as f32)).max(0.0);
                let coverage = cover_x * cover_y;
                if coverage > 0.0 {
                    self.blend(py * self.width + px, lin, alpha * coverage);
                }
            }
        }
    }

    fn fill_radial_gradient(
        &mut self,
        center: Point,
        radius: f32,
        color: Rgb,
        stops: &[GradientStop],
        alpha: f32,
    ) {
        self.radial(center, radius, color, alpha, |t| surface::stop_opacity(stops, t));
    }

    fn stroke_polyline(&mut self, points: &[Point], width: f32, color: Rgb, alpha: f32) {
        if points.len() < 2 || alpha <= 0.0 {
            return;
        }
        let step = self.unit_x.min(self.unit_y) * 0.5;
        let mut touched = Vec::new();
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let len = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
            let steps = (len / step).ceil().max(1.0) as usize;
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                if let Some(idx) = self.index_at(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t) {
                    touched.push(idx);
                }
            }
        }
        touched.sort_unstable();
        touched.dedup();

        let coverage = (width / self.unit_x.min(self.unit_y)).min(1.0);
        let lin = color.to_linear();
        for idx in touched {
            self.blend(idx, lin, alpha * coverage);
        }
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.shadow = shadow;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        // 10x4 cells of 8x16 virtual pixels: 80x64 surface, 10x8 pixels.
        Canvas::new(10, 4, 8.0, 16.0, Rgb::BLACK)
    }

    #[test]
    fn surface_size_is_in_virtual_pixels() {
        let c = canvas();
        assert_eq!(c.width(), 80.0);
        assert_eq!(c.height(), 64.0);
        assert_eq!(c.pixel_size(), (10, 8));
        assert_eq!(c.cell_size(), (10, 4));
    }

    #[test]
    fn fill_rect_blends_by_coverage() {
        let mut c = canvas();
        c.fill_rect(Rect { x: 0.0, y: 0.0, w: 8.0, h: 8.0 }, Rgb::WHITE, 1.0);
        assert_eq!(c.pixel(0, 0), [1.0, 1.0, 1.0]);
        c.fill_rect(Rect { x: 8.0, y: 0.0, w: 4.0, h: 8.0 }, Rgb::WHITE, 1.0);
        assert!((c.pixel(1, 0)[0] - 0.5).abs() < 1e-6);
        assert_eq!(c.pixel(2, 0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn afterglow_fade_darkens_everything() {
        let mut c = canvas();
        c.fill_rect(Rect { x: 0.0, y: 0.0, w: 80.0, h: 64.0 }, Rgb::WHITE, 1.0);
        c.fill_rect(Rect { x: 0.0, y: 0.0, w: 80.0, h: 64.0 }, Rgb::BLACK, 0.12);
        assert!((c.pixel(9, 7)[1] - 0.88).abs() < 1e-6);
    }

    #[test]
    fn gradient_is_brightest_at_centre() {
        let mut c = canvas();
        let stops = [
            GradientStop { offset: 0.0, opacity: 1.0 },
            GradientStop { offset: 1.0, opacity: 0.0 },
        ];
        c.fill_radial_gradient(Point { x: 36.0, y: 36.0 }, 20.0, Rgb::WHITE, &stops, 1.0);
        let centre = c.pixel(4, 4)[0];
        let edge = c.pixel(6, 4)[0];
        assert!(centre > edge && edge > 0.0);
        assert_eq!(c.pixel(0, 0)[0], 0.0);
    }

    #[test]
    fn tiny_gradient_still_lights_a_pixel() {
        let mut c = canvas();
        let stops = [GradientStop { offset: 0.0, opacity: 1.0 }];
        c.fill_radial_gradient(Point { x: 1.0, y: 1.0 }, 1.0, Rgb::WHITE, &stops, 1.0);
        assert!(c.pixel(0, 0)[0] > 0.0);
    }

    #[test]
    fn polyline_touches_each_pixel_once() {
        let mut c = canvas();
        let line = [Point { x: 4.0, y: 4.0 }, Point { x: 76.0, y: 4.0 }];
        c.stroke_polyline(&line, 8.0, Rgb::WHITE, 0.5);
        for x in 0..10 {
            assert!((c.pixel(x, 0)[0] - 0.5).abs() < 1e-6, "x {x}");
        }
        assert_eq!(c.pixel(0, 1)[0], 0.0);
    }

    #[test]
    fn shadow_spreads_beyond_the_core() {
        let mut c = canvas();
        c.set_shadow(Some(Shadow { blur: 10.0, color: Rgb::WHITE }));
        c.fill_rect(Rect::centered(40.0, 32.0, 2.0), Rgb::WHITE, 1.0);
        c.set_shadow(None);
        assert!(c.pixel(4, 3)[0] > 0.0);
        assert!(c.pixel(5, 4)[0] > 0.0);
    }

    #[test]
    fn present_writes_half_blocks_and_overlay() {
        let mut c = canvas();
        let mut out = Vec::new();
        c.present(&mut out, None).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1b[H"));
        assert_eq!(text.matches('▄').count(), 40);
        assert!(!text.contains('█'));

        let mut c = Canvas::new(20, 8, 8.0, 16.0, Rgb(0x1a, 0x1b, 0x26));
        let mut out = Vec::new();
        c.present(&mut out, Some(1)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[48;2;26;27;38m"));
        // The "1" glyph has eight lit cells.
        assert_eq!(text.matches("██").count(), 8);
    }
}
