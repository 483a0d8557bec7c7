use super::Color;
use crate::types::Frame;

/// Mutable view over a rectangular slice of a frame's RGBA buffer. Gameplay
/// drawing goes through a canvas so a two-player round can hand each half of
/// the screen to an independent game without copying pixels.
pub struct Canvas<'a> {
    buf: &'a mut [u8],
    stride: u32,
    x_offset: u32,
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut Frame) -> Self {
        Canvas {
            stride: frame.width,
            x_offset: 0,
            width: frame.width,
            height: frame.height,
            buf: &mut frame.rgba,
        }
    }

    /// View restricted to the columns `[x_offset, x_offset + width)`.
    pub fn viewport(frame: &'a mut Frame, x_offset: u32, width: u32) -> Self {
        let width = width.min(frame.width.saturating_sub(x_offset));
        Canvas {
            stride: frame.width,
            x_offset,
            width,
            height: frame.height,
            buf: &mut frame.rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.stride + self.x_offset + x) as usize) * 4;
        if idx + 4 <= self.buf.len() {
            self.buf[idx..idx + 4].copy_from_slice(&color);
        }
    }

    pub fn draw_line(&mut self, p0: (i32, i32), p1: (i32, i32), color: Color, thickness: i32) {
        let (mut x0, mut y0) = p0;
        let (x1, y1) = p1;
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let radius = (thickness.max(1) - 1) / 2;

        loop {
            self.put_pixel(x0, y0, color);
            if radius > 0 {
                for ox in -radius..=radius {
                    for oy in -radius..=radius {
                        if ox.abs() + oy.abs() <= radius && (ox != 0 || oy != 0) {
                            self.put_pixel(x0 + ox, y0 + oy, color);
                        }
                    }
                }
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    pub fn draw_circle_filled(&mut self, center: (i32, i32), radius: i32, color: Color) {
        let (cx, cy) = center;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.put_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    pub fn draw_circle_outline(
        &mut self,
        center: (i32, i32),
        radius: i32,
        color: Color,
        thickness: i32,
    ) {
        let (cx, cy) = center;
        let inner = (radius - thickness.max(1)).max(0);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d2 = dx * dx + dy * dy;
                if d2 <= radius * radius && d2 >= inner * inner {
                    self.put_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    pub fn draw_rect(
        &mut self,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
        color: Color,
        thickness: i32,
    ) {
        let (x1, y1) = top_left;
        let (x2, y2) = bottom_right;
        self.draw_line((x1, y1), (x2, y1), color, thickness);
        self.draw_line((x2, y1), (x2, y2), color, thickness);
        self.draw_line((x2, y2), (x1, y2), color, thickness);
        self.draw_line((x1, y2), (x1, y1), color, thickness);
    }
}
