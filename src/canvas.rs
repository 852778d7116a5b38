/*
 *  canvas.rs
 *
 *  agendash - agenda at a glance
 *	(c) 2025-26 the agendash authors
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use thiserror::Error;
use tiny_skia::Pixmap;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("canvas dimensions must be nonzero")]
    ZeroSized,
    #[error("PNG encode error: {0}")]
    Png(String),
}

/// A runtime-sized RGB framebuffer for embedded-graphics.
///
/// Out-of-bounds pixels are dropped, which is what lets the layout draw
/// with a bounded cursor and no per-primitive clipping.
#[derive(Debug, Clone)]
pub struct Canvas {
    buf: Vec<Rgb888>,
    w: usize,
    h: usize,
}

impl Canvas {
    pub fn new(width: u32, height: u32, fill: Rgb888) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    pub fn as_slice(&self) -> &[Rgb888] { &self.buf }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb888> {
        if x < self.w && y < self.h {
            Some(self.buf[y * self.w + x])
        } else {
            None
        }
    }

    fn to_pixmap(&self) -> Option<Pixmap> {
        let mut pixmap = Pixmap::new(self.w as u32, self.h as u32)?;
        let data = pixmap.data_mut();
        for (i, c) in self.buf.iter().enumerate() {
            let o = i * 4;
            data[o] = c.r();
            data[o + 1] = c.g();
            data[o + 2] = c.b();
            data[o + 3] = 255;
        }
        Some(pixmap)
    }

    /// Encode the buffer as a PNG byte stream.
    pub fn encode_png(&self) -> Result<Vec<u8>, CanvasError> {
        let pixmap = self.to_pixmap().ok_or(CanvasError::ZeroSized)?;
        pixmap.encode_png().map_err(|e| CanvasError::Png(e.to_string()))
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, WHITE};

    #[test]
    fn test_out_of_bounds_pixels_dropped() {
        let mut c = Canvas::new(4, 4, WHITE);
        let pixels = [
            Pixel(Point::new(-1, 0), BLACK),
            Pixel(Point::new(0, -1), BLACK),
            Pixel(Point::new(4, 0), BLACK),
            Pixel(Point::new(1, 1), BLACK),
        ];
        c.draw_iter(pixels).unwrap();
        assert_eq!(c.pixel(1, 1), Some(BLACK));
        assert_eq!(c.as_slice().iter().filter(|&&p| p == BLACK).count(), 1);
    }

    #[test]
    fn test_encode_png_nonempty() {
        let c = Canvas::new(8, 8, WHITE);
        let png = c.encode_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_zero_size_rejected() {
        let c = Canvas::new(0, 8, WHITE);
        assert!(matches!(c.encode_png(), Err(CanvasError::ZeroSized)));
    }
}
