/*
 *  vframebuf.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime-sized monochrome framebuffer used as the text canvas backing store
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;

/// A runtime-sized framebuffer for embedded-graphics.
///
/// Panel geometry comes from configuration, so the buffer cannot be a
/// const-generic array.
#[derive(Debug, Clone)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
    background: C,
}

impl<C: PixelColor> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, background: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![background; w * h], w, h, background }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access, row-major
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Reset every pixel to the background colour
    pub fn blank(&mut self) {
        self.buf.fill(self.background);
    }

    /// Pixel at (x, y), or None when outside the buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<C> {
        self.idx(Point::new(x as i32, y as i32)).map(|i| self.buf[i])
    }

    /// Number of pixels currently set to `color`
    pub fn count(&self, color: C) -> usize {
        self.buf.iter().filter(|&&p| p == color).count()
    }

    /// Iterate the pixels that differ from the background
    pub fn lit_points(&self) -> impl Iterator<Item = Point> + '_ {
        let w = self.w;
        let bg = self.background;
        self.buf
            .iter()
            .enumerate()
            .filter(move |(_, c)| **c != bg)
            .map(move |(i, _)| Point::new((i % w) as i32, (i / w) as i32))
    }

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
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for VarFrameBuf<C> {
    type Color = C;
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
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn test_new_buffer_is_blank() {
        let fb = VarFrameBuf::new(128, 64, BinaryColor::Off);
        assert_eq!(fb.width(), 128);
        assert_eq!(fb.height(), 64);
        assert_eq!(fb.count(BinaryColor::On), 0);
        assert_eq!(fb.as_slice().len(), 128 * 64);
    }

    #[test]
    fn test_draw_clips_out_of_bounds() {
        let mut fb = VarFrameBuf::new(16, 8, BinaryColor::Off);
        Line::new(Point::new(-4, 2), Point::new(40, 2))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut fb)
            .unwrap();

        assert_eq!(fb.count(BinaryColor::On), 16);
        assert_eq!(fb.pixel(0, 2), Some(BinaryColor::On));
        assert_eq!(fb.pixel(16, 2), None);
    }

    #[test]
    fn test_blank_and_lit_points() {
        let mut fb = VarFrameBuf::new(8, 8, BinaryColor::Off);
        Pixel(Point::new(3, 5), BinaryColor::On).draw(&mut fb).unwrap();

        let lit: Vec<Point> = fb.lit_points().collect();
        assert_eq!(lit, vec![Point::new(3, 5)]);

        fb.blank();
        assert_eq!(fb.lit_points().count(), 0);
    }
}
