/*
 *  display/canvas.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cursor based text layout over a monochrome framebuffer
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

use embedded_graphics::mono_font::{
    ascii::{FONT_10X20, FONT_5X8},
    MonoFont, MonoTextStyle,
};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::vframebuf::VarFrameBuf;

/// Text cursor, scale and frame for a single panel
///
/// Mirrors the classic "print at cursor" model of small OLED libraries:
/// `print` advances along the line, `print_line` drops to the start of the
/// next one. Anything past the panel edge is clipped.
#[derive(Debug, Clone)]
pub struct TextCanvas {
    frame: VarFrameBuf<BinaryColor>,
    cursor: Point,
    scale: u8,
}

impl TextCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: VarFrameBuf::new(width, height, BinaryColor::Off),
            cursor: Point::zero(),
            scale: 1,
        }
    }

    pub fn frame(&self) -> &VarFrameBuf<BinaryColor> {
        &self.frame
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Blank the frame and home the cursor. The text scale is kept.
    pub fn clear(&mut self) {
        self.frame.blank();
        self.cursor = Point::zero();
    }

    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = Point::new(x, y);
    }

    pub fn set_scale(&mut self, scale: u8) {
        self.scale = scale.max(1);
    }

    /// Pixel height of one text line at the current scale
    pub fn line_height(&self) -> i32 {
        self.font().character_size.height as i32
    }

    pub fn print(&mut self, text: &str) {
        let mut segments = text.split('\n').peekable();
        while let Some(segment) = segments.next() {
            self.draw_segment(segment);
            if segments.peek().is_some() {
                self.newline();
            }
        }
    }

    pub fn print_line(&mut self, text: &str) {
        self.print(text);
        self.newline();
    }

    fn font(&self) -> &'static MonoFont<'static> {
        match self.scale {
            1 => &FONT_5X8,
            _ => &FONT_10X20,
        }
    }

    fn newline(&mut self) {
        self.cursor = Point::new(0, self.cursor.y + self.line_height());
    }

    fn draw_segment(&mut self, segment: &str) {
        if segment.is_empty() {
            return;
        }
        let style = MonoTextStyle::new(self.font(), BinaryColor::On);
        let Ok(next) = Text::with_baseline(segment, self.cursor, style, Baseline::Top)
            .draw(&mut self.frame);
        self.cursor = Point::new(next.x, self.cursor.y);
    }
}
