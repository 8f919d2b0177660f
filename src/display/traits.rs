/*
 *  display/traits.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Rendering surface abstraction consumed by the status display
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

use core::fmt::Write;

use crate::display::error::DisplayError;

/// Largest magnitude printed as a number; beyond it the text is "ovf"
const MAX_PRINTABLE: f64 = 4_294_967_040.0;

/// Format a number the way small-panel print routines do
///
/// Adds half of the last shown decimal and truncates, so ties always round
/// away from zero (12.5 -> "13"). NaN and infinities print as "nan" and
/// "inf", magnitudes past the 32-bit range as "ovf".
pub fn format_value(value: f32, decimals: usize) -> String {
    let mut number = f64::from(value);
    if number.is_nan() {
        return "nan".to_string();
    }
    if number.is_infinite() {
        return "inf".to_string();
    }
    if number.abs() > MAX_PRINTABLE {
        return "ovf".to_string();
    }

    let mut out = String::new();
    if number < 0.0 {
        out.push('-');
        number = -number;
    }

    number += 0.5 / 10f64.powi(decimals as i32);
    let whole = number as u64;
    let _ = write!(out, "{}", whole);

    if decimals > 0 {
        out.push('.');
        let mut remainder = number - whole as f64;
        for _ in 0..decimals {
            remainder *= 10.0;
            let digit = (remainder as u8).min(9);
            out.push(char::from(b'0' + digit));
            remainder -= f64::from(digit);
        }
    }
    out
}

/// Panel geometry and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Maximum recommended frame rate
    pub max_fps: u32,
}

/// Text-oriented drawing surface backed by a monochrome panel
///
/// This is the only seam between the status screens and the hardware. The
/// real implementation talks to an SSD1306 over I2C; tests substitute
/// [`MockSurface`](crate::display::drivers::mock::MockSurface).
///
/// Drawing calls (`print*`, cursor and scale) only touch an in-memory
/// frame. Nothing reaches the panel until [`flush`](Self::flush).
pub trait RenderingSurface {
    /// Returns the capabilities of this surface
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Prepare the bus transport the controller sits on
    fn initialize_bus(&mut self, sda_pin: u8, scl_pin: u8) -> Result<(), DisplayError>;

    /// Bring up the display controller at a 7-bit bus address
    ///
    /// An error here means the hardware is unavailable.
    fn bring_up_controller(&mut self, address: u8) -> Result<(), DisplayError>;

    /// Blank the in-memory frame and home the cursor
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the text cursor to a pixel position (top-left of the next glyph)
    fn set_cursor(&mut self, x: i32, y: i32);

    /// Select the text magnification (1 = normal)
    fn set_text_scale(&mut self, scale: u8);

    /// Draw text at the cursor without ending the line
    fn print(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Draw text at the cursor and move to the start of the next line
    fn print_line(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Draw a number with a fixed count of decimal places
    fn print_value(&mut self, value: f32, decimals: usize) -> Result<(), DisplayError> {
        self.print(&format_value(value, decimals))
    }

    /// Push the in-memory frame to the panel
    fn flush(&mut self) -> Result<(), DisplayError>;
}

impl<S: RenderingSurface + ?Sized> RenderingSurface for Box<S> {
    fn capabilities(&self) -> &DisplayCapabilities { (**self).capabilities() }
    fn initialize_bus(&mut self, sda_pin: u8, scl_pin: u8) -> Result<(), DisplayError> {
        (**self).initialize_bus(sda_pin, scl_pin)
    }
    fn bring_up_controller(&mut self, address: u8) -> Result<(), DisplayError> {
        (**self).bring_up_controller(address)
    }
    fn clear(&mut self) -> Result<(), DisplayError> { (**self).clear() }
    fn set_cursor(&mut self, x: i32, y: i32) { (**self).set_cursor(x, y) }
    fn set_text_scale(&mut self, scale: u8) { (**self).set_text_scale(scale) }
    fn print(&mut self, text: &str) -> Result<(), DisplayError> { (**self).print(text) }
    fn print_line(&mut self, text: &str) -> Result<(), DisplayError> { (**self).print_line(text) }
    fn print_value(&mut self, value: f32, decimals: usize) -> Result<(), DisplayError> {
        (**self).print_value(value, decimals)
    }
    fn flush(&mut self) -> Result<(), DisplayError> { (**self).flush() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_round_up() {
        assert_eq!(format_value(12.5, 0), "13");
        assert_eq!(format_value(2.5, 0), "3");
        assert_eq!(format_value(0.5, 0), "1");
        assert_eq!(format_value(23.25, 1), "23.3");
    }

    #[test]
    fn test_ordinary_rounding() {
        assert_eq!(format_value(23.456, 1), "23.5");
        assert_eq!(format_value(55.1, 1), "55.1");
        assert_eq!(format_value(12.4, 0), "12");
        assert_eq!(format_value(47.6, 0), "48");
        assert_eq!(format_value(0.0, 1), "0.0");
        assert_eq!(format_value(100.0, 0), "100");
    }

    #[test]
    fn test_sign_is_handled_before_rounding() {
        assert_eq!(format_value(-2.5, 0), "-3");
        assert_eq!(format_value(-3.14, 1), "-3.1");
        assert_eq!(format_value(-0.04, 1), "-0.0");
    }

    #[test]
    fn test_non_finite_and_overflow() {
        assert_eq!(format_value(f32::NAN, 1), "nan");
        assert_eq!(format_value(f32::INFINITY, 1), "inf");
        assert_eq!(format_value(f32::NEG_INFINITY, 0), "inf");
        assert_eq!(format_value(5.0e9, 0), "ovf");
    }
}
