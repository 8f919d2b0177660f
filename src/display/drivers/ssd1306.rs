/*
 *  display/drivers/ssd1306.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  SSD1306 OLED rendering surface over Linux I2C
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

use linux_embedded_hal::I2cdev;
use ssd1306::{
    mode::BufferedGraphicsMode,
    prelude::*,
    size::{DisplaySize128x32, DisplaySize128x64},
    I2CDisplayInterface,
    Ssd1306,
};

use embedded_graphics::pixelcolor::BinaryColor;

use crate::display::canvas::TextCanvas;
use crate::display::error::DisplayError;
use crate::display::status::PanelConfig;
use crate::display::traits::{DisplayCapabilities, RenderingSurface};
use crate::vframebuf::VarFrameBuf;

use log::{debug, info};

type BufferedSsd1306<SIZE> = Ssd1306<I2CInterface<I2cdev>, SIZE, BufferedGraphicsMode<SIZE>>;

/// Enum to handle different SSD1306 display sizes
enum Ssd1306Variants {
    Size128x64(BufferedSsd1306<DisplaySize128x64>),
    Size128x32(BufferedSsd1306<DisplaySize128x32>),
}

/// SSD1306 rendering surface
///
/// Text is laid out on a local [`TextCanvas`]; `flush` copies the lit
/// pixels into the controller buffer and pushes it over I2C.
pub struct Ssd1306Surface {
    /// Linux I2C device path, e.g. "/dev/i2c-1"
    bus_path: String,

    /// Bus handle between `initialize_bus` and `bring_up_controller`
    i2c: Option<I2cdev>,

    /// The controller, once brought up
    display: Option<Ssd1306Variants>,

    canvas: TextCanvas,

    capabilities: DisplayCapabilities,
}

impl Ssd1306Surface {
    /// Create an SSD1306 surface for the configured panel
    ///
    /// No bus traffic happens here; the bus is opened by
    /// [`initialize_bus`](RenderingSurface::initialize_bus).
    pub fn new(panel: &PanelConfig) -> Result<Self, DisplayError> {
        match (panel.width, panel.height) {
            (128, 64) | (128, 32) => {}
            (w, h) => {
                return Err(DisplayError::InvalidConfiguration(
                    format!("Unsupported SSD1306 size: {}x{}", w, h)
                ));
            }
        }

        Ok(Self {
            bus_path: panel.i2c_bus.clone(),
            i2c: None,
            display: None,
            canvas: TextCanvas::new(panel.width, panel.height),
            capabilities: DisplayCapabilities {
                width: panel.width,
                height: panel.height,
                max_fps: 30, // I2C is slower
            },
        })
    }
}

fn bring_up<SIZE: DisplaySize>(
    i2c: I2cdev,
    address: u8,
    size: SIZE,
) -> Result<BufferedSsd1306<SIZE>, DisplayError> {
    let interface = I2CDisplayInterface::new_custom_address(i2c, address);
    let mut display = Ssd1306::new(interface, size, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    display.init().map_err(|e| {
        DisplayError::InitializationFailed(format!("no response at 0x{:02X}: {:?}", address, e))
    })?;
    Ok(display)
}

fn push_frame<SIZE: DisplaySize>(
    display: &mut BufferedSsd1306<SIZE>,
    frame: &VarFrameBuf<BinaryColor>,
) -> Result<(), DisplayError> {
    display.clear_buffer();
    for point in frame.lit_points() {
        display.set_pixel(point.x as u32, point.y as u32, true);
    }
    display.flush()?;
    Ok(())
}

impl RenderingSurface for Ssd1306Surface {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn initialize_bus(&mut self, sda_pin: u8, scl_pin: u8) -> Result<(), DisplayError> {
        // pin muxing belongs to the kernel on Linux; the pins only document the wiring
        info!("SDA pin: {}", sda_pin);
        info!("SCL pin: {}", scl_pin);

        let i2c = I2cdev::new(&self.bus_path)
            .map_err(|e| DisplayError::I2cError(format!("Failed to open {}: {}", self.bus_path, e)))?;
        self.i2c = Some(i2c);
        Ok(())
    }

    fn bring_up_controller(&mut self, address: u8) -> Result<(), DisplayError> {
        let i2c = self.i2c.take().ok_or_else(|| {
            DisplayError::InitializationFailed("I2C bus not initialized".to_string())
        })?;

        info!("Initializing SSD1306 on {} at address 0x{:02X}", self.bus_path, address);

        let display = match (self.capabilities.width, self.capabilities.height) {
            (128, 32) => Ssd1306Variants::Size128x32(bring_up(i2c, address, DisplaySize128x32)?),
            _ => Ssd1306Variants::Size128x64(bring_up(i2c, address, DisplaySize128x64)?),
        };
        self.display = Some(display);

        debug!(
            "SSD1306 ready ({}x{})",
            self.capabilities.width, self.capabilities.height
        );
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.canvas.clear();
        Ok(())
    }

    fn set_cursor(&mut self, x: i32, y: i32) {
        self.canvas.set_cursor(x, y);
    }

    fn set_text_scale(&mut self, scale: u8) {
        self.canvas.set_scale(scale);
    }

    fn print(&mut self, text: &str) -> Result<(), DisplayError> {
        self.canvas.print(text);
        Ok(())
    }

    fn print_line(&mut self, text: &str) -> Result<(), DisplayError> {
        self.canvas.print_line(text);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        match self.display.as_mut() {
            Some(Ssd1306Variants::Size128x64(display)) => push_frame(display, self.canvas.frame()),
            Some(Ssd1306Variants::Size128x32(display)) => push_frame(display, self.canvas.frame()),
            None => Err(DisplayError::InitializationFailed(
                "SSD1306 controller not brought up".to_string()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unsupported_geometry() {
        let panel = PanelConfig { width: 96, height: 16, ..PanelConfig::default() };
        assert!(matches!(
            Ssd1306Surface::new(&panel),
            Err(DisplayError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_flush_before_bring_up_fails() {
        let mut surface = Ssd1306Surface::new(&PanelConfig::default()).unwrap();
        assert_eq!(surface.capabilities().max_fps, 30);
        assert!(surface.flush().is_err());
        assert!(surface.bring_up_controller(0x3C).is_err());
    }
}
