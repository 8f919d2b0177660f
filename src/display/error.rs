/*
 *  display/error.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the display subsystem
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

use std::fmt;
use std::error::Error;

/// Error type for all rendering surface operations
#[derive(Debug)]
pub enum DisplayError {
    /// Controller bring-up failed (hardware unavailable)
    InitializationFailed(String),

    /// I2C communication error
    I2cError(String),

    /// Invalid panel configuration
    InvalidConfiguration(String),

    /// Display interface error
    InterfaceError(display_interface::DisplayError),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::InitializationFailed(msg) =>
                write!(f, "Display initialization failed: {}", msg),
            DisplayError::I2cError(msg) =>
                write!(f, "I2C communication error: {}", msg),
            DisplayError::InvalidConfiguration(msg) =>
                write!(f, "Invalid configuration: {}", msg),
            DisplayError::InterfaceError(err) =>
                write!(f, "Display interface error: {:?}", err),
        }
    }
}

// display_interface::DisplayError doesn't implement std::error::Error,
// so there is no source to expose
impl Error for DisplayError {}

impl From<display_interface::DisplayError> for DisplayError {
    fn from(err: display_interface::DisplayError) -> Self {
        DisplayError::InterfaceError(err)
    }
}

impl From<linux_embedded_hal::I2CError> for DisplayError {
    fn from(err: linux_embedded_hal::I2CError) -> Self {
        DisplayError::I2cError(format!("{:?}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DisplayError::InitializationFailed("no ack at 0x3C".to_string());
        assert_eq!(err.to_string(), "Display initialization failed: no ack at 0x3C");

        let err = DisplayError::InvalidConfiguration("width must be > 0".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: width must be > 0");
    }

    #[test]
    fn test_interface_error_conversion() {
        let err: DisplayError = display_interface::DisplayError::BusWriteError.into();
        assert!(matches!(err, DisplayError::InterfaceError(_)));
        assert!(err.to_string().starts_with("Display interface error: "));
    }
}
