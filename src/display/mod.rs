/*
 *  display/mod.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - rendering surfaces, screens and rotation
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod canvas;
pub mod clock;

// Rendering surfaces
pub mod drivers;

// Screen content and rotation
pub mod screens;
pub mod scheduler;
pub mod status;

// Re-exports for convenience
pub use traits::{DisplayCapabilities, RenderingSurface};
pub use error::DisplayError;
pub use canvas::TextCanvas;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use drivers::mock::{MockSurface, SurfaceOp};
pub use screens::MoistureLevel;
pub use scheduler::{SchedulerConfig, ScreenScheduler};
pub use status::{PanelConfig, StatusDisplay};

#[cfg(feature = "driver-ssd1306")]
pub use drivers::ssd1306::Ssd1306Surface;

/// Which screen is shown; rotates forward in declaration order
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DisplayState {
    NetworkInfo, // mode, SSID, address, web hint
    SensorData,  // temperature, humidity, raw moisture
    PlantStatus, // DRY / GOOD / WET per plant
    IpOnly,      // big address
}

impl DisplayState {
    pub const ALL: [DisplayState; 4] = [
        DisplayState::NetworkInfo,
        DisplayState::SensorData,
        DisplayState::PlantStatus,
        DisplayState::IpOnly,
    ];

    /// The following screen, wrapping from the last back to the first
    pub fn next(self) -> Self {
        match self {
            DisplayState::NetworkInfo => DisplayState::SensorData,
            DisplayState::SensorData => DisplayState::PlantStatus,
            DisplayState::PlantStatus => DisplayState::IpOnly,
            DisplayState::IpOnly => DisplayState::NetworkInfo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_cycles_through_all_states() {
        let mut state = DisplayState::NetworkInfo;
        for expected in DisplayState::ALL.iter().cycle().skip(1).take(8) {
            state = state.next();
            assert_eq!(state, *expected);
        }
    }
}
