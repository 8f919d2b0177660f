/*
 *  display/screens.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  The four rotating status screens
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

use arrayvec::ArrayString;
use core::fmt::{self, Write};

use crate::display::error::DisplayError;
use crate::display::traits::RenderingSurface;
use crate::model::{NetworkInfo, SensorReadings};

pub const SEPARATOR: &str = "---------------";

/// Vertical offset of the enlarged address on the IP screen
pub const LARGE_ADDRESS_Y: i32 = 30;

/// Below this soil moisture percentage a plant is dry
pub const DRY_BELOW: f32 = 30.0;

/// At or above this soil moisture percentage a plant is wet
pub const WET_FROM: f32 = 60.0;

/// Soil moisture category shown on the plant status screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoistureLevel {
    Dry,
    Good,
    Wet,
}

impl MoistureLevel {
    pub fn classify(percent: f32) -> Self {
        if percent < DRY_BELOW {
            MoistureLevel::Dry
        } else if percent < WET_FROM {
            MoistureLevel::Good
        } else {
            MoistureLevel::Wet
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoistureLevel::Dry => "DRY",
            MoistureLevel::Good => "GOOD",
            MoistureLevel::Wet => "WET",
        }
    }
}

impl fmt::Display for MoistureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Small stack-allocated label, e.g. "Plant 2: "
fn label(args: fmt::Arguments<'_>) -> ArrayString<24> {
    let mut buf = ArrayString::new();
    // longest label is well under capacity; overflow would only truncate
    let _ = buf.write_fmt(args);
    buf
}

fn home<S: RenderingSurface + ?Sized>(surface: &mut S) {
    surface.set_cursor(0, 0);
    surface.set_text_scale(1);
}

/// Network mode, SSID and address, plus how to reach the web UI
pub fn network_info<S: RenderingSurface + ?Sized>(
    surface: &mut S,
    network: &NetworkInfo,
) -> Result<(), DisplayError> {
    home(surface);

    if network.is_access_point_mode {
        surface.print_line("MODE: ACCESS POINT")?;
        surface.print("SSID: ")?;
        surface.print_line(&network.network_name)?;
        surface.print("IP: ")?;
        surface.print_line(&network.address)?;
        surface.print_line("Connect to setup WiFi")?;
    } else {
        surface.print_line("MODE: STATION")?;
        surface.print_line("Connected to:")?;
        surface.print_line(&network.network_name)?;
        surface.print("IP: ")?;
        surface.print_line(&network.address)?;
    }

    surface.print_line("")?;
    surface.print("Web: http://")?;
    surface.print_line(&network.address)
}

/// Temperature, humidity and up to three moisture percentages
pub fn sensor_data<S: RenderingSurface + ?Sized>(
    surface: &mut S,
    readings: &SensorReadings,
) -> Result<(), DisplayError> {
    home(surface);

    surface.print_line("ENVIRONMENT DATA")?;
    surface.print_line(SEPARATOR)?;

    surface.print("Temp: ")?;
    surface.print_value(readings.temperature, 1)?;
    surface.print_line(" C")?;

    surface.print("Hum:  ")?;
    surface.print_value(readings.humidity, 1)?;
    surface.print_line(" %")?;

    surface.print_line(SEPARATOR)?;
    surface.print_line("SOIL MOISTURE:")?;

    for (i, moisture) in readings.displayed_moisture().iter().enumerate() {
        surface.print(&label(format_args!("P{}: ", i + 1)))?;
        surface.print_value(*moisture, 0)?;
        surface.print_line(" %")?;
    }
    Ok(())
}

/// Per-plant DRY / GOOD / WET verdicts and the threshold legend
pub fn plant_status<S: RenderingSurface + ?Sized>(
    surface: &mut S,
    readings: &SensorReadings,
) -> Result<(), DisplayError> {
    home(surface);

    surface.print_line("PLANT STATUS")?;
    surface.print_line(SEPARATOR)?;

    for (i, moisture) in readings.displayed_moisture().iter().enumerate() {
        surface.print(&label(format_args!("Plant {}: ", i + 1)))?;
        surface.print_line(MoistureLevel::classify(*moisture).label())?;
    }

    surface.print_line(SEPARATOR)?;
    surface.print_line("STATUS GUIDE:")?;
    surface.print_line("DRY  < 30%")?;
    surface.print_line("GOOD 30-60%")?;
    surface.print_line("WET  > 60%")
}

/// Title plus the address in large type, readable from across a room
pub fn ip_only<S: RenderingSurface + ?Sized>(
    surface: &mut S,
    network: &NetworkInfo,
) -> Result<(), DisplayError> {
    home(surface);

    surface.print_line("PLANT MONITOR")?;
    surface.print_line("Ready")?;
    surface.print_line("")?;
    surface.print_line("IP Address:")?;

    surface.set_text_scale(2);
    surface.set_cursor(0, LARGE_ADDRESS_Y);
    surface.print_line(&network.address)
}
