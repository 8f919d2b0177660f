/*
 *  lib.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Library root
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

//! Rotating status screens for a plant monitor on a 128x64 monochrome OLED.
//!
//! [`display::StatusDisplay`] owns a [`display::RenderingSurface`] and cycles
//! network info, live sensor readings, per-plant status and a large IP
//! screen on a timer. Callers feed a [`model::NetworkInfo`] and
//! [`model::SensorReadings`] snapshot on every tick.

pub mod config;
pub mod display;
pub mod model;
pub mod vframebuf;

pub use display::{DisplayState, PanelConfig, StatusDisplay};
pub use model::{NetworkInfo, SensorReadings};
