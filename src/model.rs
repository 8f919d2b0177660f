/*
 *  model.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Per-tick network and sensor snapshots
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

use serde::{Deserialize, Serialize};

/// Most soil moisture channels a screen will ever show
pub const MAX_DISPLAYED_SENSORS: usize = 3;

/// Network state at the time of a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NetworkInfo {
    /// SSID joined (station) or hosted (access point)
    pub network_name: String,
    /// Device IP address as shown to the user
    pub address: String,
    /// True while the device hosts its own setup network
    pub is_access_point_mode: bool,
}

impl NetworkInfo {
    pub fn station(network_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            network_name: network_name.into(),
            address: address.into(),
            is_access_point_mode: false,
        }
    }

    pub fn access_point(network_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            network_name: network_name.into(),
            address: address.into(),
            is_access_point_mode: true,
        }
    }
}

/// Environment and soil readings at the time of a tick
///
/// `soil_moisture` is on a 0-100 scale. `sensor_count` is the number of
/// channels the caller considers valid and may be lower than the
/// sequence length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SensorReadings {
    pub temperature: f32,
    pub humidity: f32,
    #[serde(default)]
    pub soil_moisture: Vec<f32>,
    #[serde(default)]
    pub sensor_count: Option<usize>,
}

impl SensorReadings {
    /// Readings where every moisture entry is a valid channel
    pub fn new(temperature: f32, humidity: f32, soil_moisture: Vec<f32>) -> Self {
        let count = soil_moisture.len();
        Self {
            temperature,
            humidity,
            soil_moisture,
            sensor_count: Some(count),
        }
    }

    pub fn with_sensor_count(mut self, sensor_count: usize) -> Self {
        self.sensor_count = Some(sensor_count);
        self
    }

    /// Valid channel count; the sequence length when not given
    pub fn sensor_count(&self) -> usize {
        self.sensor_count.unwrap_or(self.soil_moisture.len())
    }

    /// The moisture values a screen may show, capped at three
    pub fn displayed_moisture(&self) -> &[f32] {
        let n = self
            .sensor_count()
            .min(self.soil_moisture.len())
            .min(MAX_DISPLAYED_SENSORS);
        &self.soil_moisture[..n]
    }
}
