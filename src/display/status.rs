/*
 *  display/status.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Status display presenter: bring-up, tick scheduling and teardown
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

use log::{debug, error, info, warn};

use crate::display::clock::{Clock, MonotonicClock};
use crate::display::error::DisplayError;
use crate::display::scheduler::{SchedulerConfig, ScreenScheduler};
use crate::display::screens;
use crate::display::traits::RenderingSurface;
use crate::display::DisplayState;
use crate::model::{NetworkInfo, SensorReadings};

/// Hardware and timing configuration handed to [`StatusDisplay`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    /// Linux I2C device the panel hangs off
    pub i2c_bus: String,
    pub sda_pin: u8,
    pub scl_pin: u8,
    /// None when the panel reset line is not wired
    pub reset_pin: Option<u8>,
    /// 7-bit controller address
    pub address: u8,
    pub width: u32,
    pub height: u32,
    pub timing: SchedulerConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            i2c_bus: "/dev/i2c-1".to_string(),
            sda_pin: 21,
            scl_pin: 22,
            reset_pin: None,
            address: 0x3C,
            width: 128,
            height: 64,
            timing: SchedulerConfig::default(),
        }
    }
}

/// Rotating status screens on a small monochrome panel
///
/// Construct once, call [`begin`](Self::begin) once, then call
/// [`tick`](Self::tick) from the main loop at any rate. If bring-up fails
/// the display goes permanently inert and every later call is a no-op.
pub struct StatusDisplay<S: RenderingSurface, C: Clock = MonotonicClock> {
    surface: S,
    clock: C,
    config: PanelConfig,
    scheduler: ScreenScheduler,
    available: bool,
    begun: bool,
}

impl<S: RenderingSurface> StatusDisplay<S, MonotonicClock> {
    pub fn new(surface: S, config: PanelConfig) -> Self {
        Self::with_clock(surface, config, MonotonicClock::new())
    }
}

impl<S: RenderingSurface, C: Clock> StatusDisplay<S, C> {
    pub fn with_clock(surface: S, config: PanelConfig, clock: C) -> Self {
        let scheduler = ScreenScheduler::new(config.timing, clock.now_ms());
        Self {
            surface,
            clock,
            config,
            scheduler,
            available: false,
            begun: false,
        }
    }

    /// Bring up the panel and show the startup banner
    ///
    /// Only the first call touches the hardware; later calls report the
    /// outcome of that first attempt.
    pub fn begin(&mut self) -> bool {
        if self.begun {
            return self.available;
        }
        self.begun = true;

        info!("Initializing OLED display...");
        match self.bring_up() {
            Ok(()) => {
                self.available = true;
                info!("OLED display initialized successfully");
                self.check_frame_rate();
            }
            Err(e) => {
                self.available = false;
                error!("SSD1306 bring-up failed: {}", e);
                warn!("Please check:");
                warn!("1. OLED wiring (SDA, SCL, VCC, GND)");
                warn!("2. I2C address (usually 0x3C, configured 0x{:02X})", self.config.address);
                warn!(
                    "3. I2C pins configuration (SDA {}, SCL {}, bus {})",
                    self.config.sda_pin, self.config.scl_pin, self.config.i2c_bus
                );
            }
        }
        self.available
    }

    fn check_frame_rate(&self) {
        let caps = self.surface.capabilities();
        let interval = self.config.timing.redraw_interval_ms.max(1);
        let requested_fps = 1000 / interval;
        debug!("Panel {}x{}, up to {} fps", caps.width, caps.height, caps.max_fps);
        if requested_fps > caps.max_fps {
            warn!(
                "Redraw interval {} ms asks for {} fps, panel manages {}",
                interval, requested_fps, caps.max_fps
            );
        }
    }

    fn bring_up(&mut self) -> Result<(), DisplayError> {
        self.surface.initialize_bus(self.config.sda_pin, self.config.scl_pin)?;
        if let Some(pin) = self.config.reset_pin {
            debug!("Reset pin {} configured", pin);
        }
        self.surface.bring_up_controller(self.config.address)?;

        self.surface.clear()?;
        self.surface.set_text_scale(1);
        self.surface.set_cursor(0, 0);
        self.surface.print_line("Plant Monitor")?;
        self.surface.print_line("Starting...")?;
        self.surface.flush()
    }

    /// Redraw the current screen if the redraw interval has passed
    ///
    /// Ticks arriving faster than the interval are dropped outright. The
    /// screen rotates only on ticks that redraw.
    pub fn tick(&mut self, network: &NetworkInfo, readings: &SensorReadings) {
        if !self.available {
            return;
        }
        let Some(state) = self.scheduler.poll(self.clock.now_ms()) else {
            return;
        };

        if let Err(e) = self.render(state, network, readings) {
            warn!("Failed to render {:?} screen: {}", state, e);
        }
    }

    fn render(
        &mut self,
        state: DisplayState,
        network: &NetworkInfo,
        readings: &SensorReadings,
    ) -> Result<(), DisplayError> {
        self.surface.clear()?;
        match state {
            DisplayState::NetworkInfo => screens::network_info(&mut self.surface, network)?,
            DisplayState::SensorData => screens::sensor_data(&mut self.surface, readings)?,
            DisplayState::PlantStatus => screens::plant_status(&mut self.surface, readings)?,
            DisplayState::IpOnly => screens::ip_only(&mut self.surface, network)?,
        }
        self.surface.flush()
    }

    /// Blank the panel, typically at shutdown
    pub fn clear(&mut self) {
        if !self.available {
            return;
        }
        let result = self.surface.clear().and_then(|()| self.surface.flush());
        if let Err(e) = result {
            warn!("Failed to clear display: {}", e);
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Screen shown by the most recent redraw (or the next one, before any)
    pub fn current_state(&self) -> DisplayState {
        self.scheduler.current_state()
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
