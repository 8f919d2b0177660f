/*
 *  display/scheduler.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Redraw rate limiting and timed screen rotation
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

use super::DisplayState;

pub const DEFAULT_REDRAW_INTERVAL_MS: u32 = 100;
pub const DEFAULT_DWELL_MS: u32 = 3_000;

/// Timing for the screen scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Minimum time between two redraws; faster ticks are dropped
    pub redraw_interval_ms: u32,

    /// How long each screen stays up before rotating to the next
    pub dwell_ms: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            redraw_interval_ms: DEFAULT_REDRAW_INTERVAL_MS,
            dwell_ms: DEFAULT_DWELL_MS,
        }
    }
}

/// Decides, per tick, whether to redraw and which screen to show
///
/// Rotation is only evaluated on ticks that pass the redraw limit, so
/// screen switches always land on a frame boundary.
#[derive(Debug, Clone)]
pub struct ScreenScheduler {
    config: SchedulerConfig,
    current: DisplayState,
    last_redraw: u32,
    last_state_change: u32,
}

impl ScreenScheduler {
    /// Start on the first screen with both timers at `now_ms`
    pub fn new(config: SchedulerConfig, now_ms: u32) -> Self {
        Self {
            config,
            current: DisplayState::NetworkInfo,
            last_redraw: now_ms,
            last_state_change: now_ms,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Get current screen
    pub fn current_state(&self) -> DisplayState {
        self.current
    }

    /// Returns the screen to draw, or None when this tick must be dropped
    ///
    /// A dropped tick leaves every timer and the current screen untouched.
    pub fn poll(&mut self, now_ms: u32) -> Option<DisplayState> {
        if now_ms.wrapping_sub(self.last_redraw) < self.config.redraw_interval_ms {
            return None;
        }
        self.last_redraw = now_ms;

        if now_ms.wrapping_sub(self.last_state_change) >= self.config.dwell_ms {
            let next = self.current.next();
            log::debug!("Display screen changed: {:?} -> {:?}", self.current, next);
            self.current = next;
            self.last_state_change = now_ms;
        }

        Some(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler_at(now: u32) -> ScreenScheduler {
        ScreenScheduler::new(SchedulerConfig::default(), now)
    }

    #[test]
    fn test_rate_limit_drops_fast_ticks() {
        let mut scheduler = scheduler_at(0);

        for now in [0, 1, 50, 99] {
            assert_eq!(scheduler.poll(now), None);
        }
        assert_eq!(scheduler.poll(100), Some(DisplayState::NetworkInfo));
        assert_eq!(scheduler.poll(199), None);
        assert_eq!(scheduler.poll(200), Some(DisplayState::NetworkInfo));
    }

    #[test]
    fn test_dropped_tick_does_not_rotate() {
        let mut scheduler = scheduler_at(0);
        assert_eq!(scheduler.poll(2_950), Some(DisplayState::NetworkInfo));

        // well past the dwell, but inside the redraw window
        assert_eq!(scheduler.poll(3_040), None);
        assert_eq!(scheduler.current_state(), DisplayState::NetworkInfo);

        assert_eq!(scheduler.poll(3_050), Some(DisplayState::SensorData));
    }

    #[test]
    fn test_rotation_at_dwell_boundary() {
        let mut scheduler = scheduler_at(0);
        assert_eq!(scheduler.poll(2_999), Some(DisplayState::NetworkInfo));
        assert_eq!(scheduler.poll(3_100), Some(DisplayState::SensorData));

        // the dwell restarts from the switch, not from the first screen
        assert_eq!(scheduler.poll(6_099), Some(DisplayState::SensorData));
        assert_eq!(scheduler.poll(6_199), Some(DisplayState::PlantStatus));
    }

    #[test]
    fn test_full_cycle_wraps() {
        let mut scheduler = scheduler_at(0);
        let mut seen = Vec::new();
        let mut now = 0;
        for _ in 0..5 {
            now += 3_000;
            seen.push(scheduler.poll(now).unwrap());
        }
        assert_eq!(
            seen,
            vec![
                DisplayState::SensorData,
                DisplayState::PlantStatus,
                DisplayState::IpOnly,
                DisplayState::NetworkInfo,
                DisplayState::SensorData,
            ]
        );
    }

    #[test]
    fn test_long_gap_advances_one_step_only() {
        let mut scheduler = scheduler_at(0);
        assert_eq!(scheduler.poll(60_000), Some(DisplayState::SensorData));
    }

    #[test]
    fn test_counter_wraparound() {
        let start = u32::MAX - 50;
        let mut scheduler = scheduler_at(start);

        assert_eq!(scheduler.poll(start.wrapping_add(40)), None);
        assert_eq!(scheduler.poll(start.wrapping_add(100)), Some(DisplayState::NetworkInfo));
        assert_eq!(scheduler.poll(start.wrapping_add(3_000)), Some(DisplayState::SensorData));
    }

    #[test]
    fn test_custom_timing() {
        let config = SchedulerConfig { redraw_interval_ms: 10, dwell_ms: 20 };
        let mut scheduler = ScreenScheduler::new(config, 0);
        assert_eq!(scheduler.poll(10), Some(DisplayState::NetworkInfo));
        assert_eq!(scheduler.poll(20), Some(DisplayState::SensorData));
        assert_eq!(scheduler.config().dwell_ms, 20);
    }
}
