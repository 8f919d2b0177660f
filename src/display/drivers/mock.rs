/*
 *  display/drivers/mock.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Recording rendering surface for tests and dry runs
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

use std::sync::{Arc, Mutex, MutexGuard};

use crate::display::canvas::TextCanvas;
use crate::display::error::DisplayError;
use crate::display::traits::{format_value, DisplayCapabilities, RenderingSurface};

/// One call made against the surface, in order
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    InitializeBus { sda_pin: u8, scl_pin: u8 },
    BringUpController(u8),
    Clear,
    SetCursor(i32, i32),
    SetTextScale(u8),
    Print(String),
    PrintLine(String),
    PrintValue(f32, usize),
    Flush,
}

/// Internal state for the mock surface (shared for inspection in tests)
#[derive(Debug)]
pub struct MockSurfaceState {
    /// Every operation issued, oldest first
    pub ops: Vec<SurfaceOp>,

    /// Text lines of the frame being composed since the last clear
    pub lines: Vec<String>,

    /// Lines of the most recently flushed frame
    pub flushed_lines: Vec<String>,

    /// Number of times flush() was called
    pub flush_count: usize,

    /// Number of times clear() was called
    pub clear_count: usize,

    /// Pixel rendering of the current frame
    pub canvas: TextCanvas,

    /// Simulate failures (for error testing)
    pub simulate_init_failure: bool,
    pub simulate_flush_failure: bool,

    /// When false, `ops` stays empty (long-running dry runs)
    pub record_ops: bool,

    line_open: bool,
}

impl MockSurfaceState {
    fn new(width: u32, height: u32) -> Self {
        Self {
            ops: Vec::new(),
            lines: Vec::new(),
            flushed_lines: Vec::new(),
            flush_count: 0,
            clear_count: 0,
            canvas: TextCanvas::new(width, height),
            simulate_init_failure: false,
            simulate_flush_failure: false,
            record_ops: true,
            line_open: false,
        }
    }

    fn record(&mut self, op: SurfaceOp) {
        if self.record_ops {
            self.ops.push(op);
        }
    }

    fn append(&mut self, text: &str) {
        if self.line_open {
            if let Some(last) = self.lines.last_mut() {
                last.push_str(text);
                return;
            }
        }
        self.lines.push(text.to_string());
        self.line_open = true;
    }

    fn end_line(&mut self) {
        if !self.line_open {
            self.lines.push(String::new());
        }
        self.line_open = false;
    }
}

/// Mock rendering surface
///
/// Records all operations and keeps a text transcript of the frame so
/// tests can assert on what a screen would show, without hardware. The
/// state handle is shared, so it stays readable after the surface has
/// been moved into a [`StatusDisplay`](crate::display::StatusDisplay).
#[derive(Debug, Clone)]
pub struct MockSurface {
    capabilities: DisplayCapabilities,
    state: Arc<Mutex<MockSurfaceState>>,
}

impl MockSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            capabilities: DisplayCapabilities { width, height, max_fps: 60 },
            state: Arc::new(Mutex::new(MockSurfaceState::new(width, height))),
        }
    }

    /// A surface whose controller bring-up always fails
    pub fn failing(width: u32, height: u32) -> Self {
        let surface = Self::new(width, height);
        surface.lock().simulate_init_failure = true;
        surface
    }

    /// A surface that keeps the transcript and pixels but no operation log
    pub fn without_op_log(width: u32, height: u32) -> Self {
        let surface = Self::new(width, height);
        surface.lock().record_ops = false;
        surface
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockSurfaceState>> {
        Arc::clone(&self.state)
    }

    /// Number of operations recorded so far
    pub fn op_count(&self) -> usize {
        self.lock().ops.len()
    }

    /// Text lines of the current frame
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    /// Text lines of the last frame pushed to the "panel"
    pub fn flushed_lines(&self) -> Vec<String> {
        self.lock().flushed_lines.clone()
    }

    pub fn flush_count(&self) -> usize {
        self.lock().flush_count
    }

    /// Forget recorded operations and counters, keep failure switches
    pub fn reset_ops(&self) {
        let mut state = self.lock();
        state.ops.clear();
        state.flush_count = 0;
        state.clear_count = 0;
    }

    fn lock(&self) -> MutexGuard<'_, MockSurfaceState> {
        // a panicking test may poison the lock; the recorded data is still usable
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RenderingSurface for MockSurface {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn initialize_bus(&mut self, sda_pin: u8, scl_pin: u8) -> Result<(), DisplayError> {
        self.lock().record(SurfaceOp::InitializeBus { sda_pin, scl_pin });
        Ok(())
    }

    fn bring_up_controller(&mut self, address: u8) -> Result<(), DisplayError> {
        let mut state = self.lock();
        state.record(SurfaceOp::BringUpController(address));
        if state.simulate_init_failure {
            return Err(DisplayError::InitializationFailed(format!(
                "simulated: no response at 0x{:02X}",
                address
            )));
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();
        state.record(SurfaceOp::Clear);
        state.clear_count += 1;
        state.lines.clear();
        state.line_open = false;
        state.canvas.clear();
        Ok(())
    }

    fn set_cursor(&mut self, x: i32, y: i32) {
        let mut state = self.lock();
        state.record(SurfaceOp::SetCursor(x, y));
        state.line_open = false;
        state.canvas.set_cursor(x, y);
    }

    fn set_text_scale(&mut self, scale: u8) {
        let mut state = self.lock();
        state.record(SurfaceOp::SetTextScale(scale));
        state.canvas.set_scale(scale);
    }

    fn print(&mut self, text: &str) -> Result<(), DisplayError> {
        let mut state = self.lock();
        state.record(SurfaceOp::Print(text.to_string()));
        state.append(text);
        state.canvas.print(text);
        Ok(())
    }

    fn print_line(&mut self, text: &str) -> Result<(), DisplayError> {
        let mut state = self.lock();
        state.record(SurfaceOp::PrintLine(text.to_string()));
        if !text.is_empty() {
            state.append(text);
        }
        state.end_line();
        state.canvas.print_line(text);
        Ok(())
    }

    fn print_value(&mut self, value: f32, decimals: usize) -> Result<(), DisplayError> {
        let text = format_value(value, decimals);
        let mut state = self.lock();
        state.record(SurfaceOp::PrintValue(value, decimals));
        state.append(&text);
        state.canvas.print(&text);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();
        state.record(SurfaceOp::Flush);
        if state.simulate_flush_failure {
            return Err(DisplayError::I2cError("simulated flush failure".to_string()));
        }
        state.flush_count += 1;
        state.flushed_lines = state.lines.clone();
        log::trace!("mock frame: {}", state.flushed_lines.join(" | "));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::BinaryColor;

    #[test]
    fn test_transcript_joins_print_fragments() {
        let mut surface = MockSurface::new(128, 64);
        surface.print("Temp: ").unwrap();
        surface.print_value(23.456, 1).unwrap();
        surface.print_line(" C").unwrap();
        surface.print_line("").unwrap();
        surface.print_line("next").unwrap();

        assert_eq!(surface.lines(), vec!["Temp: 23.5 C", "", "next"]);
    }

    #[test]
    fn test_set_cursor_starts_new_line() {
        let mut surface = MockSurface::new(128, 64);
        surface.print("IP Address:").unwrap();
        surface.set_cursor(0, 30);
        surface.print_line("192.168.4.1").unwrap();

        assert_eq!(surface.lines(), vec!["IP Address:", "192.168.4.1"]);
    }

    #[test]
    fn test_clear_resets_frame() {
        let mut surface = MockSurface::new(128, 64);
        surface.print_line("hello").unwrap();
        assert!(surface.state().lock().unwrap().canvas.frame().count(BinaryColor::On) > 0);

        surface.clear().unwrap();
        assert!(surface.lines().is_empty());
        assert_eq!(surface.state().lock().unwrap().canvas.frame().count(BinaryColor::On), 0);
        assert_eq!(surface.state().lock().unwrap().clear_count, 1);
    }

    #[test]
    fn test_flush_snapshots_lines() {
        let mut surface = MockSurface::new(128, 64);
        surface.print_line("frame one").unwrap();
        surface.flush().unwrap();
        surface.clear().unwrap();

        assert_eq!(surface.flushed_lines(), vec!["frame one"]);
        assert_eq!(surface.flush_count(), 1);
    }

    #[test]
    fn test_simulated_failures() {
        let mut surface = MockSurface::failing(128, 64);
        assert!(surface.bring_up_controller(0x3C).is_err());

        surface.state().lock().unwrap().simulate_flush_failure = true;
        assert!(surface.flush().is_err());
        assert_eq!(surface.flush_count(), 0);

        surface.state().lock().unwrap().simulate_flush_failure = false;
        assert!(surface.flush().is_ok());
    }

    #[test]
    fn test_ops_are_recorded_in_order() {
        let mut surface = MockSurface::new(128, 64);
        surface.initialize_bus(21, 22).unwrap();
        surface.bring_up_controller(0x3C).unwrap();
        surface.set_text_scale(2);

        assert_eq!(
            surface.state().lock().unwrap().ops,
            vec![
                SurfaceOp::InitializeBus { sda_pin: 21, scl_pin: 22 },
                SurfaceOp::BringUpController(0x3C),
                SurfaceOp::SetTextScale(2),
            ]
        );

        surface.reset_ops();
        assert_eq!(surface.op_count(), 0);
    }

    #[test]
    fn test_without_op_log_still_tracks_frames() {
        let mut surface = MockSurface::without_op_log(128, 64);
        surface.print_line("Ready").unwrap();
        surface.flush().unwrap();

        assert_eq!(surface.op_count(), 0);
        assert_eq!(surface.flushed_lines(), vec!["Ready"]);
    }
}
