/*
 *  config.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, YAML file, command line
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::{Duration, Instant}};
use thiserror::Error;

use crate::display::scheduler::SchedulerConfig;
use crate::display::status::PanelConfig;
use crate::model::{NetworkInfo, SensorReadings};

const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub log_level: Option<String>,       // e.g., "info" | "debug"
    pub poll_interval_ms: Option<u64>,   // main loop tick period
    pub readings_path: Option<PathBuf>,  // JSON sensor snapshot, re-read every tick
    pub display: Option<DisplayConfig>,
    pub network: Option<NetworkConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayConfig {
    pub i2c_bus: Option<String>,      // e.g. "/dev/i2c-1"
    pub sda_pin: Option<u8>,
    pub scl_pin: Option<u8>,
    pub reset_pin: Option<u8>,        // absent = not wired
    pub address: Option<u8>,          // 7-bit, e.g. 0x3C
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub redraw_interval_ms: Option<u32>,
    pub dwell_ms: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NetworkConfig {
    pub ssid: Option<String>,
    pub access_point: Option<bool>,
    pub address: Option<String>,      // absent = detect primary local IP
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "plantmon-oled", about = "Plant monitor OLED status display")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,
    /// JSON file holding the latest sensor readings
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub readings: Option<PathBuf>,
    #[arg(long)]
    pub i2c_bus: Option<String>,
    /// Controller address, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_address)]
    pub address: Option<u8>,
    #[arg(long)]
    pub dwell_ms: Option<u32>,
    #[arg(long)]
    pub ssid: Option<String>,
    #[arg(long, action = ArgAction::Set)]
    pub access_point: Option<bool>,
    #[arg(long)]
    pub ip: Option<String>,
    /// render to an in-memory surface instead of the panel
    #[arg(long, action = ArgAction::SetTrue)]
    pub mock: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid I2C address '{}': {}", s, e))
}

/// Merge defaults, YAML and CLI, then validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Pretty YAML of the effective config
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/plantmon/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/plantmon.yaml");
        if p.exists() { return Some(p) }
    }
    for candidate in &["plantmon.yaml", "config/plantmon.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

pub fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Read a JSON sensor snapshot written by the acquisition side
pub fn read_readings(path: &Path) -> Result<SensorReadings, ConfigError> {
    let s = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&s)?)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()        { dst.log_level = src.log_level; }
    if src.poll_interval_ms.is_some() { dst.poll_interval_ms = src.poll_interval_ms; }
    if src.readings_path.is_some()    { dst.readings_path = src.readings_path; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.network, src.network) {
        (None, Some(c)) => dst.network = Some(c),
        (Some(d), Some(s)) => merge_network(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.i2c_bus.is_some()            { dst.i2c_bus = src.i2c_bus; }
    if src.sda_pin.is_some()            { dst.sda_pin = src.sda_pin; }
    if src.scl_pin.is_some()            { dst.scl_pin = src.scl_pin; }
    if src.reset_pin.is_some()          { dst.reset_pin = src.reset_pin; }
    if src.address.is_some()            { dst.address = src.address; }
    if src.width.is_some()              { dst.width = src.width; }
    if src.height.is_some()             { dst.height = src.height; }
    if src.redraw_interval_ms.is_some() { dst.redraw_interval_ms = src.redraw_interval_ms; }
    if src.dwell_ms.is_some()           { dst.dwell_ms = src.dwell_ms; }
}

fn merge_network(dst: &mut NetworkConfig, src: NetworkConfig) {
    if src.ssid.is_some()         { dst.ssid = src.ssid; }
    if src.access_point.is_some() { dst.access_point = src.access_point; }
    if src.address.is_some()      { dst.address = src.address; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()        { cfg.log_level = cli.log_level.clone(); }
    if cli.poll_interval_ms.is_some() { cfg.poll_interval_ms = cli.poll_interval_ms; }
    if cli.readings.is_some()         { cfg.readings_path = cli.readings.clone(); }

    if cli.i2c_bus.is_some() || cli.address.is_some() || cli.dwell_ms.is_some() {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        if cli.i2c_bus.is_some()  { display.i2c_bus = cli.i2c_bus.clone(); }
        if cli.address.is_some()  { display.address = cli.address; }
        if cli.dwell_ms.is_some() { display.dwell_ms = cli.dwell_ms; }
    }

    if cli.ssid.is_some() || cli.access_point.is_some() || cli.ip.is_some() {
        let network = cfg.network.get_or_insert_with(NetworkConfig::default);
        if cli.ssid.is_some()         { network.ssid = cli.ssid.clone(); }
        if cli.access_point.is_some() { network.access_point = cli.access_point; }
        if cli.ip.is_some()           { network.address = cli.ip.clone(); }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.poll_interval_ms == Some(0) {
        return Err(ConfigError::Validation("poll_interval_ms must be > 0".into()));
    }
    if let Some(display) = cfg.display.as_ref() {
        if display.width == Some(0) || display.height == Some(0) {
            return Err(ConfigError::Validation("display width/height must be > 0".into()));
        }
        if display.redraw_interval_ms == Some(0) || display.dwell_ms == Some(0) {
            return Err(ConfigError::Validation(
                "display redraw_interval_ms/dwell_ms must be > 0".into(),
            ));
        }
        if let Some(addr) = display.address {
            if !(0x03..=0x77).contains(&addr) {
                return Err(ConfigError::Validation(format!(
                    "display address 0x{:02X} is outside the 7-bit range 0x03..=0x77",
                    addr
                )));
            }
        }
    }
    Ok(())
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }

    pub fn panel(&self) -> PanelConfig {
        self.display.as_ref().map(DisplayConfig::panel).unwrap_or_default()
    }

    pub fn network(&self) -> NetworkConfig {
        self.network.clone().unwrap_or_default()
    }
}

impl DisplayConfig {
    /// Resolve to a concrete panel description, filling gaps with defaults
    pub fn panel(&self) -> PanelConfig {
        let defaults = PanelConfig::default();
        PanelConfig {
            i2c_bus: self.i2c_bus.clone().unwrap_or(defaults.i2c_bus),
            sda_pin: self.sda_pin.unwrap_or(defaults.sda_pin),
            scl_pin: self.scl_pin.unwrap_or(defaults.scl_pin),
            reset_pin: self.reset_pin.or(defaults.reset_pin),
            address: self.address.unwrap_or(defaults.address),
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            timing: SchedulerConfig {
                redraw_interval_ms: self
                    .redraw_interval_ms
                    .unwrap_or(defaults.timing.redraw_interval_ms),
                dwell_ms: self.dwell_ms.unwrap_or(defaults.timing.dwell_ms),
            },
        }
    }
}

impl NetworkConfig {
    /// Network snapshot, asking `detect_ip` only when no address is configured
    pub fn snapshot_with<F>(&self, detect_ip: F) -> NetworkInfo
    where
        F: FnOnce() -> Option<String>,
    {
        let address = self
            .address
            .clone()
            .or_else(detect_ip)
            .unwrap_or_else(|| "0.0.0.0".to_string());
        NetworkInfo {
            network_name: self.ssid.clone().unwrap_or_default(),
            address,
            is_access_point_mode: self.access_point.unwrap_or(false),
        }
    }

}

/// How long a detected address is trusted before asking the host again
pub const NETWORK_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Host's primary local IP, if it has one
pub fn detect_local_ip() -> Option<String> {
    local_ip_address::local_ip().ok().map(|ip| ip.to_string())
}

/// Cached network snapshot for the main loop
///
/// Address detection walks the host's interfaces, so it runs at most once
/// per refresh interval rather than on every poll.
pub struct NetworkMonitor<F> {
    config: NetworkConfig,
    detect: F,
    refresh_every: Duration,
    current: NetworkInfo,
    refreshed_at: Option<Instant>,
}

impl<F: FnMut() -> Option<String>> NetworkMonitor<F> {
    pub fn new(config: NetworkConfig, refresh_every: Duration, detect: F) -> Self {
        Self {
            config,
            detect,
            refresh_every,
            current: NetworkInfo::default(),
            refreshed_at: None,
        }
    }

    /// Snapshot as of `now`, re-detecting only once the cache has aged out
    pub fn current(&mut self, now: Instant) -> &NetworkInfo {
        let stale = self
            .refreshed_at
            .is_none_or(|at| now.saturating_duration_since(at) >= self.refresh_every);
        if stale {
            let info = self.config.snapshot_with(&mut self.detect);
            if info != self.current {
                log::info!("Network: {} ({})", info.address, info.network_name);
            }
            self.current = info;
            self.refreshed_at = Some(now);
        }
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_resolve_to_standard_panel() {
        let cfg = Config::default();
        let panel = cfg.panel();
        assert_eq!(panel, PanelConfig::default());
        assert_eq!(panel.address, 0x3C);
        assert_eq!((panel.sda_pin, panel.scl_pin), (21, 22));
        assert_eq!(panel.reset_pin, None);
        assert_eq!(panel.timing.dwell_ms, 3_000);
        assert_eq!(cfg.poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_yaml_then_cli_precedence() {
        let file = write_temp(
            "log_level: debug\n\
             display:\n  i2c_bus: /dev/i2c-3\n  address: 61\n  dwell_ms: 5000\n\
             network:\n  ssid: PlantNet\n  access_point: true\n",
        );
        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            address: Some(0x3C),
            ssid: Some("HomeWiFi".into()),
            ..Cli::default()
        };

        let cfg = load(&cli).unwrap();
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));

        let panel = cfg.panel();
        assert_eq!(panel.i2c_bus, "/dev/i2c-3");
        assert_eq!(panel.address, 0x3C);
        assert_eq!(panel.timing.dwell_ms, 5_000);
        assert_eq!(panel.timing.redraw_interval_ms, 100);

        let network = cfg.network();
        assert_eq!(network.ssid.as_deref(), Some("HomeWiFi"));
        assert_eq!(network.access_point, Some(true));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/plantmon.yaml")),
            ..Cli::default()
        };
        assert!(matches!(load(&cli), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.display = Some(DisplayConfig { address: Some(0x80), ..Default::default() });
        assert!(validate(&cfg).is_err());

        cfg.display = Some(DisplayConfig { dwell_ms: Some(0), ..Default::default() });
        assert!(validate(&cfg).is_err());

        cfg.display = Some(DisplayConfig { width: Some(0), ..Default::default() });
        assert!(validate(&cfg).is_err());

        cfg.display = None;
        cfg.poll_interval_ms = Some(0);
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_parse_address_forms() {
        assert_eq!(parse_address("0x3C"), Ok(0x3C));
        assert_eq!(parse_address("0X3d"), Ok(0x3D));
        assert_eq!(parse_address("60"), Ok(60));
        assert!(parse_address("0xZZ").is_err());
    }

    #[test]
    fn test_network_snapshot_fallbacks() {
        let configured = NetworkConfig {
            ssid: Some("PlantNet".into()),
            access_point: Some(true),
            address: Some("192.168.4.1".into()),
        };
        let info = configured.snapshot_with(|| panic!("detection not needed"));
        assert_eq!(info, NetworkInfo::access_point("PlantNet", "192.168.4.1"));

        let detected = NetworkConfig::default().snapshot_with(|| Some("10.0.0.7".into()));
        assert_eq!(detected.address, "10.0.0.7");
        assert!(!detected.is_access_point_mode);

        let unknown = NetworkConfig::default().snapshot_with(|| None);
        assert_eq!(unknown.address, "0.0.0.0");
    }

    #[test]
    fn test_network_monitor_caches_detection() {
        let mut calls = 0;
        let mut monitor = NetworkMonitor::new(
            NetworkConfig::default(),
            Duration::from_secs(30),
            || {
                calls += 1;
                Some(format!("10.0.0.{}", calls))
            },
        );

        let start = Instant::now();
        assert_eq!(monitor.current(start).address, "10.0.0.1");
        for ms in [50, 100, 5_000, 29_999] {
            assert_eq!(monitor.current(start + Duration::from_millis(ms)).address, "10.0.0.1");
        }
        assert_eq!(monitor.current(start + Duration::from_secs(30)).address, "10.0.0.2");
        drop(monitor);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_network_monitor_skips_detection_with_fixed_address() {
        let config = NetworkConfig {
            ssid: Some("HomeWiFi".into()),
            access_point: None,
            address: Some("192.168.1.20".into()),
        };
        let mut monitor =
            NetworkMonitor::new(config, Duration::ZERO, || panic!("detection not needed"));

        let now = Instant::now();
        assert_eq!(monitor.current(now), &NetworkInfo::station("HomeWiFi", "192.168.1.20"));
        assert_eq!(monitor.current(now).address, "192.168.1.20");
    }

    #[test]
    fn test_read_readings_file() {
        let file = write_temp(r#"{"temperature": 19.0, "humidity": 61.5, "soil_moisture": [33.0]}"#);
        let readings = read_readings(file.path()).unwrap();
        assert_eq!(readings.humidity, 61.5);
        assert_eq!(readings.displayed_moisture(), &[33.0]);

        let bad = write_temp("not json");
        assert!(matches!(read_readings(bad.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_dump_round_trips_through_yaml() {
        let cfg = Config {
            log_level: Some("info".into()),
            ..Config::default()
        };
        let text = dump(&cfg).unwrap();
        assert!(text.contains("log_level: info"));
    }
}
