/*
 *  main.rs
 *
 *  plantmon-oled - plant monitor status display
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runner: drives the status display from the host main loop
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

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};

#[cfg(unix)] // Only compile this block on Unix-like systems
use tokio::signal::unix::{signal, SignalKind};

use plantmon_oled::config::{self, Cli, Config, NetworkMonitor};
use plantmon_oled::display::{MockSurface, PanelConfig, RenderingSurface, StatusDisplay};
use plantmon_oled::model::SensorReadings;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

type BoxedSurface = Box<dyn RenderingSurface>;

#[cfg(feature = "driver-ssd1306")]
fn hardware_surface(panel: &PanelConfig) -> anyhow::Result<BoxedSurface> {
    use plantmon_oled::display::Ssd1306Surface;
    let surface: BoxedSurface = Box::new(Ssd1306Surface::new(panel)?);
    Ok(surface)
}

#[cfg(not(feature = "driver-ssd1306"))]
fn hardware_surface(panel: &PanelConfig) -> anyhow::Result<BoxedSurface> {
    warn!("Built without a panel driver, rendering to an in-memory surface");
    let surface: BoxedSurface = Box::new(MockSurface::without_op_log(panel.width, panel.height));
    Ok(surface)
}

/// Waits for SIGINT, SIGTERM or SIGHUP.
#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

/// Latest readings from disk, or the previous snapshot if the file is unreadable
fn refresh_readings(path: Option<&Path>, last: &mut SensorReadings) {
    let Some(path) = path else { return };
    match config::read_readings(path) {
        Ok(readings) => *last = readings,
        Err(e) => debug!("Keeping previous readings, {}: {}", path.display(), e),
    }
}

async fn run(mut display: StatusDisplay<BoxedSurface>, cfg: &Config) -> anyhow::Result<()> {
    if !display.begin() {
        warn!("Continuing without a display");
    }

    let mut network = NetworkMonitor::new(
        cfg.network(),
        config::NETWORK_REFRESH_INTERVAL,
        config::detect_local_ip,
    );
    let readings_path = cfg.readings_path.as_deref();
    let mut readings = SensorReadings::default();

    let mut poll = tokio::time::interval(cfg.poll_interval());
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!("Entering main display loop");
    loop {
        tokio::select! {
            _ = poll.tick() => {
                refresh_readings(readings_path, &mut readings);
                display.tick(network.current(Instant::now()), &readings);
            }
            res = &mut shutdown => {
                res.context("failed to install signal handlers")?;
                break;
            }
        }
    }

    display.clear();
    info!("Display cleared, exiting");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("failed to load configuration")?;

    if cli.dump_config {
        println!("{}", config::dump(&cfg)?);
        return Ok(());
    }

    let level = cfg.log_level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let panel = cfg.panel();
    let surface: BoxedSurface = if cli.mock {
        info!("Mock mode - rendering to an in-memory surface");
        Box::new(MockSurface::without_op_log(panel.width, panel.height)) as BoxedSurface
    } else {
        hardware_surface(&panel)?
    };

    run(StatusDisplay::new(surface, panel), &cfg).await
}
