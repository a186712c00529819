//! Structured logging via `tracing`.
//!
//! Systems log through the `tracing` macros bevy re-exports. Verbosity is part
//! of [`SimulationConfig`](crate::config::SimulationConfig): a global level
//! plus per-system overrides keyed by module name under `dungeon_core`
//! (`combat`, `map`, `loot`, ...). Hosts without bevy's `LogPlugin` call
//! [`init_tracing`] once; `RUST_LOG` still wins over the config.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Once;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const CRATE_TARGET: &str = "dungeon_core";

/// Installs the subscriber for apps built on `MinimalPlugins`
#[derive(Default)]
pub struct LoggingPlugin {
    pub config: LogConfig,
}

impl Plugin for LoggingPlugin {
    fn build(&self, _app: &mut App) {
        init_tracing(&self.config);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// `EnvFilter` directive spelling
    pub fn directive(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Logging section of the simulation config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Overrides per simulation system, e.g. `"combat" -> Debug`
    pub systems: BTreeMap<String, LogLevel>,
    pub timestamps: bool,
    pub targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            systems: BTreeMap::from([("combat".to_string(), LogLevel::Debug)]),
            timestamps: true,
            targets: true,
        }
    }
}

impl LogConfig {
    /// Quiet everywhere except the named systems
    pub fn only(systems: &[(&str, LogLevel)]) -> Self {
        Self {
            level: LogLevel::Warn,
            systems: systems.iter().map(|(s, l)| (s.to_string(), *l)).collect(),
            ..Default::default()
        }
    }

    /// Filter string understood by `EnvFilter`. Systems are listed in name
    /// order so equal configs give equal filters.
    pub fn filter_directives(&self) -> String {
        std::iter::once(self.level.directive().to_string())
            .chain(
                self.systems
                    .iter()
                    .map(|(system, level)| format!("{CRATE_TARGET}::{system}={}", level.directive())),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. First call wins.
pub fn init_tracing(config: &LogConfig) {
    let config = config.clone();
    TRACING_INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.targets)
            .compact();

        // bevy's LogPlugin may have installed one already
        let _ = if config.timestamps {
            builder.try_init()
        } else {
            builder.without_time().try_init()
        };
    });
}

/// Span over a whole run; logs the wall time and tick count when dropped
pub struct RunTimer {
    started: Instant,
    ticks: u64,
    _span: tracing::span::EnteredSpan,
}

impl RunTimer {
    pub fn start(label: &'static str) -> Self {
        Self {
            started: Instant::now(),
            ticks: 0,
            _span: info_span!("run", label).entered(),
        }
    }

    pub fn record_tick(&mut self) {
        self.ticks += 1;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Drop for RunTimer {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        let per_tick_us = if self.ticks > 0 {
            elapsed.as_micros() as u64 / self.ticks
        } else {
            0
        };
        info!(ticks = self.ticks, elapsed_ms = elapsed.as_millis() as u64, per_tick_us, "run finished");
    }
}
