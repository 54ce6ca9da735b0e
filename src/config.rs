use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::mode::CLKPERIOD_MS;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "pacman", version, about = "Pac-Man in a VT100 terminal")]
pub struct Config {
    /// Milliseconds per game tick.
    #[arg(long, env = "PACMAN_TICK_MS", default_value_t = CLKPERIOD_MS as u64, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Never ring the terminal bell.
    #[arg(long, env = "PACMAN_SILENT")]
    pub silent: bool,

    /// Write tracing output to this file. Filter with RUST_LOG.
    #[arg(long, env = "PACMAN_LOG")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
