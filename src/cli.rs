/// CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

use crate::utils::{DEFAULT_INTERVAL_SECS, DEFAULT_LOG_NAME, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS};

// Build timestamp injected at compile time
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
pub const VERSION_WITH_BUILD: &str = concat!(env!("CARGO_PKG_VERSION"), " (built: ", env!("BUILD_TIMESTAMP"), ")");

const DESCRIPTION: &str = "\
Shows a live view of in/out throughput for a single interface, an interface
range or a list of interfaces.
Supported interface types:
 - Ethernet: e1/1 eth2/2-4 ...
 - Ethernet on Fex: e101/1/1-40 eth104/1/5-10 ...
 - Port-Channels: port-channel1, po2 ...

The view refreshes automatically (5 sec default refresh time).";

const EPILOG: &str = "\
Examples:
  intperf e1/1 e101/1/25-40 po1 po3
  intperf --logfile=mylog.csv eth102/1/15-40 po102

Keys:
  q  quit    r  redraw the screen

Hint:
  If the output seems corrupt with unnecessary new-lines, try
  `terminal length 0` before starting intperf.";

#[derive(Parser, Debug)]
#[command(name = "intperf")]
#[command(author, version = VERSION_WITH_BUILD, about = "Interface Performance Monitor", long_about = DESCRIPTION, after_help = EPILOG)]
pub struct Cli {
    /// Interface or interface list (comma separated lists are accepted)
    #[arg(required = true, value_name = "INTERFACE")]
    pub interfaces: Vec<String>,

    /// Refresh interval in seconds
    #[arg(
        short,
        long,
        value_name = "5-3600",
        default_value_t = DEFAULT_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS)
    )]
    pub interval: u64,

    /// Write every sample to a CSV file (default name: intperf.csv)
    #[arg(
        short,
        long,
        value_name = "LOGFILE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_LOG_NAME
    )]
    pub logfile: Option<PathBuf>,

    /// Show cumulative in/out error counters
    #[arg(short, long)]
    pub errors: bool,

    /// Use simulated counters instead of querying the device
    #[arg(long)]
    pub simulate: bool,

    /// Configuration file (default: ~/.config/intperf/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not write the diagnostic trace log
    #[arg(long)]
    pub no_trace: bool,
}

// Get version with timestamp
pub fn get_version() -> &'static str {
    VERSION_WITH_BUILD
}
