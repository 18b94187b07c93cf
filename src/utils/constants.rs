/// Defaults and fixed limits for the monitor

/// Accepted refresh interval range, in seconds
pub const MIN_INTERVAL_SECS: u64 = 5;
pub const MAX_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Rates are shown in Mbps unless configured otherwise
pub const DEFAULT_SCALE: f64 = 1_000_000.0;
pub const DEFAULT_UNIT_LABEL: &str = "Mbps";

/// Growth of the refresh interval after a cycle overruns it
pub const DEFAULT_INTERVAL_INCREMENT_SECS: f64 = 2.0;

/// Wait phase granularity; bounds key-press latency
pub const DEFAULT_WAIT_SLICE_MS: u64 = 200;

/// Log file name used when `--logfile` is given without a value
pub const DEFAULT_LOG_NAME: &str = "intperf.csv";

/// Argv used to run device commands; `{cmd}` receives the command
pub const DEFAULT_COMMAND_TEMPLATE: &[&str] = &["vsh", "-c", "{cmd} | json"];

/// Column widths of the interface table
pub const NAME_WIDTH: usize = 11;
pub const SPEED_WIDTH: usize = 10;
pub const STATE_WIDTH: usize = 4;
pub const DESCRIPTION_WIDTH: usize = 20;
pub const RATE_WIDTH: usize = 10;
pub const ERROR_WIDTH: usize = 12;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_defaults_in_range() {
        assert!((MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&DEFAULT_INTERVAL_SECS));
    }

    #[test]
    fn test_command_template_has_placeholder() {
        assert!(DEFAULT_COMMAND_TEMPLATE.iter().any(|arg| arg.contains("{cmd}")));
    }
}
