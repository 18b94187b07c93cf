pub mod monitor;

// The monitor is a single screen: a header row, one row per interface in
// group order, and a footer with the refresh status.

pub use monitor::{DashboardView, MonitorScreen, Theme};
