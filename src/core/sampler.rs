/// Throughput sampler
///
/// Keeps the previous counter values for every interface of one group and
/// turns each new snapshot into scaled bit rates.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::core::config::SamplingConfig;
use crate::core::error::MonitorError;
use crate::core::snapshot::{
    counters_command, describe_command, parse_counters, parse_interface_list, CounterSnapshot,
    LinkState, SnapshotSource,
};

/// Elapsed time reported for the first poll, which has no predecessor
pub const FIRST_POLL_DELTA: Duration = Duration::from_secs(1);

/// Derived state for one interface
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMetrics {
    pub interface: String,
    pub prev_in_bytes: u64,
    pub prev_out_bytes: u64,
    pub in_tput: f64,
    pub out_tput: f64,
    pub in_errors: u64,
    pub out_errors: u64,
    pub state: LinkState,
    pub description: String,
    pub speed_label: String,
}

impl InterfaceMetrics {
    /// Baseline entry for an interface seen for the first time
    fn seeded(snap: CounterSnapshot) -> Self {
        Self {
            interface: snap.interface,
            prev_in_bytes: snap.in_bytes,
            prev_out_bytes: snap.out_bytes,
            in_tput: 0.0,
            out_tput: 0.0,
            in_errors: snap.in_errors,
            out_errors: snap.out_errors,
            state: snap.state,
            description: snap.description,
            speed_label: snap.speed_label,
        }
    }

    fn advance(&mut self, snap: CounterSnapshot, delta_secs: f64, scale: f64) {
        if snap.in_bytes < self.prev_in_bytes || snap.out_bytes < self.prev_out_bytes {
            debug!(
                interface = %self.interface,
                prev_in = self.prev_in_bytes,
                curr_in = snap.in_bytes,
                prev_out = self.prev_out_bytes,
                curr_out = snap.out_bytes,
                "counter reset, rebaselining"
            );
        }

        self.in_tput = rate(self.prev_in_bytes, snap.in_bytes, delta_secs, scale);
        self.out_tput = rate(self.prev_out_bytes, snap.out_bytes, delta_secs, scale);
        self.prev_in_bytes = snap.in_bytes;
        self.prev_out_bytes = snap.out_bytes;
        self.in_errors = snap.in_errors;
        self.out_errors = snap.out_errors;
        self.state = snap.state;
        self.description = snap.description;
        self.speed_label = snap.speed_label;
    }
}

/// Scaled bit rate between two cumulative byte counters.
///
/// A counter that went backwards was reset or wrapped, so the new value is
/// taken as the traffic since a zero baseline.
pub fn rate(prev: u64, curr: u64, delta_secs: f64, scale: f64) -> f64 {
    if delta_secs <= 0.0 {
        return 0.0;
    }
    let delta = if curr >= prev { curr - prev } else { curr };
    delta as f64 * 8.0 / delta_secs / scale
}

/// Outcome of one successful poll
#[derive(Debug, Clone)]
pub struct PollResult {
    /// Metrics in display order
    pub metrics: Vec<InterfaceMetrics>,
    pub delta_t: Duration,
    pub exec_time: Duration,
}

pub struct ThroughputSampler {
    spec: String,
    interfaces: Vec<String>,
    metrics: HashMap<String, InterfaceMetrics>,
    last_poll: Option<Instant>,
    exec_time: Duration,
    scale: f64,
}

impl ThroughputSampler {
    /// Resolve `spec` into a concrete interface list with a describe query
    pub fn new(
        spec: &str,
        source: &mut dyn SnapshotSource,
        config: &SamplingConfig,
    ) -> Result<Self, MonitorError> {
        let invalid = |reason: String| MonitorError::InvalidGroup {
            spec: spec.to_string(),
            reason,
        };

        let output = source
            .query(&describe_command(spec))
            .map_err(|e| invalid(e.to_string()))?;
        let interfaces = parse_interface_list(&output).map_err(|e| invalid(e.to_string()))?;

        if interfaces.is_empty() {
            return Err(invalid("device returned no interfaces".to_string()));
        }

        info!(spec, count = interfaces.len(), "interface group resolved");

        Ok(Self {
            spec: spec.to_string(),
            interfaces,
            metrics: HashMap::new(),
            last_poll: None,
            exec_time: Duration::ZERO,
            scale: config.scale,
        })
    }

    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Interfaces in display order
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn metrics(&self, interface: &str) -> Option<&InterfaceMetrics> {
        self.metrics.get(interface)
    }

    /// Wall-clock time the last successful poll spent talking to the device
    pub fn exec_time(&self) -> Duration {
        self.exec_time
    }

    pub fn poll(&mut self, source: &mut dyn SnapshotSource) -> Result<PollResult, MonitorError> {
        self.poll_at(source, Instant::now())
    }

    /// Poll with an explicit sample timestamp. State is only touched on success.
    pub fn poll_at(
        &mut self,
        source: &mut dyn SnapshotSource,
        now: Instant,
    ) -> Result<PollResult, MonitorError> {
        let started = Instant::now();
        let first_run = self.last_poll.is_none();
        let delta_t = match self.last_poll {
            Some(prev) => now.saturating_duration_since(prev),
            None => FIRST_POLL_DELTA,
        };

        let snapshot_error = |source| MonitorError::Snapshot {
            spec: self.spec.clone(),
            source,
        };
        let output = source
            .query(&counters_command(&self.spec))
            .map_err(snapshot_error)?;
        let snapshots = parse_counters(&output).map_err(snapshot_error)?;

        let delta_secs = delta_t.as_secs_f64();
        for snap in snapshots {
            if !self.interfaces.contains(&snap.interface) {
                debug!(spec = %self.spec, interface = %snap.interface, "new interface in snapshot");
                self.interfaces.push(snap.interface.clone());
            }

            if !first_run {
                if let Some(entry) = self.metrics.get_mut(&snap.interface) {
                    entry.advance(snap, delta_secs, self.scale);
                    continue;
                }
            }
            self.metrics
                .insert(snap.interface.clone(), InterfaceMetrics::seeded(snap));
        }

        self.last_poll = Some(now);
        self.exec_time = started.elapsed();

        Ok(PollResult {
            metrics: self.ordered_metrics(),
            delta_t,
            exec_time: self.exec_time,
        })
    }

    fn ordered_metrics(&self) -> Vec<InterfaceMetrics> {
        self.interfaces
            .iter()
            .filter_map(|name| self.metrics.get(name).cloned())
            .collect()
    }
}
