/// Concrete snapshot sources
///
/// `CommandSource` runs the device CLI through a configurable argv template and
/// decodes its JSON output. `SimulatedSource` fabricates counters so the
/// dashboard can run away from a switch.

use rand::Rng;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::process::Command;
use std::time::Instant;
use tracing::debug;

use crate::core::error::TransportError;
use crate::core::interfaces::expand_spec;
use crate::core::snapshot::SnapshotSource;

/// Placeholder in the argv template that receives the device command
pub const COMMAND_PLACEHOLDER: &str = "{cmd}";

pub struct CommandSource {
    template: Vec<String>,
}

impl CommandSource {
    pub fn new(template: Vec<String>) -> Result<Self, TransportError> {
        if template.is_empty() {
            return Err(TransportError::Malformed("empty command template".to_string()));
        }
        if !template.iter().any(|arg| arg.contains(COMMAND_PLACEHOLDER)) {
            return Err(TransportError::Malformed(format!(
                "command template has no {} placeholder",
                COMMAND_PLACEHOLDER
            )));
        }
        Ok(Self { template })
    }

    /// The argv that would be executed for `command`
    pub fn argv(&self, command: &str) -> Vec<String> {
        self.template
            .iter()
            .map(|arg| arg.replace(COMMAND_PLACEHOLDER, command))
            .collect()
    }
}

impl SnapshotSource for CommandSource {
    fn query(&mut self, command: &str) -> Result<Value, TransportError> {
        let argv = self.argv(command);
        let started = Instant::now();

        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .output()
            .map_err(|source| TransportError::Spawn {
                command: argv.join(" "),
                source,
            })?;

        debug!(command, elapsed_ms = started.elapsed().as_millis() as u64, "device query");

        if !output.status.success() {
            return Err(TransportError::CommandFailed {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Err(TransportError::Malformed(format!("`{}` returned no output", command)));
        }

        Ok(serde_json::from_str(&stdout)?)
    }
}

#[derive(Debug, Clone, Default)]
struct SimulatedCounters {
    in_bytes: u64,
    out_bytes: u64,
    in_errors: u64,
    out_errors: u64,
}

/// Fabricated device with steadily growing counters
#[derive(Default)]
pub struct SimulatedSource {
    counters: HashMap<String, SimulatedCounters>,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self::default()
    }

    // Every seventh interface is reported down and carries no traffic
    fn is_down(index: usize) -> bool {
        index % 7 == 6
    }

    fn rows(&mut self, spec: &str, with_counters: bool) -> Value {
        let mut rng = rand::thread_rng();
        let rows: Vec<Value> = expand_spec(spec)
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                let down = Self::is_down(index);
                let mut row = json!({
                    "interface": name,
                    "state": if down { "down" } else { "up" },
                    "desc": format!("simulated link {}", index + 1),
                    "eth_speed": if name.starts_with("port-channel") { "40 Gb/s" } else { "10 Gb/s" },
                });

                if with_counters {
                    let counters = self.counters.entry(name).or_default();
                    if !down {
                        counters.in_bytes += rng.gen_range(0..50_000_000);
                        counters.out_bytes += rng.gen_range(0..50_000_000);
                        if rng.gen_ratio(1, 20) {
                            counters.in_errors += 1;
                        }
                        if rng.gen_ratio(1, 50) {
                            counters.out_errors += 1;
                        }
                    }
                    row["eth_inbytes"] = json!(counters.in_bytes);
                    row["eth_outbytes"] = json!(counters.out_bytes);
                    row["eth_inerr"] = json!(counters.in_errors);
                    row["eth_outerr"] = json!(counters.out_errors);
                }
                row
            })
            .collect();

        json!({ "TABLE_interface": { "ROW_interface": rows } })
    }
}

impl SnapshotSource for SimulatedSource {
    fn query(&mut self, command: &str) -> Result<Value, TransportError> {
        let spec = command
            .strip_prefix("show interface ")
            .ok_or_else(|| TransportError::Malformed(format!("unsupported command: {}", command)))?;

        match spec.strip_suffix(" description") {
            Some(spec) => Ok(self.rows(spec, false)),
            None => Ok(self.rows(spec, true)),
        }
    }
}
