/// Counter snapshots and the device query seam
///
/// The device answers `show interface ...` commands with a JSON document whose
/// `TABLE_interface.ROW_interface` member is an object for a single interface
/// and a list for several. Everything above this module only sees an ordered
/// `Vec` of rows.

use serde_json::Value;
use std::fmt;

use crate::core::error::TransportError;

/// Something that can run a device command and hand back its structured output
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotSource {
    fn query(&mut self, command: &str) -> Result<Value, TransportError>;
}

/// Lightweight query used once per group to enumerate its interfaces
pub fn describe_command(spec: &str) -> String {
    format!("show interface {} description", spec)
}

/// Per-cycle query returning raw counters
pub fn counters_command(spec: &str) -> String {
    format!("show interface {}", spec)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Up,
    Down,
    Other(String),
}

impl From<&str> for LinkState {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "up" => LinkState::Up,
            "down" => LinkState::Down,
            _ => LinkState::Other(s.trim().to_string()),
        }
    }
}

impl LinkState {
    pub fn is_down(&self) -> bool {
        matches!(self, LinkState::Down)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Up => write!(f, "up"),
            LinkState::Down => write!(f, "down"),
            LinkState::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Raw counters for one interface at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct CounterSnapshot {
    pub interface: String,
    pub in_bytes: u64,
    pub out_bytes: u64,
    pub in_errors: u64,
    pub out_errors: u64,
    pub state: LinkState,
    pub description: String,
    pub speed_label: String,
}

impl CounterSnapshot {
    pub fn from_row(row: &Value) -> Result<Self, TransportError> {
        Ok(Self {
            interface: interface_name(row)?,
            in_bytes: counter_field(row, "eth_inbytes"),
            out_bytes: counter_field(row, "eth_outbytes"),
            in_errors: counter_field(row, "eth_inerr"),
            out_errors: counter_field(row, "eth_outerr"),
            state: LinkState::from(text_field(row, "state").as_str()),
            description: text_field(row, "desc"),
            speed_label: text_field(row, "eth_speed"),
        })
    }
}

/// Flatten the single-object or list shape of `ROW_interface` into one ordered list
pub fn normalize_rows(output: &Value) -> Result<Vec<&Value>, TransportError> {
    let rows = output
        .get("TABLE_interface")
        .and_then(|table| table.get("ROW_interface"))
        .ok_or_else(|| TransportError::Malformed("missing TABLE_interface.ROW_interface".to_string()))?;

    match rows {
        Value::Object(_) => Ok(vec![rows]),
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(TransportError::Malformed(format!(
            "ROW_interface is neither object nor list: {}",
            other
        ))),
    }
}

/// Interface names from a describe result, in device order
pub fn parse_interface_list(output: &Value) -> Result<Vec<String>, TransportError> {
    normalize_rows(output)?
        .into_iter()
        .map(interface_name)
        .collect()
}

/// Counter records from a counters result, in device order
pub fn parse_counters(output: &Value) -> Result<Vec<CounterSnapshot>, TransportError> {
    normalize_rows(output)?
        .into_iter()
        .map(CounterSnapshot::from_row)
        .collect()
}

fn interface_name(row: &Value) -> Result<String, TransportError> {
    row.get("interface")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TransportError::Malformed("row without interface name".to_string()))
}

// Counters arrive as numbers or as numeric strings depending on platform
fn counter_field(row: &Value, key: &str) -> u64 {
    match row.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

fn text_field(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
