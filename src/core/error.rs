/// Error taxonomy for the monitoring session
///
/// Counter resets are not represented here: they are absorbed by the rate
/// derivation in the sampler. Display overflow is handled by the renderer.

use std::path::PathBuf;
use thiserror::Error;

/// Failure talking to the device
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("device output is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected device output: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum MonitorError {
    /// The device could not resolve an interface group at startup
    #[error("interface set {spec} could not be resolved: {reason}")]
    InvalidGroup { spec: String, reason: String },

    /// A per-cycle counter query failed
    #[error("counter query for {spec} failed: {source}")]
    Snapshot {
        spec: String,
        #[source]
        source: TransportError,
    },

    #[error("cannot open log file {}: {source}", path.display())]
    LogDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown interface: {}", specs.join(","))]
    UnknownInterface { specs: Vec<String> },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MonitorError {
    /// The interface specification that caused the failure, if any
    pub fn failed_spec(&self) -> Option<&str> {
        match self {
            MonitorError::InvalidGroup { spec, .. } | MonitorError::Snapshot { spec, .. } => {
                Some(spec.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_group_message_names_spec() {
        let err = MonitorError::InvalidGroup {
            spec: "e1/99".to_string(),
            reason: "no interfaces returned".to_string(),
        };
        assert!(err.to_string().contains("interface set e1/99 could not be resolved"));
        assert_eq!(err.failed_spec(), Some("e1/99"));
    }

    #[test]
    fn test_unknown_interface_message() {
        let err = MonitorError::UnknownInterface {
            specs: vec!["x1".to_string(), "gig0/1".to_string()],
        };
        assert_eq!(err.to_string(), "Unknown interface: x1,gig0/1");
        assert_eq!(err.failed_spec(), None);
    }
}
