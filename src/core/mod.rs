pub mod config;
pub mod device;
pub mod error;
pub mod interfaces;
pub mod recorder;
pub mod sampler;
pub mod snapshot;

pub use config::{SamplingConfig, SessionConfig};
pub use device::{CommandSource, SimulatedSource};
pub use error::{MonitorError, TransportError};
pub use interfaces::{GroupKind, InterfaceGroups};
pub use recorder::SampleRecorder;
pub use sampler::{InterfaceMetrics, PollResult, ThroughputSampler};
pub use snapshot::{CounterSnapshot, LinkState, SnapshotSource};
