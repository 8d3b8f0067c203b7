pub mod command;
pub mod report;
pub mod session;
pub mod threshold;

pub use command::{CommandStatus, ComponentKind};
pub use report::{parse_metric, RawReport, ReportKind, SensorRecord, SessionReport};
pub use session::{LossEvent, TrackOutcome};
pub use threshold::{Cause, Classification, Metric, Threshold};
