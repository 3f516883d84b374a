pub mod lag;
pub mod marker;
pub mod status;

pub use lag::{classify_lag, LagThresholds, Severity};
pub use marker::{ProbeMarker, TableName};
pub use status::{
    normalize, NamingScheme, RawStatusRow, ReplicationStatus, StatusField, ThreadState,
};
