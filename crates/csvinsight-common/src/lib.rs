pub mod types;

pub use types::{HealthStatus, InsightOutcome, Report, DEFAULT_FILENAME};
