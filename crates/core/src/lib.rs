pub mod config;
pub mod error;
pub mod reporter;
pub mod types;

pub use config::{AppConfig, ConfigOverrides, Credentials};
pub use error::{BackendError, ConfigError, RunError};
pub use reporter::{MemoryReporter, ReportEvent, Reporter, TracingReporter};
pub use types::*;
