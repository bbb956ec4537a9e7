pub mod types;

pub use types::{ChartError, ConfigError, DatasetError, ExportError, PipelineError, StorageError};
