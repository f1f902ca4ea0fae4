pub mod progress;

pub use progress::{CompletionSummary, HeartStatus, ProgressService, ServiceError};
