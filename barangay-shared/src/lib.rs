pub mod types;
pub mod errors;
pub mod telemetry;

pub use types::*;
pub use errors::{AppError, AppResult, ErrorCode, ErrorKind};
