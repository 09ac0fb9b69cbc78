mod app;
mod collector;
mod config;
mod cursor;
mod tail;
mod validation;

pub use app::{AppError, AppResult};
pub use collector::CollectorError;
pub use config::ConfigError;
pub use cursor::CursorError;
pub use tail::TailError;
pub use validation::ValidationError;
