//! Logging seam shared by the factory and the providers it builds
//!
//! Callers hand a [`SharedLogger`] to `ProviderFactory::create`; it is carried
//! inside the client configuration to whichever provider gets built. When no
//! sink is supplied, diagnostics go to the process-wide debug file instead.

mod traits;
mod noop;
mod console;
pub mod file_logger;

pub use traits::{Logger, LoggerExt, LogLevel, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use file_logger::{log_file_path, FileLogger};
