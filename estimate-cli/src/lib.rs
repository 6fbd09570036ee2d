pub mod config;
pub mod console;
pub mod logging;
pub mod schema_loader;
pub mod session;

pub use config::{AppConfig, Overrides};
pub use console::{ConsoleView, TracingAnalytics};
pub use session::{Session, SessionEnd};
