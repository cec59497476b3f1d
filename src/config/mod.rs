#[cfg(feature = "cli")]
pub mod cli;
pub mod transport;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use transport::{RetryMode, TransportConfig};
