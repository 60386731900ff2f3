//! Command-line interface for analytics-report
//!
//! Two commands are offered:
//!
//! - **fetch**: layer command-line flags and environment variables over the
//!   configuration file, build the selected provider and its standard six-metric
//!   batch, run it through a [`Reporter`](crate::Reporter) and render the result as
//!   JSON or as a console summary. Any library error ends the run with
//!   "analytics unavailable" on stderr and exit status 1.
//! - **init**: write the default configuration file.
//!
//! The [`Host`] trait stands between the commands and the process so tests can
//! capture output and exit codes.

mod config;
mod fetch;
mod host;
mod init;
mod run;

pub use config::{Config, DEFAULT_CONFIG_TOML};
pub use fetch::{ColorMode, FetchArgs, LogLevel, fetch_report};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
