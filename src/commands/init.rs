use super::Host;
use super::config::Config;
use crate::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use ohno::{AppError, IntoAppError, app_err};
use std::io::Write;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output configuration file path (default is `analytics-report/config.toml` in the user's configuration directory)
    #[arg(value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

pub fn init_config<H: Host>(host: &mut H, args: &InitArgs) -> Result<(), AppError> {
    let output = match &args.output {
        Some(path) => path.clone(),
        None => Config::default_path().into_app_err("could not determine the configuration directory")?,
    };

    if output.exists() && !args.force {
        return Err(app_err!("configuration file '{output}' already exists, use --force to overwrite it"));
    }

    Config::save_default(&output)?;
    let _ = writeln!(host.output(), "Generated default configuration file: {output}");
    Ok(())
}
