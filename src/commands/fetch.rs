use super::Host;
use super::config::Config;
use crate::output::{OutputFormat, generate_console, generate_json};
use crate::providers::http::HttpProvider;
use crate::providers::reporting::{Credentials, ReportingProvider};
use crate::providers::{Provider, ProviderKind};
use crate::{AnalyticsError, Reporter, RequestBatch, Result, UnifiedReport};
use camino::Utf8PathBuf;
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use core::time::Duration;
use ohno::{AppError, IntoAppError, app_err};
use std::fs;
use std::io::Write;

const LOG_TARGET: &str = "     fetch";

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Analytics backend to query (overrides the configuration file)
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<ProviderKind>,

    /// Plausible site domain, or GA4 property id for the reporting provider
    #[arg(long, value_name = "ID")]
    pub site_id: Option<String>,

    /// Plausible API key
    #[arg(long, value_name = "KEY", env = "PLAUSIBLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Google service-account key, as the raw JSON document
    #[arg(long, value_name = "JSON", env = "GA_KEY_CONTENT", hide_env_values = true)]
    pub key_content: Option<String>,

    /// Google service-account key file (takes precedence over --key-content)
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<Utf8PathBuf>,

    /// Pre-issued Google access token, used when no service-account key is given
    #[arg(long, value_name = "TOKEN", env = "GA_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Provider base URL (overrides the configuration file)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds (overrides the configuration file)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Issue all requests at once instead of one after another
    #[arg(long)]
    pub concurrent: bool,

    /// Day whose calendar week counts as "this week" for the HTTP provider (default is today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    /// Path to configuration file (default is `analytics-report/config.toml` in the user's configuration directory)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Report format
    #[arg(long, value_name = "FORMAT", default_value = "json")]
    pub format: OutputFormat,

    /// Write the report to a file instead of to the terminal
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,
}

/// Everything needed to produce one report, with command-line values layered over the configuration file.
#[derive(Debug)]
struct FetchPlan {
    kind: ProviderKind,
    site_id: String,
    base_url: Option<String>,
    timeout: Duration,
    concurrent: bool,
    today: NaiveDate,
    api_key: Option<String>,
    credentials: Option<Credentials>,
}

impl FetchPlan {
    fn resolve(args: &FetchArgs, config: Config) -> Result<Self, AppError> {
        let kind = args.provider.unwrap_or(config.provider);

        let timeout = args.timeout.map_or_else(|| config.timeout(), Duration::from_secs);
        if timeout.is_zero() {
            return Err(app_err!("timeout must be greater than zero"));
        }

        let site_id = args
            .site_id
            .clone()
            .or(config.site_id)
            .into_app_err("no site id configured, pass --site-id or set site_id in the configuration file")?;

        let base_url = args.base_url.clone().or(match kind {
            ProviderKind::Http => config.http_base_url,
            ProviderKind::Reporting => config.reporting_base_url,
        });

        let key_content = match &args.key_file {
            Some(path) => Some(fs::read_to_string(path).into_app_err_with(|| format!("reading service account key '{path}'"))?),
            None => args.key_content.clone(),
        };

        let credentials = key_content
            .map(Credentials::ServiceAccountJson)
            .or_else(|| args.access_token.clone().map(Credentials::AccessToken));

        Ok(Self {
            kind,
            site_id,
            base_url,
            timeout,
            concurrent: args.concurrent || config.concurrent,
            today: args.today.unwrap_or_else(|| Local::now().date_naive()),
            api_key: args.api_key.clone(),
            credentials,
        })
    }

    fn provider(&self) -> Result<Provider> {
        Ok(match self.kind {
            ProviderKind::Http => HttpProvider::new(self.api_key.as_deref(), self.base_url.as_deref(), self.timeout)?.into(),
            ProviderKind::Reporting => ReportingProvider::new(self.credentials.clone(), self.base_url.as_deref(), self.timeout)?.into(),
        })
    }

    fn batch(&self) -> RequestBatch {
        match self.kind {
            ProviderKind::Http => RequestBatch::standard_http(&self.site_id, self.today),
            ProviderKind::Reporting => RequestBatch::standard_reporting(&self.site_id),
        }
    }

    async fn execute(&self) -> Result<UnifiedReport> {
        let mut reporter = Reporter::new(self.provider()?);
        let batch = self.batch();

        if self.concurrent {
            reporter.get_report_concurrent(&batch).await
        } else {
            reporter.get_report(&batch).await
        }
    }
}

/// Fetch this week's and last week's analytics and write the unified report.
///
/// Any failure talking to the provider or normalizing its answer is reported as
/// "analytics unavailable" on the error stream, with exit status 1.
pub async fn fetch_report<H: Host>(host: &mut H, args: &FetchArgs) -> Result<(), AppError> {
    init_logging(args.log_level);

    let config = Config::load(args.config.as_deref())?;
    let plan = FetchPlan::resolve(args, config)?;

    log::info!(target: LOG_TARGET, "Fetching analytics for '{}' from the {} provider", plan.site_id, plan.kind);

    match plan.execute().await {
        Ok(report) => write_report(host, args, &report),
        Err(e) => unavailable(host, e),
    }
}

fn unavailable<H: Host>(host: &mut H, err: AnalyticsError) -> Result<(), AppError> {
    let _ = writeln!(host.error(), "analytics unavailable: {err}");
    host.exit(1);
    Err(err).into_app_err("analytics unavailable")
}

fn write_report<H: Host>(host: &mut H, args: &FetchArgs, report: &UnifiedReport) -> Result<(), AppError> {
    let mut text = String::new();
    match args.format {
        OutputFormat::Json => generate_json(report, &mut text)?,
        OutputFormat::Console => {
            let use_colors = args.output.is_none()
                && match args.color {
                    ColorMode::Always => true,
                    ColorMode::Never => false,
                    ColorMode::Auto => {
                        use std::io::{IsTerminal, stdout};
                        stdout().is_terminal()
                    }
                };
            generate_console(report, use_colors, &mut text)?;
        }
    }

    if let Some(path) = &args.output {
        fs::write(path, text).into_app_err_with(|| format!("writing report to '{path}'"))?;
    } else {
        let _ = write!(host.output(), "{text}");
    }

    Ok(())
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // a second fetch in the same process keeps the first logger
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;

    fn args(extra: &[&str]) -> FetchArgs {
        let mut argv = vec!["fetch"];
        argv.extend_from_slice(extra);
        FetchArgs::parse_from(argv)
    }

    #[test]
    fn test_plan_uses_config_values() {
        let config = Config {
            provider: ProviderKind::Reporting,
            site_id: Some("279726693".into()),
            reporting_base_url: Some("http://localhost:1".into()),
            timeout_secs: 7,
            concurrent: true,
            ..Config::default()
        };

        let plan = FetchPlan::resolve(&args(&["--access-token", "t"]), config).unwrap();
        assert_eq!(plan.kind, ProviderKind::Reporting);
        assert_eq!(plan.site_id, "279726693");
        assert_eq!(plan.base_url.as_deref(), Some("http://localhost:1"));
        assert_eq!(plan.timeout, Duration::from_secs(7));
        assert!(plan.concurrent);
        assert!(matches!(plan.credentials, Some(Credentials::AccessToken(ref t)) if t == "t"));
    }

    #[test]
    fn test_plan_flags_override_config() {
        let config = Config {
            site_id: Some("config.example".into()),
            http_base_url: Some("http://config".into()),
            ..Config::default()
        };

        let plan = FetchPlan::resolve(
            &args(&[
                "--site-id",
                "flag.example",
                "--base-url",
                "http://flag",
                "--timeout",
                "3",
                "--today",
                "2024-01-10",
            ]),
            config,
        )
        .unwrap();

        assert_eq!(plan.site_id, "flag.example");
        assert_eq!(plan.base_url.as_deref(), Some("http://flag"));
        assert_eq!(plan.timeout, Duration::from_secs(3));
        assert_eq!(plan.today, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn test_plan_requires_site_id() {
        assert!(FetchPlan::resolve(&args(&[]), Config::default()).is_err());
    }

    #[test]
    fn test_plan_rejects_zero_timeout() {
        assert!(FetchPlan::resolve(&args(&["--site-id", "s", "--timeout", "0"]), Config::default()).is_err());
    }

    #[test]
    fn test_service_account_key_wins_over_access_token() {
        let plan = FetchPlan::resolve(
            &args(&["--site-id", "1", "--key-content", "{}", "--access-token", "t"]),
            Config::default(),
        )
        .unwrap();
        assert!(matches!(plan.credentials, Some(Credentials::ServiceAccountJson(_))));
    }

    #[test]
    fn test_standard_batch_per_provider() {
        let http = FetchPlan::resolve(&args(&["--site-id", "example.com"]), Config::default()).unwrap();
        assert_eq!(http.batch().provider(), ProviderKind::Http);
        assert_eq!(http.batch().len(), 6);

        let reporting = FetchPlan::resolve(&args(&["--site-id", "1", "--provider", "reporting"]), Config::default()).unwrap();
        assert_eq!(reporting.batch().provider(), ProviderKind::Reporting);
    }

    #[tokio::test]
    async fn test_missing_credentials_reports_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        fs::write(&config_path, "provider = \"reporting\"\nsite_id = \"1\"\n").unwrap();
        let config_path = config_path.to_str().unwrap();

        let mut host = TestHost::new();
        let result = fetch_report(&mut host, &args(&["--config", config_path])).await;

        assert!(result.is_err());
        assert_eq!(host.exit_code, Some(1));
        assert!(host.error_str().starts_with("analytics unavailable: configuration error"));
        assert!(host.output_buf.is_empty());
    }
}
