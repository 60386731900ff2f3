//! Fetch weekly visitor analytics and normalize them into one report.
//!
//! # Overview
//!
//! `analytics-report` queries either a Plausible-style stats API or the Google Analytics
//! Data API for this week's and last week's visitors, most visited pages and top traffic
//! sources, and prints them as a single provider-independent JSON document:
//!
//! ```json
//! {
//!   "visitors_this_week": 150,
//!   "visitors_last_week": 100,
//!   "most_visited_pages_this_week": [{ "page": "/", "visitors": 90 }],
//!   "most_visited_pages_last_week": [],
//!   "top_sources_this_week": [{ "source": "Google", "visitors": 40 }],
//!   "top_sources_last_week": []
//! }
//! ```
//!
//! # Quick Start
//!
//! **Plausible:**
//! ```bash
//! PLAUSIBLE_API_KEY=... analytics-report fetch --site-id example.com
//! ```
//!
//! **Google Analytics**, with a service-account key:
//! ```bash
//! analytics-report fetch --provider reporting --site-id 279726693 --key-file key.json
//! ```
//!
//! The key may also be passed through the `GA_KEY_CONTENT` environment variable, or a
//! pre-issued token through `GA_ACCESS_TOKEN`.
//!
//! **Human-readable summary:**
//! ```bash
//! analytics-report fetch --site-id example.com --format console
//! ```
//!
//! # Configuration
//!
//! Provider, site id, base URLs, timeout and concurrency can be kept in a TOML file.
//! Generate one with:
//!
//! ```bash
//! analytics-report init
//! ```
//!
//! It lands in `analytics-report/config.toml` under the user's configuration directory
//! and is picked up automatically; `--config` points at another file. Command-line flags
//! take precedence over the file.
//!
//! # Failures
//!
//! If the provider cannot be reached, rejects the request, or answers with something that
//! cannot be normalized, nothing is printed on stdout. Instead `analytics unavailable: ...`
//! goes to stderr and the process exits with status 1.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use analytics_report::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Default host that talks to the real process streams.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

#[cfg_attr(coverage_nightly, coverage(off))]
impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[tokio::main]
#[cfg_attr(coverage_nightly, coverage(off))]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
