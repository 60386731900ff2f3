#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for analytics-report
//!
//! This library fetches weekly visitor analytics from one of two providers and normalizes
//! the heterogeneous responses into a single [`UnifiedReport`].
//!
//! # Module Organization
//!
//! - [`request`]: Request descriptors, date ranges, and request batches
//! - [`providers`]: The Plausible-style HTTP provider and the Google-style reporting provider
//! - [`mappers`]: Per-provider functions that fold a raw payload into the report
//! - [`reporter`]: Drives a batch through a provider and its mappers
//! - [`report`]: The unified report and the closed set of metric names
//! - [`output`]: JSON and console rendering of a finished report
//! - [`commands`]: Command-line front end

pub type Result<T, E = AnalyticsError> = core::result::Result<T, E>;

pub mod commands;
mod error;
pub mod mappers;
pub mod output;
pub mod providers;
pub mod report;
pub mod reporter;
pub mod request;

pub use commands::{Host, run};
pub use error::AnalyticsError;
pub use providers::{NamedResult, Provider, ProviderKind, ProviderRequest, RawResult};
pub use report::{MetricName, PageEntry, SourceEntry, UnifiedReport};
pub use reporter::{Reporter, ReporterState};
pub use request::{DateRange, RequestBatch, RequestDescriptor};
