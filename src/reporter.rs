//! Drives a provider over a request batch and folds the results into one report.

use crate::mappers;
use crate::providers::{NamedResult, Provider};
use crate::report::UnifiedReport;
use crate::request::RequestBatch;
use crate::{AnalyticsError, Result};
use futures::future::try_join_all;
use strum::Display;

const LOG_TARGET: &str = "  reporter";

/// Lifecycle of a [`Reporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReporterState {
    Idle,
    Running,
    Done,
    Failed,
}

/// Produces one [`UnifiedReport`] from one batch.
///
/// A reporter is single use: once it has run a batch, successfully or not, further calls
/// fail with a configuration error. The mapper family is the one matching the provider it
/// was built with.
#[derive(Debug)]
pub struct Reporter {
    provider: Provider,
    state: ReporterState,
    raw_results: Vec<NamedResult>,
    report: Option<UnifiedReport>,
}

impl Reporter {
    #[must_use]
    pub const fn new(provider: Provider) -> Self {
        Self {
            provider,
            state: ReporterState::Idle,
            raw_results: Vec::new(),
            report: None,
        }
    }

    /// Issue the batch's requests one after another, folding each result as it arrives.
    ///
    /// A result that cannot be mapped stops the batch before the next request goes out.
    pub async fn get_report(&mut self, batch: &RequestBatch) -> Result<UnifiedReport> {
        self.start(batch)?;

        let kind = self.provider.kind();
        let mut report = UnifiedReport::default();

        for descriptor in batch {
            log::debug!(target: LOG_TARGET, "Requesting '{}'", descriptor.name());

            let result = match self.provider.get_report(descriptor).await {
                Ok(result) => result,
                Err(e) => return Err(self.fail(e)),
            };

            report = match mappers::apply(kind, report, &result) {
                Ok(report) => report,
                Err(e) => {
                    self.raw_results.push(result);
                    return Err(self.fail(e));
                }
            };
            self.raw_results.push(result);
        }

        Ok(self.complete(report))
    }

    /// Issue all of the batch's requests at once, then fold them in batch order.
    ///
    /// The report is identical to the one [`get_report`](Self::get_report) produces for the
    /// same responses. The first failing request aborts the batch.
    pub async fn get_report_concurrent(&mut self, batch: &RequestBatch) -> Result<UnifiedReport> {
        self.start(batch)?;

        let provider = &self.provider;
        let results = try_join_all(batch.iter().map(|descriptor| provider.get_report(descriptor))).await;

        match results {
            Ok(results) => self.raw_results = results,
            Err(e) => return Err(self.fail(e)),
        }

        match mappers::fold(self.provider.kind(), &self.raw_results) {
            Ok(report) => Ok(self.complete(report)),
            Err(e) => Err(self.fail(e)),
        }
    }

    #[must_use]
    pub const fn state(&self) -> ReporterState {
        self.state
    }

    #[must_use]
    pub const fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Raw results received so far, in batch order.
    #[must_use]
    pub fn raw_results(&self) -> &[NamedResult] {
        &self.raw_results
    }

    /// The finished report, once a batch has completed successfully.
    #[must_use]
    pub const fn report(&self) -> Option<&UnifiedReport> {
        self.report.as_ref()
    }

    fn start(&mut self, batch: &RequestBatch) -> Result<()> {
        if self.state != ReporterState::Idle {
            return Err(AnalyticsError::configuration(format!(
                "reporter has already run a batch (state: {})",
                self.state
            )));
        }

        let kind = self.provider.kind();
        if batch.provider() != kind {
            self.state = ReporterState::Failed;
            return Err(AnalyticsError::configuration(format!(
                "batch targets the {} provider but the reporter uses the {kind} provider",
                batch.provider()
            )));
        }

        log::info!(target: LOG_TARGET, "Fetching {} report(s) from the {kind} provider", batch.len());
        self.state = ReporterState::Running;
        Ok(())
    }

    fn complete(&mut self, report: UnifiedReport) -> UnifiedReport {
        log::info!(target: LOG_TARGET, "Report complete");
        self.report = Some(report.clone());
        self.state = ReporterState::Done;
        report
    }

    fn fail(&mut self, err: AnalyticsError) -> AnalyticsError {
        log::warn!(target: LOG_TARGET, "Report failed: {err}");
        self.state = ReporterState::Failed;
        err
    }
}
