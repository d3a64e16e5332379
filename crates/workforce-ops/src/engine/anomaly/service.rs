use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use super::checks::run_check;
use super::{summarize, AnomalyKind, AnomalyReport, CheckFailure};
use crate::engine::domain::CompanyId;
use crate::engine::repository::WorkforceRepository;
use crate::engine::settings::EngineSettings;
use crate::engine::EngineError;

/// Outbound hook handed the persisted report; actual delivery transport is
/// an external collaborator.
pub trait ReportPublisher: Send + Sync {
    fn publish(&self, report: &AnomalyReport) -> Result<(), PublishError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("report transport unavailable: {0}")]
    Transport(String),
}

/// Service running the daily anomaly sweep and persisting its report.
pub struct AnomalyService<R, P> {
    repository: Arc<R>,
    publisher: Arc<P>,
    settings: Arc<EngineSettings>,
}

impl<R, P> AnomalyService<R, P>
where
    R: WorkforceRepository + 'static,
    P: ReportPublisher + 'static,
{
    pub fn new(repository: Arc<R>, publisher: Arc<P>, settings: Arc<EngineSettings>) -> Self {
        Self {
            repository,
            publisher,
            settings,
        }
    }

    /// Run all checks for the company and date. Each check is isolated: a
    /// failing query is logged and recorded on the report while the other
    /// checks still run. The report is upserted by (company, date), so
    /// re-running the same day overwrites.
    pub fn run_detection(
        &self,
        company: &CompanyId,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<AnomalyReport, EngineError> {
        let mut details = Vec::new();
        let mut check_failures = Vec::new();

        for kind in AnomalyKind::all() {
            match run_check(kind, self.repository.as_ref(), company, today, &self.settings.detection)
            {
                Ok(mut items) => details.append(&mut items),
                Err(error) => {
                    warn!(
                        company = %company,
                        check = kind.label(),
                        %error,
                        "anomaly check failed; continuing with partial sweep"
                    );
                    check_failures.push(CheckFailure {
                        kind,
                        error: error.to_string(),
                    });
                }
            }
        }

        let sent_to = self.resolve_recipients(company)?;
        let summary = summarize(&details);

        let mut report = AnomalyReport {
            company_id: company.clone(),
            date: today,
            summary,
            details,
            check_failures,
            sent_to,
            sent_at: None,
        };
        self.repository.upsert_report(&report)?;

        if !report.sent_to.is_empty() {
            self.publisher.publish(&report)?;
            report.sent_at = Some(now);
            self.repository.upsert_report(&report)?;
        }

        info!(
            company = %company,
            date = %today,
            findings = report.details.len(),
            failed_checks = report.check_failures.len(),
            "anomaly sweep complete"
        );
        Ok(report)
    }

    /// Union of recipient addresses across the company's active rules,
    /// de-duplicated and order-stable.
    fn resolve_recipients(&self, company: &CompanyId) -> Result<Vec<String>, EngineError> {
        let rules = self.repository.active_anomaly_rules(company)?;
        let unique: BTreeSet<String> = rules
            .into_iter()
            .flat_map(|rule| rule.recipients)
            .collect();
        Ok(unique.into_iter().collect())
    }
}
