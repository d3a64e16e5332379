//! Rule-triggered anomaly detection over a company's operational data.

pub mod checks;
pub mod service;

pub use service::{AnomalyService, PublishError, ReportPublisher};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::domain::{CompanyId, Severity, UserId};

/// The seven executable detection checks. Admin-configured rule rows only
/// contribute recipients; the logic lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    SimultaneousAbsence,
    ExcessiveGeoExits,
    OverdueTaskNoPermission,
    FrequentEmergencyLeaves,
    LowAttendance,
    HighBacklog,
    FrequentLateArrivals,
}

impl AnomalyKind {
    pub const fn all() -> [Self; 7] {
        [
            Self::SimultaneousAbsence,
            Self::ExcessiveGeoExits,
            Self::OverdueTaskNoPermission,
            Self::FrequentEmergencyLeaves,
            Self::LowAttendance,
            Self::HighBacklog,
            Self::FrequentLateArrivals,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SimultaneousAbsence => "Simultaneous Absence",
            Self::ExcessiveGeoExits => "Excessive Geo Exits",
            Self::OverdueTaskNoPermission => "Overdue Task Without Permission",
            Self::FrequentEmergencyLeaves => "Frequent Emergency Leaves",
            Self::LowAttendance => "Low Attendance",
            Self::HighBacklog => "High Backlog",
            Self::FrequentLateArrivals => "Frequent Late Arrivals",
        }
    }
}

/// One finding produced by a detection check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyItem {
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub affected_users: Vec<UserId>,
    pub data: serde_json::Value,
}

/// A check whose queries failed; recorded on the report so a partial sweep
/// is visible instead of silently incomplete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckFailure {
    pub kind: AnomalyKind,
    pub error: String,
}

/// Daily detection report, upserted by (company, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub company_id: CompanyId,
    pub date: NaiveDate,
    pub summary: String,
    pub details: Vec<AnomalyItem>,
    pub check_failures: Vec<CheckFailure>,
    pub sent_to: Vec<String>,
    pub sent_at: Option<NaiveDateTime>,
}

/// Human-readable roll-up of the findings: total plus per-severity counts.
pub fn summarize(items: &[AnomalyItem]) -> String {
    if items.is_empty() {
        return "No anomalies detected.".to_string();
    }
    let critical = items
        .iter()
        .filter(|item| item.severity == Severity::Critical)
        .count();
    let high = items
        .iter()
        .filter(|item| item.severity == Severity::High)
        .count();
    let medium = items
        .iter()
        .filter(|item| item.severity == Severity::Medium)
        .count();
    format!(
        "{} anomalies detected ({critical} critical, {high} high, {medium} medium).",
        items.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(severity: Severity) -> AnomalyItem {
        AnomalyItem {
            kind: AnomalyKind::HighBacklog,
            severity,
            title: "test".to_string(),
            description: "test".to_string(),
            affected_users: Vec::new(),
            data: serde_json::Value::Null,
        }
    }

    #[test]
    fn empty_sweep_reports_no_anomalies() {
        assert_eq!(summarize(&[]), "No anomalies detected.");
    }

    #[test]
    fn summary_breaks_counts_down_by_severity() {
        let items = vec![
            item(Severity::Critical),
            item(Severity::High),
            item(Severity::High),
            item(Severity::Medium),
        ];
        assert_eq!(
            summarize(&items),
            "4 anomalies detected (1 critical, 2 high, 1 medium)."
        );
    }
}
