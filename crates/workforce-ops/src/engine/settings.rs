use chrono::NaiveTime;

use super::leave::LeavePolicy;
use super::scoring::TierLadder;

/// Workday shape assumed when a company has no settings row of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkdaySettings {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub standard_hours: f32,
}

impl Default for WorkdaySettings {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
            standard_hours: 8.0,
        }
    }
}

/// Thresholds consulted by the anomaly sweep when a company setting is
/// absent. The per-check rule logic itself is fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSettings {
    pub default_late_threshold: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            default_late_threshold: 3,
        }
    }
}

/// Immutable engine-wide tuning passed into every service at construction,
/// in place of module-level constants, so deployments can tune it and tests
/// can pin it.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Radius around the nearest fence within which an out-of-fence
    /// coordinate still counts as working from home.
    pub wfh_threshold_m: f64,
    pub workday: WorkdaySettings,
    pub leave: LeavePolicy,
    pub detection: DetectionSettings,
    pub tiers: TierLadder,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            wfh_threshold_m: 1_000.0,
            workday: WorkdaySettings::default(),
            leave: LeavePolicy::default(),
            detection: DetectionSettings::default(),
            tiers: TierLadder::standard(),
        }
    }
}
