use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for tenant companies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyId(pub String);

/// Identifier wrapper for employees.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for leave requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaveId(pub String);

/// Identifier wrapper for tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

/// Identifier wrapper for geofences.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FenceId(pub String);

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for LeaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    Staff,
    Manager,
    SuperAdmin,
}

impl EmployeeRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Staff => "Staff",
            Self::Manager => "Manager",
            Self::SuperAdmin => "Super Admin",
        }
    }

    /// Super admins are excluded from attendance and absence denominators.
    pub const fn is_super_admin(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub display_name: String,
    pub email: String,
    pub role: EmployeeRole,
    pub is_active: bool,
}

/// Per-company attendance policy consulted on the write paths and by the
/// late-arrival anomaly check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySettings {
    pub company_id: CompanyId,
    pub workday_start: chrono::NaiveTime,
    pub workday_end: chrono::NaiveTime,
    pub standard_work_hours: f32,
    pub late_threshold: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Office,
    ClientSite,
    WorkFromHome,
    Unknown,
}

impl LocationType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Office => "Office",
            Self::ClientSite => "Client Site",
            Self::WorkFromHome => "Work From Home",
            Self::Unknown => "Unknown",
        }
    }
}

/// One record per user per calendar day; uniqueness is enforced by the
/// repository upsert key (user, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub date: NaiveDate,
    pub check_in: Option<NaiveDateTime>,
    pub check_out: Option<NaiveDateTime>,
    pub check_in_latitude: Option<f64>,
    pub check_in_longitude: Option<f64>,
    pub is_late: bool,
    pub late_by_minutes: i64,
    pub is_half_day: bool,
    pub overtime_hours: f32,
    pub geo_exit_count: u32,
    pub location_type: LocationType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Sick,
    Casual,
    Vacation,
    Unpaid,
}

impl LeaveType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sick => "Sick",
            Self::Casual => "Casual",
            Self::Vacation => "Vacation",
            Self::Unpaid => "Unpaid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofStatus {
    NotRequired,
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: LeaveId,
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: u32,
    pub is_advance: bool,
    pub is_emergency: bool,
    pub scoring_impact: f32,
    pub proof_status: ProofStatus,
    pub status: LeaveStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// A task still counts against backlog and overdue checks while open.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub company_id: CompanyId,
    pub assignee: UserId,
    pub title: String,
    pub created_on: NaiveDate,
    pub deadline: NaiveDate,
    pub status: TaskStatus,
    pub completed_on: Option<NaiveDate>,
    pub speed_score: Option<f64>,
    pub backlog_weeks: f32,
    pub special_permission: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReview {
    pub task_id: TaskId,
    pub company_id: CompanyId,
    pub subject: UserId,
    pub reviewer: UserId,
    pub accuracy_score: f64,
    pub staff_agreed: bool,
    pub reviewed_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFormula {
    HigherIsBetter,
    LowerIsBetter,
    Custom,
}

/// Admin-configured performance parameter; read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringParameter {
    pub id: String,
    pub company_id: CompanyId,
    pub name: String,
    pub weight: f32,
    pub formula: ScoringFormula,
    pub data_source: String,
    pub is_active: bool,
    pub sort_order: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FenceKind {
    Office,
    ClientSite,
}

impl FenceKind {
    pub const fn location_type(self) -> LocationType {
        match self {
            Self::Office => LocationType::Office,
            Self::ClientSite => LocationType::ClientSite,
        }
    }
}

/// Labeled circular region used to classify physical attendance location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFence {
    pub id: FenceId,
    pub company_id: CompanyId,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub kind: FenceKind,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Admin-configured anomaly rule; only the recipient list is consulted, the
/// `condition` text is descriptive and never evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRule {
    pub id: String,
    pub company_id: CompanyId,
    pub name: String,
    pub condition: String,
    pub severity: Severity,
    pub is_active: bool,
    pub recipients: Vec<String>,
}
