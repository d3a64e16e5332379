use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::info;

use super::composite::{aggregate, round2};
use super::formulas::measure_parameter;
use super::{CompositeResult, ParameterScore, ScoreContext};
use crate::engine::calendar::Period;
use crate::engine::domain::{CompanyId, UserId};
use crate::engine::repository::WorkforceRepository;
use crate::engine::settings::EngineSettings;
use crate::engine::EngineError;

/// Number of trailing months (including the scored one) examined for
/// company-wide simultaneous-absence violations.
const ABSENCE_WINDOW_MONTHS: u32 = 3;

/// Service running the periodic calculation pass: per-parameter measures,
/// weighted composite, and bonus tier for every active employee.
pub struct PerformanceService<R> {
    repository: Arc<R>,
    settings: Arc<EngineSettings>,
}

impl<R> PerformanceService<R>
where
    R: WorkforceRepository + 'static,
{
    pub fn new(repository: Arc<R>, settings: Arc<EngineSettings>) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Score every active employee of the company for the period. Results
    /// are upserted by natural key, so re-running the pass is idempotent.
    pub fn calculate_company(
        &self,
        company: &CompanyId,
        period: Period,
        today: NaiveDate,
    ) -> Result<Vec<CompositeResult>, EngineError> {
        let employees = self.repository.active_employees(company)?;
        let violations = self.simultaneous_absence_violations(company, period, today)?;

        let mut results = Vec::with_capacity(employees.len());
        for employee in &employees {
            results.push(self.score_user_inner(
                company,
                &employee.user_id,
                period,
                today,
                violations,
            )?);
        }

        info!(
            company = %company,
            %period,
            employees = results.len(),
            "calculation pass complete"
        );
        Ok(results)
    }

    /// Score a single user for the period, persisting the breakdown and the
    /// composite.
    pub fn score_user(
        &self,
        company: &CompanyId,
        user: &UserId,
        period: Period,
        today: NaiveDate,
    ) -> Result<CompositeResult, EngineError> {
        let violations = self.simultaneous_absence_violations(company, period, today)?;
        self.score_user_inner(company, user, period, today, violations)
    }

    /// Return the persisted composite for the user and period when present,
    /// computing and persisting it otherwise.
    pub fn get_or_calculate(
        &self,
        company: &CompanyId,
        user: &UserId,
        period: Period,
        today: NaiveDate,
    ) -> Result<CompositeResult, EngineError> {
        if let Some(existing) = self.repository.fetch_composite(company, user, period)? {
            return Ok(existing);
        }
        self.score_user(company, user, period, today)
    }

    fn score_user_inner(
        &self,
        company: &CompanyId,
        user: &UserId,
        period: Period,
        today: NaiveDate,
        simultaneous_absence_violations: u32,
    ) -> Result<CompositeResult, EngineError> {
        let start = period.first_day();
        let end = period.last_day();

        let attendance = self
            .repository
            .user_attendance_between(company, user, start, end)?;
        let leaves = self
            .repository
            .user_leaves_between(company, user, start, end)?;
        let tasks = self.repository.user_tasks(company, user)?;
        let reviews = self
            .repository
            .user_reviews_between(company, user, start, end)?;

        let ctx = ScoreContext {
            period,
            today,
            working_days: period.working_days(),
            attendance: &attendance,
            leaves: &leaves,
            tasks: &tasks,
            reviews: &reviews,
            simultaneous_absence_violations,
        };

        let mut parameters = self.repository.active_parameters(company)?;
        parameters.sort_by_key(|parameter| parameter.sort_order);

        let mut breakdown = Vec::with_capacity(parameters.len());
        for parameter in &parameters {
            let measured = measure_parameter(&parameter.name, &ctx);
            let score = ParameterScore {
                user_id: user.clone(),
                parameter_id: parameter.id.clone(),
                parameter_name: parameter.name.clone(),
                period,
                raw_value: measured.raw_value,
                normalized_score: measured.normalized_score,
                weight: parameter.weight,
                weighted_score: round2(
                    measured.normalized_score * parameter.weight as f64 / 100.0,
                ),
            };
            self.repository.upsert_parameter_score(&score)?;
            breakdown.push(score);
        }

        let total_score = aggregate(&breakdown);
        let assignment = self.settings.tiers.resolve(total_score);

        let result = CompositeResult {
            user_id: user.clone(),
            company_id: company.clone(),
            period,
            total_score,
            bonus_percentage: assignment.bonus_percentage,
            tier: assignment.tier.to_string(),
            tier_color: assignment.tier_color.to_string(),
            breakdown,
        };
        self.repository.upsert_composite(&result)?;
        Ok(result)
    }

    /// Count working days in the trailing window on which two or more
    /// active non-super-admin employees were absent, bounded by `today`.
    fn simultaneous_absence_violations(
        &self,
        company: &CompanyId,
        period: Period,
        today: NaiveDate,
    ) -> Result<u32, EngineError> {
        let staff_count = self
            .repository
            .active_employees(company)?
            .iter()
            .filter(|employee| !employee.role.is_super_admin())
            .count() as u32;
        if staff_count == 0 {
            return Ok(0);
        }

        let window_start = period.months_back(ABSENCE_WINDOW_MONTHS - 1).first_day();
        let window_end = period.last_day().min(today);
        if window_end < window_start {
            return Ok(0);
        }

        let attendance =
            self.repository
                .company_attendance_between(company, window_start, window_end)?;
        let mut present_by_day: HashMap<NaiveDate, u32> = HashMap::new();
        for record in &attendance {
            if record.check_in.is_some() {
                *present_by_day.entry(record.date).or_insert(0) += 1;
            }
        }

        let violations = window_start
            .iter_days()
            .take_while(|day| *day <= window_end)
            .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
            .filter(|day| {
                let present = present_by_day.get(day).copied().unwrap_or(0);
                staff_count.saturating_sub(present) >= 2
            })
            .count() as u32;

        Ok(violations)
    }
}
