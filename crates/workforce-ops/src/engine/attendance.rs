use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use super::domain::{AttendanceRecord, CompanyId, CompanySettings, LocationType, UserId};
use super::geo::{classify_location, ClassifiedLocation};
use super::repository::{RepositoryError, WorkforceRepository};
use super::settings::EngineSettings;
use super::EngineError;

/// Service handling the synchronous attendance write path: check-in with
/// geofence classification and lateness, check-out with overtime and
/// half-day derivation, and location pings tracking geofence exits.
pub struct AttendanceService<R> {
    repository: Arc<R>,
    settings: Arc<EngineSettings>,
}

impl<R> AttendanceService<R>
where
    R: WorkforceRepository + 'static,
{
    pub fn new(repository: Arc<R>, settings: Arc<EngineSettings>) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Create the day's attendance record. A second check-in for the same
    /// user and date is a conflict.
    pub fn check_in(
        &self,
        company: &CompanyId,
        user: &UserId,
        date: NaiveDate,
        time: NaiveTime,
        latitude: f64,
        longitude: f64,
    ) -> Result<AttendanceRecord, EngineError> {
        if self.repository.fetch_attendance(company, user, date)?.is_some() {
            return Err(RepositoryError::Conflict.into());
        }

        let classified = self.classify(company, latitude, longitude)?;
        let workday_start = self.workday_start(company)?;
        let late_by_minutes = (time - workday_start).num_minutes().max(0);

        let record = AttendanceRecord {
            user_id: user.clone(),
            company_id: company.clone(),
            date,
            check_in: Some(date.and_time(time)),
            check_out: None,
            check_in_latitude: Some(latitude),
            check_in_longitude: Some(longitude),
            is_late: late_by_minutes > 0,
            late_by_minutes,
            is_half_day: false,
            overtime_hours: 0.0,
            geo_exit_count: 0,
            location_type: classified.location_type,
        };
        self.repository.insert_attendance(&record)?;
        Ok(record)
    }

    /// Close the day's record, deriving worked hours, overtime above the
    /// standard workday, and the half-day flag.
    pub fn check_out(
        &self,
        company: &CompanyId,
        user: &UserId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<AttendanceRecord, EngineError> {
        let mut record = self
            .repository
            .fetch_attendance(company, user, date)?
            .ok_or(RepositoryError::NotFound)?;
        let check_in = record.check_in.ok_or(EngineError::MissingCheckIn {
            user_id: user.clone(),
            date,
        })?;

        let check_out = date.and_time(time);
        let worked_hours =
            ((check_out - check_in).num_minutes().max(0) as f32) / 60.0;
        let standard_hours = self.standard_hours(company)?;

        record.check_out = Some(check_out);
        record.overtime_hours = (worked_hours - standard_hours).max(0.0);
        record.is_half_day = worked_hours < standard_hours / 2.0;
        self.repository.update_attendance(&record)?;
        Ok(record)
    }

    /// Record a location ping against the day's record. A ping outside
    /// every fence and the work-from-home radius counts as a geofence exit;
    /// a ping inside a known zone updates the record's location type.
    pub fn location_ping(
        &self,
        company: &CompanyId,
        user: &UserId,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> Result<AttendanceRecord, EngineError> {
        let mut record = self
            .repository
            .fetch_attendance(company, user, date)?
            .ok_or(RepositoryError::NotFound)?;

        let classified = self.classify(company, latitude, longitude)?;
        if classified.location_type == LocationType::Unknown {
            record.geo_exit_count += 1;
        } else {
            record.location_type = classified.location_type;
        }
        self.repository.update_attendance(&record)?;
        Ok(record)
    }

    fn classify(
        &self,
        company: &CompanyId,
        latitude: f64,
        longitude: f64,
    ) -> Result<ClassifiedLocation, EngineError> {
        let fences = self.repository.active_fences(company)?;
        Ok(classify_location(
            latitude,
            longitude,
            &fences,
            self.settings.wfh_threshold_m,
        ))
    }

    fn workday_start(&self, company: &CompanyId) -> Result<NaiveTime, EngineError> {
        Ok(self
            .company_settings(company)?
            .map(|settings| settings.workday_start)
            .unwrap_or(self.settings.workday.start))
    }

    fn standard_hours(&self, company: &CompanyId) -> Result<f32, EngineError> {
        Ok(self
            .company_settings(company)?
            .map(|settings| settings.standard_work_hours)
            .unwrap_or(self.settings.workday.standard_hours))
    }

    fn company_settings(
        &self,
        company: &CompanyId,
    ) -> Result<Option<CompanySettings>, EngineError> {
        Ok(self.repository.company_settings(company)?)
    }
}
