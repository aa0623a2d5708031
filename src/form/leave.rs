use uuid::Uuid;

use super::{check_employee_link, invalid, optional, parse_date, require, EntityForm, FieldError, FormError};
use crate::db::{LocalStore, StoreError};
use crate::models::{LeaveRecord, LeaveType};

#[derive(Debug, Clone, Default)]
pub struct LeaveForm {
    pub employee_id: String,
    pub leave_type: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
}

impl EntityForm for LeaveForm {
    type Entity = LeaveRecord;

    const FIELDS: &'static [&'static str] =
        &["employee_id", "leave_type", "start_date", "end_date", "reason"];

    fn from_entity(l: &LeaveRecord) -> Self {
        Self {
            employee_id: l.employee_id.to_string(),
            leave_type: l.leave_type.as_str().to_string(),
            start_date: l.start_date.to_string(),
            end_date: l.end_date.to_string(),
            reason: l.reason.clone().unwrap_or_default(),
        }
    }

    fn get(&self, field: &str) -> Option<&str> {
        Some(match field {
            "employee_id" => self.employee_id.as_str(),
            "leave_type" => self.leave_type.as_str(),
            "start_date" => self.start_date.as_str(),
            "end_date" => self.end_date.as_str(),
            "reason" => self.reason.as_str(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "employee_id" => &mut self.employee_id,
            "leave_type" => &mut self.leave_type,
            "start_date" => &mut self.start_date,
            "end_date" => &mut self.end_date,
            "reason" => &mut self.reason,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if require(&mut errors, "employee_id", &self.employee_id)
            && Uuid::parse_str(self.employee_id.trim()).is_err()
        {
            errors.push(FieldError::new("employee_id", "is not an employee id"));
        }
        if require(&mut errors, "leave_type", &self.leave_type) && LeaveType::parse(&self.leave_type).is_none() {
            errors.push(FieldError::new("leave_type", "must be sick, casual, annual or unpaid"));
        }

        let start = if require(&mut errors, "start_date", &self.start_date) {
            let parsed = parse_date(&self.start_date);
            if parsed.is_none() {
                errors.push(FieldError::new("start_date", "must be a date like 2024-01-31"));
            }
            parsed
        } else {
            None
        };
        let end = if require(&mut errors, "end_date", &self.end_date) {
            let parsed = parse_date(&self.end_date);
            if parsed.is_none() {
                errors.push(FieldError::new("end_date", "must be a date like 2024-01-31"));
            }
            parsed
        } else {
            None
        };

        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.push(FieldError::new("end_date", "cannot be before the start date"));
            }
        }
        errors
    }

    fn check_links(&self, store: &dyn LocalStore) -> Result<Vec<FieldError>, StoreError> {
        let mut errors = Vec::new();
        check_employee_link(store, &mut errors, "employee_id", &self.employee_id)?;
        Ok(errors)
    }

    fn build(&self, existing: Option<&LeaveRecord>) -> Result<LeaveRecord, FormError> {
        let employee_id = Uuid::parse_str(self.employee_id.trim())
            .map_err(|_| invalid("employee_id", "is not an employee id"))?;
        let leave_type = LeaveType::parse(&self.leave_type)
            .ok_or_else(|| invalid("leave_type", "must be sick, casual, annual or unpaid"))?;
        let start = parse_date(&self.start_date)
            .ok_or_else(|| invalid("start_date", "must be a date like 2024-01-31"))?;
        let end = parse_date(&self.end_date)
            .ok_or_else(|| invalid("end_date", "must be a date like 2024-01-31"))?;

        let mut leave = match existing {
            Some(l) => l.clone(),
            None => LeaveRecord::new(employee_id, leave_type, start, end),
        };
        leave.employee_id = employee_id;
        leave.leave_type = leave_type;
        leave.start_date = start;
        leave.end_date = end;
        leave.reason = optional(&self.reason);
        Ok(leave)
    }
}
