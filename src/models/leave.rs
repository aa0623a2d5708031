use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Record, Searchable, Stored};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Sick,
    #[default]
    Casual,
    Annual,
    Unpaid,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sick => "sick",
            Self::Casual => "casual",
            Self::Annual => "annual",
            Self::Unpaid => "unpaid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sick" => Some(Self::Sick),
            "casual" => Some(Self::Casual),
            "annual" | "vacation" => Some(Self::Annual),
            "unpaid" => Some(Self::Unpaid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeaveError {
    #[error("leave request was already {}", .0.as_str())]
    AlreadyDecided(LeaveStatus),
}

impl LeaveRecord {
    pub fn new(employee_id: Uuid, leave_type: LeaveType, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            leave_type,
            start_date,
            end_date,
            reason: None,
            status: LeaveStatus::default(),
            created_at: Utc::now(),
        }
    }

    /// Calendar days covered, both ends inclusive
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn approve(&mut self) -> Result<(), LeaveError> {
        self.decide(LeaveStatus::Approved)
    }

    pub fn reject(&mut self) -> Result<(), LeaveError> {
        self.decide(LeaveStatus::Rejected)
    }

    fn decide(&mut self, outcome: LeaveStatus) -> Result<(), LeaveError> {
        if self.status != LeaveStatus::Pending {
            return Err(LeaveError::AlreadyDecided(self.status));
        }
        self.status = outcome;
        Ok(())
    }

    pub fn overlaps(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    /// Same employee, intersecting dates, and neither request rejected
    pub fn clashes_with(&self, other: &LeaveRecord) -> bool {
        self.employee_id == other.employee_id
            && self.status != LeaveStatus::Rejected
            && other.status != LeaveStatus::Rejected
            && self.start_date <= other.end_date
            && other.start_date <= self.end_date
    }
}

impl Record for LeaveRecord {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }
}

impl Stored for LeaveRecord {
    const KEY: &'static str = "leaves";
}

impl Searchable for LeaveRecord {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.leave_type.as_str(), self.status.as_str()];
        if let Some(ref r) = self.reason {
            fields.push(r.as_str());
        }
        fields
    }
}
