use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Record, Searchable, Stored};

/// One employee's presence on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub check_in: NaiveTime,
    #[serde(default)]
    pub check_out: Option<NaiveTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Late => "late",
        }
    }
}

impl AttendanceRecord {
    pub fn check_in(employee_id: Uuid, date: NaiveDate, at: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            date,
            check_in: at,
            check_out: None,
        }
    }

    /// Late when checking in after `work_start`
    pub fn status(&self, work_start: NaiveTime) -> AttendanceStatus {
        if self.check_in > work_start {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        }
    }

    /// Hours between check-in and check-out, None while still checked in
    pub fn worked_hours(&self) -> Option<f64> {
        let out = self.check_out?;
        let minutes = (out - self.check_in).num_minutes().max(0);
        Some(minutes as f64 / 60.0)
    }
}

impl Record for AttendanceRecord {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }
}

impl Stored for AttendanceRecord {
    const KEY: &'static str = "attendance";
}

/// No text of its own; lists search it by employee through `WithEmployee`
impl Searchable for AttendanceRecord {
    fn search_fields(&self) -> Vec<&str> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_status_and_hours() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let mut rec = AttendanceRecord::check_in(Uuid::new_v4(), day, t(9, 15));
        assert_eq!(rec.status(t(9, 0)), AttendanceStatus::Late);
        assert_eq!(rec.status(t(9, 30)), AttendanceStatus::Present);
        assert!(rec.worked_hours().is_none());

        rec.check_out = Some(t(17, 45));
        assert_eq!(rec.worked_hours(), Some(8.5));
    }
}
