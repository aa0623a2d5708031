use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordId, Searchable, Stored};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollEmployee {
    pub id: RecordId,
    pub employee_id: u32,
    pub name: String,
    #[serde(default)]
    pub designation: String,
    pub salary_per_month: f64,
    #[serde(default)]
    pub deduction: f64,
    #[serde(default)]
    pub status: PayrollStatus,
    #[serde(default)]
    pub pay_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PayrollStatus {
    #[default]
    Pending,
    Completed,
}

impl PayrollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" | "paid" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl PayrollEmployee {
    pub fn net_salary(&self) -> f64 {
        self.salary_per_month - self.deduction
    }
}

impl Record for PayrollEmployee {
    type Id = RecordId;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Stored for PayrollEmployee {
    const KEY: &'static str = "payroll_local";
}

impl Searchable for PayrollEmployee {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.designation.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_salary() {
        let p: PayrollEmployee = serde_json::from_str(
            r#"{"id": 3, "employeeId": 101, "name": "Ana", "salaryPerMonth": 5200.0,
                "deduction": 450.5, "netSalary": 1.0}"#,
        )
        .unwrap();
        assert_eq!(p.net_salary(), 4749.5);
        assert_eq!(p.status, PayrollStatus::Pending);
    }
}
