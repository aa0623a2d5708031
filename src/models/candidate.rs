use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordId, Searchable, Stored};

/// A job applicant moving through the recruitment pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub applied_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: CandidateStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    #[default]
    Applied,
    Screening,
    Interview,
    Offered,
    Hired,
    Rejected,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Screening => "screening",
            Self::Interview => "interview",
            Self::Offered => "offered",
            Self::Hired => "hired",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Some(Self::Applied),
            "screening" => Some(Self::Screening),
            "interview" => Some(Self::Interview),
            "offered" | "offer" => Some(Self::Offered),
            "hired" => Some(Self::Hired),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Hired and rejected candidates leave the pipeline
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Hired | Self::Rejected)
    }

    /// Next pipeline stage, or None once terminal
    pub fn advance(&self) -> Option<Self> {
        match self {
            Self::Applied => Some(Self::Screening),
            Self::Screening => Some(Self::Interview),
            Self::Interview => Some(Self::Offered),
            Self::Offered => Some(Self::Hired),
            Self::Hired | Self::Rejected => None,
        }
    }

    pub fn all() -> &'static [CandidateStatus] {
        &[
            Self::Applied,
            Self::Screening,
            Self::Interview,
            Self::Offered,
            Self::Hired,
            Self::Rejected,
        ]
    }
}

impl Candidate {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: RecordId::new_local(),
            name: name.into(),
            email: email.into(),
            phone: None,
            role: role.into(),
            applied_date: Some(chrono::Local::now().date_naive()),
            status: CandidateStatus::default(),
        }
    }
}

impl Record for Candidate {
    type Id = RecordId;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Offline fallback collection when no remote API is configured
impl Stored for Candidate {
    const KEY: &'static str = "hr_board_fake_candidates";
}

impl Searchable for Candidate {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.role.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_advance() {
        let mut status = CandidateStatus::Applied;
        let mut steps = 0;
        while let Some(next) = status.advance() {
            status = next;
            steps += 1;
        }
        assert_eq!(status, CandidateStatus::Hired);
        assert_eq!(steps, 4);
        assert!(CandidateStatus::Rejected.advance().is_none());
    }

    #[test]
    fn test_deserialize_remote_shape() {
        let c: Candidate =
            serde_json::from_str(r#"{"id": 12, "name": "Sam Lee", "status": "interview"}"#).unwrap();
        assert_eq!(c.id, RecordId::Number(12));
        assert_eq!(c.status, CandidateStatus::Interview);
        assert!(c.email.is_empty());
    }
}
