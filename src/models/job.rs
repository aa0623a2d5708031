use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Record, Searchable, Stored};

/// An open position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub location: Option<String>,
    pub salary: f64,
    pub openings: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub bucket: JobBucket,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobBucket {
    #[default]
    Active,
    Inactive,
    Completed,
}

impl JobBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "completed" | "closed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn all() -> &'static [JobBucket] {
        &[Self::Active, Self::Inactive, Self::Completed]
    }
}

impl Job {
    pub fn new(title: impl Into<String>, salary: f64, openings: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            department_id: None,
            location: None,
            salary,
            openings,
            tags: Vec::new(),
            bucket: JobBucket::default(),
            created_at: Utc::now(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Split a comma separated tag list, dropping blanks and duplicates
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            tags.push(tag.to_string());
        }
    }
    tags
}

impl Record for Job {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }
}

impl Stored for Job {
    const KEY: &'static str = "jobs";
}

impl Searchable for Job {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        if let Some(ref loc) = self.location {
            fields.push(loc.as_str());
        }
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("rust, Remote,,rust , senior"), vec!["rust", "Remote", "senior"]);
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn test_has_tag_case_insensitive() {
        let mut job = Job::new("Backend Engineer", 90000.0, 2);
        job.tags = parse_tags("Rust,remote");
        assert!(job.has_tag("rust"));
        assert!(!job.has_tag("go"));
    }
}
