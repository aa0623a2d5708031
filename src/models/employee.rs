use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Record, Searchable, Stored};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub personal_info: PersonalInfo,
    pub professional_info: ProfessionalInfo,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub account_access: AccountAccess,
    #[serde(default)]
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub nationality: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfessionalInfo {
    pub employee_code: Option<String>,
    /// Stable reference into the `departments` collection
    pub department_id: Option<Uuid>,
    pub designation: String,
    pub employment_type: EmploymentType,
    pub joining_date: Option<NaiveDate>,
    pub office_location: Option<String>,
    pub username: Option<String>,
    pub working_days: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountAccess {
    pub email: Option<String>,
    pub slack_id: Option<String>,
    pub skype_id: Option<String>,
    pub github_id: Option<String>,
}

/// An uploaded file embedded in the employee record as a data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub title: String,
    pub file_name: String,
    pub data_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Intern,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTime => "full_time",
            Self::PartTime => "part_time",
            Self::Contract => "contract",
            Self::Intern => "intern",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FullTime => "Full-time",
            Self::PartTime => "Part-time",
            Self::Contract => "Contract",
            Self::Intern => "Intern",
        }
    }

    /// Accepts the stored form as well as the label ("full-time", "Full Time")
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "full_time" | "fulltime" => Some(Self::FullTime),
            "part_time" | "parttime" => Some(Self::PartTime),
            "contract" => Some(Self::Contract),
            "intern" => Some(Self::Intern),
            _ => None,
        }
    }

    pub fn all() -> &'static [EmploymentType] {
        &[Self::FullTime, Self::PartTime, Self::Contract, Self::Intern]
    }
}

impl Employee {
    pub fn new(personal_info: PersonalInfo, professional_info: ProfessionalInfo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            personal_info,
            professional_info,
            documents: Vec::new(),
            account_access: AccountAccess::default(),
            status: EmployeeStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn display_name(&self) -> String {
        let first = self.personal_info.first_name.trim();
        let last = self.personal_info.last_name.trim();
        match (first.is_empty(), last.is_empty()) {
            (false, false) => format!("{} {}", first, last),
            (false, true) => first.to_string(),
            (true, false) => last.to_string(),
            (true, true) => "(unnamed)".to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

impl Record for Employee {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }
}

impl Stored for Employee {
    const KEY: &'static str = "employees";
}

impl Searchable for Employee {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.personal_info.first_name.as_str(),
            self.personal_info.last_name.as_str(),
            self.personal_info.email.as_str(),
            self.professional_info.designation.as_str(),
        ];
        if let Some(ref code) = self.professional_info.employee_code {
            fields.push(code.as_str());
        }
        fields
    }
}

impl Document {
    /// Encode raw file contents as a `data:` URL
    pub fn from_bytes(title: impl Into<String>, file_name: impl Into<String>, bytes: &[u8]) -> Self {
        let file_name = file_name.into();
        let data_url = format!("data:{};base64,{}", mime_for(&file_name), STANDARD.encode(bytes));
        Self {
            title: title.into(),
            file_name,
            data_url,
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
    }

    /// Decode the embedded payload. Returns None for malformed data URLs.
    pub fn decode(&self) -> Option<Vec<u8>> {
        let (_, payload) = self.data_url.split_once(";base64,")?;
        STANDARD.decode(payload).ok()
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Employee {
        Employee::new(
            PersonalInfo {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: "jane@example.com".to_string(),
                ..Default::default()
            },
            ProfessionalInfo {
                designation: "Software Engineer".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_display_name() {
        let mut e = jane();
        assert_eq!(e.display_name(), "Jane Doe");
        e.personal_info.last_name.clear();
        assert_eq!(e.display_name(), "Jane");
        e.personal_info.first_name.clear();
        assert_eq!(e.display_name(), "(unnamed)");
    }

    #[test]
    fn test_serializes_camel_case_sections() {
        let json = serde_json::to_value(jane()).unwrap();
        assert!(json.get("personalInfo").is_some());
        assert_eq!(json["professionalInfo"]["employmentType"], "full_time");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_missing_optional_sections_default() {
        let json = format!(
            r#"{{"id":"{}","personalInfo":{{"firstName":"Old"}},"professionalInfo":{{}},
            "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}}"#,
            Uuid::new_v4()
        );
        let e: Employee = serde_json::from_str(&json).unwrap();
        assert_eq!(e.personal_info.first_name, "Old");
        assert!(e.documents.is_empty());
        assert_eq!(e.status, EmployeeStatus::Active);
    }

    #[test]
    fn test_employment_type_parse() {
        assert_eq!(EmploymentType::parse("Full-time"), Some(EmploymentType::FullTime));
        assert_eq!(EmploymentType::parse("part time"), Some(EmploymentType::PartTime));
        assert_eq!(EmploymentType::parse("freelance"), None);
    }

    #[test]
    fn test_document_data_url() {
        let doc = Document::from_bytes("Offer letter", "offer.pdf", b"%PDF-1.4");
        assert!(doc.data_url.starts_with("data:application/pdf;base64,"));
        assert_eq!(doc.mime_type(), Some("application/pdf"));
        assert_eq!(doc.decode().unwrap(), b"%PDF-1.4");

        let broken = Document {
            title: "x".to_string(),
            file_name: "x".to_string(),
            data_url: "not a data url".to_string(),
        };
        assert!(broken.decode().is_none());
    }
}
