use chrono::Utc;
use uuid::Uuid;

use super::{
    check_department_link, check_email, check_optional_date, invalid, optional, parse_date, require, EntityForm,
    FieldError, FormController, FormError,
};
use crate::db::{LocalStore, StoreError};
use crate::models::{
    AccountAccess, Document, Employee, EmployeeStatus, EmploymentType, PersonalInfo, ProfessionalInfo,
};
use crate::source::RecordSource;

/// Raw input for the four-step employee wizard
#[derive(Debug, Clone, Default)]
pub struct EmployeeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: String,
    pub marital_status: String,
    pub nationality: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,

    pub employee_code: String,
    pub department_id: String,
    pub designation: String,
    pub employment_type: String,
    pub joining_date: String,
    pub office_location: String,
    pub username: String,
    pub working_days: String,
    pub status: String,

    pub documents: Vec<Document>,

    pub account_email: String,
    pub slack_id: String,
    pub skype_id: String,
    pub github_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeStep {
    Personal,
    Professional,
    Documents,
    Account,
}

impl EmployeeStep {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Personal => "Personal Information",
            Self::Professional => "Professional Information",
            Self::Documents => "Documents",
            Self::Account => "Account Access",
        }
    }

    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Personal => &[
                "first_name",
                "last_name",
                "email",
                "phone",
                "date_of_birth",
                "gender",
                "marital_status",
                "nationality",
                "address",
                "city",
                "state",
                "zip_code",
            ],
            Self::Professional => &[
                "employee_code",
                "department_id",
                "designation",
                "employment_type",
                "joining_date",
                "office_location",
                "username",
                "working_days",
                "status",
            ],
            Self::Documents => &[],
            Self::Account => &["account_email", "slack_id", "skype_id", "github_id"],
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Personal => Some(Self::Professional),
            Self::Professional => Some(Self::Documents),
            Self::Documents => Some(Self::Account),
            Self::Account => None,
        }
    }

    pub fn prev(&self) -> Option<Self> {
        match self {
            Self::Personal => None,
            Self::Professional => Some(Self::Personal),
            Self::Documents => Some(Self::Professional),
            Self::Account => Some(Self::Documents),
        }
    }

    pub fn all() -> &'static [EmployeeStep] {
        &[Self::Personal, Self::Professional, Self::Documents, Self::Account]
    }
}

impl EmployeeForm {
    pub fn validate_step(&self, step: EmployeeStep) -> Vec<FieldError> {
        let mut errors = Vec::new();
        match step {
            EmployeeStep::Personal => {
                require(&mut errors, "first_name", &self.first_name);
                require(&mut errors, "last_name", &self.last_name);
                if require(&mut errors, "email", &self.email) {
                    check_email(&mut errors, "email", &self.email);
                }
                check_optional_date(&mut errors, "date_of_birth", &self.date_of_birth);
            }
            EmployeeStep::Professional => {
                require(&mut errors, "designation", &self.designation);
                if !self.department_id.trim().is_empty() && Uuid::parse_str(self.department_id.trim()).is_err() {
                    errors.push(FieldError::new("department_id", "is not a department id"));
                }
                if !self.employment_type.trim().is_empty() && EmploymentType::parse(&self.employment_type).is_none()
                {
                    errors.push(FieldError::new(
                        "employment_type",
                        "must be full-time, part-time, contract or intern",
                    ));
                }
                check_optional_date(&mut errors, "joining_date", &self.joining_date);
                if !self.status.trim().is_empty() && EmployeeStatus::parse(&self.status).is_none() {
                    errors.push(FieldError::new("status", "must be active or inactive"));
                }
            }
            EmployeeStep::Documents => {
                if self.documents.iter().any(|d| d.title.trim().is_empty()) {
                    errors.push(FieldError::new("documents", "every document needs a title"));
                }
            }
            EmployeeStep::Account => {
                check_email(&mut errors, "account_email", &self.account_email);
            }
        }
        errors
    }
}

impl EntityForm for EmployeeForm {
    type Entity = Employee;

    const FIELDS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "email",
        "phone",
        "date_of_birth",
        "gender",
        "marital_status",
        "nationality",
        "address",
        "city",
        "state",
        "zip_code",
        "employee_code",
        "department_id",
        "designation",
        "employment_type",
        "joining_date",
        "office_location",
        "username",
        "working_days",
        "status",
        "account_email",
        "slack_id",
        "skype_id",
        "github_id",
    ];

    fn from_entity(e: &Employee) -> Self {
        let p = &e.personal_info;
        let w = &e.professional_info;
        let a = &e.account_access;
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            email: p.email.clone(),
            phone: text(&p.phone),
            date_of_birth: p.date_of_birth.map(|d| d.to_string()).unwrap_or_default(),
            gender: text(&p.gender),
            marital_status: text(&p.marital_status),
            nationality: text(&p.nationality),
            address: text(&p.address),
            city: text(&p.city),
            state: text(&p.state),
            zip_code: text(&p.zip_code),
            employee_code: text(&w.employee_code),
            department_id: w.department_id.map(|id| id.to_string()).unwrap_or_default(),
            designation: w.designation.clone(),
            employment_type: w.employment_type.as_str().to_string(),
            joining_date: w.joining_date.map(|d| d.to_string()).unwrap_or_default(),
            office_location: text(&w.office_location),
            username: text(&w.username),
            working_days: text(&w.working_days),
            status: e.status.as_str().to_string(),
            documents: e.documents.clone(),
            account_email: text(&a.email),
            slack_id: text(&a.slack_id),
            skype_id: text(&a.skype_id),
            github_id: text(&a.github_id),
        }
    }

    fn get(&self, field: &str) -> Option<&str> {
        Some(match field {
            "first_name" => self.first_name.as_str(),
            "last_name" => self.last_name.as_str(),
            "email" => self.email.as_str(),
            "phone" => self.phone.as_str(),
            "date_of_birth" => self.date_of_birth.as_str(),
            "gender" => self.gender.as_str(),
            "marital_status" => self.marital_status.as_str(),
            "nationality" => self.nationality.as_str(),
            "address" => self.address.as_str(),
            "city" => self.city.as_str(),
            "state" => self.state.as_str(),
            "zip_code" => self.zip_code.as_str(),
            "employee_code" => self.employee_code.as_str(),
            "department_id" => self.department_id.as_str(),
            "designation" => self.designation.as_str(),
            "employment_type" => self.employment_type.as_str(),
            "joining_date" => self.joining_date.as_str(),
            "office_location" => self.office_location.as_str(),
            "username" => self.username.as_str(),
            "working_days" => self.working_days.as_str(),
            "status" => self.status.as_str(),
            "account_email" => self.account_email.as_str(),
            "slack_id" => self.slack_id.as_str(),
            "skype_id" => self.skype_id.as_str(),
            "github_id" => self.github_id.as_str(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "first_name" => &mut self.first_name,
            "last_name" => &mut self.last_name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "date_of_birth" => &mut self.date_of_birth,
            "gender" => &mut self.gender,
            "marital_status" => &mut self.marital_status,
            "nationality" => &mut self.nationality,
            "address" => &mut self.address,
            "city" => &mut self.city,
            "state" => &mut self.state,
            "zip_code" => &mut self.zip_code,
            "employee_code" => &mut self.employee_code,
            "department_id" => &mut self.department_id,
            "designation" => &mut self.designation,
            "employment_type" => &mut self.employment_type,
            "joining_date" => &mut self.joining_date,
            "office_location" => &mut self.office_location,
            "username" => &mut self.username,
            "working_days" => &mut self.working_days,
            "status" => &mut self.status,
            "account_email" => &mut self.account_email,
            "slack_id" => &mut self.slack_id,
            "skype_id" => &mut self.skype_id,
            "github_id" => &mut self.github_id,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn validate(&self) -> Vec<FieldError> {
        EmployeeStep::all()
            .iter()
            .flat_map(|step| self.validate_step(*step))
            .collect()
    }

    fn check_links(&self, store: &dyn LocalStore) -> Result<Vec<FieldError>, StoreError> {
        let mut errors = Vec::new();
        check_department_link(store, &mut errors, "department_id", &self.department_id)?;
        Ok(errors)
    }

    fn build(&self, existing: Option<&Employee>) -> Result<Employee, FormError> {
        let department_id = match optional(&self.department_id) {
            Some(id) => Some(Uuid::parse_str(&id).map_err(|_| invalid("department_id", "is not a department id"))?),
            None => None,
        };

        let personal_info = PersonalInfo {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: optional(&self.phone),
            date_of_birth: parse_date(&self.date_of_birth),
            gender: optional(&self.gender),
            marital_status: optional(&self.marital_status),
            nationality: optional(&self.nationality),
            address: optional(&self.address),
            city: optional(&self.city),
            state: optional(&self.state),
            zip_code: optional(&self.zip_code),
        };
        let professional_info = ProfessionalInfo {
            employee_code: optional(&self.employee_code),
            department_id,
            designation: self.designation.trim().to_string(),
            employment_type: EmploymentType::parse(&self.employment_type).unwrap_or_default(),
            joining_date: parse_date(&self.joining_date),
            office_location: optional(&self.office_location),
            username: optional(&self.username),
            working_days: optional(&self.working_days),
        };

        let mut employee = match existing {
            Some(e) => e.clone(),
            None => Employee::new(PersonalInfo::default(), ProfessionalInfo::default()),
        };
        employee.personal_info = personal_info;
        employee.professional_info = professional_info;
        employee.documents = self.documents.clone();
        employee.account_access = AccountAccess {
            email: optional(&self.account_email),
            slack_id: optional(&self.slack_id),
            skype_id: optional(&self.skype_id),
            github_id: optional(&self.github_id),
        };
        if let Some(status) = EmployeeStatus::parse(&self.status) {
            employee.status = status;
        }
        employee.updated_at = Utc::now();
        Ok(employee)
    }
}

/// Step-by-step employee entry.
///
/// Moving forward checks only the current step's fields; moving back never
/// validates. Submit validates the whole form.
pub struct EmployeeWizard {
    controller: FormController<EmployeeForm>,
    step: EmployeeStep,
    step_errors: Vec<FieldError>,
}

impl Default for EmployeeWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl EmployeeWizard {
    pub fn new() -> Self {
        Self {
            controller: FormController::new(),
            step: EmployeeStep::Personal,
            step_errors: Vec::new(),
        }
    }

    pub fn for_edit(employee: &Employee) -> Self {
        let mut wizard = Self::new();
        wizard.controller.open_for_edit(employee);
        wizard
    }

    pub fn step(&self) -> EmployeeStep {
        self.step
    }

    pub fn is_editing(&self) -> bool {
        self.controller.is_editing()
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.controller.value(field)
    }

    pub fn documents(&self) -> &[Document] {
        &self.controller.form().documents
    }

    pub fn handle_change(&mut self, field: &str, value: impl Into<String>) -> Result<(), FormError> {
        self.controller.handle_change(field, value)?;
        self.step_errors.retain(|e| e.field != field);
        Ok(())
    }

    pub fn attach_document(&mut self, document: Document) {
        self.controller.form_mut().documents.push(document);
    }

    pub fn remove_document(&mut self, index: usize) -> Option<Document> {
        let documents = &mut self.controller.form_mut().documents;
        if index < documents.len() {
            Some(documents.remove(index))
        } else {
            None
        }
    }

    pub fn step_errors(&self) -> &[FieldError] {
        &self.step_errors
    }

    /// Advance if the current step is valid. Returns the new step, or the
    /// current one when already on the last step.
    pub fn next(&mut self) -> Result<EmployeeStep, FormError> {
        self.step_errors = self.controller.form().validate_step(self.step);
        if !self.step_errors.is_empty() {
            return Err(FormError::Invalid(self.step_errors.clone()));
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> EmployeeStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step_errors.clear();
        self.step
    }

    pub fn submit(&mut self, source: &dyn RecordSource<Employee>) -> anyhow::Result<Employee> {
        let saved = self.controller.submit(source)?;
        self.step = EmployeeStep::Personal;
        self.step_errors.clear();
        Ok(saved)
    }

    /// Errors from the last full validation
    pub fn errors(&self) -> &[FieldError] {
        self.controller.errors()
    }
}
