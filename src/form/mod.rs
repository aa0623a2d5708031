//! Controlled form state for creating and editing records.
//!
//! A form holds raw string inputs, the way a user typed them. Nothing is
//! parsed until validation or submit, so a half-filled form never loses
//! input because one field is malformed.

use chrono::NaiveDate;
use uuid::Uuid;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::db::{Collection, LocalStore, StoreError};
use crate::models::{Department, Employee, Record};
use crate::source::RecordSource;

mod candidate;
mod department;
mod employee;
mod job;
mod leave;
mod payroll;

pub use candidate::CandidateForm;
pub use department::DepartmentForm;
pub use employee::{EmployeeForm, EmployeeStep, EmployeeWizard};
pub use job::JobForm;
pub use leave::LeaveForm;
pub use payroll::PayrollForm;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("{}", join_errors(.0))]
    Invalid(Vec<FieldError>),
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The field set of one entity form
pub trait EntityForm: Default {
    type Entity: Record;

    /// Editable text fields in prompt order
    const FIELDS: &'static [&'static str];

    fn from_entity(entity: &Self::Entity) -> Self;

    /// Current raw value, None for an unknown field
    fn get(&self, field: &str) -> Option<&str>;

    /// Store a raw value; false for an unknown field
    fn set(&mut self, field: &str, value: String) -> bool;

    fn validate(&self) -> Vec<FieldError>;

    /// Build the record. `existing` is the record being edited, if any;
    /// its id and anything the form does not cover are kept.
    fn build(&self, existing: Option<&Self::Entity>) -> Result<Self::Entity, FormError>;

    /// Fields that point at stored records which do not exist
    fn check_links(&self, _store: &dyn LocalStore) -> Result<Vec<FieldError>, StoreError> {
        Ok(Vec::new())
    }
}

pub struct FormController<F: EntityForm> {
    form: F,
    editing: Option<F::Entity>,
    errors: Vec<FieldError>,
}

impl<F: EntityForm> Default for FormController<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: EntityForm> FormController<F> {
    pub fn new() -> Self {
        Self {
            form: F::default(),
            editing: None,
            errors: Vec::new(),
        }
    }

    pub fn open_for_create(&mut self) {
        self.form = F::default();
        self.editing = None;
        self.errors.clear();
    }

    pub fn open_for_edit(&mut self, entity: &F::Entity) {
        self.form = F::from_entity(entity);
        self.editing = Some(entity.clone());
        self.errors.clear();
    }

    /// Update one field and drop any error previously reported for it
    pub fn handle_change(&mut self, field: &str, value: impl Into<String>) -> Result<(), FormError> {
        if !self.form.set(field, value.into()) {
            return Err(FormError::UnknownField(field.to_string()));
        }
        self.errors.retain(|e| e.field != field);
        Ok(())
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.form.get(field)
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn edit_target(&self) -> Option<&<F::Entity as Record>::Id> {
        self.editing.as_ref().map(Record::id)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Re-run validation, keeping the result for `errors()`
    pub fn validate(&mut self) -> bool {
        self.errors = self.form.validate();
        self.errors.is_empty()
    }

    /// Validated record ready to send, without persisting it
    pub fn payload(&mut self) -> Result<F::Entity, FormError> {
        if !self.validate() {
            return Err(FormError::Invalid(self.errors.clone()));
        }
        self.form.build(self.editing.as_ref())
    }

    /// Validate, then create or update through `source` depending on whether
    /// an edit target is set. Saving to a local collection also checks that
    /// linked records exist. The form resets only after a successful save.
    pub fn submit(&mut self, source: &dyn RecordSource<F::Entity>) -> anyhow::Result<F::Entity> {
        let record = self.payload()?;
        if let Some(store) = source.local_store() {
            let broken = self.form.check_links(store)?;
            if !broken.is_empty() {
                self.errors = broken.clone();
                return Err(FormError::Invalid(broken).into());
            }
        }
        let saved = if self.is_editing() {
            debug!(id = %record.id(), "updating record");
            source.update(record)?
        } else {
            debug!(id = %record.id(), "creating record");
            source.create(record)?
        };
        self.open_for_create();
        Ok(saved)
    }
}

/// Trimmed value, None when blank
pub(crate) fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub(crate) fn require(errors: &mut Vec<FieldError>, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "is required"));
        false
    } else {
        true
    }
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Blank is fine; anything else must be a YYYY-MM-DD date
pub(crate) fn check_optional_date(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if !value.trim().is_empty() && parse_date(value).is_none() {
        errors.push(FieldError::new(field, "must be a date like 2024-01-31"));
    }
}

pub(crate) fn check_positive_number(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if !require(errors, field, value) {
        return;
    }
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => {}
        _ => errors.push(FieldError::new(field, "must be a positive number")),
    }
}

pub(crate) fn check_positive_integer(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if !require(errors, field, value) {
        return;
    }
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => {}
        _ => errors.push(FieldError::new(field, "must be a positive whole number")),
    }
}

pub(crate) fn check_email(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if !value.trim().is_empty() && !is_valid_email(value.trim()) {
        errors.push(FieldError::new(field, "is not a valid email address"));
    }
}

/// Blank is fine; a department id must name a stored department
pub(crate) fn check_department_link(
    store: &dyn LocalStore,
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
) -> Result<(), StoreError> {
    if let Some(id) = optional(value).and_then(|v| Uuid::parse_str(&v).ok()) {
        if Collection::<Department>::new(store).find(&id)?.is_none() {
            errors.push(FieldError::new(field, "is not a known department"));
        }
    }
    Ok(())
}

pub(crate) fn check_employee_link(
    store: &dyn LocalStore,
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
) -> Result<(), StoreError> {
    if let Some(id) = optional(value).and_then(|v| Uuid::parse_str(&v).ok()) {
        if Collection::<Employee>::new(store).find(&id)?.is_none() {
            errors.push(FieldError::new(field, "is not a known employee"));
        }
    }
    Ok(())
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    let (local, domain) = (parts[0], parts[1]);
    !local.is_empty() && !domain.is_empty() && domain.contains('.')
}

fn invalid(field: &'static str, message: &str) -> FormError {
    FormError::Invalid(vec![FieldError::new(field, message)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Collection, Database};
    use crate::models::Department;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("user.name@domain.co.uk"));
        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("@domain.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@domain"));
    }

    #[test]
    fn test_unknown_field() {
        let mut form = FormController::<DepartmentForm>::new();
        assert!(matches!(
            form.handle_change("budget", "10"),
            Err(FormError::UnknownField(f)) if f == "budget"
        ));
    }

    #[test]
    fn test_invalid_submit_keeps_input() {
        let db = Database::open_memory().unwrap();
        let departments = Collection::<Department>::new(&db);
        let mut form = FormController::<DepartmentForm>::new();
        form.handle_change("description", "Keeps the lights on").unwrap();

        let err = form.submit(&departments).unwrap_err();
        assert!(err.to_string().contains("name: is required"));
        assert_eq!(form.value("description"), Some("Keeps the lights on"));
        assert_eq!(form.errors().len(), 1);
        assert!(departments.all().unwrap().is_empty());

        // Fixing the field clears its error
        form.handle_change("name", "Facilities").unwrap();
        assert!(form.errors().is_empty());
        let saved = form.submit(&departments).unwrap();
        assert_eq!(saved.name, "Facilities");
        assert_eq!(form.value("name"), Some(""), "form resets after save");
    }

    #[test]
    fn test_submit_updates_when_editing() {
        let db = Database::open_memory().unwrap();
        let departments = Collection::<Department>::new(&db);
        let original = departments.insert(Department::new("Legal")).unwrap();

        let mut form = FormController::<DepartmentForm>::new();
        form.open_for_edit(&original);
        assert_eq!(form.edit_target(), Some(&original.id));
        assert_eq!(form.value("name"), Some("Legal"));

        form.handle_change("name", "Legal & Compliance").unwrap();
        let saved = form.submit(&departments).unwrap();
        assert_eq!(saved.id, original.id);
        assert_eq!(saved.created_at, original.created_at);

        let all = departments.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Legal & Compliance");
        assert!(!form.is_editing());
    }

    #[test]
    fn test_submit_edit_of_deleted_record_fails() {
        let db = Database::open_memory().unwrap();
        let departments = Collection::<Department>::new(&db);
        let gone = departments.insert(Department::new("Temp")).unwrap();

        let mut form = FormController::<DepartmentForm>::new();
        form.open_for_edit(&gone);
        departments.delete(&gone.id).unwrap();

        let err = form.submit(&departments).unwrap_err();
        assert!(err.to_string().contains("no record with id"));
        assert!(form.is_editing(), "failed save keeps the form open");
    }

    #[test]
    fn test_field_helpers() {
        let mut errors = Vec::new();
        check_positive_number(&mut errors, "salary", "-5");
        check_positive_number(&mut errors, "salary", "abc");
        check_positive_number(&mut errors, "salary", "1200.50");
        check_positive_integer(&mut errors, "openings", "0");
        check_positive_integer(&mut errors, "openings", "3");
        check_optional_date(&mut errors, "date", "");
        check_optional_date(&mut errors, "date", "31/01/2024");
        assert_eq!(errors.len(), 4);
        assert_eq!(optional("  x "), Some("x".to_string()));
        assert_eq!(optional("   "), None);
    }
}
