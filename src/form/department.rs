use super::{optional, require, EntityForm, FieldError, FormError};
use crate::models::Department;

const MAX_NAME_LEN: usize = 60;

#[derive(Debug, Clone, Default)]
pub struct DepartmentForm {
    pub name: String,
    pub description: String,
}

impl EntityForm for DepartmentForm {
    type Entity = Department;

    const FIELDS: &'static [&'static str] = &["name", "description"];

    fn from_entity(d: &Department) -> Self {
        Self {
            name: d.name.clone(),
            description: d.description.clone().unwrap_or_default(),
        }
    }

    fn get(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(self.name.as_str()),
            "description" => Some(self.description.as_str()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: String) -> bool {
        match field {
            "name" => self.name = value,
            "description" => self.description = value,
            _ => return false,
        }
        true
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if require(&mut errors, "name", &self.name) && self.name.trim().chars().count() > MAX_NAME_LEN {
            errors.push(FieldError::new(
                "name",
                format!("must be at most {} characters", MAX_NAME_LEN),
            ));
        }
        errors
    }

    fn build(&self, existing: Option<&Department>) -> Result<Department, FormError> {
        let mut department = match existing {
            Some(d) => d.clone(),
            None => Department::new(""),
        };
        department.name = self.name.trim().to_string();
        department.description = optional(&self.description);
        Ok(department)
    }
}
