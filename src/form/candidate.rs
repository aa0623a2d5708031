use super::{
    check_email, check_optional_date, optional, parse_date, require, EntityForm, FieldError, FormError,
};
use crate::models::{Candidate, CandidateStatus, RecordId};

#[derive(Debug, Clone, Default)]
pub struct CandidateForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub applied_date: String,
    pub status: String,
}

impl EntityForm for CandidateForm {
    type Entity = Candidate;

    const FIELDS: &'static [&'static str] =
        &["name", "email", "phone", "role", "applied_date", "status"];

    fn from_entity(c: &Candidate) -> Self {
        Self {
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone().unwrap_or_default(),
            role: c.role.clone(),
            applied_date: c.applied_date.map(|d| d.to_string()).unwrap_or_default(),
            status: c.status.as_str().to_string(),
        }
    }

    fn get(&self, field: &str) -> Option<&str> {
        Some(match field {
            "name" => self.name.as_str(),
            "email" => self.email.as_str(),
            "phone" => self.phone.as_str(),
            "role" => self.role.as_str(),
            "applied_date" => self.applied_date.as_str(),
            "status" => self.status.as_str(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "role" => &mut self.role,
            "applied_date" => &mut self.applied_date,
            "status" => &mut self.status,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require(&mut errors, "name", &self.name);
        if require(&mut errors, "email", &self.email) {
            check_email(&mut errors, "email", &self.email);
        }
        require(&mut errors, "role", &self.role);
        check_optional_date(&mut errors, "applied_date", &self.applied_date);
        if !self.status.trim().is_empty() && CandidateStatus::parse(&self.status).is_none() {
            errors.push(FieldError::new("status", "is not a pipeline stage"));
        }
        errors
    }

    fn build(&self, existing: Option<&Candidate>) -> Result<Candidate, FormError> {
        let mut candidate = match existing {
            Some(c) => c.clone(),
            None => Candidate::new("", "", ""),
        };
        candidate.id = existing.map(|c| c.id.clone()).unwrap_or_else(RecordId::new_local);
        candidate.name = self.name.trim().to_string();
        candidate.email = self.email.trim().to_string();
        candidate.phone = optional(&self.phone);
        candidate.role = self.role.trim().to_string();
        if let Some(date) = parse_date(&self.applied_date) {
            candidate.applied_date = Some(date);
        }
        if let Some(status) = CandidateStatus::parse(&self.status) {
            candidate.status = status;
        }
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Collection, Database};
    use crate::form::FormController;

    #[test]
    fn test_candidate_into_fallback_collection() {
        let db = Database::open_memory().unwrap();
        let candidates = Collection::<Candidate>::new(&db);

        let mut form = FormController::<CandidateForm>::new();
        form.handle_change("name", "Tomás Ruiz").unwrap();
        form.handle_change("email", "tomas@example").unwrap();
        form.handle_change("role", "Recruiter").unwrap();
        assert!(form.submit(&candidates).is_err());

        form.handle_change("email", "tomas@example.com").unwrap();
        let saved = form.submit(&candidates).unwrap();
        assert_eq!(saved.status, CandidateStatus::Applied);
        assert!(saved.applied_date.is_some());
        assert_eq!(candidates.get(&saved.id).unwrap().name, "Tomás Ruiz");
    }
}
