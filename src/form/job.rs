use uuid::Uuid;

use super::{
    check_department_link, check_positive_integer, check_positive_number, invalid, optional, require,
    EntityForm, FieldError, FormError,
};
use crate::db::{LocalStore, StoreError};
use crate::models::{parse_tags, Job, JobBucket};

#[derive(Debug, Clone, Default)]
pub struct JobForm {
    pub title: String,
    pub department_id: String,
    pub location: String,
    pub salary: String,
    pub openings: String,
    pub tags: String,
    pub bucket: String,
}

impl EntityForm for JobForm {
    type Entity = Job;

    const FIELDS: &'static [&'static str] = &[
        "title",
        "department_id",
        "location",
        "salary",
        "openings",
        "tags",
        "bucket",
    ];

    fn from_entity(job: &Job) -> Self {
        Self {
            title: job.title.clone(),
            department_id: job.department_id.map(|id| id.to_string()).unwrap_or_default(),
            location: job.location.clone().unwrap_or_default(),
            salary: job.salary.to_string(),
            openings: job.openings.to_string(),
            tags: job.tags.join(", "),
            bucket: job.bucket.as_str().to_string(),
        }
    }

    fn get(&self, field: &str) -> Option<&str> {
        Some(match field {
            "title" => self.title.as_str(),
            "department_id" => self.department_id.as_str(),
            "location" => self.location.as_str(),
            "salary" => self.salary.as_str(),
            "openings" => self.openings.as_str(),
            "tags" => self.tags.as_str(),
            "bucket" => self.bucket.as_str(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "title" => &mut self.title,
            "department_id" => &mut self.department_id,
            "location" => &mut self.location,
            "salary" => &mut self.salary,
            "openings" => &mut self.openings,
            "tags" => &mut self.tags,
            "bucket" => &mut self.bucket,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require(&mut errors, "title", &self.title);
        check_positive_number(&mut errors, "salary", &self.salary);
        check_positive_integer(&mut errors, "openings", &self.openings);
        if !self.department_id.trim().is_empty() && Uuid::parse_str(self.department_id.trim()).is_err() {
            errors.push(FieldError::new("department_id", "is not a department id"));
        }
        if !self.bucket.trim().is_empty() && JobBucket::parse(&self.bucket).is_none() {
            errors.push(FieldError::new("bucket", "must be active, inactive or completed"));
        }
        errors
    }

    fn check_links(&self, store: &dyn LocalStore) -> Result<Vec<FieldError>, StoreError> {
        let mut errors = Vec::new();
        check_department_link(store, &mut errors, "department_id", &self.department_id)?;
        Ok(errors)
    }

    fn build(&self, existing: Option<&Job>) -> Result<Job, FormError> {
        let salary = self
            .salary
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid("salary", "must be a positive number"))?;
        let openings = self
            .openings
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid("openings", "must be a positive whole number"))?;

        let mut job = match existing {
            Some(j) => j.clone(),
            None => Job::new("", salary, openings),
        };
        job.title = self.title.trim().to_string();
        job.department_id = optional(&self.department_id).and_then(|s| Uuid::parse_str(&s).ok());
        job.location = optional(&self.location);
        job.salary = salary;
        job.openings = openings;
        job.tags = parse_tags(&self.tags);
        if let Some(bucket) = JobBucket::parse(&self.bucket) {
            job.bucket = bucket;
        }
        Ok(job)
    }
}
