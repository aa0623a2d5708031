use chrono::NaiveDate;
use tracing::info;

use super::{LocalStore, StoreError, StoreExt};
use crate::models::{Department, Employee, EmploymentType, PersonalInfo, ProfessionalInfo, Stored};

/// Write the demo dataset when nothing has been stored yet.
///
/// Only a missing `employees` key counts as empty. A corrupt value is left
/// alone so the caller sees the error instead of losing the data.
pub fn seed_if_empty(store: &dyn LocalStore) -> Result<bool, StoreError> {
    if store.read(Employee::KEY)?.is_some() || store.read(Department::KEY)?.is_some() {
        return Ok(false);
    }

    let departments = vec![
        Department::new("Engineering"),
        Department::new("Design"),
        Department::new("Human Resources"),
        Department::new("Finance"),
    ];

    let people = [
        ("Olivia", "Martin", "Engineering", "Engineering Manager", EmploymentType::FullTime, (2019, 4, 1)),
        ("Liam", "Chen", "Engineering", "Software Engineer", EmploymentType::FullTime, (2021, 9, 13)),
        ("Sofia", "Rossi", "Design", "Product Designer", EmploymentType::FullTime, (2022, 1, 10)),
        ("Noah", "Okafor", "Design", "UX Researcher", EmploymentType::Contract, (2023, 6, 5)),
        ("Emma", "Larsen", "Human Resources", "HR Generalist", EmploymentType::PartTime, (2020, 11, 2)),
        ("Mateo", "Silva", "Finance", "Accountant", EmploymentType::Intern, (2024, 2, 19)),
    ];

    let employees: Vec<Employee> = people
        .iter()
        .enumerate()
        .map(|(i, &(first, last, dept, designation, employment_type, (y, m, d)))| {
            let department_id = departments.iter().find(|x| x.name == dept).map(|x| x.id);
            Employee::new(
                PersonalInfo {
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
                    ..Default::default()
                },
                ProfessionalInfo {
                    employee_code: Some(format!("EMP-{:04}", i + 1)),
                    department_id,
                    designation: designation.to_string(),
                    employment_type,
                    joining_date: NaiveDate::from_ymd_opt(y, m, d),
                    office_location: Some("Head Office".to_string()),
                    ..Default::default()
                },
            )
        })
        .collect();

    store.save(Department::KEY, &departments)?;
    store.save(Employee::KEY, &employees)?;
    info!(
        departments = departments.len(),
        employees = employees.len(),
        "seeded demo data"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{departments, Collection, Database};

    #[test]
    fn test_seed_only_once() {
        let db = Database::open_memory().unwrap();
        assert!(seed_if_empty(&db).unwrap());
        assert!(!seed_if_empty(&db).unwrap());

        let employees = Collection::<Employee>::new(&db).all().unwrap();
        assert_eq!(employees.len(), 6);

        let design = departments::find_by_name(&db, "Design").unwrap().unwrap();
        assert_eq!(departments::members(&employees, design.id).len(), 2);
    }

    #[test]
    fn test_seed_never_replaces_corrupt_data() {
        let db = Database::open_memory().unwrap();
        db.write("employees", "garbage").unwrap();

        assert!(!seed_if_empty(&db).unwrap());
        assert_eq!(db.read("employees").unwrap().as_deref(), Some("garbage"));
    }
}
