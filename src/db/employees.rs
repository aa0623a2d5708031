use std::io::Write;
use uuid::Uuid;

use super::{departments, Collection, LocalStore, StoreError};
use crate::models::{Department, Employee};

/// Find employees by UUID, employee code, or name words.
///
/// A UUID or exact code returns at most one match; otherwise every employee
/// whose name contains all the words (case-insensitive) is returned.
pub fn find_by_identifier(store: &dyn LocalStore, identifier: &str) -> Result<Vec<Employee>, StoreError> {
    let identifier = identifier.trim();
    let employees = Collection::<Employee>::new(store).all()?;

    if let Ok(id) = Uuid::parse_str(identifier) {
        return Ok(employees.into_iter().filter(|e| e.id == id).collect());
    }

    if let Some(by_code) = employees.iter().find(|e| {
        e.professional_info
            .employee_code
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(identifier))
    }) {
        return Ok(vec![by_code.clone()]);
    }

    let words: Vec<String> = identifier
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    if words.is_empty() {
        return Ok(Vec::new());
    }

    Ok(employees
        .into_iter()
        .filter(|e| {
            let name = e.display_name().to_lowercase();
            words.iter().all(|w| name.contains(w.as_str()))
        })
        .collect())
}

/// Next free code of the form `EMP-0001`
pub fn next_employee_code(employees: &[Employee]) -> String {
    let highest = employees
        .iter()
        .filter_map(|e| e.professional_info.employee_code.as_deref())
        .filter_map(|c| c.strip_prefix("EMP-"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("EMP-{:04}", highest + 1)
}

/// Write employees as CSV with department names resolved
pub fn write_csv<W: Write>(
    writer: W,
    employees: &[Employee],
    departments: &[Department],
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "id",
        "code",
        "first_name",
        "last_name",
        "email",
        "phone",
        "department",
        "designation",
        "employment_type",
        "joining_date",
        "status",
    ])?;

    for e in employees {
        let p = &e.personal_info;
        let w = &e.professional_info;
        wtr.write_record([
            e.id.to_string().as_str(),
            w.employee_code.as_deref().unwrap_or(""),
            p.first_name.as_str(),
            p.last_name.as_str(),
            p.email.as_str(),
            p.phone.as_deref().unwrap_or(""),
            departments::name_of(departments, w.department_id),
            w.designation.as_str(),
            w.employment_type.as_str(),
            w.joining_date.map(|d| d.to_string()).unwrap_or_default().as_str(),
            e.status.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{PersonalInfo, ProfessionalInfo};

    fn add(db: &Database, first: &str, last: &str, code: Option<&str>) -> Employee {
        let e = Employee::new(
            PersonalInfo {
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: format!("{}@example.com", first.to_lowercase()),
                ..Default::default()
            },
            ProfessionalInfo {
                employee_code: code.map(str::to_string),
                designation: "Engineer".to_string(),
                ..Default::default()
            },
        );
        Collection::new(db).insert(e).unwrap()
    }

    #[test]
    fn test_find_by_identifier() {
        let db = Database::open_memory().unwrap();
        let jane = add(&db, "Jane", "Doe", Some("EMP-0001"));
        add(&db, "John", "Doe", Some("EMP-0002"));
        add(&db, "Janet", "Smith", None);

        assert_eq!(find_by_identifier(&db, &jane.id.to_string()).unwrap().len(), 1);
        assert_eq!(find_by_identifier(&db, "emp-0002").unwrap()[0].personal_info.first_name, "John");
        assert_eq!(find_by_identifier(&db, "doe").unwrap().len(), 2);
        assert_eq!(find_by_identifier(&db, "jan").unwrap().len(), 2);
        assert_eq!(find_by_identifier(&db, "jane doe").unwrap().len(), 1);
        assert!(find_by_identifier(&db, "   ").unwrap().is_empty());
        assert!(find_by_identifier(&db, &Uuid::new_v4().to_string()).unwrap().is_empty());
    }

    #[test]
    fn test_next_employee_code() {
        let db = Database::open_memory().unwrap();
        assert_eq!(next_employee_code(&[]), "EMP-0001");
        add(&db, "A", "A", Some("EMP-0007"));
        add(&db, "B", "B", Some("CONTRACTOR-1"));
        let all = Collection::<Employee>::new(&db).all().unwrap();
        assert_eq!(next_employee_code(&all), "EMP-0008");
    }

    #[test]
    fn test_write_csv() {
        let db = Database::open_memory().unwrap();
        let jane = add(&db, "Jane", "Doe", Some("EMP-0001"));
        let mut buf = Vec::new();
        write_csv(&mut buf, &[jane], &[]).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("id,code,first_name"));
        let row = lines.next().unwrap();
        assert!(row.contains(",EMP-0001,Jane,Doe,jane@example.com,,-,Engineer,full_time,,active"));
    }
}
