use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Collection, LocalStore, StoreError, StoreExt};
use crate::models::{Department, Employee, Stored};

/// Case-insensitive lookup by name
pub fn find_by_name(store: &dyn LocalStore, name: &str) -> Result<Option<Department>, StoreError> {
    let name = name.trim();
    Ok(Collection::<Department>::new(store)
        .all()?
        .into_iter()
        .find(|d| d.name.trim().eq_ignore_ascii_case(name)))
}

/// Resolve a department by id or by name
pub fn resolve(store: &dyn LocalStore, identifier: &str) -> Result<Option<Department>, StoreError> {
    if let Ok(id) = Uuid::parse_str(identifier.trim()) {
        return Collection::<Department>::new(store).find(&id);
    }
    find_by_name(store, identifier)
}

/// Insert a department, refusing a second one with the same name
pub fn create(store: &dyn LocalStore, department: Department) -> Result<Department, StoreError> {
    ensure_unique_name(store, &department.name, None)?;
    Collection::new(store).insert(department)
}

/// Employees currently assigned to `department_id`, in collection order
pub fn members(employees: &[Employee], department_id: Uuid) -> Vec<&Employee> {
    employees
        .iter()
        .filter(|e| e.professional_info.department_id == Some(department_id))
        .collect()
}

/// Display name for an optional department reference
pub fn name_of(departments: &[Department], id: Option<Uuid>) -> &str {
    id.and_then(|id| departments.iter().find(|d| d.id == id))
        .map(|d| d.name.as_str())
        .unwrap_or("-")
}

/// Rename a department.
///
/// Employees hold the department id, so this touches a single row.
pub fn rename(store: &dyn LocalStore, id: Uuid, new_name: &str) -> Result<Department, StoreError> {
    let new_name = new_name.trim();
    ensure_unique_name(store, new_name, Some(id))?;

    let departments = Collection::<Department>::new(store);
    let mut department = departments.get(&id)?;
    let old_name = std::mem::replace(&mut department.name, new_name.to_string());
    let department = departments.update(department)?;

    info!(%id, from = %old_name, to = %new_name, "renamed department");
    Ok(department)
}

/// Delete a department and unassign its members. Returns the removed
/// department and how many employees were unassigned.
pub fn delete(store: &dyn LocalStore, id: Uuid) -> Result<(Department, usize), StoreError> {
    let removed = Collection::<Department>::new(store).delete(&id)?;
    let unassigned = Collection::<Employee>::new(store).update_where(
        |e| e.professional_info.department_id == Some(id),
        |e| {
            e.professional_info.department_id = None;
            e.updated_at = chrono::Utc::now();
        },
    )?;
    debug!(%id, unassigned, "deleted department");
    Ok((removed, unassigned))
}

fn ensure_unique_name(store: &dyn LocalStore, name: &str, except: Option<Uuid>) -> Result<(), StoreError> {
    match find_by_name(store, name)? {
        Some(existing) if Some(existing.id) != except => Err(StoreError::Duplicate {
            key: Department::KEY.to_string(),
            name: name.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Convert employees saved with a free-text `professionalInfo.department`
/// into `departmentId` references, creating departments as needed.
///
/// Runs on the raw JSON so older records never hit the typed parser with a
/// field it does not know. Returns the number of employees rewritten.
pub fn link_legacy_names(store: &dyn LocalStore) -> Result<usize, StoreError> {
    let mut raw: Vec<Value> = store.load(Employee::KEY)?;
    let mut departments: Vec<Department> = store.load(Department::KEY)?;
    let departments_before = departments.len();
    let mut rewritten = 0;

    for employee in raw.iter_mut() {
        let Some(info) = employee
            .get_mut("professionalInfo")
            .and_then(Value::as_object_mut)
        else {
            continue;
        };
        let Some(name) = info.get("department").and_then(Value::as_str).map(str::to_string) else {
            continue;
        };
        if info.get("departmentId").is_some_and(|v| !v.is_null()) || name.trim().is_empty() {
            continue;
        }
        info.remove("department");

        let id = match departments
            .iter()
            .find(|d| d.name.trim().eq_ignore_ascii_case(name.trim()))
        {
            Some(existing) => existing.id,
            None => {
                let created = Department::new(name.trim());
                let id = created.id;
                departments.push(created);
                id
            }
        };
        info.insert("departmentId".to_string(), Value::String(id.to_string()));
        rewritten += 1;
    }

    if rewritten > 0 {
        if departments.len() != departments_before {
            store.save(Department::KEY, &departments)?;
        }
        store.save(Employee::KEY, &raw)?;
        info!(rewritten, "linked legacy department names");
    }
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{PersonalInfo, ProfessionalInfo};

    fn employee(first: &str, department_id: Option<Uuid>) -> Employee {
        Employee::new(
            PersonalInfo {
                first_name: first.to_string(),
                last_name: "Tester".to_string(),
                email: format!("{}@example.com", first.to_lowercase()),
                ..Default::default()
            },
            ProfessionalInfo {
                department_id,
                designation: "Staff".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_rename_updates_every_member_and_nothing_else() {
        let db = Database::open_memory().unwrap();
        let design = create(&db, Department::new("Design")).unwrap();
        let sales = create(&db, Department::new("Sales")).unwrap();

        let employees = Collection::<Employee>::new(&db);
        for (name, dept) in [("Ana", design.id), ("Ben", design.id), ("Cy", sales.id)] {
            employees.insert(employee(name, Some(dept))).unwrap();
        }

        rename(&db, design.id, "Design & UX").unwrap();

        let departments = Collection::<Department>::new(&db).all().unwrap();
        let all = employees.all().unwrap();
        let resolved: Vec<&str> = all
            .iter()
            .map(|e| name_of(&departments, e.professional_info.department_id))
            .collect();

        assert_eq!(resolved, vec!["Design & UX", "Design & UX", "Sales"]);
        assert!(!resolved.contains(&"Design"));
        assert_eq!(members(&all, design.id).len(), 2);
        assert_eq!(
            Collection::<Department>::new(&db).get(&sales.id).unwrap(),
            sales
        );
    }

    #[test]
    fn test_rename_rejects_existing_name() {
        let db = Database::open_memory().unwrap();
        let design = create(&db, Department::new("Design")).unwrap();
        create(&db, Department::new("Sales")).unwrap();

        let result = rename(&db, design.id, "sales");
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));

        // Same name with different case is fine for the same department
        rename(&db, design.id, "DESIGN").unwrap();
    }

    #[test]
    fn test_rename_missing_is_not_found() {
        let db = Database::open_memory().unwrap();
        let result = rename(&db, Uuid::new_v4(), "Anything");
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_delete_unassigns_members() {
        let db = Database::open_memory().unwrap();
        let ops = create(&db, Department::new("Ops")).unwrap();
        let hr = create(&db, Department::new("HR")).unwrap();
        let employees = Collection::<Employee>::new(&db);
        employees.insert(employee("Dee", Some(ops.id))).unwrap();
        employees.insert(employee("Eli", Some(hr.id))).unwrap();

        let (removed, unassigned) = delete(&db, ops.id).unwrap();
        assert_eq!(removed.name, "Ops");
        assert_eq!(unassigned, 1);

        let all = employees.all().unwrap();
        assert_eq!(all[0].professional_info.department_id, None);
        assert_eq!(all[1].professional_info.department_id, Some(hr.id));
    }

    #[test]
    fn test_resolve_by_id_or_name() {
        let db = Database::open_memory().unwrap();
        let eng = create(&db, Department::new("Engineering")).unwrap();
        assert_eq!(resolve(&db, &eng.id.to_string()).unwrap(), Some(eng.clone()));
        assert_eq!(resolve(&db, " engineering ").unwrap(), Some(eng));
        assert_eq!(resolve(&db, "Legal").unwrap(), None);
    }

    #[test]
    fn test_link_legacy_names() {
        let db = Database::open_memory().unwrap();
        let design = create(&db, Department::new("Design")).unwrap();

        let legacy = serde_json::json!([
            {
                "id": Uuid::new_v4(),
                "personalInfo": {"firstName": "Old", "lastName": "Record", "email": "o@x.io"},
                "professionalInfo": {"department": "design", "designation": "Illustrator"},
                "createdAt": "2023-01-01T00:00:00Z",
                "updatedAt": "2023-01-01T00:00:00Z"
            },
            {
                "id": Uuid::new_v4(),
                "personalInfo": {"firstName": "New", "lastName": "Hire", "email": "n@x.io"},
                "professionalInfo": {"department": "Research", "designation": "Analyst"},
                "createdAt": "2023-01-01T00:00:00Z",
                "updatedAt": "2023-01-01T00:00:00Z"
            }
        ]);
        db.write("employees", &legacy.to_string()).unwrap();

        assert_eq!(link_legacy_names(&db).unwrap(), 2);

        let employees = Collection::<Employee>::new(&db).all().unwrap();
        assert_eq!(employees[0].professional_info.department_id, Some(design.id));

        let research = find_by_name(&db, "Research").unwrap().unwrap();
        assert_eq!(employees[1].professional_info.department_id, Some(research.id));

        // Second pass has nothing left to do
        assert_eq!(link_legacy_names(&db).unwrap(), 0);
    }

    #[test]
    fn test_link_legacy_names_leaves_skipped_records_alone() {
        let db = Database::open_memory().unwrap();
        let design = create(&db, Department::new("Design")).unwrap();

        let legacy = serde_json::json!([
            {
                "id": Uuid::new_v4(),
                "personalInfo": {"firstName": "Old", "lastName": "Record", "email": "o@x.io"},
                "professionalInfo": {"department": "Design", "designation": "Illustrator"},
                "createdAt": "2023-01-01T00:00:00Z",
                "updatedAt": "2023-01-01T00:00:00Z"
            },
            {
                "id": Uuid::new_v4(),
                "personalInfo": {"firstName": "Already", "lastName": "Linked", "email": "a@x.io"},
                "professionalInfo": {
                    "department": "Graphics",
                    "departmentId": design.id,
                    "designation": "Illustrator"
                },
                "createdAt": "2023-01-01T00:00:00Z",
                "updatedAt": "2023-01-01T00:00:00Z"
            },
            {
                "id": Uuid::new_v4(),
                "personalInfo": {"firstName": "No", "lastName": "Team", "email": "t@x.io"},
                "professionalInfo": {"department": "  ", "designation": "Temp"},
                "createdAt": "2023-01-01T00:00:00Z",
                "updatedAt": "2023-01-01T00:00:00Z"
            }
        ]);
        db.write("employees", &legacy.to_string()).unwrap();

        assert_eq!(link_legacy_names(&db).unwrap(), 1);

        let raw: Vec<Value> = db.load(Employee::KEY).unwrap();
        assert!(raw[0]["professionalInfo"].get("department").is_none());
        assert_eq!(raw[1]["professionalInfo"]["department"], "Graphics");
        assert_eq!(raw[2]["professionalInfo"]["department"], "  ");
        assert!(find_by_name(&db, "Graphics").unwrap().is_none());
    }
}
