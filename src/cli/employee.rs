use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use super::display::{detail, optional_detail};
use super::ui::{
    choose, confirm, field_label, print_field_errors, prompt_field, prompt_field_optional, select, status,
    warning, FormResult,
};
use super::{print_list, unknown_sort, ListArgs};
use crate::config::HrConfig;
use crate::db::{departments, employees, Collection, Database};
use crate::form::{EmployeeStep, EmployeeWizard};
use crate::models::{Department, Document, Employee, EmployeeStatus, EmploymentType, LeaveRecord};

const SORT_KEYS: &[&str] = &["name", "code", "joined", "designation", "department"];

#[derive(Subcommand)]
pub enum EmployeeCommand {
    /// List employees with search, filters and pagination
    List(EmployeeListArgs),
    /// Show full details for an employee
    Show {
        /// Name, employee code or id
        identifier: String,
    },
    /// Add an employee (runs the wizard when no fields are given)
    Add(EmployeeFields),
    /// Edit an employee (runs the wizard when no fields are given)
    Edit {
        identifier: String,
        #[command(flatten)]
        fields: EmployeeFields,
    },
    /// Delete an employee
    Delete {
        identifier: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Write employees as CSV
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List an employee's documents or save one to disk
    Documents {
        identifier: String,
        /// 1-based number of the document to save
        #[arg(long)]
        save: Option<usize>,
        /// Where to write the saved document (default: its file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct EmployeeListArgs {
    #[command(flatten)]
    pub list: ListArgs,
    /// Department name or id; "none" for unassigned employees
    #[arg(long)]
    pub department: Option<String>,
    /// active or inactive
    #[arg(long)]
    pub status: Option<String>,
    /// full-time, part-time, contract or intern
    #[arg(long = "type", value_name = "TYPE")]
    pub employment_type: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct EmployeeFields {
    #[arg(long)]
    pub first: Option<String>,
    #[arg(long)]
    pub last: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Department name or id
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub designation: Option<String>,
    /// full-time, part-time, contract or intern
    #[arg(long = "type", value_name = "TYPE")]
    pub employment_type: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub joining_date: Option<String>,
    /// Employee code (default: next free EMP-nnnn)
    #[arg(long)]
    pub code: Option<String>,
    /// active or inactive
    #[arg(long)]
    pub status: Option<String>,
    /// File to attach; repeat for several
    #[arg(long = "document", value_name = "PATH")]
    pub documents: Vec<PathBuf>,
}

impl EmployeeFields {
    fn is_empty(&self) -> bool {
        self.first.is_none()
            && self.last.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.department.is_none()
            && self.designation.is_none()
            && self.employment_type.is_none()
            && self.joining_date.is_none()
            && self.code.is_none()
            && self.status.is_none()
            && self.documents.is_empty()
    }
}

pub fn run(command: EmployeeCommand, db: &Database, config: &HrConfig) -> Result<()> {
    match command {
        EmployeeCommand::List(args) => run_list(db, config, &args),
        EmployeeCommand::Show { identifier } => run_show(db, &identifier),
        EmployeeCommand::Add(fields) => {
            if let Some(saved) = add_employee(db, &fields)? {
                status(&format!("Created: {}", label(&saved)));
            }
            Ok(())
        }
        EmployeeCommand::Edit { identifier, fields } => {
            if let Some(saved) = edit_employee(db, &identifier, &fields)? {
                status(&format!("Updated: {}", label(&saved)));
            }
            Ok(())
        }
        EmployeeCommand::Delete { identifier, yes } => run_delete(db, &identifier, yes),
        EmployeeCommand::Export { output } => run_export(db, output.as_deref()),
        EmployeeCommand::Documents {
            identifier,
            save,
            output,
        } => run_documents(db, &identifier, save, output),
    }
}

fn label(e: &Employee) -> String {
    match e.professional_info.employee_code {
        Some(ref code) => format!("{} ({})", e.display_name(), code),
        None => e.display_name(),
    }
}

fn run_list(db: &Database, config: &HrConfig, args: &EmployeeListArgs) -> Result<()> {
    let employees = Collection::<Employee>::new(db).all()?;
    let departments = Collection::<Department>::new(db).all()?;
    let mut list = args.list.controller::<Employee>(config)?;

    if let Some(ref dept) = args.department {
        if dept.eq_ignore_ascii_case("none") {
            list.set_filter("department", |e: &Employee| e.professional_info.department_id.is_none());
        } else {
            let found = departments::resolve(db, dept)?.ok_or_else(|| anyhow!("No department '{}'", dept))?;
            list.set_filter("department", move |e: &Employee| {
                e.professional_info.department_id == Some(found.id)
            });
        }
    }
    if let Some(ref s) = args.status {
        let wanted = EmployeeStatus::parse(s).ok_or_else(|| anyhow!("Status must be active or inactive"))?;
        list.set_filter("status", move |e: &Employee| e.status == wanted);
    }
    if let Some(ref t) = args.employment_type {
        let wanted = EmploymentType::parse(t).ok_or_else(|| anyhow!("Unknown employment type '{}'", t))?;
        list.set_filter("type", move |e: &Employee| e.professional_info.employment_type == wanted);
    }

    if let Some(ref key) = args.list.sort {
        let order = args.list.sort_order()?;
        match key.as_str() {
            "name" => list.sort_by_key(|e: &Employee| e.display_name().to_lowercase(), order),
            "code" => list.sort_by_key(|e: &Employee| e.professional_info.employee_code.clone(), order),
            "joined" => list.sort_by_key(|e: &Employee| e.professional_info.joining_date, order),
            "designation" => list.sort_by_key(|e: &Employee| e.professional_info.designation.to_lowercase(), order),
            "department" => {
                let names: HashMap<Uuid, String> =
                    departments.iter().map(|d| (d.id, d.name.to_lowercase())).collect();
                list.sort_by_key(
                    move |e: &Employee| {
                        e.professional_info
                            .department_id
                            .and_then(|id| names.get(&id).cloned())
                    },
                    order,
                )
            }
            other => return Err(unknown_sort(other, SORT_KEYS)),
        }
    }

    print_list(
        &mut list,
        &args.list,
        &employees,
        &["code", "name", "email", "department", "designation", "type", "status"],
        |e| {
            vec![
                e.professional_info.employee_code.clone().unwrap_or_default(),
                e.display_name(),
                e.personal_info.email.clone(),
                departments::name_of(&departments, e.professional_info.department_id).to_string(),
                e.professional_info.designation.clone(),
                e.professional_info.employment_type.label().to_string(),
                e.status.as_str().to_string(),
            ]
        },
    );
    Ok(())
}

/// Resolve an identifier to one employee, asking when several match
fn find_one(db: &Database, identifier: &str) -> Result<Option<Employee>> {
    let matches = employees::find_by_identifier(db, identifier)?;
    choose(matches, "employee", identifier, label)
}

fn run_show(db: &Database, identifier: &str) -> Result<()> {
    let Some(e) = find_one(db, identifier)? else {
        return Ok(());
    };
    let departments = Collection::<Department>::new(db).all()?;
    let p = &e.personal_info;
    let w = &e.professional_info;
    let a = &e.account_access;

    println!("{}\n", e.display_name());
    detail("id", &e.id.to_string());
    optional_detail("code", w.employee_code.as_deref());
    detail("status", e.status.as_str());
    detail("email", &p.email);
    optional_detail("phone", p.phone.as_deref());
    optional_detail("date of birth", p.date_of_birth.map(|d| d.to_string()).as_deref());
    optional_detail("gender", p.gender.as_deref());
    optional_detail("marital status", p.marital_status.as_deref());
    optional_detail("nationality", p.nationality.as_deref());
    let location: Vec<&str> = [&p.address, &p.city, &p.state, &p.zip_code]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .collect();
    detail("address", &location.join(", "));

    println!();
    detail("department", departments::name_of(&departments, w.department_id));
    detail("designation", &w.designation);
    detail("type", w.employment_type.label());
    optional_detail("joined", w.joining_date.map(|d| d.to_string()).as_deref());
    optional_detail("office", w.office_location.as_deref());
    optional_detail("username", w.username.as_deref());
    optional_detail("working days", w.working_days.as_deref());

    if !e.documents.is_empty() {
        println!();
        for (i, doc) in e.documents.iter().enumerate() {
            println!("  [{}] {} ({})", i + 1, doc.title, doc.file_name);
        }
    }

    let accounts = [
        ("login email", &a.email),
        ("slack", &a.slack_id),
        ("skype", &a.skype_id),
        ("github", &a.github_id),
    ];
    if accounts.iter().any(|(_, v)| v.is_some()) {
        println!();
        for (name, value) in accounts {
            optional_detail(name, value.as_deref());
        }
    }
    Ok(())
}

/// Add through the wizard or from flags. Returns None if the user cancelled.
pub fn add_employee(db: &Database, fields: &EmployeeFields) -> Result<Option<Employee>> {
    let collection = Collection::<Employee>::new(db);
    let mut wizard = EmployeeWizard::new();
    let code = employees::next_employee_code(&collection.all()?);
    wizard.handle_change("employee_code", code)?;

    if fields.is_empty() {
        if let FormResult::Cancelled = run_wizard(&mut wizard, db)? {
            status("Cancelled.");
            return Ok(None);
        }
    } else {
        apply_fields(&mut wizard, fields, db)?;
    }

    let saved = wizard.submit(&collection)?;
    debug!(id = %saved.id, "employee added");
    Ok(Some(saved))
}

pub fn edit_employee(db: &Database, identifier: &str, fields: &EmployeeFields) -> Result<Option<Employee>> {
    let Some(existing) = find_one(db, identifier)? else {
        return Ok(None);
    };
    let mut wizard = EmployeeWizard::for_edit(&existing);

    if fields.is_empty() {
        if let FormResult::Cancelled = run_wizard(&mut wizard, db)? {
            status("Cancelled.");
            return Ok(None);
        }
    } else {
        apply_fields(&mut wizard, fields, db)?;
    }

    Ok(Some(wizard.submit(&Collection::<Employee>::new(db))?))
}

fn apply_fields(wizard: &mut EmployeeWizard, fields: &EmployeeFields, db: &Database) -> Result<()> {
    let simple = [
        ("first_name", &fields.first),
        ("last_name", &fields.last),
        ("email", &fields.email),
        ("phone", &fields.phone),
        ("designation", &fields.designation),
        ("employment_type", &fields.employment_type),
        ("joining_date", &fields.joining_date),
        ("employee_code", &fields.code),
        ("status", &fields.status),
    ];
    for (field, value) in simple {
        if let Some(v) = value {
            wizard.handle_change(field, v.as_str())?;
        }
    }

    if let Some(ref dept) = fields.department {
        let found = departments::resolve(db, dept)?.ok_or_else(|| anyhow!("No department '{}'", dept))?;
        wizard.handle_change("department_id", found.id.to_string())?;
    }

    for path in &fields.documents {
        wizard.attach_document(read_document(path, None)?);
    }
    Ok(())
}

fn read_document(path: &Path, title: Option<&str>) -> Result<Document> {
    let bytes = std::fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let title = match title {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.clone()),
    };
    Ok(Document::from_bytes(title, file_name, &bytes))
}

/// Walk the four steps, re-asking a step until it validates
fn run_wizard(wizard: &mut EmployeeWizard, db: &Database) -> Result<FormResult<()>> {
    let departments = Collection::<Department>::new(db).all()?;
    loop {
        let step = wizard.step();
        println!("\n{}", step.label());

        let answered = match step {
            EmployeeStep::Documents => prompt_documents(wizard)?,
            _ => prompt_step(wizard, step, &departments)?,
        };
        if let FormResult::Cancelled = answered {
            return Ok(FormResult::Cancelled);
        }

        match wizard.next() {
            Ok(_) if step.next().is_none() => return Ok(FormResult::Value(())),
            Ok(_) => {}
            Err(_) => {
                eprintln!("Please fix:");
                print_field_errors(wizard.step_errors());
            }
        }
    }
}

fn prompt_step(wizard: &mut EmployeeWizard, step: EmployeeStep, departments: &[Department]) -> Result<FormResult<()>> {
    for &field in step.fields() {
        if field == "department_id" {
            if let Some(id) = pick_department(wizard.value(field), departments)? {
                wizard.handle_change(field, id)?;
            }
            continue;
        }
        let current = wizard.value(field).map(str::to_string);
        match prompt_field(&field_label(field), current.as_deref())? {
            FormResult::Value(v) => wizard.handle_change(field, v)?,
            FormResult::Cancelled => return Ok(FormResult::Cancelled),
        }
    }
    Ok(FormResult::Value(()))
}

/// Menu of departments; None keeps the current value
fn pick_department(current: Option<&str>, departments: &[Department]) -> Result<Option<String>> {
    if departments.is_empty() {
        return Ok(None);
    }
    let current_name = current
        .and_then(|c| Uuid::parse_str(c).ok())
        .map(|id| departments::name_of(departments, Some(id)).to_string());
    let prompt = match current_name {
        Some(name) => format!("department [{}]:", name),
        None => "department:".to_string(),
    };

    let mut options: Vec<String> = departments.iter().map(|d| d.name.clone()).collect();
    options.push("(none)".to_string());
    Ok(select(&prompt, &options)?.map(|i| {
        departments
            .get(i)
            .map(|d| d.id.to_string())
            .unwrap_or_default()
    }))
}

fn prompt_documents(wizard: &mut EmployeeWizard) -> Result<FormResult<()>> {
    for (i, doc) in wizard.documents().iter().enumerate() {
        println!("  [{}] {} ({})", i + 1, doc.title, doc.file_name);
    }
    loop {
        let path = match prompt_field_optional("file to attach (blank to continue)")? {
            FormResult::Value(v) if v.is_empty() => return Ok(FormResult::Value(())),
            FormResult::Value(v) => PathBuf::from(v),
            FormResult::Cancelled => return Ok(FormResult::Cancelled),
        };
        let title = match prompt_field_optional("title")? {
            FormResult::Value(v) => v,
            FormResult::Cancelled => return Ok(FormResult::Cancelled),
        };
        match read_document(&path, Some(&title)) {
            Ok(doc) => {
                println!("  attached {}", doc.file_name);
                wizard.attach_document(doc);
            }
            Err(e) => eprintln!("{:#}", e),
        }
    }
}

fn run_delete(db: &Database, identifier: &str, yes: bool) -> Result<()> {
    let Some(e) = find_one(db, identifier)? else {
        return Ok(());
    };
    if !yes && !confirm(&format!("Delete {}?", label(&e)))? {
        status("Cancelled.");
        return Ok(());
    }
    Collection::<Employee>::new(db).delete(&e.id)?;
    status("Deleted.");

    let leaves = Collection::<LeaveRecord>::new(db)
        .all()?
        .iter()
        .filter(|l| l.employee_id == e.id)
        .count();
    if leaves > 0 {
        warning(&format!("{} leave request(s) still reference {}", leaves, label(&e)));
    }
    Ok(())
}

fn run_export(db: &Database, output: Option<&Path>) -> Result<()> {
    let all = Collection::<Employee>::new(db).all()?;
    let departments = Collection::<Department>::new(db).all()?;
    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
            employees::write_csv(file, &all, &departments)?;
            eprintln!("Exported {} employees to {}", all.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            employees::write_csv(stdout.lock(), &all, &departments)?;
        }
    }
    Ok(())
}

fn run_documents(db: &Database, identifier: &str, save: Option<usize>, output: Option<PathBuf>) -> Result<()> {
    let Some(e) = find_one(db, identifier)? else {
        return Ok(());
    };
    let Some(n) = save else {
        if e.documents.is_empty() {
            status("No documents.");
        }
        for (i, doc) in e.documents.iter().enumerate() {
            println!(
                "[{}] {}  {}  {}",
                i + 1,
                doc.title,
                doc.file_name,
                doc.mime_type().unwrap_or("unknown")
            );
        }
        return Ok(());
    };

    let doc = n
        .checked_sub(1)
        .and_then(|i| e.documents.get(i))
        .ok_or_else(|| anyhow!("{} has no document {}", e.display_name(), n))?;
    let bytes = doc
        .decode()
        .ok_or_else(|| anyhow!("Document '{}' is not valid base64 data", doc.title))?;
    let path = output.unwrap_or_else(|| PathBuf::from(&doc.file_name));
    let mut file = File::create(&path).with_context(|| format!("Cannot create {}", path.display()))?;
    file.write_all(&bytes)?;
    status(&format!("Saved {}", path.display()));
    Ok(())
}
