use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use super::ui::{confirm, fill_fields, fix_errors, status, FormResult};
use super::{print_list, unknown_sort, ListArgs};
use crate::config::HrConfig;
use crate::db::{departments, Collection, Database};
use crate::form::{DepartmentForm, EntityForm, FormController};
use crate::models::{Department, Employee};

#[derive(Subcommand)]
pub enum DepartmentCommand {
    /// List departments with their head count
    List(ListArgs),
    /// Add a department (prompts when no name is given)
    Add(DepartmentAddArgs),
    /// Rename a department; members follow automatically
    Rename {
        /// Current name or id
        identifier: String,
        new_name: String,
    },
    /// Delete a department and unassign its members
    Delete {
        identifier: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// List the employees in a department
    Members {
        identifier: String,
        #[command(flatten)]
        list: ListArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DepartmentAddArgs {
    pub name: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
}

pub fn run(command: DepartmentCommand, db: &Database, config: &HrConfig) -> Result<()> {
    match command {
        DepartmentCommand::List(args) => run_list(db, config, &args),
        DepartmentCommand::Add(args) => {
            if let Some(saved) = add_department(db, &args)? {
                status(&format!("Created: {}", saved.name));
            }
            Ok(())
        }
        DepartmentCommand::Rename { identifier, new_name } => {
            let found = resolve(db, &identifier)?;
            let renamed = departments::rename(db, found.id, &new_name)?;
            status(&format!("Renamed: {} -> {}", found.name, renamed.name));
            Ok(())
        }
        DepartmentCommand::Delete { identifier, yes } => {
            let found = resolve(db, &identifier)?;
            if !yes && !confirm(&format!("Delete {}?", found.name))? {
                status("Cancelled.");
                return Ok(());
            }
            let (removed, unassigned) = departments::delete(db, found.id)?;
            status(&format!(
                "Deleted: {} ({} employee{} unassigned)",
                removed.name,
                unassigned,
                if unassigned == 1 { "" } else { "s" }
            ));
            Ok(())
        }
        DepartmentCommand::Members { identifier, list } => run_members(db, config, &identifier, &list),
    }
}

fn resolve(db: &Database, identifier: &str) -> Result<Department> {
    departments::resolve(db, identifier)?.ok_or_else(|| anyhow!("No department '{}'", identifier))
}

fn run_list(db: &Database, config: &HrConfig, args: &ListArgs) -> Result<()> {
    let all = Collection::<Department>::new(db).all()?;
    let employees = Collection::<Employee>::new(db).all()?;
    let mut list = args.controller::<Department>(config)?;

    if let Some(ref key) = args.sort {
        let order = args.sort_order()?;
        match key.as_str() {
            "name" => list.sort_by_key(|d: &Department| d.name.to_lowercase(), order),
            "created" => list.sort_by_key(|d: &Department| d.created_at, order),
            other => return Err(unknown_sort(other, &["name", "created"])),
        }
    }

    print_list(&mut list, args, &all, &["name", "members", "description"], |d| {
        vec![
            d.name.clone(),
            departments::members(&employees, d.id).len().to_string(),
            d.description.clone().unwrap_or_default(),
        ]
    });
    Ok(())
}

pub fn add_department(db: &Database, args: &DepartmentAddArgs) -> Result<Option<Department>> {
    let mut form = FormController::<DepartmentForm>::new();
    match args.name {
        Some(ref name) => {
            form.handle_change("name", name.as_str())?;
            if let Some(ref d) = args.description {
                form.handle_change("description", d.as_str())?;
            }
        }
        None => {
            if let FormResult::Cancelled = fill_fields(&mut form, DepartmentForm::FIELDS)? {
                status("Cancelled.");
                return Ok(None);
            }
            if let FormResult::Cancelled = fix_errors(&mut form)? {
                status("Cancelled.");
                return Ok(None);
            }
        }
    }

    let department = form.payload()?;
    Ok(Some(departments::create(db, department)?))
}

fn run_members(db: &Database, config: &HrConfig, identifier: &str, args: &ListArgs) -> Result<()> {
    let department = resolve(db, identifier)?;
    let employees = Collection::<Employee>::new(db).all()?;
    let mut list = args.controller::<Employee>(config)?;
    let id = department.id;
    list.set_filter("department", move |e: &Employee| e.professional_info.department_id == Some(id));

    println!("{}\n", department.name);
    print_list(&mut list, args, &employees, &["code", "name", "designation", "status"], |e| {
        vec![
            e.professional_info.employee_code.clone().unwrap_or_default(),
            e.display_name(),
            e.professional_info.designation.clone(),
            e.status.as_str().to_string(),
        ]
    });
    Ok(())
}
