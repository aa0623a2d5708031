use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::ui::{choose, fill_fields, fix_errors, prompt_field_optional, status, FormResult};
use super::{find_by_id_prefix, print_list, short_id, unknown_sort, ListArgs};
use crate::config::HrConfig;
use crate::db::{employees, Collection, Database};
use crate::form::{EntityForm, FormController, LeaveForm};
use crate::models::{with_employee_names, Employee, LeaveRecord, LeaveStatus, WithEmployee};

#[derive(Subcommand)]
pub enum LeaveCommand {
    /// List leave requests
    List(LeaveListArgs),
    /// File a leave request (prompts when no fields are given)
    Request(LeaveFields),
    /// Approve a pending request
    Approve {
        /// Leave id or its first characters
        id: String,
    },
    /// Reject a pending request
    Reject { id: String },
}

#[derive(Args, Debug, Clone)]
pub struct LeaveListArgs {
    #[command(flatten)]
    pub list: ListArgs,
    /// pending, approved or rejected
    #[arg(long)]
    pub status: Option<String>,
    /// Employee name, code or id
    #[arg(long)]
    pub employee: Option<String>,
    /// Only requests covering this date (YYYY-MM-DD)
    #[arg(long)]
    pub on: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct LeaveFields {
    /// Employee name, code or id
    #[arg(long)]
    pub employee: Option<String>,
    /// sick, casual, annual or unpaid
    #[arg(long = "type", value_name = "TYPE")]
    pub leave_type: Option<String>,
    /// First day (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// Last day, inclusive (default: same as --from)
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long)]
    pub reason: Option<String>,
}

pub fn run(command: LeaveCommand, db: &Database, config: &HrConfig) -> Result<()> {
    match command {
        LeaveCommand::List(args) => run_list(db, config, &args),
        LeaveCommand::Request(fields) => {
            if let Some(leave) = request_leave(db, &fields)? {
                status(&format!(
                    "Requested: {} day{} of {} leave ({})",
                    leave.days(),
                    if leave.days() == 1 { "" } else { "s" },
                    leave.leave_type.as_str(),
                    short_id(&leave.id)
                ));
            }
            Ok(())
        }
        LeaveCommand::Approve { id } => {
            let leave = decide(db, &id, LeaveStatus::Approved)?;
            status(&format!("Approved {}", short_id(&leave.id)));
            Ok(())
        }
        LeaveCommand::Reject { id } => {
            let leave = decide(db, &id, LeaveStatus::Rejected)?;
            status(&format!("Rejected {}", short_id(&leave.id)));
            Ok(())
        }
    }
}

fn find_employee(db: &Database, identifier: &str) -> Result<Option<Employee>> {
    let matches = employees::find_by_identifier(db, identifier)?;
    choose(matches, "employee", identifier, |e| e.display_name())
}

type Row = WithEmployee<LeaveRecord>;

fn run_list(db: &Database, config: &HrConfig, args: &LeaveListArgs) -> Result<()> {
    let employees = Collection::<Employee>::new(db).all()?;
    let rows = with_employee_names(Collection::<LeaveRecord>::new(db).all()?, &employees, |l| l.employee_id);
    let mut list = args.list.controller::<Row>(config)?;

    if let Some(ref s) = args.status {
        let wanted = LeaveStatus::parse(s).ok_or_else(|| anyhow!("Status must be pending, approved or rejected"))?;
        list.set_filter("status", move |r: &Row| r.record.status == wanted);
    }
    if let Some(ref who) = args.employee {
        let Some(employee) = find_employee(db, who)? else {
            return Ok(());
        };
        list.set_filter("employee", move |r: &Row| r.record.employee_id == employee.id);
    }
    if let Some(day) = args.on {
        list.set_filter("on", move |r: &Row| r.record.overlaps(day));
    }
    if let Some(ref key) = args.list.sort {
        let order = args.list.sort_order()?;
        match key.as_str() {
            "employee" => list.sort_by_key(|r: &Row| r.employee.to_lowercase(), order),
            "start" => list.sort_by_key(|r: &Row| r.record.start_date, order),
            "days" => list.sort_by_key(|r: &Row| r.record.days(), order),
            "requested" => list.sort_by_key(|r: &Row| r.record.created_at, order),
            other => return Err(unknown_sort(other, &["employee", "start", "days", "requested"])),
        }
    }

    print_list(
        &mut list,
        &args.list,
        &rows,
        &["id", "employee", "type", "from", "to", "days", "status", "reason"],
        |r| {
            let l = &r.record;
            vec![
                short_id(&l.id),
                r.employee.clone(),
                l.leave_type.as_str().to_string(),
                l.start_date.to_string(),
                l.end_date.to_string(),
                l.days().to_string(),
                l.status.as_str().to_string(),
                l.reason.clone().unwrap_or_default(),
            ]
        },
    );
    Ok(())
}

/// Validate and store a request. Overlapping open requests for the same
/// employee are refused.
pub fn request_leave(db: &Database, fields: &LeaveFields) -> Result<Option<LeaveRecord>> {
    let interactive = fields.employee.is_none()
        && fields.leave_type.is_none()
        && fields.from.is_none()
        && fields.to.is_none()
        && fields.reason.is_none();

    let who = match fields.employee {
        Some(ref e) => e.clone(),
        None if interactive => match prompt_field_optional("employee")? {
            FormResult::Value(v) => v,
            FormResult::Cancelled => {
                status("Cancelled.");
                return Ok(None);
            }
        },
        None => return Err(anyhow!("--employee is required")),
    };
    let Some(employee) = find_employee(db, &who)? else {
        return Ok(None);
    };

    let mut form = FormController::<LeaveForm>::new();
    form.handle_change("employee_id", employee.id.to_string())?;
    if interactive {
        if let FormResult::Cancelled = fill_fields(&mut form, &LeaveForm::FIELDS[1..])? {
            status("Cancelled.");
            return Ok(None);
        }
        if let FormResult::Cancelled = fix_errors(&mut form)? {
            status("Cancelled.");
            return Ok(None);
        }
    } else {
        let from = fields.from.clone().unwrap_or_default();
        let to = fields.to.clone().unwrap_or_else(|| from.clone());
        form.handle_change("leave_type", fields.leave_type.clone().unwrap_or_default())?;
        form.handle_change("start_date", from)?;
        form.handle_change("end_date", to)?;
        form.handle_change("reason", fields.reason.clone().unwrap_or_default())?;
    }

    let leave = form.payload()?;
    let leaves = Collection::<LeaveRecord>::new(db);
    if let Some(clash) = leaves.all()?.iter().find(|l| l.clashes_with(&leave)) {
        return Err(anyhow!(
            "{} already has {} leave from {} to {} ({})",
            employee.display_name(),
            clash.status.as_str(),
            clash.start_date,
            clash.end_date,
            short_id(&clash.id)
        ));
    }
    Ok(Some(form.submit(&leaves)?))
}

pub fn decide(db: &Database, id: &str, outcome: LeaveStatus) -> Result<LeaveRecord> {
    let leaves = Collection::<LeaveRecord>::new(db);
    let mut leave = find_by_id_prefix(leaves.all()?, id, "leave")?;
    match outcome {
        LeaveStatus::Approved => leave.approve()?,
        LeaveStatus::Rejected => leave.reject()?,
        LeaveStatus::Pending => return Err(anyhow!("A decision must approve or reject")),
    }
    Ok(leaves.update(leave)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::seed_if_empty;

    fn request(from: &str, to: Option<&str>) -> LeaveFields {
        LeaveFields {
            employee: Some("EMP-0003".to_string()),
            leave_type: Some("annual".to_string()),
            from: Some(from.to_string()),
            to: to.map(str::to_string),
            reason: Some("Family trip".to_string()),
        }
    }

    #[test]
    fn test_request_and_approve() {
        let db = Database::open_memory().unwrap();
        seed_if_empty(&db).unwrap();

        let leave = request_leave(&db, &request("2024-08-05", Some("2024-08-09"))).unwrap().unwrap();
        assert_eq!(leave.days(), 5);
        assert_eq!(leave.status, LeaveStatus::Pending);

        let approved = decide(&db, &short_id(&leave.id), LeaveStatus::Approved).unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);

        let err = decide(&db, &leave.id.to_string(), LeaveStatus::Rejected).unwrap_err();
        assert!(err.to_string().contains("already approved"));
    }

    #[test]
    fn test_single_day_defaults_end_date() {
        let db = Database::open_memory().unwrap();
        seed_if_empty(&db).unwrap();
        let leave = request_leave(&db, &request("2024-09-02", None)).unwrap().unwrap();
        assert_eq!(leave.start_date, leave.end_date);
        assert_eq!(leave.days(), 1);
    }

    #[test]
    fn test_overlapping_request_refused() {
        let db = Database::open_memory().unwrap();
        seed_if_empty(&db).unwrap();
        request_leave(&db, &request("2024-08-05", Some("2024-08-09"))).unwrap();

        let err = request_leave(&db, &request("2024-08-09", Some("2024-08-12"))).unwrap_err();
        assert!(err.to_string().contains("already has pending leave"));
        assert_eq!(Collection::<LeaveRecord>::new(&db).all().unwrap().len(), 1);
    }

    #[test]
    fn test_end_before_start_refused() {
        let db = Database::open_memory().unwrap();
        seed_if_empty(&db).unwrap();
        let err = request_leave(&db, &request("2024-08-09", Some("2024-08-05"))).unwrap_err();
        assert!(err.to_string().contains("end_date"));
    }
}
