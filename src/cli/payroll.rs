use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::display::money;
use super::ui::{confirm, fill_fields, fix_errors, status, FormResult};
use super::{find_by_record_id, print_list, unknown_sort, with_source, ListArgs};
use crate::config::HrConfig;
use crate::db::Database;
use crate::form::{EntityForm, FormController, PayrollForm};
use crate::models::{PayrollEmployee, PayrollStatus};
use crate::remote::{RemoteClient, PAYROLL};
use crate::source::RecordSource;

#[derive(Subcommand)]
pub enum PayrollCommand {
    /// List payroll entries with net salary
    List(PayrollListArgs),
    /// Add a payroll entry (prompts when no fields are given)
    Add(PayrollFields),
    /// Mark an entry as paid today
    Pay { id: String },
    /// Delete a payroll entry
    Delete {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Download a payslip PDF from the HR API
    ExportPdf {
        id: String,
        /// Output file (default: payslip-<id>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PayrollListArgs {
    #[command(flatten)]
    pub list: ListArgs,
    /// pending or completed
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PayrollFields {
    #[arg(long)]
    pub employee_id: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub designation: Option<String>,
    /// Gross monthly salary
    #[arg(long)]
    pub salary: Option<String>,
    #[arg(long)]
    pub deduction: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub pay_date: Option<String>,
}

impl PayrollFields {
    fn pairs(&self) -> [(&'static str, &Option<String>); 6] {
        [
            ("employee_id", &self.employee_id),
            ("name", &self.name),
            ("designation", &self.designation),
            ("salary_per_month", &self.salary),
            ("deduction", &self.deduction),
            ("pay_date", &self.pay_date),
        ]
    }
}

pub fn run(command: PayrollCommand, db: &Database, config: &HrConfig) -> Result<()> {
    match command {
        PayrollCommand::List(args) => {
            let all = with_source::<PayrollEmployee, _, _>(db, config, PAYROLL, |src| src.list())?;
            list_payroll(config, &args, &all)
        }
        PayrollCommand::Add(fields) => {
            let saved = with_source::<PayrollEmployee, _, _>(db, config, PAYROLL, |src| add_entry(src, &fields))?;
            if let Some(p) = saved {
                status(&format!("Created: {} net {}", p.name, money(p.net_salary())));
            }
            Ok(())
        }
        PayrollCommand::Pay { id } => {
            let paid = with_source::<PayrollEmployee, _, _>(db, config, PAYROLL, |src| mark_paid(src, &id))?;
            status(&format!("Paid: {} on {}", paid.name, paid.pay_date.map(|d| d.to_string()).unwrap_or_default()));
            Ok(())
        }
        PayrollCommand::Delete { id, yes } => with_source::<PayrollEmployee, _, _>(db, config, PAYROLL, |src| {
            let found = find_by_record_id(src.list()?, &id, "payroll entry")?;
            if !yes && !confirm(&format!("Delete payroll entry for {}?", found.name))? {
                status("Cancelled.");
                return Ok(());
            }
            src.delete(&found.id)?;
            status("Deleted.");
            Ok(())
        }),
        PayrollCommand::ExportPdf { id, output } => {
            let client = RemoteClient::from_config(config)?;
            let bytes = client.download(&format!("{}/{}/pdf", PAYROLL, id.trim()))?;
            let path = output.unwrap_or_else(|| PathBuf::from(format!("payslip-{}.pdf", id.trim())));
            std::fs::write(&path, &bytes).with_context(|| format!("Cannot write {}", path.display()))?;
            status(&format!("Saved {} ({} bytes)", path.display(), bytes.len()));
            Ok(())
        }
    }
}

fn list_payroll(config: &HrConfig, args: &PayrollListArgs, all: &[PayrollEmployee]) -> Result<()> {
    let mut list = args.list.controller::<PayrollEmployee>(config)?;
    if let Some(ref s) = args.status {
        let wanted = PayrollStatus::parse(s).ok_or_else(|| anyhow!("Status must be pending or completed"))?;
        list.set_filter("status", move |p: &PayrollEmployee| p.status == wanted);
    }
    if let Some(ref key) = args.list.sort {
        let order = args.list.sort_order()?;
        match key.as_str() {
            "name" => list.sort_by_key(|p: &PayrollEmployee| p.name.to_lowercase(), order),
            "employee" => list.sort_by_key(|p: &PayrollEmployee| p.employee_id, order),
            // Whole cents so the key is Ord
            "net" => list.sort_by_key(|p: &PayrollEmployee| (p.net_salary() * 100.0).round() as i64, order),
            other => return Err(unknown_sort(other, &["name", "employee", "net"])),
        }
    }

    let total: f64 = list.filtered(all).iter().map(|p| p.net_salary()).sum();
    print_list(
        &mut list,
        &args.list,
        all,
        &["id", "emp", "name", "designation", "salary", "deduction", "net", "status"],
        |p| {
            vec![
                p.id.to_string(),
                p.employee_id.to_string(),
                p.name.clone(),
                p.designation.clone(),
                money(p.salary_per_month),
                money(p.deduction),
                money(p.net_salary()),
                p.status.as_str().to_string(),
            ]
        },
    );
    println!("Total net: {}", money(total));
    Ok(())
}

pub fn add_entry(src: &dyn RecordSource<PayrollEmployee>, fields: &PayrollFields) -> Result<Option<PayrollEmployee>> {
    let mut form = FormController::<PayrollForm>::new();
    let given = fields.pairs();
    if given.iter().all(|(_, v)| v.is_none()) {
        let prompted: Vec<&str> = PayrollForm::FIELDS.iter().copied().filter(|f| *f != "status").collect();
        if let FormResult::Cancelled = fill_fields(&mut form, &prompted)? {
            status("Cancelled.");
            return Ok(None);
        }
        if let FormResult::Cancelled = fix_errors(&mut form)? {
            status("Cancelled.");
            return Ok(None);
        }
    } else {
        for (field, value) in given {
            if let Some(v) = value {
                form.handle_change(field, v.as_str())?;
            }
        }
    }
    Ok(Some(form.submit(src)?))
}

pub fn mark_paid(src: &dyn RecordSource<PayrollEmployee>, id: &str) -> Result<PayrollEmployee> {
    let mut entry = find_by_record_id(src.list()?, id, "payroll entry")?;
    if entry.status == PayrollStatus::Completed {
        return Err(anyhow!("{} was already paid", entry.name));
    }
    entry.status = PayrollStatus::Completed;
    entry.pay_date = Some(Local::now().date_naive());
    src.update(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Collection;

    fn fields() -> PayrollFields {
        PayrollFields {
            employee_id: Some("12".to_string()),
            name: Some("Olivia Martin".to_string()),
            designation: Some("Engineering Manager".to_string()),
            salary: Some("7200".to_string()),
            deduction: Some("650.50".to_string()),
            pay_date: None,
        }
    }

    #[test]
    fn test_add_and_pay_locally() {
        let db = Database::open_memory().unwrap();
        let local = Collection::<PayrollEmployee>::new(&db);

        let saved = add_entry(&local, &fields()).unwrap().unwrap();
        assert_eq!(saved.net_salary(), 6549.5);
        assert_eq!(saved.status, PayrollStatus::Pending);

        let paid = mark_paid(&local, &saved.id.to_string()).unwrap();
        assert_eq!(paid.status, PayrollStatus::Completed);
        assert!(paid.pay_date.is_some());
        assert!(mark_paid(&local, &saved.id.to_string()).is_err());
        assert_eq!(local.all().unwrap().len(), 1);
    }

    #[test]
    fn test_add_rejects_deduction_over_salary() {
        let db = Database::open_memory().unwrap();
        let local = Collection::<PayrollEmployee>::new(&db);
        let mut f = fields();
        f.deduction = Some("9000".to_string());
        let err = add_entry(&local, &f).unwrap_err();
        assert!(err.to_string().contains("deduction"));
        assert!(local.all().unwrap().is_empty());
    }

    #[test]
    fn test_export_pdf_needs_api() {
        let db = Database::open_memory().unwrap();
        let err = run(
            PayrollCommand::ExportPdf {
                id: "3".to_string(),
                output: None,
            },
            &db,
            &HrConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no API URL configured"));
    }
}
