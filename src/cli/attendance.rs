use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use clap::{Args, Subcommand};

use super::ui::{choose, status};
use super::{print_list, unknown_sort, ListArgs};
use crate::config::{parse_time, HrConfig};
use crate::db::{employees, Collection, Database};
use crate::models::{with_employee_names, AttendanceRecord, AttendanceStatus, Employee, WithEmployee};

#[derive(Subcommand)]
pub enum AttendanceCommand {
    /// Record an employee arriving
    CheckIn(Punch),
    /// Record an employee leaving
    CheckOut(Punch),
    /// Attendance for a day
    List(AttendanceListArgs),
}

#[derive(Args, Debug, Clone)]
pub struct Punch {
    /// Employee name, code or id
    pub employee: String,
    /// Time as HH:MM (default: now)
    #[arg(long)]
    pub at: Option<String>,
    /// Day as YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone)]
pub struct AttendanceListArgs {
    #[command(flatten)]
    pub list: ListArgs,
    /// Day as YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Employee name, code or id
    #[arg(long)]
    pub employee: Option<String>,
    /// Only late arrivals
    #[arg(long)]
    pub late: bool,
}

pub fn run(command: AttendanceCommand, db: &Database, config: &HrConfig) -> Result<()> {
    match command {
        AttendanceCommand::CheckIn(punch) => {
            let Some(employee) = find_employee(db, &punch.employee)? else {
                return Ok(());
            };
            let (date, at) = when(&punch)?;
            let record = check_in(db, &employee, date, at)?;
            let late = match record.status(config.work_start) {
                AttendanceStatus::Late => " (late)",
                AttendanceStatus::Present => "",
            };
            status(&format!("{} checked in at {}{}", employee.display_name(), record.check_in.format("%H:%M"), late));
            Ok(())
        }
        AttendanceCommand::CheckOut(punch) => {
            let Some(employee) = find_employee(db, &punch.employee)? else {
                return Ok(());
            };
            let (date, at) = when(&punch)?;
            let record = check_out(db, &employee, date, at)?;
            status(&format!(
                "{} checked out after {:.1}h",
                employee.display_name(),
                record.worked_hours().unwrap_or(0.0)
            ));
            Ok(())
        }
        AttendanceCommand::List(args) => run_list(db, config, &args),
    }
}

fn find_employee(db: &Database, identifier: &str) -> Result<Option<Employee>> {
    let matches = employees::find_by_identifier(db, identifier)?;
    choose(matches, "employee", identifier, |e| e.display_name())
}

/// Date and time of a punch, defaulting to now to the minute
fn when(punch: &Punch) -> Result<(NaiveDate, NaiveTime)> {
    let now = Local::now().naive_local();
    let date = punch.date.unwrap_or(now.date());
    let at = match punch.at {
        Some(ref s) => parse_time(s).ok_or_else(|| anyhow!("Time must look like 09:30"))?,
        None => now.time().with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(now.time()),
    };
    Ok((date, at))
}

pub fn check_in(db: &Database, employee: &Employee, date: NaiveDate, at: NaiveTime) -> Result<AttendanceRecord> {
    if !employee.is_active() {
        return Err(anyhow!("{} is inactive", employee.display_name()));
    }
    let records = Collection::<AttendanceRecord>::new(db);
    if let Some(existing) = records
        .all()?
        .into_iter()
        .find(|r| r.employee_id == employee.id && r.date == date)
    {
        return Err(anyhow!(
            "{} already checked in on {} at {}",
            employee.display_name(),
            date,
            existing.check_in.format("%H:%M")
        ));
    }
    Ok(records.insert(AttendanceRecord::check_in(employee.id, date, at))?)
}

pub fn check_out(db: &Database, employee: &Employee, date: NaiveDate, at: NaiveTime) -> Result<AttendanceRecord> {
    let records = Collection::<AttendanceRecord>::new(db);
    let mut record = records
        .all()?
        .into_iter()
        .find(|r| r.employee_id == employee.id && r.date == date)
        .ok_or_else(|| anyhow!("{} has not checked in on {}", employee.display_name(), date))?;

    if let Some(out) = record.check_out {
        return Err(anyhow!("{} already checked out at {}", employee.display_name(), out.format("%H:%M")));
    }
    if at < record.check_in {
        return Err(anyhow!(
            "Check-out {} is before check-in {}",
            at.format("%H:%M"),
            record.check_in.format("%H:%M")
        ));
    }
    record.check_out = Some(at);
    Ok(records.update(record)?)
}

type Row = WithEmployee<AttendanceRecord>;

fn run_list(db: &Database, config: &HrConfig, args: &AttendanceListArgs) -> Result<()> {
    let day = args.date.unwrap_or_else(|| Local::now().date_naive());
    let employees = Collection::<Employee>::new(db).all()?;
    let rows = with_employee_names(Collection::<AttendanceRecord>::new(db).all()?, &employees, |r| r.employee_id);
    let work_start = config.work_start;

    let mut list = args.list.controller::<Row>(config)?;
    list.set_filter("date", move |r: &Row| r.record.date == day);
    if let Some(ref who) = args.employee {
        let Some(employee) = find_employee(db, who)? else {
            return Ok(());
        };
        list.set_filter("employee", move |r: &Row| r.record.employee_id == employee.id);
    }
    if args.late {
        list.set_filter("late", move |r: &Row| r.record.status(work_start) == AttendanceStatus::Late);
    }
    if let Some(ref key) = args.list.sort {
        let order = args.list.sort_order()?;
        match key.as_str() {
            "employee" => list.sort_by_key(|r: &Row| r.employee.to_lowercase(), order),
            "in" => list.sort_by_key(|r: &Row| r.record.check_in, order),
            "hours" => list.sort_by_key(|r: &Row| r.record.worked_hours().map(|h| (h * 60.0) as i64), order),
            other => return Err(unknown_sort(other, &["employee", "in", "hours"])),
        }
    }

    println!("{}  (work starts {})", day, work_start.format("%H:%M"));
    print_list(
        &mut list,
        &args.list,
        &rows,
        &["employee", "in", "out", "hours", "status"],
        |r| {
            let rec = &r.record;
            vec![
                r.employee.clone(),
                rec.check_in.format("%H:%M").to_string(),
                rec.check_out.map(|t| t.format("%H:%M").to_string()).unwrap_or_default(),
                rec.worked_hours().map(|h| format!("{:.1}", h)).unwrap_or_default(),
                rec.status(work_start).as_str().to_string(),
            ]
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::seed_if_empty;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn setup() -> (Database, Employee, NaiveDate) {
        let db = Database::open_memory().unwrap();
        seed_if_empty(&db).unwrap();
        let employee = employees::find_by_identifier(&db, "EMP-0002").unwrap().remove(0);
        (db, employee, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap())
    }

    #[test]
    fn test_check_in_and_out() {
        let (db, employee, day) = setup();
        let rec = check_in(&db, &employee, day, t(9, 20)).unwrap();
        assert_eq!(rec.status(t(9, 0)), AttendanceStatus::Late);

        let done = check_out(&db, &employee, day, t(17, 50)).unwrap();
        assert_eq!(done.id, rec.id);
        assert_eq!(done.worked_hours(), Some(8.5));
        assert!(check_out(&db, &employee, day, t(18, 0)).is_err());
    }

    #[test]
    fn test_double_check_in_refused() {
        let (db, employee, day) = setup();
        check_in(&db, &employee, day, t(8, 55)).unwrap();
        let err = check_in(&db, &employee, day, t(9, 5)).unwrap_err();
        assert!(err.to_string().contains("already checked in"));

        // Next day is fine
        check_in(&db, &employee, day.succ_opt().unwrap(), t(9, 5)).unwrap();
        assert_eq!(Collection::<AttendanceRecord>::new(&db).all().unwrap().len(), 2);
    }

    #[test]
    fn test_check_out_rules() {
        let (db, employee, day) = setup();
        let err = check_out(&db, &employee, day, t(17, 0)).unwrap_err();
        assert!(err.to_string().contains("has not checked in"));

        check_in(&db, &employee, day, t(10, 0)).unwrap();
        let err = check_out(&db, &employee, day, t(9, 30)).unwrap_err();
        assert!(err.to_string().contains("before check-in"));
    }

    #[test]
    fn test_punch_time_parsing() {
        let punch = Punch {
            employee: "x".to_string(),
            at: Some("07:45".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 1, 2),
        };
        assert_eq!(when(&punch).unwrap(), (NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), t(7, 45)));

        let bad = Punch {
            at: Some("quarter to eight".to_string()),
            ..punch
        };
        assert!(when(&bad).is_err());
    }
}
