use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Subcommand};

use super::ui::status;
use super::{print_list, unknown_sort, ListArgs};
use crate::config::HrConfig;
use crate::models::{holidays_for_year, next_holiday, Holiday, DEFAULT_CALENDAR};

#[derive(Subcommand)]
pub enum HolidayCommand {
    /// Company holidays for a year
    List(HolidayListArgs),
    /// The next holiday from today
    Next,
}

#[derive(Args, Debug, Clone)]
pub struct HolidayListArgs {
    #[command(flatten)]
    pub list: ListArgs,
    /// Calendar year (default: this year)
    #[arg(long)]
    pub year: Option<i32>,
    /// Hide holidays that have already passed
    #[arg(long)]
    pub upcoming: bool,
}

pub fn run(command: HolidayCommand, config: &HrConfig) -> Result<()> {
    let today = Local::now().date_naive();
    match command {
        HolidayCommand::List(args) => run_list(config, &args, today),
        HolidayCommand::Next => {
            match next_holiday(DEFAULT_CALENDAR, today) {
                Some(h) => status(&describe_next(&h, today)),
                None => status("No holidays on the calendar."),
            }
            Ok(())
        }
    }
}

fn run_list(config: &HrConfig, args: &HolidayListArgs, today: NaiveDate) -> Result<()> {
    let holidays = holidays_for_year(DEFAULT_CALENDAR, args.year.unwrap_or(today.year()));
    let mut list = args.list.controller::<Holiday>(config)?;
    if args.upcoming {
        list.set_filter("upcoming", move |h: &Holiday| h.observed >= today);
    }
    if let Some(ref key) = args.list.sort {
        let order = args.list.sort_order()?;
        match key.as_str() {
            "date" => list.sort_by_key(|h: &Holiday| h.date, order),
            "name" => list.sort_by_key(|h: &Holiday| h.name.to_lowercase(), order),
            other => return Err(unknown_sort(other, &["date", "name"])),
        }
    }

    print_list(&mut list, &args.list, &holidays, &["date", "day", "holiday", "observed"], |h| {
        vec![
            h.date.to_string(),
            h.weekday_name(),
            h.name.clone(),
            if h.is_shifted() {
                h.observed.format("%a %Y-%m-%d").to_string()
            } else {
                String::new()
            },
        ]
    });
    Ok(())
}

fn describe_next(h: &Holiday, today: NaiveDate) -> String {
    let days = (h.date - today).num_days();
    let when = match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {} days", n),
    };
    let mut line = format!("{} is {} ({}, {})", h.name, when, h.weekday_name(), h.date);
    if h.is_shifted() {
        line.push_str(&format!(", observed {}", h.observed.format("%A %Y-%m-%d")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_describe_next() {
        let today = date(2026, 7, 1);
        let h = next_holiday(DEFAULT_CALENDAR, today).unwrap();
        assert_eq!(h.name, "Independence Day");
        assert_eq!(
            describe_next(&h, today),
            "Independence Day is in 3 days (Saturday, 2026-07-04), observed Friday 2026-07-03"
        );

        let christmas = next_holiday(DEFAULT_CALENDAR, date(2024, 12, 25)).unwrap();
        assert_eq!(describe_next(&christmas, date(2024, 12, 25)), "Christmas Day is today (Wednesday, 2024-12-25)");
    }

    #[test]
    fn test_upcoming_filter() {
        let config = HrConfig::default();
        let holidays = holidays_for_year(DEFAULT_CALENDAR, 2024);
        let today = date(2024, 9, 3);
        let mut list = ListArgs::default().controller::<Holiday>(&config).unwrap();
        list.set_filter("upcoming", move |h: &Holiday| h.observed >= today);
        let names: Vec<&str> = list.filtered(&holidays).iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Thanksgiving", "Christmas Day"]);
    }
}
