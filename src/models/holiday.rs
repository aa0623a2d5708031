use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use super::Searchable;

/// How a holiday's date is derived for a given year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayRule {
    /// Same month and day every year
    Fixed { month: u32, day: u32 },
    /// The nth (1-based) given weekday of a month
    NthWeekday { month: u32, weekday: Weekday, n: u8 },
    /// The last given weekday of a month
    LastWeekday { month: u32, weekday: Weekday },
}

impl HolidayRule {
    pub fn date_in(&self, year: i32) -> Option<NaiveDate> {
        match *self {
            Self::Fixed { month, day } => NaiveDate::from_ymd_opt(year, month, day),
            Self::NthWeekday { month, weekday, n } => {
                NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
            }
            Self::LastWeekday { month, weekday } => {
                let mut day = last_day_of_month(year, month)?;
                while day.weekday() != weekday {
                    day = day.pred_opt()?;
                }
                Some(day)
            }
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

#[derive(Debug, Clone, Copy)]
pub struct CalendarRule {
    pub name: &'static str,
    pub rule: HolidayRule,
}

/// Company holiday calendar
pub const DEFAULT_CALENDAR: &[CalendarRule] = &[
    CalendarRule { name: "New Year's Day", rule: HolidayRule::Fixed { month: 1, day: 1 } },
    CalendarRule {
        name: "Martin Luther King Jr. Day",
        rule: HolidayRule::NthWeekday { month: 1, weekday: Weekday::Mon, n: 3 },
    },
    CalendarRule {
        name: "Presidents' Day",
        rule: HolidayRule::NthWeekday { month: 2, weekday: Weekday::Mon, n: 3 },
    },
    CalendarRule {
        name: "Memorial Day",
        rule: HolidayRule::LastWeekday { month: 5, weekday: Weekday::Mon },
    },
    CalendarRule { name: "Independence Day", rule: HolidayRule::Fixed { month: 7, day: 4 } },
    CalendarRule {
        name: "Labor Day",
        rule: HolidayRule::NthWeekday { month: 9, weekday: Weekday::Mon, n: 1 },
    },
    CalendarRule {
        name: "Thanksgiving",
        rule: HolidayRule::NthWeekday { month: 11, weekday: Weekday::Thu, n: 4 },
    },
    CalendarRule { name: "Christmas Day", rule: HolidayRule::Fixed { month: 12, day: 25 } },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub name: String,
    pub date: NaiveDate,
    /// Day off actually given: weekend dates move to the nearest weekday
    pub observed: NaiveDate,
}

impl Holiday {
    pub fn weekday_name(&self) -> String {
        self.date.format("%A").to_string()
    }

    pub fn is_shifted(&self) -> bool {
        self.observed != self.date
    }
}

impl Searchable for Holiday {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

/// Saturday holidays are observed on Friday, Sunday holidays on Monday
pub fn observed_date(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

/// Holidays for `year` in date order
pub fn holidays_for_year(calendar: &[CalendarRule], year: i32) -> Vec<Holiday> {
    let mut holidays: Vec<Holiday> = calendar
        .iter()
        .filter_map(|entry| {
            let date = entry.rule.date_in(year)?;
            Some(Holiday {
                name: entry.name.to_string(),
                date,
                observed: observed_date(date),
            })
        })
        .collect();
    holidays.sort_by_key(|h| h.date);
    holidays
}

/// Next holiday on or after `today`, looking into the following year if needed
pub fn next_holiday(calendar: &[CalendarRule], today: NaiveDate) -> Option<Holiday> {
    holidays_for_year(calendar, today.year())
        .into_iter()
        .chain(holidays_for_year(calendar, today.year() + 1))
        .find(|h| h.date >= today)
}
