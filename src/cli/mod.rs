use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::HrConfig;
use crate::db::{Collection, Database};
use crate::list::{ListController, SortOrder};
use crate::models::{Record, RecordId, Searchable, Stored};
use crate::remote::{RemoteClient, RemoteCollection};
use crate::source::RecordSource;

pub mod attendance;
pub mod candidate;
pub mod department;
pub mod display;
pub mod employee;
pub mod holiday;
pub mod job;
pub mod leave;
pub mod notification;
pub mod payroll;
pub mod settings;
pub mod ui;

pub use attendance::AttendanceCommand;
pub use candidate::CandidateCommand;
pub use department::DepartmentCommand;
pub use employee::EmployeeCommand;
pub use holiday::HolidayCommand;
pub use job::JobCommand;
pub use leave::LeaveCommand;
pub use notification::NotificationCommand;
pub use payroll::PayrollCommand;
pub use settings::SettingsCommand;

use display::{page_footer, Table};

#[derive(Parser)]
#[command(name = "hrboard")]
#[command(about = "HR management console for the command line")]
#[command(version)]
pub struct Cli {
    /// Database file (default: $HRBOARD_DB or the per-user data directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Employees and the add/edit wizard
    #[command(subcommand)]
    Employee(EmployeeCommand),
    /// Departments and their members
    #[command(subcommand)]
    Department(DepartmentCommand),
    /// Recruitment pipeline
    #[command(subcommand)]
    Candidate(CandidateCommand),
    /// Monthly payroll
    #[command(subcommand)]
    Payroll(PayrollCommand),
    /// Leave requests
    #[command(subcommand)]
    Leave(LeaveCommand),
    /// Public holidays
    #[command(subcommand)]
    Holiday(HolidayCommand),
    /// Job openings
    #[command(subcommand)]
    Job(JobCommand),
    /// Daily check-in and check-out
    #[command(subcommand)]
    Attendance(AttendanceCommand),
    /// Notifications from the HR API
    #[command(subcommand)]
    Notification(NotificationCommand),
    /// Stored settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

/// Options shared by every list command
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Case-insensitive text to look for
    #[arg(short, long)]
    pub search: Option<String>,
    #[arg(short, long, default_value = "1")]
    pub page: usize,
    /// Rows per page (default: the pageSize setting)
    #[arg(short, long)]
    pub limit: Option<usize>,
    /// Column to sort by
    #[arg(long)]
    pub sort: Option<String>,
    #[arg(short, long, default_value = "asc")]
    pub order: String,
    /// Print every page
    #[arg(short, long)]
    pub all: bool,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            search: None,
            page: 1,
            limit: None,
            sort: None,
            order: "asc".to_string(),
            all: false,
        }
    }
}

impl ListArgs {
    /// Controller with page size and search applied. Filters and sort are
    /// added by the caller; the page is applied when printing.
    pub fn controller<T: Searchable>(&self, config: &HrConfig) -> Result<ListController<T>> {
        let mut list = ListController::new(self.limit.unwrap_or(config.page_size))?;
        if let Some(ref term) = self.search {
            list.set_search(term.as_str());
        }
        Ok(list)
    }

    pub fn sort_order(&self) -> Result<SortOrder> {
        SortOrder::parse(&self.order).ok_or_else(|| anyhow!("Order must be 'asc' or 'desc', not '{}'", self.order))
    }
}

/// Print the requested page (or every page) of `items` as a table
pub fn print_list<T, F>(
    list: &mut ListController<T>,
    args: &ListArgs,
    items: &[T],
    headers: &[&'static str],
    row: F,
) where
    T: Searchable,
    F: Fn(&T) -> Vec<String>,
{
    if args.all {
        let filtered = list.filtered(items);
        let mut table = Table::new(headers);
        for &item in &filtered {
            table.row(row(item));
        }
        if table.is_empty() {
            ui::status("No results.");
        } else {
            table.print();
            println!("\n{} total", filtered.len());
        }
        return;
    }

    list.set_page(args.page);
    let page = list.page(items);
    if !page.is_empty() {
        let mut table = Table::new(headers);
        for &item in &page.rows {
            table.row(row(item));
        }
        table.print();
        println!();
    }
    println!("{}", page_footer(&page));
}

/// Reject a `--sort` value the entity does not know
pub fn unknown_sort(key: &str, known: &[&str]) -> anyhow::Error {
    anyhow!("Cannot sort by '{}'. Choose one of: {}", key, known.join(", "))
}

/// Run `f` against the remote resource when an API URL is configured,
/// otherwise against the local fallback collection
pub fn with_source<T, R, F>(db: &Database, config: &HrConfig, path: &'static str, f: F) -> Result<R>
where
    T: Stored,
    F: FnOnce(&dyn RecordSource<T>) -> Result<R>,
{
    if config.has_remote() {
        let client = RemoteClient::from_config(config)?;
        f(&RemoteCollection::<T>::new(&client, path))
    } else {
        f(&Collection::<T>::new(db))
    }
}

/// First eight characters of a UUID, enough to pick a record from a list
pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Find the one record whose UUID starts with `input`
pub fn find_by_id_prefix<T>(items: Vec<T>, input: &str, what: &str) -> Result<T>
where
    T: Record<Id = Uuid>,
{
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Err(anyhow!("No {} id given", what));
    }
    let mut matches: Vec<T> = items
        .into_iter()
        .filter(|item| item.id().to_string().starts_with(&needle))
        .collect();
    match matches.len() {
        0 => Err(anyhow!("No {} with id '{}'", what, input)),
        1 => Ok(matches.remove(0)),
        n => Err(anyhow!("'{}' matches {} {} records; use more of the id", input, n, what)),
    }
}

/// Find a record from the API or the fallback collection by its id as typed
pub fn find_by_record_id<T>(items: Vec<T>, input: &str, what: &str) -> Result<T>
where
    T: Record<Id = RecordId>,
{
    let input = input.trim();
    items
        .into_iter()
        .find(|item| item.id().to_string() == input)
        .ok_or_else(|| anyhow!("No {} with id '{}'", what, input))
}

pub fn run(command: Commands, db: &Database, config: &HrConfig) -> Result<()> {
    match command {
        Commands::Employee(cmd) => employee::run(cmd, db, config),
        Commands::Department(cmd) => department::run(cmd, db, config),
        Commands::Candidate(cmd) => candidate::run(cmd, db, config),
        Commands::Payroll(cmd) => payroll::run(cmd, db, config),
        Commands::Leave(cmd) => leave::run(cmd, db, config),
        Commands::Holiday(cmd) => holiday::run(cmd, config),
        Commands::Job(cmd) => job::run(cmd, db, config),
        Commands::Attendance(cmd) => attendance::run(cmd, db, config),
        Commands::Notification(cmd) => notification::run(cmd, config),
        Commands::Settings(cmd) => settings::run(cmd, db),
    }
}
