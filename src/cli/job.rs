use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use super::display::money;
use super::ui::{confirm, fill_fields, fix_errors, status, FormResult};
use super::{find_by_id_prefix, print_list, short_id, unknown_sort, ListArgs};
use crate::config::HrConfig;
use crate::db::{departments, Collection, Database};
use crate::form::{EntityForm, FormController, JobForm};
use crate::models::{Department, Job, JobBucket};

#[derive(Subcommand)]
pub enum JobCommand {
    /// List job openings
    List(JobListArgs),
    /// Jobs grouped by bucket
    Board,
    /// Post a job (prompts when no fields are given)
    Add(JobFields),
    /// Change a job's fields
    Edit {
        id: String,
        #[command(flatten)]
        fields: JobFields,
    },
    /// Move a job to another bucket
    Move {
        id: String,
        /// active, inactive or completed
        bucket: String,
    },
    /// Delete a job
    Delete {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct JobListArgs {
    #[command(flatten)]
    pub list: ListArgs,
    /// active, inactive or completed
    #[arg(long)]
    pub bucket: Option<String>,
    #[arg(long)]
    pub tag: Option<String>,
    /// Department name or id
    #[arg(long)]
    pub department: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct JobFields {
    #[arg(long)]
    pub title: Option<String>,
    /// Department name or id
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub salary: Option<String>,
    #[arg(long)]
    pub openings: Option<String>,
    /// Comma-separated
    #[arg(long)]
    pub tags: Option<String>,
}

impl JobFields {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.department.is_none()
            && self.location.is_none()
            && self.salary.is_none()
            && self.openings.is_none()
            && self.tags.is_none()
    }
}

pub fn run(command: JobCommand, db: &Database, config: &HrConfig) -> Result<()> {
    match command {
        JobCommand::List(args) => run_list(db, config, &args),
        JobCommand::Board => run_board(db),
        JobCommand::Add(fields) => {
            if let Some(job) = save_job(db, None, &fields)? {
                status(&format!("Posted: {} ({})", job.title, short_id(&job.id)));
            }
            Ok(())
        }
        JobCommand::Edit { id, fields } => {
            if let Some(job) = save_job(db, Some(&id), &fields)? {
                status(&format!("Updated: {}", job.title));
            }
            Ok(())
        }
        JobCommand::Move { id, bucket } => {
            let job = move_job(db, &id, &bucket)?;
            status(&format!("{} is now {}", job.title, job.bucket.as_str()));
            Ok(())
        }
        JobCommand::Delete { id, yes } => {
            let jobs = Collection::<Job>::new(db);
            let job = find_by_id_prefix(jobs.all()?, &id, "job")?;
            if !yes && !confirm(&format!("Delete {}?", job.title))? {
                status("Cancelled.");
                return Ok(());
            }
            jobs.delete(&job.id)?;
            status("Deleted.");
            Ok(())
        }
    }
}

fn run_list(db: &Database, config: &HrConfig, args: &JobListArgs) -> Result<()> {
    let jobs = Collection::<Job>::new(db).all()?;
    let all_departments = Collection::<Department>::new(db).all()?;
    let mut list = args.list.controller::<Job>(config)?;

    if let Some(ref b) = args.bucket {
        let wanted = JobBucket::parse(b).ok_or_else(|| anyhow!("Bucket must be active, inactive or completed"))?;
        list.set_filter("bucket", move |j: &Job| j.bucket == wanted);
    }
    if let Some(ref tag) = args.tag {
        let tag = tag.clone();
        list.set_filter("tag", move |j: &Job| j.has_tag(&tag));
    }
    if let Some(ref dept) = args.department {
        let found = departments::resolve(db, dept)?.ok_or_else(|| anyhow!("No department '{}'", dept))?;
        list.set_filter("department", move |j: &Job| j.department_id == Some(found.id));
    }
    if let Some(ref key) = args.list.sort {
        let order = args.list.sort_order()?;
        match key.as_str() {
            "title" => list.sort_by_key(|j: &Job| j.title.to_lowercase(), order),
            "salary" => list.sort_by_key(|j: &Job| (j.salary * 100.0).round() as i64, order),
            "openings" => list.sort_by_key(|j: &Job| j.openings, order),
            "posted" => list.sort_by_key(|j: &Job| j.created_at, order),
            other => return Err(unknown_sort(other, &["title", "salary", "openings", "posted"])),
        }
    }

    print_list(
        &mut list,
        &args.list,
        &jobs,
        &["id", "title", "department", "location", "salary", "openings", "bucket", "tags"],
        |j| {
            vec![
                short_id(&j.id),
                j.title.clone(),
                departments::name_of(&all_departments, j.department_id).to_string(),
                j.location.clone().unwrap_or_default(),
                money(j.salary),
                j.openings.to_string(),
                j.bucket.as_str().to_string(),
                j.tags.join(", "),
            ]
        },
    );
    Ok(())
}

fn run_board(db: &Database) -> Result<()> {
    let jobs = Collection::<Job>::new(db).all()?;
    for bucket in JobBucket::all() {
        let in_bucket: Vec<&Job> = jobs.iter().filter(|j| j.bucket == *bucket).collect();
        println!("{} ({})", bucket.as_str(), in_bucket.len());
        for j in in_bucket {
            println!("  {}  {}  x{}", short_id(&j.id), j.title, j.openings);
        }
        println!();
    }
    Ok(())
}

/// Create a job, or update the one matching `id`
pub fn save_job(db: &Database, id: Option<&str>, fields: &JobFields) -> Result<Option<Job>> {
    let jobs = Collection::<Job>::new(db);
    let mut form = FormController::<JobForm>::new();
    if let Some(id) = id {
        form.open_for_edit(&find_by_id_prefix(jobs.all()?, id, "job")?);
    }

    if fields.is_empty() {
        let prompted: Vec<&str> = JobForm::FIELDS
            .iter()
            .copied()
            .filter(|f| *f != "department_id" && *f != "bucket")
            .collect();
        if let FormResult::Cancelled = fill_fields(&mut form, &prompted)? {
            status("Cancelled.");
            return Ok(None);
        }
        if let FormResult::Cancelled = fix_errors(&mut form)? {
            status("Cancelled.");
            return Ok(None);
        }
    } else {
        let given = [
            ("title", &fields.title),
            ("location", &fields.location),
            ("salary", &fields.salary),
            ("openings", &fields.openings),
            ("tags", &fields.tags),
        ];
        for (field, value) in given {
            if let Some(v) = value {
                form.handle_change(field, v.as_str())?;
            }
        }
        if let Some(ref dept) = fields.department {
            let found = departments::resolve(db, dept)?.ok_or_else(|| anyhow!("No department '{}'", dept))?;
            form.handle_change("department_id", found.id.to_string())?;
        }
    }

    Ok(Some(form.submit(&jobs)?))
}

pub fn move_job(db: &Database, id: &str, bucket: &str) -> Result<Job> {
    let target = JobBucket::parse(bucket).ok_or_else(|| anyhow!("Bucket must be active, inactive or completed"))?;
    let jobs = Collection::<Job>::new(db);
    let mut job = find_by_id_prefix(jobs.all()?, id, "job")?;
    job.bucket = target;
    Ok(jobs.update(job)?)
}
