use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use super::ui::{confirm, fill_fields, fix_errors, status, FormResult};
use super::{find_by_record_id, print_list, unknown_sort, with_source, ListArgs};
use crate::config::HrConfig;
use crate::db::Database;
use crate::form::{CandidateForm, EntityForm, FormController};
use crate::models::{Candidate, CandidateStatus};
use crate::remote::CANDIDATES;
use crate::source::RecordSource;

#[derive(Subcommand)]
pub enum CandidateCommand {
    /// List candidates in the pipeline
    List(CandidateListArgs),
    /// Add a candidate (prompts when no fields are given)
    Add(CandidateFields),
    /// Move a candidate to another stage
    Status {
        id: String,
        /// applied, screening, interview, offered, hired or rejected
        status: Option<String>,
        /// Move to the next stage instead
        #[arg(long, conflicts_with = "status")]
        advance: bool,
    },
    /// Delete a candidate
    Delete {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CandidateListArgs {
    #[command(flatten)]
    pub list: ListArgs,
    #[arg(long)]
    pub status: Option<String>,
    /// Hide hired and rejected candidates
    #[arg(long)]
    pub open: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CandidateFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Role applied for
    #[arg(long)]
    pub role: Option<String>,
}

impl CandidateFields {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none() && self.role.is_none()
    }
}

pub fn run(command: CandidateCommand, db: &Database, config: &HrConfig) -> Result<()> {
    match command {
        CandidateCommand::List(args) => {
            let all = with_source::<Candidate, _, _>(db, config, CANDIDATES, |src| src.list())?;
            list_candidates(config, &args, &all)
        }
        CandidateCommand::Add(fields) => {
            let saved =
                with_source::<Candidate, _, _>(db, config, CANDIDATES, |src| add_candidate(src, &fields))?;
            if let Some(c) = saved {
                status(&format!("Created: {} (id {})", c.name, c.id));
            }
            Ok(())
        }
        CandidateCommand::Status { id, status: target, advance } => {
            let updated = with_source::<Candidate, _, _>(db, config, CANDIDATES, |src| {
                move_candidate(src, &id, target.as_deref(), advance)
            })?;
            status(&format!("{} is now {}", updated.name, updated.status.as_str()));
            Ok(())
        }
        CandidateCommand::Delete { id, yes } => with_source::<Candidate, _, _>(db, config, CANDIDATES, |src| {
            let found = find_by_record_id(src.list()?, &id, "candidate")?;
            if !yes && !confirm(&format!("Delete {}?", found.name))? {
                status("Cancelled.");
                return Ok(());
            }
            src.delete(&found.id)?;
            status("Deleted.");
            Ok(())
        }),
    }
}

fn list_candidates(config: &HrConfig, args: &CandidateListArgs, all: &[Candidate]) -> Result<()> {
    let mut list = args.list.controller::<Candidate>(config)?;
    if let Some(ref s) = args.status {
        let wanted = CandidateStatus::parse(s).ok_or_else(|| anyhow!("Unknown stage '{}'", s))?;
        list.set_filter("status", move |c: &Candidate| c.status == wanted);
    }
    if args.open {
        list.set_filter("open", |c: &Candidate| !c.status.is_terminal());
    }
    if let Some(ref key) = args.list.sort {
        let order = args.list.sort_order()?;
        match key.as_str() {
            "name" => list.sort_by_key(|c: &Candidate| c.name.to_lowercase(), order),
            "applied" => list.sort_by_key(|c: &Candidate| c.applied_date, order),
            "stage" => list.sort_by_key(|c: &Candidate| stage_rank(c.status), order),
            other => return Err(unknown_sort(other, &["name", "applied", "stage"])),
        }
    }

    print_list(
        &mut list,
        &args.list,
        all,
        &["id", "name", "email", "role", "applied", "stage"],
        |c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.email.clone(),
                c.role.clone(),
                c.applied_date.map(|d| d.to_string()).unwrap_or_default(),
                c.status.as_str().to_string(),
            ]
        },
    );
    Ok(())
}

fn stage_rank(status: CandidateStatus) -> usize {
    CandidateStatus::all()
        .iter()
        .position(|s| *s == status)
        .unwrap_or(usize::MAX)
}

pub fn add_candidate(src: &dyn RecordSource<Candidate>, fields: &CandidateFields) -> Result<Option<Candidate>> {
    let mut form = FormController::<CandidateForm>::new();
    if fields.is_empty() {
        if let FormResult::Cancelled = fill_fields(&mut form, &CandidateForm::FIELDS[..4])? {
            status("Cancelled.");
            return Ok(None);
        }
        if let FormResult::Cancelled = fix_errors(&mut form)? {
            status("Cancelled.");
            return Ok(None);
        }
    } else {
        let given = [
            ("name", &fields.name),
            ("email", &fields.email),
            ("phone", &fields.phone),
            ("role", &fields.role),
        ];
        for (field, value) in given {
            if let Some(v) = value {
                form.handle_change(field, v.as_str())?;
            }
        }
    }
    Ok(Some(form.submit(src)?))
}

/// Set an explicit stage, or advance one step. Hired and rejected
/// candidates stay where they are.
pub fn move_candidate(
    src: &dyn RecordSource<Candidate>,
    id: &str,
    target: Option<&str>,
    advance: bool,
) -> Result<Candidate> {
    let mut candidate = find_by_record_id(src.list()?, id, "candidate")?;
    if candidate.status.is_terminal() {
        return Err(anyhow!(
            "{} is already {}; the pipeline is closed",
            candidate.name,
            candidate.status.as_str()
        ));
    }

    let next = match (target, advance) {
        (_, true) => candidate.status.advance(),
        (Some(t), false) => Some(CandidateStatus::parse(t).ok_or_else(|| anyhow!("Unknown stage '{}'", t))?),
        (None, false) => return Err(anyhow!("Give a stage or --advance")),
    };
    candidate.status = next.ok_or_else(|| anyhow!("No stage after {}", candidate.status.as_str()))?;
    src.update(candidate)
}
