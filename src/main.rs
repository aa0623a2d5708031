use clap::Parser;
use hrboard::cli::{self, Cli};
use hrboard::config::{database_path, HrConfig};
use hrboard::db::{departments, seed, Database};
use hrboard::logging::init_tracing;
use tracing::debug;

fn run(cli: Cli) -> anyhow::Result<()> {
    init_tracing(cli.verbose)?;

    let path = database_path(cli.db)?;
    debug!(path = %path.display(), "opening database");
    let db = Database::open_at(path)?;

    seed::seed_if_empty(&db)?;
    departments::link_legacy_names(&db)?;
    let config = HrConfig::load(&db)?;

    cli::run(cli.command, &db, &config)
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
