//! Seed/demo entry point for review core.
//!
//! # Responsibility
//! - Create the schema, seed employees and reviews, print them back.
//! - Show identity-map behavior on a real connection.

use clap::Parser;
use review_core::db::{self, schema};
use review_core::{
    EmployeeRepository, RepoError, RepoResult, ReviewRepository, SqliteEmployeeRepository,
    SqliteReviewRepository,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

#[derive(Debug, Parser)]
#[command(name = "review_cli", version, about = "Seed and inspect employee reviews")]
struct Args {
    /// SQLite database file. Uses an in-memory database when omitted.
    #[arg(long, env = "REVIEW_DB_PATH")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long, env = "REVIEW_LOG_DIR")]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "REVIEW_LOG_LEVEL")]
    log_level: Option<String>,

    /// Drop existing tables before seeding.
    #[arg(long)]
    reset: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(log_dir) = args.log_dir.as_deref() {
        if let Err(err) = review_core::init_logging(log_level(&args), log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn log_level(args: &Args) -> &str {
    args.log_level
        .as_deref()
        .unwrap_or(review_core::default_log_level())
}

fn run(args: &Args) -> RepoResult<()> {
    let conn = match args.db.as_ref() {
        Some(path) => db::open_db(path)?,
        None => db::open_db_in_memory()?,
    };

    if args.reset {
        schema::drop_all(&conn)?;
    }

    let employees = SqliteEmployeeRepository::new(&conn);
    employees.create_table()?;
    let mut reviews = SqliteReviewRepository::new(&conn, &employees);
    reviews.create_table()?;

    let lee = employees.create("Lee", "Manager")?;
    let sasha = employees.create("Sasha", "Developer")?;
    let lee_id = lee.id().ok_or(RepoError::NotPersisted { entity: "employee" })?;
    let sasha_id = sasha
        .id()
        .ok_or(RepoError::NotPersisted { entity: "employee" })?;

    reviews.create(2022, "Efficient team lead", lee_id)?;
    reviews.create(2023, "Great leadership this year", lee_id)?;
    let first = reviews.create(2023, "Strong debugging skills", sasha_id)?;

    for employee in employees.find_all()? {
        println!("{employee}");
        let Some(employee_id) = employee.id() else {
            continue;
        };
        for review in reviews.find_by_employee_id(employee_id)? {
            let review = review.borrow();
            println!("  {review} {}", review.comment());
        }
    }

    let first_id = first.borrow().id();
    if let Some(first_id) = first_id {
        let again = reviews.find_by_id(first_id)?;
        let same = again.is_some_and(|again| Rc::ptr_eq(&again, &first));
        println!("identity map returns the same instance: {same}");
    }

    Ok(())
}
