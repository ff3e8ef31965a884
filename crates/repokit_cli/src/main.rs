//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `repokit_core` linkage and run one repository walk-through
//!   against an in-memory database.
//! - Write core `event=` records under the temp directory.
//! - Keep output deterministic for quick local sanity checks.

use repokit_core::db::migrations::EXAMPLE_MIGRATIONS;
use repokit_core::{
    init_logging, open_db_in_memory, ContextOptions, CrudRepository, ExampleEntity, ListQuery,
    LoggingConfig, Repository,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("repokit_core version={}", repokit_core::core_version());
    let logging = LoggingConfig::default();
    match init_logging(&logging) {
        Ok(()) => println!("logging dir={}", logging.log_dir.display()),
        Err(err) => eprintln!("repokit_cli logging_error={err}"),
    }
    let code = match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("repokit_cli error={err}");
            ExitCode::FAILURE
        }
    };
    // The logger handle lives in a static and is never dropped.
    log::logger().flush();
    code
}

fn run() -> Result<(), Box<dyn Error>> {
    let ctx = open_db_in_memory(&ContextOptions::default(), EXAMPLE_MIGRATIONS)?;
    let repo = Repository::<ExampleEntity>::try_new(&ctx)?
        .after_save(|_, affected| {
            println!("commit affected={affected}");
            Ok(())
        });

    let mut first = ExampleEntity::new("first");
    repo.add(&mut first, Some("cli"))?;
    let id = first.id.ok_or("insert did not assign a key")?;
    repo.add(&mut ExampleEntity::localized("zweite", "de"), Some("cli"))?;
    print_visible(&repo, "after_add")?;

    repo.soft_delete(&id)?;
    print_visible(&repo, "after_soft_delete")?;

    repo.activate(&id)?;
    print_visible(&repo, "after_activate")?;
    Ok(())
}

fn print_visible(repo: &Repository<'_, ExampleEntity>, label: &str) -> Result<(), Box<dyn Error>> {
    let all = repo.get_all(&ListQuery::new(), &[])?;
    let german = repo.get_all(&ListQuery::new().lang_code("de"), &[])?;
    println!("{label} visible={} visible_de={}", all.len(), german.len());
    Ok(())
}
