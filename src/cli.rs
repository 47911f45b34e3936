//! Command-line interface for downsort.
//!
//! Thin glue around the organizer: argument definitions, wiring the
//! configuration into an organizer, and the dry-run confirmation loop.

use crate::config::OrganizerConfig;
use crate::organizer::FolderOrganizer;
use crate::output::OutputFormatter;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "downsort",
    version,
    about = "Tidy a Downloads folder by sorting files into category subfolders"
)]
pub struct Args {
    /// Directory to organize (defaults to the platform Downloads folder)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Simulate the run without moving anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Runs the CLI: one organization pass, plus the follow-up real pass when a
/// dry run found something to move and the user confirms.
pub fn run(args: Args) -> Result<(), String> {
    let config = OrganizerConfig::load(args.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let (rules, mapper) = config
        .compile()
        .map_err(|e| format!("Error compiling configuration: {}", e))?;

    let mut organizer = FolderOrganizer::with_rules(
        args.path.clone(),
        args.dry_run,
        mapper.clone(),
        rules.clone(),
    )
    .map_err(|e| e.to_string())?;

    let found_moves = {
        let (moved, _) = organizer.organize().map_err(|e| e.to_string())?;
        !moved.is_empty()
    };
    OutputFormatter::plain(&organizer.generate_report());

    if args.dry_run && found_moves && confirm("Apply these changes? [y/N] ")? {
        let mut real = FolderOrganizer::with_rules(args.path, false, mapper, rules)
            .map_err(|e| e.to_string())?;
        real.organize().map_err(|e| e.to_string())?;
        OutputFormatter::plain(&real.generate_report());
    }

    Ok(())
}

fn confirm(question: &str) -> Result<bool, String> {
    print!("\n{}", question);
    io::stdout().flush().map_err(|e| e.to_string())?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| e.to_string())?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
