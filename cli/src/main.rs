/*
 * main.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Smistaposta, a notmuch tag to maildir folder synchronizer.
 *
 * Smistaposta is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Smistaposta is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Smistaposta.  If not, see <http://www.gnu.org/licenses/>.
 */

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use smistaposta_core::{apply, NotmuchIndex, Planner, SyncConfig};

#[derive(Parser)]
#[command(name = "smistaposta")]
#[command(about = "File notmuch-tagged mail into maildir folders", version)]
struct Cli {
    /// Configuration file, defaults to ~/.smistaposta.toml when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maildir root holding the managed subtree
    #[arg(long)]
    mail_root: Option<PathBuf>,

    /// Name of the managed subtree under the maildir root
    #[arg(long)]
    subtree: Option<String>,

    /// Compute and print the plan without touching anything
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity, may be given twice
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "info",
        1 => "smistaposta_core=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = SyncConfig::load_or_default(cli.config.as_deref())?;
    if let Some(root) = cli.mail_root {
        config.mail_root = root;
    }
    if let Some(subtree) = cli.subtree {
        config.subtree = subtree;
    }
    config.validate()?;

    let mut index = NotmuchIndex::new(&config);
    let plan = Planner::new(&config, &index).plan()?;

    if cli.dry_run {
        for copy in &plan.copies {
            println!("copy {} -> {}", copy.source.display(), copy.dest.display());
        }
        for removal in &plan.removals {
            println!("remove {}", removal.path.display());
        }
        println!(
            "plan: {} copies, {} removals",
            plan.copies.len(),
            plan.removals.len()
        );
        return Ok(());
    }

    let report = apply(&mut index, &plan);
    info!(
        "synchronized: {} copied, {} removed, {} skipped",
        report.copied, report.removed, report.skipped
    );

    // pick up whatever the incremental scans missed
    index.reindex()?;

    if !report.is_clean() {
        eprintln!(
            "sync finished with {} errors, {} removals held back",
            report.errors.len(),
            report.skipped
        );
        std::process::exit(1);
    }
    Ok(())
}
