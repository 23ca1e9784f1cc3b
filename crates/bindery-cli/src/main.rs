// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bindery — unpack ordered image pages from ZIP archives.
//
// Entry point. Parses arguments, initialises logging, builds the run
// configuration, and processes every archive through the batch runner.

mod cli;
mod services;

use std::process::ExitCode;

use bindery_core::BinderyConfig;
use bindery_core::human_errors::humanize_error;
use clap::Parser;

use cli::Cli;
use services::inputs::collect_archives;
use services::runner::{ArchiveOutcome, BatchRunner};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.log_filter())),
        )
        .init();

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            let human = humanize_error(&e);
            eprintln!("Error: {e}");
            eprintln!("  {} {}", human.message, human.suggestion);
            return ExitCode::FAILURE;
        }
    };

    print_configuration(&config, &args);

    let archives = collect_archives(&args.archives);
    if archives.is_empty() {
        eprintln!("Error: No ZIP files to process");
        return ExitCode::FAILURE;
    }

    println!("Processing {} ZIP file(s)...", archives.len());
    println!();

    let runner = BatchRunner::new(config, args.output.clone(), args.overwrite, args.jobs);
    let outcomes = runner.run(archives).await;

    for outcome in &outcomes {
        print_outcome(outcome);
    }

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    let failed = outcomes.len() - succeeded;
    println!();
    println!("{}", "=".repeat(50));
    println!("Summary: {succeeded} successful, {failed} failed");

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_configuration(config: &BinderyConfig, args: &Cli) {
    println!("Configuration:");
    println!(
        "  Natural sorting: {}",
        if config.natural_sort { "enabled" } else { "disabled" }
    );
    if config.priority_chars.is_empty() {
        println!("  Priority characters: none");
    } else {
        println!("  Priority characters: '{}'", config.priority_chars);
    }
    let formats: Vec<String> = config
        .renderable_formats
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("  Formats: {}", formats.join(", "));
    match &args.output {
        Some(dir) => println!("  Output: {}", dir.display()),
        None => println!("  Output: next to each archive"),
    }
    println!("  Jobs: {}", args.jobs);
    println!();
}

fn print_outcome(outcome: &ArchiveOutcome) {
    let name = outcome
        .archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| outcome.archive.display().to_string());

    match &outcome.result {
        Ok(staged) => println!(
            "{name}: {} page(s) written to {}",
            staged.pages,
            staged.dir.display()
        ),
        Err(e) => {
            let human = humanize_error(e);
            println!("{name}: {}: {e}", outcome.status());
            println!("  {} {}", human.message, human.suggestion);
        }
    }
}
