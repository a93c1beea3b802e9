mod commands;
mod logging;
mod progress;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser};
use commands::{Cli, Commands, RunArgs};
use progress::CliProgress;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use truename_lib::file_collect::collect_targets;
use truename_lib::model::{ExecuteResponse, ExecuteStatus, FileStatus};
use truename_lib::settings::{load_settings, save_settings, SETTINGS_FILE_NAME};
use truename_lib::{AppSettings, Backends, BatchOrchestrator};

pub fn run() -> anyhow::Result<()> {
    let args = Cli::parse();
    logging::init_logger(args.verbose);

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME));

    match args.command {
        Some(Commands::Generate(run)) => {
            let settings = effective_settings(&config_path, &run)?;
            let batch = generate(&run, settings)?;
            print_outcome(&batch, run.json)?;
        }
        Some(Commands::Rename { run, yes }) => {
            let settings = effective_settings(&config_path, &run)?;
            let mut batch = generate(&run, settings)?;
            print_outcome(&batch, run.json)?;
            rename_with_confirmation(&mut batch, yes)?;
            print_outcome(&batch, run.json)?;
        }
        Some(Commands::PrintConfig) => {
            let settings = load_settings(&config_path)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Some(Commands::InitConfig { force }) => {
            if config_path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    config_path.display()
                );
            }
            save_settings(&config_path, &AppSettings::default())?;
            println!("Wrote {}", config_path.display());
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn effective_settings(config_path: &Path, run: &RunArgs) -> anyhow::Result<AppSettings> {
    let mut settings = load_settings(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if run.recursive {
        settings.include_subfolders = true;
    }
    if let Some(mode) = run.mode {
        settings.naming_mode = mode.into();
    }
    Ok(settings)
}

fn generate(run: &RunArgs, settings: AppSettings) -> anyhow::Result<BatchOrchestrator> {
    let collected = collect_targets(&run.paths, settings.include_subfolders)?;
    if collected.skipped_by_extension > 0 {
        info!(
            "ignored {} file(s) with unsupported extensions",
            collected.skipped_by_extension
        );
    }

    let backends = Backends::heuristic(settings.summary_max_words);
    let mut batch = BatchOrchestrator::new(backends, settings)?;
    batch.add_entities(&collected.files);
    let selected = batch.select_all();

    let progress = CliProgress::new("Reading", selected.len());
    let response = batch.generate_all(&selected, || false, |event| progress.update(&event))?;
    progress.finish();

    eprintln!(
        "  {} named, {} failed, {} skipped in {:.2}s",
        response.generated,
        response.failed,
        response.skipped,
        response.elapsed_ms as f64 / 1000.0
    );
    Ok(batch)
}

fn rename_with_confirmation(batch: &mut BatchOrchestrator, yes: bool) -> anyhow::Result<()> {
    let ready = batch.summary().generated;
    if ready == 0 {
        eprintln!("  Nothing to rename");
        return Ok(());
    }
    if !yes && !prompt_confirm(&format!("Rename {} file(s)?", ready), Some(false))? {
        return Ok(());
    }

    let selected = batch.select_all();
    let progress = CliProgress::new("Renaming", ready);
    let response = batch.rename_all(&selected, |event| progress.update(&event))?;
    progress.finish();
    print_execute("Renamed", &response);

    if yes || response.succeeded == 0 {
        return Ok(());
    }
    if prompt_confirm("Revert these renames?", Some(false))? {
        let progress = CliProgress::new("Reverting", response.succeeded);
        let reverted = batch.revert_all(&selected, |event| progress.update(&event))?;
        progress.finish();
        print_execute("Reverted", &reverted);
    }
    Ok(())
}

fn print_outcome(batch: &BatchOrchestrator, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&batch.report())?);
        return Ok(());
    }

    for row in batch.rows() {
        let source = file_name_of(&row.source_path);
        match (row.status, row.new_path.as_deref()) {
            (FileStatus::NameGenerated | FileStatus::Renamed, Some(new_path)) => {
                println!("{:?}\t{} -> {}", row.status, source, file_name_of(new_path));
            }
            (status, _) => println!(
                "{:?}\t{}{}",
                status,
                source,
                row.reason
                    .map(|reason| format!(" ({})", reason))
                    .unwrap_or_default()
            ),
        }
    }
    Ok(())
}

fn print_execute(label: &str, response: &ExecuteResponse) {
    eprintln!(
        "  {} {} file(s), {} failed",
        label, response.succeeded, response.failed
    );
    for detail in &response.details {
        if matches!(detail.status, ExecuteStatus::Failed) {
            eprintln!(
                "    {}: {}",
                detail.source_path,
                detail.reason.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
