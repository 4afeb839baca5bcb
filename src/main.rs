mod cli;

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};

use cli::Cli;
use nodesweep::config::{default_config_file, load_favorites, load_patterns};
use nodesweep::entry::{
    DeleteProgressCallback, DeletionResult, Entry, ScanProgressCallback, SizeCategory,
};
use nodesweep::format::{human_age, human_size, parse_size, size_display};
use nodesweep::{
    select_all, select_by_age, select_by_size, DeleteOptions, Deleter, ScanOptions, Scanner,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let min_size_bytes = match &cli.min_size {
        Some(input) => match parse_size(input) {
            Some(bytes) => Some(bytes),
            None => bail!("Not a valid size: '{}' (try e.g. 500mb or 1.5gb)", input),
        },
        None => None,
    };

    // Config files are resolved here and passed in explicitly
    let ignore_file = cli.ignore_file.clone().or_else(|| default_config_file("ignore"));
    let favorites_file = cli
        .favorites_file
        .clone()
        .or_else(|| default_config_file("favorites"));

    let mut exclude_patterns: Vec<String> = ignore_file
        .as_deref()
        .map(load_patterns)
        .unwrap_or_default();
    exclude_patterns.extend(cli.exclude.iter().cloned());

    let options = ScanOptions {
        root: cli.path.clone(),
        max_depth: cli.max_depth,
        exclude_patterns,
        follow_symlinks: cli.follow_symlinks,
        favorites: favorites_file
            .as_deref()
            .map(load_favorites)
            .unwrap_or_default(),
    };

    let mut scanner = Scanner::new();
    if let Some(n) = cli.concurrency {
        scanner = scanner.with_concurrency(n);
    }

    // Scan with a percentage bar unless output must stay clean
    let show_progress = !cli.no_progress && !cli.json;
    let scan_bar = if show_progress {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% | {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let scan_callback: Option<ScanProgressCallback> = scan_bar.as_ref().map(|pb| {
        let pb = pb.clone();
        Box::new(move |p: nodesweep::ScanProgress| {
            pb.set_position(p.percent as u64);
            pb.set_message(format!("{} found", p.entries_found));
        }) as ScanProgressCallback
    });

    let outcome = scanner.scan(&options, scan_callback.as_ref(), false).await?;
    if let Some(pb) = scan_bar {
        pb.finish_and_clear();
    }

    let mut entries = outcome.entries;
    entries.sort_by(|a, b| b.size_bytes().cmp(&a.size_bytes()));

    // Selection criteria, applied in order
    if cli.all {
        entries = select_all(entries, true);
    }
    if let Some(bytes) = min_size_bytes {
        entries = select_by_size(entries, bytes);
    }
    if let Some(days) = cli.older_than {
        entries = select_by_age(entries, days);
    }

    if cli.json && !cli.delete {
        let report = nodesweep::ScanOutcome {
            entries,
            directories_scanned: outcome.directories_scanned,
            errors: outcome.errors,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !cli.json {
        for error in &outcome.errors {
            eprintln!("{} {}", "Warning:".yellow(), error);
        }
        print_listing(&entries, outcome.directories_scanned);
    }

    if cli.delete {
        let result = run_deletion(&cli, &entries).await?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn print_listing(entries: &[Entry], directories_scanned: usize) {
    if entries.is_empty() {
        println!(
            "No node_modules found ({} directories scanned)",
            directories_scanned
        );
        return;
    }

    for entry in entries {
        let marker = if entry.selected { "[x]" } else { "[ ]" };
        let size = match entry.size_category() {
            SizeCategory::Huge => size_display(entry).red().bold().to_string(),
            SizeCategory::Large => size_display(entry).yellow().to_string(),
            _ => size_display(entry),
        };
        let age = entry
            .age_days()
            .map(human_age)
            .unwrap_or_else(|| "-".to_string());
        let favorite = if entry.is_favorite { " (favorite)" } else { "" };

        println!(
            "{} {:>10}  {:>5}  {:>4} pkgs  {}{}",
            marker,
            size,
            age,
            entry.package_count(),
            entry.path.display(),
            favorite.cyan()
        );
    }

    let total_bytes: u64 = entries.iter().map(|e| e.size_bytes()).sum();
    let selected: Vec<&Entry> = entries.iter().filter(|e| e.selected).collect();
    let selected_bytes: u64 = selected.iter().map(|e| e.size_bytes()).sum();

    println!();
    println!(
        "{} node_modules, {} total ({} directories scanned)",
        entries.len(),
        human_size(total_bytes).bold(),
        directories_scanned
    );
    if !selected.is_empty() {
        println!(
            "{} selected, {} reclaimable",
            selected.len(),
            human_size(selected_bytes).green().bold()
        );
    }
}

async fn run_deletion(cli: &Cli, entries: &[Entry]) -> Result<DeletionResult> {
    let selected: Vec<&Entry> = entries.iter().filter(|e| e.selected).collect();
    if selected.is_empty() {
        if !cli.json {
            println!("Nothing selected; use --all, --min-size or --older-than");
        }
        return Ok(DeletionResult {
            total_attempted: 0,
            successful: 0,
            failed: 0,
            bytes_freed: 0,
            outcomes: Vec::new(),
        });
    }

    let selected_bytes: u64 = selected.iter().map(|e| e.size_bytes()).sum();

    if !cli.yes && !cli.dry_run {
        print!(
            "Delete {} directories ({})? This cannot be undone. [y/N] ",
            selected.len(),
            human_size(selected_bytes)
        );
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        let answer = answer.trim().to_lowercase();
        if answer != "y" && answer != "yes" {
            println!("Aborted");
            return Ok(DeletionResult {
                total_attempted: 0,
                successful: 0,
                failed: 0,
                bytes_freed: 0,
                outcomes: Vec::new(),
            });
        }
    }

    let options = DeleteOptions {
        dry_run: cli.dry_run,
        yes: cli.yes,
        force: cli.force,
        check_running_processes: cli.check_running,
        show_progress: !cli.no_progress && !cli.json,
    };

    let delete_bar = if options.show_progress {
        let pb = ProgressBar::new(selected.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} | {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let delete_callback: Option<DeleteProgressCallback> = delete_bar.as_ref().map(|pb| {
        let pb = pb.clone();
        Box::new(move |current: usize, _total: usize, name: &str| {
            pb.set_position(current as u64);
            pb.set_message(name.to_string());
        }) as DeleteProgressCallback
    });

    let result = Deleter::new()
        .delete_selected(entries, &options, delete_callback.as_ref())
        .await;

    if let Some(pb) = delete_bar {
        pb.finish_and_clear();
    }

    if !cli.json {
        for outcome in result.outcomes.iter().filter(|o| !o.succeeded) {
            if let Some(reason) = &outcome.error {
                eprintln!("{} {}", "Failed:".red(), reason);
            }
        }

        let verb = if options.dry_run {
            "Would free"
        } else {
            "Freed"
        };
        println!(
            "{} {} from {} directories{}",
            verb,
            human_size(result.bytes_freed).green().bold(),
            result.successful,
            if result.failed > 0 {
                format!(" ({} failed)", result.failed).red().to_string()
            } else {
                String::new()
            }
        );
    }

    Ok(result)
}
