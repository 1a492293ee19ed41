use crate::core::batch::{BatchCounts, BatchOptions, BatchReport, HaltPolicy, Outcome, run_batch};
use crate::core::listing::{Entry, list_entries};
use crate::core::rekey::{SOURCE_KEY, TARGET_KEY};
use crate::output::{emit_listing, emit_output, emit_progress_update, emit_warning, is_json_mode};
use crate::utils::handle_error;
use clap::ArgMatches;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ReportRow {
    entry: String,
    status: String,
    detail: String,
}

#[derive(Serialize)]
struct EntryView<'a> {
    name: &'a str,
    is_dir: bool,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
struct ReportView<'a> {
    directory: String,
    halted: bool,
    counts: BatchCounts,
    entries: Vec<EntryView<'a>>,
}

pub fn rename(matches: &ArgMatches) {
    let (dir, options) = get_params(matches);

    let entries = match list_entries(&dir) {
        Ok(entries) => entries,
        Err(e) => handle_error(format!("Failed to list '{}': {}", dir.display(), e), None),
    };

    print_listing(&entries);

    if entries.is_empty() {
        emit_warning(
            &format!("No entries found in '{}'", dir.display()),
            "empty_directory",
        );
    }

    let total = entries.len() as u64;
    let pb = if is_json_mode() {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        pb
    };

    let mut processed = 0;
    let report = run_batch(entries, options, |entry, outcome| {
        processed += 1;
        pb.set_message(entry.name.clone());
        pb.inc(1);

        if is_json_mode() {
            emit_progress_update(processed, total, &entry.name, outcome.label());
        }
    });

    pb.finish_and_clear();

    if is_json_mode() {
        emit_output(&report_view(&dir, &report));
    } else {
        display_report(&report);
    }

    if report.has_failures() {
        std::process::exit(1);
    }
}

fn get_params(matches: &ArgMatches) -> (PathBuf, BatchOptions) {
    let dir = matches
        .get_one::<PathBuf>("dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    let policy = if matches.get_flag("keep-going") {
        HaltPolicy::KeepGoing
    } else {
        HaltPolicy::FirstError
    };

    let options = BatchOptions {
        policy,
        skip_dirs: matches.get_flag("skip-dirs"),
    };

    (dir, options)
}

fn print_listing(entries: &[Entry]) {
    if is_json_mode() {
        emit_listing(&entries);
        return;
    }

    let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
    println!("{:?}", names);
}

fn detail(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Renamed => format!("'{}' -> '{}'", SOURCE_KEY, TARGET_KEY),
        Outcome::Skipped => "directory".to_string(),
        Outcome::Failed(err) => err.to_string(),
        Outcome::Untouched => "not processed".to_string(),
    }
}

fn report_view<'a>(dir: &Path, report: &'a BatchReport) -> ReportView<'a> {
    let entries = report
        .entries
        .iter()
        .map(|r| {
            let (code, message) = match &r.outcome {
                Outcome::Failed(err) => (Some(err.code()), Some(err.to_string())),
                _ => (None, None),
            };

            EntryView {
                name: &r.entry.name,
                is_dir: r.entry.is_dir,
                status: r.outcome.label(),
                code,
                message,
            }
        })
        .collect();

    ReportView {
        directory: dir.display().to_string(),
        halted: report.halted,
        counts: report.counts(),
        entries,
    }
}

fn display_report(report: &BatchReport) {
    if report.entries.is_empty() {
        println!("{}", style("Nothing to rename.").yellow());
        return;
    }

    let rows: Vec<ReportRow> = report
        .entries
        .iter()
        .map(|r| ReportRow {
            entry: r.entry.name.clone(),
            status: r.outcome.label().to_string(),
            detail: detail(&r.outcome),
        })
        .collect();

    println!("{}", Table::new(rows));

    let counts = report.counts();
    let total = report.entries.len();

    if report.halted {
        if let Some((entry, err)) = report.failures().next() {
            eprintln!(
                "{}",
                style(format!("Stopped at '{}': {}", entry.name, err)).red()
            );
        }
        eprintln!(
            "{}",
            style(format!(
                "{} entries left untouched. Re-run with --keep-going to attempt them all.",
                counts.untouched
            ))
            .yellow()
        );
    } else if counts.failed > 0 {
        eprintln!(
            "{}",
            style(format!("{} of {} entries failed", counts.failed, total)).red()
        );
    }

    println!(
        "{} Renamed {} of {} entries",
        style("✓").green(),
        counts.renamed,
        total
    );
}
