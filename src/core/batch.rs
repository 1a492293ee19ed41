use crate::core::listing::Entry;
use crate::core::rekey::rename_key_in_file;
use crate::error::RekeyError;
use serde::Serialize;
use tracing::{debug, info, warn};

/// What to do with the rest of the listing once an entry fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HaltPolicy {
    /// Stop at the first failure and leave every later entry untouched.
    ///
    /// This is the historical behaviour: one bad entry aborts the batch and
    /// hides whatever state the later files are in.
    #[default]
    FirstError,
    /// Attempt every entry and record each failure on its own.
    KeepGoing,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub policy: HaltPolicy,
    pub skip_dirs: bool,
}

#[derive(Debug)]
pub enum Outcome {
    Renamed,
    Skipped,
    Failed(RekeyError),
    Untouched,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Renamed => "renamed",
            Self::Skipped => "skipped",
            Self::Failed(_) => "failed",
            Self::Untouched => "untouched",
        }
    }
}

#[derive(Debug)]
pub struct EntryReport {
    pub entry: Entry,
    pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<EntryReport>,
    pub halted: bool,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub renamed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub untouched: usize,
}

impl BatchReport {
    pub fn counts(&self) -> BatchCounts {
        let mut counts = BatchCounts::default();
        for report in &self.entries {
            match report.outcome {
                Outcome::Renamed => counts.renamed += 1,
                Outcome::Skipped => counts.skipped += 1,
                Outcome::Failed(_) => counts.failed += 1,
                Outcome::Untouched => counts.untouched += 1,
            }
        }
        counts
    }

    pub fn has_failures(&self) -> bool {
        self.entries
            .iter()
            .any(|report| matches!(report.outcome, Outcome::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Entry, &RekeyError)> {
        self.entries.iter().filter_map(|report| match &report.outcome {
            Outcome::Failed(err) => Some((&report.entry, err)),
            _ => None,
        })
    }
}

/// Runs the key rename over `entries` one at a time, in order.
///
/// `on_outcome` sees every entry exactly once, as soon as its outcome is known.
pub fn run_batch<F>(entries: Vec<Entry>, options: BatchOptions, mut on_outcome: F) -> BatchReport
where
    F: FnMut(&Entry, &Outcome),
{
    let mut report = BatchReport {
        entries: Vec::with_capacity(entries.len()),
        halted: false,
    };

    for entry in entries {
        let outcome = if report.halted {
            Outcome::Untouched
        } else if options.skip_dirs && entry.is_dir {
            debug!(entry = %entry.name, "skipping directory");
            Outcome::Skipped
        } else {
            debug!(entry = %entry.name, "rewriting");
            match rename_key_in_file(&entry.path) {
                Ok(()) => {
                    info!(entry = %entry.name, "renamed key");
                    Outcome::Renamed
                }
                Err(err) => {
                    warn!(entry = %entry.name, code = err.code(), "{err}");
                    if options.policy == HaltPolicy::FirstError {
                        report.halted = true;
                    }
                    Outcome::Failed(err)
                }
            }
        };

        on_outcome(&entry, &outcome);
        report.entries.push(EntryReport { entry, outcome });
    }

    report
}
