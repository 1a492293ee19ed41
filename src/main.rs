use clap::{ArgAction, Command, arg, value_parser};
use std::path::PathBuf;

use crate::output::{
    detect_mode_from_args, emit_error, init_panic_hook_if_json, is_json_mode, set_output_mode,
};
use crate::utils::init_logging;

mod commands;
mod core;
mod error;
mod output;
mod utils;

fn cli() -> Command {
    Command::new("rekey")
        .about("Rename the top-level 'with' key to 'expected' in every JSON file of a directory")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            arg!([DIR] "Directory whose entries are rewritten in place")
                .id("dir")
                .value_parser(value_parser!(PathBuf))
                .default_value("."),
        )
        .arg(
            arg!(-k --"keep-going" "Attempt every entry and report failures individually")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(-s --"skip-dirs" "Skip sub-directories instead of failing on them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--mode <MODE> "Output mode")
                .required(false)
                .value_parser(["interactive", "json"])
                .default_value("interactive"),
        )
        .arg(
            arg!(-v --verbose "Increase log verbosity (repeatable)")
                .action(ArgAction::Count),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    set_output_mode(detect_mode_from_args(&args));
    init_panic_hook_if_json();

    let matches = match cli().try_get_matches_from(&args) {
        Ok(matches) => matches,
        Err(e) if is_json_mode() && e.use_stderr() => {
            emit_error(&e.to_string(), "invalid_arguments")
        }
        Err(e) => e.exit(),
    };

    init_logging(matches.get_count("verbose"));

    commands::rename(&matches);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn defaults_reproduce_the_plain_run() {
        let matches = cli().try_get_matches_from(["rekey"]).unwrap();
        assert_eq!(matches.get_one::<PathBuf>("dir"), Some(&PathBuf::from(".")));
        assert!(!matches.get_flag("keep-going"));
        assert!(!matches.get_flag("skip-dirs"));
        assert_eq!(matches.get_count("verbose"), 0);
    }

    #[test]
    fn flags_parse() {
        let matches = cli()
            .try_get_matches_from(["rekey", "-k", "--skip-dirs", "-vv", "queries"])
            .unwrap();
        assert_eq!(matches.get_one::<PathBuf>("dir"), Some(&PathBuf::from("queries")));
        assert!(matches.get_flag("keep-going"));
        assert!(matches.get_flag("skip-dirs"));
        assert_eq!(matches.get_count("verbose"), 2);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(cli().try_get_matches_from(["rekey", "--mode", "yaml"]).is_err());
    }
}
