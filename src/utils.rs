use crate::output::{emit_error, is_json_mode};
use console::style;
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

pub fn handle_error(message: String, pb: Option<&ProgressBar>) -> ! {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if is_json_mode() {
        emit_error(&message, "fatal");
    }

    eprintln!("{}", style(format!("Error: {message}")).red());
    std::process::exit(1);
}

fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rekey={}", default_level(verbosity))));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!is_json_mode())
        .with_target(false)
        .try_init();
}
