use serde::Serialize;
use std::sync::OnceLock;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Interactive,
    Json,
}

impl OutputMode {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "interactive" => OutputMode::Interactive,
            _ => OutputMode::Json,
        }
    }
}

static OUTPUT_MODE: OnceLock<OutputMode> = OnceLock::new();

/// Looks for `--mode` before clap runs so argument errors can be reported in
/// the requested format too.
pub fn detect_mode_from_args(args: &[String]) -> OutputMode {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--mode" {
            return iter
                .next()
                .map_or(OutputMode::Json, |value| OutputMode::parse(value));
        } else if let Some(value) = arg.strip_prefix("--mode=") {
            return OutputMode::parse(value);
        }
    }

    OutputMode::Interactive
}

pub fn set_output_mode(mode: OutputMode) {
    let _ = OUTPUT_MODE.set(mode);
}

pub fn output_mode() -> OutputMode {
    *OUTPUT_MODE.get_or_init(|| OutputMode::Interactive)
}

pub fn is_json_mode() -> bool {
    output_mode() == OutputMode::Json
}

#[derive(Serialize)]
struct Event<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: &'a str,
    data: T,
}

#[derive(Serialize)]
struct ErrorData<'a> {
    message: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
struct ErrorDataOwned {
    message: String,
    code: String,
}

#[derive(Serialize)]
struct WarningData<'a> {
    message: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
struct PanicData {
    message: String,
    code: &'static str,
    location: Option<String>,
}

#[derive(Serialize)]
struct ProgressData<'a> {
    percent: u64,
    total: u64,
    processed: u64,
    entry: &'a str,
    status: &'a str,
}

fn render_event<T: Serialize>(kind: &str, data: &T) -> String {
    let event = Event { kind, data };
    serde_json::to_string(&event).unwrap_or_else(|e| {
        let fallback = Event {
            kind: "error",
            data: ErrorDataOwned {
                message: e.to_string(),
                code: "serialization_error".to_string(),
            },
        };
        serde_json::to_string(&fallback)
            .unwrap_or_else(|_| "{\"type\":\"error\",\"data\":{\"message\":\"serialization_error\",\"code\":\"serialization_error\"}}".to_string())
    })
}

fn emit_event<T: Serialize>(kind: &'static str, data: &T, to_stderr: bool) {
    let json = render_event(kind, data);

    if to_stderr {
        eprintln!("{json}");
    } else {
        println!("{json}");
    }
}

pub fn emit_output<T: Serialize>(data: &T) {
    emit_event("output", data, false);
}

pub fn emit_listing<T: Serialize>(entries: &T) {
    emit_event("listing", entries, false);
}

pub fn emit_progress_update(processed: u64, total: u64, entry: &str, status: &str) {
    let percent = if total == 0 {
        0
    } else {
        (processed.saturating_mul(100)) / total
    };

    let payload = ProgressData {
        percent,
        total,
        processed,
        entry,
        status,
    };
    emit_event("progress", &payload, false);
}

pub fn emit_error(message: &str, code: &str) -> ! {
    let payload = ErrorData { message, code };
    emit_event("error", &payload, true);
    std::process::exit(1);
}

pub fn emit_warning(message: &str, code: &str) {
    if is_json_mode() {
        let payload = WarningData { message, code };
        emit_event("warning", &payload, true);
    } else {
        eprintln!("Warning: {}", message);
    }
}

pub fn init_panic_hook_if_json() {
    if !is_json_mode() {
        return;
    }

    std::panic::set_hook(Box::new(|info| {
        let message = if let Some(value) = info.payload().downcast_ref::<&str>() {
            value.to_string()
        } else if let Some(value) = info.payload().downcast_ref::<String>() {
            value.clone()
        } else {
            "panic".to_string()
        };

        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()));

        let payload = PanicData {
            message,
            code: "panic",
            location,
        };

        emit_event("error", &payload, true);
    }));
}
