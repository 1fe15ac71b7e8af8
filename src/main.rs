//! Purpose: `villagers` CLI entry point; parses args, runs one query, emits JSON on stdout.
//! Role: Binary crate root; bootstraps logging and delegates to `command_dispatch`.
//! Invariants: Query results go to stdout as one JSON document (or a table when asked).
//! Invariants: Non-interactive errors and notices are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use villagers::api::{
    Error, ErrorKind, Hobby, HobbyGroups, LinePolicy, SpeciesFilter, VillagerFile,
    VillagerRecord, to_exit_code,
};
use villagers::notice::{Notice, notice_json, skipped_line_notice};

const DEFAULT_DATA_FILE: &str = "villagers.csv";

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing();

    let color_mode = cli.color;
    let source = DataSource {
        file: cli.file,
        policy: cli.errors.into(),
        color_mode,
    };

    let result = command_dispatch::dispatch_command(cli.command, &source);

    result
        .map_err(add_corrupt_hint)
        .map_err(add_not_found_hint)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "villagers",
    version,
    about = "Query pipe-delimited villager record files",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Each line of the data file is one villager:
  name|species|personality|hobby|saying
"#,
    after_help = r#"EXAMPLES
  $ villagers species
  $ villagers villagers --species Wolf
  $ villagers motto Audie
  $ villagers --file data/villagers.csv likeminded Skye

LEARN MORE
  $ villagers <command> --help
  Set RUST_LOG=debug to trace file scans on stderr."#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_DATA_FILE,
        help = "Villager data file (default: ./villagers.csv)",
        value_hint = ValueHint::FilePath
    )]
    file: PathBuf,
    #[arg(
        long,
        global = true,
        default_value = "stop",
        value_enum,
        help = "Malformed line handling: stop|skip"
    )]
    errors: LinePolicyCli,
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and pretty JSON output: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, ValueEnum)]
enum LinePolicyCli {
    Stop,
    Skip,
}

impl From<LinePolicyCli> for LinePolicy {
    fn from(value: LinePolicyCli) -> Self {
        match value {
            LinePolicyCli::Stop => LinePolicy::Stop,
            LinePolicyCli::Skip => LinePolicy::Skip,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "List distinct species",
        after_help = r#"EXAMPLES
  $ villagers species"#
    )]
    Species,
    #[command(
        about = "List villager names, optionally for one species",
        long_about = r#"List villager names sorted ascending.

Without --species every villager is listed."#,
        after_help = r#"EXAMPLES
  $ villagers villagers
  $ villagers villagers --species Wolf"#
    )]
    Villagers {
        #[arg(long, help = "Only list villagers of this species (exact match)")]
        species: Option<String>,
    },
    #[command(
        about = "Group villager names by hobby",
        long_about = r#"Group villager names by hobby.

Groups are emitted in the fixed order Fitness, Nature, Education, Music, Fashion, Play.
Villagers with any other hobby are left out."#
    )]
    Hobbies,
    #[command(
        about = "Print every record in file order",
        after_help = r#"EXAMPLES
  $ villagers records
  $ villagers records --table"#
    )]
    Records {
        #[arg(long, help = "Render an aligned text table instead of JSON")]
        table: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Look up a villager's motto",
        long_about = r#"Look up the motto (saying) of the first villager with this exact name.

An unknown name prints a null motto and still exits 0."#
    )]
    Motto {
        #[arg(help = "Villager name (exact, case-sensitive)")]
        name: String,
    },
    #[command(
        arg_required_else_help = true,
        about = "List villagers sharing a villager's personality",
        long_about = r#"List every villager whose personality matches the named villager's.

The named villager is included. An unknown name exits with the not-found code (3)."#
    )]
    Likeminded {
        #[arg(help = "Villager name (exact, case-sensitive)")]
        name: String,
    },
    #[command(
        about = "Print version info as JSON",
        after_help = r#"EXAMPLES
  $ villagers version"#
    )]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ villagers completion bash > ~/.local/share/bash-completion/completions/villagers
  $ villagers completion zsh > ~/.zfunc/_villagers"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Species => "species",
            Command::Villagers { .. } => "villagers",
            Command::Hobbies => "hobbies",
            Command::Records { .. } => "records",
            Command::Motto { .. } => "motto",
            Command::Likeminded { .. } => "likeminded",
            Command::Version => "version",
            Command::Completion { .. } => "completion",
        }
    }
}

/// Data file selection shared by every query command.
struct DataSource {
    file: PathBuf,
    policy: LinePolicy,
    color_mode: ColorMode,
}

impl DataSource {
    fn open(&self, cmd: &str) -> VillagerFile {
        let file = VillagerFile::new(&self.file).with_policy(self.policy);
        if self.policy != LinePolicy::Skip {
            return file;
        }
        let cmd = cmd.to_string();
        let label = display_path(&self.file);
        let color_mode = self.color_mode;
        file.with_skip_handler(move |skipped| {
            let time = notice_time_now().unwrap_or_default();
            emit_notice(&skipped_line_notice(skipped, &cmd, &label, time), color_mode);
        })
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

fn hobby_groups_json(groups: &HobbyGroups) -> Value {
    let values = Hobby::ALL
        .iter()
        .map(|hobby| {
            json!({
                "hobby": hobby.as_str(),
                "names": groups[hobby.index()],
            })
        })
        .collect::<Vec<_>>();
    json!({ "hobbies": values })
}

fn records_json(records: &[VillagerRecord]) -> Result<Value, Error> {
    let values = serde_json::to_value(records).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode records")
            .with_source(err)
    })?;
    Ok(json!({ "records": values }))
}

fn records_table_rows(records: &[VillagerRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| {
            vec![
                record.name.clone(),
                record.species.clone(),
                record.personality.clone(),
                record.hobby.clone(),
                record.saying.clone(),
            ]
        })
        .collect()
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Permission => {
            err.with_hint("Permission denied. Check the file permissions or pass another --file.")
        }
        ErrorKind::Io => err.with_hint(
            "I/O error. Check that the --file path exists (default: ./villagers.csv).",
        ),
        _ => err,
    }
}

fn add_corrupt_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Corrupt || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Each line needs exactly 5 '|'-separated fields. Fix the line or rerun with --errors skip.",
    )
}

fn add_not_found_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::NotFound || err.hint().is_some() {
        return err;
    }
    err.with_hint("Names match exactly, including case. Run `villagers villagers` to list them.")
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_LOG=debug and share command/context if it persists.",
    )
}

fn emit_version_output(color_mode: ColorMode) {
    if io::stdout().is_terminal() {
        println!("villagers {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            json!({
                "name": "villagers",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            color_mode,
        );
    }
}

fn emit_table(headers: &[&str], rows: &[Vec<String>]) {
    println!("{}", render_table(headers, rows));
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let column_count = headers.len();
    let mut sanitized_rows = Vec::with_capacity(rows.len());
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();

    for row in rows {
        let mut sanitized = Vec::with_capacity(column_count);
        for (idx, width) in widths.iter_mut().enumerate() {
            let value = row.get(idx).map(String::as_str).unwrap_or("");
            let cleaned = sanitize_table_cell(value);
            *width = (*width).max(cleaned.chars().count());
            sanitized.push(cleaned);
        }
        sanitized_rows.push(sanitized);
    }

    let mut lines = Vec::with_capacity(sanitized_rows.len() + 1);
    lines.push(format_table_line(
        &headers
            .iter()
            .map(|header| header.to_string())
            .collect::<Vec<_>>(),
        &widths,
    ));
    for row in sanitized_rows {
        lines.push(format_table_line(&row, &widths));
    }
    lines.join("\n")
}

fn sanitize_table_cell(value: &str) -> String {
    value.replace('\t', " ")
}

fn format_table_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        line.push_str(cell);
        let cell_len = cell.chars().count();
        if *width > cell_len && idx + 1 < widths.len() {
            line.push_str(&" ".repeat(*width - cell_len));
        }
    }
    line
}

fn emit_json(value: Value, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let pretty = is_tty || color_mode.use_color(is_tty);
    let json = if pretty {
        serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn notice_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {} (file: {})", notice.message, notice.file);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Corrupt => "malformed data".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            display_path(path)
        ));
    }
    if let Some(line) = err.line() {
        lines.push(format!(
            "{} {line}",
            colorize_label("line:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `villagers --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "villagers") else {
        return "Try `villagers --help`.".to_string();
    };

    let subcommand = tokens
        .iter()
        .skip(pos + 1)
        .find(|token| !token.starts_with('-') && !token.starts_with('<') && !token.starts_with('['));

    match subcommand {
        Some(name) => format!("Try `villagers {name} --help`."),
        None => "Try `villagers --help`.".to_string(),
    }
}
