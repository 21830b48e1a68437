//! odr - sort, export and print report tables from the command line.
//!
//! Each command loads one table (JSON or CSV), initializes it on a
//! controller and replays the user actions the command stands for:
//! header clicks, the CSV export button or the print button.

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use odr_common::{format_error_human, OutputFormat, StructuredError, SCHEMA_VERSION};
use odr_core::config::{load_config, ConfigError, ConfigOptions, ResolvedConfig};
use odr_core::exit_codes::ExitCode;
use odr_core::host::{CliHooks, FileDownloadSink, FilePrintSink};
use odr_core::input::{load_table, InputError, InputFormat};
use odr_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use odr_table::{
    html, CsvExporter, DownloadSink, EventOutcome, ExportDocument, PrintDocument, PrintSink,
    SortDirection, SortState, Table, TableController, TableError, TableEvent,
};
use serde_json::{json, Value};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Sortable, exportable and printable report tables
#[derive(Parser)]
#[command(name = "odr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Config file (overrides ODR_CONFIG and ~/.config/odr/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort a table by one column, as if its header were clicked
    Sort(SortArgs),

    /// Export a table to CSV, as if the export button were clicked
    Export(ExportArgs),

    /// Write the print view of a table, as if the print button were clicked
    Print(PrintArgs),

    /// Render a table with its export/print toolbar and page print styles as HTML
    Render(RenderArgs),

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct SortArgs {
    /// Table file (.json or .csv)
    input: PathBuf,

    /// Zero-based column index
    #[arg(long)]
    column: usize,

    /// Number of header clicks to replay (odd: ascending, even: descending)
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..),
        conflicts_with = "descending"
    )]
    clicks: u32,

    /// Sort descending directly
    #[arg(long)]
    descending: bool,

    /// Write the sorted table (.json keeps sort markers, .csv is an export)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Table file (.json or .csv)
    input: PathBuf,

    /// Date used in the export filename (default: today, UTC)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Click this column's header before exporting
    #[arg(long)]
    sort_column: Option<usize>,

    /// Output directory (default: config output_dir or the working directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PrintArgs {
    /// Table file (.json or .csv)
    input: PathBuf,

    /// Click this column's header before printing
    #[arg(long)]
    sort_column: Option<usize>,

    /// Output directory (default: config output_dir or the working directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Table file (.json or .csv)
    input: PathBuf,

    /// Write markup to a file instead of the payload
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Minify markup regardless of config
    #[arg(long)]
    minify: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(
        LogLevel::from_flags(cli.global.quiet, cli.global.verbose),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let run_id = generate_run_id();
    let span = tracing::info_span!("odr", run_id = %run_id);
    let _entered = span.enter();

    let global = &cli.global;
    let exit_code = match &cli.command {
        Commands::Sort(args) => run_command(global, &run_id, "sort", || run_sort(global, args)),
        Commands::Export(args) => {
            run_command(global, &run_id, "export", || run_export(global, args))
        }
        Commands::Print(args) => run_command(global, &run_id, "print", || run_print(global, args)),
        Commands::Render(args) => {
            run_command(global, &run_id, "render", || run_render(global, args))
        }
        Commands::Version => {
            print_version(global);
            ExitCode::Clean
        }
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command plumbing
// ============================================================================

/// What a successful command reports, in every output format.
struct CommandOutput {
    result: Value,
    markdown: String,
    summary: String,
}

/// A failed command: the error plus the alert the host raised, if any.
struct Failure {
    error: odr_common::Error,
    alert: Option<String>,
}

impl From<odr_common::Error> for Failure {
    fn from(error: odr_common::Error) -> Self {
        Failure { error, alert: None }
    }
}

impl From<ConfigError> for Failure {
    fn from(err: ConfigError) -> Self {
        odr_common::Error::from(err).into()
    }
}

impl From<InputError> for Failure {
    fn from(err: InputError) -> Self {
        odr_common::Error::from(err).into()
    }
}

impl From<TableError> for Failure {
    fn from(err: TableError) -> Self {
        odr_common::Error::from(err).into()
    }
}

impl From<std::io::Error> for Failure {
    fn from(err: std::io::Error) -> Self {
        odr_common::Error::from(err).into()
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        odr_common::Error::from(err).into()
    }
}

type CommandResult = Result<CommandOutput, Failure>;

type Controller<D, P> = TableController<D, P, CliHooks>;

fn run_command(
    global: &GlobalOpts,
    run_id: &str,
    command: &str,
    body: impl FnOnce() -> CommandResult,
) -> ExitCode {
    match body() {
        Ok(output) => {
            emit_output(global, run_id, command, &output);
            ExitCode::Clean
        }
        Err(failure) => {
            let code = ExitCode::for_error(&failure.error);
            if code.is_internal_error() {
                error!(command, code = code.code_name(), error = %failure.error, "Command failed");
            } else if code.is_user_error() {
                warn!(command, code = code.code_name(), error = %failure.error, "Command rejected");
            }
            emit_failure(global, run_id, command, &failure, code);
            code
        }
    }
}

fn emit_output(global: &GlobalOpts, run_id: &str, command: &str, output: &CommandOutput) {
    match global.format {
        OutputFormat::Json => {
            let payload = json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": run_id,
                "generated_at": Utc::now().to_rfc3339(),
                "command": command,
                "status": "ok",
                "result": output.result,
            });
            println!("{}", to_pretty(&payload));
        }
        OutputFormat::Md => println!("{}", output.markdown),
        OutputFormat::Summary => println!("[{}] {}: {}", run_id, command, output.summary),
    }
}

fn emit_failure(
    global: &GlobalOpts,
    run_id: &str,
    command: &str,
    failure: &Failure,
    code: ExitCode,
) {
    if global.format.is_machine() {
        let mut structured =
            StructuredError::from(&failure.error).with_context("exit_code", code.code_name());
        if let Some(alert) = &failure.alert {
            structured = structured.with_context("alert", alert);
        }
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "run_id": run_id,
            "command": command,
            "status": "error",
            "error": structured,
        });
        eprintln!("{}", to_pretty(&payload));
    } else {
        let use_color = std::io::stderr().is_terminal();
        eprintln!("{}", format_error_human(&failure.error, use_color));
        if let Some(alert) = &failure.alert {
            eprintln!("  {}", alert);
        }
    }
}

fn to_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn resolve_config(global: &GlobalOpts) -> Result<ResolvedConfig, ConfigError> {
    load_config(&ConfigOptions {
        config_path: global.config.clone(),
        ..ConfigOptions::default()
    })
}

/// Build a controller for `table` and attach it.
fn attach<D, P>(resolved: &ResolvedConfig, table: &Table, downloads: D, prints: P) -> Result<Controller<D, P>, Failure>
where
    D: DownloadSink,
    P: PrintSink,
{
    let mut controller =
        TableController::new(&resolved.config.table, downloads, prints, CliHooks::new())?;
    controller.initialize(table);
    Ok(controller)
}

/// Dispatch an event, attaching the host's alert to a failure.
fn dispatch<D, P>(
    controller: &mut Controller<D, P>,
    table: &mut Table,
    event: TableEvent,
) -> Result<EventOutcome, Failure>
where
    D: DownloadSink,
    P: PrintSink,
{
    controller
        .dispatch(table, event)
        .map_err(|err| with_alert(controller, err))
}

/// Wrap a table error with the last alert the host raised.
fn with_alert<D, P>(controller: &Controller<D, P>, err: TableError) -> Failure
where
    D: DownloadSink,
    P: PrintSink,
{
    Failure {
        error: err.into(),
        alert: controller.hooks().alerts().last().cloned(),
    }
}

fn out_dir(explicit: &Option<PathBuf>, resolved: &ResolvedConfig) -> PathBuf {
    explicit
        .clone()
        .unwrap_or_else(|| resolved.config.output_dir_or_default())
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_sort(global: &GlobalOpts, args: &SortArgs) -> CommandResult {
    let resolved = resolve_config(global)?;
    let mut table = load_table(&args.input)?;
    let mut controller = attach(
        &resolved,
        &table,
        Vec::<ExportDocument>::new(),
        Vec::<PrintDocument>::new(),
    )?;

    let outcome = if args.descending {
        controller
            .sort_column(&mut table, args.column, SortDirection::Descending)
            .map_err(|err| with_alert(&controller, err))?
    } else {
        let mut last = None;
        for _ in 0..args.clicks {
            if let EventOutcome::Sorted(sorted) =
                dispatch(&mut controller, &mut table, TableEvent::HeaderClick(args.column))?
            {
                last = Some(sorted);
            }
        }
        last.ok_or_else(|| odr_common::Error::Input("no header click was replayed".into()))?
    };

    let written = match &args.output {
        Some(path) => Some(write_table(path, &table)?),
        None => None,
    };

    info!(
        table = %table.id,
        column = outcome.column,
        direction = %outcome.direction,
        "Table sorted"
    );

    let mut result = json!({
        "table_id": table.id,
        "sort": outcome,
        "order": table.row_ids(),
    });
    match &written {
        Some(path) => result["output"] = json!(path.display().to_string()),
        None => result["table"] = serde_json::to_value(&table)?,
    }

    Ok(CommandOutput {
        result,
        markdown: markdown_table(&table),
        summary: format!(
            "sorted {} rows of '{}' by column {} ({})",
            outcome.rows, table.id, outcome.column, outcome.direction
        ),
    })
}

fn run_export(global: &GlobalOpts, args: &ExportArgs) -> CommandResult {
    let resolved = resolve_config(global)?;
    let mut table = load_table(&args.input)?;
    let dir = out_dir(&args.out_dir, &resolved);
    let mut controller = attach(
        &resolved,
        &table,
        FileDownloadSink::new(&dir),
        Vec::<PrintDocument>::new(),
    )?;

    if let Some(column) = args.sort_column {
        dispatch(&mut controller, &mut table, TableEvent::HeaderClick(column))?;
    }
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let filename = match dispatch(&mut controller, &mut table, TableEvent::ExportCsv { date })? {
        EventOutcome::Exported { filename } => filename,
        other => {
            return Err(odr_common::Error::Export(format!("unexpected outcome: {:?}", other)).into())
        }
    };

    let path = controller
        .downloads()
        .written()
        .last()
        .cloned()
        .unwrap_or_else(|| dir.join(&filename));

    Ok(CommandOutput {
        result: json!({
            "table_id": table.id,
            "filename": filename,
            "path": path.display().to_string(),
            "rows": table.row_count(),
            "sorted_column": table.sorted_column().map(|(column, _)| column),
        }),
        markdown: format!(
            "# CSV export\n\n- Table: `{}`\n- File: `{}`\n- Rows: {}",
            table.id,
            path.display(),
            table.row_count()
        ),
        summary: format!("exported '{}' to {}", table.id, path.display()),
    })
}

fn run_print(global: &GlobalOpts, args: &PrintArgs) -> CommandResult {
    let resolved = resolve_config(global)?;
    let mut table = load_table(&args.input)?;
    let dir = out_dir(&args.out_dir, &resolved);
    let mut controller = attach(
        &resolved,
        &table,
        Vec::<ExportDocument>::new(),
        FilePrintSink::new(&dir),
    )?;

    if let Some(column) = args.sort_column {
        dispatch(&mut controller, &mut table, TableEvent::HeaderClick(column))?;
    }
    let title = match dispatch(&mut controller, &mut table, TableEvent::Print)? {
        EventOutcome::Printed { title } => title,
        other => return Err(odr_common::Error::Print(format!("unexpected outcome: {:?}", other)).into()),
    };

    let path = controller
        .prints()
        .written()
        .last()
        .cloned()
        .unwrap_or_else(|| dir.join(FilePrintSink::filename_for(&table.id)));

    Ok(CommandOutput {
        result: json!({
            "table_id": table.id,
            "title": title,
            "path": path.display().to_string(),
        }),
        markdown: format!(
            "# Print view\n\n- Table: `{}`\n- Title: {}\n- File: `{}`",
            table.id,
            title,
            path.display()
        ),
        summary: format!("print view of '{}' written to {}", table.id, path.display()),
    })
}

fn run_render(global: &GlobalOpts, args: &RenderArgs) -> CommandResult {
    let resolved = resolve_config(global)?;
    let table = load_table(&args.input)?;
    let controller = attach(
        &resolved,
        &table,
        Vec::<ExportDocument>::new(),
        Vec::<PrintDocument>::new(),
    )?;
    let binding = controller
        .binding(&table.id)
        .cloned()
        .ok_or_else(|| odr_common::Error::NotInitialized {
            table_id: table.id.clone(),
        })?;

    let mut render = resolved.config.table.render.clone();
    if args.minify {
        render.minify = true;
    }
    let markup = html::render_page(&[(&table, &binding)], &render);

    let mut result = json!({
        "table_id": table.id,
        "binding": binding,
        "bytes": markup.len(),
    });
    let summary = match &args.output {
        Some(path) => {
            std::fs::write(path, &markup)?;
            result["output"] = json!(path.display().to_string());
            format!("rendered '{}' to {}", table.id, path.display())
        }
        None => {
            result["html"] = json!(markup);
            format!("rendered '{}' ({} bytes)", table.id, markup.len())
        }
    };

    Ok(CommandOutput {
        result,
        markdown: markup,
        summary,
    })
}

fn print_version(global: &GlobalOpts) {
    let version_info = json!({
        "schema_version": SCHEMA_VERSION,
        "odr_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json => println!("{}", to_pretty(&version_info)),
        _ => {
            println!("odr {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}

// ============================================================================
// Output helpers
// ============================================================================

/// Write a table as JSON (markers and row ids kept) or as a CSV export.
fn write_table(path: &Path, table: &Table) -> Result<PathBuf, Failure> {
    let bytes = match InputFormat::from_path(path)? {
        InputFormat::Json => serde_json::to_vec_pretty(table)?,
        InputFormat::Csv => {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            CsvExporter::new().export(table, &name)?.bytes
        }
    };
    std::fs::write(path, bytes)?;
    Ok(path.to_path_buf())
}

fn markdown_table(table: &Table) -> String {
    let escape = |text: &str| text.replace('|', "\\|");
    let headers: Vec<String> = table
        .headers
        .iter()
        .map(|header| match header.sort {
            SortState::Ascending => format!("{} ▲", escape(&header.label)),
            SortState::Descending => format!("{} ▼", escape(&header.label)),
            SortState::None => escape(&header.label),
        })
        .collect();

    let mut lines = Vec::with_capacity(table.row_count() + 3);
    if let Some(caption) = &table.caption {
        lines.push(format!("**{}**\n", caption));
    }
    lines.push(format!("| {} |", headers.join(" | ")));
    lines.push(format!("|{}", "---|".repeat(headers.len().max(1))));
    for row in &table.rows {
        let cells: Vec<String> = (0..table.column_count())
            .map(|column| escape(row.text(column)))
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
    lines.join("\n")
}
