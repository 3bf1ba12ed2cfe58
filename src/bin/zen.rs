//! Zen CLI - Command-line interface for Zen Analytics
//!
//! Commands:
//! - report: Build dashboard views from a session export
//! - validate: Validate `sessions` rows
//! - export: Re-export sessions as CSV or JSON
//! - watch: Recompute the dashboard for each change event read from stdin
//! - simulate: Generate mock sessions
//! - doctor: Diagnose configuration and environment
//! - schema: Print input/output schema information

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use zen_analytics::analytics::temporal::stress_trend;
use zen_analytics::config::UnmatchedSeverity;
use zen_analytics::encoder::ReportEncoder;
use zen_analytics::estimator::{simulate_sessions, SimulationPlan};
use zen_analytics::export::{export_sessions, view_to_csv, ExportFormat};
use zen_analytics::schema::{SESSIONS_TABLE, SESSION_COLUMNS};
use zen_analytics::source::{ChangeFeed, NdjsonFeed};
use zen_analytics::types::DashboardReport;
use zen_analytics::{
    build_report, AnalyticsConfig, AnalyticsError, DashboardProcessor, MemorySource,
    RecordAdapter, Session, SessionQuery, SessionRecord, PRODUCER_NAME, ZEN_VERSION,
};

/// Zen - Session analytics for voice-derived stress assessments
#[derive(Parser)]
#[command(name = "zen")]
#[command(author = "Voice-Aware Zen Contributors")]
#[command(version = ZEN_VERSION)]
#[command(about = "Aggregate stress sessions into dashboard views", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build dashboard views from a session export
    Report {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        config: ConfigArgs,

        /// Print a single view instead of the full report
        #[arg(long, value_enum, default_value = "all")]
        view: View,

        /// Output format for a single view
        #[arg(long, value_enum, default_value = "json")]
        format: ViewFormat,

        /// Restrict the stress trend to one user
        #[arg(long)]
        user: Option<String>,

        /// Skip invalid rows instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Validate sessions rows
    Validate {
        #[command(flatten)]
        input: InputArgs,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export sessions as CSV or JSON
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Export format
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportKind,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Only sessions of this user
        #[arg(long)]
        user: Option<String>,

        /// Only sessions in this language
        #[arg(long)]
        language: Option<String>,

        /// Case-insensitive search over user and session ids
        #[arg(long)]
        search: Option<String>,
    },

    /// Recompute the summary for each change event (NDJSON on stdin)
    Watch {
        /// Initial sessions export (JSON array)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Emit the full report instead of the summary
        #[arg(long)]
        full: bool,
    },

    /// Generate mock sessions
    Simulate {
        /// Number of sessions
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,

        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Timestamp of the first session (RFC 3339); defaults to now
        #[arg(long)]
        start: Option<DateTime<Utc>>,

        /// Comma-separated user ids
        #[arg(long, value_delimiter = ',')]
        users: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "ndjson")]
        format: DataFormat,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Check a sessions export
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Input format
    #[arg(long, value_enum, default_value = "json")]
    input_format: DataFormat,
}

#[derive(Args)]
struct ConfigArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Local time offset from UTC in minutes
    #[arg(long, allow_negative_numbers = true)]
    utc_offset: Option<i32>,

    /// Effectiveness above this counts as success (0-1)
    #[arg(long)]
    success_threshold: Option<f64>,

    /// Severity for intervention labels without a keyword
    #[arg(long, value_enum)]
    unmatched_severity: Option<SeverityDefault>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DataFormat {
    /// Newline-delimited JSON (one row per line)
    Ndjson,
    /// JSON array of rows
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportKind {
    Csv,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewFormat {
    Json,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum SeverityDefault {
    Mild,
    Moderate,
    High,
    Skip,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    All,
    Summary,
    Latest,
    Trend,
    Effectiveness,
    BeforeAfter,
    Languages,
    Weekday,
    Period,
    Date,
    Distribution,
    Tiers,
    Timeline,
    Table,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (sessions row)
    Input,
    /// Output schema (dashboard report)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(cli: Cli) -> Result<(), ZenCliError> {
    match cli.command {
        Commands::Report {
            input,
            config,
            view,
            format,
            user,
            lenient,
        } => cmd_report(&input, &config, view, format, user.as_deref(), lenient),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Export {
            input,
            format,
            output,
            user,
            language,
            search,
        } => {
            let mut query = SessionQuery::all();
            if let Some(user) = user {
                query = query.user(user);
            }
            if let Some(language) = language {
                query = query.language(language);
            }
            if let Some(search) = search {
                query = query.search(search);
            }
            cmd_export(&input, format, &output, &query)
        }

        Commands::Watch {
            snapshot,
            config,
            full,
        } => cmd_watch(snapshot.as_deref(), &config, full),

        Commands::Simulate {
            count,
            seed,
            start,
            users,
            format,
        } => cmd_simulate(count, seed, start, users, format),

        Commands::Doctor { config, input, json } => {
            cmd_doctor(config.as_deref(), input.as_deref(), json)
        }

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_report(
    input: &InputArgs,
    config_args: &ConfigArgs,
    view: View,
    format: ViewFormat,
    user: Option<&str>,
    lenient: bool,
) -> Result<(), ZenCliError> {
    let config = load_config(config_args)?;
    let sessions = load_sessions(input, lenient)?;
    let report = build_report(&sessions, &config);

    let output = match view {
        View::Trend if user.is_some() => {
            let trend = stress_trend(&sessions, user, config.trend_limit);
            render_rows(&trend, format)?
        }
        _ => render_view(&report, view, format)?,
    };

    println!("{}", output.trim_end());
    Ok(())
}

fn render_view(report: &DashboardReport, view: View, format: ViewFormat) -> Result<String, ZenCliError> {
    match view {
        View::All => Ok(ReportEncoder::new().encode_to_json(report)?),
        View::Summary => render_rows(std::slice::from_ref(&report.summary), format),
        View::Latest => match &report.latest_stress {
            Some(latest) => render_rows(std::slice::from_ref(latest), format),
            None => Ok("null".to_string()),
        },
        View::Trend => render_rows(&report.stress_trend, format),
        View::Effectiveness => render_rows(&report.effectiveness_by_intervention, format),
        View::BeforeAfter => render_rows(&report.before_after, format),
        View::Languages => render_rows(&report.language_distribution, format),
        View::Weekday => render_rows(&report.stress_by_weekday, format),
        View::Period => render_rows(&report.stress_by_period, format),
        View::Date => render_rows(&report.stress_by_date, format),
        View::Distribution => render_rows(&report.stress_distribution, format),
        View::Tiers => render_rows(&report.effect_tiers, format),
        View::Timeline => render_rows(&report.intervention_timeline, format),
        View::Table => render_rows(&report.recent_sessions, format),
    }
}

fn render_rows<T: Serialize>(rows: &[T], format: ViewFormat) -> Result<String, ZenCliError> {
    match format {
        ViewFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        ViewFormat::Csv => Ok(view_to_csv(rows)?),
    }
}

fn cmd_validate(input: &InputArgs, json: bool) -> Result<(), ZenCliError> {
    let records = load_records(input)?;
    let results = RecordAdapter::validate_records(&records);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - results.len(),
        invalid_records: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                session_id: r.session_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Session {} (index {}): {}", err.session_id, err.index, err.error);
            }
        }
    }

    if report.invalid_records > 0 {
        Err(ZenCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_export(
    input: &InputArgs,
    format: ExportKind,
    output: &Path,
    query: &SessionQuery,
) -> Result<(), ZenCliError> {
    let sessions = query.apply(&load_sessions(input, false)?);
    if sessions.is_empty() {
        return Err(ZenCliError::NoSessions);
    }

    let format = match format {
        ExportKind::Csv => ExportFormat::Csv,
        ExportKind::Json => ExportFormat::Json,
    };
    let data = export_sessions(&sessions, format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", data);
        if !data.ends_with('\n') {
            println!();
        }
    } else {
        fs::write(output, data)?;
        info!(rows = sessions.len(), path = %output.display(), "exported sessions");
    }

    Ok(())
}

fn cmd_watch(snapshot: Option<&Path>, config_args: &ConfigArgs, full: bool) -> Result<(), ZenCliError> {
    let config = load_config(config_args)?;

    let initial = match snapshot {
        Some(path) => {
            let records = RecordAdapter::parse_array(&fs::read_to_string(path)?)?;
            RecordAdapter::to_sessions(records)?
        }
        None => Vec::new(),
    };

    let mut source = MemorySource::new(initial);
    let mut processor = DashboardProcessor::new(config);
    let mut stdout = io::stdout();

    let report = processor.refresh(&source)?;
    write_update(&mut stdout, None, report, full)?;

    let stdin = io::stdin();
    let mut feed = NdjsonFeed::new(stdin.lock());

    while let Some(next) = feed.next_event() {
        let event = match next {
            Ok(event) => event,
            Err(AnalyticsError::SourceError(msg)) => {
                return Err(ZenCliError::Analytics(AnalyticsError::SourceError(msg)))
            }
            Err(e) => {
                warn!(error = %e, "skipping unreadable change event");
                continue;
            }
        };

        if let Err(e) = source.apply(&event) {
            warn!(error = %e, session_id = ?event.session_id(), "change event rejected");
            continue;
        }

        let report = processor.on_change(&event, &source)?;
        write_update(&mut stdout, Some(&event), report, full)?;
    }

    debug!(sessions = source.len(), "change feed closed");
    Ok(())
}

fn write_update(
    out: &mut impl Write,
    event: Option<&zen_analytics::ChangeEvent>,
    report: &DashboardReport,
    full: bool,
) -> Result<(), ZenCliError> {
    let update = WatchUpdate {
        event: event.map(|e| format!("{:?}", e.kind).to_uppercase()),
        session_id: event.and_then(|e| e.session_id()).map(str::to_string),
        summary: (!full).then_some(&report.summary),
        latest_stress: if full { None } else { report.latest_stress.as_ref() },
        report: full.then_some(report),
    };
    writeln!(out, "{}", serde_json::to_string(&update)?)?;
    out.flush()?;
    Ok(())
}

fn cmd_simulate(
    count: usize,
    seed: Option<u64>,
    start: Option<DateTime<Utc>>,
    users: Vec<String>,
    format: DataFormat,
) -> Result<(), ZenCliError> {
    let mut plan = SimulationPlan::new(count, start.unwrap_or_else(Utc::now));
    if !users.is_empty() {
        plan.users = users;
    }

    let records: Vec<SessionRecord> = simulate_sessions(&plan, seed)?
        .into_iter()
        .map(SessionRecord::from)
        .collect();

    match format {
        DataFormat::Ndjson => {
            let mut stdout = io::stdout();
            for record in &records {
                writeln!(stdout, "{}", serde_json::to_string(record)?)?;
            }
        }
        DataFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
    }

    Ok(())
}

fn cmd_doctor(config: Option<&Path>, input: Option<&Path>, json: bool) -> Result<(), ZenCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "zen_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Zen version {}", ZEN_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input table: {} ({} columns)", SESSIONS_TABLE, SESSION_COLUMNS.len()),
    });

    if let Some(config_path) = config {
        checks.push(if config_path.exists() {
            match AnalyticsConfig::load(config_path) {
                Ok(c) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid (threshold {}, offset {} min)",
                        c.success_threshold, c.utc_offset_minutes
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            }
        } else {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        });
    }

    if let Some(input_path) = input {
        let check = match fs::read_to_string(input_path) {
            Ok(content) => match RecordAdapter::parse_array(&content) {
                Ok(records) => {
                    let invalid = RecordAdapter::validate_records(&records).len();
                    DoctorCheck {
                        name: "input".to_string(),
                        status: if invalid == 0 {
                            CheckStatus::Ok
                        } else {
                            CheckStatus::Warning
                        },
                        message: format!("{} records, {} invalid", records.len(), invalid),
                    }
                }
                Err(e) => DoctorCheck {
                    name: "input".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid sessions JSON: {}", e),
                },
            },
            Err(e) => DoctorCheck {
                name: "input".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read input file: {}", e),
            },
        };
        checks.push(check);
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (watch mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ZEN_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Zen Doctor Report");
        println!("=================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(ZenCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), ZenCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {} row", SESSIONS_TABLE);
                println!();
                println!("- session_id: string, unique (required)");
                println!("- user_id: string (required)");
                println!("- timestamp: RFC 3339 date-time (required)");
                println!("- stress_score: number in [0, 1] (required)");
                println!("- language: string, e.g. en, hi, kn, ta, te (optional)");
                println!("- intervention: string (optional)");
                println!("- effectiveness: number in [0, 1] (optional)");
                println!();
                println!("Accepted as a JSON array or NDJSON (one row per line).");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: dashboard report");
                println!();
                println!("- report_version: Envelope version");
                println!("- producer: {{ name, version, instance_id }}");
                println!("- provenance: {{ source_table, session_count, computed_at_utc }}");
                println!("- report:");
                println!("  - summary: {{ total_sessions, average_stress, success_rate, ... }}");
                println!("  - latest_stress, stress_trend, users");
                println!("  - effectiveness_by_intervention, before_after, language_distribution");
                println!("  - stress_by_weekday (7), stress_by_period (4), stress_by_date");
                println!("  - stress_distribution (5), effect_tiers (3), intervention_timeline");
                println!("  - recent_sessions");
            }
        }
    }
    Ok(())
}

// Helper functions

fn load_config(args: &ConfigArgs) -> Result<AnalyticsConfig, ZenCliError> {
    let mut config = match &args.config {
        Some(path) => AnalyticsConfig::load(path)?,
        None => AnalyticsConfig::default(),
    };

    if let Some(offset) = args.utc_offset {
        config.utc_offset_minutes = offset;
    }
    if let Some(threshold) = args.success_threshold {
        config.success_threshold = threshold;
    }
    if let Some(unmatched) = args.unmatched_severity {
        config.unmatched_severity = match unmatched {
            SeverityDefault::Mild => UnmatchedSeverity::Mild,
            SeverityDefault::Moderate => UnmatchedSeverity::Moderate,
            SeverityDefault::High => UnmatchedSeverity::High,
            SeverityDefault::Skip => UnmatchedSeverity::Skip,
        };
    }

    config.validate()?;
    debug!(?config, "loaded configuration");
    Ok(config)
}

fn read_input(path: &Path) -> Result<String, ZenCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn load_records(input: &InputArgs) -> Result<Vec<SessionRecord>, ZenCliError> {
    let data = read_input(&input.input)?;
    let records = match input.input_format {
        DataFormat::Ndjson => RecordAdapter::parse_ndjson(&data)?,
        DataFormat::Json => RecordAdapter::parse_array(&data)?,
    };
    debug!(records = records.len(), "read session records");
    Ok(records)
}

fn load_sessions(input: &InputArgs, lenient: bool) -> Result<Vec<Session>, ZenCliError> {
    let records = load_records(input)?;
    if lenient {
        let (sessions, rejected) = RecordAdapter::to_sessions_lenient(records);
        if !rejected.is_empty() {
            warn!(rejected = rejected.len(), "skipped invalid session records");
        }
        Ok(sessions)
    } else {
        Ok(RecordAdapter::to_sessions(records)?)
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "sessions row",
        "description": "Voice stress assessment session",
        "type": "object",
        "required": ["session_id", "user_id", "timestamp", "stress_score"],
        "properties": {
            "session_id": { "type": "string" },
            "user_id": { "type": "string" },
            "timestamp": { "type": "string", "format": "date-time" },
            "stress_score": { "type": "number", "minimum": 0, "maximum": 1 },
            "language": { "type": ["string", "null"] },
            "intervention": { "type": ["string", "null"] },
            "effectiveness": { "type": ["number", "null"], "minimum": 0, "maximum": 1 }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let array = serde_json::json!({ "type": "array", "items": { "type": "object" } });
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "zen dashboard report",
        "type": "object",
        "required": ["report_version", "producer", "provenance", "report"],
        "properties": {
            "report_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "provenance": {
                "type": "object",
                "properties": {
                    "source_table": { "type": "string" },
                    "session_count": { "type": "integer" },
                    "computed_at_utc": { "type": "string" }
                }
            },
            "report": {
                "type": "object",
                "properties": {
                    "summary": { "type": "object" },
                    "latest_stress": { "type": ["object", "null"] },
                    "stress_trend": array,
                    "users": { "type": "array", "items": { "type": "string" } },
                    "effectiveness_by_intervention": array,
                    "before_after": array,
                    "language_distribution": array,
                    "stress_by_weekday": array,
                    "stress_by_period": array,
                    "stress_by_date": array,
                    "stress_distribution": array,
                    "effect_tiers": array,
                    "intervention_timeline": array,
                    "recent_sessions": array
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum ZenCliError {
    Io(io::Error),
    Analytics(AnalyticsError),
    Json(serde_json::Error),
    NoSessions,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for ZenCliError {
    fn from(e: io::Error) -> Self {
        ZenCliError::Io(e)
    }
}

impl From<AnalyticsError> for ZenCliError {
    fn from(e: AnalyticsError) -> Self {
        ZenCliError::Analytics(e)
    }
}

impl From<serde_json::Error> for ZenCliError {
    fn from(e: serde_json::Error) -> Self {
        ZenCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ZenCliError> for CliError {
    fn from(e: ZenCliError) -> Self {
        match e {
            ZenCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ZenCliError::Analytics(e) => {
                let (code, hint) = match &e {
                    AnalyticsError::ConfigError(_) => ("CONFIG_ERROR", "Check the config file and flag values"),
                    AnalyticsError::Validation(_) | AnalyticsError::MissingField(_) => {
                        ("VALIDATION_ERROR", "Run 'zen validate' for details")
                    }
                    AnalyticsError::ExportError(_) => ("EXPORT_ERROR", "Check that the input contains sessions"),
                    AnalyticsError::SourceError(_) => ("SOURCE_ERROR", "Check the input stream"),
                    AnalyticsError::EstimatorError(_) => ("ESTIMATOR_ERROR", "Check the audio input"),
                    _ => ("PARSE_ERROR", "Ensure input matches the sessions row schema ('zen schema input')"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            ZenCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ZenCliError::NoSessions => CliError {
                code: "NO_SESSIONS".to_string(),
                message: "No sessions to export".to_string(),
                hint: Some("Ensure the input is not empty and the filters match".to_string()),
            },
            ZenCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            ZenCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    index: usize,
    session_id: String,
    error: String,
}

#[derive(Serialize)]
struct WatchUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a zen_analytics::types::SummaryStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest_stress: Option<&'a zen_analytics::types::LatestStress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a DashboardReport>,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
