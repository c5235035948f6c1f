use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use inventory_loader::{
    load_table, parse_csv, CsvFileSource, InMemorySource, LoadStats, LoaderError, TableCache,
    TableSource,
};
use inventory_protocol::{
    display_fields, enforce_max_chars, serialize_json, ErrorEnvelope, LookupResponse,
    TableSummary,
};
use inventory_search::{Locale, QueryEngine};
use inventory_table::ItemTable;

use crate::chat::{run_chat, ChatOptions};
use crate::config::{parse_delimiter, FinderConfig};

mod chat;
mod config;
mod render;

const STDIN_SOURCE: &str = "-";
const INVALID_CONFIG: &str = "invalid_config";

#[derive(Parser)]
#[command(name = "inventory-finder")]
#[command(about = "Look up inventory items by serial, product or holder", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (TOML or JSON); overrides INVENTORY_FINDER_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Inventory CSV export; `-` reads it from stdin
    #[arg(short, long, global = true)]
    source: Option<String>,

    /// CSV field delimiter (single character, or `tab`)
    #[arg(long, global = true)]
    delimiter: Option<String>,

    /// Language of messages: vi|en
    #[arg(long, global = true)]
    locale: Option<Locale>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one query and exit
    Search(SearchArgs),

    /// Answer queries line by line from stdin
    Chat(ChatArgs),

    /// Show detected columns, load statistics and the first items
    Inspect(InspectArgs),

    /// Print the flattened item table
    Normalize(NormalizeArgs),

    /// Print JSON schemas of the --json outputs
    Schema,
}

#[derive(Args)]
struct SearchArgs {
    /// Serial, product name or code, holder, region, or a mix of words
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// Emit a JSON response instead of text
    #[arg(long)]
    json: bool,

    /// Maximum items to print
    #[arg(long, default_value_t = 50)]
    limit: usize,

    /// Drop items until the JSON response fits in this many characters
    #[arg(long, requires = "json")]
    max_chars: Option<usize>,
}

#[derive(Args)]
struct ChatArgs {
    /// Emit one JSON response per prompt
    #[arg(long)]
    json: bool,

    /// Maximum items per answer
    #[arg(long, default_value_t = 20)]
    limit: usize,

    /// Reload the export after this many seconds (overrides the config)
    #[arg(long)]
    refresh_seconds: Option<u64>,
}

#[derive(Args)]
struct InspectArgs {
    #[arg(long)]
    json: bool,

    /// Items to preview
    #[arg(long, default_value_t = 5)]
    rows: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Args)]
struct NormalizeArgs {
    #[arg(long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Shorthand for `--format json`
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl NormalizeArgs {
    const fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

/// Settings shared by every subcommand after merging flags over the config.
struct Session {
    config: FinderConfig,
    source: Option<String>,
    json_errors: bool,
}

impl Session {
    fn new(cli: &Cli, config: FinderConfig) -> Result<Self> {
        let mut config = config;
        if let Some(delimiter) = &cli.delimiter {
            config.delimiter = parse_delimiter(delimiter).context("--delimiter")?;
        }
        if let Some(locale) = cli.locale {
            config.locale = locale;
        }
        let source = cli.source.clone().or_else(|| {
            config
                .source
                .as_ref()
                .map(|path| path.display().to_string())
        });
        Ok(Self {
            config,
            source,
            json_errors: wants_json(&cli.command),
        })
    }

    fn engine(&self) -> QueryEngine {
        QueryEngine::new(self.config.locale)
    }

    fn table_source(&self) -> Result<Box<dyn TableSource>> {
        let Some(source) = self.source.as_deref() else {
            return Err(anyhow!(
                "No inventory export given; pass --source <file.csv> or set source.path"
            ));
        };
        if source == STDIN_SOURCE {
            let raw = parse_csv(io::stdin().lock(), self.config.delimiter)
                .context("Failed to read the export from stdin")?;
            if raw.headers.is_empty() {
                return Err(LoaderError::MissingHeader("stdin".to_string()).into());
            }
            return Ok(Box::new(InMemorySource::new("stdin", raw)));
        }
        Ok(Box::new(
            CsvFileSource::new(source).with_delimiter(self.config.delimiter),
        ))
    }

    /// Load once, failing loudly; one-shot commands have no stale copy to
    /// fall back to.
    fn load(&self) -> Result<(ItemTable, LoadStats)> {
        let source = self.table_source()?;
        let normalizer = self.config.normalizer()?;
        load_table(source.as_ref(), &normalizer)
            .with_context(|| format!("Failed to load {}", source.describe()))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    // stdout carries JSON in --json mode; keep stderr to warnings too.
    if cli.quiet || (wants_json(&cli.command) && !cli.verbose) {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = match FinderConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return report(&err, wants_json(&cli.command), INVALID_CONFIG),
    };
    let session = match Session::new(&cli, config) {
        Ok(session) => session,
        Err(err) => return report(&err, wants_json(&cli.command), "invalid_arguments"),
    };

    let result = match cli.command {
        Commands::Search(args) => run_search(&session, args),
        Commands::Chat(args) => run_chat_command(&session, args),
        Commands::Inspect(args) => run_inspect(&session, &args),
        Commands::Normalize(args) => run_normalize(&session, &args),
        Commands::Schema => run_schema(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err, session.json_errors, "failed"),
    }
}

fn wants_json(command: &Commands) -> bool {
    match command {
        Commands::Search(args) => args.json,
        Commands::Chat(args) => args.json,
        Commands::Inspect(args) => args.json,
        Commands::Normalize(args) => matches!(args.output_format(), OutputFormat::Json),
        Commands::Schema => true,
    }
}

/// Print `err` as an error envelope on stdout (JSON mode) or as text on
/// stderr, and pick the exit code.
fn report(err: &anyhow::Error, json: bool, code: &str) -> ExitCode {
    let message = format!("{err:#}");
    log::debug!("command failed: {message}");
    if json {
        let mut envelope = ErrorEnvelope::new(code, message);
        if code == INVALID_CONFIG {
            envelope = envelope.with_hint(config::allowed_keys_hint());
        }
        match serialize_json(&envelope) {
            Ok(body) => println!("{body}"),
            Err(err) => eprintln!("Error: {err:#}"),
        }
    } else {
        eprintln!("Error: {message}");
    }
    ExitCode::FAILURE
}

fn run_search(session: &Session, args: SearchArgs) -> Result<()> {
    let query = args.query.join(" ");
    let (table, _stats) = session.load()?;
    let fields = display_fields(&table, &session.config.display);
    let outcome = session.engine().search(&query, &table);

    let mut stdout = io::stdout().lock();
    if args.json {
        let mut response = LookupResponse::from_outcome(&query, &outcome, &table, &fields);
        response.truncate_items(args.limit);
        if let Some(max_chars) = args.max_chars {
            enforce_max_chars(&mut response, max_chars)?;
        }
        writeln!(stdout, "{}", serialize_json(&response)?)?;
    } else {
        write!(
            stdout,
            "{}",
            render::lookup_text(
                session.engine().messages(),
                &table,
                &outcome,
                &fields,
                args.limit,
            )
        )?;
    }
    Ok(())
}

fn run_chat_command(session: &Session, args: ChatArgs) -> Result<()> {
    if session.source.as_deref() == Some(STDIN_SOURCE) {
        return Err(anyhow!(
            "chat reads prompts from stdin; pass the export with --source <file.csv>"
        ));
    }
    let refresh = args
        .refresh_seconds
        .map_or(session.config.refresh, Duration::from_secs);
    let cache = TableCache::new(
        session.table_source()?,
        session.config.normalizer()?,
        refresh,
    );
    cache
        .refresh()
        .with_context(|| format!("Failed to load {}", cache.source().describe()))?;

    let options = ChatOptions {
        fields: display_fields(&cache.snapshot(), &session.config.display),
        limit: args.limit,
        json: args.json,
    };
    let answered = run_chat(
        &cache,
        &session.engine(),
        &options,
        io::stdin().lock(),
        io::stdout().lock(),
    )?;
    log::info!(
        "chat finished after {answered} answers (refresh every {}s)",
        cache.ttl().as_secs()
    );
    Ok(())
}

fn run_inspect(session: &Session, args: &InspectArgs) -> Result<()> {
    let (table, stats) = session.load()?;
    let fields = display_fields(&table, &session.config.display);
    let mut summary = TableSummary::new(stats.source.clone(), &table, &fields).with_load_counts(
        stats.raw_rows,
        stats.dropped_rows,
        stats.filled_cells,
        stats.time_ms,
    );
    summary.truncate_preview(args.rows);

    let mut stdout = io::stdout().lock();
    if args.json {
        writeln!(stdout, "{}", serialize_json(&summary)?)?;
    } else {
        write!(stdout, "{}", render::summary_text(&summary, &table, &fields))?;
        if !table.has_serial() {
            writeln!(stdout, "\n{}", session.engine().messages().missing_serial())?;
        }
    }
    Ok(())
}

fn run_normalize(session: &Session, args: &NormalizeArgs) -> Result<()> {
    let (table, stats) = session.load()?;
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_table(&table, args.output_format(), BufWriter::new(file))?;
            log::info!("Wrote {} items to {}", stats.items, path.display());
        }
        None => write_table(&table, args.output_format(), io::stdout().lock())?,
    }
    Ok(())
}

fn write_table<W: Write>(table: &ItemTable, format: OutputFormat, mut out: W) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(table.columns())?;
            for record in table.records() {
                writer.write_record(record.cells())?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            let rows: Vec<serde_json::Map<String, serde_json::Value>> = table
                .records()
                .iter()
                .map(|record| {
                    table
                        .pairs(record)
                        .map(|(column, value)| {
                            (column.to_string(), serde_json::Value::from(value))
                        })
                        .collect()
                })
                .collect();
            serde_json::to_writer(&mut out, &rows)?;
            writeln!(out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn run_schema() -> Result<()> {
    let schemas = serde_json::json!({
        "lookup_response": schemars::schema_for!(LookupResponse),
        "table_summary": schemars::schema_for!(TableSummary),
        "error": schemars::schema_for!(ErrorEnvelope),
    });
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}
