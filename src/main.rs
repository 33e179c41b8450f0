use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use research_query::config::{
    find_config_file, get_config, load_config, user_config_path, Config, ConfigFile,
    CONFIG_FILE_NAME,
};
use research_query::models::{ColumnSet, ParseConditionError, ResultRecord, SearchField};
use research_query::query::{ActionOutcome, QueryBuilder};
use research_query::session::{parse_column_spec, parse_terms, Effect, Session, HELP};
use research_query::sources::{MockResultSource, ResultSource};
use research_query::ui::{self, Spinner, Status};
use research_query::utils::{
    format_value, is_terminal, records_table, terminal_width, with_retry, SystemClipboard,
    SystemUrlOpener,
};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Research Query - Build boolean PubMed queries from keyword conditions
#[derive(Parser, Debug)]
#[command(name = "research-query")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build boolean PubMed queries from keyword conditions", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

/// Terms and identifiers describing one query
#[derive(Args, Debug, Clone, Default)]
struct QueryArgs {
    /// Search terms: [FIELD:]KEYWORD, optionally separated by `and` / `or`.
    /// Wrap a keyword in double quotes for an exact phrase.
    terms: Vec<String>,

    /// Comma-separated PMIDs or DOIs, OR-ed together and AND-ed onto the terms
    #[arg(long)]
    ids: Option<String>,

    /// Field for terms without a FIELD: prefix (default from config)
    #[arg(long, short, value_parser = parse_field)]
    field: Option<SearchField>,

    /// Use this query text instead of the generated one
    #[arg(long, value_name = "QUERY")]
    raw: Option<String>,
}

fn parse_field(value: &str) -> Result<SearchField, String> {
    value.parse().map_err(|e: ParseConditionError| e.to_string())
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the query and readable sentence for the given terms
    #[command(alias = "b")]
    Build(QueryArgs),

    /// Print the external search URL
    Url(QueryArgs),

    /// Copy the query to the clipboard
    Copy(QueryArgs),

    /// Open the query in the external search page
    Open(QueryArgs),

    /// Fetch (mock) results for the query
    #[command(alias = "f")]
    Fetch {
        #[command(flatten)]
        query: QueryArgs,

        /// Label a result column, as KEY=DESCRIPTION (repeatable)
        #[arg(long = "column", short = 'c', value_name = "KEY=DESCRIPTION")]
        columns: Vec<String>,
    },

    /// List searchable fields and their aliases
    Fields,

    /// Start an interactive session, optionally seeded with terms
    #[command(alias = "i")]
    Session(QueryArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Write a default configuration file
    Init {
        /// Where to write it (default: user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Research Query - Environment Variables");
    println!();
    println!("Search Settings:");
    println!("  RESEARCH_QUERY_SEARCH__HOST            External search host (default: pubmed.ncbi.nlm.nih.gov)");
    println!("  RESEARCH_QUERY_SEARCH__DEFAULT_FIELD   Field for terms without a prefix (default: Title/Abstract)");
    println!();
    println!("Fetch Settings:");
    println!("  RESEARCH_QUERY_FETCH__SIMULATED_LATENCY_MS  Mock fetch latency in ms (default: 1500)");
    println!("  RESEARCH_QUERY_FETCH__RETRY_ATTEMPTS        Attempts per fetch (default: 3)");
    println!("  RESEARCH_QUERY_FETCH__INITIAL_BACKOFF_MS    First retry delay in ms (default: 500)");
    println!();
    println!("Other Settings:");
    println!("  RESEARCH_QUERY_LOGGING__LEVEL  Default log level (default: info)");
    println!("  RUST_LOG                       Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Environment variables override the config file when one is loaded.");
    std::process::exit(0);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
    }

    let config_path = cli.config.clone().or_else(find_config_file);
    let config = match &config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => get_config().context("Failed to read environment overrides")?,
    };

    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    let json_logs = config.logging.is_json();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("research_query={}", env_filter)),
        ))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }
    config.validate()?;

    let format = cli.output.resolve();

    match cli.command {
        Some(Commands::Build(args)) => {
            let builder = build_query(&args, &config)?;
            output_query(&builder, format)?;
        }
        Some(Commands::Url(args)) => {
            let builder = build_query(&args, &config)?;
            match builder.external_search_url() {
                Some(url) => println!("{}", url),
                None => ui::print_status(Status::Warning, "Query is empty, no URL to show"),
            }
        }
        Some(Commands::Copy(args)) => {
            let builder = build_query(&args, &config)?;
            copy_query(&builder, cli.quiet)?;
        }
        Some(Commands::Open(args)) => {
            let builder = build_query(&args, &config)?;
            open_query(&builder, cli.quiet)?;
        }
        Some(Commands::Fetch { query, columns }) => {
            let builder = build_query(&query, &config)?;
            let columns: ColumnSet = columns.iter().map(|spec| parse_column_spec(spec)).collect();
            let records = fetch_records(&builder, &config, cli.quiet || format == OutputFormat::Json).await?;
            output_records(&records, &columns, format)?;
        }
        Some(Commands::Fields) => output_fields(format)?,
        Some(Commands::Session(args)) => {
            let builder = build_query(&args, &config)?;
            run_session(Session::new(builder), &config).await?;
        }
        Some(Commands::Config { action }) => run_config_action(action, &config)?,
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "research-query",
                &mut std::io::stdout(),
            );
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Build a query from CLI terms, applying `--raw` as a saved manual edit
fn build_query(args: &QueryArgs, config: &Config) -> Result<QueryBuilder> {
    let field = args.field.unwrap_or(config.search.default_field);
    let conditions = parse_terms(&args.terms, field)?;

    let mut builder =
        QueryBuilder::with_conditions(conditions, args.ids.clone().unwrap_or_default())
            .search_host(config.search.host.clone());

    if let Some(raw) = &args.raw {
        builder.begin_manual_edit();
        builder.set_manual_text(raw.clone());
        builder.save_manual_edit();
    }

    Ok(builder)
}

fn copy_query(builder: &QueryBuilder, quiet: bool) -> Result<()> {
    let mut clipboard = SystemClipboard::new();
    match builder.copy_authoritative_query(&mut clipboard)? {
        ActionOutcome::Performed if !quiet => {
            ui::print_status(Status::Success, "Query copied to clipboard")
        }
        ActionOutcome::SkippedEmpty => {
            ui::print_status(Status::Warning, "Query is empty, nothing copied")
        }
        ActionOutcome::Performed => {}
    }
    Ok(())
}

fn open_query(builder: &QueryBuilder, quiet: bool) -> Result<()> {
    let mut opener = SystemUrlOpener;
    match builder.open_in_external_search(&mut opener)? {
        ActionOutcome::Performed if !quiet => {
            ui::print_status(Status::Success, "Opened search page")
        }
        ActionOutcome::SkippedEmpty => {
            ui::print_status(Status::Warning, "Query is empty, nothing to open")
        }
        ActionOutcome::Performed => {}
    }
    Ok(())
}

async fn fetch_records(
    builder: &QueryBuilder,
    config: &Config,
    hide_progress: bool,
) -> Result<Vec<ResultRecord>> {
    let source = MockResultSource::with_delay(config.fetch.latency());
    let request = builder.fetch_request();

    let spinner = if hide_progress || !std::io::stderr().is_terminal() {
        Spinner::hidden()
    } else {
        Spinner::new(&format!("Fetching results from {}...", source.name()))
    };

    match with_retry(config.fetch.retry_config(), || source.fetch(&request)).await {
        Ok(records) => {
            spinner.finish_with_success(&format!("{} results", records.len()));
            Ok(records)
        }
        Err(e) => {
            spinner.finish_with_error("Fetch failed");
            Err(e).context("Failed to fetch results")
        }
    }
}

fn output_query(builder: &QueryBuilder, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&builder.snapshot())?);
        }
        OutputFormat::Plain => {
            println!("{}", builder.authoritative_query());
            if let Some(sentence) = builder.visible_sentence() {
                println!("{}", sentence);
            }
        }
        OutputFormat::Table | OutputFormat::Auto => ui::print_query(builder),
    }
    Ok(())
}

fn output_records(records: &[ResultRecord], columns: &ColumnSet, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        OutputFormat::Plain => {
            for record in records {
                for (key, value) in record {
                    println!("{}: {}", columns.label_for(key), format_value(value));
                }
                println!();
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            if records.is_empty() {
                ui::print_status(Status::Info, "No results");
            } else {
                println!("{}", records_table(records, columns, terminal_width()));
            }
        }
    }
    Ok(())
}

fn output_fields(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let fields: Vec<_> = SearchField::ALL
                .iter()
                .map(|field| serde_json::json!({ "name": field.as_str(), "aliases": field.aliases() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        OutputFormat::Plain => {
            for field in SearchField::ALL {
                println!("{}\t{}", field.as_str(), field.aliases().join(", "));
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Field", "Aliases"]);
            for field in SearchField::ALL {
                table.add_row(vec![
                    Cell::new(field.as_str()).add_attribute(Attribute::Bold),
                    Cell::new(field.aliases().join(", ")),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn run_config_action(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", ConfigFile::from(config.clone()).to_toml()?);
        }
        ConfigAction::Init { path, force } => {
            let path = path
                .or_else(user_config_path)
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            ConfigFile::default().save(&path)?;
            ui::print_status(
                Status::Success,
                &format!("Wrote default config to {}", path.display()),
            );
        }
    }
    Ok(())
}

async fn run_session(mut session: Session, config: &Config) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    if interactive {
        ui::print_banner();
        ui::print_query(session.builder());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let effect = match session.execute_line(&line) {
            Ok(effect) => effect,
            Err(e) => {
                ui::print_status(Status::Error, &e.to_string());
                continue;
            }
        };

        match effect {
            Effect::Updated | Effect::Show => ui::print_query(session.builder()),
            Effect::Ignored(reason) => ui::print_status(Status::Warning, &reason),
            Effect::Copy => {
                if let Err(e) = copy_query(session.builder(), false) {
                    ui::print_status(Status::Error, &e.to_string());
                }
            }
            Effect::Open => {
                if let Err(e) = open_query(session.builder(), false) {
                    ui::print_status(Status::Error, &e.to_string());
                }
            }
            Effect::Url => match session.builder().external_search_url() {
                Some(url) => println!("{}", url),
                None => ui::print_status(Status::Warning, "Query is empty, no URL to show"),
            },
            Effect::Fetch => match fetch_records(session.builder(), config, !interactive).await {
                Ok(records) => output_records(&records, session.columns(), OutputFormat::Table)?,
                Err(e) => ui::print_status(Status::Error, &format!("{:#}", e)),
            },
            Effect::Help => println!("{}", HELP),
            Effect::Quit => break,
        }
    }

    Ok(())
}
