//! Host Hunt CLI
//!
//! Determine where any website is hosted from the command line.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value};

use hosthunt::detect::{
    DetectionDetails, HostHunter, LookupError, LookupOutcome, LookupPhase, SignatureTable,
};
use hosthunt::dns::context::HuntConfig;
use hosthunt::dns::logging::{LogLevel, StructuredLogger};

/// Host Hunt - identify the hosting provider behind a domain
#[derive(Parser)]
#[command(name = "hosthunt")]
#[command(version)]
#[command(about = "Determine where any website is hosted", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short = 'c', long, env = "HOSTHUNT_CONFIG")]
    config: Option<PathBuf>,

    /// DoH JSON endpoint
    #[arg(short = 'e', long, env = "HOSTHUNT_DOH_ENDPOINT")]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// Signature table replacing the built-in providers (TOML)
    #[arg(short = 's', long, env = "HOSTHUNT_SIGNATURES")]
    signatures: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// No color output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, PartialEq)]
enum OutputFormat {
    Table,
    Json,
    Yaml,
    Plain,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the provider serving a domain or URL
    Detect(DetectArgs),

    /// List provider signatures in match priority order
    Providers,
}

#[derive(Args)]
struct DetectArgs {
    /// Domain or URL, e.g. example.com or https://example.com/page
    target: String,

    /// Also print the raw DNS answers
    #[arg(short, long)]
    records: bool,
}

/// Output formatter
struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    fn new(format: OutputFormat, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format }
    }

    fn print_value(&self, data: &Value) {
        match self.format {
            OutputFormat::Yaml => match serde_yaml::to_string(data) {
                Ok(yaml) => print!("{}", yaml),
                Err(e) => self.print_error(&format!("Failed to render YAML: {}", e)),
            },
            _ => match serde_json::to_string_pretty(data) {
                Ok(json) => println!("{}", json),
                Err(e) => self.print_error(&format!("Failed to render JSON: {}", e)),
            },
        }
    }

    fn print_outcome(&self, outcome: &LookupOutcome, with_records: bool) {
        let details = DetectionDetails::new(&outcome.result, &outcome.records);

        match self.format {
            OutputFormat::Json | OutputFormat::Yaml => {
                let mut data = json!({
                    "hostname": outcome.hostname,
                    "result": outcome.result,
                    "details": details,
                });
                if with_records {
                    data["records"] = json!(outcome.records);
                }
                self.print_value(&data);
            }
            OutputFormat::Plain => {
                println!("{}", outcome.result.signature().name);
            }
            OutputFormat::Table => {
                let signature = outcome.result.signature();
                let icon = signature.metadata.icon_ref.as_deref().unwrap_or("?");
                let name = match parse_hex_color(&signature.metadata.display_color) {
                    Some((r, g, b)) if outcome.result.is_matched() => {
                        signature.name.bold().on_truecolor(r, g, b).to_string()
                    }
                    _ => signature.name.bold().to_string(),
                };
                println!("{} {}  {}", icon, name, outcome.hostname.dimmed());
                if let Some(description) = &signature.metadata.description {
                    println!("  {}", description);
                }

                let mut table = Table::new();
                table.set_header(vec!["IP Address", "Name Server", "TTL", "Detected By"]);
                table.add_row(vec![
                    details.ip.clone(),
                    details.name_server.clone(),
                    details.ttl.clone(),
                    details.matched_pattern.clone(),
                ]);
                println!("{}", table);

                if with_records {
                    self.print_records(outcome);
                }
            }
        }
    }

    fn print_records(&self, outcome: &LookupOutcome) {
        let mut table = Table::new();
        table.set_header(vec!["Name", "Type", "TTL", "Data"]);
        for record in outcome.records.iter() {
            table.add_row(vec![
                record.owner_name.clone(),
                record.record_type.to_string(),
                record.ttl.to_string(),
                record.value.clone(),
            ]);
        }
        println!("{}", table);
    }

    fn print_providers(&self, table: &SignatureTable) {
        match self.format {
            OutputFormat::Json | OutputFormat::Yaml => {
                self.print_value(&json!(table.providers()));
            }
            OutputFormat::Plain => {
                for provider in table.providers() {
                    println!("{}", provider.id);
                }
            }
            OutputFormat::Table => {
                let mut out = Table::new();
                out.set_header(vec!["#", "Id", "Name", "Patterns"]);
                for (i, provider) in table.providers().iter().enumerate() {
                    out.add_row(vec![
                        (i + 1).to_string(),
                        provider.id.clone(),
                        provider.name.clone(),
                        provider.patterns.join(", "),
                    ]);
                }
                println!("{}", out);
            }
        }
    }

    fn print_error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message);
    }

    fn print_info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".blue().bold(), message);
    }
}

fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Progress indicator
fn show_progress(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(
            style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Merge the optional config file with command line overrides
fn load_config(cli: &Cli) -> Result<HuntConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => HuntConfig::load(path)?,
        None => HuntConfig::default(),
    };

    if let Some(endpoint) = &cli.endpoint {
        config.resolver.endpoint = endpoint.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.resolver.timeout_secs = Some(timeout);
    }
    if let Some(path) = &cli.signatures {
        config.signatures.path = Some(path.clone());
    }
    if cli.verbose {
        config.logging.level = LogLevel::Debug;
    }

    Ok(config)
}

async fn handle_detect(
    args: DetectArgs,
    config: &HuntConfig,
    table: &SignatureTable,
    formatter: &OutputFormatter,
) -> Result<i32, Box<dyn std::error::Error>> {
    let client = config.doh_client()?;
    let hunter = HostHunter::new(client, table);

    let pb = show_progress(&LookupPhase::Idle.to_string());
    let outcome = hunter
        .hunt_with(&args.target, |phase| pb.set_message(phase.to_string()))
        .await;
    pb.finish_and_clear();

    match outcome {
        Ok(outcome) => {
            formatter.print_outcome(&outcome, args.records);
            Ok(0)
        }
        Err(e) => {
            formatter.print_error(&e.to_string());
            match e {
                LookupError::InvalidInput { .. } => Ok(2),
                LookupError::ResolutionFailed(cause) => {
                    formatter.print_info(&cause.to_string());
                    Ok(1)
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.output, cli.no_color);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            formatter.print_error(&format!("Invalid configuration: {}", e));
            process::exit(1);
        }
    };

    match StructuredLogger::init(config.logger_config()) {
        Ok(logger) => tracing::debug!(
            level = ?logger.config().level,
            json = logger.config().json_format,
            "logging initialized"
        ),
        Err(e) => formatter.print_error(&format!("Failed to initialize logging: {}", e)),
    }

    // Loaded once, shared by reference for the rest of the process
    let table = match config.signature_table() {
        Ok(table) => table,
        Err(e) => {
            formatter.print_error(&e.to_string());
            process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Detect(args) => handle_detect(args, &config, &table, &formatter).await,
        Commands::Providers => {
            formatter.print_providers(&table);
            Ok(0)
        }
    };

    match code {
        Ok(code) => process::exit(code),
        Err(e) => {
            formatter.print_error(&e.to_string());
            process::exit(1);
        }
    }
}
