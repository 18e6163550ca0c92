//! flowanon - flow record field anonymization
//!
//! The entry point for the flowanon tool, handling:
//! - Configuration validation and snapshots
//! - Anonymizing addresses, raw fields and whole records through configured chains
//! - Crypto-PAn key generation
//! - Listing the available anonymization methods

use clap::{Args, Parser, Subcommand, ValueEnum};
use fa_anon::{AnonMethod, CryptoPanKey};
use fa_cli::exit_codes::ExitCode;
use fa_cli::input::{self, FieldResult, InputError, RecordResult};
use fa_cli::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use fa_config::{load_config, ConfigError, LoadedConfig};
use serde::Serialize;
use std::path::PathBuf;
use tracing::error;

/// flowanon - anonymize flow record fields
#[derive(Parser)]
#[command(name = "flowanon")]
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
    /// Configuration file (default: $FLOWANON_CONFIG, then standard locations)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Log format on stderr
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Omit timestamps from human log output
    #[arg(long, global = true)]
    no_log_timestamps: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the configuration, then print its snapshot
    Check,

    /// Anonymize IPv4 addresses through the chains configured for a field
    Addr(AddrArgs),

    /// Anonymize a hex-encoded field through its configured chains
    Field(FieldArgs),

    /// Anonymize a hex-encoded record, honoring copy_mode
    Record(RecordArgs),

    /// Generate a random Crypto-PAn key
    Keygen,

    /// List anonymization methods and their parameters
    Methods,
}

#[derive(Args, Debug)]
struct AddrArgs {
    /// Information element name or id (e.g. sourceIPv4Address, 8, 1:29305)
    #[arg(long)]
    ie: String,

    /// Addresses in dotted-decimal form
    #[arg(required = true)]
    addrs: Vec<String>,
}

#[derive(Args, Debug)]
struct FieldArgs {
    /// Information element name or id
    #[arg(long)]
    ie: String,

    /// Field bytes as hex, optionally prefixed with 0x
    hex: String,
}

#[derive(Args, Debug)]
struct RecordArgs {
    /// Field layout as IE@OFFSET or IE@OFFSET/LEN (repeatable)
    #[arg(long = "field", required = true)]
    fields: Vec<String>,

    /// Record bytes as hex, optionally prefixed with 0x
    hex: String,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    let log_config = LogConfig::from_env(cli_level, cli.global.log_format)
        .with_timestamps(!cli.global.no_log_timestamps);
    init_logging(&log_config);

    let exit_code = match &cli.command {
        Commands::Check => run_check(&cli.global),
        Commands::Addr(args) => run_addr(&cli.global, args),
        Commands::Field(args) => run_field(&cli.global, args),
        Commands::Record(args) => run_record(&cli.global, args),
        Commands::Keygen => run_keygen(&cli.global),
        Commands::Methods => run_methods(&cli.global),
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_check(global: &GlobalOpts) -> ExitCode {
    let loaded = match load(global) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let snapshot = &loaded.snapshot;

    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "status": "ok",
            "snapshot": snapshot,
        })),
        OutputFormat::Human => {
            println!("# flowanon check");
            println!();
            println!(
                "config: {} ({})",
                snapshot.config_path.as_deref().unwrap_or("-"),
                snapshot.config_source
            );
            println!("hash:   {}", snapshot.short_hash());
            println!("copy mode: {}", snapshot.copy_mode);
            println!();
            for field in &snapshot.fields {
                println!("{} [{}] length={}", field.name, field.ie, field.length);
                for chain in &field.chains {
                    println!("  {}", chain);
                }
            }
            println!();
            println!("OK: {} field(s) configured", snapshot.fields.len());
            ExitCode::Clean
        }
    }
}

fn run_addr(global: &GlobalOpts, args: &AddrArgs) -> ExitCode {
    let loaded = match load(global) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let results = input::bound_element(&loaded.registry, &args.ie)
        .and_then(|id| input::anonymize_addresses(&loaded.registry, id, &args.addrs));
    emit_results(global, &args.ie, results)
}

fn run_field(global: &GlobalOpts, args: &FieldArgs) -> ExitCode {
    let loaded = match load(global) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let results = input::bound_element(&loaded.registry, &args.ie)
        .and_then(|id| input::anonymize_hex(&loaded.registry, id, &args.hex))
        .map(|result| vec![result]);
    emit_results(global, &args.ie, results)
}

fn run_record(global: &GlobalOpts, args: &RecordArgs) -> ExitCode {
    let loaded = match load(global) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let result = match input::anonymize_record(&loaded, &args.hex, &args.fields) {
        Ok(result) => result,
        Err(e) => return output_input_error(global, &e),
    };

    match global.format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Human => {
            print_record(&result);
            ExitCode::Clean
        }
    }
}

fn print_record(r: &RecordResult) {
    println!("{} -> {}", r.original, r.anonymized);
    println!(
        "fields: processed={} anonymized={} skipped={} (copy_mode={})",
        r.fields_processed, r.fields_anonymized, r.fields_skipped, r.copy_mode
    );
}

fn run_keygen(global: &GlobalOpts) -> ExitCode {
    let key = match CryptoPanKey::generate() {
        Ok(key) => key,
        Err(e) => {
            error!(error = %e, "key generation failed");
            eprintln!("Error: {}", e);
            return ExitCode::InternalError;
        }
    };

    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({ "key": key.to_param() })),
        OutputFormat::Human => {
            println!("{}", key.to_param());
            ExitCode::Clean
        }
    }
}

#[derive(Serialize)]
struct MethodInfo {
    name: &'static str,
    param: &'static str,
    deterministic: bool,
    ipv4_only: bool,
}

fn run_methods(global: &GlobalOpts) -> ExitCode {
    let methods: Vec<MethodInfo> = AnonMethod::ALL
        .iter()
        .map(|m| MethodInfo {
            name: m.name(),
            param: m.param_hint(),
            deterministic: m.is_deterministic(),
            ipv4_only: m.requires_ipv4(),
        })
        .collect();

    match global.format {
        OutputFormat::Json => print_json(&methods),
        OutputFormat::Human => {
            for m in &methods {
                let mut notes = Vec::new();
                if !m.deterministic {
                    notes.push("random");
                }
                if m.ipv4_only {
                    notes.push("IPv4 fields only");
                }
                let notes = if notes.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", notes.join(", "))
                };
                println!("{:<22} {}{}", m.name, m.param, notes);
            }
            println!();
            println!("Join methods with '+' to build a chain, e.g. PreserveBroadcast+CryptoPan");
            ExitCode::Clean
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn load(global: &GlobalOpts) -> Result<LoadedConfig, ExitCode> {
    load_config(global.config.as_deref()).map_err(|e| output_config_error(global, &e))
}

fn output_config_error(global: &GlobalOpts, err: &ConfigError) -> ExitCode {
    error!(code = err.code(), error = %err, "configuration rejected");
    match global.format {
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "status": "error",
                "code": err.code(),
                "exit_code": ExitCode::ConfigError.code_name(),
                "error": err.to_string(),
            }));
        }
        OutputFormat::Human => eprintln!("Error: {}", err),
    }
    ExitCode::ConfigError
}

fn emit_results(
    global: &GlobalOpts,
    ie: &str,
    results: Result<Vec<FieldResult>, InputError>,
) -> ExitCode {
    let results = match results {
        Ok(results) => results,
        Err(e) => return output_input_error(global, &e),
    };

    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({ "ie": ie, "results": results })),
        OutputFormat::Human => {
            for r in &results {
                println!("{} -> {} (anonymized={})", r.original, r.anonymized, r.changed);
            }
            ExitCode::Clean
        }
    }
}

fn output_input_error(global: &GlobalOpts, err: &InputError) -> ExitCode {
    match global.format {
        OutputFormat::Json => {
            print_json(&serde_json::json!({
                "status": "error",
                "exit_code": ExitCode::InputError.code_name(),
                "error": err.to_string(),
            }));
        }
        OutputFormat::Human => eprintln!("Error: {}", err),
    }
    ExitCode::InputError
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::Clean
        }
        Err(e) => {
            error!(error = %e, "failed to serialize output");
            ExitCode::InternalError
        }
    }
}
