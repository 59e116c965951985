//! OpenAPI ⇄ IR CLI
//!
//! Command-line interface for importing OpenAPI documents into the IR
//! definition format and exporting IR files back to OpenAPI.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use openapi_ir::{
    export_document, import_document, load_document_auto, load_ir, Diagnostic, ExportOptions,
    ImportOptions,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-ir")]
#[command(about = "Translate between OpenAPI v3 documents and IR definitions")]
#[command(version)]
struct Cli {
    /// Log progress (info level) to stderr; RUST_LOG overrides
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an OpenAPI document into an IR definition document
    Import {
        /// Document source: file path or URL (http:// or https://)
        source: String,

        /// Name of the generated HTTP service
        #[arg(long, default_value = "Service")]
        service: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print diagnostics to stderr as JSON (for automation)
        #[arg(long)]
        json_diagnostics: bool,

        /// Skip the unresolved-reference check
        #[arg(long)]
        no_reference_check: bool,
    },

    /// Convert an IR file (JSON or YAML) into an OpenAPI document
    Export {
        /// IR file to export
        ir: PathBuf,

        /// info.title (defaults to the IR api name)
        #[arg(long)]
        title: Option<String>,

        /// info.version
        #[arg(long)]
        api_version: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Import {
            source,
            service,
            format,
            output,
            json_diagnostics,
            no_reference_check,
        } => run_import(ImportArgs {
            source,
            options: ImportOptions::new(service).check_references(!no_reference_check),
            format,
            output,
            json_diagnostics,
        }),

        Commands::Export {
            ir,
            title,
            api_version,
            output,
            pretty,
        } => run_export(&ir, title, api_version, output, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Logs go to stderr so stdout stays clean for the converted document.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already installed");
    }
}

struct ImportArgs {
    source: String,
    options: ImportOptions,
    format: OutputFormat,
    output: Option<PathBuf>,
    json_diagnostics: bool,
}

fn run_import(args: ImportArgs) -> Result<(), u8> {
    let ImportArgs {
        source,
        options,
        format,
        output,
        json_diagnostics,
    } = args;

    let document = load_document_auto(&source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let result = import_document(&document, &options);
    let definition = result.to_definition();

    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&definition).map_err(|e| e.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(&definition).map_err(|e| e.to_string()),
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    write_output(output.as_deref(), &rendered)?;
    report_diagnostics(json_diagnostics, &result.diagnostics);

    if result.has_errors() {
        Err(1)
    } else {
        Ok(())
    }
}

fn run_export(
    ir_path: &Path,
    title: Option<String>,
    api_version: Option<String>,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let ir = load_ir(ir_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let mut options = ExportOptions::new();
    if let Some(title) = title {
        options = options.title(title);
    }
    if let Some(version) = api_version {
        options = options.version(version);
    }

    let document = export_document(&ir, &options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    write_output(output.as_deref(), &json_output)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), u8> {
    match output {
        Some(path) => std::fs::write(path, content).map_err(|e| {
            eprintln!("Error writing to {}: {}", path.display(), e);
            3u8
        }),
        None => {
            println!("{}", content.trim_end());
            Ok(())
        }
    }
}

fn report_diagnostics(json_output: bool, diagnostics: &[Diagnostic]) {
    if json_output {
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        let report = serde_json::json!({
            "errors": errors,
            "warnings": diagnostics.len() - errors,
            "diagnostics": diagnostics,
        });
        eprintln!("{}", report);
        return;
    }

    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
}
