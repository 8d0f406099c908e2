#![allow(
    clippy::needless_pass_by_value,    // clap requires owned values
    clippy::unnecessary_wraps,         // consistent Result return for CLI handlers
    clippy::fn_params_excessive_bools, // CLI commands have many boolean flags
)]

//! oleharvest CLI - recover documents embedded in Office files

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::debug;
use oleharvest_archive::ArchiveContainer;
use oleharvest_cli::config::{
    Config, ExtractConfig, CONFIG_FILE_NAME, DEFAULT_CONFIG_TEMPLATE, DEFAULT_OUTPUT_DIR,
};
use oleharvest_cli::{format_bytes, parse_extension_list};
use oleharvest_core::options::DEFAULT_MAX_DEPTH;
use oleharvest_core::{
    cleanup, detect_envelope, inspect_path, read_metadata, CleanupReport, CompoundContainer,
    ContentKind, DocumentMetadata, EnvelopeKind, ExtractOptions, ExtractionReport, Extractor,
    NameSequence,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Verbosity level for output control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Verbosity {
    /// Suppress all output except errors
    Quiet,
    /// Normal output (default)
    Normal,
    /// Verbose output with extra details
    Verbose,
}

impl Verbosity {
    /// Create from CLI flags
    const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Check if output should be shown (not quiet)
    const fn should_show_output(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Check if verbose output is requested
    const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Default `env_logger` filter; `RUST_LOG` overrides it
    const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "oleharvest",
    about = "Recover documents embedded in Office files",
    long_about = "Recover documents embedded in Office files.\n\
                  \n\
                  Walks .docx packages and legacy .doc compound files, including OLE\n\
                  objects nested inside each other, and writes every embedded Word,\n\
                  Excel, PowerPoint, PDF and archive payload to one output directory.",
    version
)]
struct Args {
    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show detailed processing information
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract embedded documents into an output directory
    #[command(long_about = "Extract embedded documents into an output directory.\n\
                      \n\
                      Artifacts are named {document}_{n}.{ext} for objects found directly in\n\
                      the input and {parent}_nested_doc_{n}.{ext} for objects found inside\n\
                      other extracted containers. Existing files are never overwritten.\n\
                      \n\
                      Examples:\n\
                        oleharvest extract plan.docx                 # into ./extracted\n\
                        oleharvest extract plan.docx -o out/         # explicit directory\n\
                        oleharvest extract a.docx b.doc --cleanup bin  # drop OLE containers\n\
                        oleharvest extract plan.docx --json          # machine-readable report")]
    Extract {
        /// Documents to extract from (.docx, .doc, or detected by signature)
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (created if missing)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Maximum container nesting depth
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        /// Extensions to delete from the output directory afterwards (comma-separated)
        #[arg(long, value_name = "EXT,...")]
        cleanup: Vec<String>,

        /// Print the extraction report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the entries of a document and how each would be classified
    #[command(long_about = "List the entries of a document without extracting anything.\n\
                      \n\
                      Entries marked with * are considered for extraction; the kind column\n\
                      shows what each entry would be extracted as.")]
    List {
        /// Document to inspect
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show container type and summary metadata of a document
    Info {
        /// Document to inspect
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Unpack every member of a zip-family archive, preserving paths
    Unpack {
        /// Archive to unpack (.docx, .xlsx, .zip, ...)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Destination directory
        #[arg(short, long, value_name = "DIR", required = true)]
        output: PathBuf,
    },

    /// Manage configuration settings
    #[command(long_about = "Manage oleharvest configuration files.\n\
                      \n\
                      Configuration files are loaded in this order (later overrides earlier):\n\
                        1. User config: ~/.oleharvest.toml\n\
                        2. Project config: ./.oleharvest.toml\n\
                        3. Command-line arguments")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Create a new .oleharvest.toml with commented defaults
    Init {
        /// Create in user home directory (~/.oleharvest.toml) instead of current directory
        #[arg(long)]
        global: bool,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Display the current effective configuration
    Show {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Show the path(s) to configuration file(s)
    Path {
        /// Show all config file paths (user and project)
        #[arg(long)]
        all: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(verbosity.log_filter()))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::load();

    match args.command {
        Commands::Extract {
            inputs,
            output,
            max_depth,
            cleanup,
            json,
        } => extract_command(
            inputs,
            output,
            max_depth,
            cleanup,
            json,
            &config.extract_settings(),
            verbosity,
        ),
        Commands::List { input, json } => list_command(&input, json),
        Commands::Info { input, json } => info_command(&input, json),
        Commands::Unpack { input, output } => unpack_command(&input, &output, verbosity),
        Commands::Config { action } => config_command(action, verbosity),
    }
}

/// JSON document printed by `extract --json`
#[derive(Serialize)]
struct ExtractOutput<'a> {
    reports: &'a [ExtractionReport],
    #[serde(skip_serializing_if = "Option::is_none")]
    cleanup: Option<&'a CleanupReport>,
}

fn extract_command(
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    max_depth: Option<usize>,
    cleanup_exts: Vec<String>,
    json: bool,
    settings: &ExtractConfig,
    verbosity: Verbosity,
) -> Result<()> {
    // CLI args override config
    let output_dir = output
        .or_else(|| settings.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let max_depth = max_depth.or(settings.max_depth).unwrap_or(DEFAULT_MAX_DEPTH);
    let cleanup_exts = if cleanup_exts.is_empty() {
        settings.cleanup.clone().unwrap_or_default()
    } else {
        parse_extension_list(&cleanup_exts)
    };
    let json = json || settings.json.unwrap_or(false);
    debug!(
        "Extracting {} inputs into {} (max depth {max_depth}, cleanup {cleanup_exts:?})",
        inputs.len(),
        output_dir.display()
    );

    let extractor = Extractor::with_options(
        &output_dir,
        ExtractOptions::default().with_max_depth(max_depth),
    );

    // One sequence for every input, so names never clash between inputs
    let mut sequence = NameSequence::new();
    let mut reports = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let report = extractor
            .extract_path_with(input, &mut sequence)
            .with_context(|| format!("Failed to extract {}", input.display()))?;

        if !json && verbosity.should_show_output() {
            print_report(&report, verbosity);
        }
        reports.push(report);
    }

    let cleaned = if cleanup_exts.is_empty() {
        None
    } else {
        Some(cleanup(&output_dir, &cleanup_exts))
    };

    if json {
        let document = ExtractOutput {
            reports: &reports,
            cleanup: cleaned.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else if let Some(cleaned) = cleaned.filter(|_| verbosity.should_show_output()) {
        println!(
            "{} Removed {} files ({})",
            "Cleanup:".cyan().bold(),
            cleaned.removed.len(),
            cleanup_exts.join(", ")
        );
        if cleaned.failed > 0 {
            println!(
                "{} {} files could not be removed",
                "Warning:".yellow().bold(),
                cleaned.failed
            );
        }
    }

    Ok(())
}

fn print_report(report: &ExtractionReport, verbosity: Verbosity) {
    for artifact in &report.artifacts {
        println!(
            "  {} {} ({}, {})",
            "✓".green(),
            artifact.file_name,
            artifact.kind,
            format_bytes(artifact.size)
        );
        if verbosity.is_verbose() {
            println!(
                "      {} {} in {}",
                "from".bright_black(),
                artifact.entry,
                artifact.parent
            );
        }
    }

    for failure in &report.failures {
        println!(
            "  {} {} in {}: {}",
            "✗".red(),
            failure.entry,
            failure.parent,
            failure.message
        );
    }

    println!(
        "{} Extracted {} files ({}) from {} into {}",
        "Success:".green().bold(),
        report.artifacts.len(),
        format_bytes(report.total_bytes()),
        report.identifier,
        report.output_dir.display()
    );
    if report.has_failures() {
        println!(
            "{} {} entries could not be extracted",
            "Warning:".yellow().bold(),
            report.failures.len()
        );
    }
}

fn list_command(input: &Path, json: bool) -> Result<()> {
    let listing = inspect_path(input, &ExtractOptions::default())
        .with_context(|| format!("Failed to inspect {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("{}", input.display().to_string().bold());
    for entry in &listing {
        let marker = if entry.candidate {
            "*".green()
        } else {
            " ".normal()
        };
        let kind = if entry.kind == ContentKind::Unknown {
            entry.kind.to_string().bright_black()
        } else {
            entry.kind.to_string().cyan()
        };
        println!(
            "{marker} {:<48} {:>10}  {kind}",
            entry.entry,
            format_bytes(entry.size)
        );
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct DocumentInfo {
    path: PathBuf,
    size: u64,
    envelope: EnvelopeKind,
    entries: usize,
    candidates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<DocumentMetadata>,
}

fn info_command(input: &Path, json: bool) -> Result<()> {
    let bytes =
        fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let envelope = detect_envelope(input, &bytes)
        .with_context(|| format!("Unsupported input format: {}", input.display()))?;
    let listing = inspect_path(input, &ExtractOptions::default())
        .with_context(|| format!("Failed to inspect {}", input.display()))?;

    let metadata = match envelope {
        EnvelopeKind::Compound => {
            let mut container = CompoundContainer::open(bytes.clone())
                .with_context(|| format!("Failed to open {}", input.display()))?;
            read_metadata(&mut container).filter(|m| !m.is_empty())
        }
        EnvelopeKind::Archive => None,
    };

    let info = DocumentInfo {
        path: input.to_path_buf(),
        size: bytes.len() as u64,
        envelope,
        entries: listing.len(),
        candidates: listing.iter().filter(|e| e.candidate).count(),
        metadata,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", info.path.display().to_string().bold());
    println!("  {:<12} {:?}", "Container:".bright_black(), info.envelope);
    println!("  {:<12} {}", "Size:".bright_black(), format_bytes(info.size));
    println!(
        "  {:<12} {} ({} candidates)",
        "Entries:".bright_black(),
        info.entries,
        info.candidates
    );
    if let Some(metadata) = &info.metadata {
        let fields = [
            ("Title:", &metadata.title),
            ("Subject:", &metadata.subject),
            ("Author:", &metadata.author),
            ("Keywords:", &metadata.keywords),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                println!("  {:<12} {value}", label.bright_black());
            }
        }
    }

    Ok(())
}

fn unpack_command(input: &Path, output: &Path, verbosity: Verbosity) -> Result<()> {
    let mut archive = ArchiveContainer::open_path(input)
        .with_context(|| format!("Failed to open archive {}", input.display()))?;
    let written = archive
        .extract_all(output)
        .with_context(|| format!("Failed to unpack {}", input.display()))?;

    if verbosity.should_show_output() {
        if verbosity.is_verbose() {
            for path in &written {
                println!("  {} {}", "✓".green(), path.display());
            }
        }
        println!(
            "{} Unpacked {} files into {}",
            "Success:".green().bold(),
            written.len(),
            output.display()
        );
    }

    Ok(())
}

fn config_command(action: ConfigAction, verbosity: Verbosity) -> Result<()> {
    match action {
        ConfigAction::Init { global, force } => config_init(global, force, verbosity),
        ConfigAction::Show { json } => config_show(json),
        ConfigAction::Path { all } => config_path(all),
    }
}

/// Create a new configuration file with commented defaults
fn config_init(global: bool, force: bool, verbosity: Verbosity) -> Result<()> {
    let config_path = if global {
        Config::user_path().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
    } else {
        Config::project_path()
    };

    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists: {} (use --force to overwrite)",
            config_path.display()
        );
    }

    fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    if verbosity.should_show_output() {
        println!(
            "{} Created configuration file: {}",
            "Success:".green().bold(),
            config_path.display()
        );
    }

    Ok(())
}

/// Display the current effective configuration
fn config_show(json_output: bool) -> Result<()> {
    let merged = Config::load();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&merged)?);
    } else {
        println!("{}", toml::to_string_pretty(&merged)?);
    }

    Ok(())
}

fn config_path(all: bool) -> Result<()> {
    let home_config = Config::user_path();
    let project_config = Config::project_path();

    if all {
        println!("{}", "Configuration file paths:".bold());
        println!();

        if let Some(ref home) = home_config {
            let status = if home.exists() {
                "exists".green()
            } else {
                "not found".yellow()
            };
            println!("  {} {} ({})", "User:".bright_black(), home.display(), status);
        }

        let status = if project_config.exists() {
            "exists".green()
        } else {
            "not found".yellow()
        };
        println!(
            "  {} {} ({})",
            "Project:".bright_black(),
            project_config.display(),
            status
        );
    } else if project_config.exists() {
        println!("{}", project_config.display());
    } else {
        // Project config if nothing exists yet: that is where `config init` writes
        match home_config.filter(|home| home.exists()) {
            Some(home) => println!("{}", home.display()),
            None => println!("{CONFIG_FILE_NAME}"),
        }
    }

    Ok(())
}
