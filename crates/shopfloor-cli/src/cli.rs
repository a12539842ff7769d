//! Command-line interface for the shopfloor utility
//!
//! Provides a CLI to inspect, validate and repair station-and-edge
//! simulation model documents.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::report::{render_info, render_report};
use shopfloor::core::logging::init_logging;
use shopfloor::prelude::*;

/// Shopfloor - inspect, validate and repair simulation models
#[derive(Parser)]
#[command(name = "shopfloor")]
#[command(about = "A Rust utility to inspect, validate and repair station-and-edge simulation models")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormatChoice::Compact)]
    pub log_format: LogFormatChoice,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormatChoice {
    Compact,
    Pretty,
    Json,
}

impl LogFormatChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormatChoice::Compact => "compact",
            LogFormatChoice::Pretty => "pretty",
            LogFormatChoice::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a model document and list structural issues
    Check {
        /// Input model document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Also probe external data references (files, databases, DDE)
        #[arg(long)]
        external: bool,

        /// When to use colors in output
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },

    /// Apply automatic repairs and write the repaired document
    Fix {
        /// Input model document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output for the repaired document (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// List the repairs without applying them
        #[arg(long)]
        dry_run: bool,

        /// When to use colors in output
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },

    /// Show a census of the model's stations, edges and layers
    Info {
        /// Input model document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show supported station kinds
    Kinds {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if output is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Database probe for a CLI run without a configured driver
struct NoDatabase;

impl DatabaseProbe for NoDatabase {
    fn init_error(&self, _settings: &DbSettings) -> Option<String> {
        Some("no database driver available".to_string())
    }
}

/// DDE connector for a CLI run; DDE is never reachable here
struct NoDde;

impl DdeConnect for NoDde {
    fn available(&self) -> bool {
        false
    }

    fn workbooks(&self) -> Vec<String> {
        Vec::new()
    }

    fn tables(&self, _workbook: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Main CLI application
#[derive(Default)]
pub struct ShopfloorApp;

impl ShopfloorApp {
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Initialize logging with CLI flags (environment variables take precedence)
        let log_level_str = std::env::var("SHOPFLOOR_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("SHOPFLOOR_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Shopfloor v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Check {
                input,
                external,
                color,
            } => self.check_command(input, external, color, cli.verbose),
            Commands::Fix {
                input,
                output,
                dry_run,
                color,
            } => self.fix_command(input, output, dry_run, color, cli.verbose),
            Commands::Info { input, json } => self.info_command(input, json, cli.verbose),
            Commands::Kinds { json } => self.kinds_command(json, cli.verbose),
        }
    }

    fn load(&self, input: Option<PathBuf>, verbose: bool) -> Result<Surface> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }
        let surface = load_model(&content).map_err(|e| anyhow!("Failed to load model: {}", e))?;
        debug!(
            stations = surface.element_count(),
            edges = surface.edge_count(),
            "model loaded"
        );
        Ok(surface)
    }

    /// Handle the check command
    fn check_command(
        &self,
        input: Option<PathBuf>,
        external: bool,
        color: ColorChoice,
        verbose: bool,
    ) -> Result<()> {
        let surface = self.load(input, verbose)?;
        let use_color = self.should_colorize(&None, color);

        let report = validate_model(&surface);
        print!("{}", render_report(&surface, &report, use_color));

        let mut external_errors = 0usize;
        if external {
            let connectors = Connectors {
                db: &NoDatabase,
                dde: &NoDde,
            };
            for element in surface.elements() {
                let result = check_external_data(element, &connectors);
                match result.status {
                    CheckStatus::NoCheckNeeded => {}
                    CheckStatus::Ok => {
                        if let Some(label) = &result.source_label {
                            println!("✓ station {}: {}", element.id(), label);
                        }
                    }
                    CheckStatus::Error => {
                        external_errors += 1;
                        let label = result.source_label.unwrap_or_default();
                        let message = result.error_message.unwrap_or_default();
                        println!("✗ station {}: {}: {}", element.id(), label, message);
                    }
                }
            }
        }

        if report.is_empty() && external_errors == 0 {
            Ok(())
        } else {
            Err(anyhow!(
                "{} structural issues, {} external data errors",
                report.len(),
                external_errors
            ))
        }
    }

    /// Handle the fix command
    fn fix_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        dry_run: bool,
        color: ColorChoice,
        verbose: bool,
    ) -> Result<()> {
        let mut surface = self.load(input, verbose)?;
        let use_color = self.should_colorize(&output, color);

        if dry_run {
            let report = validate_model(&surface);
            print!("{}", render_report(&surface, &report, use_color));
            return Ok(());
        }

        let mut applied = 0usize;
        loop {
            let mut report = validate_model(&surface);
            let Some((_, fixes)) = report.iter_mut().find(|(_, fixes)| !fixes.is_empty()) else {
                break;
            };
            let fix = &mut fixes[0];
            fix.apply(&mut surface)
                .map_err(|e| anyhow!("Failed to apply repair: {}", e))?;
            eprintln!("applied: {}", fix.description);
            applied += 1;
        }

        let remaining = validate(&surface);
        if verbose {
            eprintln!("{} repairs applied, {} issues remain", applied, remaining.len());
        }

        self.write_output(output, &save_model(&surface))?;

        if remaining.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("{} issues could not be repaired", remaining.len()))
        }
    }

    /// Handle the info command
    fn info_command(&self, input: Option<PathBuf>, json: bool, verbose: bool) -> Result<()> {
        let surface = self.load(input, verbose)?;

        if json {
            let kinds: Vec<serde_json::Value> = ElementKind::ALL
                .iter()
                .filter_map(|kind| {
                    let count = surface
                        .elements()
                        .filter(|element| element.kind == *kind)
                        .count();
                    (count > 0).then(|| {
                        serde_json::json!({
                            "kind": kind.type_name(),
                            "count": count,
                        })
                    })
                })
                .collect();
            let info = serde_json::json!({
                "stations": surface.element_count(),
                "edges": surface.edge_count(),
                "layers": surface.layers(),
                "visible_layers": surface.visible_layers(),
                "kinds": kinds,
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            print!("{}", render_info(&surface, false));
        }
        Ok(())
    }

    /// Handle the kinds command
    fn kinds_command(&self, json: bool, verbose: bool) -> Result<()> {
        if verbose {
            eprintln!("Listing supported station kinds");
        }

        if json {
            let kinds: Vec<serde_json::Value> = ElementKind::ALL
                .iter()
                .map(|kind| {
                    serde_json::json!({
                        "name": kind.type_name(),
                        "shape": format!("{}", kind.shape()),
                        "takes_incoming": kind.incoming_arity() != EdgeArity::None,
                        "requires_outgoing": kind.requires_outgoing(),
                    })
                })
                .collect();
            let listing = serde_json::json!({
                "supported_kinds": kinds,
                "total": ElementKind::ALL.len(),
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            println!("Supported station kinds:");
            for kind in ElementKind::ALL {
                println!("  {:14} {}", kind.type_name(), kind.shape());
            }
            println!();
            println!("Total: {} station kinds supported", ElementKind::ALL.len());
        }

        Ok(())
    }

    /// Determine if we should colorize the output based on color choice and output destination
    fn should_colorize(&self, output: &Option<PathBuf>, color: ColorChoice) -> bool {
        match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                if std::env::var("NO_COLOR").is_ok() {
                    return false;
                }
                match output {
                    None => crossterm::tty::IsTty::is_tty(&std::io::stdout()),
                    Some(p) if p.to_str() == Some("-") => {
                        crossterm::tty::IsTty::is_tty(&std::io::stdout())
                    }
                    Some(_) => false, // Writing to file, no colors
                }
            }
        }
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) => {
                if path.to_string_lossy() == "-" {
                    let mut content = String::new();
                    io::stdin().read_to_string(&mut content)?;
                    Ok(content)
                } else {
                    fs::read_to_string(&path).map_err(|e| {
                        anyhow!("Failed to read input file '{}': {}", path.display(), e)
                    })
                }
            }
            None => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let stdout_content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) => {
                if path.to_string_lossy() == "-" {
                    print!("{}", stdout_content);
                    io::stdout().flush()?;
                } else {
                    fs::write(&path, content).map_err(|e| {
                        anyhow!("Failed to write output file '{}': {}", path.display(), e)
                    })?;
                }
            }
            None => {
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}
