//! rack-audit: command-line front end for the rack elevation engine.
//!
//! # Usage
//!
//! ```text
//! rack-audit [--config <PATH>] <COMMAND>
//!
//! Commands:
//!   new     Create an empty rack file
//!   show    Print the elevation and utilization of a rack
//!   check   Validate a rack layout (exit status 1 on failure)
//!   place   Check whether a span is free
//!   move    Move a device to a new start unit
//!   resize  Change a device's height
//!   remove  Remove a device
//!   import  Add devices from a devices file
//! ```
//!
//! Rack files are TOML, or JSON when the extension is `.json`.  Edits write the
//! new snapshot back to the same file; nothing is written when an edit is
//! rejected.
//!
//! # Environment variable overrides
//!
//! | Variable            | Description                                     |
//! |---------------------|-------------------------------------------------|
//! | `RACK_AUDIT_CONFIG` | Config file path instead of the platform default |
//! | `RUST_LOG`          | Log filter; falls back to `audit.log_level`      |

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use rack_audit::application::edit_rack::{apply_edit, RackEdit};
use rack_audit::application::import_devices::{import_devices, ImportMode};
use rack_audit::application::render_cache::RackView;
use rack_audit::infrastructure::elevation::{format_summary, render_elevation, ElevationStyle};
use rack_audit::infrastructure::storage::config::{self, AppConfig, ConfigError};
use rack_audit::infrastructure::storage::rack_file::{
    load_devices_file, load_rack_file, save_rack_file,
};
use rack_core::{can_place, find_free_slot, validate_layout, Device, OccupancyIssue, Rack};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Rack elevation audit tool.
#[derive(Debug, Parser)]
#[command(
    name = "rack-audit",
    about = "Inspect, validate and edit rack elevation files",
    version
)]
struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, env = "RACK_AUDIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an empty rack file.
    New {
        file: PathBuf,
        /// Rack name; defaults to the file stem.
        #[arg(long)]
        name: Option<String>,
        /// Rack height in units; defaults to `audit.default_rack_height`.
        #[arg(long)]
        height: Option<u32>,
    },
    /// Print the elevation and utilization of a rack.
    Show {
        file: PathBuf,
        /// Print the view as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Validate a rack layout.
    Check { file: PathBuf },
    /// Check whether a span is free.
    Place {
        file: PathBuf,
        #[arg(long)]
        start: u32,
        #[arg(long, default_value_t = 1)]
        span: u32,
        /// Device to ignore, e.g. the one being moved.
        #[arg(long)]
        exclude: Option<Uuid>,
    },
    /// Move a device to a new start unit.
    Move {
        file: PathBuf,
        #[arg(long)]
        device: Uuid,
        #[arg(long)]
        start: u32,
    },
    /// Change a device's height.
    Resize {
        file: PathBuf,
        #[arg(long)]
        device: Uuid,
        #[arg(long)]
        span: u32,
    },
    /// Remove a device.
    Remove {
        file: PathBuf,
        #[arg(long)]
        device: Uuid,
    },
    /// Add the devices of a devices file to a rack.
    Import {
        file: PathBuf,
        devices: PathBuf,
        /// Import what fits and report the rest instead of aborting.
        #[arg(long)]
        skip_rejected: bool,
        /// Write the result here instead of back to FILE.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Loads the config named by `--config`, or the platform config file.
    ///
    /// A missing file yields defaults, as does a platform with no config
    /// directory when `--config` is not given.
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let loaded = match &self.config {
            Some(path) => config::load_config_from(path),
            None => match config::load_config() {
                Err(ConfigError::NoPlatformConfigDir) => Ok(AppConfig::default()),
                other => other,
            },
        };
        loaded.context("failed to load configuration")
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    // RUST_LOG wins; otherwise use the configured level.  Logs go to stderr so
    // `show --json` output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.audit.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    run(cli.command, &config)
}

fn run(command: Command, config: &AppConfig) -> anyhow::Result<ExitCode> {
    match command {
        Command::New { file, name, height } => {
            if file.exists() {
                bail!("{} already exists", file.display());
            }
            let name = name.unwrap_or_else(|| default_rack_name(&file));
            let height = height.unwrap_or(config.audit.default_rack_height);
            let rack = Rack::new(name, height, Vec::new())?;
            save(&file, &rack)?;
            println!("created {} ({}U) in {}", rack.name(), height, file.display());
            Ok(ExitCode::SUCCESS)
        }

        Command::Show { file, json } => {
            let rack = load(&file)?;
            let view = RackView::build(&rack);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("{} ({}U)", rack.name(), rack.height_units());
                let style = ElevationStyle::from(&config.display);
                for line in render_elevation(&view.rows, style) {
                    println!("{line}");
                }
                println!("{}", format_summary(&view.utilization));
                for issue in &view.issues {
                    println!("warning: {}", describe_issue(&rack, issue));
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Check { file } => {
            let rack = load(&file)?;
            match validate_layout(&rack) {
                Ok(()) => {
                    println!("{}: layout is valid", rack.name());
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{}: {e}", rack.name());
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::Place { file, start, span, exclude } => {
            let rack = load(&file)?;
            let candidate = Device::builder("candidate", start, span).build()?;
            let check = can_place(&rack, &candidate, exclude);
            if check.ok {
                println!("U{}..U{} is free", candidate.start_unit(), candidate.last_unit());
                return Ok(ExitCode::SUCCESS);
            }
            if let Some(err) = &check.error {
                println!("cannot place: {err}");
            }
            match find_free_slot(&rack, span) {
                Some(slot) => println!("lowest free {span}U slot starts at U{slot}"),
                None => println!("no free {span}U slot in this rack"),
            }
            Ok(ExitCode::FAILURE)
        }

        Command::Move { file, device, start } => {
            edit_file(&file, RackEdit::Move { device, start_unit: start })
        }
        Command::Resize { file, device, span } => {
            edit_file(&file, RackEdit::Resize { device, unit_span: span })
        }
        Command::Remove { file, device } => edit_file(&file, RackEdit::Delete { device }),

        Command::Import { file, devices, skip_rejected, output } => {
            let rack = load(&file)?;
            let incoming = load_devices_file(&devices)
                .with_context(|| format!("failed to load devices from {}", devices.display()))?;
            let mode = if skip_rejected {
                ImportMode::SkipRejected
            } else {
                ImportMode::AllOrNothing
            };

            let report = import_devices(&rack, incoming, mode)
                .with_context(|| format!("import into {} aborted", file.display()))?;

            let target = output.unwrap_or(file);
            save(&target, &report.rack)?;
            println!(
                "imported {} devices into {}",
                report.accepted.len(),
                target.display()
            );
            for rejected in &report.rejected {
                println!("rejected {}: {}", rejected.device.name(), rejected.reason);
            }
            Ok(if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load(path: &Path) -> anyhow::Result<Rack> {
    load_rack_file(path).with_context(|| format!("failed to load rack from {}", path.display()))
}

fn save(path: &Path, rack: &Rack) -> anyhow::Result<()> {
    save_rack_file(path, rack).with_context(|| format!("failed to write {}", path.display()))
}

fn edit_file(path: &Path, edit: RackEdit) -> anyhow::Result<ExitCode> {
    let rack = load(path)?;
    let edited = apply_edit(&rack, &edit).with_context(|| format!("cannot {edit}"))?;
    save(path, &edited)?;
    info!("saved {} after {edit}", path.display());
    println!("{edit}: done");
    Ok(ExitCode::SUCCESS)
}

fn default_rack_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("rack")
        .to_string()
}

fn describe_issue(rack: &Rack, issue: &OccupancyIssue) -> String {
    let name = rack
        .device(issue.device())
        .map_or_else(|| issue.device().to_string(), |d| d.name().to_string());
    match issue {
        OccupancyIssue::Clipped { dropped_units, .. } => {
            format!("{name} extends {dropped_units}U outside the rack")
        }
        OccupancyIssue::Overlap { units, .. } => {
            let units: Vec<String> = units.iter().map(|u| format!("U{u}")).collect();
            format!("{name} not placed, {} already taken", units.join(", "))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
