use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use ifc_space_analyzer::analysis::analyze;
use ifc_space_analyzer::config::{AnalysisConfig, TransformConfig, DEFAULT_PLACEHOLDER};
use ifc_space_analyzer::diagnostics::inspect;
use ifc_space_analyzer::export::{export_assignments_csv, export_json, export_mappings_csv};
use ifc_space_analyzer::model::{AnalysisOutput, EntityKind};
use ifc_space_analyzer::parser::parse_ifc_file;
use ifc_space_analyzer::plan::plan_space_properties;
use ifc_space_analyzer::transform::{assignment_map, transform_map, transform_value};

#[derive(Parser, Debug)]
#[command(name = "ifc-space-analyzer")]
#[command(about = "IFC Space Analyzer - assign elements to spaces and build room mappings")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assign elements to spaces and summarize the spatial program
    Analyze {
        #[command(flatten)]
        common: Common,

        /// Keyword marking a circulation space (repeatable, replaces the defaults)
        #[arg(long = "circulation-keyword", value_name = "WORD")]
        circulation_keywords: Vec<String>,

        /// Export element assignments to CSV
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },

    /// Build a GlobalId → room name mapping for one element type
    Map {
        #[command(flatten)]
        common: Common,

        /// Element type to keep (Wall, IfcDoor, ...)
        #[arg(long, default_value = "Wall")]
        element_type: EntityKind,

        /// Space-name value treated as missing
        #[arg(long, default_value = DEFAULT_PLACEHOLDER)]
        placeholder: String,

        /// Prior analysis JSON to transform instead of analyzing the file
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Export mappings to CSV
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },

    /// Plan the Pset_SpaceAssignment values for every assigned element
    Plan {
        #[command(flatten)]
        common: Common,

        /// Prior analysis JSON to take assignments from instead of analyzing the file
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Show the spatial structure found in the file
    Inspect {
        #[command(flatten)]
        common: Common,
    },
}

#[derive(Args, Debug)]
struct Common {
    /// Path to IFC file
    #[arg(required = true)]
    file: PathBuf,

    /// Write JSON to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Analyze {
            common,
            circulation_keywords,
            csv,
        } => {
            let graph = parse_ifc_file(&common.file)?;
            let config = AnalysisConfig::default().with_circulation_keywords(circulation_keywords);
            let output = analyze(&graph, &config);

            if let (Some(csv_path), Some(report)) = (&csv, output.report()) {
                export_assignments_csv(&report.element_space_map, csv_path)?;
                eprintln!("Exported to CSV: {}", csv_path.display());
            }
            emit(&output, common.json.as_deref())?;
        }
        Command::Map {
            common,
            element_type,
            placeholder,
            input,
            csv,
        } => {
            let graph = parse_ifc_file(&common.file)?;
            let config = TransformConfig {
                element_type,
                placeholder,
            };

            let output = if let Some(input_path) = input {
                transform_value(read_json(&input_path)?, Some(&graph), &config)
            } else {
                match analyze(&graph, &AnalysisConfig::default()) {
                    AnalysisOutput::Report(report) => {
                        transform_map(&report.element_space_map, &graph, &config)
                    }
                    AnalysisOutput::Failed { error, .. } => bail!("space analysis failed: {error}"),
                }
            };

            if let Some(csv_path) = &csv {
                export_mappings_csv(&output.mappings, csv_path)?;
                eprintln!("Exported to CSV: {}", csv_path.display());
            }
            emit(&output, common.json.as_deref())?;
        }
        Command::Plan { common, input } => {
            let graph = parse_ifc_file(&common.file)?;

            let upstream = match &input {
                Some(input_path) => assignment_map(&read_json(input_path)?)
                    .filter(|map| !map.is_empty()),
                None => None,
            };
            if let Some(map) = upstream {
                let plan = plan_space_properties(&map, &graph);
                emit(&plan, common.json.as_deref())?;
                return Ok(());
            }
            if let Some(input_path) = &input {
                warn!(
                    input = %input_path.display(),
                    "No space assignment data in input, analyzing the model"
                );
            }

            match analyze(&graph, &AnalysisConfig::default()) {
                AnalysisOutput::Report(report) => {
                    let plan = plan_space_properties(&report.element_space_map, &graph);
                    emit(&plan, common.json.as_deref())?;
                }
                failed @ AnalysisOutput::Failed { .. } => emit(&failed, common.json.as_deref())?,
            }
        }
        Command::Inspect { common } => {
            let graph = parse_ifc_file(&common.file)?;
            let diagnostics = inspect(&graph)?;
            emit(&diagnostics, common.json.as_deref())?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).wrap_err_with(|| format!("invalid JSON in {}", path.display()))
}

fn emit<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        export_json(value, path)?;
        eprintln!("Exported to JSON: {}", path.display());
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}
