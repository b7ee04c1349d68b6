//! Space analysis: element→space assignment plus derived statistics.

pub mod assignment;
pub mod resolver;
pub mod statistics;

use tracing::{error, info};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::graph::GraphAccessor;
use crate::model::{AnalysisOutput, AnalysisReport, EntityKind, Summary};

pub use assignment::{build, SpatialAssignment};
pub use resolver::RelationshipResolver;
pub use statistics::summarize;

const FAILURE_MESSAGE: &str =
    "Space analysis failed. Check that the IFC file contains space definitions.";

/// Runs the analysis and folds any fatal fault into the `{error, message}` record.
///
/// # Example
///
/// ```no_run
/// use ifc_space_analyzer::analysis::analyze;
/// use ifc_space_analyzer::config::AnalysisConfig;
/// use ifc_space_analyzer::parser::parse_ifc_file;
///
/// let graph = parse_ifc_file("model.ifc")?;
/// let output = analyze(&graph, &AnalysisConfig::default());
/// if let Some(report) = output.report() {
///     println!("{} elements assigned", report.element_space_map.len());
/// }
/// # Ok::<(), ifc_space_analyzer::error::ParseError>(())
/// ```
#[must_use]
pub fn analyze(graph: &dyn GraphAccessor, config: &AnalysisConfig) -> AnalysisOutput {
    match run_analysis(graph, config) {
        Ok(report) => AnalysisOutput::Report(Box::new(report)),
        Err(err) => {
            error!(error = %err, "Space analysis failed");
            AnalysisOutput::Failed {
                error: err.to_string(),
                message: FAILURE_MESSAGE.to_string(),
            }
        }
    }
}

pub fn run_analysis(
    graph: &dyn GraphAccessor,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    let assignment = build(graph)?;
    let total_storeys = graph.entities_of_type(EntityKind::BuildingStorey)?.len();
    let statistics = summarize(&assignment.spaces, &config.circulation_keywords);

    let summary = Summary {
        total_spaces: assignment.spaces.len(),
        total_zones: assignment.zones.len(),
        total_storeys,
        assigned_elements: assignment.element_space_map.len(),
        unassigned_elements: assignment.unassigned.len(),
        statistics,
    };

    info!(
        spaces = summary.total_spaces,
        zones = summary.total_zones,
        storeys = summary.total_storeys,
        assigned = summary.assigned_elements,
        unassigned = summary.unassigned_elements,
        outside_spaces = assignment.contained_outside_spaces.len(),
        total_area = summary.statistics.total_area,
        circulation_pct = summary.statistics.circulation.percentage,
        "Space analysis complete"
    );

    Ok(AnalysisReport {
        spaces: assignment.spaces,
        element_space_map: assignment.element_space_map,
        zones: assignment.zones,
        unassigned_elements: assignment.unassigned,
        contained_outside_spaces: assignment.contained_outside_spaces,
        summary,
    })
}
