use serde::Serialize;
use std::collections::BTreeMap;

use super::{ElementSpaceMap, ElementSummary, SpaceRecord, StructureOnlyElement, ZoneRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceTypeStats {
    pub count: usize,
    pub total_area: f64,
    pub spaces: Vec<String>,
}

/// Circulation or program share of the floor area.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryStats {
    pub count: usize,
    pub area: f64,
    pub percentage: f64,
}

/// Rounded figures derived from the space records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceStatistics {
    pub total_area: f64,
    pub total_volume: f64,
    pub average_height: f64,
    pub space_types: BTreeMap<String, SpaceTypeStats>,
    pub circulation: CategoryStats,
    pub program: CategoryStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_spaces: usize,
    pub total_zones: usize,
    pub total_storeys: usize,
    pub assigned_elements: usize,
    pub unassigned_elements: usize,
    #[serde(flatten)]
    pub statistics: SpaceStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub spaces: Vec<SpaceRecord>,
    pub element_space_map: ElementSpaceMap,
    pub zones: Vec<ZoneRecord>,
    pub unassigned_elements: Vec<ElementSummary>,
    pub contained_outside_spaces: Vec<StructureOnlyElement>,
    pub summary: Summary,
}

/// What an analysis run hands downstream: a report, or the degenerate error record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutput {
    Report(Box<AnalysisReport>),
    Failed { error: String, message: String },
}

impl AnalysisOutput {
    #[must_use]
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            AnalysisOutput::Report(report) => Some(report),
            AnalysisOutput::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisOutput::Failed { .. })
    }
}
