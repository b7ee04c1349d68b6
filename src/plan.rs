//! Plans the space-assignment properties a writer stage would attach to elements.
//!
//! Nothing here touches the model; the plan is the hand-off record.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::graph::GraphAccessor;
use crate::model::{ElementSpaceMap, ElementSummary, PropertySet, PropertyValue};

/// Property set the writer stage targets.
pub const ASSIGNMENT_PSET: &str = "Pset_SpaceAssignment";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedAssignment {
    pub space_name: String,
    pub space_type: String,
    pub space_id: String,
    pub storey: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPlan {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    pub space_assignment: PlannedAssignment,
    pub property_set: String,
    pub properties: PropertySet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub total_processed: usize,
    pub successfully_updated: usize,
    pub skipped: usize,
    pub spaces_found: usize,
    pub storeys_found: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyWritePlan {
    pub elements_updated: usize,
    pub elements_skipped: usize,
    pub details: Vec<ElementPlan>,
    pub elements_by_space: BTreeMap<String, Vec<ElementSummary>>,
    pub summary: PlanSummary,
}

/// Builds the plan; map entries whose GlobalId is not in the graph are skipped.
#[must_use]
pub fn plan_space_properties(
    map: &ElementSpaceMap,
    graph: &dyn GraphAccessor,
) -> PropertyWritePlan {
    let mut plan = PropertyWritePlan::default();

    for (global_id, assignment) in map {
        let Some(element) = graph.by_global_id(global_id) else {
            debug!(global_id = %global_id, "Element not found, skipping");
            plan.elements_skipped += 1;
            continue;
        };

        let planned = PlannedAssignment {
            space_name: assignment.space_name.clone().unwrap_or_default(),
            space_type: assignment.space_type.clone(),
            space_id: assignment.space_id.clone(),
            storey: assignment.storey.clone().unwrap_or_default(),
        };

        let mut properties = PropertySet::new();
        properties.insert(
            "AssignedToSpace".to_string(),
            PropertyValue::Text(planned.space_name.clone()),
        );
        properties.insert(
            "SpaceType".to_string(),
            PropertyValue::Text(planned.space_type.clone()),
        );
        properties.insert(
            "BuildingStorey".to_string(),
            PropertyValue::Text(planned.storey.clone()),
        );

        plan.elements_by_space
            .entry(planned.space_name.clone())
            .or_default()
            .push(ElementSummary {
                id: element.global_id.clone(),
                element_type: element.class_name.clone(),
                name: element.name.clone().unwrap_or_default(),
            });

        plan.details.push(ElementPlan {
            id: element.global_id.clone(),
            element_type: element.class_name.clone(),
            name: element.name.clone().unwrap_or_default(),
            space_assignment: planned,
            property_set: ASSIGNMENT_PSET.to_string(),
            properties,
        });
        plan.elements_updated += 1;
    }

    let spaces: BTreeSet<_> = map
        .values()
        .map(|a| a.space_name.clone().unwrap_or_default())
        .collect();
    let storeys: BTreeSet<_> = map
        .values()
        .filter_map(|a| a.storey.as_deref())
        .filter(|s| !s.is_empty())
        .collect();

    plan.summary = PlanSummary {
        total_processed: map.len(),
        successfully_updated: plan.elements_updated,
        skipped: plan.elements_skipped,
        spaces_found: spaces.len(),
        storeys_found: storeys.len(),
    };

    info!(
        updated = plan.elements_updated,
        skipped = plan.elements_skipped,
        spaces = plan.summary.spaces_found,
        storeys = plan.summary.storeys_found,
        "Space assignment plan complete"
    );

    plan
}
