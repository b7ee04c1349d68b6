use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Entity;

/// Summary of an element as listed under a space or in the unassigned list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
}

impl ElementSummary {
    #[must_use]
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            id: entity.global_id.clone(),
            element_type: entity.class_name.clone(),
            name: entity.name_or(&entity.class_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub space_type: String,
    pub description: String,
    pub storey: Option<String>,
    pub elements: Vec<ElementSummary>,
    pub area: f64,
    pub volume: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancy_number: Option<f64>,
    pub element_count: usize,
}

/// Where an element was assigned. Reads both camelCase and snake_case keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpaceAssignment {
    #[serde(alias = "space_id")]
    pub space_id: String,
    #[serde(alias = "space_name")]
    pub space_name: Option<String>,
    #[serde(alias = "space_type")]
    pub space_type: String,
    pub storey: Option<String>,
}

/// Element GlobalId → assignment.
pub type ElementSpaceMap = BTreeMap<String, SpaceAssignment>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSpace {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: String,
    pub description: String,
    pub spaces: Vec<ZoneSpace>,
}

/// Element held by a storey, building or site but by no space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureOnlyElement {
    #[serde(flatten)]
    pub element: ElementSummary,
    pub container_id: String,
    pub container_name: Option<String>,
    pub container_type: String,
}
