//! Quick overview of a model's spatial structure, for checking why an
//! analysis came back empty.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::RelationshipResolver;
use crate::error::GraphError;
use crate::graph::GraphAccessor;
use crate::model::{EntityKind, RelationKind};

const SPATIAL_KINDS: &[EntityKind] = &[
    EntityKind::Space,
    EntityKind::Zone,
    EntityKind::BuildingStorey,
    EntityKind::Building,
    EntityKind::Site,
];

const SAMPLE_KINDS: &[EntityKind] = &[
    EntityKind::Wall,
    EntityKind::Slab,
    EntityKind::Column,
    EntityKind::Beam,
    EntityKind::Door,
    EntityKind::Window,
];

const EXAMPLES_PER_TYPE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityExample {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub object_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialTypeInfo {
    pub count: usize,
    pub examples: Vec<EntityExample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerInfo {
    #[serde(rename = "type")]
    pub container_type: String,
    pub name: Option<String>,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSample {
    pub id: String,
    pub name: Option<String>,
    pub contained_in: Option<ContainerInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementTypeSample {
    #[serde(rename = "type")]
    pub element_type: String,
    pub count: usize,
    pub sample: ElementSample,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreyInfo {
    pub name: Option<String>,
    pub id: String,
    pub contained_elements: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialDiagnostics {
    pub schema: String,
    pub total_entities: usize,
    pub spatial_elements: BTreeMap<String, SpatialTypeInfo>,
    pub spatial_relationships: BTreeMap<String, usize>,
    pub sample_elements: Vec<ElementTypeSample>,
    /// Only filled when the model has no spaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storey_analysis: Option<Vec<StoreyInfo>>,
    pub message: String,
}

pub fn inspect(graph: &dyn GraphAccessor) -> Result<SpatialDiagnostics, GraphError> {
    let resolver = RelationshipResolver::new(graph);

    let mut spatial_elements = BTreeMap::new();
    for &kind in SPATIAL_KINDS {
        let entities = graph.entities_of_type(kind)?;
        if entities.is_empty() {
            continue;
        }
        let examples = entities
            .iter()
            .take(EXAMPLES_PER_TYPE)
            .map(|e| EntityExample {
                id: e.global_id.clone(),
                name: e.name.clone(),
                object_type: e.object_type.clone(),
            })
            .collect();
        spatial_elements.insert(
            kind.ifc_class(),
            SpatialTypeInfo {
                count: entities.len(),
                examples,
            },
        );
    }

    let mut spatial_relationships = BTreeMap::new();
    for kind in RelationKind::ALL {
        let count = graph.relationships(kind)?.len();
        if count > 0 {
            spatial_relationships.insert(kind.ifc_class().to_string(), count);
        }
    }

    let mut sample_elements = Vec::new();
    for &kind in SAMPLE_KINDS {
        let entities = graph.entities_of_type(kind)?;
        let Some(first) = entities.first() else {
            continue;
        };
        let contained_in = resolver.container_of(first)?.map(|c| ContainerInfo {
            container_type: c.class_name.clone(),
            name: c.name.clone(),
            id: c.global_id.clone(),
        });
        sample_elements.push(ElementTypeSample {
            element_type: kind.ifc_class(),
            count: entities.len(),
            sample: ElementSample {
                id: first.global_id.clone(),
                name: first.name.clone(),
                contained_in,
            },
        });
    }

    let space_count = spatial_elements
        .get(&EntityKind::Space.ifc_class())
        .map_or(0, |info| info.count);
    let storey_count = spatial_elements
        .get(&EntityKind::BuildingStorey.ifc_class())
        .map_or(0, |info| info.count);

    let storey_analysis = if space_count == 0 && storey_count > 0 {
        let mut storeys = Vec::new();
        for storey in graph.entities_of_type(EntityKind::BuildingStorey)? {
            storeys.push(StoreyInfo {
                name: storey.name.clone(),
                id: storey.global_id.clone(),
                contained_elements: resolver.elements_contained_in(storey)?.len(),
            });
        }
        Some(storeys)
    } else {
        None
    };

    let message = if space_count > 0 {
        format!("Found {space_count} spaces in the model")
    } else if storey_count > 0 {
        format!("No spaces found, but model has {storey_count} building storeys")
    } else {
        "No spatial structure found in this IFC file".to_string()
    };

    Ok(SpatialDiagnostics {
        schema: graph.schema().unwrap_or("Unknown").to_string(),
        total_entities: graph.entity_count(),
        spatial_elements,
        spatial_relationships,
        sample_elements,
        storey_analysis,
        message,
    })
}
