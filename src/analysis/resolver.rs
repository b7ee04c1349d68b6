use tracing::debug;

use crate::error::GraphError;
use crate::graph::GraphAccessor;
use crate::model::{Entity, EntityKind, RelationKind, ZoneSpace};

/// Answers containment questions by scanning relationships.
///
/// Every query is a linear scan in ascending relationship id order, so where
/// a model is ambiguous the lowest-id relationship decides.
#[derive(Clone, Copy)]
pub struct RelationshipResolver<'g> {
    graph: &'g dyn GraphAccessor,
}

impl<'g> RelationshipResolver<'g> {
    #[must_use]
    pub fn new(graph: &'g dyn GraphAccessor) -> Self {
        Self { graph }
    }

    /// Name of the storey aggregating `spatial`.
    ///
    /// The first aggregation whose parent is a `BuildingStorey` wins; an
    /// unnamed storey yields `None` just like no storey at all.
    pub fn storey_of(&self, spatial: &Entity) -> Result<Option<String>, GraphError> {
        for rel in self.graph.relationships(RelationKind::Aggregation)? {
            if !rel.relates(spatial.id) {
                continue;
            }
            if let Some(parent) = self.graph.entity(rel.relating) {
                if parent.kind == EntityKind::BuildingStorey {
                    return Ok(parent.name.clone());
                }
            }
        }
        Ok(None)
    }

    /// Every element contained in `structure`, across all its containment relationships.
    pub fn elements_contained_in(&self, structure: &Entity) -> Result<Vec<&'g Entity>, GraphError> {
        let mut elements = Vec::new();
        for rel in self.graph.relationships(RelationKind::Containment)? {
            if rel.relating != structure.id {
                continue;
            }
            for &id in &rel.related {
                match self.graph.entity(id) {
                    Some(element) => elements.push(element),
                    None => debug!(
                        relationship = rel.id,
                        element = id,
                        "Skipping dangling containment reference"
                    ),
                }
            }
        }
        Ok(elements)
    }

    pub fn is_contained_in_any_structure(&self, element: &Entity) -> Result<bool, GraphError> {
        Ok(self
            .graph
            .relationships(RelationKind::Containment)?
            .iter()
            .any(|rel| rel.relates(element.id)))
    }

    /// Structure of the first containment relationship that lists `element`.
    pub fn container_of(&self, element: &Entity) -> Result<Option<&'g Entity>, GraphError> {
        Ok(self
            .graph
            .relationships(RelationKind::Containment)?
            .iter()
            .find(|rel| rel.relates(element.id))
            .and_then(|rel| self.graph.entity(rel.relating)))
    }

    /// Spaces assigned to `zone`; other group members are ignored.
    pub fn spaces_of_zone(&self, zone: &Entity) -> Result<Vec<ZoneSpace>, GraphError> {
        let mut spaces = Vec::new();
        for rel in self.graph.relationships(RelationKind::GroupAssignment)? {
            if rel.relating != zone.id {
                continue;
            }
            spaces.extend(
                rel.related
                    .iter()
                    .filter_map(|&id| self.graph.entity(id))
                    .filter(|member| member.kind == EntityKind::Space)
                    .map(|space| ZoneSpace {
                        id: space.global_id.clone(),
                        name: space.name.clone().unwrap_or_default(),
                    }),
            );
        }
        Ok(spaces)
    }
}
