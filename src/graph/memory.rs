use std::collections::HashMap;

use super::GraphAccessor;
use crate::error::GraphError;
use crate::model::{
    Entity, EntityId, EntityKind, PropertySet, PropertySets, PropertyValue, RelationKind,
    Relationship,
};

/// In-memory building graph with id and GlobalId indexes.
#[derive(Debug, Default)]
pub struct ModelGraph {
    schema: String,
    entities: Vec<Entity>,
    by_id: HashMap<EntityId, usize>,
    by_global_id: HashMap<String, usize>,
    relationships: HashMap<RelationKind, Vec<Relationship>>,
    property_sets: HashMap<EntityId, PropertySets>,
}

impl ModelGraph {
    #[must_use]
    pub fn builder() -> ModelGraphBuilder {
        ModelGraphBuilder::default()
    }

    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }
}

impl GraphAccessor for ModelGraph {
    fn schema(&self) -> Option<&str> {
        if self.schema.is_empty() {
            None
        } else {
            Some(&self.schema)
        }
    }

    fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn entities_of_type(&self, kind: EntityKind) -> Result<Vec<&Entity>, GraphError> {
        Ok(self.entities.iter().filter(|e| e.kind.is_a(kind)).collect())
    }

    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.by_id.get(&id).map(|&idx| &self.entities[idx])
    }

    fn by_global_id(&self, global_id: &str) -> Option<&Entity> {
        self.by_global_id
            .get(global_id)
            .map(|&idx| &self.entities[idx])
    }

    fn relationships(&self, kind: RelationKind) -> Result<&[Relationship], GraphError> {
        Ok(self
            .relationships
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    fn property_sets(&self, id: EntityId) -> Result<PropertySets, GraphError> {
        Ok(self.property_sets.get(&id).cloned().unwrap_or_default())
    }
}

/// Assembles a [`ModelGraph`]. Relationship ids default to insertion order.
#[derive(Debug, Default)]
pub struct ModelGraphBuilder {
    schema: String,
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
    property_sets: HashMap<EntityId, PropertySets>,
    next_relationship_id: EntityId,
}

impl ModelGraphBuilder {
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    #[must_use]
    pub fn entity(mut self, entity: Entity) -> Self {
        self.push_entity(entity);
        self
    }

    pub fn push_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    #[must_use]
    pub fn aggregates(
        self,
        relating: EntityId,
        related: impl IntoIterator<Item = EntityId>,
    ) -> Self {
        self.relation(RelationKind::Aggregation, relating, related)
    }

    #[must_use]
    pub fn contains(
        self,
        relating: EntityId,
        related: impl IntoIterator<Item = EntityId>,
    ) -> Self {
        self.relation(RelationKind::Containment, relating, related)
    }

    #[must_use]
    pub fn assigns_to_group(
        self,
        group: EntityId,
        related: impl IntoIterator<Item = EntityId>,
    ) -> Self {
        self.relation(RelationKind::GroupAssignment, group, related)
    }

    #[must_use]
    pub fn relation(
        mut self,
        kind: RelationKind,
        relating: EntityId,
        related: impl IntoIterator<Item = EntityId>,
    ) -> Self {
        let id = self.next_relationship_id;
        self.push_relationship(Relationship {
            id,
            kind,
            relating,
            related: related.into_iter().collect(),
        });
        self
    }

    pub fn push_relationship(&mut self, relationship: Relationship) {
        self.next_relationship_id = self.next_relationship_id.max(relationship.id + 1);
        self.relationships.push(relationship);
    }

    #[must_use]
    pub fn property(
        mut self,
        id: EntityId,
        set: &str,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.property_sets
            .entry(id)
            .or_default()
            .entry(set.to_string())
            .or_default()
            .insert(name.to_string(), value.into());
        self
    }

    /// Merges a whole set into the entity's sets; existing values are kept.
    pub fn push_property_set(&mut self, id: EntityId, set: &str, properties: &PropertySet) {
        let target = self
            .property_sets
            .entry(id)
            .or_default()
            .entry(set.to_string())
            .or_default();
        for (name, value) in properties {
            target.entry(name.clone()).or_insert_with(|| value.clone());
        }
    }

    #[must_use]
    pub fn build(self) -> ModelGraph {
        let mut entities = self.entities;
        entities.sort_by_key(|e| e.id);

        let mut by_id = HashMap::with_capacity(entities.len());
        let mut by_global_id = HashMap::with_capacity(entities.len());
        for (idx, entity) in entities.iter().enumerate() {
            by_id.insert(entity.id, idx);
            // Duplicate GlobalIds: the lowest id keeps the key
            by_global_id.entry(entity.global_id.clone()).or_insert(idx);
        }

        let mut relationships: HashMap<RelationKind, Vec<Relationship>> = HashMap::new();
        for rel in self.relationships {
            relationships.entry(rel.kind).or_default().push(rel);
        }
        for rels in relationships.values_mut() {
            rels.sort_by_key(|r| r.id);
        }

        ModelGraph {
            schema: self.schema,
            entities,
            by_id,
            by_global_id,
            relationships,
            property_sets: self.property_sets,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Real(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn indexes_by_id_and_global_id() {
        let graph = ModelGraph::builder()
            .entity(Entity::new(20, "wall-b", EntityKind::Wall))
            .entity(Entity::new(10, "wall-a", EntityKind::WallStandardCase))
            .entity(Entity::new(5, "space", EntityKind::Space))
            .build();

        assert_eq!(graph.entity_count(), 3);
        assert_eq!(graph.entity(10).map(|e| e.global_id.as_str()), Some("wall-a"));
        assert_eq!(graph.by_global_id("wall-b").map(|e| e.id), Some(20));
        assert!(graph.by_global_id("missing").is_none());

        let walls: Vec<_> = graph
            .entities_of_type(EntityKind::Wall)
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(walls, vec![10, 20]);
        assert_eq!(graph.elements().unwrap().len(), 2);
    }

    #[test]
    fn relationships_are_ordered_by_id() {
        let mut builder = ModelGraph::builder();
        builder.push_relationship(Relationship {
            id: 90,
            kind: RelationKind::Containment,
            relating: 1,
            related: vec![3],
        });
        builder.push_relationship(Relationship {
            id: 40,
            kind: RelationKind::Containment,
            relating: 2,
            related: vec![3],
        });
        let graph = builder.build();

        let ids: Vec<_> = graph
            .relationships(RelationKind::Containment)
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![40, 90]);
        assert!(graph
            .relationships(RelationKind::Aggregation)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn property_sets_merge_and_default_to_empty() {
        let graph = ModelGraph::builder()
            .entity(Entity::new(1, "space", EntityKind::Space))
            .property(1, "Qto_SpaceBaseQuantities", "NetFloorArea", 12.0)
            .property(1, "Qto_SpaceBaseQuantities", "Height", 3.0)
            .build();

        let sets = graph.property_sets(1).unwrap();
        assert_eq!(sets["Qto_SpaceBaseQuantities"].len(), 2);
        assert!(graph.property_sets(2).unwrap().is_empty());
    }
}
