//! Read-only access to a building graph.
//!
//! The analysis never owns or mutates the model: every component receives a
//! `&dyn GraphAccessor` and queries it.

pub mod memory;

use crate::error::GraphError;
use crate::model::{Entity, EntityId, EntityKind, PropertySets, RelationKind, Relationship};

pub use memory::{ModelGraph, ModelGraphBuilder};

pub trait GraphAccessor {
    /// Schema identifier of the loaded file, e.g. `IFC4`.
    fn schema(&self) -> Option<&str> {
        None
    }

    fn entity_count(&self) -> usize;

    /// Entities whose kind `is_a` the requested kind, in ascending id order.
    fn entities_of_type(&self, kind: EntityKind) -> Result<Vec<&Entity>, GraphError>;

    /// Every physical element.
    fn elements(&self) -> Result<Vec<&Entity>, GraphError> {
        self.entities_of_type(EntityKind::Element)
    }

    fn entity(&self, id: EntityId) -> Option<&Entity>;

    fn by_global_id(&self, global_id: &str) -> Option<&Entity>;

    /// Relationships of one kind, in ascending id order.
    fn relationships(&self, kind: RelationKind) -> Result<&[Relationship], GraphError>;

    /// Property and quantity sets attached to an entity; empty when it has none.
    fn property_sets(&self, id: EntityId) -> Result<PropertySets, GraphError>;
}
