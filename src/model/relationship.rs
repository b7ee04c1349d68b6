use super::EntityId;
use serde::Serialize;

/// The relationship kinds the analysis walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RelationKind {
    /// IfcRelAggregates: spatial parent → spatial children.
    Aggregation,
    /// IfcRelContainedInSpatialStructure: spatial structure → physical elements.
    Containment,
    /// IfcRelAssignsToGroup: group (zone) → members.
    GroupAssignment,
}

impl RelationKind {
    pub const ALL: [RelationKind; 3] = [
        RelationKind::Aggregation,
        RelationKind::Containment,
        RelationKind::GroupAssignment,
    ];

    #[must_use]
    pub fn ifc_class(self) -> &'static str {
        match self {
            RelationKind::Aggregation => "IfcRelAggregates",
            RelationKind::Containment => "IfcRelContainedInSpatialStructure",
            RelationKind::GroupAssignment => "IfcRelAssignsToGroup",
        }
    }
}

/// A typed edge: one relating entity, one or many related entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    /// Position used for tie-breaks; lower wins.
    pub id: EntityId,
    pub kind: RelationKind,
    pub relating: EntityId,
    pub related: Vec<EntityId>,
}

impl Relationship {
    #[must_use]
    pub fn relates(&self, id: EntityId) -> bool {
        self.related.contains(&id)
    }
}
