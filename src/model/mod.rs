pub mod entity;
pub mod relationship;
pub mod report;
pub mod space;

pub use entity::{Entity, EntityId, EntityKind, PropertySet, PropertySets, PropertyValue};
pub use relationship::{RelationKind, Relationship};
pub use report::{
    AnalysisOutput, AnalysisReport, CategoryStats, SpaceStatistics, SpaceTypeStats, Summary,
};
pub use space::{
    ElementSpaceMap, ElementSummary, SpaceAssignment, SpaceRecord, StructureOnlyElement,
    ZoneRecord, ZoneSpace,
};
