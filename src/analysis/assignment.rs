use tracing::{debug, warn};

use super::resolver::RelationshipResolver;
use crate::error::GraphError;
use crate::graph::GraphAccessor;
use crate::model::{
    ElementSpaceMap, ElementSummary, Entity, EntityKind, PropertySet, PropertySets,
    PropertyValue, SpaceAssignment, SpaceRecord, StructureOnlyElement, ZoneRecord,
};

/// Quantity sets searched for space measurements, in order.
const QUANTITY_SETS: &[&str] = &["Qto_SpaceBaseQuantities", "BaseQuantities"];
const SPACE_COMMON: &str = "Pset_SpaceCommon";

/// Output of one walk over spaces, zones and elements.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialAssignment {
    pub spaces: Vec<SpaceRecord>,
    pub element_space_map: ElementSpaceMap,
    pub zones: Vec<ZoneRecord>,
    /// Elements with no containment relation at all.
    pub unassigned: Vec<ElementSummary>,
    /// Elements held by a storey, building or site but by no space.
    pub contained_outside_spaces: Vec<StructureOnlyElement>,
}

#[derive(Debug, Default, PartialEq)]
struct SpaceQuantities {
    area: f64,
    volume: f64,
    height: f64,
    occupancy_type: Option<String>,
    occupancy_number: Option<f64>,
}

impl SpaceQuantities {
    fn from_property_sets(sets: &PropertySets) -> Self {
        let mut quantities = Self::default();

        if let Some(set) = QUANTITY_SETS.iter().find_map(|name| sets.get(*name)) {
            quantities.area = first_number(set, &["NetFloorArea", "GrossFloorArea"]);
            quantities.volume = first_number(set, &["NetVolume", "GrossVolume"]);
            quantities.height = first_number(set, &["Height"]);
        }

        if let Some(common) = sets.get(SPACE_COMMON) {
            quantities.occupancy_type = Some(
                common
                    .get("OccupancyType")
                    .map(PropertyValue::as_text)
                    .unwrap_or_default(),
            );
            quantities.occupancy_number = Some(
                common
                    .get("OccupancyNumber")
                    .and_then(PropertyValue::as_f64)
                    .unwrap_or(0.0),
            );
        }

        quantities
    }
}

fn first_number(set: &PropertySet, names: &[&str]) -> f64 {
    names
        .iter()
        .find_map(|name| set.get(*name).and_then(PropertyValue::as_f64))
        .unwrap_or(0.0)
}

/// Resolves every space's storey, quantities and contents, every zone's
/// spaces, and the elements left outside all spaces.
///
/// Spaces are processed in ascending id order. An element claimed by two
/// spaces is listed under both, but the later space owns its map entry.
pub fn build(graph: &dyn GraphAccessor) -> Result<SpatialAssignment, GraphError> {
    let resolver = RelationshipResolver::new(graph);

    let mut spaces = Vec::new();
    let mut element_space_map = ElementSpaceMap::new();

    for space in graph.entities_of_type(EntityKind::Space)? {
        let record = build_space(graph, &resolver, space)?;
        for element in &record.elements {
            let previous = element_space_map.insert(
                element.id.clone(),
                SpaceAssignment {
                    space_id: record.id.clone(),
                    space_name: Some(record.name.clone()),
                    space_type: record.space_type.clone(),
                    storey: record.storey.clone(),
                },
            );
            if let Some(previous) = previous {
                debug!(
                    element = %element.id,
                    previous_space = %previous.space_id,
                    space = %record.id,
                    "Element contained in more than one space; later space wins"
                );
            }
        }
        spaces.push(record);
    }

    let mut zones = Vec::new();
    for zone in graph.entities_of_type(EntityKind::Zone)? {
        zones.push(ZoneRecord {
            id: zone.global_id.clone(),
            name: zone.name_or("Zone"),
            zone_type: zone.object_type.clone().unwrap_or_else(|| "Generic".to_string()),
            description: zone.description.clone().unwrap_or_default(),
            spaces: resolver.spaces_of_zone(zone)?,
        });
    }

    let mut unassigned = Vec::new();
    let mut contained_outside_spaces = Vec::new();
    for element in graph.elements()? {
        if element_space_map.contains_key(&element.global_id) {
            continue;
        }
        if !resolver.is_contained_in_any_structure(element)? {
            unassigned.push(ElementSummary::from_entity(element));
        } else if let Some(container) = resolver.container_of(element)? {
            contained_outside_spaces.push(StructureOnlyElement {
                element: ElementSummary::from_entity(element),
                container_id: container.global_id.clone(),
                container_name: container.name.clone(),
                container_type: container.class_name.clone(),
            });
        }
    }

    Ok(SpatialAssignment {
        spaces,
        element_space_map,
        zones,
        unassigned,
        contained_outside_spaces,
    })
}

fn build_space(
    graph: &dyn GraphAccessor,
    resolver: &RelationshipResolver<'_>,
    space: &Entity,
) -> Result<SpaceRecord, GraphError> {
    let quantities = match graph.property_sets(space.id) {
        Ok(sets) => SpaceQuantities::from_property_sets(&sets),
        Err(err) => {
            warn!(space = %space.global_id, error = %err, "Ignoring unreadable property sets");
            SpaceQuantities::default()
        }
    };

    let elements: Vec<ElementSummary> = resolver
        .elements_contained_in(space)?
        .into_iter()
        .map(ElementSummary::from_entity)
        .collect();

    Ok(SpaceRecord {
        id: space.global_id.clone(),
        name: space.name_or("Space"),
        space_type: space
            .object_type
            .clone()
            .unwrap_or_else(|| "Generic".to_string()),
        description: space.description.clone().unwrap_or_default(),
        storey: resolver.storey_of(space)?,
        element_count: elements.len(),
        elements,
        area: quantities.area,
        volume: quantities.volume,
        height: quantities.height,
        occupancy_type: quantities.occupancy_type,
        occupancy_number: quantities.occupancy_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ModelGraph;
    use pretty_assertions::assert_eq;

    fn sample_graph() -> ModelGraph {
        ModelGraph::builder()
            .entity(Entity::new(1, "storey", EntityKind::BuildingStorey).with_name("L1"))
            .entity(
                Entity::new(10, "space-a", EntityKind::Space)
                    .with_name("Room A")
                    .with_object_type("Office"),
            )
            .entity(Entity::new(11, "space-b-long-id", EntityKind::Space))
            .entity(Entity::new(20, "wall-1", EntityKind::Wall).with_name("W1"))
            .entity(Entity::new(21, "door-1234567890", EntityKind::Door))
            .entity(Entity::new(22, "slab-1", EntityKind::Slab))
            .entity(Entity::new(23, "column-1", EntityKind::Column))
            .entity(Entity::new(30, "zone-0000001", EntityKind::Zone))
            .aggregates(1, [10, 11])
            .contains(10, [20, 21])
            .contains(11, [21])
            .contains(1, [22])
            .assigns_to_group(30, [11])
            .property(10, "Qto_SpaceBaseQuantities", "NetFloorArea", 20.5)
            .property(10, "Qto_SpaceBaseQuantities", "NetVolume", 61.5)
            .property(10, "Qto_SpaceBaseQuantities", "Height", 3.0)
            .property(10, "Pset_SpaceCommon", "OccupancyType", "Office")
            .property(11, "BaseQuantities", "GrossFloorArea", 8.0)
            .build()
    }

    #[test]
    fn builds_space_records_with_defaults() {
        let result = build(&sample_graph()).unwrap();

        assert_eq!(result.spaces.len(), 2);
        let a = &result.spaces[0];
        assert_eq!(a.name, "Room A");
        assert_eq!(a.space_type, "Office");
        assert_eq!(a.storey.as_deref(), Some("L1"));
        assert_eq!((a.area, a.volume, a.height), (20.5, 61.5, 3.0));
        assert_eq!(a.occupancy_type.as_deref(), Some("Office"));
        assert_eq!(a.occupancy_number, Some(0.0));
        assert_eq!(a.element_count, 2);
        assert_eq!(a.elements[0].name, "W1");
        assert_eq!(a.elements[1].name, "IfcDoor_door-123");

        let b = &result.spaces[1];
        assert_eq!(b.name, "Space_space-b-");
        assert_eq!(b.space_type, "Generic");
        assert_eq!(b.area, 8.0);
        assert_eq!(b.volume, 0.0);
        assert_eq!(b.occupancy_type, None);
    }

    #[test]
    fn later_space_wins_map_entry() {
        let result = build(&sample_graph()).unwrap();

        assert_eq!(result.element_space_map["wall-1"].space_id, "space-a");
        // Door is claimed by both spaces
        assert_eq!(
            result.element_space_map["door-1234567890"].space_id,
            "space-b-long-id"
        );
        assert_eq!(result.spaces[0].elements.len(), 2);
        assert_eq!(result.spaces[1].elements.len(), 1);
    }

    #[test]
    fn separates_unassigned_from_storey_only_elements() {
        let result = build(&sample_graph()).unwrap();

        let unassigned: Vec<_> = result.unassigned.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(unassigned, vec!["column-1"]);

        assert_eq!(result.contained_outside_spaces.len(), 1);
        let slab = &result.contained_outside_spaces[0];
        assert_eq!(slab.element.id, "slab-1");
        assert_eq!(slab.container_name.as_deref(), Some("L1"));
        assert_eq!(slab.container_type, "IfcBuildingStorey");

        for element in &result.unassigned {
            assert!(!result.element_space_map.contains_key(&element.id));
        }
    }

    #[test]
    fn zones_list_member_spaces() {
        let result = build(&sample_graph()).unwrap();

        assert_eq!(result.zones.len(), 1);
        let zone = &result.zones[0];
        assert_eq!(zone.name, "Zone_zone-000");
        assert_eq!(zone.zone_type, "Generic");
        assert_eq!(zone.spaces.len(), 1);
        assert_eq!(zone.spaces[0].id, "space-b-long-id");
        assert_eq!(zone.spaces[0].name, "");
    }

    #[test]
    fn empty_graph_yields_empty_assignment() {
        let result = build(&ModelGraph::builder().build()).unwrap();
        assert!(result.spaces.is_empty());
        assert!(result.element_space_map.is_empty());
        assert!(result.unassigned.is_empty());
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let graph = sample_graph();
        let first = build(&graph).unwrap();
        let second = build(&graph).unwrap();
        assert_eq!(first.element_space_map, second.element_space_map);
    }

    #[test]
    fn quantities_fall_back_to_gross_values() {
        let mut sets = PropertySets::new();
        sets.entry("Qto_SpaceBaseQuantities".into())
            .or_default()
            .insert("GrossVolume".into(), PropertyValue::Integer(40));
        let quantities = SpaceQuantities::from_property_sets(&sets);
        assert_eq!(quantities.volume, 40.0);
        assert_eq!(quantities.area, 0.0);
    }
}
