use crate::error::ParseError;
use crate::graph::{ModelGraph, ModelGraphBuilder};
use crate::model::{Entity, EntityKind, PropertySet, PropertyValue, RelationKind, Relationship};
use crate::parser::step::{StepEntity, StepFile, StepValue};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

// STEP entity → (IFC class, analysis kind). Standard-case and concrete
// subtypes map onto their supertype's kind but keep their own class name.
const ENTITY_CLASSES: &[(&str, &str, EntityKind)] = &[
    // Spatial elements
    ("IFCSITE", "IfcSite", EntityKind::Site),
    ("IFCBUILDING", "IfcBuilding", EntityKind::Building),
    ("IFCBUILDINGSTOREY", "IfcBuildingStorey", EntityKind::BuildingStorey),
    ("IFCSPACE", "IfcSpace", EntityKind::Space),
    ("IFCZONE", "IfcZone", EntityKind::Zone),
    // Building elements
    ("IFCWALL", "IfcWall", EntityKind::Wall),
    ("IFCWALLSTANDARDCASE", "IfcWallStandardCase", EntityKind::WallStandardCase),
    ("IFCWALLELEMENTEDCASE", "IfcWallElementedCase", EntityKind::Wall),
    ("IFCCURTAINWALL", "IfcCurtainWall", EntityKind::CurtainWall),
    ("IFCDOOR", "IfcDoor", EntityKind::Door),
    ("IFCDOORSTANDARDCASE", "IfcDoorStandardCase", EntityKind::Door),
    ("IFCWINDOW", "IfcWindow", EntityKind::Window),
    ("IFCWINDOWSTANDARDCASE", "IfcWindowStandardCase", EntityKind::Window),
    ("IFCSLAB", "IfcSlab", EntityKind::Slab),
    ("IFCSLABSTANDARDCASE", "IfcSlabStandardCase", EntityKind::Slab),
    ("IFCROOF", "IfcRoof", EntityKind::Roof),
    ("IFCCOLUMN", "IfcColumn", EntityKind::Column),
    ("IFCCOLUMNSTANDARDCASE", "IfcColumnStandardCase", EntityKind::Column),
    ("IFCBEAM", "IfcBeam", EntityKind::Beam),
    ("IFCBEAMSTANDARDCASE", "IfcBeamStandardCase", EntityKind::Beam),
    ("IFCSTAIR", "IfcStair", EntityKind::Stair),
    ("IFCSTAIRFLIGHT", "IfcStairFlight", EntityKind::StairFlight),
    ("IFCRAMP", "IfcRamp", EntityKind::Ramp),
    ("IFCRAMPFLIGHT", "IfcRampFlight", EntityKind::Ramp),
    ("IFCRAILING", "IfcRailing", EntityKind::Railing),
    ("IFCCOVERING", "IfcCovering", EntityKind::Covering),
    ("IFCPLATE", "IfcPlate", EntityKind::Plate),
    ("IFCMEMBER", "IfcMember", EntityKind::Member),
    ("IFCFOOTING", "IfcFooting", EntityKind::Footing),
    ("IFCPILE", "IfcPile", EntityKind::Pile),
    ("IFCBUILDINGELEMENTPROXY", "IfcBuildingElementProxy", EntityKind::BuildingElementProxy),
    ("IFCBUILDINGELEMENTPART", "IfcBuildingElementPart", EntityKind::BuildingElementProxy),
    ("IFCCHIMNEY", "IfcChimney", EntityKind::BuildingElementProxy),
    ("IFCSHADINGDEVICE", "IfcShadingDevice", EntityKind::BuildingElementProxy),
    ("IFCTRANSPORTELEMENT", "IfcTransportElement", EntityKind::BuildingElementProxy),
    ("IFCELEMENTASSEMBLY", "IfcElementAssembly", EntityKind::BuildingElementProxy),
    ("IFCDISCRETEACCESSORY", "IfcDiscreteAccessory", EntityKind::BuildingElementProxy),
    ("IFCMECHANICALFASTENER", "IfcMechanicalFastener", EntityKind::BuildingElementProxy),
    ("IFCCIVILELEMENT", "IfcCivilElement", EntityKind::BuildingElementProxy),
    ("IFCGEOGRAPHICELEMENT", "IfcGeographicElement", EntityKind::BuildingElementProxy),
    // Furnishing and distribution elements
    ("IFCFURNISHINGELEMENT", "IfcFurnishingElement", EntityKind::FurnishingElement),
    ("IFCFURNITURE", "IfcFurniture", EntityKind::FurnishingElement),
    ("IFCFLOWTERMINAL", "IfcFlowTerminal", EntityKind::FlowTerminal),
    ("IFCSANITARYTERMINAL", "IfcSanitaryTerminal", EntityKind::SanitaryTerminal),
    ("IFCLIGHTFIXTURE", "IfcLightFixture", EntityKind::FlowTerminal),
    ("IFCAIRTERMINAL", "IfcAirTerminal", EntityKind::FlowTerminal),
    ("IFCDISTRIBUTIONELEMENT", "IfcDistributionElement", EntityKind::DistributionElement),
    ("IFCFLOWSEGMENT", "IfcFlowSegment", EntityKind::DistributionElement),
    ("IFCFLOWFITTING", "IfcFlowFitting", EntityKind::DistributionElement),
    ("IFCFLOWCONTROLLER", "IfcFlowController", EntityKind::DistributionElement),
    ("IFCDUCTSEGMENT", "IfcDuctSegment", EntityKind::DistributionElement),
    ("IFCPIPESEGMENT", "IfcPipeSegment", EntityKind::DistributionElement),
    ("IFCDUCTFITTING", "IfcDuctFitting", EntityKind::DistributionElement),
    ("IFCPIPEFITTING", "IfcPipeFitting", EntityKind::DistributionElement),
    ("IFCCABLESEGMENT", "IfcCableSegment", EntityKind::DistributionElement),
    ("IFCCABLECARRIERSEGMENT", "IfcCableCarrierSegment", EntityKind::DistributionElement),
    ("IFCFLOWMOVINGDEVICE", "IfcFlowMovingDevice", EntityKind::DistributionElement),
    ("IFCFLOWSTORAGEDEVICE", "IfcFlowStorageDevice", EntityKind::DistributionElement),
    ("IFCFLOWTREATMENTDEVICE", "IfcFlowTreatmentDevice", EntityKind::DistributionElement),
    ("IFCENERGYCONVERSIONDEVICE", "IfcEnergyConversionDevice", EntityKind::DistributionElement),
    ("IFCDISTRIBUTIONFLOWELEMENT", "IfcDistributionFlowElement", EntityKind::DistributionElement),
    ("IFCDISTRIBUTIONCONTROLELEMENT", "IfcDistributionControlElement", EntityKind::DistributionElement),
];

// Relationship entity → (kind, relating attribute, related attribute)
const RELATIONSHIPS: &[(&str, RelationKind, usize, usize)] = &[
    ("IFCRELAGGREGATES", RelationKind::Aggregation, 4, 5),
    ("IFCRELCONTAINEDINSPATIALSTRUCTURE", RelationKind::Containment, 5, 4),
    ("IFCRELASSIGNSTOGROUP", RelationKind::GroupAssignment, 6, 4),
    ("IFCRELASSIGNSTOGROUPBYFACTOR", RelationKind::GroupAssignment, 6, 4),
];

// Products a containment relationship may list that are not physical elements.
const NON_PHYSICAL: &[&str] = &[
    "IFCOPENINGELEMENT",
    "IFCOPENINGSTANDARDCASE",
    "IFCVOIDINGFEATURE",
    "IFCANNOTATION",
    "IFCGRID",
    "IFCSPATIALZONE",
    "IFCEXTERNALSPATIALELEMENT",
];

const QUANTITY_TYPES: &[&str] = &[
    "IFCQUANTITYAREA",
    "IFCQUANTITYVOLUME",
    "IFCQUANTITYLENGTH",
    "IFCQUANTITYCOUNT",
    "IFCQUANTITYWEIGHT",
];

/// Parses an IFC file into a queryable building graph.
///
/// Supports both IFC2x3 and IFC4 schemas. Loads:
/// - Spatial elements (sites, buildings, storeys, spaces, zones)
/// - Physical elements with name, object type and description
/// - Aggregation, containment and group-assignment relationships
/// - Property sets and element quantities
///
/// # Errors
///
/// Returns [`ParseError::FileRead`] if the file cannot be read.
/// Returns [`ParseError::InvalidStep`] if the STEP format is malformed.
///
/// # Example
///
/// ```no_run
/// use ifc_space_analyzer::graph::GraphAccessor;
/// use ifc_space_analyzer::parser::parse_ifc_file;
///
/// let graph = parse_ifc_file("model.ifc")?;
/// println!("{} entities", graph.entity_count());
/// # Ok::<(), ifc_space_analyzer::error::ParseError>(())
/// ```
pub fn parse_ifc_file<P: AsRef<Path>>(path: P) -> Result<ModelGraph, ParseError> {
    let content = std::fs::read_to_string(&path).map_err(|source| ParseError::FileRead {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    parse_ifc_str(&content)
}

pub fn parse_ifc_str(content: &str) -> Result<ModelGraph, ParseError> {
    let step_file = StepFile::parse(content)?;
    Ok(build_graph(&step_file))
}

#[must_use]
pub fn build_graph(step_file: &StepFile) -> ModelGraph {
    let mut builder = ModelGraph::builder().schema(step_file.schema.clone());

    let mut entity_count = 0;
    let mut seen = HashSet::new();
    for (step_type, class_name, kind) in ENTITY_CLASSES {
        for step_entity in step_file.get_entities_by_type(step_type) {
            seen.insert(step_entity.id);
            if let Some(entity) = materialize(step_entity, class_name, *kind) {
                builder.push_entity(entity);
                entity_count += 1;
            }
        }
    }
    entity_count += materialize_contained_unknowns(step_file, &mut builder, &mut seen);

    let relationship_count = extract_relationships(step_file, &mut builder);
    let pset_count = extract_property_sets(step_file, &mut builder);

    info!(
        schema = %step_file.schema,
        step_entities = step_file.entities.len(),
        entities = entity_count,
        relationships = relationship_count,
        property_links = pset_count,
        "Loaded building graph"
    );

    builder.build()
}

fn materialize(step_entity: &StepEntity, class_name: &str, kind: EntityKind) -> Option<Entity> {
    // IfcRoot: GlobalId, OwnerHistory, Name, Description; IfcObject adds ObjectType
    let Some(global_id) = step_entity.string_at(0) else {
        warn!(
            id = step_entity.id,
            entity_type = %step_entity.entity_type,
            "Skipping entity without GlobalId"
        );
        return None;
    };

    Some(Entity {
        id: step_entity.id,
        global_id,
        kind,
        class_name: class_name.to_string(),
        name: step_entity.string_at(2),
        description: step_entity.string_at(3),
        object_type: step_entity.string_at(4),
    })
}

/// Loads contained products whose class is not in the table as generic
/// physical elements, keeping the STEP class name.
fn materialize_contained_unknowns(
    step_file: &StepFile,
    builder: &mut ModelGraphBuilder,
    seen: &mut HashSet<u64>,
) -> usize {
    let mut count = 0;
    for rel in step_file.get_entities_by_type("IFCRELCONTAINEDINSPATIALSTRUCTURE") {
        // RelatedElements
        for id in rel.references_at(4) {
            if !seen.insert(id) {
                continue;
            }
            let Some(step_entity) = step_file.get_entity(id) else {
                continue;
            };
            if NON_PHYSICAL.contains(&step_entity.entity_type.as_str()) {
                continue;
            }
            let class_name = step_entity.entity_type.clone();
            if let Some(entity) =
                materialize(step_entity, &class_name, EntityKind::BuildingElementProxy)
            {
                debug!(id, class = %class_name, "Loaded unlisted contained element as proxy");
                builder.push_entity(entity);
                count += 1;
            }
        }
    }
    count
}

fn extract_relationships(step_file: &StepFile, builder: &mut ModelGraphBuilder) -> usize {
    let mut count = 0;
    for (step_type, kind, relating_index, related_index) in RELATIONSHIPS {
        for rel in step_file.get_entities_by_type(step_type) {
            let Some(relating) = rel.reference_at(*relating_index) else {
                debug!(id = rel.id, "Skipping relationship without relating entity");
                continue;
            };
            builder.push_relationship(Relationship {
                id: rel.id,
                kind: *kind,
                relating,
                related: rel.references_at(*related_index),
            });
            count += 1;
        }
    }
    count
}

/// Links IFCPROPERTYSET and IFCELEMENTQUANTITY definitions to the objects
/// named by IFCRELDEFINESBYPROPERTIES.
fn extract_property_sets(step_file: &StepFile, builder: &mut ModelGraphBuilder) -> usize {
    let mut definitions: HashMap<u64, (String, PropertySet)> = HashMap::new();

    for pset in step_file.get_entities_by_type("IFCPROPERTYSET") {
        let mut props = PropertySet::new();
        for prop_id in pset.references_at(4) {
            if let Some(prop) = step_file.get_entity(prop_id) {
                if prop.entity_type == "IFCPROPERTYSINGLEVALUE" {
                    insert_value(&mut props, prop, 2);
                }
            }
        }
        let name = pset.string_at(2).unwrap_or_default();
        definitions.insert(pset.id, (name, props));
    }

    for qto in step_file.get_entities_by_type("IFCELEMENTQUANTITY") {
        let mut quantities = PropertySet::new();
        for quantity_id in qto.references_at(5) {
            if let Some(quantity) = step_file.get_entity(quantity_id) {
                if QUANTITY_TYPES.contains(&quantity.entity_type.as_str()) {
                    insert_value(&mut quantities, quantity, 3);
                }
            }
        }
        let name = qto.string_at(2).unwrap_or_default();
        definitions.insert(qto.id, (name, quantities));
    }

    let mut links = 0;
    for rel in step_file.get_entities_by_type("IFCRELDEFINESBYPROPERTIES") {
        let Some((name, props)) = rel
            .reference_at(5)
            .and_then(|definition| definitions.get(&definition))
        else {
            continue;
        };
        for object_id in rel.references_at(4) {
            builder.push_property_set(object_id, name, props);
            links += 1;
        }
    }
    links
}

fn insert_value(target: &mut PropertySet, entity: &StepEntity, value_index: usize) {
    let Some(name) = entity.string_at(0) else {
        return;
    };
    if let Some(value) = entity.values.get(value_index).and_then(property_value) {
        target.insert(name, value);
    }
}

fn property_value(value: &StepValue) -> Option<PropertyValue> {
    match value {
        StepValue::String(s) | StepValue::Enum(s) => Some(PropertyValue::Text(s.clone())),
        StepValue::Real(f) => Some(PropertyValue::Real(*f)),
        StepValue::Integer(i) => Some(PropertyValue::Integer(*i)),
        StepValue::Boolean(b) => Some(PropertyValue::Boolean(*b)),
        StepValue::Reference(_) | StepValue::List(_) | StepValue::Null | StepValue::Derived => {
            None
        }
    }
}
