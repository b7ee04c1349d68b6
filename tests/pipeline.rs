//! End-to-end runs over a small hand-written office model.

use ifc_space_analyzer::analysis::{analyze, run_analysis};
use ifc_space_analyzer::config::{AnalysisConfig, TransformConfig};
use ifc_space_analyzer::diagnostics::inspect;
use ifc_space_analyzer::graph::ModelGraph;
use ifc_space_analyzer::model::{AnalysisReport, EntityKind};
use ifc_space_analyzer::parser::{parse_ifc_file, parse_ifc_str};
use ifc_space_analyzer::plan::plan_space_properties;
use ifc_space_analyzer::transform::{assignment_map, transform_map, transform_value};
use pretty_assertions::assert_eq;
use std::path::Path;

const WALL_1: &str = "0Wall000000000000000001";
const WALL_2: &str = "0Wall000000000000000002";
const DOOR: &str = "0Door000000000000000001";

fn load() -> ModelGraph {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/office.ifc");
    parse_ifc_file(path).expect("fixture parses")
}

fn report(graph: &ModelGraph) -> AnalysisReport {
    run_analysis(graph, &AnalysisConfig::default()).expect("analysis succeeds")
}

#[test]
fn assigns_elements_to_spaces() {
    let graph = load();
    let report = report(&graph);

    assert_eq!(report.spaces.len(), 2);
    let room = &report.spaces[0];
    assert_eq!(room.name, "Room A");
    assert_eq!(room.storey.as_deref(), Some("L1"));
    assert_eq!(room.area, 20.5);
    assert_eq!(room.volume, 61.5);
    assert_eq!(room.height, 3.0);
    assert_eq!(room.element_count, 2);

    let wall = &report.element_space_map[WALL_1];
    assert_eq!(wall.space_name.as_deref(), Some("Room A"));
    assert_eq!(wall.space_id, room.id);
    assert_eq!(wall.storey.as_deref(), Some("L1"));
    assert_eq!(
        report.element_space_map[WALL_2].space_name.as_deref(),
        Some("Main Corridor")
    );
}

#[test]
fn every_mapped_element_is_listed_under_its_space() {
    let report = report(&load());

    for (global_id, assignment) in &report.element_space_map {
        let holders: Vec<_> = report
            .spaces
            .iter()
            .filter(|s| s.elements.iter().any(|e| &e.id == global_id))
            .collect();
        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].id, assignment.space_id);
    }
}

#[test]
fn separates_unassigned_and_storey_only_elements() {
    let report = report(&load());

    let unassigned: Vec<_> = report
        .unassigned_elements
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(unassigned, vec!["IfcColumn_0Colm000"]);

    assert_eq!(report.contained_outside_spaces.len(), 1);
    assert_eq!(report.contained_outside_spaces[0].element.name, "Floor");
    assert_eq!(
        report.contained_outside_spaces[0].container_name.as_deref(),
        Some("L1")
    );
}

#[test]
fn summarizes_circulation_share() {
    let report = report(&load());
    let summary = &report.summary;

    assert_eq!(summary.total_spaces, 2);
    assert_eq!(summary.total_zones, 1);
    assert_eq!(summary.total_storeys, 1);
    assert_eq!(summary.assigned_elements, 3);
    assert_eq!(summary.unassigned_elements, 1);
    assert_eq!(summary.statistics.total_area, 50.5);
    assert_eq!(summary.statistics.circulation.count, 1);
    assert_eq!(summary.statistics.circulation.area, 30.0);
    assert_eq!(summary.statistics.circulation.percentage, 59.4);
    assert_eq!(summary.statistics.program.percentage, 40.6);

    assert_eq!(report.zones[0].name, "Public");
    assert_eq!(report.zones[0].spaces[0].name, "Main Corridor");
}

#[test]
fn analysis_is_idempotent() {
    let graph = load();
    assert_eq!(
        report(&graph).element_space_map,
        report(&graph).element_space_map
    );
}

#[test]
fn maps_walls_to_room_names() {
    let graph = load();
    let report = report(&graph);
    let output = transform_map(&report.element_space_map, &graph, &TransformConfig::default());

    assert_eq!(output.mappings.len(), 2);
    assert_eq!(output.mappings[WALL_1], "Room A");
    assert_eq!(output.mappings[WALL_2], "Main Corridor");

    let counts = output.counts().unwrap();
    assert_eq!(counts.matched, 2);
    assert_eq!(counts.skipped, 1);
    assert_eq!(counts.total, 2);
    for value in output.mappings.values() {
        assert!(!value.is_empty() && value != "None");
    }
}

#[test]
fn maps_serialized_analysis_output() {
    let graph = load();
    let output = analyze(&graph, &AnalysisConfig::default());
    let value = serde_json::to_value(&output).unwrap();

    let config = TransformConfig {
        element_type: EntityKind::Door,
        ..TransformConfig::default()
    };
    let mapped = transform_value(value, Some(&graph), &config);

    assert_eq!(mapped.mappings.len(), 1);
    assert_eq!(mapped.mappings[DOOR], "Room A");
    assert_eq!(mapped.counts().unwrap().skipped, 2);
}

#[test]
fn plans_assignment_properties() {
    let graph = load();
    let report = report(&graph);
    let plan = plan_space_properties(&report.element_space_map, &graph);

    assert_eq!(plan.elements_updated, 3);
    assert_eq!(plan.elements_skipped, 0);
    assert_eq!(plan.summary.spaces_found, 2);
    assert_eq!(plan.summary.storeys_found, 1);
    assert_eq!(plan.elements_by_space["Room A"].len(), 2);
}

const STOREY_ONLY: &str = "ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCBUILDINGSTOREY('storey',$,'Ground',$,$,$,$,$,.ELEMENT.,0.);
#2=IFCWALLSTANDARDCASE('wall',$,'W',$,$,$,$,$);
#3=IFCRELCONTAINEDINSPATIALSTRUCTURE('rel',$,$,$,(#2),#1);
ENDSEC;
END-ISO-10303-21;
";

#[test]
fn model_without_spaces_has_zero_totals() {
    let graph = parse_ifc_str(STOREY_ONLY).unwrap();
    let report = report(&graph);

    assert!(report.spaces.is_empty());
    assert!(report.element_space_map.is_empty());
    assert!(report.unassigned_elements.is_empty());
    assert_eq!(report.contained_outside_spaces.len(), 1);
    assert_eq!(report.summary.statistics.total_area, 0.0);
    assert_eq!(report.summary.statistics.average_height, 0.0);

    let output = transform_map(&report.element_space_map, &graph, &TransformConfig::default());
    assert!(output.mappings.is_empty());
    assert_eq!(output.counts().unwrap().total, 0);
}

#[test]
fn inspection_points_at_storeys_when_spaces_are_missing() {
    let graph = parse_ifc_str(STOREY_ONLY).unwrap();
    let diagnostics = inspect(&graph).unwrap();

    assert_eq!(diagnostics.schema, "IFC2X3");
    assert_eq!(
        diagnostics.message,
        "No spaces found, but model has 1 building storeys"
    );
    let storeys = diagnostics.storey_analysis.unwrap();
    assert_eq!(storeys[0].name.as_deref(), Some("Ground"));
    assert_eq!(storeys[0].contained_elements, 1);
}

#[test]
fn inspection_of_office_model() {
    let diagnostics = inspect(&load()).unwrap();

    assert_eq!(diagnostics.schema, "IFC4");
    assert_eq!(diagnostics.message, "Found 2 spaces in the model");
    assert_eq!(diagnostics.spatial_elements["IfcSpace"].count, 2);
    assert_eq!(diagnostics.spatial_relationships["IfcRelAggregates"], 4);
    assert!(diagnostics.storey_analysis.is_none());
}

#[test]
fn unlisted_element_classes_are_assigned_to_their_space() {
    let content = "DATA;
#1=IFCBUILDINGSTOREY('storey',$,'L1',$,$,$,$,$,.ELEMENT.,0.);
#2=IFCSPACE('space',$,'Core',$,$,$,$,$,.ELEMENT.,.INTERNAL.,$);
#3=IFCTRANSPORTELEMENT('lift',$,$,$,$,$,$,$,$);
#4=IFCELEMENTASSEMBLY('truss',$,$,$,$,$,$,$,$,$);
#5=IFCRELAGGREGATES('agg',$,$,$,#1,(#2));
#6=IFCRELCONTAINEDINSPATIALSTRUCTURE('rel',$,$,$,(#3,#4),#2);
ENDSEC;";
    let graph = parse_ifc_str(content).unwrap();
    let report = report(&graph);

    assert_eq!(report.spaces[0].element_count, 2);
    let mapped: Vec<_> = report.element_space_map.keys().map(String::as_str).collect();
    assert_eq!(mapped, vec!["lift", "truss"]);
    assert_eq!(report.spaces[0].elements[0].name, "IfcTransportElement_lift");
    assert!(report.unassigned_elements.is_empty());
}

#[test]
fn plans_from_serialized_upstream_assignments() {
    let graph = load();
    let report = report(&graph);
    let upstream = serde_json::to_value(&report).unwrap();

    let map = assignment_map(&upstream).unwrap();
    assert_eq!(map, report.element_space_map);
    assert_eq!(
        plan_space_properties(&map, &graph),
        plan_space_properties(&report.element_space_map, &graph)
    );
}
