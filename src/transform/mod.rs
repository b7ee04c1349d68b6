//! Re-projects an element→space assignment into a flat GlobalId→space-name
//! mapping for the property-writing stage.

pub mod normalize;

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::TransformConfig;
use crate::graph::GraphAccessor;
use crate::model::{ElementSpaceMap, EntityKind};

pub use normalize::{assignment_map, CanonicalAssignment};

pub const NOT_APPLICABLE: &str = "No room assignment data found";

/// Counters for one transform run.
///
/// `skipped` is the sum of `type_mismatch` and `invalid_value`; `total` is
/// the number of entries in the output mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingMetadata {
    pub element_type: String,
    pub matched: usize,
    pub skipped: usize,
    pub total: usize,
    pub type_mismatch: usize,
    pub invalid_value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TransformMetadata {
    Counts(MappingMetadata),
    NotApplicable { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformOutput {
    pub mappings: BTreeMap<String, String>,
    pub metadata: TransformMetadata,
    /// The untouched input when it held no assignment table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passthrough: Option<Value>,
}

impl TransformOutput {
    #[must_use]
    pub fn not_applicable(input: Value) -> Self {
        Self {
            mappings: BTreeMap::new(),
            metadata: TransformMetadata::NotApplicable {
                error: NOT_APPLICABLE.to_string(),
            },
            passthrough: Some(input),
        }
    }

    #[must_use]
    pub fn counts(&self) -> Option<&MappingMetadata> {
        match &self.metadata {
            TransformMetadata::Counts(counts) => Some(counts),
            TransformMetadata::NotApplicable { .. } => None,
        }
    }
}

/// Keeps entries whose element `is_a` the filter kind and whose space name
/// passes `is_valid`.
pub fn transform<F>(
    entries: &[CanonicalAssignment],
    filter: EntityKind,
    is_valid: F,
) -> (BTreeMap<String, String>, MappingMetadata)
where
    F: Fn(&str) -> bool,
{
    let mut mappings = BTreeMap::new();
    let mut metadata = MappingMetadata {
        element_type: filter.to_string(),
        ..MappingMetadata::default()
    };

    for entry in entries {
        if !entry.element_type.is_some_and(|kind| kind.is_a(filter)) {
            metadata.type_mismatch += 1;
            continue;
        }
        match entry.space_name.as_deref() {
            Some(name) if is_valid(name) => {
                if metadata.matched < 3 {
                    debug!(global_id = %entry.global_id, space = name, "Mapped element");
                }
                mappings.insert(entry.global_id.clone(), name.to_string());
                metadata.matched += 1;
            }
            _ => metadata.invalid_value += 1,
        }
    }

    metadata.skipped = metadata.type_mismatch + metadata.invalid_value;
    metadata.total = mappings.len();
    (mappings, metadata)
}

/// Transforms a typed map produced by this crate's analysis.
#[must_use]
pub fn transform_map(
    map: &ElementSpaceMap,
    graph: &dyn GraphAccessor,
    config: &TransformConfig,
) -> TransformOutput {
    let entries = normalize::from_map(map, Some(graph));
    finish(&entries, config)
}

/// Transforms an upstream record of either accepted shape, passing
/// unrecognized input through with a not-applicable marker.
#[must_use]
pub fn transform_value(
    input: Value,
    graph: Option<&dyn GraphAccessor>,
    config: &TransformConfig,
) -> TransformOutput {
    match normalize::from_value(&input, graph) {
        Some(entries) => finish(&entries, config),
        None => {
            warn!("Input is not room assignment data, passing through");
            TransformOutput::not_applicable(input)
        }
    }
}

fn finish(entries: &[CanonicalAssignment], config: &TransformConfig) -> TransformOutput {
    let (mappings, metadata) = transform(entries, config.element_type, |value| {
        config.is_valid_value(value)
    });
    info!(
        element_type = %config.element_type,
        entries = entries.len(),
        matched = metadata.matched,
        type_mismatch = metadata.type_mismatch,
        invalid_value = metadata.invalid_value,
        "Mapping transform complete"
    );
    TransformOutput {
        mappings,
        metadata: TransformMetadata::Counts(metadata),
        passthrough: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ModelGraph;
    use crate::model::{Entity, SpaceAssignment};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entry(gid: &str, kind: Option<EntityKind>, name: Option<&str>) -> CanonicalAssignment {
        CanonicalAssignment {
            global_id: gid.to_string(),
            element_type: kind,
            space_name: name.map(str::to_string),
        }
    }

    #[test]
    fn counts_walls_and_skips_others() {
        let entries = vec![
            entry("w1", Some(EntityKind::Wall), Some("Room A")),
            entry("w2", Some(EntityKind::WallStandardCase), Some("Room B")),
            entry("d1", Some(EntityKind::Door), Some("Room A")),
            entry("s1", Some(EntityKind::Slab), Some("Room B")),
            entry("x1", None, Some("Room C")),
        ];
        let config = TransformConfig::default();
        let (mappings, metadata) =
            transform(&entries, EntityKind::Wall, |v| config.is_valid_value(v));

        assert_eq!(metadata.matched, 2);
        assert_eq!(metadata.skipped, 3);
        assert_eq!(metadata.total, 2);
        assert_eq!(mappings["w1"], "Room A");
        assert_eq!(mappings["w2"], "Room B");
    }

    #[test]
    fn invalid_values_are_skipped_and_broken_out() {
        let entries = vec![
            entry("w1", Some(EntityKind::Wall), Some("None")),
            entry("w2", Some(EntityKind::Wall), Some("")),
            entry("w3", Some(EntityKind::Wall), None),
            entry("d1", Some(EntityKind::Door), Some("Hall")),
        ];
        let (mappings, metadata) = transform(&entries, EntityKind::Wall, |v| {
            TransformConfig::default().is_valid_value(v)
        });

        assert!(mappings.is_empty());
        assert_eq!(metadata.matched, 0);
        assert_eq!(metadata.invalid_value, 3);
        assert_eq!(metadata.type_mismatch, 1);
        assert_eq!(metadata.skipped, 4);
    }

    #[test]
    fn custom_predicate_and_filter() {
        let entries = vec![
            entry("d1", Some(EntityKind::Door), Some("tmp")),
            entry("d2", Some(EntityKind::Door), Some("Lobby")),
        ];
        let (mappings, metadata) =
            transform(&entries, EntityKind::Door, |v| !v.starts_with("tmp"));
        assert_eq!(metadata.element_type, "Door");
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings["d2"], "Lobby");
    }

    #[test]
    fn unrecognized_input_passes_through() {
        let input = json!({"spaces": [], "note": "not an assignment"});
        let output = transform_value(input.clone(), None, &TransformConfig::default());

        assert!(output.mappings.is_empty());
        assert_eq!(output.counts(), None);
        assert_eq!(output.passthrough, Some(input));

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["metadata"]["error"], NOT_APPLICABLE);
    }

    #[test]
    fn indirect_entry_with_numeric_space_id_is_mapped() {
        let input = json!({
            "elementSpaceMap": {
                "17": {"spaceId": 42, "spaceName": "Kitchen", "spaceType": null, "storey": null}
            },
            "model": {
                "elements": [
                    {"id": 17, "type": "IfcWall", "properties": {"GlobalId": "GUID-WALL"}}
                ]
            }
        });

        let output = transform_value(input, None, &TransformConfig::default());
        assert_eq!(
            output.mappings,
            BTreeMap::from([("GUID-WALL".to_string(), "Kitchen".to_string())])
        );
        let counts = output.counts().unwrap();
        assert_eq!(counts.matched, 1);
        assert_eq!(counts.invalid_value, 0);
    }

    #[test]
    fn transforms_typed_map_with_graph_types() {
        let graph = ModelGraph::builder()
            .entity(Entity::new(1, "W1", EntityKind::Wall))
            .entity(Entity::new(2, "D1", EntityKind::Door))
            .build();
        let mut map = ElementSpaceMap::new();
        for gid in ["W1", "D1"] {
            map.insert(
                gid.to_string(),
                SpaceAssignment {
                    space_id: "S1".into(),
                    space_name: Some("Room A".into()),
                    space_type: "Office".into(),
                    storey: Some("L1".into()),
                },
            );
        }

        let output = transform_map(&map, &graph, &TransformConfig::default());
        assert_eq!(output.mappings.len(), 1);
        assert_eq!(output.mappings["W1"], "Room A");

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["metadata"]["matched"], 1);
        assert_eq!(json["metadata"]["skipped"], 1);
        assert_eq!(json["metadata"]["typeMismatch"], 1);
        assert!(json.get("passthrough").is_none());
    }
}
