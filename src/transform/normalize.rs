use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::graph::GraphAccessor;
use crate::model::{ElementSpaceMap, EntityKind, SpaceAssignment};

/// Top-level keys under which upstream stages publish the assignment table.
pub const MAP_KEYS: &[&str] = &["elementSpaceMap", "element_space_map"];

const SPACE_NAME_KEYS: &[&str] = &["spaceName", "space_name"];

/// One assignment entry keyed by GlobalId, with its element type resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalAssignment {
    pub global_id: String,
    /// `None` when neither the lookup table nor the graph knows the element.
    pub element_type: Option<EntityKind>,
    pub space_name: Option<String>,
}

/// Normalizes a typed map, resolving element types through the graph.
#[must_use]
pub fn from_map(
    map: &ElementSpaceMap,
    graph: Option<&dyn GraphAccessor>,
) -> Vec<CanonicalAssignment> {
    map.iter()
        .map(|(global_id, assignment)| CanonicalAssignment {
            global_id: global_id.clone(),
            element_type: resolve_by_global_id(graph, global_id),
            space_name: assignment.space_name.clone(),
        })
        .collect()
}

/// Normalizes an untyped upstream record.
///
/// Accepts the direct shape, keyed by GlobalId, and the indirect shape where
/// keys are internal ids listed in `model.elements[] = {id, type,
/// properties.GlobalId}`. Keys missing from that table are treated as
/// GlobalIds. Returns `None` when the input holds no assignment table.
#[must_use]
pub fn from_value(
    input: &Value,
    graph: Option<&dyn GraphAccessor>,
) -> Option<Vec<CanonicalAssignment>> {
    let map = assignment_table(input)?;
    let lookup = ElementLookup::from_model(input.get("model"));

    let entries = map
        .iter()
        .map(|(key, value)| {
            let space_name = read_space_name(value);
            match lookup.as_ref().and_then(|l| l.get(key)) {
                Some((global_id, element_type)) => CanonicalAssignment {
                    global_id: global_id.clone(),
                    element_type: *element_type,
                    space_name,
                },
                None => CanonicalAssignment {
                    global_id: key.clone(),
                    element_type: resolve_by_global_id(graph, key),
                    space_name,
                },
            }
        })
        .collect();
    Some(entries)
}

/// Reads an upstream assignment table into the typed map, keyed by GlobalId.
///
/// Indirect keys are translated through `model.elements` like in
/// [`from_value`]. Each field is read on its own, so one field of an
/// unexpected JSON type only blanks that field. Returns `None` when the
/// input holds no assignment table.
#[must_use]
pub fn assignment_map(input: &Value) -> Option<ElementSpaceMap> {
    let map = assignment_table(input)?;
    let lookup = ElementLookup::from_model(input.get("model"));

    let assignments = map
        .iter()
        .map(|(key, value)| {
            let global_id = lookup
                .as_ref()
                .and_then(|l| l.get(key))
                .map_or_else(|| key.clone(), |(global_id, _)| global_id.clone());
            let assignment = SpaceAssignment {
                space_id: read_id(value, &["spaceId", "space_id"]).unwrap_or_default(),
                space_name: read_space_name(value),
                space_type: read_str(value, &["spaceType", "space_type"]).unwrap_or_default(),
                storey: read_str(value, &["storey"]).filter(|s| !s.is_empty()),
            };
            (global_id, assignment)
        })
        .collect();
    Some(assignments)
}

fn assignment_table(input: &Value) -> Option<&Map<String, Value>> {
    MAP_KEYS
        .iter()
        .find_map(|key| input.get(*key))?
        .as_object()
}

fn resolve_by_global_id(
    graph: Option<&dyn GraphAccessor>,
    global_id: &str,
) -> Option<EntityKind> {
    let kind = graph
        .and_then(|g| g.by_global_id(global_id))
        .map(|entity| entity.kind);
    if kind.is_none() {
        debug!(global_id, "Element type unresolved");
    }
    kind
}

/// Space name under either key spelling; sibling fields are not inspected.
fn read_space_name(value: &Value) -> Option<String> {
    read_str(value, SPACE_NAME_KEYS)
}

fn read_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(*key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Like [`read_str`], but numeric ids are accepted too.
fn read_id(value: &Value, keys: &[&str]) -> Option<String> {
    match keys.iter().find_map(|key| value.get(*key))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Internal id → (GlobalId, element type).
struct ElementLookup(HashMap<String, (String, Option<EntityKind>)>);

impl ElementLookup {
    fn from_model(model: Option<&Value>) -> Option<Self> {
        let elements = model?.get("elements")?.as_array()?;
        let mut table = HashMap::new();
        for element in elements {
            let id = match element.get("id") {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => continue,
            };
            let global_id = match element
                .get("properties")
                .and_then(|p| p.get("GlobalId"))
                .and_then(Value::as_str)
            {
                Some(gid) if !gid.is_empty() => gid.to_string(),
                _ => continue,
            };
            let element_type = element
                .get("type")
                .and_then(Value::as_str)
                .and_then(|t| t.parse().ok());
            table.insert(id, (global_id, element_type));
        }
        Some(Self(table))
    }

    fn get(&self, id: &str) -> Option<&(String, Option<EntityKind>)> {
        self.0.get(id)
    }
}
