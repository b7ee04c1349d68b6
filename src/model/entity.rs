use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Internal entity handle (the STEP instance number for loaded files).
pub type EntityId = u64;

/// Closed vocabulary of entity types the analysis distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    // Spatial elements
    Site,
    Building,
    BuildingStorey,
    Space,
    Zone,
    // Abstract supertype of every physical element, only meaningful as a filter
    Element,
    // Physical elements
    Wall,
    WallStandardCase,
    CurtainWall,
    Door,
    Window,
    Slab,
    Roof,
    Column,
    Beam,
    Stair,
    StairFlight,
    Ramp,
    Railing,
    Covering,
    Plate,
    Member,
    Footing,
    Pile,
    FurnishingElement,
    FlowTerminal,
    SanitaryTerminal,
    DistributionElement,
    BuildingElementProxy,
}

const ALL_KINDS: &[EntityKind] = &[
    EntityKind::Site,
    EntityKind::Building,
    EntityKind::BuildingStorey,
    EntityKind::Space,
    EntityKind::Zone,
    EntityKind::Element,
    EntityKind::Wall,
    EntityKind::WallStandardCase,
    EntityKind::CurtainWall,
    EntityKind::Door,
    EntityKind::Window,
    EntityKind::Slab,
    EntityKind::Roof,
    EntityKind::Column,
    EntityKind::Beam,
    EntityKind::Stair,
    EntityKind::StairFlight,
    EntityKind::Ramp,
    EntityKind::Railing,
    EntityKind::Covering,
    EntityKind::Plate,
    EntityKind::Member,
    EntityKind::Footing,
    EntityKind::Pile,
    EntityKind::FurnishingElement,
    EntityKind::FlowTerminal,
    EntityKind::SanitaryTerminal,
    EntityKind::DistributionElement,
    EntityKind::BuildingElementProxy,
];

impl EntityKind {
    /// Short name without the `Ifc` prefix, e.g. `"Wall"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Site => "Site",
            EntityKind::Building => "Building",
            EntityKind::BuildingStorey => "BuildingStorey",
            EntityKind::Space => "Space",
            EntityKind::Zone => "Zone",
            EntityKind::Element => "Element",
            EntityKind::Wall => "Wall",
            EntityKind::WallStandardCase => "WallStandardCase",
            EntityKind::CurtainWall => "CurtainWall",
            EntityKind::Door => "Door",
            EntityKind::Window => "Window",
            EntityKind::Slab => "Slab",
            EntityKind::Roof => "Roof",
            EntityKind::Column => "Column",
            EntityKind::Beam => "Beam",
            EntityKind::Stair => "Stair",
            EntityKind::StairFlight => "StairFlight",
            EntityKind::Ramp => "Ramp",
            EntityKind::Railing => "Railing",
            EntityKind::Covering => "Covering",
            EntityKind::Plate => "Plate",
            EntityKind::Member => "Member",
            EntityKind::Footing => "Footing",
            EntityKind::Pile => "Pile",
            EntityKind::FurnishingElement => "FurnishingElement",
            EntityKind::FlowTerminal => "FlowTerminal",
            EntityKind::SanitaryTerminal => "SanitaryTerminal",
            EntityKind::DistributionElement => "DistributionElement",
            EntityKind::BuildingElementProxy => "BuildingElementProxy",
        }
    }

    /// Full IFC class name, e.g. `"IfcWall"`.
    #[must_use]
    pub fn ifc_class(self) -> String {
        format!("Ifc{}", self.as_str())
    }

    /// Site, Building, Storey and Space can contain physical elements.
    #[must_use]
    pub fn is_spatial_structure(self) -> bool {
        matches!(
            self,
            EntityKind::Site | EntityKind::Building | EntityKind::BuildingStorey | EntityKind::Space
        )
    }

    #[must_use]
    pub fn is_spatial(self) -> bool {
        self.is_spatial_structure() || self == EntityKind::Zone
    }

    /// True for concrete physical element kinds.
    #[must_use]
    pub fn is_element(self) -> bool {
        !self.is_spatial() && self != EntityKind::Element
    }

    /// Subtype test: `WallStandardCase` is a `Wall`, every physical kind is an `Element`.
    #[must_use]
    pub fn is_a(self, other: EntityKind) -> bool {
        if self == other {
            return true;
        }
        match other {
            EntityKind::Element => self.is_element(),
            EntityKind::Wall => self == EntityKind::WallStandardCase,
            EntityKind::Stair => self == EntityKind::StairFlight,
            EntityKind::FlowTerminal => self == EntityKind::SanitaryTerminal,
            _ => false,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntityKind(pub String);

impl fmt::Display for UnknownEntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity type '{}'", self.0)
    }
}

impl std::error::Error for UnknownEntityKind {}

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    /// Accepts `Wall`, `IfcWall` and `IFCWALL`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let bare = lower.strip_prefix("ifc").unwrap_or(&lower);
        ALL_KINDS
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(bare))
            .ok_or_else(|| UnknownEntityKind(s.to_string()))
    }
}

/// A materialized entity snapshot. Optional attributes stay `None` when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub id: EntityId,
    pub global_id: String,
    pub kind: EntityKind,
    /// IFC class as read from the file, e.g. `IfcDuctSegment` for a `DistributionElement`.
    pub class_name: String,
    pub name: Option<String>,
    pub object_type: Option<String>,
    pub description: Option<String>,
}

impl Entity {
    #[must_use]
    pub fn new(id: EntityId, global_id: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id,
            global_id: global_id.into(),
            kind,
            class_name: kind.ifc_class(),
            name: None,
            object_type: None,
            description: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// First eight characters of the GlobalId.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.global_id.chars().take(8).collect()
    }

    /// Name, or `<prefix>_<short id>` when the entity is unnamed.
    #[must_use]
    pub fn name_or(&self, prefix: &str) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{prefix}_{}", self.short_id()),
        }
    }
}

/// A single property or quantity value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl PropertyValue {
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Real(f) => Some(*f),
            PropertyValue::Integer(i) => Some(*i as f64),
            PropertyValue::Text(s) => s.trim().parse().ok(),
            PropertyValue::Boolean(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            PropertyValue::Text(s) => s.clone(),
            PropertyValue::Real(f) => f.to_string(),
            PropertyValue::Integer(i) => i.to_string(),
            PropertyValue::Boolean(b) => b.to_string(),
        }
    }
}

pub type PropertySet = BTreeMap<String, PropertyValue>;

/// Property set name → property name → value.
pub type PropertySets = BTreeMap<String, PropertySet>;
