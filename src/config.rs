//! Tunables for analysis and mapping runs.

use crate::model::EntityKind;

/// Keywords that mark a space as circulation when found in its name or type.
pub const DEFAULT_CIRCULATION_KEYWORDS: &[&str] = &[
    "corridor",
    "hallway",
    "lobby",
    "stair",
    "elevator",
    "circulation",
];

/// Space-name value the property stage treats as missing.
pub const DEFAULT_PLACEHOLDER: &str = "None";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub circulation_keywords: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            circulation_keywords: DEFAULT_CIRCULATION_KEYWORDS
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
        }
    }
}

impl AnalysisConfig {
    /// Replaces the keyword set; an empty list keeps the defaults.
    #[must_use]
    pub fn with_circulation_keywords(mut self, keywords: Vec<String>) -> Self {
        if !keywords.is_empty() {
            self.circulation_keywords = keywords;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformConfig {
    /// Only elements whose kind `is_a` this kind are mapped.
    pub element_type: EntityKind,
    pub placeholder: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            element_type: EntityKind::Wall,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl TransformConfig {
    #[must_use]
    pub fn is_valid_value(&self, value: &str) -> bool {
        !value.is_empty() && value != self.placeholder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_keyword_override_keeps_defaults() {
        let config = AnalysisConfig::default().with_circulation_keywords(Vec::new());
        assert_eq!(config.circulation_keywords.len(), 6);

        let config = AnalysisConfig::default().with_circulation_keywords(vec!["atrium".into()]);
        assert_eq!(config.circulation_keywords, vec!["atrium".to_string()]);
    }

    #[test]
    fn validity_rejects_empty_and_placeholder() {
        let config = TransformConfig::default();
        assert!(config.is_valid_value("Room A"));
        assert!(!config.is_valid_value(""));
        assert!(!config.is_valid_value("None"));
    }
}
