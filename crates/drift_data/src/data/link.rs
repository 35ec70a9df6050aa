use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

/// One neural link: a slice of a source model's internal stage copied into
/// a target model's input vector.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LinkDescriptor {
    /// Unique within a run.
    pub name: String,
    pub source_model: String,
    /// Internal stage of the source model to read from.
    #[serde(alias = "source_layer")]
    pub source_stage: usize,
    pub target_model: String,
    /// First index of the target input that receives the slice.
    pub target_offset: usize,
    /// Number of values transferred.
    #[serde(alias = "link_size")]
    pub width: usize,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl LinkDescriptor {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source_model: impl Into<String>,
        source_stage: usize,
        target_model: impl Into<String>,
        target_offset: usize,
        width: usize,
    ) -> Self {
        Self {
            name: name.into(),
            source_model: source_model.into(),
            source_stage,
            target_model: target_model.into(),
            target_offset,
            width,
            enabled: true,
            description: String::new(),
        }
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Half-open range of target input indices written by this link.
    #[must_use]
    pub fn target_range(&self) -> std::ops::Range<usize> {
        self.target_offset..self.target_offset + self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_range() {
        let link = LinkDescriptor::new("l", "a", 1, "b", 4, 16);
        assert_eq!(link.target_range(), 4..20);
    }

    #[test]
    fn test_accepts_legacy_field_names() {
        let json = r#"{
            "name": "classifier_to_navigator",
            "source_model": "classifier",
            "source_layer": 1,
            "target_model": "navigator",
            "target_offset": 4,
            "link_size": 16
        }"#;
        let link: LinkDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(link.source_stage, 1);
        assert_eq!(link.width, 16);
        assert!(link.enabled);
        assert!(link.description.is_empty());
    }
}
