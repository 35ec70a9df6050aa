//! Drift config document: named model definitions plus the links between
//! them, stored as one JSON file.
//!
//! Model entries stay raw JSON so any model type can be stored; the
//! engine only interprets them when a model is built.

use crate::error::{IoError, Result};
use crate::serialization::{from_json, read_json_file, to_json_pretty, write_json_file};
use drift_core::link::{LinkSet, ModelCatalog};
use drift_core::model::DenseSpec;
use drift_data::LinkDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DriftConfig {
    pub name: String,
    pub models: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub links: Vec<LinkDescriptor>,
}

impl DriftConfig {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Stores `model` under `name`, replacing any previous entry.
    pub fn add_model<T: Serialize>(&mut self, name: impl Into<String>, model: &T) -> Result<()> {
        let value = serde_json::to_value(model)?;
        self.models.insert(name.into(), value);
        Ok(())
    }

    /// Decodes the model stored under `name`.
    pub fn get_model<T>(&self, name: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self
            .models
            .get(name)
            .ok_or_else(|| IoError::not_found(format!("model '{}'", name)))?;
        T::deserialize(value)
            .map_err(|e| IoError::serialization(format!("model '{}': {}", name, e)))
    }

    pub fn model_spec(&self, name: &str) -> Result<DenseSpec> {
        self.get_model(name)
    }

    pub fn add_link(&mut self, link: LinkDescriptor) {
        self.links.push(link);
    }

    #[must_use]
    pub fn links(&self) -> &[LinkDescriptor] {
        &self.links
    }

    /// Shapes of the stored models that some link references, read as
    /// dense specs. Unreferenced entries are never decoded.
    pub fn catalog(&self) -> Result<ModelCatalog> {
        let referenced: BTreeSet<&str> = self
            .links
            .iter()
            .flat_map(|l| [l.source_model.as_str(), l.target_model.as_str()])
            .filter(|name| self.models.contains_key(*name))
            .collect();
        let mut catalog = ModelCatalog::new();
        for name in referenced {
            let shape = self
                .model_spec(name)?
                .shape()
                .map_err(|e| IoError::from(e).with_context(format!("model '{}'", name)))?;
            catalog.insert(name.to_string(), shape);
        }
        Ok(catalog)
    }

    /// Checks every link against the models it references.
    pub fn validate(&self) -> Result<LinkSet> {
        let catalog = self.catalog()?;
        Ok(LinkSet::new(self.links.clone(), &catalog)?)
    }

    pub fn to_json(&self) -> Result<String> {
        to_json_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        from_json(json)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json_file(self, &path)?;
        tracing::info!(path = ?path.as_ref(), models = self.models.len(), "Drift config saved");
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_json_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::model::{Activation, LayerSpec};

    fn pair() -> DriftConfig {
        let mut config = DriftConfig::new("pair");
        config
            .add_model(
                "classifier",
                &DenseSpec::new(vec![
                    LayerSpec::new(8, 32, Activation::LeakyRelu),
                    LayerSpec::new(32, 16, Activation::LeakyRelu),
                    LayerSpec::new(16, 4, Activation::Sigmoid),
                ]),
            )
            .unwrap();
        config
            .add_model(
                "navigator",
                &DenseSpec::new(vec![
                    LayerSpec::new(20, 16, Activation::LeakyRelu),
                    LayerSpec::new(16, 4, Activation::Sigmoid),
                ]),
            )
            .unwrap();
        config.add_link(LinkDescriptor::new(
            "classifier_to_navigator",
            "classifier",
            1,
            "navigator",
            4,
            16,
        ));
        config
    }

    #[test]
    fn test_get_model() {
        let config = pair();
        let spec = config.model_spec("navigator").unwrap();
        assert_eq!(spec.layers[0].input_size, 20);
        assert!(matches!(config.model_spec("missing"), Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_get_model_wrong_type() {
        let mut config = DriftConfig::new("bad");
        config.add_model("x", &"not a network").unwrap();
        assert!(matches!(config.model_spec("x"), Err(IoError::Serialization(_))));
    }

    #[test]
    fn test_validate_builds_link_set() {
        let links = pair().validate().unwrap();
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_validate_rejects_link_past_input() {
        let mut config = pair();
        config.links[0].target_offset = 8;
        assert!(matches!(config.validate(), Err(IoError::Engine(_))));
    }

    #[test]
    fn test_validate_ignores_unlinked_model_entries() {
        let mut config = pair();
        config
            .add_model("training", &serde_json::json!({"epochs": 40, "lr": 0.01}))
            .unwrap();
        assert_eq!(config.validate().unwrap().len(), 1);
        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.contains_key("training"));
    }

    #[test]
    fn test_validate_rejects_unknown_link_model() {
        let mut config = pair();
        config.links[0].source_model = "ghost".into();
        assert!(matches!(config.validate(), Err(IoError::Engine(_))));
    }

    #[test]
    fn test_json_keeps_models_and_links() {
        let config = pair();
        let restored = DriftConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_links_default_to_empty() {
        let config = DriftConfig::from_json(r#"{"name": "n", "models": {}}"#).unwrap();
        assert!(config.links().is_empty());
        assert!(config.validate().unwrap().is_empty());
    }
}
