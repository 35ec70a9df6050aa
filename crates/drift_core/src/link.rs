//! Link set validation.
//!
//! Links are checked once, before any tick runs. An invalid set is a
//! configuration error; a disabled link is simply a zero injection.

use crate::error::{DriftError, Result};
use crate::model::ModelShape;
use drift_data::LinkDescriptor;
use std::collections::{HashMap, HashSet};

/// Model shapes keyed by model identifier.
pub type ModelCatalog = HashMap<String, ModelShape>;

/// A validated collection of links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkSet {
    links: Vec<LinkDescriptor>,
}

impl LinkSet {
    /// Validates `links` against the models they reference.
    pub fn new(links: Vec<LinkDescriptor>, catalog: &ModelCatalog) -> Result<Self> {
        let set = Self { links };
        set.validate(catalog)?;
        Ok(set)
    }

    #[must_use]
    /// A set with no links.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Re-checks the set against `catalog`.
    pub fn validate(&self, catalog: &ModelCatalog) -> Result<()> {
        let mut names = HashSet::new();
        for link in &self.links {
            if !names.insert(link.name.as_str()) {
                return Err(DriftError::configuration(format!(
                    "duplicate link name '{}'",
                    link.name
                )));
            }
            if link.width == 0 {
                return Err(DriftError::configuration(format!(
                    "link '{}' has zero width",
                    link.name
                )));
            }

            let source = catalog.get(&link.source_model).ok_or_else(|| {
                DriftError::configuration(format!(
                    "link '{}' reads from unknown model '{}'",
                    link.name, link.source_model
                ))
            })?;
            if link.source_stage >= source.stage_widths.len() {
                return Err(DriftError::configuration(format!(
                    "link '{}' reads stage {} but '{}' has {} stages",
                    link.name,
                    link.source_stage,
                    link.source_model,
                    source.stage_widths.len()
                )));
            }

            let target = catalog.get(&link.target_model).ok_or_else(|| {
                DriftError::configuration(format!(
                    "link '{}' writes to unknown model '{}'",
                    link.name, link.target_model
                ))
            })?;
            if link.target_range().end > target.input_width {
                return Err(DriftError::configuration(format!(
                    "link '{}' writes {}..{} past input width {} of '{}'",
                    link.name,
                    link.target_offset,
                    link.target_range().end,
                    target.input_width,
                    link.target_model
                )));
            }
        }

        for (i, a) in self.links.iter().enumerate() {
            for b in &self.links[i + 1..] {
                if a.target_model == b.target_model
                    && a.target_offset < b.target_range().end
                    && b.target_offset < a.target_range().end
                {
                    return Err(DriftError::configuration(format!(
                        "links '{}' and '{}' overlap in the input of '{}'",
                        a.name, b.name, a.target_model
                    )));
                }
            }
        }
        Ok(())
    }

    /// Links in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &LinkDescriptor> {
        self.links.iter()
    }

    /// Links writing into `target`.
    pub fn targeting<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a LinkDescriptor> {
        self.links.iter().filter(move |l| l.target_model == target)
    }

    /// Number of links, enabled or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true when no links are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Borrows the underlying links.
    #[must_use]
    pub fn as_slice(&self) -> &[LinkDescriptor] {
        &self.links
    }
}
