//! The model contract the coupling core consumes.
//!
//! The core never looks inside a model: it drives `forward`, reads one
//! internal stage, and issues single local updates. `DenseNetwork` is the
//! in-tree implementation used by the CLI and tests.

pub mod dense;

pub use dense::{Activation, DenseNetwork, DenseSpec, LayerSpec};

use crate::error::Result;

/// Shape of a model as seen by link validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelShape {
    pub input_width: usize,
    pub output_width: usize,
    pub stage_widths: Vec<usize>,
}

/// Executable model: forward pass, inspectable internal stages, and an
/// online local-update step.
pub trait NeuralModel {
    fn input_width(&self) -> usize;
    fn output_width(&self) -> usize;
    fn stage_count(&self) -> usize;
    fn stage_width(&self, index: usize) -> Option<usize>;

    /// Runs the model. Internal stages reflect this call afterwards.
    fn forward(&mut self, input: &[f32]) -> Result<Vec<f32>>;

    /// Activations of stage `index` from the most recent `forward`.
    fn internal_stage(&self, index: usize) -> Option<&[f32]>;

    /// One online step nudging the output toward one-hot `label`.
    fn local_update(
        &mut self,
        input: &[f32],
        label: usize,
        num_classes: usize,
        learning_rate: f32,
    ) -> Result<()>;

    fn shape(&self) -> ModelShape {
        ModelShape {
            input_width: self.input_width(),
            output_width: self.output_width(),
            stage_widths: (0..self.stage_count())
                .filter_map(|i| self.stage_width(i))
                .collect(),
        }
    }
}

impl<M: NeuralModel + ?Sized> NeuralModel for Box<M> {
    fn input_width(&self) -> usize {
        (**self).input_width()
    }

    fn output_width(&self) -> usize {
        (**self).output_width()
    }

    fn stage_count(&self) -> usize {
        (**self).stage_count()
    }

    fn stage_width(&self, index: usize) -> Option<usize> {
        (**self).stage_width(index)
    }

    fn forward(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        (**self).forward(input)
    }

    fn internal_stage(&self, index: usize) -> Option<&[f32]> {
        (**self).internal_stage(index)
    }

    fn local_update(
        &mut self,
        input: &[f32],
        label: usize,
        num_classes: usize,
        learning_rate: f32,
    ) -> Result<()> {
        (**self).local_update(input, label, num_classes, learning_rate)
    }
}

/// Index of the largest value; the first occurrence wins ties.
#[must_use]
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
