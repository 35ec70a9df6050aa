use super::{ModelShape, NeuralModel};
use crate::error::{DriftError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    LeakyRelu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::LeakyRelu => {
                if x > 0.0 {
                    x
                } else {
                    0.01 * x
                }
            }
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }

    /// Derivative expressed through the pre-activation and its output.
    fn derivative(self, pre: f32, out: f32) -> f32 {
        match self {
            Activation::Linear => 1.0,
            Activation::Relu => {
                if pre > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyRelu => {
                if pre > 0.0 {
                    1.0
                } else {
                    0.01
                }
            }
            Activation::Sigmoid => out * (1.0 - out),
            Activation::Tanh => 1.0 - out * out,
        }
    }
}

/// Declarative description of one dense stage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LayerSpec {
    /// Layer kind; only `dense` is built. Absent means dense.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub input_size: usize,
    pub output_size: usize,
    #[serde(default)]
    pub activation: Activation,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl LayerSpec {
    #[must_use]
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        Self {
            kind: None,
            input_size,
            output_size,
            activation,
            comment: String::new(),
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Stacked dense stages, stored in drift config documents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DenseSpec {
    pub layers: Vec<LayerSpec>,
}

impl DenseSpec {
    #[must_use]
    pub fn new(layers: Vec<LayerSpec>) -> Self {
        Self { layers }
    }

    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(DriftError::configuration("model has no layers"));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if let Some(kind) = layer.kind.as_deref().filter(|k| *k != "dense") {
                return Err(DriftError::configuration(format!(
                    "layer {i} has unsupported type '{kind}'"
                )));
            }
            if layer.input_size == 0 || layer.output_size == 0 {
                return Err(DriftError::configuration(format!(
                    "layer {i} has a zero-sized dimension"
                )));
            }
        }
        for (i, pair) in self.layers.windows(2).enumerate() {
            if pair[0].output_size != pair[1].input_size {
                return Err(DriftError::configuration(format!(
                    "layer {} outputs {} values but layer {} expects {}",
                    i,
                    pair[0].output_size,
                    i + 1,
                    pair[1].input_size
                )));
            }
        }
        Ok(())
    }

    /// Shape the built network will have, without allocating weights.
    pub fn shape(&self) -> Result<ModelShape> {
        self.validate()?;
        Ok(ModelShape {
            input_width: self.layers[0].input_size,
            output_width: self.layers[self.layers.len() - 1].output_size,
            stage_widths: self.layers.iter().map(|l| l.output_size).collect(),
        })
    }
}

#[derive(Debug, Clone)]
struct DenseLayer {
    input_size: usize,
    output_size: usize,
    activation: Activation,
    /// Row-major, `output_size × input_size`.
    weights: Vec<f32>,
    bias: Vec<f32>,
}

impl DenseLayer {
    fn new_random<R: Rng>(spec: &LayerSpec, rng: &mut R) -> Self {
        let limit = (6.0 / (spec.input_size + spec.output_size) as f32).sqrt();
        let weights = (0..spec.input_size * spec.output_size)
            .map(|_| rng.gen_range(-limit..limit))
            .collect();
        Self {
            input_size: spec.input_size,
            output_size: spec.output_size,
            activation: spec.activation,
            weights,
            bias: vec![0.0; spec.output_size],
        }
    }

    fn forward_into(&self, input: &[f32], pre: &mut Vec<f32>, out: &mut Vec<f32>) {
        pre.clear();
        out.clear();
        for o in 0..self.output_size {
            let row = &self.weights[o * self.input_size..(o + 1) * self.input_size];
            let z = row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + self.bias[o];
            pre.push(z);
            out.push(self.activation.apply(z));
        }
    }
}

/// Minimal feed-forward network implementing [`NeuralModel`].
///
/// Each layer is one internal stage. `local_update` is a delta-rule step on
/// the output stage only.
#[derive(Debug, Clone)]
pub struct DenseNetwork {
    layers: Vec<DenseLayer>,
    pre_activations: Vec<Vec<f32>>,
    stages: Vec<Vec<f32>>,
    has_run: bool,
}

impl DenseNetwork {
    pub fn from_spec<R: Rng>(spec: &DenseSpec, rng: &mut R) -> Result<Self> {
        spec.validate()?;
        let layers: Vec<DenseLayer> = spec
            .layers
            .iter()
            .map(|l| DenseLayer::new_random(l, rng))
            .collect();
        let stages = layers
            .iter()
            .map(|l| Vec::with_capacity(l.output_size))
            .collect::<Vec<_>>();
        Ok(Self {
            pre_activations: stages.clone(),
            stages,
            layers,
            has_run: false,
        })
    }

    fn check_input(&self, input: &[f32]) -> Result<()> {
        if input.len() != self.input_width() {
            return Err(DriftError::execution(format!(
                "expected {} inputs, got {}",
                self.input_width(),
                input.len()
            )));
        }
        Ok(())
    }

    fn run(&mut self, input: &[f32]) {
        for i in 0..self.layers.len() {
            let (before, rest) = self.stages.split_at_mut(i);
            let layer_input: &[f32] = if i == 0 { input } else { &before[i - 1] };
            self.layers[i].forward_into(layer_input, &mut self.pre_activations[i], &mut rest[0]);
        }
        self.has_run = true;
    }
}

impl NeuralModel for DenseNetwork {
    fn input_width(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_size)
    }

    fn output_width(&self) -> usize {
        self.layers.last().map_or(0, |l| l.output_size)
    }

    fn stage_count(&self) -> usize {
        self.layers.len()
    }

    fn stage_width(&self, index: usize) -> Option<usize> {
        self.layers.get(index).map(|l| l.output_size)
    }

    fn forward(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        self.check_input(input)?;
        self.run(input);
        Ok(self.stages.last().cloned().unwrap_or_default())
    }

    fn internal_stage(&self, index: usize) -> Option<&[f32]> {
        if !self.has_run {
            return None;
        }
        self.stages.get(index).map(Vec::as_slice)
    }

    fn local_update(
        &mut self,
        input: &[f32],
        label: usize,
        num_classes: usize,
        learning_rate: f32,
    ) -> Result<()> {
        self.check_input(input)?;
        if num_classes > self.output_width() || label >= num_classes {
            return Err(DriftError::execution(format!(
                "label {label} of {num_classes} classes does not fit {} outputs",
                self.output_width()
            )));
        }
        self.run(input);

        let last = self.layers.len() - 1;
        let layer_input: Vec<f32> = if last == 0 {
            input.to_vec()
        } else {
            self.stages[last - 1].clone()
        };
        let layer = &mut self.layers[last];
        for o in 0..num_classes {
            let out = self.stages[last][o];
            let target = if o == label { 1.0 } else { 0.0 };
            let delta = (target - out) * layer.activation.derivative(self.pre_activations[last][o], out);
            let row = &mut layer.weights[o * layer.input_size..(o + 1) * layer.input_size];
            for (w, x) in row.iter_mut().zip(&layer_input) {
                *w += learning_rate * delta * x;
            }
            layer.bias[o] += learning_rate * delta;
        }
        Ok(())
    }
}
