//! Pretraining phases run before the coupling benchmark: the terrain
//! classifier learns to tell terrains apart from sensors, the navigator
//! learns greedy pursuit on road only and never sees the link.

use crate::controller::{task_features, TASK_FEATURES};
use crate::error::{DriftError, Result};
use crate::model::{argmax, NeuralModel};
use crate::sensors::generate_sensors;
use crate::terrain::{optimal_action, TerrainPhysics, SENSOR_WIDTH};
use drift_data::{Action, SimulationState, TerrainType};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    pub classifier_ticks: u64,
    pub classifier_learning_rate: f32,
    pub navigator_ticks: u64,
    pub navigator_learning_rate: f32,
    /// Per-tick chance of moving the navigator's target during pretraining.
    pub retarget_chance: f32,
    /// Terrains the classifier is shown.
    pub terrains: Vec<TerrainType>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            classifier_ticks: 20_000,
            classifier_learning_rate: 0.02,
            navigator_ticks: 20_000,
            navigator_learning_rate: 0.02,
            retarget_chance: 0.1,
            terrains: TerrainType::ALL.to_vec(),
        }
    }
}

/// Accuracy over a pretraining phase.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    pub samples: u64,
    pub correct: u64,
}

impl TrainingReport {
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.correct as f64 / self.samples as f64
        }
    }
}

/// Trains `model` to map noisy sensors to the terrain index.
pub fn train_classifier<M: NeuralModel, R: Rng>(
    model: &mut M,
    config: &TrainingConfig,
    sensor_noise: f32,
    rng: &mut R,
) -> Result<TrainingReport> {
    if model.input_width() != SENSOR_WIDTH {
        return Err(DriftError::configuration(format!(
            "classifier expects {} inputs, sensors provide {}",
            model.input_width(),
            SENSOR_WIDTH
        )));
    }
    if let Some(t) = config
        .terrains
        .iter()
        .find(|t| t.index() >= model.output_width())
    {
        return Err(DriftError::configuration(format!(
            "classifier has {} outputs, cannot label {}",
            model.output_width(),
            t.name()
        )));
    }

    let classes = model.output_width();
    let mut report = TrainingReport {
        samples: 0,
        correct: 0,
    };
    for _ in 0..config.classifier_ticks {
        let Some(&terrain) = config.terrains.choose(rng) else {
            break;
        };
        let sensors = generate_sensors(terrain, sensor_noise, rng);
        let output = model.forward(&sensors)?;
        if argmax(&output) == terrain.index() {
            report.correct += 1;
        }
        report.samples += 1;
        model.local_update(&sensors, terrain.index(), classes, config.classifier_learning_rate)?;
    }

    tracing::info!(
        samples = report.samples,
        accuracy = report.accuracy(),
        "Classifier pretrained"
    );
    Ok(report)
}

/// Trains `model` on road terrain with the greedy action as label. Link
/// slots of the input stay zero.
pub fn train_navigator_road_only<M: NeuralModel, R: Rng>(
    model: &mut M,
    config: &TrainingConfig,
    physics: &TerrainPhysics,
    rng: &mut R,
) -> Result<TrainingReport> {
    if model.input_width() < TASK_FEATURES || model.output_width() != Action::COUNT {
        return Err(DriftError::configuration(format!(
            "navigator shape {}→{} does not fit {} features and {} actions",
            model.input_width(),
            model.output_width(),
            TASK_FEATURES,
            Action::COUNT
        )));
    }

    let mut state = SimulationState::new([0.5, 0.5], [rng.gen(), rng.gen()], TerrainType::Road);
    let mut input = vec![0.0; model.input_width()];
    let mut report = TrainingReport {
        samples: 0,
        correct: 0,
    };

    for _ in 0..config.navigator_ticks {
        input[..TASK_FEATURES].copy_from_slice(&task_features(&state));
        let output = model.forward(&input)?;
        let predicted = Action::from_index(argmax(&output)).unwrap_or(Action::Up);
        let optimal = optimal_action(&state);
        if predicted == optimal {
            report.correct += 1;
        }
        report.samples += 1;

        model.local_update(
            &input,
            optimal.index(),
            Action::COUNT,
            config.navigator_learning_rate,
        )?;

        physics.apply_action(&mut state, predicted);
        if rng.gen::<f32>() < config.retarget_chance {
            state.target = [rng.gen(), rng.gen()];
        }
    }

    tracing::info!(
        samples = report.samples,
        accuracy = report.accuracy(),
        "Navigator pretrained on road"
    );
    Ok(report)
}
