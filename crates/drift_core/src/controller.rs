//! Reward-shaped local adaptation controller.
//!
//! One tick: sense → relay → forward → act → (optionally) adapt. The only
//! persistent state is the `SimulationState` passed in by the caller.

use crate::error::{DriftError, Result};
use crate::link::{LinkSet, ModelCatalog};
use crate::model::{argmax, NeuralModel};
use crate::relay::{inject, relay};
use crate::sensors::generate_sensors;
use crate::terrain::{TerrainPhysics, SENSOR_WIDTH};
use drift_data::{Action, Capabilities, LinkDescriptor, SimulationState, TerrainType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Leading task features of the composite input: direction to target
/// (unit vector) and agent position.
pub const TASK_FEATURES: usize = 4;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ControllerSettings {
    pub learning_rate: f32,
    /// Minimum distance gain for a tick to count as a success.
    pub success_epsilon: f32,
    /// Distance under which the target counts as reached.
    pub target_threshold: f32,
    /// Total spread of uniform sensor noise.
    pub sensor_noise: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            success_epsilon: 0.001,
            target_threshold: 0.1,
            sensor_noise: 0.15,
        }
    }
}

/// Picks the supervised label used when the taken action failed.
pub trait CorrectionPolicy {
    fn correct(&self, state: &SimulationState) -> Action;
}

impl<F> CorrectionPolicy for F
where
    F: Fn(&SimulationState) -> Action,
{
    fn correct(&self, state: &SimulationState) -> Action {
        self(state)
    }
}

/// Switch movement axis: after a vertical move propose the horizontal
/// direction toward the target, otherwise the vertical one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisAlternation;

impl CorrectionPolicy for AxisAlternation {
    fn correct(&self, state: &SimulationState) -> Action {
        let [dx, dy] = state.delta_to_target();
        match state.last_action {
            Some(a) if a.is_vertical() => {
                if dx > 0.0 {
                    Action::Right
                } else {
                    Action::Left
                }
            }
            _ => {
                if dy > 0.0 {
                    Action::Up
                } else {
                    Action::Down
                }
            }
        }
    }
}

/// A model together with the identifier links refer to it by.
#[derive(Debug, Clone)]
pub struct NamedModel<M> {
    pub id: String,
    pub model: M,
}

impl<M> NamedModel<M> {
    pub fn new(id: impl Into<String>, model: M) -> Self {
        Self {
            id: id.into(),
            model,
        }
    }
}

/// Everything besides the models that a controller needs.
#[derive(Debug, Clone, Default)]
pub struct ControllerSetup {
    pub links: Vec<LinkDescriptor>,
    pub capabilities: Capabilities,
    pub physics: TerrainPhysics,
    pub settings: ControllerSettings,
    pub seed: u64,
}

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub action: Action,
    /// Label passed to the local update, if adaptation ran.
    pub label: Option<Action>,
    pub distance_before: f32,
    pub distance_after: f32,
    /// Distance strictly decreased.
    pub effective: bool,
    pub reached_target: bool,
    pub terrain: TerrainType,
}

pub struct Controller<S, T, P = AxisAlternation> {
    source: NamedModel<S>,
    target: NamedModel<T>,
    links: LinkSet,
    capabilities: Capabilities,
    physics: TerrainPhysics,
    settings: ControllerSettings,
    policy: P,
    rng: ChaCha8Rng,
}

impl<S: NeuralModel, T: NeuralModel> Controller<S, T, AxisAlternation> {
    pub fn new(source: NamedModel<S>, target: NamedModel<T>, setup: ControllerSetup) -> Result<Self> {
        Self::with_policy(source, target, setup, AxisAlternation)
    }
}

impl<S: NeuralModel, T: NeuralModel, P: CorrectionPolicy> Controller<S, T, P> {
    /// Validates the whole coupling before any tick can run.
    pub fn with_policy(
        source: NamedModel<S>,
        target: NamedModel<T>,
        setup: ControllerSetup,
        policy: P,
    ) -> Result<Self> {
        if source.id == target.id {
            return Err(DriftError::configuration(format!(
                "source and target share the id '{}'",
                source.id
            )));
        }
        for link in &setup.links {
            if link.source_model != source.id || link.target_model != target.id {
                return Err(DriftError::configuration(format!(
                    "link '{}' connects '{}' to '{}', expected '{}' to '{}'",
                    link.name, link.source_model, link.target_model, source.id, target.id
                )));
            }
            if link.target_offset < TASK_FEATURES {
                return Err(DriftError::configuration(format!(
                    "link '{}' overlaps the {} task features",
                    link.name, TASK_FEATURES
                )));
            }
        }

        let mut catalog = ModelCatalog::new();
        catalog.insert(source.id.clone(), source.model.shape());
        catalog.insert(target.id.clone(), target.model.shape());
        let links = LinkSet::new(setup.links, &catalog)?;

        if target.model.output_width() != Action::COUNT {
            return Err(DriftError::configuration(format!(
                "target '{}' has {} outputs, expected {}",
                target.id,
                target.model.output_width(),
                Action::COUNT
            )));
        }
        if target.model.input_width() < TASK_FEATURES {
            return Err(DriftError::configuration(format!(
                "target '{}' input width {} cannot hold {} task features",
                target.id,
                target.model.input_width(),
                TASK_FEATURES
            )));
        }
        if !links.is_empty() && source.model.input_width() != SENSOR_WIDTH {
            return Err(DriftError::configuration(format!(
                "source '{}' expects {} inputs, sensors provide {}",
                source.id,
                source.model.input_width(),
                SENSOR_WIDTH
            )));
        }

        Ok(Self {
            source,
            target,
            links,
            capabilities: setup.capabilities,
            physics: setup.physics,
            settings: setup.settings,
            policy,
            rng: ChaCha8Rng::seed_from_u64(setup.seed),
        })
    }

    /// Builds the composite target input for the current state.
    fn composite_input(&mut self, state: &SimulationState) -> Result<Vec<f32>> {
        let mut input = vec![0.0; self.target.model.input_width()];
        input[..TASK_FEATURES].copy_from_slice(&task_features(state));

        if self.capabilities.coupling && !self.links.is_empty() {
            let sensors = generate_sensors(state.terrain, self.settings.sensor_noise, &mut self.rng);
            for link in self.links.iter() {
                let buffer = relay(link, &mut self.source.model, &sensors)?;
                inject(link, &buffer, &mut input)?;
            }
        }
        Ok(input)
    }

    pub fn tick(&mut self, state: &mut SimulationState) -> Result<TickOutcome> {
        let input = self.composite_input(state)?;
        let output = self.target.model.forward(&input)?;
        if output.len() != Action::COUNT {
            return Err(DriftError::execution(format!(
                "target '{}' produced {} outputs",
                self.target.id,
                output.len()
            )));
        }
        let action = Action::from_index(argmax(&output))
            .ok_or_else(|| DriftError::execution("argmax outside the action range"))?;

        let terrain = state.terrain;
        let distance_before = state.distance_to_target();
        self.physics.apply_action(state, action);
        let distance_after = state.distance_to_target();

        let label = if self.capabilities.adaptation {
            let label = if distance_after < distance_before - self.settings.success_epsilon {
                action
            } else {
                self.policy.correct(state)
            };
            self.target.model.local_update(
                &input,
                label.index(),
                Action::COUNT,
                self.settings.learning_rate,
            )?;
            Some(label)
        } else {
            None
        };

        let reached_target = distance_after < self.settings.target_threshold;
        if reached_target {
            self.respawn(state);
        }

        Ok(TickOutcome {
            action,
            label,
            distance_before,
            distance_after,
            effective: distance_after < distance_before,
            reached_target,
            terrain,
        })
    }

    /// Agent back near the origin, target near the far corner.
    fn respawn(&mut self, state: &mut SimulationState) {
        state.agent = [self.rng.gen::<f32>() * 0.3, self.rng.gen::<f32>() * 0.3];
        state.target = [
            0.7 + self.rng.gen::<f32>() * 0.3,
            0.7 + self.rng.gen::<f32>() * 0.3,
        ];
        state.clear_motion();
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    #[must_use]
    pub fn links(&self) -> &LinkSet {
        &self.links
    }

    #[must_use]
    pub fn target(&self) -> &T {
        &self.target.model
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source.model
    }

    pub fn into_models(self) -> (S, T) {
        (self.source.model, self.target.model)
    }
}

/// `[dir_x, dir_y, agent_x, agent_y]`; direction is zero when the agent is
/// on top of the target.
#[must_use]
pub fn task_features(state: &SimulationState) -> [f32; TASK_FEATURES] {
    let [dx, dy] = state.delta_to_target();
    let dist = state.distance_to_target();
    let (ux, uy) = if dist > 0.001 {
        (dx / dist, dy / dist)
    } else {
        (0.0, 0.0)
    };
    [ux, uy, state.agent[0], state.agent[1]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::tests::StageStub;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Target stub with scripted outputs that records local updates.
    struct ScriptedTarget {
        input_width: usize,
        output: Vec<f32>,
        inputs: Rc<RefCell<Vec<Vec<f32>>>>,
        updates: Rc<RefCell<Vec<usize>>>,
    }

    impl ScriptedTarget {
        fn new(input_width: usize, output: Vec<f32>) -> Self {
            Self {
                input_width,
                output,
                inputs: Rc::default(),
                updates: Rc::default(),
            }
        }
    }

    impl NeuralModel for ScriptedTarget {
        fn input_width(&self) -> usize {
            self.input_width
        }

        fn output_width(&self) -> usize {
            self.output.len()
        }

        fn stage_count(&self) -> usize {
            1
        }

        fn stage_width(&self, _index: usize) -> Option<usize> {
            Some(self.output.len())
        }

        fn forward(&mut self, input: &[f32]) -> Result<Vec<f32>> {
            self.inputs.borrow_mut().push(input.to_vec());
            Ok(self.output.clone())
        }

        fn internal_stage(&self, _index: usize) -> Option<&[f32]> {
            Some(&self.output)
        }

        fn local_update(&mut self, _: &[f32], label: usize, _: usize, _: f32) -> Result<()> {
            self.updates.borrow_mut().push(label);
            Ok(())
        }
    }

    fn link() -> LinkDescriptor {
        LinkDescriptor::new("c2n", "classifier", 0, "navigator", 4, 4)
    }

    fn setup(capabilities: Capabilities, links: Vec<LinkDescriptor>) -> ControllerSetup {
        ControllerSetup {
            links,
            capabilities,
            seed: 9,
            ..Default::default()
        }
    }

    fn right() -> Vec<f32> {
        vec![0.1, 0.2, 0.3, 0.9]
    }

    #[test]
    fn test_composite_input_layout() {
        let source = StageStub::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let target = ScriptedTarget::new(10, right());
        let inputs = target.inputs.clone();
        let mut c = Controller::new(
            NamedModel::new("classifier", source),
            NamedModel::new("navigator", target),
            setup(Capabilities::new(true, false), vec![link()]),
        )
        .unwrap();
        let mut state = SimulationState::new([0.2, 0.2], [0.5, 0.6], TerrainType::Road);
        c.tick(&mut state).unwrap();

        let seen = inputs.borrow()[0].clone();
        assert!((seen[0] - 0.6).abs() < 1e-6);
        assert!((seen[1] - 0.8).abs() < 1e-6);
        assert_eq!(&seen[2..4], &[0.2, 0.2]);
        assert_eq!(&seen[4..8], &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(&seen[8..], &[0.0, 0.0]);
        assert_eq!(c.source().forwards, 1);
    }

    #[test]
    fn test_coupling_off_skips_source() {
        let target = ScriptedTarget::new(8, right());
        let inputs = target.inputs.clone();
        let mut c = Controller::new(
            NamedModel::new("classifier", StageStub::new(vec![1.0; 4])),
            NamedModel::new("navigator", target),
            setup(Capabilities::new(false, false), vec![link()]),
        )
        .unwrap();
        let mut state = SimulationState::default();
        c.tick(&mut state).unwrap();
        assert_eq!(c.source().forwards, 0);
        assert_eq!(&inputs.borrow()[0][4..], &[0.0; 4]);
    }

    #[test]
    fn test_success_trains_on_taken_action() {
        let target = ScriptedTarget::new(8, right());
        let updates = target.updates.clone();
        let mut c = Controller::new(
            NamedModel::new("classifier", StageStub::new(vec![0.0; 4])),
            NamedModel::new("navigator", target),
            setup(Capabilities::new(false, true), vec![]),
        )
        .unwrap();
        let mut state = SimulationState::new([0.1, 0.5], [0.9, 0.5], TerrainType::Road);
        let outcome = c.tick(&mut state).unwrap();
        assert_eq!(outcome.action, Action::Right);
        assert!(outcome.effective);
        assert_eq!(outcome.label, Some(Action::Right));
        assert_eq!(*updates.borrow(), vec![Action::Right.index()]);
    }

    #[test]
    fn test_failure_trains_on_corrective_action() {
        // Moving right while the target sits straight above.
        let target = ScriptedTarget::new(8, right());
        let updates = target.updates.clone();
        let mut c = Controller::new(
            NamedModel::new("classifier", StageStub::new(vec![0.0; 4])),
            NamedModel::new("navigator", target),
            setup(Capabilities::new(false, true), vec![]),
        )
        .unwrap();
        let mut state = SimulationState::new([0.5, 0.1], [0.5, 0.9], TerrainType::Road);
        let outcome = c.tick(&mut state).unwrap();
        assert!(!outcome.effective);
        assert_eq!(outcome.label, Some(Action::Up));
        assert_eq!(*updates.borrow(), vec![Action::Up.index()]);
    }

    #[test]
    fn test_custom_policy_is_used() {
        let target = ScriptedTarget::new(8, right());
        let updates = target.updates.clone();
        let mut c = Controller::with_policy(
            NamedModel::new("classifier", StageStub::new(vec![0.0; 4])),
            NamedModel::new("navigator", target),
            setup(Capabilities::new(false, true), vec![]),
            |_: &SimulationState| Action::Down,
        )
        .unwrap();
        let mut state = SimulationState::new([0.5, 0.1], [0.5, 0.9], TerrainType::Road);
        c.tick(&mut state).unwrap();
        assert_eq!(*updates.borrow(), vec![Action::Down.index()]);
    }

    #[test]
    fn test_no_updates_without_adaptation() {
        let target = ScriptedTarget::new(8, right());
        let updates = target.updates.clone();
        let mut c = Controller::new(
            NamedModel::new("classifier", StageStub::new(vec![0.0; 4])),
            NamedModel::new("navigator", target),
            setup(Capabilities::new(true, false), vec![link()]),
        )
        .unwrap();
        let mut state = SimulationState::default();
        for _ in 0..5 {
            assert_eq!(c.tick(&mut state).unwrap().label, None);
        }
        assert!(updates.borrow().is_empty());
    }

    #[test]
    fn test_target_reach_resets_positions() {
        let target = ScriptedTarget::new(8, right());
        let mut c = Controller::new(
            NamedModel::new("classifier", StageStub::new(vec![0.0; 4])),
            NamedModel::new("navigator", target),
            setup(Capabilities::new(false, false), vec![]),
        )
        .unwrap();
        let mut state = SimulationState::new([0.5, 0.5], [0.6, 0.5], TerrainType::Sand);
        state.stuck_count = 1;
        let outcome = c.tick(&mut state).unwrap();
        assert!(outcome.reached_target);
        assert_ne!(state.agent, [0.53, 0.5]);
        assert_ne!(state.target, [0.6, 0.5]);
        assert!(state.agent.iter().all(|&v| (0.0..0.3).contains(&v)));
        assert!(state.target.iter().all(|&v| (0.7..1.0).contains(&v)));
        assert_eq!(state.last_action, None);
        assert_eq!(state.stuck_count, 0);
        assert_eq!(state.velocity, [0.0, 0.0]);
    }

    #[test]
    fn test_setup_rejects_bad_wiring() {
        let mk = |links: Vec<LinkDescriptor>, input: usize, outputs: usize| {
            Controller::new(
                NamedModel::new("classifier", StageStub::new(vec![0.0; 4])),
                NamedModel::new("navigator", ScriptedTarget::new(input, vec![0.0; outputs])),
                setup(Capabilities::new(true, true), links),
            )
            .map(|_| ())
        };
        assert!(mk(vec![link()], 8, 4).is_ok());
        // link past input width
        assert!(mk(vec![link()], 7, 4).is_err());
        // wrong action count
        assert!(mk(vec![], 8, 3).is_err());
        // link over the task features
        let mut early = link();
        early.target_offset = 2;
        assert!(mk(vec![early], 8, 4).is_err());
        // link from an unrelated model
        let mut stray = link();
        stray.source_model = "other".into();
        assert!(mk(vec![stray], 8, 4).is_err());
    }

    #[test]
    fn test_axis_alternation() {
        let mut state = SimulationState::new([0.5, 0.5], [0.2, 0.9], TerrainType::Sand);
        state.last_action = Some(Action::Up);
        assert_eq!(AxisAlternation.correct(&state), Action::Left);
        state.last_action = Some(Action::Left);
        assert_eq!(AxisAlternation.correct(&state), Action::Up);
        state.last_action = None;
        state.target = [0.9, 0.1];
        assert_eq!(AxisAlternation.correct(&state), Action::Down);
    }

    #[test]
    fn test_task_features_zero_direction_on_target() {
        let state = SimulationState::new([0.4, 0.4], [0.4, 0.4], TerrainType::Road);
        assert_eq!(task_features(&state), [0.0, 0.0, 0.4, 0.4]);
    }
}
