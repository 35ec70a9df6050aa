use drift_core::terrain::{TerrainLogic, TerrainPhysics};
use drift_core::sensors::generate_sensors;
use drift_data::{Action, SimulationState, TerrainType};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn arb_terrain() -> impl Strategy<Value = TerrainType> {
    prop::sample::select(TerrainType::ALL.to_vec())
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::ALL.to_vec())
}

prop_compose! {
    fn arb_position()(x in 0.0f32..=1.0, y in 0.0f32..=1.0) -> [f32; 2] {
        [x, y]
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_positions_stay_in_unit_square(
        terrain in arb_terrain(),
        start in arb_position(),
        actions in prop::collection::vec(arb_action(), 1..200),
        speed in 0.001f32..1.0,
    ) {
        let physics = TerrainPhysics { speed, ..Default::default() };
        let mut state = SimulationState::new(start, [0.5, 0.5], terrain);
        for action in actions {
            physics.apply_action(&mut state, action);
            prop_assert!((0.0..=1.0).contains(&state.agent[0]), "x out of range: {}", state.agent[0]);
            prop_assert!((0.0..=1.0).contains(&state.agent[1]), "y out of range: {}", state.agent[1]);
            prop_assert_eq!(state.last_action, Some(action));
        }
    }

    #[test]
    fn test_sand_never_moves_after_stalling(
        action in arb_action(),
        repeats in 3usize..50,
    ) {
        let physics = TerrainPhysics::default();
        let mut state = SimulationState::new([0.5, 0.5], [0.9, 0.9], TerrainType::Sand);
        for _ in 0..3 {
            physics.apply_action(&mut state, action);
        }
        let stalled = state.agent;
        for _ in 0..repeats {
            physics.apply_action(&mut state, action);
        }
        prop_assert_eq!(state.agent, stalled);
    }

    #[test]
    fn test_sensors_stay_in_unit_range(
        terrain in arb_terrain(),
        noise in 0.0f32..2.0,
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let sensors = generate_sensors(terrain, noise, &mut rng);
        prop_assert!(sensors.iter().all(|v| (0.0..=1.0).contains(v)));
        if noise == 0.0 {
            prop_assert_eq!(sensors, terrain.sensor_profile());
        }
    }
}
