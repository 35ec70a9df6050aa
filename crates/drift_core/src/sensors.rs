use crate::terrain::{TerrainLogic, TerrainType, SENSOR_WIDTH};
use rand::Rng;

/// Noisy sensor reading for `terrain`: the terrain profile with uniform
/// noise of total spread `noise`, clamped to [0,1].
pub fn generate_sensors<R: Rng>(terrain: TerrainType, noise: f32, rng: &mut R) -> [f32; SENSOR_WIDTH] {
    let mut sensors = terrain.sensor_profile();
    for s in &mut sensors {
        *s = (*s + (rng.gen::<f32>() - 0.5) * noise).clamp(0.0, 1.0);
    }
    sensors
}
