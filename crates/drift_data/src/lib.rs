//! Plain data shared by every DRIFT crate.
//!
//! Nothing in here runs a model or advances a simulation; logic lives in
//! `drift_core` behind traits such as `TerrainLogic`.

pub mod data;

pub use data::link::LinkDescriptor;
pub use data::metrics::{Capabilities, ExperimentResult, WindowMetrics};
pub use data::state::SimulationState;
pub use data::terrain::{Action, TerrainType};
