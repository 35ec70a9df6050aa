use serde::{Deserialize, Serialize};

/// Ground the agent is currently crossing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    /// Low resistance, memoryless.
    #[default]
    Road,
    /// High resistance; punishes repeating the same move.
    Sand,
    /// Momentum-driven; velocity follows the requested direction slowly.
    Ice,
    /// Uniformly damped.
    Grass,
}

impl TerrainType {
    pub const ALL: [TerrainType; 4] = [
        TerrainType::Road,
        TerrainType::Sand,
        TerrainType::Ice,
        TerrainType::Grass,
    ];
    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            TerrainType::Road => 0,
            TerrainType::Sand => 1,
            TerrainType::Ice => 2,
            TerrainType::Grass => 3,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TerrainType::Road => "Road",
            TerrainType::Sand => "Sand",
            TerrainType::Ice => "Ice",
            TerrainType::Grass => "Grass",
        }
    }
}

/// Discrete movement request emitted by the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// +y
    Up,
    /// -y
    Down,
    /// -x
    Left,
    /// +x
    Right,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];
    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn is_vertical(self) -> bool {
        matches!(self, Action::Up | Action::Down)
    }

    /// Unit step in world coordinates.
    #[must_use]
    pub fn unit_vector(self) -> [f32; 2] {
        match self {
            Action::Up => [0.0, 1.0],
            Action::Down => [0.0, -1.0],
            Action::Left => [-1.0, 0.0],
            Action::Right => [1.0, 0.0],
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Action::Up => "Up",
            Action::Down => "Down",
            Action::Left => "Left",
            Action::Right => "Right",
        }
    }
}
