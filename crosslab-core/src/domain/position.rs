use serde::{Deserialize, Serialize};

/// Discrete position state derived from the crossover rule, one per bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

impl PositionState {
    pub fn is_long(self) -> bool {
        self == PositionState::Long
    }

    pub fn is_flat(self) -> bool {
        self == PositionState::Flat
    }
}
