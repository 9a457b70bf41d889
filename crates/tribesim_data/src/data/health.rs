use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Disease {
    #[default]
    None,
    Cold,
    Fever,
    Plague,
    FoodPoisoning,
    Infection,
}

impl Disease {
    /// Every real disease, in immunity-vector order.
    pub const ALL: [Disease; 5] = [
        Disease::Cold,
        Disease::Fever,
        Disease::Plague,
        Disease::FoodPoisoning,
        Disease::Infection,
    ];

    /// Position in the immunity vector; `None` for the healthy state.
    #[must_use]
    pub fn immunity_index(self) -> Option<usize> {
        match self {
            Disease::None => None,
            Disease::Cold => Some(0),
            Disease::Fever => Some(1),
            Disease::Plague => Some(2),
            Disease::FoodPoisoning => Some(3),
            Disease::Infection => Some(4),
        }
    }
}

/// Discretized energy level, from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HungerBand {
    Full,
    Satisfied,
    Hungry,
    Starving,
    Critical,
}

impl HungerBand {
    /// The two bands where prolonged exposure accelerates health loss.
    #[must_use]
    pub fn is_severe(self) -> bool {
        matches!(self, HungerBand::Starving | HungerBand::Critical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBand {
    Infant,
    Child,
    Adult,
    Elder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    Starvation,
    Disease,
    OldAge,
    Combat,
    Predation,
    Other,
}
