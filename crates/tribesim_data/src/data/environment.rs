use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    #[must_use]
    pub fn next(&self) -> Season {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Autumn,
            Season::Autumn => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    #[must_use]
    pub fn from_index(index: u32) -> Season {
        match index % 4 {
            0 => Season::Spring,
            1 => Season::Summer,
            2 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Storm,
    Drought,
    Snow,
}

impl Weather {
    /// Harsh weather feeds a noisy signal into every brain.
    #[must_use]
    pub fn is_harsh(&self) -> bool {
        matches!(self, Weather::Storm | Weather::Drought | Weather::Snow)
    }
}

/// One-shot events the presentation layer can trigger ("god powers").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonalEvent {
    /// Every active tribe receives a food windfall.
    Harvest,
    /// Drought weather for one in-game day; plants wither.
    Drought,
    /// Snow for one in-game day and an immediate energy chill.
    Blizzard,
    /// Reputation rises between every pair of tribes that have met.
    Festival,
}
