use serde::{Deserialize, Serialize};

/// How one tribe regards another (ordered: `status(a, b)` is a's view of b).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DiplomaticStatus {
    /// The tribes have not met yet.
    #[default]
    Unknown,
    Hostile,
    Unfriendly,
    Neutral,
    Friendly,
    Allied,
    /// This tribe pays tribute to the other.
    Vassal,
    /// The other tribe pays tribute to this one.
    Overlord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreatyType {
    NonAggression,
    Trade,
    MilitaryAlliance,
    /// Participant `b` pays tribute to participant `a`.
    Tribute,
    Border,
    Marriage,
}

impl TreatyType {
    pub const ALL: [TreatyType; 6] = [
        TreatyType::NonAggression,
        TreatyType::Trade,
        TreatyType::MilitaryAlliance,
        TreatyType::Tribute,
        TreatyType::Border,
        TreatyType::Marriage,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarReason {
    /// Reputation sank far enough that conflict was inevitable.
    Hatred,
    Territory,
    Resources,
    /// A treaty was broken.
    Betrayal,
    /// Declared from outside the simulation.
    Decree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarOutcome {
    AttackerVictory,
    DefenderVictory,
    WhitePeace,
}
