use serde::{Deserialize, Serialize};

/// Closed set of organism types. Behaviour differences are dispatched by
/// exhaustive `match` in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum OrganismKind {
    #[default]
    Plant = 0,
    Herbivore = 1,
    Carnivore = 2,
    /// Member (or candidate member) of a tribe.
    Tribal = 3,
}

impl OrganismKind {
    pub const ALL: [OrganismKind; 4] = [
        OrganismKind::Plant,
        OrganismKind::Herbivore,
        OrganismKind::Carnivore,
        OrganismKind::Tribal,
    ];

    /// Numeric tag used by the flat telemetry arrays.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(OrganismKind::Plant),
            1 => Some(OrganismKind::Herbivore),
            2 => Some(OrganismKind::Carnivore),
            3 => Some(OrganismKind::Tribal),
            _ => None,
        }
    }

    /// Plants carry no brain and never move.
    #[inline]
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        !matches!(self, OrganismKind::Plant)
    }
}
