use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Era {
    #[default]
    Stone,
    Bronze,
    Iron,
    Classical,
}

impl Era {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Every researchable technology. Discriminants index the owned-tech bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tech {
    // Stone
    Foraging = 0,
    StoneTools,
    FireMaking,
    Shelter,
    Hunting,
    // Bronze
    Agriculture,
    AnimalHusbandry,
    Pottery,
    Masonry,
    BronzeWorking,
    Herbalism,
    // Iron
    IronWorking,
    Writing,
    Medicine,
    Fortification,
    Currency,
    // Classical
    Mathematics,
    Engineering,
    Philosophy,
    Tactics,
}

impl Tech {
    pub const COUNT: usize = 20;

    pub const ALL: [Tech; Tech::COUNT] = [
        Tech::Foraging,
        Tech::StoneTools,
        Tech::FireMaking,
        Tech::Shelter,
        Tech::Hunting,
        Tech::Agriculture,
        Tech::AnimalHusbandry,
        Tech::Pottery,
        Tech::Masonry,
        Tech::BronzeWorking,
        Tech::Herbalism,
        Tech::IronWorking,
        Tech::Writing,
        Tech::Medicine,
        Tech::Fortification,
        Tech::Currency,
        Tech::Mathematics,
        Tech::Engineering,
        Tech::Philosophy,
        Tech::Tactics,
    ];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}
