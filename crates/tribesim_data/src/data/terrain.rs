use serde::{Deserialize, Serialize};

/// Terrain category of a territory cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainType {
    /// Open grassland, the most common terrain.
    #[default]
    Grassland = 0,
    /// Timber-rich woodland.
    Forest = 1,
    /// Rolling hills with exposed stone.
    Hills = 2,
    /// Mountains: poor food, best ore.
    Mountains = 3,
    /// Dry land yielding little of anything.
    Desert = 4,
    /// Wetland with some food and wood.
    Swamp = 5,
    /// Frozen plain.
    Tundra = 6,
    /// Shoreline with abundant food.
    Coast = 7,
}

impl TerrainType {
    pub const ALL: [TerrainType; 8] = [
        TerrainType::Grassland,
        TerrainType::Forest,
        TerrainType::Hills,
        TerrainType::Mountains,
        TerrainType::Desert,
        TerrainType::Swamp,
        TerrainType::Tundra,
        TerrainType::Coast,
    ];

    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}
