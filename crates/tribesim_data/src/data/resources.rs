use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Food,
    Wood,
    Stone,
    Metal,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Food,
        ResourceKind::Wood,
        ResourceKind::Stone,
        ResourceKind::Metal,
    ];
}

/// Amount of each stockpiled resource. Used for stockpiles, costs, yields
/// and trade bundles alike.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceBundle {
    pub food: f32,
    pub wood: f32,
    pub stone: f32,
    pub metal: f32,
}

impl ResourceBundle {
    pub const EMPTY: ResourceBundle = ResourceBundle {
        food: 0.0,
        wood: 0.0,
        stone: 0.0,
        metal: 0.0,
    };

    #[must_use]
    pub const fn new(food: f32, wood: f32, stone: f32, metal: f32) -> Self {
        Self {
            food,
            wood,
            stone,
            metal,
        }
    }

    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> f32 {
        match kind {
            ResourceKind::Food => self.food,
            ResourceKind::Wood => self.wood,
            ResourceKind::Stone => self.stone,
            ResourceKind::Metal => self.metal,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut f32 {
        match kind {
            ResourceKind::Food => &mut self.food,
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Stone => &mut self.stone,
            ResourceKind::Metal => &mut self.metal,
        }
    }

    /// True when every component of `self` is at least the matching one in `cost`.
    #[must_use]
    pub fn covers(&self, cost: &ResourceBundle) -> bool {
        ResourceKind::ALL
            .iter()
            .all(|&k| self.get(k) + f32::EPSILON >= cost.get(k))
    }

    #[must_use]
    pub fn scaled(&self, factor: f32) -> ResourceBundle {
        ResourceBundle {
            food: self.food * factor,
            wood: self.wood * factor,
            stone: self.stone * factor,
            metal: self.metal * factor,
        }
    }

    pub fn add(&mut self, other: &ResourceBundle) {
        self.food += other.food;
        self.wood += other.wood;
        self.stone += other.stone;
        self.metal += other.metal;
    }

    #[must_use]
    pub fn total(&self) -> f32 {
        self.food + self.wood + self.stone + self.metal
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers() {
        let stock = ResourceBundle::new(10.0, 5.0, 0.0, 0.0);
        assert!(stock.covers(&ResourceBundle::new(10.0, 5.0, 0.0, 0.0)));
        assert!(!stock.covers(&ResourceBundle::new(0.0, 0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_serializes_as_named_fields() {
        let json = serde_json::to_string(&ResourceBundle::new(1.0, 0.0, 0.0, 0.0)).unwrap();
        assert!(json.contains("\"food\":1.0"));
    }
}
