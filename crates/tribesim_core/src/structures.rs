use crate::error::{SimError, SimResult};
use crate::math::Vec3;
use serde::{Deserialize, Serialize};
use tribesim_data::{GroupId, ResourceBundle, StructureId, StructureKind};

pub trait StructureLogic {
    fn cost(&self) -> ResourceBundle;
    fn max_health(&self) -> f32;
    /// Resources produced per second for the owner.
    fn production(&self) -> ResourceBundle;
    /// Research points per second added to the owner's current tech.
    fn research_rate(&self) -> f32;
    /// Additive conception-rate bonus for members of the owning group.
    fn birth_bonus(&self) -> f32;
    fn label(&self) -> &'static str;
}

impl StructureLogic for StructureKind {
    fn cost(&self) -> ResourceBundle {
        match self {
            StructureKind::Hut => ResourceBundle::new(0.0, 20.0, 0.0, 0.0),
            StructureKind::Farm => ResourceBundle::new(0.0, 15.0, 5.0, 0.0),
            StructureKind::Mine => ResourceBundle::new(0.0, 10.0, 10.0, 0.0),
            StructureKind::Workshop => ResourceBundle::new(0.0, 25.0, 15.0, 5.0),
            StructureKind::Wall => ResourceBundle::new(0.0, 0.0, 30.0, 0.0),
        }
    }

    fn max_health(&self) -> f32 {
        match self {
            StructureKind::Hut => 100.0,
            StructureKind::Farm => 80.0,
            StructureKind::Mine => 120.0,
            StructureKind::Workshop => 100.0,
            StructureKind::Wall => 250.0,
        }
    }

    fn production(&self) -> ResourceBundle {
        match self {
            StructureKind::Farm => ResourceBundle::new(0.2, 0.0, 0.0, 0.0),
            StructureKind::Mine => ResourceBundle::new(0.0, 0.0, 0.1, 0.05),
            StructureKind::Hut | StructureKind::Workshop | StructureKind::Wall => {
                ResourceBundle::EMPTY
            }
        }
    }

    fn research_rate(&self) -> f32 {
        match self {
            StructureKind::Workshop => 0.1,
            _ => 0.0,
        }
    }

    fn birth_bonus(&self) -> f32 {
        match self {
            StructureKind::Hut => 1.0,
            _ => 0.0,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            StructureKind::Hut => "Hut",
            StructureKind::Farm => "Farm",
            StructureKind::Mine => "Mine",
            StructureKind::Workshop => "Workshop",
            StructureKind::Wall => "Wall",
        }
    }
}

/// Maps the build-kind output in `[-1, 1]` onto a structure kind.
#[must_use]
pub fn kind_from_output(value: f32) -> StructureKind {
    let n = StructureKind::ALL.len();
    let idx = (((value + 1.0) * 0.5) * n as f32).floor() as usize;
    StructureKind::ALL[idx.min(n - 1)]
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Structure {
    pub id: StructureId,
    pub kind: StructureKind,
    pub group: GroupId,
    pub position: Vec3,
    pub health: f32,
    pub built_at: f32,
}

/// Global fixed-capacity structure table. Destroyed slots are reused.
#[derive(Debug, Clone)]
pub struct StructureStore {
    slots: Vec<Option<Structure>>,
    free: Vec<u16>,
    capacity: usize,
    count: usize,
}

impl StructureStore {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(u16::MAX as usize);
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
            capacity,
            count: 0,
        }
    }

    pub fn place(
        &mut self,
        kind: StructureKind,
        group: GroupId,
        position: Vec3,
        now: f32,
    ) -> SimResult<StructureId> {
        if !position.is_finite() {
            return Err(SimError::PreconditionNotMet("structure position must be finite"));
        }
        let index = match self.free.pop() {
            Some(i) => i as usize,
            None if self.slots.len() < self.capacity => {
                self.slots.push(None);
                self.slots.len() - 1
            }
            None => return Err(SimError::capacity("structures")),
        };
        let id = StructureId(index as u16);
        self.slots[index] = Some(Structure {
            id,
            kind,
            group,
            position,
            health: kind.max_health(),
            built_at: now,
        });
        self.count += 1;
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: StructureId) -> Option<&Structure> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Applies damage. Returns the removed structure if it was destroyed.
    pub fn damage(&mut self, id: StructureId, amount: f32) -> Option<Structure> {
        let s = self.slots.get_mut(id.index())?.as_mut()?;
        s.health -= amount.max(0.0);
        if s.health <= 0.0 {
            self.remove(id)
        } else {
            None
        }
    }

    pub fn remove(&mut self, id: StructureId) -> Option<Structure> {
        let removed = self.slots.get_mut(id.index())?.take()?;
        self.free.push(id.0);
        self.count -= 1;
        Some(removed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.slots.iter().flatten()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Nearest structure not owned by `group` within `radius`.
    #[must_use]
    pub fn nearest_foreign(&self, position: Vec3, radius: f32, group: GroupId) -> Option<StructureId> {
        let r2 = radius * radius;
        self.iter()
            .filter(|s| s.group != group)
            .map(|s| (s.id, s.position.distance_sq(position)))
            .filter(|&(_, d2)| d2 <= r2)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.count = 0;
    }
}
