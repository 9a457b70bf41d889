//! Ownership grid over the ground plane with contested-cell resolution.
//!
//! Each cell has at most one owner. A foreign claim never flips ownership
//! by itself: it marks the cell contested and opens a border conflict. The
//! cell changes hands only when its control strength decays to zero or the
//! conflict's pressure on one side runs out.

use crate::config::TerritoryConfig;
use crate::error::{SimError, SimResult};
use crate::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tribesim_data::{GroupId, ResourceBundle, TerrainType};

pub trait TerrainLogic {
    /// Per-resource yield multipliers for an owned cell.
    fn yields(&self) -> ResourceBundle;
    /// Relative weight in world generation.
    fn weight(&self) -> u32;
    fn label(&self) -> &'static str;
}

impl TerrainLogic for TerrainType {
    fn yields(&self) -> ResourceBundle {
        match self {
            TerrainType::Grassland => ResourceBundle::new(1.0, 0.3, 0.2, 0.0),
            TerrainType::Forest => ResourceBundle::new(0.6, 1.5, 0.2, 0.0),
            TerrainType::Hills => ResourceBundle::new(0.5, 0.4, 1.2, 0.4),
            TerrainType::Mountains => ResourceBundle::new(0.1, 0.2, 1.5, 1.0),
            TerrainType::Desert => ResourceBundle::new(0.1, 0.0, 0.5, 0.2),
            TerrainType::Swamp => ResourceBundle::new(0.6, 0.8, 0.0, 0.0),
            TerrainType::Tundra => ResourceBundle::new(0.2, 0.2, 0.3, 0.1),
            TerrainType::Coast => ResourceBundle::new(1.3, 0.3, 0.2, 0.0),
        }
    }

    fn weight(&self) -> u32 {
        match self {
            TerrainType::Grassland => 30,
            TerrainType::Forest => 20,
            TerrainType::Hills => 12,
            TerrainType::Mountains => 6,
            TerrainType::Desert => 8,
            TerrainType::Swamp => 7,
            TerrainType::Tundra => 7,
            TerrainType::Coast => 10,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TerrainType::Grassland => "grassland",
            TerrainType::Forest => "forest",
            TerrainType::Hills => "hills",
            TerrainType::Mountains => "mountains",
            TerrainType::Desert => "desert",
            TerrainType::Swamp => "swamp",
            TerrainType::Tundra => "tundra",
            TerrainType::Coast => "coast",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct TerritoryCell {
    pub terrain: TerrainType,
    pub owner: Option<GroupId>,
    pub strength: f32,
    pub contested_by: Option<GroupId>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BorderConflict {
    pub cell: usize,
    pub owner: GroupId,
    pub challenger: GroupId,
    pub owner_pressure: f32,
    pub challenger_pressure: f32,
    pub started_at: f32,
}

impl BorderConflict {
    #[must_use]
    pub fn involves(&self, x: GroupId, y: GroupId) -> bool {
        (self.owner == x && self.challenger == y) || (self.owner == y && self.challenger == x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed,
    Reinforced,
    /// A new contest was opened on a foreign cell.
    Contested,
    /// The claimant was already contesting this cell.
    ContestStrengthened,
    /// A third group already contests this cell. Nothing changed.
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellTransfer {
    pub cell: usize,
    pub from: Option<GroupId>,
    pub to: GroupId,
}

#[derive(Debug, Clone)]
pub struct Territory {
    config: TerritoryConfig,
    cols: usize,
    rows: usize,
    cells: Vec<TerritoryCell>,
    counts: Vec<usize>,
    conflicts: Vec<BorderConflict>,
    yields: Vec<ResourceBundle>,
}

impl Territory {
    pub fn new<R: Rng>(
        bounds: Vec3,
        max_groups: usize,
        config: TerritoryConfig,
        rng: &mut R,
    ) -> Self {
        let cols = ((bounds.x / config.cell_size).ceil() as usize).max(1);
        let rows = ((bounds.z / config.cell_size).ceil() as usize).max(1);
        let mut territory = Self {
            cols,
            rows,
            cells: vec![TerritoryCell::default(); cols * rows],
            counts: vec![0; max_groups],
            conflicts: Vec::with_capacity(config.max_conflicts),
            yields: vec![ResourceBundle::EMPTY; max_groups],
            config,
        };
        territory.generate_terrain(rng);
        territory
    }

    /// Weighted draw per cell, then one neighbour-majority smoothing pass.
    fn generate_terrain<R: Rng>(&mut self, rng: &mut R) {
        let total: u32 = TerrainType::ALL.iter().map(TerrainLogic::weight).sum();
        for cell in &mut self.cells {
            let mut roll = rng.gen_range(0..total);
            cell.terrain = TerrainType::ALL
                .iter()
                .copied()
                .find(|t| {
                    if roll < t.weight() {
                        true
                    } else {
                        roll -= t.weight();
                        false
                    }
                })
                .unwrap_or_default();
        }

        let original: Vec<TerrainType> = self.cells.iter().map(|c| c.terrain).collect();
        for z in 0..self.rows {
            for x in 0..self.cols {
                let mut tally = [0u8; 8];
                for dz in -1i32..=1 {
                    for dx in -1i32..=1 {
                        if dx == 0 && dz == 0 {
                            continue;
                        }
                        let nx = x as i32 + dx;
                        let nz = z as i32 + dz;
                        if nx >= 0 && nz >= 0 && (nx as usize) < self.cols && (nz as usize) < self.rows {
                            let t = original[nz as usize * self.cols + nx as usize];
                            tally[t.tag() as usize] += 1;
                        }
                    }
                }
                if let Some((tag, _)) = tally.iter().enumerate().find(|(_, &n)| n >= 5) {
                    self.cells[z * self.cols + x].terrain = TerrainType::ALL[tag];
                }
            }
        }
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cells(&self) -> &[TerritoryCell] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&TerritoryCell> {
        self.cells.get(index)
    }

    #[must_use]
    pub fn cell_index(&self, position: Vec3) -> Option<usize> {
        if !position.is_finite() || position.x < 0.0 || position.z < 0.0 {
            return None;
        }
        let cx = (position.x / self.config.cell_size) as usize;
        let cz = (position.z / self.config.cell_size) as usize;
        // the far world edge belongs to the last cell
        let cx = if cx == self.cols { cx - 1 } else { cx };
        let cz = if cz == self.rows { cz - 1 } else { cz };
        (cx < self.cols && cz < self.rows).then_some(cz * self.cols + cx)
    }

    #[must_use]
    pub fn owner_at(&self, position: Vec3) -> Option<GroupId> {
        self.cell_index(position).and_then(|i| self.cells[i].owner)
    }

    #[must_use]
    pub fn terrain_at(&self, position: Vec3) -> Option<TerrainType> {
        self.cell_index(position).map(|i| self.cells[i].terrain)
    }

    #[must_use]
    pub fn territory_count(&self, group: GroupId) -> usize {
        self.counts.get(group.index()).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn conflicts(&self) -> &[BorderConflict] {
        &self.conflicts
    }

    #[must_use]
    pub fn contested_count(&self) -> usize {
        self.cells.iter().filter(|c| c.contested_by.is_some()).count()
    }

    pub fn claim(&mut self, position: Vec3, group: GroupId, now: f32) -> SimResult<ClaimOutcome> {
        if group.index() >= self.counts.len() {
            return Err(SimError::invalid("group", group));
        }
        let index = self
            .cell_index(position)
            .ok_or(SimError::PreconditionNotMet("position outside the territory grid"))?;
        let cfg = &self.config;
        let cell = &mut self.cells[index];
        let contested_by = cell.contested_by;
        match cell.owner {
            None => {
                cell.owner = Some(group);
                cell.strength = cfg.initial_strength;
                cell.contested_by = None;
                self.counts[group.index()] += 1;
                Ok(ClaimOutcome::Claimed)
            }
            Some(owner) if owner == group => {
                cell.strength = (cell.strength + cfg.reinforce_strength).min(cfg.max_strength);
                Ok(ClaimOutcome::Reinforced)
            }
            Some(owner) => match contested_by {
                Some(challenger) if challenger == group => {
                    let reinforce = cfg.reinforce_strength;
                    self.apply_pressure_at(index, group, reinforce);
                    Ok(ClaimOutcome::ContestStrengthened)
                }
                Some(_) => Ok(ClaimOutcome::Blocked),
                None => {
                    cell.contested_by = Some(group);
                    self.open_conflict(index, owner, group, now);
                    Ok(ClaimOutcome::Contested)
                }
            },
        }
    }

    /// One conflict per contested cell. A full table leaves the cell to
    /// strength decay alone.
    fn open_conflict(&mut self, cell: usize, owner: GroupId, challenger: GroupId, now: f32) {
        if self.conflicts.iter().any(|c| c.cell == cell) {
            return;
        }
        if self.conflicts.len() >= self.config.max_conflicts {
            tracing::trace!(owner = %owner, challenger = %challenger, "border conflict table full");
            return;
        }
        self.conflicts.push(BorderConflict {
            cell,
            owner,
            challenger,
            owner_pressure: self.config.initial_pressure,
            challenger_pressure: self.config.initial_pressure,
            started_at: now,
        });
        tracing::debug!(cell, owner = %owner, challenger = %challenger, "border conflict opened");
    }

    /// Pushes the oldest conflict between `favoring` and `against` toward
    /// `favoring`: its pressure rises by `amount`, the other side's drops by
    /// half of it. When a side's pressure reaches zero the conflict closes
    /// and the cell goes to the other side.
    pub fn apply_pressure(
        &mut self,
        favoring: GroupId,
        against: GroupId,
        amount: f32,
    ) -> Option<CellTransfer> {
        let pos = self
            .conflicts
            .iter()
            .enumerate()
            .filter(|(_, c)| c.involves(favoring, against))
            .min_by(|(_, x), (_, y)| {
                x.started_at
                    .total_cmp(&y.started_at)
                    .then(x.cell.cmp(&y.cell))
            })
            .map(|(pos, _)| pos)?;
        self.press(pos, favoring, amount)
    }

    /// Like [`Territory::apply_pressure`] for the conflict on one cell.
    pub fn apply_pressure_at(
        &mut self,
        cell: usize,
        favoring: GroupId,
        amount: f32,
    ) -> Option<CellTransfer> {
        let pos = self
            .conflicts
            .iter()
            .position(|c| c.cell == cell && (c.owner == favoring || c.challenger == favoring))?;
        self.press(pos, favoring, amount)
    }

    fn press(&mut self, pos: usize, favoring: GroupId, amount: f32) -> Option<CellTransfer> {
        let max = self.config.max_pressure;
        let c = &mut self.conflicts[pos];
        let (gain, loss) = if c.owner == favoring {
            (&mut c.owner_pressure, &mut c.challenger_pressure)
        } else {
            (&mut c.challenger_pressure, &mut c.owner_pressure)
        };
        *gain = (*gain + amount).min(max);
        *loss = (*loss - amount * 0.5).max(0.0);

        let winner = if c.owner_pressure <= 0.0 {
            c.challenger
        } else if c.challenger_pressure <= 0.0 {
            c.owner
        } else {
            return None;
        };
        let conflict = self.conflicts.swap_remove(pos);
        self.settle(conflict.cell, conflict.challenger, winner)
    }

    /// Closes the contest on `cell` in favour of `winner`.
    fn settle(&mut self, cell: usize, challenger: GroupId, winner: GroupId) -> Option<CellTransfer> {
        let initial = self.config.initial_strength;
        let c = &mut self.cells[cell];
        if c.contested_by == Some(challenger) {
            c.contested_by = None;
        }
        if c.owner == Some(winner) {
            return None;
        }
        let from = c.owner;
        c.owner = Some(winner);
        c.strength = initial;
        c.contested_by = None;
        if let Some(prev) = from {
            self.counts[prev.index()] = self.counts[prev.index()].saturating_sub(1);
        }
        self.counts[winner.index()] += 1;
        tracing::debug!(cell, from = ?from, to = %winner, "cell changed hands");
        Some(CellTransfer {
            cell,
            from,
            to: winner,
        })
    }

    /// Decays contested cells; a cell whose strength runs out goes to its
    /// contester.
    pub fn update(&mut self, dt: f32) -> Vec<CellTransfer> {
        let decay = self.config.contested_decay_per_sec * dt;
        let mut transfers = Vec::new();
        for index in 0..self.cells.len() {
            let Some(challenger) = self.cells[index].contested_by else {
                continue;
            };
            self.cells[index].strength -= decay;
            if self.cells[index].strength <= 0.0 {
                if let Some(pos) = self.conflicts.iter().position(|c| c.cell == index) {
                    self.conflicts.swap_remove(pos);
                }
                if let Some(t) = self.settle(index, challenger, challenger) {
                    transfers.push(t);
                }
            }
        }
        transfers
    }

    /// Per-group yield of one harvest: every owned cell contributes
    /// `base_yield × terrain multiplier × strength / max_strength`.
    pub fn collect_yields(&mut self) -> &[ResourceBundle] {
        self.yields.iter_mut().for_each(|y| *y = ResourceBundle::EMPTY);
        let base = self.config.base_yield;
        let max = self.config.max_strength;
        for cell in &self.cells {
            if let Some(owner) = cell.owner {
                if let Some(y) = self.yields.get_mut(owner.index()) {
                    y.add(&cell.terrain.yields().scaled(base * cell.strength / max));
                }
            }
        }
        &self.yields
    }

    #[must_use]
    pub fn yield_interval_ticks(&self) -> u64 {
        self.config.yield_interval_ticks
    }

    /// Drops every claim and conflict held by `group`.
    pub fn release(&mut self, group: GroupId) {
        for cell in &mut self.cells {
            if cell.owner == Some(group) {
                cell.owner = cell.contested_by.take();
                cell.strength = if cell.owner.is_some() {
                    self.config.initial_strength
                } else {
                    0.0
                };
                if let Some(new_owner) = cell.owner {
                    self.counts[new_owner.index()] += 1;
                }
            } else if cell.contested_by == Some(group) {
                cell.contested_by = None;
            }
        }
        if let Some(n) = self.counts.get_mut(group.index()) {
            *n = 0;
        }
        self.conflicts
            .retain(|c| c.owner != group && c.challenger != group);
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.owner = None;
            cell.strength = 0.0;
            cell.contested_by = None;
        }
        self.counts.iter_mut().for_each(|n| *n = 0);
        self.conflicts.clear();
    }
}
