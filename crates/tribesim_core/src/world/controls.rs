//! External control surface: spawning, corrective writes and direct
//! interventions. Each call mutates the world immediately.

use super::World;
use crate::brain::Brain;
use crate::diplomacy::{Treaty, WarResolution};
use crate::error::{SimError, SimResult};
use crate::math::Vec3;
use crate::territory::{CellTransfer, ClaimOutcome};
use tribesim_data::{
    Disease, GroupId, OrganismId, OrganismKind, ResourceBundle, ResourceKind, SeasonalEvent, Tech,
    TradeOfferId, TreatyId, TreatyType, WarId, WarReason,
};

impl World {
    // ---------------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------------

    /// Spawns one organism. Tribal agents may join an active group; other
    /// kinds must pass `None`.
    pub fn spawn_organism(
        &mut self,
        kind: OrganismKind,
        x: f32,
        y: f32,
        z: f32,
        group: Option<GroupId>,
    ) -> SimResult<OrganismId> {
        self.spawn_member(kind, Vec3::new(x, y, z), group)
    }

    pub fn create_group(&mut self) -> SimResult<GroupId> {
        self.tribes.create_group(self.time)
    }

    // ---------------------------------------------------------------------
    // Corrective writes
    // ---------------------------------------------------------------------

    /// Overwrites a position, clamped into the world. False for stale ids
    /// and non-finite input.
    pub fn set_position(&mut self, id: OrganismId, x: f32, y: f32, z: f32) -> bool {
        let position = Vec3::new(x, y, z);
        match self.organisms.resolve(id) {
            Some(slot) if position.is_finite() => self.organisms.set_position(slot, position),
            _ => false,
        }
    }

    pub fn set_velocity(&mut self, id: OrganismId, x: f32, y: f32, z: f32) -> bool {
        let velocity = Vec3::new(x, y, z);
        match self.organisms.resolve(id) {
            Some(slot) if velocity.is_finite() => self.organisms.set_velocity(slot, velocity),
            _ => false,
        }
    }

    pub fn set_energy(&mut self, id: OrganismId, energy: f32) -> bool {
        self.organisms
            .resolve(id)
            .is_some_and(|slot| self.organisms.set_energy(slot, energy))
    }

    pub fn set_health(&mut self, id: OrganismId, health: f32) -> bool {
        self.organisms
            .resolve(id)
            .is_some_and(|slot| self.organisms.set_health(slot, health))
    }

    /// Sets age in simulated seconds.
    pub fn set_age(&mut self, id: OrganismId, age_secs: f32) -> bool {
        self.organisms
            .resolve(id)
            .is_some_and(|slot| self.organisms.set_age(slot, age_secs))
    }

    /// Swaps in a hand-made brain, e.g. a constant policy for a scripted
    /// scenario. Plants have no brain.
    pub fn set_brain(&mut self, id: OrganismId, brain: Brain) -> bool {
        match self.organisms.resolve(id) {
            Some(slot) if self.organisms.kinds()[slot].is_mobile() => {
                self.organisms.set_brain(slot, brain);
                true
            }
            _ => false,
        }
    }

    // ---------------------------------------------------------------------
    // Technology
    // ---------------------------------------------------------------------

    /// Gives `tech` outright, ignoring prerequisites, and re-equips members.
    pub fn grant_technology(&mut self, group: GroupId, tech: Tech) -> SimResult<()> {
        self.require_active(group)?;
        self.technology.grant(group, tech)?;
        self.refresh_equipment(group);
        Ok(())
    }

    pub fn start_research(&mut self, group: GroupId, tech: Tech) -> SimResult<()> {
        self.require_active(group)?;
        self.technology.start_research(group, tech)
    }

    pub fn set_auto_research(&mut self, group: GroupId, enabled: bool) {
        self.technology.set_auto_research(group, enabled);
    }

    // ---------------------------------------------------------------------
    // Health
    // ---------------------------------------------------------------------

    /// Infects a random tracked animal. Returns who caught it.
    pub fn start_outbreak(&mut self) -> Option<OrganismId> {
        self.population
            .start_outbreak(&self.organisms, &mut self.rng)
            .map(|slot| self.organisms.id_of(slot))
    }

    pub fn infect(&mut self, id: OrganismId, disease: Disease) -> bool {
        match self.organisms.resolve(id) {
            Some(slot) if self.organisms.kinds()[slot].is_mobile() => {
                self.population.infect(slot, disease)
            }
            _ => false,
        }
    }

    /// Makes a grouped tribal agent pregnant now.
    pub fn force_conception(&mut self, id: OrganismId) -> bool {
        self.organisms
            .resolve(id)
            .is_some_and(|slot| self.population.force_conception(slot, &self.organisms))
    }

    // ---------------------------------------------------------------------
    // Resources
    // ---------------------------------------------------------------------

    pub fn give_resources(&mut self, group: GroupId, kind: ResourceKind, amount: f32) -> SimResult<()> {
        self.require_active(group)?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(SimError::PreconditionNotMet("amount must be positive"));
        }
        self.tribes.add_resource(group, kind, amount);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Diplomacy
    // ---------------------------------------------------------------------

    pub fn modify_reputation(&mut self, a: GroupId, b: GroupId, delta: f32) -> bool {
        self.diplomacy.modify_reputation(a, b, delta)
    }

    pub fn declare_war(&mut self, attacker: GroupId, defender: GroupId) -> SimResult<WarId> {
        self.require_active(attacker)?;
        self.require_active(defender)?;
        self.diplomacy
            .declare_war(attacker, defender, WarReason::Decree, self.time)
    }

    pub fn force_peace(&mut self, a: GroupId, b: GroupId) -> SimResult<WarResolution> {
        self.diplomacy.force_peace(a, b, self.time)
    }

    pub fn sign_treaty(&mut self, kind: TreatyType, a: GroupId, b: GroupId) -> SimResult<TreatyId> {
        self.require_active(a)?;
        self.require_active(b)?;
        self.diplomacy.sign_treaty(kind, a, b, self.time)
    }

    pub fn break_treaty(&mut self, id: TreatyId, breaker: GroupId) -> SimResult<Treaty> {
        self.diplomacy.break_treaty(id, breaker)
    }

    pub fn propose_trade(
        &mut self,
        from: GroupId,
        to: GroupId,
        offered: ResourceBundle,
        requested: ResourceBundle,
    ) -> SimResult<TradeOfferId> {
        self.require_active(from)?;
        self.require_active(to)?;
        self.diplomacy
            .create_trade_offer(from, to, offered, requested, self.time)
    }

    /// Accepts an offer on behalf of its recipient and moves the goods.
    pub fn accept_trade(&mut self, id: TradeOfferId) -> SimResult<()> {
        self.settle_trade(id)
    }

    pub fn reject_trade(&mut self, id: TradeOfferId) -> bool {
        self.diplomacy.reject_trade(id)
    }

    // ---------------------------------------------------------------------
    // Environment and territory
    // ---------------------------------------------------------------------

    /// Starts a seasonal event now, applying any instant effect.
    pub fn trigger_event(&mut self, event: SeasonalEvent) {
        self.environment.trigger_event(event);
        self.apply_event_effects(event);
    }

    pub fn claim_territory(&mut self, group: GroupId, x: f32, y: f32, z: f32) -> SimResult<ClaimOutcome> {
        self.require_active(group)?;
        self.territory
            .claim(Vec3::new(x, y, z), group, self.time)
    }

    /// Pushes the border conflict between two groups toward `favoring`.
    pub fn apply_border_pressure(
        &mut self,
        favoring: GroupId,
        against: GroupId,
        amount: f32,
    ) -> Option<CellTransfer> {
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }
        self.territory.apply_pressure(favoring, against, amount)
    }

    fn require_active(&self, group: GroupId) -> SimResult<()> {
        if self.tribes.is_active(group) {
            Ok(())
        } else {
            Err(SimError::invalid("group", group))
        }
    }
}
