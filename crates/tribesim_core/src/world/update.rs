use super::World;
use crate::error::{SimError, SimResult};
use crate::math::Vec3;
use crate::population::PopulationContext;
use crate::structures::StructureLogic;
use std::time::Instant;
use tribesim_data::{
    DeathCause, GroupId, OrganismKind, ResourceBundle, ResourceKind, SeasonalEvent, StructureKind,
    TradeOfferId,
};

impl World {
    /// Advances the simulation by `dt` seconds.
    ///
    /// One synchronous pass, always in this order:
    /// - environment clock, weather and events
    /// - spatial grid rebuild, then physics and metabolism
    /// - perception, inference and actions
    /// - eating and combat
    /// - group upkeep, structure production, diplomacy, research, territory
    /// - health, hunger, disease and births
    /// - plant and animal ecology
    /// - yield and diplomacy-AI cadences
    ///
    /// A non-finite or non-positive `dt` is ignored.
    pub fn update(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let started = Instant::now();
        self.tick += 1;
        self.time += dt;

        let env = self.environment.update(dt, &mut self.rng);
        if let Some(event) = env.started_event {
            self.apply_event_effects(event);
        }

        self.rebuild_grid();
        self.organisms.update(dt, self.environment.light_level());
        self.apply_weather(dt);
        self.drain_deaths();

        self.perceive();
        self.decide();
        self.apply_actions(dt);
        self.resolve_interactions(dt);
        self.drain_deaths();

        self.tribes.update(dt);
        self.produce(dt);
        self.diplomacy.update(dt, self.time);
        self.research(dt);
        for transfer in self.territory.update(dt) {
            tracing::debug!(cell = transfer.cell, from = ?transfer.from, to = %transfer.to, "contested cell lost");
        }

        self.snapshot_group_modifiers();
        {
            let mut ctx = PopulationContext {
                organisms: &mut self.organisms,
                grid: &self.grid,
                season: self.environment.season(),
                bonuses: &self.bonuses,
                huts: &self.huts,
                reproduce_intent: &self.reproduce_intent,
            };
            self.population.update(&mut ctx, dt, &mut self.rng);
        }
        self.drain_deaths();
        self.process_births();

        self.run_ecology(dt);
        self.drain_deaths();

        let yield_interval = self.territory.yield_interval_ticks();
        if yield_interval > 0 && self.tick % yield_interval == 0 {
            self.harvest_territory();
        }
        let ai_interval = self.diplomacy.ai_interval_ticks();
        if ai_interval > 0 && self.tick % ai_interval == 0 {
            self.run_diplomacy_ai();
        }

        if env.new_year {
            self.tribes.reset_yearly();
            self.population.reset_yearly();
        }

        self.metrics.record_tick(
            started.elapsed(),
            self.organisms.alive_count(),
            self.tribes.active_count(),
        );
    }

    pub(super) fn rebuild_grid(&mut self) {
        self.grid.clear();
        for slot in self.organisms.iter_alive() {
            self.grid.insert(slot, self.organisms.positions()[slot]);
        }
    }

    /// Instant effects of harvest and festival. Drought and blizzard act
    /// through [`World::apply_weather`] while they last.
    pub(super) fn apply_event_effects(&mut self, event: SeasonalEvent) {
        match event {
            SeasonalEvent::Harvest => {
                let food = self.environment.config().harvest_food;
                let active: Vec<GroupId> = self.tribes.active_ids().collect();
                for g in active {
                    self.tribes.add_resource(g, ResourceKind::Food, food);
                }
            }
            SeasonalEvent::Festival => {
                self.diplomacy
                    .shift_all_met(self.environment.config().festival_reputation);
            }
            SeasonalEvent::Drought | SeasonalEvent::Blizzard => {}
        }
    }

    fn apply_weather(&mut self, dt: f32) {
        let cfg = self.environment.config();
        let (blizzard, drought) = (self.environment.is_blizzard(), self.environment.is_drought());
        let (cold, wither) = (cfg.blizzard_energy_drain * dt, cfg.drought_plant_drain * dt);
        if !blizzard && !drought {
            return;
        }
        for slot in 0..self.organisms.len() {
            if !self.organisms.is_alive(slot) {
                continue;
            }
            let kind = self.organisms.kinds()[slot];
            if blizzard && kind.is_mobile() {
                self.organisms
                    .drain_energy(slot, cold, DeathCause::Starvation);
            } else if drought && kind == OrganismKind::Plant {
                self.organisms.drain_energy(slot, wither, DeathCause::Other);
            }
        }
    }

    /// Passive structure output goes straight to the owner's stockpile.
    fn produce(&mut self, dt: f32) {
        for s in self.structures.iter() {
            let output = s.kind.production();
            if !output.is_empty() {
                self.tribes.add_bundle(s.group, &output.scaled(dt));
            }
        }
    }

    fn research(&mut self, dt: f32) {
        let active: Vec<GroupId> = self.tribes.active_ids().collect();
        for g in active {
            let members = self.tribes.member_count(g);
            let workshop_rate: f32 = self
                .structures
                .iter()
                .filter(|s| s.group == g)
                .map(|s| s.kind.research_rate())
                .sum();
            if self
                .technology
                .update_group(g, dt, members, workshop_rate, &mut self.rng)
                .is_some()
            {
                self.refresh_equipment(g);
            }
        }
    }

    /// Re-equips every member of `group` after its tool tier may have changed.
    pub(super) fn refresh_equipment(&mut self, group: GroupId) {
        let tier = self.technology.equipment_tier(group);
        let Some(tribe) = self.tribes.get(group) else {
            return;
        };
        for &member in tribe.members() {
            if let Some(slot) = self.organisms.resolve(member) {
                self.organisms.set_equipment(slot, tier);
            }
        }
    }

    fn snapshot_group_modifiers(&mut self) {
        for (i, bonus) in self.bonuses.iter_mut().enumerate() {
            *bonus = self.technology.bonuses(GroupId(i as u16));
        }
        self.huts.iter_mut().for_each(|n| *n = 0);
        for s in self.structures.iter() {
            if s.kind == StructureKind::Hut {
                if let Some(n) = self.huts.get_mut(s.group.index()) {
                    *n += 1;
                }
            }
        }
    }

    /// Settles buffered deaths with the population counters, the group
    /// ledger and, for groups that just died out, territory and wars.
    pub(super) fn drain_deaths(&mut self) {
        let count = self.organisms.recent_deaths().len();
        for i in 0..count {
            let death = self.organisms.recent_deaths()[i];
            if death.kind.is_mobile() {
                self.population.on_death(death.id.index(), death.cause);
            }
            let Some(group) = death.group else {
                continue;
            };
            if !self.tribes.remove_member(group, death.id) {
                continue;
            }
            self.tribes.record_death(group);
            if !self.tribes.is_active(group) {
                self.retire_group(group);
            }
        }
        self.organisms.clear_deaths();
    }

    /// Releases an extinct group's land, withdraws its trade offers and ends
    /// its wars.
    fn retire_group(&mut self, group: GroupId) {
        self.territory.release(group);
        self.diplomacy.withdraw_offers(group);
        let enemies: Vec<GroupId> = self
            .diplomacy
            .wars()
            .iter()
            .filter_map(|w| {
                if w.attacker == group {
                    Some(w.defender)
                } else if w.defender == group {
                    Some(w.attacker)
                } else {
                    None
                }
            })
            .collect();
        for enemy in enemies {
            if let Err(err) = self.diplomacy.force_peace(group, enemy, self.time) {
                tracing::trace!(%err, "extinct group peace failed");
            }
        }
    }

    fn process_births(&mut self) {
        self.births.clear();
        self.births.extend(self.population.take_births());
        let births = std::mem::take(&mut self.births);
        for birth in &births {
            if let Err(err) = self.deliver(birth.parent, birth.group, birth.position) {
                tracing::trace!(%err, group = %birth.group, "birth failed");
            }
        }
        self.births = births;
    }

    fn deliver(&mut self, parent: usize, group: GroupId, position: Vec3) -> SimResult<()> {
        let radius = self.config.population.birth_radius;
        let site = self.scatter(position, radius);
        let child = self
            .spawn_member(OrganismKind::Tribal, site, Some(group))?
            .index();
        if self.organisms.is_alive(parent) {
            self.inherit_brain(parent, child);
            self.organisms.drain_energy(
                parent,
                self.config.population.birth_energy_cost,
                DeathCause::Starvation,
            );
            self.organisms
                .set_reproduction_cooldown(parent, self.config.population.birth_cooldown_secs);
        }
        self.tribes.record_birth(group);
        self.population.on_birth(parent, child);
        tracing::debug!(group = %group, child, "birth");
        Ok(())
    }

    /// Yield cadence: every grouped tribal agent claims the cell it stands
    /// on, owned cells pay out, and vassals pay tribute.
    fn harvest_territory(&mut self) {
        for slot in 0..self.organisms.len() {
            if !self.organisms.is_alive(slot) || self.organisms.kinds()[slot] != OrganismKind::Tribal {
                continue;
            }
            if let Some(group) = self.organisms.groups()[slot] {
                let position = self.organisms.positions()[slot];
                if let Err(err) = self.territory.claim(position, group, self.time) {
                    tracing::trace!(%err, "claim skipped");
                }
            }
        }

        let yields = self.territory.collect_yields();
        for (i, bundle) in yields.iter().enumerate() {
            if bundle.is_empty() {
                continue;
            }
            let g = GroupId(i as u16);
            let gather = self.technology.bonuses(g).gather;
            self.tribes.add_bundle(g, &bundle.scaled(gather));
        }

        let fraction = self.diplomacy.tribute_fraction();
        let pairs: Vec<(GroupId, GroupId)> = self.diplomacy.tribute_pairs().collect();
        for (overlord, vassal) in pairs {
            let Some(stock) = self.tribes.resources(vassal) else {
                continue;
            };
            let due = stock.food * fraction;
            if due > 0.0 && self.tribes.consume_resource(vassal, ResourceKind::Food, due) {
                self.tribes.add_resource(overlord, ResourceKind::Food, due);
            }
        }
    }

    fn run_diplomacy_ai(&mut self) {
        let active: Vec<(GroupId, ResourceBundle)> = self
            .tribes
            .iter()
            .filter(|t| t.active)
            .map(|t| (t.id, t.resources))
            .collect();
        let accepted = self.diplomacy.ai_decide(&active, self.time, &mut self.rng);
        for id in accepted {
            if let Err(err) = self.settle_trade(id) {
                tracing::trace!(%err, %id, "ai trade not settled");
            }
        }
    }

    /// Accepts an offer and moves both sides of it between stockpiles.
    /// Neither stockpile changes unless both groups are active and can pay.
    pub(super) fn settle_trade(&mut self, id: TradeOfferId) -> SimResult<()> {
        let (from, to) = self
            .diplomacy
            .trade_offers()
            .iter()
            .find(|o| o.id == id)
            .map(|o| (o.from, o.to))
            .ok_or_else(|| SimError::invalid("trade offer", id))?;
        for group in [from, to] {
            if !self.tribes.is_active(group) {
                self.diplomacy.reject_trade(id);
                return Err(SimError::invalid("group", group));
            }
        }
        let from_stock = self
            .tribes
            .resources(from)
            .ok_or_else(|| SimError::invalid("group", from))?;
        let to_stock = self
            .tribes
            .resources(to)
            .ok_or_else(|| SimError::invalid("group", to))?;
        let offer = self
            .diplomacy
            .accept_trade(id, self.time, &from_stock, &to_stock)?;
        self.tribes.consume_bundle(from, &offer.offered)?;
        self.tribes.consume_bundle(to, &offer.requested)?;
        self.tribes.add_bundle(to, &offer.offered);
        self.tribes.add_bundle(from, &offer.requested);
        tracing::debug!(%id, from = %from, to = %to, "trade settled");
        Ok(())
    }
}
