use super::interaction::can_attack;
use super::{Message, World};
use crate::brain::{output, BrainOutputs};
use crate::error::{SimError, SimResult};
use crate::math::{unit, Vec3};
use crate::structures::{kind_from_output, StructureLogic};
use crate::territory::TerrainLogic;
use tribesim_data::{DeathCause, GroupId, OrganismKind, ResourceKind, StructureId, StructureKind};

const EAT_THRESHOLD: f32 = 0.0;
const ATTACK_THRESHOLD: f32 = 0.3;
const BUILD_THRESHOLD: f32 = 0.8;
const MESSAGE_THRESHOLD: f32 = 0.7;
const REPRODUCE_THRESHOLD: f32 = 0.5;
const FLEE_THRESHOLD: f32 = 0.5;
const GATHER_THRESHOLD: f32 = 0.4;
const SHARE_THRESHOLD: f32 = 0.6;
const RECRUIT_THRESHOLD: f32 = 0.7;

/// Donate above this fraction of max energy, withdraw below the other.
const SHARE_DONATE_ABOVE: f32 = 0.6;
const SHARE_WITHDRAW_BELOW: f32 = 0.3;

impl World {
    /// Applies every decision in slot order.
    pub(super) fn apply_actions(&mut self, dt: f32) {
        let decisions = std::mem::take(&mut self.decisions);
        for d in &decisions {
            if !self.organisms.is_alive(d.slot) {
                continue;
            }
            self.steer(d.slot, &d.outputs);
            if self.organisms.kinds()[d.slot] == OrganismKind::Tribal {
                self.tribal_actions(d.slot, &d.outputs, dt);
            }
        }
        self.decisions = decisions;
    }

    fn steer(&mut self, slot: usize, out: &BrainOutputs) {
        let kind = self.organisms.kinds()[slot];
        let cfg = self.organisms.config().kind(kind);
        let (max_speed, attack_damage) = (cfg.max_speed, cfg.attack_damage);
        let energy = self.organisms.energies()[slot];
        let position = self.organisms.positions()[slot];

        let mut direction = Vec3::new(out[output::MOVE_X], out[output::MOVE_Y], out[output::MOVE_Z]);
        if out[output::FLEE] > FLEE_THRESHOLD {
            if let Some(away) = self.escape_direction(slot, position) {
                direction = away;
            }
        }
        let speed = unit(out[output::SPEED])
            * max_speed
            * self.population.movement_multiplier(slot, energy);
        self.organisms
            .set_velocity(slot, direction.normalized() * speed);

        let eating = out[output::EAT] > EAT_THRESHOLD;
        let attacking = out[output::ATTACK] > ATTACK_THRESHOLD && attack_damage > 0.0;
        self.organisms.set_flags(slot, eating, attacking);

        if let Some(flag) = self.reproduce_intent.get_mut(slot) {
            *flag = out[output::REPRODUCE] > REPRODUCE_THRESHOLD;
        }
    }

    /// Unit vector pointing away from the centroid of perceived threats.
    fn escape_direction(&self, slot: usize, position: Vec3) -> Option<Vec3> {
        let radius = self.config.world.perception_radius;
        let (organisms, diplomacy) = (&self.organisms, &self.diplomacy);
        let mut sum = Vec3::ZERO;
        let mut n = 0u32;
        self.grid.for_each_in_radius(position, radius, |other, p| {
            if can_attack(organisms, diplomacy, other, slot) {
                sum += p;
                n += 1;
            }
        });
        if n == 0 {
            return None;
        }
        let away = position - sum * (1.0 / n as f32);
        (away.length_sq() > f32::EPSILON).then(|| away.normalized())
    }

    fn tribal_actions(&mut self, slot: usize, out: &BrainOutputs, dt: f32) {
        let Some(group) = self.organisms.groups()[slot] else {
            return;
        };
        let position = self.organisms.positions()[slot];

        if out[output::BUILD] > BUILD_THRESHOLD {
            let kind = kind_from_output(out[output::BUILD_KIND]);
            let heading = Vec3::new(out[output::MOVE_X], 0.0, out[output::MOVE_Z]).normalized();
            let distance = unit(out[output::BUILD_DISTANCE]) * self.config.tribe.max_build_distance;
            let site = (position + heading * distance).clamp(Vec3::ZERO, self.organisms.bounds());
            if let Err(err) = self.build_structure(group, kind, site) {
                tracing::trace!(%err, group = %group, kind = kind.label(), "build skipped");
            }
        }

        if out[output::MESSAGE] > MESSAGE_THRESHOLD {
            self.messages.push(Message {
                sender: self.organisms.id_of(slot),
                group: Some(group),
                symbols: [
                    (unit(out[output::SYMBOL_A]) * 255.0) as u8,
                    (unit(out[output::SYMBOL_B]) * 255.0) as u8,
                ],
                position,
                time: self.time,
            });
        }

        if out[output::GATHER] > GATHER_THRESHOLD {
            self.gather(slot, group, position, dt);
        }
        if out[output::SHARE] > SHARE_THRESHOLD {
            self.share(slot, group, dt);
        }
        if out[output::RECRUIT] > RECRUIT_THRESHOLD {
            self.recruit(group, position);
        }
    }

    /// Places a structure for `group`, paying its cost from the group's
    /// stockpile (discounted by build speed). Nothing changes on failure.
    /// The territory cell under a new structure is claimed for its owner.
    pub fn build_structure(
        &mut self,
        group: GroupId,
        kind: StructureKind,
        position: Vec3,
    ) -> SimResult<StructureId> {
        if !self.tribes.is_active(group) {
            return Err(SimError::invalid("group", group));
        }
        let build_speed = self.technology.bonuses(group).build_speed;
        let cost = kind.cost().scaled(1.0 / build_speed);
        if !self.tribes.has_resources(group, &cost) {
            return Err(SimError::InsufficientResources);
        }
        let per_group = self
            .tribes
            .get(group)
            .map_or(0, |t| t.structures().len());
        if per_group >= self.config.tribe.max_structures_per_group {
            return Err(SimError::capacity("group structures"));
        }

        let id = self.structures.place(kind, group, position, self.time)?;
        if let Err(err) = self.tribes.add_structure(group, id) {
            self.structures.remove(id);
            return Err(err);
        }
        if let Err(err) = self.tribes.consume_bundle(group, &cost) {
            self.tribes.remove_structure(group, id);
            self.structures.remove(id);
            return Err(err);
        }
        if let Err(err) = self.territory.claim(position, group, self.time) {
            tracing::trace!(%err, "structure site not claimed");
        }
        tracing::debug!(%id, group = %group, kind = kind.label(), "structure built");
        Ok(id)
    }

    fn gather(&mut self, slot: usize, group: GroupId, position: Vec3, dt: f32) {
        let Some(terrain) = self.territory.terrain_at(position) else {
            return;
        };
        let rate = self.config.tribe.gather_rate * self.technology.bonuses(group).gather * dt;
        self.tribes
            .add_bundle(group, &terrain.yields().scaled(rate));
        self.organisms.drain_energy(
            slot,
            self.config.tribe.gather_energy_cost * dt,
            DeathCause::Starvation,
        );
    }

    /// Well-fed members turn energy into group food; hungry ones draw on it.
    fn share(&mut self, slot: usize, group: GroupId, dt: f32) {
        let kind = self.organisms.kinds()[slot];
        let max = self.organisms.config().kind(kind).max_energy;
        let energy = self.organisms.energies()[slot];
        let amount = self.config.tribe.share_amount * dt;
        if energy > max * SHARE_DONATE_ABOVE {
            let given = self
                .organisms
                .drain_energy(slot, amount, DeathCause::Starvation);
            self.tribes.add_resource(group, ResourceKind::Food, given);
        } else if energy < max * SHARE_WITHDRAW_BELOW
            && self.tribes.consume_resource(group, ResourceKind::Food, amount)
        {
            self.organisms.feed(slot, amount);
        }
    }

    /// Brings the nearest groupless tribal agent into `group`.
    fn recruit(&mut self, group: GroupId, position: Vec3) {
        if self.tribes.member_count(group) >= self.config.tribe.max_members {
            return;
        }
        let radius = self.config.tribe.recruit_radius;
        let organisms = &self.organisms;
        let mut best: Option<(usize, f32)> = None;
        self.grid.for_each_in_radius(position, radius, |other, p| {
            if organisms.is_alive(other)
                && organisms.kinds()[other] == OrganismKind::Tribal
                && organisms.groups()[other].is_none()
            {
                let d2 = p.distance_sq(position);
                if best.map_or(true, |(_, b)| d2 < b) {
                    best = Some((other, d2));
                }
            }
        });
        let Some((recruit, _)) = best else {
            return;
        };
        let id = self.organisms.id_of(recruit);
        if self.tribes.add_member(group, id).is_ok() {
            self.organisms.set_group(recruit, Some(group));
            self.organisms
                .set_equipment(recruit, self.technology.equipment_tier(group));
            tracing::debug!(member = %id, group = %group, "recruited");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::BRAIN_OUTPUTS;

    fn tribe_world() -> (World, GroupId, usize) {
        let mut world = World::init(64, 3).expect("world");
        let group = world.create_group().expect("group");
        let slot = world
            .spawn_organism(OrganismKind::Tribal, 100.0, 5.0, 100.0, Some(group))
            .expect("member")
            .index();
        (world, group, slot)
    }

    #[test]
    fn test_build_pays_cost_and_claims_cell() {
        let (mut world, group, _) = tribe_world();
        world
            .give_resources(group, ResourceKind::Wood, 100.0)
            .expect("wood");
        let wood = world.tribes.resources(group).expect("stock").wood;
        let site = Vec3::new(100.0, 0.0, 100.0);

        let id = world
            .build_structure(group, StructureKind::Hut, site)
            .expect("hut");
        assert_eq!(world.structures.get(id).map(|s| s.group), Some(group));
        let after = world.tribes.resources(group).expect("stock").wood;
        assert!((wood - after - StructureKind::Hut.cost().wood).abs() < 1e-3);
        assert_eq!(world.territory.owner_at(site), Some(group));
    }

    #[test]
    fn test_build_without_resources_changes_nothing() {
        let (mut world, group, _) = tribe_world();
        let before = world.tribes.resources(group).expect("stock");
        let err = world
            .build_structure(group, StructureKind::Workshop, Vec3::new(10.0, 0.0, 10.0))
            .unwrap_err();
        assert_eq!(err, SimError::InsufficientResources);
        assert_eq!(world.structures.count(), 0);
        assert_eq!(world.tribes.resources(group), Some(before));
    }

    #[test]
    fn test_zero_outputs_stand_still() {
        let (mut world, _, slot) = tribe_world();
        let out = [0.0; BRAIN_OUTPUTS];
        world.steer(slot, &out);
        assert_eq!(world.organisms.velocities()[slot], Vec3::ZERO);
        assert!(!world.organisms.eating()[slot]);
        assert!(!world.reproduce_intent[slot]);
    }

    #[test]
    fn test_recruit_adopts_nearest_loner() {
        let (mut world, group, _) = tribe_world();
        let loner = world
            .spawn_organism(OrganismKind::Tribal, 101.0, 5.0, 100.0, None)
            .expect("loner")
            .index();
        world.rebuild_grid();
        world.recruit(group, Vec3::new(100.0, 5.0, 100.0));
        assert_eq!(world.organisms.groups()[loner], Some(group));
        assert_eq!(world.tribes.member_count(group), 2);
    }

    #[test]
    fn test_message_lands_in_log() {
        let (mut world, _, slot) = tribe_world();
        let mut out = [0.0; BRAIN_OUTPUTS];
        out[output::MESSAGE] = 0.9;
        out[output::SYMBOL_A] = 1.0;
        out[output::SYMBOL_B] = -1.0;
        world.tribal_actions(slot, &out, 0.1);
        let m = world.messages.iter().last().copied().expect("message");
        assert_eq!(m.symbols, [255, 0]);
        assert_eq!(m.sender, world.organisms.id_of(slot));
    }
}
