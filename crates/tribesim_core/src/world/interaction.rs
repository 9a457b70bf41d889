use super::{WarHits, World};
use crate::diplomacy::Diplomacy;
use crate::organisms::Organisms;
use tribesim_data::{DeathCause, Disease, GroupId, OrganismKind};

/// Who eats and who hunts whom.
pub trait DietLogic {
    /// Whether `self` feeds on `prey`.
    fn eats(&self, prey: OrganismKind) -> bool;
    /// Whether `self` attacks `prey` regardless of group politics.
    fn hunts(&self, prey: OrganismKind) -> bool;
}

impl DietLogic for OrganismKind {
    fn eats(&self, prey: OrganismKind) -> bool {
        matches!(
            (self, prey),
            (OrganismKind::Herbivore, OrganismKind::Plant)
                | (OrganismKind::Carnivore, OrganismKind::Herbivore)
                | (OrganismKind::Carnivore, OrganismKind::Tribal)
                | (OrganismKind::Tribal, OrganismKind::Plant)
                | (OrganismKind::Tribal, OrganismKind::Herbivore)
        )
    }

    fn hunts(&self, prey: OrganismKind) -> bool {
        matches!(
            (self, prey),
            (OrganismKind::Carnivore, OrganismKind::Herbivore)
                | (OrganismKind::Carnivore, OrganismKind::Tribal)
                | (OrganismKind::Tribal, OrganismKind::Carnivore)
        )
    }
}

/// Whether `attacker` would strike `target`. Tribal agents fight other
/// tribal agents only across groups that are at war or hostile.
pub(super) fn can_attack(
    organisms: &Organisms,
    diplomacy: &Diplomacy,
    attacker: usize,
    target: usize,
) -> bool {
    if attacker == target || !organisms.is_alive(target) {
        return false;
    }
    let kinds = organisms.kinds();
    let (a, t) = (kinds[attacker], kinds[target]);
    if a.hunts(t) {
        return true;
    }
    if a != OrganismKind::Tribal || t != OrganismKind::Tribal {
        return false;
    }
    let groups = organisms.groups();
    match (groups[attacker], groups[target]) {
        (Some(ga), Some(gt)) if ga != gt => {
            diplomacy.is_at_war(ga, gt) || diplomacy.is_hostile(ga, gt)
        }
        _ => false,
    }
}

fn nearest<F>(organisms: &Organisms, slot: usize, candidates: &[usize], mut accept: F) -> Option<usize>
where
    F: FnMut(usize) -> bool,
{
    let origin = organisms.positions()[slot];
    candidates
        .iter()
        .copied()
        .filter(|&other| other != slot && organisms.is_alive(other) && accept(other))
        .map(|other| (other, organisms.positions()[other].distance_sq(origin)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(other, _)| other)
}

impl World {
    /// Eating and combat for every organism whose eat or attack flag is set,
    /// in slot order. Targets are the nearest valid neighbour within the
    /// interaction radius.
    pub(super) fn resolve_interactions(&mut self, dt: f32) {
        self.war_hits.clear();
        let radius = self.config.world.interaction_radius;
        let mut neighbors = std::mem::take(&mut self.neighbors);

        for slot in 0..self.organisms.len() {
            if !self.organisms.is_alive(slot) {
                continue;
            }
            let eating = self.organisms.eating()[slot];
            let attacking = self.organisms.attacking()[slot];
            if !eating && !attacking {
                continue;
            }
            self.grid
                .query_radius(self.organisms.positions()[slot], radius, &mut neighbors);

            if eating {
                let kinds = self.organisms.kinds();
                let kind = kinds[slot];
                let prey = nearest(&self.organisms, slot, &neighbors, |o| kind.eats(kinds[o]));
                if let Some(prey) = prey {
                    self.eat(slot, prey, dt);
                }
            }
            if attacking && self.organisms.is_alive(slot) {
                let (organisms, diplomacy) = (&self.organisms, &self.diplomacy);
                let target =
                    nearest(organisms, slot, &neighbors, |o| can_attack(organisms, diplomacy, slot, o));
                match target {
                    Some(target) => self.attack(slot, target, dt),
                    None => self.raid(slot, radius, dt),
                }
            }
        }

        self.neighbors = neighbors;
        self.settle_battles();
    }

    /// Moves `eat_rate × dt` from prey to eater, capped by what the prey has
    /// left and by the eater's room. Returns the amount moved.
    pub(super) fn eat(&mut self, eater: usize, prey: usize, dt: f32) -> f32 {
        let kinds = self.organisms.kinds();
        let (eater_kind, prey_kind) = (kinds[eater], kinds[prey]);
        let cfg = self.organisms.config().kind(eater_kind);
        let room = cfg.max_energy - self.organisms.energies()[eater];
        let available = if prey_kind == OrganismKind::Plant {
            self.organisms.energies()[prey]
        } else {
            self.organisms.healths()[prey]
        };
        let amount = (cfg.eat_rate * dt).min(available.max(0.0)).min(room);
        if amount <= 0.0 {
            return 0.0;
        }

        let taken = if prey_kind == OrganismKind::Plant {
            self.organisms
                .drain_energy(prey, amount, DeathCause::Predation)
        } else {
            self.organisms.damage(prey, amount, DeathCause::Predation)
        };
        self.organisms.feed(eater, taken);

        let prey_sick = self
            .population
            .state(prey)
            .is_some_and(|s| s.disease != Disease::None);
        if prey_sick {
            self.population
                .maybe_food_poisoning(eater, dt, &mut self.rng);
        }

        let depleted = if prey_kind == OrganismKind::Plant {
            self.organisms.energies()[prey] <= 0.0
        } else {
            self.organisms.healths()[prey] <= 0.0
        };
        if depleted {
            self.organisms.kill(prey, DeathCause::Predation);
        }
        taken
    }

    fn attack(&mut self, attacker: usize, target: usize, dt: f32) {
        let kind = self.organisms.kinds()[attacker];
        let attacker_group = self.organisms.groups()[attacker];
        let target_group = self.organisms.groups()[target];
        let combat = attacker_group.map_or(1.0, |g| self.technology.bonuses(g).combat);
        let equipment = f32::from(self.organisms.equipment()[attacker]);
        let damage = self.organisms.config().kind(kind).attack_damage
            * self.organisms.sizes()[attacker]
            * combat
            * (1.0 + 0.25 * equipment)
            * dt;
        let cause = if kind == OrganismKind::Carnivore {
            DeathCause::Predation
        } else {
            DeathCause::Combat
        };
        let dealt = self.organisms.damage(target, damage, cause);
        let killed = self.organisms.healths()[target] <= 0.0 && self.organisms.kill(target, cause);

        let (Some(a), Some(b)) = (attacker_group, target_group) else {
            return;
        };
        if a == b {
            return;
        }
        self.diplomacy
            .modify_reputation(b, a, -self.config.diplomacy.combat_reputation_hit * dt);
        if !self.diplomacy.is_at_war(a, b) {
            return;
        }
        self.record_hit(a, b, dealt);
        if killed {
            if let Some(resolution) = self.diplomacy.record_casualty(a, b, self.time) {
                tracing::debug!(winner = ?resolution.winner(), "war decided by casualties");
            }
        }
    }

    /// A tribal attacker with no living target strikes the nearest
    /// structure of a group it is at war with.
    fn raid(&mut self, slot: usize, radius: f32, dt: f32) {
        let Some(group) = self.organisms.groups()[slot] else {
            return;
        };
        let position = self.organisms.positions()[slot];
        let Some(id) = self.structures.nearest_foreign(position, radius, group) else {
            return;
        };
        let Some(owner) = self.structures.get(id).map(|s| s.group) else {
            return;
        };
        if !self.diplomacy.is_at_war(group, owner) {
            return;
        }
        let kind = self.organisms.kinds()[slot];
        let combat = self.technology.bonuses(group).combat;
        let damage = self.organisms.config().kind(kind).attack_damage * combat * dt;
        if let Some(destroyed) = self.structures.damage(id, damage) {
            self.tribes.remove_structure(owner, id);
            tracing::debug!(%id, owner = %owner, raider = %group, kind = ?destroyed.kind, "structure destroyed");
        }
    }

    fn record_hit(&mut self, by: GroupId, on: GroupId, damage: f32) {
        let pos = self
            .war_hits
            .iter()
            .position(|h| (h.a == by && h.b == on) || (h.a == on && h.b == by));
        let pos = pos.unwrap_or_else(|| {
            self.war_hits.push(WarHits {
                a: by,
                b: on,
                hits: 0,
                damage_by_a: 0.0,
                damage_by_b: 0.0,
            });
            self.war_hits.len() - 1
        });
        let entry = &mut self.war_hits[pos];
        entry.hits += 1;
        if entry.a == by {
            entry.damage_by_a += damage;
        } else {
            entry.damage_by_b += damage;
        }
    }

    /// Pairs that traded at least three blows this tick fought a battle.
    fn settle_battles(&mut self) {
        for i in 0..self.war_hits.len() {
            let h = self.war_hits[i];
            if h.hits < 3 {
                continue;
            }
            let (winner, loser) = if h.damage_by_a >= h.damage_by_b {
                (h.a, h.b)
            } else {
                (h.b, h.a)
            };
            if let Some(resolution) = self.diplomacy.record_battle(winner, loser, self.time) {
                tracing::debug!(winner = ?resolution.winner(), "war decided by battles");
            }
        }
        self.war_hits.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::init(64, 7).expect("world")
    }

    #[test]
    fn test_diet_table() {
        assert!(OrganismKind::Herbivore.eats(OrganismKind::Plant));
        assert!(!OrganismKind::Herbivore.eats(OrganismKind::Herbivore));
        assert!(OrganismKind::Carnivore.eats(OrganismKind::Tribal));
        assert!(OrganismKind::Tribal.eats(OrganismKind::Herbivore));
        assert!(!OrganismKind::Plant.eats(OrganismKind::Plant));
        assert!(!OrganismKind::Herbivore.hunts(OrganismKind::Plant));
        assert!(OrganismKind::Tribal.hunts(OrganismKind::Carnivore));
    }

    #[test]
    fn test_eating_moves_energy_from_plant() {
        let mut world = world();
        let eater = world
            .spawn_organism(OrganismKind::Herbivore, 50.0, 5.0, 50.0, None)
            .expect("herbivore");
        let plant = world
            .spawn_organism(OrganismKind::Plant, 51.0, 5.0, 50.0, None)
            .expect("plant");
        let (e, p) = (eater.index(), plant.index());
        world.organisms.set_energy(e, 20.0);
        world.organisms.set_energy(p, 30.0);

        let moved = world.eat(e, p, 0.5);
        assert!(moved > 0.0);
        assert!((world.organisms.energies()[e] - (20.0 + moved)).abs() < 1e-4);
        assert!((world.organisms.energies()[p] - (30.0 - moved)).abs() < 1e-4);
    }

    #[test]
    fn test_tribal_war_gates_attacks() {
        let mut world = world();
        let g1 = world.create_group().expect("g1");
        let g2 = world.create_group().expect("g2");
        let a = world
            .spawn_organism(OrganismKind::Tribal, 10.0, 5.0, 10.0, Some(g1))
            .expect("a")
            .index();
        let b = world
            .spawn_organism(OrganismKind::Tribal, 11.0, 5.0, 10.0, Some(g2))
            .expect("b")
            .index();
        assert!(!can_attack(&world.organisms, &world.diplomacy, a, b));
        world.declare_war(g1, g2).expect("war");
        assert!(can_attack(&world.organisms, &world.diplomacy, a, b));
        assert!(can_attack(&world.organisms, &world.diplomacy, b, a));
    }
}
