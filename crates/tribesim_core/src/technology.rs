//! Per-group research over a fixed prerequisite DAG.

use crate::config::TechnologyConfig;
use crate::error::{SimError, SimResult};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tribesim_data::{Era, GroupId, Tech};

/// Multipliers derived from a group's owned techs. Every field starts at 1.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TechBonuses {
    pub gather: f32,
    pub combat: f32,
    pub research_speed: f32,
    pub build_speed: f32,
    pub birth_rate: f32,
    pub death_rate: f32,
}

impl TechBonuses {
    pub const BASE: TechBonuses = TechBonuses {
        gather: 1.0,
        combat: 1.0,
        research_speed: 1.0,
        build_speed: 1.0,
        birth_rate: 1.0,
        death_rate: 1.0,
    };

    const NONE: TechBonuses = TechBonuses {
        gather: 0.0,
        combat: 0.0,
        research_speed: 0.0,
        build_speed: 0.0,
        birth_rate: 0.0,
        death_rate: 0.0,
    };

    const FLOOR: f32 = 0.1;

    fn accumulate(&mut self, delta: &TechBonuses) {
        self.gather += delta.gather;
        self.combat += delta.combat;
        self.research_speed += delta.research_speed;
        self.build_speed += delta.build_speed;
        self.birth_rate += delta.birth_rate;
        self.death_rate += delta.death_rate;
    }

    fn floored(mut self) -> Self {
        for v in [
            &mut self.gather,
            &mut self.combat,
            &mut self.research_speed,
            &mut self.build_speed,
            &mut self.birth_rate,
            &mut self.death_rate,
        ] {
            *v = v.max(Self::FLOOR);
        }
        self
    }
}

impl Default for TechBonuses {
    fn default() -> Self {
        Self::BASE
    }
}

pub trait TechLogic {
    fn prerequisites(&self) -> &'static [Tech];
    fn era(&self) -> Era;
    /// Additive contribution to [`TechBonuses`].
    fn contribution(&self) -> TechBonuses;
    fn label(&self) -> &'static str;
}

impl TechLogic for Tech {
    fn prerequisites(&self) -> &'static [Tech] {
        use Tech::*;
        match self {
            Foraging | StoneTools | FireMaking | Shelter | Hunting => &[],
            Agriculture => &[Foraging],
            AnimalHusbandry => &[Hunting, Foraging],
            Pottery => &[FireMaking],
            Masonry => &[StoneTools, Shelter],
            BronzeWorking => &[FireMaking, StoneTools],
            Herbalism => &[Foraging],
            IronWorking => &[BronzeWorking],
            Writing => &[Pottery],
            Medicine => &[Herbalism, Writing],
            Fortification => &[Masonry, BronzeWorking],
            Currency => &[Writing, Pottery],
            Mathematics => &[Writing],
            Engineering => &[Mathematics, Masonry, IronWorking],
            Philosophy => &[Writing, Mathematics],
            Tactics => &[IronWorking, Fortification, Writing],
        }
    }

    fn era(&self) -> Era {
        use Tech::*;
        match self {
            Foraging | StoneTools | FireMaking | Shelter | Hunting => Era::Stone,
            Agriculture | AnimalHusbandry | Pottery | Masonry | BronzeWorking | Herbalism => {
                Era::Bronze
            }
            IronWorking | Writing | Medicine | Fortification | Currency => Era::Iron,
            Mathematics | Engineering | Philosophy | Tactics => Era::Classical,
        }
    }

    fn contribution(&self) -> TechBonuses {
        let n = TechBonuses::NONE;
        match self {
            Tech::Foraging => TechBonuses { gather: 0.1, ..n },
            Tech::StoneTools => TechBonuses {
                gather: 0.1,
                combat: 0.1,
                ..n
            },
            Tech::FireMaking => TechBonuses {
                birth_rate: 0.05,
                death_rate: -0.05,
                ..n
            },
            Tech::Shelter => TechBonuses {
                build_speed: 0.05,
                death_rate: -0.05,
                ..n
            },
            Tech::Hunting => TechBonuses {
                gather: 0.05,
                combat: 0.1,
                ..n
            },
            Tech::Agriculture => TechBonuses {
                gather: 0.2,
                birth_rate: 0.1,
                ..n
            },
            Tech::AnimalHusbandry => TechBonuses { gather: 0.1, ..n },
            Tech::Pottery => TechBonuses {
                build_speed: 0.1,
                ..n
            },
            Tech::Masonry => TechBonuses {
                build_speed: 0.2,
                ..n
            },
            Tech::BronzeWorking => TechBonuses {
                gather: 0.05,
                combat: 0.2,
                ..n
            },
            Tech::Herbalism => TechBonuses {
                death_rate: -0.1,
                ..n
            },
            Tech::IronWorking => TechBonuses {
                gather: 0.1,
                combat: 0.3,
                ..n
            },
            Tech::Writing => TechBonuses {
                research_speed: 0.25,
                ..n
            },
            Tech::Medicine => TechBonuses {
                birth_rate: 0.05,
                death_rate: -0.2,
                ..n
            },
            Tech::Fortification => TechBonuses {
                combat: 0.1,
                build_speed: 0.1,
                ..n
            },
            Tech::Currency => TechBonuses {
                gather: 0.1,
                research_speed: 0.05,
                ..n
            },
            Tech::Mathematics => TechBonuses {
                research_speed: 0.25,
                ..n
            },
            Tech::Engineering => TechBonuses {
                build_speed: 0.3,
                ..n
            },
            Tech::Philosophy => TechBonuses {
                research_speed: 0.3,
                ..n
            },
            Tech::Tactics => TechBonuses { combat: 0.3, ..n },
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Tech::Foraging => "Foraging",
            Tech::StoneTools => "Stone Tools",
            Tech::FireMaking => "Fire Making",
            Tech::Shelter => "Shelter",
            Tech::Hunting => "Hunting",
            Tech::Agriculture => "Agriculture",
            Tech::AnimalHusbandry => "Animal Husbandry",
            Tech::Pottery => "Pottery",
            Tech::Masonry => "Masonry",
            Tech::BronzeWorking => "Bronze Working",
            Tech::Herbalism => "Herbalism",
            Tech::IronWorking => "Iron Working",
            Tech::Writing => "Writing",
            Tech::Medicine => "Medicine",
            Tech::Fortification => "Fortification",
            Tech::Currency => "Currency",
            Tech::Mathematics => "Mathematics",
            Tech::Engineering => "Engineering",
            Tech::Philosophy => "Philosophy",
            Tech::Tactics => "Tactics",
        }
    }
}

/// The prerequisite graph, checked acyclic once at construction.
#[derive(Debug, Clone)]
pub struct TechTree {
    order: Vec<Tech>,
}

impl TechTree {
    pub fn build() -> SimResult<Self> {
        let mut graph = DiGraph::<Tech, ()>::with_capacity(Tech::COUNT, Tech::COUNT * 2);
        let nodes: Vec<_> = Tech::ALL.iter().map(|&t| graph.add_node(t)).collect();
        for tech in Tech::ALL {
            for pre in tech.prerequisites() {
                graph.add_edge(nodes[pre.index()], nodes[tech.index()], ());
            }
        }
        let sorted = toposort(&graph, None)
            .map_err(|_| SimError::PreconditionNotMet("technology prerequisites form a cycle"))?;
        Ok(Self {
            order: sorted.into_iter().map(|n| graph[n]).collect(),
        })
    }

    /// Every tech, prerequisites before dependants.
    #[must_use]
    pub fn order(&self) -> &[Tech] {
        &self.order
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResearchState {
    owned: u32,
    pub current: Option<Tech>,
    pub progress: f32,
    pub bonuses: TechBonuses,
    pub auto_research: bool,
}

impl Default for ResearchState {
    fn default() -> Self {
        Self {
            owned: 0,
            current: None,
            progress: 0.0,
            bonuses: TechBonuses::BASE,
            auto_research: true,
        }
    }
}

impl ResearchState {
    #[must_use]
    pub fn owns(&self, tech: Tech) -> bool {
        self.owned & tech.bit() != 0
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.owned.count_ones()
    }

    #[must_use]
    pub fn can_research(&self, tech: Tech) -> bool {
        !self.owns(tech) && tech.prerequisites().iter().all(|&p| self.owns(p))
    }

    fn recompute(&mut self) {
        let mut bonuses = TechBonuses::BASE;
        for tech in Tech::ALL.iter().filter(|&&t| self.owns(t)) {
            bonuses.accumulate(&tech.contribution());
        }
        self.bonuses = bonuses.floored();
    }

    fn own(&mut self, tech: Tech) {
        self.owned |= tech.bit();
        if self.current == Some(tech) {
            self.current = None;
            self.progress = 0.0;
        }
        self.recompute();
    }
}

#[derive(Debug, Clone)]
pub struct Technology {
    config: TechnologyConfig,
    tree: TechTree,
    states: Vec<ResearchState>,
}

impl Technology {
    pub fn new(max_groups: usize, config: TechnologyConfig) -> SimResult<Self> {
        Ok(Self {
            config,
            tree: TechTree::build()?,
            states: vec![ResearchState::default(); max_groups],
        })
    }

    #[must_use]
    pub fn tree(&self) -> &TechTree {
        &self.tree
    }

    #[must_use]
    pub fn state(&self, group: GroupId) -> Option<&ResearchState> {
        self.states.get(group.index())
    }

    fn state_mut(&mut self, group: GroupId) -> SimResult<&mut ResearchState> {
        self.states
            .get_mut(group.index())
            .ok_or_else(|| SimError::invalid("group", group))
    }

    #[must_use]
    pub fn cost(&self, tech: Tech) -> f32 {
        self.config.base_cost * (tech.era().index() + 1) as f32 * self.config.era_cost_scale
    }

    #[must_use]
    pub fn is_researched(&self, group: GroupId, tech: Tech) -> bool {
        self.state(group).is_some_and(|s| s.owns(tech))
    }

    #[must_use]
    pub fn can_research(&self, group: GroupId, tech: Tech) -> bool {
        self.state(group).is_some_and(|s| s.can_research(tech))
    }

    /// Selects `tech` as the group's current research. Progress on any
    /// previous selection is discarded.
    pub fn start_research(&mut self, group: GroupId, tech: Tech) -> SimResult<()> {
        let state = self.state_mut(group)?;
        if state.owns(tech) {
            return Err(SimError::PreconditionNotMet("technology already researched"));
        }
        if !state.can_research(tech) {
            return Err(SimError::PreconditionNotMet("technology prerequisites missing"));
        }
        if state.current != Some(tech) {
            state.current = Some(tech);
            state.progress = 0.0;
        }
        Ok(())
    }

    /// Grants `tech` outright, prerequisites or not.
    pub fn grant(&mut self, group: GroupId, tech: Tech) -> SimResult<()> {
        let state = self.state_mut(group)?;
        if state.owns(tech) {
            return Err(SimError::PreconditionNotMet("technology already researched"));
        }
        state.own(tech);
        tracing::info!(group = %group, tech = tech.label(), "technology granted");
        Ok(())
    }

    pub fn set_auto_research(&mut self, group: GroupId, enabled: bool) {
        if let Ok(state) = self.state_mut(group) {
            state.auto_research = enabled;
        }
    }

    /// Research points per second for a group of `members` plus workshop
    /// output.
    #[must_use]
    pub fn points_per_sec(&self, group: GroupId, members: usize, workshop_rate: f32) -> f32 {
        let speed = self.state(group).map_or(1.0, |s| s.bonuses.research_speed);
        self.config.points_per_member * members as f32 * speed + workshop_rate
    }

    /// Advances one group's research. Groups without a selection pick one
    /// uniformly among eligible techs when auto-research is on. Returns the
    /// tech completed this step, if any.
    pub fn update_group<R: Rng>(
        &mut self,
        group: GroupId,
        dt: f32,
        members: usize,
        workshop_rate: f32,
        rng: &mut R,
    ) -> Option<Tech> {
        let points = self.points_per_sec(group, members, workshop_rate) * dt;
        let state = self.states.get_mut(group.index())?;
        if state.current.is_none() && state.auto_research {
            let mut eligible = [Tech::Foraging; Tech::COUNT];
            let mut n = 0;
            for tech in Tech::ALL {
                if state.can_research(tech) {
                    eligible[n] = tech;
                    n += 1;
                }
            }
            if n > 0 {
                state.current = Some(eligible[rng.gen_range(0..n)]);
                state.progress = 0.0;
            }
        }

        let tech = state.current?;
        let cost = self.cost(tech);
        let state = self.states.get_mut(group.index())?;
        state.progress += points;
        if state.progress >= cost {
            state.own(tech);
            tracing::info!(group = %group, tech = tech.label(), level = state.level(), "technology researched");
            return Some(tech);
        }
        None
    }

    #[must_use]
    pub fn bonuses(&self, group: GroupId) -> TechBonuses {
        self.state(group).map_or(TechBonuses::BASE, |s| s.bonuses)
    }

    #[must_use]
    pub fn level(&self, group: GroupId) -> u32 {
        self.state(group).map_or(0, ResearchState::level)
    }

    /// Fraction `[0, 1]` of the current research, 0 when idle.
    #[must_use]
    pub fn progress(&self, group: GroupId) -> f32 {
        self.state(group)
            .and_then(|s| s.current.map(|t| (s.progress / self.cost(t)).min(1.0)))
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn current(&self, group: GroupId) -> Option<Tech> {
        self.state(group).and_then(|s| s.current)
    }

    /// Latest era among owned techs.
    #[must_use]
    pub fn era(&self, group: GroupId) -> Era {
        self.state(group)
            .and_then(|s| Tech::ALL.iter().filter(|&&t| s.owns(t)).map(|t| t.era()).max())
            .unwrap_or_default()
    }

    /// Tool tier carried by members: stone 1, bronze 2, iron 3.
    #[must_use]
    pub fn equipment_tier(&self, group: GroupId) -> u8 {
        let Some(s) = self.state(group) else {
            return 0;
        };
        if s.owns(Tech::IronWorking) {
            3
        } else if s.owns(Tech::BronzeWorking) {
            2
        } else if s.owns(Tech::StoneTools) {
            1
        } else {
            0
        }
    }

    pub fn clear(&mut self) {
        self.states.iter_mut().for_each(|s| *s = ResearchState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::XorShiftRng;

    const G: GroupId = GroupId(0);

    fn tech() -> Technology {
        Technology::new(2, TechnologyConfig::default()).unwrap()
    }

    #[test]
    fn test_tree_is_acyclic_and_ordered() {
        let tree = TechTree::build().unwrap();
        assert_eq!(tree.order().len(), Tech::COUNT);
        for (pos, tech) in tree.order().iter().enumerate() {
            for pre in tech.prerequisites() {
                let pre_pos = tree.order().iter().position(|t| t == pre).unwrap();
                assert!(pre_pos < pos, "{pre:?} must precede {tech:?}");
            }
        }
    }

    #[test]
    fn test_prerequisites_never_exceed_four_or_later_eras() {
        for tech in Tech::ALL {
            assert!(tech.prerequisites().len() <= 4);
            for pre in tech.prerequisites() {
                assert!(pre.era() <= tech.era());
            }
        }
    }

    #[test]
    fn test_start_research_gating() {
        let mut t = tech();
        assert!(t.start_research(G, Tech::Writing).is_err());
        t.grant(G, Tech::FireMaking).unwrap();
        t.grant(G, Tech::Pottery).unwrap();
        assert!(t.start_research(G, Tech::Writing).is_ok());
        assert_eq!(t.current(G), Some(Tech::Writing));
        assert!(t.start_research(G, Tech::Pottery).is_err());
    }

    #[test]
    fn test_cost_scales_with_era() {
        let t = tech();
        assert_eq!(t.cost(Tech::Foraging), 150.0);
        assert_eq!(t.cost(Tech::Tactics), 600.0);
    }

    #[test]
    fn test_update_completes_and_recomputes_bonuses() {
        let mut t = tech();
        let mut rng = XorShiftRng::new(1);
        t.start_research(G, Tech::Foraging).unwrap();
        // 10 members * 0.05 = 0.5 points/s, cost 150
        assert_eq!(t.update_group(G, 299.0, 10, 0.0, &mut rng), None);
        assert_eq!(t.update_group(G, 2.0, 10, 0.0, &mut rng), Some(Tech::Foraging));
        assert!(t.is_researched(G, Tech::Foraging));
        assert!((t.bonuses(G).gather - 1.1).abs() < 1e-6);
        assert_eq!(t.level(G), 1);
    }

    #[test]
    fn test_completion_threshold_follows_configured_cost() {
        let config = TechnologyConfig {
            base_cost: 10.0,
            era_cost_scale: 2.0,
            points_per_member: 1.0,
        };
        let mut t = Technology::new(1, config).unwrap();
        let mut rng = XorShiftRng::new(1);
        t.start_research(G, Tech::Foraging).unwrap();
        let cost = t.cost(Tech::Foraging);
        assert_eq!(cost, 20.0);
        assert_eq!(t.update_group(G, cost - 1.0, 1, 0.0, &mut rng), None);
        assert_eq!(t.update_group(G, 1.0, 1, 0.0, &mut rng), Some(Tech::Foraging));
    }

    #[test]
    fn test_auto_research_picks_eligible() {
        let mut t = tech();
        let mut rng = XorShiftRng::new(2);
        t.update_group(G, 0.1, 1, 0.0, &mut rng);
        let picked = t.current(G).unwrap();
        assert!(picked.prerequisites().is_empty());
    }

    #[test]
    fn test_bonus_recompute_is_idempotent_and_floored() {
        let mut t = tech();
        for tech in Tech::ALL {
            t.grant(G, tech).unwrap();
        }
        let b = t.bonuses(G);
        assert!(b.death_rate >= 0.1);
        let mut state = t.state(G).unwrap().clone();
        state.recompute();
        assert_eq!(state.bonuses, b);
        assert_eq!(t.era(G), Era::Classical);
        assert_eq!(t.equipment_tier(G), 3);
    }

    #[test]
    fn test_unknown_group_rejected() {
        let mut t = tech();
        assert!(matches!(
            t.start_research(GroupId(9), Tech::Foraging),
            Err(SimError::InvalidReference { .. })
        ));
    }
}
