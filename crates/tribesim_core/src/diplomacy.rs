//! Inter-group relations: reputation matrix, treaties, wars and trade offers.
//!
//! Reputation is stored per ordered pair, so `reputation(a, b)` is how `a`
//! regards `b`. Any change initiated by `a` towards `b` lands in full on
//! `(a, b)` and at `counterpart_perception` strength on `(b, a)`.
//!
//! Status is derived on demand, in priority order: not yet met, at war,
//! allied by treaty, tribute relationship, then reputation bands.

use crate::config::DiplomacyConfig;
use crate::error::{SimError, SimResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tribesim_data::{
    DiplomaticStatus, GroupId, ResourceBundle, TradeOfferId, TreatyId, TreatyType, WarId,
    WarOutcome, WarReason,
};

pub const REPUTATION_MIN: f32 = -100.0;
pub const REPUTATION_MAX: f32 = 100.0;
pub const WAR_SCORE_LIMIT: f32 = 100.0;

pub trait TreatyLogic {
    /// Lifetime in seconds. `0` means until broken.
    fn duration_secs(&self) -> f32;
    fn label(&self) -> &'static str;
}

impl TreatyLogic for TreatyType {
    fn duration_secs(&self) -> f32 {
        match self {
            TreatyType::NonAggression => 600.0,
            TreatyType::Trade => 300.0,
            TreatyType::Tribute => 900.0,
            TreatyType::MilitaryAlliance | TreatyType::Border | TreatyType::Marriage => 0.0,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TreatyType::NonAggression => "non-aggression",
            TreatyType::Trade => "trade",
            TreatyType::MilitaryAlliance => "alliance",
            TreatyType::Tribute => "tribute",
            TreatyType::Border => "border",
            TreatyType::Marriage => "marriage",
        }
    }
}

/// Status band for a reputation value on its own.
#[must_use]
pub fn band_for(reputation: f32) -> DiplomaticStatus {
    if reputation < -60.0 {
        DiplomaticStatus::Hostile
    } else if reputation < -20.0 {
        DiplomaticStatus::Unfriendly
    } else if reputation <= 20.0 {
        DiplomaticStatus::Neutral
    } else if reputation <= 60.0 {
        DiplomaticStatus::Friendly
    } else {
        DiplomaticStatus::Allied
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Relation {
    pub reputation: f32,
    pub met: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Treaty {
    pub id: TreatyId,
    pub kind: TreatyType,
    /// For tribute, the overlord.
    pub a: GroupId,
    /// For tribute, the vassal.
    pub b: GroupId,
    pub signed_at: f32,
    pub duration: f32,
}

impl Treaty {
    #[must_use]
    pub fn involves(&self, x: GroupId, y: GroupId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    #[must_use]
    pub fn is_expired(&self, now: f32) -> bool {
        self.duration > 0.0 && now >= self.signed_at + self.duration
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct War {
    pub id: WarId,
    pub attacker: GroupId,
    pub defender: GroupId,
    pub reason: WarReason,
    /// Positive favours the attacker.
    pub score: f32,
    pub started_at: f32,
    pub attacker_casualties: u32,
    pub defender_casualties: u32,
    pub battles: u32,
}

impl War {
    #[must_use]
    pub fn involves(&self, x: GroupId, y: GroupId) -> bool {
        (self.attacker == x && self.defender == y) || (self.attacker == y && self.defender == x)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WarResolution {
    pub war: War,
    pub outcome: WarOutcome,
    pub ended_at: f32,
}

impl WarResolution {
    #[must_use]
    pub fn winner(&self) -> Option<GroupId> {
        match self.outcome {
            WarOutcome::AttackerVictory => Some(self.war.attacker),
            WarOutcome::DefenderVictory => Some(self.war.defender),
            WarOutcome::WhitePeace => None,
        }
    }

    #[must_use]
    pub fn loser(&self) -> Option<GroupId> {
        match self.outcome {
            WarOutcome::AttackerVictory => Some(self.war.defender),
            WarOutcome::DefenderVictory => Some(self.war.attacker),
            WarOutcome::WhitePeace => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TradeOffer {
    pub id: TradeOfferId,
    pub from: GroupId,
    pub to: GroupId,
    /// What `from` gives.
    pub offered: ResourceBundle,
    /// What `from` wants from `to`.
    pub requested: ResourceBundle,
    pub created_at: f32,
    pub expires_at: f32,
}

/// Cumulative diplomacy counters, exposed as telemetry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct DiplomacyStats {
    pub contacts: u32,
    pub wars_declared: u32,
    pub wars_ended: u32,
    pub treaties_signed: u32,
    pub treaties_broken: u32,
    pub treaties_expired: u32,
    pub trades_completed: u32,
    pub trades_failed: u32,
}

#[derive(Debug, Clone)]
pub struct Diplomacy {
    config: DiplomacyConfig,
    groups: usize,
    relations: Vec<Relation>,
    treaties: Vec<Treaty>,
    wars: Vec<War>,
    offers: Vec<TradeOffer>,
    next_treaty: u16,
    next_war: u16,
    next_offer: u16,
    decay_timer: f32,
    pub stats: DiplomacyStats,
}

impl Diplomacy {
    #[must_use]
    pub fn new(max_groups: usize, config: DiplomacyConfig) -> Self {
        Self {
            groups: max_groups,
            relations: vec![Relation::default(); max_groups * max_groups],
            treaties: Vec::with_capacity(config.max_treaties),
            wars: Vec::with_capacity(config.max_wars),
            offers: Vec::with_capacity(config.max_trade_offers),
            config,
            next_treaty: 0,
            next_war: 0,
            next_offer: 0,
            decay_timer: 0.0,
            stats: DiplomacyStats::default(),
        }
    }

    #[inline]
    fn idx(&self, a: GroupId, b: GroupId) -> Option<usize> {
        (a.index() < self.groups && b.index() < self.groups).then(|| a.index() * self.groups + b.index())
    }

    fn check_pair(&self, a: GroupId, b: GroupId) -> SimResult<()> {
        if a == b {
            return Err(SimError::PreconditionNotMet("a group cannot deal with itself"));
        }
        if a.index() >= self.groups {
            return Err(SimError::invalid("group", a));
        }
        if b.index() >= self.groups {
            return Err(SimError::invalid("group", b));
        }
        Ok(())
    }

    #[must_use]
    pub fn relation(&self, a: GroupId, b: GroupId) -> Relation {
        self.idx(a, b).map(|i| self.relations[i]).unwrap_or_default()
    }

    #[must_use]
    pub fn reputation(&self, a: GroupId, b: GroupId) -> f32 {
        self.relation(a, b).reputation
    }

    #[must_use]
    pub fn has_met(&self, a: GroupId, b: GroupId) -> bool {
        self.relation(a, b).met
    }

    /// Marks first contact in both directions. True only on the first call.
    pub fn meet(&mut self, a: GroupId, b: GroupId) -> bool {
        if self.check_pair(a, b).is_err() {
            return false;
        }
        let (Some(ab), Some(ba)) = (self.idx(a, b), self.idx(b, a)) else {
            return false;
        };
        if self.relations[ab].met {
            return false;
        }
        self.relations[ab].met = true;
        self.relations[ba].met = true;
        self.stats.contacts += 1;
        tracing::info!(a = %a, b = %b, "first contact");
        true
    }

    /// Shifts `a`'s view of `b` by `delta` and `b`'s view of `a` by the
    /// perceived fraction of it, both clamped to `[-100, 100]`.
    pub fn modify_reputation(&mut self, a: GroupId, b: GroupId, delta: f32) -> bool {
        if self.check_pair(a, b).is_err() || !delta.is_finite() {
            return false;
        }
        let (Some(ab), Some(ba)) = (self.idx(a, b), self.idx(b, a)) else {
            return false;
        };
        let perceived = delta * self.config.counterpart_perception;
        let r = &mut self.relations[ab].reputation;
        *r = (*r + delta).clamp(REPUTATION_MIN, REPUTATION_MAX);
        let r = &mut self.relations[ba].reputation;
        *r = (*r + perceived).clamp(REPUTATION_MIN, REPUTATION_MAX);
        true
    }

    /// Symmetric shift applied to every met pair (festivals and the like).
    pub fn shift_all_met(&mut self, delta: f32) {
        for rel in self.relations.iter_mut().filter(|r| r.met) {
            rel.reputation = (rel.reputation + delta).clamp(REPUTATION_MIN, REPUTATION_MAX);
        }
    }

    #[must_use]
    pub fn status(&self, a: GroupId, b: GroupId) -> DiplomaticStatus {
        if a == b {
            return DiplomaticStatus::Allied;
        }
        let rel = self.relation(a, b);
        if !rel.met {
            return DiplomaticStatus::Unknown;
        }
        if self.is_at_war(a, b) {
            return DiplomaticStatus::Hostile;
        }
        if self.has_treaty(a, b, TreatyType::MilitaryAlliance) {
            return DiplomaticStatus::Allied;
        }
        if let Some(t) = self
            .treaties
            .iter()
            .find(|t| t.kind == TreatyType::Tribute && t.involves(a, b))
        {
            return if t.a == a {
                DiplomaticStatus::Overlord
            } else {
                DiplomaticStatus::Vassal
            };
        }
        band_for(rel.reputation)
    }

    /// Whether `a` would attack members of `b` on sight.
    #[must_use]
    pub fn is_hostile(&self, a: GroupId, b: GroupId) -> bool {
        a != b
            && !self.has_treaty(a, b, TreatyType::NonAggression)
            && self.status(a, b) == DiplomaticStatus::Hostile
    }

    // ---------------------------------------------------------------------
    // Treaties
    // ---------------------------------------------------------------------

    fn alloc_treaty_id(&mut self) -> TreatyId {
        loop {
            let id = TreatyId(self.next_treaty);
            self.next_treaty = self.next_treaty.wrapping_add(1);
            if !self.treaties.iter().any(|t| t.id == id) {
                return id;
            }
        }
    }

    pub fn sign_treaty(
        &mut self,
        kind: TreatyType,
        a: GroupId,
        b: GroupId,
        now: f32,
    ) -> SimResult<TreatyId> {
        self.check_pair(a, b)?;
        if self.is_at_war(a, b) {
            return Err(SimError::PreconditionNotMet("cannot sign a treaty while at war"));
        }
        if self.has_treaty(a, b, kind) {
            return Err(SimError::PreconditionNotMet("treaty already in force"));
        }
        if self.treaties.len() >= self.config.max_treaties {
            return Err(SimError::capacity("treaties"));
        }
        self.meet(a, b);
        let id = self.alloc_treaty_id();
        self.treaties.push(Treaty {
            id,
            kind,
            a,
            b,
            signed_at: now,
            duration: kind.duration_secs(),
        });
        self.modify_reputation(a, b, self.config.treaty_signing_bonus);
        self.stats.treaties_signed += 1;
        tracing::info!(%id, a = %a, b = %b, kind = kind.label(), "treaty signed");
        Ok(id)
    }

    /// Removes a treaty early. The other party's view of `breaker` drops.
    pub fn break_treaty(&mut self, id: TreatyId, breaker: GroupId) -> SimResult<Treaty> {
        let pos = self
            .treaties
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| SimError::invalid("treaty", id))?;
        let t = &self.treaties[pos];
        let victim = if t.a == breaker {
            t.b
        } else if t.b == breaker {
            t.a
        } else {
            return Err(SimError::PreconditionNotMet("breaker is not a party to the treaty"));
        };
        let treaty = self.treaties.swap_remove(pos);
        self.modify_reputation(victim, breaker, -self.config.treaty_break_penalty);
        self.stats.treaties_broken += 1;
        tracing::info!(%id, breaker = %breaker, victim = %victim, "treaty broken");
        Ok(treaty)
    }

    #[must_use]
    pub fn has_treaty(&self, a: GroupId, b: GroupId, kind: TreatyType) -> bool {
        self.treaties.iter().any(|t| t.kind == kind && t.involves(a, b))
    }

    pub fn treaties_between(&self, a: GroupId, b: GroupId) -> impl Iterator<Item = &Treaty> {
        self.treaties.iter().filter(move |t| t.involves(a, b))
    }

    #[must_use]
    pub fn treaties(&self) -> &[Treaty] {
        &self.treaties
    }

    /// `(overlord, vassal)` for every tribute treaty in force.
    pub fn tribute_pairs(&self) -> impl Iterator<Item = (GroupId, GroupId)> + '_ {
        self.treaties
            .iter()
            .filter(|t| t.kind == TreatyType::Tribute)
            .map(|t| (t.a, t.b))
    }

    #[must_use]
    pub fn tribute_fraction(&self) -> f32 {
        self.config.tribute_fraction
    }

    // ---------------------------------------------------------------------
    // Wars
    // ---------------------------------------------------------------------

    fn alloc_war_id(&mut self) -> WarId {
        loop {
            let id = WarId(self.next_war);
            self.next_war = self.next_war.wrapping_add(1);
            if !self.wars.iter().any(|w| w.id == id) {
                return id;
            }
        }
    }

    /// Opens a war. Every treaty between the pair is voided and the
    /// attacker takes the declaration penalty.
    pub fn declare_war(
        &mut self,
        attacker: GroupId,
        defender: GroupId,
        reason: WarReason,
        now: f32,
    ) -> SimResult<WarId> {
        self.check_pair(attacker, defender)?;
        if self.is_at_war(attacker, defender) {
            return Err(SimError::PreconditionNotMet("already at war"));
        }
        if self.wars.len() >= self.config.max_wars {
            return Err(SimError::capacity("wars"));
        }
        self.meet(attacker, defender);
        self.treaties.retain(|t| !t.involves(attacker, defender));
        self.offers
            .retain(|o| !(o.from == attacker && o.to == defender || o.from == defender && o.to == attacker));
        self.modify_reputation(attacker, defender, -self.config.war_declaration_penalty);

        let id = self.alloc_war_id();
        self.wars.push(War {
            id,
            attacker,
            defender,
            reason,
            score: 0.0,
            started_at: now,
            attacker_casualties: 0,
            defender_casualties: 0,
            battles: 0,
        });
        self.stats.wars_declared += 1;
        tracing::info!(%id, attacker = %attacker, defender = %defender, ?reason, "war declared");
        Ok(id)
    }

    #[must_use]
    pub fn is_at_war(&self, a: GroupId, b: GroupId) -> bool {
        self.wars.iter().any(|w| w.involves(a, b))
    }

    #[must_use]
    pub fn war_between(&self, a: GroupId, b: GroupId) -> Option<&War> {
        self.wars.iter().find(|w| w.involves(a, b))
    }

    #[must_use]
    pub fn war(&self, id: WarId) -> Option<&War> {
        self.wars.iter().find(|w| w.id == id)
    }

    #[must_use]
    pub fn wars(&self) -> &[War] {
        &self.wars
    }

    /// `victim` lost a member to `killer`. Resolves the war if the score
    /// reached the surrender threshold.
    pub fn record_casualty(
        &mut self,
        killer: GroupId,
        victim: GroupId,
        now: f32,
    ) -> Option<WarResolution> {
        let step = self.config.casualty_score;
        let pos = self.wars.iter().position(|w| w.involves(killer, victim))?;
        let war = &mut self.wars[pos];
        if victim == war.defender {
            war.defender_casualties += 1;
            war.score = (war.score + step).min(WAR_SCORE_LIMIT);
        } else {
            war.attacker_casualties += 1;
            war.score = (war.score - step).max(-WAR_SCORE_LIMIT);
        }
        self.try_surrender(pos, now)
    }

    pub fn record_battle(
        &mut self,
        winner: GroupId,
        loser: GroupId,
        now: f32,
    ) -> Option<WarResolution> {
        let step = self.config.battle_score;
        let pos = self.wars.iter().position(|w| w.involves(winner, loser))?;
        let war = &mut self.wars[pos];
        war.battles += 1;
        if winner == war.attacker {
            war.score = (war.score + step).min(WAR_SCORE_LIMIT);
        } else {
            war.score = (war.score - step).max(-WAR_SCORE_LIMIT);
        }
        self.try_surrender(pos, now)
    }

    fn try_surrender(&mut self, pos: usize, now: f32) -> Option<WarResolution> {
        let score = self.wars[pos].score;
        let outcome = if score >= self.config.surrender_score {
            WarOutcome::AttackerVictory
        } else if score <= -self.config.surrender_score {
            WarOutcome::DefenderVictory
        } else {
            return None;
        };
        Some(self.end_war(pos, outcome, now))
    }

    fn end_war(&mut self, pos: usize, outcome: WarOutcome, now: f32) -> WarResolution {
        let war = self.wars.swap_remove(pos);
        let resolution = WarResolution {
            war,
            outcome,
            ended_at: now,
        };
        let (a, b) = (resolution.war.attacker, resolution.war.defender);
        if let (Some(winner), Some(loser)) = (resolution.winner(), resolution.loser()) {
            if let Err(err) = self.sign_treaty(TreatyType::Tribute, winner, loser, now) {
                tracing::trace!(%err, "surrender tribute not signed");
            }
        }
        if let Err(err) = self.sign_treaty(TreatyType::NonAggression, a, b, now) {
            tracing::trace!(%err, "peace pact not signed");
        }
        self.stats.wars_ended += 1;
        tracing::info!(
            id = %resolution.war.id,
            attacker = %a,
            defender = %b,
            ?outcome,
            score = resolution.war.score,
            "war ended"
        );
        resolution
    }

    /// Ends the war between `a` and `b` as a white peace.
    pub fn force_peace(&mut self, a: GroupId, b: GroupId, now: f32) -> SimResult<WarResolution> {
        self.check_pair(a, b)?;
        let pos = self
            .wars
            .iter()
            .position(|w| w.involves(a, b))
            .ok_or(SimError::PreconditionNotMet("not at war"))?;
        Ok(self.end_war(pos, WarOutcome::WhitePeace, now))
    }

    // ---------------------------------------------------------------------
    // Trade
    // ---------------------------------------------------------------------

    fn alloc_offer_id(&mut self) -> TradeOfferId {
        loop {
            let id = TradeOfferId(self.next_offer);
            self.next_offer = self.next_offer.wrapping_add(1);
            if !self.offers.iter().any(|o| o.id == id) {
                return id;
            }
        }
    }

    pub fn create_trade_offer(
        &mut self,
        from: GroupId,
        to: GroupId,
        offered: ResourceBundle,
        requested: ResourceBundle,
        now: f32,
    ) -> SimResult<TradeOfferId> {
        self.check_pair(from, to)?;
        if self.is_at_war(from, to) {
            return Err(SimError::PreconditionNotMet("cannot trade while at war"));
        }
        if self.offers.len() >= self.config.max_trade_offers {
            return Err(SimError::capacity("trade offers"));
        }
        let id = self.alloc_offer_id();
        self.offers.push(TradeOffer {
            id,
            from,
            to,
            offered,
            requested,
            created_at: now,
            expires_at: now + self.config.trade_offer_expiry_secs,
        });
        Ok(id)
    }

    /// Closes an offer as accepted, given both parties' current stockpiles.
    ///
    /// The offer is consumed either way: an expired offer or one that either
    /// side can no longer pay for is dropped and reported as an error. The
    /// caller moves the resources on success.
    pub fn accept_trade(
        &mut self,
        id: TradeOfferId,
        now: f32,
        from_stock: &ResourceBundle,
        to_stock: &ResourceBundle,
    ) -> SimResult<TradeOffer> {
        let pos = self
            .offers
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| SimError::invalid("trade offer", id))?;
        let offer = self.offers.swap_remove(pos);
        if now >= offer.expires_at {
            self.stats.trades_failed += 1;
            return Err(SimError::PreconditionNotMet("trade offer expired"));
        }
        if !from_stock.covers(&offer.offered) || !to_stock.covers(&offer.requested) {
            self.stats.trades_failed += 1;
            return Err(SimError::InsufficientResources);
        }
        self.meet(offer.from, offer.to);
        self.modify_reputation(offer.to, offer.from, self.config.treaty_signing_bonus);
        self.stats.trades_completed += 1;
        Ok(offer)
    }

    pub fn reject_trade(&mut self, id: TradeOfferId) -> bool {
        match self.offers.iter().position(|o| o.id == id) {
            Some(pos) => {
                self.offers.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    /// Drops every pending offer to or from `group`. Returns how many went.
    pub fn withdraw_offers(&mut self, group: GroupId) -> usize {
        let before = self.offers.len();
        self.offers.retain(|o| o.from != group && o.to != group);
        before - self.offers.len()
    }

    #[must_use]
    pub fn trade_offers(&self) -> &[TradeOffer] {
        &self.offers
    }

    // ---------------------------------------------------------------------
    // Time
    // ---------------------------------------------------------------------

    /// Expires treaties and offers, and drifts every met pair's reputation
    /// one step toward zero per elapsed decay interval.
    pub fn update(&mut self, dt: f32, now: f32) {
        let before = self.treaties.len();
        self.treaties.retain(|t| !t.is_expired(now));
        let expired = before - self.treaties.len();
        if expired > 0 {
            self.stats.treaties_expired += expired as u32;
            tracing::debug!(expired, "treaties expired");
        }
        self.offers.retain(|o| now < o.expires_at);

        self.decay_timer += dt;
        let step = self.config.decay_step;
        while self.decay_timer >= self.config.decay_interval_secs {
            self.decay_timer -= self.config.decay_interval_secs;
            for rel in self.relations.iter_mut().filter(|r| r.met) {
                rel.reputation = if rel.reputation > 0.0 {
                    (rel.reputation - step).max(0.0)
                } else {
                    (rel.reputation + step).min(0.0)
                };
            }
        }
    }

    #[must_use]
    pub fn ai_interval_ticks(&self) -> u64 {
        self.config.ai_interval_ticks
    }

    /// Autonomous decisions for every met pair of `active` groups: wars of
    /// hatred, peace after long wars, treaties between friends and trade
    /// offers from groups with surplus.
    ///
    /// Returns offers the AI wants accepted; the caller settles them through
    /// [`Diplomacy::accept_trade`] since that moves resources.
    pub fn ai_decide<R: Rng>(
        &mut self,
        active: &[(GroupId, ResourceBundle)],
        now: f32,
        rng: &mut R,
    ) -> Vec<TradeOfferId> {
        for (i, &(a, _)) in active.iter().enumerate() {
            for &(b, _) in &active[i + 1..] {
                if !self.has_met(a, b) {
                    continue;
                }
                self.ai_pair(a, b, now, rng);
            }
        }

        for &(from, stock) in active {
            if stock.food < 200.0 || stock.wood >= 20.0 {
                continue;
            }
            let partner = active.iter().find(|&&(to, _)| {
                to != from
                    && self.has_met(from, to)
                    && !self.is_at_war(from, to)
                    && self.reputation(from, to) >= 0.0
                    && !self.offers.iter().any(|o| o.from == from && o.to == to)
            });
            if let Some(&(to, _)) = partner {
                let offered = ResourceBundle::new(30.0, 0.0, 0.0, 0.0);
                let requested = ResourceBundle::new(0.0, 15.0, 0.0, 0.0);
                if let Err(err) = self.create_trade_offer(from, to, offered, requested, now) {
                    tracing::trace!(%err, "ai trade offer not created");
                }
            }
        }

        self.offers
            .iter()
            .filter(|o| {
                self.reputation(o.to, o.from) > 0.0
                    && active
                        .iter()
                        .find(|(g, _)| *g == o.to)
                        .is_some_and(|(_, stock)| stock.covers(&o.requested))
            })
            .map(|o| o.id)
            .collect()
    }

    fn ai_pair<R: Rng>(&mut self, a: GroupId, b: GroupId, now: f32, rng: &mut R) {
        if let Some(war) = self.war_between(a, b) {
            let long = now - war.started_at >= self.config.ai_peace_after_secs;
            if long && rng.gen::<f32>() < self.config.ai_peace_chance {
                if let Err(err) = self.force_peace(a, b, now) {
                    tracing::trace!(%err, "ai peace failed");
                }
            }
            return;
        }

        let rep = self.reputation(a, b).min(self.reputation(b, a));
        if rep < self.config.ai_war_threshold {
            if !self.has_treaty(a, b, TreatyType::NonAggression)
                && rng.gen::<f32>() < self.config.ai_war_chance
            {
                let (attacker, defender) = if self.reputation(a, b) <= self.reputation(b, a) {
                    (a, b)
                } else {
                    (b, a)
                };
                if let Err(err) = self.declare_war(attacker, defender, WarReason::Hatred, now) {
                    tracing::trace!(%err, "ai war declaration failed");
                }
            }
            return;
        }

        let wishes = [
            (20.0, TreatyType::NonAggression, 0.3),
            (40.0, TreatyType::Trade, 0.2),
            (60.0, TreatyType::MilitaryAlliance, 0.1),
        ];
        for (min_rep, kind, chance) in wishes {
            if rep > min_rep && !self.has_treaty(a, b, kind) && rng.gen::<f32>() < chance {
                if let Err(err) = self.sign_treaty(kind, a, b, now) {
                    tracing::trace!(%err, "ai treaty not signed");
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.relations.iter_mut().for_each(|r| *r = Relation::default());
        self.treaties.clear();
        self.wars.clear();
        self.offers.clear();
        self.decay_timer = 0.0;
        self.stats = DiplomacyStats::default();
    }
}
