//! Day/night cycle, seasons, weather and seasonal events.

use crate::config::EnvironmentConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use tribesim_data::{Season, SeasonalEvent, Weather};

pub trait SeasonLogic {
    /// Peak daylight as a fraction of summer noon.
    fn light_factor(&self) -> f32;
    /// Relative weights for `[Clear, Rain, Storm, Drought, Snow]`.
    fn weather_weights(&self) -> [u32; 5];
    /// Event this season produces when one starts on its own.
    fn natural_event(&self) -> SeasonalEvent;
}

impl SeasonLogic for Season {
    fn light_factor(&self) -> f32 {
        match self {
            Season::Spring => 0.9,
            Season::Summer => 1.0,
            Season::Autumn => 0.8,
            Season::Winter => 0.6,
        }
    }

    fn weather_weights(&self) -> [u32; 5] {
        match self {
            Season::Spring => [5, 4, 1, 0, 0],
            Season::Summer => [6, 2, 1, 1, 0],
            Season::Autumn => [4, 4, 2, 0, 0],
            Season::Winter => [4, 0, 2, 0, 4],
        }
    }

    fn natural_event(&self) -> SeasonalEvent {
        match self {
            Season::Spring => SeasonalEvent::Festival,
            Season::Summer => SeasonalEvent::Drought,
            Season::Autumn => SeasonalEvent::Harvest,
            Season::Winter => SeasonalEvent::Blizzard,
        }
    }
}

const WEATHER_ORDER: [Weather; 5] = [
    Weather::Clear,
    Weather::Rain,
    Weather::Storm,
    Weather::Drought,
    Weather::Snow,
];

fn weather_light(weather: Weather) -> f32 {
    match weather {
        Weather::Clear | Weather::Drought => 1.0,
        Weather::Rain => 0.8,
        Weather::Storm => 0.5,
        Weather::Snow => 0.7,
    }
}

/// What changed during one [`Environment::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvironmentTick {
    pub new_day: bool,
    pub new_season: bool,
    pub new_year: bool,
    /// An event that started on its own and still needs its effects applied.
    pub started_event: Option<SeasonalEvent>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Environment {
    config: EnvironmentConfig,
    season: Season,
    weather: Weather,
    day: u32,
    year: u32,
    day_secs: f32,
    event: Option<SeasonalEvent>,
    event_secs_left: f32,
}

impl Environment {
    #[must_use]
    pub fn new(config: EnvironmentConfig) -> Self {
        Self {
            config,
            season: Season::Spring,
            weather: Weather::Clear,
            day: 0,
            year: 0,
            day_secs: 0.0,
            event: None,
            event_secs_left: 0.0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    #[must_use]
    pub fn season(&self) -> Season {
        self.season
    }

    #[must_use]
    pub fn weather(&self) -> Weather {
        self.weather
    }

    /// Days elapsed since the world started.
    #[must_use]
    pub fn day(&self) -> u32 {
        self.day
    }

    #[must_use]
    pub fn year(&self) -> u32 {
        self.year
    }

    #[must_use]
    pub fn days_per_year(&self) -> u32 {
        self.config.days_per_season * 4
    }

    /// Fraction of the current day elapsed; `0` is midnight, `0.5` noon.
    #[must_use]
    pub fn day_phase(&self) -> f32 {
        (self.day_secs / self.config.day_length_secs).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn year_phase(&self) -> f32 {
        let days_per_year = self.days_per_year();
        let day_of_year = (self.day % days_per_year) as f32 + self.day_phase();
        day_of_year / days_per_year as f32
    }

    /// Daylight in `[0, 1]`.
    #[must_use]
    pub fn light_level(&self) -> f32 {
        let daylight = 0.5 - 0.5 * (TAU * self.day_phase()).cos();
        (daylight * self.season.light_factor() * weather_light(self.weather)).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn active_event(&self) -> Option<SeasonalEvent> {
        self.event
    }

    #[must_use]
    pub fn is_blizzard(&self) -> bool {
        self.event == Some(SeasonalEvent::Blizzard)
    }

    #[must_use]
    pub fn is_drought(&self) -> bool {
        self.event == Some(SeasonalEvent::Drought)
    }

    /// Starts `event`. Drought and blizzard override the weather for one day;
    /// harvest and festival are instantaneous and leave no lasting state here.
    pub fn trigger_event(&mut self, event: SeasonalEvent) {
        match event {
            SeasonalEvent::Drought => {
                self.weather = Weather::Drought;
                self.event = Some(event);
                self.event_secs_left = self.config.day_length_secs;
            }
            SeasonalEvent::Blizzard => {
                self.weather = Weather::Snow;
                self.event = Some(event);
                self.event_secs_left = self.config.day_length_secs;
            }
            SeasonalEvent::Harvest | SeasonalEvent::Festival => {}
        }
        tracing::info!(?event, day = self.day, "seasonal event");
    }

    pub fn update<R: Rng>(&mut self, dt: f32, rng: &mut R) -> EnvironmentTick {
        let mut tick = EnvironmentTick::default();

        if self.event.is_some() {
            self.event_secs_left -= dt;
            if self.event_secs_left <= 0.0 {
                self.event = None;
                self.event_secs_left = 0.0;
                self.weather = Weather::Clear;
            }
        }

        self.day_secs += dt;
        while self.day_secs >= self.config.day_length_secs {
            self.day_secs -= self.config.day_length_secs;
            self.advance_day(&mut tick, rng);
        }
        tick
    }

    fn advance_day<R: Rng>(&mut self, tick: &mut EnvironmentTick, rng: &mut R) {
        self.day += 1;
        tick.new_day = true;

        let season = Season::from_index(self.day / self.config.days_per_season);
        if season != self.season {
            self.season = season;
            tick.new_season = true;
            tracing::debug!(season = season.label(), day = self.day, "season changed");
        }
        let year = self.day / self.days_per_year();
        if year != self.year {
            self.year = year;
            tick.new_year = true;
            tracing::info!(year, "new year");
        }

        if self.event.is_none() {
            self.weather = self.roll_weather(rng);
            if rng.gen::<f32>() < self.config.random_event_chance {
                let event = self.season.natural_event();
                self.trigger_event(event);
                tick.started_event = Some(event);
            }
        }
    }

    fn roll_weather<R: Rng>(&self, rng: &mut R) -> Weather {
        let weights = self.season.weather_weights();
        let total: u32 = weights.iter().sum();
        let mut pick = rng.gen_range(0..total);
        for (weather, weight) in WEATHER_ORDER.iter().zip(weights) {
            if pick < weight {
                return *weather;
            }
            pick -= weight;
        }
        Weather::Clear
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.config.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::XorShiftRng;

    fn quiet() -> Environment {
        Environment::new(EnvironmentConfig {
            random_event_chance: 0.0,
            ..EnvironmentConfig::default()
        })
    }

    #[test]
    fn test_light_peaks_at_noon() {
        let mut env = quiet();
        let mut rng = XorShiftRng::new(1);
        assert!(env.light_level() < 1e-6);
        env.update(30.0, &mut rng);
        assert!((env.day_phase() - 0.5).abs() < 1e-6);
        assert!(env.light_level() > 0.4);
    }

    #[test]
    fn test_seasons_and_year_rollover() {
        let mut env = quiet();
        let mut rng = XorShiftRng::new(2);
        let mut seasons = 0;
        let mut years = 0;
        for _ in 0..(16 * 60) {
            let tick = env.update(1.0, &mut rng);
            seasons += usize::from(tick.new_season);
            years += usize::from(tick.new_year);
        }
        assert_eq!(env.day(), 16);
        assert_eq!(env.year(), 1);
        assert_eq!(env.season(), Season::Spring);
        assert_eq!(seasons, 4);
        assert_eq!(years, 1);
    }

    #[test]
    fn test_snow_only_in_winter() {
        let mut env = quiet();
        let mut rng = XorShiftRng::new(3);
        for _ in 0..(64 * 4) {
            env.update(15.0, &mut rng);
            if env.weather() == Weather::Snow {
                assert_eq!(env.season(), Season::Winter);
            }
        }
    }

    #[test]
    fn test_blizzard_locks_weather_for_a_day() {
        let mut env = quiet();
        let mut rng = XorShiftRng::new(4);
        env.trigger_event(SeasonalEvent::Blizzard);
        assert!(env.is_blizzard());
        assert_eq!(env.weather(), Weather::Snow);
        env.update(59.0, &mut rng);
        assert_eq!(env.weather(), Weather::Snow);
        env.update(2.0, &mut rng);
        assert!(!env.is_blizzard());
    }

    #[test]
    fn test_instant_events_leave_no_state() {
        let mut env = quiet();
        env.trigger_event(SeasonalEvent::Harvest);
        assert_eq!(env.active_event(), None);
    }
}
