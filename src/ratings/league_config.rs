use super::team_strength::normalize_key;
use crate::models::LeagueConfig;
use std::collections::HashMap;

// (code, average goals per match, home advantage multiplier)
const BUILTIN_LEAGUES: &[(&str, f64, f64)] = &[
    ("EPL", 2.80, 1.10),
    ("LALIGA", 2.55, 1.12),
    ("BUNDESLIGA", 3.10, 1.08),
    ("SERIEA", 2.65, 1.10),
    ("LIGUE1", 2.60, 1.10),
];

/// Immutable league lookup. Unknown codes resolve to the default league context.
#[derive(Debug, Clone, Default)]
pub struct LeagueConfigTable {
    leagues: HashMap<String, LeagueConfig>,
}

impl LeagueConfigTable {
    pub fn new(leagues: impl IntoIterator<Item = LeagueConfig>) -> Self {
        Self {
            leagues: leagues
                .into_iter()
                .map(|league| (normalize_key(&league.league_code), league))
                .collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_LEAGUES
                .iter()
                .map(|(code, avg_goals, home_adv)| LeagueConfig {
                    league_code: code.to_string(),
                    avg_league_goals: *avg_goals,
                    home_advantage_multiplier: *home_adv,
                }),
        )
    }

    /// Case-insensitive lookup falling back to 2.5 goals and a 1.10 home multiplier
    pub fn lookup(&self, league_code: &str) -> LeagueConfig {
        self.leagues
            .get(&normalize_key(league_code))
            .cloned()
            .unwrap_or_else(|| LeagueConfig::fallback(league_code))
    }

    pub fn len(&self) -> usize {
        self.leagues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leagues.is_empty()
    }
}
