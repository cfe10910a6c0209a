use crate::models::TeamStrength;
use std::collections::HashMap;

// (name, attack, defence) relative to league average; defence above 1.0 concedes more
const BUILTIN_TEAMS: &[(&str, f64, f64)] = &[
    // Premier League
    ("Arsenal", 1.35, 0.70),
    ("Aston Villa", 1.15, 1.00),
    ("Bournemouth", 1.00, 1.05),
    ("Brentford", 1.05, 1.10),
    ("Brighton", 1.10, 1.05),
    ("Chelsea", 1.20, 0.95),
    ("Crystal Palace", 0.95, 0.95),
    ("Everton", 0.80, 1.00),
    ("Fulham", 0.95, 1.00),
    ("Liverpool", 1.40, 0.75),
    ("Manchester City", 1.45, 0.75),
    ("Manchester United", 1.00, 1.05),
    ("Newcastle", 1.20, 0.90),
    ("Nottingham Forest", 0.95, 0.95),
    ("Tottenham", 1.15, 1.10),
    ("West Ham", 0.95, 1.15),
    ("Wolves", 0.90, 1.15),
    // La Liga
    ("Real Madrid", 1.45, 0.70),
    ("Barcelona", 1.50, 0.80),
    ("Atletico Madrid", 1.20, 0.70),
    ("Athletic Club", 1.10, 0.85),
    ("Villarreal", 1.10, 1.05),
    ("Real Sociedad", 0.95, 0.90),
    ("Sevilla", 0.90, 1.05),
    // Bundesliga
    ("Bayern Munich", 1.55, 0.75),
    ("Bayer Leverkusen", 1.35, 0.80),
    ("Borussia Dortmund", 1.25, 0.95),
    ("RB Leipzig", 1.20, 0.95),
    ("VfB Stuttgart", 1.15, 1.00),
    ("Eintracht Frankfurt", 1.10, 1.00),
    // Serie A
    ("Inter", 1.35, 0.70),
    ("Napoli", 1.20, 0.75),
    ("AC Milan", 1.20, 0.90),
    ("Juventus", 1.05, 0.75),
    ("Atalanta", 1.30, 0.90),
    ("AS Roma", 1.05, 0.90),
    // Ligue 1
    ("Paris Saint Germain", 1.50, 0.75),
    ("Marseille", 1.20, 0.95),
    ("Monaco", 1.20, 0.95),
    ("Lille", 1.05, 0.85),
    ("Lyon", 1.15, 1.00),
];

/// Immutable team lookup. Unknown teams resolve to neutral strength.
#[derive(Debug, Clone, Default)]
pub struct TeamStrengthTable {
    teams: HashMap<String, TeamStrength>,
}

impl TeamStrengthTable {
    pub fn new(teams: impl IntoIterator<Item = TeamStrength>) -> Self {
        Self {
            teams: teams
                .into_iter()
                .map(|team| (normalize_key(&team.name), team))
                .collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_TEAMS
                .iter()
                .map(|(name, attack, defence)| TeamStrength {
                    name: name.to_string(),
                    attack_strength: *attack,
                    defence_strength: *defence,
                }),
        )
    }

    /// Case-insensitive lookup with a neutral fallback
    pub fn lookup(&self, name: &str) -> TeamStrength {
        self.teams
            .get(&normalize_key(name))
            .cloned()
            .unwrap_or_else(|| TeamStrength::neutral(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.teams.contains_key(&normalize_key(name))
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

pub(crate) fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}
