use crate::models::{ExpectedGoals, LeagueConfig, TeamStrength};

/// Expected goals for each side of a fixture
///
/// home = avg goals × home attack × away defence × home advantage
/// away = avg goals × away attack × home defence
///
/// Only the home rate carries the home-advantage multiplier.
pub fn calculate_expected_goals(
    home: &TeamStrength,
    away: &TeamStrength,
    league: &LeagueConfig,
) -> ExpectedGoals {
    let home_rate = league.avg_league_goals
        * home.attack_strength
        * away.defence_strength
        * league.home_advantage_multiplier;
    let away_rate = league.avg_league_goals * away.attack_strength * home.defence_strength;

    ExpectedGoals {
        home: home_rate,
        away: away_rate,
    }
}
