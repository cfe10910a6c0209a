use crate::models::{
    BetRecommendation, Fixture, LeagueConfig, Market, MarketEdges, OddsQuote, TeamStrength,
};
use crate::ratings::Ratings;
use crate::utils::expected_goals::calculate_expected_goals;
use crate::utils::fair_odds::{calculate_edges, calculate_fair_odds};
use crate::utils::market_probability::{ScoreGrid, MAX_GOALS};

/// Minimum edge (model minus implied probability) for a market to be recommended
pub const DEFAULT_EDGE_THRESHOLD: f64 = 0.02;

/// Evaluate a fixture against a quote using ratings resolved from the injected tables
#[derive(Debug, Clone)]
pub struct BetRecommendationService {
    ratings: Ratings,
    edge_threshold: f64,
}

impl BetRecommendationService {
    pub fn new(ratings: Ratings) -> Self {
        Self {
            ratings,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
        }
    }

    pub fn with_edge_threshold(mut self, edge_threshold: f64) -> Self {
        self.edge_threshold = edge_threshold;
        self
    }

    pub fn edge_threshold(&self) -> f64 {
        self.edge_threshold
    }

    pub fn ratings(&self) -> &Ratings {
        &self.ratings
    }

    /// Look up both teams and the league (neutral defaults on a miss) and evaluate
    pub fn evaluate_fixture(&self, fixture: &Fixture, odds: &OddsQuote) -> BetRecommendation {
        let home = self.ratings.teams.lookup(&fixture.home_team);
        let away = self.ratings.teams.lookup(&fixture.away_team);
        let league = self.ratings.leagues.lookup(&fixture.league);

        evaluate(fixture, &home, &away, &league, odds, self.edge_threshold)
    }
}

/// Run the full pricing chain for one fixture and one bookmaker quote
pub fn evaluate(
    fixture: &Fixture,
    home: &TeamStrength,
    away: &TeamStrength,
    league: &LeagueConfig,
    odds: &OddsQuote,
    edge_threshold: f64,
) -> BetRecommendation {
    let expected_goals = calculate_expected_goals(home, away, league);
    let grid = ScoreGrid::new(expected_goals.home, expected_goals.away, MAX_GOALS);
    let probabilities = grid.market_probabilities();
    let fair_odds = calculate_fair_odds(&probabilities);
    let edges = calculate_edges(&probabilities, odds);
    let recommended_markets = recommended_markets(&edges, edge_threshold);

    tracing::debug!(
        home = %fixture.home_team,
        away = %fixture.away_team,
        lambda_home = expected_goals.home,
        lambda_away = expected_goals.away,
        picks = recommended_markets.len(),
        "Evaluated fixture"
    );

    BetRecommendation {
        fixture: fixture.clone(),
        odds: odds.clone(),
        probabilities,
        fair_odds,
        edges,
        expected_goals,
        most_likely_score: grid.most_likely(),
        recommended_markets,
    }
}

/// Markets whose edge exceeds `threshold`, best edge first.
/// Equal edges keep the fixed market order.
pub fn recommended_markets(edges: &MarketEdges, threshold: f64) -> Vec<Market> {
    let mut picks: Vec<(Market, f64)> = Market::ALL
        .iter()
        .map(|market| (*market, edges.get(*market)))
        .filter(|(_, edge)| *edge > threshold)
        .collect();

    // sort_by is stable
    picks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    picks.into_iter().map(|(market, _)| market).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratings::{LeagueConfigTable, TeamStrengthTable};
    use chrono::{TimeZone, Utc};

    fn fixture(league: &str, home: &str, away: &str) -> Fixture {
        Fixture {
            league: league.to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            kickoff: Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap(),
            external_id: Some(1),
        }
    }

    fn quote(home_win: f64, draw: f64, away_win: f64) -> OddsQuote {
        OddsQuote {
            bookmaker: Some("Test".to_string()),
            home_win: Some(home_win),
            draw: Some(draw),
            away_win: Some(away_win),
            under_2_5: Some(1.9),
            over_2_5: Some(1.9),
            btts_yes: Some(1.8),
            btts_no: Some(2.0),
        }
    }

    fn edges(values: [f64; 7]) -> MarketEdges {
        MarketEdges {
            home_win: values[0],
            draw: values[1],
            away_win: values[2],
            under_2_5: values[3],
            over_2_5: values[4],
            btts_yes: values[5],
            btts_no: values[6],
        }
    }

    #[test]
    fn test_unknown_team_and_league_fall_back_to_defaults() {
        let service = BetRecommendationService::new(Ratings::builtin());
        let rec = service.evaluate_fixture(
            &fixture("Unknown League", "Nowhere Town", "Elsewhere City"),
            &quote(2.0, 3.5, 3.5),
        );

        assert!((rec.expected_goals.home - 2.75).abs() < 1e-12);
        assert_eq!(rec.expected_goals.away, 2.5);
    }

    #[test]
    fn test_lookup_ignores_case() {
        let service = BetRecommendationService::new(Ratings::builtin());
        let odds = quote(2.0, 3.5, 3.5);
        let upper = service.evaluate_fixture(&fixture("EPL", "ARSENAL", "chelsea"), &odds);
        let proper = service.evaluate_fixture(&fixture("epl", "Arsenal", "Chelsea"), &odds);
        assert_eq!(upper.expected_goals, proper.expected_goals);
        // 2.80 * 1.35 * 0.95 * 1.10
        assert!((proper.expected_goals.home - 3.950_1).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_strict() {
        let picks =
            recommended_markets(&edges([0.02, 0.021, 0.0, -0.1, 0.5, 0.019, 0.03]), 0.02);
        assert_eq!(picks, vec![Market::Over2_5, Market::BttsNo, Market::Draw]);
    }

    #[test]
    fn test_equal_edges_keep_market_order() {
        let picks = recommended_markets(&edges([0.05, 0.0, 0.05, 0.05, 0.0, 0.1, 0.0]), 0.02);
        assert_eq!(
            picks,
            vec![Market::BttsYes, Market::HomeWin, Market::AwayWin, Market::Under2_5]
        );
    }

    #[test]
    fn test_small_edge_above_threshold_is_recommended() {
        // Model 50% against a 2.10 price is an edge of about 2.4 points
        let edge = 0.5 - 1.0 / 2.10;
        let picks = recommended_markets(&edges([edge, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]), 0.02);
        assert_eq!(picks, vec![Market::HomeWin]);
    }

    #[test]
    fn test_recommendations_are_filtered_and_sorted() {
        let service = BetRecommendationService::new(Ratings::builtin());
        // Long prices everywhere so several markets clear the threshold
        let rec = service.evaluate_fixture(
            &fixture("EPL", "Liverpool", "Everton"),
            &OddsQuote {
                bookmaker: None,
                home_win: Some(2.5),
                draw: Some(6.0),
                away_win: Some(9.0),
                under_2_5: Some(3.0),
                over_2_5: Some(1.5),
                btts_yes: Some(2.2),
                btts_no: Some(2.4),
            },
        );

        assert!(!rec.recommended_markets.is_empty());
        let chosen: Vec<f64> = rec
            .recommended_markets
            .iter()
            .map(|m| rec.edges.get(*m))
            .collect();
        assert!(chosen.iter().all(|edge| *edge > DEFAULT_EDGE_THRESHOLD));
        assert!(chosen.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(rec.recommended_labels()[0], rec.recommended_markets[0].label());
    }

    #[test]
    fn test_custom_threshold() {
        let service = BetRecommendationService::new(Ratings::builtin()).with_edge_threshold(1.0);
        assert_eq!(service.edge_threshold(), 1.0);
        let rec =
            service.evaluate_fixture(&fixture("EPL", "Arsenal", "Wolves"), &quote(1.5, 4.0, 7.0));
        assert!(rec.recommended_markets.is_empty());
    }

    #[test]
    fn test_swapping_sides_only_swaps_home_and_away_markets() {
        let league = LeagueConfig {
            league_code: "NEUTRAL".to_string(),
            avg_league_goals: 2.7,
            home_advantage_multiplier: 1.0,
        };
        let a = TeamStrength {
            name: "A".to_string(),
            attack_strength: 1.3,
            defence_strength: 0.85,
        };
        let b = TeamStrength {
            name: "B".to_string(),
            attack_strength: 0.9,
            defence_strength: 1.15,
        };
        let odds = quote(1.8, 3.6, 4.5);
        let swapped_odds = OddsQuote {
            home_win: odds.away_win,
            away_win: odds.home_win,
            ..odds.clone()
        };

        let forward = evaluate(&fixture("NEUTRAL", "A", "B"), &a, &b, &league, &odds, 0.02);
        let reverse = evaluate(
            &fixture("NEUTRAL", "B", "A"),
            &b,
            &a,
            &league,
            &swapped_odds,
            0.02,
        );

        let close = |x: f64, y: f64| (x - y).abs() < 1e-12;
        let (p, q) = (forward.probabilities, reverse.probabilities);
        assert!(close(p.home_win, q.away_win));
        assert!(close(p.away_win, q.home_win));
        assert!(close(p.draw, q.draw));
        assert!(close(p.under_2_5, q.under_2_5));
        assert!(close(p.over_2_5, q.over_2_5));
        assert!(close(p.btts_yes, q.btts_yes));
        assert!(close(p.btts_no, q.btts_no));
        assert!(close(forward.edges.home_win, reverse.edges.away_win));
        assert!(close(forward.edges.away_win, reverse.edges.home_win));
        assert!(close(forward.edges.draw, reverse.edges.draw));

        // With a home multiplier the mirror no longer holds
        let home_league = LeagueConfig {
            home_advantage_multiplier: 1.1,
            ..league
        };
        let forward = evaluate(&fixture("H", "A", "B"), &a, &b, &home_league, &odds, 0.02);
        let reverse = evaluate(
            &fixture("H", "B", "A"),
            &b,
            &a,
            &home_league,
            &swapped_odds,
            0.02,
        );
        assert!(!close(forward.probabilities.home_win, reverse.probabilities.away_win));
    }

    #[test]
    fn test_service_is_shareable_across_threads() {
        let service = BetRecommendationService::new(Ratings {
            teams: TeamStrengthTable::builtin(),
            leagues: LeagueConfigTable::builtin(),
        });
        let fixtures = [
            fixture("EPL", "Arsenal", "Chelsea"),
            fixture("LALIGA", "Barcelona", "Sevilla"),
            fixture("BUNDESLIGA", "Bayern Munich", "RB Leipzig"),
        ];

        let results: Vec<BetRecommendation> = std::thread::scope(|scope| {
            let handles: Vec<_> = fixtures
                .iter()
                .map(|f| {
                    let service = &service;
                    scope.spawn(move || service.evaluate_fixture(f, &quote(2.0, 3.5, 3.8)))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (rec, f) in results.iter().zip(fixtures.iter()) {
            let sequential = service.evaluate_fixture(f, &quote(2.0, 3.5, 3.8));
            assert_eq!(rec.probabilities, sequential.probabilities);
        }
    }
}
