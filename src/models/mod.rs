use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attack/defence modifiers for a team, relative to its league average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStrength {
    pub name: String,
    #[serde(default = "neutral_strength")]
    pub attack_strength: f64,
    #[serde(default = "neutral_strength")]
    pub defence_strength: f64,
}

impl TeamStrength {
    /// A team with no known modifiers (league-average attack and defence)
    pub fn neutral(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attack_strength: neutral_strength(),
            defence_strength: neutral_strength(),
        }
    }
}

fn neutral_strength() -> f64 {
    1.0
}

pub const DEFAULT_AVG_LEAGUE_GOALS: f64 = 2.5;
pub const DEFAULT_HOME_ADVANTAGE: f64 = 1.10;

/// Scoring context for a league
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueConfig {
    pub league_code: String,
    pub avg_league_goals: f64,
    #[serde(default = "default_home_advantage")]
    pub home_advantage_multiplier: f64,
}

impl LeagueConfig {
    pub fn fallback(league_code: &str) -> Self {
        Self {
            league_code: league_code.to_string(),
            avg_league_goals: DEFAULT_AVG_LEAGUE_GOALS,
            home_advantage_multiplier: DEFAULT_HOME_ADVANTAGE,
        }
    }
}

fn default_home_advantage() -> f64 {
    DEFAULT_HOME_ADVANTAGE
}

/// A scheduled football match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub kickoff: DateTime<Utc>,
    pub external_id: Option<i64>,
}

/// The seven markets the model prices, in their fixed enumeration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "Home Win")]
    HomeWin,
    #[serde(rename = "Draw")]
    Draw,
    #[serde(rename = "Away Win")]
    AwayWin,
    #[serde(rename = "Under 2.5")]
    Under2_5,
    #[serde(rename = "Over 2.5")]
    Over2_5,
    #[serde(rename = "BTTS Yes")]
    BttsYes,
    #[serde(rename = "BTTS No")]
    BttsNo,
}

impl Market {
    pub const ALL: [Market; 7] = [
        Market::HomeWin,
        Market::Draw,
        Market::AwayWin,
        Market::Under2_5,
        Market::Over2_5,
        Market::BttsYes,
        Market::BttsNo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Market::HomeWin => "Home Win",
            Market::Draw => "Draw",
            Market::AwayWin => "Away Win",
            Market::Under2_5 => "Under 2.5",
            Market::Over2_5 => "Over 2.5",
            Market::BttsYes => "BTTS Yes",
            Market::BttsNo => "BTTS No",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One bookmaker's decimal prices for a fixture. `None` means the market was not quoted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub bookmaker: Option<String>,
    pub home_win: Option<f64>,
    pub draw: Option<f64>,
    pub away_win: Option<f64>,
    pub under_2_5: Option<f64>,
    pub over_2_5: Option<f64>,
    pub btts_yes: Option<f64>,
    pub btts_no: Option<f64>,
}

impl OddsQuote {
    pub fn get(&self, market: Market) -> Option<f64> {
        match market {
            Market::HomeWin => self.home_win,
            Market::Draw => self.draw,
            Market::AwayWin => self.away_win,
            Market::Under2_5 => self.under_2_5,
            Market::Over2_5 => self.over_2_5,
            Market::BttsYes => self.btts_yes,
            Market::BttsNo => self.btts_no,
        }
    }

    /// A quote can only be evaluated when all three 1X2 prices are present and non-zero
    pub fn is_usable(&self) -> bool {
        [self.home_win, self.draw, self.away_win]
            .iter()
            .all(|price| matches!(price, Some(p) if *p > 0.0))
    }
}

/// Poisson rates for each side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedGoals {
    pub home: f64,
    pub away: f64,
}

/// Model probability for each market. Each market family sums to one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketProbabilities {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub under_2_5: f64,
    pub over_2_5: f64,
    pub btts_yes: f64,
    pub btts_no: f64,
}

impl MarketProbabilities {
    pub fn get(&self, market: Market) -> f64 {
        match market {
            Market::HomeWin => self.home_win,
            Market::Draw => self.draw,
            Market::AwayWin => self.away_win,
            Market::Under2_5 => self.under_2_5,
            Market::Over2_5 => self.over_2_5,
            Market::BttsYes => self.btts_yes,
            Market::BttsNo => self.btts_no,
        }
    }
}

/// Zero-margin decimal odds per market; `f64::INFINITY` when the model probability is zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketFairOdds {
    #[serde(with = "infinite_as_null")]
    pub home_win: f64,
    #[serde(with = "infinite_as_null")]
    pub draw: f64,
    #[serde(with = "infinite_as_null")]
    pub away_win: f64,
    #[serde(with = "infinite_as_null")]
    pub under_2_5: f64,
    #[serde(with = "infinite_as_null")]
    pub over_2_5: f64,
    #[serde(with = "infinite_as_null")]
    pub btts_yes: f64,
    #[serde(with = "infinite_as_null")]
    pub btts_no: f64,
}

impl MarketFairOdds {
    pub fn get(&self, market: Market) -> f64 {
        match market {
            Market::HomeWin => self.home_win,
            Market::Draw => self.draw,
            Market::AwayWin => self.away_win,
            Market::Under2_5 => self.under_2_5,
            Market::Over2_5 => self.over_2_5,
            Market::BttsYes => self.btts_yes,
            Market::BttsNo => self.btts_no,
        }
    }
}

/// Model probability minus bookmaker implied probability, per market
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketEdges {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub under_2_5: f64,
    pub over_2_5: f64,
    pub btts_yes: f64,
    pub btts_no: f64,
}

impl MarketEdges {
    pub fn get(&self, market: Market) -> f64 {
        match market {
            Market::HomeWin => self.home_win,
            Market::Draw => self.draw,
            Market::AwayWin => self.away_win,
            Market::Under2_5 => self.under_2_5,
            Market::Over2_5 => self.over_2_5,
            Market::BttsYes => self.btts_yes,
            Market::BttsNo => self.btts_no,
        }
    }
}

/// Full evaluation of one fixture against one bookmaker quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetRecommendation {
    pub fixture: Fixture,
    pub odds: OddsQuote,
    pub probabilities: MarketProbabilities,
    pub fair_odds: MarketFairOdds,
    pub edges: MarketEdges,
    pub expected_goals: ExpectedGoals,
    pub most_likely_score: (u32, u32),
    /// Markets with edge above the threshold, best edge first
    pub recommended_markets: Vec<Market>,
}

impl BetRecommendation {
    pub fn recommended_labels(&self) -> Vec<&'static str> {
        self.recommended_markets.iter().map(Market::label).collect()
    }

    /// Format the recommendation as a readable one-liner
    pub fn format(&self) -> String {
        let picks = if self.recommended_markets.is_empty() {
            "none".to_string()
        } else {
            self.recommended_markets
                .iter()
                .map(|m| format!("{} ({:+.2}%)", m, self.edges.get(*m) * 100.0))
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "{} vs {} [{}] | xG: {:.2}-{:.2} | Likely: {}-{} | 1X2: {:.1}%/{:.1}%/{:.1}% | Picks: {}",
            self.fixture.home_team,
            self.fixture.away_team,
            self.fixture.league,
            self.expected_goals.home,
            self.expected_goals.away,
            self.most_likely_score.0,
            self.most_likely_score.1,
            self.probabilities.home_win * 100.0,
            self.probabilities.draw * 100.0,
            self.probabilities.away_win * 100.0,
            picks
        )
    }
}

/// JSON has no infinity literal, so unbounded fair odds travel as `null`
mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
