use crate::models::{BetRecommendation, Market};
use crate::utils::fair_odds::{decimal_odds_to_probability, expected_value};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Save any serializable data to a JSON cache file, creating the directory if needed
pub fn save_to_cache<T: Serialize + ?Sized>(data: &T, cache_file: &Path) -> Result<()> {
    if let Some(parent) = cache_file.parent() {
        std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
    }
    let json = serde_json::to_string_pretty(data).context("Failed to serialize cache data")?;
    std::fs::write(cache_file, json).context("Failed to write cache file")?;
    Ok(())
}

/// Load data from a JSON cache file
pub fn load_from_cache<T: DeserializeOwned>(cache_file: &Path) -> Result<T> {
    let json = std::fs::read_to_string(cache_file).context("Failed to read cache file")?;
    let data = serde_json::from_str(&json).context("Failed to deserialize cache data")?;
    Ok(data)
}

/// One CSV line per recommended market
#[derive(Debug, Serialize)]
struct RecommendationRow<'a> {
    kickoff: String,
    league: &'a str,
    home_team: &'a str,
    away_team: &'a str,
    market: Market,
    bookmaker: &'a str,
    odds: Option<f64>,
    model_probability: f64,
    implied_probability: f64,
    // Empty when the probability is zero
    fair_odds: Option<f64>,
    edge: f64,
    expected_value: Option<f64>,
    expected_goals_home: f64,
    expected_goals_away: f64,
}

/// Save the recommended markets of every fixture to CSV
pub fn save_recommendations_to_csv(
    recommendations: &[BetRecommendation],
    filename: &Path,
) -> Result<()> {
    if let Some(parent) = filename.parent() {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    let mut writer = csv::Writer::from_path(filename).context("Failed to create CSV file")?;

    for rec in recommendations {
        for market in &rec.recommended_markets {
            let odds = rec.odds.get(*market);
            let model_probability = rec.probabilities.get(*market);
            let fair_odds = rec.fair_odds.get(*market);

            writer
                .serialize(RecommendationRow {
                    kickoff: rec.fixture.kickoff.to_rfc3339(),
                    league: &rec.fixture.league,
                    home_team: &rec.fixture.home_team,
                    away_team: &rec.fixture.away_team,
                    market: *market,
                    bookmaker: rec.odds.bookmaker.as_deref().unwrap_or(""),
                    odds,
                    model_probability,
                    implied_probability: decimal_odds_to_probability(odds),
                    fair_odds: fair_odds.is_finite().then_some(fair_odds),
                    edge: rec.edges.get(*market),
                    expected_value: odds.map(|o| expected_value(model_probability, o)),
                    expected_goals_home: rec.expected_goals.home,
                    expected_goals_away: rec.expected_goals.away,
                })
                .context("Failed to write CSV row")?;
        }
    }

    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}
