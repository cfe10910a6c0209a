pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod ratings;
pub mod utils;

pub use api::*;
pub use models::*;
pub use utils::*;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use config::AppConfig;
use ratings::Ratings;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;
use utils::data::{load_from_cache, save_to_cache};
use utils::recommendation::BetRecommendationService;

/// Everything one run produces: evaluated fixtures plus the ones without usable odds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub generated_at: DateTime<Utc>,
    pub edge_threshold: f64,
    pub recommendations: Vec<BetRecommendation>,
    pub skipped: Vec<Fixture>,
}

impl RecommendationReport {
    /// Number of individual market picks across all fixtures
    pub fn pick_count(&self) -> usize {
        self.recommendations
            .iter()
            .map(|rec| rec.recommended_markets.len())
            .sum()
    }
}

/// Install the global tracing subscriber, honouring `RUST_LOG` (default `info`)
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Evaluate every fixture that has a usable quote; the rest are skipped, not errors
pub fn evaluate_fixtures(
    service: &BetRecommendationService,
    fixtures_with_odds: &[(Fixture, Option<OddsQuote>)],
) -> RecommendationReport {
    let mut recommendations = Vec::new();
    let mut skipped = Vec::new();

    for (fixture, quote) in fixtures_with_odds {
        match quote {
            Some(quote) if quote.is_usable() => {
                recommendations.push(service.evaluate_fixture(fixture, quote));
            }
            _ => {
                info!(
                    home = %fixture.home_team,
                    away = %fixture.away_team,
                    "Skipping fixture without usable 1X2 odds"
                );
                skipped.push(fixture.clone());
            }
        }
    }

    RecommendationReport {
        generated_at: Utc::now(),
        edge_threshold: service.edge_threshold(),
        recommendations,
        skipped,
    }
}

/// Fetch fixtures and odds from API-Football (or the cache) and evaluate them
pub async fn fetch_all_recommendations(config: &AppConfig) -> Result<RecommendationReport> {
    let ratings = Ratings::load(config.ratings_file.as_deref())?;
    let service =
        BetRecommendationService::new(ratings).with_edge_threshold(config.edge_threshold);

    let cache_file = config.fixtures_cache_file();
    let fixtures_with_odds: Vec<(Fixture, Option<OddsQuote>)> =
        if config.use_cache && cache_file.exists() {
            info!(path = %cache_file.display(), "Loading fixtures from cache");
            load_from_cache(&cache_file)?
        } else {
            let client = api_client(config)?;
            let fixtures_with_odds = client
                .fetch_fixtures_with_odds(
                    &config.leagues,
                    config.season,
                    config.fixtures_ahead,
                    config.bookmaker_id,
                )
                .await
                .context("Failed to fetch fixtures and odds")?;
            save_to_cache(&fixtures_with_odds, &cache_file)?;
            info!(path = %cache_file.display(), "Saved fixtures to cache");
            fixtures_with_odds
        };

    let report = evaluate_fixtures(&service, &fixtures_with_odds);
    info!(
        evaluated = report.recommendations.len(),
        skipped = report.skipped.len(),
        picks = report.pick_count(),
        "Evaluated fixtures"
    );
    Ok(report)
}

/// Build an API client from the configured key, base URL and retry policy
pub fn api_client(config: &AppConfig) -> Result<FootballApiClient> {
    let api_key = config.require_api_key()?;
    Ok(FootballApiClient::new(api_key.to_string())
        .with_base_url(config.api_base_url.clone())
        .with_retry(config.retry_max_attempts, config.retry_backoff))
}
