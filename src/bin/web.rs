use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use football_edge::config::AppConfig;
use football_edge::{fetch_all_recommendations, BetRecommendation, Market, RecommendationReport};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// One market cell, preformatted for the template
struct MarketCell {
    label: &'static str,
    probability: String,
    fair_odds: String,
    odds: String,
    edge: String,
    recommended: bool,
}

struct FixtureRow {
    league: String,
    kickoff: String,
    home_team: String,
    away_team: String,
    expected_goals: String,
    likely_score: String,
    bookmaker: String,
    markets: Vec<MarketCell>,
    picks: String,
}

impl FixtureRow {
    fn from_recommendation(rec: &BetRecommendation) -> Self {
        let markets = Market::ALL
            .iter()
            .map(|market| {
                let fair = rec.fair_odds.get(*market);
                MarketCell {
                    label: market.label(),
                    probability: format!("{:.1}%", rec.probabilities.get(*market) * 100.0),
                    fair_odds: if fair.is_finite() {
                        format!("{:.2}", fair)
                    } else {
                        "-".to_string()
                    },
                    odds: rec
                        .odds
                        .get(*market)
                        .map(|o| format!("{:.2}", o))
                        .unwrap_or_else(|| "-".to_string()),
                    edge: format!("{:+.1}%", rec.edges.get(*market) * 100.0),
                    recommended: rec.recommended_markets.contains(market),
                }
            })
            .collect();

        Self {
            league: rec.fixture.league.clone(),
            kickoff: rec.fixture.kickoff.format("%Y-%m-%d %H:%M").to_string(),
            home_team: rec.fixture.home_team.clone(),
            away_team: rec.fixture.away_team.clone(),
            expected_goals: format!(
                "{:.2} - {:.2}",
                rec.expected_goals.home, rec.expected_goals.away
            ),
            likely_score: format!("{}-{}", rec.most_likely_score.0, rec.most_likely_score.1),
            bookmaker: rec.odds.bookmaker.clone().unwrap_or_default(),
            markets,
            picks: rec.recommended_labels().join(", "),
        }
    }
}

#[derive(Template)]
#[template(path = "recommendations.html")]
struct RecommendationsTemplate {
    generated_at: String,
    edge_threshold: String,
    pick_count: usize,
    skipped_count: usize,
    rows: Vec<FixtureRow>,
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

// Shared state to cache the report
type SharedReport = Arc<RwLock<Option<RecommendationReport>>>;

async fn home(State(report): State<SharedReport>) -> Response {
    let report = report.read().await;

    let report = match report.as_ref() {
        Some(r) => r,
        None => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "Data not loaded yet").into_response();
        }
    };

    let template = RecommendationsTemplate {
        generated_at: report.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        edge_threshold: format!("{:.1}%", report.edge_threshold * 100.0),
        pick_count: report.pick_count(),
        skipped_count: report.skipped.len(),
        rows: report
            .recommendations
            .iter()
            .map(FixtureRow::from_recommendation)
            .collect(),
    };

    HtmlTemplate(template).into_response()
}

async fn recommendations_json(State(report): State<SharedReport>) -> Response {
    let report = report.read().await;

    match report.as_ref() {
        Some(r) => Json(r.clone()).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "Data not loaded yet").into_response(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    football_edge::init_logging();

    let config = AppConfig::from_env()?;

    tracing::info!(leagues = ?config.leagues, "Fetching fixtures and odds");

    // Fetch data on startup
    let report = match fetch_all_recommendations(&config).await {
        Ok(report) => {
            tracing::info!(
                fixtures = report.recommendations.len(),
                picks = report.pick_count(),
                skipped = report.skipped.len(),
                "Data loaded successfully"
            );
            Arc::new(RwLock::new(Some(report)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Error fetching data, pages will show errors");
            Arc::new(RwLock::new(None))
        }
    };

    let app = Router::new()
        .nest_service("/static", ServeDir::new("static"))
        .route("/", get(home))
        .route("/api/recommendations", get(recommendations_json))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(report);

    let addr = std::env::var("WEB_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Starting web server");

    axum::serve(listener, app).await?;
    Ok(())
}
