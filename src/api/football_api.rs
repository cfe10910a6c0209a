use crate::error::EdgeError;
use crate::models::{Fixture, OddsQuote};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub const API_FOOTBALL_BASE_URL: &str = "https://v3.football.api-sports.io";

const MATCH_WINNER_BET: &str = "Match Winner";
const TOTALS_BET: &str = "Goals Over/Under";
const BTTS_BET: &str = "Both Teams Score";

/// API-Football league id for each supported league code
const LEAGUE_IDS: &[(&str, u32)] = &[
    ("EPL", 39),
    ("LALIGA", 140),
    ("SERIEA", 135),
    ("BUNDESLIGA", 78),
    ("LIGUE1", 61),
];

pub fn league_id_for_code(code: &str) -> Result<u32, EdgeError> {
    LEAGUE_IDS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code.trim()))
        .map(|(_, id)| *id)
        .ok_or_else(|| EdgeError::UnknownLeague(code.to_string()))
}

/// Envelope shared by every API-Football response
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    response: T,
}

#[derive(Debug, Deserialize)]
struct ApiFixtureItem {
    fixture: ApiFixture,
    teams: ApiTeams,
}

#[derive(Debug, Deserialize)]
struct ApiFixture {
    id: i64,
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ApiTeams {
    home: ApiTeam,
    away: ApiTeam,
}

#[derive(Debug, Deserialize)]
struct ApiTeam {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiOddsItem {
    bookmakers: Vec<ApiBookmaker>,
}

#[derive(Debug, Deserialize)]
struct ApiBookmaker {
    name: String,
    bets: Vec<ApiBet>,
}

#[derive(Debug, Deserialize)]
struct ApiBet {
    name: String,
    values: Vec<ApiBetValue>,
}

/// API-Football sends prices as strings ("2.10")
#[derive(Debug, Deserialize)]
struct ApiBetValue {
    value: String,
    odd: String,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    requests: ApiRequests,
}

#[derive(Debug, Deserialize)]
struct ApiRequests {
    current: u32,
    limit_day: u32,
}

pub struct FootballApiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    retry_max_attempts: u32,
    retry_backoff: Duration,
}

impl FootballApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: API_FOOTBALL_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            retry_max_attempts: 1,
            retry_backoff: Duration::ZERO,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.retry_max_attempts = max_attempts.max(1);
        self.retry_backoff = backoff;
        self
    }

    /// GET `path`, retrying timeouts and connection failures
    async fn get_with_retry<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = self
                .client
                .get(&url)
                .header("x-apisports-key", &self.api_key)
                .query(query)
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(err) if attempt < self.retry_max_attempts && should_retry(&err) => {
                    warn!(
                        attempt,
                        max_attempts = self.retry_max_attempts,
                        error = %err,
                        "API-Football request failed, retrying"
                    );
                    sleep(self.retry_backoff).await;
                    continue;
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("Failed to fetch {}", url));
                }
            };

            if !response.status().is_success() {
                anyhow::bail!(
                    "API-Football returned error: {} for {}",
                    response.status(),
                    path
                );
            }

            return response
                .json()
                .await
                .with_context(|| format!("Failed to parse API-Football response for {}", path));
        }
    }

    /// Fetch the next `next` fixtures of a league
    pub async fn fetch_fixtures(
        &self,
        league_code: &str,
        season: i32,
        next: u32,
    ) -> Result<Vec<Fixture>> {
        let league_id = league_id_for_code(league_code)?;
        let envelope: ApiEnvelope<Vec<ApiFixtureItem>> = self
            .get_with_retry(
                "/fixtures",
                &[
                    ("league", league_id.to_string()),
                    ("season", season.to_string()),
                    ("next", next.to_string()),
                ],
            )
            .await
            .with_context(|| format!("Failed to fetch {} fixtures", league_code))?;

        let fixtures = envelope
            .response
            .into_iter()
            .map(|item| Fixture {
                league: league_code.to_string(),
                home_team: item.teams.home.name,
                away_team: item.teams.away.name,
                kickoff: item.fixture.date,
                external_id: Some(item.fixture.id),
            })
            .collect::<Vec<_>>();

        debug!(league = league_code, count = fixtures.len(), "Fetched fixtures");
        Ok(fixtures)
    }

    /// Fetch the first usable bookmaker quote for a fixture, if any
    pub async fn fetch_odds(
        &self,
        fixture_id: i64,
        bookmaker_id: Option<u32>,
    ) -> Result<Option<OddsQuote>> {
        let mut query = vec![("fixture", fixture_id.to_string())];
        if let Some(bookmaker_id) = bookmaker_id {
            query.push(("bookmaker", bookmaker_id.to_string()));
        }

        let envelope: ApiEnvelope<Vec<ApiOddsItem>> = self
            .get_with_retry("/odds", &query)
            .await
            .with_context(|| format!("Failed to fetch odds for fixture {}", fixture_id))?;

        Ok(select_quote(envelope.response))
    }

    /// Fetch fixtures for every league, pairing each with its odds quote.
    /// A league whose fixtures cannot be fetched is logged and left out.
    /// A fixture whose odds request fails is kept with `None` so it can be reported as skipped.
    pub async fn fetch_fixtures_with_odds(
        &self,
        leagues: &[String],
        season: i32,
        next: u32,
        bookmaker_id: Option<u32>,
    ) -> Result<Vec<(Fixture, Option<OddsQuote>)>> {
        let mut fixtures_with_odds = Vec::new();

        for league in leagues {
            let fixtures = match self.fetch_fixtures(league, season, next).await {
                Ok(fixtures) => fixtures,
                Err(err) => {
                    warn!(
                        league = %league,
                        error = %err,
                        "Failed to fetch fixtures, skipping league"
                    );
                    continue;
                }
            };
            info!(league = %league, fixtures = fixtures.len(), "Fetching odds");

            for fixture in fixtures {
                let Some(fixture_id) = fixture.external_id else {
                    fixtures_with_odds.push((fixture, None));
                    continue;
                };

                let quote = match self.fetch_odds(fixture_id, bookmaker_id).await {
                    Ok(quote) => quote,
                    Err(err) => {
                        warn!(fixture_id, error = %err, "Failed to fetch odds");
                        None
                    }
                };
                fixtures_with_odds.push((fixture, quote));
            }
        }

        Ok(fixtures_with_odds)
    }

    /// Log how many API requests are left today
    pub async fn check_usage(&self) -> Result<()> {
        let envelope: ApiEnvelope<ApiStatus> = self.get_with_retry("/status", &[]).await?;
        let requests = envelope.response.requests;

        println!(
            "API requests used today: {} / {}",
            requests.current, requests.limit_day
        );
        info!(
            used = requests.current,
            limit = requests.limit_day,
            "API-Football usage"
        );

        Ok(())
    }
}

fn should_retry(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn select_quote(items: Vec<ApiOddsItem>) -> Option<OddsQuote> {
    items
        .into_iter()
        .flat_map(|item| item.bookmakers)
        .map(|bookmaker| quote_from_bookmaker(&bookmaker))
        .find(OddsQuote::is_usable)
}

fn quote_from_bookmaker(bookmaker: &ApiBookmaker) -> OddsQuote {
    let price = |bet_name: &str, value: &str| -> Option<f64> {
        bookmaker
            .bets
            .iter()
            .find(|bet| bet.name == bet_name)?
            .values
            .iter()
            .find(|v| v.value == value)?
            .odd
            .trim()
            .parse::<f64>()
            .ok()
    };

    OddsQuote {
        bookmaker: Some(bookmaker.name.clone()),
        home_win: price(MATCH_WINNER_BET, "Home"),
        draw: price(MATCH_WINNER_BET, "Draw"),
        away_win: price(MATCH_WINNER_BET, "Away"),
        under_2_5: price(TOTALS_BET, "Under 2.5"),
        over_2_5: price(TOTALS_BET, "Over 2.5"),
        btts_yes: price(BTTS_BET, "Yes"),
        btts_no: price(BTTS_BET, "No"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn odds_payload() -> serde_json::Value {
        json!({
            "response": [{
                "fixture": { "id": 1035037 },
                "bookmakers": [
                    {
                        "id": 1,
                        "name": "Thin Book",
                        "bets": [{
                            "id": 1,
                            "name": "Match Winner",
                            "values": [
                                { "value": "Home", "odd": "2.05" },
                                { "value": "Away", "odd": "3.60" }
                            ]
                        }]
                    },
                    {
                        "id": 8,
                        "name": "Bet365",
                        "bets": [
                            {
                                "id": 1,
                                "name": "Match Winner",
                                "values": [
                                    { "value": "Home", "odd": "2.10" },
                                    { "value": "Draw", "odd": "3.40" },
                                    { "value": "Away", "odd": "3.50" }
                                ]
                            },
                            {
                                "id": 5,
                                "name": "Goals Over/Under",
                                "values": [
                                    { "value": "Over 1.5", "odd": "1.30" },
                                    { "value": "Under 1.5", "odd": "3.40" },
                                    { "value": "Over 2.5", "odd": "1.85" },
                                    { "value": "Under 2.5", "odd": "1.95" }
                                ]
                            },
                            {
                                "id": 8,
                                "name": "Both Teams Score",
                                "values": [
                                    { "value": "Yes", "odd": "1.70" },
                                    { "value": "No", "odd": "oops" }
                                ]
                            }
                        ]
                    }
                ]
            }]
        })
    }

    #[test]
    fn test_select_first_usable_bookmaker() {
        let envelope: ApiEnvelope<Vec<ApiOddsItem>> =
            serde_json::from_value(odds_payload()).unwrap();
        let quote = select_quote(envelope.response).unwrap();

        assert_eq!(quote.bookmaker.as_deref(), Some("Bet365"));
        assert_eq!(quote.home_win, Some(2.10));
        assert_eq!(quote.draw, Some(3.40));
        assert_eq!(quote.away_win, Some(3.50));
        assert_eq!(quote.over_2_5, Some(1.85));
        assert_eq!(quote.under_2_5, Some(1.95));
        assert_eq!(quote.btts_yes, Some(1.70));
        assert_eq!(quote.btts_no, None);
    }

    #[test]
    fn test_no_usable_quote() {
        let envelope: ApiEnvelope<Vec<ApiOddsItem>> =
            serde_json::from_value(json!({ "response": [] })).unwrap();
        assert!(select_quote(envelope.response).is_none());
    }

    #[test]
    fn test_parse_fixtures() {
        let envelope: ApiEnvelope<Vec<ApiFixtureItem>> = serde_json::from_value(json!({
            "response": [{
                "fixture": { "id": 1035037, "date": "2024-08-16T19:00:00+00:00", "venue": {} },
                "league": { "id": 39, "name": "Premier League" },
                "teams": {
                    "home": { "id": 33, "name": "Manchester United" },
                    "away": { "id": 36, "name": "Fulham" }
                }
            }]
        }))
        .unwrap();

        let item = &envelope.response[0];
        assert_eq!(item.fixture.id, 1035037);
        assert_eq!(item.teams.home.name, "Manchester United");
        assert_eq!(item.teams.away.name, "Fulham");
        assert_eq!(item.fixture.date.to_rfc3339(), "2024-08-16T19:00:00+00:00");
    }

    #[test]
    fn test_league_id_for_code() {
        assert_eq!(league_id_for_code("epl").unwrap(), 39);
        assert_eq!(league_id_for_code("LaLiga").unwrap(), 140);
        assert!(matches!(
            league_id_for_code("MLS"),
            Err(EdgeError::UnknownLeague(code)) if code == "MLS"
        ));
    }

    #[tokio::test]
    async fn test_failed_league_does_not_abort_the_scan() {
        // Unknown codes fail before any request is sent
        let client = FootballApiClient::new("unused".to_string());
        let leagues = vec!["MLS".to_string(), "NOTALEAGUE".to_string()];

        let fixtures = client
            .fetch_fixtures_with_odds(&leagues, 2025, 5, None)
            .await
            .unwrap();
        assert!(fixtures.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_fixtures() {
        dotenv::dotenv().ok();
        let api_key = std::env::var("API_FOOTBALL_KEY").expect("API_FOOTBALL_KEY not set");
        let client = FootballApiClient::new(api_key);

        let season = chrono::Datelike::year(&Utc::now());
        let fixtures = client.fetch_fixtures("EPL", season, 5).await.unwrap();
        assert!(!fixtures.is_empty());
    }
}
