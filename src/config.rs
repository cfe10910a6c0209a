use crate::api::API_FOOTBALL_BASE_URL;
use crate::error::EdgeError;
use crate::utils::recommendation::DEFAULT_EDGE_THRESHOLD;
use chrono::Datelike;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Runtime settings, read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub leagues: Vec<String>,
    pub season: i32,
    pub fixtures_ahead: u32,
    pub bookmaker_id: Option<u32>,
    pub retry_max_attempts: u32,
    pub retry_backoff: Duration,
    pub edge_threshold: f64,
    pub ratings_file: Option<PathBuf>,
    pub cache_dir: PathBuf,
    pub use_cache: bool,
    pub save_csv: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, EdgeError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EdgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let leagues = get("FOOTBALL_LEAGUES")
            .map(|raw| {
                raw.split(',')
                    .map(|code| code.trim().to_uppercase())
                    .filter(|code| !code.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_else(|| vec!["EPL".to_string()]);

        let edge_threshold = validate_edge_threshold(parse_or(
            get("EDGE_THRESHOLD"),
            "EDGE_THRESHOLD",
            DEFAULT_EDGE_THRESHOLD,
        )?)?;

        Ok(Self {
            api_key: get("API_FOOTBALL_KEY"),
            api_base_url: get("API_FOOTBALL_BASE_URL")
                .unwrap_or_else(|| API_FOOTBALL_BASE_URL.to_string()),
            leagues,
            season: parse_or(
                get("FOOTBALL_SEASON"),
                "FOOTBALL_SEASON",
                chrono::Utc::now().year(),
            )?,
            fixtures_ahead: parse_or(get("FIXTURES_AHEAD"), "FIXTURES_AHEAD", 10)?,
            bookmaker_id: get("BOOKMAKER_ID")
                .map(|raw| parse_value(&raw, "BOOKMAKER_ID"))
                .transpose()?,
            retry_max_attempts: parse_or(get("HTTP_RETRY_ATTEMPTS"), "HTTP_RETRY_ATTEMPTS", 3)?,
            retry_backoff: Duration::from_millis(parse_or(
                get("HTTP_RETRY_BACKOFF_MS"),
                "HTTP_RETRY_BACKOFF_MS",
                500,
            )?),
            edge_threshold,
            ratings_file: get("RATINGS_FILE").map(PathBuf::from),
            cache_dir: get("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("cache")),
            use_cache: get("USE_CACHE").as_deref() == Some("1"),
            save_csv: get("SAVE_CSV").as_deref() == Some("1"),
        })
    }

    pub fn require_api_key(&self) -> Result<&str, EdgeError> {
        self.api_key
            .as_deref()
            .ok_or(EdgeError::MissingSetting("API_FOOTBALL_KEY"))
    }

    pub fn fixtures_cache_file(&self) -> PathBuf {
        self.cache_dir.join("fixtures_cache.json")
    }

    pub fn recommendations_csv_file(&self) -> PathBuf {
        self.cache_dir.join("recommendations.csv")
    }
}

/// Edge thresholds must lie in [0, 1); NaN is rejected too
pub fn validate_edge_threshold(value: f64) -> Result<f64, EdgeError> {
    if (0.0..1.0).contains(&value) {
        Ok(value)
    } else {
        Err(EdgeError::Config {
            key: "EDGE_THRESHOLD",
            reason: format!("{} is outside [0, 1)", value),
        })
    }
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, EdgeError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => parse_value(&raw, key),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(raw: &str, key: &'static str) -> Result<T, EdgeError>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| EdgeError::Config {
        key,
        reason: format!("{:?}: {}", raw, e),
    })
}
