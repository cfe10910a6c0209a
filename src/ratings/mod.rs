pub mod league_config;
pub mod team_strength;

pub use league_config::LeagueConfigTable;
pub use team_strength::TeamStrengthTable;

use crate::error::EdgeError;
use crate::models::{LeagueConfig, TeamStrength};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk shape of a ratings file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RatingsFile {
    #[serde(default)]
    pub teams: Vec<TeamStrength>,
    #[serde(default)]
    pub leagues: Vec<LeagueConfig>,
}

/// Team and league tables, built once at startup
#[derive(Debug, Clone, Default)]
pub struct Ratings {
    pub teams: TeamStrengthTable,
    pub leagues: LeagueConfigTable,
}

impl Ratings {
    pub fn builtin() -> Self {
        Self {
            teams: TeamStrengthTable::builtin(),
            leagues: LeagueConfigTable::builtin(),
        }
    }

    /// Use the ratings file when one is configured, otherwise the built-in tables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ratings file {}", path.display()))?;
        let file: RatingsFile =
            serde_json::from_str(&json).context("Failed to parse ratings file")?;

        let ratings = Self::from_ratings_file(file)?;
        tracing::info!(
            path = %path.display(),
            teams = ratings.teams.len(),
            leagues = ratings.leagues.len(),
            "Loaded ratings file"
        );
        Ok(ratings)
    }

    pub fn from_ratings_file(file: RatingsFile) -> Result<Self, EdgeError> {
        for team in &file.teams {
            validate_team(team)?;
        }
        for league in &file.leagues {
            validate_league(league)?;
        }

        Ok(Self {
            teams: TeamStrengthTable::new(file.teams),
            leagues: LeagueConfigTable::new(file.leagues),
        })
    }
}

fn validate_team(team: &TeamStrength) -> Result<(), EdgeError> {
    let invalid = |reason: &str| EdgeError::InvalidRatings {
        name: team.name.clone(),
        reason: reason.to_string(),
    };

    if !(team.attack_strength >= 0.0 && team.attack_strength.is_finite()) {
        return Err(invalid("attack strength must be a non-negative number"));
    }
    if !(team.defence_strength >= 0.0 && team.defence_strength.is_finite()) {
        return Err(invalid("defence strength must be a non-negative number"));
    }
    Ok(())
}

fn validate_league(league: &LeagueConfig) -> Result<(), EdgeError> {
    let invalid = |reason: &str| EdgeError::InvalidRatings {
        name: league.league_code.clone(),
        reason: reason.to_string(),
    };

    if !(league.avg_league_goals > 0.0 && league.avg_league_goals.is_finite()) {
        return Err(invalid("average league goals must be positive"));
    }
    if !(league.home_advantage_multiplier > 0.0 && league.home_advantage_multiplier.is_finite()) {
        return Err(invalid("home advantage multiplier must be positive"));
    }
    Ok(())
}
