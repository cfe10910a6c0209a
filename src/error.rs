use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdgeError {
    #[error("invalid value for {key}: {reason}")]
    Config { key: &'static str, reason: String },

    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("invalid ratings for {name}: {reason}")]
    InvalidRatings { name: String, reason: String },

    #[error("unknown league code: {0}")]
    UnknownLeague(String),
}
