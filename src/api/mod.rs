pub mod football_api;

pub use football_api::{league_id_for_code, FootballApiClient, API_FOOTBALL_BASE_URL};
