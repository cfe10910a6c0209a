pub mod data;
pub mod expected_goals;
pub mod fair_odds;
pub mod market_probability;
pub mod poisson;
pub mod recommendation;
