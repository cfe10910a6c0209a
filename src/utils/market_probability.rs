use crate::models::MarketProbabilities;
use crate::utils::poisson::poisson_distribution;

/// Highest goal count enumerated per side. Scorelines above it are dropped and each
/// market family is renormalised over the remaining mass.
pub const MAX_GOALS: u32 = 6;

/// Goal totals at or below this line settle "Under 2.5"
const UNDER_2_5_MAX_TOTAL: u32 = 2;

/// Joint probability of every scoreline up to a truncation bound,
/// assuming independent Poisson goal counts for each side
#[derive(Debug, Clone)]
pub struct ScoreGrid {
    max_goals: u32,
    // cells[home_goals][away_goals]
    cells: Vec<Vec<f64>>,
}

impl ScoreGrid {
    pub fn new(lambda_home: f64, lambda_away: f64, max_goals: u32) -> Self {
        let home = poisson_distribution(lambda_home, max_goals);
        let away = poisson_distribution(lambda_away, max_goals);

        let cells = home
            .iter()
            .map(|p_home| away.iter().map(|p_away| p_home * p_away).collect())
            .collect();

        Self { max_goals, cells }
    }

    pub fn max_goals(&self) -> u32 {
        self.max_goals
    }

    pub fn probability(&self, home_goals: u32, away_goals: u32) -> f64 {
        self.cells
            .get(home_goals as usize)
            .and_then(|row| row.get(away_goals as usize))
            .copied()
            .unwrap_or(0.0)
    }

    /// Iterate `(home_goals, away_goals, probability)` over every cell
    pub fn scorelines(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        self.cells.iter().enumerate().flat_map(|(h, row)| {
            row.iter()
                .enumerate()
                .map(move |(a, p)| (h as u32, a as u32, *p))
        })
    }

    /// Mass captured by the grid; below 1 by whatever the truncation dropped
    pub fn total_mass(&self) -> f64 {
        self.scorelines().map(|(_, _, p)| p).sum()
    }

    /// The modal scoreline. Ties go to the first in home-major order.
    pub fn most_likely(&self) -> (u32, u32) {
        let mut best = (0, 0, f64::NEG_INFINITY);
        for (h, a, p) in self.scorelines() {
            if p > best.2 {
                best = (h, a, p);
            }
        }
        (best.0, best.1)
    }

    /// Aggregate the grid into the seven market probabilities
    pub fn market_probabilities(&self) -> MarketProbabilities {
        let mut result = [0.0; 3];
        let mut totals = [0.0; 2];
        let mut btts = [0.0; 2];

        for (h, a, p) in self.scorelines() {
            let outcome = match h.cmp(&a) {
                std::cmp::Ordering::Greater => 0,
                std::cmp::Ordering::Equal => 1,
                std::cmp::Ordering::Less => 2,
            };
            result[outcome] += p;

            let total = if h + a <= UNDER_2_5_MAX_TOTAL { 0 } else { 1 };
            totals[total] += p;

            let both_scored = if h > 0 && a > 0 { 0 } else { 1 };
            btts[both_scored] += p;
        }

        let [home_win, draw, away_win] = normalize(result);
        let [under_2_5, over_2_5] = normalize(totals);
        let [btts_yes, btts_no] = normalize(btts);

        MarketProbabilities {
            home_win,
            draw,
            away_win,
            under_2_5,
            over_2_5,
            btts_yes,
            btts_no,
        }
    }
}

/// Market probabilities for a fixture with the given goal rates
pub fn calculate_market_probabilities(lambda_home: f64, lambda_away: f64) -> MarketProbabilities {
    calculate_market_probabilities_with_bound(lambda_home, lambda_away, MAX_GOALS)
}

pub fn calculate_market_probabilities_with_bound(
    lambda_home: f64,
    lambda_away: f64,
    max_goals: u32,
) -> MarketProbabilities {
    ScoreGrid::new(lambda_home, lambda_away, max_goals).market_probabilities()
}

/// Rescale one market family to sum to 1. A family with no mass is returned unchanged.
fn normalize<const N: usize>(family: [f64; N]) -> [f64; N] {
    let sum: f64 = family.iter().sum();
    if sum <= 0.0 {
        return family;
    }
    family.map(|p| p / sum)
}
