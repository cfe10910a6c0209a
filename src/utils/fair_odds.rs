use crate::models::{Market, MarketEdges, MarketFairOdds, MarketProbabilities, OddsQuote};

/// Convert a decimal bookmaker price to its implied probability.
/// Missing or non-positive prices imply zero.
pub fn decimal_odds_to_probability(odds: Option<f64>) -> f64 {
    match odds {
        Some(price) if price > 0.0 => 1.0 / price,
        _ => 0.0,
    }
}

/// Zero-margin decimal odds for a probability; unbounded when the probability is zero
pub fn probability_to_fair_odds(prob: f64) -> f64 {
    if prob > 0.0 {
        1.0 / prob
    } else {
        f64::INFINITY
    }
}

pub fn calculate_fair_odds(probabilities: &MarketProbabilities) -> MarketFairOdds {
    MarketFairOdds {
        home_win: probability_to_fair_odds(probabilities.home_win),
        draw: probability_to_fair_odds(probabilities.draw),
        away_win: probability_to_fair_odds(probabilities.away_win),
        under_2_5: probability_to_fair_odds(probabilities.under_2_5),
        over_2_5: probability_to_fair_odds(probabilities.over_2_5),
        btts_yes: probability_to_fair_odds(probabilities.btts_yes),
        btts_no: probability_to_fair_odds(probabilities.btts_no),
    }
}

/// Edge = model probability - bookmaker implied probability, per market.
///
/// An unquoted market implies zero, so its edge is the full model probability.
/// Callers are expected to drop quotes without usable 1X2 prices before getting here.
pub fn calculate_edges(model: &MarketProbabilities, bookmaker: &OddsQuote) -> MarketEdges {
    let edge =
        |market: Market| model.get(market) - decimal_odds_to_probability(bookmaker.get(market));

    MarketEdges {
        home_win: edge(Market::HomeWin),
        draw: edge(Market::Draw),
        away_win: edge(Market::AwayWin),
        under_2_5: edge(Market::Under2_5),
        over_2_5: edge(Market::Over2_5),
        btts_yes: edge(Market::BttsYes),
        btts_no: edge(Market::BttsNo),
    }
}

/// Expected profit per unit staked at decimal `odds`: p × odds - 1
pub fn expected_value(model_prob: f64, odds: f64) -> f64 {
    model_prob * odds - 1.0
}

/// Bookmaker overround on the 1X2 market (sum of implied probabilities minus one)
pub fn bookmaker_margin(quote: &OddsQuote) -> f64 {
    [quote.home_win, quote.draw, quote.away_win]
        .into_iter()
        .map(decimal_odds_to_probability)
        .sum::<f64>()
        - 1.0
}
