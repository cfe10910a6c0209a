use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use football_edge::config::{validate_edge_threshold, AppConfig};
use football_edge::data::save_recommendations_to_csv;
use football_edge::fair_odds::{bookmaker_margin, decimal_odds_to_probability, expected_value};
use football_edge::ratings::Ratings;
use football_edge::recommendation::BetRecommendationService;
use football_edge::{
    api_client, fetch_all_recommendations, BetRecommendation, Fixture, Market, OddsQuote,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cli", about = "Football Poisson model vs bookmaker odds")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch upcoming fixtures and odds, then list positive-edge markets
    Scan(ScanArgs),
    /// Evaluate a single fixture with manually entered odds
    Evaluate(EvaluateArgs),
}

#[derive(Args)]
struct ScanArgs {
    /// Read fixtures and odds from the cache file when present
    #[arg(long)]
    use_cache: bool,
    /// Write recommended markets to CSV
    #[arg(long)]
    save_csv: bool,
    /// League codes to scan (EPL, LALIGA, SERIEA, BUNDESLIGA, LIGUE1)
    #[arg(long = "league")]
    leagues: Vec<String>,
    /// Minimum edge for a market to be recommended
    #[arg(long)]
    threshold: Option<f64>,
    /// Only print the first N fixtures with picks
    #[arg(long)]
    top: Option<usize>,
}

#[derive(Args)]
struct EvaluateArgs {
    #[arg(long, default_value = "EPL")]
    league: String,
    #[arg(long)]
    home: String,
    #[arg(long)]
    away: String,
    #[arg(long)]
    home_win: f64,
    #[arg(long)]
    draw: f64,
    #[arg(long)]
    away_win: f64,
    #[arg(long)]
    under: Option<f64>,
    #[arg(long)]
    over: Option<f64>,
    #[arg(long)]
    btts_yes: Option<f64>,
    #[arg(long)]
    btts_no: Option<f64>,
    /// JSON ratings file to use instead of the built-in tables
    #[arg(long)]
    ratings: Option<PathBuf>,
    #[arg(long)]
    threshold: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    football_edge::init_logging();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;

    match cli.command {
        Command::Scan(args) => scan(&mut config, args).await,
        Command::Evaluate(args) => evaluate(&config, args),
    }
}

async fn scan(config: &mut AppConfig, args: ScanArgs) -> Result<()> {
    config.use_cache |= args.use_cache;
    config.save_csv |= args.save_csv;
    if !args.leagues.is_empty() {
        config.leagues = args.leagues.iter().map(|l| l.to_uppercase()).collect();
    }
    if let Some(threshold) = args.threshold {
        config.edge_threshold = validate_edge_threshold(threshold)?;
    }

    println!("Football Poisson Edge Finder\n");
    println!("Leagues: {}\n", config.leagues.join(", "));

    let report = fetch_all_recommendations(config).await?;

    let with_picks: Vec<&BetRecommendation> = report
        .recommendations
        .iter()
        .filter(|rec| !rec.recommended_markets.is_empty())
        .take(args.top.unwrap_or(usize::MAX))
        .collect();

    if with_picks.is_empty() {
        println!(
            "No markets with edge above {:.1}% found.",
            report.edge_threshold * 100.0
        );
    } else {
        println!("Fixtures with positive edge:\n");
        for (i, rec) in with_picks.iter().enumerate() {
            println!("{}. {}", i + 1, rec.format());
        }
    }

    if !report.skipped.is_empty() {
        println!("\nSkipped {} fixtures without usable odds:", report.skipped.len());
        for fixture in &report.skipped {
            println!("  - {} vs {} ({})", fixture.home_team, fixture.away_team, fixture.league);
        }
    }

    if config.save_csv && report.pick_count() > 0 {
        let csv_file = config.recommendations_csv_file();
        save_recommendations_to_csv(&report.recommendations, &csv_file)?;
        println!("\nSaved recommendations to {}", csv_file.display());
    }

    // Usage needs the live API
    if !config.use_cache {
        println!("\n");
        api_client(config)?.check_usage().await?;
    }

    Ok(())
}

fn evaluate(config: &AppConfig, args: EvaluateArgs) -> Result<()> {
    let ratings_file = args.ratings.as_deref().or(config.ratings_file.as_deref());
    let ratings = Ratings::load(ratings_file)?;
    let threshold = match args.threshold {
        Some(threshold) => validate_edge_threshold(threshold)?,
        None => config.edge_threshold,
    };
    let service = BetRecommendationService::new(ratings).with_edge_threshold(threshold);

    let fixture = Fixture {
        league: args.league,
        home_team: args.home,
        away_team: args.away,
        kickoff: Utc::now(),
        external_id: None,
    };
    let quote = OddsQuote {
        bookmaker: None,
        home_win: Some(args.home_win),
        draw: Some(args.draw),
        away_win: Some(args.away_win),
        under_2_5: args.under,
        over_2_5: args.over,
        btts_yes: args.btts_yes,
        btts_no: args.btts_no,
    };

    if !quote.is_usable() {
        anyhow::bail!("1X2 odds must all be positive");
    }

    let rec = service.evaluate_fixture(&fixture, &quote);
    print_market_table(&rec);
    Ok(())
}

fn print_market_table(rec: &BetRecommendation) {
    println!(
        "{} vs {} [{}]",
        rec.fixture.home_team, rec.fixture.away_team, rec.fixture.league
    );
    println!(
        "Expected goals: {:.2} - {:.2} | Most likely score: {}-{} | 1X2 margin: {:.2}%\n",
        rec.expected_goals.home,
        rec.expected_goals.away,
        rec.most_likely_score.0,
        rec.most_likely_score.1,
        bookmaker_margin(&rec.odds) * 100.0
    );
    println!(
        "{:<10} {:>8} {:>10} {:>8} {:>9} {:>8} {:>8}",
        "Market", "Model", "Fair odds", "Odds", "Implied", "Edge", "EV"
    );

    for market in Market::ALL {
        let odds = rec.odds.get(market);
        let prob = rec.probabilities.get(market);
        let fair = rec.fair_odds.get(market);

        let fair = if fair.is_finite() {
            format!("{:.2}", fair)
        } else {
            "-".to_string()
        };
        let (odds_str, ev_str) = match odds {
            Some(o) => (
                format!("{:.2}", o),
                format!("{:+.1}%", expected_value(prob, o) * 100.0),
            ),
            None => ("-".to_string(), "-".to_string()),
        };

        println!(
            "{:<10} {:>7.1}% {:>10} {:>8} {:>8.1}% {:>+7.1}% {:>8}",
            market.label(),
            prob * 100.0,
            fair,
            odds_str,
            decimal_odds_to_probability(odds) * 100.0,
            rec.edges.get(market) * 100.0,
            ev_str
        );
    }

    println!();
    if rec.recommended_markets.is_empty() {
        println!("No recommended markets.");
    } else {
        println!("Recommended: {}", rec.recommended_labels().join(", "));
    }
}
