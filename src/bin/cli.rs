use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use probet_ai::config::AppConfig;
use probet_ai::dates::Period;
use probet_ai::fixture_acquisition::AcquiredFixtures;
use probet_ai::{Fixture, InsightEngine, Market};

#[derive(Parser)]
#[command(name = "probet", about = "AI-assisted football betting insights")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List fixtures for the period
    Fixtures {
        #[arg(long, default_value = "today")]
        period: Period,
    },
    /// Run the search-grounded match analysis for fixture number N
    Analyze {
        number: usize,
        #[arg(long, default_value = "today")]
        period: Period,
    },
    /// Estimate market odds for fixture number N
    Odds {
        number: usize,
        #[arg(long, default_value = "today")]
        period: Period,
    },
    /// Build a multi bet from the period's fixtures
    MultiBet {
        #[arg(long, default_value_t = 3)]
        legs: usize,
        #[arg(long, default_value = "today")]
        period: Period,
    },
}

fn print_fixtures(acquired: &AcquiredFixtures) {
    println!(
        "{} fixtures for {} ({} via {})\n",
        acquired.fixtures.len(),
        acquired.window,
        acquired.period,
        acquired.provenance
    );
    if acquired.is_fallback() {
        println!("Official feed unavailable, showing AI search results.\n");
    }

    for (i, fixture) in acquired.fixtures.iter().enumerate() {
        let score = fixture.score_line().unwrap_or_else(|| "vs".to_string());
        println!(
            "{:>3}. [{}] {} {} | {} | {} {} {} ({})",
            i + 1,
            fixture.status.label(),
            fixture.date,
            fixture.time,
            fixture.league,
            fixture.home_team,
            score,
            fixture.away_team,
            fixture.id
        );
    }
}

fn print_markets(markets: &[Market]) {
    if markets.is_empty() {
        println!("No odds could be estimated.");
        return;
    }
    for market in markets {
        let selections: Vec<String> = market
            .selections
            .iter()
            .map(|s| format!("{} @ {}", s.name, s.price))
            .collect();
        println!("{:<24} {}", market.name, selections.join("  "));
    }
}

fn pick_fixture(acquired: &AcquiredFixtures, number: usize) -> Result<&Fixture> {
    match number.checked_sub(1).and_then(|i| acquired.fixtures.get(i)) {
        Some(fixture) => Ok(fixture),
        None => bail!(
            "Fixture {} does not exist, {} fixtures loaded",
            number,
            acquired.fixtures.len()
        ),
    }
}

async fn load(engine: &InsightEngine, period: Period) -> Result<AcquiredFixtures> {
    engine
        .load_fixtures(period)
        .await
        .with_context(|| format!("Failed to load {} fixtures", period))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Failed to read configuration")?;
    let engine = InsightEngine::from_config(&config);

    println!("ProBet AI\n");

    match cli.command {
        Command::Fixtures { period } => {
            let acquired = load(&engine, period).await?;
            if acquired.fixtures.is_empty() {
                println!("No fixtures found.");
            } else {
                print_fixtures(&acquired);
            }
        }
        Command::Analyze { number, period } => {
            let acquired = load(&engine, period).await?;
            let fixture = pick_fixture(&acquired, number)?;
            println!("Analyzing {}...\n", fixture.matchup());

            let analysis = engine
                .analyze_match(fixture)
                .await
                .context("Failed to analyze match")?;

            println!("{}\n", analysis.analysis_text);
            println!("Confidence:  {}%", analysis.confidence_score);
            println!("Best market: {}", analysis.best_market);
            if let Some(prediction) = &analysis.prediction {
                println!("Prediction:  {}", prediction);
            }
            if let Some(reasoning) = &analysis.reasoning {
                println!("Reasoning:   {}", reasoning);
            }
            if !analysis.source_urls.is_empty() {
                println!("\nSources:");
                for url in &analysis.source_urls {
                    println!("  {}", url);
                }
            }
        }
        Command::Odds { number, period } => {
            let acquired = load(&engine, period).await?;
            let fixture = pick_fixture(&acquired, number)?;
            println!("Estimated odds for {}\n", fixture.matchup());
            let markets = engine.estimate_odds(fixture).await;
            print_markets(&markets);
        }
        Command::MultiBet { legs, period } => {
            let acquired = load(&engine, period).await?;
            println!(
                "Building a {}-leg multi from {} fixtures...\n",
                legs,
                acquired.fixtures.len()
            );

            let slip = engine
                .generate_multi_bet(&acquired.fixtures, legs)
                .await
                .context("Failed to generate a valid bet slip")?;

            for (i, leg) in slip.legs.iter().enumerate() {
                println!(
                    "{}. {} | {} | {} @ {}",
                    i + 1,
                    leg.fixture,
                    leg.market,
                    leg.prediction,
                    leg.odds
                );
                if !leg.reason.is_empty() {
                    println!("   {}", leg.reason);
                }
            }
            println!("\nTotal odds: {}", slip.total_odds);
            if !slip.analysis.is_empty() {
                println!("{}", slip.analysis);
            }
            println!("\n--- Copy slip ---\n{}", slip.share_text());
        }
    }

    Ok(())
}
