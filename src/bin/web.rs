use anyhow::Context;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use probet_ai::config::AppConfig;
use probet_ai::dates::Period;
use probet_ai::fixture_acquisition::AcquiredFixtures;
use probet_ai::{Fixture, InsightEngine, Market, MultiBetLeg, MULTI_BET_LEG_CHOICES};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const ANALYSIS_ERROR_TEXT: &str = "Error analyzing match. Please try again later.";
const SOURCES_SHOWN: usize = 3;

// Custom filters for formatting
mod filters {
    pub fn confidence_class(score: &u8) -> ::askama::Result<String> {
        let class = match *score {
            75..=100 => "high",
            50..=74 => "medium",
            _ => "low",
        };
        Ok(class.to_string())
    }
}

/// Fixture fields pre-formatted for the templates
struct FixtureView {
    id: String,
    date: String,
    time: String,
    league: String,
    home_team: String,
    away_team: String,
    status_label: String,
    is_live: bool,
    score: String,
    odds: Vec<Market>,
}

impl From<&Fixture> for FixtureView {
    fn from(fixture: &Fixture) -> Self {
        Self {
            id: fixture.id.clone(),
            date: fixture.date.format("%a %d %b").to_string(),
            time: fixture.time.clone(),
            league: fixture.league.clone(),
            home_team: fixture.home_team.clone(),
            away_team: fixture.away_team.clone(),
            status_label: fixture.status.label().to_string(),
            is_live: fixture.status.is_live(),
            score: fixture.score_line().unwrap_or_default(),
            odds: fixture.ai_odds.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "fixtures.html")]
struct FixturesTemplate {
    active_page: String,
    window_label: String,
    using_fallback: bool,
    live_count: usize,
    fixtures: Vec<FixtureView>,
    error: String,
    leg_choices: Vec<usize>,
}

#[derive(Template)]
#[template(path = "analysis.html")]
struct AnalysisTemplate {
    active_page: String,
    fixture: FixtureView,
    analysis_text: String,
    confidence: u8,
    best_market: String,
    prediction: String,
    reasoning: String,
    sources: Vec<String>,
}

#[derive(Template)]
#[template(path = "multi_bet.html")]
struct MultiBetTemplate {
    active_page: String,
    leg_options: Vec<LegOption>,
    legs: Vec<MultiBetLeg>,
    total_odds: String,
    analysis: String,
    share_text: String,
    error: String,
}

struct LegOption {
    count: usize,
    selected: bool,
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

/// The fixture list currently on screen
#[derive(Default)]
struct Board {
    loaded_period: Option<Period>,
    fixtures: Option<AcquiredFixtures>,
    error: Option<String>,
}

struct AppState {
    engine: InsightEngine,
    board: RwLock<Board>,
}

type SharedState = Arc<AppState>;

#[derive(Deserialize)]
struct HomeQuery {
    period: Option<String>,
    #[serde(default)]
    refresh: bool,
}

#[derive(Deserialize)]
struct MultiBetQuery {
    legs: Option<usize>,
}

async fn find_fixture(state: &AppState, id: &str) -> Option<Fixture> {
    let board = state.board.read().await;
    board.fixtures.as_ref()?.get(id).cloned()
}

async fn home(State(state): State<SharedState>, Query(query): Query<HomeQuery>) -> Response {
    let (period, reload) = {
        let board = state.board.read().await;
        let period = query
            .period
            .as_deref()
            .and_then(|p| p.parse::<Period>().ok())
            .or(board.loaded_period)
            .unwrap_or_default();
        (period, query.refresh || board.loaded_period != Some(period))
    };

    if reload {
        // A new period discards the previous list before loading
        {
            let mut board = state.board.write().await;
            board.fixtures = None;
            board.error = None;
            board.loaded_period = Some(period);
        }

        let loaded = state.engine.load_fixtures(period).await;

        let mut board = state.board.write().await;
        if board.loaded_period == Some(period) {
            match loaded {
                Ok(acquired) => board.fixtures = Some(acquired),
                Err(e) => {
                    error!("Failed to load {} fixtures: {}", period, e);
                    board.error = Some(e.to_string());
                }
            }
        } else {
            info!("Discarding {} fixtures, board switched period", period);
        }
    }

    let board = state.board.read().await;
    let (window_label, using_fallback, live_count, fixtures) = match board.fixtures.as_ref() {
        Some(acquired) => (
            acquired.window.to_string(),
            acquired.is_fallback(),
            acquired.live_count(),
            acquired.fixtures.iter().map(FixtureView::from).collect(),
        ),
        None => (String::new(), false, 0, Vec::new()),
    };

    let template = FixturesTemplate {
        active_page: period.to_string(),
        window_label,
        using_fallback,
        live_count,
        fixtures,
        error: board.error.clone().unwrap_or_default(),
        leg_choices: MULTI_BET_LEG_CHOICES.to_vec(),
    };

    HtmlTemplate(template).into_response()
}

async fn fixture_odds(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let fixture = match find_fixture(&state, &id).await {
        Some(fixture) => fixture,
        None => return (StatusCode::NOT_FOUND, "Fixture not found").into_response(),
    };

    let markets = state.engine.estimate_odds(&fixture).await;

    let mut board = state.board.write().await;
    if let Some(acquired) = board.fixtures.as_mut() {
        if !acquired.attach_odds(&id, markets) {
            info!("No odds attached for fixture {}", id);
        }
    }

    Redirect::to("/").into_response()
}

async fn fixture_analysis(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let fixture = match find_fixture(&state, &id).await {
        Some(fixture) => fixture,
        None => return (StatusCode::NOT_FOUND, "Fixture not found").into_response(),
    };

    let template = match state.engine.analyze_match(&fixture).await {
        Ok(analysis) => AnalysisTemplate {
            active_page: "analysis".to_string(),
            fixture: FixtureView::from(&fixture),
            analysis_text: analysis.analysis_text,
            confidence: analysis.confidence_score,
            best_market: analysis.best_market,
            prediction: analysis.prediction.unwrap_or_default(),
            reasoning: analysis.reasoning.unwrap_or_default(),
            sources: analysis
                .source_urls
                .into_iter()
                .take(SOURCES_SHOWN)
                .collect(),
        },
        Err(e) => {
            error!("Analysis failed for {}: {}", fixture.matchup(), e);
            AnalysisTemplate {
                active_page: "analysis".to_string(),
                fixture: FixtureView::from(&fixture),
                analysis_text: ANALYSIS_ERROR_TEXT.to_string(),
                confidence: 0,
                best_market: "N/A".to_string(),
                prediction: String::new(),
                reasoning: String::new(),
                sources: Vec::new(),
            }
        }
    };

    HtmlTemplate(template).into_response()
}

async fn multi_bet(
    State(state): State<SharedState>,
    Query(query): Query<MultiBetQuery>,
) -> Response {
    let mut template = MultiBetTemplate {
        active_page: "multi_bet".to_string(),
        leg_options: MULTI_BET_LEG_CHOICES
            .iter()
            .map(|&count| LegOption {
                count,
                selected: query.legs == Some(count),
            })
            .collect(),
        legs: Vec::new(),
        total_odds: String::new(),
        analysis: String::new(),
        share_text: String::new(),
        error: String::new(),
    };

    if let Some(legs) = query.legs {
        let fixtures = {
            let board = state.board.read().await;
            board
                .fixtures
                .as_ref()
                .map(|acquired| acquired.fixtures.clone())
                .unwrap_or_default()
        };

        match state.engine.generate_multi_bet(&fixtures, legs).await {
            Ok(slip) => {
                template.share_text = slip.share_text();
                template.legs = slip.legs;
                template.total_odds = slip.total_odds;
                template.analysis = slip.analysis;
            }
            Err(e) => {
                error!("Multi bet generation failed: {}", e);
                template.error = format!("Failed to generate a valid bet slip: {}", e);
            }
        }
    }

    HtmlTemplate(template).into_response()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().context("Failed to read configuration")?;
    let state = Arc::new(AppState {
        engine: InsightEngine::from_config(&config),
        board: RwLock::new(Board::default()),
    });

    // Build router with routes
    let app = Router::new()
        .nest_service("/static", ServeDir::new("static"))
        .route("/", get(home))
        .route("/fixtures/:id/odds", post(fixture_odds))
        .route("/fixtures/:id/analysis", get(fixture_analysis))
        .route("/multi-bet", get(multi_bet))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.web_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.web_addr))?;

    println!("\nStarting web server at http://{}", config.web_addr);
    println!("Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Web server failed")?;
    Ok(())
}
