use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::fs::{relative, FileServer};
use rocket::http::{Cookie, CookieJar};
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{get, post, routes, Build, Rocket, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gateway::{FieldErrors, SummarizationGateway, SummarizationOutcome};
use crate::ingestion::FeedClient;
use crate::normalize::Headline;
use crate::sessions::{CountryGroup, SessionRegistry, SummaryResult};

const SESSION_COOKIE: &str = "nb_session";

/// Application state stored inside Rocket managed state.
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub feed: Arc<FeedClient>,
    pub gateway: Arc<SummarizationGateway>,
    pub sessions: Arc<SessionRegistry>,
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    feed_url: String,
    window_days: i64,
}

/// Result envelope for the headline feed.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum FeedFetchOutcome {
    Success { headlines: Vec<Headline> },
    Failure { error: String },
}

#[derive(Debug, Deserialize)]
struct SummarizeRequest {
    url: String,
}

/// Summarization envelope returned to the page. Success carries the stored
/// result (with its assigned id) rather than the bare capability output.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum SummarizeResponse {
    Success {
        message: String,
        result: SummaryResult,
    },
    Failure {
        message: String,
        error: String,
        #[serde(rename = "fieldErrors", skip_serializing_if = "Option::is_none")]
        field_errors: Option<FieldErrors>,
    },
}

/// Redirect root to static index.html
#[get("/")]
fn index_redirect() -> Redirect {
    Redirect::to("/static/index.html")
}

#[get("/health")]
fn health() -> &'static str {
    "OK"
}

/// Status endpoint returning simple JSON with uptime and feed info.
#[get("/api/v1/status")]
fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let uptime = (Utc::now() - state.started_at).num_seconds();
    Json(StatusResponse {
        status: "ok",
        uptime_seconds: uptime,
        feed_url: state.feed.url().to_string(),
        window_days: state.feed.window_days(),
    })
}

/// Recent headlines from the configured feed, normalized, filtered to the
/// recency window and sorted newest first.
#[get("/api/v1/headlines")]
async fn headlines(state: &State<AppState>) -> Json<FeedFetchOutcome> {
    match state.feed.recent_headlines().await {
        Ok(headlines) => Json(FeedFetchOutcome::Success { headlines }),
        Err(e) => {
            tracing::warn!(error = %e, "feed fetch failed");
            Json(FeedFetchOutcome::Failure {
                error: e.to_string(),
            })
        }
    }
}

/// Submit a URL for summarization. On success the result is appended to this
/// session's store; failures leave the store untouched.
#[post("/api/v1/summarize", format = "json", data = "<request>")]
async fn summarize(
    state: &State<AppState>,
    jar: &CookieJar<'_>,
    request: Json<SummarizeRequest>,
) -> Json<SummarizeResponse> {
    let session = session_id(jar);
    let response = match state.gateway.submit(&request.url).await {
        SummarizationOutcome::Success {
            message,
            original_url,
            summary,
        } => {
            let result = state.sessions.append(session, original_url, summary).await;
            SummarizeResponse::Success { message, result }
        }
        SummarizationOutcome::Failure {
            message,
            error,
            field_errors,
        } => SummarizeResponse::Failure {
            message,
            error,
            field_errors,
        },
    };
    Json(response)
}

/// Accumulated summaries for this session, grouped by country.
#[get("/api/v1/summaries")]
async fn summaries(state: &State<AppState>, jar: &CookieJar<'_>) -> Json<Vec<CountryGroup>> {
    let session = session_id(jar);
    Json(state.sessions.grouped(session).await)
}

/// Resolve the session id from the cookie, minting one on first contact.
fn session_id(jar: &CookieJar<'_>) -> Uuid {
    if let Some(id) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        return id;
    }
    let id = Uuid::new_v4();
    jar.add(Cookie::new(SESSION_COOKIE, id.to_string()));
    id
}

/// Build the Rocket instance with managed state and all mounts.
pub fn build_rocket(state: AppState, bind: Option<String>, port: Option<u16>) -> Rocket<Build> {
    let mut fig = rocket::Config::figment();
    if let Some(bind) = bind {
        fig = fig.merge(("address", bind));
    }
    if let Some(port) = port {
        fig = fig.merge(("port", port));
    }

    rocket::custom(fig)
        .manage(state)
        .mount(
            "/",
            routes![
                index_redirect,
                health,
                status,
                headlines,
                summarize,
                summaries,
            ],
        )
        .mount("/static", FileServer::from(relative!("static")))
}

/// Launch Rocket - this will run until shutdown (SIGINT/SIGTERM etc.)
pub async fn launch_rocket(
    state: AppState,
    bind: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting Rocket HTTP server");
    build_rocket(state, bind, port)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
