use std::sync::Arc;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::engine::TrustEngine;
use crate::leaderboard::{LeaderboardEntry, LeaderboardQuery};
use crate::metrics;
use crate::reputation::{Tier, TrustReport};

/// HTTP API server - trust lookups, leaderboard, stats
pub struct WebServer {
    engine: Arc<TrustEngine>,
}

#[derive(Clone)]
struct AppState {
    engine: Arc<TrustEngine>,
}

#[derive(Deserialize)]
struct LeaderboardParams {
    limit: Option<usize>,
    tier: Option<u8>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentTrustResponse {
    agent_id: String,
    #[serde(flatten)]
    report: TrustReport,
    active_since: DateTime<Utc>,
    queried_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaderboardResponse {
    entries: Vec<LeaderboardEntry>,
    total: usize,
    queried_at: DateTime<Utc>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

impl WebServer {
    pub fn new(engine: Arc<TrustEngine>) -> Self {
        Self { engine }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let web = &self.engine.config.web;
        let addr = format!("{}:{}", web.address, web.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind API listener on {}: {}", addr, e))?;
        info!("🌐 Trust API listening on http://{}", addr);

        axum::serve(listener, router(self.engine.clone())).await?;
        Ok(())
    }
}

pub fn router(engine: Arc<TrustEngine>) -> Router {
    let cors = engine.config.web.cors;
    let state = AppState { engine };

    let app = Router::new()
        .route("/api/agents/:id/trust", get(api_agent_trust))
        .route("/api/leaderboard", get(api_leaderboard))
        .route("/api/stats", get(api_stats))
        .route("/metrics", get(api_metrics))
        .with_state(state);

    if cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Trust score and breakdown for one agent
async fn api_agent_trust(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentTrustResponse>, ApiError> {
    let queried_at = Utc::now();
    match state.engine.agent_trust(&agent_id, queried_at) {
        Some((agent, report)) => Ok(Json(AgentTrustResponse {
            agent_id: agent.id,
            report,
            active_since: agent.created_at,
            queried_at,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "agent not found",
                "agentId": agent_id,
            })),
        )),
    }
}

/// Leaderboard API - ?limit=&tier=
async fn api_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Json<LeaderboardResponse> {
    let queried_at = Utc::now();
    let query = LeaderboardQuery {
        limit: params.limit,
        tier: params.tier.map(Tier::from_level),
    };
    let (entries, total) = state.engine.leaderboard(&query, queried_at);
    Json(LeaderboardResponse {
        entries,
        total,
        queried_at,
    })
}

/// Stats API
async fn api_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.engine.get_stats())
}

/// Prometheus metrics
async fn api_metrics(State(state): State<AppState>) -> String {
    metrics::render_metrics(&state.engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::tests::{agent, contribution};

    /// Serve the router on an ephemeral port and return its base URL
    async fn spawn_api(engine: Arc<TrustEngine>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(engine)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn seeded_engine() -> Arc<TrustEngine> {
        let engine = TrustEngine::new(Arc::new(Config::default()));
        let mut a = agent("scout", 2);
        a.token_balance = 50.0;
        a.last_active_at = Some(Utc::now());
        engine.store.upsert_agent(a);
        engine.store.upsert_agent(agent("nova", 1));
        engine.store.record_contribution(contribution("p1", "nova")).unwrap();
        engine.store.record_assessment("p1", "scout", 7.0, None).unwrap();
        Arc::new(engine)
    }

    #[tokio::test]
    async fn test_agent_trust_endpoint() {
        let base = spawn_api(seeded_engine()).await;
        let resp = reqwest::get(format!("{}/api/agents/scout/trust", base)).await.unwrap();
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["agentId"], "scout");
        assert_eq!(body["breakdown"]["tier"]["score"], 70);
        assert_eq!(body["breakdown"]["tier"]["weight"], "40%");
        assert_eq!(body["breakdown"]["assessmentAccuracy"]["value"], 100.0);
        assert_eq!(body["breakdown"]["assessmentAccuracy"]["details"]["totalAssessments"], 1);
        // 28 + 0 + 20 + 5 + 10
        assert_eq!(body["trustScore"], 63);
        assert!(body["activeSince"].is_string());
        assert!(body["queriedAt"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_agent_is_404() {
        let base = spawn_api(seeded_engine()).await;
        let resp = reqwest::get(format!("{}/api/agents/ghost/trust", base)).await.unwrap();
        assert_eq!(resp.status(), 404);

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "agent not found");
        assert_eq!(body["agentId"], "ghost");
    }

    #[tokio::test]
    async fn test_leaderboard_endpoint() {
        let base = spawn_api(seeded_engine()).await;
        let body: serde_json::Value = reqwest::get(format!("{}/api/leaderboard?limit=1", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["total"], 2);
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["agentId"], "scout");
        assert_eq!(entries[0]["rank"], 1);

        let body: serde_json::Value = reqwest::get(format!("{}/api/leaderboard?tier=1", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["total"], 1);
        assert_eq!(body["entries"][0]["agentId"], "nova");
        assert_eq!(body["entries"][0]["tierName"], "Founding");
    }

    #[tokio::test]
    async fn test_stats_and_metrics() {
        let engine = seeded_engine();
        let base = spawn_api(engine.clone()).await;
        reqwest::get(format!("{}/api/agents/scout/trust", base)).await.unwrap();

        let stats: serde_json::Value = reqwest::get(format!("{}/api/stats", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats["store"]["agents"], 2);
        assert_eq!(stats["requests"]["trust"], 1);

        let text = reqwest::get(format!("{}/metrics", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(text.contains("tiker_trust_requests_total 1"));
        assert!(text.contains("tiker_store_assessments 1"));
    }
}
