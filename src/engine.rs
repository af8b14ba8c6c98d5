use std::sync::Arc;
use std::sync::atomic::Ordering;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::Config;
use crate::leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardQuery};
use crate::metrics::MetricsCounters;
use crate::reputation::{self, TrustReport};
use crate::seed;
use crate::store::{ActorStore, AgentRecord};

/// Core trust engine - both the single-agent endpoint and the
/// leaderboard go through here, so they share one scoring path.
pub struct TrustEngine {
    pub config: Arc<Config>,
    pub store: Arc<ActorStore>,
    pub leaderboard: Leaderboard,
    pub metrics: MetricsCounters,
}

impl TrustEngine {
    pub fn new(config: Arc<Config>) -> Self {
        let leaderboard = Leaderboard::new(&config.leaderboard);
        Self {
            config,
            store: Arc::new(ActorStore::new()),
            leaderboard,
            metrics: MetricsCounters::new(),
        }
    }

    /// Build the engine and load the seed dataset, if one is configured
    pub fn from_config(config: Arc<Config>) -> anyhow::Result<Self> {
        let engine = Self::new(config);
        match engine.config.data.seed_path.as_deref() {
            Some(path) => {
                seed::load(path, &engine.store)?;
            }
            None => info!("No seed dataset configured, starting with an empty store"),
        }
        Ok(engine)
    }

    /// Trust report for one agent, or None if the agent is unknown
    pub fn agent_trust(&self, agent_id: &str, now: DateTime<Utc>) -> Option<(AgentRecord, TrustReport)> {
        self.metrics.trust_requests.fetch_add(1, Ordering::Relaxed);

        let (agent, snapshot) = match (self.store.agent(agent_id), self.store.snapshot(agent_id)) {
            (Some(agent), Some(snapshot)) => (agent, snapshot),
            _ => {
                self.metrics.trust_not_found.fetch_add(1, Ordering::Relaxed);
                debug!("Trust lookup for unknown agent {}", agent_id);
                return None;
            }
        };

        let report = reputation::compute(&snapshot, now);
        self.metrics.record_report(report.overall_score);
        debug!(
            "Trust score for {}: {} (tier {}, {} assessments)",
            agent_id,
            report.overall_score,
            snapshot.tier.level(),
            snapshot.assessments.len()
        );
        Some((agent, report))
    }

    /// Ranked leaderboard page plus the number of agents that matched
    pub fn leaderboard(&self, query: &LeaderboardQuery, now: DateTime<Utc>) -> (Vec<LeaderboardEntry>, usize) {
        self.metrics.leaderboard_requests.fetch_add(1, Ordering::Relaxed);
        let (entries, total) = self.leaderboard.rank(&self.store, now, query);
        for entry in &entries {
            self.metrics.record_report(entry.trust_score);
        }
        (entries, total)
    }

    pub fn get_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "store": self.store.get_stats(),
            "requests": {
                "trust": self.metrics.trust_requests.load(Ordering::Relaxed),
                "trust_not_found": self.metrics.trust_not_found.load(Ordering::Relaxed),
                "leaderboard": self.metrics.leaderboard_requests.load(Ordering::Relaxed),
                "reports_computed": self.metrics.reports_computed.load(Ordering::Relaxed),
            },
            "uptime_secs": self.metrics.start_time.elapsed().as_secs(),
        })
    }
}
