//! One event per strategy attempt. Recording must never fail the scrape.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::app::ErrorCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyEvent {
    pub platform: String,
    pub strategy: String,
    pub success: bool,
    #[serde(rename = "durationMs", serialize_with = "duration_ms")]
    pub duration: Duration,
    pub error_category: Option<ErrorCategory>,
    pub recorded_at: DateTime<Utc>,
}

impl StrategyEvent {
    pub fn success(platform: &str, strategy: &str, duration: Duration) -> Self {
        Self {
            platform: platform.to_string(),
            strategy: strategy.to_string(),
            success: true,
            duration,
            error_category: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn failure(
        platform: &str,
        strategy: &str,
        duration: Duration,
        category: ErrorCategory,
    ) -> Self {
        Self {
            platform: platform.to_string(),
            strategy: strategy.to_string(),
            success: false,
            duration,
            error_category: Some(category),
            recorded_at: Utc::now(),
        }
    }
}

fn duration_ms<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Sink for strategy outcomes.
pub trait MetricsRecorder: Send + Sync {
    fn record(&self, event: &StrategyEvent);
}

/// Emits each event as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetrics;

impl MetricsRecorder for TracingMetrics {
    fn record(&self, event: &StrategyEvent) {
        let duration_ms = event.duration.as_millis() as u64;
        match event.error_category {
            None => info!(
                platform = %event.platform,
                strategy = %event.strategy,
                duration_ms,
                "strategy succeeded"
            ),
            Some(category) => warn!(
                platform = %event.platform,
                strategy = %event.strategy,
                duration_ms,
                error_category = %category,
                "strategy failed"
            ),
        }
    }
}

/// Keeps events in memory, for tests and one-shot CLI summaries.
#[derive(Debug, Default)]
pub struct MemoryMetrics {
    events: Mutex<Vec<StrategyEvent>>,
}

impl MemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StrategyEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl MetricsRecorder for MemoryMetrics {
    fn record(&self, event: &StrategyEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
