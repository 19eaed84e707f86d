//! Per-stage metrics and results.

use std::collections::BTreeMap;
use std::time::Instant;

use serde_json::{Map, Value};

/// Named counters plus wall-clock timing for one stage run.
#[derive(Debug, Clone)]
pub struct GenerationMetrics {
    started: Instant,
    elapsed_ms: Option<u64>,
    counts: BTreeMap<String, u64>,
}

impl GenerationMetrics {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            elapsed_ms: None,
            counts: BTreeMap::new(),
        }
    }

    pub fn set_count(&mut self, name: &str, value: u64) {
        self.counts.insert(name.to_string(), value);
    }

    pub fn increment(&mut self, name: &str, by: u64) {
        *self.counts.entry(name.to_string()).or_insert(0) += by;
    }

    pub fn count(&self, name: &str) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    /// Freeze elapsed time. Safe to call more than once; the first call wins.
    pub fn complete(&mut self) {
        if self.elapsed_ms.is_none() {
            self.elapsed_ms = Some(self.started.elapsed().as_millis() as u64);
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
            .unwrap_or_else(|| self.started.elapsed().as_millis() as u64)
    }
}

impl Default for GenerationMetrics {
    fn default() -> Self {
        Self::start()
    }
}

/// The outcome of one stage: metrics, an optional error, and a data payload
/// surfaced in the pipeline report.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub metrics: GenerationMetrics,
    pub error: Option<String>,
    pub data: Map<String, Value>,
}

impl GenerationResult {
    pub fn success(mut metrics: GenerationMetrics) -> Self {
        metrics.complete();
        Self {
            metrics,
            error: None,
            data: Map::new(),
        }
    }

    pub fn success_with(mut metrics: GenerationMetrics, data: Map<String, Value>) -> Self {
        metrics.complete();
        Self {
            metrics,
            error: None,
            data,
        }
    }

    pub fn failure(mut metrics: GenerationMetrics, message: impl Into<String>) -> Self {
        metrics.complete();
        Self {
            metrics,
            error: Some(message.into()),
            data: Map::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let mut m = GenerationMetrics::start();
        m.set_count("stars", 100);
        m.increment("stars", 50);
        m.increment("planets", 7);
        assert_eq!(m.count("stars"), 150);
        assert_eq!(m.count("planets"), 7);
        assert_eq!(m.count("absent"), 0);
    }

    #[test]
    fn complete_freezes_elapsed() {
        let mut m = GenerationMetrics::start();
        m.complete();
        let first = m.elapsed_ms();
        m.complete();
        assert_eq!(m.elapsed_ms(), first);
    }

    #[test]
    fn failure_carries_message() {
        let result = GenerationResult::failure(GenerationMetrics::start(), "no minerals");
        assert!(!result.is_success());
        assert_eq!(result.error.as_deref(), Some("no minerals"));
    }
}
