//! Per-operation call statistics.

use std::collections::BTreeMap;
use std::time::Duration;

/// Counters for one client operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, derive_getters::Getters)]
pub struct OperationStats {
    /// Completed calls, cache hits included
    calls: u64,
    /// Calls that returned an error or an error response
    failures: u64,
    /// Wall time spent across all calls
    total_latency: Duration,
}

impl OperationStats {
    /// Mean wall time per call, zero before the first call.
    pub fn average_latency(&self) -> Duration {
        match u32::try_from(self.calls) {
            Ok(0) => Duration::ZERO,
            Ok(calls) => self.total_latency / calls,
            Err(_) => Duration::from_secs_f64(self.total_latency.as_secs_f64() / self.calls as f64),
        }
    }
}

/// Call statistics keyed by operation name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallMetrics {
    operations: BTreeMap<String, OperationStats>,
}

impl CallMetrics {
    /// Records one completed call.
    pub fn record(&mut self, operation: &str, latency: Duration, failed: bool) {
        let stats = self.operations.entry(operation.to_string()).or_default();
        stats.calls += 1;
        stats.total_latency = stats.total_latency.saturating_add(latency);
        if failed {
            stats.failures += 1;
        }
    }

    /// Statistics for one operation.
    pub fn operation(&self, operation: &str) -> Option<&OperationStats> {
        self.operations.get(operation)
    }

    /// All recorded operations, sorted by name.
    pub fn operations(&self) -> impl Iterator<Item = (&str, &OperationStats)> {
        self.operations.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    /// Total calls across all operations.
    pub fn total_calls(&self) -> u64 {
        self.operations.values().map(|stats| stats.calls).sum()
    }
}
