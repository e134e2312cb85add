// src/observer.rs
use std::sync::{Arc, Mutex};

/// Notified after a mutation changes the inputs of an employee's balance,
/// so callers can refresh cached views.
pub trait BalanceObserver: Send + Sync {
    fn employee_updated(&self, tenant_id: &str, employee_id: &str);
}

/// Collects notifications in memory; useful for tests and for batching refreshes.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<(String, String)> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.clear();
        }
    }
}

impl BalanceObserver for RecordingObserver {
    fn employee_updated(&self, tenant_id: &str, employee_id: &str) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((tenant_id.to_string(), employee_id.to_string()));
        }
    }
}
