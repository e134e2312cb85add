// src/snapshot.rs
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::error::PtoError;
use crate::memory_store::InMemoryStore;
use crate::models::{EmployeeRecord, PtoRequest, Timesheet};

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization failed: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Store error: {0}")]
    Store(#[from] PtoError),
}

/// On-disk export of the backing store's PTO-relevant tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub employees: Vec<EmployeeRecord>,
    #[serde(default)]
    pub timesheets: Vec<Timesheet>,
    #[serde(default, alias = "ptoRequests")]
    pub requests: Vec<PtoRequest>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let contents = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        info!(
            "Loaded snapshot {}: {} employees, {} timesheets, {} requests",
            path.display(),
            snapshot.employees.len(),
            snapshot.timesheets.len(),
            snapshot.requests.len()
        );
        Ok(snapshot)
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        info!("Snapshot written to {}", path.display());
        Ok(())
    }

    pub fn into_store(self) -> Result<InMemoryStore, PtoError> {
        let store = InMemoryStore::new();
        for employee in self.employees {
            store.insert_employee(employee)?;
        }
        for timesheet in self.timesheets {
            store.insert_timesheet(timesheet)?;
        }
        for request in self.requests {
            store.insert_request(request)?;
        }
        Ok(store)
    }

    pub fn from_store(store: &InMemoryStore) -> Result<Self, PtoError> {
        Ok(Self {
            employees: store.employees()?,
            timesheets: store.timesheets()?,
            requests: store.requests()?,
        })
    }
}
