// src/lib.rs
//! PTO accrual and balance engine.
//!
//! Pure rules (`tenure`, `accrual`, `allocation`, `balance`, `business_days`,
//! `ledger`) plus the orchestration layer (`service`) that reads collaborators
//! through [`store::PtoStore`].

pub mod accrual;
pub mod allocation;
pub mod balance;
pub mod business_days;
pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod ledger;
pub mod memory_store;
pub mod models;
pub mod observer;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod tenure;

mod service_tests;

pub use accrual::{accrued_sick_leave_hours, accrued_vacation_hours, AllocationRules, DayRange, VacationTiers};
pub use allocation::effective_allocation_hours;
pub use balance::{available_balance, in_flight_hours, reconcile, BalanceBreakdown};
pub use business_days::{business_days, business_days_hours, is_business_day};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, ConfigError};
pub use error::PtoError;
pub use ledger::{NewPtoRequest, RequestFilter, ReviewDecision};
pub use memory_store::InMemoryStore;
pub use models::*;
pub use observer::{BalanceObserver, RecordingObserver};
pub use service::{PtoAdjustment, PtoService};
pub use snapshot::{Snapshot, SnapshotError};
pub use store::{BalanceSnapshot, PtoStore};
pub use tenure::{tenure_months, tenure_years};
