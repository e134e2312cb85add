// src/memory_store.rs
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::PtoError;
use crate::ledger::{sort_requests, RequestFilter};
use crate::models::{
    EmployeeId, EmployeeRecord, LeaveType, PtoRequest, RequestId, RequestStatus, TenantId,
    Timesheet, TimesheetStatus,
};
use crate::store::{BalanceSnapshot, EmployeePatch, PtoStore};

#[derive(Debug, Default)]
struct StoreState {
    employees: HashMap<(TenantId, EmployeeId), EmployeeRecord>,
    timesheets: Vec<Timesheet>,
    requests: BTreeMap<RequestId, PtoRequest>,
}

impl StoreState {
    fn approved_timesheets(&self, tenant_id: &str, employee_id: &str) -> Vec<Timesheet> {
        self.timesheets
            .iter()
            .filter(|t| {
                t.tenant_id == tenant_id
                    && t.employee_id == employee_id
                    && t.status == TimesheetStatus::Approved
            })
            .cloned()
            .collect()
    }

    fn requests_matching(&self, tenant_id: &str, filter: &RequestFilter) -> Vec<PtoRequest> {
        let mut requests: Vec<PtoRequest> = self
            .requests
            .values()
            .filter(|r| r.tenant_id == tenant_id && filter.matches(r))
            .cloned()
            .collect();
        sort_requests(&mut requests);
        requests
    }

    fn in_flight_hours(&self, tenant_id: &str, employee_id: &str, leave_type: LeaveType) -> Decimal {
        self.requests
            .values()
            .filter(|r| {
                r.tenant_id == tenant_id
                    && r.employee_id == employee_id
                    && r.leave_type == leave_type
                    && r.status.is_in_flight()
            })
            .map(|r| r.hours)
            .sum()
    }
}

/// Process-local [`PtoStore`]. One mutex guards all state, so every method is atomic.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    latency: Option<Duration>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every async call, to exercise caller timeouts.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, PtoError> {
        self.state.lock().map_err(|_| PtoError::LockError)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    // --- Seeding and export ---

    pub fn insert_employee(&self, record: EmployeeRecord) -> Result<(), PtoError> {
        let key = (record.tenant_id.clone(), record.id.clone());
        self.state()?.employees.insert(key, record);
        Ok(())
    }

    pub fn insert_timesheet(&self, timesheet: Timesheet) -> Result<(), PtoError> {
        self.state()?.timesheets.push(timesheet);
        Ok(())
    }

    /// Stores a request as-is, without balance checks. For loading existing data.
    pub fn insert_request(&self, request: PtoRequest) -> Result<(), PtoError> {
        self.state()?.requests.insert(request.id.clone(), request);
        Ok(())
    }

    pub fn employees(&self) -> Result<Vec<EmployeeRecord>, PtoError> {
        let mut employees: Vec<EmployeeRecord> = self.state()?.employees.values().cloned().collect();
        employees.sort_by(|a, b| (&a.tenant_id, &a.id).cmp(&(&b.tenant_id, &b.id)));
        Ok(employees)
    }

    pub fn timesheets(&self) -> Result<Vec<Timesheet>, PtoError> {
        Ok(self.state()?.timesheets.clone())
    }

    pub fn requests(&self) -> Result<Vec<PtoRequest>, PtoError> {
        Ok(self.state()?.requests.values().cloned().collect())
    }
}

#[async_trait]
impl PtoStore for InMemoryStore {
    async fn get_employee(
        &self,
        tenant_id: &str,
        employee_id: &str,
    ) -> Result<Option<EmployeeRecord>, PtoError> {
        self.simulate_latency().await;
        let key = (tenant_id.to_string(), employee_id.to_string());
        Ok(self.state()?.employees.get(&key).cloned())
    }

    async fn update_employee(
        &self,
        tenant_id: &str,
        employee_id: &str,
        patch: EmployeePatch,
    ) -> Result<EmployeeRecord, PtoError> {
        self.simulate_latency().await;
        let mut state = self.state()?;
        let key = (tenant_id.to_string(), employee_id.to_string());
        let stored = state
            .employees
            .get_mut(&key)
            .ok_or_else(|| PtoError::not_found("employee", employee_id))?;
        let mut updated = stored.clone();
        patch(&mut updated)?;
        *stored = updated.clone();
        debug!("Updated employee {}/{}", tenant_id, employee_id);
        Ok(updated)
    }

    async fn list_approved_timesheets(
        &self,
        tenant_id: &str,
        employee_id: &str,
    ) -> Result<Vec<Timesheet>, PtoError> {
        self.simulate_latency().await;
        Ok(self.state()?.approved_timesheets(tenant_id, employee_id))
    }

    async fn list_requests(
        &self,
        tenant_id: &str,
        filter: &RequestFilter,
    ) -> Result<Vec<PtoRequest>, PtoError> {
        self.simulate_latency().await;
        Ok(self.state()?.requests_matching(tenant_id, filter))
    }

    async fn get_request(
        &self,
        tenant_id: &str,
        request_id: &str,
    ) -> Result<Option<PtoRequest>, PtoError> {
        self.simulate_latency().await;
        Ok(self
            .state()?
            .requests
            .get(request_id)
            .filter(|r| r.tenant_id == tenant_id)
            .cloned())
    }

    async fn insert_pending(
        &self,
        request: PtoRequest,
        base_hours: Decimal,
    ) -> Result<PtoRequest, PtoError> {
        self.simulate_latency().await;
        let mut state = self.state()?;
        let in_flight =
            state.in_flight_hours(&request.tenant_id, &request.employee_id, request.leave_type);
        let available = (base_hours - in_flight).max(Decimal::ZERO);
        if request.hours > available {
            warn!(
                "Insert of {} for {} refused at store: {}h requested, {}h available",
                request.id, request.employee_id, request.hours, available
            );
            return Err(PtoError::insufficient(request.leave_type, request.hours, available));
        }
        if state.requests.contains_key(&request.id) {
            return Err(PtoError::Store(format!("duplicate request id {}", request.id)));
        }
        state.requests.insert(request.id.clone(), request.clone());
        info!(
            "Stored pending request {} ({} {}h) for {}",
            request.id, request.leave_type, request.hours, request.employee_id
        );
        Ok(request)
    }

    async fn update_request(
        &self,
        request: PtoRequest,
        expected_status: RequestStatus,
    ) -> Result<PtoRequest, PtoError> {
        self.simulate_latency().await;
        let mut state = self.state()?;
        let stored = state
            .requests
            .get_mut(&request.id)
            .filter(|r| r.tenant_id == request.tenant_id)
            .ok_or_else(|| PtoError::not_found("request", &request.id))?;
        if stored.status != expected_status {
            return Err(PtoError::InvalidTransition {
                request_id: request.id.clone(),
                from: stored.status,
                to: request.status.to_string(),
            });
        }
        *stored = request.clone();
        Ok(request)
    }

    async fn delete_request(
        &self,
        tenant_id: &str,
        request_id: &str,
        expected_status: RequestStatus,
    ) -> Result<(), PtoError> {
        self.simulate_latency().await;
        let mut state = self.state()?;
        let stored_status = state
            .requests
            .get(request_id)
            .filter(|r| r.tenant_id == tenant_id)
            .map(|r| r.status)
            .ok_or_else(|| PtoError::not_found("request", request_id))?;
        if stored_status != expected_status {
            return Err(PtoError::InvalidTransition {
                request_id: request_id.to_string(),
                from: stored_status,
                to: "deleted".to_string(),
            });
        }
        state.requests.remove(request_id);
        Ok(())
    }

    /// Single-lock read, so the three parts always agree with each other.
    async fn load_snapshot(
        &self,
        tenant_id: &str,
        employee_id: &str,
        leave_type: LeaveType,
    ) -> Result<Option<BalanceSnapshot>, PtoError> {
        self.simulate_latency().await;
        let state = self.state()?;
        let key = (tenant_id.to_string(), employee_id.to_string());
        let Some(employee) = state.employees.get(&key).cloned() else {
            return Ok(None);
        };
        let timesheets = match leave_type {
            LeaveType::SickLeave => state.approved_timesheets(tenant_id, employee_id),
            LeaveType::Vacation => Vec::new(),
        };
        let filter = RequestFilter::for_employee(employee_id)
            .leave_type(leave_type)
            .in_flight();
        let in_flight = state.requests_matching(tenant_id, &filter);
        Ok(Some(BalanceSnapshot {
            employee,
            timesheets,
            in_flight,
        }))
    }
}
