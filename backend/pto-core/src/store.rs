// src/store.rs
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::PtoError;
use crate::ledger::RequestFilter;
use crate::models::{EmployeeRecord, LeaveType, PtoRequest, RequestStatus, Timesheet};

/// Edit applied to a stored employee record while the store holds it exclusively.
pub type EmployeePatch = Box<dyn FnOnce(&mut EmployeeRecord) -> Result<(), PtoError> + Send>;

/// Everything a balance calculation needs, read together.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSnapshot {
    pub employee: EmployeeRecord,
    /// Approved timesheets; empty for vacation, which does not need them.
    pub timesheets: Vec<Timesheet>,
    /// Pending and approved requests for the employee and leave type.
    pub in_flight: Vec<PtoRequest>,
}

/// Persistence collaborator for employees, timesheets and the request ledger.
///
/// Every read is tenant scoped: a record from another tenant is reported as missing.
#[async_trait]
pub trait PtoStore: Send + Sync {
    async fn get_employee(
        &self,
        tenant_id: &str,
        employee_id: &str,
    ) -> Result<Option<EmployeeRecord>, PtoError>;

    /// Applies `patch` to the stored record and persists it in one atomic step.
    ///
    /// Concurrent patches to the same employee are applied one after another, so
    /// edits to different fields never overwrite each other. A patch error
    /// leaves the stored record untouched.
    async fn update_employee(
        &self,
        tenant_id: &str,
        employee_id: &str,
        patch: EmployeePatch,
    ) -> Result<EmployeeRecord, PtoError>;

    async fn list_approved_timesheets(
        &self,
        tenant_id: &str,
        employee_id: &str,
    ) -> Result<Vec<Timesheet>, PtoError>;

    async fn list_requests(
        &self,
        tenant_id: &str,
        filter: &RequestFilter,
    ) -> Result<Vec<PtoRequest>, PtoError>;

    async fn get_request(
        &self,
        tenant_id: &str,
        request_id: &str,
    ) -> Result<Option<PtoRequest>, PtoError>;

    /// Persists a pending request if it still fits.
    ///
    /// Implementations must re-sum the in-flight hours for the request's
    /// employee and leave type and insert within one atomic step, failing with
    /// [`PtoError::InsufficientBalance`] when `base_hours - in_flight < request.hours`.
    async fn insert_pending(
        &self,
        request: PtoRequest,
        base_hours: Decimal,
    ) -> Result<PtoRequest, PtoError>;

    /// Replaces a stored request, provided its stored status is still `expected_status`.
    async fn update_request(
        &self,
        request: PtoRequest,
        expected_status: RequestStatus,
    ) -> Result<PtoRequest, PtoError>;

    /// Removes a stored request, provided its stored status is still `expected_status`.
    async fn delete_request(
        &self,
        tenant_id: &str,
        request_id: &str,
        expected_status: RequestStatus,
    ) -> Result<(), PtoError>;

    /// Reads employee, timesheets and in-flight requests for one balance.
    ///
    /// The default issues three independent reads, so a balance read right
    /// after a concurrent approval may be briefly stale. Stores that can read
    /// under one transaction should override this.
    async fn load_snapshot(
        &self,
        tenant_id: &str,
        employee_id: &str,
        leave_type: LeaveType,
    ) -> Result<Option<BalanceSnapshot>, PtoError> {
        let Some(employee) = self.get_employee(tenant_id, employee_id).await? else {
            return Ok(None);
        };
        let timesheets = match leave_type {
            LeaveType::SickLeave => self.list_approved_timesheets(tenant_id, employee_id).await?,
            LeaveType::Vacation => Vec::new(),
        };
        let filter = RequestFilter::for_employee(employee_id)
            .leave_type(leave_type)
            .in_flight();
        let in_flight = self.list_requests(tenant_id, &filter).await?;
        Ok(Some(BalanceSnapshot {
            employee,
            timesheets,
            in_flight,
        }))
    }
}
