// src/service.rs
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::accrual::AllocationRules;
use crate::balance::{reconcile, BalanceBreakdown};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::PtoError;
use crate::ledger::{
    apply_review, authorize_delete, ensure_sufficient_balance, pending_request, requested_hours,
    target_employee, NewPtoRequest, RequestFilter, ReviewDecision,
};
use crate::models::{
    ActingUser, Allocation, DataIncomplete, EmployeeRecord, EmployeeStatus, LeaveType, PtoRequest,
    RequestStatus, Role,
};
use crate::observer::BalanceObserver;
use crate::store::PtoStore;

/// Administrator edit of stored balance fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PtoAdjustment {
    pub beginning_balance: Option<Decimal>,
    pub ongoing_balance: Option<Decimal>,
    pub used: Option<Decimal>,
    pub first_year_rule: Option<Decimal>,
}

/// Entry point for callers: wires the pure engine to its collaborators.
#[derive(Clone)]
pub struct PtoService {
    store: Arc<dyn PtoStore>,
    clock: Arc<dyn Clock>,
    rules: AllocationRules,
    fetch_timeout: Duration,
    observers: Vec<Arc<dyn BalanceObserver>>,
}

impl PtoService {
    pub fn new(store: Arc<dyn PtoStore>, clock: Arc<dyn Clock>, rules: AllocationRules) -> Self {
        Self {
            store,
            clock,
            rules,
            fetch_timeout: Duration::from_secs(5),
            observers: Vec::new(),
        }
    }

    pub fn from_config(store: Arc<dyn PtoStore>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self::new(store, clock, config.allocation_rules()).with_fetch_timeout(config.fetch_timeout())
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn BalanceObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn rules(&self) -> &AllocationRules {
        &self.rules
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // --- Helpers ---

    /// Runs a collaborator read under the fetch timeout. Failure never degrades to a zero balance.
    async fn fetch<T, F>(&self, source_name: &'static str, fut: F) -> Result<T, PtoError>
    where
        F: Future<Output = Result<T, PtoError>>,
    {
        match tokio::time::timeout(self.fetch_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("Fetching {} failed: {}", source_name, e);
                match e {
                    PtoError::Store(reason) => Err(PtoError::SourceUnavailable {
                        source_name,
                        reason,
                    }),
                    PtoError::LockError => Err(PtoError::SourceUnavailable {
                        source_name,
                        reason: "lock poisoned".to_string(),
                    }),
                    other => Err(other),
                }
            }
            Err(_) => {
                error!(
                    "Fetching {} timed out after {:?}",
                    source_name, self.fetch_timeout
                );
                Err(PtoError::SourceUnavailable {
                    source_name,
                    reason: format!("timed out after {:?}", self.fetch_timeout),
                })
            }
        }
    }

    fn notify(&self, tenant_id: &str, employee_id: &str) {
        for observer in &self.observers {
            observer.employee_updated(tenant_id, employee_id);
        }
    }

    fn log_data_quality(warnings: &[DataIncomplete]) {
        for warning in warnings {
            warn!("Data incomplete: {}", warning);
        }
    }

    fn require_reviewer(actor: &ActingUser, action: &str) -> Result<(), PtoError> {
        if actor.role.is_reviewer() {
            Ok(())
        } else {
            Err(PtoError::PermissionDenied(format!(
                "{} ({}) cannot {}",
                actor.id, actor.role, action
            )))
        }
    }

    /// Employees may only look at their own records.
    fn authorize_read(actor: &ActingUser, employee_id: &str) -> Result<(), PtoError> {
        if actor.role.is_reviewer() || actor.id == employee_id {
            Ok(())
        } else {
            Err(PtoError::PermissionDenied(format!(
                "{} cannot view records of {}",
                actor.id, employee_id
            )))
        }
    }

    async fn load_employee_record(
        &self,
        actor: &ActingUser,
        employee_id: &str,
    ) -> Result<EmployeeRecord, PtoError> {
        self.fetch("employee", self.store.get_employee(&actor.tenant_id, employee_id))
            .await?
            .ok_or_else(|| PtoError::not_found("employee", employee_id))
    }

    // --- Balances ---

    /// Full balance breakdown for one leave type, as of the clock's today.
    pub async fn balance(
        &self,
        actor: &ActingUser,
        employee_id: &str,
        leave_type: LeaveType,
    ) -> Result<BalanceBreakdown, PtoError> {
        Self::authorize_read(actor, employee_id)?;
        let snapshot = self
            .fetch(
                "balance snapshot",
                self.store
                    .load_snapshot(&actor.tenant_id, employee_id, leave_type),
            )
            .await?
            .ok_or_else(|| PtoError::not_found("employee", employee_id))?;

        let (employee, warnings) = snapshot.employee.resolve();
        Self::log_data_quality(&warnings);

        let breakdown = reconcile(
            &employee,
            leave_type,
            &snapshot.timesheets,
            &snapshot.in_flight,
            &self.rules,
            self.clock.today(),
        );
        debug!(
            "Balance for {} ({}): available {}h",
            employee_id, leave_type, breakdown.available
        );
        Ok(breakdown)
    }

    pub async fn available_balance(
        &self,
        actor: &ActingUser,
        employee_id: &str,
        leave_type: LeaveType,
    ) -> Result<Decimal, PtoError> {
        Ok(self.balance(actor, employee_id, leave_type).await?.available)
    }

    /// Both leave types, vacation first.
    pub async fn balances(
        &self,
        actor: &ActingUser,
        employee_id: &str,
    ) -> Result<Vec<BalanceBreakdown>, PtoError> {
        let mut breakdowns = Vec::with_capacity(LeaveType::ALL.len());
        for leave_type in LeaveType::ALL {
            breakdowns.push(self.balance(actor, employee_id, leave_type).await?);
        }
        Ok(breakdowns)
    }

    // --- Request ledger ---

    pub async fn create_request(
        &self,
        actor: &ActingUser,
        new: NewPtoRequest,
    ) -> Result<PtoRequest, PtoError> {
        let employee_id = target_employee(actor, &new)?;
        let hours = requested_hours(&new)?;

        let snapshot = self
            .fetch(
                "balance snapshot",
                self.store
                    .load_snapshot(&actor.tenant_id, &employee_id, new.leave_type),
            )
            .await?
            .ok_or_else(|| PtoError::not_found("employee", &employee_id))?;
        let (employee, warnings) = snapshot.employee.resolve();
        Self::log_data_quality(&warnings);
        if employee.status == EmployeeStatus::Inactive {
            return Err(PtoError::validation(format!(
                "employee {} is inactive",
                employee.id
            )));
        }

        let breakdown = reconcile(
            &employee,
            new.leave_type,
            &snapshot.timesheets,
            &snapshot.in_flight,
            &self.rules,
            self.clock.today(),
        );
        ensure_sufficient_balance(new.leave_type, hours, breakdown.available)?;

        let request = pending_request(actor, employee_id, &new, hours, self.clock.now());
        // The store re-checks against in-flight hours atomically; a concurrent
        // create for the same employee can still be refused here.
        let stored = self.store.insert_pending(request, breakdown.base).await?;
        info!(
            "Created {} request {} for {} ({} to {}, {}h) by {}",
            stored.leave_type,
            stored.id,
            stored.employee_id,
            stored.start_date,
            stored.end_date,
            stored.hours,
            actor.id
        );
        self.notify(&stored.tenant_id, &stored.employee_id);
        Ok(stored)
    }

    pub async fn review_request(
        &self,
        actor: &ActingUser,
        request_id: &str,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> Result<PtoRequest, PtoError> {
        Self::require_reviewer(actor, "review requests")?;
        let mut request = self
            .fetch("request", self.store.get_request(&actor.tenant_id, request_id))
            .await?
            .ok_or_else(|| PtoError::not_found("request", request_id))?;

        apply_review(&mut request, decision, actor, notes, self.clock.now())?;
        let updated = self
            .store
            .update_request(request, RequestStatus::Pending)
            .await?;
        self.notify(&updated.tenant_id, &updated.employee_id);
        Ok(updated)
    }

    pub async fn delete_request(&self, actor: &ActingUser, request_id: &str) -> Result<(), PtoError> {
        let request = self
            .fetch("request", self.store.get_request(&actor.tenant_id, request_id))
            .await?
            .ok_or_else(|| PtoError::not_found("request", request_id))?;

        let creator_role = match request.created_by.as_deref() {
            Some(creator) if creator == actor.id => Some(actor.role),
            Some(creator) => self
                .fetch("employee", self.store.get_employee(&actor.tenant_id, creator))
                .await?
                .map(|record| record.role),
            None => None,
        };
        authorize_delete(&request, actor, creator_role)?;

        // The stored status is re-checked at delete time; a review landing
        // after the policy check turns this into InvalidTransition.
        self.store
            .delete_request(&actor.tenant_id, request_id, request.status)
            .await?;
        info!(
            "Deleted {} request {} for {} by {}",
            request.status, request.id, request.employee_id, actor.id
        );
        self.notify(&request.tenant_id, &request.employee_id);
        Ok(())
    }

    /// Lists requests in the actor's tenant. Employees see only their own.
    pub async fn list_requests(
        &self,
        actor: &ActingUser,
        mut filter: RequestFilter,
    ) -> Result<Vec<PtoRequest>, PtoError> {
        if !actor.role.is_reviewer() {
            match filter.employee_id.as_deref() {
                None => filter.employee_id = Some(actor.id.clone()),
                Some(id) => Self::authorize_read(actor, id)?,
            }
        }
        self.fetch("requests", self.store.list_requests(&actor.tenant_id, &filter))
            .await
    }

    // --- Employee administration ---

    pub async fn update_pto_balances(
        &self,
        actor: &ActingUser,
        employee_id: &str,
        leave_type: LeaveType,
        adjustment: PtoAdjustment,
    ) -> Result<EmployeeRecord, PtoError> {
        Self::require_reviewer(actor, "edit balances")?;
        let values = [
            adjustment.beginning_balance,
            adjustment.ongoing_balance,
            adjustment.used,
            adjustment.first_year_rule,
        ];
        if values.iter().flatten().any(|v| *v < Decimal::ZERO) {
            return Err(PtoError::validation("balance values cannot be negative"));
        }
        if leave_type == LeaveType::SickLeave
            && (adjustment.ongoing_balance.is_some() || adjustment.first_year_rule.is_some())
        {
            return Err(PtoError::validation(
                "ongoing balance and first-year rule apply to vacation only",
            ));
        }

        let patch = adjustment.clone();
        let record = self
            .store
            .update_employee(
                &actor.tenant_id,
                employee_id,
                Box::new(move |record: &mut EmployeeRecord| {
                    let balance = record.leave_balance_mut(leave_type);
                    if let Some(v) = patch.beginning_balance {
                        balance.beginning_balance = Some(v);
                    }
                    if let Some(v) = patch.ongoing_balance {
                        balance.ongoing_balance = Some(v);
                    }
                    if let Some(v) = patch.used {
                        balance.used = Some(v);
                    }
                    if let Some(v) = patch.first_year_rule {
                        balance.first_year_rule = Some(v);
                    }
                    Ok(())
                }),
            )
            .await?;
        info!(
            "{} balances for {} updated by {}: {:?}",
            leave_type, employee_id, actor.id, adjustment
        );
        self.notify(&record.tenant_id, &record.id);
        Ok(record)
    }

    pub async fn set_allocation(
        &self,
        actor: &ActingUser,
        employee_id: &str,
        leave_type: LeaveType,
        allocation: Allocation,
    ) -> Result<EmployeeRecord, PtoError> {
        Self::require_reviewer(actor, "change allocation mode")?;
        if let Allocation::Manual { hours } = allocation {
            if hours < Decimal::ZERO {
                return Err(PtoError::validation("manual allocation hours cannot be negative"));
            }
        }
        let record = self
            .store
            .update_employee(
                &actor.tenant_id,
                employee_id,
                Box::new(move |record: &mut EmployeeRecord| {
                    record.set_allocation(leave_type, allocation);
                    Ok(())
                }),
            )
            .await?;
        info!(
            "{} allocation for {} set to {:?} by {}",
            leave_type, employee_id, allocation, actor.id
        );
        self.notify(&record.tenant_id, &record.id);
        Ok(record)
    }

    /// Corrects the hire date that anchors all tenure math.
    pub async fn set_start_date(
        &self,
        actor: &ActingUser,
        employee_id: &str,
        start_date: NaiveDate,
    ) -> Result<EmployeeRecord, PtoError> {
        Self::require_reviewer(actor, "change start dates")?;
        let record = self
            .store
            .update_employee(
                &actor.tenant_id,
                employee_id,
                Box::new(move |record: &mut EmployeeRecord| {
                    record.start_date = Some(start_date);
                    Ok(())
                }),
            )
            .await?;
        info!("Start date for {} set to {} by {}", employee_id, start_date, actor.id);
        self.notify(&record.tenant_id, &record.id);
        Ok(record)
    }

    /// Employees are never deleted; their requests stay in the ledger.
    pub async fn deactivate_employee(
        &self,
        actor: &ActingUser,
        employee_id: &str,
    ) -> Result<EmployeeRecord, PtoError> {
        if actor.role != Role::Admin {
            return Err(PtoError::PermissionDenied(format!(
                "{} ({}) cannot deactivate employees",
                actor.id, actor.role
            )));
        }
        let record = self.load_employee_record(actor, employee_id).await?;
        if record.status == EmployeeStatus::Inactive {
            return Ok(record);
        }
        let record = self
            .store
            .update_employee(
                &actor.tenant_id,
                employee_id,
                Box::new(|record: &mut EmployeeRecord| {
                    record.status = EmployeeStatus::Inactive;
                    Ok(())
                }),
            )
            .await?;
        info!("Employee {} deactivated by {}", employee_id, actor.id);
        self.notify(&record.tenant_id, &record.id);
        Ok(record)
    }
}
