// src/ledger.rs
//! Request ledger rules: hour computation, balance guard, review transitions
//! and the delete policy. Persistence lives behind [`crate::store::PtoStore`].

use chrono::{NaiveDate, NaiveDateTime};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::business_days::business_days_hours;
use crate::error::PtoError;
use crate::models::{ActingUser, EmployeeId, LeaveType, PtoRequest, RequestStatus, Role};

const REQUEST_ID_LEN: usize = 16;

/// Input for a new request, as submitted by the request form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPtoRequest {
    /// Required when an admin or manager files on someone's behalf.
    pub employee_id: Option<EmployeeId>,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    /// Hours shown to the user; must match the computed business-day hours if given.
    pub hours: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn status(self) -> RequestStatus {
        match self {
            ReviewDecision::Approved => RequestStatus::Approved,
            ReviewDecision::Rejected => RequestStatus::Rejected,
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status())
    }
}

impl FromStr for ReviewDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approve" | "approved" => Ok(ReviewDecision::Approved),
            "reject" | "rejected" => Ok(ReviewDecision::Rejected),
            _ => Err(format!("Invalid review decision: {}", s)),
        }
    }
}

/// Filter for `list`. Empty `statuses` matches every status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFilter {
    pub employee_id: Option<EmployeeId>,
    pub leave_type: Option<LeaveType>,
    pub statuses: Vec<RequestStatus>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl RequestFilter {
    pub fn for_employee(employee_id: &str) -> Self {
        Self {
            employee_id: Some(employee_id.to_string()),
            ..Default::default()
        }
    }

    pub fn leave_type(mut self, leave_type: LeaveType) -> Self {
        self.leave_type = Some(leave_type);
        self
    }

    pub fn status(mut self, status: RequestStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn in_flight(self) -> Self {
        self.status(RequestStatus::Pending).status(RequestStatus::Approved)
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_range = Some((from, to));
        self
    }

    pub fn matches(&self, request: &PtoRequest) -> bool {
        if let Some(employee_id) = &self.employee_id {
            if &request.employee_id != employee_id {
                return false;
            }
        }
        if let Some(leave_type) = self.leave_type {
            if request.leave_type != leave_type {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&request.status) {
            return false;
        }
        if let Some((from, to)) = self.date_range {
            if !request.overlaps(from, to) {
                return false;
            }
        }
        true
    }
}

/// Orders requests by start date, then creation time.
pub fn sort_requests(requests: &mut [PtoRequest]) {
    requests.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}

pub fn generate_request_id() -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REQUEST_ID_LEN)
        .map(char::from)
        .collect();
    format!("pto_{}", suffix)
}

/// Resolves whose balance a new request is filed against.
pub fn target_employee(actor: &ActingUser, new: &NewPtoRequest) -> Result<EmployeeId, PtoError> {
    let selected = new.employee_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
    match (actor.role.is_reviewer(), selected) {
        (true, Some(id)) => Ok(id.to_string()),
        (true, None) => Err(PtoError::validation(
            "an employee must be selected when filing on someone's behalf",
        )),
        (false, None) => Ok(actor.id.clone()),
        (false, Some(id)) if id == actor.id => Ok(actor.id.clone()),
        (false, Some(id)) => Err(PtoError::PermissionDenied(format!(
            "{} cannot file requests for {}",
            actor.id, id
        ))),
    }
}

/// Validates the date range and returns the hours the request is worth.
pub fn requested_hours(new: &NewPtoRequest) -> Result<Decimal, PtoError> {
    if new.end_date < new.start_date {
        return Err(PtoError::validation(format!(
            "end date {} is before start date {}",
            new.end_date, new.start_date
        )));
    }
    let hours = business_days_hours(new.start_date, new.end_date);
    if hours.is_zero() {
        return Err(PtoError::validation(format!(
            "{} to {} contains no business days",
            new.start_date, new.end_date
        )));
    }
    if let Some(submitted) = new.hours {
        if submitted != hours {
            return Err(PtoError::validation(format!(
                "submitted hours {} do not match {} business-day hours for {} to {}",
                submitted, hours, new.start_date, new.end_date
            )));
        }
    }
    Ok(hours)
}

pub fn ensure_sufficient_balance(
    leave_type: LeaveType,
    requested: Decimal,
    available: Decimal,
) -> Result<(), PtoError> {
    if requested > available {
        warn!(
            "Rejecting {} request: requested {}h exceeds available {}h",
            leave_type, requested, available
        );
        return Err(PtoError::insufficient(leave_type, requested, available));
    }
    Ok(())
}

/// Builds the pending record for a validated request.
pub fn pending_request(
    actor: &ActingUser,
    employee_id: EmployeeId,
    new: &NewPtoRequest,
    hours: Decimal,
    now: NaiveDateTime,
) -> PtoRequest {
    PtoRequest {
        id: generate_request_id(),
        tenant_id: actor.tenant_id.clone(),
        employee_id,
        leave_type: new.leave_type,
        start_date: new.start_date,
        end_date: new.end_date,
        hours,
        reason: new.reason.trim().to_string(),
        status: RequestStatus::Pending,
        created_by: Some(actor.id.clone()),
        created_at: now,
        reviewed_by: None,
        reviewed_at: None,
        review_notes: None,
    }
}

/// Moves a pending request to its terminal state. Any other starting state is rejected untouched.
pub fn apply_review(
    request: &mut PtoRequest,
    decision: ReviewDecision,
    reviewer: &ActingUser,
    notes: Option<String>,
    now: NaiveDateTime,
) -> Result<(), PtoError> {
    if !reviewer.role.is_reviewer() {
        return Err(PtoError::PermissionDenied(format!(
            "{} ({}) cannot review requests",
            reviewer.id, reviewer.role
        )));
    }
    if request.status.is_terminal() {
        return Err(PtoError::InvalidTransition {
            request_id: request.id.clone(),
            from: request.status,
            to: decision.to_string(),
        });
    }
    request.status = decision.status();
    request.reviewed_by = Some(reviewer.id.clone());
    request.reviewed_at = Some(now);
    request.review_notes = notes.filter(|n| !n.trim().is_empty());
    info!(
        "Request {} for {} {} by {}",
        request.id, request.employee_id, request.status, reviewer.id
    );
    Ok(())
}

/// Delete policy.
///
/// While pending, the owner or any admin/manager may delete. An admin/manager
/// may also delete a reviewed request if it was filed by an admin/manager
/// (`creator_role`); self-service requests are locked once reviewed.
pub fn authorize_delete(
    request: &PtoRequest,
    actor: &ActingUser,
    creator_role: Option<Role>,
) -> Result<(), PtoError> {
    let is_owner = actor.id == request.employee_id;
    let actor_is_reviewer = actor.role.is_reviewer();

    if !request.status.is_terminal() {
        if is_owner || actor_is_reviewer {
            return Ok(());
        }
        return Err(PtoError::PermissionDenied(format!(
            "{} cannot delete request {}",
            actor.id, request.id
        )));
    }

    let filed_by_reviewer = creator_role.map(Role::is_reviewer).unwrap_or(false);
    if actor_is_reviewer && filed_by_reviewer {
        return Ok(());
    }
    Err(PtoError::InvalidTransition {
        request_id: request.id.clone(),
        from: request.status,
        to: "deleted".to_string(),
    })
}
