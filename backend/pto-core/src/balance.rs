// src/balance.rs
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::accrual::{accrued_sick_leave_hours, accrued_vacation_hours, AllocationRules};
use crate::allocation::effective_allocation_hours;
use crate::models::{AllocationMode, Employee, LeaveType, PtoRequest, Timesheet};

/// Every term of the balance formula, for display next to the final number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceBreakdown {
    pub employee_id: String,
    pub leave_type: LeaveType,
    pub as_of: NaiveDate,
    pub beginning_balance: Decimal,
    pub ongoing_balance: Decimal,
    pub allocation_mode: AllocationMode,
    pub allocation_hours: Decimal,
    pub used: Decimal,
    /// `beginning + ongoing + allocation - used`, before in-flight requests.
    pub base: Decimal,
    pub in_flight_hours: Decimal,
    /// `max(0, base - in_flight_hours)`
    pub available: Decimal,
}

/// Hours held by pending and approved requests of this employee and leave type.
pub fn in_flight_hours(requests: &[PtoRequest], employee_id: &str, leave_type: LeaveType) -> Decimal {
    requests
        .iter()
        .filter(|r| r.employee_id == employee_id && r.leave_type == leave_type && r.status.is_in_flight())
        .map(|r| r.hours)
        .sum()
}

/// Accrual-rule value for the employee, ignoring any manual override.
pub fn accrued_hours(
    employee: &Employee,
    leave_type: LeaveType,
    timesheets: &[Timesheet],
    rules: &AllocationRules,
    today: NaiveDate,
) -> Decimal {
    let Some(start) = employee.start_date else {
        return Decimal::ZERO;
    };
    match leave_type {
        LeaveType::Vacation => {
            accrued_vacation_hours(start, today, employee.vacation.first_year_rule, rules)
        }
        LeaveType::SickLeave => accrued_sick_leave_hours(timesheets, start, today, rules),
    }
}

/// Computes the full balance breakdown. Pure: nothing is read or written besides the arguments.
pub fn reconcile(
    employee: &Employee,
    leave_type: LeaveType,
    timesheets: &[Timesheet],
    requests: &[PtoRequest],
    rules: &AllocationRules,
    today: NaiveDate,
) -> BalanceBreakdown {
    let balances = employee.balances(leave_type);
    let ongoing_balance = match leave_type {
        LeaveType::Vacation => balances.ongoing_balance,
        LeaveType::SickLeave => Decimal::ZERO,
    };
    let allocation_hours = effective_allocation_hours(employee, leave_type, |emp| {
        accrued_hours(emp, leave_type, timesheets, rules, today)
    });

    let base = balances.beginning_balance + ongoing_balance + allocation_hours - balances.used;
    let in_flight = in_flight_hours(requests, &employee.id, leave_type);
    let available = (base - in_flight).max(Decimal::ZERO);

    debug!(
        "Reconciled {} balance for {}: base={}, in_flight={}, available={}",
        leave_type, employee.id, base, in_flight, available
    );

    BalanceBreakdown {
        employee_id: employee.id.clone(),
        leave_type,
        as_of: today,
        beginning_balance: balances.beginning_balance,
        ongoing_balance,
        allocation_mode: employee.allocation(leave_type).mode(),
        allocation_hours,
        used: balances.used,
        base,
        in_flight_hours: in_flight,
        available,
    }
}

/// The available balance only; always `>= 0`.
pub fn available_balance(
    employee: &Employee,
    leave_type: LeaveType,
    timesheets: &[Timesheet],
    requests: &[PtoRequest],
    rules: &AllocationRules,
    today: NaiveDate,
) -> Decimal {
    reconcile(employee, leave_type, timesheets, requests, rules, today).available
}
