// src/allocation.rs
use rust_decimal::Decimal;

use crate::models::{Allocation, Employee, LeaveType};

/// Hours allocated to `employee` for `leave_type`.
///
/// A manual allocation is returned exactly as the administrator entered it;
/// otherwise `accrual` computes the value.
pub fn effective_allocation_hours<F>(employee: &Employee, leave_type: LeaveType, accrual: F) -> Decimal
where
    F: FnOnce(&Employee) -> Decimal,
{
    match employee.allocation(leave_type) {
        Allocation::Manual { hours } => hours,
        Allocation::Auto => accrual(employee),
    }
}
