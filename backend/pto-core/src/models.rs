// src/models.rs
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type EmployeeId = String;
pub type TenantId = String;
pub type RequestId = String;
pub type UserId = String;

/// Hours credited for one business day of leave.
pub const HOURS_PER_DAY: Decimal = dec!(8);

// --- Enumerations ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Vacation,
    SickLeave,
}

impl LeaveType {
    pub const ALL: [LeaveType; 2] = [LeaveType::Vacation, LeaveType::SickLeave];
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveType::Vacation => write!(f, "vacation"),
            LeaveType::SickLeave => write!(f, "sick_leave"),
        }
    }
}

impl FromStr for LeaveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vacation" => Ok(LeaveType::Vacation),
            "sick_leave" | "sickleave" | "sick-leave" | "sick" => Ok(LeaveType::SickLeave),
            _ => Err(format!("Invalid leave type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    /// Admins and managers review requests and edit balances.
    pub fn is_reviewer(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Manager => write!(f, "manager"),
            Role::Employee => write!(f, "employee"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Pending and approved requests hold hours against the balance.
    pub fn is_in_flight(self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimesheetStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    #[default]
    Auto,
    Manual,
}

// --- Stored employee record (as the backing store returns it) ---

/// Per-leave-type balance fields. Every field may be missing in stored data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalanceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beginning_balance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ongoing_balance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_year_rule: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtoRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacation: Option<LeaveBalanceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sick_leave: Option<LeaveBalanceRecord>,
}

impl PtoRecord {
    fn slot_mut(&mut self, leave_type: LeaveType) -> &mut Option<LeaveBalanceRecord> {
        match leave_type {
            LeaveType::Vacation => &mut self.vacation,
            LeaveType::SickLeave => &mut self.sick_leave,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    #[serde(rename = "type")]
    pub mode: AllocationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtoAllocationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacation: Option<AllocationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sick_leave: Option<AllocationRecord>,
}

impl PtoAllocationRecord {
    fn slot_mut(&mut self, leave_type: LeaveType) -> &mut Option<AllocationRecord> {
        match leave_type {
            LeaveType::Vacation => &mut self.vacation,
            LeaveType::SickLeave => &mut self.sick_leave,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub id: EmployeeId,
    pub tenant_id: TenantId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pto: Option<PtoRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pto_allocation: Option<PtoAllocationRecord>,
}

/// Data-quality findings produced while resolving a stored record.
/// None of these stop a balance calculation; the missing parts default to zero / auto.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIncomplete {
    #[error("employee {employee_id} has no pto record; all balances default to zero")]
    MissingPto { employee_id: EmployeeId },
    #[error("employee {employee_id} has no {leave_type} balance; defaulting to zero")]
    MissingLeaveBalance {
        employee_id: EmployeeId,
        leave_type: LeaveType,
    },
    #[error("employee {employee_id} has a manual {leave_type} allocation without hours; using 0")]
    ManualAllocationWithoutHours {
        employee_id: EmployeeId,
        leave_type: LeaveType,
    },
    #[error("employee {employee_id} has no start date; accrual is zero")]
    MissingStartDate { employee_id: EmployeeId },
}

impl EmployeeRecord {
    /// Resolves optional substructures into an [`Employee`] with explicit defaults.
    pub fn resolve(&self) -> (Employee, Vec<DataIncomplete>) {
        let mut warnings = Vec::new();

        if self.start_date.is_none() {
            warnings.push(DataIncomplete::MissingStartDate {
                employee_id: self.id.clone(),
            });
        }

        let (vacation, sick_leave) = match &self.pto {
            None => {
                warnings.push(DataIncomplete::MissingPto {
                    employee_id: self.id.clone(),
                });
                (LeaveBalances::default(), LeaveBalances::default())
            }
            Some(pto) => (
                self.resolve_balance(LeaveType::Vacation, pto.vacation.as_ref(), &mut warnings),
                self.resolve_balance(LeaveType::SickLeave, pto.sick_leave.as_ref(), &mut warnings),
            ),
        };

        let allocations = self.pto_allocation.clone().unwrap_or_default();
        let vacation_allocation =
            self.resolve_allocation(LeaveType::Vacation, allocations.vacation.as_ref(), &mut warnings);
        let sick_leave_allocation = self.resolve_allocation(
            LeaveType::SickLeave,
            allocations.sick_leave.as_ref(),
            &mut warnings,
        );

        let employee = Employee {
            id: self.id.clone(),
            tenant_id: self.tenant_id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            status: self.status,
            department: self.department.clone(),
            start_date: self.start_date,
            vacation,
            sick_leave,
            vacation_allocation,
            sick_leave_allocation,
        };
        (employee, warnings)
    }

    fn resolve_balance(
        &self,
        leave_type: LeaveType,
        record: Option<&LeaveBalanceRecord>,
        warnings: &mut Vec<DataIncomplete>,
    ) -> LeaveBalances {
        let Some(record) = record else {
            warnings.push(DataIncomplete::MissingLeaveBalance {
                employee_id: self.id.clone(),
                leave_type,
            });
            return LeaveBalances::default();
        };
        LeaveBalances {
            beginning_balance: record.beginning_balance.unwrap_or_default(),
            // Ongoing adjustments and the first-year override only exist for vacation.
            ongoing_balance: match leave_type {
                LeaveType::Vacation => record.ongoing_balance.unwrap_or_default(),
                LeaveType::SickLeave => Decimal::ZERO,
            },
            used: record.used.unwrap_or_default(),
            first_year_rule: match leave_type {
                LeaveType::Vacation => record.first_year_rule,
                LeaveType::SickLeave => None,
            },
        }
    }

    fn resolve_allocation(
        &self,
        leave_type: LeaveType,
        record: Option<&AllocationRecord>,
        warnings: &mut Vec<DataIncomplete>,
    ) -> Allocation {
        match record {
            None
            | Some(AllocationRecord {
                mode: AllocationMode::Auto,
                ..
            }) => Allocation::Auto,
            Some(AllocationRecord {
                mode: AllocationMode::Manual,
                hours,
            }) => {
                if hours.is_none() {
                    warnings.push(DataIncomplete::ManualAllocationWithoutHours {
                        employee_id: self.id.clone(),
                        leave_type,
                    });
                }
                Allocation::Manual {
                    hours: hours.unwrap_or_default(),
                }
            }
        }
    }

    /// Mutable access to one leave type's stored balance, creating empty structures as needed.
    pub fn leave_balance_mut(&mut self, leave_type: LeaveType) -> &mut LeaveBalanceRecord {
        self.pto
            .get_or_insert_with(PtoRecord::default)
            .slot_mut(leave_type)
            .get_or_insert_with(LeaveBalanceRecord::default)
    }

    pub fn set_allocation(&mut self, leave_type: LeaveType, allocation: Allocation) {
        let record = match allocation {
            Allocation::Auto => AllocationRecord {
                mode: AllocationMode::Auto,
                hours: None,
            },
            Allocation::Manual { hours } => AllocationRecord {
                mode: AllocationMode::Manual,
                hours: Some(hours),
            },
        };
        *self
            .pto_allocation
            .get_or_insert_with(PtoAllocationRecord::default)
            .slot_mut(leave_type) = Some(record);
    }
}

// --- Resolved employee (what the engine computes on) ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaveBalances {
    pub beginning_balance: Decimal,
    pub ongoing_balance: Decimal,
    pub used: Decimal,
    pub first_year_rule: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Allocation {
    #[default]
    Auto,
    Manual { hours: Decimal },
}

impl Allocation {
    pub fn mode(&self) -> AllocationMode {
        match self {
            Allocation::Auto => AllocationMode::Auto,
            Allocation::Manual { .. } => AllocationMode::Manual,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: EmployeeId,
    pub tenant_id: TenantId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: EmployeeStatus,
    pub department: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub vacation: LeaveBalances,
    pub sick_leave: LeaveBalances,
    pub vacation_allocation: Allocation,
    pub sick_leave_allocation: Allocation,
}

impl Employee {
    pub fn balances(&self, leave_type: LeaveType) -> &LeaveBalances {
        match leave_type {
            LeaveType::Vacation => &self.vacation,
            LeaveType::SickLeave => &self.sick_leave,
        }
    }

    pub fn allocation(&self, leave_type: LeaveType) -> Allocation {
        match leave_type {
            LeaveType::Vacation => self.vacation_allocation,
            LeaveType::SickLeave => self.sick_leave_allocation,
        }
    }
}

// --- Requests ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtoRequest {
    pub id: RequestId,
    pub tenant_id: TenantId,
    pub employee_id: EmployeeId,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hours: Decimal,
    #[serde(default)]
    pub reason: String,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    pub created_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

impl PtoRequest {
    /// Inclusive date-range overlap.
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start_date <= to && self.end_date >= from
    }
}

// --- Timesheets ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub clock_in: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_out: Option<NaiveDateTime>,
}

impl TimeEntry {
    /// Worked hours for a closed entry; open or inverted entries count as zero.
    pub fn worked_hours(&self) -> Decimal {
        match self.clock_out {
            Some(out) if out > self.clock_in => {
                Decimal::from((out - self.clock_in).num_seconds()) / dec!(3600)
            }
            _ => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    pub id: String,
    pub tenant_id: TenantId,
    pub employee_id: EmployeeId,
    pub status: TimesheetStatus,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub total_hours: Decimal,
    #[serde(default)]
    pub time_entries: Vec<TimeEntry>,
}

// --- Acting user ---

/// The signed-in user as supplied by the identity provider and tenant directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub role: Role,
}

impl ActingUser {
    pub fn new(id: &str, tenant_id: &str, role: Role) -> Self {
        Self {
            id: id.to_string(),
            tenant_id: tenant_id.to_string(),
            role,
        }
    }
}
