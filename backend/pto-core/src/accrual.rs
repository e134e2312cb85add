// src/accrual.rs
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Timesheet, TimesheetStatus, HOURS_PER_DAY};
use crate::tenure::{tenure_months, tenure_years};

// --- Tenant-wide allocation rules ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub min: u32,
    pub max: u32,
}

/// How vacation accrual behaves after the first anniversary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VacationTiers {
    /// Second-year hours for every year after the first, however long the tenure.
    #[default]
    Flat,
    /// Second-year hours in year two, third-year-plus hours from the second anniversary on.
    Graduated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRules {
    pub first_year_vacation_days: u32,
    pub second_year_vacation_days: DayRange,
    pub third_year_plus_vacation_days: DayRange,
    /// Hours worked per one hour of sick leave earned.
    pub sick_leave_accrual_hours: u32,
    pub vacation_tiers: VacationTiers,
}

impl Default for AllocationRules {
    fn default() -> Self {
        Self {
            first_year_vacation_days: 5,
            second_year_vacation_days: DayRange { min: 10, max: 10 },
            third_year_plus_vacation_days: DayRange { min: 15, max: 20 },
            sick_leave_accrual_hours: 40,
            vacation_tiers: VacationTiers::Flat,
        }
    }
}

impl AllocationRules {
    pub fn first_year_hours(&self) -> Decimal {
        Decimal::from(self.first_year_vacation_days) * HOURS_PER_DAY
    }

    pub fn second_year_hours(&self) -> Decimal {
        Decimal::from(self.second_year_vacation_days.min) * HOURS_PER_DAY
    }

    pub fn third_year_plus_hours(&self) -> Decimal {
        Decimal::from(self.third_year_plus_vacation_days.min) * HOURS_PER_DAY
    }
}

// --- Vacation ---

/// Vacation hours accrued as of `today`.
///
/// First year: `floor(first_year_hours * months / 12)`, where the employee's
/// own `first_year_rule` overrides the tenant's first-year days. After the
/// first anniversary the annual amount is flat unless the rules opt into
/// graduated tiers.
pub fn accrued_vacation_hours(
    start: NaiveDate,
    today: NaiveDate,
    first_year_rule: Option<Decimal>,
    rules: &AllocationRules,
) -> Decimal {
    if start > today {
        return Decimal::ZERO;
    }

    let years = tenure_years(start, today);
    let hours = if years < 1 {
        let months = tenure_months(start, today);
        if months == 0 {
            Decimal::ZERO
        } else {
            let first_year_hours = first_year_rule.unwrap_or_else(|| rules.first_year_hours());
            (first_year_hours * Decimal::from(months) / Decimal::from(12)).floor()
        }
    } else {
        match rules.vacation_tiers {
            VacationTiers::Flat => rules.second_year_hours(),
            VacationTiers::Graduated if years < 2 => rules.second_year_hours(),
            VacationTiers::Graduated => rules.third_year_plus_hours(),
        }
    };

    debug!(
        "Vacation accrual: start={}, today={}, years={}, hours={}",
        start, today, years, hours
    );
    hours.max(Decimal::ZERO)
}

// --- Sick leave ---

/// Sick-leave hours earned from approved timesheets inside the employment window.
///
/// Only timesheets that are approved, lie entirely within `[start, today]` and
/// log at least one hour qualify. Inside those, only entries clocked in on a
/// date within `[start, today]` count.
pub fn accrued_sick_leave_hours(
    timesheets: &[Timesheet],
    start: NaiveDate,
    today: NaiveDate,
    rules: &AllocationRules,
) -> Decimal {
    if start > today {
        return Decimal::ZERO;
    }
    if rules.sick_leave_accrual_hours == 0 {
        warn!("Sick leave accrual rate is zero; no sick leave accrues");
        return Decimal::ZERO;
    }

    let worked: Decimal = timesheets
        .iter()
        .filter(|sheet| {
            sheet.status == TimesheetStatus::Approved
                && sheet.week_start_date >= start
                && sheet.week_end_date <= today
                && sheet.total_hours >= Decimal::ONE
        })
        .flat_map(|sheet| sheet.time_entries.iter())
        .filter(|entry| {
            let worked_on = entry.clock_in.date();
            worked_on >= start && worked_on <= today
        })
        .map(|entry| entry.worked_hours())
        .sum();

    let hours = (worked / Decimal::from(rules.sick_leave_accrual_hours)).floor();
    debug!(
        "Sick leave accrual: start={}, today={}, qualifying worked hours={}, hours={}",
        start, today, worked, hours
    );
    hours
}
