// src/config.rs
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::accrual::{AllocationRules, DayRange, VacationTiers};

pub const ENV_PREFIX: &str = "PTO_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine configuration, read from `PTO_*` environment variables (and `.env`).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Upper bound for each collaborator fetch before a balance read fails closed.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    #[serde(default = "default_first_year_vacation_days")]
    pub first_year_vacation_days: u32,
    #[serde(default = "default_second_year_vacation_days")]
    pub second_year_vacation_days_min: u32,
    #[serde(default = "default_second_year_vacation_days")]
    pub second_year_vacation_days_max: u32,
    #[serde(default = "default_third_year_plus_vacation_days_min")]
    pub third_year_plus_vacation_days_min: u32,
    #[serde(default = "default_third_year_plus_vacation_days_max")]
    pub third_year_plus_vacation_days_max: u32,
    #[serde(default = "default_sick_leave_accrual_hours")]
    pub sick_leave_accrual_hours: u32,
    #[serde(default)]
    pub vacation_tiers: VacationTiers,
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}
fn default_first_year_vacation_days() -> u32 {
    5
}
fn default_second_year_vacation_days() -> u32 {
    10
}
fn default_third_year_plus_vacation_days_min() -> u32 {
    15
}
fn default_third_year_plus_vacation_days_max() -> u32 {
    20
}
fn default_sick_leave_accrual_hours() -> u32 {
    40
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout_ms(),
            first_year_vacation_days: default_first_year_vacation_days(),
            second_year_vacation_days_min: default_second_year_vacation_days(),
            second_year_vacation_days_max: default_second_year_vacation_days(),
            third_year_plus_vacation_days_min: default_third_year_plus_vacation_days_min(),
            third_year_plus_vacation_days_max: default_third_year_plus_vacation_days_max(),
            sick_leave_accrual_hours: default_sick_leave_accrual_hours(),
            vacation_tiers: VacationTiers::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let config = envy::prefixed(ENV_PREFIX).from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    /// Same as [`Config::from_env`] but over explicit `(KEY, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(pairs)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::Invalid("PTO_FETCH_TIMEOUT_MS must be positive".into()));
        }
        if self.sick_leave_accrual_hours == 0 {
            return Err(ConfigError::Invalid(
                "PTO_SICK_LEAVE_ACCRUAL_HOURS must be positive".into(),
            ));
        }
        if self.second_year_vacation_days_min > self.second_year_vacation_days_max {
            return Err(ConfigError::Invalid(
                "second-year vacation days: min exceeds max".into(),
            ));
        }
        if self.third_year_plus_vacation_days_min > self.third_year_plus_vacation_days_max {
            return Err(ConfigError::Invalid(
                "third-year-plus vacation days: min exceeds max".into(),
            ));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn allocation_rules(&self) -> AllocationRules {
        AllocationRules {
            first_year_vacation_days: self.first_year_vacation_days,
            second_year_vacation_days: DayRange {
                min: self.second_year_vacation_days_min,
                max: self.second_year_vacation_days_max,
            },
            third_year_plus_vacation_days: DayRange {
                min: self.third_year_plus_vacation_days_min,
                max: self.third_year_plus_vacation_days_max,
            },
            sick_leave_accrual_hours: self.sick_leave_accrual_hours,
            vacation_tiers: self.vacation_tiers,
        }
    }
}
