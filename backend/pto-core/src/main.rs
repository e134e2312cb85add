// src/main.rs
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pto_core::export::write_requests_csv;
use pto_core::{
    ActingUser, Clock, Config, FixedClock, InMemoryStore, LeaveType, NewPtoRequest, PtoService,
    RequestFilter, RequestStatus, ReviewDecision, Snapshot, SystemClock,
};

#[derive(Parser)]
#[command(name = "pto")]
#[command(about = "PTO balances and leave requests over a JSON snapshot")]
struct Cli {
    /// Snapshot file with employees, timesheets and requests
    #[arg(long, global = true, env = "PTO_SNAPSHOT", default_value = "pto_snapshot.json")]
    snapshot: PathBuf,
    /// Employee id of the acting user
    #[arg(long = "as-user", global = true, env = "PTO_AS_USER")]
    as_user: Option<String>,
    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long = "as-of", global = true)]
    as_of: Option<NaiveDate>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the balance breakdown for one or both leave types
    Balance {
        /// Defaults to the acting user
        #[arg(long)]
        employee: Option<String>,
        /// vacation or sick_leave; both when omitted
        #[arg(long = "type")]
        leave_type: Option<LeaveType>,
    },
    /// File a new leave request
    Request {
        /// Required when filing on someone's behalf
        #[arg(long)]
        employee: Option<String>,
        #[arg(long = "type", default_value = "vacation")]
        leave_type: LeaveType,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value = "")]
        reason: String,
        /// Expected hours; rejected if they disagree with the business-day count
        #[arg(long)]
        hours: Option<Decimal>,
    },
    /// Approve or reject a pending request
    Review {
        id: String,
        /// approve or reject
        decision: ReviewDecision,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a request
    Delete { id: String },
    /// List requests visible to the acting user
    List {
        #[arg(long)]
        employee: Option<String>,
        #[arg(long = "type")]
        leave_type: Option<LeaveType>,
        #[arg(long)]
        status: Option<RequestStatus>,
        /// Only requests overlapping [from, to]; both bounds are needed
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
        /// Write CSV instead of JSON
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
}

impl Commands {
    fn mutates(&self) -> bool {
        matches!(
            self,
            Commands::Request { .. } | Commands::Review { .. } | Commands::Delete { .. }
        )
    }
}

fn resolve_actor(store: &InMemoryStore, as_user: Option<&str>) -> Result<ActingUser> {
    let id = as_user.ok_or_else(|| anyhow!("--as-user (or PTO_AS_USER) is required"))?;
    let employees = store.employees()?;
    let record = employees
        .iter()
        .find(|e| e.id == id)
        .ok_or_else(|| anyhow!("No employee with id {} in snapshot", id))?;
    Ok(ActingUser {
        id: record.id.clone(),
        tenant_id: record.tenant_id.clone(),
        role: record.role,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn save_snapshot(store: &InMemoryStore, path: &Path) -> Result<()> {
    Snapshot::from_store(store)?
        .save(path)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load PTO configuration")?;

    let snapshot = Snapshot::load(&cli.snapshot)
        .with_context(|| format!("Failed to read snapshot {}", cli.snapshot.display()))?;
    let store = snapshot.into_store()?;
    let actor = resolve_actor(&store, cli.as_user.as_deref())?;

    let clock: Arc<dyn Clock> = match cli.as_of {
        Some(date) => Arc::new(FixedClock::on(date)),
        None => Arc::new(SystemClock),
    };
    let service = PtoService::from_config(Arc::new(store.clone()), clock, &config);
    info!(
        "Acting as {} ({}) in tenant {}, as of {}",
        actor.id,
        actor.role,
        actor.tenant_id,
        service.today()
    );

    let mutates = cli.command.mutates();
    match cli.command {
        Commands::Balance {
            employee,
            leave_type,
        } => {
            let employee_id = employee.unwrap_or_else(|| actor.id.clone());
            let breakdowns = match leave_type {
                Some(leave_type) => vec![service.balance(&actor, &employee_id, leave_type).await?],
                None => service.balances(&actor, &employee_id).await?,
            };
            print_json(&breakdowns)?;
        }
        Commands::Request {
            employee,
            leave_type,
            start,
            end,
            reason,
            hours,
        } => {
            let new = NewPtoRequest {
                employee_id: employee,
                leave_type,
                start_date: start,
                end_date: end,
                reason,
                hours,
            };
            let request = service.create_request(&actor, new).await?;
            print_json(&request)?;
        }
        Commands::Review {
            id,
            decision,
            notes,
        } => {
            let request = service.review_request(&actor, &id, decision, notes).await?;
            print_json(&request)?;
        }
        Commands::Delete { id } => {
            service.delete_request(&actor, &id).await?;
            println!("Deleted {}", id);
        }
        Commands::List {
            employee,
            leave_type,
            status,
            from,
            to,
            csv,
        } => {
            let filter = RequestFilter {
                employee_id: employee,
                leave_type,
                statuses: status.into_iter().collect(),
                date_range: from.zip(to),
            };
            let requests = service.list_requests(&actor, filter).await?;
            if csv {
                write_requests_csv(&requests, io::stdout().lock()).context("Failed to write CSV")?;
            } else {
                print_json(&requests)?;
            }
        }
    }

    if mutates {
        save_snapshot(&store, &cli.snapshot)?;
    }
    Ok(())
}
