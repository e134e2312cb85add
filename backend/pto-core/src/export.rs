// src/export.rs
use serde::Serialize;
use std::io::Write;

use crate::models::PtoRequest;

#[derive(Debug, Serialize)]
struct RequestRow<'a> {
    id: &'a str,
    employee_id: &'a str,
    leave_type: String,
    start_date: String,
    end_date: String,
    hours: String,
    status: String,
    created_by: &'a str,
    created_at: String,
    reviewed_by: &'a str,
    reviewed_at: String,
    reason: &'a str,
}

impl<'a> From<&'a PtoRequest> for RequestRow<'a> {
    fn from(r: &'a PtoRequest) -> Self {
        Self {
            id: &r.id,
            employee_id: &r.employee_id,
            leave_type: r.leave_type.to_string(),
            start_date: r.start_date.to_string(),
            end_date: r.end_date.to_string(),
            hours: r.hours.normalize().to_string(),
            status: r.status.to_string(),
            created_by: r.created_by.as_deref().unwrap_or(""),
            created_at: r.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            reviewed_by: r.reviewed_by.as_deref().unwrap_or(""),
            reviewed_at: r
                .reviewed_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            reason: &r.reason,
        }
    }
}

/// Writes requests as CSV with a header row.
pub fn write_requests_csv<W: Write>(requests: &[PtoRequest], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for request in requests {
        wtr.serialize(RequestRow::from(request))?;
    }
    wtr.flush()?;
    Ok(())
}
